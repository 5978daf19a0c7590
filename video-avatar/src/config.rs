/*
 * Copyright 2025 Security Union LLC
 *
 * Licensed under either of
 *
 * * Apache License, Version 2.0
 *   (http://www.apache.org/licenses/LICENSE-2.0)
 * * MIT license
 *   (http://opensource.org/licenses/MIT)
 *
 * at your option.
 *
 * Unless you explicitly state otherwise, any contribution intentionally
 * submitted for inclusion in the work by you, as defined in the Apache-2.0
 * license, shall be dual licensed as above, without any additional terms or
 * conditions.
 */

//! Embedder-facing configuration.
//!
//! All fields are optional in serialized form; missing ones take the
//! built-in values from [`crate::constants`].

use crate::constants::{
    VIDEO_AVATAR_ENABLED_BY_DEFAULT, VIDEO_AVATAR_OFFSET_X, VIDEO_AVATAR_OFFSET_Y,
    VIDEO_AVATAR_SIZE,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AvatarConfig {
    /// Diameter of the avatar circle, in scene units.
    pub size: u32,
    pub offset_x: f64,
    pub offset_y: f64,
    /// Whether avatars are shown when the user never chose.
    pub enabled_by_default: bool,
}

impl Default for AvatarConfig {
    fn default() -> Self {
        Self {
            size: VIDEO_AVATAR_SIZE,
            offset_x: VIDEO_AVATAR_OFFSET_X,
            offset_y: VIDEO_AVATAR_OFFSET_Y,
            enabled_by_default: VIDEO_AVATAR_ENABLED_BY_DEFAULT,
        }
    }
}

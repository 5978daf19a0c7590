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

use crate::constants::VIDEO_AVATAR_STORAGE_KEY;
use crate::error::PreferenceError;
use crate::preference::{PreferenceStorage, VideoAvatarPreference};
use std::rc::Rc;
use web_sys::Storage;

/// Keeps the video avatar preference in `window.localStorage`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalStoragePreferences;

impl LocalStoragePreferences {
    /// The preference as stored in this browser.
    pub fn preference() -> VideoAvatarPreference {
        VideoAvatarPreference::new(Rc::new(Self))
    }
}

fn local_storage() -> Option<Storage> {
    web_sys::window().and_then(|w| w.local_storage().ok().flatten())
}

impl PreferenceStorage for LocalStoragePreferences {
    fn video_avatar_enabled(&self) -> Option<bool> {
        local_storage()
            .and_then(|storage| storage.get_item(VIDEO_AVATAR_STORAGE_KEY).ok().flatten())
            .and_then(|value| value.parse::<bool>().ok())
    }

    fn set_video_avatar_enabled(&self, enabled: bool) -> Result<(), PreferenceError> {
        let storage = local_storage().ok_or(PreferenceError::Unavailable)?;
        storage
            .set_item(VIDEO_AVATAR_STORAGE_KEY, &enabled.to_string())
            .map_err(|e| PreferenceError::Write(format!("{e:?}")))
    }
}

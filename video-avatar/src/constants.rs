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

/// Width and height, in logical scene units, of the circular avatar.
pub const VIDEO_AVATAR_SIZE: u32 = 48;

/// Offset of the avatar relative to the participant's visual center. The
/// small downward nudge puts the circle over the sprite body.
pub const VIDEO_AVATAR_OFFSET_X: f64 = 0.0;
pub const VIDEO_AVATAR_OFFSET_Y: f64 = 2.0;

/// Anchor of the avatar host: its own center.
pub const VIDEO_AVATAR_ORIGIN: (f64, f64) = (0.5, 0.5);

pub const VIDEO_AVATAR_BORDER_PX: u32 = 3;
pub const VIDEO_AVATAR_BORDER_COLOR: &str = "white";
pub const VIDEO_AVATAR_BACKGROUND: &str = "#1a1a2e";
pub const VIDEO_AVATAR_SHADOW: &str = "0 2px 8px rgba(0,0,0,0.4)";

/// Key under which the "show video avatars" preference is persisted.
pub const VIDEO_AVATAR_STORAGE_KEY: &str = "videoAvatarEnabled";

/// Value of the preference when nothing has been stored yet.
pub const VIDEO_AVATAR_ENABLED_BY_DEFAULT: bool = true;

/// Capacity of the avatar event bus channel
pub const EVENT_BUS_CAPACITY: usize = 256;

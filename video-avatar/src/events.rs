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

//! Framework-agnostic events emitted by the avatar subsystem.
//!
//! These events are emitted via the event bus and can be subscribed to by
//! any frontend (the game scene, a debug overlay, tests).

use crate::participant::ParticipantId;

/// Events emitted by the avatar manager, the binders and the visuals.
#[derive(Clone, Debug, PartialEq)]
pub enum AvatarEvent {
    // === Manager Events ===
    /// The manager began observing the stream registry
    ManagerStarted,

    /// The manager stopped observing the stream registry
    ManagerStopped,

    /// The manager released every binding and cache entry
    ManagerDestroyed,

    // === Participant Events ===
    /// A participant's avatar was bound to its stream
    ParticipantLinked(ParticipantId),

    /// A participant's avatar binding was released
    ParticipantUnlinked(ParticipantId),

    // === Stream Events ===
    /// A new video-only stream was built for a participant
    StreamBound {
        participant: ParticipantId,
        track_ids: Vec<String>,
    },

    /// A participant's stream went away
    StreamCleared(ParticipantId),

    // === Visual Events ===
    /// The runtime refused to start playback
    PlaybackFailed(String),

    // === Preference Events ===
    /// The user switched video avatars on or off
    PreferenceChanged(bool),
}

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

//! Live camera video shown inside circular avatars on a virtual map.
//!
//! Every participant on the map can wear a small round video of their
//! camera instead of a static sprite. This crate decides, per participant,
//! which video stream that circle shows: it watches the registry of media
//! streams published by the transport layer and the user's "show video
//! avatars" preference, strips each stream down to its video tracks, and
//! hands the result to a visual host attached to the participant's on-map
//! node.
//!
//! The core is platform agnostic. Browser bindings (DOM video host,
//! `localStorage` preference, `web_sys::MediaStream` integration) live in
//! the `wasm` module behind the `wasm` feature.
//!
//! # Outline of usage
//!
//! ## Manager creation:
//! ```ignore
//! let registry = StreamRegistry::new(); // fed by the transport layer
//! let preference = VideoAvatarPreference::in_memory(None);
//! let mut manager = AvatarManager::new(registry.clone(), preference.clone());
//! manager.start();
//! ```
//!
//! ## Participants joining and leaving:
//! ```ignore
//! let alice = ParticipantAvatar::new(ParticipantId(42), scene.clone());
//! manager.link_remote_participant(&alice);
//! manager.unlink_participant(&alice);
//! ```
//!
//! ## Turning avatars off:
//! ```ignore
//! preference.disable(); // every avatar hides, every cached stream is dropped
//! ```

pub mod binder;
pub mod cache;
pub mod carrier;
pub mod config;
pub mod constants;
pub mod error;
pub mod event_bus;
pub mod events;
pub mod manager;
pub mod media;
pub mod participant;
pub mod preference;
pub mod reactive;
pub mod visual;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use binder::{bind_local_camera, bind_remote_participant, find_participant_box};
pub use cache::{extract_video_only_stream, CacheEntry, CacheOutcome, StreamCacheTable};
pub use carrier::{AvatarCarrier, ParticipantAvatar};
pub use config::AvatarConfig;
pub use error::{MediaError, PlaybackError, PreferenceError, VisualError};
pub use event_bus::{emit_avatar_event, global_avatar_sender, subscribe_avatar_events};
pub use events::AvatarEvent;
pub use manager::AvatarManager;
pub use media::{
    MediaBox, MediaKind, MediaStream, MediaTrack, StreamMedia, StreamRegistry, Streamable,
};
pub use participant::{connection_key, parse_participant_id, ParticipantId};
pub use preference::{MemoryPreferenceStorage, PreferenceStorage, VideoAvatarPreference};
pub use reactive::{derived, derived2, Derived, Readable, Store, Subscription, WeakStore};
pub use visual::{AvatarGeometry, AvatarScene, AvatarVisual, VisualHost, VisualState};

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

//! Global event bus for avatar events.
//!
//! This module provides a MPMC (multi-producer, multi-consumer) broadcast
//! channel for [`AvatarEvent`]s. Any component can subscribe to receive
//! events, and any component can emit events.
//!
//! # Example
//!
//! ```ignore
//! use video_avatar::{subscribe_avatar_events, AvatarEvent};
//!
//! let mut rx = subscribe_avatar_events();
//! wasm_bindgen_futures::spawn_local(async move {
//!     while let Ok(event) = rx.recv().await {
//!         if let AvatarEvent::PlaybackFailed(reason) = event {
//!             // Show an "click to enable video" hint
//!         }
//!     }
//! });
//! ```

use crate::constants::EVENT_BUS_CAPACITY;
use crate::events::AvatarEvent;
use async_broadcast::{broadcast, InactiveReceiver, Receiver, Sender};
use once_cell::sync::Lazy;

struct Bus {
    sender: Sender<AvatarEvent>,
    // Keeps the channel open while nobody is listening, without buffering.
    _keepalive: InactiveReceiver<AvatarEvent>,
}

static BUS: Lazy<Bus> = Lazy::new(|| {
    let (mut sender, receiver) = broadcast(EVENT_BUS_CAPACITY);
    sender.set_overflow(true);
    Bus {
        sender,
        _keepalive: receiver.deactivate(),
    }
});

/// Get the global sender for emitting avatar events.
pub fn global_avatar_sender() -> Sender<AvatarEvent> {
    BUS.sender.clone()
}

/// Subscribe to avatar events.
///
/// Returns a receiver that will receive all future avatar events.
/// Each subscriber receives all events independently (broadcast pattern).
pub fn subscribe_avatar_events() -> Receiver<AvatarEvent> {
    BUS.sender.new_receiver()
}

/// Emit an avatar event to all subscribers.
///
/// This is a non-blocking operation. If the channel is full, the oldest
/// message is dropped to make room.
pub fn emit_avatar_event(event: AvatarEvent) {
    let _ = BUS.sender.try_broadcast(event);
}

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

//! Integration tests for event_bus module.

mod common;

use async_broadcast::{Receiver, TryRecvError};
use common::webrtc_box;
use futures::executor::block_on;
use video_avatar::{
    emit_avatar_event, global_avatar_sender, subscribe_avatar_events, AvatarEvent, AvatarManager,
    ParticipantAvatar, ParticipantId, StreamRegistry, VideoAvatarPreference,
};

/// Event bus channel capacity (must match the constant in constants.rs)
const EVENT_BUS_CAPACITY: usize = 256;

// Other tests in this binary emit on the same global bus concurrently, so
// assertions only look at events carrying their own participant ids.
fn drain(rx: &mut Receiver<AvatarEvent>) -> Vec<AvatarEvent> {
    let mut events = Vec::new();
    loop {
        match rx.try_recv() {
            Ok(event) => events.push(event),
            Err(TryRecvError::Overflowed(_)) => continue,
            Err(_) => break,
        }
    }
    events
}

fn concerns(event: &AvatarEvent, id: ParticipantId) -> bool {
    match event {
        AvatarEvent::ParticipantLinked(p)
        | AvatarEvent::ParticipantUnlinked(p)
        | AvatarEvent::StreamCleared(p) => *p == id,
        AvatarEvent::StreamBound { participant, .. } => *participant == id,
        _ => false,
    }
}

#[test]
fn test_global_avatar_sender_is_same_instance() {
    let sender1 = global_avatar_sender();
    let sender2 = global_avatar_sender();
    assert_eq!(sender1.capacity(), sender2.capacity());
    assert_eq!(sender1.capacity(), EVENT_BUS_CAPACITY);
}

#[test]
fn test_emit_without_subscribers_does_not_panic() {
    emit_avatar_event(AvatarEvent::ManagerStarted);
    emit_avatar_event(AvatarEvent::PlaybackFailed("NotAllowedError".to_string()));
    emit_avatar_event(AvatarEvent::PreferenceChanged(false));
}

#[test]
fn test_subscriber_receives_emitted_event() {
    let mut rx = subscribe_avatar_events();
    let id = ParticipantId(1_000_001);
    emit_avatar_event(AvatarEvent::ParticipantLinked(id));

    let received = block_on(async {
        loop {
            match rx.recv().await {
                Ok(event) if concerns(&event, id) => break Some(event),
                Ok(_) => continue,
                Err(async_broadcast::RecvError::Overflowed(_)) => continue,
                Err(async_broadcast::RecvError::Closed) => break None,
            }
        }
    });
    assert_eq!(received, Some(AvatarEvent::ParticipantLinked(id)));
}

#[test]
fn test_independent_subscribers_see_the_same_events() {
    let mut rx1 = subscribe_avatar_events();
    let mut rx2 = subscribe_avatar_events();
    let id = ParticipantId(1_000_002);
    emit_avatar_event(AvatarEvent::StreamCleared(id));

    let mine = |events: Vec<AvatarEvent>| -> Vec<AvatarEvent> {
        events.into_iter().filter(|e| concerns(e, id)).collect()
    };
    assert_eq!(mine(drain(&mut rx1)), vec![AvatarEvent::StreamCleared(id)]);
    assert_eq!(mine(drain(&mut rx2)), vec![AvatarEvent::StreamCleared(id)]);
}

#[test]
fn test_manager_lifecycle_events() {
    let mut rx = subscribe_avatar_events();
    let id = ParticipantId(1_000_003);
    let registry = StreamRegistry::new();
    let (media_box, _raw) = webrtc_box(&["t1", "t2"]);
    registry.insert(format!("room_{id}"), media_box);
    let preference = VideoAvatarPreference::in_memory(None);
    let mut manager = AvatarManager::new(registry, preference);
    let avatar = ParticipantAvatar::new(id, common::RecordingScene::default());

    manager.link_remote_participant(&avatar);
    manager.unlink_participant(&avatar);

    let events: Vec<_> = drain(&mut rx)
        .into_iter()
        .filter(|e| concerns(e, id))
        .collect();
    assert_eq!(
        events,
        vec![
            AvatarEvent::StreamBound {
                participant: id,
                track_ids: vec!["t1".to_string(), "t2".to_string()],
            },
            AvatarEvent::ParticipantLinked(id),
            AvatarEvent::ParticipantUnlinked(id),
        ]
    );
}

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

//! Per-participant stream derivations.
//!
//! A binding is a [`Derived`] value, "the video-only stream to show for
//! this participant, if any", computed from the stream registry and the
//! user's preference and memoized through the participant's
//! [`CacheEntry`](crate::cache::CacheEntry). Nothing in here can fail: a
//! malformed key, a media kind without video or a stream that cannot be
//! rebuilt all resolve to `None`.

use crate::cache::{CacheOutcome, StreamCacheTable};
use crate::event_bus::emit_avatar_event;
use crate::events::AvatarEvent;
use crate::media::{MediaBox, MediaStream, RegistryEntries, StreamRegistry};
use crate::participant::{parse_participant_id, ParticipantId};
use crate::preference::VideoAvatarPreference;
use crate::reactive::{derived2, Derived, Readable};
use log::debug;

/// Binds a remote participant to the registry entry whose connection key
/// carries its id.
///
/// The returned value recomputes whenever the registry or the preference
/// changes, as long as someone is subscribed to it.
pub fn bind_remote_participant<S: MediaStream>(
    participant: ParticipantId,
    registry: &StreamRegistry<S>,
    preference: &VideoAvatarPreference,
    cache: &StreamCacheTable<S>,
) -> Derived<Option<S>> {
    cache.ensure(participant);
    let cache = cache.clone();
    derived2(
        registry,
        preference,
        move |entries: RegistryEntries<S>, enabled: bool| {
            resolve_remote_stream(participant, &entries, enabled, &cache)
        },
    )
}

/// Binds the local user's own camera to the same video-only memoization.
///
/// Used for the self view, which is rendered mirrored.
pub fn bind_local_camera<S, R>(
    participant: ParticipantId,
    camera: &R,
    preference: &VideoAvatarPreference,
    cache: &StreamCacheTable<S>,
) -> Derived<Option<S>>
where
    S: MediaStream,
    R: Readable<Option<S>> + Clone + 'static,
{
    cache.ensure(participant);
    let cache = cache.clone();
    derived2(
        camera,
        preference,
        move |raw: Option<S>, enabled: bool| resolve(participant, raw, enabled, &cache),
    )
}

/// First registry entry whose key parses to `participant`.
pub fn find_participant_box<S>(
    participant: ParticipantId,
    entries: &RegistryEntries<S>,
) -> Option<&MediaBox<S>> {
    // Keys are unique per participant upstream; should two ever match, the
    // first in insertion order wins.
    entries
        .iter()
        .find(|(key, _)| parse_participant_id(key) == Some(participant))
        .map(|(_, media_box)| media_box)
}

fn resolve_remote_stream<S: MediaStream>(
    participant: ParticipantId,
    entries: &RegistryEntries<S>,
    enabled: bool,
    cache: &StreamCacheTable<S>,
) -> Option<S> {
    let raw = if enabled {
        find_participant_box(participant, entries).and_then(MediaBox::current_stream)
    } else {
        None
    };
    resolve(participant, raw, enabled, cache)
}

fn resolve<S: MediaStream>(
    participant: ParticipantId,
    raw: Option<S>,
    enabled: bool,
    cache: &StreamCacheTable<S>,
) -> Option<S> {
    cache.with_entry(participant, |entry| {
        let outcome = if enabled {
            entry.refresh(raw.as_ref())
        } else {
            entry.clear()
        };
        report(participant, outcome, &entry.track_ids);
        entry.stream.clone()
    })
}

fn report(participant: ParticipantId, outcome: CacheOutcome, track_ids: &[String]) {
    match outcome {
        CacheOutcome::Rebuilt => {
            debug!("participant {participant}: new video stream {track_ids:?}");
            emit_avatar_event(AvatarEvent::StreamBound {
                participant,
                track_ids: track_ids.to_vec(),
            });
        }
        CacheOutcome::Cleared => {
            debug!("participant {participant}: video stream cleared");
            emit_avatar_event(AvatarEvent::StreamCleared(participant));
        }
        CacheOutcome::Reused | CacheOutcome::Empty => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::memory::LocalMediaStream;
    use crate::media::{StreamMedia, Streamable};

    fn webrtc_box(ids: &[&str]) -> MediaBox<LocalMediaStream> {
        MediaBox::new(Some(Streamable::new(StreamMedia::webrtc(Some(
            LocalMediaStream::with_video(ids),
        )))))
    }

    #[test]
    fn first_matching_entry_wins() {
        let registry = StreamRegistry::new();
        registry.insert("lobby_5", webrtc_box(&["first"]));
        registry.insert("other-room_5", webrtc_box(&["second"]));
        let entries = registry.get();
        let media_box = find_participant_box(ParticipantId(5), &entries).unwrap();
        assert_eq!(
            media_box.current_stream().unwrap().video_track_ids(),
            vec!["first"]
        );
    }

    #[test]
    fn malformed_keys_are_skipped() {
        let registry = StreamRegistry::new();
        registry.insert("5", webrtc_box(&["bad"]));
        registry.insert("room_5x", webrtc_box(&["bad"]));
        assert!(find_participant_box(ParticipantId(5), &registry.get()).is_none());

        registry.insert("room_5", webrtc_box(&["good"]));
        assert!(find_participant_box(ParticipantId(5), &registry.get()).is_some());
    }

    #[test]
    fn binding_creates_cache_entry() {
        let registry: StreamRegistry<LocalMediaStream> = StreamRegistry::new();
        let preference = VideoAvatarPreference::in_memory(None);
        let cache = StreamCacheTable::new();
        let _binding = bind_remote_participant(ParticipantId(1), &registry, &preference, &cache);
        assert!(cache.contains(ParticipantId(1)));
    }
}

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

use crate::binder::{bind_local_camera, bind_remote_participant};
use crate::cache::StreamCacheTable;
use crate::carrier::AvatarCarrier;
use crate::event_bus::emit_avatar_event;
use crate::events::AvatarEvent;
use crate::media::{MediaStream, RegistryEntries, StreamRegistry};
use crate::participant::ParticipantId;
use crate::preference::VideoAvatarPreference;
use crate::reactive::{Derived, Readable, Subscription};
use log::{debug, info, warn};
use std::cell::Cell;
use std::collections::HashMap;
use std::rc::Rc;

/// Owns the video avatar bindings of every participant currently on the map.
///
/// Each linked participant gets its own derivation over the stream registry
/// and the user's preference; those recompute on their own whenever either
/// changes. The manager only keeps the subscription handles and the stream
/// cache, and releases both when participants leave or when it is
/// destroyed.
///
/// Outline of usage:
///
/// ```ignore
/// let mut manager = AvatarManager::new(registry.clone(), preference.clone());
/// manager.start();
///
/// // participant joined the map
/// manager.link_remote_participant(&alice);
///
/// // participant left the map
/// manager.unlink_participant(&alice);
///
/// // scene shut down
/// manager.destroy();
/// ```
pub struct AvatarManager<S: MediaStream> {
    registry: StreamRegistry<S>,
    preference: VideoAvatarPreference,
    cache: StreamCacheTable<S>,
    bindings: HashMap<ParticipantId, Subscription>,
    registry_subscription: Option<Subscription>,
    registry_revision: Rc<Cell<u64>>,
    destroyed: bool,
}

impl<S: MediaStream> AvatarManager<S> {
    pub fn new(registry: StreamRegistry<S>, preference: VideoAvatarPreference) -> Self {
        Self {
            registry,
            preference,
            cache: StreamCacheTable::new(),
            bindings: HashMap::new(),
            registry_subscription: None,
            registry_revision: Rc::new(Cell::new(0)),
            destroyed: false,
        }
    }

    /// Begins observing the stream registry. Calling it again replaces the
    /// previous observation instead of adding a second one.
    pub fn start(&mut self) {
        if let Some(previous) = self.registry_subscription.take() {
            previous.unsubscribe();
        }
        let revision = self.registry_revision.clone();
        let subscription = self.registry.subscribe(Box::new(move |entries: &RegistryEntries<S>| {
            revision.set(revision.get() + 1);
            // Bindings are derivations of the registry and update by
            // themselves.
            debug!("stream registry changed, {} entries", entries.len());
        }));
        self.registry_subscription = Some(subscription);
        info!("video avatar manager started");
        emit_avatar_event(AvatarEvent::ManagerStarted);
    }

    /// Stops observing the stream registry. Existing bindings keep working.
    pub fn stop(&mut self) {
        if let Some(subscription) = self.registry_subscription.take() {
            subscription.unsubscribe();
            info!("video avatar manager stopped");
            emit_avatar_event(AvatarEvent::ManagerStopped);
        }
    }

    pub fn is_started(&self) -> bool {
        self.registry_subscription.is_some()
    }

    /// Number of registry notifications observed since construction.
    pub fn registry_revision(&self) -> u64 {
        self.registry_revision.get()
    }

    /// Binds a remote participant's stream to its avatar. Remote feeds are
    /// never mirrored.
    pub fn link_remote_participant(&mut self, participant: &impl AvatarCarrier<S>) {
        let id = participant.participant_id();
        if !self.prepare_link(id) {
            return;
        }
        let stream =
            bind_remote_participant(id, &self.registry, &self.preference, &self.cache);
        self.attach(participant, stream, false);
    }

    /// Binds the local user's own camera to their avatar, mirrored.
    pub fn link_local_participant<R>(&mut self, participant: &impl AvatarCarrier<S>, camera: &R)
    where
        R: Readable<Option<S>> + Clone + 'static,
    {
        let id = participant.participant_id();
        if !self.prepare_link(id) {
            return;
        }
        let stream = bind_local_camera(id, camera, &self.preference, &self.cache);
        self.attach(participant, stream, true);
    }

    /// Tears down a participant's avatar and forgets its cached stream.
    /// Unlinking a participant that is not linked only disables its avatar.
    pub fn unlink_participant(&mut self, participant: &impl AvatarCarrier<S>) {
        let id = participant.participant_id();
        participant.disable_video_avatar();
        let was_linked = match self.bindings.remove(&id) {
            Some(subscription) => {
                subscription.unsubscribe();
                true
            }
            None => false,
        };
        self.cache.remove(id);
        if was_linked {
            info!("participant {id} unlinked from video avatar");
            emit_avatar_event(AvatarEvent::ParticipantUnlinked(id));
        }
    }

    /// Stops observing and releases every binding and cache entry.
    /// Further calls do nothing.
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.stop();
        for (_, subscription) in self.bindings.drain() {
            subscription.unsubscribe();
        }
        self.cache.clear();
        self.destroyed = true;
        info!("video avatar manager destroyed");
        emit_avatar_event(AvatarEvent::ManagerDestroyed);
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    pub fn is_linked(&self, participant: ParticipantId) -> bool {
        self.bindings.contains_key(&participant)
    }

    pub fn linked_participants(&self) -> Vec<ParticipantId> {
        let mut ids: Vec<_> = self.bindings.keys().copied().collect();
        ids.sort();
        ids
    }

    pub fn cache(&self) -> &StreamCacheTable<S> {
        &self.cache
    }

    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }

    fn prepare_link(&mut self, id: ParticipantId) -> bool {
        if self.destroyed {
            warn!("participant {id}: link ignored, video avatar manager is destroyed");
            return false;
        }
        if let Some(previous) = self.bindings.remove(&id) {
            debug!("participant {id} relinked, dropping previous binding");
            previous.unsubscribe();
            self.cache.remove(id);
        }
        true
    }

    fn attach(
        &mut self,
        participant: &impl AvatarCarrier<S>,
        stream: Derived<Option<S>>,
        mirrored: bool,
    ) {
        let id = participant.participant_id();
        let subscription = participant.enable_video_avatar(stream, mirrored);
        self.bindings.insert(id, subscription);
        info!("participant {id} linked to video avatar");
        emit_avatar_event(AvatarEvent::ParticipantLinked(id));
    }
}

impl<S: MediaStream> Drop for AvatarManager<S> {
    fn drop(&mut self) {
        self.destroy();
    }
}

impl<S: MediaStream> std::fmt::Debug for AvatarManager<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AvatarManager")
            .field("started", &self.is_started())
            .field("linked", &self.linked_participants())
            .field("cache", &self.cache)
            .field("destroyed", &self.destroyed)
            .finish()
    }
}

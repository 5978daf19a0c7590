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

use super::{MediaBox, OrderedMap, Streamable};
use crate::reactive::{Readable, Store, Subscription, WeakStore};
use log::debug;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

/// Registry entries keyed by connection key, in insertion order.
pub type RegistryEntries<S> = OrderedMap<String, MediaBox<S>>;

/// Reactive registry of the media boxes the transport currently exposes.
///
/// Every mutation notifies subscribers with the full, ordered entry set.
/// Changes inside a registered box (a new streamable, or a new raw stream
/// in its media) re-notify subscribers as well.
pub struct StreamRegistry<S> {
    entries: Store<RegistryEntries<S>>,
    watchers: Rc<RefCell<HashMap<String, Subscription>>>,
}

impl<S> Clone for StreamRegistry<S> {
    fn clone(&self) -> Self {
        Self {
            entries: self.entries.clone(),
            watchers: self.watchers.clone(),
        }
    }
}

impl<S: Clone + 'static> Default for StreamRegistry<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Clone + 'static> StreamRegistry<S> {
    pub fn new() -> Self {
        Self {
            entries: Store::new(OrderedMap::new()),
            watchers: Rc::new(RefCell::new(HashMap::new())),
        }
    }

    /// Adds or replaces the box for `connection_key`. A replaced key keeps
    /// its position in iteration order.
    pub fn insert(&self, connection_key: impl Into<String>, media_box: MediaBox<S>) {
        let connection_key = connection_key.into();
        debug!("stream registry: insert {connection_key}");
        let watcher = watch_box(&media_box, self.entries.downgrade());
        let previous = self
            .watchers
            .borrow_mut()
            .insert(connection_key.clone(), watcher);
        drop(previous);
        self.entries.update(|entries| {
            entries.insert(connection_key, media_box);
        });
    }

    pub fn remove(&self, connection_key: &str) -> Option<MediaBox<S>> {
        let watcher = self.watchers.borrow_mut().remove(connection_key);
        drop(watcher);
        let mut removed = None;
        self.entries.update(|entries| {
            removed = entries.remove(connection_key);
        });
        if removed.is_some() {
            debug!("stream registry: remove {connection_key}");
        }
        removed
    }

    pub fn media_box(&self, connection_key: &str) -> Option<MediaBox<S>> {
        self.entries.get().get(connection_key).cloned()
    }

    pub fn len(&self) -> usize {
        self.entries.get().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Re-notifies subscribers without changing the entry set.
    pub fn refresh(&self) {
        self.entries.touch();
    }

    pub fn subscriber_count(&self) -> usize {
        self.entries.subscriber_count()
    }
}

impl<S: Clone + 'static> Readable<RegistryEntries<S>> for StreamRegistry<S> {
    fn get(&self) -> RegistryEntries<S> {
        self.entries.get()
    }

    fn subscribe(&self, callback: Box<dyn Fn(&RegistryEntries<S>)>) -> Subscription {
        self.entries.subscribe(callback)
    }
}

fn touch<S: Clone + 'static>(entries: &WeakStore<RegistryEntries<S>>) {
    if let Some(entries) = entries.upgrade() {
        entries.touch();
    }
}

// Subscriptions deliver the current value right away; only later calls
// are changes.
fn watch_box<S: Clone + 'static>(
    media_box: &MediaBox<S>,
    entries: WeakStore<RegistryEntries<S>>,
) -> Subscription {
    let stream_watch: RefCell<Option<Subscription>> = RefCell::new(None);
    let primed = Cell::new(false);
    media_box
        .streamable()
        .subscribe(Box::new(move |streamable: &Option<Streamable<S>>| {
            let next = streamable
                .as_ref()
                .and_then(|streamable| streamable.media.video_stream())
                .map(|raw| watch_raw_stream(raw, entries.clone()));
            let previous = stream_watch.replace(next);
            drop(previous);
            if primed.replace(true) {
                touch(&entries);
            }
        }))
}

fn watch_raw_stream<S: Clone + 'static>(
    raw: &Store<Option<S>>,
    entries: WeakStore<RegistryEntries<S>>,
) -> Subscription {
    let primed = Cell::new(false);
    raw.subscribe(Box::new(move |_: &Option<S>| {
        if primed.replace(true) {
            touch(&entries);
        }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::memory::LocalMediaStream;
    use crate::media::StreamMedia;

    #[test]
    fn mutations_notify_subscribers() {
        let registry: StreamRegistry<LocalMediaStream> = StreamRegistry::new();
        let notified = Rc::new(Cell::new(0));
        let counter = notified.clone();
        let _sub = registry.subscribe(Box::new(move |_: &RegistryEntries<LocalMediaStream>| {
            counter.set(counter.get() + 1)
        }));
        assert_eq!(notified.get(), 1);

        registry.insert("room_1", MediaBox::new(None));
        registry.insert("room_2", MediaBox::new(None));
        registry.refresh();
        assert!(registry.remove("room_1").is_some());
        assert_eq!(notified.get(), 5);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn changes_inside_a_box_notify_subscribers() {
        let registry: StreamRegistry<LocalMediaStream> = StreamRegistry::new();
        let media = StreamMedia::webrtc(Some(LocalMediaStream::with_video(&["t1"])));
        let raw = media.video_stream().cloned().unwrap();
        let media_box = MediaBox::new(Some(Streamable::new(media)));
        registry.insert("room_1", media_box.clone());

        let notified = Rc::new(Cell::new(0));
        let counter = notified.clone();
        let _sub = registry.subscribe(Box::new(move |_: &RegistryEntries<LocalMediaStream>| {
            counter.set(counter.get() + 1)
        }));
        assert_eq!(notified.get(), 1);

        raw.set(Some(LocalMediaStream::with_video(&["t2"])));
        assert_eq!(notified.get(), 2);

        // The old raw store is no longer watched once the media changes.
        media_box.set_streamable(Some(Streamable::new(StreamMedia::livekit(None))));
        assert_eq!(notified.get(), 3);
        raw.set(None);
        assert_eq!(notified.get(), 3);

        media_box.set_streamable(None);
        assert_eq!(notified.get(), 4);
    }

    #[test]
    fn removed_box_is_no_longer_watched() {
        let registry: StreamRegistry<LocalMediaStream> = StreamRegistry::new();
        let media_box = MediaBox::new(None);
        registry.insert("room_1", media_box.clone());
        assert_eq!(media_box.streamable().subscriber_count(), 1);

        // Replacing the box under the same key swaps the watcher.
        registry.insert("room_1", media_box.clone());
        assert_eq!(media_box.streamable().subscriber_count(), 1);

        registry.remove("room_1");
        assert_eq!(media_box.streamable().subscriber_count(), 0);

        let notified = Rc::new(Cell::new(0));
        let counter = notified.clone();
        let _sub = registry.subscribe(Box::new(move |_: &RegistryEntries<LocalMediaStream>| {
            counter.set(counter.get() + 1)
        }));
        media_box.set_streamable(None);
        assert_eq!(notified.get(), 1);
    }

    #[test]
    fn removing_missing_key_returns_none() {
        let registry: StreamRegistry<LocalMediaStream> = StreamRegistry::new();
        assert!(registry.remove("nobody_1").is_none());
        assert!(registry.is_empty());
    }
}

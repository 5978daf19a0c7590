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

//! Per-participant memo of the last video-only stream handed to an avatar.
//!
//! Every new stream object makes the video element restart playback, which
//! shows up as a flash on screen. The cache hands back the previous object
//! for as long as the raw stream's video track ids stay the same, in the
//! same order.

use crate::media::{MediaStream, MediaTrack};
use crate::participant::ParticipantId;
use log::warn;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// Last stream built for one participant, and the track ids it was built from.
///
/// `stream` is only ever `Some` with a non-empty `track_ids`.
#[derive(Debug)]
pub struct CacheEntry<S> {
    pub stream: Option<S>,
    pub track_ids: Vec<String>,
}

impl<S> Default for CacheEntry<S> {
    fn default() -> Self {
        Self {
            stream: None,
            track_ids: Vec::new(),
        }
    }
}

/// What a [`CacheEntry::refresh`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheOutcome {
    /// Track ids unchanged; the cached stream object was kept.
    Reused,
    /// A new video-only stream was built.
    Rebuilt,
    /// A cached stream was dropped.
    Cleared,
    /// Nothing was cached and there is still nothing to cache.
    Empty,
}

impl<S: MediaStream> CacheEntry<S> {
    pub fn clear(&mut self) -> CacheOutcome {
        let had_stream = self.stream.take().is_some();
        self.track_ids.clear();
        if had_stream {
            CacheOutcome::Cleared
        } else {
            CacheOutcome::Empty
        }
    }

    /// Brings the entry in line with `raw`, the most recent raw stream.
    pub fn refresh(&mut self, raw: Option<&S>) -> CacheOutcome {
        let Some(raw) = raw else {
            return self.clear();
        };
        let tracks = raw.video_tracks();
        if tracks.is_empty() {
            return self.clear();
        }

        let track_ids: Vec<String> = tracks.iter().map(|t| t.id()).collect();
        if self.stream.is_some() && track_ids == self.track_ids {
            return CacheOutcome::Reused;
        }

        match S::from_video_tracks(tracks) {
            Ok(stream) => {
                self.stream = Some(stream);
                self.track_ids = track_ids;
                CacheOutcome::Rebuilt
            }
            Err(e) => {
                warn!("video avatar: {e}");
                self.clear();
                CacheOutcome::Cleared
            }
        }
    }
}

/// Applies the memoization policy to `raw` and returns the stream to show.
pub fn extract_video_only_stream<S: MediaStream>(
    raw: Option<&S>,
    entry: &mut CacheEntry<S>,
) -> Option<S> {
    entry.refresh(raw);
    entry.stream.clone()
}

/// Cache entries of every participant bound by one manager.
///
/// Clones share the same table.
pub struct StreamCacheTable<S> {
    entries: Rc<RefCell<HashMap<ParticipantId, CacheEntry<S>>>>,
}

impl<S> Clone for StreamCacheTable<S> {
    fn clone(&self) -> Self {
        Self {
            entries: self.entries.clone(),
        }
    }
}

impl<S> Default for StreamCacheTable<S> {
    fn default() -> Self {
        Self {
            entries: Rc::new(RefCell::new(HashMap::new())),
        }
    }
}

impl<S: MediaStream> StreamCacheTable<S> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty entry for `participant` if none exists.
    pub fn ensure(&self, participant: ParticipantId) {
        self.entries.borrow_mut().entry(participant).or_default();
    }

    /// Runs `f` on the entry of `participant`, creating it first if needed.
    pub fn with_entry<R>(
        &self,
        participant: ParticipantId,
        f: impl FnOnce(&mut CacheEntry<S>) -> R,
    ) -> R {
        let mut entries = self.entries.borrow_mut();
        f(entries.entry(participant).or_default())
    }

    pub fn remove(&self, participant: ParticipantId) -> bool {
        self.entries.borrow_mut().remove(&participant).is_some()
    }

    pub fn clear(&self) {
        self.entries.borrow_mut().clear();
    }

    pub fn contains(&self, participant: ParticipantId) -> bool {
        self.entries.borrow().contains_key(&participant)
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    pub fn cached_stream(&self, participant: ParticipantId) -> Option<S> {
        self.entries
            .borrow()
            .get(&participant)
            .and_then(|entry| entry.stream.clone())
    }

    pub fn track_ids(&self, participant: ParticipantId) -> Vec<String> {
        self.entries
            .borrow()
            .get(&participant)
            .map(|entry| entry.track_ids.clone())
            .unwrap_or_default()
    }
}

impl<S> std::fmt::Debug for StreamCacheTable<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamCacheTable")
            .field("entries", &self.entries.borrow().len())
            .finish()
    }
}

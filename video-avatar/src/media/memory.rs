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

//! In-process media backend.
//!
//! [`LocalMediaStream`] implements [`MediaStream`] without any browser or
//! transport underneath. Native embedders use it to drive avatars from
//! their own decoders, and the test suite uses it everywhere. Stream
//! identity is pointer identity of the shared track list, which matches the
//! object identity semantics of a browser `MediaStream`.

use super::{MediaStream, MediaTrack};
use crate::error::MediaError;
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackKind {
    Audio,
    Video,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalTrack {
    id: Rc<str>,
    kind: TrackKind,
}

impl LocalTrack {
    pub fn new(id: &str, kind: TrackKind) -> Self {
        Self {
            id: Rc::from(id),
            kind,
        }
    }

    pub fn video(id: &str) -> Self {
        Self::new(id, TrackKind::Video)
    }

    pub fn audio(id: &str) -> Self {
        Self::new(id, TrackKind::Audio)
    }

    pub fn kind(&self) -> TrackKind {
        self.kind
    }
}

impl MediaTrack for LocalTrack {
    fn id(&self) -> String {
        self.id.to_string()
    }
}

#[derive(Debug, Clone)]
pub struct LocalMediaStream {
    tracks: Rc<Vec<LocalTrack>>,
}

impl LocalMediaStream {
    pub fn new(tracks: Vec<LocalTrack>) -> Self {
        Self {
            tracks: Rc::new(tracks),
        }
    }

    /// A stream made only of video tracks with the given ids.
    pub fn with_video(ids: &[&str]) -> Self {
        Self::new(ids.iter().map(|id| LocalTrack::video(id)).collect())
    }

    pub fn tracks(&self) -> &[LocalTrack] {
        &self.tracks
    }

    pub fn audio_tracks(&self) -> Vec<LocalTrack> {
        self.tracks_of(TrackKind::Audio)
    }

    fn tracks_of(&self, kind: TrackKind) -> Vec<LocalTrack> {
        self.tracks
            .iter()
            .filter(|track| track.kind == kind)
            .cloned()
            .collect()
    }
}

impl MediaStream for LocalMediaStream {
    type Track = LocalTrack;

    fn video_tracks(&self) -> Vec<LocalTrack> {
        self.tracks_of(TrackKind::Video)
    }

    fn from_video_tracks(tracks: Vec<LocalTrack>) -> Result<Self, MediaError> {
        if let Some(track) = tracks.iter().find(|track| track.kind != TrackKind::Video) {
            return Err(MediaError::StreamConstruction(format!(
                "track {} is not a video track",
                track.id
            )));
        }
        Ok(Self::new(tracks))
    }

    fn same_stream(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.tracks, &other.tracks)
    }
}

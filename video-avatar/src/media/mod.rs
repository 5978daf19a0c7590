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

//! The media side of the avatar subsystem.
//!
//! The real-time transport is not part of this crate. It is consumed
//! through two small traits, [`MediaStream`] and [`MediaTrack`], and
//! through the [`StreamRegistry`], a reactive collection of per-connection
//! [`MediaBox`]es that the transport keeps up to date.

pub mod memory;
mod ordered_map;
mod registry;

pub use ordered_map::OrderedMap;
pub use registry::{RegistryEntries, StreamRegistry};

use crate::error::MediaError;
use crate::reactive::{Readable, Store};
use std::fmt::Debug;

/// A single media track.
pub trait MediaTrack: Clone + 'static {
    /// Identifier of the track, unique for the lifetime of the track.
    fn id(&self) -> String;
}

/// A live media stream as produced by the transport.
pub trait MediaStream: Clone + Debug + 'static {
    type Track: MediaTrack;

    /// Video tracks of the stream, in the stream's own order.
    fn video_tracks(&self) -> Vec<Self::Track>;

    /// Builds a new stream object holding exactly `tracks`.
    fn from_video_tracks(tracks: Vec<Self::Track>) -> Result<Self, MediaError>;

    /// Object identity. Two handles are the same stream only if they refer
    /// to the same underlying object, not merely to the same tracks.
    fn same_stream(&self, other: &Self) -> bool;

    fn has_video(&self) -> bool {
        !self.video_tracks().is_empty()
    }

    fn video_track_ids(&self) -> Vec<String> {
        self.video_tracks().iter().map(MediaTrack::id).collect()
    }
}

/// Tag of a [`StreamMedia`] variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaKind {
    WebRtc,
    Livekit,
    Scripting,
    DataOnly,
}

impl MediaKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::WebRtc => "webrtc",
            MediaKind::Livekit => "livekit",
            MediaKind::Scripting => "scripting",
            MediaKind::DataOnly => "data",
        }
    }

    /// Whether media of this kind may be shown as a video avatar.
    pub fn is_video_eligible(&self) -> bool {
        matches!(self, MediaKind::WebRtc | MediaKind::Livekit)
    }
}

/// Transport payload of a [`Streamable`].
pub enum StreamMedia<S> {
    /// Peer-to-peer WebRTC connection.
    WebRtc { stream: Store<Option<S>> },
    /// Stream relayed by the LiveKit SFU.
    Livekit { stream: Store<Option<S>> },
    /// Video played from a URL by a map script.
    Scripting { url: String },
    /// A connection that carries no media, only data.
    DataOnly,
}

impl<S> Clone for StreamMedia<S> {
    fn clone(&self) -> Self {
        match self {
            StreamMedia::WebRtc { stream } => StreamMedia::WebRtc {
                stream: stream.clone(),
            },
            StreamMedia::Livekit { stream } => StreamMedia::Livekit {
                stream: stream.clone(),
            },
            StreamMedia::Scripting { url } => StreamMedia::Scripting { url: url.clone() },
            StreamMedia::DataOnly => StreamMedia::DataOnly,
        }
    }
}

impl<S: Clone + 'static> StreamMedia<S> {
    pub fn webrtc(stream: Option<S>) -> Self {
        StreamMedia::WebRtc {
            stream: Store::new(stream),
        }
    }

    pub fn livekit(stream: Option<S>) -> Self {
        StreamMedia::Livekit {
            stream: Store::new(stream),
        }
    }

    pub fn kind(&self) -> MediaKind {
        match self {
            StreamMedia::WebRtc { .. } => MediaKind::WebRtc,
            StreamMedia::Livekit { .. } => MediaKind::Livekit,
            StreamMedia::Scripting { .. } => MediaKind::Scripting,
            StreamMedia::DataOnly => MediaKind::DataOnly,
        }
    }

    /// The raw stream store, for the variants that may feed a video avatar.
    pub fn video_stream(&self) -> Option<&Store<Option<S>>> {
        match self {
            StreamMedia::WebRtc { stream } | StreamMedia::Livekit { stream } => Some(stream),
            StreamMedia::Scripting { .. } | StreamMedia::DataOnly => None,
        }
    }
}

impl<S> Debug for StreamMedia<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StreamMedia::WebRtc { .. } => write!(f, "WebRtc"),
            StreamMedia::Livekit { .. } => write!(f, "Livekit"),
            StreamMedia::Scripting { url } => write!(f, "Scripting({url})"),
            StreamMedia::DataOnly => write!(f, "DataOnly"),
        }
    }
}

/// One participant's active media handle.
#[derive(Debug)]
pub struct Streamable<S> {
    pub media: StreamMedia<S>,
}

impl<S> Clone for Streamable<S> {
    fn clone(&self) -> Self {
        Self {
            media: self.media.clone(),
        }
    }
}

impl<S> Streamable<S> {
    pub fn new(media: StreamMedia<S>) -> Self {
        Self { media }
    }
}

/// Registry entry wrapping a reactive, optional [`Streamable`].
pub struct MediaBox<S> {
    streamable: Store<Option<Streamable<S>>>,
}

impl<S> Clone for MediaBox<S> {
    fn clone(&self) -> Self {
        Self {
            streamable: self.streamable.clone(),
        }
    }
}

impl<S: Clone + 'static> MediaBox<S> {
    pub fn new(streamable: Option<Streamable<S>>) -> Self {
        Self {
            streamable: Store::new(streamable),
        }
    }

    pub fn streamable(&self) -> &Store<Option<Streamable<S>>> {
        &self.streamable
    }

    pub fn set_streamable(&self, streamable: Option<Streamable<S>>) {
        self.streamable.set(streamable);
    }

    /// The raw stream this box currently carries, if its media is of a
    /// video-eligible kind.
    pub fn current_stream(&self) -> Option<S> {
        let streamable = self.streamable.get()?;
        streamable.media.video_stream()?.get()
    }
}

impl<S> Debug for MediaBox<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaBox").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::memory::{LocalMediaStream, LocalTrack};
    use super::*;

    #[test]
    fn only_webrtc_and_livekit_are_eligible() {
        assert!(MediaKind::WebRtc.is_video_eligible());
        assert!(MediaKind::Livekit.is_video_eligible());
        assert!(!MediaKind::Scripting.is_video_eligible());
        assert!(!MediaKind::DataOnly.is_video_eligible());
        assert_eq!(MediaKind::WebRtc.as_str(), "webrtc");
        assert_eq!(MediaKind::Livekit.as_str(), "livekit");
    }

    #[test]
    fn current_stream_follows_the_box() {
        let stream = LocalMediaStream::new(vec![LocalTrack::video("t1")]);
        let media_box = MediaBox::new(Some(Streamable::new(StreamMedia::webrtc(Some(
            stream.clone(),
        )))));
        let current = media_box.current_stream().expect("stream");
        assert!(current.same_stream(&stream));

        media_box.set_streamable(Some(Streamable::new(StreamMedia::Scripting {
            url: "https://example.org/intro.mp4".to_string(),
        })));
        assert!(media_box.current_stream().is_none());

        media_box.set_streamable(None);
        assert!(media_box.current_stream().is_none());
    }

    #[test]
    fn data_only_media_has_no_video_stream() {
        let media: StreamMedia<LocalMediaStream> = StreamMedia::DataOnly;
        assert_eq!(media.kind(), MediaKind::DataOnly);
        assert!(media.video_stream().is_none());
    }
}

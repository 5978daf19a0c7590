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

use crate::error::MediaError;
use crate::media::{MediaStream, MediaTrack};
use js_sys::Array;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::MediaStreamTrack;

impl MediaTrack for MediaStreamTrack {
    fn id(&self) -> String {
        MediaStreamTrack::id(self)
    }
}

impl MediaStream for web_sys::MediaStream {
    type Track = MediaStreamTrack;

    fn video_tracks(&self) -> Vec<MediaStreamTrack> {
        self.get_video_tracks()
            .iter()
            .filter_map(|track| track.dyn_into::<MediaStreamTrack>().ok())
            .collect()
    }

    fn from_video_tracks(tracks: Vec<MediaStreamTrack>) -> Result<Self, MediaError> {
        let js_tracks = Array::new();
        for track in &tracks {
            js_tracks.push(track);
        }
        web_sys::MediaStream::new_with_tracks(&js_tracks)
            .map_err(|e| MediaError::StreamConstruction(format!("{e:?}")))
    }

    fn same_stream(&self, other: &Self) -> bool {
        let this: &JsValue = self.as_ref();
        let that: &JsValue = other.as_ref();
        this == that
    }
}

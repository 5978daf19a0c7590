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

//! Recording fakes shared by the integration tests.

#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;
use video_avatar::media::memory::LocalMediaStream;
use video_avatar::{
    AvatarGeometry, AvatarScene, MediaBox, MediaStream, PlaybackError, StreamMedia, Streamable,
    VisualError, VisualHost,
};

/// Everything a [`RecordingHost`] was asked to do.
#[derive(Debug, Default)]
pub struct HostLog {
    pub source: Option<LocalMediaStream>,
    pub set_source_calls: usize,
    pub visible: bool,
    pub mirrored: bool,
    pub play_calls: usize,
    pub release_calls: usize,
    pub geometry: Option<AvatarGeometry>,
}

impl HostLog {
    pub fn source_track_ids(&self) -> Option<Vec<String>> {
        self.source.as_ref().map(|s| s.video_track_ids())
    }
}

pub struct RecordingHost {
    pub log: Rc<RefCell<HostLog>>,
    pub fail_play: bool,
}

impl RecordingHost {
    pub fn new(fail_play: bool) -> (Self, Rc<RefCell<HostLog>>) {
        let log = Rc::new(RefCell::new(HostLog::default()));
        (
            Self {
                log: log.clone(),
                fail_play,
            },
            log,
        )
    }
}

impl VisualHost<LocalMediaStream> for RecordingHost {
    fn set_source(&mut self, stream: Option<&LocalMediaStream>) {
        let mut log = self.log.borrow_mut();
        log.source = stream.cloned();
        log.set_source_calls += 1;
    }

    fn set_visible(&mut self, visible: bool) {
        self.log.borrow_mut().visible = visible;
    }

    fn set_mirrored(&mut self, mirrored: bool) {
        self.log.borrow_mut().mirrored = mirrored;
    }

    fn play(&mut self) -> Result<(), PlaybackError> {
        self.log.borrow_mut().play_calls += 1;
        if self.fail_play {
            Err(PlaybackError::Rejected("NotAllowedError".to_string()))
        } else {
            Ok(())
        }
    }

    fn release(&mut self) {
        self.log.borrow_mut().release_calls += 1;
    }
}

/// Scene whose hosts all report into logs the test can inspect.
#[derive(Clone, Default)]
pub struct RecordingScene {
    pub hosts: Rc<RefCell<Vec<Rc<RefCell<HostLog>>>>>,
    pub fail_create: bool,
}

impl RecordingScene {
    pub fn failing() -> Self {
        Self {
            fail_create: true,
            ..Self::default()
        }
    }

    pub fn host_count(&self) -> usize {
        self.hosts.borrow().len()
    }

    pub fn last_host(&self) -> Rc<RefCell<HostLog>> {
        self.hosts.borrow().last().cloned().expect("no host created")
    }
}

impl AvatarScene<LocalMediaStream> for RecordingScene {
    type Host = RecordingHost;

    fn create_host(&self, geometry: &AvatarGeometry) -> Result<RecordingHost, VisualError> {
        if self.fail_create {
            return Err(VisualError::HostCreation("scene is gone".to_string()));
        }
        let (host, log) = RecordingHost::new(false);
        log.borrow_mut().geometry = Some(*geometry);
        self.hosts.borrow_mut().push(log);
        Ok(host)
    }
}

/// A registry entry carrying a WebRTC stream with the given video tracks,
/// and a handle to that entry's raw stream store.
pub fn webrtc_box(
    ids: &[&str],
) -> (
    MediaBox<LocalMediaStream>,
    video_avatar::Store<Option<LocalMediaStream>>,
) {
    let media = StreamMedia::webrtc(Some(LocalMediaStream::with_video(ids)));
    let store = media
        .video_stream()
        .cloned()
        .expect("webrtc media carries a stream");
    (MediaBox::new(Some(Streamable::new(media))), store)
}

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

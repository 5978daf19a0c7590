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

//! Integration tests for AvatarVisual's state machine.

mod common;

use common::{RecordingHost, RecordingScene};
use video_avatar::media::memory::{LocalMediaStream, LocalTrack};
use video_avatar::{AvatarVisual, VisualState};

type Visual = AvatarVisual<LocalMediaStream, RecordingHost>;

fn visual(fail_play: bool) -> (Visual, std::rc::Rc<std::cell::RefCell<common::HostLog>>) {
    let (host, log) = RecordingHost::new(fail_play);
    (AvatarVisual::from_host(host, false), log)
}

#[test]
fn test_new_visual_is_hidden_and_uninitialized() {
    let scene = RecordingScene::default();
    let visual: Visual = AvatarVisual::new(&scene, true).unwrap();
    assert_eq!(visual.state(), VisualState::Uninitialized);
    assert!(!visual.is_visible());
    assert!(visual.is_mirrored());
    let log = scene.last_host();
    assert!(!log.borrow().visible);
    assert!(log.borrow().mirrored);
}

#[test]
fn test_set_stream_binds_shows_and_plays() {
    let (mut visual, log) = visual(false);
    visual.set_stream(Some(LocalMediaStream::with_video(&["t1"])));

    assert_eq!(visual.state(), VisualState::Active);
    assert!(visual.has_active_stream());
    assert!(visual.is_visible());
    assert_eq!(log.borrow().set_source_calls, 1);
    assert_eq!(log.borrow().play_calls, 1);
    assert!(log.borrow().visible);
}

#[test]
fn test_same_stream_object_is_not_rebound() {
    let (mut visual, log) = visual(false);
    let stream = LocalMediaStream::with_video(&["t1"]);
    visual.set_stream(Some(stream.clone()));
    visual.set_stream(Some(stream));
    assert_eq!(log.borrow().set_source_calls, 1);
    assert_eq!(log.borrow().play_calls, 1);
}

#[test]
fn test_stream_without_video_hides() {
    let (mut visual, log) = visual(false);
    visual.set_stream(Some(LocalMediaStream::with_video(&["t1"])));
    visual.set_stream(Some(LocalMediaStream::new(vec![LocalTrack::audio("a1")])));

    assert!(!visual.has_active_stream());
    assert!(!visual.is_visible());
    assert!(log.borrow().source.is_none());
    assert!(!log.borrow().visible);

    visual.set_stream(None);
    assert!(!visual.is_visible());
    assert_eq!(visual.state(), VisualState::Active);
}

#[test]
fn test_playback_failure_is_not_fatal() {
    let (mut visual, log) = visual(true);
    visual.set_stream(Some(LocalMediaStream::with_video(&["t1"])));

    assert_eq!(log.borrow().play_calls, 1);
    assert!(visual.has_active_stream());
    assert!(visual.is_visible());
    assert_eq!(visual.state(), VisualState::Active);

    visual.set_stream(Some(LocalMediaStream::with_video(&["t2"])));
    assert_eq!(log.borrow().play_calls, 2);
}

#[test]
fn test_set_visible_requires_a_stream() {
    let (mut visual, log) = visual(false);
    visual.set_visible(true);
    assert!(!visual.is_visible());
    assert!(!log.borrow().visible);

    visual.set_stream(Some(LocalMediaStream::with_video(&["t1"])));
    visual.set_visible(false);
    assert!(!visual.is_visible());
    visual.set_visible(true);
    assert!(visual.is_visible());
    assert!(log.borrow().visible);
}

#[test]
fn test_set_flip_x() {
    let (mut visual, log) = visual(false);
    assert!(!log.borrow().mirrored);
    visual.set_flip_x(true);
    assert!(visual.is_mirrored());
    assert!(log.borrow().mirrored);
}

#[test]
fn test_destroy_twice_then_set_stream() {
    let (mut visual, log) = visual(false);
    visual.set_stream(Some(LocalMediaStream::with_video(&["t1"])));

    visual.destroy();
    visual.destroy();
    visual.set_stream(Some(LocalMediaStream::with_video(&["t2"])));
    visual.set_visible(true);
    visual.set_flip_x(true);

    assert!(visual.is_destroyed());
    assert_eq!(visual.state(), VisualState::Destroyed);
    assert!(!visual.has_active_stream());
    assert_eq!(log.borrow().release_calls, 1);
    assert!(log.borrow().source.is_none());
    assert!(!log.borrow().mirrored);

    drop(visual);
    assert_eq!(log.borrow().release_calls, 1);
}

#[test]
fn test_destroy_from_uninitialized() {
    let (mut visual, log) = visual(false);
    visual.destroy();
    assert_eq!(visual.state(), VisualState::Destroyed);
    assert_eq!(log.borrow().release_calls, 1);
}

#[test]
fn test_drop_releases_once() {
    let (visual, log) = visual(false);
    drop(visual);
    assert_eq!(log.borrow().release_calls, 1);
}

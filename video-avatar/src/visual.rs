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

//! The circular video avatar drawn over a participant.
//!
//! The rendering side is reached through two traits. An [`AvatarScene`]
//! creates one [`VisualHost`] per avatar, already attached to the
//! participant's on-map node so it follows the participant without any
//! per-frame work here. [`AvatarVisual`] drives its host: it binds and
//! unbinds the playback source, shows and hides the circle, and releases
//! everything exactly once.

use crate::config::AvatarConfig;
use crate::constants::{
    VIDEO_AVATAR_OFFSET_X, VIDEO_AVATAR_OFFSET_Y, VIDEO_AVATAR_ORIGIN, VIDEO_AVATAR_SIZE,
};
use crate::error::{PlaybackError, VisualError};
use crate::event_bus::emit_avatar_event;
use crate::events::AvatarEvent;
use crate::media::MediaStream;
use log::{debug, warn};

/// Placement and size of an avatar host, in the participant node's local
/// coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AvatarGeometry {
    pub size: u32,
    pub offset_x: f64,
    pub offset_y: f64,
    pub origin: (f64, f64),
    pub circular: bool,
}

impl Default for AvatarGeometry {
    fn default() -> Self {
        Self {
            size: VIDEO_AVATAR_SIZE,
            offset_x: VIDEO_AVATAR_OFFSET_X,
            offset_y: VIDEO_AVATAR_OFFSET_Y,
            origin: VIDEO_AVATAR_ORIGIN,
            circular: true,
        }
    }
}

impl From<&AvatarConfig> for AvatarGeometry {
    fn from(config: &AvatarConfig) -> Self {
        Self {
            size: config.size,
            offset_x: config.offset_x,
            offset_y: config.offset_y,
            ..Self::default()
        }
    }
}

/// The positioned visual element an [`AvatarVisual`] renders into.
pub trait VisualHost<S> {
    /// Binds `stream` as the playback source, or unbinds it.
    fn set_source(&mut self, stream: Option<&S>);

    fn set_visible(&mut self, visible: bool);

    fn set_mirrored(&mut self, mirrored: bool);

    /// Asks the runtime to start playback of the bound source.
    ///
    /// Hosts whose runtime answers asynchronously report a late refusal
    /// themselves; the returned error covers an immediate refusal only.
    fn play(&mut self) -> Result<(), PlaybackError>;

    /// Releases every resource owned by the host.
    fn release(&mut self);
}

/// Creates hosts on the rendering scene.
pub trait AvatarScene<S> {
    type Host: VisualHost<S>;

    fn create_host(&self, geometry: &AvatarGeometry) -> Result<Self::Host, VisualError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisualState {
    /// Created, no stream set yet.
    Uninitialized,
    Active,
    /// Terminal; every further call is a no-op.
    Destroyed,
}

/// A circular video avatar attached to one participant.
pub struct AvatarVisual<S: MediaStream, H: VisualHost<S>> {
    host: H,
    stream: Option<S>,
    mirrored: bool,
    visible: bool,
    state: VisualState,
}

impl<S: MediaStream, H: VisualHost<S>> AvatarVisual<S, H> {
    /// Creates a hidden avatar with the standard geometry.
    ///
    /// `flip_x` mirrors the picture; only the local self view wants that.
    pub fn new<Sc>(scene: &Sc, flip_x: bool) -> Result<Self, VisualError>
    where
        Sc: AvatarScene<S, Host = H>,
    {
        Self::with_geometry(scene, &AvatarGeometry::default(), flip_x)
    }

    pub fn with_geometry<Sc>(
        scene: &Sc,
        geometry: &AvatarGeometry,
        flip_x: bool,
    ) -> Result<Self, VisualError>
    where
        Sc: AvatarScene<S, Host = H>,
    {
        let host = scene.create_host(geometry)?;
        Ok(Self::from_host(host, flip_x))
    }

    pub fn from_host(mut host: H, flip_x: bool) -> Self {
        host.set_mirrored(flip_x);
        host.set_visible(false);
        Self {
            host,
            stream: None,
            mirrored: flip_x,
            visible: false,
            state: VisualState::Uninitialized,
        }
    }

    /// Shows `stream`, or hides the avatar when there is no video to show.
    pub fn set_stream(&mut self, stream: Option<S>) {
        if self.state == VisualState::Destroyed {
            return;
        }
        self.state = VisualState::Active;

        let unchanged = match (&self.stream, &stream) {
            (Some(current), Some(next)) => current.same_stream(next),
            _ => false,
        };
        self.stream = stream;

        match self.stream.as_ref().filter(|s| s.has_video()) {
            Some(stream) => {
                if !unchanged || !self.visible {
                    // Rebinding the same object would restart playback.
                    if !unchanged {
                        self.host.set_source(Some(stream));
                    }
                    self.host.set_visible(true);
                    self.visible = true;
                    if let Err(e) = self.host.play() {
                        warn!("video avatar: failed to play video: {e}");
                        emit_avatar_event(AvatarEvent::PlaybackFailed(e.to_string()));
                    }
                }
            }
            None => {
                self.host.set_source(None);
                self.host.set_visible(false);
                self.visible = false;
            }
        }
    }

    /// Shows or hides the avatar; it is only ever shown with a stream bound.
    pub fn set_visible(&mut self, visible: bool) {
        if self.state == VisualState::Destroyed {
            return;
        }
        let effective = visible && self.has_active_stream();
        self.host.set_visible(effective);
        self.visible = effective;
    }

    pub fn set_flip_x(&mut self, flip: bool) {
        if self.state == VisualState::Destroyed {
            return;
        }
        self.mirrored = flip;
        self.host.set_mirrored(flip);
    }

    pub fn has_active_stream(&self) -> bool {
        self.stream.as_ref().is_some_and(|s| s.has_video())
    }

    pub fn stream(&self) -> Option<&S> {
        self.stream.as_ref()
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn is_mirrored(&self) -> bool {
        self.mirrored
    }

    pub fn state(&self) -> VisualState {
        self.state
    }

    pub fn is_destroyed(&self) -> bool {
        self.state == VisualState::Destroyed
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    /// Unbinds the stream and releases the host. Safe to call repeatedly.
    pub fn destroy(&mut self) {
        if self.state == VisualState::Destroyed {
            return;
        }
        debug!("video avatar destroyed");
        self.state = VisualState::Destroyed;
        self.stream = None;
        self.visible = false;
        self.host.set_source(None);
        self.host.release();
    }
}

impl<S: MediaStream, H: VisualHost<S>> Drop for AvatarVisual<S, H> {
    fn drop(&mut self) {
        self.destroy();
    }
}

impl<S: MediaStream, H: VisualHost<S>> std::fmt::Debug for AvatarVisual<S, H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AvatarVisual")
            .field("state", &self.state)
            .field("visible", &self.visible)
            .field("mirrored", &self.mirrored)
            .field("stream", &self.stream)
            .finish()
    }
}

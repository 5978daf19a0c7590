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

//! DOM rendering of video avatars.
//!
//! Each host is a circular `<div>` holding a muted inline `<video>`,
//! appended to the participant's on-map element and positioned relative
//! to its center, so it moves with the participant for free.

use crate::constants::{
    VIDEO_AVATAR_BACKGROUND, VIDEO_AVATAR_BORDER_COLOR, VIDEO_AVATAR_BORDER_PX,
    VIDEO_AVATAR_SHADOW,
};
use crate::error::{PlaybackError, VisualError};
use crate::event_bus::emit_avatar_event;
use crate::events::AvatarEvent;
use crate::visual::{AvatarGeometry, AvatarScene, VisualHost};
use anyhow::{anyhow, Context};
use log::warn;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{Document, Element, HtmlDivElement, HtmlElement, HtmlVideoElement, MediaStream};

fn js_error(e: JsValue) -> anyhow::Error {
    anyhow!("{e:?}")
}

fn set_styles(element: &HtmlElement, styles: &[(&str, &str)]) -> anyhow::Result<()> {
    let style = element.style();
    for (name, value) in styles {
        style
            .set_property(name, value)
            .map_err(js_error)
            .with_context(|| format!("setting {name}"))?;
    }
    Ok(())
}

/// Creates avatar hosts under a participant's on-map element.
#[derive(Debug, Clone)]
pub struct DomAvatarScene {
    parent: Element,
}

impl DomAvatarScene {
    pub fn new(parent: Element) -> Self {
        Self { parent }
    }

    /// Looks up the participant's element by id.
    pub fn from_element_id(id: &str) -> anyhow::Result<Self> {
        let parent = document()?
            .get_element_by_id(id)
            .ok_or_else(|| anyhow!("no element found with ID: {id}"))?;
        Ok(Self::new(parent))
    }

    fn build_host(&self, geometry: &AvatarGeometry) -> anyhow::Result<DomAvatarHost> {
        let document = document()?;

        let container = document
            .create_element("div")
            .map_err(js_error)?
            .dyn_into::<HtmlDivElement>()
            .map_err(|_| anyhow!("created element is not a div"))?;
        let size = format!("{}px", geometry.size);
        let left = format!("calc(50% + {}px)", geometry.offset_x);
        let top = format!("calc(50% + {}px)", geometry.offset_y);
        let anchor = format!(
            "translate(-{}%, -{}%)",
            geometry.origin.0 * 100.0,
            geometry.origin.1 * 100.0
        );
        let border = format!("{VIDEO_AVATAR_BORDER_PX}px solid {VIDEO_AVATAR_BORDER_COLOR}");
        let radius = if geometry.circular { "50%" } else { "0" };
        set_styles(
            &container,
            &[
                ("position", "absolute"),
                ("left", left.as_str()),
                ("top", top.as_str()),
                ("transform", anchor.as_str()),
                ("width", size.as_str()),
                ("height", size.as_str()),
                ("border-radius", radius),
                ("overflow", "hidden"),
                ("border", border.as_str()),
                ("box-shadow", VIDEO_AVATAR_SHADOW),
                ("background", VIDEO_AVATAR_BACKGROUND),
                ("pointer-events", "none"),
                ("display", "none"),
            ],
        )?;

        let video = document
            .create_element("video")
            .map_err(js_error)?
            .dyn_into::<HtmlVideoElement>()
            .map_err(|_| anyhow!("created element is not a video"))?;
        video.set_autoplay(true);
        video.set_muted(true);
        // Required for inline playback on iOS.
        video
            .set_attribute("playsinline", "true")
            .map_err(js_error)?;
        set_styles(
            &video,
            &[
                ("width", "100%"),
                ("height", "100%"),
                ("object-fit", "cover"),
            ],
        )?;

        container.append_child(&video).map_err(js_error)?;
        self.parent.append_child(&container).map_err(js_error)?;

        Ok(DomAvatarHost {
            container,
            video,
            released: false,
        })
    }
}

fn document() -> anyhow::Result<Document> {
    web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| anyhow!("document not available"))
}

impl AvatarScene<MediaStream> for DomAvatarScene {
    type Host = DomAvatarHost;

    fn create_host(&self, geometry: &AvatarGeometry) -> Result<DomAvatarHost, VisualError> {
        self.build_host(geometry)
            .map_err(|e| VisualError::HostCreation(format!("{e:#}")))
    }
}

/// A circular `<div>` + `<video>` pair in the document.
#[derive(Debug)]
pub struct DomAvatarHost {
    container: HtmlDivElement,
    video: HtmlVideoElement,
    released: bool,
}

impl DomAvatarHost {
    pub fn video_element(&self) -> &HtmlVideoElement {
        &self.video
    }

    fn set_style(element: &HtmlElement, name: &str, value: &str) {
        if let Err(e) = element.style().set_property(name, value) {
            warn!("video avatar: failed to set {name}: {e:?}");
        }
    }
}

impl VisualHost<MediaStream> for DomAvatarHost {
    fn set_source(&mut self, stream: Option<&MediaStream>) {
        if self.released {
            return;
        }
        self.video.set_src_object(stream);
    }

    fn set_visible(&mut self, visible: bool) {
        if self.released {
            return;
        }
        Self::set_style(&self.container, "display", if visible { "block" } else { "none" });
    }

    fn set_mirrored(&mut self, mirrored: bool) {
        if self.released {
            return;
        }
        Self::set_style(
            &self.video,
            "transform",
            if mirrored { "scaleX(-1)" } else { "none" },
        );
    }

    fn play(&mut self) -> Result<(), PlaybackError> {
        if self.released || self.video.src_object().is_none() {
            return Err(PlaybackError::NoSource);
        }
        let promise = self
            .video
            .play()
            .map_err(|e| PlaybackError::Rejected(format!("{e:?}")))?;
        // Autoplay policies reject the promise later, not the call.
        wasm_bindgen_futures::spawn_local(async move {
            if let Err(e) = JsFuture::from(promise).await {
                let error = PlaybackError::Rejected(format!("{e:?}"));
                warn!("video avatar: failed to play video: {error}");
                emit_avatar_event(AvatarEvent::PlaybackFailed(error.to_string()));
            }
        });
        Ok(())
    }

    fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        self.video.set_src_object(None);
        self.container.remove();
    }
}

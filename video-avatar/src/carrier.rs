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

use crate::media::MediaStream;
use crate::participant::ParticipantId;
use crate::reactive::{Derived, Readable, Subscription};
use crate::visual::{AvatarGeometry, AvatarScene, AvatarVisual};
use log::warn;
use std::cell::RefCell;
use std::rc::Rc;

/// The on-map representation of a participant that can wear a video avatar.
pub trait AvatarCarrier<S> {
    fn participant_id(&self) -> ParticipantId;

    /// Starts showing `stream` on this participant. The returned handle
    /// keeps the avatar fed; dropping it freezes the avatar on its last
    /// value.
    fn enable_video_avatar(&self, stream: Derived<Option<S>>, mirrored: bool) -> Subscription;

    /// Tears the avatar down.
    fn disable_video_avatar(&self);
}

type VisualSlot<S, Sc> = Rc<RefCell<Option<AvatarVisual<S, <Sc as AvatarScene<S>>::Host>>>>;

/// Stock [`AvatarCarrier`] owning at most one [`AvatarVisual`].
pub struct ParticipantAvatar<S: MediaStream, Sc: AvatarScene<S>> {
    id: ParticipantId,
    scene: Sc,
    geometry: AvatarGeometry,
    visual: VisualSlot<S, Sc>,
}

impl<S: MediaStream, Sc: AvatarScene<S>> ParticipantAvatar<S, Sc>
where
    Sc::Host: 'static,
{
    pub fn new(id: ParticipantId, scene: Sc) -> Self {
        Self::with_geometry(id, scene, AvatarGeometry::default())
    }

    pub fn with_geometry(id: ParticipantId, scene: Sc, geometry: AvatarGeometry) -> Self {
        Self {
            id,
            scene,
            geometry,
            visual: Rc::new(RefCell::new(None)),
        }
    }

    pub fn has_visual(&self) -> bool {
        self.visual.borrow().is_some()
    }

    pub fn has_active_stream(&self) -> bool {
        self.visual
            .borrow()
            .as_ref()
            .is_some_and(AvatarVisual::has_active_stream)
    }

    /// Hides or re-shows the avatar, e.g. when the participant leaves the
    /// camera's view.
    pub fn set_visible(&self, visible: bool) {
        if let Some(visual) = self.visual.borrow_mut().as_mut() {
            visual.set_visible(visible);
        }
    }

    /// Runs `f` on the current visual, if any.
    pub fn with_visual<R>(&self, f: impl FnOnce(&AvatarVisual<S, Sc::Host>) -> R) -> Option<R> {
        self.visual.borrow().as_ref().map(f)
    }
}

impl<S: MediaStream, Sc: AvatarScene<S>> AvatarCarrier<S> for ParticipantAvatar<S, Sc>
where
    Sc::Host: 'static,
{
    fn participant_id(&self) -> ParticipantId {
        self.id
    }

    fn enable_video_avatar(&self, stream: Derived<Option<S>>, mirrored: bool) -> Subscription {
        {
            let mut slot = self.visual.borrow_mut();
            match slot.as_mut() {
                Some(visual) => visual.set_flip_x(mirrored),
                None => {
                    match AvatarVisual::with_geometry(&self.scene, &self.geometry, mirrored) {
                        Ok(visual) => *slot = Some(visual),
                        Err(e) => {
                            warn!("participant {}: no video avatar: {e}", self.id);
                            return Subscription::noop();
                        }
                    }
                }
            }
        }

        let slot = Rc::downgrade(&self.visual);
        stream.subscribe(Box::new(move |value: &Option<S>| {
            if let Some(slot) = slot.upgrade() {
                if let Some(visual) = slot.borrow_mut().as_mut() {
                    visual.set_stream(value.clone());
                }
            }
        }))
    }

    fn disable_video_avatar(&self) {
        let visual = self.visual.borrow_mut().take();
        if let Some(mut visual) = visual {
            visual.destroy();
        }
    }
}

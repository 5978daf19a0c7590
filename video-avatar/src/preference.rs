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

//! The user's "show video avatars" preference.
//!
//! The flag lives in a [`Store`] so derivations can observe it, and is
//! written through to a [`PreferenceStorage`] so it survives restarts.
//! When storage has no value the flag defaults to enabled.

use crate::config::AvatarConfig;
use crate::constants::VIDEO_AVATAR_ENABLED_BY_DEFAULT;
use crate::error::PreferenceError;
use crate::event_bus::emit_avatar_event;
use crate::events::AvatarEvent;
use crate::reactive::{Readable, Store, Subscription};
use log::{info, warn};
use std::cell::Cell;
use std::rc::Rc;

/// Durable storage for the preference.
pub trait PreferenceStorage {
    fn video_avatar_enabled(&self) -> Option<bool>;
    fn set_video_avatar_enabled(&self, enabled: bool) -> Result<(), PreferenceError>;
}

/// Storage kept in memory only; clones share the same value.
#[derive(Debug, Clone, Default)]
pub struct MemoryPreferenceStorage {
    value: Rc<Cell<Option<bool>>>,
}

impl MemoryPreferenceStorage {
    pub fn new(initial: Option<bool>) -> Self {
        Self {
            value: Rc::new(Cell::new(initial)),
        }
    }
}

impl PreferenceStorage for MemoryPreferenceStorage {
    fn video_avatar_enabled(&self) -> Option<bool> {
        self.value.get()
    }

    fn set_video_avatar_enabled(&self, enabled: bool) -> Result<(), PreferenceError> {
        self.value.set(Some(enabled));
        Ok(())
    }
}

/// Reactive, persisted on/off switch for video avatars.
#[derive(Clone)]
pub struct VideoAvatarPreference {
    enabled: Store<bool>,
    storage: Rc<dyn PreferenceStorage>,
    default: bool,
}

impl VideoAvatarPreference {
    pub fn new(storage: Rc<dyn PreferenceStorage>) -> Self {
        Self::with_default(storage, VIDEO_AVATAR_ENABLED_BY_DEFAULT)
    }

    /// Like [`new`](Self::new), with an explicit value for the case where
    /// storage holds nothing.
    pub fn with_default(storage: Rc<dyn PreferenceStorage>, default: bool) -> Self {
        let initial = storage.video_avatar_enabled().unwrap_or(default);
        Self {
            enabled: Store::new(initial),
            storage,
            default,
        }
    }

    pub fn from_config(storage: Rc<dyn PreferenceStorage>, config: &AvatarConfig) -> Self {
        Self::with_default(storage, config.enabled_by_default)
    }

    /// A preference backed by [`MemoryPreferenceStorage`].
    pub fn in_memory(initial: Option<bool>) -> Self {
        Self::new(Rc::new(MemoryPreferenceStorage::new(initial)))
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.get()
    }

    pub fn enable(&self) {
        self.set(true);
    }

    pub fn disable(&self) {
        self.set(false);
    }

    /// Flips the stored value (not the in-memory one), treating a missing
    /// stored value as the default.
    pub fn toggle(&self) -> bool {
        let current = self.storage.video_avatar_enabled().unwrap_or(self.default);
        let next = !current;
        self.set(next);
        next
    }

    fn set(&self, enabled: bool) {
        info!("video avatars {}", if enabled { "enabled" } else { "disabled" });
        self.enabled.set(enabled);
        if let Err(e) = self.storage.set_video_avatar_enabled(enabled) {
            warn!("video avatar preference not persisted: {e}");
        }
        emit_avatar_event(AvatarEvent::PreferenceChanged(enabled));
    }
}

impl Readable<bool> for VideoAvatarPreference {
    fn get(&self) -> bool {
        self.enabled.get()
    }

    fn subscribe(&self, callback: Box<dyn Fn(&bool)>) -> Subscription {
        self.enabled.subscribe(callback)
    }
}

impl std::fmt::Debug for VideoAvatarPreference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VideoAvatarPreference")
            .field("enabled", &self.enabled.get())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    struct ReadOnlyStorage;

    impl PreferenceStorage for ReadOnlyStorage {
        fn video_avatar_enabled(&self) -> Option<bool> {
            Some(false)
        }

        fn set_video_avatar_enabled(&self, _enabled: bool) -> Result<(), PreferenceError> {
            Err(PreferenceError::Unavailable)
        }
    }

    #[test]
    fn defaults_to_enabled() {
        assert!(VideoAvatarPreference::in_memory(None).is_enabled());
        assert!(!VideoAvatarPreference::in_memory(Some(false)).is_enabled());
    }

    #[test]
    fn writes_through_to_storage() {
        let storage = MemoryPreferenceStorage::new(None);
        let preference = VideoAvatarPreference::new(Rc::new(storage.clone()));
        preference.disable();
        assert_eq!(storage.video_avatar_enabled(), Some(false));
        preference.enable();
        assert_eq!(storage.video_avatar_enabled(), Some(true));
    }

    #[test]
    fn toggle_flips_stored_value() {
        let storage = MemoryPreferenceStorage::new(None);
        let preference = VideoAvatarPreference::new(Rc::new(storage.clone()));
        assert!(!preference.toggle());
        assert_eq!(storage.video_avatar_enabled(), Some(false));
        assert!(preference.toggle());
        assert!(preference.is_enabled());
    }

    #[test]
    fn storage_failure_still_updates_flag() {
        let preference = VideoAvatarPreference::new(Rc::new(ReadOnlyStorage));
        assert!(!preference.is_enabled());
        preference.enable();
        assert!(preference.is_enabled());
    }

    #[test]
    fn config_default_applies_only_without_stored_value() {
        let config = AvatarConfig {
            enabled_by_default: false,
            ..AvatarConfig::default()
        };
        let empty = MemoryPreferenceStorage::new(None);
        assert!(!VideoAvatarPreference::from_config(Rc::new(empty), &config).is_enabled());
        let stored = MemoryPreferenceStorage::new(Some(true));
        assert!(VideoAvatarPreference::from_config(Rc::new(stored), &config).is_enabled());
    }

    #[test]
    fn subscribers_see_changes() {
        let preference = VideoAvatarPreference::in_memory(None);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        let _sub = preference.subscribe(Box::new(move |v: &bool| sink.borrow_mut().push(*v)));
        preference.disable();
        preference.enable();
        assert_eq!(*seen.borrow(), vec![true, false, true]);
    }
}

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

//! Browser bindings.
//!
//! Implements the media traits for `web_sys::MediaStream`, a DOM based
//! [`AvatarScene`](crate::visual::AvatarScene) and a `localStorage` backed
//! preference store.

mod dom_host;
mod media;
mod storage;

pub use dom_host::{DomAvatarHost, DomAvatarScene};
pub use storage::LocalStoragePreferences;

/// Routes `log` output to the browser console and installs the panic hook.
///
/// Safe to call more than once; only the first call installs the logger.
pub fn init_logging(level: log::Level) {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(level).is_err() {
        log::debug!("logger already installed");
    }
}

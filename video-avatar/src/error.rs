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

//! Error types.
//!
//! None of these ever escape into the reactive graph: a failure inside a
//! derivation degrades to "no stream", and a failed playback start is
//! logged and otherwise ignored.

use thiserror::Error;

/// The runtime refused to start playback of the bound stream.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlaybackError {
    #[error("playback rejected: {0}")]
    Rejected(String),
    #[error("no playback source is bound")]
    NoSource,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PreferenceError {
    #[error("preference storage is unavailable")]
    Unavailable,
    #[error("failed to persist preference: {0}")]
    Write(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MediaError {
    #[error("failed to build video-only stream: {0}")]
    StreamConstruction(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VisualError {
    #[error("failed to create avatar host: {0}")]
    HostCreation(String),
}

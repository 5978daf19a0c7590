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

//! Participant identifiers and the connection keys of the media registry.
//!
//! The registry keys each media entry as `"<room>_<participant id>"`. The
//! room part may itself contain underscores; only the text after the last
//! one identifies the participant.

use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Identifier of a human participant, stable for the participant's session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ParticipantId(pub u64);

impl ParticipantId {
    pub fn get(self) -> u64 {
        self.0
    }
}

impl From<u64> for ParticipantId {
    fn from(id: u64) -> Self {
        ParticipantId(id)
    }
}

impl Display for ParticipantId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Extracts the participant id from a registry connection key.
///
/// Returns `None` when the key has no `_`, or when the text after the last
/// `_` is not a plain run of ASCII digits that fits in a `u64`. Malformed
/// keys are simply not anybody's stream.
pub fn parse_participant_id(connection_key: &str) -> Option<ParticipantId> {
    let (_, suffix) = connection_key.rsplit_once('_')?;
    if suffix.is_empty() || !suffix.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    suffix.parse::<u64>().ok().map(ParticipantId)
}

/// Builds the connection key the registry uses for `participant` in `room`.
pub fn connection_key(room: &str, participant: ParticipantId) -> String {
    format!("{room}_{participant}")
}

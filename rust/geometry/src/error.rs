// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use step_lite_core::RecordId;
use thiserror::Error;

/// Result type for geometry operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during reconstruction
///
/// Loop, frame and triangulation errors drop a single face. Only `Io` and
/// `InvalidUtf8` stop a reconstruction before it starts.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Could not close edge loop #{loop_id}: {reason}")]
    DegenerateLoop { loop_id: RecordId, reason: String },

    #[error("Degenerate frame #{frame_id}: {reason}")]
    DegenerateFrame { frame_id: RecordId, reason: String },

    #[error("Triangulation failed: {0}")]
    Triangulation(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Input is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),
}

impl Error {
    pub(crate) fn degenerate_loop(loop_id: RecordId, reason: impl Into<String>) -> Self {
        Self::DegenerateLoop {
            loop_id,
            reason: reason.into(),
        }
    }

    pub(crate) fn degenerate_frame(frame_id: RecordId, reason: impl Into<String>) -> Self {
        Self::DegenerateFrame {
            frame_id,
            reason: reason.into(),
        }
    }
}

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for record scanning and decoding.

use thiserror::Error;

use crate::RecordId;

/// Result type for core parsing operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while turning text into typed records.
///
/// None of these abort a scan: the scanner drops the offending record,
/// logs it and moves on.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("Malformed {keyword} record #{id}: {reason}")]
    MalformedRecord {
        id: RecordId,
        keyword: String,
        reason: String,
    },

    #[error("Unsupported keyword: {0}")]
    UnsupportedKeyword(String),
}

impl Error {
    /// Create a parse error
    pub fn parse(line: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            line,
            message: message.into(),
        }
    }

    /// Create a malformed-record error
    pub fn malformed(id: RecordId, keyword: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedRecord {
            id,
            keyword: keyword.into(),
            reason: reason.into(),
        }
    }
}

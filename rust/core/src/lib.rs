// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # STEP-Lite Core Parser
//!
//! Line-oriented STEP (ISO-10303-21) record scanner built with
//! [nom](https://docs.rs/nom), covering the entity subset needed to rebuild
//! planar boundary-representation solids.
//!
//! ## Overview
//!
//! - **Record Scanning**: lazy, anchored `#id = KEYWORD(args)` header matching
//!   with line splitting via [memchr](https://docs.rs/memchr)
//! - **Typed Decoding**: coordinate tuples parsed directly with
//!   [fast-float](https://docs.rs/fast-float), everything else through the
//!   generic token grammar and positional extraction
//! - **Phase Grouping**: decoded records bucketed by the fixed resolution phase
//!   of their kind
//!
//! ## Quick Start
//!
//! ```rust
//! use step_lite_core::{RecordSet, ResolutionPhase};
//!
//! let content = "#1 = CARTESIAN_POINT('', (0., 0., 0.));\n#2 = VERTEX_POINT('', #1);";
//! let records = RecordSet::scan(content);
//!
//! assert_eq!(records.stats().decoded, 2);
//! assert_eq!(records.phase(ResolutionPhase::Points).len(), 1);
//! ```
//!
//! Malformed records never abort a scan; they are logged through
//! [tracing](https://docs.rs/tracing) and counted in [`ScanStats`].
//!
//! ## Feature Flags
//!
//! - `serde`: Enable serialization support for records and statistics

pub mod error;
pub mod parser;
pub mod record;
pub mod record_set;
pub mod schema;

/// Document-scoped record identifier (`#12` → 12)
pub type RecordId = u32;

pub use error::{Error, Result};
pub use parser::{
    is_step_document, is_step_path, parse_arguments, parse_coordinates, RawRecord, RecordScanner,
    Token,
};
pub use record::Record;
pub use record_set::{RecordSet, ScanStats};
pub use schema::{EntityKind, ResolutionPhase};

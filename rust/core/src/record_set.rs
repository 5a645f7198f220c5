// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Per-phase record lists for one document

use rustc_hash::FxHashSet;
use tracing::{debug, warn};

use crate::parser::RecordScanner;
use crate::record::Record;
use crate::schema::ResolutionPhase;
use crate::RecordId;

/// Counters collected while scanning
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScanStats {
    /// Lines matching the record header
    pub candidates: usize,
    /// Records decoded into the subset
    pub decoded: usize,
    /// Records dropped for failing their argument pattern
    pub malformed: usize,
    /// Records with a keyword outside the subset
    pub unsupported: usize,
    /// Records skipped because their ID was already taken
    pub duplicates: usize,
}

/// Decoded records grouped by resolution phase, each group in scan order
#[derive(Debug, Clone, Default)]
pub struct RecordSet {
    phases: [Vec<(RecordId, Record)>; ResolutionPhase::COUNT],
    stats: ScanStats,
}

impl RecordSet {
    /// Scan a whole document.
    ///
    /// Never fails: malformed records are logged and dropped, unsupported
    /// keywords are counted, and a repeated ID keeps its first record.
    pub fn scan(content: &str) -> Self {
        let mut set = Self::default();
        let mut seen: FxHashSet<RecordId> = FxHashSet::default();

        for raw in RecordScanner::new(content) {
            set.stats.candidates += 1;

            match Record::parse(&raw) {
                Ok(Some(record)) => {
                    if !seen.insert(raw.id) {
                        set.stats.duplicates += 1;
                        warn!(id = raw.id, line = raw.line, "duplicate record id, keeping first");
                        continue;
                    }
                    set.stats.decoded += 1;
                    set.phases[record.kind().phase().index()].push((raw.id, record));
                }
                Ok(None) => {
                    set.stats.unsupported += 1;
                    debug!(id = raw.id, keyword = raw.keyword, "skipping unsupported keyword");
                }
                Err(e) => {
                    set.stats.malformed += 1;
                    warn!(line = raw.line, "dropping record: {}", e);
                }
            }
        }

        debug!(
            candidates = set.stats.candidates,
            decoded = set.stats.decoded,
            malformed = set.stats.malformed,
            unsupported = set.stats.unsupported,
            "scan complete"
        );

        set
    }

    /// Records of one phase, in scan order
    pub fn phase(&self, phase: ResolutionPhase) -> &[(RecordId, Record)] {
        &self.phases[phase.index()]
    }

    /// All records in phase order
    pub fn iter(&self) -> impl Iterator<Item = (ResolutionPhase, RecordId, &Record)> + '_ {
        ResolutionPhase::ORDER.iter().flat_map(move |&phase| {
            self.phase(phase)
                .iter()
                .map(move |(id, record)| (phase, *id, record))
        })
    }

    /// Scan statistics
    pub fn stats(&self) -> ScanStats {
        self.stats
    }

    /// Number of decoded records
    pub fn len(&self) -> usize {
        self.phases.iter().map(Vec::len).sum()
    }

    /// Check if nothing was decoded
    pub fn is_empty(&self) -> bool {
        self.phases.iter().all(Vec::is_empty)
    }
}

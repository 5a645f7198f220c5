// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Typed records
//!
//! Each supported keyword decodes into one [`Record`] variant holding plain
//! values and unresolved [`RecordId`] references.

use smallvec::SmallVec;

use crate::error::{Error, Result};
use crate::parser::{parse_arguments, parse_coordinates, RawRecord, Token};
use crate::schema::EntityKind;
use crate::RecordId;

/// A decoded record of the planar B-rep subset
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Record {
    CartesianPoint {
        coordinates: [f64; 3],
    },
    Direction {
        ratios: [f64; 3],
    },
    VertexPoint {
        point: RecordId,
    },
    Vector {
        orientation: RecordId,
        magnitude: f64,
    },
    Line {
        origin: RecordId,
        vector: RecordId,
    },
    EdgeCurve {
        start: RecordId,
        end: RecordId,
        /// `None` when the curve slot is `$`
        geometry: Option<RecordId>,
        same_sense: bool,
    },
    OrientedEdge {
        edge: RecordId,
        orientation: bool,
    },
    EdgeLoop {
        edges: SmallVec<[RecordId; 8]>,
    },
    FaceBound {
        bound: RecordId,
        orientation: bool,
        /// Written as FACE_OUTER_BOUND
        outer: bool,
    },
    Axis2Placement3D {
        location: RecordId,
        axis: Option<RecordId>,
        ref_direction: Option<RecordId>,
    },
    Plane {
        position: RecordId,
    },
    AdvancedFace {
        bounds: SmallVec<[RecordId; 4]>,
        surface: RecordId,
        same_sense: bool,
    },
    Shell {
        faces: Vec<RecordId>,
        closed: bool,
    },
}

impl Record {
    /// Decode a candidate record.
    ///
    /// Returns `Ok(None)` when the keyword is outside the subset and
    /// [`Error::MalformedRecord`] when the arguments do not fit the
    /// keyword's pattern.
    pub fn parse(raw: &RawRecord<'_>) -> Result<Option<Record>> {
        let Some(kind) = EntityKind::from_keyword(raw.keyword) else {
            return Ok(None);
        };

        if kind.is_coordinate_tuple() {
            let values = parse_coordinates(raw.args, raw.line)
                .map_err(|e| Error::malformed(raw.id, raw.keyword, parse_reason(e)))?;
            let record = match kind {
                EntityKind::Direction => Record::Direction { ratios: values },
                _ => Record::CartesianPoint {
                    coordinates: values,
                },
            };
            return Ok(Some(record));
        }

        let tokens = parse_arguments(raw.args, raw.line)
            .map_err(|e| Error::malformed(raw.id, raw.keyword, parse_reason(e)))?;
        let args = Arguments { raw, tokens: &tokens };

        let record = match kind {
            EntityKind::VertexPoint => Record::VertexPoint {
                point: args.entity_ref(1)?,
            },
            EntityKind::Vector => Record::Vector {
                orientation: args.entity_ref(1)?,
                magnitude: args.real(2)?,
            },
            EntityKind::Line => Record::Line {
                origin: args.entity_ref(1)?,
                vector: args.entity_ref(2)?,
            },
            EntityKind::EdgeCurve => Record::EdgeCurve {
                start: args.entity_ref(1)?,
                end: args.entity_ref(2)?,
                geometry: args.optional_ref(3)?,
                same_sense: args.logical_or(4, true),
            },
            EntityKind::OrientedEdge => Record::OrientedEdge {
                edge: args.entity_ref(3)?,
                orientation: args.logical(4)?,
            },
            EntityKind::EdgeLoop => Record::EdgeLoop {
                edges: args.entity_ref_list(1)?,
            },
            EntityKind::FaceOuterBound | EntityKind::FaceBound => Record::FaceBound {
                bound: args.entity_ref(1)?,
                orientation: args.logical_or(2, true),
                outer: kind == EntityKind::FaceOuterBound,
            },
            EntityKind::Axis2Placement3D => Record::Axis2Placement3D {
                location: args.entity_ref(1)?,
                axis: args.optional_ref(2)?,
                ref_direction: args.optional_ref(3)?,
            },
            EntityKind::Plane => Record::Plane {
                position: args.entity_ref(1)?,
            },
            EntityKind::AdvancedFace => Record::AdvancedFace {
                bounds: args.entity_ref_list(1)?,
                surface: args.entity_ref(2)?,
                same_sense: args.logical_or(3, true),
            },
            EntityKind::ClosedShell | EntityKind::OpenShell => Record::Shell {
                faces: args.entity_ref_list::<[RecordId; 8]>(1)?.into_vec(),
                closed: kind == EntityKind::ClosedShell,
            },
            EntityKind::CartesianPoint | EntityKind::Direction => {
                unreachable!("coordinate tuples are decoded above")
            }
        };

        Ok(Some(record))
    }

    /// Entity kind of this record (shells and bounds collapse to one kind each)
    pub fn kind(&self) -> EntityKind {
        match self {
            Record::CartesianPoint { .. } => EntityKind::CartesianPoint,
            Record::Direction { .. } => EntityKind::Direction,
            Record::VertexPoint { .. } => EntityKind::VertexPoint,
            Record::Vector { .. } => EntityKind::Vector,
            Record::Line { .. } => EntityKind::Line,
            Record::EdgeCurve { .. } => EntityKind::EdgeCurve,
            Record::OrientedEdge { .. } => EntityKind::OrientedEdge,
            Record::EdgeLoop { .. } => EntityKind::EdgeLoop,
            Record::FaceBound { outer: true, .. } => EntityKind::FaceOuterBound,
            Record::FaceBound { .. } => EntityKind::FaceBound,
            Record::Axis2Placement3D { .. } => EntityKind::Axis2Placement3D,
            Record::Plane { .. } => EntityKind::Plane,
            Record::AdvancedFace { .. } => EntityKind::AdvancedFace,
            Record::Shell { closed: true, .. } => EntityKind::ClosedShell,
            Record::Shell { .. } => EntityKind::OpenShell,
        }
    }
}

/// Strip the line prefix; the malformed error already names the record
fn parse_reason(error: Error) -> String {
    match error {
        Error::Parse { message, .. } => message,
        other => other.to_string(),
    }
}

/// Positional argument access for one record
struct Arguments<'r, 'a> {
    raw: &'r RawRecord<'a>,
    tokens: &'r [Token<'a>],
}

impl<'r, 'a> Arguments<'r, 'a> {
    fn malformed(&self, reason: String) -> Error {
        Error::malformed(self.raw.id, self.raw.keyword, reason)
    }

    fn get(&self, idx: usize) -> Result<&'r Token<'a>> {
        self.tokens.get(idx).ok_or_else(|| {
            self.malformed(format!(
                "missing argument {idx} ({} given)",
                self.tokens.len()
            ))
        })
    }

    fn entity_ref(&self, idx: usize) -> Result<RecordId> {
        self.get(idx)?
            .as_entity_ref()
            .ok_or_else(|| self.malformed(format!("expected entity ref at arg {idx}")))
    }

    /// `$` and `*` decode as `None`
    fn optional_ref(&self, idx: usize) -> Result<Option<RecordId>> {
        match self.tokens.get(idx) {
            None => Ok(None),
            Some(token) if token.is_null() => Ok(None),
            Some(token) => token
                .as_entity_ref()
                .map(Some)
                .ok_or_else(|| self.malformed(format!("expected entity ref or $ at arg {idx}"))),
        }
    }

    fn real(&self, idx: usize) -> Result<f64> {
        self.get(idx)?
            .as_float()
            .ok_or_else(|| self.malformed(format!("expected real at arg {idx}")))
    }

    fn logical(&self, idx: usize) -> Result<bool> {
        self.get(idx)?
            .as_bool()
            .ok_or_else(|| self.malformed(format!("expected .T. or .F. at arg {idx}")))
    }

    /// Missing or non-boolean logicals (`.U.`, `$`) fall back to `default`
    fn logical_or(&self, idx: usize, default: bool) -> bool {
        self.tokens
            .get(idx)
            .and_then(Token::as_bool)
            .unwrap_or(default)
    }

    fn entity_ref_list<A>(&self, idx: usize) -> Result<SmallVec<A>>
    where
        A: smallvec::Array<Item = RecordId>,
    {
        let items = self
            .get(idx)?
            .as_list()
            .ok_or_else(|| self.malformed(format!("expected list at arg {idx}")))?;

        items
            .iter()
            .map(|item| {
                item.as_entity_ref().ok_or_else(|| {
                    self.malformed(format!("expected entity refs in list at arg {idx}"))
                })
            })
            .collect()
    }
}

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Entity kinds of the planar B-rep subset
//!
//! Fast keyword dispatch using an enum instead of string comparison, plus the
//! fixed phase each kind resolves in.

use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// STEP entity kinds the reconstructor understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EntityKind {
    // Geometry
    CartesianPoint,
    Direction,
    Vector,
    Line,
    Axis2Placement3D,
    Plane,

    // Topology
    VertexPoint,
    EdgeCurve,
    OrientedEdge,
    EdgeLoop,
    FaceOuterBound,
    FaceBound,
    AdvancedFace,
    ClosedShell,
    OpenShell,
}

impl EntityKind {
    /// Parse a keyword as written in the data section.
    /// Returns `None` for anything outside the subset.
    pub fn from_keyword(s: &str) -> Option<Self> {
        let kind = match s {
            "CARTESIAN_POINT" => Self::CartesianPoint,
            "DIRECTION" => Self::Direction,
            "VECTOR" => Self::Vector,
            "LINE" => Self::Line,
            "AXIS2_PLACEMENT_3D" => Self::Axis2Placement3D,
            "PLANE" => Self::Plane,

            "VERTEX_POINT" => Self::VertexPoint,
            "EDGE_CURVE" => Self::EdgeCurve,
            "ORIENTED_EDGE" => Self::OrientedEdge,
            "EDGE_LOOP" => Self::EdgeLoop,
            "FACE_OUTER_BOUND" => Self::FaceOuterBound,
            "FACE_BOUND" => Self::FaceBound,
            "ADVANCED_FACE" => Self::AdvancedFace,
            "CLOSED_SHELL" => Self::ClosedShell,
            "OPEN_SHELL" => Self::OpenShell,

            _ => return None,
        };
        Some(kind)
    }

    /// Get keyword representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CartesianPoint => "CARTESIAN_POINT",
            Self::Direction => "DIRECTION",
            Self::Vector => "VECTOR",
            Self::Line => "LINE",
            Self::Axis2Placement3D => "AXIS2_PLACEMENT_3D",
            Self::Plane => "PLANE",

            Self::VertexPoint => "VERTEX_POINT",
            Self::EdgeCurve => "EDGE_CURVE",
            Self::OrientedEdge => "ORIENTED_EDGE",
            Self::EdgeLoop => "EDGE_LOOP",
            Self::FaceOuterBound => "FACE_OUTER_BOUND",
            Self::FaceBound => "FACE_BOUND",
            Self::AdvancedFace => "ADVANCED_FACE",
            Self::ClosedShell => "CLOSED_SHELL",
            Self::OpenShell => "OPEN_SHELL",
        }
    }

    /// Phase this kind is resolved in
    pub fn phase(&self) -> ResolutionPhase {
        match self {
            Self::CartesianPoint | Self::Direction => ResolutionPhase::Points,
            Self::VertexPoint | Self::Vector => ResolutionPhase::VertexPoints,
            Self::Line => ResolutionPhase::Lines,
            Self::EdgeCurve => ResolutionPhase::Edges,
            Self::OrientedEdge => ResolutionPhase::OrientedEdges,
            Self::EdgeLoop => ResolutionPhase::EdgeLoops,
            Self::FaceOuterBound | Self::FaceBound => ResolutionPhase::FaceBounds,
            Self::Axis2Placement3D => ResolutionPhase::Frames,
            Self::Plane => ResolutionPhase::Planes,
            Self::AdvancedFace => ResolutionPhase::Faces,
            Self::ClosedShell | Self::OpenShell => ResolutionPhase::Shells,
        }
    }

    /// Kinds whose arguments are a flat coordinate tuple
    pub fn is_coordinate_tuple(&self) -> bool {
        matches!(self, Self::CartesianPoint | Self::Direction)
    }
}

impl FromStr for EntityKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_keyword(s).ok_or_else(|| Error::UnsupportedKeyword(s.to_string()))
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Fixed resolution order. A kind may only reference kinds of earlier phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ResolutionPhase {
    /// CARTESIAN_POINT, DIRECTION
    Points,
    /// VERTEX_POINT, VECTOR
    VertexPoints,
    Lines,
    Edges,
    OrientedEdges,
    EdgeLoops,
    /// FACE_OUTER_BOUND, FACE_BOUND
    FaceBounds,
    /// AXIS2_PLACEMENT_3D
    Frames,
    Planes,
    Faces,
    /// CLOSED_SHELL, OPEN_SHELL
    Shells,
}

impl ResolutionPhase {
    /// Number of phases
    pub const COUNT: usize = 11;

    /// All phases in execution order
    pub const ORDER: [ResolutionPhase; Self::COUNT] = [
        Self::Points,
        Self::VertexPoints,
        Self::Lines,
        Self::Edges,
        Self::OrientedEdges,
        Self::EdgeLoops,
        Self::FaceBounds,
        Self::Frames,
        Self::Planes,
        Self::Faces,
        Self::Shells,
    ];

    /// Position in [`ResolutionPhase::ORDER`]
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_keyword() {
        assert_eq!(EntityKind::from_keyword("CARTESIAN_POINT"), Some(EntityKind::CartesianPoint));
        assert_eq!(EntityKind::from_keyword("OPEN_SHELL"), Some(EntityKind::OpenShell));
        assert_eq!(EntityKind::from_keyword("B_SPLINE_CURVE_WITH_KNOTS"), None);
        assert_eq!(EntityKind::from_keyword("cartesian_point"), None);
    }

    #[test]
    fn test_from_str_unsupported() {
        let err = "CYLINDRICAL_SURFACE".parse::<EntityKind>().unwrap_err();
        assert_eq!(err, Error::UnsupportedKeyword("CYLINDRICAL_SURFACE".to_string()));
    }

    #[test]
    fn test_as_str_roundtrip() {
        for keyword in ["AXIS2_PLACEMENT_3D", "FACE_OUTER_BOUND", "EDGE_LOOP"] {
            let kind: EntityKind = keyword.parse().unwrap();
            assert_eq!(kind.as_str(), keyword);
        }
    }

    #[test]
    fn test_phases_are_ordered() {
        for (i, phase) in ResolutionPhase::ORDER.iter().enumerate() {
            assert_eq!(phase.index(), i);
        }
        assert!(EntityKind::EdgeCurve.phase() > EntityKind::Line.phase());
        assert!(EntityKind::Plane.phase() > EntityKind::Axis2Placement3D.phase());
        assert!(EntityKind::AdvancedFace.phase() > EntityKind::FaceBound.phase());
        assert_eq!(EntityKind::FaceOuterBound.phase(), EntityKind::FaceBound.phase());
    }
}

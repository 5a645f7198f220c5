// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Resolved B-rep entities
//!
//! Values here hold geometry directly instead of record references. Shared
//! sub-graphs (loops, bounds, faces) sit behind `Arc` so a shell and the
//! stores can both hold them without copying.

use std::sync::Arc;

use nalgebra::{Point3, Vector3};
use step_lite_core::RecordId;

use crate::edge_loop::Segment;
use crate::frame::Frame3D;

/// Direction scaled by a magnitude
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vector {
    pub direction: Vector3<f64>,
    pub magnitude: f64,
}

/// Infinite line through `origin` along `vector`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineCurve {
    pub origin: Point3<f64>,
    pub vector: Vector,
}

/// Edge between two vertices
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    pub start: Point3<f64>,
    pub end: Point3<f64>,
    /// `None` when the edge geometry is not a LINE
    pub curve: Option<LineCurve>,
}

/// Edge use within a loop
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrientedEdge {
    pub edge: Edge,
    /// `false` traverses the edge from `end` to `start`
    pub orientation: bool,
}

impl OrientedEdge {
    /// Endpoints in traversal order
    #[inline]
    pub fn segment(&self) -> Segment {
        let segment = Segment::new(self.edge.start, self.edge.end);
        if self.orientation {
            segment
        } else {
            segment.reversed()
        }
    }
}

/// Oriented edges in stored order; not guaranteed to be cyclic
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeLoop {
    pub id: RecordId,
    pub edges: Vec<OrientedEdge>,
}

impl EdgeLoop {
    /// Segments in stored order
    pub fn segments(&self) -> Vec<Segment> {
        self.edges.iter().map(OrientedEdge::segment).collect()
    }
}

/// Loop bounding a face
#[derive(Debug, Clone, PartialEq)]
pub struct FaceBound {
    pub id: RecordId,
    pub edge_loop: Arc<EdgeLoop>,
    pub orientation: bool,
    /// Declared as FACE_OUTER_BOUND
    pub outer: bool,
}

/// Plane positioned by a frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    pub id: RecordId,
    pub position: Frame3D,
}

/// Planar face with its bounds
#[derive(Debug, Clone, PartialEq)]
pub struct AdvancedFace {
    pub id: RecordId,
    pub bounds: Vec<Arc<FaceBound>>,
    pub plane: Plane,
    /// `false` means the face normal opposes the plane normal
    pub same_sense: bool,
}

/// Closed or open shell of faces
#[derive(Debug, Clone, PartialEq)]
pub struct Shell {
    pub id: RecordId,
    /// Faces that resolved, in stored order
    pub faces: Vec<Arc<AdvancedFace>>,
    pub closed: bool,
}

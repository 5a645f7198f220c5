// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Phase-ordered entity resolution
//!
//! One typed store per entity kind, filled phase by phase. A resolver only
//! reads stores of earlier phases, so a reference to a kind that resolves
//! later (or to the wrong kind, or to nothing) comes back absent and the
//! referencing entity is dropped.

use std::sync::Arc;

use nalgebra::{Point3, Vector3};
use rustc_hash::FxHashMap;
use step_lite_core::{Record, RecordId, RecordSet, ResolutionPhase};
use tracing::debug;

use crate::frame::Frame3D;
use crate::topology::{
    AdvancedFace, Edge, EdgeLoop, FaceBound, LineCurve, OrientedEdge, Plane, Shell, Vector,
};

/// Resolution counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ResolveStats {
    /// Entities stored
    pub resolved: usize,
    /// Entities dropped because a required reference was absent
    pub dropped: usize,
    /// References that did not resolve
    pub unresolved: usize,
}

/// Typed per-document entity stores
#[derive(Debug, Default)]
pub struct EntityStores {
    points: FxHashMap<RecordId, Point3<f64>>,
    directions: FxHashMap<RecordId, Vector3<f64>>,
    vertex_points: FxHashMap<RecordId, Point3<f64>>,
    vertex_order: Vec<RecordId>,
    vectors: FxHashMap<RecordId, Vector>,
    lines: FxHashMap<RecordId, LineCurve>,
    edges: FxHashMap<RecordId, Edge>,
    oriented_edges: FxHashMap<RecordId, OrientedEdge>,
    edge_loops: FxHashMap<RecordId, Arc<EdgeLoop>>,
    face_bounds: FxHashMap<RecordId, Arc<FaceBound>>,
    frames: FxHashMap<RecordId, Frame3D>,
    planes: FxHashMap<RecordId, Plane>,
    faces: FxHashMap<RecordId, Arc<AdvancedFace>>,
    shells: FxHashMap<RecordId, Shell>,
    shell_order: Vec<RecordId>,
    stats: ResolveStats,
}

/// Look up a reference, counting and logging a miss
fn fetch<T: Clone>(
    store: &FxHashMap<RecordId, T>,
    stats: &mut ResolveStats,
    owner: RecordId,
    reference: RecordId,
    expected: &'static str,
) -> Option<T> {
    let found = store.get(&reference).cloned();
    if found.is_none() {
        stats.unresolved += 1;
        debug!(owner, reference, expected, "unresolved reference");
    }
    found
}

impl EntityStores {
    /// Resolve every record of a scanned document, phase by phase
    pub fn resolve(records: &RecordSet) -> Self {
        let mut stores = Self::default();

        for phase in ResolutionPhase::ORDER {
            for (id, record) in records.phase(phase) {
                if stores.resolve_record(*id, record) {
                    stores.stats.resolved += 1;
                } else {
                    stores.stats.dropped += 1;
                }
            }
        }

        debug!(
            resolved = stores.stats.resolved,
            dropped = stores.stats.dropped,
            unresolved = stores.stats.unresolved,
            "resolution complete"
        );

        stores
    }

    /// Resolve one record into its store. Returns `false` when it is absent.
    fn resolve_record(&mut self, id: RecordId, record: &Record) -> bool {
        let stats = &mut self.stats;

        match record {
            Record::CartesianPoint { coordinates } => {
                self.points.insert(id, Point3::from(*coordinates));
            }
            Record::Direction { ratios } => {
                self.directions.insert(id, Vector3::from(*ratios));
            }
            Record::VertexPoint { point } => {
                let Some(point) = fetch(&self.points, stats, id, *point, "CARTESIAN_POINT") else {
                    return false;
                };
                self.vertex_points.insert(id, point);
                self.vertex_order.push(id);
            }
            Record::Vector {
                orientation,
                magnitude,
            } => {
                let Some(direction) = fetch(&self.directions, stats, id, *orientation, "DIRECTION")
                else {
                    return false;
                };
                self.vectors.insert(
                    id,
                    Vector {
                        direction,
                        magnitude: *magnitude,
                    },
                );
            }
            Record::Line { origin, vector } => {
                let origin = fetch(&self.points, stats, id, *origin, "CARTESIAN_POINT");
                let vector = fetch(&self.vectors, stats, id, *vector, "VECTOR");
                let (Some(origin), Some(vector)) = (origin, vector) else {
                    return false;
                };
                self.lines.insert(id, LineCurve { origin, vector });
            }
            Record::EdgeCurve {
                start,
                end,
                geometry,
                ..
            } => {
                let start = fetch(&self.vertex_points, stats, id, *start, "VERTEX_POINT");
                let end = fetch(&self.vertex_points, stats, id, *end, "VERTEX_POINT");
                let (Some(start), Some(end)) = (start, end) else {
                    return false;
                };
                // Non-line curves keep the edge; only endpoints drive planar faces
                let curve = (*geometry).and_then(|curve| fetch(&self.lines, stats, id, curve, "LINE"));
                self.edges.insert(id, Edge { start, end, curve });
            }
            Record::OrientedEdge { edge, orientation } => {
                let Some(edge) = fetch(&self.edges, stats, id, *edge, "EDGE_CURVE") else {
                    return false;
                };
                self.oriented_edges.insert(
                    id,
                    OrientedEdge {
                        edge,
                        orientation: *orientation,
                    },
                );
            }
            Record::EdgeLoop { edges } => {
                let mut resolved = Vec::with_capacity(edges.len());
                for edge in edges {
                    match fetch(&self.oriented_edges, stats, id, *edge, "ORIENTED_EDGE") {
                        Some(oriented) => resolved.push(oriented),
                        None => return false,
                    }
                }
                self.edge_loops.insert(
                    id,
                    Arc::new(EdgeLoop {
                        id,
                        edges: resolved,
                    }),
                );
            }
            Record::FaceBound {
                bound,
                orientation,
                outer,
            } => {
                let Some(edge_loop) = fetch(&self.edge_loops, stats, id, *bound, "EDGE_LOOP") else {
                    return false;
                };
                self.face_bounds.insert(
                    id,
                    Arc::new(FaceBound {
                        id,
                        edge_loop,
                        orientation: *orientation,
                        outer: *outer,
                    }),
                );
            }
            Record::Axis2Placement3D {
                location,
                axis,
                ref_direction,
            } => {
                let Some(origin) = fetch(&self.points, stats, id, *location, "CARTESIAN_POINT") else {
                    return false;
                };
                let axis = match axis {
                    Some(axis) => match fetch(&self.directions, stats, id, *axis, "DIRECTION") {
                        Some(axis) => axis,
                        None => return false,
                    },
                    None => Frame3D::default_axis(),
                };
                let ref_direction = match ref_direction {
                    Some(reference) => {
                        match fetch(&self.directions, stats, id, *reference, "DIRECTION") {
                            Some(reference) => reference,
                            None => return false,
                        }
                    }
                    None => Frame3D::default_ref_direction(),
                };
                self.frames.insert(
                    id,
                    Frame3D {
                        id,
                        origin,
                        axis,
                        ref_direction,
                    },
                );
            }
            Record::Plane { position } => {
                let Some(position) = fetch(&self.frames, stats, id, *position, "AXIS2_PLACEMENT_3D")
                else {
                    return false;
                };
                self.planes.insert(id, Plane { id, position });
            }
            Record::AdvancedFace {
                bounds,
                surface,
                same_sense,
            } => {
                let mut resolved = Vec::with_capacity(bounds.len());
                for bound in bounds {
                    match fetch(&self.face_bounds, stats, id, *bound, "FACE_BOUND") {
                        Some(bound) => resolved.push(bound),
                        None => return false,
                    }
                }
                let Some(plane) = fetch(&self.planes, stats, id, *surface, "PLANE") else {
                    return false;
                };
                self.faces.insert(
                    id,
                    Arc::new(AdvancedFace {
                        id,
                        bounds: resolved,
                        plane,
                        same_sense: *same_sense,
                    }),
                );
            }
            Record::Shell { faces, closed } => {
                // Absent faces are skipped, the shell keeps the rest
                let faces = faces
                    .iter()
                    .filter_map(|face| fetch(&self.faces, stats, id, *face, "ADVANCED_FACE"))
                    .collect();
                self.shells.insert(
                    id,
                    Shell {
                        id,
                        faces,
                        closed: *closed,
                    },
                );
                self.shell_order.push(id);
            }
        }

        true
    }

    pub fn point(&self, id: RecordId) -> Option<Point3<f64>> {
        self.points.get(&id).copied()
    }

    pub fn direction(&self, id: RecordId) -> Option<Vector3<f64>> {
        self.directions.get(&id).copied()
    }

    pub fn vertex_point(&self, id: RecordId) -> Option<Point3<f64>> {
        self.vertex_points.get(&id).copied()
    }

    pub fn vector(&self, id: RecordId) -> Option<Vector> {
        self.vectors.get(&id).copied()
    }

    pub fn line(&self, id: RecordId) -> Option<LineCurve> {
        self.lines.get(&id).copied()
    }

    pub fn edge(&self, id: RecordId) -> Option<Edge> {
        self.edges.get(&id).copied()
    }

    pub fn oriented_edge(&self, id: RecordId) -> Option<OrientedEdge> {
        self.oriented_edges.get(&id).copied()
    }

    pub fn edge_loop(&self, id: RecordId) -> Option<&Arc<EdgeLoop>> {
        self.edge_loops.get(&id)
    }

    pub fn face_bound(&self, id: RecordId) -> Option<&Arc<FaceBound>> {
        self.face_bounds.get(&id)
    }

    pub fn frame(&self, id: RecordId) -> Option<Frame3D> {
        self.frames.get(&id).copied()
    }

    pub fn plane(&self, id: RecordId) -> Option<Plane> {
        self.planes.get(&id).copied()
    }

    pub fn face(&self, id: RecordId) -> Option<&Arc<AdvancedFace>> {
        self.faces.get(&id)
    }

    pub fn shell(&self, id: RecordId) -> Option<&Shell> {
        self.shells.get(&id)
    }

    /// Shells in scan order
    pub fn shells(&self) -> impl Iterator<Item = &Shell> + '_ {
        self.shell_order.iter().filter_map(|id| self.shells.get(id))
    }

    /// Resolved vertex points in scan order
    pub fn vertex_points(&self) -> impl Iterator<Item = (RecordId, Point3<f64>)> + '_ {
        self.vertex_order
            .iter()
            .filter_map(|id| self.vertex_points.get(id).map(|p| (*id, *p)))
    }

    pub fn stats(&self) -> ResolveStats {
        self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolve(content: &str) -> EntityStores {
        EntityStores::resolve(&RecordSet::scan(content))
    }

    const TRIANGLE: &str = "
#1 = CARTESIAN_POINT('', (0., 0., 0.));
#2 = CARTESIAN_POINT('', (1., 0., 0.));
#3 = CARTESIAN_POINT('', (0., 1., 0.));
#4 = VERTEX_POINT('', #1);
#5 = VERTEX_POINT('', #2);
#6 = VERTEX_POINT('', #3);
#7 = DIRECTION('', (1., 0., 0.));
#8 = VECTOR('', #7, 1.);
#9 = LINE('', #1, #8);
#10 = EDGE_CURVE('', #4, #5, #9, .T.);
#11 = EDGE_CURVE('', #5, #6, $, .T.);
#12 = EDGE_CURVE('', #6, #4, #99, .T.);
#13 = ORIENTED_EDGE('', *, *, #10, .T.);
#14 = ORIENTED_EDGE('', *, *, #11, .T.);
#15 = ORIENTED_EDGE('', *, *, #12, .T.);
#16 = EDGE_LOOP('', (#13, #14, #15));
#17 = FACE_OUTER_BOUND('', #16, .T.);
#18 = AXIS2_PLACEMENT_3D('', #1, $, $);
#19 = PLANE('', #18);
#20 = ADVANCED_FACE('', (#17), #19, .T.);
#21 = CLOSED_SHELL('', (#20, #77));
";

    #[test]
    fn test_resolves_full_graph() {
        let stores = resolve(TRIANGLE);

        let face = stores.face(20).unwrap();
        assert_eq!(face.bounds.len(), 1);
        assert_eq!(face.bounds[0].edge_loop.edges.len(), 3);
        assert!(face.bounds[0].outer);

        let shell = stores.shell(21).unwrap();
        assert!(shell.closed);
        assert_eq!(shell.faces.len(), 1);
        assert_eq!(stores.shells().count(), 1);
    }

    #[test]
    fn test_edge_curve_geometry_optional() {
        let stores = resolve(TRIANGLE);
        assert!(stores.edge(10).unwrap().curve.is_some());
        assert!(stores.edge(11).unwrap().curve.is_none());
        // Dangling curve reference keeps the edge
        assert!(stores.edge(12).unwrap().curve.is_none());
    }

    #[test]
    fn test_default_frame_axes() {
        let stores = resolve(TRIANGLE);
        let frame = stores.frame(18).unwrap();
        assert_eq!(frame.axis, Vector3::z());
        assert_eq!(frame.ref_direction, Vector3::x());
    }

    #[test]
    fn test_unresolved_counted() {
        let stats = resolve(TRIANGLE).stats();
        // #99 curve and #77 face
        assert_eq!(stats.unresolved, 2);
        assert_eq!(stats.dropped, 0);
    }

    #[test]
    fn test_vertex_points_in_scan_order() {
        let stores = resolve(TRIANGLE);
        let ids: Vec<RecordId> = stores.vertex_points().map(|(id, _)| id).collect();
        assert_eq!(ids, vec![4, 5, 6]);
    }

    #[test]
    fn test_missing_reference_cascades() {
        let content = TRIANGLE.replace("#14 = ORIENTED_EDGE('', *, *, #11, .T.);", "#14 = ORIENTED_EDGE('', *, *, #50, .T.);");
        let stores = resolve(&content);

        assert!(stores.oriented_edge(14).is_none());
        assert!(stores.edge_loop(16).is_none());
        assert!(stores.face_bound(17).is_none());
        assert!(stores.face(20).is_none());
        // Shell survives with no faces
        assert_eq!(stores.shell(21).unwrap().faces.len(), 0);
        assert_eq!(stores.stats().dropped, 4);
    }

    #[test]
    fn test_wrong_kind_is_absent() {
        // VERTEX_POINT pointing at a DIRECTION
        let stores = resolve("#1 = DIRECTION('', (0., 0., 1.));\n#2 = VERTEX_POINT('', #1);");
        assert!(stores.direction(1).is_some());
        assert!(stores.vertex_point(2).is_none());
    }

    #[test]
    fn test_later_phase_reference_is_absent() {
        // Edges and frames resolve after vertex points and lines
        let content = format!(
            "{}#30 = VERTEX_POINT('', #10);\n#31 = LINE('', #18, #8);\n",
            TRIANGLE
        );
        let stores = resolve(&content);

        assert!(stores.edge(10).is_some());
        assert!(stores.frame(18).is_some());
        assert!(stores.vertex_point(30).is_none());
        assert!(stores.line(31).is_none());

        let stats = stores.stats();
        assert_eq!(stats.unresolved, 2 + 2);
        assert_eq!(stats.dropped, 2);
    }

    #[test]
    fn test_fresh_stores_per_call() {
        let first = resolve(TRIANGLE);
        let second = resolve("#1 = CARTESIAN_POINT('', (5., 5., 5.));");
        assert!(first.face(20).is_some());
        assert!(second.face(20).is_none());
        assert_eq!(second.point(1), Some(Point3::new(5.0, 5.0, 5.0)));
    }
}

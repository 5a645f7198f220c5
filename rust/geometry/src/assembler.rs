// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Mesh assembly
//!
//! Walks every shell's faces, closes and flattens their loops, triangulates
//! them and appends the result to one mesh. A face either lands in the mesh
//! completely or not at all; failures are collected in the report.

use std::cmp::Ordering;

use nalgebra::{Point2, Point3, Vector3};
use smallvec::SmallVec;
use step_lite_core::{RecordId, ScanStats};
use tracing::{debug, warn};

use crate::config::{HoleMode, ReconstructConfig};
use crate::edge_loop::{close_loop, loop_points, Segment};
use crate::error::{Error, Result};
use crate::mesh::{DebugOverlay, Mesh};
use crate::resolve::{EntityStores, ResolveStats};
use crate::topology::AdvancedFace;
use crate::triangulation::{signed_area, triangulate_polygon, triangulate_polygon_with_holes};

/// A face that could not be meshed
#[derive(Debug)]
pub struct FaceFailure {
    pub face_id: RecordId,
    pub error: Error,
}

/// What happened during one reconstruction
#[derive(Debug, Default)]
pub struct ReconstructionReport {
    pub scan: ScanStats,
    pub resolve: ResolveStats,
    /// Shells walked
    pub shells: usize,
    /// Faces meshed
    pub faces: usize,
    /// Faces dropped, in processing order
    pub failures: Vec<FaceFailure>,
}

/// Dropped face with its error rendered as text
#[cfg(feature = "serde")]
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FailureView {
    pub face_id: RecordId,
    pub error: String,
}

/// Serializable form of a [`ReconstructionReport`] for JSON and JavaScript
#[cfg(feature = "serde")]
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportView {
    pub scan: ScanStats,
    pub resolve: ResolveStats,
    pub shells: usize,
    pub faces: usize,
    pub failures: Vec<FailureView>,
}

#[cfg(feature = "serde")]
impl From<&ReconstructionReport> for ReportView {
    fn from(report: &ReconstructionReport) -> Self {
        Self {
            scan: report.scan,
            resolve: report.resolve,
            shells: report.shells,
            faces: report.faces,
            failures: report
                .failures
                .iter()
                .map(|f| FailureView {
                    face_id: f.face_id,
                    error: f.error.to_string(),
                })
                .collect(),
        }
    }
}

/// Reconstructed solid: render buffers plus debug side outputs
#[derive(Debug, Default)]
pub struct SolidMesh {
    pub mesh: Mesh,
    pub overlay: DebugOverlay,
    pub report: ReconstructionReport,
}

impl SolidMesh {
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.mesh.is_empty()
    }
}

/// Triangulated geometry of a single face, indices local to the patch
#[derive(Debug, Default)]
pub struct FacePatch {
    pub mesh: Mesh,
    /// Closed loop segments, outer bound first
    pub segments: Vec<Segment>,
}

/// One closed bound of a face
struct FaceLoop {
    outer: bool,
    points: Vec<Point3<f64>>,
    projected: Vec<Point2<f64>>,
}

/// Builds a [`SolidMesh`] from resolved entity stores
#[derive(Debug, Clone, Copy, Default)]
pub struct MeshAssembler {
    config: ReconstructConfig,
}

impl MeshAssembler {
    pub fn new(config: ReconstructConfig) -> Self {
        Self { config }
    }

    /// Mesh every shell in scan order
    pub fn assemble(&self, stores: &EntityStores, scan: ScanStats) -> SolidMesh {
        let mut solid = SolidMesh::default();
        solid.report.scan = scan;
        solid.report.resolve = stores.stats();

        for shell in stores.shells() {
            solid.report.shells += 1;

            for face in &shell.faces {
                match self.face_patch(face) {
                    Ok(patch) => {
                        solid.mesh.merge(&patch.mesh);
                        if self.config.debug_overlay {
                            for segment in &patch.segments {
                                solid.overlay.add_segment(segment);
                            }
                        }
                        solid.report.faces += 1;
                    }
                    Err(error) => {
                        warn!(face = face.id, shell = shell.id, "dropping face: {}", error);
                        solid.report.failures.push(FaceFailure {
                            face_id: face.id,
                            error,
                        });
                    }
                }
            }
        }

        if self.config.debug_overlay {
            for (_, point) in stores.vertex_points() {
                solid.overlay.add_point(&point);
            }
        }

        debug!(
            shells = solid.report.shells,
            faces = solid.report.faces,
            failed = solid.report.failures.len(),
            vertices = solid.mesh.vertex_count(),
            triangles = solid.mesh.triangle_count(),
            "assembly complete"
        );

        solid
    }

    /// Triangulate one face in its plane frame
    pub fn face_patch(&self, face: &AdvancedFace) -> Result<FacePatch> {
        let frame = face.plane.position.local_frame()?;
        // Flat shading with the plane normal unless face sense is honoured
        let flipped = self.config.respect_face_sense && !face.same_sense;
        let normal = if flipped { -frame.normal() } else { frame.normal() };

        let mut patch = FacePatch::default();
        let mut loops: SmallVec<[FaceLoop; 4]> = SmallVec::with_capacity(face.bounds.len());

        for bound in &face.bounds {
            let edge_loop = &bound.edge_loop;
            let chain = close_loop(edge_loop.id, &edge_loop.segments(), self.config.tolerance)?;

            let mut points = loop_points(&chain, self.config.tolerance);
            if !bound.orientation {
                points.reverse();
            }
            let projected = points.iter().map(|p| frame.project(p)).collect();

            patch.segments.extend(chain);
            loops.push(FaceLoop {
                outer: bound.outer,
                points,
                projected,
            });
        }

        if loops.is_empty() {
            return Err(Error::Triangulation(format!("face #{} has no bounds", face.id)));
        }

        let outer = loops.remove(outer_loop_index(&loops));
        let holes: Vec<FaceLoop> = loops
            .into_iter()
            .filter(|hole| {
                let usable = hole.points.len() >= 3;
                if !usable {
                    debug!(face = face.id, points = hole.points.len(), "skipping degenerate inner bound");
                }
                usable
            })
            .collect();

        match self.config.hole_mode {
            HoleMode::Subtract => {
                let hole_points: Vec<Vec<Point2<f64>>> =
                    holes.iter().map(|hole| hole.projected.clone()).collect();
                let indices = triangulate_polygon_with_holes(&outer.projected, &hole_points)?;

                let points_3d: Vec<Point3<f64>> = std::iter::once(&outer)
                    .chain(&holes)
                    .flat_map(|l| l.points.iter().copied())
                    .collect();
                let points_2d: Vec<Point2<f64>> = std::iter::once(&outer)
                    .chain(&holes)
                    .flat_map(|l| l.projected.iter().copied())
                    .collect();

                patch.mesh = Mesh::with_capacity(points_3d.len(), indices.len());
                self.emit(&mut patch.mesh, &points_3d, &points_2d, &indices, normal, !flipped);
            }
            HoleMode::Fill => {
                for face_loop in std::iter::once(&outer).chain(&holes) {
                    let indices = triangulate_polygon(&face_loop.projected)?;
                    self.emit(
                        &mut patch.mesh,
                        &face_loop.points,
                        &face_loop.projected,
                        &indices,
                        normal,
                        !flipped,
                    );
                }
            }
        }

        Ok(patch)
    }

    /// Append vertices and triangles, winding them around the face normal
    fn emit(
        &self,
        mesh: &mut Mesh,
        points_3d: &[Point3<f64>],
        points_2d: &[Point2<f64>],
        indices: &[usize],
        normal: Vector3<f64>,
        counter_clockwise: bool,
    ) {
        let base = mesh.vertex_count() as u32;
        for point in points_3d {
            mesh.add_vertex(*point, normal);
        }

        for triangle in indices.chunks_exact(3) {
            let (a, mut b, mut c) = (triangle[0], triangle[1], triangle[2]);
            if self.config.orient_triangles {
                let winding = cross_2d(&points_2d[a], &points_2d[b], &points_2d[c]);
                let wrong_way = if counter_clockwise {
                    winding < 0.0
                } else {
                    winding > 0.0
                };
                if wrong_way {
                    std::mem::swap(&mut b, &mut c);
                }
            }
            mesh.add_triangle(base + a as u32, base + b as u32, base + c as u32);
        }
    }
}

/// The declared outer bound, else the bound enclosing the largest area
fn outer_loop_index(loops: &[FaceLoop]) -> usize {
    if let Some(index) = loops.iter().position(|l| l.outer) {
        return index;
    }

    loops
        .iter()
        .enumerate()
        .map(|(i, l)| (i, signed_area(&l.projected).abs()))
        .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal))
        .map(|(i, _)| i)
        .unwrap_or(0)
}

#[inline]
fn cross_2d(a: &Point2<f64>, b: &Point2<f64>, c: &Point2<f64>) -> f64 {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::frame::Frame3D;
    use crate::topology::{Edge, EdgeLoop, FaceBound, OrientedEdge, Plane};

    fn edge_loop(id: RecordId, corners: &[[f64; 3]]) -> Arc<EdgeLoop> {
        let edges = (0..corners.len())
            .map(|i| OrientedEdge {
                edge: Edge {
                    start: Point3::from(corners[i]),
                    end: Point3::from(corners[(i + 1) % corners.len()]),
                    curve: None,
                },
                orientation: true,
            })
            .collect();
        Arc::new(EdgeLoop { id, edges })
    }

    fn bound(id: RecordId, corners: &[[f64; 3]], outer: bool) -> Arc<FaceBound> {
        Arc::new(FaceBound {
            id,
            edge_loop: edge_loop(id + 100, corners),
            orientation: true,
            outer,
        })
    }

    fn xy_face(bounds: Vec<Arc<FaceBound>>, same_sense: bool) -> AdvancedFace {
        AdvancedFace {
            id: 1,
            bounds,
            plane: Plane {
                id: 2,
                position: Frame3D {
                    id: 3,
                    origin: Point3::origin(),
                    axis: Vector3::z(),
                    ref_direction: Vector3::x(),
                },
            },
            same_sense,
        }
    }

    const SQUARE: [[f64; 3]; 4] = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 1.0, 0.0], [0.0, 1.0, 0.0]];

    fn triangle_normals(mesh: &Mesh) -> Vec<Vector3<f64>> {
        mesh.indices
            .chunks_exact(3)
            .map(|t| {
                let p = |i: u32| {
                    let i = i as usize * 3;
                    Point3::new(
                        mesh.positions[i] as f64,
                        mesh.positions[i + 1] as f64,
                        mesh.positions[i + 2] as f64,
                    )
                };
                (p(t[1]) - p(t[0])).cross(&(p(t[2]) - p(t[0])))
            })
            .collect()
    }

    #[test]
    fn test_square_patch() {
        let face = xy_face(vec![bound(10, &SQUARE, true)], true);
        let patch = MeshAssembler::default().face_patch(&face).unwrap();

        assert_eq!(patch.mesh.vertex_count(), 4);
        assert_eq!(patch.mesh.triangle_count(), 2);
        assert_eq!(patch.segments.len(), 4);
        assert!(patch.mesh.normals.chunks_exact(3).all(|n| n == [0.0, 0.0, 1.0]));
    }

    #[test]
    fn test_clockwise_loop_is_rewound() {
        let reversed: Vec<[f64; 3]> = SQUARE.iter().rev().copied().collect();
        let face = xy_face(vec![bound(10, &reversed, true)], true);
        let patch = MeshAssembler::default().face_patch(&face).unwrap();

        for n in triangle_normals(&patch.mesh) {
            assert!(n.z > 0.0);
        }
    }

    #[test]
    fn test_reversed_face_keeps_plane_normal() {
        let face = xy_face(vec![bound(10, &SQUARE, true)], false);
        let patch = MeshAssembler::default().face_patch(&face).unwrap();

        assert!(patch.mesh.normals.chunks_exact(3).all(|n| n == [0.0, 0.0, 1.0]));
        for n in triangle_normals(&patch.mesh) {
            assert!(n.z > 0.0);
        }
    }

    #[test]
    fn test_reversed_face_flips_when_sense_respected() {
        let face = xy_face(vec![bound(10, &SQUARE, true)], false);
        let config = ReconstructConfig::default().with_respect_face_sense(true);
        let patch = MeshAssembler::new(config).face_patch(&face).unwrap();

        assert!(patch.mesh.normals.chunks_exact(3).all(|n| n == [0.0, 0.0, -1.0]));
        for n in triangle_normals(&patch.mesh) {
            assert!(n.z < 0.0);
        }
    }

    #[test]
    fn test_reversed_bound_walks_loop_backwards() {
        let reversed = Arc::new(FaceBound {
            id: 10,
            edge_loop: edge_loop(110, &SQUARE),
            orientation: false,
            outer: true,
        });
        let face = xy_face(vec![reversed], true);
        let config = ReconstructConfig::default().with_orient_triangles(false);
        let patch = MeshAssembler::new(config).face_patch(&face).unwrap();

        // Loop reversed: last corner first, triangles clockwise about +z
        assert_eq!(&patch.mesh.positions[..3], &[0.0, 1.0, 0.0]);
        assert_eq!(patch.mesh.triangle_count(), 2);
        for n in triangle_normals(&patch.mesh) {
            assert!(n.z < 0.0);
        }
    }

    #[test]
    fn test_largest_bound_is_outer() {
        let outer = [[0.0, 0.0, 0.0], [10.0, 0.0, 0.0], [10.0, 10.0, 0.0], [0.0, 10.0, 0.0]];
        let hole = [[3.0, 3.0, 0.0], [7.0, 3.0, 0.0], [7.0, 7.0, 0.0], [3.0, 7.0, 0.0]];
        // Neither bound declared outer, hole listed first
        let face = xy_face(vec![bound(10, &hole, false), bound(11, &outer, false)], true);
        let patch = MeshAssembler::default().face_patch(&face).unwrap();

        assert_eq!(patch.mesh.vertex_count(), 8);
        assert_eq!(patch.mesh.triangle_count(), 8);
        // Outer vertices come first
        assert_eq!(&patch.mesh.positions[3..6], &[10.0, 0.0, 0.0]);
    }

    #[test]
    fn test_fill_mode_keeps_hole_area() {
        let outer = [[0.0, 0.0, 0.0], [10.0, 0.0, 0.0], [10.0, 10.0, 0.0], [0.0, 10.0, 0.0]];
        let hole = [[3.0, 3.0, 0.0], [7.0, 3.0, 0.0], [7.0, 7.0, 0.0], [3.0, 7.0, 0.0]];
        let face = xy_face(vec![bound(10, &outer, true), bound(11, &hole, false)], true);

        let config = ReconstructConfig::default().with_hole_mode(HoleMode::Fill);
        let patch = MeshAssembler::new(config).face_patch(&face).unwrap();

        assert_eq!(patch.mesh.vertex_count(), 8);
        assert_eq!(patch.mesh.triangle_count(), 4);
        assert_eq!(&patch.mesh.indices[6..], &[4, 5, 6, 4, 6, 7]);
    }

    #[test]
    fn test_open_loop_fails_face() {
        let face = AdvancedFace {
            bounds: vec![Arc::new(FaceBound {
                id: 10,
                edge_loop: Arc::new(EdgeLoop {
                    id: 42,
                    edges: vec![OrientedEdge {
                        edge: Edge {
                            start: Point3::origin(),
                            end: Point3::new(1.0, 0.0, 0.0),
                            curve: None,
                        },
                        orientation: true,
                    }],
                }),
                orientation: true,
                outer: true,
            })],
            ..xy_face(Vec::new(), true)
        };

        let err = MeshAssembler::default().face_patch(&face).unwrap_err();
        assert!(matches!(err, Error::DegenerateLoop { loop_id: 42, .. }));
    }

    #[test]
    fn test_face_without_bounds() {
        let face = xy_face(Vec::new(), true);
        assert!(matches!(
            MeshAssembler::default().face_patch(&face),
            Err(Error::Triangulation(_))
        ));
    }
}

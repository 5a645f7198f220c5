// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! STEP-Lite Geometry Processing
//!
//! Rebuilds planar B-rep solids from scanned STEP records: phase-ordered
//! entity resolution, edge-loop closing, per-face frame projection, earcutr
//! triangulation and mesh assembly with a debug overlay.
//!
//! ```rust
//! use step_lite_geometry::{reconstruct, ReconstructConfig};
//!
//! let solid = reconstruct("#1 = CARTESIAN_POINT('', (0., 0., 0.));", &ReconstructConfig::default());
//! assert!(solid.mesh.is_empty());
//! assert_eq!(solid.report.scan.decoded, 1);
//! ```

pub mod assembler;
pub mod config;
pub mod edge_loop;
pub mod error;
pub mod frame;
pub mod mesh;
pub mod resolve;
pub mod topology;
pub mod triangulation;

use std::path::Path;

use step_lite_core::RecordSet;
use tracing::debug_span;

// Re-export nalgebra types for convenience
pub use nalgebra::{Point2, Point3, Vector3};

pub use assembler::{FaceFailure, FacePatch, MeshAssembler, ReconstructionReport, SolidMesh};
#[cfg(feature = "serde")]
pub use assembler::{FailureView, ReportView};
pub use config::{HoleMode, ReconstructConfig, DEFAULT_TOLERANCE};
pub use edge_loop::{close_loop, Segment};
pub use error::{Error, Result};
pub use frame::{Frame3D, LocalFrame};
pub use mesh::{DebugOverlay, DebugSegment, Mesh};
pub use resolve::{EntityStores, ResolveStats};
pub use step_lite_core::{is_step_document, is_step_path, ScanStats};
pub use triangulation::{triangulate_polygon, triangulate_polygon_with_holes};

/// Reconstruct a solid from STEP text.
///
/// Never fails: dropped records and faces are reported in
/// [`SolidMesh::report`]. Every call starts from empty stores.
pub fn reconstruct(content: &str, config: &ReconstructConfig) -> SolidMesh {
    let _span = debug_span!("reconstruct", bytes = content.len()).entered();

    let records = RecordSet::scan(content);
    let stores = EntityStores::resolve(&records);
    MeshAssembler::new(*config).assemble(&stores, records.stats())
}

/// Reconstruct from raw bytes; fails only on non-UTF-8 input
pub fn reconstruct_bytes(data: &[u8], config: &ReconstructConfig) -> Result<SolidMesh> {
    let content = std::str::from_utf8(data)?;
    Ok(reconstruct(content, config))
}

/// Read and reconstruct a STEP file
pub fn reconstruct_file(path: impl AsRef<Path>, config: &ReconstructConfig) -> Result<SolidMesh> {
    let data = std::fs::read(path.as_ref())?;
    reconstruct_bytes(&data, config)
}

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Reconstructed solid handed to the renderer

use step_lite_geometry::{Mesh, ReportView, SolidMesh};
use wasm_bindgen::prelude::*;

/// Mesh buffers plus debug overlay for one STEP document
#[wasm_bindgen]
pub struct SolidMeshJs {
    mesh: Mesh,
    debug_lines: Vec<f32>,
    debug_points: Vec<f32>,
    report: ReportView,
}

impl From<SolidMesh> for SolidMeshJs {
    fn from(solid: SolidMesh) -> Self {
        Self {
            debug_lines: solid.overlay.segment_buffer(),
            debug_points: solid.overlay.point_buffer(),
            report: ReportView::from(&solid.report),
            mesh: solid.mesh,
        }
    }
}

#[wasm_bindgen]
impl SolidMeshJs {
    /// Get positions as Float32Array (copy to JS)
    #[wasm_bindgen(getter)]
    pub fn positions(&self) -> js_sys::Float32Array {
        js_sys::Float32Array::from(&self.mesh.positions[..])
    }

    /// Get normals as Float32Array (copy to JS)
    #[wasm_bindgen(getter)]
    pub fn normals(&self) -> js_sys::Float32Array {
        js_sys::Float32Array::from(&self.mesh.normals[..])
    }

    /// Get indices as Uint32Array (copy to JS)
    #[wasm_bindgen(getter)]
    pub fn indices(&self) -> js_sys::Uint32Array {
        js_sys::Uint32Array::from(&self.mesh.indices[..])
    }

    /// Loop segments as Float32Array, 6 floats (start, end) per segment
    #[wasm_bindgen(getter, js_name = debugLines)]
    pub fn debug_lines(&self) -> js_sys::Float32Array {
        js_sys::Float32Array::from(&self.debug_lines[..])
    }

    /// Vertex markers as Float32Array, 3 floats per point
    #[wasm_bindgen(getter, js_name = debugPoints)]
    pub fn debug_points(&self) -> js_sys::Float32Array {
        js_sys::Float32Array::from(&self.debug_points[..])
    }

    /// Get vertex count
    #[wasm_bindgen(getter, js_name = vertexCount)]
    pub fn vertex_count(&self) -> usize {
        self.mesh.vertex_count()
    }

    /// Get triangle count
    #[wasm_bindgen(getter, js_name = triangleCount)]
    pub fn triangle_count(&self) -> usize {
        self.mesh.triangle_count()
    }

    /// Number of faces that made it into the mesh
    #[wasm_bindgen(getter, js_name = faceCount)]
    pub fn face_count(&self) -> usize {
        self.report.faces
    }

    /// Number of faces dropped during reconstruction
    #[wasm_bindgen(getter, js_name = failureCount)]
    pub fn failure_count(&self) -> usize {
        self.report.failures.len()
    }

    /// Check if nothing was reconstructed
    #[wasm_bindgen(js_name = isEmpty)]
    pub fn is_empty(&self) -> bool {
        self.mesh.is_empty()
    }

    /// Bounding box as [minX, minY, minZ, maxX, maxY, maxZ], for camera framing
    #[wasm_bindgen]
    pub fn bounds(&self) -> Vec<f32> {
        let (min, max) = self.mesh.bounds();
        vec![min.x, min.y, min.z, max.x, max.y, max.z]
    }

    /// Reconstruction report (scan and resolve counters, dropped faces)
    #[wasm_bindgen(getter)]
    pub fn report(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.report).map_err(|e| JsValue::from_str(&e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use step_lite_geometry::{reconstruct, ReconstructConfig};

    const TRIANGLE: &str = "ISO-10303-21;
DATA;
#1 = CARTESIAN_POINT('', (0., 0., 0.));
#2 = DIRECTION('', (0., 0., 1.));
#3 = DIRECTION('', (1., 0., 0.));
#4 = AXIS2_PLACEMENT_3D('', #1, #2, #3);
#5 = PLANE('', #4);
#6 = CARTESIAN_POINT('', (2., 0., 0.));
#7 = CARTESIAN_POINT('', (0., 2., 0.));
#8 = VERTEX_POINT('', #1);
#9 = VERTEX_POINT('', #6);
#10 = VERTEX_POINT('', #7);
#11 = EDGE_CURVE('', #8, #9, $, .T.);
#12 = EDGE_CURVE('', #9, #10, $, .T.);
#13 = EDGE_CURVE('', #10, #8, $, .T.);
#14 = ORIENTED_EDGE('', *, *, #11, .T.);
#15 = ORIENTED_EDGE('', *, *, #12, .T.);
#16 = ORIENTED_EDGE('', *, *, #13, .T.);
#17 = EDGE_LOOP('', (#14, #15, #16));
#18 = FACE_OUTER_BOUND('', #17, .T.);
#19 = ADVANCED_FACE('', (#18), #5, .T.);
#20 = ADVANCED_FACE('', (#18), #99, .T.);
#21 = CLOSED_SHELL('', (#19, #20));
ENDSEC;
END-ISO-10303-21;
";

    #[test]
    fn test_solid_buffers() {
        let solid = SolidMeshJs::from(reconstruct(TRIANGLE, &ReconstructConfig::default()));

        assert_eq!(solid.vertex_count(), 3);
        assert_eq!(solid.triangle_count(), 1);
        assert_eq!(solid.face_count(), 1);
        assert_eq!(solid.debug_lines.len(), 3 * 6);
        assert_eq!(solid.debug_points.len(), 3 * 3);
        assert_eq!(solid.bounds(), vec![0.0, 0.0, 0.0, 2.0, 2.0, 0.0]);
    }

    #[test]
    fn test_report_serializes() {
        let solid = reconstruct(TRIANGLE, &ReconstructConfig::default());
        let report = ReportView::from(&solid.report);
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["shells"], 1);
        assert_eq!(json["faces"], 1);
        assert_eq!(json["resolve"]["dropped"], 1);
        assert!(json["failures"].as_array().unwrap().is_empty());
        assert!(json["scan"]["decoded"].as_u64().unwrap() >= 21);
    }
}

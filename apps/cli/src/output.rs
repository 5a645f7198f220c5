// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! JSON and OBJ writers for reconstructed solids

use std::io::{self, Write};

use serde_json::json;
use step_lite_geometry::{Mesh, ReportView, SolidMesh};

/// Mesh, overlay and report as one JSON document
pub fn write_json<W: Write>(writer: W, solid: &SolidMesh) -> serde_json::Result<()> {
    let document = json!({
        "mesh": solid.mesh,
        "overlay": solid.overlay,
        "report": ReportView::from(&solid.report),
    });
    serde_json::to_writer_pretty(writer, &document)
}

/// Wavefront OBJ with per-vertex normals, coordinates as in the document (Z-up)
pub fn write_obj<W: Write>(mut writer: W, mesh: &Mesh, name: &str) -> io::Result<()> {
    writeln!(writer, "# Generated by step-lite")?;
    writeln!(
        writer,
        "# {} vertices, {} triangles",
        mesh.vertex_count(),
        mesh.triangle_count()
    )?;
    writeln!(writer, "o {}", name)?;

    for p in mesh.positions.chunks_exact(3) {
        writeln!(writer, "v {:.6} {:.6} {:.6}", p[0], p[1], p[2])?;
    }
    for n in mesh.normals.chunks_exact(3) {
        writeln!(writer, "vn {:.6} {:.6} {:.6}", n[0], n[1], n[2])?;
    }
    // OBJ indices are 1-based
    for t in mesh.indices.chunks_exact(3) {
        let (i0, i1, i2) = (t[0] + 1, t[1] + 1, t[2] + 1);
        writeln!(writer, "f {}//{} {}//{} {}//{}", i0, i0, i1, i1, i2, i2)?;
    }

    writer.flush()
}

/// Human-readable summary of one reconstruction
pub fn summary(solid: &SolidMesh) -> String {
    let report = &solid.report;
    let mut out = format!(
        "records: {} decoded, {} malformed, {} unsupported, {} duplicate\n\
         resolve: {} resolved, {} dropped, {} unresolved references\n\
         mesh: {} shells, {} faces, {} vertices, {} triangles\n",
        report.scan.decoded,
        report.scan.malformed,
        report.scan.unsupported,
        report.scan.duplicates,
        report.resolve.resolved,
        report.resolve.dropped,
        report.resolve.unresolved,
        report.shells,
        report.faces,
        solid.mesh.vertex_count(),
        solid.mesh.triangle_count(),
    );

    if !solid.mesh.is_empty() {
        let (min, max) = solid.mesh.bounds();
        out.push_str(&format!(
            "bounds: ({}, {}, {}) - ({}, {}, {})\n",
            min.x, min.y, min.z, max.x, max.y, max.z
        ));
    }
    for failure in &report.failures {
        out.push_str(&format!("dropped face #{}: {}\n", failure.face_id, failure.error));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use step_lite_geometry::{reconstruct, ReconstructConfig};

    const SQUARE: &str = "ISO-10303-21;
DATA;
#1 = CARTESIAN_POINT('', (0., 0., 0.));
#2 = DIRECTION('', (0., 0., 1.));
#3 = DIRECTION('', (1., 0., 0.));
#4 = AXIS2_PLACEMENT_3D('', #1, #2, #3);
#5 = PLANE('', #4);
#6 = CARTESIAN_POINT('', (1., 0., 0.));
#7 = CARTESIAN_POINT('', (1., 1., 0.));
#8 = CARTESIAN_POINT('', (0., 1., 0.));
#9 = VERTEX_POINT('', #1);
#10 = VERTEX_POINT('', #6);
#11 = VERTEX_POINT('', #7);
#12 = VERTEX_POINT('', #8);
#13 = EDGE_CURVE('', #9, #10, $, .T.);
#14 = EDGE_CURVE('', #10, #11, $, .T.);
#15 = EDGE_CURVE('', #11, #12, $, .T.);
#16 = EDGE_CURVE('', #12, #9, $, .T.);
#17 = ORIENTED_EDGE('', *, *, #13, .T.);
#18 = ORIENTED_EDGE('', *, *, #14, .T.);
#19 = ORIENTED_EDGE('', *, *, #15, .T.);
#20 = ORIENTED_EDGE('', *, *, #16, .T.);
#21 = EDGE_LOOP('', (#17, #18, #19, #20));
#22 = FACE_OUTER_BOUND('', #21, .T.);
#23 = ADVANCED_FACE('', (#22), #5, .T.);
#24 = CLOSED_SHELL('', (#23));
ENDSEC;
END-ISO-10303-21;
";

    fn square() -> SolidMesh {
        reconstruct(SQUARE, &ReconstructConfig::default())
    }

    #[test]
    fn test_obj_output() {
        let mut buffer = Vec::new();
        write_obj(&mut buffer, &square().mesh, "square").unwrap();
        let obj = String::from_utf8(buffer).unwrap();

        assert!(obj.contains("o square\n"));
        assert_eq!(obj.lines().filter(|l| l.starts_with("v ")).count(), 4);
        assert_eq!(obj.lines().filter(|l| l.starts_with("vn ")).count(), 4);
        assert_eq!(obj.lines().filter(|l| l.starts_with("f ")).count(), 2);
        assert!(obj.contains("vn 0.000000 0.000000 1.000000"));
        assert!(!obj.contains("f 0"));
    }

    #[test]
    fn test_json_output() {
        let mut buffer = Vec::new();
        write_json(&mut buffer, &square()).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buffer).unwrap();

        assert_eq!(value["mesh"]["positions"].as_array().unwrap().len(), 12);
        assert_eq!(value["mesh"]["indices"].as_array().unwrap().len(), 6);
        assert_eq!(value["overlay"]["points"].as_array().unwrap().len(), 4);
        assert_eq!(value["overlay"]["segments"].as_array().unwrap().len(), 4);
        assert_eq!(value["report"]["faces"], 1);
        assert_eq!(value["report"]["scan"]["decoded"], 24);
    }

    #[test]
    fn test_summary_lists_failures() {
        let broken = SQUARE.replace(
            "#16 = EDGE_CURVE('', #12, #9, $, .T.);",
            "#16 = EDGE_CURVE('', #12, #11, $, .T.);",
        );
        let solid = reconstruct(&broken, &ReconstructConfig::default());
        let text = summary(&solid);

        assert!(text.contains("0 faces"));
        assert!(text.contains("dropped face #23"));

        let mut buffer = Vec::new();
        write_json(&mut buffer, &solid).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buffer).unwrap();
        assert_eq!(value["report"]["failures"][0]["faceId"], 23);
        assert!(value["report"]["failures"][0]["error"].as_str().unwrap().contains("21"));
    }
}

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Polygon triangulation utilities
//!
//! Wrapper around earcutr for 2D polygon triangulation.

use nalgebra::Point2;

use crate::error::{Error, Result};

/// Check if a polygon is convex (all cross products have same sign)
#[inline]
fn is_convex(points: &[Point2<f64>]) -> bool {
    if points.len() < 3 {
        return false;
    }

    let n = points.len();
    let mut sign = 0i8;

    for i in 0..n {
        let p0 = &points[i];
        let p1 = &points[(i + 1) % n];
        let p2 = &points[(i + 2) % n];

        let cross = (p1.x - p0.x) * (p2.y - p1.y) - (p1.y - p0.y) * (p2.x - p1.x);

        if cross.abs() > 1e-10 {
            let current_sign = if cross > 0.0 { 1i8 } else { -1i8 };
            if sign == 0 {
                sign = current_sign;
            } else if sign != current_sign {
                return false;
            }
        }
    }

    // All-collinear input has no turning direction
    sign != 0
}

/// Simple fan triangulation for convex polygons
#[inline]
fn fan_triangulate(n: usize) -> Vec<usize> {
    let mut indices = Vec::with_capacity((n - 2) * 3);
    for i in 1..n - 1 {
        indices.push(0);
        indices.push(i);
        indices.push(i + 1);
    }
    indices
}

/// Signed area (shoelace); positive for counter-clockwise polygons
#[inline]
pub fn signed_area(points: &[Point2<f64>]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }

    let mut twice_area = 0.0;
    for i in 0..n {
        let p = &points[i];
        let q = &points[(i + 1) % n];
        twice_area += p.x * q.y - q.x * p.y;
    }
    twice_area * 0.5
}

fn run_earcut(vertices: &[f64], hole_indices: &[usize]) -> Result<Vec<usize>> {
    let indices = earcutr::earcut(vertices, hole_indices, 2)
        .map_err(|e| Error::Triangulation(format!("{:?}", e)))?;

    if indices.is_empty() {
        return Err(Error::Triangulation(
            "polygon has no area (collinear or self-overlapping points)".to_string(),
        ));
    }
    Ok(indices)
}

/// Triangulate a simple polygon (no holes)
/// Returns triangle indices into the input points
#[inline]
pub fn triangulate_polygon(points: &[Point2<f64>]) -> Result<Vec<usize>> {
    let n = points.len();

    if n < 3 {
        return Err(Error::Triangulation(format!(
            "need at least 3 distinct points, got {}",
            n
        )));
    }

    // FAST PATH: Triangle - no triangulation needed
    if n == 3 {
        if signed_area(points).abs() <= f64::EPSILON {
            return Err(Error::Triangulation("triangle has no area".to_string()));
        }
        return Ok(vec![0, 1, 2]);
    }

    // FAST PATH: Convex polygon (quads included) - use fan triangulation
    if n <= 8 && is_convex(points) {
        return Ok(fan_triangulate(n));
    }

    let mut vertices = Vec::with_capacity(n * 2);
    for p in points {
        vertices.push(p.x);
        vertices.push(p.y);
    }

    run_earcut(&vertices, &[])
}

/// Triangulate a polygon with holes
/// Returns triangle indices into the combined vertex array (outer + all holes, in order)
///
/// Every hole must have at least 3 points; callers drop smaller ones before
/// building the combined vertex list so indices stay aligned.
#[inline]
pub fn triangulate_polygon_with_holes(
    outer: &[Point2<f64>],
    holes: &[Vec<Point2<f64>>],
) -> Result<Vec<usize>> {
    if outer.len() < 3 {
        return Err(Error::Triangulation(
            "need at least 3 points in outer boundary".to_string(),
        ));
    }

    // FAST PATH: No holes - use optimized simple triangulation
    if holes.is_empty() {
        return triangulate_polygon(outer);
    }

    if let Some(hole) = holes.iter().find(|h| h.len() < 3) {
        return Err(Error::Triangulation(format!(
            "hole with {} points cannot be cut out",
            hole.len()
        )));
    }

    let total_points: usize = outer.len() + holes.iter().map(|h| h.len()).sum::<usize>();
    let mut vertices = Vec::with_capacity(total_points * 2);

    for p in outer {
        vertices.push(p.x);
        vertices.push(p.y);
    }

    // Add holes and track their start indices
    let mut hole_indices = Vec::with_capacity(holes.len());
    for hole in holes {
        hole_indices.push(vertices.len() / 2);
        for p in hole {
            vertices.push(p.x);
            vertices.push(p.y);
        }
    }

    run_earcut(&vertices, &hole_indices)
}

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Edge-loop closing
//!
//! Loop edges are not guaranteed to be stored head-to-tail. The closer chains
//! them into a cycle, flipping edges whose endpoints are stored backwards.

use nalgebra::Point3;
use step_lite_core::RecordId;

use crate::error::{Error, Result};

/// Directed straight segment between two loop vertices
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub start: Point3<f64>,
    pub end: Point3<f64>,
}

impl Segment {
    #[inline]
    pub fn new(start: Point3<f64>, end: Point3<f64>) -> Self {
        Self { start, end }
    }

    /// Same segment traversed the other way
    #[inline]
    pub fn reversed(self) -> Self {
        Self {
            start: self.end,
            end: self.start,
        }
    }
}

/// Check whether two points coincide within `tolerance`
#[inline]
pub fn points_coincide(a: &Point3<f64>, b: &Point3<f64>, tolerance: f64) -> bool {
    (a - b).norm() <= tolerance
}

/// Reorder `segments` into a closed cycle.
///
/// The first segment seeds the chain as given. Each pass over the unconsumed
/// segments appends every one whose start (or, reversed, whose end) meets the
/// current tail. A pass that appends nothing, or a finished chain whose tail
/// does not meet its head, is a [`Error::DegenerateLoop`].
pub fn close_loop(loop_id: RecordId, segments: &[Segment], tolerance: f64) -> Result<Vec<Segment>> {
    let Some(&seed) = segments.first() else {
        return Err(Error::degenerate_loop(loop_id, "loop has no edges"));
    };

    let mut chain = Vec::with_capacity(segments.len());
    chain.push(seed);

    let mut consumed = vec![false; segments.len()];
    consumed[0] = true;
    let mut remaining = segments.len() - 1;

    while remaining > 0 {
        let mut progressed = false;

        for (i, segment) in segments.iter().enumerate() {
            if consumed[i] {
                continue;
            }
            let tail = chain[chain.len() - 1].end;

            let next = if points_coincide(&tail, &segment.start, tolerance) {
                *segment
            } else if points_coincide(&tail, &segment.end, tolerance) {
                segment.reversed()
            } else {
                continue;
            };

            chain.push(next);
            consumed[i] = true;
            remaining -= 1;
            progressed = true;
        }

        if !progressed {
            return Err(Error::degenerate_loop(
                loop_id,
                format!("{} of {} edges do not connect", remaining, segments.len()),
            ));
        }
    }

    let head = chain[0].start;
    let tail = chain[chain.len() - 1].end;
    if !points_coincide(&tail, &head, tolerance) {
        return Err(Error::degenerate_loop(loop_id, "chain does not return to its start"));
    }

    Ok(chain)
}

/// Loop vertices in traversal order with repeated points removed,
/// including a last point equal to the first
pub fn loop_points(chain: &[Segment], tolerance: f64) -> Vec<Point3<f64>> {
    let mut points: Vec<Point3<f64>> = Vec::with_capacity(chain.len());

    for segment in chain {
        match points.last() {
            Some(last) if points_coincide(last, &segment.start, tolerance) => {}
            _ => points.push(segment.start),
        }
    }

    while points.len() > 1 && points_coincide(&points[points.len() - 1], &points[0], tolerance) {
        points.pop();
    }

    points
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn seg(a: [f64; 3], b: [f64; 3]) -> Segment {
        Segment::new(Point3::from(a), Point3::from(b))
    }

    fn assert_cyclic(chain: &[Segment], tolerance: f64) {
        for i in 0..chain.len() {
            let next = &chain[(i + 1) % chain.len()];
            assert!(
                points_coincide(&chain[i].end, &next.start, tolerance),
                "segment {} does not meet segment {}",
                i,
                (i + 1) % chain.len()
            );
        }
    }

    #[test]
    fn test_already_ordered() {
        let square = vec![
            seg([0.0, 0.0, 0.0], [1.0, 0.0, 0.0]),
            seg([1.0, 0.0, 0.0], [1.0, 1.0, 0.0]),
            seg([1.0, 1.0, 0.0], [0.0, 1.0, 0.0]),
            seg([0.0, 1.0, 0.0], [0.0, 0.0, 0.0]),
        ];
        let chain = close_loop(1, &square, 1e-6).unwrap();
        assert_eq!(chain, square);
    }

    #[test]
    fn test_shuffled_and_reversed() {
        let edges = vec![
            seg([0.0, 0.0, 0.0], [1.0, 0.0, 0.0]),
            seg([0.0, 1.0, 0.0], [1.0, 1.0, 0.0]), // stored backwards
            seg([0.0, 0.0, 0.0], [0.0, 1.0, 0.0]), // stored backwards
            seg([1.0, 0.0, 0.0], [1.0, 1.0, 0.0]),
        ];
        let chain = close_loop(1, &edges, 1e-6).unwrap();

        assert_eq!(chain.len(), 4);
        assert_cyclic(&chain, 1e-6);
        assert_eq!(chain[0], edges[0]);
        assert_eq!(chain[1], edges[3]);
        assert_eq!(chain[2], edges[1].reversed());
        assert_eq!(chain[3], edges[2].reversed());
    }

    #[test]
    fn test_tolerant_matching() {
        let edges = vec![
            seg([0.0, 0.0, 0.0], [1.0, 0.0, 0.0]),
            seg([1.0 + 1e-9, 0.0, 0.0], [0.0, 1.0, 0.0]),
            seg([0.0, 1.0, 0.0], [0.0, -1e-9, 0.0]),
        ];
        assert!(close_loop(1, &edges, 1e-6).is_ok());
        assert!(close_loop(1, &edges, 1e-12).is_err());
    }

    #[test]
    fn test_disconnected_edges_terminate() {
        let edges = vec![
            seg([0.0, 0.0, 0.0], [1.0, 0.0, 0.0]),
            seg([5.0, 5.0, 0.0], [6.0, 5.0, 0.0]),
            seg([1.0, 0.0, 0.0], [0.0, 0.0, 0.0]),
        ];
        let err = close_loop(7, &edges, 1e-6).unwrap_err();
        assert!(matches!(err, Error::DegenerateLoop { loop_id: 7, .. }));
    }

    #[test]
    fn test_open_chain() {
        let edges = vec![
            seg([0.0, 0.0, 0.0], [1.0, 0.0, 0.0]),
            seg([1.0, 0.0, 0.0], [1.0, 1.0, 0.0]),
        ];
        assert!(matches!(
            close_loop(2, &edges, 1e-6),
            Err(Error::DegenerateLoop { loop_id: 2, .. })
        ));
    }

    #[test]
    fn test_empty_loop() {
        assert!(matches!(close_loop(3, &[], 1e-6), Err(Error::DegenerateLoop { .. })));
    }

    #[test]
    fn test_loop_points_drops_duplicates() {
        let chain = vec![
            seg([0.0, 0.0, 0.0], [1.0, 0.0, 0.0]),
            seg([1.0, 0.0, 0.0], [1.0, 0.0, 0.0]), // zero-length
            seg([1.0, 0.0, 0.0], [1.0, 1.0, 0.0]),
            seg([1.0, 1.0, 0.0], [0.0, 0.0, 0.0]),
        ];
        let points = loop_points(&chain, 1e-6);
        assert_eq!(points.len(), 3);
        assert_relative_eq!(points[2], Point3::new(1.0, 1.0, 0.0));
    }
}

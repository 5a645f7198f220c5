// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Face frames
//!
//! A [`Frame3D`] is the resolved AXIS2_PLACEMENT_3D of a plane. Building its
//! [`LocalFrame`] yields the change of basis used to flatten face loops into
//! the plane's 2D coordinates.

use nalgebra::{Matrix3, Point2, Point3, Vector3};
use step_lite_core::RecordId;

use crate::error::{Error, Result};

/// Below this length an axis has no usable direction
const MIN_AXIS_LENGTH: f64 = 1e-12;

/// Origin plus axis and reference directions
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame3D {
    pub id: RecordId,
    pub origin: Point3<f64>,
    /// Plane normal (local z)
    pub axis: Vector3<f64>,
    /// Reference direction (local x before orthogonalisation)
    pub ref_direction: Vector3<f64>,
}

impl Frame3D {
    /// Axis used when the placement leaves it unset
    #[inline]
    pub fn default_axis() -> Vector3<f64> {
        Vector3::z()
    }

    /// Reference direction used when the placement leaves it unset
    #[inline]
    pub fn default_ref_direction() -> Vector3<f64> {
        Vector3::x()
    }

    /// Build the right-handed local basis.
    ///
    /// `z` is the normalised axis, `x` the reference direction with its
    /// `z` component removed, and `y = z × x`. A `y = x × z` basis would
    /// mirror the 2D plane, so with `orient_triangles` off the raw earcut
    /// winding is the mirror of what such a frame produces.
    pub fn local_frame(&self) -> Result<LocalFrame> {
        let axis_length = self.axis.norm();
        if axis_length < MIN_AXIS_LENGTH {
            return Err(Error::degenerate_frame(self.id, "zero-length axis"));
        }
        let z = self.axis / axis_length;

        let x = self.ref_direction - z * self.ref_direction.dot(&z);
        let x_length = x.norm();
        if x_length < MIN_AXIS_LENGTH {
            return Err(Error::degenerate_frame(
                self.id,
                "reference direction is parallel to the axis",
            ));
        }
        let x = x / x_length;
        let y = z.cross(&x);

        let basis = Matrix3::from_columns(&[x, y, z]);
        let inverse = basis
            .try_inverse()
            .ok_or_else(|| Error::degenerate_frame(self.id, "singular basis"))?;

        Ok(LocalFrame {
            origin: self.origin,
            basis,
            inverse,
        })
    }
}

/// Change of basis between world and plane coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalFrame {
    origin: Point3<f64>,
    /// Columns are the local x, y, z axes in world space
    basis: Matrix3<f64>,
    inverse: Matrix3<f64>,
}

impl LocalFrame {
    /// Unit normal of the plane
    #[inline]
    pub fn normal(&self) -> Vector3<f64> {
        self.basis.column(2).into_owned()
    }

    /// World point to local coordinates: `inverse · (p − origin)`
    #[inline]
    pub fn to_local(&self, point: &Point3<f64>) -> Point3<f64> {
        Point3::from(self.inverse * (point - self.origin))
    }

    /// Local coordinates back to world space
    #[inline]
    pub fn to_world(&self, local: &Point3<f64>) -> Point3<f64> {
        self.origin + self.basis * local.coords
    }

    /// Local (x, y) of a world point; the distance from the plane is dropped
    #[inline]
    pub fn project(&self, point: &Point3<f64>) -> Point2<f64> {
        let local = self.to_local(point);
        Point2::new(local.x, local.y)
    }
}

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Reconstruction settings

use std::fmt;
use std::str::FromStr;

/// Default endpoint-matching tolerance for loop closing
pub const DEFAULT_TOLERANCE: f64 = 1e-6;

/// How inner face bounds are triangulated
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum HoleMode {
    /// Holes are cut out of the outer polygon
    #[default]
    Subtract,
    /// Every bound is filled as its own polygon
    Fill,
}

impl FromStr for HoleMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "subtract" => Ok(Self::Subtract),
            "fill" => Ok(Self::Fill),
            other => Err(format!("unknown hole mode '{}' (expected subtract or fill)", other)),
        }
    }
}

impl fmt::Display for HoleMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Subtract => write!(f, "subtract"),
            Self::Fill => write!(f, "fill"),
        }
    }
}

/// Settings for one reconstruction run
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ReconstructConfig {
    /// Distance under which two loop endpoints are the same point
    pub tolerance: f64,
    pub hole_mode: HoleMode,
    /// Wind every triangle counter-clockwise around its face normal
    pub orient_triangles: bool,
    /// Collect loop segments and vertex points for the debug overlay
    pub debug_overlay: bool,
    /// Negate the plane normal of faces whose same-sense flag is false;
    /// otherwise every face is shaded with its plane normal as stored
    pub respect_face_sense: bool,
}

impl Default for ReconstructConfig {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
            hole_mode: HoleMode::Subtract,
            orient_triangles: true,
            debug_overlay: true,
            respect_face_sense: false,
        }
    }
}

impl ReconstructConfig {
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_hole_mode(mut self, hole_mode: HoleMode) -> Self {
        self.hole_mode = hole_mode;
        self
    }

    pub fn with_orient_triangles(mut self, orient_triangles: bool) -> Self {
        self.orient_triangles = orient_triangles;
        self
    }

    pub fn with_debug_overlay(mut self, debug_overlay: bool) -> Self {
        self.debug_overlay = debug_overlay;
        self
    }

    pub fn with_respect_face_sense(mut self, respect_face_sense: bool) -> Self {
        self.respect_face_sense = respect_face_sense;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ReconstructConfig::default();
        assert_eq!(config.tolerance, DEFAULT_TOLERANCE);
        assert_eq!(config.hole_mode, HoleMode::Subtract);
        assert!(config.orient_triangles);
        assert!(config.debug_overlay);
        assert!(!config.respect_face_sense);
    }

    #[test]
    fn test_builder() {
        let config = ReconstructConfig::default()
            .with_tolerance(1e-3)
            .with_hole_mode(HoleMode::Fill)
            .with_orient_triangles(false)
            .with_debug_overlay(false)
            .with_respect_face_sense(true);
        assert_eq!(config.tolerance, 1e-3);
        assert_eq!(config.hole_mode, HoleMode::Fill);
        assert!(!config.orient_triangles);
        assert!(!config.debug_overlay);
        assert!(config.respect_face_sense);
    }

    #[test]
    fn test_hole_mode_from_str() {
        assert_eq!("fill".parse::<HoleMode>(), Ok(HoleMode::Fill));
        assert_eq!(" Subtract ".parse::<HoleMode>(), Ok(HoleMode::Subtract));
        assert!("xor".parse::<HoleMode>().is_err());
        assert_eq!(HoleMode::Fill.to_string(), "fill");
    }
}

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Reconstruction settings loaded from environment variables.

use step_lite_geometry::{HoleMode, ReconstructConfig, DEFAULT_TOLERANCE};

/// CLI configuration; command-line flags override these values.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Endpoint matching distance (`STEP_LITE_TOLERANCE`).
    pub tolerance: f64,
    /// Inner bound handling (`STEP_LITE_HOLE_MODE`).
    pub hole_mode: HoleMode,
    /// Wind triangles around the face normal (`STEP_LITE_ORIENT`).
    pub orient_triangles: bool,
    /// Collect debug segments and points (`STEP_LITE_DEBUG_OVERLAY`).
    pub debug_overlay: bool,
    /// Flip normals of reversed faces (`STEP_LITE_FACE_SENSE`).
    pub respect_face_sense: bool,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Load configuration through a variable lookup; missing or unparsable
    /// values fall back to defaults.
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            tolerance: lookup("STEP_LITE_TOLERANCE")
                .and_then(|v| parse_tolerance(&v).ok())
                .unwrap_or(DEFAULT_TOLERANCE),
            hole_mode: lookup("STEP_LITE_HOLE_MODE")
                .and_then(|v| v.parse().ok())
                .unwrap_or_default(),
            orient_triangles: lookup("STEP_LITE_ORIENT")
                .and_then(|v| parse_flag(&v))
                .unwrap_or(true),
            debug_overlay: lookup("STEP_LITE_DEBUG_OVERLAY")
                .and_then(|v| parse_flag(&v))
                .unwrap_or(true),
            respect_face_sense: lookup("STEP_LITE_FACE_SENSE")
                .and_then(|v| parse_flag(&v))
                .unwrap_or(false),
        }
    }

    /// Apply command-line overrides.
    pub fn with_overrides(
        mut self,
        tolerance: Option<f64>,
        hole_mode: Option<HoleMode>,
        no_orient: bool,
        no_debug: bool,
        respect_face_sense: bool,
    ) -> Self {
        if let Some(tolerance) = tolerance {
            self.tolerance = tolerance;
        }
        if let Some(hole_mode) = hole_mode {
            self.hole_mode = hole_mode;
        }
        if no_orient {
            self.orient_triangles = false;
        }
        if no_debug {
            self.debug_overlay = false;
        }
        if respect_face_sense {
            self.respect_face_sense = true;
        }
        self
    }

    pub fn reconstruct_config(&self) -> ReconstructConfig {
        ReconstructConfig::default()
            .with_tolerance(self.tolerance)
            .with_hole_mode(self.hole_mode)
            .with_orient_triangles(self.orient_triangles)
            .with_debug_overlay(self.debug_overlay)
            .with_respect_face_sense(self.respect_face_sense)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

/// Endpoint tolerance: a finite, non-negative distance
pub fn parse_tolerance(value: &str) -> Result<f64, String> {
    let tolerance: f64 = value
        .trim()
        .parse()
        .map_err(|_| format!("'{}' is not a number", value))?;
    if !tolerance.is_finite() || tolerance < 0.0 {
        return Err(format!("tolerance must be finite and non-negative, got {}", value));
    }
    Ok(tolerance)
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

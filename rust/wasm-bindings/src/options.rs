// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Reconstruction options passed from JavaScript
//!
//! ```javascript
//! api.parseSolid(content, { tolerance: 1e-5, holeMode: 'fill', debugOverlay: false });
//! ```

use serde::Deserialize;
use step_lite_geometry::{HoleMode, ReconstructConfig};

/// Plain options object; every field is optional
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReconstructOptions {
    pub tolerance: Option<f64>,
    pub hole_mode: Option<String>,
    pub orient_triangles: Option<bool>,
    pub debug_overlay: Option<bool>,
    pub respect_face_sense: Option<bool>,
}

impl ReconstructOptions {
    /// Overlay the given fields on the default configuration
    pub fn into_config(self) -> Result<ReconstructConfig, String> {
        let mut config = ReconstructConfig::default();

        if let Some(tolerance) = self.tolerance {
            if !tolerance.is_finite() || tolerance < 0.0 {
                return Err(format!("tolerance must be a non-negative number, got {}", tolerance));
            }
            config = config.with_tolerance(tolerance);
        }
        if let Some(mode) = self.hole_mode {
            config = config.with_hole_mode(mode.parse::<HoleMode>()?);
        }
        if let Some(orient) = self.orient_triangles {
            config = config.with_orient_triangles(orient);
        }
        if let Some(overlay) = self.debug_overlay {
            config = config.with_debug_overlay(overlay);
        }
        if let Some(respect) = self.respect_face_sense {
            config = config.with_respect_face_sense(respect);
        }

        Ok(config)
    }
}

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! JavaScript API for STEP-Lite

use step_lite_geometry::{is_step_document, reconstruct, reconstruct_bytes, ReconstructConfig};
use tracing::debug;
use wasm_bindgen::prelude::*;

use crate::options::ReconstructOptions;
use crate::solid::SolidMeshJs;

/// Main STEP-Lite API
#[wasm_bindgen]
pub struct StepLiteAPI {
    initialized: bool,
}

#[wasm_bindgen]
impl StepLiteAPI {
    /// Create and initialize the STEP API
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        crate::utils::set_panic_hook();

        Self { initialized: true }
    }

    /// Check if API is initialized
    #[wasm_bindgen(getter)]
    pub fn is_ready(&self) -> bool {
        self.initialized
    }

    /// Get version string
    #[wasm_bindgen(getter)]
    pub fn version(&self) -> String {
        env!("CARGO_PKG_VERSION").to_string()
    }

    /// Loader check: does the text carry an ISO-10303-21 header?
    #[wasm_bindgen(js_name = isStepDocument)]
    pub fn is_step_document(&self, content: &str) -> bool {
        is_step_document(content)
    }

    /// Reconstruct the planar solid described by a STEP document
    ///
    /// Example:
    /// ```javascript
    /// const api = new StepLiteAPI();
    /// const solid = api.parseSolid(stepText, { holeMode: 'subtract' });
    /// geometry.setAttribute('position', new BufferAttribute(solid.positions, 3));
    /// geometry.setIndex(new BufferAttribute(solid.indices, 1));
    /// ```
    #[wasm_bindgen(js_name = parseSolid)]
    pub fn parse_solid(&self, content: &str, options: JsValue) -> Result<SolidMeshJs, JsValue> {
        let config = config_from_js(options)?;
        let solid = reconstruct(content, &config);
        debug!(
            vertices = solid.mesh.vertex_count(),
            failures = solid.report.failures.len(),
            "parseSolid"
        );
        Ok(SolidMeshJs::from(solid))
    }

    /// Same as `parseSolid` but for raw file bytes (e.g. from a `FileReader`)
    #[wasm_bindgen(js_name = parseSolidBytes)]
    pub fn parse_solid_bytes(&self, data: &[u8], options: JsValue) -> Result<SolidMeshJs, JsValue> {
        let config = config_from_js(options)?;
        reconstruct_bytes(data, &config)
            .map(SolidMeshJs::from)
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }
}

impl Default for StepLiteAPI {
    fn default() -> Self {
        Self::new()
    }
}

/// `undefined`/`null` mean defaults
fn config_from_js(options: JsValue) -> Result<ReconstructConfig, JsValue> {
    if options.is_undefined() || options.is_null() {
        return Ok(ReconstructConfig::default());
    }

    let options: ReconstructOptions = serde_wasm_bindgen::from_value(options)
        .map_err(|e| JsValue::from_str(&format!("Invalid options: {}", e)))?;
    options.into_config().map_err(|e| JsValue::from_str(&e))
}

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! STEP-Lite WebAssembly Bindings
//!
//! JavaScript/TypeScript API for STEP-Lite built with wasm-bindgen. The
//! reconstruction is synchronous; call it from a Web Worker to keep the page
//! responsive.

use wasm_bindgen::prelude::*;

mod api;
mod console;
mod options;
mod solid;
mod utils;

pub use api::StepLiteAPI;
pub use console::init_logging;
pub use options::ReconstructOptions;
pub use solid::SolidMeshJs;
pub use utils::set_panic_hook;

/// Initialize the WASM module: panic hook plus console warnings for dropped
/// records and faces
#[wasm_bindgen(start)]
pub fn init() {
    set_panic_hook();
    init_logging(tracing::Level::WARN);
}

/// Get the version of STEP-Lite
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

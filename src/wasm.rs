//! JavaScript bindings for the GeoJSON entry point.

use wasm_bindgen::prelude::*;

use crate::interop::triangulate_geojson;
use crate::Triangulator;

#[wasm_bindgen]
pub fn init_panic_hook() {
    console_error_panic_hook::set_once();
}

/// Triangulates the Polygon / MultiPolygon features of a GeoJSON string and
/// returns a FeatureCollection of triangles.
#[wasm_bindgen]
pub fn triangulate(geojson_str: &str, optimize: bool) -> Result<String, JsValue> {
    let triangulator = Triangulator::new().with_optimize(optimize);
    triangulate_geojson(&triangulator, geojson_str)
        .map_err(|e| JsValue::from_str(&format!("Triangulation failed: {}", e)))
}

use wasm_bindgen::prelude::*;

/// Lay out a job given as JSON; returns the layout as JSON.
#[wasm_bindgen]
pub fn layout_json(json: &str) -> Result<String, JsValue> {
    let layout = crate::layout_job_json(json).map_err(|e| js_sys::Error::new(&e.to_string()))?;
    serde_json::to_string(&layout)
        .map_err(|e| JsValue::from(js_sys::Error::new(&format!("Serialize error: {}", e))))
}

use anyhow::{anyhow, Result};
use serde::Serialize;
use wasm_bindgen::JsValue;

pub(crate) fn js_err(e: impl ToString) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// Serialize through a JSON string and parse it on the JS side. Keeps
/// GeoJSON payloads and `null`s intact where `serde_wasm_bindgen` would
/// produce Maps or `undefined`.
pub(crate) fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue> {
    let text = serde_json::to_string(value).map_err(|e| anyhow!("Failed to serialize: {e}"))?;
    js_sys::JSON::parse(&text).map_err(|e| anyhow!("Failed to parse JSON on the JS side: {e:?}"))
}

pub(crate) fn is_present(value: &JsValue) -> bool {
    !value.is_undefined() && !value.is_null()
}

/// Echo warnings to the browser console.
pub(crate) fn console_warn(message: &str) {
    web_sys::console::warn_1(&JsValue::from_str(message));
}

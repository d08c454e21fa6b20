use wasm_bindgen::JsValue;

#[derive(Debug, Clone, thiserror::Error)]
pub enum FrontendError {
    #[error("Browser API unavailable: {0}")]
    Unavailable(&'static str),
    #[error("Camera error: {0}")]
    Camera(String),
    #[error("Capture error: {0}")]
    Capture(String),
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Navigation error: {0}")]
    Navigation(String),
}

/// Best-effort text for a thrown JS value.
pub fn describe(value: &JsValue) -> String {
    value.as_string().unwrap_or_else(|| format!("{:?}", value))
}

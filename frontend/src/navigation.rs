use gloo_storage::{ SessionStorage, Storage };
use shared::{ Handoff, WorkflowConfig };

use crate::error::{ describe, FrontendError };

/// Writes the detection result and preview for the results page.
///
/// Values are stored as plain strings so the results page can read them
/// without an extra layer of JSON quoting.
pub fn persist_handoff(handoff: &Handoff, config: &WorkflowConfig) -> Result<(), FrontendError> {
    let storage = SessionStorage::raw();
    for (key, value) in handoff.entries(config) {
        storage
            .set_item(key, value)
            .map_err(|e| FrontendError::Storage(format!("{}: {}", key, describe(&e))))?;
    }
    Ok(())
}

/// Full-page navigation.
pub fn navigate_to(path: &str) -> Result<(), FrontendError> {
    let window = web_sys::window().ok_or(FrontendError::Unavailable("window"))?;
    window
        .location()
        .set_href(path)
        .map_err(|e| FrontendError::Navigation(describe(&e)))
}

use serde_json::Value;

use crate::config::WorkflowConfig;

/// What the results page picks up from session storage after a successful detection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Handoff {
    pub result_json: String,
    pub preview_data_uri: String,
}

impl Handoff {
    pub fn new(body: &Value, preview_data_uri: impl Into<String>) -> Self {
        Self {
            result_json: body.to_string(),
            preview_data_uri: preview_data_uri.into(),
        }
    }

    pub fn entries<'a>(&'a self, config: &'a WorkflowConfig) -> [(&'a str, &'a str); 2] {
        [
            (config.result_storage_key.as_str(), self.result_json.as_str()),
            (config.image_storage_key.as_str(), self.preview_data_uri.as_str()),
        ]
    }
}

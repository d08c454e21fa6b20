use serde::{ Deserialize, Serialize };

/// Endpoints, storage keys and names the detection page relies on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowConfig {
    pub detect_endpoint: String,
    pub upload_field: String,
    pub results_path: String,
    pub home_path: String,
    pub result_storage_key: String,
    pub image_storage_key: String,
    pub capture_file_name: String,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            detect_endpoint: "/detect".to_string(),
            upload_field: "image".to_string(),
            results_path: "/chatbot".to_string(),
            home_path: "/".to_string(),
            result_storage_key: "detectionResult".to_string(),
            image_storage_key: "uploadedImage".to_string(),
            capture_file_name: "capture.jpg".to_string(),
        }
    }
}

impl WorkflowConfig {
    /// Overlays a (possibly partial) JSON document on the defaults.
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_override_keeps_defaults() {
        let config = WorkflowConfig::from_json(r#"{"detect_endpoint":"/api/detect"}"#).unwrap();
        assert_eq!(config.detect_endpoint, "/api/detect");
        assert_eq!(config.upload_field, "image");
        assert_eq!(config.results_path, "/chatbot");
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(WorkflowConfig::from_json("{detect_endpoint").is_err());
    }
}

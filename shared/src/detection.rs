use serde::{ Deserialize, Serialize };
use serde_json::Value;

pub const GENERIC_REJECTION: &str = "Gambar yang diunggah bukan gambar penyakit daun tanaman padi";

/// One entry of the `detections` array, as far as this page cares about it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    #[serde(default)]
    pub status: Option<String>,
    pub label: String,
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DetectionOutcome {
    /// HTTP success with a detections field. The body is forwarded untouched.
    Success {
        body: Value,
    },
    /// The server answered but did not produce detections.
    Rejected {
        message: String,
    },
    /// The request never completed or the body was not JSON.
    Unreachable,
}

impl DetectionOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, DetectionOutcome::Success { .. })
    }

    pub fn first_detection(&self) -> Option<Detection> {
        match self {
            DetectionOutcome::Success { body } => body
                .get("detections")
                .and_then(|d| d.get(0))
                .and_then(|d| serde_json::from_value(d.clone()).ok()),
            _ => None,
        }
    }
}

/// Classifies a `/detect` response from its HTTP status class and raw body.
pub fn classify_response(http_ok: bool, body: &str) -> DetectionOutcome {
    let parsed: Value = match serde_json::from_str(body) {
        Ok(value) => value,
        Err(e) => {
            log::error!("Detection response is not JSON: {}", e);
            return DetectionOutcome::Unreachable;
        }
    };

    let has_detections = parsed.get("detections").is_some_and(is_truthy);
    if http_ok && has_detections {
        return DetectionOutcome::Success { body: parsed };
    }

    let message = server_message(&parsed).unwrap_or_else(|| GENERIC_REJECTION.to_string());

    DetectionOutcome::Rejected { message }
}

fn server_message(body: &Value) -> Option<String> {
    body.get("error")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

// Mirrors how a browser script would test the field before trusting it.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

use gloo_net::http::Request;
use shared::{ classify_response, DetectionOutcome, WorkflowConfig };
use web_sys::{ File, FormData };

use crate::error::describe;

/// Posts the staged image to the detection endpoint and classifies the answer.
///
/// Every failure mode collapses into a `DetectionOutcome`; nothing here panics.
pub async fn send_detection(config: &WorkflowConfig, file: &File) -> DetectionOutcome {
    let form_data = match FormData::new() {
        Ok(form_data) => form_data,
        Err(e) => {
            log::error!("Failed to create form data: {}", describe(&e));
            return DetectionOutcome::Unreachable;
        }
    };
    if let Err(e) = form_data.append_with_blob_and_filename(&config.upload_field, file, &file.name()) {
        log::error!("Failed to attach image: {}", describe(&e));
        return DetectionOutcome::Unreachable;
    }

    let request = match Request::post(&config.detect_endpoint).body(form_data) {
        Ok(request) => request,
        Err(e) => {
            log::error!("Failed to build detection request: {}", e);
            return DetectionOutcome::Unreachable;
        }
    };

    match request.send().await {
        Ok(response) => {
            let status = response.status();
            let http_ok = response.ok();
            match response.text().await {
                Ok(body) => {
                    log::info!("{} answered {}", config.detect_endpoint, status);
                    classify_response(http_ok, &body)
                }
                Err(e) => {
                    log::error!("Failed to read detection response ({}): {}", status, e);
                    DetectionOutcome::Unreachable
                }
            }
        }
        Err(e) => {
            log::error!("Network error: {}", e);
            DetectionOutcome::Unreachable
        }
    }
}

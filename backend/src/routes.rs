use actix_files::Files;
use actix_multipart::{ Field, Multipart };
use actix_web::{ http::StatusCode, web, HttpResponse };
use futures::{ StreamExt, TryStreamExt };
use log::{ error, info, warn };
use serde_json::json;
use shared::media::extension_allowed;

use crate::config::ServerConfig;
use crate::error::ApiError;

const IMAGE_FIELD: &str = "image";

struct Upload {
    file_name: String,
    content_type: String,
    bytes: Vec<u8>,
}

pub fn configure_routes(cfg: &mut web::ServiceConfig, frontend_dir: String) {
    cfg.service(web::resource("/detect").route(web::post().to(handle_detect)))
        .service(web::resource("/health").route(web::get().to(health)))
        .service(Files::new("/", frontend_dir).index_file("index.html"));
}

async fn health() -> HttpResponse {
    HttpResponse::Ok().json(json!({ "status": "ok" }))
}

/// Accepts a multipart upload with an `image` field and relays it to the detection service.
async fn handle_detect(
    config: web::Data<ServerConfig>,
    client: web::Data<reqwest::Client>,
    mut payload: Multipart
) -> Result<HttpResponse, ApiError> {
    let upstream = config.detect_upstream.as_deref().ok_or(ApiError::NoUpstream)?;

    let mut upload = None;
    while let Some(field) = payload.try_next().await? {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }
        upload = Some(read_image_field(field, config.max_upload_bytes).await?);
        break;
    }
    let upload = upload.ok_or(ApiError::MissingImage)?;

    info!(
        "Forwarding {} ({}, {} bytes) to {}",
        upload.file_name,
        upload.content_type,
        upload.bytes.len(),
        upstream
    );

    let form = reqwest::multipart::Form::new().part(IMAGE_FIELD, upstream_part(upload)?);

    let response = client
        .post(upstream)
        .multipart(form)
        .send().await
        .map_err(|e| {
            error!("Detection service unreachable: {}", e);
            ApiError::Upstream(e)
        })?;

    let status = response.status().as_u16();
    let body: serde_json::Value = response
        .json().await
        .map_err(|e| ApiError::UpstreamBody(e.to_string()))?;

    if status >= 400 {
        warn!("Detection service answered {}: {}", status, body);
    }

    let status = StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY);
    Ok(HttpResponse::build(status).json(body))
}

fn upstream_part(upload: Upload) -> Result<reqwest::multipart::Part, ApiError> {
    reqwest::multipart::Part::bytes(upload.bytes)
        .file_name(upload.file_name)
        .mime_str(&upload.content_type)
        .map_err(|e| {
            warn!("Rejected upload with content type {:?}: {}", upload.content_type, e);
            ApiError::UnsupportedFormat
        })
}

async fn read_image_field(mut field: Field, limit: usize) -> Result<Upload, ApiError> {
    let file_name = field
        .content_disposition()
        .and_then(|cd| cd.get_filename())
        .map(str::to_string)
        .unwrap_or_default();
    if !extension_allowed(&file_name) {
        warn!("Rejected upload with file name {:?}", file_name);
        return Err(ApiError::UnsupportedFormat);
    }

    let content_type = field
        .content_type()
        .map(|mime| mime.to_string())
        .unwrap_or_else(|| "application/octet-stream".to_string());

    let mut bytes = Vec::new();
    while let Some(chunk) = field.next().await {
        let chunk = chunk?;
        if bytes.len() + chunk.len() > limit {
            return Err(ApiError::TooLarge(limit));
        }
        bytes.extend_from_slice(&chunk);
    }

    if bytes.is_empty() {
        return Err(ApiError::MissingImage);
    }

    Ok(Upload {
        file_name,
        content_type,
        bytes,
    })
}

use actix_multipart::MultipartError;
use actix_web::{ http::StatusCode, HttpResponse, ResponseError };
use serde::Serialize;

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Model tidak tersedia")]
    NoUpstream,
    #[error("Tidak ada gambar yang diunggah")]
    MissingImage,
    #[error("Format file tidak didukung")]
    UnsupportedFormat,
    #[error("Ukuran gambar melebihi batas {0} byte")]
    TooLarge(usize),
    #[error("Gagal membaca unggahan: {0}")]
    Multipart(#[from] MultipartError),
    #[error("Layanan deteksi tidak dapat dihubungi: {0}")]
    Upstream(#[from] reqwest::Error),
    #[error("Respons layanan deteksi tidak valid: {0}")]
    UpstreamBody(String),
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NoUpstream => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::MissingImage | ApiError::UnsupportedFormat | ApiError::Multipart(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::TooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::Upstream(_) | ApiError::UpstreamBody(_) => StatusCode::BAD_GATEWAY,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorResponse { error: self.to_string() })
    }
}

use strum_macros::Display;

use crate::workflow::WorkflowError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum NoticeKind {
    Success,
    Error,
}

/// A blocking message shown to the user until dismissed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub title: String,
    pub text: String,
}

impl Notice {
    fn error(title: &str, text: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            title: title.to_string(),
            text: text.into(),
        }
    }

    pub fn unsupported_format() -> Self {
        Self::error("Format Tidak Didukung", "Silakan unggah gambar JPG, JPEG, atau PNG.")
    }

    pub fn camera_failed() -> Self {
        Self::error("Error", "Gagal mengakses kamera")
    }

    pub fn read_failed() -> Self {
        Self::error("Error", "Gagal membaca gambar")
    }

    pub fn detection_succeeded() -> Self {
        Self {
            kind: NoticeKind::Success,
            title: "Deteksi Berhasil".to_string(),
            text: "Gambar berhasil diproses".to_string(),
        }
    }

    pub fn detection_failed(message: impl Into<String>) -> Self {
        Self::error("Error", message)
    }

    pub fn connection_failed() -> Self {
        Self::error("Error", "Gagal terhubung ke server")
    }

    pub fn is_success(&self) -> bool {
        self.kind == NoticeKind::Success
    }
}

impl From<&WorkflowError> for Notice {
    fn from(err: &WorkflowError) -> Self {
        match err {
            WorkflowError::UnsupportedFormat(_) => Notice::unsupported_format(),
            WorkflowError::NoImage => Notice::error("Error", "Silakan pilih gambar terlebih dahulu"),
            WorkflowError::Busy => Notice::error("Error", "Deteksi sedang berlangsung, mohon tunggu"),
            WorkflowError::CameraBusy => Notice::error("Error", "Tutup kamera terlebih dahulu"),
            WorkflowError::CameraClosed => Notice::error("Error", "Kamera tidak aktif"),
            WorkflowError::Navigated => Notice::error("Error", "Halaman sedang dialihkan"),
            WorkflowError::Superseded => Notice::error("Error", "Gambar telah diganti dengan pilihan terbaru"),
        }
    }
}

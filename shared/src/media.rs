use std::str::FromStr;

use strum_macros::{ Display, EnumString, IntoStaticStr };

use crate::workflow::WorkflowError;

/// MIME types the detection page accepts from the file picker and drag-and-drop.
pub const ALLOWED_TYPES: [&str; 3] = ["image/jpeg", "image/png", "image/jpg"];

const ALLOWED_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, IntoStaticStr)]
pub enum MediaType {
    #[strum(serialize = "image/jpeg")]
    Jpeg,
    #[strum(serialize = "image/png")]
    Png,
    #[strum(serialize = "image/jpg")]
    Jpg,
}

impl MediaType {
    pub fn as_mime(&self) -> &'static str {
        (*self).into()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum ImageSource {
    File,
    Drag,
    Camera,
}

/// Checks a candidate's declared media type.
///
/// Camera captures are always encoded as JPEG by the page itself, so they skip
/// the check entirely.
pub fn validate_candidate(declared_type: &str, source: ImageSource) -> Result<MediaType, WorkflowError> {
    if source == ImageSource::Camera {
        return Ok(MediaType::Jpeg);
    }

    MediaType::from_str(declared_type).map_err(|_| {
        log::warn!("Rejected {} candidate with type {:?}", source, declared_type);
        WorkflowError::UnsupportedFormat(declared_type.to_string())
    })
}

/// Extension check applied to uploaded file names on the server side.
pub fn extension_allowed(file_name: &str) -> bool {
    file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .is_some_and(|ext| ALLOWED_EXTENSIONS.contains(&ext.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_each_allowed_type() {
        for mime in ALLOWED_TYPES {
            let media = validate_candidate(mime, ImageSource::File).unwrap();
            assert_eq!(media.as_mime(), mime);
        }
    }

    #[test]
    fn rejects_gif_from_drop() {
        let err = validate_candidate("image/gif", ImageSource::Drag).unwrap_err();
        assert_eq!(err, WorkflowError::UnsupportedFormat("image/gif".into()));
    }

    #[test]
    fn rejects_empty_and_case_variants() {
        assert!(validate_candidate("", ImageSource::File).is_err());
        assert!(validate_candidate("IMAGE/PNG", ImageSource::File).is_err());
        assert!(validate_candidate("image/webp", ImageSource::File).is_err());
    }

    #[test]
    fn camera_capture_is_exempt() {
        assert_eq!(validate_candidate("", ImageSource::Camera).unwrap(), MediaType::Jpeg);
    }

    #[test]
    fn source_display_names() {
        assert_eq!(ImageSource::Drag.to_string(), "drag");
        assert_eq!(ImageSource::Camera.to_string(), "camera");
    }

    #[test]
    fn extension_check() {
        assert!(extension_allowed("leaf.PNG"));
        assert!(extension_allowed("capture.jpg"));
        assert!(extension_allowed("a.b.jpeg"));
        assert!(!extension_allowed("leaf.gif"));
        assert!(!extension_allowed("jpeg"));
        assert!(!extension_allowed(""));
    }
}

use js_sys::{ Array, Object, Promise, Reflect };
use shared::{ CameraStream, PendingImage };
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{
    CanvasRenderingContext2d,
    File,
    FilePropertyBag,
    HtmlCanvasElement,
    HtmlVideoElement,
    MediaStream,
    MediaStreamConstraints,
    MediaStreamTrack,
    MediaStreamTrackState,
};

use crate::error::{ describe, FrontendError };

const JPEG: &str = "image/jpeg";

/// A granted `getUserMedia` stream.
pub struct BrowserCamera {
    stream: MediaStream,
}

impl BrowserCamera {
    /// Asks for the rear-facing camera, video only.
    pub async fn open() -> Result<Self, FrontendError> {
        let window = web_sys::window().ok_or(FrontendError::Unavailable("window"))?;
        let devices = window
            .navigator()
            .media_devices()
            .map_err(|e| FrontendError::Camera(describe(&e)))?;

        let video = Object::new();
        Reflect::set(&video, &"facingMode".into(), &"environment".into())
            .map_err(|e| FrontendError::Camera(describe(&e)))?;

        let constraints = MediaStreamConstraints::new();
        constraints.set_video(&video);
        constraints.set_audio(&JsValue::FALSE);

        let promise = devices
            .get_user_media_with_constraints(&constraints)
            .map_err(|e| FrontendError::Camera(describe(&e)))?;
        let stream = JsFuture::from(promise)
            .await
            .map_err(|e| FrontendError::Camera(describe(&e)))?
            .dyn_into::<MediaStream>()
            .map_err(|e| FrontendError::Camera(describe(&e)))?;

        log::info!("Camera access granted");
        Ok(Self { stream })
    }

    pub fn stream(&self) -> &MediaStream {
        &self.stream
    }

    fn tracks(&self) -> Vec<MediaStreamTrack> {
        self.stream
            .get_tracks()
            .iter()
            .filter_map(|track| track.dyn_into::<MediaStreamTrack>().ok())
            .collect()
    }
}

impl CameraStream for BrowserCamera {
    fn stop_all(&mut self) {
        for track in self.tracks() {
            track.stop();
        }
    }

    fn active_tracks(&self) -> usize {
        self.tracks()
            .iter()
            .filter(|track| track.ready_state() == MediaStreamTrackState::Live)
            .count()
    }
}

/// Grabs the current video frame at its native resolution and encodes it as JPEG.
pub async fn capture_frame(
    video: &HtmlVideoElement,
    canvas: &HtmlCanvasElement,
    file_name: &str
) -> Result<PendingImage<File>, FrontendError> {
    let (width, height) = (video.video_width(), video.video_height());
    if width == 0 || height == 0 {
        return Err(FrontendError::Capture("video has no frame yet".into()));
    }

    canvas.set_width(width);
    canvas.set_height(height);

    let context = canvas
        .get_context("2d")
        .map_err(|e| FrontendError::Capture(describe(&e)))?
        .ok_or(FrontendError::Unavailable("2d canvas context"))?
        .dyn_into::<CanvasRenderingContext2d>()
        .map_err(|e| FrontendError::Capture(describe(&e)))?;
    context
        .draw_image_with_html_video_element(video, 0.0, 0.0)
        .map_err(|e| FrontendError::Capture(describe(&e)))?;

    let preview = canvas
        .to_data_url_with_type(JPEG)
        .map_err(|e| FrontendError::Capture(describe(&e)))?;
    let blob = canvas_to_jpeg(canvas).await?;

    let options = FilePropertyBag::new();
    options.set_type(JPEG);
    let file = File::new_with_blob_sequence_and_options(&Array::of1(&blob), file_name, &options)
        .map_err(|e| FrontendError::Capture(describe(&e)))?;

    log::info!("Captured {}x{} frame ({} bytes)", width, height, file.size());
    Ok(PendingImage::captured(file, preview, width, height))
}

async fn canvas_to_jpeg(canvas: &HtmlCanvasElement) -> Result<JsValue, FrontendError> {
    let mut failure = None;
    let promise = Promise::new(
        &mut (|resolve: js_sys::Function, _reject: js_sys::Function| {
            let on_blob = Closure::once_into_js(move |blob: JsValue| {
                let _ = resolve.call1(&JsValue::NULL, &blob);
            });
            if let Err(e) = canvas.to_blob_with_type(on_blob.unchecked_ref(), JPEG) {
                failure = Some(describe(&e));
            }
        })
    );

    if let Some(reason) = failure {
        return Err(FrontendError::Capture(reason));
    }

    let blob = JsFuture::from(promise)
        .await
        .map_err(|e| FrontendError::Capture(describe(&e)))?;
    if blob.is_null() {
        return Err(FrontendError::Capture("canvas produced no image".into()));
    }
    Ok(blob)
}

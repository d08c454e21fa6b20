use super::super::{ go_to, Model, Msg };
use crate::api::send_detection;
use crate::camera::{ capture_frame, BrowserCamera };
use crate::error::FrontendError;
use gloo_file::File as GlooFile;
use shared::{
    validate_candidate,
    CandidateTicket,
    DetectionOutcome,
    DetectionTicket,
    ImageSource,
    Notice,
    PendingImage,
    WorkflowError,
};
use wasm_bindgen_futures::spawn_local;
use web_sys::{ DragEvent, File, HtmlCanvasElement, HtmlInputElement, HtmlVideoElement };
use yew::prelude::*;

pub fn handle_open_source_chooser(model: &mut Model) -> bool {
    if !model.workflow.can_choose_source() {
        return false;
    }
    model.chooser_open = true;
    true
}

pub fn handle_choose_gallery(model: &mut Model) -> bool {
    model.chooser_open = false;
    match model.file_input.cast::<HtmlInputElement>() {
        Some(input) => input.click(),
        None => log::error!("File input is not mounted"),
    }
    true
}

pub fn handle_choose_camera(model: &mut Model, ctx: &Context<Model>) -> bool {
    model.chooser_open = false;
    if model.workflow.is_camera_open() {
        return true;
    }

    let link = ctx.link().clone();
    spawn_local(async move {
        match BrowserCamera::open().await {
            Ok(camera) => link.send_message(Msg::CameraGranted(camera)),
            Err(e) => link.send_message(Msg::CameraFailed(e)),
        }
    });
    true
}

/// Validates a picked or dropped file, then reads it for the preview.
pub fn handle_candidate(model: &mut Model, ctx: &Context<Model>, file: File, source: ImageSource) -> bool {
    let media_type = match validate_candidate(&file.type_(), source) {
        Ok(media_type) => media_type,
        Err(err) => {
            model.notice = Some(Notice::from(&err));
            return true;
        }
    };
    let ticket = match model.workflow.begin_candidate() {
        Ok(ticket) => ticket,
        Err(err) => {
            log::warn!("Candidate refused: {}", err);
            model.notice = Some(Notice::from(&err));
            return true;
        }
    };

    let link = ctx.link().clone();
    spawn_local(async move {
        let blob = GlooFile::from(file.clone());
        match gloo_file::futures::read_as_data_url(&blob).await {
            Ok(data_uri) => {
                let image = PendingImage::new(file, media_type, source, data_uri);
                link.send_message(Msg::CandidateReady(ticket, image))
            }
            Err(e) => link.send_message(Msg::CandidateUnreadable(e.to_string())),
        }
    });
    false
}

pub fn handle_candidate_ready(model: &mut Model, ticket: CandidateTicket, image: PendingImage<File>) -> bool {
    match model.workflow.accept(ticket, image) {
        Ok(()) => true,
        Err(WorkflowError::Superseded) => {
            log::info!("Candidate replaced by a newer choice before it finished loading");
            false
        }
        Err(e) => {
            log::warn!("Candidate discarded: {}", e);
            model.notice = Some(Notice::from(&e));
            true
        }
    }
}

pub fn handle_candidate_unreadable(model: &mut Model, reason: String) -> bool {
    log::error!("Failed to read image: {}", reason);
    model.notice = Some(Notice::read_failed());
    true
}

pub fn handle_drop(model: &mut Model, ctx: &Context<Model>, event: DragEvent) -> bool {
    event.prevent_default();
    model.is_dragging = false;

    let file = event
        .data_transfer()
        .and_then(|data_transfer| data_transfer.files())
        .and_then(|files| files.item(0));

    match file {
        Some(file) => {
            handle_candidate(model, ctx, file, ImageSource::Drag);
        }
        None => log::warn!("Drop carried no file"),
    }
    true
}

fn detach_video(model: &Model) {
    if let Some(video) = model.video.cast::<HtmlVideoElement>() {
        video.set_src_object(None);
    }
}

pub fn handle_camera_granted(model: &mut Model, camera: BrowserCamera) -> bool {
    let stream = camera.stream().clone();
    if let Err(e) = model.workflow.camera_opened(camera) {
        log::warn!("Camera stream refused: {}", e);
        return false;
    }

    if let Some(video) = model.video.cast::<HtmlVideoElement>() {
        // iOS only renders inline, muted video without a user gesture
        video.set_muted(true);
        let _ = video.set_attribute("playsinline", "true");
        video.set_src_object(Some(&stream));
    }
    true
}

pub fn handle_camera_failed(model: &mut Model, err: FrontendError) -> bool {
    log::error!("Failed to open camera: {}", err);
    model.notice = Some(Notice::camera_failed());
    true
}

pub fn handle_capture(model: &mut Model, ctx: &Context<Model>) -> bool {
    let (Some(video), Some(canvas)) = (
        model.video.cast::<HtmlVideoElement>(),
        model.canvas.cast::<HtmlCanvasElement>(),
    ) else {
        log::error!("Camera elements are not mounted");
        return false;
    };

    let file_name = model.config.capture_file_name.clone();
    let link = ctx.link().clone();
    spawn_local(async move {
        let result = capture_frame(&video, &canvas, &file_name).await;
        link.send_message(Msg::FrameCaptured(result));
    });
    false
}

pub fn handle_frame_captured(model: &mut Model, result: Result<PendingImage<File>, FrontendError>) -> bool {
    match result {
        Ok(image) => {
            if let Err(e) = model.workflow.capture(image) {
                log::warn!("Captured frame discarded: {}", e);
            }
        }
        Err(e) => {
            log::error!("Capture failed: {}", e);
            let _ = model.workflow.cancel_camera();
            model.notice = Some(Notice::camera_failed());
        }
    }
    detach_video(model);
    true
}

pub fn handle_cancel_camera(model: &mut Model) -> bool {
    if let Err(e) = model.workflow.cancel_camera() {
        log::warn!("Cancel ignored: {}", e);
    }
    detach_video(model);
    true
}

pub fn handle_detect(model: &mut Model, ctx: &Context<Model>) -> bool {
    let ticket = match model.workflow.begin_detection() {
        Ok(ticket) => ticket,
        Err(e) => {
            log::warn!("Detection not started: {}", e);
            return false;
        }
    };
    let Some(file) = model.workflow.pending().map(|image| image.payload.clone()) else {
        return false;
    };

    let config = model.config.clone();
    let link = ctx.link().clone();
    spawn_local(async move {
        let outcome = send_detection(&config, &file).await;
        link.send_message(Msg::DetectionFinished(ticket, outcome));
    });
    true
}

pub fn handle_detection_finished(
    model: &mut Model,
    ticket: DetectionTicket,
    outcome: DetectionOutcome
) -> bool {
    if let Some(detection) = outcome.first_detection() {
        log::info!("Detected {} ({:.1}%)", detection.label, detection.confidence * 100.0);
    }

    let Some(completion) = model.workflow.complete_detection(ticket, outcome) else {
        return false;
    };

    if let Some(handoff) = completion.handoff {
        if let Err(e) = crate::navigation::persist_handoff(&handoff, &model.config) {
            log::error!("Failed to store detection result: {}", e);
        }
        model.leave_to = Some(model.config.results_path.clone());
        detach_video(model);
    }

    model.notice = Some(completion.notice);
    true
}

pub fn handle_dismiss_notice(model: &mut Model) -> bool {
    model.notice = None;
    if let Some(path) = model.leave_to.take() {
        go_to(&path);
    }
    true
}

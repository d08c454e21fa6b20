//! Upload/capture/detect state machine for the detection page.
//!
//! The controller owns the single pending image and the optional camera
//! session. UI visibility is never stored; it is derived from the state via
//! [`WorkflowController::view`].

use crate::detection::DetectionOutcome;
use crate::handoff::Handoff;
use crate::media::{ ImageSource, MediaType };
use crate::notice::Notice;

/// A live video capture handle. Implementors must release every track in `stop_all`.
pub trait CameraStream {
    fn stop_all(&mut self);
    fn active_tracks(&self) -> usize;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WorkflowError {
    #[error("Unsupported media type: {0:?}")]
    UnsupportedFormat(String),
    #[error("No image selected")]
    NoImage,
    #[error("A detection request is already in flight")]
    Busy,
    #[error("Camera is already open")]
    CameraBusy,
    #[error("Camera is not open")]
    CameraClosed,
    #[error("Page has already navigated away")]
    Navigated,
    #[error("A newer candidate was chosen")]
    Superseded,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PendingImage<I> {
    pub payload: I,
    pub media_type: MediaType,
    pub source: ImageSource,
    pub preview_data_uri: String,
    pub dimensions: Option<(u32, u32)>,
}

impl<I> PendingImage<I> {
    pub fn new(payload: I, media_type: MediaType, source: ImageSource, preview_data_uri: String) -> Self {
        Self {
            payload,
            media_type,
            source,
            preview_data_uri,
            dimensions: None,
        }
    }

    /// A JPEG frame grabbed from the camera at the video's native resolution.
    pub fn captured(payload: I, preview_data_uri: String, width: u32, height: u32) -> Self {
        Self {
            payload,
            media_type: MediaType::Jpeg,
            source: ImageSource::Camera,
            preview_data_uri,
            dimensions: Some((width, height)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    ImageReady,
    Detecting {
        seq: u64,
    },
    Navigated,
}

/// Identifies one chosen candidate while its preview is being read.
/// Only the most recently issued ticket can still stage an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CandidateTicket {
    seq: u64,
}

/// Identifies one submission. Responses carrying an outdated ticket are dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DetectionTicket {
    seq: u64,
}

impl DetectionTicket {
    pub fn seq(&self) -> u64 {
        self.seq
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub notice: Notice,
    /// Present only on success; the page must persist it and leave.
    pub handoff: Option<Handoff>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Visibility {
    pub placeholder: bool,
    pub preview: bool,
    pub camera: bool,
    pub loading: bool,
    pub submit_enabled: bool,
    pub source_chooser_enabled: bool,
}

pub struct WorkflowController<I, S: CameraStream> {
    phase: Phase,
    pending: Option<PendingImage<I>>,
    camera: Option<S>,
    last_seq: u64,
    last_candidate: u64,
}

impl<I, S: CameraStream> Default for WorkflowController<I, S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I, S: CameraStream> WorkflowController<I, S> {
    pub fn new() -> Self {
        Self {
            phase: Phase::Idle,
            pending: None,
            camera: None,
            last_seq: 0,
            last_candidate: 0,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn pending(&self) -> Option<&PendingImage<I>> {
        self.pending.as_ref()
    }

    pub fn is_camera_open(&self) -> bool {
        self.camera.is_some()
    }

    pub fn is_detecting(&self) -> bool {
        matches!(self.phase, Phase::Detecting { .. })
    }

    pub fn active_tracks(&self) -> usize {
        self.camera.as_ref().map_or(0, |stream| stream.active_tracks())
    }

    /// Whether a click on the upload box may open the source chooser.
    pub fn can_choose_source(&self) -> bool {
        self.camera.is_none() && matches!(self.phase, Phase::Idle | Phase::ImageReady)
    }

    fn ensure_interactive(&self) -> Result<(), WorkflowError> {
        match self.phase {
            Phase::Detecting { .. } => Err(WorkflowError::Busy),
            Phase::Navigated => Err(WorkflowError::Navigated),
            Phase::Idle | Phase::ImageReady => Ok(()),
        }
    }

    /// Reserves the staging slot for a validated candidate before its preview
    /// is read. Issuing a ticket invalidates every earlier one.
    pub fn begin_candidate(&mut self) -> Result<CandidateTicket, WorkflowError> {
        self.ensure_interactive()?;
        if self.camera.is_some() {
            return Err(WorkflowError::CameraBusy);
        }

        self.last_candidate += 1;
        Ok(CandidateTicket { seq: self.last_candidate })
    }

    /// Stages a read candidate, discarding whatever was staged before.
    ///
    /// Refused while the camera is open; it must be cancelled or captured first.
    pub fn accept(&mut self, ticket: CandidateTicket, image: PendingImage<I>) -> Result<(), WorkflowError> {
        if ticket.seq != self.last_candidate {
            return Err(WorkflowError::Superseded);
        }
        self.ensure_interactive()?;
        if self.camera.is_some() {
            return Err(WorkflowError::CameraBusy);
        }

        self.stage(image);
        Ok(())
    }

    fn stage(&mut self, image: PendingImage<I>) {
        log::info!("Accepted {} image ({})", image.source, image.media_type);
        // Reads still in flight lose to whatever was staged last.
        self.last_candidate += 1;
        self.pending = Some(image);
        self.phase = Phase::ImageReady;
    }

    /// Records a freshly granted camera stream.
    ///
    /// If the stream cannot be kept it is stopped before returning, so the page
    /// never holds more than one live stream.
    pub fn camera_opened(&mut self, mut stream: S) -> Result<(), WorkflowError> {
        let refusal = if self.camera.is_some() {
            Some(WorkflowError::CameraBusy)
        } else {
            self.ensure_interactive().err()
        };

        if let Some(err) = refusal {
            log::warn!("Discarding camera stream: {}", err);
            stream.stop_all();
            return Err(err);
        }

        log::info!("Camera opened with {} track(s)", stream.active_tracks());
        self.camera = Some(stream);
        Ok(())
    }

    fn stop_camera(&mut self) -> bool {
        match self.camera.take() {
            Some(mut stream) => {
                stream.stop_all();
                log::info!("Camera stopped");
                true
            }
            None => false,
        }
    }

    /// Closes the camera and returns to whatever was shown before it opened.
    pub fn cancel_camera(&mut self) -> Result<(), WorkflowError> {
        if self.stop_camera() { Ok(()) } else { Err(WorkflowError::CameraClosed) }
    }

    /// Stops the camera, then stages the captured frame.
    pub fn capture(&mut self, image: PendingImage<I>) -> Result<(), WorkflowError> {
        if !self.stop_camera() {
            return Err(WorkflowError::CameraClosed);
        }
        self.ensure_interactive()?;
        self.stage(image);
        Ok(())
    }

    pub fn begin_detection(&mut self) -> Result<DetectionTicket, WorkflowError> {
        self.ensure_interactive()?;
        if self.pending.is_none() {
            return Err(WorkflowError::NoImage);
        }

        self.last_seq += 1;
        let seq = self.last_seq;
        self.phase = Phase::Detecting { seq };
        log::info!("Detection request #{} started", seq);
        Ok(DetectionTicket { seq })
    }

    /// Applies a finished request. Returns `None` when the response is stale.
    pub fn complete_detection(
        &mut self,
        ticket: DetectionTicket,
        outcome: DetectionOutcome
    ) -> Option<Completion> {
        match self.phase {
            Phase::Detecting { seq } if seq == ticket.seq => {}
            current => {
                log::warn!("Ignoring response #{} while in {:?}", ticket.seq, current);
                return None;
            }
        }

        let completion = match outcome {
            DetectionOutcome::Success { body } => {
                let preview = self.pending
                    .as_ref()
                    .map(|image| image.preview_data_uri.clone())
                    .unwrap_or_default();
                self.stop_camera();
                self.phase = Phase::Navigated;
                log::info!("Detection request #{} succeeded", ticket.seq);
                Completion {
                    notice: Notice::detection_succeeded(),
                    handoff: Some(Handoff::new(&body, preview)),
                }
            }
            DetectionOutcome::Rejected { message } => {
                log::warn!("Detection request #{} rejected: {}", ticket.seq, message);
                self.phase = Phase::ImageReady;
                Completion {
                    notice: Notice::detection_failed(message),
                    handoff: None,
                }
            }
            DetectionOutcome::Unreachable => {
                log::error!("Detection request #{} could not reach the server", ticket.seq);
                self.phase = Phase::ImageReady;
                Completion {
                    notice: Notice::connection_failed(),
                    handoff: None,
                }
            }
        };

        Some(completion)
    }

    /// Releases held devices when the page goes away.
    pub fn release(&mut self) {
        self.stop_camera();
    }

    pub fn view(&self) -> Visibility {
        let camera = self.camera.is_some();
        let has_image = self.pending.is_some();
        let detecting = self.is_detecting();

        Visibility {
            placeholder: !has_image && !camera,
            preview: has_image && !camera,
            camera,
            loading: detecting,
            submit_enabled: has_image && !detecting && self.phase != Phase::Navigated,
            source_chooser_enabled: self.can_choose_source(),
        }
    }
}

impl<I, S: CameraStream> Drop for WorkflowController<I, S> {
    fn drop(&mut self) {
        self.stop_camera();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::classify_response;
    use crate::media::validate_candidate;
    use crate::notice::NoticeKind;
    use std::cell::Cell;
    use std::rc::Rc;

    struct FakeStream {
        tracks: Rc<Cell<usize>>,
    }

    impl FakeStream {
        fn new() -> (Self, Rc<Cell<usize>>) {
            let tracks = Rc::new(Cell::new(1));
            (Self { tracks: Rc::clone(&tracks) }, tracks)
        }
    }

    impl CameraStream for FakeStream {
        fn stop_all(&mut self) {
            self.tracks.set(0);
        }

        fn active_tracks(&self) -> usize {
            self.tracks.get()
        }
    }

    type Controller = WorkflowController<Vec<u8>, FakeStream>;

    fn png(bytes: &[u8]) -> PendingImage<Vec<u8>> {
        PendingImage::new(
            bytes.to_vec(),
            MediaType::Png,
            ImageSource::File,
            "data:image/png;base64,AAAA".to_string()
        )
    }

    fn offer(controller: &mut Controller, image: PendingImage<Vec<u8>>) -> Result<(), WorkflowError> {
        let ticket = controller.begin_candidate()?;
        controller.accept(ticket, image)
    }

    fn ready() -> Controller {
        let mut controller = Controller::new();
        offer(&mut controller, png(b"leaf")).unwrap();
        controller
    }

    #[test]
    fn starts_idle_with_placeholder() {
        let controller = Controller::new();
        assert_eq!(controller.phase(), Phase::Idle);
        let view = controller.view();
        assert!(view.placeholder);
        assert!(!view.preview);
        assert!(!view.submit_enabled);
        assert!(view.source_chooser_enabled);
    }

    #[test]
    fn rejected_candidate_changes_nothing() {
        let controller = ready();
        let err = validate_candidate("image/gif", ImageSource::Drag).unwrap_err();

        assert_eq!(Notice::from(&err).title, "Format Tidak Didukung");
        assert_eq!(controller.pending().unwrap().payload, b"leaf".to_vec());
        assert_eq!(controller.phase(), Phase::ImageReady);
    }

    #[test]
    fn accepting_replaces_previous_image() {
        let mut controller = ready();
        offer(&mut controller, png(b"second")).unwrap();

        assert_eq!(controller.pending().unwrap().payload, b"second".to_vec());
        let view = controller.view();
        assert!(view.preview);
        assert!(!view.placeholder);
        assert!(view.submit_enabled);
    }

    #[test]
    fn submit_enabled_only_with_image_and_no_request() {
        let mut controller = Controller::new();
        assert_eq!(controller.begin_detection(), Err(WorkflowError::NoImage));

        offer(&mut controller, png(b"leaf")).unwrap();
        assert!(controller.view().submit_enabled);

        let ticket = controller.begin_detection().unwrap();
        assert!(!controller.view().submit_enabled);
        assert!(controller.view().loading);
        assert_eq!(controller.begin_detection(), Err(WorkflowError::Busy));
        assert_eq!(offer(&mut controller, png(b"late")), Err(WorkflowError::Busy));
        assert!(!controller.can_choose_source());

        controller.complete_detection(ticket, DetectionOutcome::Unreachable).unwrap();
        assert!(controller.view().submit_enabled);
    }

    #[test]
    fn camera_hides_previews_and_cancel_restores_placeholder() {
        let mut controller = Controller::new();
        let (stream, tracks) = FakeStream::new();
        controller.camera_opened(stream).unwrap();

        let view = controller.view();
        assert!(view.camera);
        assert!(!view.placeholder);
        assert!(!view.preview);
        assert!(!view.source_chooser_enabled);

        controller.cancel_camera().unwrap();
        assert_eq!(tracks.get(), 0);
        let view = controller.view();
        assert!(view.placeholder);
        assert!(!view.camera);
        assert_eq!(controller.phase(), Phase::Idle);
    }

    #[test]
    fn cancel_restores_existing_preview() {
        let mut controller = ready();
        let (stream, tracks) = FakeStream::new();
        controller.camera_opened(stream).unwrap();
        assert!(!controller.view().preview);

        controller.cancel_camera().unwrap();
        assert_eq!(tracks.get(), 0);
        let view = controller.view();
        assert!(view.preview);
        assert!(!view.placeholder);
        assert_eq!(controller.pending().unwrap().payload, b"leaf".to_vec());
    }

    #[test]
    fn capture_stops_camera_and_stages_jpeg() {
        let mut controller = Controller::new();
        let (stream, tracks) = FakeStream::new();
        controller.camera_opened(stream).unwrap();
        assert_eq!(controller.active_tracks(), 1);

        let frame = PendingImage::captured(vec![0xff, 0xd8], "data:image/jpeg;base64,/9j/".into(), 1280, 720);
        controller.capture(frame).unwrap();

        assert_eq!(tracks.get(), 0);
        assert_eq!(controller.active_tracks(), 0);
        let pending = controller.pending().unwrap();
        assert_eq!(pending.media_type, MediaType::Jpeg);
        assert_eq!(pending.source, ImageSource::Camera);
        assert_eq!(pending.dimensions, Some((1280, 720)));
        assert_eq!(controller.phase(), Phase::ImageReady);
    }

    #[test]
    fn capture_without_camera_is_refused() {
        let mut controller = Controller::new();
        let frame = PendingImage::captured(vec![], String::new(), 1, 1);
        assert_eq!(controller.capture(frame), Err(WorkflowError::CameraClosed));
        assert!(controller.pending().is_none());
        assert_eq!(controller.cancel_camera(), Err(WorkflowError::CameraClosed));
    }

    #[test]
    fn second_stream_is_stopped_immediately() {
        let mut controller = Controller::new();
        let (first, first_tracks) = FakeStream::new();
        let (second, second_tracks) = FakeStream::new();

        controller.camera_opened(first).unwrap();
        assert_eq!(controller.camera_opened(second), Err(WorkflowError::CameraBusy));
        assert_eq!(second_tracks.get(), 0);
        assert_eq!(first_tracks.get(), 1);
        assert_eq!(controller.active_tracks(), 1);
    }

    #[test]
    fn late_camera_grant_during_detection_is_stopped() {
        let mut controller = ready();
        controller.begin_detection().unwrap();

        let (stream, tracks) = FakeStream::new();
        assert_eq!(controller.camera_opened(stream), Err(WorkflowError::Busy));
        assert_eq!(tracks.get(), 0);
        assert!(!controller.is_camera_open());
    }

    #[test]
    fn successful_detection_hands_off_and_navigates() {
        let mut controller = ready();
        let ticket = controller.begin_detection().unwrap();
        let outcome = classify_response(true, r#"{"detections":[{"label":"Blast","confidence":0.9}]}"#);

        let completion = controller.complete_detection(ticket, outcome).unwrap();
        assert_eq!(completion.notice.kind, NoticeKind::Success);
        let handoff = completion.handoff.unwrap();
        assert_eq!(handoff.preview_data_uri, "data:image/png;base64,AAAA");
        assert!(handoff.result_json.contains("Blast"));

        assert_eq!(controller.phase(), Phase::Navigated);
        assert!(!controller.view().submit_enabled);
        assert!(!controller.view().loading);
        assert_eq!(offer(&mut controller, png(b"x")), Err(WorkflowError::Navigated));
    }

    #[test]
    fn server_error_returns_to_image_ready() {
        let mut controller = ready();
        let ticket = controller.begin_detection().unwrap();
        let outcome = classify_response(false, r#"{"error":"bad image"}"#);

        let completion = controller.complete_detection(ticket, outcome).unwrap();
        assert_eq!(completion.notice.text, "bad image");
        assert!(completion.handoff.is_none());

        let view = controller.view();
        assert!(view.submit_enabled);
        assert!(!view.loading);
        assert_eq!(controller.phase(), Phase::ImageReady);
    }

    #[test]
    fn network_failure_shows_connectivity_notice() {
        let mut controller = ready();
        let ticket = controller.begin_detection().unwrap();

        let completion = controller.complete_detection(ticket, DetectionOutcome::Unreachable).unwrap();
        assert_eq!(completion.notice, Notice::connection_failed());
        assert_eq!(controller.phase(), Phase::ImageReady);
    }

    #[test]
    fn stale_response_is_ignored() {
        let mut controller = ready();
        let first = controller.begin_detection().unwrap();
        controller.complete_detection(first, DetectionOutcome::Unreachable).unwrap();

        let second = controller.begin_detection().unwrap();
        assert!(second.seq() > first.seq());

        let stale = classify_response(true, r#"{"detections":[]}"#);
        assert!(controller.complete_detection(first, stale).is_none());
        assert_eq!(controller.phase(), Phase::Detecting { seq: second.seq() });
    }

    #[test]
    fn success_while_camera_open_releases_it() {
        let mut controller = ready();
        let (stream, tracks) = FakeStream::new();
        controller.camera_opened(stream).unwrap();

        let ticket = controller.begin_detection().unwrap();
        let outcome = classify_response(true, r#"{"detections":[]}"#);
        controller.complete_detection(ticket, outcome).unwrap();
        assert_eq!(tracks.get(), 0);
    }

    #[test]
    fn release_and_drop_stop_the_camera() {
        let (stream, tracks) = FakeStream::new();
        let mut controller = Controller::new();
        controller.camera_opened(stream).unwrap();
        controller.release();
        assert_eq!(tracks.get(), 0);

        let (stream, tracks) = FakeStream::new();
        let mut controller = Controller::new();
        controller.camera_opened(stream).unwrap();
        drop(controller);
        assert_eq!(tracks.get(), 0);
    }

    #[test]
    fn drop_while_camera_open_is_refused() {
        let mut controller = ready();
        let (stream, tracks) = FakeStream::new();
        controller.camera_opened(stream).unwrap();

        let dropped = PendingImage::new(
            b"dropped".to_vec(),
            MediaType::Png,
            ImageSource::Drag,
            "data:image/png;base64,BBBB".to_string()
        );
        assert_eq!(offer(&mut controller, dropped), Err(WorkflowError::CameraBusy));

        assert_eq!(tracks.get(), 1);
        assert_eq!(controller.pending().unwrap().payload, b"leaf".to_vec());
        let view = controller.view();
        assert!(view.camera);
        assert!(!view.preview);
    }

    #[test]
    fn read_finishing_after_camera_opened_is_refused() {
        let mut controller = Controller::new();
        let ticket = controller.begin_candidate().unwrap();
        let (stream, tracks) = FakeStream::new();
        controller.camera_opened(stream).unwrap();

        assert_eq!(controller.accept(ticket, png(b"slow")), Err(WorkflowError::CameraBusy));
        assert!(controller.pending().is_none());
        assert_eq!(tracks.get(), 1);
    }

    #[test]
    fn last_chosen_candidate_wins_regardless_of_read_order() {
        let mut controller = Controller::new();
        let first = controller.begin_candidate().unwrap();
        let second = controller.begin_candidate().unwrap();

        controller.accept(second, png(b"second")).unwrap();
        assert_eq!(controller.accept(first, png(b"first")), Err(WorkflowError::Superseded));
        assert_eq!(controller.pending().unwrap().payload, b"second".to_vec());
    }

    #[test]
    fn capture_supersedes_pending_reads() {
        let mut controller = Controller::new();
        let ticket = controller.begin_candidate().unwrap();
        let (stream, _tracks) = FakeStream::new();
        controller.camera_opened(stream).unwrap();
        let frame = PendingImage::captured(vec![0xff], "data:image/jpeg;base64,/9j/".into(), 640, 480);
        controller.capture(frame).unwrap();

        assert_eq!(controller.accept(ticket, png(b"slow")), Err(WorkflowError::Superseded));
        assert_eq!(controller.pending().unwrap().source, ImageSource::Camera);
    }

    #[test]
    fn read_finishing_during_detection_is_refused() {
        let mut controller = ready();
        let ticket = controller.begin_candidate().unwrap();
        controller.begin_detection().unwrap();

        let err = controller.accept(ticket, png(b"late")).unwrap_err();
        assert_eq!(err, WorkflowError::Busy);
        assert_eq!(Notice::from(&err).text, "Deteksi sedang berlangsung, mohon tunggu");
        assert_eq!(controller.pending().unwrap().payload, b"leaf".to_vec());
    }
}

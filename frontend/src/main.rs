mod api;
mod camera;
mod components;
mod error;
mod navigation;

use camera::BrowserCamera;
use gloo_events::EventListener;
use shared::{
    CandidateTicket,
    DetectionOutcome,
    DetectionTicket,
    ImageSource,
    Notice,
    PendingImage,
    WorkflowConfig,
    WorkflowController,
};
use web_sys::{ DragEvent, File };
use yew::prelude::*;

use crate::error::FrontendError;

type Workflow = WorkflowController<File, BrowserCamera>;

// Yew msg components
pub enum Msg {
    // Source selection
    OpenSourceChooser,
    CloseSourceChooser,
    ChooseGallery,
    ChooseCamera,

    // Candidates
    CandidatePicked(File, ImageSource),
    CandidateReady(CandidateTicket, PendingImage<File>),
    CandidateUnreadable(String),

    // Drag and drop
    SetDragging(bool),
    HandleDrop(DragEvent),

    // Camera
    CameraGranted(BrowserCamera),
    CameraFailed(FrontendError),
    Capture,
    FrameCaptured(Result<PendingImage<File>, FrontendError>),
    CancelCamera,

    // Detection
    Detect,
    DetectionFinished(DetectionTicket, DetectionOutcome),

    // Notices and navigation
    DismissNotice,
    GoHome,
    PageHidden,
}

// Main component
pub struct Model {
    config: WorkflowConfig,
    workflow: Workflow,
    chooser_open: bool,
    is_dragging: bool,
    notice: Option<Notice>,
    leave_to: Option<String>,
    file_input: NodeRef,
    video: NodeRef,
    canvas: NodeRef,
    pagehide_listener: Option<EventListener>,
}

impl Component for Model {
    type Message = Msg;
    type Properties = ();

    fn create(ctx: &Context<Self>) -> Self {
        let mut model = Self {
            config: load_config(),
            workflow: Workflow::new(),
            chooser_open: false,
            is_dragging: false,
            notice: None,
            leave_to: None,
            file_input: NodeRef::default(),
            video: NodeRef::default(),
            canvas: NodeRef::default(),
            pagehide_listener: None,
        };

        if let Some(window) = web_sys::window() {
            let link = ctx.link().clone();
            let listener = EventListener::new(&window, "pagehide", move |_| {
                link.send_message(Msg::PageHidden);
            });
            model.pagehide_listener = Some(listener);
        }

        model
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        use components::handlers::*;

        match msg {
            Msg::OpenSourceChooser => handle_open_source_chooser(self),
            Msg::CloseSourceChooser => {
                self.chooser_open = false;
                true
            }
            Msg::ChooseGallery => handle_choose_gallery(self),
            Msg::ChooseCamera => handle_choose_camera(self, ctx),

            Msg::CandidatePicked(file, source) => handle_candidate(self, ctx, file, source),
            Msg::CandidateReady(ticket, image) => handle_candidate_ready(self, ticket, image),
            Msg::CandidateUnreadable(reason) => handle_candidate_unreadable(self, reason),

            Msg::SetDragging(is_dragging) => {
                self.is_dragging = is_dragging;
                true
            }
            Msg::HandleDrop(event) => handle_drop(self, ctx, event),

            Msg::CameraGranted(camera) => handle_camera_granted(self, camera),
            Msg::CameraFailed(err) => handle_camera_failed(self, err),
            Msg::Capture => handle_capture(self, ctx),
            Msg::FrameCaptured(result) => handle_frame_captured(self, result),
            Msg::CancelCamera => handle_cancel_camera(self),

            Msg::Detect => handle_detect(self, ctx),
            Msg::DetectionFinished(ticket, outcome) => handle_detection_finished(self, ticket, outcome),

            Msg::DismissNotice => handle_dismiss_notice(self),
            Msg::GoHome => {
                go_to(&self.config.home_path);
                false
            }
            Msg::PageHidden => {
                self.workflow.release();
                false
            }
        }
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        html! {
            <div class="container">
                { components::header::render_header(ctx) }

                <main class="main-content">
                    { components::upload_section::render_upload_section(self, ctx) }
                </main>

                { components::source_chooser::render_source_chooser(self, ctx) }
                { components::notice_dialog::render_notice(self, ctx) }
            </div>
        }
    }

    fn destroy(&mut self, _ctx: &Context<Self>) {
        self.workflow.release();
    }
}

fn go_to(path: &str) {
    if let Err(e) = navigation::navigate_to(path) {
        log::error!("Failed to navigate to {}: {}", path, e);
    }
}

/// Reads optional overrides from `<script id="workflow-config" type="application/json">`.
fn load_config() -> WorkflowConfig {
    let raw = web_sys::window()
        .and_then(|window| window.document())
        .and_then(|document| document.get_element_by_id("workflow-config"))
        .and_then(|element| element.text_content());

    match raw {
        Some(raw) =>
            WorkflowConfig::from_json(&raw).unwrap_or_else(|e| {
                log::warn!("Ignoring malformed workflow config: {}", e);
                WorkflowConfig::default()
            }),
        None => WorkflowConfig::default(),
    }
}

fn main() {
    wasm_logger::init(wasm_logger::Config::default());
    log::info!("Detection page starting...");
    yew::Renderer::<Model>::new().render();
}

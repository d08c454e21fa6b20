pub mod config;
pub mod detection;
pub mod handoff;
pub mod media;
pub mod notice;
pub mod workflow;

pub use config::WorkflowConfig;
pub use detection::{ classify_response, Detection, DetectionOutcome };
pub use handoff::Handoff;
pub use media::{ validate_candidate, ImageSource, MediaType, ALLOWED_TYPES };
pub use notice::{ Notice, NoticeKind };
pub use workflow::{
    CameraStream,
    CandidateTicket,
    Completion,
    DetectionTicket,
    PendingImage,
    Phase,
    Visibility,
    WorkflowController,
    WorkflowError,
};

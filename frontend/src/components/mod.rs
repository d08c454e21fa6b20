pub mod handlers;
pub mod header;
pub mod notice_dialog;
pub mod source_chooser;
pub mod upload_section;
pub mod utils;

pub(crate) mod lenient;
pub mod quiz_manifest;
pub mod uploaded_document;
pub mod video_manifest;

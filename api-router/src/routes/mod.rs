pub mod chat;
pub mod diagnostics;
pub mod documents;
pub mod liveness;
pub mod quiz;
pub mod readiness;
pub mod status;
pub mod upload;
pub mod video;

use axum::http::{header, HeaderName};

/// Header pair marking a response as uncacheable; readiness changes without notice.
pub const NO_STORE: [(HeaderName, &str); 1] = [(header::CACHE_CONTROL, "no-store")];

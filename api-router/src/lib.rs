use api_state::ApiState;
use axum::{
    extract::{DefaultBodyLimit, FromRef},
    http::{header, HeaderName, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use routes::{
    chat::chat, diagnostics::diagnostics, documents::list_documents, liveness::live,
    quiz::{get_quiz, sample_quiz}, readiness::ready, status::get_status,
    upload::{upload_document, DOCUMENT_NAME_HEADER},
    video::get_video,
};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

pub mod api_state;
pub mod error;
mod routes;

/// Router for the document API
pub fn api_routes<S>(app_state: &ApiState) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
    ApiState: FromRef<S>,
{
    // JSON-wrapped uploads carry escaping overhead; decoded content is checked separately.
    let upload_body_limit = app_state.config.upload_max_bytes.saturating_mul(2);

    Router::new()
        .route("/health", get(live))
        .route("/ready", get(ready))
        .route("/status/{doc}", get(get_status))
        .route("/video/{doc}", get(get_video))
        .route("/quiz/sample", get(sample_quiz))
        .route("/quiz/{doc}", get(get_quiz))
        .route("/documents", get(list_documents))
        .route("/diagnostics", get(diagnostics))
        .route(
            "/upload",
            post(upload_document).layer(DefaultBodyLimit::max(upload_body_limit)),
        )
        .route("/chat", post(chat))
        .layer(cors_layer(&app_state.config.cors_allow_origin))
}

fn cors_layer(allow_origin: &str) -> CorsLayer {
    let origin = if allow_origin.trim() == "*" {
        AllowOrigin::from(Any)
    } else {
        match HeaderValue::from_str(allow_origin.trim()) {
            Ok(value) => AllowOrigin::exact(value),
            Err(e) => {
                tracing::warn!(allow_origin, error = %e, "Invalid CORS origin, cross-origin requests disabled");
                AllowOrigin::list([])
            }
        }
    };

    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            header::CONTENT_TYPE,
            HeaderName::from_static(DOCUMENT_NAME_HEADER),
        ])
}

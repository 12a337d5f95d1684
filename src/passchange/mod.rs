pub mod audit;
pub mod change;
pub mod database;
pub mod handlers;
pub mod policy;
pub mod templates;

use anyhow::Result;
use axum::{
    Extension, Router,
    body::Body,
    http::{HeaderName, HeaderValue, Request},
    routing::{get, post},
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    request_id::PropagateRequestIdLayer, set_header::SetRequestHeaderLayer, trace::TraceLayer,
};
use tracing::{Span, debug_span, error, info};
use ulid::Ulid;

use self::change::PasswordChanger;

/// Immutable per-process settings shared with every handler.
#[derive(Debug, Clone, Default)]
pub struct Settings {
    /// Label shown on the form, e.g. `staging`.
    pub app_env: String,
}

/// Build the application router.
///
/// `/` and `/change` answer unexpected methods with a `303` back to the form.
pub fn router(settings: Arc<Settings>, changer: Arc<PasswordChanger>) -> Router {
    let request_id = HeaderName::from_static("x-request-id");

    Router::new()
        .route(
            "/",
            get(handlers::form).fallback(handlers::redirect_home),
        )
        .route(
            "/change",
            post(handlers::change).fallback(handlers::redirect_home),
        )
        .route("/health", get(handlers::health))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestHeaderLayer::if_not_present(
                    request_id.clone(),
                    |_req: &Request<Body>| HeaderValue::from_str(Ulid::new().to_string().as_str()).ok(),
                ))
                .layer(PropagateRequestIdLayer::new(request_id))
                .layer(TraceLayer::new_for_http().make_span_with(make_span))
                .layer(Extension(settings))
                .layer(Extension(changer)),
        )
}

/// Serve the application until the process receives Ctrl-C.
/// # Errors
/// Returns an error if the server fails to start
pub async fn new(port: u16, settings: Arc<Settings>, changer: Arc<PasswordChanger>) -> Result<()> {
    let app = router(settings, changer);

    let listener = TcpListener::bind(format!("::0:{port}")).await?;

    info!("Listening on [::]:{}", port);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", err);
    }
    info!("Gracefully shutdown");
}

// span
fn make_span(request: &Request<Body>) -> Span {
    let path = request.uri().path();
    let method = request.method().as_str();
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|val| val.to_str().ok())
        .unwrap_or("none");

    debug_span!("http-request", method, path, request_id)
}

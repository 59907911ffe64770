//! Host-level HTTP wiring: liveness route, request ids, tracing spans and the
//! serve loop with graceful shutdown.

use std::time::Duration;

use anyhow::{Context, Result};
use axum::{
    body::Body,
    http::{HeaderName, Request},
    routing::get,
    Router,
};
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::field::Empty;
use users::Users;

pub fn request_id_header() -> HeaderName {
    HeaderName::from_static("x-request-id")
}

/// Liveness probe; never touches storage.
async fn healthz() -> &'static str {
    "ok"
}

/// Create trace layer with proper typing
#[allow(clippy::type_complexity)]
pub fn create_trace_layer() -> TraceLayer<
    tower_http::classify::SharedClassifier<tower_http::classify::ServerErrorsAsFailures>,
    impl Fn(&Request<Body>) -> tracing::Span + Clone,
> {
    TraceLayer::new_for_http().make_span_with(|req: &Request<Body>| {
        let rid = req
            .headers()
            .get(request_id_header())
            .and_then(|v| v.to_str().ok())
            .unwrap_or("n/a");
        tracing::info_span!(
            "http_request",
            method = %req.method(),
            uri = %req.uri().path(),
            version = ?req.version(),
            request_id = %rid,
            status = Empty,
            latency_ms = Empty
        )
    })
}

/// Assemble the full application router. `timeout_sec == 0` disables the request timeout.
pub fn build_router(users: &Users, timeout_sec: u64) -> Router {
    let mut router = Router::new().route("/healthz", get(healthz));
    router = users.register_rest(router);

    if timeout_sec > 0 {
        router = router.layer(TimeoutLayer::new(Duration::from_secs(timeout_sec)));
    }

    // Layers run outside-in: the id is set before the span reads it.
    router
        .layer(create_trace_layer())
        .layer(PropagateRequestIdLayer::new(request_id_header()))
        .layer(SetRequestIdLayer::new(request_id_header(), MakeRequestUuid))
}

/// Bind, serve until SIGINT/SIGTERM, then drain in-flight requests.
pub async fn serve(router: Router, host: &str, port: u16) -> Result<()> {
    let listener = tokio::net::TcpListener::bind((host, port))
        .await
        .with_context(|| format!("Failed to bind {host}:{port}"))?;
    tracing::info!("HTTP server bound on {}", listener.local_addr()?);

    let shutdown = async {
        if let Err(e) = wait_for_shutdown().await {
            tracing::warn!("Signal handler failed, shutting down: {}", e);
        }
        tracing::info!("HTTP server shutting down gracefully");
    };

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await
        .context("HTTP server failed")
}

async fn wait_for_shutdown() -> Result<()> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigterm = signal(SignalKind::terminate())?;
        let mut sigint = signal(SignalKind::interrupt())?;
        tokio::select! {
            _ = sigterm.recv() => {},
            _ = sigint.recv()  => {},
        }
        Ok(())
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await?;
        Ok(())
    }
}

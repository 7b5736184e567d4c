use std::sync::Arc;

use {
    axum::{
        Router,
        body::{Body, to_bytes},
        extract::{Request, State},
        http::{self, StatusCode},
        response::{IntoResponse, Response},
    },
    sofa_common::Pipeline,
    sofa_config::ServerConfig,
    tokio::net::TcpListener,
    tower_http::{
        cors::{Any, CorsLayer},
        trace::TraceLayer,
    },
    tracing::{error, info, warn},
};

/// Shared state for the pipeline fallback.
struct AppState<S> {
    pipeline: Arc<Pipeline<S>>,
    max_body_bytes: usize,
}

impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            pipeline: Arc::clone(&self.pipeline),
            max_body_bytes: self.max_body_bytes,
        }
    }
}

// ── Server startup ───────────────────────────────────────────────────────────

/// Build the router serving every request through `pipeline` (shared between
/// production startup and tests).
pub fn router<S: Send + Sync + 'static>(pipeline: Arc<Pipeline<S>>, config: &ServerConfig) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .fallback(dispatch::<S>)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(AppState {
            pipeline,
            max_body_bytes: config.max_body_bytes,
        })
}

/// Serve `router` on an already bound listener.
pub async fn serve(listener: TcpListener, router: Router) -> anyhow::Result<()> {
    let addr = listener.local_addr()?;
    info!(%addr, "sofa gateway listening");
    axum::serve(listener, router).await?;
    Ok(())
}

/// Bind to the configured address and serve `pipeline` until shutdown.
pub async fn start<S: Send + Sync + 'static>(
    pipeline: Arc<Pipeline<S>>,
    config: &ServerConfig,
) -> anyhow::Result<()> {
    let listener = TcpListener::bind((config.bind.as_str(), config.port)).await?;
    serve(listener, router(pipeline, config)).await
}

// ── Handlers ─────────────────────────────────────────────────────────────────

async fn dispatch<S: Send + Sync + 'static>(
    State(state): State<AppState<S>>,
    request: Request,
) -> Response {
    let (parts, body) = request.into_parts();
    let body = match to_bytes(body, state.max_body_bytes).await {
        Ok(body) => body,
        Err(e) => {
            warn!(error = %e, path = %parts.uri.path(), "failed to buffer request body");
            return (StatusCode::PAYLOAD_TOO_LARGE, "request body too large").into_response();
        },
    };

    match state.pipeline.handle(http::Request::from_parts(parts, body)).await {
        Ok(Some(response)) => response.map(Body::from),
        Ok(None) => StatusCode::NOT_FOUND.into_response(),
        Err(e) => {
            error!(error = %e, "request pipeline failed");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        },
    }
}

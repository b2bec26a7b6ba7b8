//! JSON resource endpoints for projects, their entries and derived views.

mod anotes;
pub mod error;
mod obras;
mod summary;

use std::{sync::Arc, time::Instant};

use axum::{
    body::Body,
    http::{header, HeaderValue, Method, Request, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, put},
    Router,
};
use chrono::{DateTime, FixedOffset};
use tokio::net::TcpListener;
use tracing::{info, info_span, Instrument};

use obras_core::{Clock, CoreError, ObraStore};
use obras_domain::RowId;

use crate::errors::AppError;
pub use error::ApiError;

const GREETING: &str = "Obras API: expense tracking for construction projects";

/// Shared handler state. The store serializes its own access.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ObraStore>,
    pub clock: Arc<dyn Clock>,
    /// Offset of the calendar used to cut weeks.
    pub offset: FixedOffset,
}

impl AppState {
    pub fn new(store: Arc<dyn ObraStore>, clock: Arc<dyn Clock>, offset: FixedOffset) -> Self {
        Self {
            store,
            clock,
            offset,
        }
    }

    pub(crate) fn now(&self) -> DateTime<FixedOffset> {
        self.clock.now().with_timezone(&self.offset)
    }

    /// Runs `work` against the store on tokio's blocking pool.
    ///
    /// The file-backed store writes, copies and prunes files synchronously
    /// while holding its lock, which must not stall the async workers.
    pub(crate) async fn with_store<T, F>(&self, work: F) -> Result<T, ApiError>
    where
        F: FnOnce(&dyn ObraStore) -> Result<T, CoreError> + Send + 'static,
        T: Send + 'static,
    {
        let store = Arc::clone(&self.store);
        let outcome = tokio::task::spawn_blocking(move || work(&*store))
            .await
            .map_err(|err| ApiError::Internal(format!("store task failed: {err}")))?;
        Ok(outcome?)
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/api/obras", get(obras::list).post(obras::create))
        .route(
            "/api/obras/:id",
            get(obras::show).put(obras::update).delete(obras::remove),
        )
        .route(
            "/api/obras/:id/anotes",
            get(anotes::list).post(anotes::create),
        )
        .route("/api/obras/:id/anotes/semana", get(summary::current_week))
        .route(
            "/api/obras/:id/anotes/:anote_id",
            put(anotes::update).delete(anotes::remove),
        )
        .route("/api/obras/:id/resumen", get(summary::totals))
        .route("/api/obras/:id/semanas", get(summary::weeks))
        .layer(middleware::from_fn(cors))
        .layer(middleware::from_fn(trace_requests))
        .with_state(state)
}

/// Serves the API on `listener` until ctrl-c.
pub async fn serve(listener: TcpListener, state: AppState) -> Result<(), AppError> {
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, "obras API listening");
    }
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutdown requested");
    }
}

async fn root() -> &'static str {
    GREETING
}

async fn health() -> &'static str {
    "ok"
}

/// Parses a path id, rejecting anything that is not an integer.
pub(crate) fn parse_id(raw: &str) -> Result<RowId, ApiError> {
    raw.trim()
        .parse()
        .map_err(|_| ApiError::BadRequest(format!("`{raw}` is not a valid id")))
}

/// Permissive CORS: any origin, answers preflights directly.
async fn cors(request: Request<Body>, next: Next) -> Response {
    let mut response = if request.method() == Method::OPTIONS {
        StatusCode::NO_CONTENT.into_response()
    } else {
        next.run(request).await
    };
    let headers = response.headers_mut();
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("GET,HEAD,PUT,PATCH,POST,DELETE"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("content-type"),
    );
    response
}

async fn trace_requests(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let span = info_span!("http.request", method = %method, path = %path);
    let started = Instant::now();

    let response = next.run(request).instrument(span.clone()).await;
    span.in_scope(|| {
        info!(
            status = response.status().as_u16(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "request served"
        );
    });
    response
}

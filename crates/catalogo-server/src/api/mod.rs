mod pages;
mod productos;
mod upload;

use std::sync::Arc;

use axum::{
    http::{header, HeaderName, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use sqlx::SqlitePool;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::middleware::request_id;

/// Plain-text body for both gate rejections; the upload page surfaces it
/// to the operator as-is.
pub(crate) const DENIAL: &str = "Acceso denegado";

/// The two configured shared secrets the gates compare against.
#[derive(Clone)]
pub struct GateSecrets {
    pub password: String,
    pub upload_token: String,
}

#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub secrets: Arc<GateSecrets>,
}

impl AppState {
    #[must_use]
    pub fn new(pool: SqlitePool, config: &catalogo_core::AppConfig) -> Self {
        Self::from_parts(pool, &config.password, &config.upload_token)
    }

    #[must_use]
    pub fn from_parts(pool: SqlitePool, password: &str, upload_token: &str) -> Self {
        Self {
            pool,
            secrets: Arc::new(GateSecrets {
                password: password.to_string(),
                upload_token: upload_token.to_string(),
            }),
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

/// JSON error response: `{"error": message}` with the given status.
#[derive(Debug)]
pub(crate) struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (
            self.status,
            Json(ErrorBody {
                error: self.message,
            }),
        )
            .into_response()
    }
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE, HeaderName::from_static("x-request-id")])
}

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/", get(pages::login_page))
        .route("/verify-password", post(pages::verify_password))
        .route("/upload.html", get(pages::upload_page))
        .route("/upload-excel/{token}", post(upload::upload_excel))
        .route("/productos", get(productos::list_productos))
        .route("/api/productos", get(productos::list_productos))
        // Trace outermost; CORS must sit directly over the plain axum body.
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

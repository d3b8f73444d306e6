use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Form,
};
use serde::Deserialize;

use catalogo_core::secret_matches;

use super::{AppState, DENIAL};

const LOGIN_PAGE: &str = include_str!("../../public/login.html");
const UPLOAD_PAGE: &str = include_str!("../../public/upload.html");

const WRONG_PASSWORD: &str = "Contraseña incorrecta. Acceso denegado.";

#[derive(Debug, Deserialize)]
pub(super) struct PasswordForm {
    password: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct UploadPageQuery {
    token: Option<String>,
}

/// `GET /` — static login page.
pub(super) async fn login_page() -> Html<&'static str> {
    Html(LOGIN_PAGE)
}

/// `POST /verify-password` — password gate in front of the upload page.
///
/// A mismatch answers 401 with a plain-text denial.
pub(super) async fn verify_password(
    State(state): State<AppState>,
    Form(form): Form<PasswordForm>,
) -> Response {
    if secret_matches(&form.password, &state.secrets.password) {
        Html(UPLOAD_PAGE).into_response()
    } else {
        tracing::warn!("password gate rejected a login attempt");
        (StatusCode::UNAUTHORIZED, WRONG_PASSWORD).into_response()
    }
}

/// `GET /upload.html?token=...` — token-gated upload page.
pub(super) async fn upload_page(
    State(state): State<AppState>,
    Query(query): Query<UploadPageQuery>,
) -> Response {
    let allowed = query
        .token
        .as_deref()
        .is_some_and(|token| secret_matches(token, &state.secrets.upload_token));

    if allowed {
        Html(UPLOAD_PAGE).into_response()
    } else {
        (StatusCode::FORBIDDEN, DENIAL).into_response()
    }
}

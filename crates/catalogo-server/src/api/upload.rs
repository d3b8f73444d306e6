use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde::Serialize;

use catalogo_core::secret_matches;

use crate::middleware::RequestId;

use super::{ApiError, AppState, DENIAL};

/// Multipart field name the upload form submits the workbook under.
const FILE_FIELD: &str = "file";

const UPLOAD_OK: &str = "Productos actualizados con éxito";

#[derive(Debug, Serialize)]
pub(super) struct UploadOk {
    message: &'static str,
}

/// `POST /upload-excel/{token}` — token-gated spreadsheet upload.
///
/// The token is checked before the body is touched, so a rejected request
/// never reaches the parser or the store. Parse and store failures answer
/// 500 with the error message; a request without a usable `file` field
/// answers 400.
pub(super) async fn upload_excel(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(token): Path<String>,
    multipart: Multipart,
) -> Response {
    if !secret_matches(&token, &state.secrets.upload_token) {
        tracing::warn!(request_id = %req_id.0, "upload token mismatch");
        return (StatusCode::FORBIDDEN, DENIAL).into_response();
    }

    let bytes = match read_file_field(multipart).await {
        Ok(Some(bytes)) => bytes,
        Ok(None) => {
            return ApiError::new(StatusCode::BAD_REQUEST, "missing multipart field `file`")
                .into_response();
        }
        Err(e) => {
            return ApiError::new(
                StatusCode::BAD_REQUEST,
                format!("unreadable multipart body: {e}"),
            )
            .into_response();
        }
    };

    match catalogo_ingest::ingest_workbook(&state.pool, &bytes).await {
        Ok(rows) => {
            tracing::info!(request_id = %req_id.0, rows, "catalog upload applied");
            Json(UploadOk { message: UPLOAD_OK }).into_response()
        }
        Err(e) => {
            tracing::error!(request_id = %req_id.0, error = %e, "catalog upload failed");
            ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

async fn read_file_field(
    mut multipart: Multipart,
) -> Result<Option<Vec<u8>>, axum::extract::multipart::MultipartError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some(FILE_FIELD) {
            return Ok(Some(field.bytes().await?.to_vec()));
        }
    }
    Ok(None)
}

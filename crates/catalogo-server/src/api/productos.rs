use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

use super::{ApiError, AppState};

/// Wire shape of a product record; field names match what the storefront
/// frontend consumes.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct ProductoItem {
    id: String,
    name: Option<String>,
    price: Option<f64>,
    original_price: Option<f64>,
    image_src: Option<String>,
    category: Option<String>,
}

/// `GET /productos` and `GET /api/productos` — the full record set as a
/// JSON array. Two paths, one handler; no ordering guarantee, no
/// pagination.
pub(super) async fn list_productos(
    State(state): State<AppState>,
) -> Result<Json<Vec<ProductoItem>>, ApiError> {
    let rows = catalogo_db::list_products(&state.pool).await.map_err(|e| {
        tracing::error!(error = %e, "listing productos failed");
        ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
    })?;

    let data = rows
        .into_iter()
        .map(|row| ProductoItem {
            id: row.id,
            name: row.name,
            price: row.price,
            original_price: row.original_price,
            image_src: row.image_src,
            category: row.category,
        })
        .collect();

    Ok(Json(data))
}

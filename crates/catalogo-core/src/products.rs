use serde::{Deserialize, Serialize};

/// A product record as uploaded by the storefront spreadsheet.
///
/// `id` comes from the file, not the database; everything else is whatever
/// the mapper coerced out of the row. Malformed numeric cells arrive as
/// `None` and persist as `NULL` — the store does not validate fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub name: Option<String>,
    pub price: Option<f64>,
    pub original_price: Option<f64>,
    pub image_src: Option<String>,
    pub category: Option<String>,
}

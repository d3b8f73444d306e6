//! Spreadsheet ingestion: parse an uploaded xlsx, map rows positionally to
//! product records, and upsert them into the store.

pub mod error;
mod hyperlinks;
pub mod pipeline;
pub mod workbook;

pub use error::IngestError;
pub use pipeline::{ingest_workbook, upsert_all};
pub use workbook::{SheetReader, PRODUCT_COLUMNS};

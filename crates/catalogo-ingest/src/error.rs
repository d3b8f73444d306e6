use thiserror::Error;

/// Failures raised while parsing an uploaded workbook or applying its rows.
///
/// Everything except [`IngestError::Db`] is a parse-class failure: the file
/// could not be opened or did not have the expected shape, and no records
/// were applied.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("failed to read workbook: {0}")]
    Workbook(#[from] calamine::XlsxError),
    #[error("workbook has no worksheets")]
    NoSheets,
    #[error("worksheet spans {found} columns, expected at least {expected}")]
    MissingColumns { found: u32, expected: u32 },
    #[error("failed to read workbook archive: {0}")]
    Archive(#[from] zip::result::ZipError),
    #[error("malformed sheet xml: {0}")]
    SheetXml(String),
    #[error("failed to read workbook part: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Db(#[from] catalogo_db::DbError),
}

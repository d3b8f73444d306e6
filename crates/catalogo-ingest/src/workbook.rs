//! Spreadsheet parsing and positional row mapping.

use std::collections::HashMap;
use std::io::Cursor;

use calamine::{Data, Range, Reader as _, Xlsx};
use catalogo_core::Product;

use crate::error::IngestError;
use crate::hyperlinks::first_sheet_hyperlinks;

/// Fixed column contract of the upload format: `id, name, price,
/// originalPrice, imageSrc, category` in sheet columns A–F. Header names
/// are ignored; positions are the contract.
pub const PRODUCT_COLUMNS: u32 = 6;

/// Zero-based sheet column holding the image cell (column E).
const IMAGE_COL: u32 = 4;

/// Reader over the first worksheet of an uploaded workbook.
///
/// Holds the sheet's cell range plus the hyperlink targets calamine does
/// not expose. Rows are mapped lazily through [`SheetReader::products`];
/// re-reading the file is the only way to restart the sequence.
#[derive(Debug)]
pub struct SheetReader {
    range: Range<Data>,
    hyperlinks: HashMap<(u32, u32), String>,
}

impl SheetReader {
    /// Open a workbook from raw xlsx bytes and position on its first sheet.
    ///
    /// # Errors
    ///
    /// Returns [`IngestError::Workbook`] for a corrupt or non-xlsx file,
    /// [`IngestError::NoSheets`] for a workbook without worksheets, and
    /// [`IngestError::MissingColumns`] when the sheet holds data rows but
    /// spans fewer columns than the upload format defines.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, IngestError> {
        let mut workbook = Xlsx::new(Cursor::new(bytes))?;
        let range = workbook
            .worksheet_range_at(0)
            .ok_or(IngestError::NoSheets)??;

        // Fail fast on a structurally short sheet instead of propagating
        // nulls row by row. The header row counts toward the width, so an
        // all-blank trailing column in the data still passes.
        if let Some(end) = range.end() {
            let has_data_rows = end.0 >= 1;
            let width = end.1 + 1;
            if has_data_rows && width < PRODUCT_COLUMNS {
                return Err(IngestError::MissingColumns {
                    found: width,
                    expected: PRODUCT_COLUMNS,
                });
            }
        }

        let hyperlinks = first_sheet_hyperlinks(Cursor::new(bytes))?;
        Ok(Self { range, hyperlinks })
    }

    /// Lazy sequence of mapped products in sheet-row order.
    ///
    /// Sheet row 1 is treated as the header and skipped unconditionally.
    /// Rows with no cell content are skipped; everything else maps
    /// positionally with no validation beyond type coercion.
    pub fn products(&self) -> impl Iterator<Item = Product> + '_ {
        let rows = match (self.range.start(), self.range.end()) {
            (Some(start), Some(end)) => start.0..=end.0,
            // Degenerate range iterates nothing.
            _ => 1..=0,
        };
        rows.filter(|&row| row >= 1)
            .filter_map(move |row| self.map_row(row))
    }

    fn map_row(&self, row: u32) -> Option<Product> {
        let cell = |col: u32| self.range.get_value((row, col)).unwrap_or(&Data::Empty);

        let all_empty =
            (0..PRODUCT_COLUMNS).all(|col| matches!(cell(col), Data::Empty | Data::Error(_)));
        if all_empty {
            return None;
        }

        // A hyperlink-style image cell contributes its target, not its
        // display text; a plain cell passes through as-is.
        let image_src = self
            .hyperlinks
            .get(&(row, IMAGE_COL))
            .cloned()
            .or_else(|| cell_text(cell(IMAGE_COL)));

        Some(Product {
            id: display_string(cell(0)),
            name: cell_text(cell(1)),
            price: cell_number(cell(2)),
            original_price: cell_number(cell(3)),
            image_src,
            category: cell_text(cell(5)),
        })
    }
}

/// Display form of a cell, the way a spreadsheet UI would render it.
/// Whole floats drop their fractional part so numeric ids round-trip.
fn display_string(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => float_display(*f),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => dt.as_f64().to_string(),
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        Data::Error(_) | Data::Empty => String::new(),
    }
}

#[allow(clippy::cast_possible_truncation)]
fn float_display(f: f64) -> String {
    // Whole floats within exact-i64 range render without a trailing ".0".
    if f.fract() == 0.0 && f.abs() < 1e15 {
        (f as i64).to_string()
    } else {
        f.to_string()
    }
}

/// Text coercion: blank and error cells become `None`.
fn cell_text(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty | Data::Error(_) => None,
        other => Some(display_string(other)),
    }
}

/// Numeric coercion: numbers pass through, numeric-looking strings parse,
/// anything else becomes `None` and persists as `NULL`.
fn cell_number(cell: &Data) -> Option<f64> {
    match cell {
        Data::Float(f) => Some(*f),
        #[allow(clippy::cast_precision_loss)]
        Data::Int(i) => Some(*i as f64),
        Data::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

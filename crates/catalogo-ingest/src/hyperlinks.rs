//! Hyperlink extraction for the first worksheet of an xlsx archive.
//!
//! calamine surfaces only the display value of a hyperlink cell, but the
//! upload format stores the product image URL as the link *target* behind a
//! "Image" label. The target lives in the sheet part's relationship file, so
//! this module walks the OPC plumbing directly: workbook part → workbook
//! rels → first sheet part → `<hyperlink>` elements → sheet rels.

use std::collections::HashMap;
use std::io::{Read, Seek};

use quick_xml::events::Event;
use quick_xml::Reader;
use zip::result::ZipError;
use zip::ZipArchive;

use crate::error::IngestError;

/// Map of zero-based `(row, col)` cell positions to external link targets
/// for the workbook's first sheet.
///
/// Internal links (`location`-only hyperlinks, no relationship id) carry no
/// external target and are omitted.
///
/// # Errors
///
/// Returns [`IngestError`] if the archive cannot be read or a workbook part
/// is not well-formed XML.
pub fn first_sheet_hyperlinks<RS: Read + Seek>(
    reader: RS,
) -> Result<HashMap<(u32, u32), String>, IngestError> {
    let mut archive = ZipArchive::new(reader)?;

    let Some(workbook_xml) = read_part(&mut archive, "xl/workbook.xml")? else {
        return Ok(HashMap::new());
    };
    let Some(sheet_rid) = first_sheet_rid(&workbook_xml)? else {
        return Ok(HashMap::new());
    };

    let workbook_rels = read_part(&mut archive, "xl/_rels/workbook.xml.rels")?
        .map(|xml| relationship_targets(&xml))
        .transpose()?
        .unwrap_or_default();
    let Some(sheet_target) = workbook_rels.get(&sheet_rid) else {
        return Ok(HashMap::new());
    };
    let sheet_path = resolve_part_path(sheet_target);

    let Some(sheet_xml) = read_part(&mut archive, &sheet_path)? else {
        return Ok(HashMap::new());
    };
    let refs = hyperlink_refs(&sheet_xml)?;
    if refs.is_empty() {
        return Ok(HashMap::new());
    }

    // A sheet with hyperlinks always has a rels part, but a missing one just
    // means no external targets can be resolved.
    let sheet_rels = read_part(&mut archive, &rels_path_for(&sheet_path))?
        .map(|xml| relationship_targets(&xml))
        .transpose()?
        .unwrap_or_default();

    let mut links = HashMap::new();
    for (cell_ref, rid) in refs {
        let Some(rid) = rid else { continue };
        let Some(target) = sheet_rels.get(&rid) else {
            continue;
        };
        if let Some(pos) = parse_cell_ref(&cell_ref) {
            links.insert(pos, target.clone());
        }
    }
    Ok(links)
}

/// Parse an A1-style cell reference into zero-based `(row, col)`.
///
/// Range references (`E2:E2`) resolve to their first cell.
pub(crate) fn parse_cell_ref(cell_ref: &str) -> Option<(u32, u32)> {
    let cell_ref = cell_ref.split(':').next()?;

    let letters: String = cell_ref
        .chars()
        .take_while(char::is_ascii_alphabetic)
        .collect();
    let digits = &cell_ref[letters.len()..];
    if letters.is_empty() || digits.is_empty() {
        return None;
    }

    let mut col: u32 = 0;
    for c in letters.chars() {
        let value = u32::from(c.to_ascii_uppercase()) - u32::from('A') + 1;
        col = col.checked_mul(26)?.checked_add(value)?;
    }
    let row: u32 = digits.parse().ok()?;
    if row == 0 || col == 0 {
        return None;
    }
    Some((row - 1, col - 1))
}

fn read_part<RS: Read + Seek>(
    archive: &mut ZipArchive<RS>,
    name: &str,
) -> Result<Option<String>, IngestError> {
    match archive.by_name(name) {
        Ok(mut file) => {
            let mut xml = String::new();
            file.read_to_string(&mut xml)?;
            Ok(Some(xml))
        }
        Err(ZipError::FileNotFound) => Ok(None),
        Err(e) => Err(IngestError::Archive(e)),
    }
}

/// Relationship id of the first `<sheet>` element in workbook order.
fn first_sheet_rid(xml: &str) -> Result<Option<String>, IngestError> {
    let mut reader = Reader::from_str(xml);
    loop {
        match reader.read_event().map_err(xml_error)? {
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"sheet" => {
                return Ok(attr_value(&e, b"r:id"));
            }
            Event::Eof => return Ok(None),
            _ => {}
        }
    }
}

/// `Id → Target` map from a `.rels` part.
fn relationship_targets(xml: &str) -> Result<HashMap<String, String>, IngestError> {
    let mut reader = Reader::from_str(xml);
    let mut targets = HashMap::new();
    loop {
        match reader.read_event().map_err(xml_error)? {
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"Relationship" => {
                if let (Some(id), Some(target)) = (attr_value(&e, b"Id"), attr_value(&e, b"Target"))
                {
                    targets.insert(id, target);
                }
            }
            Event::Eof => return Ok(targets),
            _ => {}
        }
    }
}

/// `(ref, r:id)` pairs from a sheet part's `<hyperlink>` elements.
fn hyperlink_refs(xml: &str) -> Result<Vec<(String, Option<String>)>, IngestError> {
    let mut reader = Reader::from_str(xml);
    let mut refs = Vec::new();
    loop {
        match reader.read_event().map_err(xml_error)? {
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"hyperlink" => {
                if let Some(cell_ref) = attr_value(&e, b"ref") {
                    refs.push((cell_ref, attr_value(&e, b"r:id")));
                }
            }
            Event::Eof => return Ok(refs),
            _ => {}
        }
    }
}

fn attr_value(element: &quick_xml::events::BytesStart<'_>, key: &[u8]) -> Option<String> {
    element
        .attributes()
        .flatten()
        .find(|attr| attr.key.as_ref() == key)
        .and_then(|attr| attr.unescape_value().ok().map(|v| v.into_owned()))
}

fn xml_error(e: quick_xml::Error) -> IngestError {
    IngestError::SheetXml(e.to_string())
}

/// Resolve a workbook-relative relationship target to a full archive path.
fn resolve_part_path(target: &str) -> String {
    if let Some(absolute) = target.strip_prefix('/') {
        absolute.to_string()
    } else {
        format!("xl/{target}")
    }
}

/// Path of the `.rels` part that belongs to `part_path`.
fn rels_path_for(part_path: &str) -> String {
    match part_path.rsplit_once('/') {
        Some((dir, file)) => format!("{dir}/_rels/{file}.rels"),
        None => format!("_rels/{part_path}.rels"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_cell_ref_handles_single_letter_columns() {
        assert_eq!(parse_cell_ref("A1"), Some((0, 0)));
        assert_eq!(parse_cell_ref("E2"), Some((1, 4)));
        assert_eq!(parse_cell_ref("F10"), Some((9, 5)));
    }

    #[test]
    fn parse_cell_ref_handles_multi_letter_columns() {
        assert_eq!(parse_cell_ref("AA1"), Some((0, 26)));
        assert_eq!(parse_cell_ref("AB3"), Some((2, 27)));
    }

    #[test]
    fn parse_cell_ref_takes_first_cell_of_a_range() {
        assert_eq!(parse_cell_ref("E2:E2"), Some((1, 4)));
    }

    #[test]
    fn parse_cell_ref_rejects_garbage() {
        assert_eq!(parse_cell_ref(""), None);
        assert_eq!(parse_cell_ref("E"), None);
        assert_eq!(parse_cell_ref("2"), None);
        assert_eq!(parse_cell_ref("E0"), None);
    }

    #[test]
    fn relationship_targets_parses_rels_part() {
        let xml = r#"<?xml version="1.0"?>
            <Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
              <Relationship Id="rId1" Type="t" Target="https://example.com/img.png" TargetMode="External"/>
              <Relationship Id="rId2" Type="t" Target="worksheets/sheet1.xml"/>
            </Relationships>"#;
        let targets = relationship_targets(xml).expect("parse rels");
        assert_eq!(
            targets.get("rId1").map(String::as_str),
            Some("https://example.com/img.png")
        );
        assert_eq!(
            targets.get("rId2").map(String::as_str),
            Some("worksheets/sheet1.xml")
        );
    }

    #[test]
    fn hyperlink_refs_reads_ref_and_relationship_id() {
        let xml = r#"<worksheet>
            <sheetData/>
            <hyperlinks>
              <hyperlink ref="E2" r:id="rId1"/>
              <hyperlink ref="E3" location="Sheet2!A1"/>
            </hyperlinks>
          </worksheet>"#;
        let refs = hyperlink_refs(xml).expect("parse sheet");
        assert_eq!(refs.len(), 2);
        assert_eq!(refs[0], ("E2".to_string(), Some("rId1".to_string())));
        assert_eq!(refs[1], ("E3".to_string(), None));
    }

    #[test]
    fn rels_path_sits_next_to_the_part() {
        assert_eq!(
            rels_path_for("xl/worksheets/sheet1.xml"),
            "xl/worksheets/_rels/sheet1.xml.rels"
        );
    }

    #[test]
    fn part_paths_resolve_relative_to_xl() {
        assert_eq!(
            resolve_part_path("worksheets/sheet1.xml"),
            "xl/worksheets/sheet1.xml"
        );
        assert_eq!(
            resolve_part_path("/xl/worksheets/sheet1.xml"),
            "xl/worksheets/sheet1.xml"
        );
    }
}

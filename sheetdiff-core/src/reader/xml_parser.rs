//! XML parsing utilities for extracting number formats from XLSX files

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use std::collections::HashMap;
use std::io::{BufReader, Read, Seek};
use zip::ZipArchive;

use crate::error::Result;
use crate::report::CellReference;

/// Built-in number formats (simplified subset)
/// See https://github.com/dtjohnson/xlsx-populate/blob/master/lib/NumFmt.js
const BUILTIN_NUM_FMTS: [(u32, &str); 28] = [
    (0, "General"),
    (1, "0"),
    (2, "0.00"),
    (3, "#,##0"),
    (4, "#,##0.00"),
    (9, "0%"),
    (10, "0.00%"),
    (11, "0.00E+00"),
    (12, "# ?/?"),
    (13, "# ??/??"),
    (14, "mm-dd-yy"),
    (15, "d-mmm-yy"),
    (16, "d-mmm"),
    (17, "mmm-yy"),
    (18, "h:mm AM/PM"),
    (19, "h:mm:ss AM/PM"),
    (20, "h:mm"),
    (21, "h:mm:ss"),
    (22, "m/d/yy h:mm"),
    (37, "#,##0 ;(#,##0)"),
    (38, "#,##0 ;[Red](#,##0)"),
    (39, "#,##0.00;(#,##0.00)"),
    (40, "#,##0.00;[Red](#,##0.00)"),
    (45, "mm:ss"),
    (46, "[h]:mm:ss"),
    (47, "mmss.0"),
    (48, "##0.0E+0"),
    (49, "@"),
];

/// Worksheet part paths keyed by sheet name, resolved through the workbook
/// relationships
pub fn extract_sheet_paths_from_xlsx(
    archive: &mut ZipArchive<impl Read + Seek>,
) -> Result<HashMap<String, String>> {
    let mut rels = HashMap::new();
    if let Ok(file) = archive.by_name("xl/_rels/workbook.xml.rels") {
        let mut reader = Reader::from_reader(BufReader::new(file));
        reader.config_mut().trim_text(true);
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"Relationship" => {
                    let id = attribute(&e, b"Id")?;
                    let target = attribute(&e, b"Target")?;
                    if let (Some(id), Some(target)) = (id, target) {
                        rels.insert(id, normalize_target(&target));
                    }
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }
    }

    let mut paths = HashMap::new();
    let Ok(file) = archive.by_name("xl/workbook.xml") else {
        return Ok(paths);
    };
    let mut reader = Reader::from_reader(BufReader::new(file));
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();
    let mut position = 0usize;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"sheet" => {
                position += 1;
                let name = attribute(&e, b"name")?;
                // r:id lives in the relationships namespace
                let rel_id = e
                    .attributes()
                    .flatten()
                    .find(|a| a.key.local_name().as_ref() == b"id")
                    .map(|a| String::from_utf8_lossy(&a.value).to_string());

                if let Some(name) = name {
                    let path = rel_id
                        .and_then(|id| rels.get(&id).cloned())
                        .unwrap_or_else(|| format!("xl/worksheets/sheet{}.xml", position));
                    paths.insert(name, path);
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(paths)
}

/// Relationship targets are relative to `xl/` unless absolute
fn normalize_target(target: &str) -> String {
    if let Some(stripped) = target.strip_prefix('/') {
        stripped.to_string()
    } else if target.starts_with("xl/") {
        target.to_string()
    } else {
        format!("xl/{}", target)
    }
}

fn attribute(e: &BytesStart<'_>, key: &[u8]) -> Result<Option<String>> {
    for attr in e.attributes() {
        let attr = attr.map_err(quick_xml::Error::from)?;
        if attr.key.as_ref() == key {
            return Ok(Some(attr.unescape_value()?.into_owned()));
        }
    }
    Ok(None)
}

/// Parse styles.xml into the list of number format codes indexed by cell
/// style (`cellXfs` position)
pub fn parse_styles(archive: &mut ZipArchive<impl Read + Seek>) -> Result<Vec<String>> {
    let mut num_fmts: HashMap<u32, String> = BUILTIN_NUM_FMTS
        .iter()
        .map(|(id, code)| (*id, code.to_string()))
        .collect();

    let styles_xml = match archive.by_name("xl/styles.xml") {
        Ok(file) => file,
        Err(_) => return Ok(Vec::new()),
    };

    let mut reader = Reader::from_reader(BufReader::new(styles_xml));
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    let mut xfs = Vec::new();
    let mut in_cell_xfs = false;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) | Event::Empty(e) => match e.local_name().as_ref() {
                b"numFmt" => {
                    let id = attribute(&e, b"numFmtId")?.and_then(|v| v.parse::<u32>().ok());
                    let code = attribute(&e, b"formatCode")?;
                    if let (Some(id), Some(code)) = (id, code) {
                        if !code.is_empty() {
                            num_fmts.insert(id, code);
                        }
                    }
                }
                b"cellXfs" => {
                    in_cell_xfs = true;
                }
                b"xf" if in_cell_xfs => {
                    let num_fmt_id = attribute(&e, b"numFmtId")?
                        .and_then(|v| v.parse::<u32>().ok())
                        .unwrap_or(0);
                    let format_code = num_fmts
                        .get(&num_fmt_id)
                        .cloned()
                        .unwrap_or_else(|| "General".to_string());
                    xfs.push(format_code);
                }
                _ => {}
            },
            Event::End(e) if e.local_name().as_ref() == b"cellXfs" => {
                in_cell_xfs = false;
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(xfs)
}

/// Extract cell style indices from the worksheet part at `sheet_path`
pub fn extract_cell_style_indices_from_xlsx(
    archive: &mut ZipArchive<impl Read + Seek>,
    sheet_path: &str,
) -> Result<HashMap<(u32, u32), usize>> {
    let mut cell_styles = HashMap::new();

    let sheet_xml = match archive.by_name(sheet_path) {
        Ok(file) => file,
        Err(_) => return Ok(cell_styles),
    };

    let mut reader = Reader::from_reader(BufReader::new(sheet_xml));
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"c" => {
                let at = attribute(&e, b"r")?.and_then(|r| CellReference::parse(&r));
                let style = attribute(&e, b"s")?.and_then(|s| s.parse::<usize>().ok());
                if let (Some(at), Some(style)) = (at, style) {
                    cell_styles.insert((at.row, at.col), style);
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(cell_styles)
}

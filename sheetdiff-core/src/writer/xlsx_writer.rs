//! Minimal XLSX package writer for comparison reports

use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesText, Event};
use std::io::{Cursor, Seek, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::{CompareError, Result};
use crate::render::{ReportSheet, ReportWorkbook};
use crate::report::CellReference;

const MAIN_NS: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";
const REL_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const PKG_REL_NS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";

/// Style index of bold cells in styles.xml
const BOLD_STYLE: &str = "1";
const MAX_COLUMN_WIDTH: usize = 80;
const MIN_COLUMN_WIDTH: usize = 10;

/// Serialize the report into the bytes of an `.xlsx` file
pub fn write_xlsx_bytes(report: &ReportWorkbook) -> Result<Vec<u8>> {
    let mut cursor = Cursor::new(Vec::new());
    write_xlsx(report, &mut cursor)?;
    Ok(cursor.into_inner())
}

/// Serialize the report as an `.xlsx` package into `out`
pub fn write_xlsx<W: Write + Seek>(report: &ReportWorkbook, out: W) -> Result<()> {
    if report.sheets.is_empty() {
        return Err(CompareError::EmptyReport);
    }

    let mut zip = ZipWriter::new(out);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    zip.start_file("[Content_Types].xml", options)?;
    zip.write_all(content_types_xml(report.sheets.len()).as_bytes())?;

    zip.start_file("_rels/.rels", options)?;
    zip.write_all(root_rels_xml().as_bytes())?;

    zip.start_file("xl/workbook.xml", options)?;
    zip.write_all(&workbook_xml(report)?)?;

    zip.start_file("xl/_rels/workbook.xml.rels", options)?;
    zip.write_all(workbook_rels_xml(report.sheets.len()).as_bytes())?;

    zip.start_file("xl/styles.xml", options)?;
    zip.write_all(STYLES_XML.as_bytes())?;

    for (i, sheet) in report.sheets.iter().enumerate() {
        zip.start_file(format!("xl/worksheets/sheet{}.xml", i + 1), options)?;
        zip.write_all(&worksheet_xml(sheet)?)?;
    }

    zip.finish()?;
    Ok(())
}

fn content_types_xml(sheet_count: usize) -> String {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
<Default Extension="xml" ContentType="application/xml"/>
<Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>
<Override PartName="/xl/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml"/>
"#,
    );
    for i in 1..=sheet_count {
        xml.push_str(&format!(
            r#"<Override PartName="/xl/worksheets/sheet{}.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>"#,
            i
        ));
    }
    xml.push_str("</Types>");
    xml
}

fn root_rels_xml() -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="{}">
<Relationship Id="rId1" Type="{}/officeDocument" Target="xl/workbook.xml"/>
</Relationships>"#,
        PKG_REL_NS, REL_NS
    )
}

fn workbook_rels_xml(sheet_count: usize) -> String {
    let mut xml = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="{}">
"#,
        PKG_REL_NS
    );
    for i in 1..=sheet_count {
        xml.push_str(&format!(
            r#"<Relationship Id="rId{}" Type="{}/worksheet" Target="worksheets/sheet{}.xml"/>"#,
            i, REL_NS, i
        ));
    }
    xml.push_str(&format!(
        r#"<Relationship Id="rId{}" Type="{}/styles" Target="styles.xml"/>"#,
        sheet_count + 1,
        REL_NS
    ));
    xml.push_str("</Relationships>");
    xml
}

/// Sheet names go through the XML writer so that `&` and friends are escaped
fn workbook_xml(report: &ReportWorkbook) -> Result<Vec<u8>> {
    let mut writer = Writer::new(Cursor::new(Vec::new()));
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))?;
    writer
        .create_element("workbook")
        .with_attribute(("xmlns", MAIN_NS))
        .with_attribute(("xmlns:r", REL_NS))
        .write_inner_content(|w| {
            w.create_element("sheets").write_inner_content(|w| {
                for (i, sheet) in report.sheets.iter().enumerate() {
                    let id = (i + 1).to_string();
                    w.create_element("sheet")
                        .with_attribute(("name", sheet.name.as_str()))
                        .with_attribute(("sheetId", id.as_str()))
                        .with_attribute(("r:id", format!("rId{}", id).as_str()))
                        .write_empty()?;
                }
                Ok(())
            })?;
            Ok(())
        })?;
    Ok(writer.into_inner().into_inner())
}

fn worksheet_xml(sheet: &ReportSheet) -> Result<Vec<u8>> {
    let bold_rows = [0, sheet.header_row()];
    let widths = column_widths(&sheet.rows);

    let mut writer = Writer::new(Cursor::new(Vec::new()));
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))?;
    writer
        .create_element("worksheet")
        .with_attribute(("xmlns", MAIN_NS))
        .write_inner_content(|w| {
            if !widths.is_empty() {
                w.create_element("cols").write_inner_content(|w| {
                    for (i, width) in widths.iter().enumerate() {
                        let index = (i + 1).to_string();
                        w.create_element("col")
                            .with_attribute(("min", index.as_str()))
                            .with_attribute(("max", index.as_str()))
                            .with_attribute(("width", width.to_string().as_str()))
                            .with_attribute(("customWidth", "1"))
                            .write_empty()?;
                    }
                    Ok(())
                })?;
            }

            w.create_element("sheetData").write_inner_content(|w| {
                for (r, row) in sheet.rows.iter().enumerate() {
                    if row.iter().all(|v| v.is_empty()) {
                        continue;
                    }
                    let row_number = (r + 1).to_string();
                    let bold = bold_rows.contains(&r);
                    w.create_element("row")
                        .with_attribute(("r", row_number.as_str()))
                        .write_inner_content(|w| {
                            for (c, text) in row.iter().enumerate() {
                                if text.is_empty() {
                                    continue;
                                }
                                let cell_ref =
                                    CellReference::new(r as u32, c as u32).to_excel_ref();
                                let mut cell = w
                                    .create_element("c")
                                    .with_attribute(("r", cell_ref.as_str()))
                                    .with_attribute(("t", "inlineStr"));
                                if bold {
                                    cell = cell.with_attribute(("s", BOLD_STYLE));
                                }
                                cell.write_inner_content(|w| {
                                    w.create_element("is").write_inner_content(|w| {
                                        w.create_element("t")
                                            .with_attribute(("xml:space", "preserve"))
                                            .write_text_content(BytesText::new(text))?;
                                        Ok(())
                                    })?;
                                    Ok(())
                                })?;
                            }
                            Ok(())
                        })?;
                }
                Ok(())
            })?;
            Ok(())
        })?;
    Ok(writer.into_inner().into_inner())
}

/// Width per column from the longest text in it, legend rows excluded
fn column_widths(rows: &[Vec<String>]) -> Vec<usize> {
    let mut widths: Vec<usize> = Vec::new();
    for row in rows.iter().filter(|r| r.len() > 1) {
        for (c, text) in row.iter().enumerate() {
            if widths.len() <= c {
                widths.resize(c + 1, MIN_COLUMN_WIDTH);
            }
            let len = text.chars().count() + 2;
            widths[c] = widths[c].max(len.min(MAX_COLUMN_WIDTH));
        }
    }
    widths
}

const STYLES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
<fonts count="2"><font><sz val="11"/><name val="Calibri"/></font><font><b/><sz val="11"/><name val="Calibri"/></font></fonts>
<fills count="2"><fill><patternFill patternType="none"/></fill><fill><patternFill patternType="gray125"/></fill></fills>
<borders count="1"><border><left/><right/><top/><bottom/><diagonal/></border></borders>
<cellStyleXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0"/></cellStyleXfs>
<cellXfs count="2"><xf numFmtId="0" fontId="0" fillId="0" borderId="0" xfId="0"/><xf numFmtId="0" fontId="1" fillId="0" borderId="0" xfId="0" applyFont="1"/></cellXfs>
<cellStyles count="1"><cellStyle name="Normal" xfId="0" builtinId="0"/></cellStyles>
</styleSheet>"#;

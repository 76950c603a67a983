use sheetdiff_core::reader::{CellValue, read_workbook};
use sheetdiff_core::render::CHANGED_TAG;
use sheetdiff_core::{CompareConfig, CompareError, Comparator, ReportFormat};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

/// A cell of a mock worksheet
#[derive(Clone, Copy)]
enum Mock {
    Blank,
    Num(f64),
    Text(&'static str),
    /// Number stored with the `0.00%` format
    Pct(f64),
    /// Number stored with the `0.00` format
    Dec(f64),
}

use Mock::*;

fn cell_ref(row: usize, col: usize) -> String {
    let mut letters = String::new();
    let mut n = col + 1;
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.insert(0, (b'A' + rem as u8) as char);
        n = (n - 1) / 26;
    }
    format!("{}{}", letters, row + 1)
}

fn sheet_xml(rows: &[Vec<Mock>], origin: (usize, usize)) -> String {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>"#,
    );
    for (r, row) in rows.iter().enumerate() {
        let r = r + origin.0;
        xml.push_str(&format!(r#"<row r="{}">"#, r + 1));
        for (c, cell) in row.iter().enumerate() {
            let at = cell_ref(r, c + origin.1);
            match cell {
                Blank => {}
                Num(n) => xml.push_str(&format!(r#"<c r="{}"><v>{}</v></c>"#, at, n)),
                Pct(n) => xml.push_str(&format!(r#"<c r="{}" s="1"><v>{}</v></c>"#, at, n)),
                Dec(n) => xml.push_str(&format!(r#"<c r="{}" s="2"><v>{}</v></c>"#, at, n)),
                Text(t) => xml.push_str(&format!(
                    r#"<c r="{}" t="inlineStr"><is><t>{}</t></is></c>"#,
                    at, t
                )),
            }
        }
        xml.push_str("</row>");
    }
    xml.push_str("</sheetData></worksheet>");
    xml
}

// Helper to create a minimal valid XLSX file for testing
fn create_mock_xlsx_at(
    path: &Path,
    sheets: &[(&str, Vec<Vec<Mock>>)],
    origin: (usize, usize),
) -> anyhow::Result<()> {
    let file = File::create(path)?;
    let mut zip = ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);

    zip.start_file("[Content_Types].xml", options)?;
    let mut content_types = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
<Default Extension="xml" ContentType="application/xml"/>
<Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>
<Override PartName="/xl/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml"/>
"#,
    );
    for (i, _) in sheets.iter().enumerate() {
        content_types.push_str(&format!(
            r#"<Override PartName="/xl/worksheets/sheet{}.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>"#,
            i + 1
        ));
    }
    content_types.push_str("</Types>");
    zip.write_all(content_types.as_bytes())?;

    zip.start_file("_rels/.rels", options)?;
    zip.write_all(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/>
</Relationships>"#.as_bytes())?;

    zip.start_file("xl/workbook.xml", options)?;
    let mut workbook_xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
<sheets>"#,
    );
    for (i, (name, _)) in sheets.iter().enumerate() {
        workbook_xml.push_str(&format!(
            r#"<sheet name="{}" sheetId="{}" r:id="rId{}"/>"#,
            name,
            i + 1,
            i + 1
        ));
    }
    workbook_xml.push_str("</sheets></workbook>");
    zip.write_all(workbook_xml.as_bytes())?;

    zip.start_file("xl/_rels/workbook.xml.rels", options)?;
    let mut rels_xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
"#,
    );
    for (i, _) in sheets.iter().enumerate() {
        rels_xml.push_str(&format!(
            r#"<Relationship Id="rId{}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet{}.xml"/>"#,
            i + 1,
            i + 1
        ));
    }
    rels_xml.push_str(&format!(
        r#"<Relationship Id="rId{}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>"#,
        sheets.len() + 1
    ));
    rels_xml.push_str("</Relationships>");
    zip.write_all(rels_xml.as_bytes())?;

    zip.start_file("xl/styles.xml", options)?;
    zip.write_all(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
<fonts count="1"><font><sz val="11"/><name val="Calibri"/></font></fonts>
<fills count="1"><fill><patternFill patternType="none"/></fill></fills>
<borders count="1"><border/></borders>
<cellStyleXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0"/></cellStyleXfs>
<cellXfs count="3"><xf numFmtId="0" fontId="0" fillId="0" borderId="0" xfId="0"/><xf numFmtId="10" fontId="0" fillId="0" borderId="0" xfId="0" applyNumberFormat="1"/><xf numFmtId="2" fontId="0" fillId="0" borderId="0" xfId="0" applyNumberFormat="1"/></cellXfs>
</styleSheet>"#.as_bytes())?;

    for (i, (_, rows)) in sheets.iter().enumerate() {
        zip.start_file(format!("xl/worksheets/sheet{}.xml", i + 1), options)?;
        zip.write_all(sheet_xml(rows, origin).as_bytes())?;
    }

    zip.finish()?;
    Ok(())
}

fn create_mock_xlsx(path: &Path, sheets: &[(&str, Vec<Vec<Mock>>)]) -> anyhow::Result<()> {
    create_mock_xlsx_at(path, sheets, (0, 0))
}

fn revenue_pair(dir: &Path) -> anyhow::Result<(std::path::PathBuf, std::path::PathBuf)> {
    let original = dir.join("original.xlsx");
    let modified = dir.join("modified.xlsx");
    create_mock_xlsx(
        &original,
        &[(
            "Summary",
            vec![
                vec![Text("Revenue"), Num(100.0), Text("10%")],
                vec![Text("Cost"), Num(40.0), Text("5%")],
            ],
        )],
    )?;
    create_mock_xlsx(
        &modified,
        &[(
            "Summary",
            vec![
                vec![Text("Revenue"), Num(150.0), Num(0.12)],
                vec![Text("Cost"), Num(40.0), Text("5%")],
            ],
        )],
    )?;
    Ok((original, modified))
}

#[test]
fn test_identical_files_have_no_differences() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let (original, _) = revenue_pair(dir.path())?;

    let (a, b, result) = Comparator::new().compare_files(&original, &original)?;
    assert!(!result.has_differences());
    assert_eq!(result.sheets_compared(), 1);
    assert!(result.sheets[0].change_set.is_empty());

    let report = Comparator::new().render(&a, &b, &result);
    let sheet = &report.sheets[0];
    let body = &sheet.rows[sheet.header_row() + 1..];
    assert_eq!(body.len(), 2);
    assert_eq!(body[0][0], "Revenue");
    assert!(body.iter().all(|row| !row[0].starts_with(CHANGED_TAG)));
    Ok(())
}

#[test]
fn test_revenue_scenario_single_layout() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let (original, modified) = revenue_pair(dir.path())?;

    let comparator = Comparator::new();
    let (a, b, result) = comparator.compare_files(&original, &modified)?;

    let refs: Vec<&str> = result.differences().map(|d| d.cell_ref.as_str()).collect();
    assert_eq!(refs, vec!["B1", "C1"]);
    assert_eq!(result.summary().sheets[0].changed_rows, 1);

    let report = comparator.render(&a, &b, &result);
    let sheet = &report.sheets[0];
    assert_eq!(sheet.name, "Summary_Comparison");

    let first = &sheet.rows[sheet.header_row() + 1];
    assert_eq!(first[0], "[CHANGED] Revenue");
    assert_eq!(
        first[1],
        "Original Value: 100, Changed Value: 150, Difference: +50"
    );
    assert_eq!(
        first[2],
        "Original Value: 10%, Changed Value: 12%, Difference: +2%"
    );

    let second = &sheet.rows[sheet.header_row() + 2];
    assert_eq!(second[0], "Cost");
    Ok(())
}

#[test]
fn test_revenue_scenario_multi_layout() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let (original, modified) = revenue_pair(dir.path())?;

    let comparator = Comparator::with_config(CompareConfig {
        format: ReportFormat::Multi,
        ..CompareConfig::default()
    });
    let (a, b, result) = comparator.compare_files(&original, &modified)?;
    let report = comparator.render(&a, &b, &result);
    let sheet = &report.sheets[0];

    assert_eq!(
        sheet.rows[sheet.header_row()],
        vec![
            "Field Name",
            "Original Value",
            "Changed Value",
            "Difference",
            "Original Value",
            "Changed Value",
            "Difference"
        ]
    );
    assert_eq!(
        sheet.rows[sheet.header_row() + 1],
        vec!["[CHANGED] Revenue", "100", "150", "+50", "10%", "12%", "+2%"]
    );
    Ok(())
}

#[test]
fn test_structural_mismatch_writes_no_report() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let original = dir.path().join("a.xlsx");
    let modified = dir.path().join("b.xlsx");
    create_mock_xlsx(&original, &[("A", vec![]), ("B", vec![])])?;
    create_mock_xlsx(&modified, &[("B", vec![]), ("A", vec![])])?;

    let output = dir.path().join("report.xlsx");
    let err = Comparator::new()
        .run(&original, &modified, Some(&output))
        .unwrap_err();

    match err {
        CompareError::SheetNameMismatch {
            position,
            original,
            modified,
        } => {
            assert_eq!(position, 1);
            assert_eq!(original, "A");
            assert_eq!(modified, "B");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(!output.exists());
    Ok(())
}

#[test]
fn test_sheet_count_mismatch() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let original = dir.path().join("a.xlsx");
    let modified = dir.path().join("b.xlsx");
    create_mock_xlsx(&original, &[("A", vec![])])?;
    create_mock_xlsx(&modified, &[("A", vec![]), ("B", vec![])])?;

    let err = Comparator::new()
        .compare_files(&original, &modified)
        .unwrap_err();
    assert!(matches!(
        err,
        CompareError::SheetCountMismatch {
            original: 1,
            modified: 2
        }
    ));
    Ok(())
}

#[test]
fn test_number_format_marks_percentages() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let styled_a = dir.path().join("styled_a.xlsx");
    let styled_b = dir.path().join("styled_b.xlsx");
    let plain_a = dir.path().join("plain_a.xlsx");
    let plain_b = dir.path().join("plain_b.xlsx");

    let header = vec![Text("Metric"), Text("Value")];
    create_mock_xlsx(
        &styled_a,
        &[("KPI", vec![header.clone(), vec![Text("Margin"), Pct(0.4)]])],
    )?;
    create_mock_xlsx(
        &styled_b,
        &[("KPI", vec![header.clone(), vec![Text("Margin"), Pct(0.5)]])],
    )?;
    create_mock_xlsx(
        &plain_a,
        &[("KPI", vec![header.clone(), vec![Text("Margin"), Num(0.4)]])],
    )?;
    create_mock_xlsx(
        &plain_b,
        &[("KPI", vec![header, vec![Text("Margin"), Num(0.5)]])],
    )?;

    let workbook = read_workbook(&styled_a)?;
    let kpi = workbook.get_sheet("KPI").unwrap();
    assert_eq!(kpi.num_fmt(1, 1), Some("0.00%"));
    assert_eq!(kpi.num_fmt(1, 0), None);

    let comparator = Comparator::new();

    let (a, b, result) = comparator.compare_files(&styled_a, &styled_b)?;
    let report = comparator.render(&a, &b, &result);
    let sheet = &report.sheets[0];
    assert_eq!(
        sheet.rows[sheet.header_row() + 2][1],
        "Original Value: 40%, Changed Value: 50%, Difference: +10%"
    );

    let (a, b, result) = comparator.compare_files(&plain_a, &plain_b)?;
    let report = comparator.render(&a, &b, &result);
    let sheet = &report.sheets[0];
    assert_eq!(
        sheet.rows[sheet.header_row() + 2][1],
        "Original Value: 0.4, Changed Value: 0.5, Difference: +0.1"
    );
    Ok(())
}

#[test]
fn test_decimal_format_keeps_fractions_numeric() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let original = dir.path().join("a.xlsx");
    let modified = dir.path().join("b.xlsx");
    let header = vec![Text("Asset"), Text("Weight")];
    create_mock_xlsx(
        &original,
        &[("Mix", vec![header.clone(), vec![Text("Bonds"), Dec(0.25)]])],
    )?;
    create_mock_xlsx(
        &modified,
        &[("Mix", vec![header, vec![Text("Bonds"), Dec(0.35)]])],
    )?;

    let comparator = Comparator::new();
    let (a, b, result) = comparator.compare_files(&original, &modified)?;
    assert_eq!(a.get_sheet("Mix").unwrap().num_fmt(1, 1), Some("0.00"));

    let report = comparator.render(&a, &b, &result);
    let sheet = &report.sheets[0];
    assert_eq!(
        sheet.rows[sheet.header_row() + 2][1],
        "Original Value: 0.25, Changed Value: 0.35, Difference: +0.1"
    );
    Ok(())
}

#[test]
fn test_ragged_sheets_use_bounding_box() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let original = dir.path().join("a.xlsx");
    let modified = dir.path().join("b.xlsx");
    create_mock_xlsx(&original, &[("Data", vec![vec![Text("Units"), Num(5.0)]])])?;
    create_mock_xlsx(
        &modified,
        &[(
            "Data",
            vec![
                vec![Text("Units"), Num(5.0), Blank, Num(7.0)],
                vec![Text("Extra"), Text("text")],
            ],
        )],
    )?;

    let (a, b, result) = Comparator::new().compare_files(&original, &modified)?;
    assert_eq!(result.sheets[0].dimensions, (2, 4));

    let refs: Vec<&str> = result.differences().map(|d| d.cell_ref.as_str()).collect();
    assert_eq!(refs, vec!["D1", "A2", "B2"]);
    // Label column differences do not tag rows on their own
    assert!(!result.sheets[0].change_set.contains(1, 0));
    assert!(result.sheets[0].change_set.contains(1, 1));

    let report = Comparator::new().render(&a, &b, &result);
    let sheet = &report.sheets[0];
    let first = &sheet.rows[sheet.header_row() + 1];
    assert_eq!(first[0], "[CHANGED] Units");
    assert_eq!(first[2], "");
    assert_eq!(
        first[3],
        "Original Value: , Changed Value: 7, Difference: N/A (non-numeric)"
    );

    let second = &sheet.rows[sheet.header_row() + 2];
    assert_eq!(second[0], "[CHANGED] ");
    assert_eq!(
        second[1],
        "Original Value: , Changed Value: text, Difference: N/A (non-numeric)"
    );
    Ok(())
}

#[test]
fn test_offset_data_keeps_absolute_references() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let original = dir.path().join("a.xlsx");
    let modified = dir.path().join("b.xlsx");
    create_mock_xlsx_at(
        &original,
        &[("Data", vec![vec![Text("Qty"), Num(1.0)]])],
        (2, 1),
    )?;
    create_mock_xlsx_at(
        &modified,
        &[("Data", vec![vec![Text("Qty"), Num(2.0)]])],
        (2, 1),
    )?;

    let (a, _, result) = Comparator::new().compare_files(&original, &modified)?;
    assert_eq!(
        a.get_sheet("Data").unwrap().value(2, 1),
        &CellValue::Text("Qty".to_string())
    );

    let diff = result.differences().next().unwrap();
    assert_eq!(diff.cell_ref, "C3");
    assert_eq!((diff.row, diff.col), (3, 3));
    assert_eq!(diff.original_value, "1");
    assert_eq!(diff.modified_value, "2");
    Ok(())
}

#[test]
fn test_run_writes_readable_report() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let (original, modified) = revenue_pair(dir.path())?;
    let output = dir.path().join("out").join("report.xlsx");

    let outcome = Comparator::new().run(&original, &modified, Some(&output))?;
    assert_eq!(outcome.report_path, output);
    assert_eq!(outcome.result.total_differences(), 2);

    let report = read_workbook(&output)?;
    assert_eq!(report.sheet_names(), vec!["Summary_Comparison"]);

    let sheet = report.get_sheet("Summary_Comparison").unwrap();
    assert_eq!(sheet.value(6, 0), &CellValue::Text("Field Name".to_string()));
    assert_eq!(sheet.value(6, 1), &CellValue::Text("Column B".to_string()));
    assert_eq!(
        sheet.value(7, 0),
        &CellValue::Text("[CHANGED] Revenue".to_string())
    );
    assert_eq!(
        sheet.value(7, 2),
        &CellValue::Text("Original Value: 10%, Changed Value: 12%, Difference: +2%".to_string())
    );
    assert_eq!(sheet.value(8, 0), &CellValue::Text("Cost".to_string()));
    Ok(())
}

#[test]
fn test_run_uses_configured_output_location() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let (original, modified) = revenue_pair(dir.path())?;

    let comparator = Comparator::with_config(CompareConfig {
        output_dir: dir.path().join("reports"),
        output_name: Some("diff.xlsx".to_string()),
        ..CompareConfig::default()
    });
    let outcome = comparator.run(&original, &modified, None)?;
    assert_eq!(outcome.report_path, dir.path().join("reports").join("diff.xlsx"));
    assert!(outcome.report_path.exists());
    Ok(())
}

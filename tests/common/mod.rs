//! In-memory workbook builder shared by the integration tests.

#![allow(dead_code)]

use cbcxml::CellValue;
use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

enum SheetBody {
    Rows(Vec<Vec<CellValue>>),
    /// Worksheet XML written as given
    Raw(String),
}

/// Builds a minimal `.xlsx` package with text cells in a shared strings table.
#[derive(Default)]
pub struct WorkbookBuilder {
    sheets: Vec<(String, SheetBody)>,
}

impl WorkbookBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sheet(mut self, name: &str, rows: Vec<Vec<CellValue>>) -> Self {
        self.sheets.push((name.to_string(), SheetBody::Rows(rows)));
        self
    }

    pub fn raw_sheet(mut self, name: &str, xml: &str) -> Self {
        self.sheets.push((name.to_string(), SheetBody::Raw(xml.to_string())));
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut strings: Vec<String> = Vec::new();
        let mut worksheets = Vec::new();
        for (_, body) in &self.sheets {
            worksheets.push(match body {
                SheetBody::Rows(rows) => worksheet_xml(rows, &mut strings),
                SheetBody::Raw(xml) => xml.clone(),
            });
        }

        let mut parts: Vec<(String, String)> = vec![
            ("[Content_Types].xml".into(), CONTENT_TYPES.into()),
            ("_rels/.rels".into(), PACKAGE_RELS.into()),
            ("xl/workbook.xml".into(), self.workbook_xml()),
            ("xl/_rels/workbook.xml.rels".into(), self.workbook_rels()),
            ("xl/sharedStrings.xml".into(), shared_strings_xml(&strings)),
        ];
        for (i, xml) in worksheets.into_iter().enumerate() {
            parts.push((format!("xl/worksheets/sheet{}.xml", i + 1), xml));
        }

        let mut buffer = Vec::new();
        {
            let mut zip = ZipWriter::new(Cursor::new(&mut buffer));
            let options = SimpleFileOptions::default();
            for (name, body) in parts {
                zip.start_file(name, options).unwrap();
                zip.write_all(body.as_bytes()).unwrap();
            }
            zip.finish().unwrap();
        }
        buffer
    }

    fn workbook_xml(&self) -> String {
        let mut xml = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets>"#,
        );
        for (i, (name, _)) in self.sheets.iter().enumerate() {
            xml.push_str(&format!(
                r#"<sheet name="{}" sheetId="{}" r:id="rId{}"/>"#,
                escape(name),
                i + 1,
                i + 1
            ));
        }
        xml.push_str("</sheets></workbook>");
        xml
    }

    fn workbook_rels(&self) -> String {
        let mut xml = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
        );
        for i in 1..=self.sheets.len() {
            xml.push_str(&format!(
                r#"<Relationship Id="rId{i}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet{i}.xml"/>"#
            ));
        }
        xml.push_str("</Relationships>");
        xml
    }
}

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
  <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
  <Default Extension="xml" ContentType="application/xml"/>
  <Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>
</Types>"#;

const PACKAGE_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/>
</Relationships>"#;

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// `0` -> `A`, `27` -> `AB`
fn column_letters(mut index: usize) -> String {
    let mut letters = Vec::new();
    loop {
        letters.push(b'A' + (index % 26) as u8);
        if index < 26 {
            break;
        }
        index = index / 26 - 1;
    }
    letters.reverse();
    String::from_utf8(letters).unwrap()
}

fn worksheet_xml(rows: &[Vec<CellValue>], strings: &mut Vec<String>) -> String {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>"#,
    );

    for (r, row) in rows.iter().enumerate() {
        xml.push_str(&format!(r#"<row r="{}">"#, r + 1));
        for (c, value) in row.iter().enumerate() {
            let reference = format!("{}{}", column_letters(c), r + 1);
            match value {
                CellValue::Empty => {}
                CellValue::Number(n) => {
                    xml.push_str(&format!(r#"<c r="{}"><v>{}</v></c>"#, reference, n));
                }
                CellValue::Text(text) => {
                    let idx = match strings.iter().position(|s| s == text) {
                        Some(idx) => idx,
                        None => {
                            strings.push(text.clone());
                            strings.len() - 1
                        }
                    };
                    xml.push_str(&format!(r#"<c r="{}" t="s"><v>{}</v></c>"#, reference, idx));
                }
            }
        }
        xml.push_str("</row>");
    }

    xml.push_str("</sheetData></worksheet>");
    xml
}

fn shared_strings_xml(strings: &[String]) -> String {
    let mut xml = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<sst xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" count="{0}" uniqueCount="{0}">"#,
        strings.len()
    );
    for s in strings {
        xml.push_str(&format!(r#"<si><t xml:space="preserve">{}</t></si>"#, escape(s)));
    }
    xml.push_str("</sst>");
    xml
}

pub fn text(values: &[&str]) -> Vec<CellValue> {
    values
        .iter()
        .map(|v| {
            if v.is_empty() {
                CellValue::Empty
            } else {
                CellValue::text(*v)
            }
        })
        .collect()
}

/// A Table 1 data row: jurisdiction followed by ten figures.
pub fn jurisdiction_row(name: &str, figures: [f64; 10]) -> Vec<CellValue> {
    let mut row = vec![CellValue::text(name)];
    row.extend(figures.into_iter().map(CellValue::Number));
    row
}

pub fn table1_rows(jurisdictions: &[&str]) -> Vec<Vec<CellValue>> {
    let mut rows = vec![
        text(&["TABLE 1. Overview of allocation of income, taxes and business activities by tax jurisdiction"]),
        text(&["NAME OF THE MNE GROUP:", "Acme Group"]),
        text(&["FISCAL YEAR CONCERNED: 2023"]),
        text(&["CURRENCY USED: USD"]),
        text(&[
            "Tax jurisdiction",
            "Revenues Unrelated party",
            "Revenues Related party",
            "Revenues Total",
            "Profit (Loss) before income tax",
            "Income tax paid (on cash basis)",
            "Income tax accrued - current year",
            "Stated capital",
            "Accumulated earnings",
            "Number of employees",
            "Tangible assets other than cash and cash equivalents",
        ]),
    ];
    for name in jurisdictions {
        rows.push(jurisdiction_row(
            name,
            [100.0, 50.0, 150.0, 30.0, 10.0, 10.0, 500.0, 20.0, 5.0, 1000.0],
        ));
    }
    rows
}

/// Table 2 rows; each entity is `(jurisdiction, name, marked activity columns)`.
pub fn table2_rows(entities: &[(&str, &str, &[usize])]) -> Vec<Vec<CellValue>> {
    let activities = ["Research and Development", "Sales", "Holding shares"];
    let mut label_row = text(&["", "", ""]);
    label_row.extend(activities.iter().map(|a| CellValue::text(*a)));

    let mut rows = vec![
        text(&["Table 2. List of all the Constituent Entities of the MNE group included in each aggregation per tax jurisdiction"]),
        text(&["NAME OF THE MNE GROUP: Acme Group"]),
        text(&["FISCAL YEAR CONCERNED: 2023"]),
        text(&[
            "Tax Jurisdiction",
            "Constituent Entities resident in the tax jurisdiction",
            "Tax jurisdiction of organisation",
            "Main business activity(ies)",
        ]),
        label_row,
    ];

    for (jurisdiction, name, marked) in entities {
        let mut row = text(&[*jurisdiction, *name, ""]);
        for i in 0..activities.len() {
            row.push(if marked.contains(&i) {
                CellValue::text("X")
            } else {
                CellValue::Empty
            });
        }
        rows.push(row);
    }
    rows
}

pub fn table3_rows(items: &[(&str, &str)]) -> Vec<Vec<CellValue>> {
    let mut rows = vec![
        text(&["TABLE 3. Additional Information"]),
        text(&["NAME OF THE MNE GROUP: Acme Group"]),
        text(&["FISCAL YEAR CONCERNED: 2023"]),
        text(&["S/N", "Description"]),
    ];
    for (sn, description) in items {
        rows.push(text(&[*sn, *description]));
    }
    rows
}

//! XLSX workbook reader.

use crate::container::OoxmlContainer;
use crate::detect;
use crate::error::{Error, Result};
use quick_xml::events::{BytesStart, Event};
use std::fs::File;
use std::io::Read;
use std::path::Path;

use super::cell::{column_index, CellValue, MAX_COLUMNS};
use super::shared_strings::SharedStrings;
use super::sheet::Sheet;

const DEFAULT_WORKBOOK_PATH: &str = "xl/workbook.xml";

/// Sheet info from workbook.xml.
#[derive(Debug, Clone)]
struct SheetInfo {
    name: String,
    /// Resolved worksheet part path inside the archive
    part: String,
}

/// Reader for XLSX (Excel) workbooks.
///
/// Opening a reader parses the workbook index and shared strings; individual
/// worksheets are parsed on demand with [`XlsxReader::sheet`].
///
/// # Example
///
/// ```no_run
/// use cbcxml::xlsx::XlsxReader;
///
/// let reader = XlsxReader::open("cbcr.xlsx")?;
/// if let Some(sheet) = reader.sheet("Table 1")? {
///     println!("{} rows", sheet.len());
/// }
/// # Ok::<(), cbcxml::Error>(())
/// ```
pub struct XlsxReader {
    container: OoxmlContainer,
    shared_strings: SharedStrings,
    sheets: Vec<SheetInfo>,
}

impl XlsxReader {
    /// Open an XLSX file for reading.
    ///
    /// The file handle is closed before parsing starts.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let data = {
            let mut file = File::open(path.as_ref())?;
            let mut data = Vec::new();
            file.read_to_end(&mut data)?;
            data
        };
        Self::from_bytes(data)
    }

    /// Create a reader from bytes.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        detect::verify_workbook_bytes(&data)?;
        let container = OoxmlContainer::from_bytes(data)?;
        Self::from_container(container)
    }

    /// Create a reader from a container.
    pub fn from_container(container: OoxmlContainer) -> Result<Self> {
        let workbook_path = Self::workbook_path(&container)?;

        let workbook_xml = container.read_xml(&workbook_path).map_err(|e| {
            Error::UnreadableWorkbook(format!("cannot read {}: {}", workbook_path, e))
        })?;

        let sheets = Self::parse_workbook(&container, &workbook_path, &workbook_xml)
            .map_err(|e| Error::UnreadableWorkbook(format!("{}: {}", workbook_path, e)))?;

        let strings_path = OoxmlContainer::resolve_path(&workbook_path, "sharedStrings.xml");
        let shared_strings = if container.exists(&strings_path) {
            let xml = container.read_xml(&strings_path)?;
            SharedStrings::parse(&xml)
                .map_err(|e| Error::UnreadableWorkbook(format!("{}: {}", strings_path, e)))?
        } else {
            SharedStrings::default()
        };

        tracing::debug!(
            sheets = sheets.len(),
            shared_strings = shared_strings.len(),
            "opened workbook"
        );

        Ok(Self {
            container,
            shared_strings,
            sheets,
        })
    }

    /// Locate the workbook part through the package relationships, falling
    /// back to the conventional location.
    fn workbook_path(container: &OoxmlContainer) -> Result<String> {
        let rels = container.read_relationships("")?;
        let path = rels
            .find_by_type_suffix("/officeDocument")
            .filter(|rel| !rel.external)
            .map(|rel| OoxmlContainer::resolve_path("", &rel.target))
            .unwrap_or_else(|| DEFAULT_WORKBOOK_PATH.to_string());
        Ok(path)
    }

    /// Parse workbook.xml for sheet names and their worksheet parts.
    fn parse_workbook(
        container: &OoxmlContainer,
        workbook_path: &str,
        xml: &str,
    ) -> Result<Vec<SheetInfo>> {
        let rels = container.read_relationships(workbook_path)?;
        let mut sheets = Vec::new();

        let mut reader = quick_xml::Reader::from_str(xml);
        reader.config_mut().trim_text(true);
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Empty(e)) | Ok(Event::Start(e))
                    if e.local_name().as_ref() == b"sheet" =>
                {
                    let mut name = String::new();
                    let mut sheet_id = String::new();
                    let mut rel_id = String::new();

                    for attr in e.attributes().flatten() {
                        let value = attr
                            .unescape_value()
                            .map(|v| v.into_owned())
                            .unwrap_or_else(|_| String::from_utf8_lossy(&attr.value).into_owned());
                        // r:id may carry any prefix bound to the relationships namespace
                        match attr.key.local_name().as_ref() {
                            b"name" => name = value,
                            b"sheetId" => sheet_id = value,
                            b"id" => rel_id = value,
                            _ => {}
                        }
                    }

                    if !name.is_empty() {
                        let part = match rels.get(&rel_id) {
                            Some(rel) => OoxmlContainer::resolve_path(workbook_path, &rel.target),
                            None => OoxmlContainer::resolve_path(
                                workbook_path,
                                &format!("worksheets/sheet{}.xml", sheet_id),
                            ),
                        };

                        sheets.push(SheetInfo { name, part });
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(Error::XmlParse(e.to_string())),
                _ => {}
            }
            buf.clear();
        }

        Ok(sheets)
    }

    /// Get the number of sheets.
    pub fn sheet_count(&self) -> usize {
        self.sheets.len()
    }

    /// Get sheet names in workbook order.
    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|s| s.name.as_str()).collect()
    }

    /// Check whether a sheet with exactly this name exists.
    pub fn has_sheet(&self, name: &str) -> bool {
        self.sheets.iter().any(|s| s.name == name)
    }

    /// Read the sheet with exactly this name.
    ///
    /// Returns `Ok(None)` when the workbook has no such sheet, and an error
    /// when the sheet exists but its part is missing or malformed.
    pub fn sheet(&self, name: &str) -> Result<Option<Sheet>> {
        let Some(info) = self.sheets.iter().find(|s| s.name == name) else {
            return Ok(None);
        };

        let xml = self.container.read_xml(&info.part)?;
        let rows = self.parse_sheet(&xml)?;
        Ok(Some(Sheet::new(info.name.clone(), rows)))
    }

    /// Parse worksheet XML into positional rows of raw values.
    fn parse_sheet(&self, xml: &str) -> Result<Vec<Vec<CellValue>>> {
        let mut rows = Vec::new();
        let mut reader = quick_xml::Reader::from_str(xml);

        let mut buf = Vec::new();
        let mut current_row: Option<Vec<CellValue>> = None;
        let mut cell: Option<PendingCell> = None;
        let mut capture = false;
        let mut phonetic_depth = 0usize;

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(ref e)) => match e.local_name().as_ref() {
                    b"row" => current_row = Some(Vec::new()),
                    b"c" => {
                        if let Some(row) = current_row.as_ref() {
                            cell = Some(PendingCell::from_start(e, row.len())?);
                        }
                    }
                    b"v" if cell.is_some() => capture = true,
                    b"rPh" if cell.is_some() => phonetic_depth += 1,
                    b"t" if cell.is_some() && phonetic_depth == 0 => capture = true,
                    _ => {}
                },
                Ok(Event::Empty(ref e)) => {
                    // Self-closing cells carry only formatting
                    if e.local_name().as_ref() == b"row" {
                        rows.push(Vec::new());
                    }
                }
                Ok(Event::Text(ref e)) if capture => {
                    if let Some(pending) = cell.as_mut() {
                        let text = e
                            .unescape()
                            .map_err(|err| Error::XmlParse(err.to_string()))?;
                        pending.raw.push_str(&text);
                        pending.has_value = true;
                    }
                }
                Ok(Event::End(ref e)) => match e.local_name().as_ref() {
                    b"row" => {
                        if let Some(row) = current_row.take() {
                            rows.push(row);
                        }
                    }
                    b"c" => {
                        if let (Some(pending), Some(row)) = (cell.take(), current_row.as_mut()) {
                            let column = pending.column;
                            let value = self.resolve_cell_value(&pending);
                            if column >= row.len() {
                                row.resize(column + 1, CellValue::Empty);
                            }
                            row[column] = value;
                        }
                        capture = false;
                        phonetic_depth = 0;
                    }
                    b"v" | b"t" => capture = false,
                    b"rPh" => phonetic_depth = phonetic_depth.saturating_sub(1),
                    _ => {}
                },
                Ok(Event::Eof) => break,
                Err(e) => return Err(Error::XmlParse(e.to_string())),
                _ => {}
            }
            buf.clear();
        }

        Ok(rows)
    }

    /// Resolve a cell value based on its type attribute.
    fn resolve_cell_value(&self, cell: &PendingCell) -> CellValue {
        if !cell.has_value {
            return CellValue::Empty;
        }

        let raw = cell.raw.as_str();
        match cell.cell_type.as_deref() {
            Some("s") => match raw.trim().parse::<usize>() {
                Ok(idx) => CellValue::text(self.shared_strings.get(idx).unwrap_or("")),
                Err(_) => CellValue::text(raw),
            },
            Some("b") => CellValue::text(if raw.trim() == "1" { "TRUE" } else { "FALSE" }),
            Some("e") | Some("str") | Some("inlineStr") | Some("d") => CellValue::text(raw),
            _ => match raw.trim().parse::<f64>() {
                Ok(n) => CellValue::Number(n),
                Err(_) => CellValue::text(raw),
            },
        }
    }

}

impl std::fmt::Debug for XlsxReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("XlsxReader")
            .field("sheets", &self.sheet_names())
            .finish()
    }
}

/// A `<c>` element being read.
#[derive(Debug)]
struct PendingCell {
    column: usize,
    cell_type: Option<String>,
    raw: String,
    has_value: bool,
}

impl PendingCell {
    /// `next_column` is used when the cell has no `r` reference.
    ///
    /// A cell past the last worksheet column is an error, so a hostile
    /// reference cannot make the row grow without bound.
    fn from_start(e: &BytesStart<'_>, next_column: usize) -> Result<Self> {
        let mut column = next_column;
        let mut cell_type = None;

        for attr in e.attributes().flatten() {
            match attr.key.as_ref() {
                b"r" => {
                    let reference = String::from_utf8_lossy(&attr.value);
                    match column_index(&reference) {
                        Some(idx) => column = idx,
                        // Letters that overflow the index
                        None if reference.starts_with(|c: char| c.is_ascii_alphabetic()) => {
                            column = usize::MAX;
                        }
                        None => {}
                    }
                    if column >= MAX_COLUMNS {
                        return Err(Error::InvalidData(format!(
                            "cell reference '{}' is past the last column (XFD)",
                            reference
                        )));
                    }
                }
                b"t" => cell_type = Some(String::from_utf8_lossy(&attr.value).into_owned()),
                _ => {}
            }
        }

        if column >= MAX_COLUMNS {
            return Err(Error::InvalidData(format!(
                "row has more than {} cells",
                MAX_COLUMNS
            )));
        }

        Ok(Self {
            column,
            cell_type,
            raw: String::new(),
            has_value: false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
  <Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>
</Types>"#;

    const WORKBOOK: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"
          xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
  <sheets>
    <sheet name="Table 1" sheetId="1" r:id="rId1"/>
    <sheet name="R&amp;D" sheetId="2" r:id="rId2"/>
  </sheets>
</workbook>"#;

    const WORKBOOK_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/>
  <Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="/xl/worksheets/other.xml"/>
</Relationships>"#;

    const SHARED: &str = r#"<sst xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
  <si><t>Tax jurisdiction</t></si>
  <si><t>Country X</t></si>
</sst>"#;

    const SHEET1: &str = r#"<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
  <sheetData>
    <row r="1"><c r="A1" t="s"><v>0</v></c><c r="B1" t="inlineStr"><is><t>Revenues</t></is></c></row>
    <row r="2"><c r="A2" s="3"/></row>
    <row r="3"><c r="A3" t="s"><v>1</v></c><c r="D3"><v>150</v></c><c r="E3"><f>D3*2</f><v>300.5</v></c></row>
    <row r="4"><c r="A4" t="b"><v>1</v></c><c r="B4" t="e"><v>#N/A</v></c><c r="C4" t="str"><v>calc</v></c></row>
  </sheetData>
</worksheet>"#;

    fn workbook_bytes(with_rels: bool) -> Vec<u8> {
        workbook_with_sheet(SHEET1, with_rels)
    }

    fn workbook_with_sheet(sheet1: &str, with_rels: bool) -> Vec<u8> {
        let mut parts = vec![
            ("[Content_Types].xml", CONTENT_TYPES),
            ("xl/workbook.xml", WORKBOOK),
            ("xl/sharedStrings.xml", SHARED),
            ("xl/worksheets/sheet1.xml", sheet1),
            ("xl/worksheets/other.xml", "<worksheet><sheetData/></worksheet>"),
        ];
        if with_rels {
            parts.push(("xl/_rels/workbook.xml.rels", WORKBOOK_RELS));
        }

        let mut buffer = Vec::new();
        {
            let mut zip = ZipWriter::new(Cursor::new(&mut buffer));
            for (name, body) in parts {
                zip.start_file(name, SimpleFileOptions::default()).unwrap();
                zip.write_all(body.as_bytes()).unwrap();
            }
            zip.finish().unwrap();
        }
        buffer
    }

    #[test]
    fn test_sheet_names() {
        let reader = XlsxReader::from_bytes(workbook_bytes(true)).unwrap();
        assert_eq!(reader.sheet_count(), 2);
        assert_eq!(reader.sheet_names(), vec!["Table 1", "R&D"]);
        assert!(reader.has_sheet("Table 1"));
        assert!(!reader.has_sheet("table 1"));
    }

    #[test]
    fn test_parse_sheet_grid() {
        let reader = XlsxReader::from_bytes(workbook_bytes(true)).unwrap();
        let sheet = reader.sheet("Table 1").unwrap().unwrap();

        // The formatting-only row is dropped
        assert_eq!(sheet.len(), 3);
        assert_eq!(sheet.width(), 5);

        let header = sheet.row(0).unwrap();
        assert_eq!(header[0], CellValue::text("Tax jurisdiction"));
        assert_eq!(header[1], CellValue::text("Revenues"));

        let data = sheet.row(1).unwrap();
        assert_eq!(data[0], CellValue::text("Country X"));
        assert_eq!(data[1], CellValue::Empty);
        assert_eq!(data[3], CellValue::Number(150.0));
        assert_eq!(data[4], CellValue::Number(300.5));

        let typed = sheet.row(2).unwrap();
        assert_eq!(typed[0], CellValue::text("TRUE"));
        assert_eq!(typed[1], CellValue::text("#N/A"));
        assert_eq!(typed[2], CellValue::text("calc"));
    }

    #[test]
    fn test_missing_sheet_is_none() {
        let reader = XlsxReader::from_bytes(workbook_bytes(true)).unwrap();
        assert!(reader.sheet("Table 3").unwrap().is_none());

        let other = reader.sheet("R&D").unwrap().unwrap();
        assert!(other.is_empty());
    }

    #[test]
    fn test_sheet_path_fallback_without_rels() {
        let reader = XlsxReader::from_bytes(workbook_bytes(false)).unwrap();
        let sheet = reader.sheet("Table 1").unwrap().unwrap();
        assert_eq!(sheet.len(), 3);

        // sheet2.xml does not exist, so the part cannot be read
        assert!(reader.sheet("R&D").is_err());
    }

    #[test]
    fn test_cell_reference_past_last_column() {
        let sheet = |cells: &str| {
            format!(
                "<worksheet><sheetData><row r=\"1\">{}</row></sheetData></worksheet>",
                cells
            )
        };

        let last = sheet(r#"<c r="XFD1"><v>7</v></c>"#);
        let reader = XlsxReader::from_bytes(workbook_with_sheet(&last, true)).unwrap();
        let grid = reader.sheet("Table 1").unwrap().unwrap();
        assert_eq!(grid.width(), MAX_COLUMNS);
        assert_eq!(grid.row(0).unwrap()[MAX_COLUMNS - 1], CellValue::Number(7.0));

        for reference in ["XFE1", "ZZZZZZZZZZ1", "ZZZZZZZZZZZZZZZZZZZZ1"] {
            let cells = format!(
                r#"<c r="{}" t="inlineStr"><is><t>boom</t></is></c>"#,
                reference
            );
            let reader =
                XlsxReader::from_bytes(workbook_with_sheet(&sheet(&cells), true)).unwrap();
            assert!(
                matches!(reader.sheet("Table 1"), Err(Error::InvalidData(_))),
                "{}",
                reference
            );
        }
    }

    #[test]
    fn test_unreadable_workbook() {
        let result = XlsxReader::from_bytes(b"not a zip".to_vec());
        assert!(matches!(result, Err(Error::UnknownFormat)));
    }
}

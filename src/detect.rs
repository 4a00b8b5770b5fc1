//! Package sniffing: make sure the input is an OOXML spreadsheet before
//! trying to read sheets out of it.

use crate::container::decode_xml_bytes;
use crate::error::{Error, Result};
use std::io::{Cursor, Read, Seek};

/// ZIP file magic bytes: PK\x03\x04
const ZIP_MAGIC: [u8; 4] = [0x50, 0x4B, 0x03, 0x04];

/// OLE2 compound file magic, used by legacy `.xls` workbooks.
const OLE_MAGIC: [u8; 8] = [0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];

const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml";

/// Macro-enabled workbooks share the spreadsheet layout.
const XLSM_CONTENT_TYPE: &str = "application/vnd.ms-excel.sheet.macroEnabled.main+xml";

const DOCX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml";

const PPTX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml";

/// Kind of OOXML package found in a ZIP archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageKind {
    /// Excel workbook (.xlsx / .xlsm)
    Workbook,
    /// Word document (.docx)
    WordDocument,
    /// PowerPoint presentation (.pptx)
    Presentation,
}

impl PackageKind {
    /// Returns a human-readable name for this package kind.
    pub fn name(&self) -> &'static str {
        match self {
            PackageKind::Workbook => "Excel Workbook",
            PackageKind::WordDocument => "Word Document",
            PackageKind::Presentation => "PowerPoint Presentation",
        }
    }
}

impl std::fmt::Display for PackageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Check that `data` is an OOXML spreadsheet.
///
/// Legacy binary `.xls` files and other Office packages are rejected with
/// [`Error::UnsupportedFormat`]; anything else with [`Error::UnknownFormat`].
pub fn verify_workbook_bytes(data: &[u8]) -> Result<()> {
    match detect_package_from_bytes(data)? {
        PackageKind::Workbook => Ok(()),
        other => Err(Error::UnsupportedFormat(other.to_string())),
    }
}

/// Detect the package kind from a byte slice.
pub fn detect_package_from_bytes(data: &[u8]) -> Result<PackageKind> {
    if is_legacy_xls(data) {
        return Err(Error::UnsupportedFormat(
            "legacy binary .xls workbook (save as .xlsx)".to_string(),
        ));
    }

    if !is_zip_file(data) {
        return Err(Error::UnknownFormat);
    }

    detect_package_from_reader(Cursor::new(data))
}

/// Detect the package kind from a reader over a ZIP archive.
pub fn detect_package_from_reader<R: Read + Seek>(reader: R) -> Result<PackageKind> {
    let mut archive = zip::ZipArchive::new(reader)?;

    let content_types = match archive.by_name("[Content_Types].xml") {
        Ok(mut file) => {
            let mut bytes = Vec::new();
            file.read_to_end(&mut bytes)?;
            Some(decode_xml_bytes(&bytes)?)
        }
        Err(_) => None,
    };

    match content_types {
        Some(types) if types.contains(XLSX_CONTENT_TYPE) || types.contains(XLSM_CONTENT_TYPE) => {
            Ok(PackageKind::Workbook)
        }
        Some(types) if types.contains(DOCX_CONTENT_TYPE) => Ok(PackageKind::WordDocument),
        Some(types) if types.contains(PPTX_CONTENT_TYPE) => Ok(PackageKind::Presentation),
        _ => detect_by_folder_structure(&archive),
    }
}

/// Fallback detection by checking folder structure.
fn detect_by_folder_structure<R: Read + Seek>(
    archive: &zip::ZipArchive<R>,
) -> Result<PackageKind> {
    let has = |prefix: &str| archive.file_names().any(|n| n.starts_with(prefix));

    match (has("xl/"), has("word/"), has("ppt/")) {
        (true, false, false) => Ok(PackageKind::Workbook),
        (false, true, false) => Ok(PackageKind::WordDocument),
        (false, false, true) => Ok(PackageKind::Presentation),
        _ => Err(Error::UnknownFormat),
    }
}

/// Check if data starts with ZIP magic bytes.
pub fn is_zip_file(data: &[u8]) -> bool {
    data.len() >= 4 && data[..4] == ZIP_MAGIC
}

/// Check if data looks like a legacy OLE2 `.xls` workbook.
pub fn is_legacy_xls(data: &[u8]) -> bool {
    data.len() >= 8 && data[..8] == OLE_MAGIC
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    fn package(parts: &[(&str, &str)]) -> Vec<u8> {
        let mut buffer = Vec::new();
        {
            let mut zip = ZipWriter::new(Cursor::new(&mut buffer));
            for (name, body) in parts {
                zip.start_file(*name, SimpleFileOptions::default()).unwrap();
                zip.write_all(body.as_bytes()).unwrap();
            }
            zip.finish().unwrap();
        }
        buffer
    }

    fn content_types(main: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
  <Override PartName="/main.xml" ContentType="{}"/>
</Types>"#,
            main
        )
    }

    #[test]
    fn test_is_zip_file() {
        assert!(is_zip_file(&[0x50, 0x4B, 0x03, 0x04, 0x00]));
        assert!(!is_zip_file(&[0x00, 0x00, 0x00, 0x00]));
        assert!(!is_zip_file(&[0x50, 0x4B]));
    }

    #[test]
    fn test_detect_invalid_data() {
        let result = verify_workbook_bytes(&[0x00, 0x00, 0x00, 0x00]);
        assert!(matches!(result, Err(Error::UnknownFormat)));
    }

    #[test]
    fn test_legacy_xls_rejected() {
        let mut data = OLE_MAGIC.to_vec();
        data.extend_from_slice(&[0u8; 32]);

        let result = verify_workbook_bytes(&data);
        assert!(matches!(result, Err(Error::UnsupportedFormat(msg)) if msg.contains(".xls")));
    }

    #[test]
    fn test_workbook_accepted() {
        let data = package(&[("[Content_Types].xml", &content_types(XLSX_CONTENT_TYPE))]);
        assert!(verify_workbook_bytes(&data).is_ok());
        assert_eq!(
            detect_package_from_bytes(&data).unwrap(),
            PackageKind::Workbook
        );
    }

    #[test]
    fn test_word_document_rejected() {
        let data = package(&[("[Content_Types].xml", &content_types(DOCX_CONTENT_TYPE))]);
        let result = verify_workbook_bytes(&data);
        assert!(matches!(result, Err(Error::UnsupportedFormat(msg)) if msg == "Word Document"));
    }

    #[test]
    fn test_folder_fallback() {
        let data = package(&[("xl/workbook.xml", "<workbook/>")]);
        assert_eq!(
            detect_package_from_bytes(&data).unwrap(),
            PackageKind::Workbook
        );

        let data = package(&[("ppt/presentation.xml", "<p/>")]);
        assert_eq!(
            detect_package_from_bytes(&data).unwrap(),
            PackageKind::Presentation
        );
    }
}

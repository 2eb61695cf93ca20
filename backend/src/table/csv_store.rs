//! CSV store with encoding and delimiter auto-detection.
//!
//! Order exports come out of spreadsheet tools in whatever encoding the
//! operator's machine uses (UTF-8 with BOM, windows-1255, ...). Everything is
//! decoded to UTF-8 on load; saves always write UTF-8.

use csv::{ReaderBuilder, WriterBuilder};
use serde_json::Value;
use std::fs;
use std::path::Path;

use super::{cell_text, Dataset, TabularStore};
use crate::error::{TableError, TableResult};

/// Detect the encoding of raw bytes using chardet
pub fn detect_encoding(bytes: &[u8]) -> String {
    let result = chardet::detect(bytes);
    let charset = result.0;

    // Normalize charset names
    match charset.to_lowercase().as_str() {
        "" | "ascii" | "utf-8" | "utf8" | "utf-8-sig" => "utf-8".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "iso-8859-8" | "windows-1255" | "cp1255" => "windows-1255".to_string(),
        _ => charset,
    }
}

/// Decode bytes to a string using the given encoding label.
///
/// Unknown labels and invalid UTF-8 are decoded lossily rather than failing.
pub fn decode_content(bytes: &[u8], encoding: &str) -> String {
    let decoded = match encoding.to_lowercase().as_str() {
        "utf-8" | "utf8" | "ascii" => match std::str::from_utf8(bytes) {
            Ok(s) => s.to_string(),
            Err(_) => String::from_utf8_lossy(bytes).to_string(),
        },
        label => match encoding_rs::Encoding::for_label(label.as_bytes()) {
            Some(enc) => enc.decode(bytes).0.to_string(),
            None => String::from_utf8_lossy(bytes).to_string(),
        },
    };
    decoded.trim_start_matches('\u{feff}').to_string()
}

/// Detect the delimiter by counting occurrences in the first line
pub fn detect_delimiter(content: &str) -> u8 {
    let first_line = content.lines().next().unwrap_or("");

    let separators = [b';', b',', b'\t', b'|'];
    let mut best_sep = b',';
    let mut best_count = 0;

    for &sep in &separators {
        let count = first_line.matches(sep as char).count();
        if count > best_count {
            best_count = count;
            best_sep = sep;
        }
    }

    best_sep
}

/// Reads and writes CSV files.
#[derive(Debug, Clone, Default)]
pub struct CsvStore {
    /// Fixed delimiter; auto-detected on load when `None`
    delimiter: Option<u8>,
}

impl CsvStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = Some(delimiter);
        self
    }

    /// Parse already-decoded CSV text.
    pub fn parse_str(&self, content: &str) -> TableResult<Dataset> {
        let delimiter = self.delimiter.unwrap_or_else(|| detect_delimiter(content));
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .delimiter(delimiter)
            .from_reader(content.as_bytes());

        let mut all = Vec::new();
        for record in reader.records() {
            let record = record?;
            let row: Vec<Value> = record
                .iter()
                .map(|field| {
                    if field.is_empty() {
                        Value::Null
                    } else {
                        Value::String(field.to_string())
                    }
                })
                .collect();
            all.push(row);
        }

        Ok(Dataset::from_rows(all).with_delimiter(delimiter))
    }

    /// Serialize a dataset to CSV text.
    pub fn to_string(&self, dataset: &Dataset) -> TableResult<String> {
        let delimiter = self.delimiter.or(dataset.delimiter()).unwrap_or(b',');
        let mut writer = WriterBuilder::new()
            .flexible(true)
            .delimiter(delimiter)
            .from_writer(Vec::new());

        if !dataset.headers().is_empty() {
            writer.write_record(dataset.headers())?;
        }
        for row in dataset.rows() {
            writer.write_record(row.iter().map(cell_text))?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| TableError::Io(e.into_error()))?;
        Ok(String::from_utf8_lossy(&bytes).to_string())
    }
}

impl TabularStore for CsvStore {
    fn load(&self, path: &Path) -> TableResult<Dataset> {
        if !path.exists() {
            return Err(TableError::FileNotFound(path.to_path_buf()));
        }
        let bytes = fs::read(path)?;

        // Valid UTF-8 is taken as is; detection only runs for legacy encodings.
        let content = match std::str::from_utf8(&bytes) {
            Ok(s) => s.trim_start_matches('\u{feff}').to_string(),
            Err(_) => decode_content(&bytes, &detect_encoding(&bytes)),
        };
        self.parse_str(&content)
    }

    fn save(&self, dataset: &Dataset, path: &Path) -> TableResult<()> {
        let content = self.to_string(dataset)?;

        // Write next to the target, then swap it in whole.
        let mut tmp_name = path.file_name().unwrap_or_default().to_os_string();
        tmp_name.push(".tmp");
        let tmp = path.with_file_name(tmp_name);
        fs::write(&tmp, content)?;
        fs::rename(&tmp, path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    #[test]
    fn test_parse_ragged_rows() {
        let ds = CsvStore::new()
            .parse_str("Item Name,Quantity,Line Comments\nחברים,1\n,2,hello\n")
            .unwrap();
        assert_eq!(ds.headers(), &["Item Name", "Quantity", "Line Comments"]);
        assert_eq!(ds.rows()[0], vec![json!("חברים"), json!("1")]);
        assert_eq!(ds.rows()[1][0], Value::Null);
        assert_eq!(ds.delimiter(), Some(b','));
    }

    #[test]
    fn test_quoted_values_with_newlines() {
        let ds = CsvStore::new()
            .parse_str("a;b\n\"line one\nline two\";x\n")
            .unwrap();
        assert_eq!(ds.cell(0, 0), Some(&json!("line one\nline two")));
        assert_eq!(ds.delimiter(), Some(b';'));
    }

    #[test]
    fn test_detect_delimiter() {
        assert_eq!(detect_delimiter("a;b;c\n1;2;3"), b';');
        assert_eq!(detect_delimiter("a,b,c\n1,2,3"), b',');
        assert_eq!(detect_delimiter("a\tb\tc"), b'\t');
        assert_eq!(detect_delimiter("a|b|c"), b'|');
        assert_eq!(detect_delimiter("single"), b',');
    }

    #[test]
    fn test_bom_is_stripped() {
        let mut bytes = vec![0xEF, 0xBB, 0xBF];
        bytes.extend_from_slice("dbId,status\n1,new\n".as_bytes());
        let content = decode_content(&bytes, "utf-8");
        assert!(content.starts_with("dbId"));
    }

    #[test]
    fn test_windows_1255_decoding() {
        // "שלום" in windows-1255
        let bytes: &[u8] = &[0xF9, 0xEC, 0xE5, 0xED];
        assert_eq!(decode_content(bytes, "windows-1255"), "שלום");
    }

    #[test]
    fn test_save_and_reload_keeps_delimiter() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("orders.csv");
        fs::write(&path, "dbId;graphicStatus\n123;Old\n124\n").unwrap();

        let store = CsvStore::new();
        let ds = store.load(&path).unwrap();
        store.save(&ds, &path).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content, "dbId;graphicStatus\n123;Old\n124\n");
        assert!(!dir.path().join("orders.csv.tmp").exists());
    }

    #[test]
    fn test_missing_file() {
        let err = CsvStore::new().load(Path::new("/nonexistent/orders.csv"));
        assert!(matches!(err, Err(TableError::FileNotFound(_))));
    }
}

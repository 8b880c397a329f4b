use csv::{ReaderBuilder, Trim};
use tracing::{debug, warn};

use crate::error::{ConvertError, Result};
use crate::registry::CsvLayout;

/// A single data row as read from the source file, before validation.
#[derive(Debug, Clone)]
pub struct RawRow {
    /// 1-based line number in the source file.
    pub line: usize,
    /// Column values in header order.
    pub values: Vec<(String, String)>,
    /// Set when the record carried more or fewer fields than the header.
    pub column_count_mismatch: bool,
}

impl RawRow {
    pub fn get(&self, column: &str) -> Option<&str> {
        self.values
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value.as_str())
    }

    /// Returns the value for a column, treating absent and empty the same.
    pub fn field(&self, column: &str) -> &str {
        self.get(column).unwrap_or("")
    }
}

/// Reads CSV bytes into raw rows, honouring the profile's layout.
///
/// Short and long records are flagged on the row rather than aborting;
/// only an undecodable file or a missing header is fatal.
pub struct CsvReader {
    delimiter: Option<u8>,
}

impl Default for CsvReader {
    fn default() -> Self {
        Self { delimiter: None }
    }
}

impl CsvReader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forces a delimiter instead of detecting one from the content.
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = Some(delimiter);
        self
    }

    pub fn parse(&self, bytes: &[u8], layout: &CsvLayout) -> Result<Vec<RawRow>> {
        if bytes.is_empty() {
            return Err(ConvertError::MalformedFile("input file is empty".into()));
        }
        if bytes.contains(&0) {
            return Err(ConvertError::MalformedFile(
                "input does not look like text (NUL bytes present)".into(),
            ));
        }

        let content = String::from_utf8_lossy(bytes);
        let lines: Vec<&str> = content.lines().collect();

        let header = lines.get(layout.header_line).copied().unwrap_or("");
        if header.trim().is_empty() {
            return Err(ConvertError::MalformedFile(format!(
                "no header row found at line {}",
                layout.header_line + 1
            )));
        }

        // Rebuild the chunk the csv reader sees: the header followed by the
        // data lines, with the export preamble and filler lines cut out.
        let data_start = layout.header_line + 1 + layout.skip_after_header;
        let data_lines = if data_start < lines.len() {
            &lines[data_start..]
        } else {
            &[]
        };
        let mut chunk = String::with_capacity(content.len());
        chunk.push_str(header);
        for line in data_lines {
            chunk.push('\n');
            chunk.push_str(line);
        }

        let delimiter = self
            .delimiter
            .unwrap_or_else(|| detect_delimiter(&chunk));
        debug!(
            "CsvReader: header_line={} data_lines={} delimiter={:?}",
            layout.header_line + 1,
            data_lines.len(),
            delimiter as char
        );

        let mut reader = ReaderBuilder::new()
            .delimiter(delimiter)
            .trim(Trim::All)
            .flexible(true)
            .from_reader(chunk.as_bytes());

        let headers = reader.headers()?.clone();
        if headers.iter().all(|h| h.is_empty()) {
            return Err(ConvertError::MalformedFile(
                "header row has no columns".into(),
            ));
        }

        let mut rows = Vec::new();
        for result in reader.records() {
            let record = result?;
            // Chunk line 1 is the header, so chunk line n maps back to
            // source line data_start + n - 1 (both 1-based).
            let chunk_line = record.position().map(|p| p.line() as usize).unwrap_or(0);
            let line = data_start + chunk_line.saturating_sub(1);

            let column_count_mismatch = record.len() != headers.len();
            if column_count_mismatch {
                warn!(
                    "CsvReader: line {} has {} fields, header has {}",
                    line,
                    record.len(),
                    headers.len()
                );
            }

            let values = headers
                .iter()
                .enumerate()
                .map(|(idx, name)| {
                    (
                        name.to_string(),
                        record.get(idx).unwrap_or("").to_string(),
                    )
                })
                .collect();

            rows.push(RawRow {
                line,
                values,
                column_count_mismatch,
            });
        }

        debug!("CsvReader: parsed {} data rows", rows.len());
        Ok(rows)
    }
}

/// Picks the candidate delimiter whose per-line counts are highest and most
/// consistent across a sample of the content.
pub fn detect_delimiter(sample: &str) -> u8 {
    let candidates = [b',', b';', b'\t', b'|'];
    let lines: Vec<&str> = sample.lines().take(10).collect();

    let mut best_delimiter = b',';
    let mut best_score = 0.0f32;

    for &candidate in &candidates {
        let counts: Vec<usize> = lines
            .iter()
            .map(|line| line.bytes().filter(|&b| b == candidate).count())
            .collect();
        if counts.is_empty() {
            continue;
        }

        let avg = counts.iter().sum::<usize>() as f32 / counts.len() as f32;
        let variance = counts
            .iter()
            .map(|&c| (c as f32 - avg).powi(2))
            .sum::<f32>()
            / counts.len() as f32;
        let score = avg / (1.0 + variance.sqrt());

        if score > best_score {
            best_score = score;
            best_delimiter = candidate;
        }
    }

    best_delimiter
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_layout() {
        let content = b"customer_name,email_id\nAcme,info@acme.in\nZenith,sales@zenith.in\n";
        let rows = CsvReader::new().parse(content, &CsvLayout::plain()).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].field("customer_name"), "Acme");
        assert_eq!(rows[0].line, 2);
        assert_eq!(rows[1].field("email_id"), "sales@zenith.in");
        assert_eq!(rows[1].line, 3);
    }

    #[test]
    fn skips_export_preamble_and_filler_lines() {
        let mut content = String::new();
        for i in 0..15 {
            content.push_str(&format!("preamble {}\n", i));
        }
        content.push_str("customer_name,email_id\n");
        for i in 0..4 {
            content.push_str(&format!("filler {}\n", i));
        }
        content.push_str("Acme,info@acme.in\n");

        let rows = CsvReader::new()
            .parse(content.as_bytes(), &CsvLayout::erpnext_report())
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].field("customer_name"), "Acme");
        // Preamble (15) + header (1) + filler (4) put the first data row on line 21.
        assert_eq!(rows[0].line, 21);
    }

    #[test]
    fn short_rows_are_flagged_not_fatal() {
        let content = b"a,b,c\n1,2,3\n4,5\n";
        let rows = CsvReader::new().parse(content, &CsvLayout::plain()).unwrap();

        assert_eq!(rows.len(), 2);
        assert!(!rows[0].column_count_mismatch);
        assert!(rows[1].column_count_mismatch);
        assert_eq!(rows[1].field("c"), "");
    }

    #[test]
    fn header_only_file_yields_no_rows() {
        let content = b"customer_name,email_id\n";
        let rows = CsvReader::new().parse(content, &CsvLayout::plain()).unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn empty_file_is_malformed() {
        let err = CsvReader::new().parse(b"", &CsvLayout::plain()).unwrap_err();
        assert!(matches!(err, ConvertError::MalformedFile(_)));
    }

    #[test]
    fn missing_header_line_is_malformed() {
        let err = CsvReader::new()
            .parse(b"only one line\n", &CsvLayout::erpnext_report())
            .unwrap_err();
        assert!(matches!(err, ConvertError::MalformedFile(_)));
    }

    #[test]
    fn semicolon_delimiter_is_detected() {
        let content = b"customer_name;email_id\nAcme;info@acme.in\n";
        let rows = CsvReader::new().parse(content, &CsvLayout::plain()).unwrap();
        assert_eq!(rows[0].field("customer_name"), "Acme");
    }

    #[test]
    fn values_and_headers_are_trimmed() {
        let content = b"customer_name , email_id\n Acme , info@acme.in \n";
        let rows = CsvReader::new().parse(content, &CsvLayout::plain()).unwrap();
        assert_eq!(rows[0].field("customer_name"), "Acme");
        assert_eq!(rows[0].field("email_id"), "info@acme.in");
    }
}

use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use crate::error::Result;
use crate::pipeline::builder::XmlBuilder;
use crate::pipeline::reader::CsvReader;
use crate::pipeline::validator::{IssueKind, IssueSeverity, RowValidator, ValidatedRow};
use crate::registry::ProfileRegistry;

/// One reported row problem, locatable by line and column.
#[derive(Debug, Clone, Serialize)]
pub struct RowDiagnostic {
    pub line: usize,
    pub column: Option<String>,
    pub kind: IssueKind,
    pub severity: IssueSeverity,
    pub message: String,
}

/// Outcome of a whole conversion. Row-level problems surface here as
/// diagnostics; they never fail the conversion itself.
#[derive(Debug, Clone, Serialize)]
pub struct ConversionResult {
    pub type_name: String,
    #[serde(skip_serializing)]
    pub xml: String,
    pub rows_total: usize,
    pub rows_valid: usize,
    pub rows_skipped: usize,
    pub diagnostics: Vec<RowDiagnostic>,
    /// Download filename suggested by the registry's filename table.
    pub suggested_filename: String,
}

/// Runs the conversion pipeline end to end: resolve profile, read rows,
/// validate, build the document.
///
/// Holds no per-conversion state, so one converter can serve concurrent
/// conversions over the shared read-only registry.
pub struct Converter {
    registry: Arc<ProfileRegistry>,
    company: String,
}

impl Converter {
    pub fn new(registry: Arc<ProfileRegistry>, company: impl Into<String>) -> Self {
        Self {
            registry,
            company: company.into(),
        }
    }

    /// Converts one CSV payload. Fails fast only for whole-file problems:
    /// an unsupported type or an unreadable file.
    pub fn convert(&self, type_name: &str, bytes: &[u8]) -> Result<ConversionResult> {
        let profile = self.registry.resolve(type_name)?;
        info!(
            "Converter: starting type={} bytes={}",
            type_name,
            bytes.len()
        );

        let raw_rows = CsvReader::new().parse(bytes, &profile.layout)?;

        let mut validator = RowValidator::new(profile);
        let rows: Vec<ValidatedRow> = raw_rows
            .into_iter()
            .map(|raw| validator.validate(raw))
            .collect();

        let rows_total = rows.len();
        let rows_valid = rows.iter().filter(|row| row.valid).count();
        let rows_skipped = rows_total - rows_valid;

        let diagnostics: Vec<RowDiagnostic> = rows
            .iter()
            .flat_map(|row| {
                row.issues.iter().map(|issue| RowDiagnostic {
                    line: row.line(),
                    column: issue.column.clone(),
                    kind: issue.kind,
                    severity: issue.severity,
                    message: issue.message.clone(),
                })
            })
            .collect();

        let xml = XmlBuilder::new(profile, &self.company).build(&rows)?;

        info!(
            "Converter: finished type={} total={} valid={} skipped={}",
            type_name, rows_total, rows_valid, rows_skipped
        );

        Ok(ConversionResult {
            type_name: type_name.to_string(),
            xml,
            rows_total,
            rows_valid,
            rows_skipped,
            diagnostics,
            suggested_filename: self.registry.filename_for(type_name),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConvertError;

    fn converter() -> Converter {
        Converter::new(Arc::new(ProfileRegistry::with_builtins()), "Techsolvo")
    }

    #[test]
    fn unsupported_type_fails_before_reading_the_file() {
        let err = converter().convert("Unknown", b"a,b\n1,2\n").unwrap_err();
        assert!(matches!(err, ConvertError::UnsupportedType(_)));
    }

    #[test]
    fn counts_always_sum_to_the_total() {
        let csv = b"Account Name,Parent Account,Is Group\n\
            Assets,,1\n\
            ,Assets,0\n\
            Liabilities,,1\n";
        let result = converter().convert("Chart of Accounts", csv).unwrap();

        assert_eq!(result.rows_total, 3);
        assert_eq!(result.rows_valid, 2);
        assert_eq!(result.rows_skipped, 1);
        assert_eq!(result.rows_valid + result.rows_skipped, result.rows_total);
    }

    #[test]
    fn diagnostics_locate_the_offending_row_and_column() {
        let csv = b"Account Name,Parent Account,Is Group\nAssets,,1\n,Assets,0\n";
        let result = converter().convert("Chart of Accounts", csv).unwrap();

        assert_eq!(result.diagnostics.len(), 1);
        let diagnostic = &result.diagnostics[0];
        assert_eq!(diagnostic.line, 3);
        assert_eq!(diagnostic.column.as_deref(), Some("Account Name"));
        assert_eq!(diagnostic.kind, IssueKind::MissingField);
    }

    #[test]
    fn suggested_filename_follows_the_registry_table() {
        let csv = b"Account Name,Parent Account,Is Group\nAssets,,1\n";
        let result = converter().convert("Chart of Accounts", csv).unwrap();
        // "Chart of Accounts" has no filename entry and falls back.
        assert_eq!(result.suggested_filename, "Output.xml");
    }
}

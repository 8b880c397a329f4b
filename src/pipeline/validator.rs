use std::collections::HashSet;

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use tracing::debug;

use crate::pipeline::reader::RawRow;
use crate::registry::{ConversionProfile, ValueKind};

/// Date layout ERPNext report exports use for voucher dates.
pub const EXPORT_DATE_FORMAT: &str = "%d-%m-%Y";

/// Kinds of problems a single row can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum IssueKind {
    /// A required column is absent or empty.
    MissingField,
    /// A value could not be coerced to the column's kind.
    TypeMismatch,
    /// The row repeats an earlier row's dedup key.
    DuplicateRow,
    /// The record had a different field count than the header.
    ColumnCountMismatch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Serialize)]
pub enum IssueSeverity {
    /// Worth flagging, the row still converts.
    Warning,
    /// The row is skipped.
    Error,
}

#[derive(Debug, Clone, Serialize)]
pub struct RowIssue {
    pub kind: IssueKind,
    pub severity: IssueSeverity,
    /// Column that triggered the issue, when one is identifiable.
    pub column: Option<String>,
    pub message: String,
}

/// A row after validation. Always produced, valid or not.
#[derive(Debug, Clone)]
pub struct ValidatedRow {
    pub raw: RawRow,
    pub issues: Vec<RowIssue>,
    pub valid: bool,
}

impl ValidatedRow {
    pub fn line(&self) -> usize {
        self.raw.line
    }

    pub fn field(&self, column: &str) -> &str {
        self.raw.field(column)
    }

    /// Parses a decimal column, falling back to zero for blank or
    /// unparseable values (invalid typed values never reach the builder).
    pub fn decimal(&self, column: &str) -> f64 {
        self.raw.field(column).parse::<f64>().unwrap_or(0.0)
    }

    pub fn date(&self, column: &str) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(self.raw.field(column), EXPORT_DATE_FORMAT).ok()
    }
}

static KEY_WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Collapses whitespace and case so "Order 001" and "order001" share a key.
pub fn normalize_key(name: &str) -> String {
    KEY_WHITESPACE.replace_all(name, "").to_lowercase()
}

/// Applies a profile's column rules row by row, remembering dedup keys
/// across the batch. Never fails past row scope.
pub struct RowValidator<'a> {
    profile: &'a ConversionProfile,
    seen_keys: HashSet<String>,
}

impl<'a> RowValidator<'a> {
    pub fn new(profile: &'a ConversionProfile) -> Self {
        Self {
            profile,
            seen_keys: HashSet::new(),
        }
    }

    pub fn validate(&mut self, raw: RawRow) -> ValidatedRow {
        let mut issues = Vec::new();

        if raw.column_count_mismatch {
            issues.push(RowIssue {
                kind: IssueKind::ColumnCountMismatch,
                severity: IssueSeverity::Warning,
                column: None,
                message: format!(
                    "line {} has a different number of fields than the header",
                    raw.line
                ),
            });
        }

        for spec in &self.profile.columns {
            let value = raw.field(spec.name);
            if value.is_empty() {
                if spec.required {
                    issues.push(RowIssue {
                        kind: IssueKind::MissingField,
                        severity: IssueSeverity::Error,
                        column: Some(spec.name.to_string()),
                        message: format!(
                            "required column '{}' is missing or empty on line {}",
                            spec.name, raw.line
                        ),
                    });
                }
                continue;
            }

            match spec.kind {
                ValueKind::Text => {}
                ValueKind::Decimal => {
                    if value.parse::<f64>().is_err() {
                        issues.push(RowIssue {
                            kind: IssueKind::TypeMismatch,
                            severity: IssueSeverity::Error,
                            column: Some(spec.name.to_string()),
                            message: format!(
                                "value '{}' in column '{}' on line {} is not numeric",
                                value, spec.name, raw.line
                            ),
                        });
                    }
                }
                ValueKind::Date => {
                    if NaiveDate::parse_from_str(value, EXPORT_DATE_FORMAT).is_err() {
                        issues.push(RowIssue {
                            kind: IssueKind::TypeMismatch,
                            severity: IssueSeverity::Error,
                            column: Some(spec.name.to_string()),
                            message: format!(
                                "value '{}' in column '{}' on line {} is not a dd-mm-yyyy date",
                                value, spec.name, raw.line
                            ),
                        });
                    }
                }
            }
        }

        if let Some(dedup_column) = self.profile.dedup_column {
            let key = raw.field(dedup_column);
            if !key.is_empty() && !self.seen_keys.insert(normalize_key(key)) {
                issues.push(RowIssue {
                    kind: IssueKind::DuplicateRow,
                    severity: IssueSeverity::Error,
                    column: Some(dedup_column.to_string()),
                    message: format!(
                        "line {} repeats '{}' already seen in column '{}'",
                        raw.line, key, dedup_column
                    ),
                });
            }
        }

        let valid = !issues
            .iter()
            .any(|issue| issue.severity == IssueSeverity::Error);
        if !valid {
            debug!(
                "RowValidator: line {} skipped with {} issue(s)",
                raw.line,
                issues.len()
            );
        }

        ValidatedRow { raw, issues, valid }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::profiles;

    fn raw_row(line: usize, values: &[(&str, &str)]) -> RawRow {
        RawRow {
            line,
            values: values
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            column_count_mismatch: false,
        }
    }

    #[test]
    fn missing_required_field_fails_the_row_only() {
        let profile = profiles::customer::profile();
        let mut validator = RowValidator::new(&profile);

        let row = validator.validate(raw_row(21, &[("customer_name", ""), ("email_id", "a@b.c")]));
        assert!(!row.valid);
        assert_eq!(row.issues.len(), 1);
        assert_eq!(row.issues[0].kind, IssueKind::MissingField);
        assert_eq!(row.issues[0].column.as_deref(), Some("customer_name"));
    }

    #[test]
    fn non_numeric_amount_is_a_type_mismatch() {
        let profile = profiles::payment_entry::profile();
        let mut validator = RowValidator::new(&profile);

        let row = validator.validate(raw_row(
            21,
            &[
                ("party_name", "Acme"),
                ("posting_date", "01-04-2025"),
                ("received_amount", "twelve"),
            ],
        ));
        assert!(!row.valid);
        assert!(row
            .issues
            .iter()
            .any(|i| i.kind == IssueKind::TypeMismatch
                && i.column.as_deref() == Some("received_amount")));
    }

    #[test]
    fn bad_date_is_a_type_mismatch() {
        let profile = profiles::payment_entry::profile();
        let mut validator = RowValidator::new(&profile);

        let row = validator.validate(raw_row(
            22,
            &[
                ("party_name", "Acme"),
                ("posting_date", "2025/04/01"),
                ("received_amount", "10"),
            ],
        ));
        assert!(!row.valid);
        assert!(row
            .issues
            .iter()
            .any(|i| i.column.as_deref() == Some("posting_date")));
    }

    #[test]
    fn duplicate_order_names_are_skipped() {
        let profile = profiles::sales_order::profile();
        let mut validator = RowValidator::new(&profile);

        let base = &[
            ("name", "SAL-ORD-001"),
            ("customer_name", "Acme"),
            ("transaction_date", "01-04-2025"),
        ];
        let first = validator.validate(raw_row(21, base));
        assert!(first.valid);

        // Same key with different spacing and case still collides.
        let second = validator.validate(raw_row(
            22,
            &[
                ("name", "sal-ord- 001"),
                ("customer_name", "Acme"),
                ("transaction_date", "01-04-2025"),
            ],
        ));
        assert!(!second.valid);
        assert!(second
            .issues
            .iter()
            .any(|i| i.kind == IssueKind::DuplicateRow));
    }

    #[test]
    fn column_count_mismatch_is_a_warning_only() {
        let profile = profiles::customer::profile();
        let mut validator = RowValidator::new(&profile);

        let mut raw = raw_row(21, &[("customer_name", "Acme")]);
        raw.column_count_mismatch = true;
        let row = validator.validate(raw);
        assert!(row.valid);
        assert_eq!(row.issues.len(), 1);
        assert_eq!(row.issues[0].severity, IssueSeverity::Warning);
    }

    #[test]
    fn normalize_key_collapses_whitespace_and_case() {
        assert_eq!(normalize_key("Sal Ord 001"), "salord001");
        assert_eq!(normalize_key("SALORD001"), "salord001");
    }
}

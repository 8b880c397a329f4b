use std::sync::Arc;

use tracing::{info, warn};

use crate::error::{ConvertError, Result};
use crate::pipeline::validator::ValidatedRow;
use crate::pipeline::xml::XmlWriter;

pub mod profiles;

/// Where the header and data rows sit inside the source file.
///
/// ERPNext report exports carry a 15-line preamble before the header and
/// four filler lines between the header and the first data row.
#[derive(Debug, Clone, Copy)]
pub struct CsvLayout {
    /// 0-based index of the header line.
    pub header_line: usize,
    /// Lines skipped immediately after the header.
    pub skip_after_header: usize,
}

impl CsvLayout {
    pub const fn plain() -> Self {
        Self {
            header_line: 0,
            skip_after_header: 0,
        }
    }

    pub const fn erpnext_report() -> Self {
        Self {
            header_line: 15,
            skip_after_header: 4,
        }
    }
}

/// How a column's values are checked before conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Text,
    Decimal,
    Date,
}

#[derive(Debug, Clone, Copy)]
pub struct ColumnSpec {
    pub name: &'static str,
    pub required: bool,
    pub kind: ValueKind,
}

impl ColumnSpec {
    pub const fn text(name: &'static str, required: bool) -> Self {
        Self {
            name,
            required,
            kind: ValueKind::Text,
        }
    }

    pub const fn decimal(name: &'static str, required: bool) -> Self {
        Self {
            name,
            required,
            kind: ValueKind::Decimal,
        }
    }

    pub const fn date(name: &'static str, required: bool) -> Self {
        Self {
            name,
            required,
            kind: ValueKind::Date,
        }
    }
}

/// Per-conversion inputs templates may need beyond the rows themselves.
pub struct RenderContext<'a> {
    /// Company stamped into SVCURRENTCOMPANY and buyer-side defaults.
    pub company: &'a str,
}

/// Trait that defines how each record type renders its rows into the
/// document. Templates own the transformation from validated rows to the
/// TALLYMESSAGE elements under REQUESTDATA.
pub trait FragmentTemplate: Send + Sync {
    /// Writes every TALLYMESSAGE for the given valid rows.
    fn write_request_data(
        &self,
        w: &mut XmlWriter,
        rows: &[&ValidatedRow],
        ctx: &RenderContext,
    ) -> Result<()>;
}

/// Everything the pipeline needs to know about one record type.
pub struct ConversionProfile {
    pub type_name: &'static str,
    /// REPORTNAME the Tally importer expects ("All Masters" or "Vouchers").
    pub report_name: &'static str,
    pub layout: CsvLayout,
    pub columns: Vec<ColumnSpec>,
    /// Column whose normalized value dedupes rows across the batch.
    pub dedup_column: Option<&'static str>,
    pub template: Arc<dyn FragmentTemplate>,
}

impl std::fmt::Debug for ConversionProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConversionProfile")
            .field("type_name", &self.type_name)
            .field("report_name", &self.report_name)
            .field("layout", &self.layout)
            .field("columns", &self.columns)
            .field("dedup_column", &self.dedup_column)
            .field("template", &"<dyn FragmentTemplate>")
            .finish()
    }
}

/// Download filename used when a type has no entry of its own.
pub const FALLBACK_FILENAME: &str = "Output.xml";

/// Registry that holds the conversion profiles and the download-filename
/// table. Built once at startup and shared read-only afterwards.
pub struct ProfileRegistry {
    profiles: Vec<ConversionProfile>,
    filenames: Vec<(&'static str, &'static str)>,
}

impl ProfileRegistry {
    pub fn new() -> Self {
        Self {
            profiles: Vec::new(),
            filenames: Vec::new(),
        }
    }

    /// Registry with every built-in record type registered.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        for profile in profiles::built_ins() {
            registry.register(profile);
        }
        registry.filenames = profiles::filename_table();
        registry
    }

    pub fn register(&mut self, profile: ConversionProfile) {
        info!(
            "Registering conversion profile for type: {}",
            profile.type_name
        );
        self.profiles.push(profile);
    }

    pub fn resolve(&self, type_name: &str) -> Result<&ConversionProfile> {
        self.profiles
            .iter()
            .find(|profile| profile.type_name == type_name)
            .ok_or_else(|| ConvertError::UnsupportedType(type_name.to_string()))
    }

    pub fn type_names(&self) -> Vec<&'static str> {
        self.profiles.iter().map(|p| p.type_name).collect()
    }

    /// Default download filename for a type, falling back to
    /// [`FALLBACK_FILENAME`] when the table has no entry.
    pub fn filename_for(&self, type_name: &str) -> String {
        self.filenames
            .iter()
            .find(|(key, _)| *key == type_name)
            .map(|(_, filename)| filename.to_string())
            .unwrap_or_else(|| FALLBACK_FILENAME.to_string())
    }

    /// Startup sanity check: reports every registered type that has no
    /// filename entry. The shipped table is keyed "Item" while the
    /// conversion type is "Item Master", so that type (and "Chart of
    /// Accounts") fall back; the mismatch is reported, not repaired.
    pub fn validate(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        for profile in &self.profiles {
            if !self
                .filenames
                .iter()
                .any(|(key, _)| *key == profile.type_name)
            {
                warn!(
                    "Conversion type '{}' has no filename entry; downloads fall back to {}",
                    profile.type_name, FALLBACK_FILENAME
                );
                missing.push(profile.type_name);
            }
        }
        missing
    }
}

impl Default for ProfileRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

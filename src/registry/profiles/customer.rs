use std::sync::Arc;

use crate::error::Result;
use crate::pipeline::validator::ValidatedRow;
use crate::pipeline::xml::XmlWriter;
use crate::registry::{ColumnSpec, ConversionProfile, CsvLayout, FragmentTemplate, RenderContext};

use super::ledger::{write_party_ledger, LedgerColumns};

/// Customers import as party ledgers under the "Sundry Debtors" group.
pub struct CustomerTemplate;

const COLUMNS: LedgerColumns = LedgerColumns {
    name: "customer_name",
    address: "customer_primary_address",
    state: "state",
    pincode: "pincode",
    website: "website",
    pan: "pan",
    country: "country",
    mobile: "mobile_no",
    email: "email_id",
};

impl FragmentTemplate for CustomerTemplate {
    fn write_request_data(
        &self,
        w: &mut XmlWriter,
        rows: &[&ValidatedRow],
        _ctx: &RenderContext,
    ) -> Result<()> {
        for (seq, row) in rows.iter().enumerate() {
            write_party_ledger(w, row, "Customer", "Sundry Debtors", &COLUMNS, seq)?;
        }
        Ok(())
    }
}

pub fn profile() -> ConversionProfile {
    ConversionProfile {
        type_name: "Customer",
        report_name: "All Masters",
        layout: CsvLayout::erpnext_report(),
        columns: vec![
            ColumnSpec::text("customer_name", true),
            ColumnSpec::text("email_id", false),
            ColumnSpec::text("customer_primary_address", false),
            ColumnSpec::text("state", false),
            ColumnSpec::text("pincode", false),
            ColumnSpec::text("website", false),
            ColumnSpec::text("pan", false),
            ColumnSpec::text("country", false),
            ColumnSpec::text("mobile_no", false),
        ],
        dedup_column: None,
        template: Arc::new(CustomerTemplate),
    }
}

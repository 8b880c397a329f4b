use std::sync::Arc;

use crate::error::Result;
use crate::pipeline::validator::ValidatedRow;
use crate::pipeline::xml::XmlWriter;
use crate::registry::{ColumnSpec, ConversionProfile, CsvLayout, FragmentTemplate, RenderContext};

use super::ledger::{write_party_ledger, LedgerColumns};

/// Suppliers mirror the customer ledger shape under "Sundry Creditors".
pub struct SupplierTemplate;

const COLUMNS: LedgerColumns = LedgerColumns {
    name: "supplier_name",
    address: "supplier_primary_address",
    state: "state",
    pincode: "pincode",
    website: "website",
    pan: "pan",
    country: "country",
    mobile: "mobile_no",
    email: "email_id",
};

impl FragmentTemplate for SupplierTemplate {
    fn write_request_data(
        &self,
        w: &mut XmlWriter,
        rows: &[&ValidatedRow],
        _ctx: &RenderContext,
    ) -> Result<()> {
        for (seq, row) in rows.iter().enumerate() {
            write_party_ledger(w, row, "Supplier", "Sundry Creditors", &COLUMNS, seq)?;
        }
        Ok(())
    }
}

pub fn profile() -> ConversionProfile {
    ConversionProfile {
        type_name: "Supplier",
        report_name: "All Masters",
        layout: CsvLayout::erpnext_report(),
        columns: vec![
            ColumnSpec::text("supplier_name", true),
            ColumnSpec::text("email_id", false),
            ColumnSpec::text("supplier_primary_address", false),
            ColumnSpec::text("state", false),
            ColumnSpec::text("pincode", false),
            ColumnSpec::text("website", false),
            ColumnSpec::text("pan", false),
            ColumnSpec::text("country", false),
            ColumnSpec::text("mobile_no", false),
        ],
        dedup_column: None,
        template: Arc::new(SupplierTemplate),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::reader::RawRow;

    #[test]
    fn suppliers_land_under_sundry_creditors() {
        let row = ValidatedRow {
            raw: RawRow {
                line: 21,
                values: vec![("supplier_name".to_string(), "Zenith Metals".to_string())],
                column_count_mismatch: false,
            },
            issues: Vec::new(),
            valid: true,
        };
        let mut w = XmlWriter::new().unwrap();
        SupplierTemplate
            .write_request_data(
                &mut w,
                &[&row],
                &RenderContext {
                    company: "Techsolvo",
                },
            )
            .unwrap();
        let doc = w.into_string();

        assert!(doc.contains("<LEDGER NAME=\"Zenith Metals\" RESERVEDNAME=\"\">"));
        assert!(doc.contains("<PARENT>Sundry Creditors</PARENT>"));
    }
}

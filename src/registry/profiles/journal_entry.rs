use std::sync::Arc;

use crate::error::Result;
use crate::pipeline::validator::ValidatedRow;
use crate::pipeline::xml::{format_amount, XmlWriter};
use crate::registry::{ColumnSpec, ConversionProfile, CsvLayout, FragmentTemplate, RenderContext};

use super::{record_guid, tally_date, write_old_audit_entry_ids};

/// Journal exports are line-oriented: a row with a non-empty `name` opens a
/// voucher, and rows with a blank `name` are continuation lines that fold
/// into the voucher before them. Each row contributes exactly one
/// ALLLEDGERENTRIES.LIST fragment.
pub struct JournalEntryTemplate;

impl JournalEntryTemplate {
    fn write_ledger_entry(&self, w: &mut XmlWriter, row: &ValidatedRow) -> Result<()> {
        // Customer-side lines are deemed positive and post the debit as a
        // negative amount; everything else posts the credit.
        let deemed_positive = row.field("party_type") == "Customer";
        let amount = if deemed_positive {
            -row.decimal("debit_in_account_currency").abs()
        } else {
            row.decimal("credit_in_account_currency").abs()
        };

        w.start_element("ALLLEDGERENTRIES.LIST")?;
        w.text_element("LEDGERNAME", row.field("party"))?;
        w.text_element(
            "ISDEEMEDPOSITIVE",
            if deemed_positive { "Yes" } else { "No" },
        )?;
        w.text_element("AMOUNT", &format_amount(amount))?;
        w.end_element("ALLLEDGERENTRIES.LIST")?;
        Ok(())
    }
}

impl FragmentTemplate for JournalEntryTemplate {
    fn write_request_data(
        &self,
        w: &mut XmlWriter,
        rows: &[&ValidatedRow],
        _ctx: &RenderContext,
    ) -> Result<()> {
        if rows.is_empty() {
            return Ok(());
        }

        w.start_element_with_attrs("TALLYMESSAGE", &[("xmlns:UDF", "TallyUDF")])?;

        let mut voucher_open = false;
        for row in rows {
            let name = row.field("name");
            if !name.is_empty() {
                if voucher_open {
                    w.end_element("VOUCHER")?;
                }

                let guid = record_guid("Journal Entry", row.line(), name);
                let remote_id = format!("{}-00000001", guid);
                let vch_key = format!("{}-0000b146:00000008", guid);
                w.start_element_with_attrs(
                    "VOUCHER",
                    &[
                        ("REMOTEID", remote_id.as_str()),
                        ("VCHKEY", vch_key.as_str()),
                        ("VCHTYPE", "Journal"),
                        ("ACTION", "Create"),
                        ("OBJVIEW", "Accounting Voucher View"),
                    ],
                )?;
                write_old_audit_entry_ids(w)?;
                w.text_element("DATE", &tally_date(row.field("posting_date")))?;
                w.text_element("GUID", &remote_id)?;
                w.text_element("PARTYLEDGERNAME", row.field("party"))?;
                w.text_element("VOUCHERTYPENAME", "Journal")?;
                voucher_open = true;
            }

            // Continuation lines before any voucher have nothing to fold
            // into; their ledger entry would be orphaned, so drop it.
            if voucher_open {
                self.write_ledger_entry(w, row)?;
            }
        }
        if voucher_open {
            w.end_element("VOUCHER")?;
        }

        w.end_element("TALLYMESSAGE")?;
        Ok(())
    }
}

pub fn profile() -> ConversionProfile {
    ConversionProfile {
        type_name: "Journal Entry",
        report_name: "All Masters",
        layout: CsvLayout::erpnext_report(),
        columns: vec![
            ColumnSpec::text("name", false),
            ColumnSpec::text("party", true),
            ColumnSpec::text("party_type", true),
            ColumnSpec::date("posting_date", false),
            ColumnSpec::decimal("debit_in_account_currency", false),
            ColumnSpec::decimal("credit_in_account_currency", false),
        ],
        dedup_column: None,
        template: Arc::new(JournalEntryTemplate),
    }
}

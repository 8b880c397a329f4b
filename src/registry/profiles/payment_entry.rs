use std::sync::Arc;

use crate::error::Result;
use crate::pipeline::validator::ValidatedRow;
use crate::pipeline::xml::{format_amount, XmlWriter};
use crate::registry::{ColumnSpec, ConversionProfile, CsvLayout, FragmentTemplate, RenderContext};

use super::{record_guid, tally_date, write_old_audit_entry_ids};

/// Payment entries import as "Payment" vouchers with a paired debit entry
/// for the party and a credit entry for the receiving bank ledger. The
/// voucher amount is the received amount plus taxes and charges.
pub struct PaymentEntryTemplate;

impl PaymentEntryTemplate {
    fn write_voucher(&self, w: &mut XmlWriter, row: &ValidatedRow) -> Result<()> {
        let party = row.field("party_name");
        let amount =
            row.decimal("received_amount") + row.decimal("total_taxes_and_charges");
        let amount = format_amount(amount);
        let guid = record_guid("Payment Entry", row.line(), row.field("payment_order"));
        let remote_id = format!("{}-00000029", guid);
        let vch_key = format!("{}-0000b147:00000020", guid);

        w.start_element_with_attrs("TALLYMESSAGE", &[("xmlns:UDF", "TallyUDF")])?;
        w.start_element_with_attrs(
            "VOUCHER",
            &[
                ("REMOTEID", remote_id.as_str()),
                ("VCHKEY", vch_key.as_str()),
                ("VCHTYPE", "Payment"),
                ("ACTION", "Create"),
                ("OBJVIEW", "Accounting Voucher View"),
            ],
        )?;

        write_old_audit_entry_ids(w)?;
        w.text_element("DATE", &tally_date(row.field("posting_date")))?;
        w.text_element("GUID", &guid)?;
        w.text_element("PARTYLEDGERNAME", party)?;
        w.text_element("VOUCHERTYPENAME", "Payment")?;
        w.text_element("VOUCHERNUMBER", row.field("payment_order"))?;
        w.text_element("FBTPAYMENTTYPE", "Default")?;
        w.text_element("PERSISTEDVIEW", "Accounting Voucher View")?;
        w.text_element("AMOUNT", &amount)?;
        w.text_element("LEDGERNAME", party)?;

        w.start_element("ALLLEDGERENTRIES.LIST")?;

        // Debit the party.
        w.start_element("ALLLEDGERENTRIES.LIST")?;
        w.text_element("LEDGERNAME", party)?;
        w.text_element("ISDEEMEDPOSITIVE", "Yes")?;
        w.text_element("AMOUNT", &format!("-{}", amount))?;
        w.end_element("ALLLEDGERENTRIES.LIST")?;

        // Credit the receiving bank or cash ledger.
        w.start_element("ALLLEDGERENTRIES.LIST")?;
        w.text_element("LEDGERNAME", row.field("paid_to"))?;
        w.text_element("ISDEEMEDPOSITIVE", "No")?;
        w.text_element("AMOUNT", &amount)?;
        w.end_element("ALLLEDGERENTRIES.LIST")?;

        w.end_element("ALLLEDGERENTRIES.LIST")?;

        w.end_element("VOUCHER")?;
        w.end_element("TALLYMESSAGE")?;
        Ok(())
    }
}

impl FragmentTemplate for PaymentEntryTemplate {
    fn write_request_data(
        &self,
        w: &mut XmlWriter,
        rows: &[&ValidatedRow],
        _ctx: &RenderContext,
    ) -> Result<()> {
        for row in rows {
            self.write_voucher(w, row)?;
        }
        Ok(())
    }
}

pub fn profile() -> ConversionProfile {
    ConversionProfile {
        type_name: "Payment Entry",
        report_name: "Vouchers",
        layout: CsvLayout::erpnext_report(),
        columns: vec![
            ColumnSpec::text("party_name", true),
            ColumnSpec::date("posting_date", true),
            ColumnSpec::text("payment_order", false),
            ColumnSpec::text("paid_to", false),
            ColumnSpec::decimal("received_amount", true),
            ColumnSpec::decimal("total_taxes_and_charges", false),
        ],
        dedup_column: None,
        template: Arc::new(PaymentEntryTemplate),
    }
}

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use uuid::Uuid;

use crate::error::Result;
use crate::pipeline::validator::EXPORT_DATE_FORMAT;
use crate::pipeline::xml::XmlWriter;

use super::ConversionProfile;

pub mod chart_of_accounts;
pub mod customer;
pub mod item_master;
pub mod journal_entry;
mod ledger;
pub mod payment_entry;
pub mod purchase_order;
pub mod sales_order;
pub mod supplier;

/// All built-in conversion profiles, in dispatch-table order.
pub fn built_ins() -> Vec<ConversionProfile> {
    vec![
        customer::profile(),
        supplier::profile(),
        sales_order::profile(),
        purchase_order::profile(),
        journal_entry::profile(),
        payment_entry::profile(),
        item_master::profile(),
        chart_of_accounts::profile(),
    ]
}

/// Download-filename table as shipped: keyed "Item" rather than
/// "Item Master", and with no "Chart of Accounts" entry.
pub fn filename_table() -> Vec<(&'static str, &'static str)> {
    vec![
        ("Customer", "Customer_Output.xml"),
        ("Supplier", "Supplier_Output.xml"),
        ("Sales Order", "Sales_Order_Output.xml"),
        ("Purchase Order", "Purchase_Order_Output.xml"),
        ("Journal Entry", "Journal_Entry_Output.xml"),
        ("Payment Entry", "Payment_Entry_Output.xml"),
        ("Item", "Item_Master_Output.xml"),
    ]
}

static GUID_NAMESPACE: Lazy<Uuid> =
    Lazy::new(|| Uuid::new_v5(&Uuid::NAMESPACE_OID, b"tally-export"));

/// Stable per-record GUID derived from the type, source line, and record
/// key, so repeat conversions of the same file emit identical documents.
pub(crate) fn record_guid(type_name: &str, line: usize, key: &str) -> String {
    Uuid::new_v5(
        &GUID_NAMESPACE,
        format!("{}:{}:{}", type_name, line, key).as_bytes(),
    )
    .to_string()
}

/// Reformats a dd-mm-yyyy export date into Tally's yyyymmdd voucher date.
/// Unparseable input comes out empty, like blank dates in the exports.
pub(crate) fn tally_date(value: &str) -> String {
    NaiveDate::parse_from_str(value, EXPORT_DATE_FORMAT)
        .map(|date| date.format("%Y%m%d").to_string())
        .unwrap_or_default()
}

/// Presentation form ORDERDUEDATE uses, e.g. "5-Aug-2025".
pub(crate) fn display_date(value: &str) -> String {
    NaiveDate::parse_from_str(value, EXPORT_DATE_FORMAT)
        .map(|date| date.format("%-d-%b-%Y").to_string())
        .unwrap_or_default()
}

/// Writes a run of `<TAG>value</TAG>` flag elements.
pub(crate) fn write_flags(w: &mut XmlWriter, flags: &[(&str, &str)]) -> Result<()> {
    for (tag, value) in flags {
        w.text_element(tag, value)?;
    }
    Ok(())
}

/// Writes a run of whitespace-placeholder `*.LIST` elements.
pub(crate) fn write_placeholders(w: &mut XmlWriter, tags: &[&str]) -> Result<()> {
    for tag in tags {
        w.placeholder_element(tag)?;
    }
    Ok(())
}

/// LANGUAGENAME.LIST block the master shapes share.
pub(crate) fn write_language_name(w: &mut XmlWriter, name: &str) -> Result<()> {
    w.start_element("LANGUAGENAME.LIST")?;
    w.start_element_with_attrs("NAME.LIST", &[("TYPE", "String")])?;
    w.text_element("NAME", name)?;
    w.end_element("NAME.LIST")?;
    w.end_element("LANGUAGENAME.LIST")?;
    Ok(())
}

/// OLDAUDITENTRYIDS.LIST block opening most master and voucher shapes.
pub(crate) fn write_old_audit_entry_ids(w: &mut XmlWriter) -> Result<()> {
    w.start_element_with_attrs("OLDAUDITENTRYIDS.LIST", &[("TYPE", "Number")])?;
    w.text_element("OLDAUDITENTRYIDS", "-1")?;
    w.end_element("OLDAUDITENTRYIDS.LIST")?;
    Ok(())
}

use std::sync::Arc;

use crate::error::Result;
use crate::pipeline::validator::ValidatedRow;
use crate::pipeline::xml::XmlWriter;
use crate::registry::{ColumnSpec, ConversionProfile, CsvLayout, FragmentTemplate, RenderContext};

use super::sales_order::{ALLOCATION_EMPTY_LISTS, LEDGER_ENTRY_EXTRA_LISTS, VOUCHER_EMPTY_LISTS};
use super::{
    display_date, record_guid, tally_date, write_flags, write_old_audit_entry_ids,
    write_placeholders,
};

/// Purchase orders import as "Purchase Order" vouchers booked against the
/// PRCORD ledger, with the supplier on the party side.
pub struct PurchaseOrderTemplate;

impl PurchaseOrderTemplate {
    fn write_voucher(
        &self,
        w: &mut XmlWriter,
        row: &ValidatedRow,
        seq: usize,
        ctx: &RenderContext,
    ) -> Result<()> {
        let order_name = row.field("name");
        let supplier = row.field("supplier");
        let supplier_name = row.field("supplier_name");
        let date = tally_date(row.field("transaction_date"));
        let sequence = (seq + 1).to_string();

        let guid = record_guid("Purchase Order", row.line(), order_name);
        let remote_id = format!("{}-00000008", guid);
        let vch_key = format!("{}-0000b146:00000010", guid);

        let place_of_supply = {
            let value = row.field("shipping_address");
            if value.is_empty() {
                "Delhi"
            } else {
                value
            }
        };

        w.start_element_with_attrs("TALLYMESSAGE", &[("xmlns:UDF", "TallyUDF")])?;
        w.start_element_with_attrs(
            "VOUCHER",
            &[
                ("REMOTEID", remote_id.as_str()),
                ("VCHKEY", vch_key.as_str()),
                ("VCHTYPE", "Purchase Order"),
                ("ACTION", "Create"),
                ("OBJVIEW", "Invoice Voucher View"),
            ],
        )?;

        write_old_audit_entry_ids(w)?;
        w.text_element("DATE", &date)?;
        w.text_element("GUID", &remote_id)?;
        w.text_element("COUNTRYOFRESIDENCE", "India")?;
        w.text_element("PLACEOFSUPPLY", place_of_supply)?;
        w.text_element("PARTYNAME", supplier)?;
        w.text_element("PARTYLEDGERNAME", supplier_name)?;
        w.text_element("VOUCHERTYPENAME", "Purchase Order")?;
        w.text_element("REFERENCE", order_name)?;
        w.text_element("VOUCHERNUMBER", "1")?;
        w.text_element("BASICBASEPARTYNAME", supplier_name)?;
        w.text_element("CSTFORMISSUETYPE", "")?;
        w.text_element("CSTFORMRECVTYPE", "")?;
        w.text_element("FBTPAYMENTTYPE", "Default")?;
        w.text_element("PERSISTEDVIEW", "Invoice Voucher View")?;
        w.text_element("BASICBUYERNAME", ctx.company)?;
        w.text_element("VCHGSTCLASS", "")?;

        write_flags(w, VOUCHER_FLAGS)?;

        w.text_element("ALTERID", &sequence)?;
        w.text_element("MASTERID", &sequence)?;
        w.text_element("VOUCHERKEY", "194914205827104")?;

        write_placeholders(w, VOUCHER_EMPTY_LISTS)?;

        self.write_inventory_entries(w, row, seq)?;

        w.end_element("VOUCHER")?;
        w.end_element("TALLYMESSAGE")?;
        Ok(())
    }

    fn write_inventory_entries(
        &self,
        w: &mut XmlWriter,
        row: &ValidatedRow,
        seq: usize,
    ) -> Result<()> {
        let amount = row.field("amount");
        let qty = row.field("qty");

        w.start_element("INVENTORYENTRIES.LIST")?;
        w.text_element("STOCKITEMNAME", row.field("item_name"))?;
        w.text_element("ISDEEMEDPOSITIVE", "Yes")?;
        w.text_element("ISLASTDEEMEDPOSITIVE", "Yes")?;
        w.text_element("ISAUTONEGATE", "No")?;
        w.text_element("ISCUSTOMSCLEARANCE", "No")?;
        w.text_element("ISTRACKCOMPONENT", "No")?;
        w.text_element("ISTRACKPRODUCTION", "No")?;
        w.text_element("ISPRIMARYITEM", "No")?;
        w.text_element("ISSCRAP", "No")?;
        w.text_element("RATE", row.field("base_rate"))?;
        w.text_element("AMOUNT", amount)?;
        w.text_element("ACTUALQTY", qty)?;
        w.text_element("BILLEDQTY", qty)?;

        let due_date = display_date(row.field("transaction_date"));
        let batch_name = {
            let value = row.field("batch_name");
            if value.is_empty() {
                "Primary Batch"
            } else {
                value
            }
        };
        let stock_qty = row.field("stock_qty");
        w.start_element("BATCHALLOCATIONS.LIST")?;
        w.text_element("BATCHNAME", batch_name)?;
        w.text_element("INDENTNO", row.field("indent_no"))?;
        w.text_element("ORDERNO", row.field("name"))?;
        w.text_element("TRACKINGNUMBER", row.field("tracking_number"))?;
        w.text_element("DYNAMICCSTISCLEARED", "No")?;
        w.text_element("AMOUNT", amount)?;
        w.text_element("ACTUALQTY", stock_qty)?;
        w.text_element("BILLEDQTY", stock_qty)?;
        w.text_element_with_attrs(
            "ORDERDUEDATE",
            &[("JD", (seq + 1).to_string().as_str()), ("P", due_date.as_str())],
            &due_date,
        )?;
        write_placeholders(w, &["ADDITIONALDETAILS.LIST", "VOUCHERCOMPONENTLIST.LIST"])?;
        w.end_element("BATCHALLOCATIONS.LIST")?;

        // Order value books against the PRCORD ledger.
        w.start_element("ACCOUNTINGALLOCATIONS.LIST")?;
        write_old_audit_entry_ids(w)?;
        w.text_element("LEDGERNAME", "PRCORD")?;
        w.text_element("GSTCLASS", "")?;
        w.text_element("ISDEEMEDPOSITIVE", "Yes")?;
        w.text_element("LEDGERFROMITEM", "No")?;
        w.text_element("REMOVEZEROENTRIES", "No")?;
        w.text_element("ISPARTYLEDGER", "No")?;
        w.text_element("ISLASTDEEMEDPOSITIVE", "Yes")?;
        w.text_element("ISCAPVATTAXALTERED", "No")?;
        w.text_element("ISCAPVATNOTCLAIMED", "No")?;
        w.text_element("AMOUNT", amount)?;
        write_placeholders(w, ALLOCATION_EMPTY_LISTS)?;
        w.end_element("ACCOUNTINGALLOCATIONS.LIST")?;

        // Party side, credited to the supplier ledger.
        w.start_element("LEDGERENTRIES.LIST")?;
        write_old_audit_entry_ids(w)?;
        w.text_element("LEDGERNAME", row.field("supplier_name"))?;
        w.text_element("GSTCLASS", "Standard Rate")?;
        w.text_element("ISDEEMEDPOSITIVE", "No")?;
        w.text_element("LEDGERFROMITEM", "No")?;
        w.text_element("REMOVEZEROENTRIES", "No")?;
        w.text_element("ISPARTYLEDGER", "Yes")?;
        w.text_element("ISLASTDEEMEDPOSITIVE", "No")?;
        w.text_element("ISCAPVATTAXALTERED", "No")?;
        w.text_element("ISCAPVATNOTCLAIMED", "No")?;
        w.text_element("AMOUNT", amount)?;
        write_placeholders(w, ALLOCATION_EMPTY_LISTS)?;
        write_placeholders(w, LEDGER_ENTRY_EXTRA_LISTS)?;
        w.end_element("LEDGERENTRIES.LIST")?;

        w.end_element("INVENTORYENTRIES.LIST")?;
        Ok(())
    }
}

impl FragmentTemplate for PurchaseOrderTemplate {
    fn write_request_data(
        &self,
        w: &mut XmlWriter,
        rows: &[&ValidatedRow],
        ctx: &RenderContext,
    ) -> Result<()> {
        for (seq, row) in rows.iter().enumerate() {
            self.write_voucher(w, row, seq, ctx)?;
        }
        Ok(())
    }
}

pub fn profile() -> ConversionProfile {
    ConversionProfile {
        type_name: "Purchase Order",
        report_name: "Vouchers",
        layout: CsvLayout::erpnext_report(),
        columns: vec![
            ColumnSpec::text("name", true),
            ColumnSpec::text("supplier", true),
            ColumnSpec::text("supplier_name", false),
            ColumnSpec::date("transaction_date", true),
            ColumnSpec::date("schedule_date", false),
            ColumnSpec::text("item_name", false),
            ColumnSpec::decimal("base_rate", false),
            ColumnSpec::decimal("qty", false),
            ColumnSpec::decimal("stock_qty", false),
            ColumnSpec::decimal("amount", false),
            ColumnSpec::decimal("total", false),
        ],
        dedup_column: None,
        template: Arc::new(PurchaseOrderTemplate),
    }
}

/// Voucher behaviour flags in importer order. Purchase orders mark
/// ISINVOICE and ISVATDUTYPAID "Yes"; everything else stays "No".
const VOUCHER_FLAGS: &[(&str, &str)] = &[
    ("DIFFACTUALQTY", "No"),
    ("ISMSTFROMSYNC", "No"),
    ("ASORIGINAL", "No"),
    ("AUDITED", "No"),
    ("FORJOBCOSTING", "No"),
    ("ISOPTIONAL", "No"),
    ("USEFOREXCISE", "No"),
    ("ISFORJOBWORKIN", "No"),
    ("ALLOWCONSUMPTION", "No"),
    ("USEFORINTEREST", "No"),
    ("USEFORGAINLOSS", "No"),
    ("USEFORGODOWNTRANSFER", "No"),
    ("USEFORCOMPOUND", "No"),
    ("USEFORSERVICETAX", "No"),
    ("ISDELETED", "No"),
    ("ISONHOLD", "No"),
    ("ISBOENOTAPPLICABLE", "No"),
    ("ISEXCISEVOUCHER", "No"),
    ("EXCISETAXOVERRIDE", "No"),
    ("USEFORTAXUNITTRANSFER", "No"),
    ("IGNOREPOSVALIDATION", "No"),
    ("EXCISEOPENING", "No"),
    ("USEFORFINALPRODUCTION", "No"),
    ("ISTDSOVERRIDDEN", "No"),
    ("ISTCSOVERRIDDEN", "No"),
    ("ISTDSTCSCASHVCH", "No"),
    ("INCLUDEADVPYMTVCH", "No"),
    ("ISSUBWORKSCONTRACT", "No"),
    ("ISVATOVERRIDDEN", "No"),
    ("IGNOREORIGVCHDATE", "No"),
    ("ISVATPAIDATCUSTOMS", "No"),
    ("ISDECLAREDTOCUSTOMS", "No"),
    ("ISSERVICETAXOVERRIDDEN", "No"),
    ("ISISDVOUCHER", "No"),
    ("ISEXCISEOVERRIDDEN", "No"),
    ("ISEXCISESUPPLYVCH", "No"),
    ("ISGSTOVERRIDDEN", "No"),
    ("GSTNOTEXPORTED", "No"),
    ("IGNOREGSTINVALIDATION", "No"),
    ("ISGSTREFUND", "No"),
    ("ISGSTSECSEVENAPPLICABLE", "No"),
    ("ISVATPRINCIPALACCOUNT", "No"),
    ("ISSHIPPINGWITHINSTATE", "No"),
    ("ISOVERSEASTOURISTTRANS", "No"),
    ("ISDESIGNATEDZONEPARTY", "No"),
    ("ISCANCELLED", "No"),
    ("HASCASHFLOW", "No"),
    ("ISPOSTDATED", "No"),
    ("USETRACKINGNUMBER", "No"),
    ("ISINVOICE", "Yes"),
    ("ISJOURNAL", "No"),
    ("HASDISCOUNTS", "No"),
    ("ASPAYSLIP", "No"),
    ("ISCOSTCENTRE", "No"),
    ("ISSTXNONREALIZEDVCH", "No"),
    ("ISEXCISEMANUFACTURERON", "No"),
    ("ISBLANKCHEQUE", "No"),
    ("ISVOID", "No"),
    ("ORDERLINESTATUS", "No"),
    ("VATISAGNSTCANCSALES", "No"),
    ("VATISPURCEXEMPTED", "No"),
    ("ISVATRESTAXINVOICE", "No"),
    ("VATISASSESABLECALCVCH", "No"),
    ("ISVATDUTYPAID", "Yes"),
    ("ISDELIVERYSAMEASCONSIGNEE", "No"),
    ("ISDISPATCHSAMEASCONSIGNOR", "No"),
    ("CHANGEVCHMODE", "No"),
];

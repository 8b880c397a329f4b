use std::sync::Arc;

use crate::error::Result;
use crate::pipeline::validator::ValidatedRow;
use crate::pipeline::xml::XmlWriter;
use crate::registry::{ColumnSpec, ConversionProfile, CsvLayout, FragmentTemplate, RenderContext};

use super::{
    display_date, record_guid, tally_date, write_flags, write_old_audit_entry_ids,
    write_placeholders,
};

/// Sales orders import as "Sales Order" vouchers with one inventory entry
/// per order line. Rows repeating an order name are deduped upstream.
pub struct SalesOrderTemplate;

impl SalesOrderTemplate {
    fn write_voucher(&self, w: &mut XmlWriter, row: &ValidatedRow, seq: usize) -> Result<()> {
        let order_name = row.field("name");
        let customer = row.field("customer_name");
        let date = tally_date(row.field("transaction_date"));
        let sequence = (seq + 1).to_string();

        let guid = record_guid("Sales Order", row.line(), order_name);
        let remote_id = format!("{}-00000001", guid);
        let vch_key = format!("{}-0000b146:00000008", guid);

        w.start_element_with_attrs("TALLYMESSAGE", &[("xmlns:UDF", "TallyUDF")])?;
        w.start_element_with_attrs(
            "VOUCHER",
            &[
                ("REMOTEID", remote_id.as_str()),
                ("VCHKEY", vch_key.as_str()),
                ("VCHTYPE", "Sales Order"),
                ("ACTION", "Create"),
                ("OBJVIEW", "Invoice Voucher View"),
            ],
        )?;

        write_old_audit_entry_ids(w)?;
        w.text_element("DATE", &date)?;
        w.text_element("GUID", &remote_id)?;
        w.text_element("VATDEALERTYPE", "Unregistered")?;
        w.text_element("NARRATION", "New Sales Order")?;
        w.text_element("COUNTRYOFRESIDENCE", "India")?;
        w.text_element("PARTYNAME", customer)?;
        w.text_element("PARTYLEDGERNAME", customer)?;
        w.text_element("VOUCHERTYPENAME", "Sales Order")?;
        w.text_element("REFERENCE", order_name)?;
        w.text_element("VOUCHERNUMBER", &sequence)?;
        w.text_element("BASICBASEPARTYNAME", customer)?;
        w.text_element("CSTFORMISSUETYPE", "")?;
        w.text_element("CSTFORMRECVTYPE", "")?;
        w.text_element("FBTPAYMENTTYPE", "Default")?;
        w.text_element("PERSISTEDVIEW", "Invoice Voucher View")?;
        w.text_element("BASICBUYERNAME", customer)?;
        w.text_element("VCHGSTCLASS", "")?;

        write_flags(w, VOUCHER_NO_FLAGS)?;

        w.text_element("ALTERID", &sequence)?;
        w.text_element("MASTERID", &sequence)?;
        w.text_element("VOUCHERKEY", &vch_key)?;
        w.text_element("EFFECTIVEDATE", &date)?;

        write_flags(w, VOUCHER_YES_FLAGS)?;
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
        let total = row.field("total");
        let qty = row.field("stock_qty");

        w.start_element("INVENTORYENTRIES.LIST")?;
        w.text_element("STOCKITEMNAME", row.field("item_name"))?;
        w.text_element("ISDEEMEDPOSITIVE", "No")?;
        w.text_element("ISLASTDEEMEDPOSITIVE", "No")?;
        w.text_element("ISAUTONEGATE", "No")?;
        w.text_element("ISCUSTOMSCLEARANCE", "No")?;
        w.text_element("ISTRACKCOMPONENT", "No")?;
        w.text_element("ISTRACKPRODUCTION", "No")?;
        w.text_element("ISPRIMARYITEM", "No")?;
        w.text_element("ISSCRAP", "No")?;
        w.text_element("RATE", row.field("rate"))?;
        w.text_element("AMOUNT", total)?;
        w.text_element("ACTUALQTY", qty)?;
        w.text_element("BILLEDQTY", qty)?;

        // BATCHALLOCATIONS.LIST carries the order reference and due date.
        let due_date = display_date(row.field("transaction_date"));
        let batch_name = {
            let value = row.field("batch_name");
            if value.is_empty() {
                "Primary Batch"
            } else {
                value
            }
        };
        w.start_element("BATCHALLOCATIONS.LIST")?;
        w.text_element("BATCHNAME", batch_name)?;
        w.text_element("INDENTNO", row.field("indent_no"))?;
        w.text_element("ORDERNO", row.field("name"))?;
        w.text_element("TRACKINGNUMBER", row.field("tracking_number"))?;
        w.text_element("DYNAMICCSTISCLEARED", "No")?;
        w.text_element("AMOUNT", total)?;
        w.text_element("ACTUALQTY", qty)?;
        w.text_element("BILLEDQTY", qty)?;
        w.text_element_with_attrs(
            "ORDERDUEDATE",
            &[("JD", (seq + 1).to_string().as_str()), ("P", due_date.as_str())],
            &due_date,
        )?;
        write_placeholders(w, &["ADDITIONALDETAILS.LIST", "VOUCHERCOMPONENTLIST.LIST"])?;
        w.end_element("BATCHALLOCATIONS.LIST")?;

        let amount = row.field("amount");

        // Order value books against the SALORD ledger.
        w.start_element("ACCOUNTINGALLOCATIONS.LIST")?;
        write_old_audit_entry_ids(w)?;
        w.text_element("LEDGERNAME", "SALORD")?;
        self.write_allocation_body(w, amount)?;
        write_placeholders(w, ALLOCATION_EMPTY_LISTS)?;
        w.end_element("ACCOUNTINGALLOCATIONS.LIST")?;

        // The party side repeats the allocation body under the customer.
        w.start_element("LEDGERENTRIES.LIST")?;
        w.text_element("LEDGERNAME", row.field("customer_name"))?;
        self.write_allocation_body(w, amount)?;
        write_placeholders(w, ALLOCATION_EMPTY_LISTS)?;
        write_placeholders(w, LEDGER_ENTRY_EXTRA_LISTS)?;
        w.end_element("LEDGERENTRIES.LIST")?;

        w.end_element("INVENTORYENTRIES.LIST")?;
        Ok(())
    }

    fn write_allocation_body(&self, w: &mut XmlWriter, amount: &str) -> Result<()> {
        w.text_element("GSTCLASS", "")?;
        w.text_element("ISDEEMEDPOSITIVE", "Yes")?;
        w.text_element("LEDGERFROMITEM", "No")?;
        w.text_element("REMOVEZEROENTRIES", "No")?;
        w.text_element("ISPARTYLEDGER", "No")?;
        w.text_element("ISLASTDEEMEDPOSITIVE", "Yes")?;
        w.text_element("ISCAPVATTAXALTERED", "No")?;
        w.text_element("ISCAPVATNOTCLAIMED", "No")?;
        w.text_element("AMOUNT", amount)?;
        Ok(())
    }
}

impl FragmentTemplate for SalesOrderTemplate {
    fn write_request_data(
        &self,
        w: &mut XmlWriter,
        rows: &[&ValidatedRow],
        _ctx: &RenderContext,
    ) -> Result<()> {
        for (seq, row) in rows.iter().enumerate() {
            self.write_voucher(w, row, seq)?;
        }
        Ok(())
    }
}

pub fn profile() -> ConversionProfile {
    ConversionProfile {
        type_name: "Sales Order",
        report_name: "Vouchers",
        layout: CsvLayout::erpnext_report(),
        columns: vec![
            ColumnSpec::text("name", true),
            ColumnSpec::text("customer_name", true),
            ColumnSpec::date("transaction_date", true),
            ColumnSpec::text("item_name", false),
            ColumnSpec::decimal("rate", false),
            ColumnSpec::decimal("total", false),
            ColumnSpec::decimal("stock_qty", false),
            ColumnSpec::decimal("amount", false),
        ],
        dedup_column: Some("name"),
        template: Arc::new(SalesOrderTemplate),
    }
}

/// Voucher behaviour flags fixed to "No", in importer order.
const VOUCHER_NO_FLAGS: &[(&str, &str)] = &[
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
    ("ISPOSTDATED", "No"),
    ("USETRACKINGNUMBER", "No"),
    ("ISINVOICE", "No"),
    ("MFGJOURNAL", "No"),
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
    ("ISDELIVERYSAMEASCONSIGNEE", "No"),
    ("ISDISPATCHSAMEASCONSIGNOR", "No"),
    ("CHANGEVCHMODE", "No"),
];

const VOUCHER_YES_FLAGS: &[(&str, &str)] = &[("HASCASHFLOW", "Yes"), ("ISVATDUTYPAID", "Yes")];

pub(super) const VOUCHER_EMPTY_LISTS: &[&str] = &[
    "EWAYBILLDETAILS.LIST",
    "EXCLUDEDTAXATIONS.LIST",
    "OLDAUDITENTRIES.LIST",
    "ACCOUNTAUDITENTRIES.LIST",
    "AUDITENTRIES.LIST",
    "DUTYHEADDETAILS.LIST",
];

/// Empty sub-lists both allocation shapes close with.
pub(super) const ALLOCATION_EMPTY_LISTS: &[&str] = &[
    "SERVICETAXDETAILS.LIST",
    "BANKALLOCATIONS.LIST",
    "BILLALLOCATIONS.LIST",
    "INTERESTCOLLECTION.LIST",
    "OLDAUDITENTRIES.LIST",
    "ACCOUNTAUDITENTRIES.LIST",
    "AUDITENTRIES.LIST",
    "INPUTCRALLOCS.LIST",
    "DUTYHEADDETAILS.LIST",
    "EXCISEDUTYHEADDETAILS.LIST",
    "RATEDETAILS.LIST",
    "SUMMARYALLOCS.LIST",
    "STPYMTDETAILS.LIST",
    "EXCISEPAYMENTALLOCATIONS.LIST",
    "TAXBILLALLOCATIONS.LIST",
    "TAXOBJECTALLOCATIONS.LIST",
    "TDSEXPENSEALLOCATIONS.LIST",
    "VATSTATUTORYDETAILS.LIST",
    "COSTTRACKALLOCATIONS.LIST",
    "REFVOUCHERDETAILS.LIST",
    "INVOICEWISEDETAILS.LIST",
    "VATITCDETAILS.LIST",
    "ADVANCETAXDETAILS.LIST",
];

/// The party-side entry carries a few extra payroll/e-way sub-lists.
pub(super) const LEDGER_ENTRY_EXTRA_LISTS: &[&str] = &[
    "PAYROLLMODEOFPAYMENT.LIST",
    "ATTDRECORDS.LIST",
    "GSTEWAYCONSIGNORADDRESS.LIST",
    "GSTEWAYCONSIGNEEADDRESS.LIST",
    "TEMPGSTRATEDETAILS.LIST",
];

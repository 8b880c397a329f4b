//! Shared LEDGER master shape behind the Customer and Supplier profiles.

use crate::error::Result;
use crate::pipeline::validator::ValidatedRow;
use crate::pipeline::xml::XmlWriter;

use super::{record_guid, write_flags, write_language_name, write_old_audit_entry_ids};

/// Column names differ between the two party exports; the ledger body they
/// produce is the same.
pub(super) struct LedgerColumns {
    pub name: &'static str,
    pub address: &'static str,
    pub state: &'static str,
    pub pincode: &'static str,
    pub website: &'static str,
    pub pan: &'static str,
    pub country: &'static str,
    pub mobile: &'static str,
    pub email: &'static str,
}

pub(super) fn write_party_ledger(
    w: &mut XmlWriter,
    row: &ValidatedRow,
    type_name: &str,
    parent_group: &str,
    columns: &LedgerColumns,
    seq: usize,
) -> Result<()> {
    let name = row.field(columns.name);
    let guid = record_guid(type_name, row.line(), name);

    w.start_element_with_attrs("TALLYMESSAGE", &[("xmlns:UDF", "TallyUDF")])?;
    w.start_element_with_attrs("LEDGER", &[("NAME", name), ("RESERVEDNAME", "")])?;

    w.start_element_with_attrs("ADDRESS.LIST", &[("TYPE", "String")])?;
    w.text_element("ADDRESS", row.field(columns.address))?;
    w.end_element("ADDRESS.LIST")?;

    w.start_element_with_attrs("MAILINGNAME.LIST", &[("TYPE", "String")])?;
    w.text_element("MAILINGNAME", name)?;
    w.end_element("MAILINGNAME.LIST")?;

    write_old_audit_entry_ids(w)?;

    w.text_element("GUID", &guid)?;
    w.text_element("EMAIL", row.field(columns.email))?;
    w.text_element("PRIORSTATENAME", row.field(columns.state))?;
    w.text_element("PINCODE", row.field(columns.pincode))?;
    w.text_element("WEBSITE", row.field(columns.website))?;
    w.text_element("INCOMETAXNUMBER", row.field(columns.pan))?;
    w.text_element("COUNTRYNAME", "India")?;
    w.text_element("GSTREGISTRATIONTYPE", "Regular")?;
    w.text_element("VATDEALERTYPE", "Regular")?;
    w.text_element("PARENT", parent_group)?;
    w.text_element("TAXCLASSIFICATIONNAME", "")?;
    w.text_element("TAXTYPE", "Others")?;
    w.text_element("COUNTRYOFRESIDENCE", row.field(columns.country))?;
    w.text_element("LEDGERPHONE", row.field(columns.mobile))?;
    w.text_element("LEDGERFAX", row.field(columns.mobile))?;
    w.text_element("LEDGERCONTACT", name)?;
    w.text_element("LEDGERMOBILE", row.field(columns.mobile))?;
    w.text_element("GSTTYPE", "")?;
    w.text_element("APPROPRIATEFOR", "")?;
    w.text_element("EXCISELEDGERCLASSIFICATION", "")?;
    w.text_element("EXCISEDUTYTYPE", "")?;
    w.text_element("EXCISENATUREOFPURCHASE", "")?;
    w.text_element("LEDGERFBTCATEGORY", "")?;

    write_flags(w, LEDGER_FLAGS)?;

    w.text_element("SORTPOSITION", "1000")?;
    w.text_element("ALTERID", &(seq + 1).to_string())?;

    write_language_name(w, name)?;

    w.end_element("LEDGER")?;
    w.end_element("TALLYMESSAGE")?;
    Ok(())
}

/// Fixed behaviour flags every party ledger carries, in importer order.
const LEDGER_FLAGS: &[(&str, &str)] = &[
    ("ISBILLWISEON", "Yes"),
    ("ISCOSTCENTRESON", "No"),
    ("ISINTERESTON", "No"),
    ("ALLOWINMOBILE", "No"),
    ("ISCOSTTRACKINGON", "No"),
    ("ISBENEFICIARYCODEON", "No"),
    ("PLASINCOMEEXPENSE", "No"),
    ("ISUPDATINGTARGETID", "No"),
    ("ASORIGINAL", "Yes"),
    ("ISCONDENSED", "No"),
    ("AFFECTSSTOCK", "No"),
    ("ISRATEINCLUSIVEVAT", "No"),
    ("FORPAYROLL", "No"),
    ("ISABCENABLED", "No"),
    ("ISCREDITDAYSCHKON", "No"),
    ("INTERESTONBILLWISE", "No"),
    ("OVERRIDEINTEREST", "No"),
    ("OVERRIDEADVINTEREST", "No"),
    ("USEFORVAT", "No"),
    ("IGNORETDSEXEMPT", "No"),
    ("ISTCSAPPLICABLE", "No"),
    ("ISTDSAPPLICABLE", "No"),
    ("ISFBTAPPLICABLE", "No"),
    ("ISGSTAPPLICABLE", "No"),
    ("ISEXCISEAPPLICABLE", "No"),
    ("ISTDSEXPENSE", "No"),
    ("ISEDLIAPPLICABLE", "No"),
    ("ISRELATEDPARTY", "No"),
    ("USEFORESIELIGIBILITY", "No"),
    ("ISINTERESTINCLLASTDAY", "No"),
    ("APPROPRIATETAXVALUE", "No"),
    ("ISBEHAVEASDUTY", "No"),
    ("INTERESTINCLDAYOFADDITION", "No"),
    ("INTERESTINCLDAYOFDEDUCTION", "No"),
    ("ISOTHTERRITORYASSESSEE", "No"),
    ("OVERRIDECREDITLIMIT", "No"),
    ("ISAGAINSTFORMC", "No"),
    ("ISCHEQUEPRINTINGENABLED", "Yes"),
    ("ISPAYUPLOAD", "No"),
    ("ISPAYBATCHONLYSAL", "No"),
    ("ISBNFCODESUPPORTED", "No"),
    ("ALLOWEXPORTWITHERRORS", "No"),
    ("CONSIDERPURCHASEFOREXPORT", "No"),
    ("ISTRANSPORTER", "No"),
    ("USEFORNOTIONALITC", "No"),
    ("ISECOMMOPERATOR", "No"),
    ("SHOWINPAYSLIP", "No"),
    ("USEFORGRATUITY", "No"),
    ("ISTDSPROJECTED", "No"),
    ("FORSERVICETAX", "No"),
    ("ISINPUTCREDIT", "No"),
    ("ISEXEMPTED", "No"),
    ("ISABATEMENTAPPLICABLE", "No"),
    ("ISSTXPARTY", "No"),
    ("ISSTXNONREALIZEDTYPE", "No"),
    ("ISUSEDFORCVD", "No"),
    ("LEDBELONGSTONONTAXABLE", "No"),
    ("ISEXCISEMERCHANTEXPORTER", "No"),
    ("ISPARTYEXEMPTED", "No"),
    ("ISSEZPARTY", "No"),
    ("TDSDEDUCTEEISSPECIALRATE", "No"),
    ("ISECHEQUESUPPORTED", "No"),
    ("ISEDDSUPPORTED", "No"),
    ("HASECHEQUEDELIVERYMODE", "No"),
    ("HASECHEQUEDELIVERYTO", "No"),
    ("HASECHEQUEPRINTLOCATION", "No"),
    ("HASECHEQUEPAYABLELOCATION", "No"),
    ("HASECHEQUEBANKLOCATION", "No"),
    ("HASEDDDELIVERYMODE", "No"),
    ("HASEDDDELIVERYTO", "No"),
    ("HASEDDPRINTLOCATION", "No"),
    ("HASEDDPAYABLELOCATION", "No"),
    ("HASEDDBANKLOCATION", "No"),
    ("ISEBANKINGENABLED", "No"),
    ("ISEXPORTFILEENCRYPTED", "No"),
    ("ISBATCHENABLED", "No"),
    ("ISPRODUCTCODEBASED", "No"),
    ("HASEDDCITY", "No"),
    ("HASECHEQUECITY", "No"),
    ("ISFILENAMEFORMATSUPPORTED", "No"),
    ("HASCLIENTCODE", "No"),
    ("PAYINSISBATCHAPPLICABLE", "No"),
    ("PAYINSISFILENUMAPP", "No"),
    ("ISSALARYTRANSGROUPEDFORBRS", "No"),
    ("ISEBANKINGSUPPORTED", "No"),
    ("ISSCBUAE", "No"),
    ("ISBANKSTATUSAPP", "No"),
    ("ISSALARYGROUPED", "No"),
    ("USEFORPURCHASETAX", "No"),
    ("AUDITED", "No"),
];

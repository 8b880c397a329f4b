use std::collections::HashSet;
use std::sync::Arc;

use crate::error::Result;
use crate::pipeline::validator::{normalize_key, ValidatedRow};
use crate::pipeline::xml::XmlWriter;
use crate::registry::{ColumnSpec, ConversionProfile, CsvLayout, FragmentTemplate, RenderContext};

use super::{record_guid, write_flags, write_language_name, write_placeholders};

/// Item exports expand into three master shapes: one UNIT per distinct
/// unit of measure, one STOCKGROUP per distinct item group, then one
/// STOCKITEM per row. Rows repeating an item name are deduped upstream.
pub struct ItemMasterTemplate;

impl ItemMasterTemplate {
    fn write_unit(&self, w: &mut XmlWriter, uom: &str, line: usize, seq: usize) -> Result<()> {
        let guid = record_guid("Item Master/Unit", line, uom);

        w.start_element_with_attrs("TALLYMESSAGE", &[("xmlns:UDF", "TallyUDF")])?;
        w.start_element_with_attrs("UNIT", &[("NAME", uom), ("RESERVEDNAME", "")])?;
        w.text_element("NAME", uom)?;
        w.text_element("GUID", &guid)?;
        w.text_element("ISUPDATINGTARGETID", "No")?;
        w.text_element("ASORIGINAL", "Yes")?;
        w.text_element("ISGSTEXCLUDED", "No")?;
        w.text_element("ISSIMPLEUNIT", "Yes")?;
        w.text_element("ALTERID", &(seq + 1).to_string())?;
        w.end_element("UNIT")?;
        w.end_element("TALLYMESSAGE")?;
        Ok(())
    }

    fn write_stock_group(
        &self,
        w: &mut XmlWriter,
        group: &str,
        line: usize,
        seq: usize,
    ) -> Result<()> {
        let guid = record_guid("Item Master/Group", line, group);

        w.start_element_with_attrs("TALLYMESSAGE", &[("xmlns:UDF", "TallyUDF")])?;
        w.start_element_with_attrs("STOCKGROUP", &[("NAME", group), ("RESERVEDNAME", "")])?;
        w.text_element("GUID", &guid)?;
        w.text_element("PARENT", "")?;
        w.text_element("BASEUNITS", "Nos")?;
        w.text_element("ADDITIONALUNITS", "")?;
        write_flags(w, STOCK_GROUP_FLAGS)?;
        w.text_element("ALTERID", &(seq + 1).to_string())?;
        write_placeholders(
            w,
            &[
                "SERVICETAXDETAILS.LIST",
                "VATDETAILS.LIST",
                "SALESTAXCESSDETAILS.LIST",
                "GSTDETAILS.LIST",
            ],
        )?;

        w.start_element("LANGUAGENAME.LIST")?;
        w.start_element_with_attrs("NAME.LIST", &[("TYPE", "String")])?;
        w.text_element("NAME", group)?;
        w.end_element("NAME.LIST")?;
        w.text_element("LANGUAGEID", "1033")?;
        w.end_element("LANGUAGENAME.LIST")?;

        write_placeholders(
            w,
            &[
                "SCHVIDETAILS.LIST",
                "EXCISETARIFFDETAILS.LIST",
                "TCSCATEGORYDETAILS.LIST",
                "TDSCATEGORYDETAILS.LIST",
                "GSTCLASSFNIGSTRATES.LIST",
                "EXTARIFFDUTYHEADDETAILS.LIST",
                "TEMPGSTITEMSLABRATES.LIST",
            ],
        )?;
        w.end_element("STOCKGROUP")?;
        w.end_element("TALLYMESSAGE")?;
        Ok(())
    }

    fn write_stock_item(
        &self,
        w: &mut XmlWriter,
        row: &ValidatedRow,
        group: &str,
        seq: usize,
    ) -> Result<()> {
        let item_name = row.field("item_name");
        let guid = record_guid("Item Master", row.line(), item_name);
        let base_units = {
            let value = row.field("stock_uom");
            if value.is_empty() {
                "Nos"
            } else {
                value
            }
        };

        w.start_element_with_attrs("TALLYMESSAGE", &[("xmlns:UDF", "TallyUDF")])?;
        w.start_element_with_attrs("STOCKITEM", &[("NAME", item_name), ("RESERVEDNAME", "")])?;
        w.text_element("GUID", &guid)?;
        w.text_element("PARENT", group)?;
        w.text_element("CATEGORY", "")?;
        w.text_element("TAXCLASSIFICATIONNAME", "")?;
        w.text_element("BASEUNITS", base_units)?;
        w.text_element("ADDITIONALUNITS", "")?;
        w.text_element("EXCISEITEMCLASSIFICATION", "")?;
        write_flags(w, STOCK_ITEM_FLAGS)?;
        w.text_element("ALTERID", &(seq + 1).to_string())?;
        w.text_element("DENOMINATOR", "1")?;
        w.text_element("RATEOFVAT", "0")?;

        w.start_element("GSTDETAILS.LIST")?;
        w.text_element("APPLICABLEFROM", "20170701")?;
        w.text_element("CALCULATIONTYPE", "On Value")?;
        w.text_element("HSNCODE", row.field("gst_hsn_code"))?;
        w.text_element("ISREVERSECHARGEAPPLICABLE", "No")?;
        w.text_element("ISNONGSTGOODS", "No")?;
        w.text_element("GSTINELIGIBLEITC", "No")?;
        w.text_element("INCLUDEEXPFORSLABCALC", "No")?;
        w.end_element("GSTDETAILS.LIST")?;

        write_language_name(w, item_name)?;
        write_placeholders(w, STOCK_ITEM_EMPTY_LISTS)?;
        w.end_element("STOCKITEM")?;
        w.end_element("TALLYMESSAGE")?;
        Ok(())
    }
}

impl FragmentTemplate for ItemMasterTemplate {
    fn write_request_data(
        &self,
        w: &mut XmlWriter,
        rows: &[&ValidatedRow],
        _ctx: &RenderContext,
    ) -> Result<()> {
        // Units first, in order of first appearance.
        let mut seen_uoms = HashSet::new();
        let mut unit_seq = 0usize;
        for row in rows {
            let uom = row.field("stock_uom");
            if !uom.is_empty() && seen_uoms.insert(uom.to_string()) {
                self.write_unit(w, uom, row.line(), unit_seq)?;
                unit_seq += 1;
            }
        }

        // Then groups and items, interleaved the way the exports read.
        let mut seen_groups = HashSet::new();
        for (seq, row) in rows.iter().enumerate() {
            let group = {
                let value = row.field("item_group");
                if value.is_empty() {
                    "Primary"
                } else {
                    value
                }
            };
            if seen_groups.insert(normalize_key(group)) {
                self.write_stock_group(w, group, row.line(), seq)?;
            }
            self.write_stock_item(w, row, group, seq)?;
        }
        Ok(())
    }
}

pub fn profile() -> ConversionProfile {
    ConversionProfile {
        type_name: "Item Master",
        report_name: "All Masters",
        layout: CsvLayout::erpnext_report(),
        columns: vec![
            ColumnSpec::text("item_name", true),
            ColumnSpec::text("stock_uom", true),
            ColumnSpec::text("item_group", false),
            ColumnSpec::text("gst_hsn_code", false),
        ],
        dedup_column: Some("item_name"),
        template: Arc::new(ItemMasterTemplate),
    }
}

const STOCK_GROUP_FLAGS: &[(&str, &str)] = &[
    ("ISBATCHWISEON", "No"),
    ("ISPERISHABLEON", "No"),
    ("ISADDABLE", "No"),
    ("ISUPDATINGTARGETID", "No"),
    ("ASORIGINAL", "Yes"),
    ("IGNOREPHYSICALDIFFERENCE", "No"),
    ("IGNORENEGATIVESTOCK", "No"),
    ("TREATSALESASMANUFACTURED", "No"),
    ("TREATPURCHASESASCONSUMED", "No"),
    ("TREATREJECTSASSCRAP", "No"),
    ("HASMFGDATE", "No"),
    ("ALLOWUSEOFEXPIREDITEMS", "No"),
    ("IGNOREBATCHES", "No"),
    ("IGNOREGODOWNS", "No"),
];

const STOCK_ITEM_FLAGS: &[(&str, &str)] = &[
    ("ISCOSTCENTRESON", "No"),
    ("ISBATCHWISEON", "No"),
    ("ISPERISHABLEON", "No"),
    ("ISENTRYTAXAPPLICABLE", "No"),
    ("ISCOSTTRACKINGON", "No"),
    ("ISUPDATINGTARGETID", "No"),
    ("ASORIGINAL", "Yes"),
    ("ISRATEINCLUSIVEVAT", "No"),
    ("IGNOREPHYSICALDIFFERENCE", "No"),
    ("IGNORENEGATIVESTOCK", "No"),
    ("TREATSALESASMANUFACTURED", "No"),
    ("TREATPURCHASESASCONSUMED", "No"),
    ("TREATREJECTSASSCRAP", "No"),
    ("HASMFGDATE", "No"),
    ("ALLOWUSEOFEXPIREDITEMS", "No"),
    ("IGNOREBATCHES", "No"),
    ("IGNOREGODOWNS", "No"),
    ("CALCONMRP", "No"),
    ("EXCLUDEJRNLFORVALUATION", "No"),
    ("ISMRPINCLOFTAX", "No"),
    ("ISADDLTAXEXEMPT", "No"),
    ("ISSUPPLEMENTRYDUTYON", "No"),
    ("GVATISEXCISEAPPL", "No"),
    ("REORDERASHIGHER", "No"),
    ("MINORDERASHIGHER", "No"),
    ("ISEXCISECALCULATEONMRP", "No"),
    ("INCLUSIVETAX", "No"),
    ("GSTCALCSLABONMRP", "No"),
    ("MODIFYMRPRATE", "No"),
];

const STOCK_ITEM_EMPTY_LISTS: &[&str] = &[
    "SERVICETAXDETAILS.LIST",
    "VATDETAILS.LIST",
    "SALESTAXCESSDETAILS.LIST",
    "SCHVIDETAILS.LIST",
    "EXCISETARIFFDETAILS.LIST",
    "TCSCATEGORYDETAILS.LIST",
    "TDSCATEGORYDETAILS.LIST",
    "EXCLUDEDTAXATIONS.LIST",
    "OLDAUDITENTRIES.LIST",
    "ACCOUNTAUDITENTRIES.LIST",
    "AUDITENTRIES.LIST",
    "MRPDETAILS.LIST",
    "VATCLASSIFICATIONDETAILS.LIST",
    "COMPONENTLIST.LIST",
    "ADDITIONALLEDGERS.LIST",
    "SALESLIST.LIST",
    "PURCHASELIST.LIST",
    "FULLPRICELIST.LIST",
    "BATCHALLOCATIONS.LIST",
    "TRADEREXCISEDUTIES.LIST",
    "STANDARDCOSTLIST.LIST",
    "STANDARDPRICELIST.LIST",
    "EXCISEITEMGODOWN.LIST",
    "MULTICOMPONENTLIST.LIST",
    "LBTDETAILS.LIST",
    "PRICELEVELLIST.LIST",
    "GSTCLASSFNIGSTRATES.LIST",
    "EXTARIFFDUTYHEADDETAILS.LIST",
    "TEMPGSTITEMSLABRATES.LIST",
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::reader::RawRow;

    fn ctx() -> RenderContext<'static> {
        RenderContext {
            company: "Techsolvo",
        }
    }

    fn item_row(line: usize, name: &str, uom: &str, group: &str) -> ValidatedRow {
        ValidatedRow {
            raw: RawRow {
                line,
                values: vec![
                    ("item_name".to_string(), name.to_string()),
                    ("stock_uom".to_string(), uom.to_string()),
                    ("item_group".to_string(), group.to_string()),
                    ("gst_hsn_code".to_string(), "8471".to_string()),
                ],
                column_count_mismatch: false,
            },
            issues: Vec::new(),
            valid: true,
        }
    }

    #[test]
    fn units_and_groups_are_emitted_once() {
        let rows = [
            item_row(21, "Widget", "Nos", "Components"),
            item_row(22, "Gadget", "Nos", "Components"),
            item_row(23, "Cable", "Mtr", "Consumables"),
        ];
        let refs: Vec<&ValidatedRow> = rows.iter().collect();
        let mut w = XmlWriter::new().unwrap();
        ItemMasterTemplate
            .write_request_data(&mut w, &refs, &ctx())
            .unwrap();
        let doc = w.into_string();

        assert_eq!(doc.matches("<UNIT ").count(), 2);
        assert_eq!(doc.matches("<STOCKGROUP ").count(), 2);
        assert_eq!(doc.matches("<STOCKITEM ").count(), 3);
    }

    #[test]
    fn blank_group_defaults_to_primary() {
        let rows = [item_row(21, "Widget", "Nos", "")];
        let refs: Vec<&ValidatedRow> = rows.iter().collect();
        let mut w = XmlWriter::new().unwrap();
        ItemMasterTemplate
            .write_request_data(&mut w, &refs, &ctx())
            .unwrap();
        let doc = w.into_string();

        assert!(doc.contains("<STOCKGROUP NAME=\"Primary\""));
        assert!(doc.contains("<PARENT>Primary</PARENT>"));
    }

    #[test]
    fn hsn_code_lands_in_gst_details() {
        let rows = [item_row(21, "Widget", "Nos", "Components")];
        let refs: Vec<&ValidatedRow> = rows.iter().collect();
        let mut w = XmlWriter::new().unwrap();
        ItemMasterTemplate
            .write_request_data(&mut w, &refs, &ctx())
            .unwrap();
        let doc = w.into_string();

        assert!(doc.contains("<HSNCODE>8471</HSNCODE>"));
        assert!(doc.contains("<APPLICABLEFROM>20170701</APPLICABLEFROM>"));
    }
}

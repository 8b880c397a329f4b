use std::sync::Arc;

use crate::error::Result;
use crate::pipeline::validator::ValidatedRow;
use crate::pipeline::xml::XmlWriter;
use crate::registry::{ColumnSpec, ConversionProfile, CsvLayout, FragmentTemplate, RenderContext};

use super::{record_guid, write_flags, write_language_name, write_placeholders};

/// Chart-of-accounts exports import as account GROUP masters. Unlike the
/// voucher exports these files carry no report preamble.
pub struct ChartOfAccountsTemplate;

impl FragmentTemplate for ChartOfAccountsTemplate {
    fn write_request_data(
        &self,
        w: &mut XmlWriter,
        rows: &[&ValidatedRow],
        _ctx: &RenderContext,
    ) -> Result<()> {
        for (seq, row) in rows.iter().enumerate() {
            let name = row.field("Account Name");
            let guid = record_guid("Chart of Accounts", row.line(), name);

            w.start_element_with_attrs("TALLYMESSAGE", &[("xmlns:UDF", "TallyUDF")])?;
            w.start_element_with_attrs("GROUP", &[("NAME", name), ("RESERVEDNAME", name)])?;
            w.text_element("GUID", &guid)?;

            // Top-level accounts carry a tab placeholder rather than an
            // empty PARENT, which the importer treats as "no parent".
            let parent = row.field("Parent Account");
            if parent.is_empty() {
                w.text_element("PARENT", "\t")?;
            } else {
                w.text_element("PARENT", parent)?;
            }

            w.text_element("GRPDEBITPARENT", "")?;
            w.text_element("GRPCREDITPARENT", "")?;
            write_flags(w, GROUP_FLAGS)?;
            w.text_element("SORTPOSITION", "30")?;
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
            write_language_name(w, name)?;
            w.end_element("GROUP")?;
            w.end_element("TALLYMESSAGE")?;
        }
        Ok(())
    }
}

pub fn profile() -> ConversionProfile {
    ConversionProfile {
        type_name: "Chart of Accounts",
        report_name: "All Masters",
        layout: CsvLayout::plain(),
        columns: vec![
            ColumnSpec::text("Account Name", true),
            ColumnSpec::text("Parent Account", false),
            ColumnSpec::text("Is Group", false),
        ],
        dedup_column: None,
        template: Arc::new(ChartOfAccountsTemplate),
    }
}

const GROUP_FLAGS: &[(&str, &str)] = &[
    ("ISBILLWISEON", "No"),
    ("ISCOSTCENTRESON", "No"),
    ("ISADDABLE", "No"),
    ("ISUPDATINGTARGETID", "No"),
    ("ASORIGINAL", "Yes"),
    ("ISSUBLEDGER", "No"),
    ("ISREVENUE", "No"),
    ("AFFECTSGROSSPROFIT", "No"),
    ("ISDEEMEDPOSITIVE", "No"),
    ("TRACKNEGATIVEBALANCES", "No"),
    ("ISCONDENSED", "No"),
    ("AFFECTSSTOCK", "No"),
    ("ISGROUPFORLOANRCPT", "No"),
    ("ISGROUPFORLOANPYMNT", "No"),
    ("ISRATEINCLUSIVEVAT", "No"),
    ("ISINVDETAILSENABLE", "No"),
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

    fn account_row(line: usize, name: &str, parent: &str) -> ValidatedRow {
        ValidatedRow {
            raw: RawRow {
                line,
                values: vec![
                    ("Account Name".to_string(), name.to_string()),
                    ("Parent Account".to_string(), parent.to_string()),
                    ("Is Group".to_string(), "1".to_string()),
                ],
                column_count_mismatch: false,
            },
            issues: Vec::new(),
            valid: true,
        }
    }

    #[test]
    fn writes_an_account_group() {
        let row = account_row(2, "Current Assets", "Assets");
        let mut w = XmlWriter::new().unwrap();
        ChartOfAccountsTemplate
            .write_request_data(&mut w, &[&row], &ctx())
            .unwrap();
        let doc = w.into_string();

        assert!(doc.contains("<GROUP NAME=\"Current Assets\" RESERVEDNAME=\"Current Assets\">"));
        assert!(doc.contains("<PARENT>Assets</PARENT>"));
        assert!(doc.contains("<SORTPOSITION>30</SORTPOSITION>"));
    }

    #[test]
    fn blank_parent_becomes_a_tab_placeholder() {
        let row = account_row(2, "Assets", "");
        let mut w = XmlWriter::new().unwrap();
        ChartOfAccountsTemplate
            .write_request_data(&mut w, &[&row], &ctx())
            .unwrap();
        let doc = w.into_string();

        assert!(doc.contains("<PARENT>\t</PARENT>"));
    }
}

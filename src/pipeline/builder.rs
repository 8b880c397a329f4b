use tracing::debug;

use crate::error::Result;
use crate::pipeline::validator::ValidatedRow;
use crate::pipeline::xml::XmlWriter;
use crate::registry::{ConversionProfile, RenderContext};

/// Assembles the Tally import envelope around the profile's record
/// fragments. Only valid rows are rendered; output is deterministic for a
/// given row sequence and profile.
pub struct XmlBuilder<'a> {
    profile: &'a ConversionProfile,
    company: &'a str,
}

impl<'a> XmlBuilder<'a> {
    pub fn new(profile: &'a ConversionProfile, company: &'a str) -> Self {
        Self { profile, company }
    }

    pub fn build(&self, rows: &[ValidatedRow]) -> Result<String> {
        let valid: Vec<&ValidatedRow> = rows.iter().filter(|row| row.valid).collect();
        debug!(
            "XmlBuilder: building document type={} valid_rows={}",
            self.profile.type_name,
            valid.len()
        );

        let mut w = XmlWriter::new()?;
        w.start_element("ENVELOPE")?;

        w.start_element("HEADER")?;
        w.text_element("TALLYREQUEST", "Import Data")?;
        w.end_element("HEADER")?;

        w.start_element("BODY")?;
        w.start_element("IMPORTDATA")?;

        w.start_element("REQUESTDESC")?;
        w.text_element("REPORTNAME", self.profile.report_name)?;
        w.start_element("STATICVARIABLES")?;
        w.text_element("SVCURRENTCOMPANY", self.company)?;
        w.end_element("STATICVARIABLES")?;
        w.end_element("REQUESTDESC")?;

        w.start_element("REQUESTDATA")?;
        let ctx = RenderContext {
            company: self.company,
        };
        self.profile.template.write_request_data(&mut w, &valid, &ctx)?;
        w.end_element("REQUESTDATA")?;

        w.end_element("IMPORTDATA")?;
        w.end_element("BODY")?;
        w.end_element("ENVELOPE")?;

        Ok(w.into_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::profiles;

    #[test]
    fn empty_batch_yields_an_envelope_only_document() {
        let profile = profiles::customer::profile();
        let doc = XmlBuilder::new(&profile, "Techsolvo").build(&[]).unwrap();

        assert!(doc.starts_with("<?xml version=\"1.0\" encoding=\"utf-8\"?>"));
        assert!(doc.contains("<TALLYREQUEST>Import Data</TALLYREQUEST>"));
        assert!(doc.contains("<REPORTNAME>All Masters</REPORTNAME>"));
        assert!(doc.contains("<SVCURRENTCOMPANY>Techsolvo</SVCURRENTCOMPANY>"));
        assert!(!doc.contains("TALLYMESSAGE"));
    }

    #[test]
    fn voucher_profiles_use_the_vouchers_report() {
        let profile = profiles::sales_order::profile();
        let doc = XmlBuilder::new(&profile, "Techsolvo").build(&[]).unwrap();
        assert!(doc.contains("<REPORTNAME>Vouchers</REPORTNAME>"));
    }

    #[test]
    fn company_name_is_escaped() {
        let profile = profiles::customer::profile();
        let doc = XmlBuilder::new(&profile, "Shah & Sons").build(&[]).unwrap();
        assert!(doc.contains("<SVCURRENTCOMPANY>Shah &amp; Sons</SVCURRENTCOMPANY>"));
    }
}

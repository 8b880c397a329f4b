use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::error::Result;

/// Thin wrapper over a quick-xml writer that produces the indented,
/// escaped documents Tally's importer accepts.
pub struct XmlWriter {
    inner: Writer<Vec<u8>>,
}

impl XmlWriter {
    pub fn new() -> Result<Self> {
        let mut inner = Writer::new_with_indent(Vec::new(), b' ', 2);
        inner.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;
        Ok(Self { inner })
    }

    pub fn start_element(&mut self, name: &str) -> Result<()> {
        self.inner.write_event(Event::Start(BytesStart::new(name)))?;
        Ok(())
    }

    pub fn start_element_with_attrs(&mut self, name: &str, attrs: &[(&str, &str)]) -> Result<()> {
        let mut start = BytesStart::new(name);
        for (key, value) in attrs {
            start.push_attribute((*key, *value));
        }
        self.inner.write_event(Event::Start(start))?;
        Ok(())
    }

    pub fn end_element(&mut self, name: &str) -> Result<()> {
        self.inner.write_event(Event::End(BytesEnd::new(name)))?;
        Ok(())
    }

    /// Writes `<name>text</name>` with reserved characters escaped.
    pub fn text_element(&mut self, name: &str, text: &str) -> Result<()> {
        self.start_element(name)?;
        self.write_text(text)?;
        self.end_element(name)
    }

    pub fn text_element_with_attrs(
        &mut self,
        name: &str,
        attrs: &[(&str, &str)],
        text: &str,
    ) -> Result<()> {
        self.start_element_with_attrs(name, attrs)?;
        self.write_text(text)?;
        self.end_element(name)
    }

    /// Tally import files carry unused `*.LIST` elements as whitespace-only
    /// placeholders rather than self-closing tags.
    pub fn placeholder_element(&mut self, name: &str) -> Result<()> {
        self.text_element(name, "      ")
    }

    fn write_text(&mut self, text: &str) -> Result<()> {
        self.inner.write_event(Event::Text(BytesText::new(text)))?;
        Ok(())
    }

    pub fn into_string(self) -> String {
        let bytes = self.inner.into_inner();
        let mut document = String::from_utf8_lossy(&bytes).into_owned();
        document.push('\n');
        document
    }
}

/// Renders a numeric amount without a trailing `.0` for whole values.
pub fn format_amount(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{:.0}", value)
    } else {
        format!("{}", value)
    }
}

use std::sync::Arc;

use quick_xml::events::Event;
use quick_xml::Reader;

use tally_export::artifact::write_artifact;
use tally_export::pipeline::validator::IssueKind;
use tally_export::{ConvertError, Converter, ProfileRegistry};

fn converter() -> Converter {
    Converter::new(Arc::new(ProfileRegistry::with_builtins()), "Techsolvo")
}

/// Builds a file shaped like an ERPNext report export: 15 preamble lines,
/// the header, 4 filler lines, then the data rows.
fn erpnext_export(header: &str, rows: &[&str]) -> Vec<u8> {
    let mut content = String::new();
    for i in 0..15 {
        content.push_str(&format!("Report line {}\n", i));
    }
    content.push_str(header);
    content.push('\n');
    for i in 0..4 {
        content.push_str(&format!("Filler {}\n", i));
    }
    for row in rows {
        content.push_str(row);
        content.push('\n');
    }
    content.into_bytes()
}

/// Collects the text content of every `<element>` in the document.
fn element_texts(xml: &str, element: &str) -> Vec<String> {
    let mut reader = Reader::from_str(xml);
    let mut texts = Vec::new();
    let mut inside = false;
    loop {
        match reader.read_event().unwrap() {
            Event::Start(start) if start.name().as_ref() == element.as_bytes() => inside = true,
            Event::Text(text) if inside => texts.push(text.unescape().unwrap().into_owned()),
            Event::End(end) if end.name().as_ref() == element.as_bytes() => inside = false,
            Event::Eof => break,
            _ => {}
        }
    }
    texts
}

#[test]
fn customer_with_a_missing_name_converts_the_rest() {
    let csv = erpnext_export(
        "customer_name,email_id,mobile_no",
        &[
            "Acme Traders,info@acme.in,9000000001",
            ",missing@name.in,9000000002",
            "Zenith Metals,sales@zenith.in,9000000003",
        ],
    );

    let result = converter().convert("Customer", &csv).unwrap();

    assert_eq!(result.rows_total, 3);
    assert_eq!(result.rows_valid, 2);
    assert_eq!(result.rows_skipped, 1);

    assert_eq!(result.diagnostics.len(), 1);
    let diagnostic = &result.diagnostics[0];
    // Preamble (15) + header + filler (4) put data on lines 21..; row 2 is line 22.
    assert_eq!(diagnostic.line, 22);
    assert_eq!(diagnostic.column.as_deref(), Some("customer_name"));
    assert_eq!(diagnostic.kind, IssueKind::MissingField);

    // Only the two valid customers appear in the document.
    let names = element_texts(&result.xml, "MAILINGNAME");
    assert_eq!(names, vec!["Acme Traders", "Zenith Metals"]);
}

#[test]
fn unknown_type_fails_with_unsupported_type() {
    let err = converter()
        .convert("Unknown", b"a,b\n1,2\n")
        .unwrap_err();
    assert!(matches!(err, ConvertError::UnsupportedType(_)));
}

#[test]
fn header_only_file_yields_an_envelope_only_document() {
    let csv = erpnext_export("customer_name,email_id,mobile_no", &[]);
    let result = converter().convert("Customer", &csv).unwrap();

    assert_eq!(result.rows_total, 0);
    assert_eq!(result.rows_valid, 0);
    assert_eq!(result.rows_skipped, 0);
    assert!(result.xml.contains("<ENVELOPE>"));
    assert!(result.xml.contains("<REQUESTDATA>"));
    assert!(!result.xml.contains("TALLYMESSAGE"));
}

#[test]
fn converting_the_same_input_twice_is_byte_identical() {
    let csv = erpnext_export(
        "customer_name,email_id,mobile_no",
        &["Acme Traders,info@acme.in,9000000001"],
    );

    let first = converter().convert("Customer", &csv).unwrap();
    let second = converter().convert("Customer", &csv).unwrap();
    assert_eq!(first.xml, second.xml);
}

#[test]
fn field_values_round_trip_through_escaping() {
    let csv = erpnext_export(
        "customer_name,email_id,mobile_no",
        &["\"Shah & Sons <Exports>\",info@shah.in,9000000001"],
    );

    let result = converter().convert("Customer", &csv).unwrap();

    // Raw text must be escaped in the document...
    assert!(!result.xml.contains("Shah & Sons <Exports>"));
    // ...and unescape back to the source value exactly.
    let names = element_texts(&result.xml, "MAILINGNAME");
    assert_eq!(names, vec!["Shah & Sons <Exports>"]);
    let emails = element_texts(&result.xml, "EMAIL");
    assert_eq!(emails, vec!["info@shah.in"]);
}

#[test]
fn sales_orders_dedupe_and_report_the_duplicate() {
    let csv = erpnext_export(
        "name,customer_name,transaction_date,item_name,rate,total,stock_qty,amount",
        &[
            "SAL-ORD-001,Acme,05-08-2025,Widget,100,500,5,500",
            "SAL-ORD-002,Zenith,05-08-2025,Widget,100,200,2,200",
            "sal-ord-001,Acme,05-08-2025,Widget,100,500,5,500",
        ],
    );

    let result = converter().convert("Sales Order", &csv).unwrap();

    assert_eq!(result.rows_total, 3);
    assert_eq!(result.rows_valid, 2);
    assert_eq!(result.rows_skipped, 1);
    assert!(result
        .diagnostics
        .iter()
        .any(|d| d.kind == IssueKind::DuplicateRow && d.line == 23));

    let references = element_texts(&result.xml, "REFERENCE");
    assert_eq!(references, vec!["SAL-ORD-001", "SAL-ORD-002"]);
}

#[test]
fn journal_continuation_lines_share_one_voucher() {
    let csv = erpnext_export(
        "name,party,party_type,posting_date,debit_in_account_currency,credit_in_account_currency",
        &[
            "JV-001,Acme Traders,Customer,01-04-2025,1500,0",
            ",Sales Account,Account,,0,1500",
        ],
    );

    let result = converter().convert("Journal Entry", &csv).unwrap();

    assert_eq!(result.rows_valid, 2);
    assert_eq!(result.xml.matches("<VOUCHER ").count(), 1);
    assert_eq!(result.xml.matches("<ALLLEDGERENTRIES.LIST>").count(), 2);
}

#[test]
fn malformed_file_fails_whole_request() {
    let err = converter().convert("Customer", b"").unwrap_err();
    assert!(matches!(err, ConvertError::MalformedFile(_)));
}

#[test]
fn bad_amounts_are_row_level_not_fatal() {
    let csv = erpnext_export(
        "party_name,posting_date,payment_order,paid_to,received_amount,total_taxes_and_charges",
        &[
            "Acme,15-03-2025,PAY-001,HDFC Bank,1400,100",
            "Zenith,15-03-2025,PAY-002,HDFC Bank,not-a-number,0",
        ],
    );

    let result = converter().convert("Payment Entry", &csv).unwrap();

    assert_eq!(result.rows_valid, 1);
    assert_eq!(result.rows_skipped, 1);
    assert!(result
        .diagnostics
        .iter()
        .any(|d| d.kind == IssueKind::TypeMismatch
            && d.column.as_deref() == Some("received_amount")));
    assert!(result.xml.contains("<AMOUNT>1500</AMOUNT>"));
}

#[test]
fn artifact_lands_on_disk_with_a_content_hash_name() {
    let csv = erpnext_export(
        "customer_name,email_id,mobile_no",
        &["Acme Traders,info@acme.in,9000000001"],
    );
    let result = converter().convert("Customer", &csv).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let artifact = write_artifact(dir.path(), &result).unwrap();

    assert!(artifact.file_name.starts_with("customer_output_"));
    let written = std::fs::read_to_string(&artifact.file_path).unwrap();
    assert_eq!(written, result.xml);

    // The suggested download name comes from the registry table.
    assert_eq!(result.suggested_filename, "Customer_Output.xml");
}

use pretty_assertions::assert_eq;
use refdoc_core::{split_remarks, EntryFields, EntryKind, EntryRecord, NO_EXAMPLE};
use serde_json::json;

#[test]
fn compose_builds_title_and_sentinel_example() {
    let record = EntryRecord::compose(EntryKind::Function, "  foo(x) ", EntryFields::default())
        .expect("record");

    assert_eq!(record.title, "Function: foo(x)");
    assert_eq!(record.example, NO_EXAMPLE);
    assert!(record.remarks.is_empty());
    assert!(record.related_topics.is_empty());
}

#[test]
fn blank_heading_yields_no_record() {
    assert!(EntryRecord::compose(EntryKind::Keyword, "   ", EntryFields::default()).is_none());
}

#[test]
fn blank_example_becomes_sentinel() {
    let fields = EntryFields {
        example: Some("  \n ".to_string()),
        ..EntryFields::default()
    };
    let record = EntryRecord::compose(EntryKind::Variable, "close", fields).unwrap();
    assert_eq!(record.example, NO_EXAMPLE);
}

#[test]
fn related_topics_are_deduped_in_order() {
    let fields = EntryFields {
        related_topics: vec!["ta.ema".into(), "ta.sma".into(), "ta.ema".into()],
        ..EntryFields::default()
    };
    let record = EntryRecord::compose(EntryKind::Function, "ta.rma()", fields).unwrap();
    assert_eq!(record.related_topics, vec!["ta.ema", "ta.sma"]);
}

#[test]
fn serializes_with_output_field_names() {
    let fields = EntryFields {
        description: "Simple moving average.".into(),
        type_signature: "series float".into(),
        syntax: "ta.sma(source, length) → series float".into(),
        example: Some("plot(ta.sma(close, 15))".into()),
        remarks: vec!["na values are ignored.".into()],
        related_topics: vec!["ta.ema".into()],
    };
    let record = EntryRecord::compose(EntryKind::Function, "ta.sma()", fields).unwrap();

    assert_eq!(
        serde_json::to_value(&record).unwrap(),
        json!({
            "title": "Function: ta.sma()",
            "type": "series float",
            "description": "Simple moving average.",
            "syntax": "ta.sma(source, length) → series float",
            "example": "plot(ta.sma(close, 15))",
            "remarks": ["na values are ignored."],
            "related_topics": ["ta.ema"],
        })
    );
}

#[test]
fn remarks_split_drops_blank_lines() {
    assert_eq!(
        split_remarks("Note one.\n\n   \n  Note two.  "),
        vec!["Note one.", "Note two."]
    );
    assert!(split_remarks("").is_empty());
}

use super::*;
use crate::span::{SourceSpan, Span};

#[test]
fn test_format_message_fills_placeholders() {
    let text = format_message(diagnostic_messages::INCOMPATIBLE_TYPE, &["number", "string"]);
    assert_eq!(text, "number is incompatible with string.");
}

#[test]
fn test_catalogue_lookup() {
    let unreachable = get_diagnostic_message(diagnostic_codes::UNREACHABLE_CODE)
        .expect("unreachable code is registered");
    assert_eq!(unreachable.severity, Severity::Warning);
    assert_eq!(
        get_message_template(diagnostic_codes::NOT_ITERABLE),
        Some(diagnostic_messages::NOT_ITERABLE)
    );
    assert!(get_diagnostic_message(42).is_none());
}

#[test]
fn test_diagnostic_tree_serializes_camel_case() {
    let span = SourceSpan::new("a.js", Span::new(3, 6));
    let diag = Diagnostic::error(
        "a.js",
        diagnostic_codes::INCOMPATIBLE_TYPE,
        vec![
            MessagePart::with_reference("number", span, "x as string;".to_string()),
            MessagePart::text(" is incompatible with string."),
        ],
    )
    .with_extra(ExtraInfo::leaf("In property `a`:").with_child(ExtraInfo::leaf("deeper")));

    let json = serde_json::to_value(&diag).expect("serializes");
    assert_eq!(json["severity"], "error");
    assert_eq!(json["primaryMessage"][0]["text"], "number");
    assert_eq!(json["primaryMessage"][0]["reference"]["contextLine"], "x as string;");
    assert_eq!(json["primaryMessage"][0]["reference"]["span"]["start"], 3);
    assert!(json["primaryMessage"][1].get("reference").is_none());
    assert_eq!(json["extraInfo"][0]["children"][0]["message"][0]["text"], "deeper");

    let back: Diagnostic = serde_json::from_value(json).expect("round trips");
    assert_eq!(back, diag);
    assert_eq!(diag.extra_info[0].node_count(), 2);
    assert_eq!(diag.message_text(), "number is incompatible with string.");
    assert_eq!(diag.primary_span().map(|s| s.start), Some(3));
}

#[test]
fn test_warning_constructor() {
    let diag = Diagnostic::warning("b.js", diagnostic_codes::UNREACHABLE_CODE, vec![]);
    assert!(!diag.is_error());
}

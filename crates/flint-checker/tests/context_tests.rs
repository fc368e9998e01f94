use super::*;
use std::io::Write;

#[test]
fn test_defaults() {
    let options = CheckerOptions::default();
    assert_eq!(options.mode, CheckMode::SingleModule);
    assert_eq!(options.max_subtype_depth, MAX_SUBTYPE_DEPTH);
    assert_eq!(options.max_evaluate_depth, MAX_EVALUATE_DEPTH);
    assert!(options.report_unreachable);
    assert!(options.strict_read_only);
    assert!(!options.whole_program());
}

#[test]
fn test_camel_case_fields() {
    let options = CheckerOptions::from_json_str(
        r#"{ "mode": "wholeProgram", "maxSubtypeDepth": 12, "reportUnreachable": false }"#,
    )
    .expect("valid options");
    assert_eq!(options.mode, CheckMode::WholeProgram);
    assert_eq!(options.max_subtype_depth, 12);
    assert_eq!(options.max_evaluate_depth, MAX_EVALUATE_DEPTH);
    assert!(!options.report_unreachable);
    assert!(options.whole_program());
}

#[test]
fn test_empty_object_is_default() {
    let options = CheckerOptions::from_json_str("{}").expect("valid options");
    assert_eq!(options, CheckerOptions::default());
}

#[test]
fn test_unknown_mode_rejected() {
    let err = CheckerOptions::from_json_str(r#"{ "mode": "everything" }"#).unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));
}

#[test]
fn test_zero_limit_rejected() {
    let err = CheckerOptions::from_json_str(r#"{ "maxEvaluateDepth": 0 }"#).unwrap_err();
    assert!(matches!(err, ConfigError::ZeroLimit("maxEvaluateDepth")));
    assert_eq!(
        err.to_string(),
        "invalid checker configuration: maxEvaluateDepth must be at least 1"
    );
}

#[test]
fn test_load_from_file() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    write!(file, r#"{{ "strictReadOnly": false }}"#).expect("write config");
    let options = CheckerOptions::load(file.path()).expect("load config");
    assert!(!options.strict_read_only);
    assert!(options.report_unreachable);
}

#[test]
fn test_load_missing_file() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("flint.json");
    let err = CheckerOptions::load(&path).unwrap_err();
    assert!(matches!(err, ConfigError::Io { .. }));
    assert!(err.to_string().contains("flint.json"));
}

#[test]
fn test_with_mode() {
    let options = CheckerOptions::default().with_mode(CheckMode::WholeProgram);
    assert!(options.whole_program());
    let json = serde_json::to_string(&options).expect("serialize");
    assert!(json.contains(r#""mode":"wholeProgram""#));
}

//! Tests for logging initialization

use classgraph::core::logging::{init_logging, LogFormat};
use std::str::FromStr;

#[test]
fn test_log_format_parsing() {
    assert_eq!(LogFormat::from_str("compact").unwrap(), LogFormat::Compact);
    assert_eq!(LogFormat::from_str("Pretty").unwrap(), LogFormat::Pretty);
    assert_eq!(LogFormat::from_str("json").unwrap(), LogFormat::Json);
    assert!(LogFormat::from_str("xml").is_err());
}

#[test]
fn test_init_logging_with_levels() {
    // Only the first call can install the global subscriber; the rest must not panic
    let _ = init_logging(Some("debug"), Some("compact"));
    let _ = init_logging(Some("classgraph::model=trace"), Some("compact"));
    let _ = init_logging(Some("off"), Some("json"));
    let _ = init_logging(None, None);
}

#[test]
fn test_init_logging_invalid_format() {
    let result = init_logging(Some("info"), Some("yaml"));
    assert!(result.is_err());
}

#[test]
fn test_pipeline_runs_under_subscriber() {
    let _ = init_logging(Some("trace"), Some("compact"));
    let mut options = classgraph::DiagramOptions::default();
    options.diagram.diagram_type = classgraph::DiagramType::Debug;
    let output = classgraph::render_snapshot_with(
        r#"{"application": "Logged", "libraries": ["rails"],
            "classes": [{"name": "Post", "has_storage": true, "fields": [{"name": "id", "type": "integer"}]}]}"#,
        options,
    )
    .unwrap();
    assert!(output.contains("Post"));
}

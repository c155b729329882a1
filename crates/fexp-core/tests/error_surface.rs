use fexp_core::errors::{ErrorInfo, FexpError};

fn sample_info(code: &str, message: &str) -> ErrorInfo {
    ErrorInfo::new(code, message)
        .with_context("n", 10)
        .with_context("m", 12)
}

#[test]
fn invalid_argument_surface() {
    let err = FexpError::InvalidArgument(sample_info("treated_count", "m exceeds n"));
    assert_eq!(err.info().code, "treated_count");
    assert!(err.info().context.contains_key("n"));
    assert!(err.is_invalid_argument());
}

#[test]
fn serde_error_surface() {
    let err = FexpError::Serde(sample_info("yaml_deserialize", "bad plan"));
    assert_eq!(err.info().code, "yaml_deserialize");
    assert!(!err.is_invalid_argument());
}

#[test]
fn display_includes_context_and_hint() {
    let err = FexpError::InvalidArgument(
        sample_info("treated_count", "m exceeds n").with_hint("lower m"),
    );
    let rendered = err.to_string();
    assert!(rendered.starts_with("invalid argument: m exceeds n (code: treated_count)"));
    assert!(rendered.contains("m=12, n=10"));
    assert!(rendered.ends_with("hint: lower m"));
}

#[test]
fn errors_round_trip_json() {
    let err = FexpError::invalid("probability_boundary", "p must be inside (0, 1)");
    let json = serde_json::to_string(&err).expect("serialize");
    assert!(json.contains("\"family\":\"InvalidArgument\""));
    let decoded: FexpError = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(decoded, err);
}

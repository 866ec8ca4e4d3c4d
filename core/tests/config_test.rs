use std::path::Path;

use herald_core::{CenterConfig, FailurePolicy, HeraldError, Result};

#[test]
fn empty_toml_keeps_defaults() -> Result<()> {
    let cfg = CenterConfig::from_toml_str("")?;
    assert_eq!(cfg, CenterConfig::default());
    Ok(())
}

#[test]
fn toml_overlays_every_field() -> Result<()> {
    let cfg = CenterConfig::from_toml_str(
        r#"
        label = "ui"
        failure_policy = "log_and_continue"
        warn_unobserved = true
        "#,
    )?;
    assert_eq!(cfg.label, "ui");
    assert_eq!(cfg.failure_policy, FailurePolicy::LogAndContinue);
    assert!(cfg.warn_unobserved);
    Ok(())
}

#[test]
fn unknown_policy_and_fields_are_rejected() {
    let err = CenterConfig::from_toml_str(r#"failure_policy = "retry""#).unwrap_err();
    assert!(matches!(err, HeraldError::Config(_)));

    let err = CenterConfig::from_toml_str(r#"queue_depth = 4"#).unwrap_err();
    assert!(matches!(err, HeraldError::Config(_)));
}

#[test]
fn policy_parses_from_env_style_strings() -> Result<()> {
    assert_eq!("propagate".parse::<FailurePolicy>()?, FailurePolicy::Propagate);
    assert_eq!(" LOG ".parse::<FailurePolicy>()?, FailurePolicy::LogAndContinue);
    assert!("sometimes".parse::<FailurePolicy>().is_err());
    Ok(())
}

#[test]
fn missing_file_is_io_error() {
    let err = CenterConfig::from_file(Path::new("/nonexistent/herald.toml")).unwrap_err();
    assert!(matches!(err, HeraldError::Io(_)));
}

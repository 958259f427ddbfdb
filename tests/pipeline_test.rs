//! End-to-end tests driving the session pipeline through the public API.

use polars::prelude::*;
use tabclean::{
    apply_operation, run_script, ArithOp, CustomColumnSpec, OpError, QueryScriptEngine, Section,
    Session,
};

fn session_with(df: DataFrame) -> Session {
    let mut session = Session::new();
    session.load(df);
    session
}

#[test]
fn test_replace_negative_then_mean() {
    let df = df!("age" => [Some(25.0f64), Some(-5.0), None, Some(40.0)]).unwrap();
    let mut session = session_with(df);

    let report = apply_operation(
        &mut session,
        Section::Cleaning,
        "Replacing Values",
        "Replace Negative with NaN",
        true,
        None,
    )
    .unwrap();
    assert!(!report.display);

    let age = session.df.column("age").unwrap();
    assert_eq!(age.null_count(), 2);
    let mean = age.as_materialized_series().mean().unwrap();
    assert!((mean - 32.5).abs() < 1e-9);
}

#[test]
fn test_log_transform_new_column_leaves_source_untouched() {
    let df = df!("x" => [2.0f64, 3.0, 4.0]).unwrap();
    let mut session = session_with(df);

    apply_operation(
        &mut session,
        Section::Transform,
        "Mathematical Transformations",
        "Log Transform",
        false,
        None,
    )
    .unwrap();

    let x = session.df.column("x").unwrap();
    assert_eq!(
        x.as_materialized_series().f64().unwrap().get(0),
        Some(2.0)
    );
    let log_x = session.df.column("log_x").unwrap();
    let first = log_x.as_materialized_series().f64().unwrap().get(0).unwrap();
    assert!((first - 3.0f64.ln()).abs() < 1e-12);
}

#[test]
fn test_scaling_without_numeric_columns_warns_and_keeps_data() {
    let df = df!("label" => ["a", "b", "c"]).unwrap();
    let mut session = session_with(df);
    let before = session.df.clone();

    let report = apply_operation(
        &mut session,
        Section::Transform,
        "Feature Scaling",
        "Min-Max Scaling",
        true,
        None,
    )
    .unwrap();

    assert!(report
        .warnings
        .iter()
        .any(|w| w.contains("No numeric columns found for scaling")));
    assert!(session.df.equals_missing(&before));
}

#[test]
fn test_custom_column_rejects_non_numeric_operand() {
    let df = df!(
        "a" => [1.0f64, 2.0],
        "b" => ["x", "y"]
    )
    .unwrap();
    let mut session = session_with(df);
    let before = session.df.clone();

    let spec = CustomColumnSpec {
        left: "a".to_string(),
        right: "b".to_string(),
        op: ArithOp::Add,
        name: "sum".to_string(),
    };
    let err = apply_operation(
        &mut session,
        Section::Transform,
        "Create a New Column",
        "Create Custom Column",
        true,
        Some(spec),
    )
    .unwrap_err();

    assert!(matches!(err, OpError::NonNumericColumn(_)));
    // Failed operations never commit.
    assert!(session.df.equals_missing(&before));
}

#[test]
fn test_custom_column_arithmetic() {
    let df = df!(
        "a" => [1.0f64, 2.0],
        "b" => [10.0f64, 20.0]
    )
    .unwrap();
    let mut session = session_with(df);

    let spec = CustomColumnSpec {
        left: "a".to_string(),
        right: "b".to_string(),
        op: ArithOp::Mul,
        name: "product".to_string(),
    };
    apply_operation(
        &mut session,
        Section::Transform,
        "Create a New Column",
        "Create Custom Column",
        true,
        Some(spec),
    )
    .unwrap();

    let product = session.df.column("product").unwrap();
    assert_eq!(
        product.as_materialized_series().f64().unwrap().get(1),
        Some(40.0)
    );
}

#[test]
fn test_display_operation_does_not_mutate() {
    let df = df!("v" => [Some(1.0f64), None, Some(3.0)]).unwrap();
    let mut session = session_with(df);
    let before = session.df.clone();

    let report = apply_operation(
        &mut session,
        Section::Cleaning,
        "Handling Missing Values",
        "Show Missing Values",
        true,
        None,
    )
    .unwrap();

    assert!(report.display);
    assert!(session.df.equals_missing(&before));
    let shown = session.last_result.as_ref().unwrap();
    assert_eq!(shown.height(), 3);
    let flags = shown.column("v").unwrap().as_materialized_series().clone();
    assert_eq!(flags.str().unwrap().get(1), Some("true"));
}

#[test]
fn test_loading_normalizes_types_and_tokens() {
    let df = df!(
        "count" => [1i64, 2, 3],
        "flag" => [Some(true), Some(false), None],
        "note" => [Some("ok"), Some("nan"), None]
    )
    .unwrap();
    let session = session_with(df);

    assert_eq!(session.df.column("count").unwrap().dtype(), &DataType::Float64);

    let flag = session.df.column("flag").unwrap();
    assert_eq!(flag.dtype(), &DataType::String);
    assert_eq!(flag.as_materialized_series().str().unwrap().get(2), Some("Unknown"));

    let note = session.df.column("note").unwrap().as_materialized_series().clone();
    let ca = note.str().unwrap();
    assert_eq!(ca.get(1), Some(""));
    assert_eq!(ca.get(2), Some(""));
}

#[test]
fn test_drop_all_missing_shrinks_rows() {
    let df = df!(
        "a" => [Some(1.0f64), None, Some(3.0)],
        "b" => [Some("x"), Some("y"), None]
    )
    .unwrap();
    let mut session = session_with(df);

    let report = apply_operation(
        &mut session,
        Section::Cleaning,
        "Removing Missing Values",
        "Drop All Missing",
        true,
        None,
    )
    .unwrap();

    assert!(report.shape_changed());
    assert_eq!(session.df.height(), 1);
}

#[test]
fn test_failed_script_leaves_dataset_untouched() {
    let df = df!("a" => [1.0f64, 2.0]).unwrap();
    let mut session = session_with(df);
    let before = session.df.clone();
    let engine = QueryScriptEngine;

    let err = run_script(&mut session, &engine, "explode everything").unwrap_err();
    assert!(matches!(err, OpError::Script(_)));
    assert!(session.df.equals_missing(&before));
}

#[test]
fn test_script_filters_and_commits() {
    let df = df!(
        "name" => ["ann", "bob"],
        "age" => [25.0f64, 35.0]
    )
    .unwrap();
    let mut session = session_with(df);
    let engine = QueryScriptEngine;

    let report = run_script(&mut session, &engine, "where age > 30 | select name").unwrap();
    assert_eq!(report.shape_after, (1, 1));
    assert_eq!(session.df.height(), 1);
}

#[test]
fn test_unknown_group_is_a_typed_error() {
    let df = df!("a" => [1.0f64]).unwrap();
    let mut session = session_with(df);
    let err = apply_operation(
        &mut session,
        Section::Cleaning,
        "Mising Values",
        "Show Missing Values",
        true,
        None,
    )
    .unwrap_err();
    assert!(matches!(err, OpError::UnknownGroup(_)));
}

#[test]
fn test_selection_restricts_scope() {
    let df = df!(
        "keep" => [Some(1.0f64), None],
        "other" => [Some(2.0f64), None]
    )
    .unwrap();
    let mut session = session_with(df);
    session.selection = vec!["keep".to_string()];

    apply_operation(
        &mut session,
        Section::Cleaning,
        "Filling Missing Values",
        "Fill with 0",
        true,
        None,
    )
    .unwrap();

    assert_eq!(session.df.column("keep").unwrap().null_count(), 0);
    assert_eq!(session.df.column("other").unwrap().null_count(), 1);
}

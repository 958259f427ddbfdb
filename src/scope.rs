//! Column scope resolution.
//!
//! Decides which columns an operation applies to. A non-empty explicit
//! selection always wins; otherwise the default depends on the kind of
//! operation. Names are not validated here — a stale selection fails at
//! apply time with a column-not-found error.

use polars::prelude::*;

/// Default column set an operation falls back to when the user made no
/// explicit selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    /// All numeric columns (scaling, math transforms).
    Numeric,
    /// All free-form text columns (string cleaning).
    Text,
    /// Every column (type fixes, renames, fills).
    All,
    /// Operation is table-wide and ignores column scope.
    Table,
}

pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

pub fn is_text_dtype(dtype: &DataType) -> bool {
    matches!(dtype, DataType::String)
}

/// Compute the effective column set for one operation invocation.
pub fn resolve(df: &DataFrame, explicit: &[String], kind: ScopeKind) -> Vec<String> {
    if !explicit.is_empty() {
        return explicit.to_vec();
    }
    match kind {
        ScopeKind::Numeric => columns_where(df, is_numeric_dtype),
        ScopeKind::Text => columns_where(df, is_text_dtype),
        ScopeKind::All => df
            .get_column_names()
            .iter()
            .map(|n| n.to_string())
            .collect(),
        ScopeKind::Table => Vec::new(),
    }
}

fn columns_where(df: &DataFrame, pred: fn(&DataType) -> bool) -> Vec<String> {
    df.get_columns()
        .iter()
        .filter(|c| pred(c.dtype()))
        .map(|c| c.name().to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> DataFrame {
        df!(
            "age" => [25i64, 30, 35],
            "name" => ["a", "b", "c"],
            "score" => [1.0f64, 2.0, 3.0]
        )
        .unwrap()
    }

    #[test]
    fn test_explicit_selection_wins() {
        let df = sample();
        let explicit = vec!["name".to_string()];
        // explicit selection is authoritative regardless of operation kind
        assert_eq!(resolve(&df, &explicit, ScopeKind::Numeric), explicit);
        assert_eq!(resolve(&df, &explicit, ScopeKind::Table), explicit);
    }

    #[test]
    fn test_numeric_default() {
        let df = sample();
        assert_eq!(resolve(&df, &[], ScopeKind::Numeric), vec!["age", "score"]);
    }

    #[test]
    fn test_text_default() {
        let df = sample();
        assert_eq!(resolve(&df, &[], ScopeKind::Text), vec!["name"]);
    }

    #[test]
    fn test_all_and_table_defaults() {
        let df = sample();
        assert_eq!(
            resolve(&df, &[], ScopeKind::All),
            vec!["age", "name", "score"]
        );
        assert!(resolve(&df, &[], ScopeKind::Table).is_empty());
    }

    #[test]
    fn test_stale_names_not_validated() {
        let df = sample();
        let stale = vec!["gone".to_string()];
        assert_eq!(resolve(&df, &stale, ScopeKind::All), stale);
    }
}

//! Dataset operations, grouped the way the menu pages present them.
//!
//! Every operation is a pure function of `(&DataFrame, &OpContext)`: it
//! never mutates its input and returns a fresh frame plus any per-column
//! warnings it accumulated along the way.

pub mod cleaning;
pub mod transform;

use polars::prelude::*;

use crate::error::{OpError, OpResult};

/// Result of one operation: the produced frame and non-fatal warnings
/// (skipped columns, empty scopes).
#[derive(Debug)]
pub struct OpOutcome {
    pub df: DataFrame,
    pub warnings: Vec<String>,
}

impl OpOutcome {
    pub fn done(df: DataFrame) -> Self {
        Self {
            df,
            warnings: Vec::new(),
        }
    }

    pub fn with_warnings(df: DataFrame, warnings: Vec<String>) -> Self {
        Self { df, warnings }
    }
}

/// Everything an operation needs beyond the table itself, passed
/// explicitly at call time rather than captured from ambient state.
#[derive(Debug, Clone, Default)]
pub struct OpContext {
    /// Effective column scope (already resolved).
    pub scope: Vec<String>,
    /// When false, results land in new columns instead of overwriting.
    pub inplace: bool,
    /// Parameters for the custom column operation.
    pub custom: Option<CustomColumnSpec>,
}

/// Parameters for "Create Custom Column": binary arithmetic between two
/// numeric columns.
#[derive(Debug, Clone)]
pub struct CustomColumnSpec {
    pub left: String,
    pub right: String,
    pub op: ArithOp,
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithOp {
    Add,
    Sub,
    Mul,
    Div,
}

impl ArithOp {
    pub const ALL: [Self; 4] = [Self::Add, Self::Sub, Self::Mul, Self::Div];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
        }
    }

    pub fn apply(self, a: f64, b: f64) -> f64 {
        match self {
            Self::Add => a + b,
            Self::Sub => a - b,
            Self::Mul => a * b,
            Self::Div => a / b,
        }
    }
}

/// Fail with a column-not-found error if any scoped name is absent.
pub(crate) fn require_columns(df: &DataFrame, names: &[String]) -> OpResult<()> {
    for name in names {
        df.column(name)
            .map_err(|_| OpError::ColumnNotFound(name.clone()))?;
    }
    Ok(())
}

/// Values of a numeric series as optional floats. Integer widths are cast
/// up; a non-numeric series yields an empty vector.
pub(crate) fn numeric_values(series: &Series) -> Vec<Option<f64>> {
    match series.cast(&DataType::Float64) {
        Ok(cast) => match cast.f64() {
            Ok(ca) => ca.iter().collect(),
            Err(_) => Vec::new(),
        },
        Err(_) => Vec::new(),
    }
}

/// Per-cell string rendering; nulls stay `None`.
pub(crate) fn stringify(series: &Series) -> Vec<Option<String>> {
    (0..series.len())
        .map(|i| match series.get(i) {
            Ok(AnyValue::Null) | Err(_) => None,
            Ok(av) => Some(av.str_value().to_string()),
        })
        .collect()
}

/// Replace a column (or append it if absent) on a working copy.
pub(crate) fn set_column(df: &mut DataFrame, series: Series) -> OpResult<()> {
    df.with_column(series)?;
    Ok(())
}

/// Keep rows where `mask` is true.
pub(crate) fn filter_rows(df: &DataFrame, mask: Vec<bool>) -> OpResult<DataFrame> {
    let ca = BooleanChunked::new("mask".into(), mask);
    Ok(df.filter(&ca)?)
}

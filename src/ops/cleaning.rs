//! Cleaning operations: missing values, duplicates, renames, dtype fixes,
//! string cleanup and value replacement.

use std::collections::HashMap;

use polars::prelude::*;

use super::{filter_rows, numeric_values, require_columns, set_column, stringify, OpContext, OpOutcome};
use crate::error::OpResult;
use crate::scope::is_numeric_dtype;

/// "Show Missing Values": boolean view of which scoped cells are missing.
pub fn show_missing(df: &DataFrame, ctx: &OpContext) -> OpResult<OpOutcome> {
    require_columns(df, &ctx.scope)?;
    let mut columns = Vec::with_capacity(ctx.scope.len());
    for name in &ctx.scope {
        let series = df.column(name)?.as_materialized_series();
        columns.push(series.is_null().into_series().into_column());
    }
    Ok(OpOutcome::done(DataFrame::new(columns)?))
}

/// "Show Non-Missing": boolean view of which scoped cells are present.
pub fn show_non_missing(df: &DataFrame, ctx: &OpContext) -> OpResult<OpOutcome> {
    require_columns(df, &ctx.scope)?;
    let mut columns = Vec::with_capacity(ctx.scope.len());
    for name in &ctx.scope {
        let series = df.column(name)?.as_materialized_series();
        columns.push(series.is_not_null().into_series().into_column());
    }
    Ok(OpOutcome::done(DataFrame::new(columns)?))
}

/// "Count Missing Values": per scoped column, the number of missing cells.
pub fn count_missing(df: &DataFrame, ctx: &OpContext) -> OpResult<OpOutcome> {
    require_columns(df, &ctx.scope)?;
    missing_count_frame(df, &ctx.scope)
}

/// "Show Missing Values by Column": missing counts for every column,
/// regardless of selection.
pub fn missing_by_column(df: &DataFrame, _ctx: &OpContext) -> OpResult<OpOutcome> {
    let all: Vec<String> = df.get_column_names().iter().map(|n| n.to_string()).collect();
    missing_count_frame(df, &all)
}

fn missing_count_frame(df: &DataFrame, names: &[String]) -> OpResult<OpOutcome> {
    let mut counts: Vec<u32> = Vec::with_capacity(names.len());
    for name in names {
        counts.push(df.column(name)?.null_count() as u32);
    }
    let labels: Vec<String> = names.to_vec();
    let out = DataFrame::new(vec![
        Series::new("Column".into(), labels).into_column(),
        Series::new("Missing_Count".into(), counts).into_column(),
    ])?;
    Ok(OpOutcome::done(out))
}

/// "Drop All Missing": remove rows containing at least one missing cell.
pub fn drop_any_missing(df: &DataFrame, _ctx: &OpContext) -> OpResult<OpOutcome> {
    let mask = df
        .get_columns()
        .iter()
        .map(|c| c.as_materialized_series().is_not_null())
        .reduce(|a, b| &a & &b);
    match mask {
        Some(mask) => Ok(OpOutcome::done(df.filter(&mask)?)),
        None => Ok(OpOutcome::done(df.clone())),
    }
}

/// "Drop All-Missing Rows": remove rows where every cell is missing.
pub fn drop_all_missing_rows(df: &DataFrame, _ctx: &OpContext) -> OpResult<OpOutcome> {
    let mask = df
        .get_columns()
        .iter()
        .map(|c| c.as_materialized_series().is_not_null())
        .reduce(|a, b| &a | &b);
    match mask {
        Some(mask) => Ok(OpOutcome::done(df.filter(&mask)?)),
        None => Ok(OpOutcome::done(df.clone())),
    }
}

/// "Drop Empty Columns": remove columns where every cell is missing.
pub fn drop_empty_columns(df: &DataFrame, _ctx: &OpContext) -> OpResult<OpOutcome> {
    let height = df.height();
    let kept: Vec<Column> = df
        .get_columns()
        .iter()
        .filter(|c| height == 0 || c.null_count() < height)
        .cloned()
        .collect();
    Ok(OpOutcome::done(DataFrame::new(kept)?))
}

/// "Fill with 0": numeric nulls become 0, text nulls become "0".
pub fn fill_zero(df: &DataFrame, ctx: &OpContext) -> OpResult<OpOutcome> {
    require_columns(df, &ctx.scope)?;
    let mut out = df.clone();
    for name in &ctx.scope {
        let series = df.column(name)?.as_materialized_series().clone();
        if is_numeric_dtype(series.dtype()) {
            let values: Vec<f64> = numeric_values(&series)
                .into_iter()
                .map(|v| v.unwrap_or(0.0))
                .collect();
            set_column(&mut out, Series::new(series.name().clone(), values))?;
        } else if matches!(series.dtype(), DataType::String) {
            let values: Vec<String> = stringify(&series)
                .into_iter()
                .map(|v| v.unwrap_or_else(|| "0".to_string()))
                .collect();
            set_column(&mut out, Series::new(series.name().clone(), values))?;
        }
    }
    Ok(OpOutcome::done(out))
}

/// "Forward Fill" / "Backward Fill".
pub fn fill_directional(df: &DataFrame, ctx: &OpContext, forward: bool) -> OpResult<OpOutcome> {
    require_columns(df, &ctx.scope)?;
    let strategy = if forward {
        FillNullStrategy::Forward(None)
    } else {
        FillNullStrategy::Backward(None)
    };
    let mut out = df.clone();
    for name in &ctx.scope {
        let series = df.column(name)?.as_materialized_series();
        set_column(&mut out, series.fill_null(strategy)?)?;
    }
    Ok(OpOutcome::done(out))
}

/// "Fill with Mean": per numeric scoped column, replace missing cells with
/// the column mean computed before filling.
pub fn fill_mean(df: &DataFrame, ctx: &OpContext) -> OpResult<OpOutcome> {
    require_columns(df, &ctx.scope)?;
    let mut out = df.clone();
    for name in &ctx.scope {
        let series = df.column(name)?.as_materialized_series();
        if !is_numeric_dtype(series.dtype()) {
            continue;
        }
        let Some(mean) = series.mean() else {
            continue; // all-null column, nothing to fill with
        };
        let values: Vec<f64> = numeric_values(series)
            .into_iter()
            .map(|v| v.unwrap_or(mean))
            .collect();
        set_column(&mut out, Series::new(series.name().clone(), values))?;
    }
    Ok(OpOutcome::done(out))
}

/// "Fill with 'Unknown'": columns that contain nulls are coerced to text
/// with nulls rendered as "Unknown".
pub fn fill_unknown(df: &DataFrame, ctx: &OpContext) -> OpResult<OpOutcome> {
    require_columns(df, &ctx.scope)?;
    let mut out = df.clone();
    for name in &ctx.scope {
        let series = df.column(name)?.as_materialized_series();
        if series.null_count() == 0 {
            continue;
        }
        let values: Vec<String> = stringify(series)
            .into_iter()
            .map(|v| v.unwrap_or_else(|| "Unknown".to_string()))
            .collect();
        set_column(&mut out, Series::new(series.name().clone(), values))?;
    }
    Ok(OpOutcome::done(out))
}

// Rows hash to a joined string key; cheap and dtype-agnostic.
fn row_keys(df: &DataFrame) -> Vec<String> {
    let rendered: Vec<Vec<Option<String>>> = df
        .get_columns()
        .iter()
        .map(|c| stringify(c.as_materialized_series()))
        .collect();
    (0..df.height())
        .map(|row| {
            rendered
                .iter()
                .map(|col| col[row].as_deref().unwrap_or("\u{0}"))
                .collect::<Vec<_>>()
                .join("\u{1}")
        })
        .collect()
}

fn first_occurrence_mask(df: &DataFrame) -> Vec<bool> {
    let mut seen: HashMap<String, ()> = HashMap::new();
    row_keys(df)
        .into_iter()
        .map(|key| seen.insert(key, ()).is_none())
        .collect()
}

/// "Show Duplicates": rows that repeat an earlier row.
pub fn show_duplicates(df: &DataFrame, _ctx: &OpContext) -> OpResult<OpOutcome> {
    let mask: Vec<bool> = first_occurrence_mask(df).into_iter().map(|b| !b).collect();
    Ok(OpOutcome::done(filter_rows(df, mask)?))
}

/// "Remove Duplicates": keep the first occurrence of each row.
pub fn remove_duplicates(df: &DataFrame, _ctx: &OpContext) -> OpResult<OpOutcome> {
    let mask = first_occurrence_mask(df);
    Ok(OpOutcome::done(filter_rows(df, mask)?))
}

/// "View Current Column Names".
pub fn view_column_names(df: &DataFrame, _ctx: &OpContext) -> OpResult<OpOutcome> {
    let names: Vec<String> = df.get_column_names().iter().map(|n| n.to_string()).collect();
    let out = DataFrame::new(vec![Series::new("Column_Names".into(), names).into_column()])?;
    Ok(OpOutcome::done(out))
}

fn rename_all(df: &DataFrame, f: fn(&str) -> String) -> OpResult<DataFrame> {
    let mut columns = Vec::with_capacity(df.width());
    for col in df.get_columns() {
        let mut series = col.as_materialized_series().clone();
        let renamed = f(series.name().as_str());
        series.rename(renamed.into());
        columns.push(series.into_column());
    }
    Ok(DataFrame::new(columns)?)
}

/// "Lowercase Column Names".
pub fn lowercase_columns(df: &DataFrame, _ctx: &OpContext) -> OpResult<OpOutcome> {
    Ok(OpOutcome::done(rename_all(df, |n| n.to_lowercase())?))
}

/// "Remove Spaces from Columns": spaces become underscores.
pub fn despace_columns(df: &DataFrame, _ctx: &OpContext) -> OpResult<OpOutcome> {
    Ok(OpOutcome::done(rename_all(df, |n| n.replace(' ', "_"))?))
}

/// "Auto-Fix Numeric Types": text columns whose every present value parses
/// as a number are converted to floats; anything else is left alone.
pub fn auto_fix_numeric(df: &DataFrame, ctx: &OpContext) -> OpResult<OpOutcome> {
    require_columns(df, &ctx.scope)?;
    let mut out = df.clone();
    for name in &ctx.scope {
        let series = df.column(name)?.as_materialized_series();
        if !matches!(series.dtype(), DataType::String) {
            continue;
        }
        let present = series.len() - series.null_count();
        if present == 0 {
            continue;
        }
        let cast = series.cast(&DataType::Float64)?;
        if cast.null_count() == series.null_count() {
            set_column(&mut out, cast)?;
        }
    }
    Ok(OpOutcome::done(out))
}

/// "View Data Types".
pub fn view_dtypes(df: &DataFrame, _ctx: &OpContext) -> OpResult<OpOutcome> {
    let names: Vec<String> = df.get_column_names().iter().map(|n| n.to_string()).collect();
    let dtypes: Vec<String> = df
        .get_columns()
        .iter()
        .map(|c| c.dtype().to_string())
        .collect();
    let out = DataFrame::new(vec![
        Series::new("Column".into(), names).into_column(),
        Series::new("Data_Type".into(), dtypes).into_column(),
    ])?;
    Ok(OpOutcome::done(out))
}

#[derive(Debug, Clone, Copy)]
pub enum CaseOp {
    Lower,
    Upper,
    Strip,
}

/// String cleaning: scoped columns are rendered as text and transformed.
pub fn string_case(df: &DataFrame, ctx: &OpContext, op: CaseOp) -> OpResult<OpOutcome> {
    require_columns(df, &ctx.scope)?;
    let mut out = df.clone();
    for name in &ctx.scope {
        let series = df.column(name)?.as_materialized_series();
        let values: Vec<Option<String>> = stringify(series)
            .into_iter()
            .map(|v| {
                v.map(|text| match op {
                    CaseOp::Lower => text.to_lowercase(),
                    CaseOp::Upper => text.to_uppercase(),
                    CaseOp::Strip => text.trim().to_string(),
                })
            })
            .collect();
        set_column(&mut out, Series::new(series.name().clone(), values))?;
    }
    Ok(OpOutcome::done(out))
}

/// "View Unique Values": per-column unique value counts.
pub fn view_unique_counts(df: &DataFrame, _ctx: &OpContext) -> OpResult<OpOutcome> {
    let mut lines: Vec<String> = Vec::with_capacity(df.width());
    for col in df.get_columns() {
        let series = col.as_materialized_series();
        let unique = series.n_unique()?;
        lines.push(format!("{}: {} unique", series.name(), unique));
    }
    let out = DataFrame::new(vec![Series::new("Unique_Counts".into(), lines).into_column()])?;
    Ok(OpOutcome::done(out))
}

/// Value replacement used by "Replace Zero with NaN" and
/// "Replace Negative with NaN": offending numeric cells become missing.
pub fn replace_with_missing(
    df: &DataFrame,
    ctx: &OpContext,
    victim: fn(f64) -> bool,
) -> OpResult<OpOutcome> {
    require_columns(df, &ctx.scope)?;
    let mut out = df.clone();
    for name in &ctx.scope {
        let series = df.column(name)?.as_materialized_series();
        if !is_numeric_dtype(series.dtype()) {
            continue;
        }
        let values: Vec<Option<f64>> = numeric_values(series)
            .into_iter()
            .map(|v| v.filter(|x| !victim(*x)))
            .collect();
        set_column(&mut out, Series::new(series.name().clone(), values))?;
    }
    Ok(OpOutcome::done(out))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx_all(df: &DataFrame) -> OpContext {
        OpContext {
            scope: df.get_column_names().iter().map(|n| n.to_string()).collect(),
            inplace: true,
            custom: None,
        }
    }

    #[test]
    fn test_duplicates_keep_first_occurrence() {
        let df = df!(
            "a" => [1.0f64, 2.0, 1.0, 2.0, 3.0],
            "b" => ["x", "y", "x", "z", "y"]
        )
        .unwrap();
        let ctx = ctx_all(&df);

        let dupes = show_duplicates(&df, &ctx).unwrap().df;
        assert_eq!(dupes.height(), 1); // only row 2 repeats row 0

        let deduped = remove_duplicates(&df, &ctx).unwrap().df;
        assert_eq!(deduped.height(), 4);
    }

    #[test]
    fn test_nulls_participate_in_duplicate_keys() {
        let df = df!("a" => [None::<f64>, None, Some(1.0)]).unwrap();
        let ctx = ctx_all(&df);
        let deduped = remove_duplicates(&df, &ctx).unwrap().df;
        assert_eq!(deduped.height(), 2);
    }

    #[test]
    fn test_fill_mean_only_touches_numeric() {
        let df = df!(
            "n" => [Some(1.0f64), None, Some(3.0)],
            "t" => [Some("a"), None, Some("c")]
        )
        .unwrap();
        let ctx = ctx_all(&df);
        let out = fill_mean(&df, &ctx).unwrap().df;
        let filled = out.column("n").unwrap().as_materialized_series().clone();
        assert_eq!(filled.f64().unwrap().get(1), Some(2.0));
        assert_eq!(out.column("t").unwrap().null_count(), 1);
    }

    #[test]
    fn test_auto_fix_numeric_rejects_partial_parses() {
        let df = df!(
            "good" => ["1", "2.5", "3"],
            "bad" => ["1", "two", "3"]
        )
        .unwrap();
        let ctx = ctx_all(&df);
        let out = auto_fix_numeric(&df, &ctx).unwrap().df;
        assert_eq!(out.column("good").unwrap().dtype(), &DataType::Float64);
        assert_eq!(out.column("bad").unwrap().dtype(), &DataType::String);
    }

    #[test]
    fn test_despace_columns() {
        let df = df!("First Name" => ["a"]).unwrap();
        let out = despace_columns(&df, &ctx_all(&df)).unwrap().df;
        assert!(out.column("First_Name").is_ok());
    }

    #[test]
    fn test_missing_column_in_scope_is_typed_error() {
        let df = df!("a" => [1.0f64]).unwrap();
        let ctx = OpContext {
            scope: vec!["gone".to_string()],
            inplace: true,
            custom: None,
        };
        let err = fill_zero(&df, &ctx).unwrap_err();
        assert!(matches!(err, crate::error::OpError::ColumnNotFound(_)));
    }
}

//! Transformation operations: math transforms, scaling, encoding,
//! binning, datetime handling and column arithmetic.

use chrono::{NaiveDate, NaiveDateTime};
use polars::prelude::*;

use super::{
    numeric_values, require_columns, set_column, stringify, OpContext, OpOutcome,
};
use crate::error::{OpError, OpResult};
use crate::scope::is_numeric_dtype;

#[derive(Debug, Clone, Copy)]
pub enum MathOp {
    Log,
    Sqrt,
    Square,
}

impl MathOp {
    fn token(self) -> &'static str {
        match self {
            Self::Log => "log",
            Self::Sqrt => "sqrt",
            Self::Square => "square",
        }
    }
}

/// Bulk math transform over scoped numeric columns. A column that cannot
/// be transformed is skipped with a warning; the rest still go through.
pub fn math_transform(df: &DataFrame, ctx: &OpContext, op: MathOp) -> OpResult<OpOutcome> {
    require_columns(df, &ctx.scope)?;
    let mut out = df.clone();
    let mut warnings = Vec::new();
    for name in &ctx.scope {
        let series = df.column(name)?.as_materialized_series();
        if !is_numeric_dtype(series.dtype()) {
            warnings.push(format!("Failed to transform column '{name}': not numeric"));
            continue;
        }
        let values = numeric_values(series);
        if matches!(op, MathOp::Log) && values.iter().flatten().any(|v| v + 1.0 <= 0.0) {
            warnings.push(format!(
                "Failed to transform column '{name}': log undefined for values <= -1"
            ));
            continue;
        }
        let transformed: Vec<Option<f64>> = values
            .into_iter()
            .map(|v| {
                v.map(|x| match op {
                    MathOp::Log => (x + 1.0).ln(),
                    MathOp::Sqrt => x.abs().sqrt(),
                    MathOp::Square => x * x,
                })
            })
            .collect();
        let target = if ctx.inplace {
            name.clone()
        } else {
            format!("{}_{}", op.token(), name)
        };
        set_column(&mut out, Series::new(target.into(), transformed))?;
    }
    Ok(OpOutcome::with_warnings(out, warnings))
}

#[derive(Debug, Clone, Copy)]
pub enum ScaleMethod {
    MinMax,
    Standard,
}

impl ScaleMethod {
    fn token(self) -> &'static str {
        match self {
            Self::MinMax => "minmax",
            Self::Standard => "standard",
        }
    }
}

/// Feature scaling over scoped numeric columns. An empty numeric scope is
/// a warning, not an error.
pub fn scale(df: &DataFrame, ctx: &OpContext, method: ScaleMethod) -> OpResult<OpOutcome> {
    require_columns(df, &ctx.scope)?;
    let mut warnings = Vec::new();
    let numeric: Vec<&String> = ctx
        .scope
        .iter()
        .filter(|name| {
            let ok = df
                .column(name)
                .map(|c| is_numeric_dtype(c.dtype()))
                .unwrap_or(false);
            if !ok {
                warnings.push(format!("Skipping non-numeric column '{name}'"));
            }
            ok
        })
        .collect();

    if numeric.is_empty() {
        warnings.push("No numeric columns found for scaling".to_string());
        return Ok(OpOutcome::with_warnings(df.clone(), warnings));
    }

    let mut out = df.clone();
    for name in numeric {
        let series = df.column(name)?.as_materialized_series();
        let values = numeric_values(series);
        let present: Vec<f64> = values.iter().flatten().copied().collect();
        if present.is_empty() {
            warnings.push(format!("Skipping all-missing column '{name}'"));
            continue;
        }
        let scaled: Vec<Option<f64>> = match method {
            ScaleMethod::MinMax => {
                let min = present.iter().copied().fold(f64::INFINITY, f64::min);
                let max = present.iter().copied().fold(f64::NEG_INFINITY, f64::max);
                let range = max - min;
                values
                    .into_iter()
                    .map(|v| v.map(|x| if range == 0.0 { 0.0 } else { (x - min) / range }))
                    .collect()
            }
            ScaleMethod::Standard => {
                let mean = present.iter().sum::<f64>() / present.len() as f64;
                let var = present.iter().map(|v| (v - mean).powi(2)).sum::<f64>()
                    / present.len() as f64;
                let std = var.sqrt();
                values
                    .into_iter()
                    .map(|v| v.map(|x| if std == 0.0 { 0.0 } else { (x - mean) / std }))
                    .collect()
            }
        };
        let target = if ctx.inplace {
            name.clone()
        } else {
            format!("{}_scaled_{}", method.token(), name)
        };
        set_column(&mut out, Series::new(target.into(), scaled))?;
    }
    Ok(OpOutcome::with_warnings(out, warnings))
}

/// "Label Encoding": scoped text columns become integer codes assigned in
/// lexicographic order of the distinct values; missing cells become -1.
pub fn label_encode(df: &DataFrame, ctx: &OpContext) -> OpResult<OpOutcome> {
    require_columns(df, &ctx.scope)?;
    let mut out = df.clone();
    for name in &ctx.scope {
        let series = df.column(name)?.as_materialized_series();
        if !matches!(series.dtype(), DataType::String) {
            continue;
        }
        let rendered = stringify(series);
        let mut categories: Vec<&str> = rendered.iter().flatten().map(String::as_str).collect();
        categories.sort_unstable();
        categories.dedup();
        let codes: Vec<i32> = rendered
            .iter()
            .map(|v| match v {
                Some(text) => categories
                    .binary_search(&text.as_str())
                    .map(|i| i as i32)
                    .unwrap_or(-1),
                None => -1,
            })
            .collect();
        set_column(&mut out, Series::new(series.name().clone(), codes))?;
    }
    Ok(OpOutcome::done(out))
}

/// "One-Hot Encoding": every column is expanded into boolean indicator
/// columns named `{column}_{value}`.
pub fn one_hot(df: &DataFrame, _ctx: &OpContext) -> OpResult<OpOutcome> {
    let mut columns: Vec<Column> = Vec::new();
    for col in df.get_columns() {
        let series = col.as_materialized_series();
        let rendered = stringify(series);
        let mut values: Vec<&str> = Vec::new();
        for v in rendered.iter().flatten() {
            if !values.contains(&v.as_str()) {
                values.push(v.as_str());
            }
        }
        for value in values {
            let indicators: Vec<bool> = rendered
                .iter()
                .map(|v| v.as_deref() == Some(value))
                .collect();
            let name = format!("{}_{}", series.name(), value);
            columns.push(Series::new(name.into(), indicators).into_column());
        }
    }
    Ok(OpOutcome::done(DataFrame::new(columns)?))
}

const WIDTH_LABELS: [&str; 5] = ["Very Low", "Low", "Medium", "High", "Very High"];
const QUANTILE_LABELS: [&str; 4] = ["Q1", "Q2", "Q3", "Q4"];

/// "Equal-Width Binning": every numeric column becomes one of five ordinal
/// labels spanning its value range.
pub fn equal_width_bin(df: &DataFrame, _ctx: &OpContext) -> OpResult<OpOutcome> {
    bin_numeric(df, |values, present| {
        let min = present.iter().copied().fold(f64::INFINITY, f64::min);
        let max = present.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let width = (max - min) / WIDTH_LABELS.len() as f64;
        values
            .iter()
            .map(|v| {
                v.map(|x| {
                    let idx = if width == 0.0 {
                        0
                    } else {
                        (((x - min) / width) as usize).min(WIDTH_LABELS.len() - 1)
                    };
                    WIDTH_LABELS[idx].to_string()
                })
            })
            .collect()
    })
}

/// "Quantile Binning": every numeric column becomes one of four quartile
/// labels.
pub fn quantile_bin(df: &DataFrame, _ctx: &OpContext) -> OpResult<OpOutcome> {
    bin_numeric(df, |values, present| {
        let mut sorted = present.to_vec();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        let edge = |q: f64| {
            let idx = (q * (sorted.len() - 1) as f64).round() as usize;
            sorted[idx.min(sorted.len() - 1)]
        };
        let (q1, q2, q3) = (edge(0.25), edge(0.5), edge(0.75));
        values
            .iter()
            .map(|v| {
                v.map(|x| {
                    let idx = if x <= q1 {
                        0
                    } else if x <= q2 {
                        1
                    } else if x <= q3 {
                        2
                    } else {
                        3
                    };
                    QUANTILE_LABELS[idx].to_string()
                })
            })
            .collect()
    })
}

fn bin_numeric(
    df: &DataFrame,
    binner: fn(&[Option<f64>], &[f64]) -> Vec<Option<String>>,
) -> OpResult<OpOutcome> {
    let mut out = df.clone();
    for col in df.get_columns() {
        let series = col.as_materialized_series();
        if !is_numeric_dtype(series.dtype()) {
            continue;
        }
        let values = numeric_values(series);
        let present: Vec<f64> = values.iter().flatten().copied().collect();
        let labels: Vec<Option<String>> = if present.is_empty() {
            vec![None; values.len()]
        } else {
            binner(&values, &present)
        };
        set_column(&mut out, Series::new(series.name().clone(), labels))?;
    }
    Ok(OpOutcome::done(out))
}

const DATETIME_FORMATS: [&str; 3] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
];
const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d-%m-%Y"];

fn parse_timestamp(text: &str) -> Option<NaiveDateTime> {
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, fmt) {
            return Some(dt);
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(text, fmt) {
            return d.and_hms_opt(0, 0, 0);
        }
    }
    None
}

/// "Parse Dates": a text column whose every present value parses as a
/// timestamp becomes a naive datetime column; others are left alone.
pub fn parse_dates(df: &DataFrame, _ctx: &OpContext) -> OpResult<OpOutcome> {
    let mut out = df.clone();
    for col in df.get_columns() {
        let series = col.as_materialized_series();
        if !matches!(series.dtype(), DataType::String) {
            continue;
        }
        let rendered = stringify(series);
        let parsed: Vec<Option<NaiveDateTime>> = rendered
            .iter()
            .map(|v| v.as_deref().and_then(parse_timestamp))
            .collect();
        let present = rendered.iter().flatten().count();
        if present == 0 || parsed.iter().flatten().count() != present {
            continue;
        }
        let micros: Vec<Option<i64>> = parsed
            .into_iter()
            .map(|v| v.map(|dt| dt.and_utc().timestamp_micros()))
            .collect();
        let stamped = Series::new(series.name().clone(), micros)
            .cast(&DataType::Datetime(TimeUnit::Microseconds, None))?;
        set_column(&mut out, stamped)?;
    }
    Ok(OpOutcome::done(out))
}

fn temporal_datetimes(series: &Series) -> OpResult<Option<Vec<Option<NaiveDateTime>>>> {
    match series.dtype() {
        DataType::Datetime(unit, _) => {
            let unit = *unit;
            let physical = series.cast(&DataType::Int64)?;
            let values: Vec<Option<NaiveDateTime>> = physical
                .i64()?
                .iter()
                .map(|v| {
                    v.and_then(|raw| {
                        let micros = match unit {
                            TimeUnit::Nanoseconds => raw / 1_000,
                            TimeUnit::Microseconds => raw,
                            TimeUnit::Milliseconds => raw * 1_000,
                        };
                        chrono::DateTime::from_timestamp_micros(micros)
                            .map(|dt| dt.naive_utc())
                    })
                })
                .collect();
            Ok(Some(values))
        }
        DataType::Date => {
            let physical = series.cast(&DataType::Int32)?;
            let epoch = NaiveDate::from_ymd_opt(1970, 1, 1);
            let values: Vec<Option<NaiveDateTime>> = physical
                .i32()?
                .iter()
                .map(|v| {
                    v.and_then(|days| {
                        epoch
                            .and_then(|e| e.checked_add_signed(chrono::Duration::days(days as i64)))
                            .and_then(|d| d.and_hms_opt(0, 0, 0))
                    })
                })
                .collect();
            Ok(Some(values))
        }
        _ => Ok(None),
    }
}

/// "Extract Date Components": adds `{col}_year`, `{col}_month` and
/// `{col}_day` for every temporal column.
pub fn extract_date_components(df: &DataFrame, _ctx: &OpContext) -> OpResult<OpOutcome> {
    use chrono::Datelike;
    let mut out = df.clone();
    for col in df.get_columns() {
        let series = col.as_materialized_series();
        let Some(values) = temporal_datetimes(series)? else {
            continue;
        };
        let years: Vec<Option<i32>> = values.iter().map(|v| v.map(|d| d.year())).collect();
        let months: Vec<Option<i32>> = values.iter().map(|v| v.map(|d| d.month() as i32)).collect();
        let days: Vec<Option<i32>> = values.iter().map(|v| v.map(|d| d.day() as i32)).collect();
        let name = series.name();
        set_column(&mut out, Series::new(format!("{name}_year").into(), years))?;
        set_column(&mut out, Series::new(format!("{name}_month").into(), months))?;
        set_column(&mut out, Series::new(format!("{name}_day").into(), days))?;
    }
    Ok(OpOutcome::done(out))
}

/// "Add Row Index": prepend an `index` column counting from zero.
pub fn add_row_index(df: &DataFrame, _ctx: &OpContext) -> OpResult<OpOutcome> {
    let indices: Vec<u32> = (0..df.height() as u32).collect();
    let mut columns = vec![Series::new("index".into(), indices).into_column()];
    columns.extend(df.get_columns().iter().cloned());
    Ok(OpOutcome::done(DataFrame::new(columns)?))
}

/// "Remove Index": drop a previously added `index` column.
pub fn remove_index(df: &DataFrame, _ctx: &OpContext) -> OpResult<OpOutcome> {
    if df.column("index").is_err() {
        return Ok(OpOutcome::with_warnings(
            df.clone(),
            vec!["No 'index' column to remove".to_string()],
        ));
    }
    Ok(OpOutcome::done(df.drop("index")?))
}

/// "Convert String Integers to Int": per scoped column; a column that does
/// not fully convert is skipped with a warning.
pub fn convert_string_ints(df: &DataFrame, ctx: &OpContext) -> OpResult<OpOutcome> {
    require_columns(df, &ctx.scope)?;
    let mut out = df.clone();
    let mut warnings = Vec::new();
    for name in &ctx.scope {
        let series = df.column(name)?.as_materialized_series();
        if !matches!(series.dtype(), DataType::String) {
            continue;
        }
        let cast = series.cast(&DataType::Int64)?;
        if cast.null_count() > series.null_count() {
            warnings.push(format!("Column '{name}' could not be converted"));
            continue;
        }
        set_column(&mut out, cast)?;
    }
    Ok(OpOutcome::with_warnings(out, warnings))
}

/// "Create Custom Column": binary arithmetic between exactly two numeric
/// columns. A non-numeric operand rejects the whole call.
pub fn custom_column(df: &DataFrame, ctx: &OpContext) -> OpResult<OpOutcome> {
    let spec = ctx
        .custom
        .as_ref()
        .ok_or_else(|| OpError::Script("custom column parameters missing".to_string()))?;
    for name in [&spec.left, &spec.right] {
        let column = df
            .column(name)
            .map_err(|_| OpError::ColumnNotFound(name.clone()))?;
        if !is_numeric_dtype(column.dtype()) {
            return Err(OpError::NonNumericColumn(name.clone()));
        }
    }
    let left = numeric_values(df.column(&spec.left)?.as_materialized_series());
    let right = numeric_values(df.column(&spec.right)?.as_materialized_series());
    let values: Vec<Option<f64>> = left
        .into_iter()
        .zip(right)
        .map(|(a, b)| match (a, b) {
            (Some(a), Some(b)) => Some(spec.op.apply(a, b)),
            _ => None,
        })
        .collect();
    let mut out = df.clone();
    set_column(&mut out, Series::new(spec.name.as_str().into(), values))?;
    Ok(OpOutcome::done(out))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(scope: &[&str], inplace: bool) -> OpContext {
        OpContext {
            scope: scope.iter().map(|s| s.to_string()).collect(),
            inplace,
            custom: None,
        }
    }

    #[test]
    fn test_label_encode_lexicographic_codes() {
        let df = df!("c" => [Some("banana"), Some("apple"), None, Some("banana")]).unwrap();
        let out = label_encode(&df, &ctx(&["c"], true)).unwrap().df;
        let codes = out.column("c").unwrap().as_materialized_series().clone();
        let ca = codes.i32().unwrap();
        assert_eq!(ca.get(0), Some(1));
        assert_eq!(ca.get(1), Some(0));
        assert_eq!(ca.get(2), Some(-1));
        assert_eq!(ca.get(3), Some(1));
    }

    #[test]
    fn test_one_hot_expands_by_first_seen_order() {
        let df = df!("c" => ["b", "a", "b"]).unwrap();
        let out = one_hot(&df, &ctx(&[], true)).unwrap().df;
        let names: Vec<String> = out.get_column_names().iter().map(|n| n.to_string()).collect();
        assert_eq!(names, vec!["c_b", "c_a"]);
        let cb = out.column("c_b").unwrap().as_materialized_series().clone();
        assert_eq!(cb.bool().unwrap().get(1), Some(false));
    }

    #[test]
    fn test_equal_width_bins_cover_range() {
        let df = df!("v" => [0.0f64, 25.0, 50.0, 75.0, 100.0]).unwrap();
        let out = equal_width_bin(&df, &ctx(&[], true)).unwrap().df;
        let labels = out.column("v").unwrap().as_materialized_series().clone();
        let ca = labels.str().unwrap();
        assert_eq!(ca.get(0), Some("Very Low"));
        assert_eq!(ca.get(4), Some("Very High"));
    }

    #[test]
    fn test_quantile_bins_are_monotone() {
        let df = df!("v" => [1.0f64, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0]).unwrap();
        let out = quantile_bin(&df, &ctx(&[], true)).unwrap().df;
        let labels = out.column("v").unwrap().as_materialized_series().clone();
        let ca = labels.str().unwrap();
        assert_eq!(ca.get(0), Some("Q1"));
        assert_eq!(ca.get(7), Some("Q4"));
    }

    #[test]
    fn test_parse_dates_requires_full_column() {
        let df = df!(
            "d" => ["2024-01-15", "2024-02-20"],
            "partial" => ["2024-01-15", "not a date"]
        )
        .unwrap();
        let out = parse_dates(&df, &ctx(&[], true)).unwrap().df;
        assert!(matches!(
            out.column("d").unwrap().dtype(),
            DataType::Datetime(TimeUnit::Microseconds, None)
        ));
        assert_eq!(out.column("partial").unwrap().dtype(), &DataType::String);
    }

    #[test]
    fn test_extract_date_components() {
        let df = df!("d" => ["2024-03-15", "2023-12-01"]).unwrap();
        let parsed = parse_dates(&df, &ctx(&[], true)).unwrap().df;
        let out = extract_date_components(&parsed, &ctx(&[], true)).unwrap().df;
        let years = out.column("d_year").unwrap().as_materialized_series().clone();
        assert_eq!(years.i32().unwrap().get(0), Some(2024));
        let months = out.column("d_month").unwrap().as_materialized_series().clone();
        assert_eq!(months.i32().unwrap().get(1), Some(12));
    }

    #[test]
    fn test_index_roundtrip_and_warning() {
        let df = df!("a" => [1.0f64, 2.0]).unwrap();
        let indexed = add_row_index(&df, &ctx(&[], true)).unwrap().df;
        assert_eq!(indexed.get_column_names()[0].as_str(), "index");
        let removed = remove_index(&indexed, &ctx(&[], true)).unwrap().df;
        assert_eq!(removed.width(), 1);

        let outcome = remove_index(&df, &ctx(&[], true)).unwrap();
        assert!(!outcome.warnings.is_empty());
    }

    #[test]
    fn test_sqrt_uses_absolute_value() {
        let df = df!("v" => [-4.0f64, 9.0]).unwrap();
        let out = math_transform(&df, &ctx(&["v"], true), MathOp::Sqrt).unwrap().df;
        let v = out.column("v").unwrap().as_materialized_series().clone();
        assert_eq!(v.f64().unwrap().get(0), Some(2.0));
        assert_eq!(v.f64().unwrap().get(1), Some(3.0));
    }

    #[test]
    fn test_log_skips_column_with_undefined_values() {
        let df = df!("v" => [-5.0f64, 1.0]).unwrap();
        let outcome = math_transform(&df, &ctx(&["v"], true), MathOp::Log).unwrap();
        assert!(!outcome.warnings.is_empty());
        assert!(outcome.df.equals_missing(&df));
    }
}

//! Column type normalization.
//!
//! Every dataset committed to the session passes through [`normalize`],
//! which coerces column types the terminal renderer and exporters cannot
//! serialize into plain floats and text. The function is total: per-column
//! coercion failures degrade to a string cast or a constant placeholder
//! column, never an error.

use polars::prelude::*;

/// Tokens that stand in for missing values in free-form text columns.
const NULL_TOKENS: [&str; 6] = ["nan", "None", "<NA>", "null", "NULL", "NaN"];

fn is_integer_dtype(dtype: &DataType) -> bool {
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
    )
}

/// Coerce every column of `df` to a render-safe type.
///
/// Per column, in order: integers become `Float64`, booleans become text
/// with nulls rendered as `"Unknown"`, text columns have null-like tokens
/// and actual nulls replaced with the empty string, timezone-aware
/// datetimes are stripped to naive values, and categoricals become text.
/// A final pass force-coerces any integer or boolean column that survived
/// to text. Idempotent; empty input is returned unchanged.
pub fn normalize(df: &DataFrame) -> DataFrame {
    if df.width() == 0 || df.height() == 0 {
        return df.clone();
    }

    let mut columns: Vec<Column> = Vec::with_capacity(df.width());
    for col in df.get_columns() {
        let mut series = normalize_series(col.as_materialized_series());
        // Re-scan: anything still integer or boolean typed cannot be
        // serialized downstream, so force it to text.
        if is_integer_dtype(series.dtype()) || matches!(series.dtype(), DataType::Boolean) {
            series = string_fallback(&series);
        }
        columns.push(series.into_column());
    }

    DataFrame::new(columns).unwrap_or_else(|_| df.clone())
}

fn normalize_series(series: &Series) -> Series {
    match series.dtype() {
        dt if is_integer_dtype(dt) => match series.cast(&DataType::Float64) {
            Ok(floats) => floats,
            Err(_) => string_fallback(series),
        },
        DataType::Boolean => bool_to_text(series),
        DataType::String => scrub_text(series),
        DataType::Datetime(unit, Some(_)) => {
            let unit = *unit;
            match series.cast(&DataType::Datetime(unit, None)) {
                Ok(naive) => naive,
                Err(_) => string_fallback(series),
            }
        }
        DataType::Categorical(..) => match series.cast(&DataType::String) {
            Ok(text) => scrub_text(&text),
            Err(_) => constant_text(series, "Category"),
        },
        _ => series.clone(),
    }
}

fn bool_to_text(series: &Series) -> Series {
    match series.bool() {
        Ok(ca) => {
            let values: Vec<String> = ca
                .iter()
                .map(|v| match v {
                    Some(true) => "true".to_string(),
                    Some(false) => "false".to_string(),
                    None => "Unknown".to_string(),
                })
                .collect();
            Series::new(series.name().clone(), values)
        }
        Err(_) => string_fallback(series),
    }
}

fn scrub_text(series: &Series) -> Series {
    match series.str() {
        Ok(ca) => {
            let values: Vec<String> = ca
                .iter()
                .map(|v| match v {
                    None => String::new(),
                    Some(token) if NULL_TOKENS.contains(&token) => String::new(),
                    Some(text) => text.to_string(),
                })
                .collect();
            Series::new(series.name().clone(), values)
        }
        Err(_) => constant_text(series, "Error"),
    }
}

fn string_fallback(series: &Series) -> Series {
    match series.cast(&DataType::String) {
        Ok(text) => scrub_text(&text),
        Err(_) => constant_text(series, "Error"),
    }
}

fn constant_text(series: &Series, placeholder: &str) -> Series {
    let values: Vec<String> = vec![placeholder.to_string(); series.len()];
    Series::new(series.name().clone(), values)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frames_equal(a: &DataFrame, b: &DataFrame) -> bool {
        a.equals_missing(b)
    }

    #[test]
    fn test_integers_become_floats() {
        let df = df!("a" => [1i64, 2, 3]).unwrap();
        let out = normalize(&df);
        assert_eq!(out.column("a").unwrap().dtype(), &DataType::Float64);
    }

    #[test]
    fn test_bool_nulls_become_unknown() {
        let s = Series::new("flag".into(), [Some(true), None, Some(false)]);
        let df = DataFrame::new(vec![s.into_column()]).unwrap();
        let out = normalize(&df);
        let col = out.column("flag").unwrap();
        assert_eq!(col.dtype(), &DataType::String);
        assert_eq!(col.get(1).unwrap().str_value(), "Unknown");
        assert_eq!(col.get(0).unwrap().str_value(), "true");
    }

    #[test]
    fn test_null_tokens_scrubbed() {
        let s = Series::new(
            "t".into(),
            [Some("nan"), Some("keep"), None, Some("<NA>"), Some("NULL")],
        );
        let df = DataFrame::new(vec![s.into_column()]).unwrap();
        let out = normalize(&df);
        let col = out.column("t").unwrap();
        assert_eq!(col.get(0).unwrap().str_value(), "");
        assert_eq!(col.get(1).unwrap().str_value(), "keep");
        assert_eq!(col.get(2).unwrap().str_value(), "");
        assert_eq!(col.get(3).unwrap().str_value(), "");
        assert_eq!(col.get(4).unwrap().str_value(), "");
        assert_eq!(col.null_count(), 0);
    }

    #[test]
    fn test_idempotent() {
        let df = df!(
            "i" => [Some(1i32), None, Some(3)],
            "t" => [Some("x"), Some("None"), None],
            "f" => [1.5f64, 2.5, 3.5]
        )
        .unwrap();
        let once = normalize(&df);
        let twice = normalize(&once);
        assert!(frames_equal(&once, &twice));
    }

    #[test]
    fn test_total_on_empty_and_all_null() {
        let empty = DataFrame::empty();
        assert!(frames_equal(&normalize(&empty), &empty));

        let s = Series::new("n".into(), vec![None::<i64>; 4]);
        let df = DataFrame::new(vec![s.into_column()]).unwrap();
        let out = normalize(&df);
        assert_eq!(out.column("n").unwrap().dtype(), &DataType::Float64);
        assert_eq!(out.column("n").unwrap().null_count(), 4);
        // still idempotent on the degenerate case
        assert!(frames_equal(&normalize(&out), &out));
    }

    #[test]
    fn test_floats_pass_through() {
        let df = df!("f" => [Some(1.0f64), None, Some(2.0)]).unwrap();
        let out = normalize(&df);
        assert!(frames_equal(&out, &df));
    }
}

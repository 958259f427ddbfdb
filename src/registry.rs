//! The operation registry: a static two-level table mapping
//! `(group, operation label)` to a pure transformation function, plus the
//! group listings the menu pages are built from.
//!
//! Group lookup never panics on an unknown name; callers recover through
//! [`suggest_groups`], which offers edit-similarity based alternatives.

use polars::prelude::DataFrame;

use crate::error::OpResult;
use crate::ops::{cleaning, transform, OpContext, OpOutcome};
use crate::scope::ScopeKind;

/// Whether an operation's result replaces the session dataset or is only
/// shown as a derived view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpKind {
    Display,
    Mutating,
}

/// Which half of the catalog a group belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Cleaning,
    Transform,
}

type OpFn = fn(&DataFrame, &OpContext) -> OpResult<OpOutcome>;

pub struct OpDescriptor {
    pub label: &'static str,
    pub kind: OpKind,
    pub scope: ScopeKind,
    /// Operation honors the inplace/new-column toggle.
    pub supports_inplace: bool,
    pub run: OpFn,
}

pub struct OpGroup {
    pub name: &'static str,
    pub ops: &'static [OpDescriptor],
}

const fn display(label: &'static str, scope: ScopeKind, run: OpFn) -> OpDescriptor {
    OpDescriptor {
        label,
        kind: OpKind::Display,
        scope,
        supports_inplace: false,
        run,
    }
}

const fn mutating(label: &'static str, scope: ScopeKind, run: OpFn) -> OpDescriptor {
    OpDescriptor {
        label,
        kind: OpKind::Mutating,
        scope,
        supports_inplace: false,
        run,
    }
}

const fn inplace_capable(label: &'static str, scope: ScopeKind, run: OpFn) -> OpDescriptor {
    OpDescriptor {
        label,
        kind: OpKind::Mutating,
        scope,
        supports_inplace: true,
        run,
    }
}

// Adapters binding parameterized operation functions to the uniform
// registry signature.
fn forward_fill(df: &DataFrame, ctx: &OpContext) -> OpResult<OpOutcome> {
    cleaning::fill_directional(df, ctx, true)
}
fn backward_fill(df: &DataFrame, ctx: &OpContext) -> OpResult<OpOutcome> {
    cleaning::fill_directional(df, ctx, false)
}
fn string_lower(df: &DataFrame, ctx: &OpContext) -> OpResult<OpOutcome> {
    cleaning::string_case(df, ctx, cleaning::CaseOp::Lower)
}
fn string_upper(df: &DataFrame, ctx: &OpContext) -> OpResult<OpOutcome> {
    cleaning::string_case(df, ctx, cleaning::CaseOp::Upper)
}
fn string_strip(df: &DataFrame, ctx: &OpContext) -> OpResult<OpOutcome> {
    cleaning::string_case(df, ctx, cleaning::CaseOp::Strip)
}
fn replace_zero(df: &DataFrame, ctx: &OpContext) -> OpResult<OpOutcome> {
    cleaning::replace_with_missing(df, ctx, |v| v == 0.0)
}
fn replace_negative(df: &DataFrame, ctx: &OpContext) -> OpResult<OpOutcome> {
    cleaning::replace_with_missing(df, ctx, |v| v < 0.0)
}
fn log_transform(df: &DataFrame, ctx: &OpContext) -> OpResult<OpOutcome> {
    transform::math_transform(df, ctx, transform::MathOp::Log)
}
fn sqrt_transform(df: &DataFrame, ctx: &OpContext) -> OpResult<OpOutcome> {
    transform::math_transform(df, ctx, transform::MathOp::Sqrt)
}
fn square_transform(df: &DataFrame, ctx: &OpContext) -> OpResult<OpOutcome> {
    transform::math_transform(df, ctx, transform::MathOp::Square)
}
fn minmax_scale(df: &DataFrame, ctx: &OpContext) -> OpResult<OpOutcome> {
    transform::scale(df, ctx, transform::ScaleMethod::MinMax)
}
fn standard_scale(df: &DataFrame, ctx: &OpContext) -> OpResult<OpOutcome> {
    transform::scale(df, ctx, transform::ScaleMethod::Standard)
}

pub const CLEANING_GROUPS: &[OpGroup] = &[
    OpGroup {
        name: "Handling Missing Values",
        ops: &[
            display("Show Missing Values", ScopeKind::All, cleaning::show_missing),
            display("Count Missing Values", ScopeKind::All, cleaning::count_missing),
            display("Show Non-Missing", ScopeKind::All, cleaning::show_non_missing),
            display(
                "Show Missing Values by Column",
                ScopeKind::Table,
                cleaning::missing_by_column,
            ),
        ],
    },
    OpGroup {
        name: "Removing Missing Values",
        ops: &[
            mutating("Drop All Missing", ScopeKind::Table, cleaning::drop_any_missing),
            mutating("Drop Empty Columns", ScopeKind::Table, cleaning::drop_empty_columns),
            mutating(
                "Drop All-Missing Rows",
                ScopeKind::Table,
                cleaning::drop_all_missing_rows,
            ),
        ],
    },
    OpGroup {
        name: "Filling Missing Values",
        ops: &[
            mutating("Fill with 0", ScopeKind::All, cleaning::fill_zero),
            mutating("Forward Fill", ScopeKind::All, forward_fill),
            mutating("Backward Fill", ScopeKind::All, backward_fill),
            mutating("Fill with Mean", ScopeKind::All, cleaning::fill_mean),
            mutating("Fill with 'Unknown'", ScopeKind::All, cleaning::fill_unknown),
        ],
    },
    OpGroup {
        name: "Removing Duplicates",
        ops: &[
            display("Show Duplicates", ScopeKind::Table, cleaning::show_duplicates),
            mutating("Remove Duplicates", ScopeKind::Table, cleaning::remove_duplicates),
        ],
    },
    OpGroup {
        name: "Renaming Columns",
        ops: &[
            display(
                "View Current Column Names",
                ScopeKind::Table,
                cleaning::view_column_names,
            ),
            mutating("Lowercase Column Names", ScopeKind::Table, cleaning::lowercase_columns),
            mutating(
                "Remove Spaces from Columns",
                ScopeKind::Table,
                cleaning::despace_columns,
            ),
        ],
    },
    OpGroup {
        name: "Fixing Data Types",
        ops: &[
            mutating("Auto-Fix Numeric Types", ScopeKind::All, cleaning::auto_fix_numeric),
            display("View Data Types", ScopeKind::Table, cleaning::view_dtypes),
        ],
    },
    OpGroup {
        name: "String Cleaning",
        ops: &[
            mutating("Convert to Lowercase", ScopeKind::Text, string_lower),
            mutating("Convert to Uppercase", ScopeKind::Text, string_upper),
            mutating("Strip Whitespace", ScopeKind::Text, string_strip),
        ],
    },
    OpGroup {
        name: "Handling Categorical Data",
        ops: &[display(
            "View Unique Values",
            ScopeKind::Table,
            cleaning::view_unique_counts,
        )],
    },
    OpGroup {
        name: "Replacing Values",
        ops: &[
            mutating("Replace Zero with NaN", ScopeKind::All, replace_zero),
            mutating("Replace Negative with NaN", ScopeKind::All, replace_negative),
        ],
    },
];

pub const TRANSFORM_GROUPS: &[OpGroup] = &[
    OpGroup {
        name: "Mathematical Transformations",
        ops: &[
            inplace_capable("Log Transform", ScopeKind::Numeric, log_transform),
            inplace_capable("Square Root Transform", ScopeKind::Numeric, sqrt_transform),
            inplace_capable("Square Transform", ScopeKind::Numeric, square_transform),
        ],
    },
    OpGroup {
        name: "Feature Scaling",
        ops: &[
            inplace_capable("Min-Max Scaling", ScopeKind::Numeric, minmax_scale),
            inplace_capable("Standard Scaling (Z-score)", ScopeKind::Numeric, standard_scale),
        ],
    },
    OpGroup {
        name: "Encoding Categorical Variables",
        ops: &[
            mutating("Label Encoding", ScopeKind::Text, transform::label_encode),
            mutating("One-Hot Encoding", ScopeKind::Table, transform::one_hot),
        ],
    },
    OpGroup {
        name: "Discretization Binning",
        ops: &[
            mutating("Equal-Width Binning", ScopeKind::Table, transform::equal_width_bin),
            mutating("Quantile Binning", ScopeKind::Table, transform::quantile_bin),
        ],
    },
    OpGroup {
        name: "Datetime Transformation",
        ops: &[
            mutating("Parse Dates", ScopeKind::Table, transform::parse_dates),
            mutating(
                "Extract Date Components",
                ScopeKind::Table,
                transform::extract_date_components,
            ),
        ],
    },
    OpGroup {
        name: "Column Operations",
        ops: &[
            mutating("Add Row Index", ScopeKind::Table, transform::add_row_index),
            mutating("Remove Index", ScopeKind::Table, transform::remove_index),
        ],
    },
    OpGroup {
        name: "String Transformations",
        ops: &[
            mutating("Convert to Uppercase", ScopeKind::Text, string_upper),
            mutating("Convert to Lowercase", ScopeKind::Text, string_lower),
            mutating("Remove Whitespace", ScopeKind::Text, string_strip),
        ],
    },
    OpGroup {
        name: "Type Conversion",
        ops: &[mutating(
            "Convert String Integers to Int",
            ScopeKind::All,
            transform::convert_string_ints,
        )],
    },
    OpGroup {
        name: "Create a New Column",
        ops: &[mutating(
            "Create Custom Column",
            ScopeKind::Table,
            transform::custom_column,
        )],
    },
];

pub fn groups(section: Section) -> &'static [OpGroup] {
    match section {
        Section::Cleaning => CLEANING_GROUPS,
        Section::Transform => TRANSFORM_GROUPS,
    }
}

/// Group names for menu rendering.
pub fn group_names(section: Section) -> Vec<&'static str> {
    groups(section).iter().map(|g| g.name).collect()
}

/// Lookup a group by name. Unknown names return `None` so the caller can
/// offer suggestions instead of crashing.
pub fn group(section: Section, name: &str) -> Option<&'static OpGroup> {
    groups(section).iter().find(|g| g.name == name)
}

pub fn operation(section: Section, group_name: &str, label: &str) -> Option<&'static OpDescriptor> {
    group(section, group_name)?.ops.iter().find(|op| op.label == label)
}

const SUGGESTION_CUTOFF: f64 = 0.6;
const SUGGESTION_LIMIT: usize = 3;

fn lcs_len(a: &[char], b: &[char]) -> usize {
    let mut prev = vec![0usize; b.len() + 1];
    let mut row = vec![0usize; b.len() + 1];
    for &ca in a {
        for (j, &cb) in b.iter().enumerate() {
            row[j + 1] = if ca == cb {
                prev[j] + 1
            } else {
                prev[j + 1].max(row[j])
            };
        }
        std::mem::swap(&mut prev, &mut row);
    }
    prev[b.len()]
}

/// Similarity ratio in [0, 1] of two names, case-insensitive.
pub fn similarity(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.to_lowercase().chars().collect();
    let b: Vec<char> = b.to_lowercase().chars().collect();
    if a.is_empty() && b.is_empty() {
        return 1.0;
    }
    2.0 * lcs_len(&a, &b) as f64 / (a.len() + b.len()) as f64
}

/// Top candidate group names for an unrecognized name, best first.
pub fn suggest_groups(section: Section, name: &str) -> Vec<&'static str> {
    let mut scored: Vec<(&'static str, f64)> = groups(section)
        .iter()
        .map(|g| (g.name, similarity(name, g.name)))
        .filter(|(_, score)| *score >= SUGGESTION_CUTOFF)
        .collect();
    scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    scored
        .into_iter()
        .take(SUGGESTION_LIMIT)
        .map(|(name, _)| name)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_group_returns_none() {
        assert!(group(Section::Cleaning, "No Such Group").is_none());
        assert!(group(Section::Transform, "No Such Group").is_none());
    }

    #[test]
    fn test_typo_suggests_missing_values_group() {
        let suggestions = suggest_groups(Section::Cleaning, "Mising Values");
        assert!(suggestions.contains(&"Handling Missing Values"));
        assert!(suggestions.len() <= 3);
    }

    #[test]
    fn test_gibberish_suggests_nothing() {
        let suggestions = suggest_groups(Section::Cleaning, "zzzzqqqq");
        assert!(suggestions.is_empty());
    }

    #[test]
    fn test_similarity_bounds() {
        assert_eq!(similarity("abc", "abc"), 1.0);
        assert_eq!(similarity("abc", "xyz"), 0.0);
        assert!(similarity("Feature Scaling", "feature scalng") > 0.9);
    }

    #[test]
    fn test_display_classification() {
        let op = operation(Section::Cleaning, "Removing Duplicates", "Show Duplicates").unwrap();
        assert_eq!(op.kind, OpKind::Display);
        let op = operation(Section::Cleaning, "Removing Duplicates", "Remove Duplicates").unwrap();
        assert_eq!(op.kind, OpKind::Mutating);
    }

    #[test]
    fn test_every_group_reachable_by_name() {
        for section in [Section::Cleaning, Section::Transform] {
            for name in group_names(section) {
                assert!(group(section, name).is_some());
            }
        }
    }
}

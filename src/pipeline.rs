//! The transformation pipeline: resolves scope, runs one operation against
//! a private copy of the session dataset, normalizes the result and
//! commits it (mutating) or stashes it (display).
//!
//! Commit discipline: the session dataset changes only when the operation
//! and normalization both complete; any error leaves it untouched.

use polars::prelude::*;

use crate::error::{OpError, OpResult};
use crate::normalize::normalize;
use crate::ops::{CustomColumnSpec, OpContext};
use crate::registry::{self, OpKind, Section};
use crate::scope;
use crate::script::ScriptEngine;

/// Per-session state. Single-writer per field: the pipeline owns `df` and
/// `last_result`, navigation owns page/group, the UI owns `selection`.
pub struct Session {
    /// The committed, always-normalized working dataset.
    pub df: DataFrame,
    /// Result of the most recent display-only operation.
    pub last_result: Option<DataFrame>,
    /// Ordered column selection for the current operation group.
    pub selection: Vec<String>,
}

impl Session {
    pub fn new() -> Self {
        Self {
            df: DataFrame::empty(),
            last_result: None,
            selection: Vec::new(),
        }
    }

    /// Install a freshly loaded dataset, normalizing it on the way in.
    pub fn load(&mut self, df: DataFrame) {
        self.df = normalize(&df);
        self.last_result = None;
        self.selection.clear();
    }

    pub fn has_data(&self) -> bool {
        self.df.width() > 0
    }

    pub fn shape(&self) -> (usize, usize) {
        self.df.shape()
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

/// What the UI needs to announce after a successful apply.
#[derive(Debug)]
pub struct ApplyReport {
    pub label: String,
    pub display: bool,
    pub warnings: Vec<String>,
    pub shape_before: (usize, usize),
    pub shape_after: (usize, usize),
}

impl ApplyReport {
    pub fn shape_changed(&self) -> bool {
        self.shape_before != self.shape_after
    }
}

/// Apply one registered operation to the session.
pub fn apply_operation(
    session: &mut Session,
    section: Section,
    group: &str,
    label: &str,
    inplace: bool,
    custom: Option<CustomColumnSpec>,
) -> OpResult<ApplyReport> {
    registry::group(section, group).ok_or_else(|| OpError::UnknownGroup(group.to_string()))?;
    let descriptor = registry::operation(section, group, label)
        .ok_or_else(|| OpError::UnknownOperation(label.to_string()))?;

    let resolved = scope::resolve(&session.df, &session.selection, descriptor.scope);
    let ctx = OpContext {
        scope: resolved,
        inplace: if descriptor.supports_inplace { inplace } else { true },
        custom,
    };

    let shape_before = session.shape();
    let outcome = (descriptor.run)(&session.df, &ctx)?;
    let result = normalize(&outcome.df);
    let shape_after = result.shape();

    let display = descriptor.kind == OpKind::Display;
    if display {
        session.last_result = Some(result);
    } else {
        session.df = result;
    }

    Ok(ApplyReport {
        label: label.to_string(),
        display,
        warnings: outcome.warnings,
        shape_before,
        shape_after,
    })
}

/// Run a user script against the session dataset. The result is committed
/// only if execution succeeds; otherwise the dataset is unchanged and the
/// error text is surfaced verbatim.
pub fn run_script(
    session: &mut Session,
    engine: &dyn ScriptEngine,
    source: &str,
) -> OpResult<ApplyReport> {
    let shape_before = session.shape();
    let result = engine.execute(&session.df, source)?;
    let result = normalize(&result);
    let shape_after = result.shape();
    session.df = result;
    Ok(ApplyReport {
        label: "Run Script".to_string(),
        display: false,
        warnings: Vec::new(),
        shape_before,
        shape_after,
    })
}

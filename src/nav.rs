//! Page navigation state machine.
//!
//! Pages form a linear forward/back topology. Operation pages are guarded:
//! entering one without a selected group and a loaded dataset redirects
//! back instead of crashing, and an unknown group name yields fuzzy
//! suggestions from the registry.

use crate::registry::{self, Section};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Upload,
    CleaningMenu,
    Operation,
    TransformMenu,
    TransformOperation,
    Visualize,
}

impl Page {
    pub const ORDER: [Page; 6] = [
        Page::Upload,
        Page::CleaningMenu,
        Page::Operation,
        Page::TransformMenu,
        Page::TransformOperation,
        Page::Visualize,
    ];

    pub fn next(self) -> Option<Page> {
        let idx = Self::ORDER.iter().position(|p| *p == self)?;
        Self::ORDER.get(idx + 1).copied()
    }

    pub fn back(self) -> Option<Page> {
        let idx = Self::ORDER.iter().position(|p| *p == self)?;
        idx.checked_sub(1).map(|i| Self::ORDER[i])
    }

    pub fn title(self) -> &'static str {
        match self {
            Page::Upload => "Load Data",
            Page::CleaningMenu => "Data Cleaning",
            Page::Operation => "Cleaning Operation",
            Page::TransformMenu => "Data Transformation",
            Page::TransformOperation => "Transform Operation",
            Page::Visualize => "Review & Export",
        }
    }

    /// The catalog section an operation page draws from.
    pub fn section(self) -> Section {
        match self {
            Page::TransformMenu | Page::TransformOperation => Section::Transform,
            _ => Section::Cleaning,
        }
    }

    fn is_operation_page(self) -> bool {
        matches!(self, Page::Operation | Page::TransformOperation)
    }
}

/// Result of a navigation attempt.
#[derive(Debug, PartialEq)]
pub enum NavOutcome {
    Moved(Page),
    /// Guard failed; stay on (or fall back to) `fallback`.
    Denied {
        fallback: Page,
        reason: String,
    },
    /// The current group is unknown; offer these alternatives.
    Suggest(Vec<&'static str>),
}

#[derive(Debug)]
pub struct Nav {
    pub page: Page,
    pub group: Option<String>,
}

impl Nav {
    pub fn new() -> Self {
        Self {
            page: Page::Upload,
            group: None,
        }
    }

    /// Attempt to move to `target`, enforcing operation-page guards.
    pub fn goto(&mut self, target: Page, has_data: bool) -> NavOutcome {
        if target.is_operation_page() {
            let fallback = target.back().unwrap_or(Page::Upload);
            if !has_data {
                self.page = fallback;
                return NavOutcome::Denied {
                    fallback,
                    reason: "No dataset loaded. Load data first.".to_string(),
                };
            }
            let Some(group) = self.group.clone() else {
                self.page = fallback;
                return NavOutcome::Denied {
                    fallback,
                    reason: "No operation group selected. Pick one from the menu.".to_string(),
                };
            };
            if registry::group(target.section(), &group).is_none() {
                self.page = fallback;
                return NavOutcome::Suggest(registry::suggest_groups(target.section(), &group));
            }
        }
        self.page = target;
        NavOutcome::Moved(target)
    }

    pub fn forward(&mut self, has_data: bool) -> NavOutcome {
        match self.page.next() {
            Some(next) => self.goto(next, has_data),
            None => NavOutcome::Moved(self.page),
        }
    }

    pub fn backward(&mut self, has_data: bool) -> NavOutcome {
        match self.page.back() {
            Some(prev) => self.goto(prev, has_data),
            None => NavOutcome::Moved(self.page),
        }
    }
}

impl Default for Nav {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_topology() {
        assert_eq!(Page::Upload.next(), Some(Page::CleaningMenu));
        assert_eq!(Page::Visualize.next(), None);
        assert_eq!(Page::Upload.back(), None);
        assert_eq!(Page::TransformMenu.back(), Some(Page::Operation));
    }

    #[test]
    fn test_operation_guard_requires_data() {
        let mut nav = Nav::new();
        nav.page = Page::CleaningMenu;
        nav.group = Some("Handling Missing Values".to_string());
        let outcome = nav.goto(Page::Operation, false);
        assert!(matches!(outcome, NavOutcome::Denied { fallback: Page::CleaningMenu, .. }));
        assert_eq!(nav.page, Page::CleaningMenu);
    }

    #[test]
    fn test_operation_guard_requires_group() {
        let mut nav = Nav::new();
        nav.page = Page::CleaningMenu;
        let outcome = nav.goto(Page::Operation, true);
        assert!(matches!(outcome, NavOutcome::Denied { .. }));
    }

    #[test]
    fn test_unknown_group_suggests() {
        let mut nav = Nav::new();
        nav.group = Some("Mising Values".to_string());
        let outcome = nav.goto(Page::Operation, true);
        match outcome {
            NavOutcome::Suggest(names) => {
                assert!(names.contains(&"Handling Missing Values"));
            }
            other => panic!("expected suggestions, got {other:?}"),
        }
    }

    #[test]
    fn test_valid_entry_moves() {
        let mut nav = Nav::new();
        nav.group = Some("Feature Scaling".to_string());
        let outcome = nav.goto(Page::TransformOperation, true);
        assert_eq!(outcome, NavOutcome::Moved(Page::TransformOperation));
        assert_eq!(nav.page, Page::TransformOperation);
    }
}

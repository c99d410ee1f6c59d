//! Application state for one page session.

use crate::edit::EditSession;
use crate::model::{FormSelection, ProblemSet};
use crate::units::UnitResolver;

/// Everything the workflow remembers between user actions.
///
/// Owned by [`QuizApp`](crate::engine::QuizApp); nothing is persisted.
#[derive(Debug, Default)]
pub struct ApplicationState {
    /// Last successfully generated (or edited) set.
    pub current_problem_set: Option<ProblemSet>,
    /// Settings `current_problem_set` was generated from.
    pub current_settings: Option<FormSelection>,
    /// A generation round trip is in flight.
    pub is_loading: bool,
    /// A PDF export is in flight.
    pub is_exporting: bool,
    /// Open editor, if any.
    pub editor: Option<EditSession>,
    /// Subject/grade selection driving the unit selector.
    pub units: UnitResolver,
}

impl ApplicationState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether there is anything to export.
    pub fn has_result(&self) -> bool {
        self.current_problem_set.is_some() && self.current_settings.is_some()
    }
}

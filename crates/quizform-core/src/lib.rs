//! quizform-core — form state, rendering, and workflow for quizform.
//!
//! This crate defines the data model, the settings-form rules, the markup
//! builders, and the `QuizApp` controller that drives a page through the
//! unit → generate → edit → export workflow against an injected backend.

pub mod catalog;
pub mod edit;
pub mod engine;
pub mod error;
pub mod form;
pub mod model;
pub mod render;
pub mod state;
pub mod surface;
pub mod traits;
pub mod units;

pub use engine::{QuizApp, UnitFetch};
pub use error::{BackendError, QuizError, ValidationError};
pub use model::{FormSelection, Problem, ProblemSet, SelectionOptions, Subject};

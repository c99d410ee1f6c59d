//! quizform-page — standalone preview documents.
//!
//! Wraps the core renderer's fragments in a self-contained HTML page and
//! reads/writes the saved problem-set files the CLI works with.

pub mod html;
pub mod saved;

pub use html::{generate_page, write_page};
pub use saved::{load_saved, write_saved, SavedSet};

//! quizform-client — backend integrations.
//!
//! Implements the `QuizBackend` trait over HTTP against the units,
//! generation, and PDF endpoints, plus an in-process mock for offline runs.

pub mod config;
pub mod http;
pub mod mock;

pub use config::{load_config_from, QuizformConfig};
pub use http::HttpBackend;
pub use mock::MockBackend;

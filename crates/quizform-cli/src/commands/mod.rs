pub mod export;
pub mod generate;
pub mod grades;
pub mod preview;
pub mod units;

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;

use quizform_client::config::{load_config_from, QuizformConfig};
use quizform_client::{HttpBackend, MockBackend};
use quizform_core::engine::QuizApp;
use quizform_core::surface::HeadlessSurface;
use quizform_core::traits::QuizBackend;

/// Load config and wire a `QuizApp` to a headless surface.
pub fn build_app(
    offline: bool,
    config_path: Option<&Path>,
) -> Result<(QuizformConfig, Arc<HeadlessSurface>, QuizApp)> {
    let config = load_config_from(config_path)?;
    let backend: Arc<dyn QuizBackend> = if offline {
        tracing::info!("using the built-in mock backend");
        Arc::new(MockBackend::new())
    } else {
        tracing::debug!(base_url = %config.base_url, "using HTTP backend");
        Arc::new(HttpBackend::new(&config.base_url))
    };
    let surface = Arc::new(HeadlessSurface::new());
    let app = QuizApp::new(backend, surface.clone());
    Ok((config, surface, app))
}

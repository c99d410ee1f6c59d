//! The `quizform export` command.

use std::path::PathBuf;

use anyhow::{Context, Result};

use quizform_page::load_saved;

pub async fn execute(
    input: PathBuf,
    output: Option<PathBuf>,
    offline: bool,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let saved = load_saved(&input)?;
    let (config, surface, app) = super::build_app(offline, config_path.as_deref())?;
    let output = output.unwrap_or(config.output_dir);

    app.restore(saved.settings, saved.problem_set);
    app.export_pdf().await?;

    std::fs::create_dir_all(&output)
        .with_context(|| format!("failed to create output dir: {}", output.display()))?;
    for download in surface.take_downloads() {
        let path = output.join(&download.filename);
        std::fs::write(&path, &download.bytes)
            .with_context(|| format!("failed to write PDF: {}", path.display()))?;
        println!("Exported PDF: {}", path.display());
    }
    Ok(())
}

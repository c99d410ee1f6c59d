//! The `quizform generate` command.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use quizform_core::engine::UnitFetch;
use quizform_core::form::FormInput;
use quizform_page::{write_page, write_saved, SavedSet};

#[derive(Debug, Args)]
pub struct GenerateArgs {
    /// Subject (math or english)
    #[arg(long)]
    pub subject: String,

    /// Grade label (e.g. "中学1年")
    #[arg(long)]
    pub grade: String,

    /// Unit label (see `quizform units`)
    #[arg(long)]
    pub unit: String,

    /// Problem type (e.g. "選択式", "記述式")
    #[arg(long)]
    pub problem_type: String,

    /// Number of problems (1-50)
    #[arg(long, default_value = "5")]
    pub count: String,

    /// Difficulty
    #[arg(long, default_value = "標準")]
    pub difficulty: String,

    /// Paragraph count (long-form English only)
    #[arg(long, default_value = "")]
    pub paragraph_count: String,

    /// Calculation problems only
    #[arg(long)]
    pub calculation_only: bool,

    /// Include word problems
    #[arg(long)]
    pub word_problems: bool,

    /// Words the problems must use (English only)
    #[arg(long, default_value = "")]
    pub vocabulary: String,

    /// Also export the set to PDF
    #[arg(long)]
    pub pdf: bool,

    /// Output directory (defaults to the configured one)
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Use the built-in mock backend instead of the server
    #[arg(long)]
    pub offline: bool,

    /// Config file path
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl GenerateArgs {
    fn form_input(&self) -> FormInput {
        FormInput {
            subject: self.subject.clone(),
            grade: self.grade.clone(),
            unit: self.unit.clone(),
            problem_type: self.problem_type.clone(),
            count: self.count.clone(),
            difficulty: self.difficulty.clone(),
            paragraph_count: self.paragraph_count.clone(),
            calculation_only: self.calculation_only,
            word_problems: self.word_problems,
            vocabulary_list: self.vocabulary.clone(),
        }
    }
}

pub async fn execute(args: GenerateArgs) -> Result<()> {
    // Reject a bad form before touching the network.
    let input = args.form_input();
    input.to_selection()?;

    let (config, surface, app) = super::build_app(args.offline, args.config.as_deref())?;
    let output = args.output.clone().unwrap_or(config.output_dir);

    app.select_subject(&input.subject);
    if let UnitFetch::Applied(units) = app.select_grade(&input.grade).await? {
        anyhow::ensure!(
            units.is_empty() || units.iter().any(|u| u == input.unit.trim()),
            "unknown unit '{}' for {} / {}; available: {}",
            input.unit,
            input.subject,
            input.grade,
            units.join(", ")
        );
    }

    let set = app.submit(&input).await?;
    let settings = app
        .current_settings()
        .context("generation finished without settings")?;
    let saved = SavedSet::new(settings, set);

    let json_path = output.join("problems.json");
    let html_path = output.join("preview.html");
    write_saved(&saved, &json_path)?;
    write_page(&saved, &html_path)?;
    println!(
        "Generated {} problems: {}",
        saved.problem_set.len(),
        html_path.display()
    );
    println!("Saved problem set: {}", json_path.display());

    if args.pdf {
        app.export_pdf().await?;
        for download in surface.take_downloads() {
            let path = output.join(&download.filename);
            std::fs::write(&path, &download.bytes)
                .with_context(|| format!("failed to write PDF: {}", path.display()))?;
            println!("Exported PDF: {}", path.display());
        }
    }

    Ok(())
}

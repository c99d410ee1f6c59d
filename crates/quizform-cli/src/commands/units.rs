//! The `quizform units` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::Table;

use quizform_core::engine::UnitFetch;

pub async fn execute(
    subject: String,
    grade: String,
    offline: bool,
    config_path: Option<PathBuf>,
) -> Result<()> {
    anyhow::ensure!(
        subject.trim().parse::<quizform_core::Subject>().is_ok(),
        "unknown subject '{subject}' (expected math or english)"
    );

    let (_, _, app) = super::build_app(offline, config_path.as_deref())?;
    app.select_subject(&subject);

    let units = match app.select_grade(&grade).await? {
        UnitFetch::Applied(units) => units,
        UnitFetch::Superseded | UnitFetch::Skipped => Vec::new(),
    };

    if units.is_empty() {
        println!("No units for {subject} / {grade}.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["#", "Unit"]);
    for (i, unit) in units.iter().enumerate() {
        table.add_row(vec![(i + 1).to_string(), unit.clone()]);
    }
    println!("{table}");
    Ok(())
}

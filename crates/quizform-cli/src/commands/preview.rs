//! The `quizform preview` command.

use std::path::PathBuf;

use anyhow::Result;

use quizform_page::{load_saved, write_page};

pub fn execute(input: PathBuf, output: PathBuf) -> Result<()> {
    let saved = load_saved(&input)?;
    write_page(&saved, &output)?;
    println!(
        "Wrote preview of {} problems to {}",
        saved.problem_set.len(),
        output.display()
    );
    Ok(())
}

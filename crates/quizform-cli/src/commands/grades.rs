//! The `quizform grades` command.

use anyhow::Result;
use comfy_table::Table;

use quizform_core::catalog::{grades_for, show_paragraph_count};

pub fn execute(subject: String) -> Result<()> {
    let grades = grades_for(subject.trim());
    if grades.is_empty() {
        println!("No grades for subject '{subject}'. Known subjects: math, english");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["#", "Grade", "Paragraph count"]);
    for (i, grade) in grades.iter().enumerate() {
        let paragraphs = if show_paragraph_count(grade) { "yes" } else { "" };
        table.add_row(vec![(i + 1).to_string(), grade.to_string(), paragraphs.to_string()]);
    }
    println!("{table}");
    Ok(())
}

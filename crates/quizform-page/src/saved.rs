//! Saved problem-set files.
//!
//! A generated set is written next to its preview together with the
//! settings it came from, so it can be re-rendered or re-exported later.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use quizform_core::model::{FormSelection, ProblemSet};

/// A problem set plus the settings that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedSet {
    pub settings: FormSelection,
    pub problem_set: ProblemSet,
    pub generated_at: DateTime<Utc>,
}

impl SavedSet {
    pub fn new(settings: FormSelection, problem_set: ProblemSet) -> Self {
        Self {
            settings,
            problem_set,
            generated_at: Utc::now(),
        }
    }
}

pub fn load_saved(path: &Path) -> Result<SavedSet> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read problem set: {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("failed to parse problem set: {}", path.display()))
}

pub fn write_saved(saved: &SavedSet, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(saved)?;
    std::fs::write(path, json)
        .with_context(|| format!("failed to write problem set: {}", path.display()))?;
    Ok(())
}

//! Settings form: raw input, validation, and derivation of [`FormSelection`].

use serde::{Deserialize, Serialize};

use crate::catalog::{show_paragraph_count, show_vocabulary};
use crate::error::ValidationError;
use crate::model::{FormSelection, SelectionOptions, Subject};

pub const MIN_COUNT: u32 = 1;
pub const MAX_COUNT: u32 = 50;

pub const MIN_PARAGRAPHS: u32 = 1;
pub const MAX_PARAGRAPHS: u32 = 10;
pub const DEFAULT_PARAGRAPHS: u32 = 3;

pub const DEFAULT_DIFFICULTY: &str = "標準";

/// The settings form as read from its controls, before validation.
///
/// Every field is the control's raw value; checkboxes are booleans.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormInput {
    pub subject: String,
    pub grade: String,
    pub unit: String,
    pub problem_type: String,
    pub count: String,
    pub difficulty: String,
    pub paragraph_count: String,
    pub calculation_only: bool,
    pub word_problems: bool,
    pub vocabulary_list: String,
}

impl FormInput {
    /// Validate the form and derive the request.
    ///
    /// Checks run in form order and the first failure is reported.
    /// Fields hidden by the visibility rules are dropped rather than sent.
    pub fn to_selection(&self) -> Result<FormSelection, ValidationError> {
        let subject = self
            .subject
            .trim()
            .parse::<Subject>()
            .map_err(|_| ValidationError::MissingSubject)?;

        let grade = required(&self.grade, ValidationError::MissingGrade)?;
        let unit = required(&self.unit, ValidationError::MissingUnit)?;
        let problem_type = required(&self.problem_type, ValidationError::MissingProblemType)?;
        let count = parse_count(&self.count)?;

        let difficulty = match self.difficulty.trim() {
            "" => DEFAULT_DIFFICULTY.to_string(),
            d => d.to_string(),
        };

        let paragraph_count = if show_paragraph_count(&grade) {
            Some(parse_paragraph_count(&self.paragraph_count)?)
        } else {
            None
        };

        let vocabulary_list = if show_vocabulary(Some(subject)) {
            Some(self.vocabulary_list.trim())
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        } else {
            None
        };

        Ok(FormSelection {
            subject,
            grade,
            unit,
            problem_type,
            count,
            difficulty,
            paragraph_count,
            options: SelectionOptions {
                calculation_only: self.calculation_only.then_some(true),
                word_problems: self.word_problems.then_some(true),
                vocabulary_list,
            },
        })
    }
}

fn required(value: &str, missing: ValidationError) -> Result<String, ValidationError> {
    match value.trim() {
        "" => Err(missing),
        v => Ok(v.to_string()),
    }
}

/// Parse and range-check the problem count.
pub fn parse_count(raw: &str) -> Result<u32, ValidationError> {
    let count: i64 = raw
        .trim()
        .parse()
        .map_err(|_| ValidationError::CountNotANumber)?;
    if count < i64::from(MIN_COUNT) || count > i64::from(MAX_COUNT) {
        return Err(ValidationError::CountOutOfRange {
            min: MIN_COUNT,
            max: MAX_COUNT,
        });
    }
    Ok(count as u32)
}

fn parse_paragraph_count(raw: &str) -> Result<u32, ValidationError> {
    let out_of_range = ValidationError::ParagraphCountOutOfRange {
        min: MIN_PARAGRAPHS,
        max: MAX_PARAGRAPHS,
    };
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(DEFAULT_PARAGRAPHS);
    }
    match raw.parse::<u32>() {
        Ok(n) if (MIN_PARAGRAPHS..=MAX_PARAGRAPHS).contains(&n) => Ok(n),
        _ => Err(out_of_range),
    }
}

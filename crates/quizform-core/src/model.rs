//! Core data model types for quizform.
//!
//! These are the types that travel over the wire to the generation backend
//! and back: the structured request built from the settings form, and the
//! problem set the backend returns.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Subjects the settings form offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Subject {
    Math,
    English,
}

impl Subject {
    /// Wire value used in query strings and JSON bodies.
    pub fn as_str(self) -> &'static str {
        match self {
            Subject::Math => "math",
            Subject::English => "english",
        }
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Subject {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "math" => Ok(Subject::Math),
            "english" => Ok(Subject::English),
            other => Err(format!("unknown subject: {other}")),
        }
    }
}

/// Structured representation of the user's quiz-generation request.
///
/// Built fresh from the form on every submit; see
/// [`FormInput::to_selection`](crate::form::FormInput::to_selection).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormSelection {
    pub subject: Subject,
    pub grade: String,
    pub unit: String,
    pub problem_type: String,
    pub count: u32,
    pub difficulty: String,
    /// Only present for the long-form English grade.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paragraph_count: Option<u32>,
    #[serde(default)]
    pub options: SelectionOptions,
}

/// Optional generation switches.
///
/// Keys stay snake_case on the wire; that is what the generation backend
/// reads out of the `options` object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calculation_only: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub word_problems: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vocabulary_list: Option<String>,
}

/// One question unit within a [`ProblemSet`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Problem {
    /// Unique within a set; correlates editor blocks with problems.
    pub id: u32,
    pub question: String,
    /// Present only for multiple-choice problems.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub choices: Option<Vec<String>>,
    pub answer: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

/// Generated quiz content, in one of two shapes.
///
/// The passage shape is tried first when deserializing, so a body carrying
/// `readingPassage` is never mistaken for a flat list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProblemSet {
    Passage {
        #[serde(rename = "readingPassage")]
        reading_passage: String,
        questions: Vec<Problem>,
    },
    Flat {
        problems: Vec<Problem>,
    },
}

impl ProblemSet {
    /// The ordered problems of either shape.
    pub fn problems(&self) -> &[Problem] {
        match self {
            ProblemSet::Passage { questions, .. } => questions,
            ProblemSet::Flat { problems } => problems,
        }
    }

    pub fn passage(&self) -> Option<&str> {
        match self {
            ProblemSet::Passage {
                reading_passage, ..
            } => Some(reading_passage),
            ProblemSet::Flat { .. } => None,
        }
    }

    pub fn len(&self) -> usize {
        self.problems().len()
    }

    pub fn is_empty(&self) -> bool {
        self.problems().is_empty()
    }

    /// Replace the problem list wholesale, keeping the shape.
    pub(crate) fn replace_problems(&mut self, new_problems: Vec<Problem>) {
        match self {
            ProblemSet::Passage { questions, .. } => *questions = new_problems,
            ProblemSet::Flat { problems } => *problems = new_problems,
        }
    }

    pub(crate) fn replace_passage(&mut self, passage: String) {
        if let ProblemSet::Passage {
            reading_passage, ..
        } = self
        {
            *reading_passage = passage;
        }
    }
}

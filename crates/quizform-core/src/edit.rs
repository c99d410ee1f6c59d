//! Edit session: one editable block per problem, committed back wholesale.

use crate::model::{Problem, ProblemSet};

/// Which input of an edit block a value belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditField {
    Question,
    Choices,
    Answer,
    Explanation,
}

impl EditField {
    /// Input-name prefix used in the editor markup (`question-<id>` etc.).
    pub fn prefix(self) -> &'static str {
        match self {
            EditField::Question => "question",
            EditField::Choices => "choices",
            EditField::Answer => "answer",
            EditField::Explanation => "explanation",
        }
    }

    fn from_prefix(prefix: &str) -> Option<Self> {
        match prefix {
            "question" => Some(EditField::Question),
            "choices" => Some(EditField::Choices),
            "answer" => Some(EditField::Answer),
            "explanation" => Some(EditField::Explanation),
            _ => None,
        }
    }
}

/// Name of the passage input in the editor markup.
pub const PASSAGE_FIELD: &str = "passage";

/// Raw input values of one problem's edit block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditBlock {
    pub id: u32,
    pub question: String,
    /// One choice per line; `None` when the problem has no choices input.
    pub choices: Option<String>,
    pub answer: String,
    pub explanation: String,
}

impl EditBlock {
    fn from_problem(problem: &Problem) -> Self {
        Self {
            id: problem.id,
            question: problem.question.clone(),
            choices: problem.choices.as_ref().map(|c| c.join("\n")),
            answer: problem.answer.clone(),
            explanation: problem.explanation.clone().unwrap_or_default(),
        }
    }

    fn set(&mut self, field: EditField, value: &str) {
        let value = value.to_string();
        match field {
            EditField::Question => self.question = value,
            EditField::Choices => self.choices = Some(value),
            EditField::Answer => self.answer = value,
            EditField::Explanation => self.explanation = value,
        }
    }

    /// Read the block back into a problem.
    fn to_problem(&self) -> Problem {
        let choices = self
            .choices
            .as_deref()
            .map(|raw| {
                raw.lines()
                    .map(str::trim)
                    .filter(|c| !c.is_empty())
                    .map(str::to_string)
                    .collect::<Vec<_>>()
            })
            .filter(|c| !c.is_empty());
        let explanation = Some(self.explanation.trim())
            .filter(|e| !e.is_empty())
            .map(str::to_string);

        Problem {
            id: self.id,
            question: self.question.trim().to_string(),
            choices,
            answer: self.answer.trim().to_string(),
            explanation,
        }
    }
}

/// An open editor over a snapshot of the current problem set.
///
/// Nothing touches the stored set until [`EditSession::commit`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditSession {
    passage: Option<String>,
    blocks: Vec<EditBlock>,
}

impl EditSession {
    /// Pre-fill one block per problem from the current values.
    pub fn open(set: &ProblemSet) -> Self {
        Self {
            passage: set.passage().map(str::to_string),
            blocks: set.problems().iter().map(EditBlock::from_problem).collect(),
        }
    }

    pub fn blocks(&self) -> &[EditBlock] {
        &self.blocks
    }

    pub fn passage(&self) -> Option<&str> {
        self.passage.as_deref()
    }

    pub fn block_mut(&mut self, id: u32) -> Option<&mut EditBlock> {
        self.blocks.iter_mut().find(|b| b.id == id)
    }

    /// Set one input. Returns `false` if no block has this id.
    pub fn set_field(&mut self, id: u32, field: EditField, value: &str) -> bool {
        match self.block_mut(id) {
            Some(block) => {
                block.set(field, value);
                true
            }
            None => false,
        }
    }

    /// Set the passage text; ignored for flat problem sets.
    pub fn set_passage(&mut self, value: &str) -> bool {
        match &mut self.passage {
            Some(passage) => {
                *passage = value.to_string();
                true
            }
            None => false,
        }
    }

    /// Apply `(name, value)` pairs as posted by the editor form.
    ///
    /// Unknown names and ids are skipped. Returns how many were applied.
    pub fn apply_form_fields<'a, I>(&mut self, fields: I) -> usize
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut applied = 0;
        for (name, value) in fields {
            let ok = if name == PASSAGE_FIELD {
                self.set_passage(value)
            } else {
                match parse_field_name(name) {
                    Some((field, id)) => self.set_field(id, field, value),
                    None => false,
                }
            };
            if ok {
                applied += 1;
            }
        }
        applied
    }

    /// The edited problems, in block order.
    pub fn collect(&self) -> Vec<Problem> {
        self.blocks.iter().map(EditBlock::to_problem).collect()
    }

    /// Replace the problem list (and passage) of `set` wholesale.
    pub fn commit(&self, set: &mut ProblemSet) {
        set.replace_problems(self.collect());
        if let Some(passage) = &self.passage {
            set.replace_passage(passage.trim().to_string());
        }
    }
}

/// Split `answer-12` into `(EditField::Answer, 12)`.
fn parse_field_name(name: &str) -> Option<(EditField, u32)> {
    let (prefix, id) = name.rsplit_once('-')?;
    let field = EditField::from_prefix(prefix)?;
    let id = id.parse().ok()?;
    Some((field, id))
}

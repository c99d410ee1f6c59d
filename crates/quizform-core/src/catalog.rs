//! Static subject → grade catalog and the conditional-field visibility rules.

use crate::model::Subject;

/// Grade label that switches the form into long-form reading mode.
pub const LONG_FORM_ENGLISH: &str = "高校英語長文";

const MATH_GRADES: &[&str] = &["中学1年", "中学2年", "中学3年", "高校1年", "高校2年", "高校3年"];

const ENGLISH_GRADES: &[&str] = &[
    "中学1年",
    "中学2年",
    "中学3年",
    "高校1年",
    "高校2年",
    "高校3年",
    LONG_FORM_ENGLISH,
];

impl Subject {
    /// Ordered grade labels offered for this subject.
    pub fn grades(self) -> &'static [&'static str] {
        match self {
            Subject::Math => MATH_GRADES,
            Subject::English => ENGLISH_GRADES,
        }
    }
}

/// Grade labels for a raw subject value; empty for anything not in the catalog.
pub fn grades_for(subject: &str) -> &'static [&'static str] {
    subject.parse::<Subject>().map(Subject::grades).unwrap_or(&[])
}

/// The vocabulary-list field is shown for English only.
pub fn show_vocabulary(subject: Option<Subject>) -> bool {
    subject == Some(Subject::English)
}

/// The paragraph-count field is shown for the long-form English grade only.
pub fn show_paragraph_count(grade: &str) -> bool {
    grade == LONG_FORM_ENGLISH
}

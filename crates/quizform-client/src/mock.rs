//! Mock backend for testing and offline runs.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use quizform_core::catalog::LONG_FORM_ENGLISH;
use quizform_core::error::BackendError;
use quizform_core::model::{FormSelection, Problem, ProblemSet, Subject};
use quizform_core::traits::{ExportRequest, QuizBackend};

/// Problem types that produce multiple-choice problems.
const CHOICE_TYPES: &[&str] = &["選択式", "選択問題"];

const MATH_UNITS: &[(&str, &[&str])] = &[
    (
        "中学1年",
        &["正負の数", "文字と式", "一次方程式", "比例・反比例", "平面図形", "空間図形", "データの活用"],
    ),
    ("中学2年", &["式の計算", "連立方程式", "一次関数", "図形の性質", "確率"]),
    (
        "中学3年",
        &["多項式", "平方根", "二次方程式", "二次関数", "相似", "円", "三平方の定理"],
    ),
    ("高校1年", &["数と式", "集合と論証", "二次関数", "図形と計量", "データの分析"]),
    ("高校2年", &["三角関数", "指数・対数関数", "微分", "積分", "数列"]),
    ("高校3年", &["極限", "微分法の応用", "積分法の応用", "複素数平面", "確率分布"]),
];

const ENGLISH_UNITS: &[(&str, &[&str])] = &[
    ("中学1年", &["be動詞", "一般動詞", "疑問文・否定文", "代名詞", "複数形"]),
    ("中学2年", &["過去形", "未来形", "助動詞", "不定詞", "動名詞"]),
    ("中学3年", &["現在完了形", "受動態", "関係代名詞", "間接疑問文"]),
    ("高校1年", &["時制", "助動詞", "仮定法", "不定詞・動名詞", "分詞"]),
    ("高校2年", &["関係詞", "比較", "仮定法", "語法"]),
    ("高校3年", &["長文読解", "英作文", "語彙・イディオム", "文法総合"]),
    (LONG_FORM_ENGLISH, &["物語文", "説明文", "論説文"]),
];

/// An in-process backend with a built-in unit table and placeholder
/// problem generation.
///
/// Counts calls per endpoint; the last generation request is kept.
pub struct MockBackend {
    units: HashMap<(Subject, String), Vec<String>>,
    fail_with: Option<BackendError>,
    unit_calls: AtomicU32,
    generate_calls: AtomicU32,
    pdf_calls: AtomicU32,
    last_selection: Mutex<Option<FormSelection>>,
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MockBackend {
    /// A mock serving the standard unit table.
    pub fn new() -> Self {
        let mut units = HashMap::new();
        for (subject, table) in [(Subject::Math, MATH_UNITS), (Subject::English, ENGLISH_UNITS)] {
            for (grade, names) in table {
                units.insert(
                    (subject, grade.to_string()),
                    names.iter().map(|n| n.to_string()).collect(),
                );
            }
        }
        Self {
            units,
            fail_with: None,
            unit_calls: AtomicU32::new(0),
            generate_calls: AtomicU32::new(0),
            pdf_calls: AtomicU32::new(0),
            last_selection: Mutex::new(None),
        }
    }

    /// A mock whose every call fails with `error`.
    pub fn failing(error: BackendError) -> Self {
        Self {
            fail_with: Some(error),
            ..Self::new()
        }
    }

    pub fn unit_calls(&self) -> u32 {
        self.unit_calls.load(Ordering::Relaxed)
    }

    pub fn generate_calls(&self) -> u32 {
        self.generate_calls.load(Ordering::Relaxed)
    }

    pub fn pdf_calls(&self) -> u32 {
        self.pdf_calls.load(Ordering::Relaxed)
    }

    pub fn last_selection(&self) -> Option<FormSelection> {
        self.last_selection
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }

    fn check_failure(&self) -> Result<(), BackendError> {
        match &self.fail_with {
            Some(e) => Err(e.clone()),
            None => Ok(()),
        }
    }
}

/// Deterministic placeholder problems for a selection.
pub fn placeholder_problems(selection: &FormSelection) -> ProblemSet {
    let multiple_choice = CHOICE_TYPES.contains(&selection.problem_type.as_str());
    let problems: Vec<Problem> = (1..=selection.count)
        .map(|id| Problem {
            id,
            question: format!("{}「{}」に関する問題{id}", selection.grade, selection.unit),
            choices: multiple_choice.then(|| {
                ["Option A", "Option B", "Option C", "Option D"]
                    .iter()
                    .map(|c| c.to_string())
                    .collect()
            }),
            answer: if multiple_choice {
                "Option A".to_string()
            } else {
                "解答例".to_string()
            },
            explanation: Some("解説例".to_string()),
        })
        .collect();

    if selection.grade == LONG_FORM_ENGLISH {
        let paragraphs = selection.paragraph_count.unwrap_or(1);
        let reading_passage = (1..=paragraphs)
            .map(|n| format!("Paragraph {n} of the passage about {}.", selection.unit))
            .collect::<Vec<_>>()
            .join("\n");
        ProblemSet::Passage {
            reading_passage,
            questions: problems,
        }
    } else {
        ProblemSet::Flat { problems }
    }
}

#[async_trait]
impl QuizBackend for MockBackend {
    async fn fetch_units(
        &self,
        subject: Subject,
        grade: &str,
    ) -> Result<Vec<String>, BackendError> {
        self.unit_calls.fetch_add(1, Ordering::Relaxed);
        self.check_failure()?;
        Ok(self
            .units
            .get(&(subject, grade.to_string()))
            .cloned()
            .unwrap_or_default())
    }

    async fn generate(&self, selection: &FormSelection) -> Result<ProblemSet, BackendError> {
        self.generate_calls.fetch_add(1, Ordering::Relaxed);
        *self
            .last_selection
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner) = Some(selection.clone());
        self.check_failure()?;
        Ok(placeholder_problems(selection))
    }

    async fn export_pdf(&self, request: &ExportRequest<'_>) -> Result<Vec<u8>, BackendError> {
        self.pdf_calls.fetch_add(1, Ordering::Relaxed);
        self.check_failure()?;
        let body = format!(
            "%PDF-1.4\n% {} - {} - {} ({} problems)\n%%EOF\n",
            request.settings.subject,
            request.settings.grade,
            request.settings.unit,
            request.problems.len()
        );
        Ok(body.into_bytes())
    }
}

//! The two seams of the workflow: the remote endpoints and the live page.
//!
//! `QuizBackend` is implemented over HTTP by `quizform-client`; `Surface` is
//! whatever displays the page. Both are injected into
//! [`QuizApp`](crate::engine::QuizApp).

use async_trait::async_trait;
use serde::Serialize;

use crate::error::BackendError;
use crate::model::{FormSelection, ProblemSet, Subject};
use crate::units::UnitOptions;

// ---------------------------------------------------------------------------
// Remote endpoints
// ---------------------------------------------------------------------------

/// The three remote services the form talks to.
#[async_trait]
pub trait QuizBackend: Send + Sync {
    /// `GET /api/get_units`: valid units for a subject and grade.
    async fn fetch_units(&self, subject: Subject, grade: &str)
        -> Result<Vec<String>, BackendError>;

    /// `POST /api/generate_problems`: generate a problem set.
    async fn generate(&self, selection: &FormSelection) -> Result<ProblemSet, BackendError>;

    /// `POST /api/generate_pdf`: render a problem set to PDF bytes.
    async fn export_pdf(&self, request: &ExportRequest<'_>) -> Result<Vec<u8>, BackendError>;
}

/// Body of the PDF request: the problem set plus the settings it came from.
#[derive(Debug, Serialize)]
pub struct ExportRequest<'a> {
    pub problems: &'a ProblemSet,
    #[serde(flatten)]
    pub settings: &'a FormSelection,
}

// ---------------------------------------------------------------------------
// Live surface
// ---------------------------------------------------------------------------

/// State of the PDF download control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportControl {
    /// Nothing generated yet.
    #[default]
    Disabled,
    Ready,
    /// Disabled and relabelled while the PDF is produced.
    Exporting,
}

impl ExportControl {
    pub fn label(self) -> &'static str {
        match self {
            ExportControl::Exporting => "PDF生成中...",
            _ => "PDFダウンロード",
        }
    }

    pub fn is_enabled(self) -> bool {
        self == ExportControl::Ready
    }
}

/// A user-facing notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// Blocking error notification.
    Error(String),
    /// Transient success notification.
    Success(String),
}

/// A file handed to the user as a download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Download {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// The page the workflow drives.
///
/// Implementations apply already-built markup; they never build it.
pub trait Surface: Send + Sync {
    fn set_grade_options(&self, grades: &[&str]);
    fn set_vocabulary_visible(&self, visible: bool);
    fn set_paragraph_count_visible(&self, visible: bool);
    fn set_unit_options(&self, options: &UnitOptions);

    /// Show or hide the loading indicator; the submit control is disabled
    /// while it is shown.
    fn set_loading(&self, loading: bool);

    /// Insert preview markup, reveal the preview, and scroll it into view.
    fn show_preview(&self, markup: &str);
    fn hide_preview(&self);

    /// Ask a math-typesetting engine, if the page has one, to re-typeset the
    /// preview.
    fn typeset_math(&self) {}

    fn open_editor(&self, markup: &str);
    fn close_editor(&self);

    fn set_export_control(&self, control: ExportControl);

    fn notify(&self, notice: Notice);

    /// Hand a file to the user.
    fn save_download(&self, download: Download);
}

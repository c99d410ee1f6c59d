//! Workflow controller.
//!
//! `QuizApp` owns the [`ApplicationState`] and sequences every user action:
//! cascading selects, unit fetches, generation, editing, and export. The
//! only suspension points are the three backend calls. Generation and
//! export are gated against re-entry, and their loading state is released
//! by a guard on every exit path, including a dropped future.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Local};
use tracing::{debug, info, instrument, warn};

use crate::catalog::{grades_for, show_paragraph_count, show_vocabulary};
use crate::edit::{EditField, EditSession};
use crate::error::{QuizError, ValidationError};
use crate::form::FormInput;
use crate::model::{FormSelection, ProblemSet, Subject};
use crate::render::{render_edit_form, render_problem_set, UNIT_FAILED};
use crate::state::ApplicationState;
use crate::traits::{Download, ExportControl, ExportRequest, Notice, QuizBackend, Surface};
use crate::units::UnitOptions;

pub const EDIT_SAVED_MESSAGE: &str = "問題を更新しました";

/// Outcome of a grade change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnitFetch {
    /// Units were fetched and shown.
    Applied(Vec<String>),
    /// The selection changed while the fetch was outstanding; the response
    /// was discarded.
    Superseded,
    /// No subject/grade pair to fetch for.
    Skipped,
}

/// The form front-end, minus the page.
pub struct QuizApp {
    backend: Arc<dyn QuizBackend>,
    surface: Arc<dyn Surface>,
    state: Mutex<ApplicationState>,
}

impl QuizApp {
    pub fn new(backend: Arc<dyn QuizBackend>, surface: Arc<dyn Surface>) -> Self {
        surface.set_unit_options(&UnitOptions::Idle);
        surface.set_export_control(ExportControl::Disabled);
        Self {
            backend,
            surface,
            state: Mutex::new(ApplicationState::new()),
        }
    }

    fn state(&self) -> MutexGuard<'_, ApplicationState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn current_problem_set(&self) -> Option<ProblemSet> {
        self.state().current_problem_set.clone()
    }

    pub fn current_settings(&self) -> Option<FormSelection> {
        self.state().current_settings.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.state().is_loading
    }

    pub fn is_exporting(&self) -> bool {
        self.state().is_exporting
    }

    // -----------------------------------------------------------------------
    // Cascading selects
    // -----------------------------------------------------------------------

    /// Subject changed: repopulate grades, reset units, recompute visibility.
    pub fn select_subject(&self, subject: &str) {
        let parsed = subject.trim().parse::<Subject>().ok();
        let mut state = self.state();
        let options = state.units.select_subject(parsed);

        self.surface.set_grade_options(grades_for(subject.trim()));
        self.surface.set_vocabulary_visible(show_vocabulary(parsed));
        self.surface.set_paragraph_count_visible(false);
        self.surface.set_unit_options(options);
        debug!(?parsed, "subject selected");
    }

    /// Grade changed: recompute visibility and fetch the unit list.
    ///
    /// A response is applied only if its subject/grade pair is still the
    /// current selection; otherwise it is discarded.
    #[instrument(skip(self))]
    pub async fn select_grade(&self, grade: &str) -> Result<UnitFetch, QuizError> {
        let ticket = {
            let mut state = self.state();
            let ticket = state.units.select_grade(grade);
            self.surface
                .set_paragraph_count_visible(show_paragraph_count(grade.trim()));
            self.surface.set_unit_options(state.units.options());
            ticket
        };
        let Some(ticket) = ticket else {
            return Ok(UnitFetch::Skipped);
        };

        let result = self
            .backend
            .fetch_units(ticket.subject, &ticket.grade)
            .await;

        let mut state = self.state();
        let error = result.as_ref().err().cloned();
        let Some(options) = state.units.finish(&ticket, result) else {
            debug!(subject = %ticket.subject, grade = %ticket.grade, "discarding superseded unit list");
            return Ok(UnitFetch::Superseded);
        };
        self.surface.set_unit_options(options);

        match (error, options) {
            (Some(e), _) => {
                warn!("unit fetch failed: {e}");
                self.surface
                    .notify(Notice::Error(format!("{UNIT_FAILED}: {e}")));
                Err(e.into())
            }
            (None, UnitOptions::Populated(units)) => {
                info!(count = units.len(), "units loaded");
                Ok(UnitFetch::Applied(units.clone()))
            }
            (None, _) => Ok(UnitFetch::Applied(Vec::new())),
        }
    }

    // -----------------------------------------------------------------------
    // Generation
    // -----------------------------------------------------------------------

    /// Validate the form and generate a problem set.
    ///
    /// A validation failure is surfaced and no request is made.
    #[instrument(skip_all)]
    pub async fn submit(&self, input: &FormInput) -> Result<ProblemSet, QuizError> {
        let selection = match input.to_selection() {
            Ok(selection) => selection,
            Err(e) => {
                debug!("form rejected: {e}");
                self.surface.notify(Notice::Error(e.to_string()));
                return Err(e.into());
            }
        };
        self.generate(selection).await
    }

    /// Re-run the last successful generation's settings.
    ///
    /// Returns `Ok(None)` when nothing has been generated yet.
    #[instrument(skip_all)]
    pub async fn regenerate(&self) -> Result<Option<ProblemSet>, QuizError> {
        let Some(settings) = self.current_settings() else {
            debug!("nothing generated yet; regenerate skipped");
            return Ok(None);
        };
        self.generate(settings).await.map(Some)
    }

    #[instrument(skip_all, fields(subject = %selection.subject, grade = %selection.grade, count = selection.count))]
    async fn generate(&self, selection: FormSelection) -> Result<ProblemSet, QuizError> {
        let _loading = LoadingGuard::acquire(self)?;
        self.surface.set_loading(true);
        self.surface.hide_preview();

        let set = match self.backend.generate(&selection).await {
            Ok(set) => set,
            Err(e) => {
                warn!("generation failed: {e}");
                self.surface.notify(Notice::Error(e.to_string()));
                return Err(e.into());
            }
        };

        let markup = render_problem_set(&set);
        {
            let mut state = self.state();
            state.current_problem_set = Some(set.clone());
            state.current_settings = Some(selection);
            if state.editor.take().is_some() {
                self.surface.close_editor();
            }
        }
        self.surface.show_preview(&markup);
        self.surface.typeset_math();
        self.surface.set_export_control(ExportControl::Ready);
        info!(problems = set.len(), "problem set generated");
        Ok(set)
    }

    /// Make a previously generated set current again, as if it had just
    /// been generated from `settings`.
    pub fn restore(&self, settings: FormSelection, set: ProblemSet) {
        let markup = render_problem_set(&set);
        {
            let mut state = self.state();
            state.current_problem_set = Some(set);
            state.current_settings = Some(settings);
            state.editor = None;
        }
        self.surface.show_preview(&markup);
        self.surface.typeset_math();
        self.surface.set_export_control(ExportControl::Ready);
    }

    // -----------------------------------------------------------------------
    // Editing
    // -----------------------------------------------------------------------

    /// Open the editor over the current set.
    pub fn open_editor(&self) -> Result<(), QuizError> {
        let mut state = self.state();
        let Some(set) = &state.current_problem_set else {
            self.surface
                .notify(Notice::Error(ValidationError::NothingToEdit.to_string()));
            return Err(ValidationError::NothingToEdit.into());
        };
        let session = EditSession::open(set);
        self.surface.open_editor(&render_edit_form(&session));
        state.editor = Some(session);
        Ok(())
    }

    pub fn is_editing(&self) -> bool {
        self.state().editor.is_some()
    }

    /// Change one input of the open editor.
    ///
    /// Returns `false` if no editor is open or no block has this id.
    pub fn edit_field(&self, id: u32, field: EditField, value: &str) -> bool {
        self.state()
            .editor
            .as_mut()
            .is_some_and(|session| session.set_field(id, field, value))
    }

    /// Apply `(name, value)` pairs posted by the editor form.
    pub fn apply_edit_form<'a, I>(&self, fields: I) -> usize
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        match self.state().editor.as_mut() {
            Some(session) => session.apply_form_fields(fields),
            None => 0,
        }
    }

    /// Commit the editor into the current set, re-render, and close it.
    pub fn save_edits(&self) -> Result<(), QuizError> {
        let mut state = self.state();
        let session = state.editor.take().ok_or(ValidationError::NothingToEdit)?;
        let set = state
            .current_problem_set
            .as_mut()
            .ok_or(ValidationError::NothingToEdit)?;
        session.commit(set);
        let markup = render_problem_set(set);
        drop(state);

        self.surface.show_preview(&markup);
        self.surface.typeset_math();
        self.surface.close_editor();
        self.surface
            .notify(Notice::Success(EDIT_SAVED_MESSAGE.to_string()));
        debug!("edits saved");
        Ok(())
    }

    /// Close the editor without touching the current set.
    pub fn cancel_edits(&self) {
        self.state().editor = None;
        self.surface.close_editor();
    }

    // -----------------------------------------------------------------------
    // Export
    // -----------------------------------------------------------------------

    /// Export the current set to PDF and hand it to the user.
    #[instrument(skip(self))]
    pub async fn export_pdf(&self) -> Result<Download, QuizError> {
        let (set, settings, _exporting) = ExportGuard::acquire(self)?;
        self.surface.set_export_control(ExportControl::Exporting);

        let request = ExportRequest {
            problems: &set,
            settings: &settings,
        };
        let bytes = match self.backend.export_pdf(&request).await {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!("PDF export failed: {e}");
                self.surface.notify(Notice::Error(e.to_string()));
                return Err(e.into());
            }
        };

        let download = Download {
            filename: pdf_filename(&settings, Local::now()),
            bytes,
        };
        info!(filename = %download.filename, size = download.bytes.len(), "PDF exported");
        self.surface.save_download(download.clone());
        Ok(download)
    }
}

/// Download name: `<subject>_<grade>_<unit>_<timestamp>.pdf`.
pub fn pdf_filename(settings: &FormSelection, now: DateTime<Local>) -> String {
    let name = format!(
        "{}_{}_{}_{}.pdf",
        settings.subject,
        settings.grade,
        settings.unit,
        now.format("%Y%m%d_%H%M%S")
    );
    name.replace(['/', '\\'], "_")
}

/// Holds `is_loading` for one generation round trip.
struct LoadingGuard<'a> {
    app: &'a QuizApp,
}

impl<'a> LoadingGuard<'a> {
    fn acquire(app: &'a QuizApp) -> Result<Self, QuizError> {
        let mut state = app.state();
        if state.is_loading {
            return Err(QuizError::Busy);
        }
        state.is_loading = true;
        Ok(Self { app })
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.app.state().is_loading = false;
        self.app.surface.set_loading(false);
    }
}

/// Holds `is_exporting` for one export; restores the export control on drop.
struct ExportGuard<'a> {
    app: &'a QuizApp,
}

impl<'a> ExportGuard<'a> {
    fn acquire(app: &'a QuizApp) -> Result<(ProblemSet, FormSelection, Self), QuizError> {
        let mut state = app.state();
        let (Some(set), Some(settings)) = (
            state.current_problem_set.clone(),
            state.current_settings.clone(),
        ) else {
            drop(state);
            let e = ValidationError::NothingToExport;
            app.surface.notify(Notice::Error(e.to_string()));
            return Err(e.into());
        };
        if state.is_exporting {
            return Err(QuizError::Busy);
        }
        state.is_exporting = true;
        Ok((set, settings, Self { app }))
    }
}

impl Drop for ExportGuard<'_> {
    fn drop(&mut self) {
        let mut state = self.app.state();
        state.is_exporting = false;
        let control = if state.has_result() {
            ExportControl::Ready
        } else {
            ExportControl::Disabled
        };
        self.app.surface.set_export_control(control);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicU32, Ordering};

    use async_trait::async_trait;
    use futures::FutureExt;
    use tokio::sync::oneshot;

    use crate::error::BackendError;
    use crate::model::Problem;
    use crate::surface::HeadlessSurface;

    /// Backend whose responses are scripted per test.
    #[derive(Default)]
    struct StubBackend {
        units: HashMap<String, Vec<String>>,
        unit_gates: Mutex<HashMap<String, oneshot::Receiver<Vec<String>>>>,
        generate_result: Mutex<Option<Result<ProblemSet, BackendError>>>,
        generate_gate: Mutex<Option<oneshot::Receiver<()>>>,
        pdf_result: Mutex<Option<Result<Vec<u8>, BackendError>>>,
        pdf_gate: Mutex<Option<oneshot::Receiver<()>>>,
        unit_calls: AtomicU32,
        generate_calls: AtomicU32,
        pdf_calls: AtomicU32,
    }

    impl StubBackend {
        fn generating(set: ProblemSet) -> Self {
            let stub = Self::default();
            *stub.generate_result.lock().unwrap() = Some(Ok(set));
            stub
        }

        fn set_generate(&self, result: Result<ProblemSet, BackendError>) {
            *self.generate_result.lock().unwrap() = Some(result);
        }

        fn set_pdf(&self, result: Result<Vec<u8>, BackendError>) {
            *self.pdf_result.lock().unwrap() = Some(result);
        }
    }

    #[async_trait]
    impl QuizBackend for StubBackend {
        async fn fetch_units(
            &self,
            _subject: Subject,
            grade: &str,
        ) -> Result<Vec<String>, BackendError> {
            self.unit_calls.fetch_add(1, Ordering::SeqCst);
            let gate = self.unit_gates.lock().unwrap().remove(grade);
            if let Some(rx) = gate {
                return rx
                    .await
                    .map_err(|_| BackendError::Network("gate dropped".into()));
            }
            self.units
                .get(grade)
                .cloned()
                .ok_or_else(|| BackendError::server(404, None))
        }

        async fn generate(&self, _selection: &FormSelection) -> Result<ProblemSet, BackendError> {
            self.generate_calls.fetch_add(1, Ordering::SeqCst);
            let gate = self.generate_gate.lock().unwrap().take();
            if let Some(rx) = gate {
                let _ = rx.await;
            }
            self.generate_result
                .lock()
                .unwrap()
                .clone()
                .unwrap_or_else(|| Err(BackendError::server(500, None)))
        }

        async fn export_pdf(&self, _request: &ExportRequest<'_>) -> Result<Vec<u8>, BackendError> {
            self.pdf_calls.fetch_add(1, Ordering::SeqCst);
            let gate = self.pdf_gate.lock().unwrap().take();
            if let Some(rx) = gate {
                let _ = rx.await;
            }
            self.pdf_result
                .lock()
                .unwrap()
                .clone()
                .unwrap_or_else(|| Ok(b"%PDF-1.4".to_vec()))
        }
    }

    fn problems(n: u32) -> ProblemSet {
        ProblemSet::Flat {
            problems: (1..=n)
                .map(|id| Problem {
                    id,
                    question: format!("問題 {id}"),
                    choices: Some(vec!["1/2".into(), "1/3".into()]),
                    answer: "1/2".into(),
                    explanation: Some("約分する".into()),
                })
                .collect(),
        }
    }

    fn input() -> FormInput {
        FormInput {
            subject: "math".into(),
            grade: "中学1年".into(),
            unit: "分数".into(),
            problem_type: "選択式".into(),
            count: "5".into(),
            difficulty: "標準".into(),
            ..Default::default()
        }
    }

    fn app(backend: StubBackend) -> (Arc<StubBackend>, Arc<HeadlessSurface>, QuizApp) {
        let backend = Arc::new(backend);
        let surface = Arc::new(HeadlessSurface::new());
        let app = QuizApp::new(backend.clone(), surface.clone());
        (backend, surface, app)
    }

    #[tokio::test]
    async fn submit_renders_every_problem() {
        let (_, surface, app) = app(StubBackend::generating(problems(5)));
        app.submit(&input()).await.unwrap();

        let page = surface.snapshot();
        let preview = page.preview.unwrap();
        assert_eq!(preview.matches("class=\"problem\"").count(), 5);
        assert!(page.preview_visible);
        assert_eq!(page.export_control, ExportControl::Ready);
        assert!(page.submit_enabled);
        assert!(!page.loading);
        assert_eq!(page.typeset_requests, 1);
    }

    #[tokio::test]
    async fn invalid_form_makes_no_request() {
        let (backend, surface, app) = app(StubBackend::generating(problems(1)));
        let mut bad = input();
        bad.count = "51".into();

        let err = app.submit(&bad).await.unwrap_err();
        assert!(matches!(
            err,
            QuizError::Validation(ValidationError::CountOutOfRange { .. })
        ));
        assert_eq!(backend.generate_calls.load(Ordering::SeqCst), 0);
        assert_eq!(surface.snapshot().last_error(), Some(err.to_string().as_str()));
    }

    #[tokio::test]
    async fn failed_generation_keeps_previous_set() {
        let (backend, surface, app) = app(StubBackend::generating(problems(2)));
        app.submit(&input()).await.unwrap();

        backend.set_generate(Err(BackendError::server(500, Some("quota exceeded".into()))));
        let err = app.regenerate().await.unwrap_err();
        assert_eq!(err.to_string(), "quota exceeded");

        assert_eq!(app.current_problem_set(), Some(problems(2)));
        let page = surface.snapshot();
        assert_eq!(page.last_error(), Some("quota exceeded"));
        assert!(!app.is_loading());
        assert!(page.submit_enabled);
    }

    #[tokio::test]
    async fn regenerate_without_settings_is_noop() {
        let (backend, _, app) = app(StubBackend::generating(problems(1)));
        assert_eq!(app.regenerate().await.unwrap(), None);
        assert_eq!(backend.generate_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn regenerate_reuses_last_settings() {
        let (backend, _, app) = app(StubBackend::generating(problems(3)));
        app.submit(&input()).await.unwrap();
        let again = app.regenerate().await.unwrap();
        assert_eq!(again, Some(problems(3)));
        assert_eq!(backend.generate_calls.load(Ordering::SeqCst), 2);
        assert_eq!(app.current_settings().unwrap().unit, "分数");
    }

    #[tokio::test]
    async fn second_submit_while_loading_is_rejected() {
        let stub = StubBackend::generating(problems(1));
        let (tx, rx) = oneshot::channel();
        *stub.generate_gate.lock().unwrap() = Some(rx);
        let (backend, _, app) = app(stub);

        let form = input();
        let first = app.submit(&form);
        let second = async {
            let result = app.submit(&input()).await;
            tx.send(()).unwrap();
            result
        };
        let (first, second) = tokio::join!(first, second);

        assert!(first.is_ok());
        assert_eq!(second.unwrap_err(), QuizError::Busy);
        assert_eq!(backend.generate_calls.load(Ordering::SeqCst), 1);
        assert!(!app.is_loading());
    }

    #[tokio::test]
    async fn dropped_generation_releases_loading() {
        let stub = StubBackend::generating(problems(1));
        let (_tx, rx) = oneshot::channel::<()>();
        *stub.generate_gate.lock().unwrap() = Some(rx);
        let (_, surface, app) = app(stub);

        let input = input();
        assert!(app.submit(&input).now_or_never().is_none());
        assert!(!app.is_loading());
        assert!(surface.snapshot().submit_enabled);
    }

    #[tokio::test]
    async fn export_without_result_makes_no_request() {
        let (backend, surface, app) = app(StubBackend::default());
        let err = app.export_pdf().await.unwrap_err();

        assert_eq!(
            err,
            QuizError::Validation(ValidationError::NothingToExport)
        );
        assert_eq!(backend.pdf_calls.load(Ordering::SeqCst), 0);
        let page = surface.snapshot();
        assert!(page.last_error().is_some());
        assert_eq!(page.export_control, ExportControl::Disabled);
    }

    #[tokio::test]
    async fn export_saves_download_and_restores_control() {
        let (_, surface, app) = app(StubBackend::generating(problems(1)));
        app.submit(&input()).await.unwrap();

        let download = app.export_pdf().await.unwrap();
        assert!(download.filename.starts_with("math_中学1年_分数_"));
        assert!(download.filename.ends_with(".pdf"));

        let page = surface.snapshot();
        assert_eq!(page.downloads, vec![download]);
        assert_eq!(page.export_control, ExportControl::Ready);
        assert!(!app.is_exporting());
    }

    #[tokio::test]
    async fn failed_export_restores_control() {
        let (backend, surface, app) = app(StubBackend::generating(problems(1)));
        app.submit(&input()).await.unwrap();
        backend.set_pdf(Err(BackendError::server(500, Some("font missing".into()))));

        assert!(app.export_pdf().await.is_err());
        let page = surface.snapshot();
        assert_eq!(page.last_error(), Some("font missing"));
        assert_eq!(page.export_control, ExportControl::Ready);
        assert!(page.downloads.is_empty());
    }

    #[tokio::test]
    async fn second_export_while_exporting_is_rejected() {
        let (backend, surface, app) = app(StubBackend::generating(problems(1)));
        app.submit(&input()).await.unwrap();
        let (tx, rx) = oneshot::channel();
        *backend.pdf_gate.lock().unwrap() = Some(rx);

        let first = app.export_pdf();
        let second = async {
            let mid = surface.snapshot().export_control;
            let result = app.export_pdf().await;
            tx.send(()).unwrap();
            (mid, result)
        };
        let (first, (mid, second)) = tokio::join!(first, second);

        assert!(first.is_ok());
        assert_eq!(mid, ExportControl::Exporting);
        assert_eq!(mid.label(), "PDF生成中...");
        assert!(!mid.is_enabled());
        assert_eq!(second.unwrap_err(), QuizError::Busy);
        assert_eq!(backend.pdf_calls.load(Ordering::SeqCst), 1);
        assert!(!app.is_exporting());
        assert_eq!(surface.snapshot().export_control, ExportControl::Ready);
    }

    #[tokio::test]
    async fn dropped_export_releases_control() {
        let (backend, surface, app) = app(StubBackend::generating(problems(1)));
        app.submit(&input()).await.unwrap();
        let (_tx, rx) = oneshot::channel::<()>();
        *backend.pdf_gate.lock().unwrap() = Some(rx);

        assert!(app.export_pdf().now_or_never().is_none());
        assert!(!app.is_exporting());
        let page = surface.snapshot();
        assert_eq!(page.export_control, ExportControl::Ready);
        assert!(page.downloads.is_empty());

        // The control is usable again once the gate is gone.
        app.export_pdf().await.unwrap();
        assert_eq!(backend.pdf_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn edit_round_trip_updates_only_target() {
        let (_, surface, app) = app(StubBackend::generating(problems(2)));
        app.submit(&input()).await.unwrap();
        let before = app.current_problem_set().unwrap();

        app.open_editor().unwrap();
        assert!(surface.snapshot().editor.is_some());
        assert!(app.edit_field(1, EditField::Answer, "1/3"));
        app.save_edits().unwrap();

        let after = app.current_problem_set().unwrap();
        assert_eq!(after.problems()[0].answer, "1/3");
        assert_eq!(after.problems()[1], before.problems()[1]);

        let page = surface.snapshot();
        assert!(page.editor.is_none());
        assert!(page
            .preview
            .unwrap()
            .contains("<strong>解答:</strong> 1/3"));
        assert!(page
            .notices
            .contains(&Notice::Success(EDIT_SAVED_MESSAGE.to_string())));
    }

    #[tokio::test]
    async fn cancel_discards_edits() {
        let (_, surface, app) = app(StubBackend::generating(problems(1)));
        app.submit(&input()).await.unwrap();

        app.open_editor().unwrap();
        app.apply_edit_form([("question-1", "changed")]);
        app.cancel_edits();

        assert_eq!(app.current_problem_set(), Some(problems(1)));
        assert!(!app.is_editing());
        assert!(surface.snapshot().editor.is_none());
    }

    #[test]
    fn editor_requires_a_set() {
        let (_, _, app) = app(StubBackend::default());
        assert_eq!(
            app.open_editor().unwrap_err(),
            QuizError::Validation(ValidationError::NothingToEdit)
        );
        assert!(!app.edit_field(1, EditField::Answer, "x"));
    }

    #[test]
    fn subject_change_updates_visibility() {
        let (_, surface, app) = app(StubBackend::default());
        app.select_subject("english");
        let page = surface.snapshot();
        assert!(page.vocabulary_visible);
        assert_eq!(page.grade_options.len(), 7);

        app.select_subject("science");
        let page = surface.snapshot();
        assert!(!page.vocabulary_visible);
        assert!(page.grade_options.is_empty());
        assert_eq!(page.unit_options, UnitOptions::Idle);
    }

    #[tokio::test]
    async fn grade_change_populates_units() {
        let mut stub = StubBackend::default();
        stub.units
            .insert("中学1年".into(), vec!["正負の数".into(), "文字と式".into()]);
        let (_, surface, app) = app(stub);

        app.select_subject("math");
        let fetched = app.select_grade("中学1年").await.unwrap();
        assert_eq!(
            fetched,
            UnitFetch::Applied(vec!["正負の数".into(), "文字と式".into()])
        );
        assert!(matches!(
            surface.snapshot().unit_options,
            UnitOptions::Populated(ref u) if u.len() == 2
        ));
    }

    #[tokio::test]
    async fn unit_fetch_failure_is_surfaced() {
        let (_, surface, app) = app(StubBackend::default());
        app.select_subject("math");
        assert!(app.select_grade("中学2年").await.is_err());
        let page = surface.snapshot();
        assert_eq!(page.unit_options, UnitOptions::Failed);
        assert!(page.last_error().unwrap().starts_with(UNIT_FAILED));
    }

    #[tokio::test]
    async fn long_form_grade_shows_paragraph_count() {
        let mut stub = StubBackend::default();
        stub.units
            .insert(crate::catalog::LONG_FORM_ENGLISH.into(), vec!["長文読解".into()]);
        let (_, surface, app) = app(stub);
        app.select_subject("english");
        app.select_grade(crate::catalog::LONG_FORM_ENGLISH)
            .await
            .unwrap();
        assert!(surface.snapshot().paragraph_count_visible);
    }

    #[tokio::test]
    async fn superseded_unit_fetch_never_wins() {
        let stub = StubBackend::default();
        let (tx_a, rx_a) = oneshot::channel();
        let (tx_b, rx_b) = oneshot::channel();
        {
            let mut gates = stub.unit_gates.lock().unwrap();
            gates.insert("中学1年".into(), rx_a);
            gates.insert("中学2年".into(), rx_b);
        }
        let (backend, surface, app) = app(stub);
        app.select_subject("math");

        let resolve = async {
            tx_b.send(vec!["一次関数".into()]).unwrap();
            tokio::task::yield_now().await;
            tx_a.send(vec!["正負の数".into()]).unwrap();
        };
        let (a, b, ()) = tokio::join!(
            app.select_grade("中学1年"),
            app.select_grade("中学2年"),
            resolve
        );

        assert_eq!(a.unwrap(), UnitFetch::Superseded);
        assert_eq!(b.unwrap(), UnitFetch::Applied(vec!["一次関数".into()]));
        assert_eq!(
            surface.snapshot().unit_options,
            UnitOptions::Populated(vec!["一次関数".into()])
        );
        assert_eq!(backend.unit_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn superseded_unit_fetch_failure_is_silent() {
        let stub = StubBackend::default();
        let (tx_a, rx_a) = oneshot::channel::<Vec<String>>();
        let (tx_b, rx_b) = oneshot::channel();
        {
            let mut gates = stub.unit_gates.lock().unwrap();
            gates.insert("中学1年".into(), rx_a);
            gates.insert("中学2年".into(), rx_b);
        }
        let (_, surface, app) = app(stub);
        app.select_subject("math");

        let resolve = async {
            tx_b.send(vec!["確率".into()]).unwrap();
            tokio::task::yield_now().await;
            // Dropping the sender fails the stale fetch.
            drop(tx_a);
        };
        let (a, b, ()) = tokio::join!(
            app.select_grade("中学1年"),
            app.select_grade("中学2年"),
            resolve
        );

        assert_eq!(a.unwrap(), UnitFetch::Superseded);
        assert_eq!(b.unwrap(), UnitFetch::Applied(vec!["確率".into()]));
        let page = surface.snapshot();
        assert_eq!(page.unit_options, UnitOptions::Populated(vec!["確率".into()]));
        assert_eq!(page.last_error(), None);
    }

    #[tokio::test]
    async fn restored_set_can_be_exported() {
        let (backend, surface, app) = app(StubBackend::default());
        app.restore(input().to_selection().unwrap(), problems(2));

        assert_eq!(surface.snapshot().export_control, ExportControl::Ready);
        app.export_pdf().await.unwrap();
        assert_eq!(backend.pdf_calls.load(Ordering::SeqCst), 1);
        assert_eq!(backend.generate_calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn filename_uses_settings_and_timestamp() {
        let settings = input().to_selection().unwrap();
        let now = Local::now();
        let name = pdf_filename(&settings, now);
        assert_eq!(
            name,
            format!("math_中学1年_分数_{}.pdf", now.format("%Y%m%d_%H%M%S"))
        );

        let mut odd = settings;
        odd.unit = "a/b".into();
        assert!(!pdf_filename(&odd, now).contains('/'));
    }
}

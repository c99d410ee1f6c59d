//! A headless [`Surface`] that records what the page would show.
//!
//! Used by tests and by the command-line driver, which has no page but still
//! wants the preview markup and downloads.

use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::traits::{Download, ExportControl, Notice, Surface};
use crate::units::UnitOptions;

/// What a page would currently display.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageSnapshot {
    pub grade_options: Vec<String>,
    pub vocabulary_visible: bool,
    pub paragraph_count_visible: bool,
    pub unit_options: UnitOptions,
    pub loading: bool,
    pub submit_enabled: bool,
    pub preview: Option<String>,
    pub preview_visible: bool,
    pub typeset_requests: u32,
    pub editor: Option<String>,
    pub export_control: ExportControl,
    pub notices: Vec<Notice>,
    pub downloads: Vec<Download>,
}

impl PageSnapshot {
    /// Most recent error notification, if any.
    pub fn last_error(&self) -> Option<&str> {
        self.notices.iter().rev().find_map(|n| match n {
            Notice::Error(msg) => Some(msg.as_str()),
            Notice::Success(_) => None,
        })
    }
}

/// Surface with no display; keeps a [`PageSnapshot`].
#[derive(Debug)]
pub struct HeadlessSurface {
    page: Mutex<PageSnapshot>,
}

impl Default for HeadlessSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadlessSurface {
    pub fn new() -> Self {
        Self {
            page: Mutex::new(PageSnapshot {
                submit_enabled: true,
                ..Default::default()
            }),
        }
    }

    pub fn snapshot(&self) -> PageSnapshot {
        self.page().clone()
    }

    /// Remove and return the downloads saved so far.
    pub fn take_downloads(&self) -> Vec<Download> {
        std::mem::take(&mut self.page().downloads)
    }

    fn page(&self) -> MutexGuard<'_, PageSnapshot> {
        self.page.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Surface for HeadlessSurface {
    fn set_grade_options(&self, grades: &[&str]) {
        self.page().grade_options = grades.iter().map(|g| g.to_string()).collect();
    }

    fn set_vocabulary_visible(&self, visible: bool) {
        self.page().vocabulary_visible = visible;
    }

    fn set_paragraph_count_visible(&self, visible: bool) {
        self.page().paragraph_count_visible = visible;
    }

    fn set_unit_options(&self, options: &UnitOptions) {
        self.page().unit_options = options.clone();
    }

    fn set_loading(&self, loading: bool) {
        let mut page = self.page();
        page.loading = loading;
        page.submit_enabled = !loading;
    }

    fn show_preview(&self, markup: &str) {
        let mut page = self.page();
        page.preview = Some(markup.to_string());
        page.preview_visible = true;
    }

    fn hide_preview(&self) {
        self.page().preview_visible = false;
    }

    fn typeset_math(&self) {
        self.page().typeset_requests += 1;
    }

    fn open_editor(&self, markup: &str) {
        self.page().editor = Some(markup.to_string());
    }

    fn close_editor(&self) {
        self.page().editor = None;
    }

    fn set_export_control(&self, control: ExportControl) {
        self.page().export_control = control;
    }

    fn notify(&self, notice: Notice) {
        self.page().notices.push(notice);
    }

    fn save_download(&self, download: Download) {
        self.page().downloads.push(download);
    }
}

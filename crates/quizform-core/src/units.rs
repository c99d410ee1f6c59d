//! Unit selector state and stale-response protection for unit fetches.
//!
//! Every fetch is issued with a [`UnitTicket`] that records the subject and
//! grade it was started for. A response is applied only if its ticket still
//! matches the current selection and no newer fetch was started since; a
//! response for a superseded selection is discarded.

use crate::error::BackendError;
use crate::model::Subject;

/// What the unit selector currently shows.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum UnitOptions {
    /// No subject/grade pair selected yet.
    #[default]
    Idle,
    /// A fetch is outstanding.
    Loading,
    /// Units available for selection.
    Populated(Vec<String>),
    /// The last fetch failed.
    Failed,
}

/// Identifies one unit fetch and the selection it was issued for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitTicket {
    seq: u64,
    pub subject: Subject,
    pub grade: String,
}

/// Tracks the selection that drives unit population.
#[derive(Debug, Default)]
pub struct UnitResolver {
    subject: Option<Subject>,
    grade: Option<String>,
    next_seq: u64,
    latest: Option<u64>,
    options: UnitOptions,
}

impl UnitResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subject(&self) -> Option<Subject> {
        self.subject
    }

    pub fn grade(&self) -> Option<&str> {
        self.grade.as_deref()
    }

    pub fn options(&self) -> &UnitOptions {
        &self.options
    }

    /// Subject changed: the grade and any outstanding fetch no longer apply.
    pub fn select_subject(&mut self, subject: Option<Subject>) -> &UnitOptions {
        self.subject = subject;
        self.grade = None;
        self.latest = None;
        self.options = UnitOptions::Idle;
        &self.options
    }

    /// Grade changed. Returns a ticket when a fetch should be issued.
    pub fn select_grade(&mut self, grade: &str) -> Option<UnitTicket> {
        let grade = grade.trim();
        let subject = match (self.subject, grade.is_empty()) {
            (Some(subject), false) => subject,
            _ => {
                self.grade = None;
                self.latest = None;
                self.options = UnitOptions::Idle;
                return None;
            }
        };

        let seq = self.next_seq;
        self.next_seq += 1;
        self.grade = Some(grade.to_string());
        self.latest = Some(seq);
        self.options = UnitOptions::Loading;

        Some(UnitTicket {
            seq,
            subject,
            grade: grade.to_string(),
        })
    }

    /// Whether a response for `ticket` would still be applied.
    pub fn is_current(&self, ticket: &UnitTicket) -> bool {
        self.latest == Some(ticket.seq)
            && self.subject == Some(ticket.subject)
            && self.grade.as_deref() == Some(ticket.grade.as_str())
    }

    /// Apply a fetch result. Returns `None` when the ticket is stale and the
    /// result was discarded.
    pub fn finish(
        &mut self,
        ticket: &UnitTicket,
        result: Result<Vec<String>, BackendError>,
    ) -> Option<&UnitOptions> {
        if !self.is_current(ticket) {
            return None;
        }
        self.latest = None;
        self.options = match result {
            Ok(units) => UnitOptions::Populated(units),
            Err(_) => UnitOptions::Failed,
        };
        Some(&self.options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn units(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn grade_without_subject_does_not_fetch() {
        let mut resolver = UnitResolver::new();
        assert!(resolver.select_grade("中学1年").is_none());
        assert_eq!(resolver.options(), &UnitOptions::Idle);
    }

    #[test]
    fn fetch_populates_selector() {
        let mut resolver = UnitResolver::new();
        resolver.select_subject(Some(Subject::Math));
        let ticket = resolver.select_grade("中学1年").unwrap();
        assert_eq!(resolver.options(), &UnitOptions::Loading);

        let applied = resolver.finish(&ticket, Ok(units(&["正負の数"])));
        assert_eq!(applied, Some(&UnitOptions::Populated(units(&["正負の数"]))));
    }

    #[test]
    fn superseded_response_is_discarded() {
        let mut resolver = UnitResolver::new();
        resolver.select_subject(Some(Subject::Math));
        let a = resolver.select_grade("中学1年").unwrap();
        let b = resolver.select_grade("中学2年").unwrap();

        assert!(resolver.finish(&b, Ok(units(&["連立方程式"]))).is_some());
        assert!(resolver.finish(&a, Ok(units(&["正負の数"]))).is_none());
        assert_eq!(
            resolver.options(),
            &UnitOptions::Populated(units(&["連立方程式"]))
        );
    }

    #[test]
    fn stale_response_arriving_first_is_also_discarded() {
        let mut resolver = UnitResolver::new();
        resolver.select_subject(Some(Subject::Math));
        let a = resolver.select_grade("中学1年").unwrap();
        let b = resolver.select_grade("中学2年").unwrap();

        assert!(resolver.finish(&a, Ok(units(&["正負の数"]))).is_none());
        assert_eq!(resolver.options(), &UnitOptions::Loading);
        assert!(resolver.finish(&b, Ok(units(&["確率"]))).is_some());
    }

    #[test]
    fn reselecting_same_grade_still_supersedes() {
        let mut resolver = UnitResolver::new();
        resolver.select_subject(Some(Subject::English));
        let first = resolver.select_grade("中学1年").unwrap();
        let second = resolver.select_grade("中学1年").unwrap();
        assert!(!resolver.is_current(&first));
        assert!(resolver.is_current(&second));
    }

    #[test]
    fn subject_change_invalidates_outstanding_fetch() {
        let mut resolver = UnitResolver::new();
        resolver.select_subject(Some(Subject::Math));
        let ticket = resolver.select_grade("中学1年").unwrap();
        resolver.select_subject(Some(Subject::English));
        assert!(resolver.finish(&ticket, Ok(units(&["正負の数"]))).is_none());
        assert_eq!(resolver.options(), &UnitOptions::Idle);
    }

    #[test]
    fn failure_marks_selector_failed() {
        let mut resolver = UnitResolver::new();
        resolver.select_subject(Some(Subject::Math));
        let ticket = resolver.select_grade("中学3年").unwrap();
        let applied = resolver.finish(&ticket, Err(BackendError::Network("refused".into())));
        assert_eq!(applied, Some(&UnitOptions::Failed));
    }

    #[test]
    fn clearing_grade_returns_to_idle() {
        let mut resolver = UnitResolver::new();
        resolver.select_subject(Some(Subject::Math));
        let ticket = resolver.select_grade("中学1年").unwrap();
        assert!(resolver.select_grade("").is_none());
        assert_eq!(resolver.options(), &UnitOptions::Idle);
        assert!(!resolver.is_current(&ticket));
    }
}

//! Input form state machine.
//!
//! `Idle → Ready → Submitting → Complete | Ready`. Selection and text entry are
//! refused while a submission is pending, so one attempt has at most one pipeline
//! run in flight. A failed attempt keeps the inputs and holds no partial result.

use std::path::PathBuf;

use crate::intake::notification::Notification;
use crate::intake::validation::{validate_resume, ResumeCandidate, SelectionError};
use crate::models::analysis::AnalysisResult;
use crate::pipeline::{PipelineError, Step};

pub const MISSING_INPUT_MESSAGE: &str = "Please upload a resume and enter a job description";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormPhase {
    /// Missing the file, the text, or both.
    Idle,
    Ready,
    Submitting,
    /// A result is being shown; `new_analysis` returns to `Idle`.
    Complete,
}

/// Everything the pipeline needs for one attempt, snapshotted at submit time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub resume_path: PathBuf,
    pub file_name: String,
    pub mime: Option<String>,
    pub job_description: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitBlocked {
    MissingInput,
    AlreadySubmitting,
}

#[derive(Debug, Default)]
pub struct InputForm {
    resume: Option<ResumeCandidate>,
    job_description: String,
    submitting: bool,
    result: Option<AnalysisResult>,
    notifications: Vec<Notification>,
}

impl InputForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> FormPhase {
        if self.submitting {
            FormPhase::Submitting
        } else if self.result.is_some() {
            FormPhase::Complete
        } else if self.has_inputs() {
            FormPhase::Ready
        } else {
            FormPhase::Idle
        }
    }

    #[cfg(test)]
    pub fn resume(&self) -> Option<&ResumeCandidate> {
        self.resume.as_ref()
    }

    #[cfg(test)]
    pub fn job_description(&self) -> &str {
        &self.job_description
    }

    pub fn character_count(&self) -> usize {
        self.job_description.chars().count()
    }

    pub fn result(&self) -> Option<&AnalysisResult> {
        self.result.as_ref()
    }

    /// Validates and selects a resume. A rejected file leaves the previous
    /// selection in place and raises an error notification. While a submission is
    /// pending the selection is locked and [`SelectionError::SubmissionPending`] is returned.
    pub fn select_file(&mut self, candidate: ResumeCandidate) -> Result<(), SelectionError> {
        if self.submitting {
            return Err(SelectionError::SubmissionPending);
        }
        if let Err(e) = validate_resume(&candidate) {
            self.notify(Notification::error(e.title(), e.to_string()));
            return Err(e);
        }
        self.resume = Some(candidate);
        Ok(())
    }

    pub fn set_job_description(&mut self, text: impl Into<String>) {
        if !self.submitting {
            self.job_description = text.into();
        }
    }

    pub fn can_submit(&self) -> bool {
        !self.submitting && self.has_inputs()
    }

    /// Starts an attempt and hands back what the pipeline should send.
    pub fn begin_submit(&mut self) -> Result<Submission, SubmitBlocked> {
        if self.submitting {
            return Err(SubmitBlocked::AlreadySubmitting);
        }
        let resume = match self.resume.clone() {
            Some(resume) if self.has_inputs() => resume,
            _ => {
                self.notify(Notification::error("Missing information", MISSING_INPUT_MESSAGE));
                return Err(SubmitBlocked::MissingInput);
            }
        };

        let submission = Submission {
            resume_path: resume.path,
            file_name: resume.file_name,
            mime: resume.mime,
            job_description: self.job_description.clone(),
        };
        self.submitting = true;
        self.result = None;
        Ok(submission)
    }

    /// Ends the pending attempt. Ignored when nothing is pending.
    pub fn complete(&mut self, outcome: Result<AnalysisResult, PipelineError>) {
        if !self.submitting {
            return;
        }
        self.submitting = false;

        match outcome {
            Ok(result) => {
                self.result = Some(result);
                self.notify(Notification::success(
                    "Analysis complete",
                    "Your resume has been analyzed successfully",
                ));
            }
            Err(PipelineError::Cancelled { .. }) => {}
            Err(e) => {
                let title = match e.step() {
                    Step::Upload => "Upload failed",
                    Step::Analyze => "Analysis failed",
                };
                self.notify(Notification::error(title, failure_message(&e)));
            }
        }
    }

    /// Discards the current result and starts over with an empty form.
    pub fn new_analysis(&mut self) {
        if !self.submitting {
            *self = Self {
                notifications: std::mem::take(&mut self.notifications),
                ..Self::default()
            };
        }
    }

    /// Drains pending notifications; each is shown once.
    pub fn take_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.notifications)
    }

    fn has_inputs(&self) -> bool {
        self.resume.is_some() && !self.job_description.trim().is_empty()
    }

    fn notify(&mut self, notification: Notification) {
        self.notifications.push(notification);
    }
}

fn failure_message(error: &PipelineError) -> String {
    match error {
        PipelineError::Timeout { step, .. } => {
            format!("The {step} step took too long. Please try again.")
        }
        PipelineError::Upload(_) => "Failed to upload files. Please try again.".to_string(),
        _ => "Failed to analyze resume. Please try again.".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intake::notification::NotificationKind;
    use crate::intake::validation::{candidate, DOCX_MIME, MAX_RESUME_BYTES, PDF_MIME};
    use crate::models::analysis::fixtures::sample_result;
    use crate::pipeline::BackendError;
    use std::time::Duration;

    fn ready_form() -> InputForm {
        let mut form = InputForm::new();
        form.select_file(candidate("cv.pdf", 2048, Some(PDF_MIME)))
            .unwrap();
        form.set_job_description("Rust backend engineer");
        form
    }

    #[test]
    fn test_starts_idle_and_blocks_submit() {
        let mut form = InputForm::new();
        assert_eq!(form.phase(), FormPhase::Idle);
        assert!(!form.can_submit());
        assert_eq!(form.begin_submit(), Err(SubmitBlocked::MissingInput));

        let notes = form.take_notifications();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].message, MISSING_INPUT_MESSAGE);
    }

    #[test]
    fn test_blank_text_is_not_ready() {
        let mut form = InputForm::new();
        form.select_file(candidate("cv.pdf", 10, Some(PDF_MIME))).unwrap();
        form.set_job_description("   \n");
        assert_eq!(form.phase(), FormPhase::Idle);
        assert!(!form.can_submit());
    }

    #[test]
    fn test_rejected_file_keeps_previous_selection() {
        let mut form = ready_form();
        form.take_notifications();

        let err = form
            .select_file(candidate("photo.png", 10, Some("image/png")))
            .unwrap_err();
        assert!(matches!(err, SelectionError::UnsupportedType { .. }));
        assert_eq!(form.resume().unwrap().file_name, "cv.pdf");

        let notes = form.take_notifications();
        assert_eq!(notes.len(), 1);
        assert!(notes[0].is_error());
        assert_eq!(notes[0].title, "Invalid file type");
    }

    #[test]
    fn test_oversized_file_is_rejected_with_size_message() {
        let mut form = InputForm::new();
        let err = form
            .select_file(candidate("cv.docx", MAX_RESUME_BYTES + 1, Some(DOCX_MIME)))
            .unwrap_err();
        assert_eq!(err.to_string(), "File size must be less than 5MB");
        assert!(form.resume().is_none());
        assert_eq!(form.phase(), FormPhase::Idle);
    }

    #[test]
    fn test_character_count_counts_chars_not_bytes() {
        let mut form = InputForm::new();
        form.set_job_description("Développeur");
        assert_eq!(form.character_count(), 11);
    }

    #[test]
    fn test_submit_snapshots_inputs_and_locks_form() {
        let mut form = ready_form();
        let submission = form.begin_submit().unwrap();

        assert_eq!(submission.file_name, "cv.pdf");
        assert_eq!(submission.mime.as_deref(), Some(PDF_MIME));
        assert_eq!(submission.job_description, "Rust backend engineer");
        assert_eq!(form.phase(), FormPhase::Submitting);
        assert!(!form.can_submit());
        assert_eq!(form.begin_submit(), Err(SubmitBlocked::AlreadySubmitting));

        form.set_job_description("changed mid-flight");
        assert_eq!(form.job_description(), "Rust backend engineer");
    }

    #[test]
    fn test_select_file_while_submitting_is_refused() {
        let mut form = ready_form();
        form.begin_submit().unwrap();

        let err = form
            .select_file(candidate("other.docx", 10, Some(DOCX_MIME)))
            .unwrap_err();
        assert_eq!(err, SelectionError::SubmissionPending);
        assert_eq!(form.resume().unwrap().file_name, "cv.pdf");
        assert!(form.take_notifications().is_empty());
    }

    #[test]
    fn test_success_stores_result_and_notifies() {
        let mut form = ready_form();
        form.begin_submit().unwrap();
        form.complete(Ok(sample_result()));

        assert_eq!(form.phase(), FormPhase::Complete);
        assert_eq!(form.result(), Some(&sample_result()));
        let notes = form.take_notifications();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].kind, NotificationKind::Success);
    }

    #[test]
    fn test_upload_failure_keeps_selection_and_returns_to_ready() {
        let mut form = ready_form();
        form.begin_submit().unwrap();
        form.complete(Err(PipelineError::Upload(BackendError::Status {
            status: 500,
            message: "Failed to upload files".to_string(),
        })));

        assert_eq!(form.phase(), FormPhase::Ready);
        assert!(form.result().is_none());
        assert_eq!(form.resume().unwrap().file_name, "cv.pdf");
        let notes = form.take_notifications();
        assert_eq!(notes[0].title, "Upload failed");
    }

    #[test]
    fn test_analysis_timeout_notifies_with_step() {
        let mut form = ready_form();
        form.begin_submit().unwrap();
        form.complete(Err(PipelineError::Timeout {
            step: Step::Analyze,
            after: Duration::from_secs(60),
        }));

        let notes = form.take_notifications();
        assert_eq!(notes[0].title, "Analysis failed");
        assert!(notes[0].message.contains("analyze"));
    }

    #[test]
    fn test_cancellation_is_silent() {
        let mut form = ready_form();
        form.begin_submit().unwrap();
        form.complete(Err(PipelineError::Cancelled { step: Step::Upload }));

        assert_eq!(form.phase(), FormPhase::Ready);
        assert!(form.take_notifications().is_empty());
    }

    #[test]
    fn test_complete_without_pending_submit_is_ignored() {
        let mut form = ready_form();
        form.complete(Ok(sample_result()));
        assert!(form.result().is_none());
    }

    #[test]
    fn test_new_analysis_resets_form() {
        let mut form = ready_form();
        form.begin_submit().unwrap();
        form.complete(Ok(sample_result()));
        form.new_analysis();

        assert_eq!(form.phase(), FormPhase::Idle);
        assert!(form.result().is_none());
        assert!(form.resume().is_none());
        assert_eq!(form.job_description(), "");
    }
}

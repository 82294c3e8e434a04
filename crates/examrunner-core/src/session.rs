//! The exam session controller.
//!
//! `ExamSession` owns the stage, the per-question status tracker, and the
//! append-only answer log. Every mutation goes through its operations, each
//! of which either completes or is rejected without changing anything.
//!
//! ```text
//! Intro --start--> Exam(0) --next/skip--> Exam(i+1) ... --next/skip--> Result
//!                  Exam(i) --navigate_to(j)--> Exam(j)
//!                  Exam(i) --quit--> Result
//! any   --restart--> Intro
//! ```

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::error::SessionError;
use crate::model::{Question, QuestionBank, QuestionStatus, Stage, SubmittedAnswer};
use crate::report::ExamResults;
use crate::traits::SessionObserver;

/// Source of the completion timestamp.
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Outcome of a `submit` call that was not rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The answer was appended to the log.
    Recorded(SubmittedAnswer),
    /// The question already had an answer; nothing changed.
    AlreadyAnswered,
}

/// Counters shown while an exam is in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Progress {
    /// One-based position of the current question, in the exam stage.
    pub position: Option<usize>,
    pub total: usize,
    pub answered: usize,
    pub skipped: usize,
    pub unanswered: usize,
    pub correct: usize,
    pub wrong: usize,
}

/// A single exam session over a shared question bank.
pub struct ExamSession {
    id: Uuid,
    bank: Arc<QuestionBank>,
    stage: Stage,
    statuses: Vec<QuestionStatus>,
    answers: Vec<SubmittedAnswer>,
    completed_at: Option<DateTime<Utc>>,
    clock: Clock,
    observers: Vec<Arc<dyn SessionObserver>>,
}

impl fmt::Debug for ExamSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExamSession")
            .field("id", &self.id)
            .field("questions", &self.bank.len())
            .field("stage", &self.stage)
            .field("answers", &self.answers.len())
            .field("completed_at", &self.completed_at)
            .finish()
    }
}

impl ExamSession {
    pub fn new(bank: Arc<QuestionBank>) -> Self {
        let statuses = vec![QuestionStatus::Unanswered; bank.len()];
        Self {
            id: Uuid::new_v4(),
            bank,
            stage: Stage::Intro,
            statuses,
            answers: Vec::new(),
            completed_at: None,
            clock: Arc::new(Utc::now),
            observers: Vec::new(),
        }
    }

    /// Replace the clock used to timestamp completion.
    pub fn with_clock(mut self, clock: impl Fn() -> DateTime<Utc> + Send + Sync + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// Attach an observer that is notified after every operation.
    pub fn with_observer(mut self, observer: Arc<dyn SessionObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn bank(&self) -> &Arc<QuestionBank> {
        &self.bank
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn question_count(&self) -> usize {
        self.bank.len()
    }

    /// The question being shown, in the exam stage.
    pub fn current_question(&self) -> Option<&Question> {
        self.stage.current_index().and_then(|i| self.bank.get(i))
    }

    /// Status of the current question, in the exam stage.
    pub fn current_status(&self) -> Option<QuestionStatus> {
        self.stage.current_index().map(|i| self.statuses[i])
    }

    pub fn status_of(&self, index: usize) -> Option<QuestionStatus> {
        self.statuses.get(index).copied()
    }

    /// Per-question statuses in question order.
    pub fn statuses(&self) -> &[QuestionStatus] {
        &self.statuses
    }

    /// The answer log in submission order.
    pub fn answers(&self) -> &[SubmittedAnswer] {
        &self.answers
    }

    /// When the result stage was entered, if it has been.
    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    pub fn progress(&self) -> Progress {
        let answered = self.statuses.iter().filter(|s| s.is_answered()).count();
        let skipped = self.statuses.iter().filter(|s| s.is_skipped()).count();
        let correct = self.answers.iter().filter(|a| a.is_correct).count();

        Progress {
            position: self.stage.current_index().map(|i| i + 1),
            total: self.bank.len(),
            answered,
            skipped,
            unanswered: self.bank.len() - answered - skipped,
            correct,
            wrong: self.answers.len() - correct,
        }
    }

    /// Final results; only available in the result stage.
    pub fn results(&self) -> Result<ExamResults, SessionError> {
        match (self.stage, self.completed_at) {
            (Stage::Result, Some(completed_at)) => {
                Ok(ExamResults::from_log(&self.answers, completed_at))
            }
            _ => Err(SessionError::ResultsUnavailable(self.stage.kind())),
        }
    }

    // -----------------------------------------------------------------------
    // Operations
    // -----------------------------------------------------------------------

    /// Leave the intro and show the first question.
    pub fn start(&mut self) -> Result<(), SessionError> {
        if self.stage != Stage::Intro {
            return Err(self.reject("start"));
        }
        self.transition(Stage::Exam { current_index: 0 });
        Ok(())
    }

    /// Record an answer for the current question.
    ///
    /// Does not advance; call [`next`](Self::next) to move on.
    pub fn submit(&mut self, selected_index: usize) -> Result<SubmitOutcome, SessionError> {
        let index = self.exam_index("submit")?;

        if self.statuses[index].is_answered() {
            tracing::debug!(session = %self.id, index, "ignoring repeated submission");
            return Ok(SubmitOutcome::AlreadyAnswered);
        }

        let question = &self.bank.questions()[index];
        if selected_index >= question.options.len() {
            let err = SessionError::SelectionOutOfRange {
                selected: selected_index,
                option_count: question.options.len(),
            };
            self.notify_rejected("submit", &err);
            return Err(err);
        }

        let is_correct = question.is_correct(selected_index);
        let answer = SubmittedAnswer {
            question_id: question.id,
            selected_index,
            is_correct,
            correct_index: question.answer_index,
        };

        self.answers.push(answer.clone());
        self.statuses[index] = QuestionStatus::Answered {
            selected_index,
            is_correct,
        };

        for observer in &self.observers {
            observer.on_answer(&answer);
        }
        Ok(SubmitOutcome::Recorded(answer))
    }

    /// Mark the current question skipped (unless it already has a status)
    /// and advance.
    pub fn skip(&mut self) -> Result<Stage, SessionError> {
        let index = self.exam_index("skip")?;

        if self.statuses[index].is_unanswered() {
            self.statuses[index] = QuestionStatus::Skipped;
            let question_id = self.bank.questions()[index].id;
            for observer in &self.observers {
                observer.on_skip(question_id);
            }
        }

        self.next()
    }

    /// Move to the following question, or to the result stage after the last.
    pub fn next(&mut self) -> Result<Stage, SessionError> {
        let index = self.exam_index("next")?;

        let to = if index + 1 < self.bank.len() {
            Stage::Exam {
                current_index: index + 1,
            }
        } else {
            Stage::Result
        };
        self.transition(to);
        Ok(to)
    }

    /// Jump directly to any question. Statuses are left untouched.
    pub fn navigate_to(&mut self, index: usize) -> Result<(), SessionError> {
        self.exam_index("navigate")?;

        if index >= self.bank.len() {
            let err = SessionError::QuestionOutOfRange {
                index,
                question_count: self.bank.len(),
            };
            self.notify_rejected("navigate", &err);
            return Err(err);
        }

        self.transition(Stage::Exam {
            current_index: index,
        });
        Ok(())
    }

    /// End the exam immediately. Remaining questions stay unanswered.
    ///
    /// Confirmation is the caller's responsibility.
    pub fn quit(&mut self) -> Result<(), SessionError> {
        self.exam_index("quit")?;
        self.transition(Stage::Result);
        Ok(())
    }

    /// Clear all answers and statuses and return to the intro.
    pub fn restart(&mut self) {
        self.answers.clear();
        self.statuses.fill(QuestionStatus::Unanswered);
        self.completed_at = None;

        let from = self.stage;
        self.stage = Stage::Intro;
        tracing::debug!(session = %self.id, %from, "restart");
        for observer in &self.observers {
            observer.on_restart();
        }
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn exam_index(&self, operation: &'static str) -> Result<usize, SessionError> {
        match self.stage {
            Stage::Exam { current_index } => Ok(current_index),
            _ => Err(self.reject(operation)),
        }
    }

    fn reject(&self, operation: &'static str) -> SessionError {
        let err = SessionError::InvalidTransition {
            operation,
            stage: self.stage.kind(),
        };
        self.notify_rejected(operation, &err);
        err
    }

    fn notify_rejected(&self, operation: &str, err: &SessionError) {
        for observer in &self.observers {
            observer.on_rejected(operation, err);
        }
    }

    fn transition(&mut self, to: Stage) {
        let from = self.stage;
        if to == Stage::Result && from != Stage::Result {
            self.completed_at = Some((self.clock)());
        }
        self.stage = to;

        tracing::debug!(session = %self.id, %from, %to, "transition");
        for observer in &self.observers {
            observer.on_stage_change(from, to);
        }
    }
}

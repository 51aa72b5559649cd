//! Task completion state machine
//!
//! ```text
//!            toggle / complete
//!   ACTIVE  ------------------>  COMPLETED
//!           <------------------
//!            toggle / reopen
//! ```
//!
//! `status`, `completed` and `completed_at` move together. `completed_at` is
//! stamped by the server on every transition into COMPLETED (including a
//! repeated "complete" on an already completed task) and cleared on every
//! transition into ACTIVE.
//!
//! # Conflicting signals
//!
//! An update may carry both `status` and `completed`. When they disagree the
//! `completed` flag decides.
//!
//! # Example
//!
//! ```
//! use chrono::Utc;
//! use tasknest_shared::completion::CompletionState;
//! use tasknest_shared::models::task::TaskStatus;
//!
//! let now = Utc::now();
//! let done = CompletionState::initial().toggle(now);
//! assert_eq!(done.status, TaskStatus::Completed);
//! assert_eq!(done.completed_at, Some(now));
//!
//! let reopened = done.apply_update(Some(TaskStatus::Active), None, now);
//! assert_eq!(reopened, CompletionState::initial());
//! ```

use chrono::{DateTime, Utc};

use crate::models::task::TaskStatus;

/// The three completion fields of a task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompletionState {
    pub status: TaskStatus,
    pub completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
}

impl CompletionState {
    /// State of every newly created task
    pub fn initial() -> Self {
        Self::active()
    }

    fn active() -> Self {
        Self {
            status: TaskStatus::Active,
            completed: false,
            completed_at: None,
        }
    }

    fn completed_at(now: DateTime<Utc>) -> Self {
        Self {
            status: TaskStatus::Completed,
            completed: true,
            completed_at: Some(now),
        }
    }

    /// Flips `completed` unconditionally
    pub fn toggle(self, now: DateTime<Utc>) -> Self {
        if self.completed {
            Self::active()
        } else {
            Self::completed_at(now)
        }
    }

    /// Resolves the completion signals of an explicit update
    ///
    /// Either `status = COMPLETED` or `completed = true` completes the task;
    /// either `status = ACTIVE` or `completed = false` reopens it. With
    /// neither signal the state is returned untouched.
    pub fn apply_update(
        self,
        status: Option<TaskStatus>,
        completed: Option<bool>,
        now: DateTime<Utc>,
    ) -> Self {
        let target = completed.or_else(|| status.map(|s| s == TaskStatus::Completed));

        match target {
            Some(true) => Self::completed_at(now),
            Some(false) => Self::active(),
            None => self,
        }
    }

    /// Whether the three fields agree with each other
    pub fn is_consistent(&self) -> bool {
        let status_agrees = self.completed == (self.status == TaskStatus::Completed);
        let stamp_agrees = self.completed == self.completed_at.is_some();
        status_agrees && stamp_agrees
    }
}

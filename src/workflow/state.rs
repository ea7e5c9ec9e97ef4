//! Run state machine.

use std::fmt;

/// State of one pipeline run.
///
/// `Running` carries the 0-based index of the executing step; `Failed`
/// carries the 1-based step number so messages read "step 2 of 3".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkflowState {
    Pending,
    Running(usize),
    Succeeded,
    Failed { step: usize, reason: String },
}

impl WorkflowState {
    /// `Succeeded` and `Failed` absorb: no further steps run.
    pub fn is_terminal(&self) -> bool {
        matches!(self, WorkflowState::Succeeded | WorkflowState::Failed { .. })
    }

    /// Pending -> Running(0), or straight to Succeeded when there is nothing
    /// to run. Returns false (and changes nothing) from any other state.
    pub(crate) fn start(&mut self, total: usize) -> bool {
        if *self != WorkflowState::Pending {
            return false;
        }
        *self = if total == 0 {
            WorkflowState::Succeeded
        } else {
            WorkflowState::Running(0)
        };
        true
    }

    /// Running(i) -> Running(i + 1), or Succeeded after the last step.
    pub(crate) fn advance(&mut self, total: usize) {
        if let WorkflowState::Running(i) = *self {
            *self = if i + 1 < total {
                WorkflowState::Running(i + 1)
            } else {
                WorkflowState::Succeeded
            };
        }
    }

    /// Running(i) -> Failed { step: i + 1 }.
    pub(crate) fn fail(&mut self, reason: impl Into<String>) {
        if let WorkflowState::Running(i) = *self {
            *self = WorkflowState::Failed {
                step: i + 1,
                reason: reason.into(),
            };
        }
    }
}

impl fmt::Display for WorkflowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkflowState::Pending => write!(f, "pending"),
            WorkflowState::Running(i) => write!(f, "running step {}", i + 1),
            WorkflowState::Succeeded => write!(f, "succeeded"),
            WorkflowState::Failed { step, reason } => {
                write!(f, "failed at step {}: {}", step, reason)
            }
        }
    }
}

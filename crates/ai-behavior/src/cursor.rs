use std::time::Duration;

use crate::{TaskFailurePolicy, TaskStatus};

/// Position inside the running behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TaskCursor {
    pub index: usize,
    /// Free-form per-task progress counter, zeroed whenever the task changes.
    pub state: i32,
    pub started_at: Duration,
}

/// What the controller must do after [`TaskCursor::apply`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorStep {
    Stay,
    Moved,
    Cancel,
}

impl TaskCursor {
    pub fn new(now: Duration) -> Self {
        Self {
            index: 0,
            state: 0,
            started_at: now,
        }
    }

    /// Applies one task result. Any non-`Continue` result restarts the task clock and state.
    pub fn apply(
        &mut self,
        status: TaskStatus,
        policy: TaskFailurePolicy,
        now: Duration,
    ) -> CursorStep {
        let step = match status {
            TaskStatus::Continue => return CursorStep::Stay,
            TaskStatus::Success => {
                self.index += 1;
                CursorStep::Moved
            }
            TaskStatus::Failure => match policy {
                TaskFailurePolicy::RestartBehavior => {
                    self.index = 0;
                    CursorStep::Moved
                }
                TaskFailurePolicy::CancelBehavior => CursorStep::Cancel,
                TaskFailurePolicy::RetryTask => CursorStep::Moved,
                TaskFailurePolicy::Ignore => {
                    self.index += 1;
                    CursorStep::Moved
                }
            },
        };
        self.state = 0;
        self.started_at = now;
        step
    }

    pub fn is_finished(&self, task_count: usize) -> bool {
        self.index >= task_count
    }
}

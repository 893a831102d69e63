//! Cancellable scheduled callbacks
//!
//! The host (render loop, browser timers) runs the actual callbacks. The
//! session hands out a `TaskId` per scheduled task and every callback must
//! present it back; ids that were cancelled or replaced are stale and the
//! callback becomes a no-op.

use serde::Serialize;

/// Identifier of a scheduled callback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct TaskId(u64);

impl TaskId {
    /// Rebuild an id handed across an FFI boundary
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(&self) -> u64 {
        self.0
    }
}

/// The recurring tasks a session owns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskKind {
    /// Per-frame tick while playing
    Frame,
    /// 1 s countdown step while resuming
    Countdown,
}

/// Result of a host callback
#[derive(Debug, Clone, PartialEq)]
pub enum Callback<T> {
    /// The task was current and did its work
    Ran(T),
    /// The task was cancelled or superseded; nothing happened
    Stale,
}

impl<T> Callback<T> {
    pub fn is_stale(&self) -> bool {
        matches!(self, Callback::Stale)
    }

    pub fn ran(self) -> Option<T> {
        match self {
            Callback::Ran(value) => Some(value),
            Callback::Stale => None,
        }
    }
}

/// At most one live task per kind
#[derive(Debug, Clone, Default)]
pub struct Tasks {
    next: u64,
    frame: Option<TaskId>,
    countdown: Option<TaskId>,
}

impl Tasks {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&mut self, kind: TaskKind) -> &mut Option<TaskId> {
        match kind {
            TaskKind::Frame => &mut self.frame,
            TaskKind::Countdown => &mut self.countdown,
        }
    }

    /// Schedule a new task of `kind`, returning it and the task it replaced
    pub fn schedule(&mut self, kind: TaskKind) -> (TaskId, Option<TaskId>) {
        self.next += 1;
        let id = TaskId(self.next);
        let replaced = self.slot(kind).replace(id);
        (id, replaced)
    }

    /// Cancel the live task of `kind`, if any
    pub fn cancel(&mut self, kind: TaskKind) -> Option<TaskId> {
        self.slot(kind).take()
    }

    pub fn current(&self, kind: TaskKind) -> Option<TaskId> {
        match kind {
            TaskKind::Frame => self.frame,
            TaskKind::Countdown => self.countdown,
        }
    }

    pub fn is_current(&self, kind: TaskKind, id: TaskId) -> bool {
        self.current(kind) == Some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schedule_replaces_previous() {
        let mut tasks = Tasks::new();
        let (first, replaced) = tasks.schedule(TaskKind::Countdown);
        assert_eq!(replaced, None);

        let (second, replaced) = tasks.schedule(TaskKind::Countdown);
        assert_eq!(replaced, Some(first));
        assert!(!tasks.is_current(TaskKind::Countdown, first));
        assert!(tasks.is_current(TaskKind::Countdown, second));
    }

    #[test]
    fn test_cancel_and_kinds_are_independent() {
        let mut tasks = Tasks::new();
        let (frame, _) = tasks.schedule(TaskKind::Frame);
        let (countdown, _) = tasks.schedule(TaskKind::Countdown);
        assert_ne!(frame, countdown);

        assert_eq!(tasks.cancel(TaskKind::Countdown), Some(countdown));
        assert_eq!(tasks.cancel(TaskKind::Countdown), None);
        assert!(tasks.is_current(TaskKind::Frame, frame));
    }

    #[test]
    fn test_callback_helpers() {
        assert!(Callback::<()>::Stale.is_stale());
        assert_eq!(Callback::Ran(3).ran(), Some(3));
    }
}

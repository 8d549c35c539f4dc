//! Deferred task queue.
//!
//! The alert loop never blocks: every suspension is a delayed re-post of one
//! of two callbacks, the poll tick and the sleep resume.  This queue holds
//! those pending callbacks and hands them back to the single consumer (the
//! [`AlertLoop`](crate::app::service::AlertLoop)) once they fall due.
//!
//! ```text
//!  post_delayed(Poll, +300ms) ──┐
//!  post_delayed(Resume, +3s) ───┼──▶ ┌──────────────┐ ──pop_due(now)──▶ AlertLoop
//!  cancel(..) / cancel_all() ───┘    │  TaskQueue   │
//!                                    │ [Poll|Resume]│
//!                                    └──────────────┘
//! ```
//!
//! Time is an explicit `now_ms` argument; the queue never reads a clock.

use log::debug;

// ═══════════════════════════════════════════════════════════════
//  Task identity
// ═══════════════════════════════════════════════════════════════

/// The deferred callbacks the alert loop can schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TaskId {
    /// Read one sample and decide what to do next.
    Poll = 0,
    /// End of the auto-pause; restart monitoring.
    Resume = 1,
}

impl TaskId {
    /// Number of task kinds: sizes the slot array.
    pub const COUNT: usize = 2;

    pub const ALL: [TaskId; Self::COUNT] = [Self::Poll, Self::Resume];

    pub fn name(self) -> &'static str {
        match self {
            Self::Poll => "poll",
            Self::Resume => "resume",
        }
    }
}

// ═══════════════════════════════════════════════════════════════
//  Queue
// ═══════════════════════════════════════════════════════════════

/// Bookkeeping for a pending task.
#[derive(Debug, Clone, Copy)]
struct Pending {
    /// Absolute due time (ms on the caller's clock).
    due_ms: u64,
    /// Post order, breaks ties between tasks due at the same instant.
    seq: u64,
}

/// Fixed-slot delayed task queue, one slot per [`TaskId`].
///
/// Re-posting a task replaces its pending instance, so at most one poll
/// tick can ever be outstanding.
#[derive(Debug, Default)]
pub struct TaskQueue {
    slots: [Option<Pending>; TaskId::COUNT],
    next_seq: u64,
}

impl TaskQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `task` to fire `delay_ms` after `now_ms`.
    pub fn post_delayed(&mut self, task: TaskId, now_ms: u64, delay_ms: u64) {
        let due_ms = now_ms.saturating_add(delay_ms);
        let seq = self.next_seq;
        self.next_seq = self.next_seq.wrapping_add(1);
        if self.slots[task as usize].is_some() {
            debug!("TaskQueue: replacing pending '{}'", task.name());
        }
        self.slots[task as usize] = Some(Pending { due_ms, seq });
    }

    /// Drop the pending instance of `task`, if any.
    /// Returns `true` if something was cancelled.
    pub fn cancel(&mut self, task: TaskId) -> bool {
        self.slots[task as usize].take().is_some()
    }

    /// Drop every pending task.
    pub fn cancel_all(&mut self) {
        for task in TaskId::ALL {
            self.cancel(task);
        }
    }

    pub fn is_pending(&self, task: TaskId) -> bool {
        self.slots[task as usize].is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    /// Due time of `task`, if pending.
    pub fn due_at(&self, task: TaskId) -> Option<u64> {
        self.slots[task as usize].map(|p| p.due_ms)
    }

    /// Earliest due time across all pending tasks.
    pub fn next_deadline(&self) -> Option<u64> {
        self.slots.iter().flatten().map(|p| p.due_ms).min()
    }

    /// Remove and return the earliest task due at or before `now_ms`.
    pub fn pop_due(&mut self, now_ms: u64) -> Option<TaskId> {
        let task = TaskId::ALL
            .into_iter()
            .filter_map(|t| self.slots[t as usize].map(|p| (t, p)))
            .filter(|(_, p)| p.due_ms <= now_ms)
            .min_by_key(|(_, p)| (p.due_ms, p.seq))
            .map(|(t, _)| t)?;
        self.slots[task as usize] = None;
        Some(task)
    }
}

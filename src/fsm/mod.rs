//! Function-pointer finite state machine engine.
//!
//! ```text
//! ┌───────────────────────────────────────────────┐
//! │  StateTable                                   │
//! │  ┌──────────┬───────────┬───────────────────┐ │
//! │  │ StateId  │ on_enter  │ on_update         │ │
//! │  ├──────────┼───────────┼───────────────────┤ │
//! │  │ Stopped  │ fn(ctx)   │ fn(ctx)->Option<> │ │
//! │  │ Polling  │ fn(ctx)   │ fn(ctx)->Option<> │ │
//! │  │ Sleeping │ fn(ctx)   │ fn(ctx)->Option<> │ │
//! │  │ Alarmed  │ fn(ctx)   │ fn(ctx)->Option<> │ │
//! │  └──────────┴───────────┴───────────────────┘ │
//! └───────────────────────────────────────────────┘
//! ```
//!
//! Each poll tick the engine calls `on_update` for the **current** state.
//! If it returns `Some(next_id)`, the engine moves the current pointer
//! and runs `on_enter` for the next state.  Explicit transitions (start, stop, resume) go through
//! [`Fsm::enter`], which always runs the enter action: re-entering
//! `Polling` is how a restart resets the counters.

pub mod context;
pub mod states;

use context::MonitorContext;
use log::info;

// ---------------------------------------------------------------------------
// State identity
// ---------------------------------------------------------------------------

/// Enumeration of all alert loop states.
/// Must stay in sync with the table built in [`states::build_state_table`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum StateId {
    Stopped = 0,
    Polling = 1,
    Sleeping = 2,
    Alarmed = 3,
}

impl StateId {
    /// Total number of states: used to size the table array.
    pub const COUNT: usize = 4;

    /// Convert an index back to `StateId`.  Out-of-range indices fall back
    /// to `Stopped` (and trip a debug assertion).
    pub fn from_index(idx: usize) -> Self {
        match idx {
            0 => Self::Stopped,
            1 => Self::Polling,
            2 => Self::Sleeping,
            3 => Self::Alarmed,
            _ => {
                debug_assert!(false, "invalid state index: {idx}");
                Self::Stopped
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Function-pointer type aliases
// ---------------------------------------------------------------------------

/// Signature for `on_enter` actions.
pub type StateActionFn = fn(&mut MonitorContext);

/// Signature for the per-tick update handler.
/// Returns `Some(next)` to trigger a transition, or `None` to stay.
pub type StateUpdateFn = fn(&mut MonitorContext) -> Option<StateId>;

// ---------------------------------------------------------------------------
// State descriptor (one row in the table)
// ---------------------------------------------------------------------------

/// Static descriptor for a single FSM state.
pub struct StateDescriptor {
    pub name: &'static str,
    pub on_enter: Option<StateActionFn>,
    pub on_update: StateUpdateFn,
}

// ---------------------------------------------------------------------------
// FSM engine
// ---------------------------------------------------------------------------

/// The finite state machine engine.
pub struct Fsm {
    /// Fixed-size table indexed by `StateId as usize`.
    table: [StateDescriptor; StateId::COUNT],
    /// Index of the currently active state.
    current: usize,
    /// Transitions taken since construction.
    transitions: u64,
}

impl Fsm {
    /// Construct a new FSM with the given state table, resting in `initial`.
    /// No enter action runs for the initial state.
    pub fn new(table: [StateDescriptor; StateId::COUNT], initial: StateId) -> Self {
        Self {
            table,
            current: initial as usize,
            transitions: 0,
        }
    }

    /// Run one poll tick through the current state's `on_update`, taking
    /// the transition it asks for.
    pub fn tick(&mut self, ctx: &mut MonitorContext) -> StateId {
        if let Some(next) = (self.table[self.current].on_update)(ctx) {
            self.enter(next, ctx);
        }
        self.current_state()
    }

    /// Transition to `next` and run its `on_enter`.
    /// Runs even when `next` is the current state.
    pub fn enter(&mut self, next: StateId, ctx: &mut MonitorContext) {
        let next_idx = next as usize;

        info!(
            "FSM transition: {} -> {}",
            self.table[self.current].name, self.table[next_idx].name
        );

        self.current = next_idx;
        self.transitions = self.transitions.wrapping_add(1);

        if let Some(enter) = self.table[self.current].on_enter {
            enter(ctx);
        }
    }

    /// The current state's identity.
    pub fn current_state(&self) -> StateId {
        StateId::from_index(self.current)
    }

    pub fn transitions(&self) -> u64 {
        self.transitions
    }
}

//! Optimistic state sync
//!
//! Mutate locally, redraw, then persist. Commands change the store and
//! declare an intent; the queue sends intents one at a time; failures are
//! resolved by the policy each intent carries.

mod command;
mod queue;

pub use command::{Command, Effect, Transition, Undo};
pub use queue::{FailurePolicy, PendingSync, PersistIntent, SyncQueue};

//! State Store
//!
//! The single mutable copy of the session's [`UserState`]. The controller
//! owns the store; renderers only ever see `&UserState`.

use crate::error::CommandError;
use crate::model::{DailyQuest, Quest, SubTask, UserState};

/// Session state plus sync bookkeeping
#[derive(Debug, Default)]
pub struct Store {
    state: UserState,
    /// Whether a persistence failure left local state ahead of the server
    stale: bool,
    /// Whether a server snapshot has been loaded this session
    loaded: bool,
}

impl Store {
    /// Create a store with default (unloaded) state
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store seeded with a state, as if fetched
    pub fn with_state(mut state: UserState) -> Self {
        state.normalize();
        Self {
            state,
            stale: false,
            loaded: true,
        }
    }

    /// Read access for renderers
    pub fn state(&self) -> &UserState {
        &self.state
    }

    /// Write access for commands
    pub(crate) fn state_mut(&mut self) -> &mut UserState {
        &mut self.state
    }

    /// Replace everything with a fresh server snapshot
    pub fn replace(&mut self, mut state: UserState) {
        state.normalize();
        self.state = state;
        self.stale = false;
        self.loaded = true;
    }

    /// Flag local state as diverged from the server
    pub fn mark_stale(&mut self) {
        self.stale = true;
    }

    /// Whether local state may differ from the server
    pub fn is_stale(&self) -> bool {
        self.stale
    }

    /// Whether a server snapshot has been loaded
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Look up a quest
    pub fn quest(&self, quest: usize) -> Result<&Quest, CommandError> {
        self.state
            .quests
            .get(quest)
            .ok_or(CommandError::UnknownQuest(quest))
    }

    /// Look up a sub-task
    pub fn sub_task(&self, quest: usize, task: usize) -> Result<&SubTask, CommandError> {
        self.quest(quest)?
            .sub_tasks
            .get(task)
            .ok_or(CommandError::UnknownSubTask { quest, task })
    }

    pub(crate) fn sub_task_mut(
        &mut self,
        quest: usize,
        task: usize,
    ) -> Result<&mut SubTask, CommandError> {
        self.state
            .quests
            .get_mut(quest)
            .ok_or(CommandError::UnknownQuest(quest))?
            .sub_tasks
            .get_mut(task)
            .ok_or(CommandError::UnknownSubTask { quest, task })
    }

    /// Look up a daily quest by id
    pub fn daily(&self, id: &str) -> Result<&DailyQuest, CommandError> {
        self.state
            .daily_quests
            .iter()
            .find(|q| q.id == id)
            .ok_or_else(|| CommandError::UnknownDailyQuest(id.to_string()))
    }

    pub(crate) fn daily_mut(&mut self, id: &str) -> Result<&mut DailyQuest, CommandError> {
        self.state
            .daily_quests
            .iter_mut()
            .find(|q| q.id == id)
            .ok_or_else(|| CommandError::UnknownDailyQuest(id.to_string()))
    }
}

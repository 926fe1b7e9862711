//! Command Errors
//!
//! Local rejections raised before any request leaves the client.

use thiserror::Error;

use crate::catalog::SkinId;

/// Why a user action was rejected locally
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum CommandError {
    /// Quest index out of range
    #[error("no quest at index {0}")]
    UnknownQuest(usize),

    /// Sub-task index out of range
    #[error("quest {quest} has no sub-task at index {task}")]
    UnknownSubTask {
        /// Quest index
        quest: usize,
        /// Sub-task index
        task: usize,
    },

    /// Daily quest id not in today's list
    #[error("no daily quest with id {0}")]
    UnknownDailyQuest(String),

    /// The item is already completed
    #[error("already completed")]
    AlreadyCompleted,

    /// The sub-task has no quiz to submit or explain
    #[error("no quiz attached")]
    NoQuiz,

    /// At least one quiz question has no selected option
    #[error("quiz has unanswered questions")]
    IncompleteQuiz,

    /// Skin id not in the catalog
    #[error("unknown skin {0}")]
    UnknownSkin(SkinId),

    /// Skin not owned by the user
    #[error("skin {0} is not owned")]
    NotOwned(SkinId),

    /// Skin already owned
    #[error("skin {0} is already owned")]
    AlreadyOwned(SkinId),

    /// Not enough coins for a purchase
    #[error("need {needed} coins, have {available}")]
    InsufficientCoins {
        /// Price
        needed: u32,
        /// Balance
        available: u32,
    },

    /// Input text was empty
    #[error("empty input")]
    EmptyInput,
}

impl CommandError {
    /// Message shown to the user, if this rejection warrants one.
    ///
    /// Stale-index and double-completion rejections are silent: they come
    /// from racing clicks against a re-render, not from user mistakes.
    pub fn user_message(&self) -> Option<&'static str> {
        match self {
            Self::IncompleteQuiz => Some("Please answer all questions before submitting."),
            Self::InsufficientCoins { .. } => Some("Not enough coins!"),
            Self::NotOwned(_) => Some("You don't own that skin yet."),
            Self::AlreadyOwned(_) => Some("You already own that skin."),
            Self::UnknownSkin(_) => Some("That item is not in the store."),
            Self::UnknownQuest(_)
            | Self::UnknownSubTask { .. }
            | Self::UnknownDailyQuest(_)
            | Self::AlreadyCompleted
            | Self::NoQuiz
            | Self::EmptyInput => None,
        }
    }
}

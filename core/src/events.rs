//! Surface Events
//!
//! Events sent from a surface to the [`Controller`](crate::controller::Controller).
//! Surfaces report what the user did; the controller decides what it means.
//! Quest and sub-task positions are indices into the current `quests` list,
//! as carried by the rendered `data-qindex`/`data-tindex` attributes.

use serde::{Deserialize, Serialize};

use crate::catalog::SkinId;

/// Events from surface to Controller
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum UiEvent {
    // ============================================
    // Lifecycle
    // ============================================
    /// Page is ready: load state and chat history
    Started,

    /// Re-fetch the full state from the server
    Reload,

    /// Surface is going away
    QuitRequested,

    // ============================================
    // Navigation
    // ============================================
    /// Dashboard nav button
    ShowDashboard,

    /// Profile nav button
    ShowProfile,

    /// A quest card was clicked
    OpenQuest {
        /// Quest index
        quest: usize,
    },

    // ============================================
    // Quests
    // ============================================
    /// "Complete" on a sub-task
    CompleteSubTask {
        /// Quest index
        quest: usize,
        /// Sub-task index
        task: usize,
    },

    /// A daily quest checkbox was checked
    DailyChecked {
        /// Daily quest id
        id: String,
    },

    /// Daily refresh button
    RefreshDaily,

    // ============================================
    // Quizzes
    // ============================================
    /// "Generate Mini-Test"
    GenerateQuiz {
        /// Quest index
        quest: usize,
        /// Sub-task index
        task: usize,
    },

    /// "Submit Test" with the radio selection of every question
    SubmitQuiz {
        /// Quest index
        quest: usize,
        /// Sub-task index
        task: usize,
        /// Selected option per question, `None` where nothing is checked
        answers: Vec<Option<usize>>,
    },

    /// "Generate New Test": discard the quiz and its attempt
    RetakeQuiz {
        /// Quest index
        quest: usize,
        /// Sub-task index
        task: usize,
    },

    /// "Explain Why" on a missed question
    ExplainAnswer {
        /// Quest index
        quest: usize,
        /// Sub-task index
        task: usize,
        /// Question index
        question: usize,
    },

    // ============================================
    // Chat
    // ============================================
    /// Chat send (button or Enter)
    SendChat {
        /// Raw input text
        text: String,
    },

    /// Quick-quest generate (button or Enter)
    QuickQuest {
        /// Raw goal text
        goal: String,
    },

    // ============================================
    // Store
    // ============================================
    /// Roulette spin button
    SpinRoulette,

    /// Buy button of a store item
    BuySkin {
        /// Skin to buy
        skin: SkinId,
    },

    /// Equip button of an inventory item
    EquipSkin {
        /// Skin to equip
        skin: SkinId,
    },

    /// Leaderboard requested
    LoadLeaderboard,
}

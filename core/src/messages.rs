//! View Messages
//!
//! Messages sent from the [`Controller`](crate::controller::Controller) to a
//! surface. Surfaces are pure renderers: they swap region contents, toggle
//! busy states and show alerts exactly as told, without interpreting state.

use serde::{Deserialize, Serialize};

use crate::catalog::SkinId;
use crate::model::ChatRole;

/// Messages from Controller to surface
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ViewMessage {
    // ============================================
    // Region Rendering
    // ============================================
    /// Replace the full contents of a region
    Render {
        /// Target region
        region: Region,
        /// Complete HTML fragment
        html: String,
    },

    /// Put the quest detail modal on screen
    ShowQuestDetail {
        /// Quest index
        quest: usize,
    },

    /// Switch the top-level view
    Navigate {
        /// View to show
        view: View,
    },

    // ============================================
    // Mascot
    // ============================================
    /// The equipped skin changed; every mascot image shows this artwork
    MascotSkin {
        /// Equipped skin
        skin: SkinId,
        /// Artwork path
        image: String,
    },

    // ============================================
    // Chat
    // ============================================
    /// Append one chat bubble
    ChatBubble {
        /// Author
        role: ChatRole,
        /// Rendered bubble HTML
        html: String,
    },

    /// Drop all bubbles (before replaying history)
    ChatCleared,

    /// Show or hide the typing indicator
    Typing {
        /// Whether the assistant is composing
        active: bool,
    },

    /// Clear a text input after it was consumed
    ClearInput {
        /// Which input
        input: Input,
    },

    // ============================================
    // Controls & Feedback
    // ============================================
    /// Disable a control while its request is in flight, or re-enable it
    Busy {
        /// Which control
        control: Control,
        /// Whether it is busy
        busy: bool,
    },

    /// A daily quest was checked and is settling before it completes
    DailySettling {
        /// Daily quest id
        id: String,
    },

    /// An explanation for a missed quiz question arrived
    Explanation {
        /// Quest index
        quest: usize,
        /// Sub-task index
        task: usize,
        /// Question index
        question: usize,
        /// Rendered explanation HTML
        html: String,
    },

    /// Roulette spin started
    RouletteSpinning,

    /// Roulette spin finished
    RouletteResult {
        /// Image to settle on
        image: String,
        /// Inline status text
        message: String,
        /// Whether a skin was won
        success: bool,
    },

    /// Blocking alert dialog
    Alert {
        /// Text
        message: String,
    },

    /// Non-blocking notification
    Notify {
        /// Severity
        level: NotifyLevel,
        /// Text
        message: String,
    },

    /// One-shot level-up modal
    LevelUp {
        /// New level
        level: u32,
    },

    /// An achievement was unlocked by the server
    AchievementUnlocked {
        /// Achievement id
        id: String,
    },

    /// The controller is shutting down
    Quit,
}

/// Independently re-rendered page regions
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Region {
    /// Level, coins and XP bar (header and profile)
    Hud,
    /// Quests still in progress
    ActiveQuests,
    /// Today's checklist
    DailyQuests,
    /// Sub-task accordion of the open quest
    QuestDetail,
    /// Finished quests on the profile
    CompletedQuests,
    /// Owned skins with equip buttons
    Inventory,
    /// Purchasable skins
    Store,
}

impl Region {
    /// Every region, in first-paint order
    pub const ALL: [Region; 7] = [
        Region::Hud,
        Region::ActiveQuests,
        Region::DailyQuests,
        Region::QuestDetail,
        Region::CompletedQuests,
        Region::Inventory,
        Region::Store,
    ];
}

/// Top-level views
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum View {
    /// Quests, dailies, chat
    #[default]
    Dashboard,
    /// Stats, inventory, completed quests
    Profile,
}

/// Controls that go busy while a request is in flight
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Control {
    /// Chat send button
    SendChat,
    /// Quick-quest generate button
    QuickQuest,
    /// Daily refresh button
    RefreshDaily,
    /// "Generate Mini-Test" button of a sub-task
    GenerateQuiz {
        /// Quest index
        quest: usize,
        /// Sub-task index
        task: usize,
    },
    /// "Explain Why" button of a quiz question
    Explain {
        /// Quest index
        quest: usize,
        /// Sub-task index
        task: usize,
        /// Question index
        question: usize,
    },
    /// Roulette spin button
    Spin,
    /// Buy button of a store item
    Buy {
        /// Skin being bought
        skin: SkinId,
    },
}

/// Text inputs the controller can clear
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Input {
    /// Chat message box
    Chat,
    /// Quick-quest goal box
    QuickQuest,
}

/// Notification severity
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum NotifyLevel {
    /// Informational
    Info,
    /// Warning
    Warning,
    /// Error
    Error,
    /// Success
    Success,
}

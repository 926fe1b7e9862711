//! DOM Surface
//!
//! Applies [`ViewMessage`]s from the controller to a [`Document`]. Each
//! region is a container whose contents are replaced wholesale; everything
//! else (navigation, modals, busy buttons, the roulette panel) is a class or
//! attribute change on a known element id.
//!
//! Messages a user needs to read (alerts, notifications, chat replies,
//! level-ups) come back as [`SurfaceOutput::Line`] for the shell to print.

use oria_core::mascot::MascotHandle;
use oria_core::{ChatRole, Control, Input, NotifyLevel, Region, View, ViewMessage};
use tracing::{debug, warn};

use crate::document::{text_content, Document};
use crate::mascot::MASCOT_IDS;

/// Class hiding an element
pub const HIDDEN: &str = "d-none";

/// Class showing a modal
pub const SHOWN: &str = "show";

const CHAT_CONTAINER: &str = "chat-messages";
const TYPING_INDICATOR: &str = "chat-typing";
const HEADER_STATS: &str = "header-gamification-stats";
const QUEST_MODAL: &str = "questChainModal";
const LEVEL_UP_MODAL: &str = "levelUpModal";
const LEVEL_UP_TEXT: &str = "newLevelText";
const ROULETTE_IMAGE: &str = "roulette-display-img";
const ROULETTE_MESSAGE: &str = "roulette-msg";

/// Container element a region renders into
pub fn region_container(region: Region) -> &'static str {
    match region {
        Region::Hud => "gamification-hud",
        Region::ActiveQuests => "quests-container",
        Region::DailyQuests => "daily-quests-container",
        Region::QuestDetail => "questChainList",
        Region::CompletedQuests => "completed-quests-container",
        Region::Inventory => "inventory-grid",
        Region::Store => "store-grid",
    }
}

/// Human label for a region
pub fn region_label(region: Region) -> &'static str {
    match region {
        Region::Hud => "Stats",
        Region::ActiveQuests => "Active quests",
        Region::DailyQuests => "Daily quests",
        Region::QuestDetail => "Quest detail",
        Region::CompletedQuests => "Completed quests",
        Region::Inventory => "Inventory",
        Region::Store => "Store",
    }
}

/// Button element for a control, when it has a fixed id
pub fn control_element(control: &Control) -> Option<&'static str> {
    match control {
        Control::SendChat => Some("btn-send-chat"),
        Control::QuickQuest => Some("btn-quick-quest"),
        Control::RefreshDaily => Some("btn-refresh-daily"),
        Control::Spin => Some("btn-spin-roulette"),
        Control::GenerateQuiz { .. } | Control::Explain { .. } | Control::Buy { .. } => None,
    }
}

/// Input element for an input
pub fn input_element(input: Input) -> &'static str {
    match input {
        Input::Chat => "chat-input-text",
        Input::QuickQuest => "quick-quest-input",
    }
}

/// What the shell should do after a message was applied
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SurfaceOutput {
    /// Nothing to print
    Silent,
    /// Print a line
    Line(String),
    /// Stop the shell
    Quit,
}

/// Applies view messages to a document
pub struct DomSurface<D> {
    doc: D,
    mascot: Option<MascotHandle>,
    view: View,
}

impl<D: Document> DomSurface<D> {
    /// Surface over `doc`
    pub fn new(doc: D) -> Self {
        Self {
            doc,
            mascot: None,
            view: View::Dashboard,
        }
    }

    /// Forward skin changes and clicks to a running mascot
    #[must_use]
    pub fn with_mascot(mut self, mascot: MascotHandle) -> Self {
        self.mascot = Some(mascot);
        self
    }

    /// The document
    pub fn document(&self) -> &D {
        &self.doc
    }

    /// Current view
    pub fn view(&self) -> View {
        self.view
    }

    /// Detach the mascot, for shutdown
    pub fn take_mascot(&mut self) -> Option<MascotHandle> {
        self.mascot.take()
    }

    /// Click the mascot. Returns false when none is running.
    pub fn poke(&self) -> bool {
        match &self.mascot {
            Some(mascot) => {
                mascot.click();
                true
            }
            None => false,
        }
    }

    /// Readable text of a region's current contents
    pub fn region_text(&self, region: Region) -> Option<String> {
        self.doc
            .inner_html(region_container(region))
            .map(|html| text_content(&html))
    }

    /// Apply one message
    pub fn apply(&mut self, message: ViewMessage) -> SurfaceOutput {
        match message {
            ViewMessage::Render { region, html } => {
                let container = region_container(region);
                if !self.doc.set_inner_html(container, &html) {
                    warn!(container, "Region container missing");
                    return SurfaceOutput::Silent;
                }
                if region == Region::Hud {
                    // Header stats are part of the hud fragment
                    self.doc
                        .toggle_class(HEADER_STATS, HIDDEN, self.view == View::Profile);
                }
                SurfaceOutput::Line(format!("[updated] {}", region_label(region)))
            }

            ViewMessage::ShowQuestDetail { quest } => {
                self.doc.add_class(QUEST_MODAL, SHOWN);
                debug!(quest, "Quest detail shown");
                SurfaceOutput::Silent
            }

            ViewMessage::Navigate { view } => {
                self.navigate(view);
                let name = match view {
                    View::Dashboard => "dashboard",
                    View::Profile => "profile",
                };
                SurfaceOutput::Line(format!("Switched to {name}"))
            }

            ViewMessage::MascotSkin { skin, image } => {
                for id in MASCOT_IDS {
                    self.doc.set_attribute(id, "src", &image);
                }
                if let Some(mascot) = &self.mascot {
                    mascot.set_skin(skin);
                }
                SurfaceOutput::Silent
            }

            ViewMessage::ChatBubble { role, html } => {
                self.doc.append_html(CHAT_CONTAINER, &html);
                let speaker = match role {
                    ChatRole::User => "You",
                    ChatRole::Assistant => "ORIA",
                };
                SurfaceOutput::Line(format!("{speaker}: {}", text_content(&html)))
            }

            ViewMessage::ChatCleared => {
                self.doc.set_inner_html(CHAT_CONTAINER, "");
                SurfaceOutput::Silent
            }

            ViewMessage::Typing { active } => {
                self.doc.toggle_class(TYPING_INDICATOR, HIDDEN, !active);
                if active {
                    SurfaceOutput::Line("ORIA is typing...".to_string())
                } else {
                    SurfaceOutput::Silent
                }
            }

            ViewMessage::ClearInput { input } => {
                self.doc.set_attribute(input_element(input), "value", "");
                SurfaceOutput::Silent
            }

            ViewMessage::Busy { control, busy } => {
                match control_element(&control) {
                    Some(id) if busy => {
                        self.doc.set_attribute(id, "disabled", "");
                    }
                    Some(id) => {
                        self.doc.remove_attribute(id, "disabled");
                    }
                    None => debug!(?control, busy, "Busy state on rendered control"),
                }
                SurfaceOutput::Silent
            }

            ViewMessage::DailySettling { id } => {
                let checkbox = format!("dailyCheck_{id}");
                self.doc.set_attribute(&checkbox, "checked", "");
                self.doc.set_attribute(&checkbox, "disabled", "");
                SurfaceOutput::Silent
            }

            ViewMessage::Explanation {
                quest,
                task,
                question,
                html,
            } => {
                let boxed = format!("explain-box-{quest}-{task}-{question}");
                if self.doc.set_inner_html(&boxed, &html) {
                    self.doc.add_class(&boxed, SHOWN);
                }
                SurfaceOutput::Line(text_content(&html))
            }

            ViewMessage::RouletteSpinning => {
                self.doc.set_text(ROULETTE_MESSAGE, "Spinning...");
                SurfaceOutput::Line("Spinning...".to_string())
            }

            ViewMessage::RouletteResult {
                image,
                message,
                success,
            } => {
                self.doc.set_attribute(ROULETTE_IMAGE, "src", &image);
                self.doc.set_text(ROULETTE_MESSAGE, &message);
                self.doc.toggle_class(ROULETTE_MESSAGE, "text-success", success);
                self.doc.toggle_class(ROULETTE_MESSAGE, "text-danger", !success);
                SurfaceOutput::Line(message)
            }

            ViewMessage::Alert { message } => SurfaceOutput::Line(format!("[alert] {message}")),

            ViewMessage::Notify { level, message } => {
                let tag = match level {
                    NotifyLevel::Info => "info",
                    NotifyLevel::Warning => "warning",
                    NotifyLevel::Error => "error",
                    NotifyLevel::Success => "success",
                };
                SurfaceOutput::Line(format!("[{tag}] {message}"))
            }

            ViewMessage::LevelUp { level } => {
                self.doc.set_text(LEVEL_UP_TEXT, &level.to_string());
                self.doc.add_class(LEVEL_UP_MODAL, SHOWN);
                SurfaceOutput::Line(format!("LEVEL UP! You reached level {level}"))
            }

            ViewMessage::AchievementUnlocked { id } => {
                SurfaceOutput::Line(format!("Achievement unlocked: {id}"))
            }

            ViewMessage::Quit => SurfaceOutput::Quit,
        }
    }

    fn navigate(&mut self, view: View) {
        self.view = view;
        let profile = view == View::Profile;
        self.doc.toggle_class("dashboard-view", HIDDEN, profile);
        self.doc.toggle_class("profile-view", HIDDEN, !profile);
        self.doc.toggle_class(HEADER_STATS, HIDDEN, profile);
        self.doc.toggle_class("nav-btn-home", "active", !profile);
        self.doc.toggle_class("nav-btn-profile", "active", profile);
    }
}

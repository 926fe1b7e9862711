//! Gamification Data Model
//!
//! Wire-compatible types for the user's gamification state as served by
//! `GET /api/user/state` and pushed back whole by `POST /api/user/update`.
//!
//! Unknown fields on quests and sub-tasks are preserved so a round-trip
//! through the client never drops server-side data.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::catalog::SkinId;
use crate::progression;

/// XP granted by a sub-task that carries no explicit reward
pub const DEFAULT_SUBTASK_XP: u32 = 50;

/// XP granted by a daily quest that carries no explicit reward
pub const DEFAULT_DAILY_XP: u32 = 20;

fn default_level() -> u32 {
    1
}

fn default_owned_skins() -> Vec<SkinId> {
    vec![SkinId::default()]
}

fn default_daily_xp() -> u32 {
    DEFAULT_DAILY_XP
}

/// The complete gamification state of one user
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UserState {
    /// Current level (starts at 1)
    #[serde(default = "default_level")]
    pub level: u32,
    /// Experience inside the current level, always below 100 after an award
    #[serde(default)]
    pub xp: u32,
    /// Spendable currency
    #[serde(default)]
    pub coins: u32,
    /// User-defined multi-step quests, in display order
    #[serde(default)]
    pub quests: Vec<Quest>,
    /// Server-generated checklist for today
    #[serde(default)]
    pub daily_quests: Vec<DailyQuest>,
    /// Cosmetic skins the user owns ("default" is always present)
    #[serde(default = "default_owned_skins")]
    pub owned_skins: Vec<SkinId>,
    /// Currently equipped skin
    #[serde(default)]
    pub equipped_skin: SkinId,
    /// Consecutive active days, maintained by the server
    #[serde(default)]
    pub current_streak: u32,
    /// Unlocked achievement ids
    #[serde(default)]
    pub achievements: Vec<String>,
}

impl Default for UserState {
    fn default() -> Self {
        Self {
            level: 1,
            xp: 0,
            coins: 0,
            quests: Vec::new(),
            daily_quests: Vec::new(),
            owned_skins: default_owned_skins(),
            equipped_skin: SkinId::default(),
            current_streak: 0,
            achievements: Vec::new(),
        }
    }
}

impl UserState {
    /// Repair invariants a server payload may violate.
    ///
    /// Level is at least 1, "default" is always owned, duplicate skins are
    /// dropped and an unowned equipped skin falls back to "default".
    pub fn normalize(&mut self) {
        self.level = self.level.max(1);

        let mut seen = Vec::with_capacity(self.owned_skins.len() + 1);
        for skin in self.owned_skins.drain(..) {
            if !seen.contains(&skin) {
                seen.push(skin);
            }
        }
        if !seen.iter().any(SkinId::is_default) {
            seen.insert(0, SkinId::default());
        }
        self.owned_skins = seen;

        if !self.owns(&self.equipped_skin) {
            self.equipped_skin = SkinId::default();
        }
    }

    /// Whether the user owns a skin
    pub fn owns(&self, skin: &SkinId) -> bool {
        self.owned_skins.contains(skin)
    }

    /// Add a skin to the owned set; returns false if it was already owned
    pub fn grant_skin(&mut self, skin: SkinId) -> bool {
        if self.owns(&skin) {
            return false;
        }
        self.owned_skins.push(skin);
        true
    }

    /// Record an achievement; returns false if it was already unlocked
    pub fn unlock_achievement(&mut self, id: &str) -> bool {
        if self.achievements.iter().any(|a| a == id) {
            return false;
        }
        self.achievements.push(id.to_string());
        true
    }

    /// Quests still in progress, paired with their index in `quests`
    pub fn active_quests(&self) -> impl Iterator<Item = (usize, &Quest)> {
        self.quests
            .iter()
            .enumerate()
            .filter(|(_, q)| q.progress() < 100)
    }

    /// Quests whose every sub-task is completed, paired with their index
    pub fn completed_quests(&self) -> impl Iterator<Item = (usize, &Quest)> {
        self.quests
            .iter()
            .enumerate()
            .filter(|(_, q)| q.is_complete())
    }
}

/// A multi-step user goal
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Quest {
    /// Display title
    pub title: String,
    /// Free-form difficulty label ("Easy", "Hard", ...)
    #[serde(default)]
    pub difficulty: String,
    /// Ordered steps
    #[serde(default)]
    pub sub_tasks: Vec<SubTask>,
    /// Server fields the client does not interpret
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Quest {
    /// Create a quest from a title, difficulty and step texts
    pub fn new(
        title: impl Into<String>,
        difficulty: impl Into<String>,
        tasks: impl IntoIterator<Item = SubTask>,
    ) -> Self {
        Self {
            title: title.into(),
            difficulty: difficulty.into(),
            sub_tasks: tasks.into_iter().collect(),
            extra: Map::new(),
        }
    }

    /// Number of completed sub-tasks
    pub fn completed_count(&self) -> usize {
        self.sub_tasks.iter().filter(|t| t.completed).count()
    }

    /// Progress as a rounded percentage; 0 for a quest with no sub-tasks
    pub fn progress(&self) -> u32 {
        progression::percent(self.completed_count(), self.sub_tasks.len())
    }

    /// Whether the quest is finished.
    ///
    /// A quest without sub-tasks is never complete: it stays in the active
    /// list at 0% and never reaches the completed list.
    pub fn is_complete(&self) -> bool {
        !self.sub_tasks.is_empty() && self.sub_tasks.iter().all(|t| t.completed)
    }
}

/// One step of a quest
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SubTask {
    /// Step text
    pub task: String,
    /// Optional longer explanation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_description: Option<String>,
    /// Whether the step is done
    #[serde(default)]
    pub completed: bool,
    /// XP granted on completion (absent means [`DEFAULT_SUBTASK_XP`])
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub xp_reward: Option<u32>,
    /// Mini-test attached to this step
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quiz_data: Option<Vec<QuizQuestion>>,
    /// Score of the last attempt, in percent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quiz_score: Option<u32>,
    /// Option index chosen for each question in the last attempt
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_answers: Option<Vec<usize>>,
    /// Server fields the client does not interpret
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SubTask {
    /// Create an incomplete step
    pub fn new(task: impl Into<String>) -> Self {
        Self {
            task: task.into(),
            ..Default::default()
        }
    }

    /// Set an explicit XP reward
    #[must_use]
    pub fn with_reward(mut self, xp: u32) -> Self {
        self.xp_reward = Some(xp);
        self
    }

    /// Mark as completed
    #[must_use]
    pub fn done(mut self) -> Self {
        self.completed = true;
        self
    }

    /// XP granted on completion
    pub fn reward(&self) -> u32 {
        self.xp_reward.unwrap_or(DEFAULT_SUBTASK_XP)
    }

    /// Where this step is in its quiz lifecycle
    pub fn quiz_state(&self) -> QuizState {
        match (&self.quiz_data, self.quiz_score) {
            (None, _) => QuizState::None,
            (Some(_), None) => QuizState::Assigned,
            (Some(_), Some(score)) => QuizState::Attempted { score },
        }
    }

    /// Drop the quiz and its attempt
    pub fn clear_quiz(&mut self) {
        self.quiz_data = None;
        self.quiz_score = None;
        self.user_answers = None;
    }
}

/// Quiz lifecycle of a sub-task
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QuizState {
    /// No quiz generated
    None,
    /// Quiz generated, not yet taken
    Assigned,
    /// Quiz taken
    Attempted {
        /// Score in percent
        score: u32,
    },
}

/// A multiple-choice question
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizQuestion {
    /// Question text
    pub question: String,
    /// Answer options in display order
    pub options: Vec<String>,
    /// Index into `options` of the right answer
    pub correct_option_index: usize,
}

/// A single-day checklist item
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyQuest {
    /// Stable identity key ("daily_1", ...)
    pub id: String,
    /// Item text
    pub task: String,
    /// XP granted when checked
    #[serde(default = "default_daily_xp")]
    pub xp_reward: u32,
    /// Whether the item is checked
    #[serde(default)]
    pub completed: bool,
}

/// Who authored a chat entry
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    /// The user
    User,
    /// The assistant
    #[serde(alias = "ai", alias = "system")]
    Assistant,
}

/// One persisted chat message
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatEntry {
    /// Author
    pub role: ChatRole,
    /// Message text (markdown for the assistant)
    pub content: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_state_deserializes_with_defaults() {
        let state: UserState = serde_json::from_str(r#"{"xp": 20}"#).unwrap();
        assert_eq!(state.level, 1);
        assert_eq!(state.xp, 20);
        assert_eq!(state.owned_skins, vec![SkinId::default()]);
        assert!(state.equipped_skin.is_default());
    }

    #[test]
    fn test_normalize_repairs_skins() {
        let mut state = UserState {
            level: 0,
            owned_skins: vec!["skin_2".into(), "skin_2".into()],
            equipped_skin: "skin_5".into(),
            ..Default::default()
        };
        state.normalize();

        assert_eq!(state.level, 1);
        assert_eq!(
            state.owned_skins,
            vec![SkinId::default(), SkinId::from("skin_2")]
        );
        assert!(state.equipped_skin.is_default());
    }

    #[test]
    fn test_subtask_reward_default() {
        let task: SubTask = serde_json::from_str(r#"{"task": "read"}"#).unwrap();
        assert_eq!(task.reward(), 50);
        assert_eq!(SubTask::new("x").with_reward(80).reward(), 80);
    }

    #[test]
    fn test_unknown_fields_round_trip() {
        let raw = r#"{"title":"Rust","difficulty":"Hard","status":"active","sub_tasks":[{"task":"a","completed":true,"hint":"h"}]}"#;
        let quest: Quest = serde_json::from_str(raw).unwrap();
        let back = serde_json::to_value(&quest).unwrap();

        assert_eq!(back["status"], "active");
        assert_eq!(back["sub_tasks"][0]["hint"], "h");
        assert!(back["sub_tasks"][0].get("quiz_score").is_none());
    }

    #[test]
    fn test_quiz_state() {
        let mut task = SubTask::new("t");
        assert_eq!(task.quiz_state(), QuizState::None);

        task.quiz_data = Some(vec![]);
        assert_eq!(task.quiz_state(), QuizState::Assigned);

        task.quiz_score = Some(67);
        assert_eq!(task.quiz_state(), QuizState::Attempted { score: 67 });

        task.clear_quiz();
        assert_eq!(task.quiz_state(), QuizState::None);
    }

    #[test]
    fn test_empty_quest_is_active_not_complete() {
        let state = UserState {
            quests: vec![Quest::new("Empty", "Easy", [])],
            ..Default::default()
        };

        assert_eq!(state.quests[0].progress(), 0);
        assert!(!state.quests[0].is_complete());
        assert_eq!(state.active_quests().count(), 1);
        assert_eq!(state.completed_quests().count(), 0);
    }

    #[test]
    fn test_chat_role_aliases() {
        let entry: ChatEntry =
            serde_json::from_str(r#"{"role": "assistant", "content": "hi"}"#).unwrap();
        assert_eq!(entry.role, ChatRole::Assistant);
        let entry: ChatEntry = serde_json::from_str(r#"{"role": "ai", "content": "hi"}"#).unwrap();
        assert_eq!(entry.role, ChatRole::Assistant);
    }
}

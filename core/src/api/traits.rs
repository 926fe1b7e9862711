//! ORIA API Trait
//!
//! One method per server endpoint. This abstraction lets the controller run
//! against the real server ([`HttpApi`](super::HttpApi)) or a scripted double
//! ([`ScriptedApi`](super::ScriptedApi)) without changing orchestration logic.
//!
//! # Response Decoding
//!
//! The server signals application failures with an `{error}` body, usually
//! with a 4xx status. [`decode_response`] checks for that field before the
//! status so the server's text always reaches the user.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::ApiError;
use crate::catalog::SkinId;
use crate::model::{ChatEntry, DailyQuest, Quest, QuizQuestion, UserState};

/// Server endpoints
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Endpoint {
    /// `GET /api/user/state`
    UserState,
    /// `POST /api/user/update`
    UserUpdate,
    /// `POST /api/user/daily_refresh`
    DailyRefresh,
    /// `POST /api/quiz/generate`
    QuizGenerate,
    /// `POST /api/quiz/explain`
    QuizExplain,
    /// `GET /api/chat/history`
    ChatHistory,
    /// `POST /api/chat`
    Chat,
    /// `POST /api/store/roulette`
    Roulette,
    /// `POST /api/store/buy`
    Buy,
    /// `POST /api/store/equip`
    Equip,
    /// `GET /api/leaderboard`
    Leaderboard,
}

impl Endpoint {
    /// Request path
    pub fn path(self) -> &'static str {
        match self {
            Self::UserState => "/api/user/state",
            Self::UserUpdate => "/api/user/update",
            Self::DailyRefresh => "/api/user/daily_refresh",
            Self::QuizGenerate => "/api/quiz/generate",
            Self::QuizExplain => "/api/quiz/explain",
            Self::ChatHistory => "/api/chat/history",
            Self::Chat => "/api/chat",
            Self::Roulette => "/api/store/roulette",
            Self::Buy => "/api/store/buy",
            Self::Equip => "/api/store/equip",
            Self::Leaderboard => "/api/leaderboard",
        }
    }

    /// Whether the endpoint is a GET (all others are POST)
    pub fn is_get(self) -> bool {
        matches!(self, Self::UserState | Self::ChatHistory | Self::Leaderboard)
    }
}

/// Reply to a full-state update
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct UpdateResponse {
    /// Achievements the server granted for this update
    #[serde(default)]
    pub newly_unlocked: Vec<String>,
}

/// Reply to a daily refresh
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct DailyRefresh {
    /// Whether new quests were generated
    #[serde(default)]
    pub success: bool,
    /// The regenerated list
    #[serde(default)]
    pub daily_quests: Vec<DailyQuest>,
}

#[derive(Deserialize)]
struct QuizResponse {
    #[serde(default)]
    quiz: Vec<QuizQuestion>,
}

/// Body of an explain request
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ExplainRequest {
    /// Question text
    pub question: String,
    /// Text of the option the user picked
    pub user_answer: String,
    /// Text of the right option
    pub correct_answer: String,
}

#[derive(Deserialize)]
struct ExplainResponse {
    explanation: Option<String>,
}

#[derive(Deserialize)]
struct HistoryResponse {
    #[serde(default)]
    history: Vec<ChatEntry>,
}

/// Reply to a chat message
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct ChatReply {
    /// Assistant text (markdown)
    #[serde(default)]
    pub reply: Option<String>,
    /// Whether the server saved a quest from this message
    #[serde(default)]
    pub quest_added: bool,
    /// The quest built from the message
    #[serde(default)]
    pub quest: Option<Quest>,
}

/// Result of a roulette spin
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct RouletteOutcome {
    /// Balance after paying for the spin
    pub coins: u32,
    /// Skin won
    pub unlocked_skin: SkinId,
    /// Achievements granted alongside
    #[serde(default)]
    pub newly_unlocked: Vec<String>,
}

/// Result of a direct purchase
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Purchase {
    /// Balance after the purchase
    pub coins: u32,
}

/// One leaderboard row
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct LeaderboardEntry {
    /// Display name
    pub username: String,
    /// Level
    pub level: u32,
    /// XP inside the level
    pub xp: u32,
    /// Active-day streak
    #[serde(default)]
    pub current_streak: u32,
    /// Whether this row is the requesting user
    #[serde(default)]
    pub is_current_user: bool,
}

#[derive(Deserialize)]
struct LeaderboardResponse {
    #[serde(default)]
    leaderboard: Vec<LeaderboardEntry>,
}

/// ORIA server API
///
/// Implementations perform exactly one request per call: no retry, no
/// backoff, no caching.
#[async_trait]
pub trait OriaApi: Send + Sync {
    /// Raw round-trip: send `body` to `endpoint`, return status and JSON body
    async fn call(&self, endpoint: Endpoint, body: Option<Value>) -> Result<(u16, Value), ApiError>;

    /// Fetch the full user state
    async fn fetch_state(&self) -> Result<UserState, ApiError> {
        let mut state: UserState = request(self, Endpoint::UserState, None).await?;
        state.normalize();
        Ok(state)
    }

    /// Replace the server's copy of the user state
    async fn save_state(&self, state: &UserState) -> Result<UpdateResponse, ApiError> {
        let body = serde_json::to_value(state)?;
        request(self, Endpoint::UserUpdate, Some(body)).await
    }

    /// Regenerate today's daily quests
    async fn refresh_daily(&self) -> Result<DailyRefresh, ApiError> {
        request(self, Endpoint::DailyRefresh, None).await
    }

    /// Generate a quiz about a topic
    async fn generate_quiz(&self, topic: &str) -> Result<Vec<QuizQuestion>, ApiError> {
        let body = serde_json::json!({ "topic": topic });
        let response: QuizResponse = request(self, Endpoint::QuizGenerate, Some(body)).await?;
        Ok(response.quiz)
    }

    /// Explain why an answer was wrong
    async fn explain(&self, question: &ExplainRequest) -> Result<String, ApiError> {
        let body = serde_json::to_value(question)?;
        let response: ExplainResponse = request(self, Endpoint::QuizExplain, Some(body)).await?;
        response
            .explanation
            .ok_or(ApiError::MissingField("explanation"))
    }

    /// Load persisted chat history
    async fn chat_history(&self) -> Result<Vec<ChatEntry>, ApiError> {
        let response: HistoryResponse = request(self, Endpoint::ChatHistory, None).await?;
        Ok(response.history)
    }

    /// Send a chat message (or a quick-quest goal)
    async fn send_chat(&self, message: &str, quick_quest: bool) -> Result<ChatReply, ApiError> {
        let body = serde_json::json!({ "message": message, "quick_quest": quick_quest });
        request(self, Endpoint::Chat, Some(body)).await
    }

    /// Spend coins on a random skin unlock
    async fn spin_roulette(&self) -> Result<RouletteOutcome, ApiError> {
        request(self, Endpoint::Roulette, None).await
    }

    /// Buy a specific skin
    async fn buy_skin(&self, skin: &SkinId, price: u32) -> Result<Purchase, ApiError> {
        let body = serde_json::json!({ "skin_id": skin, "price": price });
        request(self, Endpoint::Buy, Some(body)).await
    }

    /// Equip an owned skin
    async fn equip_skin(&self, skin: &SkinId) -> Result<(), ApiError> {
        let body = serde_json::json!({ "skin_id": skin });
        let _: Value = request(self, Endpoint::Equip, Some(body)).await?;
        Ok(())
    }

    /// Fetch the top players
    async fn leaderboard(&self) -> Result<Vec<LeaderboardEntry>, ApiError> {
        let response: LeaderboardResponse = request(self, Endpoint::Leaderboard, None).await?;
        Ok(response.leaderboard)
    }

}

/// Round-trip through [`OriaApi::call`] and decode
async fn request<T, A>(api: &A, endpoint: Endpoint, body: Option<Value>) -> Result<T, ApiError>
where
    T: DeserializeOwned,
    A: OriaApi + ?Sized,
{
    let (status, value) = api.call(endpoint, body).await?;
    decode_response(status, value)
}

/// Turn a status and JSON body into a typed response.
///
/// Order matters: an `{error}` body wins over the status code, then any
/// non-2xx status fails, then an explicit `"success": false` fails.
pub fn decode_response<T: DeserializeOwned>(status: u16, body: Value) -> Result<T, ApiError> {
    if let Some(message) = body.get("error").and_then(Value::as_str) {
        return Err(ApiError::Server {
            status,
            message: message.to_string(),
        });
    }
    if !(200..300).contains(&status) {
        return Err(ApiError::Status { status });
    }
    if body.get("success").and_then(Value::as_bool) == Some(false) {
        return Err(ApiError::Rejected { status });
    }
    Ok(serde_json::from_value(body)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_error_body_wins_over_status() {
        let err = decode_response::<Value>(400, json!({"error": "Not enough coins"})).unwrap_err();
        assert_eq!(
            err,
            ApiError::Server {
                status: 400,
                message: "Not enough coins".to_string()
            }
        );
        assert_eq!(err.server_message(), Some("Not enough coins"));
    }

    #[test]
    fn test_bare_failure_status() {
        let err = decode_response::<Value>(502, json!({})).unwrap_err();
        assert_eq!(err, ApiError::Status { status: 502 });
    }

    #[test]
    fn test_success_false_is_rejection() {
        let err = decode_response::<Value>(200, json!({"success": false})).unwrap_err();
        assert_eq!(err, ApiError::Rejected { status: 200 });
        assert_eq!(err.server_message(), None);
    }

    #[test]
    fn test_decode_update_response() {
        let update: UpdateResponse =
            decode_response(200, json!({"success": true, "newly_unlocked": ["initiate"]})).unwrap();
        assert_eq!(update.newly_unlocked, vec!["initiate".to_string()]);

        let update: UpdateResponse = decode_response(200, json!({"success": true})).unwrap();
        assert!(update.newly_unlocked.is_empty());
    }

    #[test]
    fn test_decode_shape_mismatch() {
        let err = decode_response::<RouletteOutcome>(200, json!({"success": true})).unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)));
    }

    #[test]
    fn test_endpoint_methods() {
        assert!(Endpoint::UserState.is_get());
        assert!(!Endpoint::UserUpdate.is_get());
        assert_eq!(Endpoint::Roulette.path(), "/api/store/roulette");
    }
}

//! ORIA Server API
//!
//! The [`OriaApi`] trait and its implementations:
//!
//! - [`HttpApi`]: reqwest client for a live server
//! - [`ScriptedApi`]: canned replies for tests and offline surfaces

mod error;
mod http;
mod scripted;
mod traits;

pub use error::ApiError;
pub use http::HttpApi;
pub use scripted::ScriptedApi;
pub use traits::{
    decode_response, ChatReply, DailyRefresh, Endpoint, ExplainRequest, LeaderboardEntry,
    OriaApi, Purchase, RouletteOutcome, UpdateResponse,
};

//! Scripted API
//!
//! An in-memory [`OriaApi`] that answers from canned per-endpoint queues and
//! records every call. Used by tests and by offline surfaces.
//!
//! Responses go through the same [`decode_response`](super::decode_response)
//! path as the HTTP client, so scripting `(400, {"error": ...})` exercises the
//! exact failure handling a real server would trigger.

use std::collections::{HashMap, VecDeque};

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{json, Value};

use super::error::ApiError;
use super::traits::{Endpoint, OriaApi};

/// One scripted reply
type Reply = Result<(u16, Value), ApiError>;

/// Canned-response API double
#[derive(Debug, Default)]
pub struct ScriptedApi {
    replies: Mutex<HashMap<Endpoint, VecDeque<Reply>>>,
    calls: Mutex<Vec<(Endpoint, Option<Value>)>>,
}

impl ScriptedApi {
    /// Create with no scripted replies
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a 200 reply
    pub fn ok(&self, endpoint: Endpoint, body: Value) -> &Self {
        self.reply(endpoint, Ok((200, body)))
    }

    /// Queue an `{error}` reply with a status
    pub fn server_error(&self, endpoint: Endpoint, status: u16, message: &str) -> &Self {
        self.reply(endpoint, Ok((status, json!({ "error": message }))))
    }

    /// Queue a transport failure
    pub fn unreachable(&self, endpoint: Endpoint) -> &Self {
        self.reply(
            endpoint,
            Err(ApiError::Transport("connection refused".to_string())),
        )
    }

    /// Queue any reply
    pub fn reply(&self, endpoint: Endpoint, reply: Reply) -> &Self {
        self.replies
            .lock()
            .entry(endpoint)
            .or_default()
            .push_back(reply);
        self
    }

    /// Every call made so far, in order
    pub fn calls(&self) -> Vec<(Endpoint, Option<Value>)> {
        self.calls.lock().clone()
    }

    /// Number of calls made to one endpoint
    pub fn count(&self, endpoint: Endpoint) -> usize {
        self.calls.lock().iter().filter(|(e, _)| *e == endpoint).count()
    }

    /// Body of the most recent call to an endpoint
    pub fn last_body(&self, endpoint: Endpoint) -> Option<Value> {
        self.calls
            .lock()
            .iter()
            .rev()
            .find(|(e, _)| *e == endpoint)
            .and_then(|(_, body)| body.clone())
    }
}

#[async_trait]
impl OriaApi for ScriptedApi {
    async fn call(&self, endpoint: Endpoint, body: Option<Value>) -> Result<(u16, Value), ApiError> {
        self.calls.lock().push((endpoint, body));

        let reply = self
            .replies
            .lock()
            .get_mut(&endpoint)
            .and_then(VecDeque::pop_front);

        match reply {
            Some(reply) => reply,
            // Unscripted endpoints behave like a server that accepted the call
            None => Ok((200, json!({ "success": true }))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::SkinId;
    use pretty_assertions::assert_eq;
    use tokio_test::{assert_err, assert_ok};

    #[tokio::test]
    async fn test_replies_in_order_then_default() {
        let api = ScriptedApi::new();
        api.ok(Endpoint::Buy, json!({"success": true, "coins": 50}))
            .server_error(Endpoint::Buy, 400, "Not enough coins");

        let skin = SkinId::from("skin_1");
        assert_eq!(assert_ok!(api.buy_skin(&skin, 100).await).coins, 50);
        assert_eq!(
            assert_err!(api.buy_skin(&skin, 100).await).server_message(),
            Some("Not enough coins")
        );
        assert_ok!(api.equip_skin(&skin).await);

        assert_eq!(api.count(Endpoint::Buy), 2);
        assert_eq!(
            api.last_body(Endpoint::Buy),
            Some(json!({"skin_id": "skin_1", "price": 100}))
        );
    }

    #[tokio::test]
    async fn test_unreachable_is_transport() {
        let api = ScriptedApi::new();
        api.unreachable(Endpoint::UserState);
        assert!(assert_err!(api.fetch_state().await).is_transport());
    }
}

//! Blocking HTTP client for the Slack Web API, behind a trait so the
//! pipeline can run against a scripted stand-in in tests.

use anyhow::{anyhow, bail, Context, Result};
use reqwest::blocking::Client;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::slack::blocks::Block;
use crate::slack::types::{
    HistoryResponse, Message, PermalinkResponse, PostMessageResponse, UserInfoResponse,
};

const SLACK_API_BASE: &str = "https://slack.com/api";

/// Boundary to the Slack Web API. The pipeline only ever sees this
/// trait; per-item failures of `permalink` and `avatar_url` are handled
/// by the caller, everything else is fail-fast.
pub trait SlackGateway {
    /// Ordered channel history no older than `oldest` (epoch seconds).
    fn fetch_history(&self, channel: &str, oldest: i64) -> Result<Vec<Message>>;

    fn post_message(&self, channel: &str, blocks: &[Block]) -> Result<()>;

    /// Shareable link for the message with the given timestamp.
    fn permalink(&self, channel: &str, ts: &str) -> Result<String>;

    /// Avatar image URL for a user id.
    fn avatar_url(&self, user_id: &str) -> Result<String>;
}

pub struct HttpSlackClient {
    client: Client,
    token: String,
    base_url: String,
}

impl HttpSlackClient {
    pub fn new(token: impl Into<String>) -> Self {
        HttpSlackClient {
            client: Client::new(),
            token: token.into(),
            base_url: SLACK_API_BASE.to_string(),
        }
    }

    fn get<T: DeserializeOwned>(&self, method: &str, query: &[(&str, &str)]) -> Result<T> {
        debug!(method, "calling Slack API");
        let response = self
            .client
            .get(format!("{}/{}", self.base_url, method))
            .bearer_auth(&self.token)
            .query(query)
            .send()
            .with_context(|| format!("Slack API call {method} failed"))?;

        response
            .json()
            .with_context(|| format!("Slack API {method} returned an unreadable body"))
    }
}

fn api_error(method: &str, error: Option<String>) -> anyhow::Error {
    anyhow!(
        "{method}: {}",
        error.unwrap_or_else(|| "unknown error".to_string())
    )
}

impl SlackGateway for HttpSlackClient {
    fn fetch_history(&self, channel: &str, oldest: i64) -> Result<Vec<Message>> {
        let oldest = oldest.to_string();
        let response: HistoryResponse = self.get(
            "conversations.history",
            &[("channel", channel), ("oldest", &oldest), ("limit", "200")],
        )?;

        if !response.ok {
            return Err(api_error("conversations.history", response.error));
        }
        Ok(response.messages)
    }

    fn post_message(&self, channel: &str, blocks: &[Block]) -> Result<()> {
        debug!(method = "chat.postMessage", "calling Slack API");
        let body = serde_json::json!({
            "channel": channel,
            "blocks": blocks,
        });

        let response = self
            .client
            .post(format!("{}/chat.postMessage", self.base_url))
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .context("Slack API call chat.postMessage failed")?;

        let parsed: PostMessageResponse = response
            .json()
            .context("Slack API chat.postMessage returned an unreadable body")?;

        if !parsed.ok {
            return Err(api_error("chat.postMessage", parsed.error));
        }
        Ok(())
    }

    fn permalink(&self, channel: &str, ts: &str) -> Result<String> {
        let response: PermalinkResponse = self.get(
            "chat.getPermalink",
            &[("channel", channel), ("message_ts", ts)],
        )?;

        if !response.ok {
            return Err(api_error("chat.getPermalink", response.error));
        }
        response
            .permalink
            .ok_or_else(|| anyhow!("chat.getPermalink: response carried no permalink"))
    }

    fn avatar_url(&self, user_id: &str) -> Result<String> {
        let response: UserInfoResponse = self.get("users.info", &[("user", user_id)])?;

        if !response.ok {
            return Err(api_error("users.info", response.error));
        }
        let user = response
            .user
            .ok_or_else(|| anyhow!("users.info: response carried no user"))?;
        if user.profile.image_72.is_empty() {
            bail!("users.info: profile for {user_id} has no avatar");
        }
        Ok(user.profile.image_72)
    }
}

use super::types::{PublishState, Target};
use crate::config::Config;
use anyhow::{Context, Result};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info};

/// Which nested field of the `error` object holds the user-facing message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorDialect {
    /// `error.error_user_msg`
    Instagram,
    /// `error.message`
    Facebook,
}

impl ErrorDialect {
    fn message_field(&self) -> &'static str {
        match self {
            ErrorDialect::Instagram => "error_user_msg",
            ErrorDialect::Facebook => "message",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum GraphReply {
    Created { id: String },
    Rejected { message: Option<String>, raw: Value },
}

impl GraphReply {
    pub fn from_value(value: Value, dialect: ErrorDialect) -> Self {
        let id = match value.get("id") {
            Some(Value::String(id)) if !id.is_empty() => Some(id.clone()),
            Some(Value::Number(id)) => Some(id.to_string()),
            _ => None,
        };

        match id {
            Some(id) => GraphReply::Created { id },
            None => {
                let message = value
                    .get("error")
                    .and_then(|error| error.get(dialect.message_field()))
                    .and_then(Value::as_str)
                    .map(str::to_string);
                GraphReply::Rejected {
                    message,
                    raw: value,
                }
            }
        }
    }
}

/// Form-encoded transport for the Graph API. Every call is a `POST` with the
/// access token as a form field; replies carry either an `id` or an `error`.
#[derive(Clone)]
pub struct GraphClient {
    client: reqwest::Client,
    base_url: String,
    api_version: String,
}

impl GraphClient {
    pub fn new(config: &Config) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.graph.timeout_secs))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: config.graph.base_url.trim_end_matches('/').to_string(),
            api_version: config.graph.api_version.trim_matches('/').to_string(),
        })
    }

    /// `{base}/{version}/{node}/{edge}`
    pub fn endpoint(&self, node: &str, edge: &str) -> String {
        format!("{}/{}/{}/{}", self.base_url, self.api_version, node, edge)
    }

    /// Sends one form POST. The body is parsed regardless of HTTP status since
    /// the Graph API reports rejections as JSON error objects.
    pub async fn post_form(
        &self,
        url: &str,
        form: &[(&str, &str)],
        dialect: ErrorDialect,
    ) -> Result<GraphReply> {
        debug!(
            "POST {} ({})",
            url,
            form.iter()
                .map(|(key, _)| *key)
                .collect::<Vec<_>>()
                .join(", ")
        );

        let response = self
            .client
            .post(url)
            .form(form)
            .send()
            .await
            .with_context(|| format!("Request to {} failed", url))?;

        let status = response.status();
        let value: Value = response
            .json()
            .await
            .with_context(|| format!("Unreadable response from {} (HTTP {})", url, status))?;

        Ok(GraphReply::from_value(value, dialect))
    }
}

/// Tracks and logs the state of one publish request.
pub struct Progress {
    target: Target,
    state: PublishState,
}

impl Progress {
    pub fn new(target: Target) -> Self {
        Self {
            target,
            state: PublishState::Start,
        }
    }

    pub fn state(&self) -> PublishState {
        self.state
    }

    pub fn advance(&mut self, next: PublishState) {
        debug_assert!(
            self.state.can_transition_to(next),
            "invalid transition {} -> {}",
            self.state,
            next
        );
        debug!(
            target_name = %self.target,
            from = %self.state,
            to = %next,
            "Publish state changed"
        );
        self.state = next;
        if next.is_terminal() {
            info!(target_name = %self.target, state = %next, "Publish request finished");
        }
    }
}

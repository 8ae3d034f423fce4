use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// A destination a run can post to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Target {
    InstagramFeed,
    InstagramStory,
    FacebookPage,
}

impl Target {
    pub fn as_str(&self) -> &'static str {
        match self {
            Target::InstagramFeed => "instagram_feed",
            Target::InstagramStory => "instagram_story",
            Target::FacebookPage => "facebook_page",
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Surface {
    Feed,
    Story,
}

impl fmt::Display for Surface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Surface::Feed => "feed",
            Surface::Story => "story",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishRequest {
    pub target: Target,
    pub asset_url: String,
    /// Caption or page message; stories carry none
    pub caption: Option<String>,
}

impl PublishRequest {
    pub fn new(target: Target, asset_url: impl Into<String>, caption: Option<String>) -> Self {
        Self {
            target,
            asset_url: asset_url.into(),
            caption,
        }
    }

    pub fn caption_or_empty(&self) -> &str {
        self.caption.as_deref().unwrap_or("")
    }
}

/// Lifecycle of a single publish request. Failures are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishState {
    Start,
    ContainerRequested,
    ContainerCreated,
    PublishRequested,
    Published,
    Failed,
}

impl PublishState {
    pub fn can_transition_to(&self, next: PublishState) -> bool {
        use PublishState::*;
        matches!(
            (self, next),
            (Start, ContainerRequested)
                | (ContainerRequested, ContainerCreated)
                // single-phase uploads create and publish in one call
                | (ContainerRequested, Published)
                | (ContainerRequested, Failed)
                | (ContainerCreated, PublishRequested)
                | (PublishRequested, Published)
                | (PublishRequested, Failed)
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, PublishState::Published | PublishState::Failed)
    }
}

impl fmt::Display for PublishState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PublishState::Start => "start",
            PublishState::ContainerRequested => "container_requested",
            PublishState::ContainerCreated => "container_created",
            PublishState::PublishRequested => "publish_requested",
            PublishState::Published => "published",
            PublishState::Failed => "failed",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PublishFailure {
    /// A required credential was absent; nothing was sent.
    #[error("{0} not configured")]
    MissingCredential(&'static str),

    #[error("container creation rejected: {}", rejection_reason(message, raw))]
    ContainerRejected {
        message: Option<String>,
        raw: String,
    },

    /// The container (if any) is left behind on the platform.
    #[error(
        "publish rejected{}: {}",
        container_suffix(container_id),
        rejection_reason(message, raw)
    )]
    PublishRejected {
        container_id: Option<String>,
        message: Option<String>,
        raw: String,
    },

    #[error("request failed: {0}")]
    Transport(String),
}

fn rejection_reason<'a>(message: &'a Option<String>, raw: &'a str) -> &'a str {
    message.as_deref().unwrap_or(raw)
}

fn container_suffix(container_id: &Option<String>) -> String {
    container_id
        .as_ref()
        .map(|id| format!(" (container {})", id))
        .unwrap_or_default()
}

#[derive(Debug, Clone, PartialEq)]
pub enum PublishOutcome {
    Published { post_id: String },
    Failed(PublishFailure),
}

impl PublishOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, PublishOutcome::Published { .. })
    }

    pub fn post_id(&self) -> Option<&str> {
        match self {
            PublishOutcome::Published { post_id } => Some(post_id),
            PublishOutcome::Failed(_) => None,
        }
    }
}

impl fmt::Display for PublishOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PublishOutcome::Published { post_id } => write!(f, "published as {}", post_id),
            PublishOutcome::Failed(failure) => write!(f, "failed: {}", failure),
        }
    }
}

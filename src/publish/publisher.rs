use super::types::{PublishOutcome, PublishRequest, Target};
use async_trait::async_trait;

#[async_trait]
pub trait Publisher: Send + Sync {
    /// Human-readable name of the publisher
    fn name(&self) -> &'static str;

    /// The destination this publisher posts to
    fn target(&self) -> Target;

    /// Drive the platform protocol for one request. Never retries; every
    /// failure is reported through the returned outcome.
    async fn publish(&self, request: &PublishRequest) -> PublishOutcome;
}

use super::{
    graph::{ErrorDialect, GraphClient, GraphReply, Progress},
    publisher::Publisher,
    types::{PublishFailure, PublishOutcome, PublishRequest, PublishState, Target},
};
use crate::{
    config::{non_empty, Config},
    utils::mask_secret,
};
use async_trait::async_trait;
use tracing::{debug, error, info};

/// Posts a photo to a Facebook Page in a single call: the page fetches the
/// image from `url` and publishes it immediately.
pub struct FacebookPagePublisher {
    graph: GraphClient,
    access_token: Option<String>,
    page_id: Option<String>,
}

impl FacebookPagePublisher {
    pub fn new(config: &Config, graph: GraphClient) -> Self {
        Self {
            graph,
            access_token: config.facebook.page_access_token.clone(),
            page_id: config.facebook.page_id.clone(),
        }
    }

    fn credentials(&self) -> Result<(&str, &str), PublishFailure> {
        let token = non_empty(&self.access_token).ok_or(PublishFailure::MissingCredential(
            "Facebook Page access token",
        ))?;
        let page_id = non_empty(&self.page_id)
            .ok_or(PublishFailure::MissingCredential("Facebook Page ID"))?;
        Ok((token, page_id))
    }
}

#[async_trait]
impl Publisher for FacebookPagePublisher {
    fn name(&self) -> &'static str {
        "Facebook Page"
    }

    fn target(&self) -> Target {
        Target::FacebookPage
    }

    async fn publish(&self, request: &PublishRequest) -> PublishOutcome {
        let (token, page_id) = match self.credentials() {
            Ok(credentials) => credentials,
            Err(failure) => {
                error!("Error: {}", failure);
                return PublishOutcome::Failed(failure);
            }
        };

        info!("--- Starting Facebook Page image upload ---");
        info!(
            "Attempting to upload image to Facebook Page: {}",
            request.asset_url
        );
        debug!("Using page {} with token {}", page_id, mask_secret(token));

        let mut progress = Progress::new(self.target());
        progress.advance(PublishState::ContainerRequested);

        let form = [
            ("url", request.asset_url.as_str()),
            ("message", request.caption_or_empty()),
            ("access_token", token),
            ("published", "true"),
        ];
        let reply = self
            .graph
            .post_form(
                &self.graph.endpoint(page_id, "photos"),
                &form,
                ErrorDialect::Facebook,
            )
            .await;

        match reply {
            Ok(GraphReply::Created { id }) => {
                progress.advance(PublishState::Published);
                info!(
                    post_id = %id,
                    "Image successfully uploaded to Facebook Page! Post ID: {}", id
                );
                PublishOutcome::Published { post_id: id }
            }
            Ok(GraphReply::Rejected { message, raw }) => {
                progress.advance(PublishState::Failed);
                error!("Error uploading image to Facebook Page. Response: {}", raw);
                if let Some(message) = &message {
                    error!("Facebook API Error Message: {}", message);
                }
                PublishOutcome::Failed(PublishFailure::PublishRejected {
                    container_id: None,
                    message,
                    raw: raw.to_string(),
                })
            }
            Err(e) => {
                progress.advance(PublishState::Failed);
                error!(
                    "Network or API request error during Facebook upload: {:#}",
                    e
                );
                PublishOutcome::Failed(PublishFailure::Transport(format!("{:#}", e)))
            }
        }
    }
}

use super::{
    graph::{ErrorDialect, GraphClient, GraphReply, Progress},
    publisher::Publisher,
    types::{PublishFailure, PublishOutcome, PublishRequest, PublishState, Surface, Target},
};
use crate::{
    config::{non_empty, Config},
    utils::mask_secret,
};
use anyhow::Result;
use async_trait::async_trait;
use tracing::{debug, error, info};

/// Surface-type value that turns a media container into a story.
const STORY_MEDIA_TYPE: &str = "STORIES";

/// Publishes images through the two-phase Instagram content publishing flow:
/// create a media container, then publish it by creation id.
pub struct InstagramPublisher {
    graph: GraphClient,
    surface: Surface,
    access_token: Option<String>,
    account_id: Option<String>,
}

impl InstagramPublisher {
    pub fn feed(config: &Config, graph: GraphClient) -> Self {
        Self::with_surface(config, graph, Surface::Feed)
    }

    pub fn story(config: &Config, graph: GraphClient) -> Self {
        Self::with_surface(config, graph, Surface::Story)
    }

    fn with_surface(config: &Config, graph: GraphClient, surface: Surface) -> Self {
        Self {
            graph,
            surface,
            access_token: config.instagram.access_token.clone(),
            account_id: config.instagram.page_id.clone(),
        }
    }

    fn credentials(&self) -> Result<(&str, &str), PublishFailure> {
        let token = non_empty(&self.access_token)
            .ok_or(PublishFailure::MissingCredential("Instagram access token"))?;
        let account_id = non_empty(&self.account_id)
            .ok_or(PublishFailure::MissingCredential("Instagram page ID"))?;
        Ok((token, account_id))
    }

    fn container_form<'a>(
        &self,
        request: &'a PublishRequest,
        token: &'a str,
    ) -> Vec<(&'static str, &'a str)> {
        let mut form = vec![("image_url", request.asset_url.as_str())];
        match self.surface {
            Surface::Story => form.push(("media_type", STORY_MEDIA_TYPE)),
            Surface::Feed => {
                form.push(("caption", request.caption_or_empty()));
                form.push(("share_to_feed", "true"));
            }
        }
        form.push(("access_token", token));
        form
    }

    async fn create_and_publish(
        &self,
        request: &PublishRequest,
        token: &str,
        account_id: &str,
        progress: &mut Progress,
    ) -> Result<PublishOutcome> {
        info!(
            "Creating Instagram {} media container for image: {}",
            self.surface, request.asset_url
        );
        progress.advance(PublishState::ContainerRequested);

        let form = self.container_form(request, token);
        let reply = self
            .graph
            .post_form(
                &self.graph.endpoint(account_id, "media"),
                &form,
                ErrorDialect::Instagram,
            )
            .await?;

        let creation_id = match reply {
            GraphReply::Created { id } => id,
            GraphReply::Rejected { message, raw } => {
                progress.advance(PublishState::Failed);
                error!(
                    "Error creating Instagram {} container. Response: {}",
                    self.surface, raw
                );
                if let Some(message) = &message {
                    error!("Instagram API Error Message: {}", message);
                }
                return Ok(PublishOutcome::Failed(PublishFailure::ContainerRejected {
                    message,
                    raw: raw.to_string(),
                }));
            }
        };

        progress.advance(PublishState::ContainerCreated);
        info!(
            creation_id = %creation_id,
            "Instagram {} media container created with ID: {}",
            self.surface, creation_id
        );

        progress.advance(PublishState::PublishRequested);
        let reply = self
            .graph
            .post_form(
                &self.graph.endpoint(account_id, "media_publish"),
                &[("creation_id", creation_id.as_str()), ("access_token", token)],
                ErrorDialect::Instagram,
            )
            .await?;

        match reply {
            GraphReply::Created { id } => {
                progress.advance(PublishState::Published);
                info!(
                    post_id = %id,
                    "Image successfully uploaded to Instagram {}! Post ID: {}",
                    self.surface, id
                );
                Ok(PublishOutcome::Published { post_id: id })
            }
            GraphReply::Rejected { message, raw } => {
                progress.advance(PublishState::Failed);
                error!(
                    "Error publishing image to Instagram {}. Response: {}",
                    self.surface, raw
                );
                if let Some(message) = &message {
                    error!("Instagram API Error Message: {}", message);
                }
                Ok(PublishOutcome::Failed(PublishFailure::PublishRejected {
                    container_id: Some(creation_id),
                    message,
                    raw: raw.to_string(),
                }))
            }
        }
    }
}

#[async_trait]
impl Publisher for InstagramPublisher {
    fn name(&self) -> &'static str {
        match self.surface {
            Surface::Story => "Instagram Story",
            Surface::Feed => "Instagram Feed",
        }
    }

    fn target(&self) -> Target {
        match self.surface {
            Surface::Story => Target::InstagramStory,
            Surface::Feed => Target::InstagramFeed,
        }
    }

    async fn publish(&self, request: &PublishRequest) -> PublishOutcome {
        let (token, account_id) = match self.credentials() {
            Ok(credentials) => credentials,
            Err(failure) => {
                error!("Error: {}", failure);
                return PublishOutcome::Failed(failure);
            }
        };

        info!("--- Starting {} image upload ---", self.name());
        debug!(
            "Using Instagram account {} with token {}",
            account_id,
            mask_secret(token)
        );

        let mut progress = Progress::new(self.target());
        match self
            .create_and_publish(request, token, account_id, &mut progress)
            .await
        {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(
                    state = %progress.state(),
                    "Network or API request error during {} upload: {:#}",
                    self.name(),
                    e
                );
                progress.advance(PublishState::Failed);
                PublishOutcome::Failed(PublishFailure::Transport(format!("{:#}", e)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::{Arc, Mutex};
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[derive(Clone, Default)]
    struct LogBuffer(Arc<Mutex<Vec<u8>>>);

    impl LogBuffer {
        fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    impl std::io::Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn config_for(server: &MockServer) -> Config {
        let mut config = Config::default();
        config.graph.base_url = server.uri();
        config.instagram.access_token = Some("ig-token".to_string());
        config.instagram.page_id = Some("1789".to_string());
        config
    }

    fn feed_request() -> PublishRequest {
        PublishRequest::new(
            Target::InstagramFeed,
            "https://host/a.jpg",
            Some("Daily quote #quotes".to_string()),
        )
    }

    #[tokio::test]
    async fn test_feed_publish_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v19.0/1789/media"))
            .and(body_string_contains("image_url=https%3A%2F%2Fhost%2Fa.jpg"))
            .and(body_string_contains("caption=Daily+quote+%23quotes"))
            .and(body_string_contains("share_to_feed=true"))
            .and(body_string_contains("access_token=ig-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "CID1"})))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/v19.0/1789/media_publish"))
            .and(body_string_contains("creation_id=CID1"))
            .and(body_string_contains("access_token=ig-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "POST1"})))
            .expect(1)
            .mount(&server)
            .await;

        let config = config_for(&server);
        let publisher = InstagramPublisher::feed(&config, GraphClient::new(&config).unwrap());
        let outcome = publisher.publish(&feed_request()).await;

        assert!(outcome.is_success());
        assert_eq!(outcome.post_id(), Some("POST1"));
    }

    #[tokio::test]
    async fn test_publish_carries_creation_id() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v19.0/1789/media"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "C1"})))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/v19.0/1789/media_publish"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "P1"})))
            .expect(1)
            .mount(&server)
            .await;

        let config = config_for(&server);
        let publisher = InstagramPublisher::feed(&config, GraphClient::new(&config).unwrap());
        publisher.publish(&feed_request()).await;

        let requests = server.received_requests().await.unwrap();
        let publish_call = requests
            .iter()
            .find(|r| r.url.path() == "/v19.0/1789/media_publish")
            .unwrap();
        let body = String::from_utf8_lossy(&publish_call.body);
        assert!(body.contains("creation_id=C1"), "body: {}", body);
    }

    #[tokio::test]
    async fn test_story_container_payload() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v19.0/1789/media"))
            .and(body_string_contains("media_type=STORIES"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "S1"})))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/v19.0/1789/media_publish"))
            .and(body_string_contains("creation_id=S1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "STORY9"})))
            .expect(1)
            .mount(&server)
            .await;

        let config = config_for(&server);
        let publisher = InstagramPublisher::story(&config, GraphClient::new(&config).unwrap());
        assert_eq!(publisher.target(), Target::InstagramStory);

        let request = PublishRequest::new(Target::InstagramStory, "https://host/s.jpg", None);
        let outcome = publisher.publish(&request).await;
        assert_eq!(outcome.post_id(), Some("STORY9"));

        let requests = server.received_requests().await.unwrap();
        let container_body = String::from_utf8_lossy(&requests[0].body);
        assert!(!container_body.contains("caption="));
        assert!(!container_body.contains("share_to_feed"));
    }

    #[tokio::test]
    async fn test_container_rejection_skips_publish() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v19.0/1789/media"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": {"error_user_msg": "Invalid image"}
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/v19.0/1789/media_publish"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "X"})))
            .expect(0)
            .mount(&server)
            .await;

        let logs = LogBuffer::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let config = config_for(&server);
        let publisher = InstagramPublisher::feed(&config, GraphClient::new(&config).unwrap());
        let outcome = publisher.publish(&feed_request()).await;

        let logged = logs.contents();
        assert!(
            logged.contains("Instagram API Error Message: Invalid image"),
            "logs: {}",
            logged
        );
        assert!(!logged.contains("media_publish"));

        assert!(!outcome.is_success());
        assert!(outcome.to_string().contains("Invalid image"));
        match outcome {
            PublishOutcome::Failed(PublishFailure::ContainerRejected { message, .. }) => {
                assert_eq!(message.as_deref(), Some("Invalid image"))
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_publish_rejection_abandons_container() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v19.0/1789/media"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "C7"})))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/v19.0/1789/media_publish"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": {"message": "Media ID is not available", "error_user_msg": "Not ready"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let config = config_for(&server);
        let publisher = InstagramPublisher::feed(&config, GraphClient::new(&config).unwrap());
        let outcome = publisher.publish(&feed_request()).await;

        match outcome {
            PublishOutcome::Failed(PublishFailure::PublishRejected {
                container_id,
                message,
                ..
            }) => {
                assert_eq!(container_id.as_deref(), Some("C7"));
                assert_eq!(message.as_deref(), Some("Not ready"));
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_missing_credentials_skip_network() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "X"})))
            .expect(0)
            .mount(&server)
            .await;

        let mut config = config_for(&server);
        config.instagram.access_token = None;
        let publisher = InstagramPublisher::feed(&config, GraphClient::new(&config).unwrap());
        assert_eq!(
            publisher.publish(&feed_request()).await,
            PublishOutcome::Failed(PublishFailure::MissingCredential("Instagram access token"))
        );

        let mut config = config_for(&server);
        config.instagram.page_id = Some(String::new());
        let publisher = InstagramPublisher::feed(&config, GraphClient::new(&config).unwrap());
        assert_eq!(
            publisher.publish(&feed_request()).await,
            PublishOutcome::Failed(PublishFailure::MissingCredential("Instagram page ID"))
        );
    }

    #[tokio::test]
    async fn test_transport_error_is_reported() {
        let server = MockServer::start().await;
        let mut config = config_for(&server);
        // nothing listens on port 9 locally
        config.graph.base_url = "http://127.0.0.1:9".to_string();
        let publisher = InstagramPublisher::feed(&config, GraphClient::new(&config).unwrap());

        match publisher.publish(&feed_request()).await {
            PublishOutcome::Failed(PublishFailure::Transport(_)) => {}
            other => panic!("unexpected outcome: {:?}", other),
        }
    }
}

mod facebook;
mod graph;
mod instagram;
mod publisher;
pub(crate) mod types;

pub use publisher::Publisher;
pub use types::{PublishOutcome, PublishRequest, Target};

use crate::config::Config;
use facebook::FacebookPagePublisher;
use graph::GraphClient;
use instagram::InstagramPublisher;
use anyhow::Result;
use tracing::info;

/// Builds one publisher per configured target, in configuration order.
/// Repeated targets are kept once.
pub fn build_publishers(config: &Config) -> Result<Vec<Box<dyn Publisher>>> {
    let graph = GraphClient::new(config)?;

    let mut targets: Vec<Target> = Vec::new();
    for target in &config.run.targets {
        if !targets.contains(target) {
            targets.push(*target);
        }
    }

    let publishers: Vec<Box<dyn Publisher>> = targets
        .into_iter()
        .map(|target| -> Box<dyn Publisher> {
            match target {
                Target::InstagramFeed => Box::new(InstagramPublisher::feed(config, graph.clone())),
                Target::InstagramStory => {
                    Box::new(InstagramPublisher::story(config, graph.clone()))
                }
                Target::FacebookPage => {
                    Box::new(FacebookPagePublisher::new(config, graph.clone()))
                }
            }
        })
        .collect();

    info!(
        "Publishing to: {}",
        publishers
            .iter()
            .map(|p| p.name())
            .collect::<Vec<_>>()
            .join(", ")
    );

    Ok(publishers)
}

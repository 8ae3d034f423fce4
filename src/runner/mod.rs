mod selection;

use selection::plan_requests;

use crate::{
    config::Config,
    media::AssetSource,
    publish::{PublishOutcome, Publisher, Target},
};
use anyhow::Result;
use rand::Rng;
use tracing::{error, info, warn};

#[derive(Debug, Clone)]
pub struct TargetReport {
    pub target: Target,
    pub asset_url: String,
    pub outcome: PublishOutcome,
}

#[derive(Debug, Clone)]
pub struct RunSummary {
    pub folder: String,
    pub asset_count: usize,
    pub reports: Vec<TargetReport>,
}

impl RunSummary {
    pub fn succeeded(&self) -> usize {
        self.reports
            .iter()
            .filter(|report| report.outcome.is_success())
            .count()
    }

    pub fn failed(&self) -> usize {
        self.reports.len() - self.succeeded()
    }

    pub fn log(&self) {
        for report in &self.reports {
            match report.outcome.post_id() {
                Some(post_id) => info!(
                    target_name = %report.target,
                    asset = %report.asset_url,
                    post_id = %post_id,
                    "Random image upload to {} completed successfully",
                    report.target
                ),
                None => warn!(
                    target_name = %report.target,
                    asset = %report.asset_url,
                    "Random image upload to {} {}",
                    report.target,
                    report.outcome
                ),
            }
        }
        info!(
            "Run finished: {} published, {} failed",
            self.succeeded(),
            self.failed()
        );
    }
}

/// Drives one run: fetch the folder once, then post to each target in turn.
pub struct Runner<'a> {
    config: &'a Config,
    source: &'a dyn AssetSource,
    publishers: &'a [Box<dyn Publisher>],
}

impl<'a> Runner<'a> {
    pub fn new(
        config: &'a Config,
        source: &'a dyn AssetSource,
        publishers: &'a [Box<dyn Publisher>],
    ) -> Self {
        Self {
            config,
            source,
            publishers,
        }
    }

    /// A failed fetch or an empty folder stops the run before anything is
    /// posted. Per-target failures are reported in the summary instead.
    pub async fn run<R>(&self, folder: &str, rng: &mut R) -> Result<RunSummary>
    where
        R: Rng + ?Sized,
    {
        let media_type = self.config.run.media_type;
        let collection = match self.source.list_assets(folder, media_type).await {
            Ok(collection) => collection,
            Err(e) => {
                error!(
                    "Error fetching {}s from {}: {:#}",
                    media_type,
                    self.source.name(),
                    e
                );
                return Err(e.context(format!(
                    "Failed to fetch assets from folder '{}'",
                    folder
                )));
            }
        };

        if collection.is_empty() {
            error!(
                "No {}s found in {} folder '{}'. Exiting.",
                media_type,
                self.source.name(),
                folder
            );
            anyhow::bail!("Folder '{}' contains no {}s", folder, media_type);
        }

        if collection.truncated {
            warn!(
                "Selecting from a partial listing of {} {}s",
                collection.len(),
                media_type
            );
        }

        let targets: Vec<Target> = self.publishers.iter().map(|p| p.target()).collect();
        let requests = plan_requests(&collection, &targets, &self.config.run, rng);

        let mut reports = Vec::with_capacity(requests.len());
        for (publisher, request) in self.publishers.iter().zip(requests) {
            info!(
                "Preparing to post random image to {}: {}",
                publisher.name(),
                request.asset_url
            );
            let outcome = publisher.publish(&request).await;
            reports.push(TargetReport {
                target: request.target,
                asset_url: request.asset_url,
                outcome,
            });
        }

        let asset_count = collection.len();
        Ok(RunSummary {
            folder: collection.folder,
            asset_count,
            reports,
        })
    }
}

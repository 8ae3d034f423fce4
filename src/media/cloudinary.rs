use super::{
    source::AssetSource,
    types::{Asset, AssetCollection, MediaType},
};
use crate::config::{non_empty, Config};
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

/// Upper bound on resources returned by a single listing call.
/// Further pages are never requested.
pub const MAX_RESULTS: usize = 500;

#[derive(Debug, Deserialize)]
struct ResourceList {
    #[serde(default)]
    resources: Vec<Resource>,
    next_cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Resource {
    secure_url: Option<String>,
}

struct Credentials<'a> {
    cloud_name: &'a str,
    api_key: &'a str,
    api_secret: &'a str,
}

pub struct CloudinaryClient {
    client: reqwest::Client,
    base_url: String,
    cloud_name: Option<String>,
    api_key: Option<String>,
    api_secret: Option<String>,
}

impl CloudinaryClient {
    pub fn new(config: &Config) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.graph.timeout_secs))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: config.cloudinary.base_url.trim_end_matches('/').to_string(),
            cloud_name: config.cloudinary.cloud_name.clone(),
            api_key: config.cloudinary.api_key.clone(),
            api_secret: config.cloudinary.api_secret.clone(),
        })
    }

    fn credentials(&self) -> Result<Credentials<'_>> {
        let missing: Vec<&str> = [
            ("cloud_name", &self.cloud_name),
            ("api_key", &self.api_key),
            ("api_secret", &self.api_secret),
        ]
        .into_iter()
        .filter(|(_, value)| non_empty(value).is_none())
        .map(|(name, _)| name)
        .collect();

        match (
            non_empty(&self.cloud_name),
            non_empty(&self.api_key),
            non_empty(&self.api_secret),
        ) {
            (Some(cloud_name), Some(api_key), Some(api_secret)) => Ok(Credentials {
                cloud_name,
                api_key,
                api_secret,
            }),
            _ => Err(anyhow::anyhow!(
                "Cloudinary credentials not configured (missing: {})",
                missing.join(", ")
            )),
        }
    }

    fn listing_url(&self, cloud_name: &str, folder: &str, media_type: MediaType) -> Result<Url> {
        let endpoint = format!(
            "{}/v1_1/{}/resources/{}/upload",
            self.base_url, cloud_name, media_type
        );
        let prefix = format!("{}/", folder);
        let max_results = MAX_RESULTS.to_string();

        Url::parse_with_params(
            &endpoint,
            &[
                ("prefix", prefix.as_str()),
                ("max_results", max_results.as_str()),
            ],
        )
        .with_context(|| format!("Invalid Cloudinary endpoint: {}", endpoint))
    }
}

#[async_trait]
impl AssetSource for CloudinaryClient {
    fn name(&self) -> &'static str {
        "cloudinary"
    }

    async fn list_assets(&self, folder: &str, media_type: MediaType) -> Result<AssetCollection> {
        let folder = folder.trim_matches('/');
        if folder.is_empty() {
            anyhow::bail!("Folder name must not be empty");
        }

        let credentials = self.credentials()?;
        let url = self.listing_url(credentials.cloud_name, folder, media_type)?;
        debug!("Listing Cloudinary resources: {}", url);

        let response = self
            .client
            .get(url)
            .basic_auth(credentials.api_key, Some(credentials.api_secret))
            .send()
            .await
            .context("Failed to reach Cloudinary")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!(
                "Cloudinary listing failed: HTTP {}: {}",
                status,
                body
            ));
        }

        let listing: ResourceList = response
            .json()
            .await
            .context("Failed to parse Cloudinary listing")?;

        let mut assets: Vec<Asset> = listing
            .resources
            .into_iter()
            .filter_map(|resource| resource.secure_url)
            .map(Asset::new)
            .collect();

        let truncated = listing.next_cursor.is_some() || assets.len() > MAX_RESULTS;
        assets.truncate(MAX_RESULTS);

        if truncated {
            warn!(
                "Cloudinary folder '{}' holds more than {} {}s; only the first page is used",
                folder, MAX_RESULTS, media_type
            );
        }

        info!(
            "Successfully fetched {} {}s from Cloudinary folder '{}'",
            assets.len(),
            media_type,
            folder
        );

        let mut collection = AssetCollection::new(folder, assets);
        collection.truncated = truncated;
        debug!("Listed assets: {:?}", collection.urls().collect::<Vec<_>>());
        Ok(collection)
    }
}

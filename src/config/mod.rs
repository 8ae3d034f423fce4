use crate::{media::MediaType, publish::Target};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_FOLDER: &str = "Quotes";
pub const DEFAULT_INSTAGRAM_CAPTION: &str =
    "Here's your daily dose of inspiration! ✨ #quotes #motivation #inspiration #dailyquotes";
pub const DEFAULT_FACEBOOK_MESSAGE: &str =
    "Get inspired with today's random quote image! #motivation #quotes #inspiration";

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct LoggingConfig {
    /// `json` or anything else for human-readable output
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: "json".to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct CloudinaryConfig {
    pub base_url: String,
    pub cloud_name: Option<String>,
    pub api_key: Option<String>,
    pub api_secret: Option<String>,
}

impl Default for CloudinaryConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.cloudinary.com".to_string(),
            cloud_name: None,
            api_key: None,
            api_secret: None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(default)]
pub struct InstagramConfig {
    pub access_token: Option<String>,
    /// Instagram business account id the containers are created under
    pub page_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(default)]
pub struct FacebookConfig {
    pub page_access_token: Option<String>,
    pub page_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct GraphConfig {
    pub base_url: String,
    pub api_version: String,
    pub timeout_secs: u64,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            base_url: "https://graph.facebook.com".to_string(),
            api_version: "v19.0".to_string(),
            timeout_secs: 60,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct RunConfig {
    pub folder: String,
    pub media_type: MediaType,
    pub targets: Vec<Target>,
    pub instagram_caption: String,
    pub facebook_message: String,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            folder: DEFAULT_FOLDER.to_string(),
            media_type: MediaType::Image,
            targets: vec![Target::InstagramFeed, Target::FacebookPage],
            instagram_caption: DEFAULT_INSTAGRAM_CAPTION.to_string(),
            facebook_message: DEFAULT_FACEBOOK_MESSAGE.to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub logging: LoggingConfig,
    pub cloudinary: CloudinaryConfig,
    pub instagram: InstagramConfig,
    pub facebook: FacebookConfig,
    pub graph: GraphConfig,
    pub run: RunConfig,
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_toml(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }

    /// Loads the file (if any) and layers the process environment on top.
    pub fn load(path: Option<&str>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Overrides credentials from environment-style lookups. Empty values are ignored.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let overrides: [(&str, &mut Option<String>); 7] = [
            ("CLOUDINARY_CLOUD_NAME", &mut self.cloudinary.cloud_name),
            ("CLOUDINARY_API_KEY", &mut self.cloudinary.api_key),
            ("CLOUDINARY_API_SECRET", &mut self.cloudinary.api_secret),
            ("INSTAGRAM_ACCESS_TOKEN", &mut self.instagram.access_token),
            ("INSTAGRAM_PAGE_ID", &mut self.instagram.page_id),
            (
                "FACEBOOK_PAGE_ACCESS_TOKEN",
                &mut self.facebook.page_access_token,
            ),
            ("FACEBOOK_PAGE_ID", &mut self.facebook.page_id),
        ];

        for (key, slot) in overrides {
            if let Some(value) = get(key) {
                *slot = Some(value);
            }
        }
    }

    pub fn get_logging_format(&self) -> &str {
        &self.logging.format
    }
}

/// Returns the value only if it is present and not blank.
pub fn non_empty(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

use super::types::{AssetCollection, MediaType};
use anyhow::Result;
use async_trait::async_trait;

#[async_trait]
pub trait AssetSource: Send + Sync {
    /// Human-readable name of the media host
    fn name(&self) -> &'static str;

    /// List the assets stored under `folder`.
    ///
    /// `Ok` with an empty collection means the folder holds nothing;
    /// `Err` means the listing could not be performed at all.
    async fn list_assets(&self, folder: &str, media_type: MediaType) -> Result<AssetCollection>;
}

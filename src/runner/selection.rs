use crate::{
    config::RunConfig,
    media::{Asset, AssetCollection},
    publish::{PublishRequest, Target},
};
use rand::{seq::IndexedRandom, Rng};

/// Uniform choice from the collection. Each call is independent, so the same
/// asset can come back for several targets.
pub fn pick_asset<'a, R>(collection: &'a AssetCollection, rng: &mut R) -> Option<&'a Asset>
where
    R: Rng + ?Sized,
{
    collection.assets.choose(rng)
}

pub fn caption_for(target: Target, run: &RunConfig) -> Option<String> {
    match target {
        Target::InstagramFeed => Some(run.instagram_caption.clone()),
        Target::InstagramStory => None,
        Target::FacebookPage => Some(run.facebook_message.clone()),
    }
}

/// Picks an asset for every target and pairs it with that target's caption.
pub fn plan_requests<R>(
    collection: &AssetCollection,
    targets: &[Target],
    run: &RunConfig,
    rng: &mut R,
) -> Vec<PublishRequest>
where
    R: Rng + ?Sized,
{
    targets
        .iter()
        .filter_map(|target| {
            pick_asset(collection, rng).map(|asset| {
                PublishRequest::new(*target, asset.url.clone(), caption_for(*target, run))
            })
        })
        .collect()
}

mod cloudinary;
mod source;
mod types;

pub use cloudinary::CloudinaryClient;
pub use source::AssetSource;
pub use types::{Asset, AssetCollection, MediaType};

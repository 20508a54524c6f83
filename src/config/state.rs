// Application state module
// Holds the loaded config plus the content store and upload policy built from it

use super::types::Config;
use crate::content::ContentStore;
use crate::upload::UploadPolicy;

/// Application state shared by every connection
pub struct AppState {
    pub config: Config,
    pub store: ContentStore,
    pub uploads: UploadPolicy,
}

impl AppState {
    pub fn new(config: &Config) -> Self {
        Self {
            config: config.clone(),
            store: ContentStore::new(&config.content.data_file),
            uploads: UploadPolicy::from_config(&config.content),
        }
    }
}

#[cfg(test)]
impl AppState {
    /// Default config with every content path moved under `root`
    pub fn rooted_at(root: &std::path::Path) -> Self {
        let mut config = Config::load_from("does-not-exist/config").expect("defaults load");
        config.content.data_file = root.join("data").join("content.json");
        config.content.public_dir = root.join("public");
        config.content.upload_dir = root.join("public").join("uploads");
        Self::new(&config)
    }
}

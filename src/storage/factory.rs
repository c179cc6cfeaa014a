use std::sync::Arc;

use super::config::{StorageConfig, StorageType};
use super::error::{StorageError, StorageResult};
use super::provider::{LakeStore, LocationInfo};
use super::s3::S3LakeStore;

/// Factory for lake storage providers.
pub struct LakeStoreFactory;

impl LakeStoreFactory {
    /// Create a lake store from a configuration and the lake's known
    /// locations.
    ///
    /// Only the AWS (S3-compatible) provider is implemented; Azure and GCS
    /// configurations are rejected with a configuration error until their
    /// providers exist.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Config` for unimplemented provider types or an
    /// invalid AWS configuration.
    pub fn from_config(
        config: StorageConfig,
        locations: Vec<LocationInfo>,
    ) -> StorageResult<Arc<dyn LakeStore>> {
        match config.storage_type {
            StorageType::Aws => Ok(Arc::new(S3LakeStore::new(config, locations)?)),
            StorageType::Azure => Err(StorageError::Config(
                "Azure storage is not yet supported".to_string(),
            )),
            StorageType::Gcs => Err(StorageError::Config(
                "GCS storage is not yet supported".to_string(),
            )),
        }
    }
}

// Copyright 2025 Adobe. All rights reserved.
// This file is licensed to you under the Apache License,
// Version 2.0 (http://www.apache.org/licenses/LICENSE-2.0)
// or the MIT license (http://opensource.org/licenses/MIT),
// at your option.
//
// Unless required by applicable law or agreed to in writing,
// this software is distributed on an "AS IS" BASIS, WITHOUT
// WARRANTIES OR REPRESENTATIONS OF ANY KIND, either express or
// implied. See the LICENSE-MIT and LICENSE-APACHE files for the
// specific language governing permissions and limitations under
// each license.

//! S3-compatible lake storage built on the `object_store` crate.
//!
//! One [`S3LakeStore`] serves a whole lake (one credential set); per-bucket
//! [`object_store::aws::AmazonS3`] instances are built lazily and cached,
//! since `object_store` binds a store to a single bucket.

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::StreamExt;
use object_store::path::Path as ObjectPath;
use object_store::{
    aws::AmazonS3Builder, ClientOptions, GetOptions, GetRange, ObjectStore, RetryConfig,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{debug, warn};

use super::config::{StorageConfig, StorageType};
use super::error::{classify_store_error, StorageError, StorageResult};
use super::provider::{LakeStore, LocationInfo, LocationStore, ObjectInfo, PrefixListing};
use crate::util::retry::retry_transient;

/// Account-level S3 storage for one lake.
///
/// The set of reachable locations is supplied at construction time: the
/// persistence layer resolves a lake's registered locations to bucket names
/// and hands them over, because the bucket-scoped object API carries no
/// account-level listing operation.
pub struct S3LakeStore {
    config: StorageConfig,
    locations: Vec<LocationInfo>,
    stores: Mutex<HashMap<String, Arc<S3LocationStore>>>,
}

impl S3LakeStore {
    /// Create a lake store from configuration plus its known locations.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Config` when the configuration names a
    /// provider other than AWS.
    pub fn new(config: StorageConfig, locations: Vec<LocationInfo>) -> StorageResult<Self> {
        if config.storage_type != StorageType::Aws {
            return Err(StorageError::Config(format!(
                "S3LakeStore requires an 'aws' configuration, got '{}'",
                config.storage_type.as_str()
            )));
        }

        Ok(Self {
            config,
            locations,
            stores: Mutex::new(HashMap::new()),
        })
    }

    /// Build connection options from configuration.
    fn build_client_options(config: &StorageConfig) -> ClientOptions {
        let mut client_options = ClientOptions::default();
        if let Some(timeout) = config.options.get("timeout") {
            if timeout == "0" || timeout == "disabled" {
                client_options = client_options.with_timeout_disabled();
            } else if let Ok(sec) = timeout.parse::<u64>() {
                client_options = client_options.with_timeout(Duration::from_secs(sec));
            }
        }
        if let Some(connect_timeout) = config.options.get("connect_timeout") {
            if connect_timeout == "0" || connect_timeout == "disabled" {
                client_options = client_options.with_connect_timeout_disabled();
            } else if let Ok(sec) = connect_timeout.parse::<u64>() {
                client_options = client_options.with_connect_timeout(Duration::from_secs(sec));
            }
        }
        client_options
    }

    /// Build retry options from configuration.
    fn build_retry_options(config: &StorageConfig) -> RetryConfig {
        let default_retry_config = RetryConfig::default();
        let max_retries = config
            .options
            .get("max_retries")
            .and_then(|s| s.parse::<usize>().ok())
            .unwrap_or(default_retry_config.max_retries);
        let retry_timeout = config
            .options
            .get("retry_timeout")
            .and_then(|s| Some(Duration::from_secs(s.parse::<u64>().ok()?)))
            .unwrap_or(default_retry_config.retry_timeout);
        RetryConfig {
            backoff: Default::default(),
            max_retries,
            retry_timeout,
        }
    }

    fn max_retries(config: &StorageConfig) -> usize {
        config
            .options
            .get("max_retries")
            .and_then(|s| s.parse::<usize>().ok())
            .unwrap_or(10)
    }

    /// Build a bucket-scoped store from the lake configuration.
    fn build_bucket_store(&self, bucket: &str) -> StorageResult<Arc<S3LocationStore>> {
        let mut builder = AmazonS3Builder::new()
            .with_bucket_name(bucket)
            .with_client_options(Self::build_client_options(&self.config))
            .with_retry(Self::build_retry_options(&self.config));

        for (key, value) in &self.config.options {
            match key.as_str() {
                "region" => builder = builder.with_region(value),
                "access_key_id" => builder = builder.with_access_key_id(value),
                "secret_access_key" => builder = builder.with_secret_access_key(value),
                "session_token" | "token" => builder = builder.with_token(value),
                "endpoint" => builder = builder.with_endpoint(value),
                "allow_http" => {
                    if value.eq_ignore_ascii_case("true") {
                        builder = builder.with_allow_http(true);
                    }
                }
                // Handled by `build_client_options` / `build_retry_options`.
                "timeout" | "connect_timeout" | "max_retries" | "retry_timeout" => (),
                _ => {
                    warn!("Unknown AWS S3 option: {}", key);
                }
            }
        }

        let store = builder.build().map_err(|e| {
            StorageError::Config(format!("Failed to create S3 store for '{bucket}': {e}"))
        })?;

        Ok(Arc::new(S3LocationStore {
            name: bucket.to_string(),
            store: Arc::new(store),
            max_retries: Self::max_retries(&self.config),
        }))
    }

    fn cached_or_build(&self, bucket: &str) -> StorageResult<Arc<S3LocationStore>> {
        if let Some(store) = self
            .stores
            .lock()
            .expect("s3 store cache lock poisoned")
            .get(bucket)
        {
            return Ok(Arc::clone(store));
        }

        let store = self.build_bucket_store(bucket)?;
        self.stores
            .lock()
            .expect("s3 store cache lock poisoned")
            .insert(bucket.to_string(), Arc::clone(&store));
        Ok(store)
    }
}

#[async_trait]
impl LakeStore for S3LakeStore {
    fn storage_type(&self) -> StorageType {
        StorageType::Aws
    }

    async fn list_locations(&self) -> StorageResult<Vec<LocationInfo>> {
        Ok(self.locations.clone())
    }

    async fn head_location(&self, name: &str) -> StorageResult<LocationInfo> {
        let store = self.cached_or_build(name)?;

        // The cheapest probe the bucket-scoped API offers: one delimiter
        // listing of the root. NotFound/Forbidden surface as themselves.
        store
            .store
            .list_with_delimiter(None)
            .await
            .map_err(|e| classify_store_error(e, name))?;

        let known = self.locations.iter().find(|l| l.name == name).cloned();
        Ok(known.unwrap_or_else(|| LocationInfo {
            name: name.to_string(),
            region: self.config.get_option("region").cloned(),
            created_at: None,
        }))
    }

    async fn location(&self, name: &str) -> StorageResult<Arc<dyn LocationStore>> {
        Ok(self.cached_or_build(name)? as Arc<dyn LocationStore>)
    }
}

/// Object-level operations against one S3 bucket.
pub struct S3LocationStore {
    name: String,
    store: Arc<dyn ObjectStore>,
    max_retries: usize,
}

fn to_object_path(prefix: &str) -> ObjectPath {
    ObjectPath::from(prefix)
}

impl S3LocationStore {
    fn optional_path(prefix: Option<&str>) -> Option<ObjectPath> {
        match prefix {
            Some(p) if !p.is_empty() => Some(to_object_path(p)),
            _ => None,
        }
    }
}

#[async_trait]
impl LocationStore for S3LocationStore {
    fn name(&self) -> &str {
        &self.name
    }

    async fn list_with_delimiter(&self, prefix: Option<&str>) -> StorageResult<PrefixListing> {
        let store = Arc::clone(&self.store);
        let prefix_owned = prefix.map(str::to_string);

        retry_transient(self.max_retries, "list_with_delimiter", || async {
            let object_path = Self::optional_path(prefix_owned.as_deref());
            let result = store
                .list_with_delimiter(object_path.as_ref())
                .await
                .map_err(|e| classify_store_error(e, &self.name))?;

            Ok(PrefixListing {
                objects: result
                    .objects
                    .into_iter()
                    .map(|meta| ObjectInfo {
                        key: meta.location.to_string(),
                        size: meta.size,
                        last_modified: Some(meta.last_modified),
                    })
                    .collect(),
                // `object_store` strips the trailing delimiter; restore the
                // S3 convention the folder-marker matching relies on.
                common_prefixes: result
                    .common_prefixes
                    .iter()
                    .map(|p| format!("{}/", p))
                    .collect(),
            })
        })
        .await
    }

    async fn list_all(&self, prefix: Option<&str>) -> StorageResult<Vec<ObjectInfo>> {
        let store = Arc::clone(&self.store);
        let prefix_owned = prefix.map(str::to_string);

        retry_transient(self.max_retries, "list_all", || async {
            let object_path = Self::optional_path(prefix_owned.as_deref());
            let mut objects = Vec::new();
            let mut stream = store.list(object_path.as_ref());

            while let Some(meta) = stream.next().await {
                let meta = meta.map_err(|e| classify_store_error(e, &self.name))?;
                objects.push(ObjectInfo {
                    key: meta.location.to_string(),
                    size: meta.size,
                    last_modified: Some(meta.last_modified),
                });
            }

            debug!(
                "Listed objects bucket={} prefix={:?} count={}",
                self.name,
                prefix_owned,
                objects.len()
            );

            Ok(objects)
        })
        .await
    }

    async fn get(&self, key: &str) -> StorageResult<Bytes> {
        let object_path = to_object_path(key);
        let result = self
            .store
            .get(&object_path)
            .await
            .map_err(|e| classify_store_error(e, key))?;
        result
            .bytes()
            .await
            .map_err(|e| classify_store_error(e, key))
    }

    async fn get_suffix(&self, key: &str, nbytes: u64) -> StorageResult<Bytes> {
        let object_path = to_object_path(key);
        let options = GetOptions {
            range: Some(GetRange::Suffix(nbytes)),
            ..Default::default()
        };
        let result = self
            .store
            .get_opts(&object_path, options)
            .await
            .map_err(|e| classify_store_error(e, key))?;
        result
            .bytes()
            .await
            .map_err(|e| classify_store_error(e, key))
    }

    fn uri(&self, key: &str) -> String {
        format!("s3://{}/{}", self.name, key.trim_start_matches('/'))
    }
}

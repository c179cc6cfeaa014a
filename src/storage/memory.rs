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

//! In-memory lake storage.
//!
//! A fully functional [`LakeStore`] over process memory, mirroring S3
//! delimiter-listing semantics. Used by the test suite and handy for local
//! experimentation; listing failures can be injected per bucket to exercise
//! partial-failure paths.

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::{Arc, Mutex};

use super::config::StorageType;
use super::error::{StorageError, StorageResult};
use super::provider::{LakeStore, LocationInfo, LocationStore, ObjectInfo, PrefixListing};

#[derive(Clone)]
struct StoredObject {
    data: Bytes,
    last_modified: DateTime<Utc>,
}

#[derive(Default)]
struct BucketState {
    objects: BTreeMap<String, StoredObject>,
    fail_listing: bool,
}

/// An in-memory lake: named buckets of keyed byte blobs.
#[derive(Default)]
pub struct MemoryLake {
    buckets: Mutex<HashMap<String, Arc<MemoryLocation>>>,
}

impl MemoryLake {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get or create a bucket handle.
    pub fn bucket(&self, name: &str) -> Arc<MemoryLocation> {
        let mut buckets = self.buckets.lock().expect("memory lake lock poisoned");
        Arc::clone(buckets.entry(name.to_string()).or_insert_with(|| {
            Arc::new(MemoryLocation {
                name: name.to_string(),
                state: Mutex::new(BucketState::default()),
            })
        }))
    }

    /// Convenience: create `bucket` and insert `key` with `data` in one call.
    pub fn put_object(&self, bucket: &str, key: &str, data: impl Into<Bytes>) {
        self.bucket(bucket).put(key, data, Utc::now());
    }

    /// Insert an object with an explicit last-modified timestamp.
    pub fn put_object_at(
        &self,
        bucket: &str,
        key: &str,
        data: impl Into<Bytes>,
        last_modified: DateTime<Utc>,
    ) {
        self.bucket(bucket).put(key, data, last_modified);
    }

    /// Make every listing call against `bucket` fail, for failure-path tests.
    pub fn fail_listing(&self, bucket: &str) {
        self.bucket(bucket)
            .state
            .lock()
            .expect("memory bucket lock poisoned")
            .fail_listing = true;
    }
}

#[async_trait]
impl LakeStore for MemoryLake {
    fn storage_type(&self) -> StorageType {
        StorageType::Aws
    }

    async fn list_locations(&self) -> StorageResult<Vec<LocationInfo>> {
        let buckets = self.buckets.lock().expect("memory lake lock poisoned");
        let mut names: Vec<&String> = buckets.keys().collect();
        names.sort();
        Ok(names
            .into_iter()
            .map(|n| LocationInfo::named(n.clone()))
            .collect())
    }

    async fn head_location(&self, name: &str) -> StorageResult<LocationInfo> {
        let buckets = self.buckets.lock().expect("memory lake lock poisoned");
        if buckets.contains_key(name) {
            Ok(LocationInfo::named(name))
        } else {
            Err(StorageError::NotFound(name.to_string()))
        }
    }

    async fn location(&self, name: &str) -> StorageResult<Arc<dyn LocationStore>> {
        Ok(self.bucket(name) as Arc<dyn LocationStore>)
    }
}

/// One in-memory bucket.
pub struct MemoryLocation {
    name: String,
    state: Mutex<BucketState>,
}

impl MemoryLocation {
    fn put(&self, key: &str, data: impl Into<Bytes>, last_modified: DateTime<Utc>) {
        self.state
            .lock()
            .expect("memory bucket lock poisoned")
            .objects
            .insert(
                key.trim_start_matches('/').to_string(),
                StoredObject {
                    data: data.into(),
                    last_modified,
                },
            );
    }

    fn check_listing(&self, state: &BucketState) -> StorageResult<()> {
        if state.fail_listing {
            Err(StorageError::ObjectStore(object_store::Error::Generic {
                store: "memory",
                source: format!("injected listing failure for bucket '{}'", self.name).into(),
            }))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl LocationStore for MemoryLocation {
    fn name(&self) -> &str {
        &self.name
    }

    async fn list_with_delimiter(&self, prefix: Option<&str>) -> StorageResult<PrefixListing> {
        let state = self.state.lock().expect("memory bucket lock poisoned");
        self.check_listing(&state)?;

        let prefix = prefix.unwrap_or("");
        let mut listing = PrefixListing::default();
        let mut seen_prefixes = BTreeSet::new();

        for (key, obj) in state.objects.range(prefix.to_string()..) {
            if !key.starts_with(prefix) {
                break;
            }
            let remainder = &key[prefix.len()..];
            match remainder.find('/') {
                Some(idx) => {
                    seen_prefixes.insert(format!("{}{}/", prefix, &remainder[..idx]));
                }
                None => listing.objects.push(ObjectInfo {
                    key: key.clone(),
                    size: obj.data.len() as u64,
                    last_modified: Some(obj.last_modified),
                }),
            }
        }

        listing.common_prefixes = seen_prefixes.into_iter().collect();
        Ok(listing)
    }

    async fn list_all(&self, prefix: Option<&str>) -> StorageResult<Vec<ObjectInfo>> {
        let state = self.state.lock().expect("memory bucket lock poisoned");
        self.check_listing(&state)?;

        let prefix = prefix.unwrap_or("");
        Ok(state
            .objects
            .range(prefix.to_string()..)
            .take_while(|(key, _)| key.starts_with(prefix))
            .map(|(key, obj)| ObjectInfo {
                key: key.clone(),
                size: obj.data.len() as u64,
                last_modified: Some(obj.last_modified),
            })
            .collect())
    }

    async fn get(&self, key: &str) -> StorageResult<Bytes> {
        let state = self.state.lock().expect("memory bucket lock poisoned");
        state
            .objects
            .get(key.trim_start_matches('/'))
            .map(|obj| obj.data.clone())
            .ok_or_else(|| StorageError::NotFound(format!("{}/{}", self.name, key)))
    }

    async fn get_suffix(&self, key: &str, nbytes: u64) -> StorageResult<Bytes> {
        let data = self.get(key).await?;
        let len = data.len();
        let take = (nbytes as usize).min(len);
        Ok(data.slice(len - take..))
    }

    fn uri(&self, key: &str) -> String {
        format!("s3://{}/{}", self.name, key.trim_start_matches('/'))
    }
}

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

//! The stash: in-process caches for scan results and storage clients.
//!
//! Two maps, each behind its own mutex, entries always read and written as
//! whole values so an entry can never be observed half-updated. Construct
//! one stash per service instance and inject it; nothing here is global
//! state.

pub mod credentials;

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing::{debug, info};

use crate::error::{ErrorKind, ScanError, ScanOutcome};
use crate::storage::{LakeStore, LakeStoreFactory, StorageConfig, StorageType};
use crate::types::ScanResult;
use credentials::{CredentialStore, LocationDirectory};

pub use credentials::{LakeCredentials, StaticLakeResolver};

/// One cached scan result plus its staleness fingerprints.
///
/// Replaced wholesale on every successful rescan; never expired by time.
/// Staleness is detected by comparing fingerprints on the next scan, not by
/// TTL.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub result: ScanResult,
    pub created_at: DateTime<Utc>,

    /// Newest object modification the scan observed.
    pub updated_at: Option<DateTime<Utc>>,

    /// Object count the scan observed.
    pub key_count: u64,
}

struct ClientEntry {
    client: Arc<dyn LakeStore>,
    last_used: Instant,
}

/// In-process cache keyed by bucket name (scan results) and lake id
/// (storage clients).
pub struct Stash {
    buckets: Mutex<HashMap<String, CacheEntry>>,
    clients: Mutex<HashMap<i64, ClientEntry>>,
    credentials: Arc<dyn CredentialStore>,
    directory: Arc<dyn LocationDirectory>,
    client_idle_ttl: Duration,
}

impl Stash {
    pub fn new(
        credentials: Arc<dyn CredentialStore>,
        directory: Arc<dyn LocationDirectory>,
        client_idle_ttl: Duration,
    ) -> Self {
        Self {
            buckets: Mutex::new(HashMap::new()),
            clients: Mutex::new(HashMap::new()),
            credentials,
            directory,
            client_idle_ttl,
        }
    }

    /// Look up the cached scan result for a bucket.
    pub fn get(&self, bucket_name: &str) -> Option<CacheEntry> {
        self.buckets
            .lock()
            .expect("bucket cache lock poisoned")
            .get(bucket_name)
            .cloned()
    }

    /// Replace the cached entry for the result's bucket.
    pub fn put(&self, result: &ScanResult) {
        let entry = CacheEntry {
            result: result.clone(),
            created_at: Utc::now(),
            updated_at: result.data.updated_at,
            key_count: result.data.key_count,
        };

        let mut buckets = self.buckets.lock().expect("bucket cache lock poisoned");
        buckets.remove(&result.data.name);
        buckets.insert(result.data.name.clone(), entry);

        debug!(
            "Stashed scan result bucket={} key_count={}",
            result.data.name, result.data.key_count
        );
    }

    /// Drop the cached entry for a bucket, if any.
    pub fn remove(&self, bucket_name: &str) {
        self.buckets
            .lock()
            .expect("bucket cache lock poisoned")
            .remove(bucket_name);
    }

    /// Return the cached storage client for a lake, constructing one from
    /// stored credentials on first use.
    ///
    /// Every call refreshes the entry's `last_used`; entries idle past the
    /// configured TTL are evicted before lookup.
    pub async fn get_or_create_client(&self, lake_id: i64) -> ScanOutcome<Arc<dyn LakeStore>> {
        {
            let mut clients = self.clients.lock().expect("client cache lock poisoned");
            Self::evict_idle(&mut clients, self.client_idle_ttl);

            if let Some(entry) = clients.get_mut(&lake_id) {
                entry.last_used = Instant::now();
                return Ok(Arc::clone(&entry.client));
            }
        }

        // Construct outside the lock; two racing callers may both build,
        // last insert wins and the loser's client is dropped.
        let client = self.build_client(lake_id).await?;

        let mut clients = self.clients.lock().expect("client cache lock poisoned");
        clients.insert(
            lake_id,
            ClientEntry {
                client: Arc::clone(&client),
                last_used: Instant::now(),
            },
        );

        info!("Constructed storage client lake_id={}", lake_id);
        Ok(client)
    }

    async fn build_client(&self, lake_id: i64) -> ScanOutcome<Arc<dyn LakeStore>> {
        let creds = self.credentials.credentials(lake_id).await?;
        let locations = self.directory.locations_for_lake(lake_id).await?;

        let mut config = match creds.storage_type {
            StorageType::Aws => StorageConfig::aws(),
            StorageType::Azure => StorageConfig::azure(),
            StorageType::Gcs => StorageConfig::gcs(),
        };
        config = config
            .with_option("region", &creds.region)
            .with_option("access_key_id", &creds.access_key_id)
            .with_option("secret_access_key", &creds.secret_access_key);
        if let Some(token) = &creds.session_token {
            config = config.with_option("session_token", token);
        }
        if let Some(endpoint) = &creds.endpoint {
            config = config.with_option("endpoint", endpoint);
        }

        LakeStoreFactory::from_config(config, locations).map_err(|e| {
            ScanError::internal(
                ErrorKind::DependencyFailed,
                format!("Failed to construct storage client for lake {lake_id}: {e}"),
            )
        })
    }

    fn evict_idle(clients: &mut HashMap<i64, ClientEntry>, ttl: Duration) {
        clients.retain(|lake_id, entry| {
            let keep = entry.last_used.elapsed() <= ttl;
            if !keep {
                debug!("Evicting idle storage client lake_id={}", lake_id);
            }
            keep
        });
    }
}

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

//! Collaborator interfaces the stash depends on.
//!
//! Credential decryption and lake/location records live outside this crate;
//! the stash only needs the two lookups below. [`StaticLakeResolver`]
//! implements both from in-memory maps for tests and local use.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

use crate::error::{ErrorKind, ScanError, ScanOutcome};
use crate::storage::{LocationInfo, StorageType};

/// Decrypted credentials for one lake.
#[derive(Debug, Clone)]
pub struct LakeCredentials {
    pub storage_type: StorageType,
    pub access_key_id: String,
    pub secret_access_key: String,
    pub region: String,
    pub session_token: Option<String>,
    /// Custom endpoint for S3-compatible services.
    pub endpoint: Option<String>,
}

/// Hands out decrypted credentials per lake id.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn credentials(&self, lake_id: i64) -> ScanOutcome<LakeCredentials>;
}

/// Resolves a lake id to its registered locations.
#[async_trait]
pub trait LocationDirectory: Send + Sync {
    async fn locations_for_lake(&self, lake_id: i64) -> ScanOutcome<Vec<LocationInfo>>;
}

/// In-memory implementation of both collaborator interfaces.
#[derive(Default)]
pub struct StaticLakeResolver {
    lakes: Mutex<HashMap<i64, (LakeCredentials, Vec<LocationInfo>)>>,
}

impl StaticLakeResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(
        &self,
        lake_id: i64,
        credentials: LakeCredentials,
        locations: Vec<LocationInfo>,
    ) {
        self.lakes
            .lock()
            .expect("resolver lock poisoned")
            .insert(lake_id, (credentials, locations));
    }
}

#[async_trait]
impl CredentialStore for StaticLakeResolver {
    async fn credentials(&self, lake_id: i64) -> ScanOutcome<LakeCredentials> {
        self.lakes
            .lock()
            .expect("resolver lock poisoned")
            .get(&lake_id)
            .map(|(creds, _)| creds.clone())
            .ok_or_else(|| {
                ScanError::user(
                    ErrorKind::NotFound,
                    format!("No credentials registered for lake {lake_id}."),
                )
            })
    }
}

#[async_trait]
impl LocationDirectory for StaticLakeResolver {
    async fn locations_for_lake(&self, lake_id: i64) -> ScanOutcome<Vec<LocationInfo>> {
        self.lakes
            .lock()
            .expect("resolver lock poisoned")
            .get(&lake_id)
            .map(|(_, locations)| locations.clone())
            .ok_or_else(|| {
                ScanError::user(
                    ErrorKind::NotFound,
                    format!("No locations registered for lake {lake_id}."),
                )
            })
    }
}

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

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::sync::Arc;

use super::config::StorageType;
use super::error::StorageResult;

/// Metadata about one object in storage.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectInfo {
    /// Object key, relative to the bucket root (no leading slash).
    pub key: String,

    /// Object size in bytes.
    pub size: u64,

    /// Last modified timestamp, if the backend reports one.
    pub last_modified: Option<DateTime<Utc>>,
}

/// One page of a delimiter-based listing: direct objects plus the "folder"
/// prefixes below the listed prefix.
#[derive(Debug, Clone, Default)]
pub struct PrefixListing {
    pub objects: Vec<ObjectInfo>,

    /// Common prefixes, each ending in the delimiter (`/`), matching the
    /// convention of the S3 ListObjectsV2 response.
    pub common_prefixes: Vec<String>,
}

/// Identity of one location (bucket/container) under a lake.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationInfo {
    pub name: String,
    pub region: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

impl LocationInfo {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            region: None,
            created_at: None,
        }
    }
}

/// Account-level view of one lake: the set of locations its credentials can
/// reach, plus access to each of them.
///
/// One instance per lake, typically cached by the stash. Implementations are
/// cheap to clone behind `Arc` and safe to share across concurrent scans.
#[async_trait]
pub trait LakeStore: Send + Sync {
    /// The provider this lake lives on.
    fn storage_type(&self) -> StorageType;

    /// Enumerate the locations visible to this lake.
    async fn list_locations(&self) -> StorageResult<Vec<LocationInfo>>;

    /// Check that a location exists and is accessible.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` when the location does not exist and
    /// `StorageError::Forbidden` when access is denied, so callers can tell
    /// the two apart without inspecting messages.
    async fn head_location(&self, name: &str) -> StorageResult<LocationInfo>;

    /// Open a handle for object-level operations on one location.
    async fn location(&self, name: &str) -> StorageResult<Arc<dyn LocationStore>>;
}

/// Object-level operations against a single location (bucket).
#[async_trait]
pub trait LocationStore: Send + Sync {
    /// The location (bucket) name this handle is bound to.
    fn name(&self) -> &str;

    /// Delimiter-based listing of one prefix level.
    ///
    /// One API call per invocation; the classifier relies on this to keep
    /// its cost at O(levels) rather than O(objects).
    async fn list_with_delimiter(&self, prefix: Option<&str>) -> StorageResult<PrefixListing>;

    /// Recursive listing of every object under a prefix (or the whole
    /// location when `prefix` is `None`).
    async fn list_all(&self, prefix: Option<&str>) -> StorageResult<Vec<ObjectInfo>>;

    /// Fetch a whole object.
    async fn get(&self, key: &str) -> StorageResult<Bytes>;

    /// Fetch the final `nbytes` of an object.
    ///
    /// When the object is smaller than `nbytes` the whole object is
    /// returned, matching S3 suffix-range semantics.
    async fn get_suffix(&self, key: &str, nbytes: u64) -> StorageResult<Bytes>;

    /// Provider-specific URI for a key (e.g. `s3://bucket/key`).
    fn uri(&self, key: &str) -> String;
}

impl Debug for dyn LakeStore {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "LakeStore(type={})", self.storage_type().as_str())
    }
}

impl Debug for dyn LocationStore {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "LocationStore(name={})", self.name())
    }
}

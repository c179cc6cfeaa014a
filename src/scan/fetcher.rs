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

//! Scratch-file fetcher.
//!
//! The only place extraction touches both the network and the local disk:
//! an object (or byte range) is downloaded and persisted to a scratch file
//! for the pure readers to decode. Scratch files are named from a
//! process-unique sequence, never from the remote key, since keys can
//! collide across concurrently scanned buckets.

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use tempfile::TempDir;
use tracing::debug;
use url::Url;

use crate::error::{ErrorKind, ScanError, ScanOutcome};
use crate::storage::LocationStore;

/// Downloads objects into a private scratch directory.
///
/// The directory lives as long as the fetcher; dropping it removes every
/// scratch file. Safe to share across concurrent extractions.
pub struct ScratchFetcher {
    dir: TempDir,
    seq: AtomicU64,
}

impl ScratchFetcher {
    pub fn new() -> ScanOutcome<Self> {
        let dir = TempDir::new().map_err(|e| {
            ScanError::internal(
                ErrorKind::StorageFailed,
                format!("Failed to create scratch directory: {e}"),
            )
        })?;

        Ok(Self {
            dir,
            seq: AtomicU64::new(0),
        })
    }

    /// Download `key` from `location` and persist it to a scratch file.
    pub async fn fetch(
        &self,
        location: &dyn LocationStore,
        key: &str,
    ) -> ScanOutcome<PathBuf> {
        let data = location.get(key).await.map_err(ScanError::from)?;

        let path = self.next_path();
        tokio::fs::write(&path, &data).await.map_err(|e| {
            ScanError::internal(
                ErrorKind::StorageFailed,
                format!("Failed to persist scratch file: {e}"),
            )
        })?;

        debug!(
            "Fetched object bucket={} key={} bytes={} scratch={}",
            location.name(),
            key,
            data.len(),
            path.display()
        );

        Ok(path)
    }

    /// Like [`fetch`](Self::fetch), but accepts either a bare key or a full
    /// object URI (`s3://bucket/key`) as metadata files reference each other
    /// by absolute location.
    pub async fn fetch_uri(
        &self,
        location: &dyn LocationStore,
        uri: &str,
    ) -> ScanOutcome<PathBuf> {
        let key = key_from_uri(uri);
        self.fetch(location, &key).await
    }

    fn next_path(&self) -> PathBuf {
        let id = self.seq.fetch_add(1, Ordering::Relaxed);
        self.dir.path().join(format!("{id:08}.scratch"))
    }
}

/// Reduce an object reference to a bucket-relative key.
///
/// Absolute URIs drop their scheme and bucket; everything else is taken as a
/// key after trimming a leading slash.
pub fn key_from_uri(reference: &str) -> String {
    if reference.contains("://") {
        if let Ok(url) = Url::parse(reference) {
            return url.path().trim_start_matches('/').to_string();
        }
    }
    reference.trim_start_matches('/').to_string()
}

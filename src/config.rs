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

//! Numeric knobs for the scan core.
//!
//! All values are plain configuration; nothing is reloaded at runtime.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Tuning knobs for classification and extraction.
///
/// The defaults match the behavior the rest of the crate is tested against;
/// override individual fields with the `with_*` builders.
///
/// ```
/// use lakescout::config::ScanConfig;
///
/// let config = ScanConfig::default()
///     .with_scan_parallelism(16)
///     .with_parquet_files_limit(24);
/// assert_eq!(config.max_classify_depth, 10);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Maximum BFS depth the classifier walks before falling back to Parquet.
    pub max_classify_depth: u32,

    /// Maximum number of `.parquet` files whose footers are read per scan.
    pub parquet_files_limit: usize,

    /// Number of metadata-bearing Delta commits collected per scan.
    pub delta_commit_limit: usize,

    /// Size of the initial Parquet tail probe: footer length + magic.
    pub footer_probe_bytes: u64,

    /// Concurrent locations scanned per lake.
    pub scan_parallelism: usize,

    /// Concurrent footer fetches within one Parquet extraction.
    pub file_parallelism: usize,

    /// Idle time after which a cached storage client is dropped.
    #[serde(with = "duration_secs")]
    pub client_idle_ttl: Duration,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            max_classify_depth: 10,
            parquet_files_limit: 12,
            delta_commit_limit: 3,
            footer_probe_bytes: 8,
            scan_parallelism: 8,
            file_parallelism: 4,
            client_idle_ttl: Duration::from_secs(15 * 60),
        }
    }
}

impl ScanConfig {
    pub fn with_max_classify_depth(mut self, depth: u32) -> Self {
        self.max_classify_depth = depth;
        self
    }

    pub fn with_parquet_files_limit(mut self, limit: usize) -> Self {
        self.parquet_files_limit = limit;
        self
    }

    pub fn with_delta_commit_limit(mut self, limit: usize) -> Self {
        self.delta_commit_limit = limit;
        self
    }

    pub fn with_scan_parallelism(mut self, parallelism: usize) -> Self {
        self.scan_parallelism = parallelism.max(1);
        self
    }

    pub fn with_file_parallelism(mut self, parallelism: usize) -> Self {
        self.file_parallelism = parallelism.max(1);
        self
    }

    pub fn with_client_idle_ttl(mut self, ttl: Duration) -> Self {
        self.client_idle_ttl = ttl;
        self
    }
}

mod duration_secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_secs(u64::deserialize(d)?))
    }
}

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

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Storage provider type.
///
/// Only S3-compatible object storage is implemented; the Azure and GCS
/// variants are accepted by the configuration layer but rejected by the
/// provider factory until an implementation lands.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StorageType {
    /// AWS S3 or any S3-compatible endpoint (MinIO, Ceph, ...)
    Aws,
    /// Azure Blob Storage (not yet implemented)
    Azure,
    /// Google Cloud Storage (not yet implemented)
    Gcs,
}

impl StorageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageType::Aws => "aws",
            StorageType::Azure => "azure",
            StorageType::Gcs => "gcs",
        }
    }
}

/// Generic configuration for storage providers.
///
/// Options are free-form key/value pairs passed to the `object_store`
/// builders, which keeps the configuration surface aligned with whatever the
/// backend supports.
///
/// # Examples
///
/// ```
/// use lakescout::storage::StorageConfig;
///
/// let config = StorageConfig::aws()
///     .with_option("region", "us-east-1")
///     .with_option("access_key_id", "AKIA...")
///     .with_option("secret_access_key", "...");
/// assert_eq!(config.get_option("region").map(String::as_str), Some("us-east-1"));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Storage provider type
    #[serde(rename = "type")]
    pub storage_type: StorageType,

    /// Provider-specific configuration options.
    ///
    /// Recognized AWS options: `region`, `access_key_id`,
    /// `secret_access_key`, `session_token`, `endpoint` (for S3-compatible
    /// services), `allow_http`, plus the connection knobs `timeout`,
    /// `connect_timeout`, `max_retries`, `retry_timeout`.
    #[serde(default)]
    pub options: HashMap<String, String>,
}

impl StorageConfig {
    /// An AWS S3 (or S3-compatible) configuration with default connection
    /// options.
    pub fn aws() -> Self {
        Self {
            storage_type: StorageType::Aws,
            options: Self::default_options(),
        }
    }

    /// An Azure configuration; currently only accepted, never constructed.
    pub fn azure() -> Self {
        Self {
            storage_type: StorageType::Azure,
            options: Self::default_options(),
        }
    }

    /// A GCS configuration; currently only accepted, never constructed.
    pub fn gcs() -> Self {
        Self {
            storage_type: StorageType::Gcs,
            options: Self::default_options(),
        }
    }

    /// Default timeout/retry settings applied to every provider.
    pub fn default_options() -> HashMap<String, String> {
        [
            ("timeout", "1200"),
            ("connect_timeout", "30"),
            ("max_retries", "10"),
            ("retry_timeout", "1200"),
        ]
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
    }

    /// Add a configuration option (chainable).
    pub fn with_option(
        mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }

    /// Add multiple configuration options (chainable).
    pub fn with_options(mut self, options: HashMap<String, String>) -> Self {
        self.options.extend(options);
        self
    }

    /// Get a configuration option.
    pub fn get_option(&self, key: &str) -> Option<&String> {
        self.options.get(key)
    }
}

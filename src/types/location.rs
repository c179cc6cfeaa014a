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

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::storage::StorageType;

/// The table format detected in a location.
///
/// These names surface in external routes; change with care.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableType {
    Iceberg,
    Delta,
    Hudi,
    Parquet,
    Unknown,
}

impl TableType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TableType::Iceberg => "iceberg",
            TableType::Delta => "delta",
            TableType::Hudi => "hudi",
            TableType::Parquet => "parquet",
            TableType::Unknown => "unknown",
        }
    }
}

/// Static and per-scan data of one location.
///
/// Created when the location is registered, mutated on every (re)scan.
#[derive(Debug, Clone, Serialize)]
pub struct LocationData {
    /// Bucket/container name.
    pub name: String,

    /// Which provider the location lives on.
    pub storage_type: StorageType,

    /// Provider region, when known.
    pub region: Option<String>,

    /// Location creation timestamp, when the provider reports one.
    pub created_at: Option<DateTime<Utc>>,

    /// Table format decided by the last classification.
    pub table_type: TableType,

    /// Newest object modification seen by the last scan; part of the
    /// staleness fingerprint.
    pub updated_at: Option<DateTime<Utc>>,

    /// Object count seen by the last scan; the other half of the staleness
    /// fingerprint.
    pub key_count: u64,
}

impl Default for LocationData {
    fn default() -> Self {
        LocationData::new(String::new(), StorageType::Aws)
    }
}

impl LocationData {
    pub fn new(name: impl Into<String>, storage_type: StorageType) -> Self {
        Self {
            name: name.into(),
            storage_type,
            region: None,
            created_at: None,
            table_type: TableType::Unknown,
            updated_at: None,
            key_count: 0,
        }
    }
}

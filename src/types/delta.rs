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

//! Delta Lake commit-log structures.
//!
//! Each line of a `_delta_log/*.json` file is one [`DeltaAction`] tagging
//! exactly one slot; a whole file merges into a [`DeltaCommit`] with
//! last-write-wins per singleton slot and accumulating add/remove lists.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// One NDJSON line of a commit file. Exactly one field is populated.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeltaAction {
    pub commit_info: Option<DeltaCommitInfo>,
    pub protocol: Option<DeltaProtocol>,
    #[serde(rename = "metaData")]
    pub metadata: Option<DeltaMetadata>,
    pub add: Option<DeltaAdd>,
    pub remove: Option<DeltaRemove>,
    pub txn: Option<DeltaTxn>,
}

/// The merged view of one commit file.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DeltaCommit {
    pub commit_info: Option<DeltaCommitInfo>,
    pub protocol: Option<DeltaProtocol>,
    pub metadata: Option<DeltaMetadata>,
    pub txn: Option<DeltaTxn>,
    pub add: Vec<DeltaAdd>,
    pub remove: Vec<DeltaRemove>,
}

impl DeltaCommit {
    /// Fold one action into the commit view.
    pub fn apply(&mut self, action: DeltaAction) {
        if let Some(ci) = action.commit_info {
            self.commit_info = Some(ci);
        }
        if let Some(p) = action.protocol {
            self.protocol = Some(p);
        }
        if let Some(m) = action.metadata {
            self.metadata = Some(m);
        }
        if let Some(t) = action.txn {
            self.txn = Some(t);
        }
        if let Some(a) = action.add {
            self.add.push(a);
        }
        if let Some(r) = action.remove {
            self.remove.push(r);
        }
    }

    /// Whether this commit carries table metadata with a schema.
    pub fn has_schema(&self) -> bool {
        self.metadata
            .as_ref()
            .map(|m| !m.schema_string.is_empty())
            .unwrap_or(false)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DeltaCommitInfo {
    pub timestamp: i64,
    pub user_id: Option<String>,
    pub user_name: Option<String>,
    pub operation: String,
    pub operation_parameters: Option<Value>,
    pub operation_metrics: Option<Value>,
    pub cluster_id: Option<String>,
    pub isolation_level: Option<String>,
    pub is_blind_append: Option<bool>,
    pub engine_info: Option<String>,
    pub txn_id: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DeltaProtocol {
    pub min_reader_version: i64,
    pub min_writer_version: i64,
    pub reader_features: Option<Vec<String>>,
    pub writer_features: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DeltaMetadata {
    pub id: String,
    pub name: Option<String>,
    pub description: Option<String>,
    pub format: DeltaFormat,
    /// The schema as the log carries it: a JSON document inside a string.
    pub schema_string: String,
    /// The decoded form of `schema_string`; not part of the wire format.
    #[serde(skip_deserializing)]
    pub schema: Option<DeltaSchema>,
    pub partition_columns: Vec<String>,
    pub configuration: HashMap<String, String>,
    pub created_time: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DeltaFormat {
    pub provider: String,
    pub options: Option<Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DeltaSchema {
    #[serde(rename = "type")]
    pub schema_type: String,
    pub fields: Vec<DeltaSchemaField>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DeltaSchemaField {
    pub name: String,
    /// Primitive types are strings, nested types objects.
    #[serde(rename = "type")]
    pub field_type: Value,
    pub nullable: bool,
    pub metadata: Option<Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DeltaAdd {
    pub path: String,
    pub partition_values: Option<Value>,
    pub size: i64,
    pub modification_time: i64,
    pub data_change: bool,
    pub stats: Option<String>,
    pub tags: Option<Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DeltaRemove {
    pub path: String,
    pub deletion_timestamp: Option<i64>,
    pub data_change: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DeltaTxn {
    pub app_id: String,
    pub version: i64,
}

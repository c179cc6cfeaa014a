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

//! Apache Iceberg structures.
//!
//! [`IcebergMetadata`] mirrors the `*.metadata.json` document;
//! [`SnapshotRecord`] and [`ManifestEntry`] mirror one Avro record each of a
//! `snap-*.avro` manifest list and a manifest file respectively.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Top-level Iceberg table metadata (one `*.metadata.json` file).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct IcebergMetadata {
    pub format_version: i64,
    pub table_uuid: String,
    pub location: String,
    pub last_sequence_number: i64,
    pub last_updated_ms: i64,
    pub last_column_id: i64,
    pub current_schema_id: i64,
    pub schemas: Vec<IcebergSchema>,
    pub default_spec_id: i64,
    pub partition_specs: Vec<IcebergPartitionSpec>,
    pub last_partition_id: i64,
    pub default_sort_order_id: i64,
    pub sort_orders: Vec<IcebergSortOrder>,
    pub properties: HashMap<String, String>,
    pub current_snapshot_id: i64,
    pub refs: HashMap<String, IcebergSnapshotRef>,
    pub snapshots: Vec<IcebergSnapshot>,
    pub snapshot_log: Vec<IcebergSnapshotLogEntry>,
    pub metadata_log: Vec<IcebergMetadataLogEntry>,
    pub statistics: Vec<Value>,
    pub partition_statistics: Vec<Value>,
}

impl IcebergMetadata {
    /// The schema `current-schema-id` points at.
    ///
    /// Returns `None` when the id does not resolve; a table in that state is
    /// malformed and consumers must treat it as such rather than panic.
    pub fn current_schema(&self) -> Option<&IcebergSchema> {
        self.schemas
            .iter()
            .find(|s| s.schema_id == self.current_schema_id)
    }

    /// The snapshot `current-snapshot-id` points at, `None` if unresolved.
    pub fn current_snapshot(&self) -> Option<&IcebergSnapshot> {
        self.snapshots
            .iter()
            .find(|s| s.snapshot_id == self.current_snapshot_id)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct IcebergSchema {
    #[serde(rename = "type")]
    pub schema_type: String,
    pub schema_id: i64,
    pub fields: Vec<IcebergSchemaField>,
}

/// One field of an Iceberg schema. Nested types arrive as JSON objects, so
/// the type stays a raw value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IcebergSchemaField {
    pub id: i64,
    pub name: String,
    pub required: bool,
    #[serde(rename = "type")]
    pub field_type: Value,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct IcebergPartitionSpec {
    pub spec_id: i64,
    pub fields: Vec<IcebergPartitionField>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct IcebergPartitionField {
    pub name: String,
    pub transform: String,
    pub source_id: i64,
    pub field_id: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct IcebergSortOrder {
    pub order_id: i64,
    pub fields: Vec<Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct IcebergSnapshotRef {
    pub snapshot_id: i64,
    #[serde(rename = "type")]
    pub ref_type: String,
}

/// One snapshot as recorded in the metadata document (distinct from the
/// Avro snapshot-list records, which carry per-manifest counts).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct IcebergSnapshot {
    pub sequence_number: i64,
    pub snapshot_id: i64,
    pub parent_snapshot_id: Option<i64>,
    pub timestamp_ms: i64,
    pub summary: HashMap<String, String>,
    pub manifest_list: String,
    pub schema_id: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct IcebergSnapshotLogEntry {
    pub timestamp_ms: i64,
    pub snapshot_id: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct IcebergMetadataLogEntry {
    pub timestamp_ms: i64,
    pub metadata_file: String,
}

/// One record of a `snap-*.avro` manifest list.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SnapshotRecord {
    pub manifest_path: String,
    pub manifest_length: i64,
    pub partition_spec_id: i32,
    /// 0 = data manifest, 1 = delete manifest.
    pub content: i32,
    pub sequence_number: i64,
    pub min_sequence_number: i64,
    pub added_snapshot_id: i64,
    pub added_data_files_count: i32,
    pub existing_data_files_count: i32,
    pub deleted_data_files_count: i32,
    pub added_rows_count: i64,
    pub existing_rows_count: i64,
    pub deleted_rows_count: i64,
}

/// One manifest file, decoded.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ManifestFile {
    /// Path this manifest was fetched from, as referenced by the snapshot.
    pub uri: String,
    pub entries: Vec<ManifestEntry>,
}

/// One record of a manifest file.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ManifestEntry {
    /// 0 = existing, 1 = added, 2 = deleted.
    pub status: i32,
    pub snapshot_id: Option<i64>,
    pub sequence_number: Option<i64>,
    pub file_sequence_number: Option<i64>,
    pub data_file: DataFileInfo,
}

/// The data file a manifest entry describes, with per-column statistics maps
/// keyed by field id.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DataFileInfo {
    pub content: i32,
    pub file_path: String,
    pub file_format: String,
    pub record_count: i64,
    pub file_size_in_bytes: i64,
    pub column_sizes: HashMap<i32, i64>,
    pub value_counts: HashMap<i32, i64>,
    pub null_value_counts: HashMap<i32, i64>,
    pub nan_value_counts: HashMap<i32, i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    const METADATA_JSON: &str = r#"{
        "format-version": 2,
        "table-uuid": "9c12d441-03fe-4693-9a96-a0705ddf69c1",
        "location": "s3://warehouse/db/table",
        "last-sequence-number": 34,
        "last-updated-ms": 1602638573590,
        "last-column-id": 3,
        "current-schema-id": 1,
        "schemas": [
            {"type": "struct", "schema-id": 0, "fields": []},
            {"type": "struct", "schema-id": 1, "fields": [
                {"id": 1, "name": "id", "required": true, "type": "long"},
                {"id": 2, "name": "payload", "required": false,
                 "type": {"type": "struct", "fields": []}}
            ]}
        ],
        "default-spec-id": 0,
        "partition-specs": [{"spec-id": 0, "fields": [
            {"name": "id_bucket", "transform": "bucket[16]", "source-id": 1, "field-id": 1000}
        ]}],
        "properties": {"write.parquet.compression-codec": "zstd"},
        "current-snapshot-id": 3055729675574597004,
        "refs": {"main": {"snapshot-id": 3055729675574597004, "type": "branch"}},
        "snapshots": [{
            "sequence-number": 1,
            "snapshot-id": 3055729675574597004,
            "timestamp-ms": 1555100955770,
            "summary": {"operation": "append", "added-data-files": "4"},
            "manifest-list": "s3://warehouse/db/table/metadata/snap-305.avro",
            "schema-id": 1
        }],
        "snapshot-log": [{"timestamp-ms": 1555100955770, "snapshot-id": 3055729675574597004}],
        "metadata-log": [{"timestamp-ms": 1555100955770, "metadata-file": "v1.metadata.json"}]
    }"#;

    #[test]
    fn test_metadata_deserialization() {
        let metadata: IcebergMetadata = serde_json::from_str(METADATA_JSON).unwrap();
        assert_eq!(metadata.format_version, 2);
        assert_eq!(metadata.table_uuid, "9c12d441-03fe-4693-9a96-a0705ddf69c1");
        assert_eq!(metadata.current_schema_id, 1);
        assert_eq!(metadata.schemas.len(), 2);
        assert_eq!(metadata.partition_specs[0].fields[0].transform, "bucket[16]");
        assert_eq!(
            metadata.properties.get("write.parquet.compression-codec"),
            Some(&"zstd".to_string())
        );
        assert_eq!(metadata.refs.get("main").unwrap().ref_type, "branch");
    }

    #[test]
    fn test_current_schema_and_snapshot_resolution() {
        let metadata: IcebergMetadata = serde_json::from_str(METADATA_JSON).unwrap();

        let schema = metadata.current_schema().unwrap();
        assert_eq!(schema.schema_id, 1);
        assert_eq!(schema.fields[0].name, "id");

        let snapshot = metadata.current_snapshot().unwrap();
        assert_eq!(snapshot.snapshot_id, 3055729675574597004);
        assert!(snapshot.manifest_list.ends_with("snap-305.avro"));
        assert_eq!(snapshot.summary.get("operation"), Some(&"append".to_string()));
    }

    #[test]
    fn test_unresolvable_ids_yield_none() {
        let mut metadata: IcebergMetadata = serde_json::from_str(METADATA_JSON).unwrap();
        metadata.current_schema_id = 99;
        metadata.current_snapshot_id = -1;

        assert!(metadata.current_schema().is_none());
        assert!(metadata.current_snapshot().is_none());
    }

    #[test]
    fn test_missing_fields_take_defaults() {
        let metadata: IcebergMetadata =
            serde_json::from_str(r#"{"format-version": 1, "table-uuid": "u"}"#).unwrap();
        assert_eq!(metadata.format_version, 1);
        assert!(metadata.snapshots.is_empty());
        assert!(metadata.current_snapshot().is_none());
    }
}

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

//! Iceberg file decoders.
//!
//! `*.metadata.json` documents decode through serde; snapshot lists
//! (`snap-*.avro`) and manifests are Avro object container files read
//! record-by-record. Avro values are matched structurally rather than
//! through derive, because manifest schemas evolve across writers and the
//! optional fields arrive wrapped in unions.

use apache_avro::types::Value as AvroValue;
use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::error::{ErrorKind, ScanError, ScanOutcome};
use crate::types::iceberg::{DataFileInfo, IcebergMetadata, ManifestEntry, SnapshotRecord};

/// Read and decode one `*.metadata.json` file.
pub fn read_metadata(path: &Path) -> ScanOutcome<IcebergMetadata> {
    let data = std::fs::read(path).map_err(|e| {
        ScanError::internal(
            ErrorKind::StorageFailed,
            format!("Failed to read iceberg metadata file: {e}"),
        )
    })?;

    if data.is_empty() {
        return Err(ScanError::internal(
            ErrorKind::StorageFailed,
            format!("Empty iceberg metadata file: {}", path.display()),
        ));
    }

    serde_json::from_slice(&data).map_err(|e| {
        ScanError::internal(
            ErrorKind::Internal,
            format!("Failed to decode iceberg metadata JSON: {e}"),
        )
    })
}

/// Read and decode a `snap-*.avro` manifest list.
pub fn read_snapshot_list(path: &Path) -> ScanOutcome<Vec<SnapshotRecord>> {
    let records = read_avro_records(path)?;
    records.iter().map(parse_snapshot_record).collect()
}

/// Read and decode one manifest file into its per-data-file entries.
pub fn read_manifest(path: &Path) -> ScanOutcome<Vec<ManifestEntry>> {
    let records = read_avro_records(path)?;
    records.iter().map(parse_manifest_entry).collect()
}

fn read_avro_records(path: &Path) -> ScanOutcome<Vec<AvroValue>> {
    let file = File::open(path).map_err(|e| {
        ScanError::internal(
            ErrorKind::StorageFailed,
            format!("Failed to open avro file: {e}"),
        )
    })?;

    let reader = apache_avro::Reader::new(BufReader::new(file)).map_err(|e| {
        ScanError::internal(
            ErrorKind::DependencyFailed,
            format!("Failed to open avro object container file: {e}"),
        )
    })?;

    reader
        .map(|value| {
            value.map_err(|e| {
                ScanError::internal(
                    ErrorKind::DependencyFailed,
                    format!("Failed to read avro record: {e}"),
                )
            })
        })
        .collect()
}

fn parse_snapshot_record(value: &AvroValue) -> ScanOutcome<SnapshotRecord> {
    let fields = record_fields(value)?;

    let manifest_path = field(fields, "manifest_path")
        .and_then(as_str)
        .ok_or_else(|| {
            ScanError::internal(
                ErrorKind::DependencyFailed,
                "Snapshot record is missing 'manifest_path'",
            )
        })?
        .to_string();

    Ok(SnapshotRecord {
        manifest_path,
        manifest_length: long_or_default(fields, "manifest_length"),
        partition_spec_id: int_or_default(fields, "partition_spec_id"),
        content: int_or_default(fields, "content"),
        sequence_number: long_or_default(fields, "sequence_number"),
        min_sequence_number: long_or_default(fields, "min_sequence_number"),
        added_snapshot_id: long_or_default(fields, "added_snapshot_id"),
        added_data_files_count: int_or_default(fields, "added_data_files_count"),
        existing_data_files_count: int_or_default(fields, "existing_data_files_count"),
        deleted_data_files_count: int_or_default(fields, "deleted_data_files_count"),
        added_rows_count: long_or_default(fields, "added_rows_count"),
        existing_rows_count: long_or_default(fields, "existing_rows_count"),
        deleted_rows_count: long_or_default(fields, "deleted_rows_count"),
    })
}

fn parse_manifest_entry(value: &AvroValue) -> ScanOutcome<ManifestEntry> {
    let fields = record_fields(value)?;

    let data_file = field(fields, "data_file")
        .ok_or_else(|| {
            ScanError::internal(
                ErrorKind::DependencyFailed,
                "Manifest entry is missing 'data_file'",
            )
        })
        .and_then(parse_data_file)?;

    Ok(ManifestEntry {
        status: int_or_default(fields, "status"),
        snapshot_id: field(fields, "snapshot_id").and_then(as_long),
        sequence_number: field(fields, "sequence_number").and_then(as_long),
        file_sequence_number: field(fields, "file_sequence_number").and_then(as_long),
        data_file,
    })
}

fn parse_data_file(value: &AvroValue) -> ScanOutcome<DataFileInfo> {
    let fields = record_fields(value)?;

    let file_path = field(fields, "file_path")
        .and_then(as_str)
        .ok_or_else(|| {
            ScanError::internal(
                ErrorKind::DependencyFailed,
                "Manifest data file is missing 'file_path'",
            )
        })?
        .to_string();

    Ok(DataFileInfo {
        content: int_or_default(fields, "content"),
        file_path,
        file_format: field(fields, "file_format")
            .and_then(as_str)
            .unwrap_or_default()
            .to_string(),
        record_count: long_or_default(fields, "record_count"),
        file_size_in_bytes: long_or_default(fields, "file_size_in_bytes"),
        column_sizes: field_id_map(field(fields, "column_sizes")),
        value_counts: field_id_map(field(fields, "value_counts")),
        null_value_counts: field_id_map(field(fields, "null_value_counts")),
        nan_value_counts: field_id_map(field(fields, "nan_value_counts")),
    })
}

fn record_fields(value: &AvroValue) -> ScanOutcome<&[(String, AvroValue)]> {
    match unwrap_union(value) {
        AvroValue::Record(fields) => Ok(fields),
        other => Err(ScanError::internal(
            ErrorKind::DependencyFailed,
            format!("Expected avro record, got {other:?}"),
        )),
    }
}

fn field<'a>(fields: &'a [(String, AvroValue)], name: &str) -> Option<&'a AvroValue> {
    fields.iter().find(|(n, _)| n == name).map(|(_, v)| v)
}

fn unwrap_union(value: &AvroValue) -> &AvroValue {
    match value {
        AvroValue::Union(_, inner) => inner,
        other => other,
    }
}

fn as_long(value: &AvroValue) -> Option<i64> {
    match unwrap_union(value) {
        AvroValue::Long(l) => Some(*l),
        AvroValue::Int(i) => Some(*i as i64),
        _ => None,
    }
}

fn as_int(value: &AvroValue) -> Option<i32> {
    match unwrap_union(value) {
        AvroValue::Int(i) => Some(*i),
        AvroValue::Long(l) => i32::try_from(*l).ok(),
        _ => None,
    }
}

fn as_str(value: &AvroValue) -> Option<&str> {
    match unwrap_union(value) {
        AvroValue::String(s) => Some(s.as_str()),
        _ => None,
    }
}

fn long_or_default(fields: &[(String, AvroValue)], name: &str) -> i64 {
    field(fields, name).and_then(as_long).unwrap_or_default()
}

fn int_or_default(fields: &[(String, AvroValue)], name: &str) -> i32 {
    field(fields, name).and_then(as_int).unwrap_or_default()
}

/// Decode one of the per-column statistics maps.
///
/// Writers encode them either as an Avro map keyed by the stringified field
/// id or as an array of `{key, value}` records; both arrive here, possibly
/// wrapped in a nullable union.
fn field_id_map(value: Option<&AvroValue>) -> HashMap<i32, i64> {
    let mut out = HashMap::new();
    let Some(value) = value else {
        return out;
    };

    match unwrap_union(value) {
        AvroValue::Array(items) => {
            for item in items {
                if let AvroValue::Record(kv) = unwrap_union(item) {
                    let key = field(kv, "key").and_then(as_int);
                    let val = field(kv, "value").and_then(as_long);
                    if let (Some(k), Some(v)) = (key, val) {
                        out.insert(k, v);
                    }
                }
            }
        }
        AvroValue::Map(entries) => {
            for (k, v) in entries {
                if let (Ok(k), Some(v)) = (k.parse::<i32>(), as_long(v)) {
                    out.insert(k, v);
                }
            }
        }
        _ => {}
    }

    out
}

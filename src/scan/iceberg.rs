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

//! Iceberg extraction pipeline.
//!
//! Three steps with a hard dependency chain (metadata, then snapshot list,
//! then manifests) executed strictly in that order: the snapshot step needs the
//! current snapshot id out of the decoded metadata, and the manifest step
//! needs the manifest paths out of the snapshot records. Each step's
//! "nothing found" condition is a user-facing, non-fatal error that aborts
//! only that step, so callers can receive a partially populated section.

use tracing::info;

use super::fetcher::ScratchFetcher;
use crate::error::{ErrorKind, ScanError, ScanOutcome};
use crate::reader::iceberg::{read_manifest, read_metadata, read_snapshot_list};
use crate::storage::LocationStore;
use crate::types::iceberg::ManifestFile;
use crate::types::result::IcebergSection;

/// What one Iceberg extraction produced.
#[derive(Debug, Default)]
pub struct IcebergExtraction {
    pub section: IcebergSection,

    /// Objects listed under the locator; the staleness fingerprint.
    pub key_count: u64,

    /// True when the fingerprint matched the previous scan and extraction
    /// was skipped entirely.
    pub cache_valid: bool,

    /// Non-fatal problems, in step order.
    pub errors: Vec<ScanError>,
}

/// Extracts Iceberg metadata from one classified location.
pub struct IcebergPipeline<'a> {
    location: &'a dyn LocationStore,
    fetcher: &'a ScratchFetcher,
}

impl<'a> IcebergPipeline<'a> {
    pub fn new(location: &'a dyn LocationStore, fetcher: &'a ScratchFetcher) -> Self {
        Self { location, fetcher }
    }

    /// Run the pipeline against the metadata folder at `locator`.
    ///
    /// `prior_key_count` is the object count recorded by the previous
    /// successful scan; when the fresh listing reports the same count the
    /// bucket is taken as unchanged and no downloads happen. The count
    /// check is a cheap heuristic: identical counts with different content
    /// are an accepted false-negative.
    ///
    /// # Errors
    ///
    /// Only the initial listing failure is fatal; everything downstream is
    /// reported through the returned `errors` list.
    pub async fn extract(
        &self,
        locator: &str,
        prior_key_count: Option<u64>,
    ) -> ScanOutcome<IcebergExtraction> {
        let mut out = IcebergExtraction::default();
        out.section.present = true;
        out.section.uri = locator.to_string();

        let objects = self
            .location
            .list_all(Some(locator))
            .await
            .map_err(ScanError::from)?;
        out.key_count = objects.len() as u64;

        if prior_key_count == Some(out.key_count) {
            info!(
                "Iceberg fingerprint unchanged bucket={} locator={} keys={}",
                self.location.name(),
                locator,
                out.key_count
            );
            out.cache_valid = true;
            return Ok(out);
        }

        for obj in &objects {
            let key = &obj.key;
            if key.ends_with(".metadata.json") {
                out.section.metadata_paths.push(key.clone());
            } else if key.ends_with(".avro") {
                let file_name = key.rsplit('/').next().unwrap_or(key);
                if file_name.starts_with("snap-") {
                    out.section.snapshot_paths.push(key.clone());
                } else {
                    out.section.manifest_paths.push(key.clone());
                }
            }
        }

        if let Err(e) = self.metadata_step(&mut out.section).await {
            out.errors.push(e);
        }
        if let Err(e) = self.snapshot_step(&mut out.section).await {
            out.errors.push(e);
        }
        if let Err(e) = self.manifest_step(&mut out.section).await {
            out.errors.push(e);
        }

        info!(
            "Iceberg extraction bucket={} metadata_files={} snapshots={} manifests={} errors={}",
            self.location.name(),
            out.section.metadata_paths.len(),
            out.section.snapshot.len(),
            out.section.manifests.len(),
            out.errors.len()
        );

        Ok(out)
    }

    /// Select and decode the newest `*.metadata.json`.
    ///
    /// Listings are lexicographically ordered and Iceberg writers zero-pad
    /// the sequence number, so the lexicographic last is the newest.
    async fn metadata_step(&self, section: &mut IcebergSection) -> ScanOutcome<()> {
        section.metadata_paths.sort();

        let Some(latest) = section.metadata_paths.last() else {
            return Err(ScanError::user(
                ErrorKind::Validation,
                "No '.metadata.json' metadata files were found.",
            ));
        };

        let scratch = self.fetcher.fetch(self.location, latest).await?;
        section.metadata = Some(read_metadata(&scratch)?);

        Ok(())
    }

    /// Fetch and decode the current snapshot's manifest list.
    async fn snapshot_step(&self, section: &mut IcebergSection) -> ScanOutcome<()> {
        let Some(metadata) = section.metadata.as_ref() else {
            // Metadata step already reported; nothing to resolve against.
            return Ok(());
        };

        if metadata.snapshots.is_empty() {
            return Err(ScanError::user(
                ErrorKind::Validation,
                "No 'snap-*.avro' snapshot files were found.",
            ));
        }

        let Some(current) = metadata.current_snapshot() else {
            return Err(ScanError::user(
                ErrorKind::Validation,
                "Table metadata does not resolve its current snapshot id.",
            ));
        };

        let scratch = self
            .fetcher
            .fetch_uri(self.location, &current.manifest_list)
            .await?;
        section.snapshot = read_snapshot_list(&scratch)?;

        Ok(())
    }

    /// Fetch and decode every manifest the current snapshot references.
    async fn manifest_step(&self, section: &mut IcebergSection) -> ScanOutcome<()> {
        if section.snapshot.is_empty() {
            return Err(ScanError::user(
                ErrorKind::Validation,
                "No '.avro' manifest files were found.",
            ));
        }

        let mut manifests = Vec::with_capacity(section.snapshot.len());
        for record in &section.snapshot {
            let scratch = self
                .fetcher
                .fetch_uri(self.location, &record.manifest_path)
                .await?;
            manifests.push(ManifestFile {
                uri: record.manifest_path.clone(),
                entries: read_manifest(&scratch)?,
            });
        }

        section.manifests = manifests;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryLake;
    use apache_avro::types::{Record, Value as AvroValue};
    use apache_avro::{Schema, Writer};

    const SNAPSHOT_LIST_SCHEMA: &str = r#"{
      "type": "record",
      "name": "manifest_file",
      "fields": [
        {"name": "manifest_path", "type": "string"},
        {"name": "manifest_length", "type": "long"},
        {"name": "partition_spec_id", "type": "int"},
        {"name": "added_snapshot_id", "type": "long"},
        {"name": "added_data_files_count", "type": "int"},
        {"name": "existing_data_files_count", "type": "int"},
        {"name": "deleted_data_files_count", "type": "int"},
        {"name": "added_rows_count", "type": "long"},
        {"name": "existing_rows_count", "type": "long"},
        {"name": "deleted_rows_count", "type": "long"}
      ]
    }"#;

    const MANIFEST_SCHEMA: &str = r#"{
      "type": "record",
      "name": "manifest_entry",
      "fields": [
        {"name": "status", "type": "int"},
        {"name": "data_file", "type": {
          "type": "record",
          "name": "r2",
          "fields": [
            {"name": "file_path", "type": "string"},
            {"name": "file_format", "type": "string"},
            {"name": "record_count", "type": "long"},
            {"name": "file_size_in_bytes", "type": "long"}
          ]
        }}
      ]
    }"#;

    fn snapshot_list_bytes(manifest_path: &str) -> Vec<u8> {
        let schema = Schema::parse_str(SNAPSHOT_LIST_SCHEMA).unwrap();
        let mut writer = Writer::new(&schema, Vec::new());
        let mut record = Record::new(writer.schema()).unwrap();
        record.put("manifest_path", manifest_path);
        record.put("manifest_length", 100i64);
        record.put("partition_spec_id", 0i32);
        record.put("added_snapshot_id", 7i64);
        record.put("added_data_files_count", 1i32);
        record.put("existing_data_files_count", 0i32);
        record.put("deleted_data_files_count", 0i32);
        record.put("added_rows_count", 10i64);
        record.put("existing_rows_count", 0i64);
        record.put("deleted_rows_count", 0i64);
        writer.append(record).unwrap();
        writer.into_inner().unwrap()
    }

    fn manifest_bytes(file_path: &str) -> Vec<u8> {
        let schema = Schema::parse_str(MANIFEST_SCHEMA).unwrap();
        let mut writer = Writer::new(&schema, Vec::new());
        let entry = AvroValue::Record(vec![
            ("status".to_string(), AvroValue::Int(1)),
            (
                "data_file".to_string(),
                AvroValue::Record(vec![
                    (
                        "file_path".to_string(),
                        AvroValue::String(file_path.to_string()),
                    ),
                    (
                        "file_format".to_string(),
                        AvroValue::String("PARQUET".to_string()),
                    ),
                    ("record_count".to_string(), AvroValue::Long(10)),
                    ("file_size_in_bytes".to_string(), AvroValue::Long(2048)),
                ]),
            ),
        ]);
        writer.append(entry).unwrap();
        writer.into_inner().unwrap()
    }

    fn metadata_json(snapshot_id: i64, manifest_list: &str) -> String {
        format!(
            r#"{{
                "format-version": 2,
                "table-uuid": "0b2a3f7e",
                "location": "s3://b/orders",
                "current-schema-id": 0,
                "schemas": [{{"type": "struct", "schema-id": 0, "fields": []}}],
                "current-snapshot-id": {snapshot_id},
                "snapshots": [{{
                    "snapshot-id": {snapshot_id},
                    "timestamp-ms": 1,
                    "manifest-list": "{manifest_list}",
                    "schema-id": 0
                }}]
            }}"#
        )
    }

    fn populated_lake() -> MemoryLake {
        let lake = MemoryLake::new();

        lake.put_object(
            "b",
            "orders/metadata/00000-aaa.metadata.json",
            metadata_json(1, "s3://b/orders/metadata/snap-old.avro"),
        );
        lake.put_object(
            "b",
            "orders/metadata/00001-bbb.metadata.json",
            metadata_json(7, "s3://b/orders/metadata/snap-7.avro"),
        );
        lake.put_object(
            "b",
            "orders/metadata/snap-7.avro",
            snapshot_list_bytes("s3://b/orders/metadata/m0.avro"),
        );
        lake.put_object(
            "b",
            "orders/metadata/m0.avro",
            manifest_bytes("orders/data/part-0.parquet"),
        );
        lake.put_object("b", "orders/data/part-0.parquet", "data");

        lake
    }

    #[tokio::test]
    async fn test_full_pipeline() {
        let lake = populated_lake();
        let bucket = lake.bucket("b");
        let fetcher = ScratchFetcher::new().unwrap();
        let pipeline = IcebergPipeline::new(bucket.as_ref(), &fetcher);

        let out = pipeline.extract("orders/metadata/", None).await.unwrap();

        assert!(out.section.present);
        assert!(!out.cache_valid);
        assert!(out.errors.is_empty(), "unexpected errors: {:?}", out.errors);

        // Categorization
        assert_eq!(out.section.metadata_paths.len(), 2);
        assert_eq!(out.section.snapshot_paths, vec!["orders/metadata/snap-7.avro"]);
        assert_eq!(out.section.manifest_paths, vec!["orders/metadata/m0.avro"]);

        // Newest metadata file selected and decoded
        let metadata = out.section.metadata.as_ref().unwrap();
        assert_eq!(metadata.current_snapshot_id, 7);

        // Snapshot records and manifests follow the dependency chain
        assert_eq!(out.section.snapshot.len(), 1);
        assert_eq!(
            out.section.snapshot[0].manifest_path,
            "s3://b/orders/metadata/m0.avro"
        );
        assert_eq!(out.section.manifests.len(), 1);
        assert_eq!(
            out.section.manifests[0].entries[0].data_file.file_path,
            "orders/data/part-0.parquet"
        );
    }

    #[tokio::test]
    async fn test_lexicographic_last_metadata_selection() {
        // The classic trap: "v10" sorts BEFORE "v2", so v2 must win.
        let lake = MemoryLake::new();
        lake.put_object("b", "t/metadata/v1.metadata.json", metadata_json(1, "x"));
        lake.put_object("b", "t/metadata/v10.metadata.json", metadata_json(10, "x"));
        lake.put_object("b", "t/metadata/v2.metadata.json", metadata_json(2, "x"));

        let bucket = lake.bucket("b");
        let fetcher = ScratchFetcher::new().unwrap();
        let pipeline = IcebergPipeline::new(bucket.as_ref(), &fetcher);

        let out = pipeline.extract("t/metadata/", None).await.unwrap();
        assert_eq!(
            out.section.metadata_paths,
            vec![
                "t/metadata/v1.metadata.json",
                "t/metadata/v10.metadata.json",
                "t/metadata/v2.metadata.json"
            ]
        );
        // current-snapshot-id 2 proves v2.metadata.json was the one decoded.
        assert_eq!(out.section.metadata.unwrap().current_snapshot_id, 2);
    }

    #[tokio::test]
    async fn test_empty_locator_reports_user_facing_error() {
        let lake = MemoryLake::new();
        lake.bucket("b");

        let bucket = lake.bucket("b");
        let fetcher = ScratchFetcher::new().unwrap();
        let pipeline = IcebergPipeline::new(bucket.as_ref(), &fetcher);

        let out = pipeline.extract("t/metadata/", None).await.unwrap();
        assert!(out.section.metadata.is_none());
        // metadata step failed; snapshot step silently skipped (no metadata
        // to resolve against); manifest step reported its own absence.
        assert_eq!(out.errors.len(), 2);
        assert!(out.errors.iter().all(|e| e.is_user_facing()));
        assert!(out.errors[0].message.contains(".metadata.json"));
    }

    #[tokio::test]
    async fn test_unresolvable_snapshot_id_is_reported_not_fatal() {
        let lake = MemoryLake::new();
        lake.put_object(
            "b",
            "t/metadata/00000-a.metadata.json",
            // current-snapshot-id points nowhere
            r#"{"format-version":2,"table-uuid":"u","current-snapshot-id":99,
                "snapshots":[{"snapshot-id":1,"manifest-list":"t/metadata/snap-1.avro"}]}"#,
        );

        let bucket = lake.bucket("b");
        let fetcher = ScratchFetcher::new().unwrap();
        let pipeline = IcebergPipeline::new(bucket.as_ref(), &fetcher);

        let out = pipeline.extract("t/metadata/", None).await.unwrap();
        assert!(out.section.metadata.is_some());
        assert!(out.section.snapshot.is_empty());
        assert!(out
            .errors
            .iter()
            .any(|e| e.message.contains("current snapshot id")));
    }

    #[tokio::test]
    async fn test_key_count_short_circuit() {
        let lake = populated_lake();
        let bucket = lake.bucket("b");
        let fetcher = ScratchFetcher::new().unwrap();
        let pipeline = IcebergPipeline::new(bucket.as_ref(), &fetcher);

        let first = pipeline.extract("orders/metadata/", None).await.unwrap();
        assert!(!first.cache_valid);
        // 4 objects live under the locator prefix.
        assert_eq!(first.key_count, 4);

        let second = pipeline
            .extract("orders/metadata/", Some(first.key_count))
            .await
            .unwrap();
        assert!(second.cache_valid);
        assert!(second.section.metadata.is_none());

        let third = pipeline
            .extract("orders/metadata/", Some(first.key_count + 1))
            .await
            .unwrap();
        assert!(!third.cache_valid);
        assert!(third.section.metadata.is_some());
    }

    #[tokio::test]
    async fn test_listing_failure_is_fatal() {
        let lake = populated_lake();
        lake.fail_listing("b");

        let bucket = lake.bucket("b");
        let fetcher = ScratchFetcher::new().unwrap();
        let pipeline = IcebergPipeline::new(bucket.as_ref(), &fetcher);

        let err = pipeline.extract("orders/metadata/", None).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::StorageFailed);
    }
}

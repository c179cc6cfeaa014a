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

//! Parquet extraction pipeline: the flat-files interpretation of a bucket.
//!
//! Listing covers the whole bucket (no prefix scoping). Each selected file
//! costs exactly two ranged requests: an 8-byte tail probe for the footer
//! length, then a fetch of `footer_len + 8` bytes from the end. The file
//! body itself, however large, is never downloaded. Per-file failures are
//! logged and swallowed; a batch with unreadable members still returns the
//! readable footers.

use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use tracing::{info, warn};

use crate::config::ScanConfig;
use crate::error::{ErrorKind, ScanError, ScanOutcome};
use crate::reader::parquet::{decode_footer, probe_footer_tail, FOOTER_TAIL_LEN};
use crate::storage::LocationStore;
use crate::types::parquet::ParquetFooter;
use crate::types::result::ParquetSection;

const PARQUET_FILE_EXT: &str = ".parquet";

/// What one Parquet extraction produced.
#[derive(Debug, Default)]
pub struct ParquetExtraction {
    pub section: ParquetSection,

    /// Newest object modification observed across the whole listing; the
    /// staleness fingerprint.
    pub max_last_modified: Option<DateTime<Utc>>,

    /// Objects seen in the listing.
    pub key_count: u64,

    /// True when the fingerprint said nothing changed and no footers were
    /// fetched.
    pub cache_valid: bool,

    pub errors: Vec<ScanError>,
}

/// Extracts footers from up to `parquet_files_limit` files per scan.
pub struct ParquetPipeline<'a> {
    location: &'a dyn LocationStore,
    config: &'a ScanConfig,
}

impl<'a> ParquetPipeline<'a> {
    pub fn new(location: &'a dyn LocationStore, config: &'a ScanConfig) -> Self {
        Self { location, config }
    }

    /// Run the pipeline over the whole bucket.
    ///
    /// `prior_updated_at` is the newest modification timestamp recorded by
    /// the previous successful scan. When the fresh listing shows nothing
    /// newer, extraction is skipped and `cache_valid` is set.
    pub async fn extract(
        &self,
        prior_updated_at: Option<DateTime<Utc>>,
    ) -> ScanOutcome<ParquetExtraction> {
        let mut out = ParquetExtraction::default();
        out.section.present = true;

        let objects = self
            .location
            .list_all(None)
            .await
            .map_err(ScanError::from)?;
        out.key_count = objects.len() as u64;

        let mut remaining = self.config.parquet_files_limit;
        for obj in &objects {
            if let Some(modified) = obj.last_modified {
                if out.max_last_modified.map_or(true, |max| modified > max) {
                    out.max_last_modified = Some(modified);
                }
            }

            if remaining > 0 && !obj.key.ends_with('/') && obj.key.ends_with(PARQUET_FILE_EXT) {
                out.section.file_paths.push(obj.key.clone());
                remaining -= 1;
            }
        }

        if let (Some(prior), Some(fresh)) = (prior_updated_at, out.max_last_modified) {
            if fresh <= prior {
                info!(
                    "Parquet fingerprint unchanged bucket={} last_modified={}",
                    self.location.name(),
                    fresh
                );
                out.cache_valid = true;
                return Ok(out);
            }
        }

        let footers: Vec<Option<ParquetFooter>> = stream::iter(&out.section.file_paths)
            .map(|path| async move {
                match self.read_footer(path).await {
                    Ok(footer) => Some(footer),
                    Err(e) => {
                        // Per-file problems never abort the batch.
                        warn!(
                            "Skipping unreadable parquet file bucket={} key={} error={}",
                            self.location.name(),
                            path,
                            e
                        );
                        None
                    }
                }
            })
            .buffer_unordered(self.config.file_parallelism.max(1))
            .collect()
            .await;

        out.section.metadata = footers.into_iter().flatten().collect();

        info!(
            "Parquet extraction bucket={} files_selected={} footers_read={}",
            self.location.name(),
            out.section.file_paths.len(),
            out.section.metadata.len()
        );

        Ok(out)
    }

    /// The two-stage footer fetch.
    async fn read_footer(&self, key: &str) -> ScanOutcome<ParquetFooter> {
        let tail = self
            .location
            .get_suffix(key, self.config.footer_probe_bytes)
            .await
            .map_err(ScanError::from)?;

        let probe = probe_footer_tail(&tail)?;

        if probe.encrypted {
            return Ok(ParquetFooter {
                uri: key.to_string(),
                footer_encrypted: true,
                ..Default::default()
            });
        }

        let footer_len = probe.footer_len as usize;
        let fetch_len = (footer_len + FOOTER_TAIL_LEN) as u64;
        let footer_and_tail = self
            .location
            .get_suffix(key, fetch_len)
            .await
            .map_err(ScanError::from)?;

        if footer_and_tail.len() < footer_len + FOOTER_TAIL_LEN {
            return Err(ScanError::user(
                ErrorKind::Validation,
                "Parquet file is shorter than its declared footer.",
            ));
        }

        let mut footer = decode_footer(&footer_and_tail)?;
        footer.uri = key.to_string();
        Ok(footer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::parquet::PARQUET_MAGIC_ENCRYPTED;
    use crate::storage::MemoryLake;
    use chrono::TimeZone;
    use parquet::data_type::{ByteArray, ByteArrayType, Int64Type};
    use parquet::file::metadata::ParquetMetaDataReader;
    use parquet::file::properties::WriterProperties;
    use parquet::file::writer::SerializedFileWriter;
    use parquet::schema::parser::parse_message_type;
    use std::sync::Arc;

    fn sample_parquet_bytes() -> Vec<u8> {
        let schema = Arc::new(
            parse_message_type(
                "message sample { REQUIRED INT64 id; REQUIRED BYTE_ARRAY name; }",
            )
            .unwrap(),
        );
        let props = Arc::new(
            WriterProperties::builder()
                .set_created_by("lakescout-test".to_string())
                .build(),
        );

        let mut writer = SerializedFileWriter::new(Vec::new(), schema, props).unwrap();
        let mut row_group = writer.next_row_group().unwrap();

        let mut id_col = row_group.next_column().unwrap().unwrap();
        id_col
            .typed::<Int64Type>()
            .write_batch(&[10, 20, 30, 40], None, None)
            .unwrap();
        id_col.close().unwrap();

        let mut name_col = row_group.next_column().unwrap().unwrap();
        name_col
            .typed::<ByteArrayType>()
            .write_batch(
                &[
                    ByteArray::from("a"),
                    ByteArray::from("b"),
                    ByteArray::from("c"),
                    ByteArray::from("d"),
                ],
                None,
                None,
            )
            .unwrap();
        name_col.close().unwrap();

        row_group.close().unwrap();
        writer.into_inner().unwrap()
    }

    fn ts(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    #[tokio::test]
    async fn test_footers_extracted_with_limit() {
        let lake = MemoryLake::new();
        let bytes = sample_parquet_bytes();
        for i in 0..5 {
            lake.put_object("b", &format!("data/part-{i}.parquet"), bytes.clone());
        }
        lake.put_object("b", "README.md", "not parquet");

        let config = ScanConfig::default().with_parquet_files_limit(3);
        let bucket = lake.bucket("b");
        let pipeline = ParquetPipeline::new(bucket.as_ref(), &config);

        let out = pipeline.extract(None).await.unwrap();
        assert_eq!(out.section.file_paths.len(), 3);
        assert_eq!(out.section.metadata.len(), 3);
        assert_eq!(out.key_count, 6);
        assert!(out.section.metadata.iter().all(|f| f.num_rows == 4));
        assert!(!out.cache_valid);
    }

    #[tokio::test]
    async fn test_two_stage_fetch_matches_naive_full_read() {
        let bytes = sample_parquet_bytes();

        // Naive read: decode the footer straight out of the full byte
        // stream.
        let naive = ParquetMetaDataReader::new()
            .parse_and_finish(&bytes::Bytes::from(bytes.clone()))
            .unwrap();

        // Two-stage read through the pipeline.
        let lake = MemoryLake::new();
        lake.put_object("b", "data/f.parquet", bytes.clone());
        let config = ScanConfig::default();
        let bucket = lake.bucket("b");
        let pipeline = ParquetPipeline::new(bucket.as_ref(), &config);

        let out = pipeline.extract(None).await.unwrap();
        let footer = &out.section.metadata[0];

        assert_eq!(footer.num_rows, naive.file_metadata().num_rows());
        assert_eq!(footer.version, naive.file_metadata().version());
        assert_eq!(
            footer.created_by.as_deref(),
            naive.file_metadata().created_by()
        );
        assert_eq!(
            footer.columns.len(),
            naive.file_metadata().schema_descr().num_columns()
        );
    }

    #[tokio::test]
    async fn test_staleness_short_circuit() {
        let lake = MemoryLake::new();
        let bytes = sample_parquet_bytes();
        lake.put_object_at("b", "data/part-0.parquet", bytes.clone(), ts(1000));
        lake.put_object_at("b", "data/part-1.parquet", bytes, ts(2000));

        let config = ScanConfig::default();
        let bucket = lake.bucket("b");
        let pipeline = ParquetPipeline::new(bucket.as_ref(), &config);

        // Cache recorded the same newest timestamp: skip.
        let out = pipeline.extract(Some(ts(2000))).await.unwrap();
        assert!(out.cache_valid);
        assert!(out.section.metadata.is_empty());

        // Cache older than the listing: re-extract.
        let out = pipeline.extract(Some(ts(1500))).await.unwrap();
        assert!(!out.cache_valid);
        assert_eq!(out.section.metadata.len(), 2);

        // No prior fingerprint: extract.
        let out = pipeline.extract(None).await.unwrap();
        assert!(!out.cache_valid);
    }

    #[tokio::test]
    async fn test_unreadable_files_are_skipped_not_fatal() {
        let lake = MemoryLake::new();
        let bytes = sample_parquet_bytes();
        lake.put_object("b", "data/good-0.parquet", bytes.clone());
        lake.put_object("b", "data/bad.parquet", "this is not a parquet file");
        lake.put_object("b", "data/good-1.parquet", bytes);

        let config = ScanConfig::default();
        let bucket = lake.bucket("b");
        let pipeline = ParquetPipeline::new(bucket.as_ref(), &config);

        let out = pipeline.extract(None).await.unwrap();
        assert_eq!(out.section.file_paths.len(), 3);
        assert_eq!(out.section.metadata.len(), 2);
    }

    #[tokio::test]
    async fn test_encrypted_footer_reported_not_decoded() {
        let lake = MemoryLake::new();
        let mut fake = vec![0u8; 64];
        let tail_start = fake.len() - FOOTER_TAIL_LEN;
        fake[tail_start..tail_start + 4].copy_from_slice(&16u32.to_le_bytes());
        fake[tail_start + 4..].copy_from_slice(PARQUET_MAGIC_ENCRYPTED);
        lake.put_object("b", "secret.parquet", fake);

        let config = ScanConfig::default();
        let bucket = lake.bucket("b");
        let pipeline = ParquetPipeline::new(bucket.as_ref(), &config);

        let out = pipeline.extract(None).await.unwrap();
        assert_eq!(out.section.metadata.len(), 1);
        assert!(out.section.metadata[0].footer_encrypted);
        assert_eq!(out.section.metadata[0].num_rows, 0);
    }

    #[tokio::test]
    async fn test_listing_failure_is_fatal() {
        let lake = MemoryLake::new();
        lake.put_object("b", "data/part-0.parquet", sample_parquet_bytes());
        lake.fail_listing("b");

        let config = ScanConfig::default();
        let bucket = lake.bucket("b");
        let pipeline = ParquetPipeline::new(bucket.as_ref(), &config);

        assert!(pipeline.extract(None).await.is_err());
    }
}

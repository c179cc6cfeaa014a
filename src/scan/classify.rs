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

//! Table-type classification.
//!
//! A bounded breadth-first walk over the bucket's prefix hierarchy using
//! delimiter listings: one API call per queued prefix per level, so the
//! cost is O(levels), not O(objects). Folder markers decide the format;
//! the first match wins and stops the walk.

use tracing::info;

use crate::error::{ErrorKind, ScanError, ScanOutcome};
use crate::storage::LocationStore;
use crate::types::TableType;

/// Folder markers that identify a table format. Do not change: these are
/// the on-storage conventions of the formats themselves.
pub const ICEBERG_META_FOLDER: &str = "/metadata/";
pub const ICEBERG_DATA_FOLDER: &str = "/data/";
pub const DELTA_LOG_FOLDER: &str = "/_delta_log/";
pub const HUDI_META_FOLDER: &str = "/.hoodie/";

/// Outcome of classifying one location.
#[derive(Debug, Clone)]
pub struct Classification {
    pub table_type: TableType,

    /// Prefix to hand the matching extractor: the Iceberg metadata folder,
    /// the Delta log folder, or empty for the Parquet fallback.
    pub locator: String,

    /// Non-fatal notes, e.g. the depth-exhaustion fallback.
    pub diagnostics: Vec<ScanError>,
}

/// Decide which table format a location holds.
///
/// Markers are checked in the fixed order Iceberg, Delta, Hudi at every
/// level; a prefix ending in the Iceberg metadata folder only matches when a
/// sibling prefix in the same listing ends in the Iceberg data folder. When
/// no marker matched within `max_depth` levels the location is taken to be
/// flat Parquet files and a user-facing diagnostic is attached instead of a
/// hard failure. Deterministic for a fixed listing.
///
/// # Errors
///
/// Only listing failures error out; those abort classification for this
/// location.
pub async fn classify(
    location: &dyn LocationStore,
    max_depth: u32,
) -> ScanOutcome<Classification> {
    let mut queue: Vec<String> = vec![String::new()];
    let mut depth = max_depth;

    while depth > 0 && !queue.is_empty() {
        let mut next_level = Vec::new();

        for prefix in &queue {
            let listing = location
                .list_with_delimiter(if prefix.is_empty() {
                    None
                } else {
                    Some(prefix)
                })
                .await
                .map_err(|e| {
                    ScanError::internal(
                        ErrorKind::StorageFailed,
                        format!("Unable to list folders under '{prefix}': {e}"),
                    )
                })?;

            for pre in &listing.common_prefixes {
                // Root-level prefixes carry no leading slash; normalize so
                // the marker suffix check treats them like nested ones.
                let slash_pre = format!("/{pre}");

                if slash_pre.ends_with(ICEBERG_META_FOLDER) {
                    let has_data_sibling = listing
                        .common_prefixes
                        .iter()
                        .any(|p| format!("/{p}").ends_with(ICEBERG_DATA_FOLDER));
                    if has_data_sibling {
                        info!(
                            "Classified bucket={} type=iceberg locator={}",
                            location.name(),
                            pre
                        );
                        return Ok(Classification {
                            table_type: TableType::Iceberg,
                            locator: pre.clone(),
                            diagnostics: Vec::new(),
                        });
                    }
                } else if slash_pre.ends_with(DELTA_LOG_FOLDER) {
                    info!(
                        "Classified bucket={} type=delta locator={}",
                        location.name(),
                        pre
                    );
                    return Ok(Classification {
                        table_type: TableType::Delta,
                        locator: pre.clone(),
                        diagnostics: Vec::new(),
                    });
                } else if slash_pre.ends_with(HUDI_META_FOLDER) {
                    info!("Classified bucket={} type=hudi", location.name());
                    return Ok(Classification {
                        table_type: TableType::Hudi,
                        locator: pre.clone(),
                        diagnostics: Vec::new(),
                    });
                }

                next_level.push(pre.clone());
            }
        }

        queue = next_level;
        depth -= 1;
    }

    info!(
        "Classified bucket={} type=parquet (fallback, max_depth={})",
        location.name(),
        max_depth
    );

    Ok(Classification {
        table_type: TableType::Parquet,
        locator: String::new(),
        diagnostics: vec![ScanError::user(
            ErrorKind::NotFound,
            "Maximum folder depth reached without identifying a table format; \
             defaulting to flat parquet files.",
        )],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryLake;

    fn iceberg_lake() -> MemoryLake {
        let lake = MemoryLake::new();
        lake.put_object("b", "warehouse/orders/metadata/v1.metadata.json", "{}");
        lake.put_object("b", "warehouse/orders/metadata/snap-1.avro", "x");
        lake.put_object("b", "warehouse/orders/data/part-0.parquet", "x");
        lake
    }

    #[tokio::test]
    async fn test_iceberg_detection_needs_both_folders() {
        let lake = iceberg_lake();
        let classification = classify(lake.bucket("b").as_ref(), 10).await.unwrap();

        assert_eq!(classification.table_type, TableType::Iceberg);
        assert_eq!(classification.locator, "warehouse/orders/metadata/");
        assert!(classification.diagnostics.is_empty());
    }

    #[tokio::test]
    async fn test_metadata_folder_alone_is_not_iceberg() {
        let lake = MemoryLake::new();
        lake.put_object("b", "warehouse/orders/metadata/v1.metadata.json", "{}");

        let classification = classify(lake.bucket("b").as_ref(), 10).await.unwrap();
        assert_eq!(classification.table_type, TableType::Parquet);
    }

    #[tokio::test]
    async fn test_delta_detection() {
        let lake = MemoryLake::new();
        lake.put_object("b", "tables/events/_delta_log/00000000000000000000.json", "{}");
        lake.put_object("b", "tables/events/part-0.parquet", "x");

        let classification = classify(lake.bucket("b").as_ref(), 10).await.unwrap();
        assert_eq!(classification.table_type, TableType::Delta);
        assert_eq!(classification.locator, "tables/events/_delta_log/");
    }

    #[tokio::test]
    async fn test_hudi_detection() {
        let lake = MemoryLake::new();
        lake.put_object("b", "trips/.hoodie/hoodie.properties", "x");

        let classification = classify(lake.bucket("b").as_ref(), 10).await.unwrap();
        assert_eq!(classification.table_type, TableType::Hudi);
    }

    #[tokio::test]
    async fn test_depth_exhaustion_falls_back_to_parquet() {
        let lake = MemoryLake::new();
        lake.put_object("b", "a/b/c/d/e/file.parquet", "x");

        let classification = classify(lake.bucket("b").as_ref(), 2).await.unwrap();
        assert_eq!(classification.table_type, TableType::Parquet);
        assert_eq!(classification.diagnostics.len(), 1);
        assert!(classification.diagnostics[0].is_user_facing());
        assert_eq!(classification.diagnostics[0].kind, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_zero_depth_is_immediate_parquet_fallback() {
        let lake = iceberg_lake();
        let classification = classify(lake.bucket("b").as_ref(), 0).await.unwrap();
        assert_eq!(classification.table_type, TableType::Parquet);
        assert_eq!(classification.diagnostics.len(), 1);
    }

    #[tokio::test]
    async fn test_empty_bucket_falls_back_to_parquet() {
        let lake = MemoryLake::new();
        lake.bucket("empty");

        let classification = classify(lake.bucket("empty").as_ref(), 10).await.unwrap();
        assert_eq!(classification.table_type, TableType::Parquet);
    }

    #[tokio::test]
    async fn test_deep_iceberg_found_within_depth() {
        let lake = MemoryLake::new();
        lake.put_object("b", "l1/l2/l3/table/metadata/v1.metadata.json", "{}");
        lake.put_object("b", "l1/l2/l3/table/data/p.parquet", "x");

        let classification = classify(lake.bucket("b").as_ref(), 10).await.unwrap();
        assert_eq!(classification.table_type, TableType::Iceberg);
        assert_eq!(classification.locator, "l1/l2/l3/table/metadata/");
    }

    #[tokio::test]
    async fn test_listing_failure_aborts_classification() {
        let lake = MemoryLake::new();
        lake.put_object("b", "k", "v");
        lake.fail_listing("b");

        let err = classify(lake.bucket("b").as_ref(), 10).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::StorageFailed);
        assert!(!err.is_user_facing());
    }

    #[tokio::test]
    async fn test_classification_is_deterministic() {
        let lake = iceberg_lake();
        let bucket = lake.bucket("b");

        let first = classify(bucket.as_ref(), 10).await.unwrap();
        for _ in 0..16 {
            let again = classify(bucket.as_ref(), 10).await.unwrap();
            assert_eq!(again.table_type, first.table_type);
            assert_eq!(again.locator, first.locator);
        }
    }
}

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

//! The scan orchestrator.
//!
//! Fans classification + extraction out across a lake's locations through a
//! bounded worker pool and aggregates partial failures: a lake scan always
//! returns whatever subset of locations succeeded plus one error per failed
//! location, never all-or-nothing. Successful results land in the stash.

use futures::stream::{self, StreamExt};
use std::sync::Arc;
use tracing::{info, warn};

use super::classify::classify;
use super::delta::DeltaPipeline;
use super::fetcher::ScratchFetcher;
use super::iceberg::IcebergPipeline;
use super::parquet::ParquetPipeline;
use crate::config::ScanConfig;
use crate::error::{ErrorKind, ScanError, ScanOutcome};
use crate::stash::Stash;
use crate::storage::{LakeStore, LocationInfo, StorageError};
use crate::types::{LocationData, ScanResult, TableType};

/// Runs scans over lakes and single locations.
pub struct ScanOrchestrator {
    config: ScanConfig,
    stash: Arc<Stash>,
    fetcher: ScratchFetcher,
}

impl ScanOrchestrator {
    pub fn new(config: ScanConfig, stash: Arc<Stash>) -> ScanOutcome<Self> {
        Ok(Self {
            config,
            stash,
            fetcher: ScratchFetcher::new()?,
        })
    }

    /// Scan every location of a lake.
    ///
    /// Locations run concurrently, bounded by `scan_parallelism`. Results
    /// arrive in completion order, not submission order. User-facing
    /// problems ride inside their result's `errors` list; a location whose
    /// scan failed outright contributes one entry to the returned error
    /// list while its siblings continue.
    pub async fn scan_lake(
        &self,
        lake: &Arc<dyn LakeStore>,
    ) -> (Vec<ScanResult>, Vec<ScanError>) {
        let locations = match lake.list_locations().await {
            Ok(locations) => locations,
            Err(e) => return (Vec::new(), vec![e.into()]),
        };

        info!("Scanning lake location_count={}", locations.len());

        let outcomes: Vec<ScanOutcome<ScanResult>> = stream::iter(locations)
            .map(|info| async move { self.scrape_location(lake.as_ref(), info).await })
            .buffer_unordered(self.config.scan_parallelism.max(1))
            .collect()
            .await;

        let mut results = Vec::new();
        let mut errors = Vec::new();
        for outcome in outcomes {
            match outcome {
                Ok(result) => results.push(result),
                Err(e) => {
                    warn!("Location scan failed: {}", e);
                    errors.push(e);
                }
            }
        }

        (results, errors)
    }

    /// Scan one named location of a lake.
    ///
    /// # Errors
    ///
    /// Distinguishes a missing bucket from a forbidden one before
    /// scanning, so callers can surface the difference.
    pub async fn scan_location(
        &self,
        lake: &Arc<dyn LakeStore>,
        bucket_name: &str,
    ) -> ScanOutcome<ScanResult> {
        let info = lake.head_location(bucket_name).await.map_err(|e| match e {
            StorageError::NotFound(_) => ScanError::user(
                ErrorKind::NotFound,
                format!("Bucket not found: {bucket_name}"),
            ),
            StorageError::Forbidden(_) => ScanError::user(
                ErrorKind::Forbidden,
                format!("Bucket access is forbidden: {bucket_name}"),
            ),
            other => other.into(),
        })?;

        self.scrape_location(lake.as_ref(), info).await
    }

    /// Classify one location and run the matching extractor.
    ///
    /// Classification is terminal: once a type is decided, only that
    /// type's pipeline runs, so at most one format section can be present.
    async fn scrape_location(
        &self,
        lake: &dyn LakeStore,
        info: LocationInfo,
    ) -> ScanOutcome<ScanResult> {
        let location = lake.location(&info.name).await.map_err(ScanError::from)?;

        let mut data = LocationData::new(info.name.clone(), lake.storage_type());
        data.region = info.region;
        data.created_at = info.created_at;
        let mut result = ScanResult::new(data);

        let classification =
            classify(location.as_ref(), self.config.max_classify_depth).await?;
        let cached = self.stash.get(&info.name);

        match classification.table_type {
            TableType::Iceberg => {
                result.data.table_type = TableType::Iceberg;

                let prior_key_count = cached
                    .as_ref()
                    .filter(|e| e.result.data.table_type == TableType::Iceberg)
                    .map(|e| e.key_count);

                let out = IcebergPipeline::new(location.as_ref(), &self.fetcher)
                    .extract(&classification.locator, prior_key_count)
                    .await?;

                if out.cache_valid {
                    if let Some(entry) = cached {
                        return Ok(entry.result);
                    }
                }

                result.iceberg = out.section;
                result.data.key_count = out.key_count;
                result.errors.extend(out.errors);
            }

            TableType::Delta => {
                result.data.table_type = TableType::Delta;

                let out = DeltaPipeline::new(
                    location.as_ref(),
                    &self.fetcher,
                    self.config.delta_commit_limit,
                )
                .extract(&classification.locator)
                .await?;

                result.delta = out.section;
                result.errors.extend(out.errors);
            }

            TableType::Hudi => {
                // Detection only; extraction is not implemented.
                result.data.table_type = TableType::Hudi;
                result.hudi.present = true;
            }

            TableType::Parquet | TableType::Unknown => {
                result.data.table_type = TableType::Parquet;
                result.errors.extend(classification.diagnostics);

                let prior_updated_at = cached
                    .as_ref()
                    .filter(|e| e.result.data.table_type == TableType::Parquet)
                    .and_then(|e| e.updated_at);

                let out = ParquetPipeline::new(location.as_ref(), &self.config)
                    .extract(prior_updated_at)
                    .await?;

                if out.cache_valid {
                    if let Some(entry) = cached {
                        return Ok(entry.result);
                    }
                }

                result.parquet = out.section;
                result.data.key_count = out.key_count;
                result.data.updated_at = out.max_last_modified;
                result.errors.extend(out.errors);
            }
        }

        self.stash.put(&result);
        Ok(result)
    }
}

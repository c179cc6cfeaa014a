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

//! Delta extraction pipeline.
//!
//! Walks the `_delta_log` folder from the newest commit backwards and keeps
//! the most recent commits that actually carry table metadata (a non-empty
//! schema string). Checksum files are catalogued but never parsed.

use tracing::info;

use super::fetcher::ScratchFetcher;
use crate::error::{ErrorKind, ScanError, ScanOutcome};
use crate::reader::delta::read_commit;
use crate::storage::LocationStore;
use crate::types::result::DeltaSection;

/// What one Delta extraction produced.
#[derive(Debug, Default)]
pub struct DeltaExtraction {
    pub section: DeltaSection,
    pub errors: Vec<ScanError>,
}

/// Extracts recent commit history from one classified location.
pub struct DeltaPipeline<'a> {
    location: &'a dyn LocationStore,
    fetcher: &'a ScratchFetcher,
    commit_limit: usize,
}

impl<'a> DeltaPipeline<'a> {
    pub fn new(
        location: &'a dyn LocationStore,
        fetcher: &'a ScratchFetcher,
        commit_limit: usize,
    ) -> Self {
        Self {
            location,
            fetcher,
            commit_limit,
        }
    }

    /// Run the pipeline against the `_delta_log` folder at `locator`.
    ///
    /// Commit files are zero-padded version numbers, so an ascending sort
    /// puts the newest last; the walk then runs newest to oldest and stops
    /// once `commit_limit` metadata-bearing commits were collected.
    pub async fn extract(&self, locator: &str) -> ScanOutcome<DeltaExtraction> {
        let mut out = DeltaExtraction::default();
        out.section.present = true;
        out.section.uri = locator.to_string();

        let objects = self
            .location
            .list_all(Some(locator))
            .await
            .map_err(ScanError::from)?;

        for obj in &objects {
            if obj.key.ends_with(".json") {
                out.section.log_paths.push(obj.key.clone());
            } else if obj.key.ends_with(".crc") {
                out.section.crc_paths.push(obj.key.clone());
            }
        }

        if out.section.log_paths.is_empty() {
            out.errors.push(ScanError::user(
                ErrorKind::Validation,
                "No commit files were found in the delta log.",
            ));
            return Ok(out);
        }

        out.section.log_paths.sort();

        if let Err(e) = self.log_walk(&mut out.section).await {
            out.errors.push(e);
        }

        info!(
            "Delta extraction bucket={} commits_seen={} commits_kept={} crc_files={}",
            self.location.name(),
            out.section.log_paths.len(),
            out.section.log.len(),
            out.section.crc_paths.len()
        );

        Ok(out)
    }

    async fn log_walk(&self, section: &mut DeltaSection) -> ScanOutcome<()> {
        let mut remaining = self.commit_limit;
        if remaining == 0 {
            return Ok(());
        }

        for path in section.log_paths.iter().rev() {
            let scratch = self.fetcher.fetch(self.location, path).await?;
            let commit = read_commit(&scratch)?;

            if commit.has_schema() {
                section.log.push(commit);

                remaining -= 1;
                if remaining == 0 {
                    break;
                }
            }
        }

        Ok(())
    }
}

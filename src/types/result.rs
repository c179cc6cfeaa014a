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

//! The per-location scan aggregate.

use serde::Serialize;

use super::delta::DeltaCommit;
use super::iceberg::{IcebergMetadata, ManifestFile, SnapshotRecord};
use super::location::{LocationData, TableType};
use super::parquet::ParquetFooter;
use crate::error::ScanError;

/// Everything one scan learned about one location.
///
/// Exactly zero or one of the format sections has `present == true`;
/// classification is terminal, so once a type is detected no other extractor
/// runs. `errors` collects non-fatal problems hit while filling the result
/// in; a result with a non-empty error list is still usable.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ScanResult {
    pub data: LocationData,
    pub iceberg: IcebergSection,
    pub delta: DeltaSection,
    pub parquet: ParquetSection,
    pub hudi: HudiSection,
    pub errors: Vec<ScanError>,
}

impl ScanResult {
    pub fn new(data: LocationData) -> Self {
        Self {
            data,
            ..Default::default()
        }
    }

    /// Number of format sections claiming presence. The mutual-exclusivity
    /// invariant requires this to be 0 or 1.
    pub fn present_count(&self) -> usize {
        [
            self.iceberg.present,
            self.delta.present,
            self.parquet.present,
            self.hudi.present,
        ]
        .iter()
        .filter(|p| **p)
        .count()
    }

    /// The detected table type according to the section flags.
    pub fn detected_type(&self) -> TableType {
        if self.iceberg.present {
            TableType::Iceberg
        } else if self.delta.present {
            TableType::Delta
        } else if self.hudi.present {
            TableType::Hudi
        } else if self.parquet.present {
            TableType::Parquet
        } else {
            TableType::Unknown
        }
    }

    /// Append a non-fatal problem.
    pub fn push_error(&mut self, error: ScanError) {
        self.errors.push(error);
    }
}

/// Iceberg findings: categorized key lists plus the decoded metadata chain.
#[derive(Debug, Clone, Default, Serialize)]
pub struct IcebergSection {
    pub present: bool,

    /// Prefix of the table's metadata folder inside the bucket.
    pub uri: String,

    pub metadata_paths: Vec<String>,
    pub snapshot_paths: Vec<String>,
    pub manifest_paths: Vec<String>,

    /// Decoded newest `*.metadata.json`, when the metadata step succeeded.
    pub metadata: Option<IcebergMetadata>,

    /// Records of the current snapshot's manifest list.
    pub snapshot: Vec<SnapshotRecord>,

    /// One entry per manifest referenced by the current snapshot.
    pub manifests: Vec<ManifestFile>,
}

/// Delta findings: the log folder inventory plus recent commit views.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DeltaSection {
    pub present: bool,

    /// Prefix of the `_delta_log` folder inside the bucket.
    pub uri: String,

    pub log_paths: Vec<String>,
    pub crc_paths: Vec<String>,

    /// Merged views of the most recent metadata-bearing commits,
    /// newest first.
    pub log: Vec<DeltaCommit>,
}

/// Parquet findings for the flat-files interpretation of a bucket.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ParquetSection {
    pub present: bool,
    pub file_paths: Vec<String>,
    pub metadata: Vec<ParquetFooter>,
}

/// Hudi is detection-only; extraction is not implemented.
#[derive(Debug, Clone, Default, Serialize)]
pub struct HudiSection {
    pub present: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::storage::StorageType;

    #[test]
    fn test_fresh_result_has_no_presence() {
        let result = ScanResult::new(LocationData::new("b", StorageType::Aws));
        assert_eq!(result.present_count(), 0);
        assert_eq!(result.detected_type(), TableType::Unknown);
        assert!(result.errors.is_empty());
    }

    #[test]
    fn test_single_presence_maps_to_type() {
        let mut result = ScanResult::default();
        result.delta.present = true;
        assert_eq!(result.present_count(), 1);
        assert_eq!(result.detected_type(), TableType::Delta);

        let mut result = ScanResult::default();
        result.hudi.present = true;
        assert_eq!(result.detected_type(), TableType::Hudi);
    }

    #[test]
    fn test_push_error_keeps_result_usable() {
        let mut result = ScanResult::default();
        result.parquet.present = true;
        result.push_error(ScanError::user(
            ErrorKind::NotFound,
            "No manifest files were found.",
        ));

        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.detected_type(), TableType::Parquet);
    }
}

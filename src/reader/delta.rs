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

//! Delta commit-log decoder.

use std::path::Path;
use tracing::debug;

use crate::error::{ErrorKind, ScanError, ScanOutcome};
use crate::types::delta::{DeltaAction, DeltaCommit, DeltaSchema};

/// Read one `_delta_log/*.json` commit file into its merged view.
///
/// Each non-empty line decodes to one action; lines that fail to decode are
/// skipped with a diagnostic so a single malformed entry cannot hide the
/// rest of the commit. When the commit carries table metadata, its
/// `schemaString` is decoded into the structured schema as well.
pub fn read_commit(path: &Path) -> ScanOutcome<DeltaCommit> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        ScanError::internal(
            ErrorKind::StorageFailed,
            format!("Failed to read delta log file: {e}"),
        )
    })?;

    let mut commit = DeltaCommit::default();

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match serde_json::from_str::<DeltaAction>(line) {
            Ok(action) => commit.apply(action),
            Err(e) => {
                debug!("Skipping undecodable delta log line: {}", e);
            }
        }
    }

    if let Some(metadata) = commit.metadata.as_mut() {
        if !metadata.schema_string.is_empty() {
            metadata.schema = decode_schema_string(&metadata.schema_string);
        }
    }

    Ok(commit)
}

fn decode_schema_string(schema_string: &str) -> Option<DeltaSchema> {
    match serde_json::from_str(schema_string) {
        Ok(schema) => Some(schema),
        Err(e) => {
            debug!("Failed to decode delta schemaString: {}", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    fn write_temp(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    const COMMIT: &str = concat!(
        r#"{"commitInfo":{"timestamp":1700000000000,"operation":"WRITE","engineInfo":"Apache-Spark/3.5.0"}}"#,
        "\n",
        r#"{"protocol":{"minReaderVersion":1,"minWriterVersion":2}}"#,
        "\n",
        r#"{"metaData":{"id":"3f1a","format":{"provider":"parquet"},"schemaString":"{\"type\":\"struct\",\"fields\":[{\"name\":\"id\",\"type\":\"long\",\"nullable\":false,\"metadata\":{}}]}","partitionColumns":["dt"],"configuration":{},"createdTime":1700000000000}}"#,
        "\n",
        r#"{"add":{"path":"dt=2024-01-01/part-0.parquet","size":2048,"modificationTime":1700000000001,"dataChange":true}}"#,
        "\n",
        r#"{"add":{"path":"dt=2024-01-01/part-1.parquet","size":4096,"modificationTime":1700000000002,"dataChange":true}}"#,
        "\n",
        r#"{"remove":{"path":"dt=2023-12-31/part-9.parquet","deletionTimestamp":1700000000003,"dataChange":true}}"#,
    );

    #[test]
    fn test_read_commit_merges_all_slots() {
        let file = write_temp(COMMIT);
        let commit = read_commit(file.path()).unwrap();

        assert_eq!(commit.commit_info.as_ref().unwrap().operation, "WRITE");
        assert_eq!(commit.protocol.as_ref().unwrap().min_writer_version, 2);
        assert_eq!(commit.add.len(), 2);
        assert_eq!(commit.remove.len(), 1);
        assert!(commit.txn.is_none());

        let metadata = commit.metadata.as_ref().unwrap();
        assert_eq!(metadata.partition_columns, vec!["dt".to_string()]);
        assert!(commit.has_schema());

        let schema = metadata.schema.as_ref().unwrap();
        assert_eq!(schema.fields.len(), 1);
        assert_eq!(schema.fields[0].name, "id");
    }

    #[test]
    fn test_malformed_lines_are_skipped() {
        let content = concat!(
            "this is not json\n",
            r#"{"add":{"path":"part-0.parquet"}}"#,
            "\n",
            "{\"truncated\n",
        );
        let file = write_temp(content);
        let commit = read_commit(file.path()).unwrap();
        assert_eq!(commit.add.len(), 1);
    }

    #[test]
    fn test_empty_file_yields_empty_commit() {
        let file = write_temp("");
        let commit = read_commit(file.path()).unwrap();
        assert!(!commit.has_schema());
        assert!(commit.add.is_empty());
    }

    #[test]
    fn test_bad_schema_string_leaves_schema_none() {
        let content = r#"{"metaData":{"id":"x","schemaString":"{broken"}}"#;
        let file = write_temp(content);
        let commit = read_commit(file.path()).unwrap();
        assert!(commit.has_schema());
        assert!(commit.metadata.unwrap().schema.is_none());
    }

    #[test]
    fn test_missing_file_is_storage_error() {
        let err = read_commit(Path::new("/nonexistent/00000.json")).unwrap_err();
        assert_eq!(err.kind, ErrorKind::StorageFailed);
    }
}

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

use serde::Serialize;

/// Summary of one Parquet file's footer.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ParquetFooter {
    /// Object key the footer was read from.
    pub uri: String,

    /// Parquet format version.
    pub version: i32,

    /// Total row count across all row groups.
    pub num_rows: i64,

    /// Writer identification string, when present.
    pub created_by: Option<String>,

    /// Leaf columns of the file schema.
    pub columns: Vec<ParquetColumn>,

    /// True when the file uses encrypted-footer mode; such footers are
    /// reported but not decoded.
    pub footer_encrypted: bool,
}

/// One leaf column of a Parquet schema.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ParquetColumn {
    /// Dotted column path (nested fields join with `.`).
    pub name: String,

    /// Physical type, e.g. `INT64` or `BYTE_ARRAY`.
    pub physical_type: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_footer_serializes() {
        let footer = ParquetFooter {
            uri: "data/part-0.parquet".to_string(),
            version: 2,
            num_rows: 42,
            created_by: Some("writer/1.0".to_string()),
            columns: vec![ParquetColumn {
                name: "id".to_string(),
                physical_type: "INT64".to_string(),
            }],
            footer_encrypted: false,
        };

        let json = serde_json::to_string(&footer).unwrap();
        assert!(json.contains("\"num_rows\":42"));
        assert!(json.contains("\"INT64\""));
    }
}

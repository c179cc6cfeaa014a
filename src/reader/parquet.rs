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

//! Parquet footer decoding.
//!
//! A Parquet file ends with `[thrift footer][4-byte LE length][4-byte
//! magic]`. [`probe_footer_tail`] reads the length and magic out of the
//! final 8 bytes; [`decode_footer`] turns the footer bytes themselves into a
//! [`ParquetFooter`] summary. Files written in encrypted-footer mode carry
//! the `PARE` magic and are reported as encrypted rather than decoded.

use bytes::Bytes;
use parquet::file::metadata::ParquetMetaDataReader;

use crate::error::{ErrorKind, ScanError, ScanOutcome};
use crate::types::parquet::{ParquetColumn, ParquetFooter};

/// Bytes needed to see footer length + magic.
pub const FOOTER_TAIL_LEN: usize = 8;

/// Plaintext footer magic.
pub const PARQUET_MAGIC: &[u8; 4] = b"PAR1";

/// Encrypted-footer magic.
pub const PARQUET_MAGIC_ENCRYPTED: &[u8; 4] = b"PARE";

/// What the final 8 bytes of a file reveal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FooterProbe {
    /// Serialized footer length in bytes.
    pub footer_len: u32,
    /// True when the footer is encrypted and cannot be decoded here.
    pub encrypted: bool,
}

/// Inspect the tail of a Parquet file.
///
/// `tail` must hold at least the final [`FOOTER_TAIL_LEN`] bytes; extra
/// leading bytes are ignored.
pub fn probe_footer_tail(tail: &[u8]) -> ScanOutcome<FooterProbe> {
    if tail.len() < FOOTER_TAIL_LEN {
        return Err(ScanError::user(
            ErrorKind::Validation,
            "File is smaller than a parquet footer.",
        ));
    }

    let tail = &tail[tail.len() - FOOTER_TAIL_LEN..];
    let magic: &[u8; 4] = tail[4..8].try_into().expect("slice length checked");

    let encrypted = match magic {
        m if m == PARQUET_MAGIC => false,
        m if m == PARQUET_MAGIC_ENCRYPTED => true,
        _ => {
            return Err(ScanError::user(
                ErrorKind::Validation,
                "File does not end with the parquet magic.",
            ))
        }
    };

    let footer_len = u32::from_le_bytes(tail[0..4].try_into().expect("slice length checked"));

    Ok(FooterProbe {
        footer_len,
        encrypted,
    })
}

/// Decode a file tail that ends with `[footer][length][magic]`.
///
/// `footer_and_tail` must contain at least the whole serialized footer plus
/// the final 8 bytes, i.e. the result of a suffix fetch of
/// `footer_len + 8` bytes.
pub fn decode_footer(footer_and_tail: &Bytes) -> ScanOutcome<ParquetFooter> {
    let metadata = ParquetMetaDataReader::new()
        .parse_and_finish(footer_and_tail)
        .map_err(|e| {
            ScanError::internal(
                ErrorKind::DependencyFailed,
                format!("Failed to decode parquet footer: {e}"),
            )
        })?;

    let file_metadata = metadata.file_metadata();
    let columns = file_metadata
        .schema_descr()
        .columns()
        .iter()
        .map(|col| ParquetColumn {
            name: col.path().string(),
            physical_type: format!("{:?}", col.physical_type()),
        })
        .collect();

    Ok(ParquetFooter {
        uri: String::new(),
        version: file_metadata.version(),
        num_rows: file_metadata.num_rows(),
        created_by: file_metadata.created_by().map(str::to_string),
        columns,
        footer_encrypted: false,
    })
}

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

//! Table format readers.
//!
//! Pure decoders: each function turns a local scratch file (or a byte
//! slice) into a typed in-memory structure. Nothing here talks to the
//! network.
//!
//! ## Supported formats
//!
//! - [`iceberg`] - `*.metadata.json` documents, Avro snapshot lists and
//!   manifests
//! - [`delta`] - NDJSON commit-log files
//! - [`parquet`] - binary footers

pub mod delta;
pub mod iceberg;
pub mod parquet;

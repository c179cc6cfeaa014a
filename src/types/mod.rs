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

//! Data model for scan results and the table formats they describe.
//!
//! ## Modules
//!
//! - [`location`] - Location identity and the detected table type
//! - [`result`] - The per-location scan aggregate
//! - [`iceberg`] - Iceberg metadata, snapshot-list and manifest records
//! - [`delta`] - Delta commit-log actions
//! - [`parquet`] - Parquet footer summaries

pub mod delta;
pub mod iceberg;
pub mod location;
pub mod parquet;
pub mod result;

pub use location::{LocationData, TableType};
pub use result::{DeltaSection, HudiSection, IcebergSection, ParquetSection, ScanResult};

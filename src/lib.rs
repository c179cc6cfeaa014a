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

//! # Lakescout
//!
//! A Rust library that discovers and extracts structural metadata from
//! data-lake tables (Apache Iceberg, Delta Lake, Parquet; Apache Hudi
//! detection) stored in object-storage buckets, with no prior knowledge of
//! which format a bucket holds.
//!
//! Register a storage location and lakescout autonomously answers "what
//! kind of table is this", then materializes its current schema,
//! partitioning, snapshot history and file inventory, downloading only the
//! bytes the metadata lives in.
//!
//! ## Features
//!
//! - **Table-type classification**: a bounded breadth-first prefix walk
//!   distinguishes Iceberg / Delta / Hudi / Parquet by folder conventions,
//!   at one listing call per level
//! - **Format extractors**: Iceberg JSON metadata + Avro snapshot lists and
//!   manifests; Delta NDJSON commit logs; Parquet binary footers fetched
//!   with two ranged reads per file
//! - **Lake-wide scans**: bounded concurrent fan-out with partial-failure
//!   aggregation, so a failed bucket never fails the lake
//! - **Staleness fingerprints**: object counts and last-modified high-water
//!   marks let rescans of unchanged buckets return cached results without
//!   re-downloading
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use lakescout::config::ScanConfig;
//! use lakescout::scan::ScanOrchestrator;
//! use lakescout::stash::{LakeCredentials, StaticLakeResolver, Stash};
//! use lakescout::storage::StorageType;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
//! let resolver = Arc::new(StaticLakeResolver::new());
//! resolver.insert(
//!     1,
//!     LakeCredentials {
//!         storage_type: StorageType::Aws,
//!         access_key_id: "ACCESS_KEY".into(),
//!         secret_access_key: "SECRET_KEY".into(),
//!         region: "us-east-1".into(),
//!         session_token: None,
//!         endpoint: None,
//!     },
//!     vec![lakescout::storage::LocationInfo::named("my-bucket")],
//! );
//!
//! use lakescout::stash::credentials::{CredentialStore, LocationDirectory};
//!
//! let stash = Arc::new(Stash::new(
//!     Arc::clone(&resolver) as Arc<dyn CredentialStore>,
//!     resolver as Arc<dyn LocationDirectory>,
//!     Duration::from_secs(900),
//! ));
//! let orchestrator = ScanOrchestrator::new(ScanConfig::default(), Arc::clone(&stash))?;
//!
//! let lake = stash.get_or_create_client(1).await?;
//! let (results, _errors) = orchestrator.scan_lake(&lake).await;
//! for result in &results {
//!     println!("{}: {:?}", result.data.name, result.data.table_type);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`scan`] - Classification, extraction pipelines and the orchestrator
//! - [`reader`] - Pure format decoders (JSON / Avro / Parquet footers)
//! - [`storage`] - Object storage abstraction layer
//! - [`stash`] - Scan-result and storage-client caches
//! - [`types`] - The scan data model

pub mod config;
pub mod error;
pub mod reader;
pub mod scan;
pub mod stash;
pub mod storage;
pub mod types;
pub mod util;

// Re-export commonly used types
pub use config::ScanConfig;
pub use error::{ErrorKind, ScanError};
pub use scan::{classify, Classification, ScanOrchestrator};
pub use stash::Stash;
pub use types::{ScanResult, TableType};

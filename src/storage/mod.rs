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

//! Object storage abstraction layer.
//!
//! Scans see a lake through two traits: [`LakeStore`] for the account-level
//! view (location enumeration, head checks) and [`LocationStore`] for object
//! operations inside one bucket. The S3 implementation is built on the
//! `object_store` crate; an in-memory implementation backs the test suite.

pub mod config;
pub mod error;
pub mod factory;
pub mod memory;
pub mod provider;
pub mod s3;

// Public exports
pub use config::{StorageConfig, StorageType};
pub use error::{StorageError, StorageResult};
pub use factory::LakeStoreFactory;
pub use memory::MemoryLake;
pub use provider::{LakeStore, LocationInfo, LocationStore, ObjectInfo, PrefixListing};

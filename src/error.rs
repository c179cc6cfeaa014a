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

//! Scan-level error type.
//!
//! Every problem encountered while classifying or extracting a location is
//! carried as a [`ScanError`]: a closed [`ErrorKind`], a human-readable
//! message, and a flag stating whether the message may be returned verbatim
//! to an external caller. Errors with `user_facing == false` must be routed
//! to the internal diagnostics channel (logged) and redacted at the API
//! boundary.

use serde::Serialize;
use thiserror::Error;

use crate::storage::error::StorageError;

/// Closed set of error kinds recognized by the scan core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    /// Input or discovered data did not have the expected shape.
    Validation,
    /// A requested resource (bucket, file, snapshot) does not exist.
    NotFound,
    /// Access to a resource was denied by the storage provider.
    Forbidden,
    /// A conflicting state was detected.
    Conflict,
    /// An external collaborator (credential store, decoder) failed.
    DependencyFailed,
    /// A storage operation (list/get/head) failed.
    StorageFailed,
    /// Anything else; treated as a bug until classified.
    Internal,
}

/// A single scan problem, fatal or not depending on where it is attached.
///
/// Non-fatal errors accumulate on a scan result's `errors` list; fatal ones
/// abort the affected bucket and surface on the lake-level error list.
#[derive(Debug, Clone, Error, Serialize)]
#[error("{kind:?}: {message}")]
pub struct ScanError {
    pub kind: ErrorKind,
    pub message: String,
    /// Whether `message` is safe to show to an external caller verbatim.
    pub user_facing: bool,
}

impl ScanError {
    /// A user-facing error: the message may be returned as-is.
    pub fn user(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            user_facing: true,
        }
    }

    /// An internal error: the message is for the diagnostics channel only.
    pub fn internal(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            user_facing: false,
        }
    }

    pub fn is_user_facing(&self) -> bool {
        self.user_facing
    }
}

impl From<StorageError> for ScanError {
    fn from(err: StorageError) -> Self {
        let kind = match &err {
            StorageError::NotFound(_) => ErrorKind::NotFound,
            StorageError::Forbidden(_) => ErrorKind::Forbidden,
            StorageError::Config(_) => ErrorKind::Validation,
            _ => ErrorKind::StorageFailed,
        };
        // Raw storage messages can leak endpoints and keys; keep them internal.
        Self::internal(kind, err.to_string())
    }
}

/// Result alias used across the scan core.
pub type ScanOutcome<T> = Result<T, ScanError>;

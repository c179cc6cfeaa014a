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

use thiserror::Error;

/// Errors that can occur during storage operations.
///
/// "Not found" and "forbidden" are first-class variants so callers can react
/// to them without string matching; whatever the backend reports as either is
/// normalized here by [`classify_store_error`].
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Access forbidden: {0}")]
    Forbidden(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Object store error: {0}")]
    ObjectStore(object_store::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),
}

impl StorageError {
    /// Whether a retry could plausibly succeed.
    ///
    /// Only transport-level failures qualify; 4xx-shaped errors never do.
    pub fn is_transient(&self) -> bool {
        match self {
            StorageError::ObjectStore(e) => {
                let msg = format!("{e:?}");
                msg.contains("ConnectionReset")
                    || msg.contains("BrokenPipe")
                    || msg.contains("Interrupted")
                    || msg.contains("TimedOut")
                    || msg.contains("timed out")
            }
            StorageError::Io(e) => matches!(
                e.kind(),
                std::io::ErrorKind::ConnectionReset
                    | std::io::ErrorKind::BrokenPipe
                    | std::io::ErrorKind::Interrupted
                    | std::io::ErrorKind::TimedOut
            ),
            _ => false,
        }
    }
}

/// Normalize an `object_store` error into the variants callers dispatch on.
pub fn classify_store_error(err: object_store::Error, context: &str) -> StorageError {
    match err {
        object_store::Error::NotFound { .. } => StorageError::NotFound(context.to_string()),
        object_store::Error::PermissionDenied { .. }
        | object_store::Error::Unauthenticated { .. } => {
            StorageError::Forbidden(context.to_string())
        }
        other => StorageError::ObjectStore(other),
    }
}

impl From<object_store::Error> for StorageError {
    fn from(err: object_store::Error) -> Self {
        classify_store_error(err, "storage operation")
    }
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

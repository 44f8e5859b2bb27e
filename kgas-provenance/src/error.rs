// Copyright 2025 Sushanth (https://github.com/sushanthpy)
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Provenance error taxonomy
//!
//! Bookkeeping misuse (unknown operation ids) propagates to the caller;
//! it indicates a bug at the call site, never data absence. Missing
//! lineage during traversal is not an error at all; the branch simply
//! terminates.

use thiserror::Error;
use uuid::Uuid;

pub type Result<T> = std::result::Result<T, ProvenanceError>;

/// Failure reported by a lineage storage backend.
#[derive(Debug, Error)]
#[error("storage backend error: {0}")]
pub struct StorageError(pub String);

#[derive(Debug, Error)]
pub enum ProvenanceError {
    /// The operation id is not in the active set: double completion,
    /// completion after failure, or a typo'd id.
    #[error("Operation {0} is not active")]
    OperationNotFound(Uuid),

    /// The operation id does not exist in durable storage either.
    #[error("Operation {0} is unknown")]
    UnknownOperation(Uuid),

    #[error("Invalid lineage direction '{0}': expected 'backward' or 'forward'")]
    InvalidDirection(String),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

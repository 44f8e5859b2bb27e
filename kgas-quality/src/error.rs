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

//! Quality assessment errors

use crate::resolver::ResolverError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, QualityError>;

#[derive(Debug, Error)]
pub enum QualityError {
    /// Administrative mutation targeted an artifact that does not exist.
    /// Assessment paths never raise this; they degrade to a soft result.
    #[error("Artifact '{0}' not found")]
    ArtifactNotFound(String),

    #[error(transparent)]
    Resolver(#[from] ResolverError),

    #[error(transparent)]
    Provenance(#[from] kgas_provenance::ProvenanceError),
}

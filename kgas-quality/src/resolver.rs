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

//! Artifact resolution boundary
//!
//! References are opaque `backend:kind:id` strings; a resolver routes
//! them to whatever storage backend owns the artifact. The in-memory
//! implementation backs tests and embedded pipelines.

use dashmap::DashMap;
use kgas_core::Artifact;
use thiserror::Error;

/// Failure reported by an artifact storage backend. Resolution misses
/// are `None`, not errors.
#[derive(Debug, Error)]
#[error("artifact backend error: {0}")]
pub struct ResolverError(pub String);

/// Reference-to-artifact routing over external storage backends.
pub trait ArtifactResolver: Send + Sync {
    /// Resolve a reference. `None` means the artifact does not exist;
    /// callers decide whether that is soft or hard.
    fn resolve(&self, reference: &str) -> Result<Option<Artifact>, ResolverError>;

    fn save(&self, reference: &str, artifact: Artifact) -> Result<(), ResolverError>;
}

/// In-memory resolver keyed by raw reference string.
#[derive(Default)]
pub struct MemoryArtifactResolver {
    artifacts: DashMap<String, Artifact>,
}

impl MemoryArtifactResolver {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ArtifactResolver for MemoryArtifactResolver {
    fn resolve(&self, reference: &str) -> Result<Option<Artifact>, ResolverError> {
        Ok(self.artifacts.get(reference).map(|a| a.clone()))
    }

    fn save(&self, reference: &str, artifact: Artifact) -> Result<(), ResolverError> {
        self.artifacts.insert(reference.to_string(), artifact);
        Ok(())
    }
}

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

//! Artifact model and reference routing
//!
//! Artifacts are identified by opaque reference strings of the form
//! `backend:kind:id` (e.g. `neo4j:entity:abc123`). The core never
//! interprets more of a reference than the backend and kind prefixes
//! needed to route a resolver call.

use crate::config::TierThresholds;
use crate::error::ReferenceError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Artifact type discriminator, carried in the reference string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    Entity,
    Relationship,
    Document,
    Chunk,
}

impl ArtifactKind {
    /// Attribute keys an artifact of this kind must carry to be complete.
    pub fn required_fields(&self) -> &'static [&'static str] {
        match self {
            ArtifactKind::Entity => &["canonical_name", "entity_type"],
            ArtifactKind::Relationship => &["source_id", "target_id", "relationship_type"],
            ArtifactKind::Document => &["content", "source_path"],
            ArtifactKind::Chunk => &["content", "document_ref"],
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ArtifactKind::Entity => "entity",
            ArtifactKind::Relationship => "relationship",
            ArtifactKind::Document => "document",
            ArtifactKind::Chunk => "chunk",
        };
        f.write_str(s)
    }
}

impl FromStr for ArtifactKind {
    type Err = ReferenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "entity" => Ok(ArtifactKind::Entity),
            "relationship" => Ok(ArtifactKind::Relationship),
            "document" => Ok(ArtifactKind::Document),
            "chunk" => Ok(ArtifactKind::Chunk),
            other => Err(ReferenceError::UnknownKind(other.to_string())),
        }
    }
}

/// Parsed form of an artifact reference string.
///
/// References stay opaque strings everywhere else; parsing happens only
/// at the resolver boundary.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArtifactRef {
    pub backend: String,
    pub kind: ArtifactKind,
    pub id: String,
}

impl ArtifactRef {
    /// Parse a `backend:kind:id` reference. The id segment may itself
    /// contain colons.
    pub fn parse(reference: &str) -> Result<Self, ReferenceError> {
        let mut parts = reference.splitn(3, ':');
        let backend = parts
            .next()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ReferenceError::Malformed(reference.to_string()))?;
        let kind = parts
            .next()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ReferenceError::Malformed(reference.to_string()))?;
        let id = parts
            .next()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ReferenceError::Malformed(reference.to_string()))?;

        Ok(Self {
            backend: backend.to_string(),
            kind: kind.parse()?,
            id: id.to_string(),
        })
    }
}

impl fmt::Display for ArtifactRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.backend, self.kind, self.id)
    }
}

/// Bucketed trust classification for artifacts and operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityTier {
    High,
    Medium,
    Low,
}

impl QualityTier {
    /// Classify a confidence value against configurable tier thresholds.
    pub fn classify(confidence: f64, thresholds: &TierThresholds) -> Self {
        if confidence >= thresholds.high {
            QualityTier::High
        } else if confidence >= thresholds.medium {
            QualityTier::Medium
        } else {
            QualityTier::Low
        }
    }
}

impl fmt::Display for QualityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            QualityTier::High => "high",
            QualityTier::Medium => "medium",
            QualityTier::Low => "low",
        };
        f.write_str(s)
    }
}

/// An artifact as seen by quality assessment.
///
/// This is the resolver-side view: stored confidence, accumulated
/// warnings, and the attribute map that completeness checks inspect.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Artifact {
    pub kind: ArtifactKind,
    /// Stored confidence from the operation that produced this artifact.
    pub confidence: f64,
    pub quality_tier: QualityTier,
    /// Warnings accumulated across assessments, append-only.
    pub warnings: Vec<String>,
    pub attributes: HashMap<String, serde_json::Value>,
    /// Alternative surface forms (entity mentions); duplicates are a
    /// consistency defect.
    pub surface_forms: Vec<String>,
}

impl Artifact {
    pub fn new(kind: ArtifactKind, confidence: f64) -> Self {
        Self {
            kind,
            confidence,
            quality_tier: QualityTier::classify(confidence, &TierThresholds::default()),
            warnings: Vec::new(),
            attributes: HashMap::new(),
            surface_forms: Vec::new(),
        }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.attributes.insert(key.into(), value);
        self
    }

    pub fn with_surface_forms(mut self, forms: Vec<String>) -> Self {
        self.surface_forms = forms;
        self
    }

    /// Count of surface forms that appear more than once (case-insensitive).
    pub fn duplicate_surface_forms(&self) -> usize {
        let mut seen = HashMap::new();
        for form in &self.surface_forms {
            *seen.entry(form.to_lowercase()).or_insert(0usize) += 1;
        }
        seen.values().filter(|&&n| n > 1).count()
    }

    /// Required attribute keys missing for this artifact's kind.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        self.kind
            .required_fields()
            .iter()
            .filter(|f| !self.attributes.contains_key(**f))
            .copied()
            .collect()
    }
}

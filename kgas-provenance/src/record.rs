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

//! Provenance record: one tracked operation
//!
//! Records are created by `start_operation`, mutated exactly once by
//! `complete_operation` or `fail_operation`, and never deleted from
//! durable storage, only retired from the in-memory active set.

use chrono::{DateTime, Utc};
use kgas_core::QualityTier;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Lifecycle state of an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationStatus {
    Running,
    Completed,
    Failed,
}

/// One operation in the lineage graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvenanceRecord {
    pub id: Uuid,
    /// Kind of operation, e.g. "entity_extraction", "embedding".
    pub operation_type: String,
    /// Which external collaborator performed the operation.
    pub tool_id: String,
    /// Artifact references consumed, in order.
    pub input_refs: Vec<String>,
    /// Artifact references produced; empty until completion.
    pub output_refs: Vec<String>,
    /// How the operation was configured.
    pub parameters: HashMap<String, serde_json::Value>,
    pub status: OperationStatus,
    /// Confidence in the operation's outputs; 1.0 until set at completion.
    pub confidence: f64,
    pub quality_tier: QualityTier,
    /// Enclosing operation on the call stack at start time.
    pub parent_id: Option<Uuid>,
    /// Wall-clock duration, set at the terminal transition.
    pub duration_ms: Option<u64>,
    /// Set only when the operation failed.
    pub error_message: Option<String>,
    /// Append-only annotations.
    pub warnings: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProvenanceRecord {
    pub(crate) fn start(
        operation_type: &str,
        tool_id: &str,
        input_refs: Vec<String>,
        parameters: HashMap<String, serde_json::Value>,
        parent_id: Option<Uuid>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            operation_type: operation_type.to_string(),
            tool_id: tool_id.to_string(),
            input_refs,
            output_refs: Vec::new(),
            parameters,
            status: OperationStatus::Running,
            confidence: 1.0,
            quality_tier: QualityTier::High,
            parent_id,
            duration_ms: None,
            error_message: None,
            warnings: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Elapsed wall-clock milliseconds since creation, floored at zero
    /// to absorb clock adjustments.
    pub(crate) fn elapsed_ms(&self) -> u64 {
        (Utc::now() - self.created_at).num_milliseconds().max(0) as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_defaults() {
        let record = ProvenanceRecord::start(
            "entity_extraction",
            "spacy_ner",
            vec!["sqlite:chunk:c1".into()],
            HashMap::new(),
            None,
        );
        assert_eq!(record.status, OperationStatus::Running);
        assert_eq!(record.confidence, 1.0);
        assert!(record.output_refs.is_empty());
        assert!(record.duration_ms.is_none());
        assert!(record.error_message.is_none());
    }

    #[test]
    fn test_elapsed_is_non_negative() {
        let record =
            ProvenanceRecord::start("embedding", "openai", Vec::new(), HashMap::new(), None);
        assert!(record.elapsed_ms() < 10_000);
    }
}

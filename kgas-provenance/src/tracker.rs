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

//! Operation lifecycle tracking
//!
//! `start_operation` pushes onto an internal call stack, so nested
//! operations record their enclosing operation as parent. The active
//! map and stack are mutated under one mutex; for fully independent
//! call stacks, give each worker its own tracker over a shared store.

use crate::error::{ProvenanceError, Result};
use crate::lineage::{self, LineageDirection, LineageGraph};
use crate::record::{OperationStatus, ProvenanceRecord};
use crate::store::LineageStore;
use kgas_core::{QualityTier, TierThresholds};
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

/// Traversal depth for derived-confidence computation.
const DERIVED_CONFIDENCE_DEPTH: usize = 20;
/// Traversal depth for graph export.
const EXPORT_DEPTH: usize = 50;

struct TrackerState {
    active: HashMap<Uuid, ProvenanceRecord>,
    stack: Vec<Uuid>,
}

/// Call-stack-scoped provenance tracker; sole write path to the store.
pub struct ProvenanceTracker {
    store: Arc<dyn LineageStore>,
    state: Mutex<TrackerState>,
    tiers: TierThresholds,
}

impl ProvenanceTracker {
    pub fn new(store: Arc<dyn LineageStore>) -> Self {
        Self::with_tiers(store, TierThresholds::default())
    }

    pub fn with_tiers(store: Arc<dyn LineageStore>, tiers: TierThresholds) -> Self {
        Self {
            store,
            state: Mutex::new(TrackerState {
                active: HashMap::new(),
                stack: Vec::new(),
            }),
            tiers,
        }
    }

    /// Open an operation record. The current stack top becomes its
    /// parent, and the new id becomes the stack top.
    pub fn start_operation(
        &self,
        operation_type: &str,
        tool_id: &str,
        input_refs: Vec<String>,
        parameters: HashMap<String, serde_json::Value>,
    ) -> Result<Uuid> {
        let mut state = self.state.lock();
        let parent_id = state.stack.last().copied();
        let record =
            ProvenanceRecord::start(operation_type, tool_id, input_refs, parameters, parent_id);
        let id = record.id;

        self.store.save(&record)?;
        state.active.insert(id, record);
        state.stack.push(id);

        debug!(operation_type, tool_id, %id, ?parent_id, "operation started");
        Ok(id)
    }

    /// Close an operation successfully, recording its outputs and the
    /// confidence the tool reports for them.
    pub fn complete_operation(
        &self,
        operation_id: Uuid,
        output_refs: Vec<String>,
        metrics: Option<HashMap<String, serde_json::Value>>,
        confidence: f64,
    ) -> Result<ProvenanceRecord> {
        let mut state = self.state.lock();
        let mut record = state
            .active
            .remove(&operation_id)
            .ok_or(ProvenanceError::OperationNotFound(operation_id))?;

        record.output_refs = output_refs;
        record.confidence = confidence.clamp(0.0, 1.0);
        record.quality_tier = QualityTier::classify(record.confidence, &self.tiers);
        record.status = OperationStatus::Completed;
        record.duration_ms = Some(record.elapsed_ms());
        record.updated_at = chrono::Utc::now();
        if let Some(metrics) = metrics {
            record
                .parameters
                .insert("metrics".to_string(), serde_json::json!(metrics));
        }

        // Pop only if this operation is the current top; nested but
        // independently-tracked operations may complete out of order.
        if state.stack.last() == Some(&operation_id) {
            state.stack.pop();
        }

        self.store.update(&record)?;
        debug!(%operation_id, duration_ms = ?record.duration_ms, "operation completed");
        Ok(record)
    }

    /// Close an operation as failed. This is the channel through which
    /// tool failures are recorded; it does not itself raise for the
    /// underlying failure.
    pub fn fail_operation(
        &self,
        operation_id: Uuid,
        error_message: &str,
        partial_outputs: Option<Vec<String>>,
    ) -> Result<ProvenanceRecord> {
        let mut state = self.state.lock();
        let mut record = state
            .active
            .remove(&operation_id)
            .ok_or(ProvenanceError::OperationNotFound(operation_id))?;

        record.output_refs = partial_outputs.unwrap_or_default();
        record.confidence = 0.0;
        record.quality_tier = QualityTier::Low;
        record.status = OperationStatus::Failed;
        record.duration_ms = Some(record.elapsed_ms());
        record.error_message = Some(error_message.to_string());
        record
            .warnings
            .push(format!("operation failed: {error_message}"));
        record.updated_at = chrono::Utc::now();

        if state.stack.last() == Some(&operation_id) {
            state.stack.pop();
        }

        self.store.update(&record)?;
        warn!(%operation_id, error_message, "operation failed");
        Ok(record)
    }

    /// Walk the provenance graph from a reference. Missing lineage ends
    /// branches silently; results are oldest-first.
    pub fn get_lineage(
        &self,
        reference: &str,
        direction: LineageDirection,
        max_depth: usize,
    ) -> Result<Vec<ProvenanceRecord>> {
        lineage::traverse(self.store.as_ref(), reference, direction, max_depth)
    }

    /// Product of ancestor confidences. Unattributed data is
    /// provenance-neutral: no lineage means 1.0, not an error.
    pub fn calculate_derived_confidence(&self, reference: &str) -> Result<f64> {
        let ancestors = self.get_lineage(
            reference,
            LineageDirection::Backward,
            DERIVED_CONFIDENCE_DEPTH,
        )?;
        Ok(ancestors.iter().map(|r| r.confidence).product())
    }

    /// Operation ancestry by parent pointers, oldest first.
    pub fn get_operation_chain(&self, operation_id: Uuid) -> Result<Vec<ProvenanceRecord>> {
        let mut chain = Vec::new();
        let mut seen: HashSet<Uuid> = HashSet::new();
        let mut current = Some(operation_id);

        while let Some(id) = current {
            if !seen.insert(id) {
                break;
            }
            let Some(record) = self.store.get(id)? else {
                if chain.is_empty() {
                    return Err(ProvenanceError::UnknownOperation(operation_id));
                }
                break;
            };
            current = record.parent_id;
            chain.push(record);
        }

        chain.reverse();
        Ok(chain)
    }

    /// Backward lineage as a node/edge graph for visualization.
    pub fn export_lineage_graph(&self, reference: &str) -> Result<LineageGraph> {
        lineage::export_graph(self.store.as_ref(), reference, EXPORT_DEPTH)
    }

    /// Number of operations currently running under this tracker.
    pub fn active_operation_count(&self) -> usize {
        self.state.lock().active.len()
    }

    pub fn store(&self) -> &Arc<dyn LineageStore> {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryLineageStore;

    fn tracker() -> ProvenanceTracker {
        ProvenanceTracker::new(Arc::new(MemoryLineageStore::new()))
    }

    #[test]
    fn test_complete_lifecycle() {
        let tracker = tracker();
        let id = tracker
            .start_operation("entity_extraction", "tool_a", vec![], HashMap::new())
            .unwrap();
        assert_eq!(tracker.active_operation_count(), 1);

        let record = tracker
            .complete_operation(id, vec!["neo4j:entity:1".into()], None, 0.9)
            .unwrap();
        assert_eq!(record.status, OperationStatus::Completed);
        assert_eq!(record.confidence, 0.9);
        assert!(record.duration_ms.is_some());
        assert_eq!(tracker.active_operation_count(), 0);
    }

    #[test]
    fn test_double_completion_is_not_found() {
        let tracker = tracker();
        let id = tracker
            .start_operation("embedding", "tool_a", vec![], HashMap::new())
            .unwrap();
        tracker.complete_operation(id, vec![], None, 1.0).unwrap();

        let err = tracker.complete_operation(id, vec![], None, 1.0).unwrap_err();
        assert!(matches!(err, ProvenanceError::OperationNotFound(_)));
    }

    #[test]
    fn test_fail_operation_forces_low_confidence() {
        let tracker = tracker();
        let id = tracker
            .start_operation("entity_extraction", "tool_a", vec![], HashMap::new())
            .unwrap();
        let record = tracker
            .fail_operation(id, "upstream timeout", Some(vec!["sqlite:document:p1".into()]))
            .unwrap();

        assert_eq!(record.status, OperationStatus::Failed);
        assert_eq!(record.confidence, 0.0);
        assert_eq!(record.quality_tier, QualityTier::Low);
        assert_eq!(record.error_message.as_deref(), Some("upstream timeout"));
        assert!(record.warnings.iter().any(|w| w.contains("upstream timeout")));
        assert_eq!(record.output_refs, vec!["sqlite:document:p1".to_string()]);
    }

    #[test]
    fn test_nested_operations_record_parent() {
        let tracker = tracker();
        let outer = tracker
            .start_operation("document_processing", "pipeline", vec![], HashMap::new())
            .unwrap();
        let inner = tracker
            .start_operation("chunking", "chunker", vec![], HashMap::new())
            .unwrap();

        let chain = tracker.get_operation_chain(inner).unwrap();
        assert_eq!(chain.len(), 2);
        assert_eq!(chain[0].id, outer);
        assert_eq!(chain[1].id, inner);
        assert_eq!(chain[1].parent_id, Some(outer));

        tracker.complete_operation(inner, vec![], None, 1.0).unwrap();
        tracker.complete_operation(outer, vec![], None, 1.0).unwrap();
    }

    #[test]
    fn test_out_of_order_completion_keeps_stack_sane() {
        let tracker = tracker();
        let outer = tracker
            .start_operation("outer", "tool", vec![], HashMap::new())
            .unwrap();
        let inner = tracker
            .start_operation("inner", "tool", vec![], HashMap::new())
            .unwrap();

        // Completing the outer operation first must not pop the inner
        // id off the stack.
        tracker.complete_operation(outer, vec![], None, 1.0).unwrap();
        let next = tracker
            .start_operation("sibling", "tool", vec![], HashMap::new())
            .unwrap();
        let chain = tracker.get_operation_chain(next).unwrap();
        assert_eq!(chain[chain.len() - 2].id, inner);

        tracker.complete_operation(next, vec![], None, 1.0).unwrap();
        tracker.complete_operation(inner, vec![], None, 1.0).unwrap();
    }

    #[test]
    fn test_derived_confidence_no_lineage_is_neutral() {
        let tracker = tracker();
        assert_eq!(
            tracker.calculate_derived_confidence("sqlite:document:never").unwrap(),
            1.0
        );
    }

    #[test]
    fn test_derived_confidence_multiplies_ancestors() {
        let tracker = tracker();

        let extract = tracker
            .start_operation("extract", "toolA", vec![], HashMap::new())
            .unwrap();
        tracker
            .complete_operation(extract, vec!["doc:1".into()], None, 0.9)
            .unwrap();
        assert!((tracker.calculate_derived_confidence("doc:1").unwrap() - 0.9).abs() < 1e-12);

        let merge = tracker
            .start_operation("merge", "toolB", vec!["doc:1".into()], HashMap::new())
            .unwrap();
        tracker
            .complete_operation(merge, vec!["doc:2".into()], None, 0.8)
            .unwrap();
        assert!((tracker.calculate_derived_confidence("doc:2").unwrap() - 0.72).abs() < 1e-12);
    }

    #[test]
    fn test_lineage_terminates_on_cycle() {
        let tracker = tracker();

        let a = tracker
            .start_operation("transform", "tool", vec!["ref:x".into()], HashMap::new())
            .unwrap();
        tracker
            .complete_operation(a, vec!["ref:y".into()], None, 0.9)
            .unwrap();
        let b = tracker
            .start_operation("transform", "tool", vec!["ref:y".into()], HashMap::new())
            .unwrap();
        tracker
            .complete_operation(b, vec!["ref:x".into()], None, 0.9)
            .unwrap();

        let lineage = tracker
            .get_lineage("ref:y", LineageDirection::Backward, 10)
            .unwrap();
        assert_eq!(lineage.len(), 2);

        let forward = tracker
            .get_lineage("ref:x", LineageDirection::Forward, 10)
            .unwrap();
        assert_eq!(forward.len(), 2);
    }

    #[test]
    fn test_lineage_sorted_oldest_first() {
        let tracker = tracker();
        let first = tracker
            .start_operation("extract", "tool", vec![], HashMap::new())
            .unwrap();
        tracker
            .complete_operation(first, vec!["ref:a".into()], None, 1.0)
            .unwrap();
        let second = tracker
            .start_operation("merge", "tool", vec!["ref:a".into()], HashMap::new())
            .unwrap();
        tracker
            .complete_operation(second, vec!["ref:b".into()], None, 1.0)
            .unwrap();

        let lineage = tracker
            .get_lineage("ref:b", LineageDirection::Backward, 10)
            .unwrap();
        assert_eq!(lineage[0].id, first);
        assert_eq!(lineage[1].id, second);
    }

    #[test]
    fn test_export_graph_shape() {
        let tracker = tracker();
        let id = tracker
            .start_operation("extract", "tool", vec!["doc:1".into()], HashMap::new())
            .unwrap();
        tracker
            .complete_operation(id, vec!["entity:1".into()], None, 0.9)
            .unwrap();

        let graph = tracker.export_lineage_graph("entity:1").unwrap();
        assert_eq!(graph.root, "entity:1");
        assert_eq!(graph.nodes.len(), 1);
        assert_eq!(graph.edges.len(), 2);
        assert!(graph
            .edges
            .iter()
            .any(|e| e.kind == crate::lineage::DataFlowKind::Input && e.source == "doc:1"));
        assert!(graph
            .edges
            .iter()
            .any(|e| e.kind == crate::lineage::DataFlowKind::Output && e.target == "entity:1"));
    }

    #[test]
    fn test_operation_chain_unknown_id() {
        let tracker = tracker();
        let err = tracker.get_operation_chain(Uuid::new_v4()).unwrap_err();
        assert!(matches!(err, ProvenanceError::UnknownOperation(_)));
    }
}

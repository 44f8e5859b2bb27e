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

//! Lineage traversal over the provenance graph
//!
//! Depth-first walks with visited-set deduplication, so diamond-shaped
//! and even cyclic graphs terminate. A reference with no matching
//! records simply ends the branch; absence is not an error here.

use crate::error::Result;
use crate::record::ProvenanceRecord;
use crate::store::LineageStore;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::ProvenanceError;
use crate::record::OperationStatus;

/// Which way to walk the provenance graph from a seed reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineageDirection {
    /// Follow input_refs toward original sources.
    Backward,
    /// Follow output_refs toward derivatives.
    Forward,
}

impl fmt::Display for LineageDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LineageDirection::Backward => f.write_str("backward"),
            LineageDirection::Forward => f.write_str("forward"),
        }
    }
}

impl FromStr for LineageDirection {
    type Err = ProvenanceError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "backward" => Ok(LineageDirection::Backward),
            "forward" => Ok(LineageDirection::Forward),
            other => Err(ProvenanceError::InvalidDirection(other.to_string())),
        }
    }
}

/// Node in an exported lineage graph; one per operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineageNode {
    pub id: Uuid,
    pub operation_type: String,
    pub tool_id: String,
    pub status: OperationStatus,
    pub confidence: f64,
    pub created_at: DateTime<Utc>,
}

/// Typed data-flow arc between an artifact reference and an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataFlowKind {
    /// Artifact flows into the operation.
    Input,
    /// Operation produces the artifact.
    Output,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineageEdge {
    pub source: String,
    pub target: String,
    pub kind: DataFlowKind,
}

/// Materialized lineage for visualization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineageGraph {
    pub root: String,
    pub nodes: Vec<LineageNode>,
    pub edges: Vec<LineageEdge>,
}

/// Depth-first lineage walk. Results are sorted by creation time,
/// oldest first.
pub(crate) fn traverse(
    store: &dyn LineageStore,
    reference: &str,
    direction: LineageDirection,
    max_depth: usize,
) -> Result<Vec<ProvenanceRecord>> {
    let mut visited_refs: HashSet<String> = HashSet::new();
    let mut visited_records: HashSet<Uuid> = HashSet::new();
    let mut results: Vec<ProvenanceRecord> = Vec::new();
    let mut frontier: Vec<(String, usize)> = vec![(reference.to_string(), 0)];

    while let Some((current, depth)) = frontier.pop() {
        if !visited_refs.insert(current.clone()) {
            continue;
        }

        let records = match direction {
            LineageDirection::Backward => store.get_by_output(&current)?,
            LineageDirection::Forward => store.get_by_input(&current)?,
        };

        for record in records {
            if !visited_records.insert(record.id) {
                continue;
            }
            if depth < max_depth {
                let next_refs = match direction {
                    LineageDirection::Backward => &record.input_refs,
                    LineageDirection::Forward => &record.output_refs,
                };
                for next in next_refs {
                    frontier.push((next.clone(), depth + 1));
                }
            }
            results.push(record);
        }
    }

    results.sort_by_key(|r| r.created_at);
    Ok(results)
}

/// Materialize backward lineage as a node/edge graph.
pub(crate) fn export_graph(
    store: &dyn LineageStore,
    reference: &str,
    max_depth: usize,
) -> Result<LineageGraph> {
    let records = traverse(store, reference, LineageDirection::Backward, max_depth)?;

    let mut edges = Vec::new();
    let nodes = records
        .iter()
        .map(|record| {
            for input in &record.input_refs {
                edges.push(LineageEdge {
                    source: input.clone(),
                    target: record.id.to_string(),
                    kind: DataFlowKind::Input,
                });
            }
            for output in &record.output_refs {
                edges.push(LineageEdge {
                    source: record.id.to_string(),
                    target: output.clone(),
                    kind: DataFlowKind::Output,
                });
            }
            LineageNode {
                id: record.id,
                operation_type: record.operation_type.clone(),
                tool_id: record.tool_id.clone(),
                status: record.status,
                confidence: record.confidence,
                created_at: record.created_at,
            }
        })
        .collect();

    Ok(LineageGraph {
        root: reference.to_string(),
        nodes,
        edges,
    })
}

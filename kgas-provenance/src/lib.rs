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

//! KGAS Provenance
//!
//! Records a directed lineage graph of operations over artifacts and
//! derives confidence from ancestry.
//!
//! ## Architecture
//!
//! - **ProvenanceRecord**: one operation with inputs, outputs, status,
//!   and confidence
//! - **LineageStore**: durable storage abstraction, queryable by output
//!   and input reference; the tracker is its sole write path
//! - **ProvenanceTracker**: call-stack-scoped operation lifecycle plus
//!   lineage traversal and derived-confidence computation
//!
//! The tracker's active-operation map and call stack are mutated under a
//! single mutex, so `start`/`complete`/`fail` behave as critical sections.
//! Workers that want fully independent call stacks should each own a
//! tracker instance over a shared store.

pub mod error;
pub mod lineage;
pub mod record;
pub mod store;
pub mod tracker;

pub use error::{ProvenanceError, Result, StorageError};
pub use lineage::{DataFlowKind, LineageDirection, LineageEdge, LineageGraph, LineageNode};
pub use record::{OperationStatus, ProvenanceRecord};
pub use store::{LineageStore, MemoryLineageStore, QueryFilter};
pub use tracker::ProvenanceTracker;

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

//! Lineage storage abstraction
//!
//! A relational, document, or key-value backend all satisfy this
//! contract; only these access patterns are mandated. The in-memory
//! implementation backs tests and embedded use.
//!
//! Write-path discipline: `ProvenanceTracker` is the sole writer.
//! Nothing else should call `save`/`update`.

use crate::error::StorageError;
use crate::record::ProvenanceRecord;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use uuid::Uuid;

/// Optional filters for record queries.
#[derive(Debug, Clone, Default)]
pub struct QueryFilter {
    pub tool_id: Option<String>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
}

/// Durable key-value store of lineage records, queryable by output and
/// by input reference.
pub trait LineageStore: Send + Sync {
    /// Persist a newly created record.
    fn save(&self, record: &ProvenanceRecord) -> Result<(), StorageError>;

    /// Persist the terminal mutation of an existing record.
    fn update(&self, record: &ProvenanceRecord) -> Result<(), StorageError>;

    fn get(&self, id: Uuid) -> Result<Option<ProvenanceRecord>, StorageError>;

    /// Records whose output_refs include the given reference.
    fn get_by_output(&self, reference: &str) -> Result<Vec<ProvenanceRecord>, StorageError>;

    /// Records whose input_refs include the given reference.
    fn get_by_input(&self, reference: &str) -> Result<Vec<ProvenanceRecord>, StorageError>;

    fn query(&self, filter: &QueryFilter) -> Result<Vec<ProvenanceRecord>, StorageError>;
}

/// In-memory lineage store with reference indexes.
#[derive(Default)]
pub struct MemoryLineageStore {
    records: DashMap<Uuid, ProvenanceRecord>,
    by_output: DashMap<String, Vec<Uuid>>,
    by_input: DashMap<String, Vec<Uuid>>,
}

impl MemoryLineageStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn index(&self, record: &ProvenanceRecord) {
        for reference in &record.input_refs {
            let mut ids = self.by_input.entry(reference.clone()).or_default();
            if !ids.contains(&record.id) {
                ids.push(record.id);
            }
        }
        for reference in &record.output_refs {
            let mut ids = self.by_output.entry(reference.clone()).or_default();
            if !ids.contains(&record.id) {
                ids.push(record.id);
            }
        }
    }

    fn deindex(&self, record: &ProvenanceRecord) {
        for reference in &record.input_refs {
            if let Some(mut ids) = self.by_input.get_mut(reference) {
                ids.retain(|id| *id != record.id);
            }
        }
        for reference in &record.output_refs {
            if let Some(mut ids) = self.by_output.get_mut(reference) {
                ids.retain(|id| *id != record.id);
            }
        }
    }

    fn collect(&self, ids: Option<Vec<Uuid>>) -> Vec<ProvenanceRecord> {
        ids.unwrap_or_default()
            .into_iter()
            .filter_map(|id| self.records.get(&id).map(|r| r.clone()))
            .collect()
    }
}

impl LineageStore for MemoryLineageStore {
    fn save(&self, record: &ProvenanceRecord) -> Result<(), StorageError> {
        self.index(record);
        self.records.insert(record.id, record.clone());
        Ok(())
    }

    fn update(&self, record: &ProvenanceRecord) -> Result<(), StorageError> {
        if let Some(old) = self.records.get(&record.id).map(|r| r.clone()) {
            self.deindex(&old);
        }
        self.index(record);
        self.records.insert(record.id, record.clone());
        Ok(())
    }

    fn get(&self, id: Uuid) -> Result<Option<ProvenanceRecord>, StorageError> {
        Ok(self.records.get(&id).map(|r| r.clone()))
    }

    fn get_by_output(&self, reference: &str) -> Result<Vec<ProvenanceRecord>, StorageError> {
        Ok(self.collect(self.by_output.get(reference).map(|ids| ids.clone())))
    }

    fn get_by_input(&self, reference: &str) -> Result<Vec<ProvenanceRecord>, StorageError> {
        Ok(self.collect(self.by_input.get(reference).map(|ids| ids.clone())))
    }

    fn query(&self, filter: &QueryFilter) -> Result<Vec<ProvenanceRecord>, StorageError> {
        let mut matches: Vec<ProvenanceRecord> = self
            .records
            .iter()
            .filter(|entry| {
                let record = entry.value();
                if let Some(tool_id) = &filter.tool_id {
                    if &record.tool_id != tool_id {
                        return false;
                    }
                }
                if let Some(start) = filter.start_time {
                    if record.created_at < start {
                        return false;
                    }
                }
                if let Some(end) = filter.end_time {
                    if record.created_at > end {
                        return false;
                    }
                }
                true
            })
            .map(|entry| entry.value().clone())
            .collect();
        matches.sort_by_key(|r| r.created_at);
        Ok(matches)
    }
}

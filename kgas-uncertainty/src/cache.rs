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

//! Caching layer for LLM-elicited assessments
//!
//! Initial assessments are deterministic for a fixed (claim, domain,
//! evidence) triple, so repeated pipeline runs can skip the network
//! call. Bounded capacity with TTL eviction.

use kgas_core::{ConfidenceScore, Evidence};
use moka::sync::Cache;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Default maximum number of cached assessments.
const DEFAULT_MAX_CAPACITY: u64 = 10_000;

/// Cache for initial confidence assessments.
pub struct AssessmentCache {
    cache: Cache<u64, ConfidenceScore>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl AssessmentCache {
    pub fn new(ttl_secs: u64) -> Self {
        let cache = Cache::builder()
            .max_capacity(DEFAULT_MAX_CAPACITY)
            .time_to_live(Duration::from_secs(ttl_secs))
            .build();
        Self {
            cache,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Cache key over the claim, domain, and the identity-relevant
    /// evidence fields.
    pub fn key(claim: &str, domain: &str, evidence: &[Evidence]) -> u64 {
        let mut hasher = DefaultHasher::new();
        claim.hash(&mut hasher);
        domain.hash(&mut hasher);
        for item in evidence {
            item.content.hash(&mut hasher);
            item.source.hash(&mut hasher);
            item.reliability.to_bits().hash(&mut hasher);
        }
        hasher.finish()
    }

    pub fn get(&self, key: u64) -> Option<ConfidenceScore> {
        match self.cache.get(&key) {
            Some(score) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Some(score)
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    pub fn insert(&self, key: u64, score: ConfidenceScore) {
        self.cache.insert(key, score);
    }

    pub fn invalidate_all(&self) {
        self.cache.invalidate_all();
    }

    pub fn stats(&self) -> CacheStats {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let total = hits + misses;
        CacheStats {
            hits,
            misses,
            hit_rate: if total > 0 {
                hits as f64 / total as f64
            } else {
                0.0
            },
            entry_count: self.cache.entry_count(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub hit_rate: f64,
    pub entry_count: u64,
}

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

//! Evidence records consumed by belief updates
//!
//! Evidence is immutable once constructed; aggregation engines read it,
//! they never annotate it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single observation offered in support of (or against) a claim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evidence {
    /// Free-text description of the observation.
    pub content: String,
    /// Where the observation came from (document id, tool id, URL).
    pub source: String,
    /// Category of source (e.g. "primary_document", "llm_extraction").
    pub source_type: String,
    /// Trust weight in [0,1] applied during aggregation.
    pub reliability: f64,
    pub timestamp: DateTime<Utc>,
}

impl Evidence {
    pub fn new(
        content: impl Into<String>,
        source: impl Into<String>,
        source_type: impl Into<String>,
        reliability: f64,
    ) -> Self {
        Self {
            content: content.into(),
            source: source.into(),
            source_type: source_type.into(),
            reliability: reliability.clamp(0.0, 1.0),
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reliability_clamped_at_construction() {
        let ev = Evidence::new("observed X", "doc:1", "primary_document", 1.7);
        assert_eq!(ev.reliability, 1.0);

        let ev = Evidence::new("observed Y", "doc:2", "primary_document", -0.2);
        assert_eq!(ev.reliability, 0.0);
    }
}

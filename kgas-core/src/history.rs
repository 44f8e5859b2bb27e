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

//! Typed, append-only update history for confidence scores
//!
//! Every mutation of a confidence value is recorded as a structured log
//! entry so the audit trail stays machine-checkable. The action set is a
//! closed tagged union; free-form detail maps are not accepted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One entry in a confidence score's update history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateLogEntry {
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub action: UpdateAction,
}

impl UpdateLogEntry {
    pub fn now(action: UpdateAction) -> Self {
        Self {
            timestamp: Utc::now(),
            action,
        }
    }
}

/// The closed set of actions that may mutate a confidence score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum UpdateAction {
    /// First assessment of a claim, LLM-elicited or defaulted.
    InitialAssessment {
        domain: String,
        /// True when the LLM call failed and the documented conservative
        /// default was applied instead.
        fallback: bool,
    },
    /// Formal belief update from a batch of weighted evidence.
    BayesianUpdate {
        prior: f64,
        posterior: f64,
        evidence_count: usize,
    },
    /// Confidence carried across a modality boundary.
    CrossModalTranslation {
        source_modality: String,
        target_modality: String,
        value_factor: f64,
        fallback: bool,
    },
    /// Sub-dimension recomputation driven by contextual evidence quality.
    ContextualEvidenceUpdate {
        evidence_count: usize,
        mean_quality: f64,
    },
}

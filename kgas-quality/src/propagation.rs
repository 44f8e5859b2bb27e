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

//! Quality propagation for derived artifacts
//!
//! A derived artifact cannot be more trustworthy than its weakest
//! input, so composition starts from the minimum input quality. The
//! operation-type factor and degradation flags then reduce it further.

use crate::assessor::{AssessmentMethod, QualityAssessor};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Confidence for a to-be-created artifact plus the penalties applied.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropagationOutcome {
    pub confidence: f64,
    pub warnings: Vec<String>,
}

impl QualityAssessor {
    /// Compute the confidence of a new artifact derived from
    /// `input_refs` by an operation of `operation_type`.
    pub fn propagate_quality(
        &self,
        input_refs: &[String],
        operation_type: &str,
        parameters: &HashMap<String, serde_json::Value>,
    ) -> PropagationOutcome {
        let config = self.config();
        let mut warnings = Vec::new();

        // Inputs are scored with the conservative minimum method; the
        // propagated base is then the weakest of those.
        let qualities: Vec<f64> = input_refs
            .iter()
            .map(|r| self.assess_quality(r, AssessmentMethod::Minimum).confidence)
            .collect();

        let base = match qualities.iter().cloned().reduce(f64::min) {
            Some(min) => min,
            None => {
                warnings.push("no inputs: derived artifact treated as provenance-neutral".into());
                1.0
            }
        };

        let factor = config
            .operation_factors
            .get(operation_type)
            .copied()
            .unwrap_or(config.default_operation_factor);
        let mut confidence = base * factor;

        if flag_set(parameters, "partial_results") {
            confidence *= config.partial_results_factor;
            warnings.push("operation reported partial results".into());
        }
        if flag_set(parameters, "multiple_candidates") {
            confidence *= config.multiple_candidates_factor;
            warnings.push("operation had multiple candidate outputs".into());
        }

        if qualities.len() >= 2 {
            let deviation = population_std_dev(&qualities);
            if deviation > config.variance_threshold {
                confidence *= config.variance_penalty_factor;
                warnings.push(format!(
                    "input qualities disagree (std dev {deviation:.3} > {:.3})",
                    config.variance_threshold
                ));
            }
        }

        PropagationOutcome {
            confidence: confidence.clamp(0.0, 1.0),
            warnings,
        }
    }
}

fn flag_set(parameters: &HashMap<String, serde_json::Value>, key: &str) -> bool {
    parameters
        .get(key)
        .and_then(|v| v.as_bool())
        .unwrap_or(false)
}

fn population_std_dev(values: &[f64]) -> f64 {
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    variance.sqrt()
}

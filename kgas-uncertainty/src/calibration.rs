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

//! Cross-calibration of paired confidence estimates
//!
//! Given an LLM-contextual estimate and a formally Bayesian estimate
//! for the same claim, both methods inform each other: each iteration
//! pulls each estimate toward the other at a conservative rate, with
//! pull strength weighted by how contextual or statistical the
//! evidence text reads. Neither estimate overrides the other.

use kgas_core::CalibrationConfig;
use serde::{Deserialize, Serialize};

/// Language markers suggesting contextual, qualitative reasoning.
const CONTEXTUAL_MARKERS: &[&str] = &[
    "context",
    "suggests",
    "appears",
    "likely",
    "qualitative",
    "narrative",
    "interprets",
    "nuance",
    "perspective",
    "anecdotal",
];

/// Language markers suggesting statistical, quantitative reasoning.
const STATISTICAL_MARKERS: &[&str] = &[
    "probability",
    "sample",
    "variance",
    "correlation",
    "p-value",
    "distribution",
    "statistically",
    "significance",
    "frequency",
    "confidence interval",
];

/// Outcome of one calibration run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalibrationResult {
    pub llm_initial: f64,
    pub bayesian_initial: f64,
    pub llm_final: f64,
    pub bayesian_final: f64,
    pub iterations: u32,
    pub converged: bool,
    /// True when the iteration limit was reached and both estimates
    /// collapsed to their harmonic mean.
    pub forced_compromise: bool,
    /// Agreement between the final estimates, blended with proximity
    /// to ground truth when available.
    pub mutual_consistency: f64,
}

/// Iterative mutual-adjustment protocol.
#[derive(Debug, Clone, Default)]
pub struct CrossCalibration {
    config: CalibrationConfig,
}

impl CrossCalibration {
    pub fn new(config: CalibrationConfig) -> Self {
        Self { config }
    }

    /// Reconcile an LLM-contextual estimate with a Bayesian estimate.
    ///
    /// `evidence_text` weights the adjustment: contextual language
    /// strengthens the LLM estimate's pull on the Bayesian one, and
    /// statistical language the reverse.
    pub fn calibrate(
        &self,
        llm_estimate: f64,
        bayesian_estimate: f64,
        evidence_text: &str,
        ground_truth: Option<f64>,
    ) -> CalibrationResult {
        let config = &self.config;
        let mut llm = llm_estimate.clamp(config.floor, config.ceiling);
        let mut bayesian = bayesian_estimate.clamp(config.floor, config.ceiling);
        let llm_initial = llm;
        let bayesian_initial = bayesian;

        // Both sides always pull at least half strength; marker density
        // adds the rest.
        let contextual_pull = 0.5 + 0.5 * marker_density(evidence_text, CONTEXTUAL_MARKERS);
        let statistical_pull = 0.5 + 0.5 * marker_density(evidence_text, STATISTICAL_MARKERS);

        let mut iterations = 0;
        let mut converged = (llm - bayesian).abs() <= config.convergence_threshold;

        while !converged && iterations < config.max_iterations {
            // Both adjustments apply simultaneously from the same
            // snapshot of the pair.
            let next_llm = llm + config.adjustment_rate * statistical_pull * (bayesian - llm);
            let next_bayesian =
                bayesian + config.adjustment_rate * contextual_pull * (llm - bayesian);

            llm = next_llm.clamp(config.floor, config.ceiling);
            bayesian = next_bayesian.clamp(config.floor, config.ceiling);
            iterations += 1;
            converged = (llm - bayesian).abs() <= config.convergence_threshold;
        }

        let forced_compromise = !converged;
        if forced_compromise {
            let compromise = harmonic_mean(llm, bayesian).clamp(config.floor, config.ceiling);
            llm = compromise;
            bayesian = compromise;
        }

        let agreement = 1.0 - (llm - bayesian).abs();
        let mutual_consistency = match ground_truth {
            Some(truth) => {
                let proximity = 1.0 - ((llm - truth).abs() + (bayesian - truth).abs()) / 2.0;
                config.agreement_weight * agreement + config.truth_weight * proximity.max(0.0)
            }
            None => agreement,
        };

        CalibrationResult {
            llm_initial,
            bayesian_initial,
            llm_final: llm,
            bayesian_final: bayesian,
            iterations,
            converged,
            forced_compromise,
            mutual_consistency,
        }
    }
}

/// Fraction of marker hits per word, scaled into [0,1].
fn marker_density(text: &str, markers: &[&str]) -> f64 {
    let lowered = text.to_lowercase();
    let words = lowered.split_whitespace().count();
    if words == 0 {
        return 0.0;
    }
    let hits = markers.iter().filter(|m| lowered.contains(*m)).count();
    ((hits * 10) as f64 / words as f64).min(1.0)
}

fn harmonic_mean(a: f64, b: f64) -> f64 {
    if a + b == 0.0 {
        return 0.0;
    }
    2.0 * a * b / (a + b)
}

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

//! Bayesian evidence aggregation
//!
//! Belief is a probability; each evidence item contributes a log-odds
//! term weighted by reliability and diagnosticity. Contributions are
//! summed, so aggregation is commutative: any permutation of the same
//! batch yields the same posterior.
//!
//! Low-reliability evidence is capped: an item may never swing the
//! belief by more than its reliability fraction of the maximum swing.

use kgas_core::{Evidence, UncertaintyConfig};
use serde::{Deserialize, Serialize};

/// Posterior probabilities are kept strictly inside (0,1) so repeated
/// updates never reach hard certainty.
const BELIEF_FLOOR: f64 = 0.001;
const BELIEF_CEILING: f64 = 0.999;

/// One evidence item with its assessed contribution to a claim.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvidenceAssessment {
    pub evidence: Evidence,
    /// Signed support for the claim in [-1,1]; negative contradicts.
    pub support: f64,
    /// Assessed quality of the evidence itself, in [0,1].
    pub quality: f64,
    /// How sharply this evidence discriminates between competing
    /// hypotheses, in [0,1]. Defaults to 0.5 when no hypothesis matrix
    /// is available.
    pub diagnosticity: f64,
}

impl EvidenceAssessment {
    pub fn new(evidence: Evidence, support: f64, quality: f64) -> Self {
        Self {
            evidence,
            support: support.clamp(-1.0, 1.0),
            quality: quality.clamp(0.0, 1.0),
            diagnosticity: 0.5,
        }
    }

    pub fn with_diagnosticity(mut self, diagnosticity: f64) -> Self {
        self.diagnosticity = diagnosticity.clamp(0.0, 1.0);
        self
    }
}

/// Outcome of aggregating one evidence batch into a belief.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BeliefUpdate {
    pub prior: f64,
    pub posterior: f64,
    /// Per-item belief change, each computed independently against the
    /// prior so the batch stays order-independent.
    pub belief_changes: Vec<f64>,
    pub mean_quality: f64,
    /// Population variance of belief-change magnitudes; low variance
    /// means the batch moved the belief coherently.
    pub change_variance: f64,
}

/// Log-odds belief updater.
#[derive(Debug, Clone, Default)]
pub struct BayesianUpdateEngine {
    config: UncertaintyConfig,
}

impl BayesianUpdateEngine {
    pub fn new(config: UncertaintyConfig) -> Self {
        Self { config }
    }

    /// Combine a prior belief with a batch of assessed evidence.
    pub fn aggregate(&self, prior: f64, assessments: &[EvidenceAssessment]) -> BeliefUpdate {
        let prior = prior.clamp(BELIEF_FLOOR, BELIEF_CEILING);

        if assessments.is_empty() {
            return BeliefUpdate {
                prior,
                posterior: prior,
                belief_changes: Vec::new(),
                mean_quality: 0.0,
                change_variance: 0.0,
            };
        }

        let contributions: Vec<f64> = assessments
            .iter()
            .map(|a| self.contribution(a))
            .collect();

        let prior_log_odds = logit(prior);
        let posterior = sigmoid(prior_log_odds + contributions.iter().sum::<f64>())
            .clamp(BELIEF_FLOOR, BELIEF_CEILING);

        let belief_changes: Vec<f64> = contributions
            .iter()
            .map(|c| sigmoid(prior_log_odds + c) - prior)
            .collect();

        let magnitudes: Vec<f64> = belief_changes.iter().map(|c| c.abs()).collect();
        let mean_magnitude = magnitudes.iter().sum::<f64>() / magnitudes.len() as f64;
        let change_variance = magnitudes
            .iter()
            .map(|m| (m - mean_magnitude).powi(2))
            .sum::<f64>()
            / magnitudes.len() as f64;

        let mean_quality =
            assessments.iter().map(|a| a.quality).sum::<f64>() / assessments.len() as f64;

        BeliefUpdate {
            prior,
            posterior,
            belief_changes,
            mean_quality,
            change_variance,
        }
    }

    /// Log-odds contribution of one assessed evidence item.
    ///
    /// Scaled by support, reliability, and diagnosticity; capped so that
    /// reliability r can never move the belief more than r times the
    /// maximum swing.
    fn contribution(&self, assessment: &EvidenceAssessment) -> f64 {
        let reliability = assessment.evidence.reliability;
        let raw = assessment.support
            * reliability
            * (0.5 + 0.5 * assessment.diagnosticity)
            * self.config.log_odds_scale;
        let cap = reliability * self.config.max_swing_per_reliability;
        raw.clamp(-cap, cap)
    }
}

fn logit(p: f64) -> f64 {
    (p / (1.0 - p)).ln()
}

fn sigmoid(log_odds: f64) -> f64 {
    1.0 / (1.0 + (-log_odds).exp())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn assessment(support: f64, reliability: f64) -> EvidenceAssessment {
        EvidenceAssessment::new(
            Evidence::new("observation", "doc:1", "primary_document", reliability),
            support,
            0.8,
        )
    }

    #[test]
    fn test_strong_support_raises_belief() {
        let engine = BayesianUpdateEngine::default();
        let update = engine.aggregate(0.5, &[assessment(1.0, 0.9)]);
        assert!(update.posterior > 0.5);
        assert!(update.posterior < 1.0);
    }

    #[test]
    fn test_contradiction_lowers_belief() {
        let engine = BayesianUpdateEngine::default();
        let update = engine.aggregate(0.5, &[assessment(-1.0, 0.9)]);
        assert!(update.posterior < 0.5);
        assert!(update.posterior > 0.0);
    }

    #[test]
    fn test_empty_batch_is_identity() {
        let engine = BayesianUpdateEngine::default();
        let update = engine.aggregate(0.7, &[]);
        assert_eq!(update.posterior, 0.7);
        assert!(update.belief_changes.is_empty());
    }

    #[test]
    fn test_posterior_never_reaches_certainty() {
        let engine = BayesianUpdateEngine::default();
        let batch: Vec<EvidenceAssessment> =
            (0..50).map(|_| assessment(1.0, 1.0)).collect();
        let update = engine.aggregate(0.9, &batch);
        assert!(update.posterior < 1.0);
        assert!(update.posterior <= 0.999);
    }

    #[test]
    fn test_unreliable_evidence_barely_moves_belief() {
        let engine = BayesianUpdateEngine::default();
        let weak = engine.aggregate(0.5, &[assessment(1.0, 0.05)]);
        let strong = engine.aggregate(0.5, &[assessment(1.0, 0.9)]);
        assert!(weak.posterior - 0.5 < strong.posterior - 0.5);
        // Swing bounded by the reliability fraction of the maximum.
        let max_possible = sigmoid(logit(0.5) + 0.05 * 3.0) - 0.5;
        assert!(weak.posterior - 0.5 <= max_possible + 1e-12);
    }

    #[test]
    fn test_coherent_batch_has_low_change_variance() {
        let engine = BayesianUpdateEngine::default();
        let coherent = engine.aggregate(
            0.5,
            &[assessment(0.8, 0.9), assessment(0.8, 0.9), assessment(0.8, 0.9)],
        );
        let mixed = engine.aggregate(
            0.5,
            &[assessment(1.0, 0.9), assessment(-1.0, 0.9), assessment(0.1, 0.2)],
        );
        assert!(coherent.change_variance < mixed.change_variance);
    }

    proptest! {
        #[test]
        fn prop_aggregation_is_order_independent(
            prior in 0.05f64..=0.95,
            supports in proptest::collection::vec(-1.0f64..=1.0, 1..8),
            reliabilities in proptest::collection::vec(0.0f64..=1.0, 1..8),
        ) {
            let batch: Vec<EvidenceAssessment> = supports
                .iter()
                .zip(reliabilities.iter().cycle())
                .map(|(&s, &r)| assessment(s, r))
                .collect();

            let engine = BayesianUpdateEngine::default();
            let forward = engine.aggregate(prior, &batch);

            let mut reversed = batch.clone();
            reversed.reverse();
            let backward = engine.aggregate(prior, &reversed);

            prop_assert!((forward.posterior - backward.posterior).abs() < 1e-9);
        }

        #[test]
        fn prop_posterior_stays_in_open_interval(
            prior in 0.0f64..=1.0,
            supports in proptest::collection::vec(-1.0f64..=1.0, 0..10),
        ) {
            let batch: Vec<EvidenceAssessment> =
                supports.iter().map(|&s| assessment(s, 1.0)).collect();
            let engine = BayesianUpdateEngine::default();
            let update = engine.aggregate(prior, &batch);
            prop_assert!(update.posterior > 0.0);
            prop_assert!(update.posterior < 1.0);
        }
    }
}

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

//! Confidence score value object
//!
//! A `ConfidenceScore` carries a primary scalar, four CERQual-style
//! sub-dimensions, and meta-uncertainty fields. Published scores are
//! never mutated: every update produces a new score that carries forward
//! the creation timestamp and an extended history, so concurrent readers
//! never observe a partially updated value.

use crate::history::{UpdateAction, UpdateLogEntry};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Floor of the overall confidence range. Never returning exactly 0
/// keeps downstream lineage multiplication non-degenerate.
pub const OVERALL_FLOOR: f64 = 0.01;
/// Ceiling of the overall confidence range.
pub const OVERALL_CEILING: f64 = 0.99;

/// Weights for combining sub-dimensions and uncertainty penalties.
///
/// The defaults follow the CERQual literature but are defaults only;
/// deployments tune them through [`crate::config::UncertaintyConfig`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfidenceWeights {
    pub methodological_quality: f64,
    pub relevance: f64,
    pub coherence: f64,
    pub adequacy: f64,
    /// Weight of (1 - estimation_uncertainty) in the penalty term.
    pub estimation: f64,
    /// Weight of the temporal decay factor in the penalty term.
    pub temporal: f64,
    /// Weight of cross-modal consistency in the penalty term.
    pub cross_modal: f64,
}

impl Default for ConfidenceWeights {
    fn default() -> Self {
        Self {
            methodological_quality: 0.3,
            relevance: 0.25,
            coherence: 0.25,
            adequacy: 0.2,
            estimation: 0.7,
            temporal: 0.2,
            cross_modal: 0.1,
        }
    }
}

/// A confidence estimate for one claim or artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceScore {
    /// Primary scalar in [0,1].
    pub value: f64,

    // CERQual sub-dimensions, each in [0,1].
    pub methodological_quality: f64,
    pub relevance: f64,
    pub coherence: f64,
    pub adequacy: f64,

    /// How uncertain the estimate itself is; higher means less certain.
    pub estimation_uncertainty: f64,
    /// 1.0 means no decay since assessment.
    pub temporal_decay_factor: f64,
    /// Agreement of this estimate across modality boundaries.
    pub cross_modal_consistency: f64,

    /// Total evidence items that have contributed to this score.
    pub evidence_count: u32,
    /// Append-only audit trail; copied forward on every update.
    pub update_history: Vec<UpdateLogEntry>,

    pub domain: String,
    pub confidence_type: String,

    pub creation_timestamp: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
}

impl ConfidenceScore {
    /// Create a fresh score with neutral sub-dimensions.
    pub fn new(value: f64, domain: impl Into<String>, confidence_type: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            value: value.clamp(0.0, 1.0),
            methodological_quality: 0.5,
            relevance: 0.5,
            coherence: 0.5,
            adequacy: 0.5,
            estimation_uncertainty: 0.5,
            temporal_decay_factor: 1.0,
            cross_modal_consistency: 1.0,
            evidence_count: 0,
            update_history: Vec::new(),
            domain: domain.into(),
            confidence_type: confidence_type.into(),
            creation_timestamp: now,
            last_updated: now,
        }
    }

    /// Overall confidence with the default weights.
    pub fn overall(&self) -> f64 {
        self.overall_with(&ConfidenceWeights::default())
    }

    /// Overall confidence: the primary value scaled by the weighted
    /// sub-dimension sum, then by the uncertainty penalty term.
    ///
    /// Always lands in [[`OVERALL_FLOOR`], [`OVERALL_CEILING`]] and is
    /// monotone non-decreasing in `value` for fixed other fields.
    pub fn overall_with(&self, weights: &ConfidenceWeights) -> f64 {
        let dimension_sum = weights.methodological_quality
            + weights.relevance
            + weights.coherence
            + weights.adequacy;
        let dimensions = (self.methodological_quality * weights.methodological_quality
            + self.relevance * weights.relevance
            + self.coherence * weights.coherence
            + self.adequacy * weights.adequacy)
            / dimension_sum.max(f64::EPSILON);

        let penalty_sum = weights.estimation + weights.temporal + weights.cross_modal;
        let penalty = ((1.0 - self.estimation_uncertainty) * weights.estimation
            + self.temporal_decay_factor * weights.temporal
            + self.cross_modal_consistency * weights.cross_modal)
            / penalty_sum.max(f64::EPSILON);

        (self.value * dimensions * penalty).clamp(OVERALL_FLOOR, OVERALL_CEILING)
    }

    /// Derive an updated copy: same creation timestamp, extended history,
    /// fresh `last_updated`. The receiver is left untouched for readers.
    pub fn derived(&self, action: UpdateAction) -> Self {
        let mut next = self.clone();
        next.update_history.push(UpdateLogEntry::now(action));
        next.last_updated = Utc::now();
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn sample_score() -> ConfidenceScore {
        let mut score = ConfidenceScore::new(0.8, "medical", "claim");
        score.methodological_quality = 0.7;
        score.relevance = 0.9;
        score.coherence = 0.6;
        score.adequacy = 0.5;
        score.estimation_uncertainty = 0.3;
        score
    }

    #[test]
    fn test_overall_within_bounds() {
        let score = sample_score();
        let overall = score.overall();
        assert!(overall >= OVERALL_FLOOR && overall <= OVERALL_CEILING);
    }

    #[test]
    fn test_overall_never_exactly_zero() {
        let mut score = ConfidenceScore::new(0.0, "test", "claim");
        score.methodological_quality = 0.0;
        score.relevance = 0.0;
        score.coherence = 0.0;
        score.adequacy = 0.0;
        score.estimation_uncertainty = 1.0;
        score.temporal_decay_factor = 0.0;
        score.cross_modal_consistency = 0.0;
        assert_eq!(score.overall(), OVERALL_FLOOR);
    }

    #[test]
    fn test_overall_never_exactly_one() {
        let mut score = ConfidenceScore::new(1.0, "test", "claim");
        score.methodological_quality = 1.0;
        score.relevance = 1.0;
        score.coherence = 1.0;
        score.adequacy = 1.0;
        score.estimation_uncertainty = 0.0;
        assert_eq!(score.overall(), OVERALL_CEILING);
    }

    #[test]
    fn test_derived_preserves_creation_and_receiver() {
        let score = sample_score();
        let created = score.creation_timestamp;
        let next = score.derived(UpdateAction::ContextualEvidenceUpdate {
            evidence_count: 2,
            mean_quality: 0.7,
        });

        assert_eq!(next.creation_timestamp, created);
        assert_eq!(next.update_history.len(), 1);
        // Receiver stays publishable to other readers.
        assert!(score.update_history.is_empty());
    }

    proptest! {
        #[test]
        fn prop_overall_always_in_bounds(
            value in 0.0f64..=1.0,
            mq in 0.0f64..=1.0,
            rel in 0.0f64..=1.0,
            coh in 0.0f64..=1.0,
            adq in 0.0f64..=1.0,
            unc in 0.0f64..=1.0,
            decay in 0.0f64..=1.0,
            cm in 0.0f64..=1.0,
        ) {
            let mut score = ConfidenceScore::new(value, "prop", "claim");
            score.methodological_quality = mq;
            score.relevance = rel;
            score.coherence = coh;
            score.adequacy = adq;
            score.estimation_uncertainty = unc;
            score.temporal_decay_factor = decay;
            score.cross_modal_consistency = cm;

            let overall = score.overall();
            prop_assert!(overall >= OVERALL_FLOOR);
            prop_assert!(overall <= OVERALL_CEILING);
        }

        #[test]
        fn prop_overall_monotone_in_value(
            lo in 0.0f64..=1.0,
            hi in 0.0f64..=1.0,
            mq in 0.0f64..=1.0,
            unc in 0.0f64..=1.0,
        ) {
            let (lo, hi) = if lo <= hi { (lo, hi) } else { (hi, lo) };
            let mut a = ConfidenceScore::new(lo, "prop", "claim");
            a.methodological_quality = mq;
            a.estimation_uncertainty = unc;
            let mut b = a.clone();
            b.value = hi;

            prop_assert!(a.overall() <= b.overall() + 1e-12);
        }
    }
}

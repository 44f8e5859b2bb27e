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

//! Analysis of Competing Hypotheses
//!
//! Evidence is rated against every hypothesis at insertion. Evidence
//! that is consistent with all hypotheses equally is not diagnostic;
//! evidence that discriminates sharply carries a diagnosticity bonus in
//! scoring. Evaluation is O(hypotheses x evidence) and comfortably
//! handles matrices of 50 x 100.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

/// Posterior clamp bounds; hypothesis probabilities never reach hard
/// certainty.
const POSTERIOR_FLOOR: f64 = 0.001;
const POSTERIOR_CEILING: f64 = 0.999;

/// Weight of the prior in a hypothesis's total score.
const PRIOR_WEIGHT: f64 = 0.2;
/// Weight of supporting-evidence diagnosticity in the total score.
const DIAGNOSTICITY_BONUS: f64 = 0.5;
/// Log-odds step per unit of rating x reliability.
const POSTERIOR_STEP: f64 = 0.5;
/// Reliability perturbation applied during sensitivity analysis.
const SENSITIVITY_PERTURBATION: f64 = 0.5;
/// Posterior shift above which an evidence item is flagged critical.
const CRITICAL_SHIFT: f64 = 0.1;

/// A candidate explanation under analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hypothesis {
    pub name: String,
    pub description: String,
    /// Initial probability before any evidence.
    pub prior: f64,
    /// What this hypothesis predicts, keyed by observable.
    pub predictions: HashMap<String, String>,
    /// Assumptions the hypothesis rests on.
    pub assumptions: Vec<String>,
}

impl Hypothesis {
    pub fn new(name: impl Into<String>, description: impl Into<String>, prior: f64) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            prior: prior.clamp(0.0, 1.0),
            predictions: HashMap::new(),
            assumptions: Vec::new(),
        }
    }

    pub fn predicts(mut self, observable: impl Into<String>, outcome: impl Into<String>) -> Self {
        self.predictions.insert(observable.into(), outcome.into());
        self
    }

    pub fn assumes(mut self, assumption: impl Into<String>) -> Self {
        self.assumptions.push(assumption.into());
        self
    }
}

/// An evidence item in the hypothesis matrix.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AchEvidence {
    pub name: String,
    pub description: String,
    /// Observed outcomes, keyed by observable.
    pub observations: HashMap<String, String>,
    /// Assumptions this evidence calls into question.
    pub challenges: Vec<String>,
    pub reliability: f64,
    pub relevance: f64,
}

impl AchEvidence {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            observations: HashMap::new(),
            challenges: Vec::new(),
            reliability: 1.0,
            relevance: 1.0,
        }
    }

    pub fn observes(mut self, observable: impl Into<String>, outcome: impl Into<String>) -> Self {
        self.observations.insert(observable.into(), outcome.into());
        self
    }

    pub fn challenges(mut self, assumption: impl Into<String>) -> Self {
        self.challenges.push(assumption.into());
        self
    }

    pub fn with_reliability(mut self, reliability: f64) -> Self {
        self.reliability = reliability.clamp(0.0, 1.0);
        self
    }

    pub fn with_relevance(mut self, relevance: f64) -> Self {
        self.relevance = relevance.clamp(0.0, 1.0);
        self
    }
}

/// Evaluation output for one hypothesis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HypothesisEvaluation {
    pub name: String,
    pub total_score: f64,
    pub posterior: f64,
    pub supporting_evidence: Vec<String>,
    pub contradicting_evidence: Vec<String>,
}

/// Sensitivity analysis output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensitivityReport {
    /// Evidence whose reliability perturbation shifts any posterior by
    /// more than the critical threshold.
    pub critical_evidence: Vec<String>,
    /// Largest posterior shift observed per evidence item.
    pub max_shifts: HashMap<String, f64>,
}

#[derive(Debug, Clone)]
struct EvidenceState {
    evidence: AchEvidence,
    /// Signed consistency rating against each hypothesis, by name.
    ratings: HashMap<String, f64>,
    diagnosticity: f64,
}

/// The hypothesis matrix.
#[derive(Debug, Default)]
pub struct AchEngine {
    hypotheses: Vec<Hypothesis>,
    evidence: Vec<EvidenceState>,
}

impl AchEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_hypothesis(&mut self, hypothesis: Hypothesis) {
        // Ratings for existing evidence must cover the new hypothesis.
        for state in &mut self.evidence {
            let rating = rate_consistency(&state.evidence, &hypothesis);
            state.ratings.insert(hypothesis.name.clone(), rating);
        }
        self.hypotheses.push(hypothesis);
        for state in &mut self.evidence {
            state.diagnosticity = diagnosticity(&state.ratings);
        }
    }

    /// Insert evidence, rating it against every hypothesis (O(H)).
    pub fn add_evidence(&mut self, evidence: AchEvidence) {
        let ratings: HashMap<String, f64> = self
            .hypotheses
            .iter()
            .map(|h| (h.name.clone(), rate_consistency(&evidence, h)))
            .collect();
        let diag = diagnosticity(&ratings);
        debug!(name = %evidence.name, diagnosticity = diag, "evidence added");
        self.evidence.push(EvidenceState {
            evidence,
            ratings,
            diagnosticity: diag,
        });
    }

    pub fn diagnosticity_of(&self, evidence_name: &str) -> Option<f64> {
        self.evidence
            .iter()
            .find(|s| s.evidence.name == evidence_name)
            .map(|s| s.diagnosticity)
    }

    /// Score and rank all hypotheses, best first.
    pub fn evaluate(&self) -> Vec<HypothesisEvaluation> {
        let mut evaluations: Vec<HypothesisEvaluation> = self
            .hypotheses
            .iter()
            .map(|h| self.evaluate_one(h, None))
            .collect();
        evaluations.sort_by(|a, b| {
            b.total_score
                .partial_cmp(&a.total_score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        evaluations
    }

    /// Perturb each evidence item's reliability one at a time and flag
    /// the items whose perturbation materially shifts any posterior.
    pub fn sensitivity_analysis(&self) -> SensitivityReport {
        let baseline: HashMap<String, f64> = self
            .hypotheses
            .iter()
            .map(|h| (h.name.clone(), self.evaluate_one(h, None).posterior))
            .collect();

        let mut critical_evidence = Vec::new();
        let mut max_shifts = HashMap::new();

        for state in &self.evidence {
            let mut max_shift: f64 = 0.0;
            for factor in [1.0 - SENSITIVITY_PERTURBATION, 1.0 + SENSITIVITY_PERTURBATION] {
                let perturbed = (state.evidence.name.clone(), factor);
                for hypothesis in &self.hypotheses {
                    let shifted = self.evaluate_one(hypothesis, Some(&perturbed)).posterior;
                    let shift = (shifted - baseline[&hypothesis.name]).abs();
                    max_shift = max_shift.max(shift);
                }
            }
            if max_shift > CRITICAL_SHIFT {
                critical_evidence.push(state.evidence.name.clone());
            }
            max_shifts.insert(state.evidence.name.clone(), max_shift);
        }

        SensitivityReport {
            critical_evidence,
            max_shifts,
        }
    }

    fn evaluate_one(
        &self,
        hypothesis: &Hypothesis,
        perturbation: Option<&(String, f64)>,
    ) -> HypothesisEvaluation {
        let mut support_sum = 0.0;
        let mut contradiction_sum = 0.0;
        let mut diagnosticity_sum = 0.0;
        let mut log_odds = logit(hypothesis.prior.clamp(POSTERIOR_FLOOR, POSTERIOR_CEILING));
        let mut supporting = Vec::new();
        let mut contradicting = Vec::new();

        for state in &self.evidence {
            let Some(&rating) = state.ratings.get(&hypothesis.name) else {
                continue;
            };
            let mut reliability = state.evidence.reliability;
            if let Some((name, factor)) = perturbation {
                if *name == state.evidence.name {
                    reliability = (reliability * factor).clamp(0.0, 1.0);
                }
            }
            let weight = reliability * state.evidence.relevance;

            if rating > 0.0 {
                support_sum += rating * weight;
                diagnosticity_sum += state.diagnosticity;
                supporting.push(state.evidence.name.clone());
            } else if rating < 0.0 {
                contradiction_sum += rating.abs() * weight;
                contradicting.push(state.evidence.name.clone());
            }

            log_odds += rating * reliability * POSTERIOR_STEP;
        }

        let total_score = hypothesis.prior * PRIOR_WEIGHT + support_sum - contradiction_sum
            + DIAGNOSTICITY_BONUS * diagnosticity_sum;
        let posterior = sigmoid(log_odds).clamp(POSTERIOR_FLOOR, POSTERIOR_CEILING);

        HypothesisEvaluation {
            name: hypothesis.name.clone(),
            total_score,
            posterior,
            supporting_evidence: supporting,
            contradicting_evidence: contradicting,
        }
    }
}

/// Signed consistency of evidence against a hypothesis, in [-1,1].
///
/// Each observation matching a prediction key counts +1 on agreement
/// and -1 on disagreement; each challenged assumption subtracts 0.5.
/// The sum is normalized by the number of prediction comparisons made.
fn rate_consistency(evidence: &AchEvidence, hypothesis: &Hypothesis) -> f64 {
    let mut raw = 0.0;
    let mut comparisons = 0u32;

    for (observable, predicted) in &hypothesis.predictions {
        if let Some(observed) = evidence.observations.get(observable) {
            comparisons += 1;
            if observed == predicted {
                raw += 1.0;
            } else {
                raw -= 1.0;
            }
        }
    }

    for assumption in &hypothesis.assumptions {
        if evidence.challenges.contains(assumption) {
            raw -= 0.5;
        }
    }

    (raw / comparisons.max(1) as f64).clamp(-1.0, 1.0)
}

/// Diagnosticity of one evidence item: variance of its consistency
/// ratings across all hypotheses, scaled by 2 and clamped to 1.
fn diagnosticity(ratings: &HashMap<String, f64>) -> f64 {
    if ratings.len() < 2 {
        return 0.0;
    }
    let n = ratings.len() as f64;
    let mean = ratings.values().sum::<f64>() / n;
    let variance = ratings.values().map(|r| (r - mean).powi(2)).sum::<f64>() / n;
    (variance * 2.0).min(1.0)
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

    fn two_hypothesis_engine() -> AchEngine {
        let mut engine = AchEngine::new();
        engine.add_hypothesis(
            Hypothesis::new("insider", "an insider leaked the data", 0.5)
                .predicts("access_logs", "internal")
                .predicts("timing", "business_hours")
                .assumes("credentials were not stolen"),
        );
        engine.add_hypothesis(
            Hypothesis::new("external", "an external attacker broke in", 0.5)
                .predicts("access_logs", "external")
                .predicts("timing", "off_hours"),
        );
        engine
    }

    #[test]
    fn test_matching_observation_supports() {
        let mut engine = two_hypothesis_engine();
        engine.add_evidence(
            AchEvidence::new("logs", "access logs show internal origin")
                .observes("access_logs", "internal")
                .with_reliability(0.9),
        );

        let evaluations = engine.evaluate();
        assert_eq!(evaluations[0].name, "insider");
        assert!(evaluations[0].posterior > 0.5);
        assert!(evaluations[0]
            .supporting_evidence
            .contains(&"logs".to_string()));
        // The same evidence contradicts the competing hypothesis.
        let external = evaluations.iter().find(|e| e.name == "external").unwrap();
        assert!(external.posterior < 0.5);
        assert!(external
            .contradicting_evidence
            .contains(&"logs".to_string()));
    }

    #[test]
    fn test_challenged_assumption_penalizes() {
        let mut engine = two_hypothesis_engine();
        engine.add_evidence(
            AchEvidence::new("phish", "phishing kit found on endpoint")
                .challenges("credentials were not stolen"),
        );

        let evaluations = engine.evaluate();
        let insider = evaluations.iter().find(|e| e.name == "insider").unwrap();
        assert!(insider
            .contradicting_evidence
            .contains(&"phish".to_string()));
    }

    #[test]
    fn test_uniform_evidence_has_zero_diagnosticity() {
        let mut engine = two_hypothesis_engine();
        // Observes nothing either hypothesis predicts: rating 0 for both.
        engine.add_evidence(
            AchEvidence::new("weather", "it rained that day").observes("weather", "rain"),
        );
        let diag = engine.diagnosticity_of("weather").unwrap();
        assert!(diag.abs() < 1e-9);
    }

    #[test]
    fn test_discriminating_evidence_has_max_diagnosticity() {
        let mut engine = two_hypothesis_engine();
        // +1 for insider, -1 for external.
        engine.add_evidence(
            AchEvidence::new("logs", "internal origin").observes("access_logs", "internal"),
        );
        let diag = engine.diagnosticity_of("logs").unwrap();
        // Ratings {+1, -1}: variance 1.0, scaled and clamped to 1.0.
        assert!((diag - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_sensitivity_ranks_pivotal_above_marginal() {
        let mut engine = two_hypothesis_engine();
        engine.add_evidence(
            AchEvidence::new("logs", "internal origin")
                .observes("access_logs", "internal")
                .observes("timing", "business_hours")
                .with_reliability(1.0),
        );
        engine.add_evidence(
            AchEvidence::new("rumor", "unattributed rumor")
                .observes("access_logs", "internal")
                .with_reliability(0.05),
        );

        let report = engine.sensitivity_analysis();
        assert!(report.max_shifts["logs"] > report.max_shifts["rumor"]);
        // A 50% perturbation of near-zero reliability moves nothing.
        assert!(report.max_shifts["rumor"] < CRITICAL_SHIFT);
        assert!(!report.critical_evidence.contains(&"rumor".to_string()));
    }

    #[test]
    fn test_scales_to_large_matrix() {
        let mut engine = AchEngine::new();
        for h in 0..50 {
            engine.add_hypothesis(
                Hypothesis::new(format!("h{h}"), "candidate", 0.5)
                    .predicts("signal", format!("s{}", h % 5)),
            );
        }
        for e in 0..100 {
            engine.add_evidence(
                AchEvidence::new(format!("e{e}"), "observation")
                    .observes("signal", format!("s{}", e % 5))
                    .with_reliability(0.7),
            );
        }

        let evaluations = engine.evaluate();
        assert_eq!(evaluations.len(), 50);
        let report = engine.sensitivity_analysis();
        assert_eq!(report.max_shifts.len(), 100);
    }
}

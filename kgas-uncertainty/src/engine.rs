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

//! Uncertainty engine: LLM-backed confidence assessment
//!
//! Three operations: initial assessment of a claim, belief update from
//! new evidence, and translation of confidence across modality
//! boundaries. Within one claim the stages are a strict pipeline;
//! across claims, calls run concurrently under a semaphore bound.
//!
//! Every external call is wrapped in a bounded timeout and falls back
//! to a documented conservative default on failure. The fallback is
//! recorded in the score's update history; a failed assessment never
//! masquerades as a real one.

use crate::bayesian::{BayesianUpdateEngine, EvidenceAssessment};
use crate::cache::AssessmentCache;
use crate::error::{LlmError, UncertaintyError};
use crate::llm::{parse_response, LlmClient};
use crate::resilience::Bulkhead;
use futures::future::join_all;
use kgas_core::{ConfidenceScore, Evidence, UncertaintyConfig, UpdateAction};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Fallback values when initial assessment cannot be elicited.
const FALLBACK_VALUE: f64 = 0.5;
const FALLBACK_DIMENSION: f64 = 0.5;
const FALLBACK_UNCERTAINTY: f64 = 0.5;

/// Conservative cross-modal translation applied when the adjuster
/// fails: confidence must never silently claim to be unchanged across
/// a modality boundary.
const CONSERVATIVE_VALUE_FACTOR: f64 = 0.8;
const CONSERVATIVE_UNCERTAINTY_DELTA: f64 = 0.2;
const CONSERVATIVE_CONSISTENCY: f64 = 0.6;

/// Bounds on externally-supplied value adjustment factors.
const ADJUSTMENT_FACTOR_MIN: f64 = 0.5;
const ADJUSTMENT_FACTOR_MAX: f64 = 1.5;

/// Sub-dimension updates are kept inside this band.
const DIMENSION_FLOOR: f64 = 0.1;
const DIMENSION_CEILING: f64 = 1.0;

/// Context handed to a modality adjuster.
#[derive(Debug, Clone, Default)]
pub struct TranslationContext {
    pub claim: String,
    pub attributes: HashMap<String, serde_json::Value>,
}

/// Adjustment computed for one modality translation.
#[derive(Debug, Clone)]
pub struct ModalityAdjustment {
    /// Multiplier on the confidence value; clamped to [0.5, 1.5].
    pub value_factor: f64,
    /// Added to estimation uncertainty.
    pub uncertainty_delta: f64,
    /// New cross-modal consistency value.
    pub consistency: f64,
}

/// Externally-supplied translation policy between modalities.
pub trait ModalityAdjuster: Send + Sync {
    fn adjust(
        &self,
        source_modality: &str,
        target_modality: &str,
        context: &TranslationContext,
    ) -> Result<ModalityAdjustment, UncertaintyError>;
}

#[derive(Debug, Deserialize)]
struct InitialAssessmentResponse {
    confidence: f64,
    methodological_quality: f64,
    relevance: f64,
    coherence: f64,
    adequacy: f64,
    estimation_uncertainty: f64,
    #[serde(default)]
    #[allow(dead_code)]
    reasoning: String,
}

#[derive(Debug, Deserialize)]
struct EvidenceSupportResponse {
    support: f64,
    quality: f64,
    #[serde(default)]
    #[allow(dead_code)]
    reasoning: String,
}

/// LLM-backed uncertainty engine.
pub struct UncertaintyEngine {
    llm: Arc<dyn LlmClient>,
    bayesian: BayesianUpdateEngine,
    bulkhead: Bulkhead,
    cache: AssessmentCache,
    config: UncertaintyConfig,
}

impl UncertaintyEngine {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self::with_config(llm, UncertaintyConfig::default())
    }

    pub fn with_config(llm: Arc<dyn LlmClient>, config: UncertaintyConfig) -> Self {
        Self {
            llm,
            bayesian: BayesianUpdateEngine::new(config.clone()),
            bulkhead: Bulkhead::new(config.max_concurrent_assessments),
            cache: AssessmentCache::new(config.cache_ttl_secs),
            config,
        }
    }

    pub fn cache_stats(&self) -> crate::cache::CacheStats {
        self.cache.stats()
    }

    /// Elicit an initial confidence assessment for a claim.
    ///
    /// Never fails: on timeout, transport failure, or schema-invalid
    /// output the documented conservative default is returned and the
    /// fallback is recorded in the score's history.
    pub async fn assess_initial_confidence(
        &self,
        claim: &str,
        domain: &str,
        evidence: &[Evidence],
    ) -> ConfidenceScore {
        let key = AssessmentCache::key(claim, domain, evidence);
        if let Some(cached) = self.cache.get(key) {
            debug!(claim, "initial assessment served from cache");
            return cached;
        }

        let prompt = initial_assessment_prompt(claim, domain, evidence);
        match self.elicit::<InitialAssessmentResponse>(&prompt).await {
            Ok(response) => {
                let mut score = ConfidenceScore::new(response.confidence, domain, "claim");
                score.methodological_quality = response.methodological_quality;
                score.relevance = response.relevance;
                score.coherence = response.coherence;
                score.adequacy = response.adequacy;
                score.estimation_uncertainty = response.estimation_uncertainty;
                score.evidence_count = evidence.len() as u32;
                let score = score.derived(UpdateAction::InitialAssessment {
                    domain: domain.to_string(),
                    fallback: false,
                });
                self.cache.insert(key, score.clone());
                score
            }
            Err(e) => {
                // Fallbacks are not cached: a later call should get the
                // chance to elicit a real assessment.
                warn!(claim, error = %e, "initial assessment failed, using conservative default");
                let mut score = ConfidenceScore::new(FALLBACK_VALUE, domain, "claim");
                score.methodological_quality = FALLBACK_DIMENSION;
                score.relevance = FALLBACK_DIMENSION;
                score.coherence = FALLBACK_DIMENSION;
                score.adequacy = FALLBACK_DIMENSION;
                score.estimation_uncertainty = FALLBACK_UNCERTAINTY;
                score.evidence_count = evidence.len() as u32;
                score.derived(UpdateAction::InitialAssessment {
                    domain: domain.to_string(),
                    fallback: true,
                })
            }
        }
    }

    /// Assess several independent claims concurrently. Concurrency is
    /// bounded by the engine's bulkhead, not by the batch size.
    pub async fn assess_initial_confidence_batch(
        &self,
        claims: &[(String, String, Vec<Evidence>)],
    ) -> Vec<ConfidenceScore> {
        join_all(
            claims
                .iter()
                .map(|(claim, domain, evidence)| self.assess_initial_confidence(claim, domain, evidence)),
        )
        .await
    }

    /// Update a confidence score with a batch of new evidence.
    ///
    /// The input score is never mutated; the returned score carries the
    /// same creation timestamp, an extended history, and recomputed
    /// sub-dimensions.
    pub async fn update_confidence_with_new_evidence(
        &self,
        current: &ConfidenceScore,
        new_evidence: &[Evidence],
        claim: &str,
    ) -> ConfidenceScore {
        if new_evidence.is_empty() {
            return current.clone();
        }

        let assessments: Vec<EvidenceAssessment> = join_all(
            new_evidence
                .iter()
                .map(|evidence| self.assess_evidence_support(claim, evidence)),
        )
        .await;

        let update = self.bayesian.aggregate(current.value, &assessments);
        let batch_size = new_evidence.len();
        let total_evidence = current.evidence_count as usize + batch_size;

        let mut next = current.derived(UpdateAction::BayesianUpdate {
            prior: update.prior,
            posterior: update.posterior,
            evidence_count: batch_size,
        });
        next = next.derived(UpdateAction::ContextualEvidenceUpdate {
            evidence_count: batch_size,
            mean_quality: update.mean_quality,
        });

        next.value = update.posterior;
        next.evidence_count = total_evidence as u32;

        // Methodological quality follows reported evidence quality as
        // an exponential-moving blend.
        next.methodological_quality = clamp_dimension(
            0.7 * current.methodological_quality + 0.3 * update.mean_quality,
        );

        // Coherence tracks how uniformly the batch moved the belief:
        // low variance of change magnitudes means a coherent batch.
        let consistency = 1.0 - (4.0 * update.change_variance).min(1.0);
        next.coherence = clamp_dimension(0.6 * current.coherence + 0.4 * consistency);

        // Adequacy grows with cumulative evidence, with diminishing
        // returns past the configured saturation point.
        let saturation = self.config.adequacy_saturation.max(1) as f64;
        let adequacy_target = ((total_evidence as f64).ln_1p() / saturation.ln_1p()).min(1.0);
        next.adequacy = clamp_dimension(0.7 * current.adequacy + 0.3 * adequacy_target);

        // More evidence reduces uncertainty about the estimate itself.
        next.estimation_uncertainty = (current.estimation_uncertainty
            - self.config.uncertainty_decrement)
            .max(self.config.uncertainty_floor);

        next
    }

    /// Carry a confidence score across a modality boundary.
    ///
    /// On adjuster failure the conservative fixed translation applies;
    /// the score is never passed through unchanged.
    pub fn cross_modal_uncertainty_translation(
        &self,
        score: &ConfidenceScore,
        source_modality: &str,
        target_modality: &str,
        adjuster: &dyn ModalityAdjuster,
        context: &TranslationContext,
    ) -> ConfidenceScore {
        let (factor, uncertainty_delta, consistency, fallback) =
            match adjuster.adjust(source_modality, target_modality, context) {
                Ok(adjustment) => (
                    adjustment
                        .value_factor
                        .clamp(ADJUSTMENT_FACTOR_MIN, ADJUSTMENT_FACTOR_MAX),
                    adjustment.uncertainty_delta,
                    adjustment.consistency.clamp(0.0, 1.0),
                    false,
                ),
                Err(e) => {
                    warn!(
                        source_modality,
                        target_modality,
                        error = %e,
                        "modality adjustment failed, applying conservative translation"
                    );
                    (
                        CONSERVATIVE_VALUE_FACTOR,
                        CONSERVATIVE_UNCERTAINTY_DELTA,
                        CONSERVATIVE_CONSISTENCY,
                        true,
                    )
                }
            };

        let mut next = score.derived(UpdateAction::CrossModalTranslation {
            source_modality: source_modality.to_string(),
            target_modality: target_modality.to_string(),
            value_factor: factor,
            fallback,
        });
        next.value = (score.value * factor).clamp(0.0, 1.0);
        next.estimation_uncertainty =
            (score.estimation_uncertainty + uncertainty_delta).clamp(0.0, 1.0);
        next.cross_modal_consistency = consistency;
        next
    }

    /// Assess how strongly one evidence item supports a claim. Falls
    /// back to a neutral assessment (support 0, quality 0.5) so a
    /// failed elicitation cannot move the belief.
    async fn assess_evidence_support(&self, claim: &str, evidence: &Evidence) -> EvidenceAssessment {
        let prompt = evidence_support_prompt(claim, evidence);
        match self.elicit::<EvidenceSupportResponse>(&prompt).await {
            Ok(response) => {
                EvidenceAssessment::new(evidence.clone(), response.support, response.quality)
            }
            Err(e) => {
                warn!(claim, source = %evidence.source, error = %e,
                    "evidence assessment failed, treating as neutral");
                EvidenceAssessment::new(evidence.clone(), 0.0, 0.5)
            }
        }
    }

    /// One bounded, semaphore-gated, schema-validated LLM elicitation.
    async fn elicit<T>(&self, prompt: &str) -> Result<T, LlmError>
    where
        T: serde::de::DeserializeOwned + Validated,
    {
        let _permit = self.bulkhead.acquire().await;
        let timeout = Duration::from_secs(self.config.llm_timeout_secs);

        let completion = tokio::time::timeout(timeout, self.llm.complete(prompt, 512, 0.0))
            .await
            .map_err(|_| LlmError::Timeout(self.config.llm_timeout_secs))??;

        let response: T = parse_response(&completion)?;
        response.validate()?;
        Ok(response)
    }
}

/// Range validation applied after typed deserialization. Out-of-range
/// values count as schema failures and trigger the documented default.
trait Validated {
    fn validate(&self) -> Result<(), LlmError>;
}

impl Validated for InitialAssessmentResponse {
    fn validate(&self) -> Result<(), LlmError> {
        for (name, v) in [
            ("confidence", self.confidence),
            ("methodological_quality", self.methodological_quality),
            ("relevance", self.relevance),
            ("coherence", self.coherence),
            ("adequacy", self.adequacy),
            ("estimation_uncertainty", self.estimation_uncertainty),
        ] {
            if !(0.0..=1.0).contains(&v) || !v.is_finite() {
                return Err(LlmError::InvalidResponse(format!(
                    "{name} = {v} outside [0,1]"
                )));
            }
        }
        Ok(())
    }
}

impl Validated for EvidenceSupportResponse {
    fn validate(&self) -> Result<(), LlmError> {
        if !(-1.0..=1.0).contains(&self.support) || !self.support.is_finite() {
            return Err(LlmError::InvalidResponse(format!(
                "support = {} outside [-1,1]",
                self.support
            )));
        }
        if !(0.0..=1.0).contains(&self.quality) || !self.quality.is_finite() {
            return Err(LlmError::InvalidResponse(format!(
                "quality = {} outside [0,1]",
                self.quality
            )));
        }
        Ok(())
    }
}

fn clamp_dimension(v: f64) -> f64 {
    v.clamp(DIMENSION_FLOOR, DIMENSION_CEILING)
}

fn initial_assessment_prompt(claim: &str, domain: &str, evidence: &[Evidence]) -> String {
    let evidence_block = if evidence.is_empty() {
        "(no evidence provided)".to_string()
    } else {
        evidence
            .iter()
            .map(|e| format!("- [{} | reliability {:.2}] {}", e.source, e.reliability, e.content))
            .collect::<Vec<_>>()
            .join("\n")
    };

    format!(
        r#"You are an expert analyst assessing confidence in a claim.

DOMAIN: {domain}

CLAIM:
{claim}

EVIDENCE:
{evidence_block}

Assess the claim on each dimension as a value in [0,1].

Respond in JSON format:
{{
  "confidence": 0.0,
  "methodological_quality": 0.0,
  "relevance": 0.0,
  "coherence": 0.0,
  "adequacy": 0.0,
  "estimation_uncertainty": 0.0,
  "reasoning": "..."
}}"#
    )
}

fn evidence_support_prompt(claim: &str, evidence: &Evidence) -> String {
    format!(
        r#"You are an expert analyst. Determine how strongly the evidence supports the claim.

CLAIM:
{claim}

EVIDENCE ({source_type}, from {source}):
{content}

"support" is a value in [-1,1]: negative contradicts, positive supports, 0 is neutral.
"quality" is the intrinsic quality of the evidence in [0,1].

Respond in JSON format:
{{
  "support": 0.0,
  "quality": 0.0,
  "reasoning": "..."
}}"#,
        source_type = evidence.source_type,
        source = evidence.source,
        content = evidence.content,
    )
}

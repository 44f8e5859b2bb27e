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

//! End-to-end belief update and calibration flows.

use kgas_core::{Evidence, UpdateAction};
use kgas_uncertainty::{
    BayesianUpdateEngine, CrossCalibration, EvidenceAssessment, ScriptedLlmClient,
    UncertaintyEngine,
};
use std::sync::Arc;

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

#[tokio::test]
async fn strong_evidence_raises_a_neutral_prior() {
    init_tracing();

    // Prior elicitation, then one supporting evidence assessment.
    let client = ScriptedLlmClient::new(vec![
        r#"{"confidence": 0.5, "methodological_quality": 0.5, "relevance": 0.5,
            "coherence": 0.5, "adequacy": 0.5, "estimation_uncertainty": 0.5,
            "reasoning": "no evidence yet"}"#,
        r#"{"support": 0.95, "quality": 0.85, "reasoning": "directly confirms the claim"}"#,
    ]);
    let engine = UncertaintyEngine::new(Arc::new(client));

    let initial = engine
        .assess_initial_confidence("the drug reduces mortality", "medical", &[])
        .await;
    assert_eq!(initial.value, 0.5);

    let evidence = vec![Evidence::new(
        "randomized trial shows 30% reduction",
        "doc:trial-7",
        "primary_document",
        0.9,
    )];
    let updated = engine
        .update_confidence_with_new_evidence(&initial, &evidence, "the drug reduces mortality")
        .await;

    assert!(updated.value > 0.5, "supporting evidence must raise belief");
    assert!(updated.value < 1.0, "belief must never reach certainty");
    assert!(updated.overall() > initial.overall());

    // The history records both the Bayesian and the contextual step.
    let actions: Vec<_> = updated
        .update_history
        .iter()
        .map(|e| std::mem::discriminant(&e.action))
        .collect();
    assert_eq!(actions.len(), 3); // initial + bayesian + contextual
    assert!(updated.update_history.iter().any(|e| matches!(
        e.action,
        UpdateAction::BayesianUpdate { prior, posterior, .. }
            if posterior > prior
    )));
}

#[tokio::test]
async fn pipeline_degrades_but_never_fails() {
    init_tracing();

    // Every LLM call fails; the pipeline still produces scores.
    let engine = UncertaintyEngine::new(Arc::new(ScriptedLlmClient::failing()));

    let initial = engine
        .assess_initial_confidence("unverifiable claim", "general", &[])
        .await;
    assert_eq!(initial.value, 0.5);

    let evidence = vec![Evidence::new("weak rumor", "forum:1", "secondary", 0.4)];
    let updated = engine
        .update_confidence_with_new_evidence(&initial, &evidence, "unverifiable claim")
        .await;
    // Neutral fallback assessment leaves belief unchanged.
    assert!((updated.value - 0.5).abs() < 1e-9);
    assert_eq!(updated.evidence_count, 1);
}

#[test]
fn llm_and_bayesian_estimates_reconcile() {
    // An LLM-contextual estimate and a formal posterior for the same
    // claim, reconciled by mutual adjustment.
    let bayesian_engine = BayesianUpdateEngine::default();
    let update = bayesian_engine.aggregate(
        0.5,
        &[EvidenceAssessment::new(
            Evidence::new("supporting study", "doc:2", "primary_document", 0.9),
            0.9,
            0.8,
        )],
    );

    let llm_estimate = 0.85;
    let calibration = CrossCalibration::default();
    let result = calibration.calibrate(
        llm_estimate,
        update.posterior,
        "the study sample shows a clear statistically significant effect",
        None,
    );

    let initial_diff = (llm_estimate - update.posterior).abs();
    let final_diff = (result.llm_final - result.bayesian_final).abs();
    assert!(final_diff <= initial_diff);
    assert!(result.converged || result.forced_compromise);
    assert!(result.mutual_consistency > 0.5);
}

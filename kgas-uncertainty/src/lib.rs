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

//! # KGAS Uncertainty Engine
//!
//! Combines LLM-elicited and formally Bayesian confidence estimates into
//! calibrated confidence values with a machine-checkable update history.
//!
//! ## Components
//!
//! - **BayesianUpdateEngine**: order-independent log-odds aggregation of
//!   weighted evidence
//! - **AchEngine**: Analysis of Competing Hypotheses with diagnosticity
//!   weighting and sensitivity analysis
//! - **CerqualAssessor**: systematic-review-style evidence synthesis
//! - **UncertaintyEngine**: LLM-backed initial assessment, evidence
//!   updates, and cross-modal translation
//! - **CrossCalibration**: iterative mutual adjustment of paired
//!   estimates
//!
//! ## Failure posture
//!
//! Confidence assessment must never crash the pipeline asking "how
//! confident should I be?". Every LLM-backed path has a documented
//! conservative default applied on timeout, transport failure, or
//! schema-invalid output, and the fallback is recorded in the score's
//! update history.

pub mod ach;
pub mod bayesian;
pub mod cache;
pub mod calibration;
pub mod cerqual;
pub mod engine;
pub mod error;
pub mod llm;
pub mod resilience;

pub use ach::{AchEngine, AchEvidence, Hypothesis, HypothesisEvaluation, SensitivityReport};
pub use bayesian::{BayesianUpdateEngine, BeliefUpdate, EvidenceAssessment};
pub use cache::{AssessmentCache, CacheStats};
pub use calibration::{CalibrationResult, CrossCalibration};
pub use cerqual::{
    CerqualAssessment, CerqualAssessor, CerqualConfidence, CerqualEvidence, StudyDesign,
    StudyMetadata,
};
pub use engine::{ModalityAdjuster, ModalityAdjustment, TranslationContext, UncertaintyEngine};
pub use error::{LlmError, Result, UncertaintyError};
pub use llm::{extract_json_object, HttpLlmClient, HttpLlmConfig, LlmClient, ScriptedLlmClient};
pub use resilience::{Bulkhead, RetryPolicy};

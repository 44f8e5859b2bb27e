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

//! CERQual-style evidence synthesis
//!
//! Grades confidence in a qualitative-review finding across four
//! dimensions (methodological limitations, relevance, coherence,
//! adequacy) from the metadata of the contributing studies. One
//! assessment per review question; immutable once produced.

use kgas_core::ConfidenceWeights;
use serde::{Deserialize, Serialize};

/// Study design, ordered roughly by methodological rigor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StudyDesign {
    RandomizedControlled,
    Cohort,
    MixedMethods,
    Survey,
    Qualitative,
    CaseStudy,
}

impl StudyDesign {
    /// Baseline rigor weight for the design.
    fn rigor_weight(&self) -> f64 {
        match self {
            StudyDesign::RandomizedControlled => 1.0,
            StudyDesign::Cohort => 0.9,
            StudyDesign::MixedMethods => 0.8,
            StudyDesign::Survey => 0.7,
            StudyDesign::Qualitative => 0.75,
            StudyDesign::CaseStudy => 0.6,
        }
    }
}

/// Bibliographic and methodological descriptors for one study.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudyMetadata {
    pub citation: String,
    pub year: i32,
    pub design: StudyDesign,
    pub sample_size: u32,
    /// Reviewer-assessed methodological rigor in [0,1].
    pub rigor_score: f64,
    /// How closely the study context matches the review question, [0,1].
    pub context_match: f64,
    /// How strongly the study's results agree with the finding, [0,1].
    pub finding_agreement: f64,
}

/// A review finding plus the studies supporting it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CerqualEvidence {
    pub finding: String,
    pub studies: Vec<StudyMetadata>,
}

/// Categorical overall confidence grades.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CerqualConfidence {
    High,
    Moderate,
    Low,
    VeryLow,
}

/// Four dimension scores plus the categorical grade and rationale.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CerqualAssessment {
    pub finding: String,
    pub methodological_limitations: f64,
    pub relevance: f64,
    pub coherence: f64,
    pub adequacy: f64,
    pub overall_score: f64,
    pub overall_confidence: CerqualConfidence,
    pub rationale: Vec<String>,
}

/// Sample size at which adequacy saturates.
const ADEQUACY_SAMPLE_SATURATION: f64 = 200.0;
/// Study count at which adequacy saturates.
const ADEQUACY_STUDY_SATURATION: f64 = 10.0;

/// Deterministic CERQual grader.
#[derive(Debug, Clone, Default)]
pub struct CerqualAssessor {
    weights: ConfidenceWeights,
}

impl CerqualAssessor {
    pub fn new(weights: ConfidenceWeights) -> Self {
        Self { weights }
    }

    /// Grade a finding from its studies.
    pub fn assess(&self, evidence: &CerqualEvidence) -> CerqualAssessment {
        if evidence.studies.is_empty() {
            return CerqualAssessment {
                finding: evidence.finding.clone(),
                methodological_limitations: 0.0,
                relevance: 0.0,
                coherence: 0.0,
                adequacy: 0.0,
                overall_score: 0.0,
                overall_confidence: CerqualConfidence::VeryLow,
                rationale: vec!["no studies contributed to this finding".to_string()],
            };
        }

        let n = evidence.studies.len() as f64;
        let mut rationale = Vec::new();

        // Methodological limitations: design-weighted rigor.
        let methodological = evidence
            .studies
            .iter()
            .map(|s| s.rigor_score.clamp(0.0, 1.0) * s.design.rigor_weight())
            .sum::<f64>()
            / n;
        if methodological < 0.5 {
            rationale.push("serious methodological limitations across studies".to_string());
        }

        // Relevance: mean context match.
        let relevance = evidence
            .studies
            .iter()
            .map(|s| s.context_match.clamp(0.0, 1.0))
            .sum::<f64>()
            / n;
        if relevance < 0.5 {
            rationale.push("study contexts diverge from the review question".to_string());
        }

        // Coherence: mean agreement penalized by its dispersion.
        let agreements: Vec<f64> = evidence
            .studies
            .iter()
            .map(|s| s.finding_agreement.clamp(0.0, 1.0))
            .collect();
        let mean_agreement = agreements.iter().sum::<f64>() / n;
        let dispersion =
            (agreements.iter().map(|a| (a - mean_agreement).powi(2)).sum::<f64>() / n).sqrt();
        let coherence = (mean_agreement - dispersion).clamp(0.0, 1.0);
        if dispersion > 0.25 {
            rationale.push("studies disagree on the direction of the finding".to_string());
        }

        // Adequacy: diminishing returns in both study count and total
        // sample size.
        let total_sample: u32 = evidence.studies.iter().map(|s| s.sample_size).sum();
        let count_part = (n.ln_1p() / ADEQUACY_STUDY_SATURATION.ln_1p()).min(1.0);
        let sample_part =
            ((total_sample as f64).ln_1p() / ADEQUACY_SAMPLE_SATURATION.ln_1p()).min(1.0);
        let adequacy = 0.5 * count_part + 0.5 * sample_part;
        if adequacy < 0.5 {
            rationale.push("thin evidence base for this finding".to_string());
        }

        let weight_sum = self.weights.methodological_quality
            + self.weights.relevance
            + self.weights.coherence
            + self.weights.adequacy;
        let overall_score = (methodological * self.weights.methodological_quality
            + relevance * self.weights.relevance
            + coherence * self.weights.coherence
            + adequacy * self.weights.adequacy)
            / weight_sum.max(f64::EPSILON);

        let overall_confidence = if overall_score >= 0.8 {
            CerqualConfidence::High
        } else if overall_score >= 0.6 {
            CerqualConfidence::Moderate
        } else if overall_score >= 0.4 {
            CerqualConfidence::Low
        } else {
            CerqualConfidence::VeryLow
        };

        CerqualAssessment {
            finding: evidence.finding.clone(),
            methodological_limitations: methodological,
            relevance,
            coherence,
            adequacy,
            overall_score,
            overall_confidence,
            rationale,
        }
    }
}

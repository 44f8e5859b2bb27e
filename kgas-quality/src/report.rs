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

//! Batch quality reporting
//!
//! Summarizes a collection of artifacts. Item-level failures never
//! abort the batch; they surface as warnings on the affected item and
//! flow into the aggregate counts like any other assessment.

use crate::assessor::{AssessmentMethod, QualityAssessment, QualityAssessor};
use kgas_core::QualityTier;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Number of most-frequent warnings included in a report.
const TOP_WARNING_COUNT: usize = 10;

/// Aggregate statistics over a batch of assessments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityReport {
    pub total_assessed: usize,
    pub mean_confidence: f64,
    pub min_confidence: f64,
    pub max_confidence: f64,
    /// Artifact count per quality tier.
    pub tier_counts: HashMap<QualityTier, usize>,
    /// Most frequent warnings, descending by count; ties keep
    /// first-seen order.
    pub top_warnings: Vec<(String, usize)>,
    pub assessments: Vec<QualityAssessment>,
}

impl QualityAssessor {
    /// Assess every reference and aggregate the results.
    pub fn get_quality_report(&self, object_refs: &[String]) -> QualityReport {
        let assessments: Vec<QualityAssessment> = object_refs
            .iter()
            .map(|r| self.assess_quality(r, AssessmentMethod::Automatic))
            .collect();

        let mut tier_counts: HashMap<QualityTier, usize> = HashMap::new();
        let mut warning_counts: HashMap<String, (usize, usize)> = HashMap::new();
        let mut first_seen = 0usize;

        let mut mean = 0.0;
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;

        for assessment in &assessments {
            mean += assessment.confidence;
            min = min.min(assessment.confidence);
            max = max.max(assessment.confidence);
            *tier_counts.entry(assessment.quality_tier).or_insert(0) += 1;

            for warning in &assessment.warnings {
                let entry = warning_counts.entry(warning.clone()).or_insert_with(|| {
                    let order = first_seen;
                    first_seen += 1;
                    (0, order)
                });
                entry.0 += 1;
            }
        }

        let total = assessments.len();
        if total > 0 {
            mean /= total as f64;
        } else {
            min = 0.0;
            max = 0.0;
        }

        let mut ranked: Vec<(String, usize, usize)> = warning_counts
            .into_iter()
            .map(|(warning, (count, order))| (warning, count, order))
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));

        QualityReport {
            total_assessed: total,
            mean_confidence: mean,
            min_confidence: min,
            max_confidence: max,
            tier_counts,
            top_warnings: ranked
                .into_iter()
                .take(TOP_WARNING_COUNT)
                .map(|(warning, count, _)| (warning, count))
                .collect(),
            assessments,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::{ArtifactResolver, MemoryArtifactResolver};
    use kgas_core::{Artifact, ArtifactKind};
    use kgas_provenance::{MemoryLineageStore, ProvenanceTracker};
    use std::sync::Arc;

    fn populated_assessor() -> QualityAssessor {
        let tracker = Arc::new(ProvenanceTracker::new(Arc::new(MemoryLineageStore::new())));
        let resolver = Arc::new(MemoryArtifactResolver::new());
        for (reference, confidence) in [
            ("neo4j:entity:e1", 0.95),
            ("neo4j:entity:e2", 0.6),
            ("neo4j:entity:e3", 0.2),
        ] {
            let artifact = Artifact::new(ArtifactKind::Entity, confidence)
                .with_attribute("canonical_name", serde_json::json!("x"))
                .with_attribute("entity_type", serde_json::json!("thing"));
            resolver.save(reference, artifact).unwrap();
        }
        QualityAssessor::new(tracker, resolver)
    }

    #[test]
    fn test_report_aggregates() {
        let assessor = populated_assessor();
        let refs: Vec<String> = ["neo4j:entity:e1", "neo4j:entity:e2", "neo4j:entity:e3"]
            .iter()
            .map(|s| s.to_string())
            .collect();

        let report = assessor.get_quality_report(&refs);
        assert_eq!(report.total_assessed, 3);
        assert!(report.min_confidence <= report.mean_confidence);
        assert!(report.mean_confidence <= report.max_confidence);
        assert_eq!(report.tier_counts.values().sum::<usize>(), 3);
    }

    #[test]
    fn test_report_continues_past_missing_items() {
        let assessor = populated_assessor();
        let refs: Vec<String> = ["neo4j:entity:e1", "neo4j:entity:gone"]
            .iter()
            .map(|s| s.to_string())
            .collect();

        let report = assessor.get_quality_report(&refs);
        assert_eq!(report.total_assessed, 2);
        assert_eq!(report.min_confidence, 0.0);
        assert!(report
            .top_warnings
            .iter()
            .any(|(w, _)| w.contains("not found")));
    }

    #[test]
    fn test_top_warnings_ranked_by_frequency() {
        let assessor = populated_assessor();
        // Both missing refs produce distinct "not found" warnings; the
        // low-confidence artifact produces threshold warnings.
        let refs: Vec<String> = [
            "neo4j:entity:e3",
            "neo4j:entity:e3",
            "neo4j:entity:gone",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();

        let report = assessor.get_quality_report(&refs);
        assert!(!report.top_warnings.is_empty());
        // Most frequent first.
        for pair in report.top_warnings.windows(2) {
            assert!(pair[0].1 >= pair[1].1);
        }
        assert!(report.top_warnings.len() <= 10);
    }

    #[test]
    fn test_empty_report() {
        let assessor = populated_assessor();
        let report = assessor.get_quality_report(&[]);
        assert_eq!(report.total_assessed, 0);
        assert_eq!(report.mean_confidence, 0.0);
        assert!(report.top_warnings.is_empty());
    }
}

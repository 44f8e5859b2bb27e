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

//! Composite quality assessment
//!
//! Four component scores per artifact:
//!
//! - **inherent**: the artifact's own stored confidence
//! - **provenance**: product of ancestor operation confidences
//! - **consistency**: penalized for attribute bloat, accumulated
//!   warnings, and duplicate surface forms
//! - **completeness**: penalized per missing required field for the
//!   artifact's kind

use crate::error::{QualityError, Result};
use crate::resolver::ArtifactResolver;
use kgas_core::{QualityConfig, QualityTier};
use kgas_provenance::ProvenanceTracker;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;
use tracing::warn;

/// How component scores are aggregated into the final confidence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssessmentMethod {
    /// Fixed weighted sum over the four components.
    #[default]
    Automatic,
    /// Most conservative: minimum of all components.
    Minimum,
    /// Simple mean of all components.
    Mean,
}

impl FromStr for AssessmentMethod {
    type Err = std::convert::Infallible;

    /// Unrecognized method names fall back to the simple mean rather
    /// than failing; assessment method is advisory, not a contract.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(match s {
            "automatic" => AssessmentMethod::Automatic,
            "minimum" => AssessmentMethod::Minimum,
            _ => AssessmentMethod::Mean,
        })
    }
}

/// The four component scores feeding an assessment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ComponentScores {
    pub inherent: f64,
    pub provenance: f64,
    pub consistency: f64,
    pub completeness: f64,
}

impl ComponentScores {
    fn min(&self) -> f64 {
        self.inherent
            .min(self.provenance)
            .min(self.consistency)
            .min(self.completeness)
    }

    fn mean(&self) -> f64 {
        (self.inherent + self.provenance + self.consistency + self.completeness) / 4.0
    }
}

/// Result of assessing one artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityAssessment {
    pub object_ref: String,
    pub confidence: f64,
    pub quality_tier: QualityTier,
    pub component_scores: ComponentScores,
    pub warnings: Vec<String>,
    pub recommendations: Vec<String>,
}

/// Quality assessor with explicit collaborators.
///
/// The provenance tracker and artifact resolver are injected at
/// construction; there is no service-locator indirection.
pub struct QualityAssessor {
    tracker: Arc<ProvenanceTracker>,
    resolver: Arc<dyn ArtifactResolver>,
    config: QualityConfig,
}

impl QualityAssessor {
    pub fn new(tracker: Arc<ProvenanceTracker>, resolver: Arc<dyn ArtifactResolver>) -> Self {
        Self::with_config(tracker, resolver, QualityConfig::default())
    }

    pub fn with_config(
        tracker: Arc<ProvenanceTracker>,
        resolver: Arc<dyn ArtifactResolver>,
        config: QualityConfig,
    ) -> Self {
        Self {
            tracker,
            resolver,
            config,
        }
    }

    pub fn config(&self) -> &QualityConfig {
        &self.config
    }

    /// Assess an artifact's quality. Never fails: unresolvable artifacts
    /// yield a zero-confidence, low-tier result so monitoring callers
    /// always receive an assessment.
    pub fn assess_quality(&self, object_ref: &str, method: AssessmentMethod) -> QualityAssessment {
        let artifact = match self.resolver.resolve(object_ref) {
            Ok(Some(artifact)) => artifact,
            Ok(None) => return self.not_found_assessment(object_ref, "artifact not found"),
            Err(e) => {
                warn!(object_ref, error = %e, "artifact resolution failed");
                return self.not_found_assessment(object_ref, &format!("resolution failed: {e}"));
            }
        };

        let mut warnings: Vec<String> = Vec::new();
        let mut recommendations: Vec<String> = Vec::new();

        let inherent = artifact.confidence.clamp(0.0, 1.0);

        let provenance = match self.tracker.calculate_derived_confidence(object_ref) {
            Ok(c) => c.clamp(0.0, 1.0),
            Err(e) => {
                // Lineage lookup failure must not block assessment;
                // score the component as unknown-neutral and flag it.
                warn!(object_ref, error = %e, "provenance lookup failed");
                warnings.push(format!("provenance lookup failed: {e}"));
                0.5
            }
        };

        let consistency = self.consistency_score(&artifact, &mut warnings);
        let completeness = self.completeness_score(&artifact, &mut warnings);

        let components = ComponentScores {
            inherent,
            provenance,
            consistency,
            completeness,
        };

        let weights = &self.config.component_weights;
        let confidence = match method {
            AssessmentMethod::Automatic => {
                components.inherent * weights.inherent
                    + components.provenance * weights.provenance
                    + components.consistency * weights.consistency
                    + components.completeness * weights.completeness
            }
            AssessmentMethod::Minimum => components.min(),
            AssessmentMethod::Mean => components.mean(),
        }
        .clamp(0.0, 1.0);

        self.flag_low_components(&components, confidence, &mut warnings, &mut recommendations);

        // Warnings already stored on the artifact always carry through.
        warnings.extend(artifact.warnings.iter().cloned());

        QualityAssessment {
            object_ref: object_ref.to_string(),
            confidence,
            quality_tier: QualityTier::classify(confidence, &self.config.tiers),
            component_scores: components,
            warnings,
            recommendations,
        }
    }

    /// Administrative confidence override with an audit trail.
    pub fn update_quality(
        &self,
        object_ref: &str,
        confidence: f64,
        warnings: Option<Vec<String>>,
        reason: &str,
    ) -> Result<()> {
        let mut artifact = self
            .resolver
            .resolve(object_ref)?
            .ok_or_else(|| QualityError::ArtifactNotFound(object_ref.to_string()))?;

        let old = artifact.confidence;
        artifact.confidence = confidence.clamp(0.0, 1.0);
        artifact.quality_tier = QualityTier::classify(artifact.confidence, &self.config.tiers);
        artifact.warnings.push(format!(
            "quality updated {:.3} -> {:.3}: {}",
            old, artifact.confidence, reason
        ));
        if let Some(extra) = warnings {
            artifact.warnings.extend(extra);
        }

        self.resolver.save(object_ref, artifact)?;
        Ok(())
    }

    fn not_found_assessment(&self, object_ref: &str, detail: &str) -> QualityAssessment {
        QualityAssessment {
            object_ref: object_ref.to_string(),
            confidence: 0.0,
            quality_tier: QualityTier::Low,
            component_scores: ComponentScores {
                inherent: 0.0,
                provenance: 0.0,
                consistency: 0.0,
                completeness: 0.0,
            },
            warnings: vec![format!("{object_ref}: {detail}")],
            recommendations: vec!["verify the reference and its storage backend".to_string()],
        }
    }

    fn consistency_score(&self, artifact: &kgas_core::Artifact, warnings: &mut Vec<String>) -> f64 {
        let penalties = &self.config.consistency;
        let mut score: f64 = 1.0;

        if artifact.attributes.len() > penalties.max_attributes {
            score -= penalties.excessive_attributes_penalty;
            warnings.push(format!(
                "excessive attribute count: {} (max {})",
                artifact.attributes.len(),
                penalties.max_attributes
            ));
        }
        if artifact.warnings.len() > penalties.max_warnings {
            score -= penalties.excessive_warnings_penalty;
            warnings.push(format!(
                "excessive warning count: {}",
                artifact.warnings.len()
            ));
        }
        if artifact.duplicate_surface_forms() > 0 {
            score -= penalties.duplicate_surface_form_penalty;
            warnings.push("duplicate surface forms detected".to_string());
        }

        score.max(0.0)
    }

    fn completeness_score(&self, artifact: &kgas_core::Artifact, warnings: &mut Vec<String>) -> f64 {
        let missing = artifact.missing_fields();
        if missing.is_empty() {
            return 1.0;
        }
        warnings.push(format!(
            "missing required fields for {}: {}",
            artifact.kind,
            missing.join(", ")
        ));
        (1.0 - missing.len() as f64 * self.config.missing_field_penalty).max(0.0)
    }

    fn flag_low_components(
        &self,
        components: &ComponentScores,
        confidence: f64,
        warnings: &mut Vec<String>,
        recommendations: &mut Vec<String>,
    ) {
        let thresholds = &self.config.warn_thresholds;

        if confidence < thresholds.confidence {
            warnings.push(format!(
                "overall confidence {confidence:.2} below threshold {:.2}",
                thresholds.confidence
            ));
            recommendations.push("review upstream operations before relying on this artifact".to_string());
        }
        if components.inherent < thresholds.inherent {
            warnings.push(format!(
                "inherent confidence {:.2} below threshold {:.2}",
                components.inherent, thresholds.inherent
            ));
            recommendations.push("re-run the producing tool with stricter settings".to_string());
        }
        if components.provenance < thresholds.provenance {
            warnings.push(format!(
                "provenance-derived confidence {:.2} below threshold {:.2}",
                components.provenance, thresholds.provenance
            ));
            recommendations.push("inspect ancestor operations for low-confidence steps".to_string());
        }
        if components.consistency < thresholds.consistency {
            warnings.push(format!(
                "consistency score {:.2} below threshold {:.2}",
                components.consistency, thresholds.consistency
            ));
            recommendations.push("deduplicate surface forms and prune stale attributes".to_string());
        }
        if components.completeness < thresholds.completeness {
            warnings.push(format!(
                "completeness score {:.2} below threshold {:.2}",
                components.completeness, thresholds.completeness
            ));
            recommendations.push("populate the missing required fields".to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::{ArtifactResolver, MemoryArtifactResolver};
    use kgas_core::{Artifact, ArtifactKind};
    use kgas_provenance::MemoryLineageStore;
    use std::collections::HashMap;

    fn assessor() -> (QualityAssessor, Arc<MemoryArtifactResolver>, Arc<ProvenanceTracker>) {
        let tracker = Arc::new(ProvenanceTracker::new(Arc::new(MemoryLineageStore::new())));
        let resolver = Arc::new(MemoryArtifactResolver::new());
        let assessor = QualityAssessor::new(tracker.clone(), resolver.clone());
        (assessor, resolver, tracker)
    }

    fn complete_entity(confidence: f64) -> Artifact {
        Artifact::new(ArtifactKind::Entity, confidence)
            .with_attribute("canonical_name", serde_json::json!("ACME Corp"))
            .with_attribute("entity_type", serde_json::json!("organization"))
    }

    #[test]
    fn test_missing_artifact_is_soft() {
        let (assessor, _, _) = assessor();
        let assessment = assessor.assess_quality("neo4j:entity:nope", AssessmentMethod::Automatic);

        assert_eq!(assessment.confidence, 0.0);
        assert_eq!(assessment.quality_tier, QualityTier::Low);
        assert!(assessment.warnings.iter().any(|w| w.contains("not found")));
    }

    #[test]
    fn test_automatic_weighted_sum() {
        let (assessor, resolver, _) = assessor();
        resolver
            .save("neo4j:entity:e1", complete_entity(0.9))
            .unwrap();

        let assessment = assessor.assess_quality("neo4j:entity:e1", AssessmentMethod::Automatic);
        // inherent 0.9, provenance 1.0 (no lineage), consistency 1.0,
        // completeness 1.0 -> 0.4*0.9 + 0.3 + 0.2 + 0.1
        assert!((assessment.confidence - 0.96).abs() < 1e-9);
        assert_eq!(assessment.quality_tier, QualityTier::High);
    }

    #[test]
    fn test_minimum_method_is_most_conservative() {
        let (assessor, resolver, _) = assessor();
        resolver
            .save("neo4j:entity:e1", complete_entity(0.6))
            .unwrap();

        let auto = assessor.assess_quality("neo4j:entity:e1", AssessmentMethod::Automatic);
        let min = assessor.assess_quality("neo4j:entity:e1", AssessmentMethod::Minimum);
        assert!(min.confidence <= auto.confidence);
        assert!((min.confidence - 0.6).abs() < 1e-9);
    }

    #[test]
    fn test_incomplete_relationship_penalized() {
        let (assessor, resolver, _) = assessor();
        let artifact = Artifact::new(ArtifactKind::Relationship, 0.9)
            .with_attribute("source_id", serde_json::json!("e1"));
        resolver.save("neo4j:relationship:r1", artifact).unwrap();

        let assessment =
            assessor.assess_quality("neo4j:relationship:r1", AssessmentMethod::Automatic);
        // Two of three required fields missing.
        assert!((assessment.component_scores.completeness - 0.5).abs() < 1e-9);
        assert!(assessment
            .warnings
            .iter()
            .any(|w| w.contains("missing required fields")));
        assert!(!assessment.recommendations.is_empty());
    }

    #[test]
    fn test_provenance_component_uses_lineage(){
        let (assessor, resolver, tracker) = assessor();
        let op = tracker
            .start_operation("entity_extraction", "ner", vec![], HashMap::new())
            .unwrap();
        tracker
            .complete_operation(op, vec!["neo4j:entity:e1".into()], None, 0.5)
            .unwrap();
        resolver
            .save("neo4j:entity:e1", complete_entity(1.0))
            .unwrap();

        let assessment = assessor.assess_quality("neo4j:entity:e1", AssessmentMethod::Automatic);
        assert!((assessment.component_scores.provenance - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_artifact_warnings_carry_through() {
        let (assessor, resolver, _) = assessor();
        let mut artifact = complete_entity(0.9);
        artifact.warnings.push("ocr quality low".to_string());
        resolver.save("neo4j:entity:e1", artifact).unwrap();

        let assessment = assessor.assess_quality("neo4j:entity:e1", AssessmentMethod::Automatic);
        assert!(assessment.warnings.iter().any(|w| w == "ocr quality low"));
    }

    #[test]
    fn test_update_quality_audit_trail() {
        let (assessor, resolver, _) = assessor();
        resolver
            .save("neo4j:entity:e1", complete_entity(0.9))
            .unwrap();

        assessor
            .update_quality("neo4j:entity:e1", 0.4, None, "manual review")
            .unwrap();

        let artifact = resolver.resolve("neo4j:entity:e1").unwrap().unwrap();
        assert_eq!(artifact.confidence, 0.4);
        assert_eq!(artifact.quality_tier, QualityTier::Low);
        assert!(artifact
            .warnings
            .iter()
            .any(|w| w.contains("0.900 -> 0.400") && w.contains("manual review")));
    }

    #[test]
    fn test_update_quality_missing_is_hard_error() {
        let (assessor, _, _) = assessor();
        let err = assessor
            .update_quality("neo4j:entity:nope", 0.4, None, "x")
            .unwrap_err();
        assert!(matches!(err, QualityError::ArtifactNotFound(_)));
    }

    #[test]
    fn test_unknown_method_string_means_mean() {
        let method: AssessmentMethod = "anything_else".parse().unwrap();
        assert_eq!(method, AssessmentMethod::Mean);
        assert_eq!("automatic".parse::<AssessmentMethod>().unwrap(), AssessmentMethod::Automatic);
        assert_eq!("minimum".parse::<AssessmentMethod>().unwrap(), AssessmentMethod::Minimum);
    }
}

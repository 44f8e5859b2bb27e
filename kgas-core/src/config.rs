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

//! Configuration for the uncertainty and provenance core
//!
//! All weights, thresholds, and penalty factors that the assessment
//! algorithms use are tunable here. The shipped defaults reproduce the
//! reference behavior; none of them is load-bearing beyond that.

use crate::confidence::ConfidenceWeights;
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Top-level configuration, one per process or per worker.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct KgasConfig {
    pub quality: QualityConfig,
    pub uncertainty: UncertaintyConfig,
    pub calibration: CalibrationConfig,
}

impl KgasConfig {
    /// Load configuration from a TOML file. Missing keys fall back to
    /// defaults, so partial files are valid.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&raw)?)
    }

    pub fn to_toml_file(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let raw = toml::to_string_pretty(self)?;
        std::fs::write(path, raw)?;
        Ok(())
    }

    /// Stricter tiers and warn thresholds for pipelines feeding
    /// downstream decisions.
    pub fn strict() -> Self {
        let mut config = Self::default();
        config.quality.tiers = TierThresholds {
            high: 0.9,
            medium: 0.7,
        };
        config.quality.warn_thresholds.confidence = 0.7;
        config.uncertainty.llm_max_retries = 2;
        config
    }

    /// No LLM retries and a short timeout, for interactive exploration.
    pub fn interactive() -> Self {
        let mut config = Self::default();
        config.uncertainty.llm_max_retries = 0;
        config.uncertainty.llm_timeout_secs = 10;
        config
    }
}

/// Weights for the four quality component scores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComponentWeights {
    pub inherent: f64,
    pub provenance: f64,
    pub consistency: f64,
    pub completeness: f64,
}

impl Default for ComponentWeights {
    fn default() -> Self {
        Self {
            inherent: 0.4,
            provenance: 0.3,
            consistency: 0.2,
            completeness: 0.1,
        }
    }
}

/// Confidence cut-offs for tier classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TierThresholds {
    pub high: f64,
    pub medium: f64,
}

impl Default for TierThresholds {
    fn default() -> Self {
        Self {
            high: 0.8,
            medium: 0.5,
        }
    }
}

/// Per-component thresholds below which a warning and recommendation
/// are emitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WarnThresholds {
    pub confidence: f64,
    pub inherent: f64,
    pub provenance: f64,
    pub consistency: f64,
    pub completeness: f64,
}

impl Default for WarnThresholds {
    fn default() -> Self {
        Self {
            confidence: 0.5,
            inherent: 0.5,
            provenance: 0.5,
            consistency: 0.7,
            completeness: 0.7,
        }
    }
}

/// Penalty factors applied by the consistency component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsistencyPenalties {
    /// Attribute count above which the artifact is considered bloated.
    pub max_attributes: usize,
    pub excessive_attributes_penalty: f64,
    /// Warning count above which trust is reduced.
    pub max_warnings: usize,
    pub excessive_warnings_penalty: f64,
    pub duplicate_surface_form_penalty: f64,
}

impl Default for ConsistencyPenalties {
    fn default() -> Self {
        Self {
            max_attributes: 20,
            excessive_attributes_penalty: 0.1,
            max_warnings: 3,
            excessive_warnings_penalty: 0.2,
            duplicate_surface_form_penalty: 0.15,
        }
    }
}

/// Configuration for quality assessment and propagation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QualityConfig {
    pub component_weights: ComponentWeights,
    pub tiers: TierThresholds,
    pub warn_thresholds: WarnThresholds,
    pub consistency: ConsistencyPenalties,
    /// Deducted per missing required field in the completeness score.
    pub missing_field_penalty: f64,
    /// Operation-type-specific propagation factors.
    pub operation_factors: HashMap<String, f64>,
    /// Factor used for operation types not in the table.
    pub default_operation_factor: f64,
    /// Degradation when an operation reports partial results.
    pub partial_results_factor: f64,
    /// Degradation when an operation had multiple candidate outputs.
    pub multiple_candidates_factor: f64,
    /// Population std-dev of input qualities above which the variance
    /// penalty triggers. The 0.2 default is a tunable, not a constant
    /// with any backing in the literature.
    pub variance_threshold: f64,
    pub variance_penalty_factor: f64,
}

impl Default for QualityConfig {
    fn default() -> Self {
        Self {
            component_weights: ComponentWeights::default(),
            tiers: TierThresholds::default(),
            warn_thresholds: WarnThresholds::default(),
            consistency: ConsistencyPenalties::default(),
            missing_field_penalty: 0.25,
            operation_factors: default_operation_factors(),
            default_operation_factor: 0.9,
            partial_results_factor: 0.8,
            multiple_candidates_factor: 0.9,
            variance_threshold: 0.2,
            variance_penalty_factor: 0.85,
        }
    }
}

fn default_operation_factors() -> HashMap<String, f64> {
    HashMap::from([
        ("entity_extraction".to_string(), 0.9),
        ("relationship_extraction".to_string(), 0.85),
        ("merge_operation".to_string(), 0.95),
        ("embedding".to_string(), 0.98),
        ("chunking".to_string(), 0.97),
        ("classification".to_string(), 0.9),
        ("cross_modal_conversion".to_string(), 0.88),
    ])
}

/// Configuration for the uncertainty engine and Bayesian updates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UncertaintyConfig {
    pub confidence_weights: ConfidenceWeights,
    /// Fixed reduction of estimation uncertainty per evidence update.
    pub uncertainty_decrement: f64,
    /// Estimation uncertainty never drops below this floor.
    pub uncertainty_floor: f64,
    /// Evidence count at which adequacy saturates.
    pub adequacy_saturation: u32,
    /// Scale of a full-strength evidence contribution in log-odds.
    pub log_odds_scale: f64,
    /// Hard cap, in log-odds per unit reliability, on how far a single
    /// evidence item may swing the belief.
    pub max_swing_per_reliability: f64,
    /// Bound on concurrent LLM-backed assessments.
    pub max_concurrent_assessments: usize,
    pub llm_timeout_secs: u64,
    /// Bounded retries around the network call layer; fallback defaults
    /// still apply on exhaustion.
    pub llm_max_retries: u32,
    pub cache_ttl_secs: u64,
}

impl Default for UncertaintyConfig {
    fn default() -> Self {
        Self {
            confidence_weights: ConfidenceWeights::default(),
            uncertainty_decrement: 0.05,
            uncertainty_floor: 0.1,
            adequacy_saturation: 20,
            log_odds_scale: 2.0,
            max_swing_per_reliability: 3.0,
            max_concurrent_assessments: 8,
            llm_timeout_secs: 30,
            llm_max_retries: 1,
            cache_ttl_secs: 3600,
        }
    }
}

/// Configuration for cross-calibration of paired estimates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationConfig {
    /// Fraction of the computed pull applied per iteration.
    pub adjustment_rate: f64,
    /// |difference| at or below which the estimates count as converged.
    pub convergence_threshold: f64,
    pub max_iterations: u32,
    pub floor: f64,
    pub ceiling: f64,
    /// Weight of inter-estimate agreement in the mutual consistency score.
    pub agreement_weight: f64,
    /// Weight of ground-truth proximity, when ground truth is available.
    pub truth_weight: f64,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            adjustment_rate: 0.3,
            convergence_threshold: 0.15,
            max_iterations: 5,
            floor: 0.05,
            ceiling: 0.95,
            agreement_weight: 0.6,
            truth_weight: 0.4,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_weights_sum_to_one() {
        let w = ComponentWeights::default();
        assert!((w.inherent + w.provenance + w.consistency + w.completeness - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_merge_operation_factor_default() {
        let config = QualityConfig::default();
        assert_eq!(config.operation_factors.get("merge_operation"), Some(&0.95));
        assert_eq!(config.default_operation_factor, 0.9);
    }

    #[test]
    fn test_toml_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kgas.toml");

        let mut config = KgasConfig::default();
        config.quality.variance_threshold = 0.3;
        config.calibration.max_iterations = 7;
        config.to_toml_file(&path).unwrap();

        let loaded = KgasConfig::from_toml_file(&path).unwrap();
        assert_eq!(loaded.quality.variance_threshold, 0.3);
        assert_eq!(loaded.calibration.max_iterations, 7);
        assert_eq!(loaded.uncertainty.adequacy_saturation, 20);
    }

    #[test]
    fn test_strict_preset_tightens_tiers() {
        let config = KgasConfig::strict();
        assert_eq!(config.quality.tiers.high, 0.9);
        assert_eq!(config.quality.tiers.medium, 0.7);
        // Unrelated knobs keep their defaults.
        assert_eq!(config.quality.variance_threshold, 0.2);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("partial.toml");
        std::fs::write(&path, "[calibration]\nadjustment_rate = 0.2\n").unwrap();

        let loaded = KgasConfig::from_toml_file(&path).unwrap();
        assert_eq!(loaded.calibration.adjustment_rate, 0.2);
        assert_eq!(loaded.calibration.max_iterations, 5);
        assert_eq!(loaded.quality.tiers.high, 0.8);
    }
}

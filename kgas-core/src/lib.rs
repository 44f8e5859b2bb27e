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

//! KGAS Core
//!
//! Fundamental data structures and contracts shared across the KGAS
//! uncertainty and provenance engine:
//!
//! - **ConfidenceScore**: copy-on-write confidence value object with
//!   CERQual sub-dimensions and an append-only update history
//! - **Evidence**: immutable observation records consumed by belief updates
//! - **Artifact model**: typed artifacts and opaque `backend:kind:id`
//!   reference routing
//! - **Configuration**: tunable weights, thresholds, and penalty factors
//!   with TOML round-tripping

pub mod artifact;
pub mod config;
pub mod confidence;
pub mod error;
pub mod evidence;
pub mod history;

pub use artifact::{Artifact, ArtifactKind, ArtifactRef, QualityTier};
pub use config::{
    CalibrationConfig, ComponentWeights, ConsistencyPenalties, KgasConfig, QualityConfig,
    TierThresholds, UncertaintyConfig, WarnThresholds,
};
pub use confidence::{ConfidenceScore, ConfidenceWeights};
pub use error::{ConfigError, ReferenceError};
pub use evidence::Evidence;
pub use history::{UpdateAction, UpdateLogEntry};

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

//! KGAS Quality Assessment
//!
//! Composite confidence scoring for artifacts: an artifact's own stored
//! confidence, its provenance-derived confidence, internal consistency,
//! and completeness are combined into a single score and classified into
//! quality tiers.
//!
//! ## Failure posture
//!
//! Quality assessment must be able to summarize over partially-missing
//! data, so an unresolvable artifact yields a zero-confidence, low-tier
//! assessment with a warning, never an error. Only administrative
//! mutation (`update_quality`) treats a missing artifact as a hard
//! failure.

pub mod assessor;
pub mod error;
pub mod propagation;
pub mod report;
pub mod resolver;

pub use assessor::{AssessmentMethod, ComponentScores, QualityAssessment, QualityAssessor};
pub use error::{QualityError, Result};
pub use propagation::PropagationOutcome;
pub use report::QualityReport;
pub use resolver::{ArtifactResolver, MemoryArtifactResolver, ResolverError};

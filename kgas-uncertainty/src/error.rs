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

//! Uncertainty engine errors
//!
//! External-call failures are recovered inside the assessment APIs with
//! documented defaults; these types surface only from adjuster plumbing
//! and from the LLM layer itself.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, UncertaintyError>;

/// Errors from LLM clients.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("API error: {0}")]
    Api(String),

    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    #[error("Request timed out after {0}s")]
    Timeout(u64),

    #[error("No JSON object found in completion")]
    MissingJson,

    #[error("Schema-invalid response: {0}")]
    InvalidResponse(String),

    #[error("All {attempts} attempts exhausted: {last_error}")]
    Exhausted { attempts: u32, last_error: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum UncertaintyError {
    #[error(transparent)]
    Llm(#[from] LlmError),

    /// A modality adjuster could not produce an adjustment; callers of
    /// the translation API never see this, they get the conservative
    /// fallback translation instead.
    #[error("Modality adjustment failed: {0}")]
    AdjustmentFailed(String),
}

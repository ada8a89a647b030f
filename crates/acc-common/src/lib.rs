//! # ACC Common
//!
//! Shared value types and errors for the Agent Cognitive Compressor.
//!
//! ## Core Types
//!
//! - [`CompressedCognitiveState`]: bounded memory committed (replaced) once per turn
//! - [`Artifact`]: immutable evidence unit eligible for recall
//! - [`TurnInteractionSignal`]/[`AgentDecision`]: per-turn input and output
//! - [`AgentTurnEvaluationRecord`]/[`AgentEvaluationSummary`]: judge scores and aggregates
//!
//! ## Errors
//!
//! - [`ValidationError`]: malformed CCS payloads and invalid arguments
//! - [`UpstreamError`]: configuration, transport and response-format failures of the model
//! - [`EvaluationError`]: evaluation harness contract violations

pub mod error;
pub mod types;

// Re-export commonly used types at crate root
pub use error::{AccError, EvaluationError, Result, UpstreamError, ValidationError};
pub use types::{
    artifact::Artifact,
    ccs::{CcsPayload, CompressedCognitiveState, UncertaintyLevel},
    evaluation::{
        AgentEvaluationSummary, AgentTurnEvaluationRecord, DriftAudit, HallucinationAudit,
        OutcomeScores,
    },
    interaction::{AgentDecision, RecentDialogueTurn, TurnInteractionSignal},
    live_evaluation::{
        AgentTurnResponse, CanonicalMemory, EvaluationTurnQuery, JudgeAgentEvaluation,
        JudgeTurnResult, LiveEvaluationEpisodeResult,
    },
};

/// ACC version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

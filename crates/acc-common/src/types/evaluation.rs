//! Evaluation value objects
//!
//! Turn-level judge scores and audits, and the per-agent summary derived from them.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Highest score a judge may assign on any outcome dimension
pub const MAX_OUTCOME_SCORE: f64 = 10.0;

/// Outcome scores for one turn, each in [0, 10]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OutcomeScores {
    pub relevance: f64,
    pub answer_quality: f64,
    pub instruction_following: f64,
    pub coherence: f64,
}

impl OutcomeScores {
    /// Create scores, rejecting any value outside [0, 10]
    pub fn new(
        relevance: f64,
        answer_quality: f64,
        instruction_following: f64,
        coherence: f64,
    ) -> Result<Self, ValidationError> {
        let scores = Self {
            relevance,
            answer_quality,
            instruction_following,
            coherence,
        };
        scores.validate()?;
        Ok(scores)
    }

    /// Check the score range (useful for deserialized judge output)
    pub fn validate(&self) -> Result<(), ValidationError> {
        for (name, value) in [
            ("relevance", self.relevance),
            ("answer_quality", self.answer_quality),
            ("instruction_following", self.instruction_following),
            ("coherence", self.coherence),
        ] {
            if !(0.0..=MAX_OUTCOME_SCORE).contains(&value) {
                return Err(ValidationError::InvalidArgument(format!(
                    "{name} must be within 0.0..=10.0, got {value}"
                )));
            }
        }
        Ok(())
    }

    /// Scores as an array in declaration order
    pub fn as_array(&self) -> [f64; 4] {
        [
            self.relevance,
            self.answer_quality,
            self.instruction_following,
            self.coherence,
        ]
    }

    /// Build from an array in declaration order (no range check)
    pub(crate) fn from_array(values: [f64; 4]) -> Self {
        Self {
            relevance: values[0],
            answer_quality: values[1],
            instruction_following: values[2],
            coherence: values[3],
        }
    }
}

/// Claims in a response that are supported/unsupported by evidence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HallucinationAudit {
    pub supported_claims: u32,
    pub unsupported_claims: u32,
}

impl HallucinationAudit {
    pub fn new(supported_claims: u32, unsupported_claims: u32) -> Self {
        Self {
            supported_claims,
            unsupported_claims,
        }
    }
}

/// Constraint violations and omissions relative to the previous state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriftAudit {
    pub violations: u32,
    pub omissions: u32,
    pub active_constraints: Vec<String>,
}

impl DriftAudit {
    pub fn new<I, S>(violations: u32, omissions: u32, active_constraints: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            violations,
            omissions,
            active_constraints: active_constraints.into_iter().map(Into::into).collect(),
        }
    }
}

/// One judged turn of one agent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentTurnEvaluationRecord {
    pub turn_id: u32,
    pub outcome_scores: OutcomeScores,
    pub hallucination_audit: HallucinationAudit,
    /// Absent on turns with no previous state to drift from
    pub drift_audit: Option<DriftAudit>,
    pub memory_tokens: u64,
}

impl AgentTurnEvaluationRecord {
    pub fn new(
        turn_id: u32,
        outcome_scores: OutcomeScores,
        hallucination_audit: HallucinationAudit,
        drift_audit: Option<DriftAudit>,
        memory_tokens: u64,
    ) -> Result<Self, ValidationError> {
        if turn_id < 1 {
            return Err(ValidationError::InvalidArgument(
                "turn_id must be at least 1".to_string(),
            ));
        }
        Ok(Self {
            turn_id,
            outcome_scores,
            hallucination_audit,
            drift_audit,
            memory_tokens,
        })
    }
}

/// Aggregate of one agent's turn records (derived, read-only)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentEvaluationSummary {
    pub total_turns: usize,
    pub outcome_mean: OutcomeScores,
    /// Population standard deviation per dimension
    pub outcome_std: OutcomeScores,
    pub hallucination_turn_rates: Vec<f64>,
    pub hallucination_average: f64,
    /// Only turns ≥ 2 that carry a drift audit
    pub drift_turn_rates: Vec<f64>,
    pub drift_average: Option<f64>,
    pub memory_tokens_by_turn: Vec<u64>,
    pub memory_average: f64,
    pub memory_last_turn: Option<u64>,
}

impl AgentEvaluationSummary {
    /// Assemble a summary from per-dimension means and standard deviations
    #[allow(clippy::too_many_arguments)]
    pub fn from_parts(
        total_turns: usize,
        outcome_mean: [f64; 4],
        outcome_std: [f64; 4],
        hallucination_turn_rates: Vec<f64>,
        hallucination_average: f64,
        drift_turn_rates: Vec<f64>,
        drift_average: Option<f64>,
        memory_tokens_by_turn: Vec<u64>,
        memory_average: f64,
    ) -> Self {
        let memory_last_turn = memory_tokens_by_turn.last().copied();
        Self {
            total_turns,
            outcome_mean: OutcomeScores::from_array(outcome_mean),
            outcome_std: OutcomeScores::from_array(outcome_std),
            hallucination_turn_rates,
            hallucination_average,
            drift_turn_rates,
            drift_average,
            memory_tokens_by_turn,
            memory_average,
            memory_last_turn,
        }
    }
}

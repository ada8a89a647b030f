//! Live multi-agent evaluation value objects

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::evaluation::{
    AgentEvaluationSummary, AgentTurnEvaluationRecord, DriftAudit, HallucinationAudit,
    OutcomeScores,
};
use crate::error::ValidationError;

/// Judge-owned shared context, distinct from any agent's CCS
pub type CanonicalMemory = Map<String, Value>;

/// One query of an evaluation episode
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationTurnQuery {
    pub turn_id: u32,
    pub user_query: String,
}

impl EvaluationTurnQuery {
    pub fn new(turn_id: u32, user_query: impl Into<String>) -> Result<Self, ValidationError> {
        let user_query = user_query.into();
        if turn_id < 1 {
            return Err(ValidationError::InvalidArgument(
                "turn_id must be at least 1".to_string(),
            ));
        }
        if user_query.trim().is_empty() {
            return Err(ValidationError::InvalidArgument(
                "user_query must not be blank".to_string(),
            ));
        }
        Ok(Self {
            turn_id,
            user_query,
        })
    }
}

/// What an agent runner answered for one query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentTurnResponse {
    pub response_text: String,
    pub memory_tokens: u64,
}

impl AgentTurnResponse {
    pub fn new(
        response_text: impl Into<String>,
        memory_tokens: u64,
    ) -> Result<Self, ValidationError> {
        let response_text = response_text.into();
        if response_text.trim().is_empty() {
            return Err(ValidationError::InvalidArgument(
                "response_text must not be blank".to_string(),
            ));
        }
        Ok(Self {
            response_text,
            memory_tokens,
        })
    }
}

/// Judge verdict for a single agent on a single turn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JudgeAgentEvaluation {
    pub outcome_scores: OutcomeScores,
    pub hallucination_audit: HallucinationAudit,
    pub drift_audit: Option<DriftAudit>,
}

/// Judge output for one turn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JudgeTurnResult {
    /// Replaces the canonical memory for the next query
    pub updated_canonical_memory: CanonicalMemory,
    pub evaluations_by_agent: BTreeMap<String, JudgeAgentEvaluation>,
}

/// Final result of an evaluation episode
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiveEvaluationEpisodeResult {
    pub turn_records_by_agent: BTreeMap<String, Vec<AgentTurnEvaluationRecord>>,
    pub summaries_by_agent: BTreeMap<String, AgentEvaluationSummary>,
    pub final_canonical_memory: CanonicalMemory,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_validation() {
        assert!(EvaluationTurnQuery::new(0, "q").is_err());
        assert!(EvaluationTurnQuery::new(1, " ").is_err());
        assert!(EvaluationTurnQuery::new(1, "q1").is_ok());
    }

    #[test]
    fn test_response_validation() {
        assert!(AgentTurnResponse::new("\n", 0).is_err());
        assert_eq!(AgentTurnResponse::new("ok", 42).unwrap().memory_tokens, 42);
    }
}

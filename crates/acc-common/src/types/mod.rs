//! Core ACC value types

pub mod artifact;
pub mod ccs;
pub mod evaluation;
pub mod interaction;
pub mod live_evaluation;

pub use artifact::Artifact;
pub use ccs::{CcsPayload, CompressedCognitiveState, UncertaintyLevel};
pub use evaluation::{
    AgentEvaluationSummary, AgentTurnEvaluationRecord, DriftAudit, HallucinationAudit,
    OutcomeScores,
};
pub use interaction::{AgentDecision, RecentDialogueTurn, TurnInteractionSignal};
pub use live_evaluation::{
    AgentTurnResponse, CanonicalMemory, EvaluationTurnQuery, JudgeAgentEvaluation,
    JudgeTurnResult, LiveEvaluationEpisodeResult,
};

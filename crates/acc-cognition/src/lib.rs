//! # ACC Cognition
//!
//! Agent Cognitive Compressor: a multiturn control loop that keeps a bounded,
//! schema-validated memory (the Compressed Cognitive State) instead of a growing
//! transcript.
//!
//! ## Key Concepts
//!
//! - **Recall**: rank stored artifacts against the current input
//! - **Qualification**: keep only the recalled artifacts relevant to the decision
//! - **Commit**: compress input + qualified evidence + prior state into the next CCS,
//!   replacing (never merging) the previous one
//! - **Decide**: answer conditioned on the freshly committed state
//! - **Persist**: store the turn's input/output as evidence for later recall
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                  ChatSessionService                     │
//! │   (session registry, dialogue buffer, turn counter)     │
//! │  ┌───────────────────────────────────────────────┐      │
//! │  │               AccControlLoop                  │      │
//! │  │  RECALL → QUALIFY → COMMIT → DECIDE → PERSIST │      │
//! │  └──────┬──────────┬──────────┬────────┬─────────┘      │
//! │         │          │          │        │                │
//! │  ┌──────┴───┐ ┌────┴─────┐ ┌──┴─────┐ ┌┴────────────┐   │
//! │  │ Recall   │ │Qualifier │ │Compress│ │AgentPolicy  │   │
//! │  └──────┬───┘ └──────────┘ └──┬─────┘ └┬────────────┘   │
//! │         │                     │        │                │
//! │  ┌──────┴───────────┐   ┌─────┴────────┴──────┐         │
//! │  │ ArtifactMemory   │   │ TextModel (opaque)  │         │
//! │  └──────────────────┘   └─────────────────────┘         │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! The evaluation side ([`domain::metrics`], [`domain::live_evaluation`]) scores
//! agents turn by turn and aggregates per-agent summaries.

pub mod config;
pub mod domain;
pub mod infra;

// Re-export core types
pub use domain::compressor::{
    CognitiveCompressor, CompressorModel, RuleBasedCompressor, SchemaAwareCompressor,
};
pub use domain::control_loop::{AccControlLoop, AccControlLoopBuilder, TurnResult};
pub use domain::live_evaluation::{
    AgentRunner, ControlLoopAgentRunner, JudgeEvaluator, LiveMultiAgentEvaluation,
};
pub use domain::metrics::{
    drift_turn_rate, hallucination_turn_rate, summarize_agent_records, summarize_agents,
};
pub use domain::policy::{AgentPolicy, EchoAgentPolicy};
pub use domain::qualification::{ArtifactQualification, TokenOverlapQualification};
pub use domain::recall::{ArtifactRecall, TokenOverlapRecall};
pub use domain::schema::{parse_and_validate, ListLimits, DEFAULT_LIST_LIMITS};
pub use domain::session::{
    ChatMechanism, ChatReply, ChatSessionService, DialogueBuffer, SessionRegistry,
};

// Re-export infrastructure
pub use infra::clock::{Clock, ManualClock, SystemClock};
pub use infra::evidence_store::{
    ArtifactMemory, EvidenceStore, MemoryEvidenceStore, StoredTurnEvidence,
};
pub use infra::model::{
    parse_json_object, CompletionRequest, ModelAgentPolicy, ModelCompressor, TextModel,
};

/// ACC version
pub const ACC_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default number of artifacts recalled per turn
pub const DEFAULT_RECALL_LIMIT: usize = 5;

/// Default number of live chat sessions before the oldest is evicted
pub const DEFAULT_MAX_SESSIONS: usize = 200;

/// Default number of recent dialogue turns handed to the policy
pub const DEFAULT_SHORT_HISTORY_TURNS: usize = 2;

/// Default cap on artifact ids kept in `retrieved_artifacts` by the rule-based compressor
pub const DEFAULT_MAX_RETRIEVED_ARTIFACTS: usize = 5;

/// Source tag of artifacts created from persisted turns
pub const TURN_EVIDENCE_SOURCE: &str = "turn-evidence";

/// Source prefix of artifacts that always qualify
pub const CONSTRAINT_SOURCE_PREFIX: &str = "constraint";

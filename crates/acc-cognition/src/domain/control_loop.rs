//! ACC Control Loop
//!
//! One turn runs RECALL → QUALIFY → COMMIT → DECIDE → PERSIST, strictly in
//! that order. A failure at any stage aborts the turn before evidence is
//! persisted, so the caller's committed state stays untouched.

use std::sync::Arc;

use acc_common::{
    AccError, AgentDecision, Artifact, CompressedCognitiveState, RecentDialogueTurn, Result,
    TurnInteractionSignal,
};
use tracing::{debug, info, instrument, warn};

use super::compressor::CognitiveCompressor;
use super::policy::AgentPolicy;
use super::qualification::{ArtifactQualification, TokenOverlapQualification};
use super::recall::{ArtifactRecall, TokenOverlapRecall};
use crate::config::LoopSettings;
use crate::infra::evidence_store::{ArtifactMemory, EvidenceStore, MemoryEvidenceStore};

/// Outcome of one turn
#[derive(Debug, Clone, PartialEq)]
pub struct TurnResult {
    /// State committed this turn (replaces the prior one)
    pub committed_state: CompressedCognitiveState,
    /// Artifacts fetched this turn, capped at the recall limit
    pub recalled: Vec<Artifact>,
    /// Subset of `recalled` that passed qualification
    pub qualified: Vec<Artifact>,
    pub decision: AgentDecision,
}

/// Orchestrates the five ports for each turn
pub struct AccControlLoop {
    recall: Arc<dyn ArtifactRecall>,
    qualification: Arc<dyn ArtifactQualification>,
    compressor: Arc<dyn CognitiveCompressor>,
    policy: Arc<dyn AgentPolicy>,
    evidence_store: Arc<dyn EvidenceStore>,
    role: String,
    tools: Vec<String>,
    recall_limit: usize,
}

impl AccControlLoop {
    /// Create a builder
    pub fn builder() -> AccControlLoopBuilder {
        AccControlLoopBuilder::new()
    }

    /// Wire token-overlap recall and turn-evidence persistence over one memory
    pub fn in_memory(
        memory: Arc<ArtifactMemory>,
        compressor: Arc<dyn CognitiveCompressor>,
        policy: Arc<dyn AgentPolicy>,
        settings: &LoopSettings,
    ) -> Result<Self> {
        Self::builder()
            .recall(Arc::new(TokenOverlapRecall::new(memory.clone())))
            .evidence_store(Arc::new(MemoryEvidenceStore::new(memory)))
            .compressor(compressor)
            .policy(policy)
            .role(settings.role.clone())
            .tools(settings.tools.clone())
            .recall_limit(settings.recall_limit)
            .build()
    }

    pub fn role(&self) -> &str {
        &self.role
    }

    pub fn tools(&self) -> &[String] {
        &self.tools
    }

    pub fn recall_limit(&self) -> usize {
        self.recall_limit
    }

    /// Run a single turn against the committed `state`
    #[instrument(skip_all, fields(turn_id = signal.turn_id))]
    pub async fn run_turn(
        &self,
        signal: &TurnInteractionSignal,
        state: &CompressedCognitiveState,
        recent_turns: &[RecentDialogueTurn],
    ) -> Result<TurnResult> {
        // RECALL
        let mut recalled = self.recall.recall(signal, state, self.recall_limit).await?;
        if recalled.len() > self.recall_limit {
            warn!(
                returned = recalled.len(),
                limit = self.recall_limit,
                "Recall strategy over-returned, truncating"
            );
            recalled.truncate(self.recall_limit);
        }

        // QUALIFY
        let qualified: Vec<Artifact> = recalled
            .iter()
            .filter(|artifact| self.qualification.is_relevant(artifact, state, signal))
            .cloned()
            .collect();
        debug!(
            recalled = recalled.len(),
            qualified = qualified.len(),
            "Qualified recalled artifacts"
        );

        // COMMIT
        let committed_state = self.compressor.commit(signal, state, &qualified).await?;

        // DECIDE on the new state, never the prior one
        let decision = self
            .policy
            .decide(
                Some(signal),
                recent_turns,
                &committed_state,
                &self.role,
                &self.tools,
            )
            .await?;

        // PERSIST
        let artifact = self
            .evidence_store
            .persist_turn_evidence(signal, &decision)
            .await?;
        debug!(artifact_id = %artifact.artifact_id, "Turn complete");

        Ok(TurnResult {
            committed_state,
            recalled,
            qualified,
            decision,
        })
    }

    /// Fold [`run_turn`](Self::run_turn) over `signals`, threading the state
    pub async fn run_horizon(
        &self,
        initial_state: CompressedCognitiveState,
        signals: &[TurnInteractionSignal],
    ) -> Result<(CompressedCognitiveState, Vec<TurnResult>)> {
        let mut state = initial_state;
        let mut results = Vec::with_capacity(signals.len());

        for signal in signals {
            let result = self.run_turn(signal, &state, &[]).await?;
            state = result.committed_state.clone();
            results.push(result);
        }

        info!(turns = results.len(), "Horizon complete");
        Ok((state, results))
    }
}

/// Builder for [`AccControlLoop`]
pub struct AccControlLoopBuilder {
    recall: Option<Arc<dyn ArtifactRecall>>,
    qualification: Arc<dyn ArtifactQualification>,
    compressor: Option<Arc<dyn CognitiveCompressor>>,
    policy: Option<Arc<dyn AgentPolicy>>,
    evidence_store: Option<Arc<dyn EvidenceStore>>,
    role: String,
    tools: Vec<String>,
    recall_limit: usize,
}

impl AccControlLoopBuilder {
    /// Create a builder with token-overlap qualification and default settings
    pub fn new() -> Self {
        let settings = LoopSettings::default();
        Self {
            recall: None,
            qualification: Arc::new(TokenOverlapQualification),
            compressor: None,
            policy: None,
            evidence_store: None,
            role: settings.role,
            tools: settings.tools,
            recall_limit: settings.recall_limit,
        }
    }

    pub fn recall(mut self, recall: Arc<dyn ArtifactRecall>) -> Self {
        self.recall = Some(recall);
        self
    }

    pub fn qualification(mut self, qualification: Arc<dyn ArtifactQualification>) -> Self {
        self.qualification = qualification;
        self
    }

    pub fn compressor(mut self, compressor: Arc<dyn CognitiveCompressor>) -> Self {
        self.compressor = Some(compressor);
        self
    }

    pub fn policy(mut self, policy: Arc<dyn AgentPolicy>) -> Self {
        self.policy = Some(policy);
        self
    }

    pub fn evidence_store(mut self, evidence_store: Arc<dyn EvidenceStore>) -> Self {
        self.evidence_store = Some(evidence_store);
        self
    }

    pub fn role(mut self, role: impl Into<String>) -> Self {
        self.role = role.into();
        self
    }

    pub fn tools<I, S>(mut self, tools: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tools = tools.into_iter().map(Into::into).collect();
        self
    }

    pub fn recall_limit(mut self, recall_limit: usize) -> Self {
        self.recall_limit = recall_limit;
        self
    }

    /// Build the loop
    pub fn build(self) -> Result<AccControlLoop> {
        if self.recall_limit < 1 {
            return Err(AccError::invalid_argument("recall_limit must be at least 1"));
        }
        let recall = self
            .recall
            .ok_or_else(|| AccError::invalid_argument("recall strategy is required"))?;
        let compressor = self
            .compressor
            .ok_or_else(|| AccError::invalid_argument("compressor is required"))?;
        let policy = self
            .policy
            .ok_or_else(|| AccError::invalid_argument("agent policy is required"))?;
        let evidence_store = self
            .evidence_store
            .ok_or_else(|| AccError::invalid_argument("evidence store is required"))?;

        Ok(AccControlLoop {
            recall,
            qualification: self.qualification,
            compressor,
            policy,
            evidence_store,
            role: self.role,
            tools: self.tools,
            recall_limit: self.recall_limit,
        })
    }
}

impl Default for AccControlLoopBuilder {
    fn default() -> Self {
        Self::new()
    }
}

//! Evidence Storage
//!
//! In-process artifact memory shared by recall and persistence.

use std::sync::Arc;

use acc_common::{AgentDecision, Artifact, Result, TurnInteractionSignal};
use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::clock::{Clock, SystemClock};

/// Persists the input/output of a finished turn
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EvidenceStore: Send + Sync {
    /// Store the turn as a new artifact
    async fn persist_turn_evidence(
        &self,
        signal: &TurnInteractionSignal,
        decision: &AgentDecision,
    ) -> Result<Artifact>;
}

/// Links a turn's I/O to the artifact it generated
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredTurnEvidence {
    pub interaction_signal: TurnInteractionSignal,
    pub decision: AgentDecision,
    pub artifact_id: String,
}

/// Append-only artifact and turn record store
pub struct ArtifactMemory {
    /// Seeded and persisted artifacts, in insertion order
    artifacts: RwLock<Vec<Artifact>>,
    /// One record per persisted turn
    turn_records: RwLock<Vec<StoredTurnEvidence>>,
    clock: Arc<dyn Clock>,
}

impl ArtifactMemory {
    /// Create an empty memory on the system clock
    pub fn new() -> Self {
        Self::with_seed(Vec::new(), Arc::new(SystemClock))
    }

    /// Create a memory holding seed artifacts
    pub fn with_seed(seed_artifacts: Vec<Artifact>, clock: Arc<dyn Clock>) -> Self {
        Self {
            artifacts: RwLock::new(seed_artifacts),
            turn_records: RwLock::new(Vec::new()),
            clock,
        }
    }

    /// Snapshot of all artifacts
    pub fn list_artifacts(&self) -> Vec<Artifact> {
        self.artifacts.read().clone()
    }

    /// Snapshot of all turn records
    pub fn turn_records(&self) -> Vec<StoredTurnEvidence> {
        self.turn_records.read().clone()
    }

    /// Number of stored artifacts
    pub fn artifact_count(&self) -> usize {
        self.artifacts.read().len()
    }

    /// Turn a finished turn into an artifact and record it
    ///
    /// The id is `{source}-{turn_id}-{sequence}` where sequence counts
    /// persisted turns starting at 1.
    pub fn append_turn_evidence(
        &self,
        signal: &TurnInteractionSignal,
        decision: &AgentDecision,
        source: &str,
    ) -> Result<Artifact> {
        let timestamp = self.clock.now();

        // Both locks are held so the sequence and the append stay consistent
        let mut records = self.turn_records.write();
        let mut artifacts = self.artifacts.write();

        let artifact = Artifact::new(
            format!("{}-{}-{}", source, signal.turn_id, records.len() + 1),
            format!("user:{}\nassistant:{}", signal.user_input, decision.response),
            source,
            timestamp,
        )?;

        artifacts.push(artifact.clone());
        records.push(StoredTurnEvidence {
            interaction_signal: signal.clone(),
            decision: decision.clone(),
            artifact_id: artifact.artifact_id.clone(),
        });

        debug!(artifact_id = %artifact.artifact_id, "Persisted turn evidence");
        Ok(artifact)
    }
}

impl Default for ArtifactMemory {
    fn default() -> Self {
        Self::new()
    }
}

/// Evidence store backed by an [`ArtifactMemory`]
pub struct MemoryEvidenceStore {
    memory: Arc<ArtifactMemory>,
    source: String,
}

impl MemoryEvidenceStore {
    /// Create a store tagging artifacts as turn evidence
    pub fn new(memory: Arc<ArtifactMemory>) -> Self {
        Self::with_source(memory, crate::TURN_EVIDENCE_SOURCE)
    }

    /// Create a store with a custom source tag
    pub fn with_source(memory: Arc<ArtifactMemory>, source: impl Into<String>) -> Self {
        Self {
            memory,
            source: source.into(),
        }
    }

    /// The underlying memory
    pub fn memory(&self) -> &Arc<ArtifactMemory> {
        &self.memory
    }
}

#[async_trait]
impl EvidenceStore for MemoryEvidenceStore {
    async fn persist_turn_evidence(
        &self,
        signal: &TurnInteractionSignal,
        decision: &AgentDecision,
    ) -> Result<Artifact> {
        self.memory
            .append_turn_evidence(signal, decision, &self.source)
    }
}

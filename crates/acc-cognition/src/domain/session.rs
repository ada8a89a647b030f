//! Chat sessions
//!
//! Each session owns one control loop over its own artifact memory, the
//! committed state, a turn counter and a short dialogue buffer. Sessions are
//! kept in insertion order and the oldest is evicted once `max_sessions` is
//! reached.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use acc_common::{
    AccError, CompressedCognitiveState, RecentDialogueTurn, Result, TurnInteractionSignal,
    ValidationError,
};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use super::compressor::CognitiveCompressor;
use super::control_loop::AccControlLoop;
use super::policy::AgentPolicy;
use crate::config::{LoopSettings, SessionSettings};
use crate::infra::evidence_store::ArtifactMemory;

/// Keyed store remembering insertion order
#[derive(Debug)]
pub struct SessionRegistry<K, V> {
    entries: HashMap<K, V>,
    order: VecDeque<K>,
}

impl<K, V> SessionRegistry<K, V>
where
    K: std::hash::Hash + Eq + Clone,
{
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
            order: VecDeque::new(),
        }
    }

    /// Insert or replace; a replaced key keeps its original position
    pub fn insert(&mut self, key: K, value: V) {
        if self.entries.insert(key.clone(), value).is_none() {
            self.order.push_back(key);
        }
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        self.entries.get(key)
    }

    /// Remove and return the oldest entry
    pub fn evict_oldest(&mut self) -> Option<(K, V)> {
        while let Some(key) = self.order.pop_front() {
            if let Some(value) = self.entries.remove(&key) {
                return Some((key, value));
            }
        }
        None
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K, V> Default for SessionRegistry<K, V>
where
    K: std::hash::Hash + Eq + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

/// Bounded FIFO of recent dialogue turns
#[derive(Debug, Clone)]
pub struct DialogueBuffer {
    capacity: usize,
    turns: VecDeque<RecentDialogueTurn>,
}

impl DialogueBuffer {
    /// A capacity of 0 keeps nothing
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            turns: VecDeque::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, turn: RecentDialogueTurn) {
        if self.capacity == 0 {
            self.turns.clear();
            return;
        }
        self.turns.push_back(turn);
        while self.turns.len() > self.capacity {
            self.turns.pop_front();
        }
    }

    /// Oldest first
    pub fn to_vec(&self) -> Vec<RecentDialogueTurn> {
        self.turns.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}

/// Pipeline counters and the state committed by the turn
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMechanism {
    pub recalled_artifact_count: usize,
    pub qualified_artifact_count: usize,
    pub committed_state: CompressedCognitiveState,
}

/// Reply to one chat message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatReply {
    pub session_id: String,
    pub turn_id: u32,
    pub reply: String,
    pub memory_tokens: u64,
    pub mechanism: ChatMechanism,
}

struct SessionContext {
    control_loop: AccControlLoop,
    committed_state: CompressedCognitiveState,
    turn_id: u32,
    dialogue: DialogueBuffer,
    memory: Arc<ArtifactMemory>,
}

type SharedSession = Arc<tokio::sync::Mutex<SessionContext>>;

/// Runs ACC chats, one control loop per session
pub struct ChatSessionService {
    compressor: Arc<dyn CognitiveCompressor>,
    policy: Arc<dyn AgentPolicy>,
    loop_settings: LoopSettings,
    session_settings: SessionSettings,
    sessions: Mutex<SessionRegistry<String, SharedSession>>,
}

impl ChatSessionService {
    pub fn new(
        compressor: Arc<dyn CognitiveCompressor>,
        policy: Arc<dyn AgentPolicy>,
        loop_settings: LoopSettings,
        session_settings: SessionSettings,
    ) -> Result<Self> {
        if session_settings.max_sessions < 1 {
            return Err(AccError::invalid_argument("max_sessions must be at least 1"));
        }
        if loop_settings.recall_limit < 1 {
            return Err(AccError::invalid_argument("recall_limit must be at least 1"));
        }
        Ok(Self {
            compressor,
            policy,
            loop_settings,
            session_settings,
            sessions: Mutex::new(SessionRegistry::new()),
        })
    }

    /// Start a session, evicting the oldest one when full
    pub fn create_session(&self) -> Result<String> {
        let memory = Arc::new(ArtifactMemory::new());
        let control_loop = AccControlLoop::in_memory(
            memory.clone(),
            self.compressor.clone(),
            self.policy.clone(),
            &self.loop_settings,
        )?;
        let context = SessionContext {
            control_loop,
            committed_state: CompressedCognitiveState::empty(),
            turn_id: 0,
            dialogue: DialogueBuffer::new(self.session_settings.short_history_turns),
            memory,
        };

        let session_id = Uuid::now_v7().to_string();
        let mut sessions = self.sessions.lock();
        if sessions.len() >= self.session_settings.max_sessions {
            if let Some((evicted, _)) = sessions.evict_oldest() {
                info!(session_id = %evicted, "Evicted oldest session");
            }
        }
        sessions.insert(
            session_id.clone(),
            Arc::new(tokio::sync::Mutex::new(context)),
        );
        info!(session_id = %session_id, live = sessions.len(), "Created session");

        Ok(session_id)
    }

    /// Number of live sessions
    pub fn session_count(&self) -> usize {
        self.sessions.lock().len()
    }

    /// Run one turn in `session_id`
    ///
    /// The session only advances when the whole turn succeeds.
    pub async fn send_message(&self, session_id: &str, message: &str) -> Result<ChatReply> {
        let message = message.trim();
        if message.is_empty() {
            return Err(ValidationError::InvalidArgument("message must not be blank".into()).into());
        }

        let session = self
            .sessions
            .lock()
            .get(&session_id.to_string())
            .cloned()
            .ok_or_else(|| AccError::NotFound(format!("session {session_id}")))?;
        let mut session = session.lock().await;

        let turn_id = session.turn_id + 1;
        let signal = signal_from_state(turn_id, message, &session.committed_state)?;
        let recent = session.dialogue.to_vec();

        let result = session
            .control_loop
            .run_turn(&signal, &session.committed_state, &recent)
            .await?;

        session.turn_id = turn_id;
        session.committed_state = result.committed_state.clone();
        session.dialogue.push(RecentDialogueTurn::new(
            turn_id,
            message,
            result.decision.response.clone(),
        )?);

        info!(
            session_id = %session_id,
            turn_id,
            artifacts = session.memory.artifact_count(),
            "Processed chat turn"
        );

        Ok(ChatReply {
            session_id: session_id.to_string(),
            turn_id,
            reply: result.decision.response,
            memory_tokens: result.committed_state.estimate_memory_tokens(),
            mechanism: ChatMechanism {
                recalled_artifact_count: result.recalled.len(),
                qualified_artifact_count: result.qualified.len(),
                committed_state: result.committed_state,
            },
        })
    }
}

/// Carry the committed state into the next turn's signal
fn signal_from_state(
    turn_id: u32,
    message: &str,
    state: &CompressedCognitiveState,
) -> Result<TurnInteractionSignal> {
    let mut signal = TurnInteractionSignal::new(turn_id, message)?
        .with_constraints(state.constraints.iter().cloned())
        .with_focus_entities(state.focal_entities.iter().cloned())
        .with_next_steps(state.predictive_cue.iter().cloned());
    if !state.goal_orientation.is_empty() {
        signal = signal.with_goal(state.goal_orientation.clone());
    }
    Ok(signal)
}

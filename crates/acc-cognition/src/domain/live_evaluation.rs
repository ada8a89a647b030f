//! Live multi-agent evaluation
//!
//! For every query, each agent runner answers from its own copy of the
//! canonical memory, then one judge scores all answers against that same
//! snapshot and hands back the next canonical memory. Records accumulate per
//! agent and are summarized at the end of the episode.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use acc_common::{
    AgentTurnEvaluationRecord, AgentTurnResponse, CanonicalMemory, CompressedCognitiveState,
    EvaluationError, EvaluationTurnQuery, JudgeTurnResult, LiveEvaluationEpisodeResult, Result,
    TurnInteractionSignal,
};
use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::control_loop::AccControlLoop;
use super::metrics::summarize_agents;

/// An agent under evaluation
#[async_trait]
pub trait AgentRunner: Send + Sync {
    /// Answer one query; `canonical_memory` is the runner's private copy
    async fn run_turn(
        &self,
        query: &EvaluationTurnQuery,
        canonical_memory: CanonicalMemory,
    ) -> Result<AgentTurnResponse>;
}

/// Scores every agent's answer for one query
#[async_trait]
pub trait JudgeEvaluator: Send + Sync {
    async fn evaluate_turn(
        &self,
        query: &EvaluationTurnQuery,
        canonical_memory: CanonicalMemory,
        agent_responses: &BTreeMap<String, AgentTurnResponse>,
    ) -> Result<JudgeTurnResult>;
}

/// Judge-driven evaluation episode runner
pub struct LiveMultiAgentEvaluation {
    agent_runners: BTreeMap<String, Arc<dyn AgentRunner>>,
    judge: Arc<dyn JudgeEvaluator>,
}

impl LiveMultiAgentEvaluation {
    pub fn new(
        agent_runners: BTreeMap<String, Arc<dyn AgentRunner>>,
        judge: Arc<dyn JudgeEvaluator>,
    ) -> Result<Self> {
        if agent_runners.is_empty() {
            return Err(EvaluationError::NoAgentRunners.into());
        }
        if agent_runners.keys().any(|name| name.trim().is_empty()) {
            return Err(EvaluationError::BlankAgentName.into());
        }
        Ok(Self {
            agent_runners,
            judge,
        })
    }

    /// Run `queries` in order, threading the canonical memory between them
    pub async fn run_episode(
        &self,
        queries: &[EvaluationTurnQuery],
        initial_canonical_memory: Option<CanonicalMemory>,
    ) -> Result<LiveEvaluationEpisodeResult> {
        if queries.is_empty() {
            return Err(EvaluationError::NoQueries.into());
        }

        let mut canonical_memory = initial_canonical_memory.unwrap_or_default();
        let mut records_by_agent: BTreeMap<String, Vec<AgentTurnEvaluationRecord>> = self
            .agent_runners
            .keys()
            .map(|name| (name.clone(), Vec::with_capacity(queries.len())))
            .collect();

        for query in queries {
            let mut agent_responses = BTreeMap::new();
            for (name, runner) in &self.agent_runners {
                let response = runner.run_turn(query, canonical_memory.clone()).await?;
                agent_responses.insert(name.clone(), response);
            }

            let judge_result = self
                .judge
                .evaluate_turn(query, canonical_memory.clone(), &agent_responses)
                .await?;
            self.check_agent_names(&judge_result)?;

            // Replaced, never merged
            canonical_memory = judge_result.updated_canonical_memory;

            for (name, evaluation) in judge_result.evaluations_by_agent {
                evaluation.outcome_scores.validate()?;
                let memory_tokens = agent_responses
                    .get(&name)
                    .map(|response| response.memory_tokens)
                    .unwrap_or_default();
                let record = AgentTurnEvaluationRecord::new(
                    query.turn_id,
                    evaluation.outcome_scores,
                    evaluation.hallucination_audit,
                    evaluation.drift_audit,
                    memory_tokens,
                )?;
                records_by_agent.entry(name).or_default().push(record);
            }
            debug!(turn_id = query.turn_id, agents = agent_responses.len(), "Judged turn");
        }

        let summaries_by_agent = summarize_agents(&records_by_agent)?;
        info!(
            queries = queries.len(),
            agents = records_by_agent.len(),
            "Evaluation episode complete"
        );

        Ok(LiveEvaluationEpisodeResult {
            turn_records_by_agent: records_by_agent,
            summaries_by_agent,
            final_canonical_memory: canonical_memory,
        })
    }

    fn check_agent_names(&self, judge_result: &JudgeTurnResult) -> Result<()> {
        let expected: BTreeSet<&String> = self.agent_runners.keys().collect();
        let actual: BTreeSet<&String> = judge_result.evaluations_by_agent.keys().collect();
        if expected == actual {
            return Ok(());
        }

        let missing = expected.difference(&actual).map(|s| s.to_string()).collect();
        let unexpected = actual.difference(&expected).map(|s| s.to_string()).collect();
        Err(EvaluationError::AgentNameMismatch {
            missing,
            unexpected,
        }
        .into())
    }
}

/// Runs an [`AccControlLoop`] as an evaluated agent
///
/// The runner owns its committed state across queries. The canonical memory
/// is the judge's context and is not fed into the loop.
pub struct ControlLoopAgentRunner {
    control_loop: AccControlLoop,
    state: Mutex<CompressedCognitiveState>,
}

impl ControlLoopAgentRunner {
    pub fn new(control_loop: AccControlLoop) -> Self {
        Self {
            control_loop,
            state: Mutex::new(CompressedCognitiveState::empty()),
        }
    }

    /// Current committed state
    pub async fn committed_state(&self) -> CompressedCognitiveState {
        self.state.lock().await.clone()
    }
}

#[async_trait]
impl AgentRunner for ControlLoopAgentRunner {
    async fn run_turn(
        &self,
        query: &EvaluationTurnQuery,
        _canonical_memory: CanonicalMemory,
    ) -> Result<AgentTurnResponse> {
        let mut state = self.state.lock().await;

        let mut signal = TurnInteractionSignal::new(query.turn_id, query.user_query.trim())?
            .with_constraints(state.constraints.clone())
            .with_focus_entities(state.focal_entities.clone())
            .with_next_steps(state.predictive_cue.clone());
        if !state.goal_orientation.is_empty() {
            signal = signal.with_goal(state.goal_orientation.clone());
        }

        let result = self.control_loop.run_turn(&signal, &state, &[]).await?;
        *state = result.committed_state;

        Ok(AgentTurnResponse::new(
            result.decision.response,
            state.estimate_memory_tokens(),
        )?)
    }
}

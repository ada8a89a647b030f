//! Agent policies

use acc_common::{
    AgentDecision, CompressedCognitiveState, RecentDialogueTurn, Result, TurnInteractionSignal,
};
use async_trait::async_trait;

use super::text::summarize_text;

const QUESTION_CHARS: usize = 48;

/// Produces the turn's response from the freshly committed state
#[async_trait]
pub trait AgentPolicy: Send + Sync {
    async fn decide(
        &self,
        signal: Option<&TurnInteractionSignal>,
        recent_turns: &[RecentDialogueTurn],
        state: &CompressedCognitiveState,
        role: &str,
        tools: &[String],
    ) -> Result<AgentDecision>;
}

/// Deterministic diagnostic policy
///
/// Echoes the role, the question, the committed goal and gist, and how many
/// recent turns were supplied. Requests every available tool.
#[derive(Debug, Clone, Copy, Default)]
pub struct EchoAgentPolicy;

#[async_trait]
impl AgentPolicy for EchoAgentPolicy {
    async fn decide(
        &self,
        signal: Option<&TurnInteractionSignal>,
        recent_turns: &[RecentDialogueTurn],
        state: &CompressedCognitiveState,
        role: &str,
        tools: &[String],
    ) -> Result<AgentDecision> {
        let question = signal
            .map(|signal| summarize_text(&signal.user_input, QUESTION_CHARS))
            .unwrap_or_default();
        let response = format!(
            "{role} | question={question} | goal={} | gist={} | recent={}",
            state.goal_orientation,
            state.semantic_gist,
            recent_turns.len()
        );
        let tool_actions = tools.iter().map(|tool| format!("use:{tool}"));
        Ok(AgentDecision::with_tool_actions(response, tool_actions)?)
    }
}

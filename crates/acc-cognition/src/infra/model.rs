//! Model-backed adapters
//!
//! The provider client is reduced to [`TextModel`]: a [`CompletionRequest`]
//! in, text out. The adapters here build prompts, attach the configured model
//! parameters and enforce response shapes.

use std::sync::Arc;

use acc_common::{
    AgentDecision, Artifact, CcsPayload, CompressedCognitiveState, RecentDialogueTurn, Result,
    TurnInteractionSignal, UpstreamError,
};
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::config::ModelSettings;
use crate::domain::compressor::CompressorModel;
use crate::domain::policy::AgentPolicy;

/// One completion call
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest<'a> {
    pub model: &'a str,
    pub temperature: f32,
    pub max_output_tokens: u32,
    pub instructions: &'a str,
    pub prompt: &'a str,
}

impl<'a> CompletionRequest<'a> {
    fn new(settings: &'a ModelSettings, instructions: &'a str, prompt: &'a str) -> Self {
        Self {
            model: &settings.model,
            temperature: settings.temperature,
            max_output_tokens: settings.max_output_tokens,
            instructions,
            prompt,
        }
    }
}

/// Opaque text completion endpoint
#[async_trait]
pub trait TextModel: Send + Sync {
    async fn complete(
        &self,
        request: &CompletionRequest<'_>,
    ) -> std::result::Result<String, UpstreamError>;
}

const COMPRESSOR_INSTRUCTIONS: &str = "You are the Cognitive Compressor Model of an agent. \
Return one valid JSON object only, without Markdown fences. \
Required keys: episodic_trace, semantic_gist, focal_entities, relational_map, \
goal_orientation, constraints, predictive_cue, uncertainty_signal, retrieved_artifacts. \
Array fields must be arrays of non-empty strings. \
Keep identifiers such as host names, ids and product names verbatim. \
Compress the state to what the next decision needs.";

const POLICY_INSTRUCTIONS: &str = "You are an operational assistant. \
Follow the constraints in the provided cognitive state. \
If uncertainty is high, state uncertainty explicitly. \
Be concise and actionable.";

#[derive(Serialize)]
struct ArtifactView<'a> {
    artifact_id: &'a str,
    source: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct CompressorPrompt<'a> {
    interaction_signal: &'a TurnInteractionSignal,
    previous_committed_state: &'a CompressedCognitiveState,
    qualified_artifacts: Vec<ArtifactView<'a>>,
}

#[derive(Serialize)]
struct PolicyPrompt<'a> {
    role: &'a str,
    tools: &'a [String],
    committed_state: &'a CompressedCognitiveState,
}

/// Generates CCS payloads with a [`TextModel`]
pub struct ModelCompressor {
    model: Arc<dyn TextModel>,
    settings: ModelSettings,
}

impl ModelCompressor {
    pub fn new(model: Arc<dyn TextModel>, settings: ModelSettings) -> Self {
        Self { model, settings }
    }

    fn build_prompt(
        signal: &TurnInteractionSignal,
        prior_state: &CompressedCognitiveState,
        qualified: &[Artifact],
    ) -> Result<String> {
        let payload = CompressorPrompt {
            interaction_signal: signal,
            previous_committed_state: prior_state,
            qualified_artifacts: qualified
                .iter()
                .map(|artifact| ArtifactView {
                    artifact_id: &artifact.artifact_id,
                    source: &artifact.source,
                    content: &artifact.content,
                })
                .collect(),
        };
        Ok(format!(
            "Update the agent's next state from this input JSON.\nInput:\n{}\n\
             Return only the JSON object of the next state.",
            serde_json::to_string(&payload)?
        ))
    }
}

#[async_trait]
impl CompressorModel for ModelCompressor {
    async fn generate_next_state_payload(
        &self,
        signal: &TurnInteractionSignal,
        prior_state: &CompressedCognitiveState,
        qualified: &[Artifact],
    ) -> Result<CcsPayload> {
        let prompt = Self::build_prompt(signal, prior_state, qualified)?;
        let request = CompletionRequest::new(&self.settings, COMPRESSOR_INSTRUCTIONS, &prompt);
        let text = self.model.complete(&request).await?;
        debug!(model = %self.settings.model, chars = text.len(), "Compressor model replied");
        Ok(parse_json_object(&text)?)
    }
}

/// Answers with a [`TextModel`] conditioned on the committed state
pub struct ModelAgentPolicy {
    model: Arc<dyn TextModel>,
    settings: ModelSettings,
}

impl ModelAgentPolicy {
    pub fn new(model: Arc<dyn TextModel>, settings: ModelSettings) -> Self {
        Self { model, settings }
    }
}

#[async_trait]
impl AgentPolicy for ModelAgentPolicy {
    async fn decide(
        &self,
        _signal: Option<&TurnInteractionSignal>,
        _recent_turns: &[RecentDialogueTurn],
        state: &CompressedCognitiveState,
        role: &str,
        tools: &[String],
    ) -> Result<AgentDecision> {
        let context = serde_json::to_string(&PolicyPrompt {
            role,
            tools,
            committed_state: state,
        })?;
        let prompt = format!(
            "Generate the assistant reply for the latest user query using this context JSON:\n\
             {context}\nFocus on goal and constraints."
        );

        let request = CompletionRequest::new(&self.settings, POLICY_INSTRUCTIONS, &prompt);
        let text = self.model.complete(&request).await?;
        let reply = text.trim();
        if reply.is_empty() {
            return Err(UpstreamError::ResponseFormat("model reply is empty".into()).into());
        }
        Ok(AgentDecision::new(reply)?)
    }
}

/// Extract a JSON object from model text, tolerating a Markdown code fence
pub fn parse_json_object(text: &str) -> std::result::Result<CcsPayload, UpstreamError> {
    let mut body = text.trim();
    if body.starts_with("```") {
        body = body.trim_matches('`').trim();
        if let Some(rest) = body
            .get(..4)
            .filter(|prefix| prefix.eq_ignore_ascii_case("json"))
            .and_then(|_| body.get(4..))
        {
            body = rest.trim();
        }
    }

    match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(UpstreamError::ResponseFormat(
            "CCS payload is not a JSON object".into(),
        )),
        Err(err) => Err(UpstreamError::ResponseFormat(format!(
            "CCS payload is not valid JSON: {err}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use acc_common::AccError;
    use parking_lot::Mutex;

    /// Returns a canned reply and remembers the last call
    struct CannedModel {
        reply: std::result::Result<String, UpstreamError>,
        last_prompt: Mutex<Option<String>>,
        last_params: Mutex<Option<(String, f32, u32)>>,
    }

    impl CannedModel {
        fn new(reply: std::result::Result<&str, UpstreamError>) -> Arc<Self> {
            Arc::new(Self {
                reply: reply.map(str::to_string),
                last_prompt: Mutex::new(None),
                last_params: Mutex::new(None),
            })
        }
    }

    #[async_trait]
    impl TextModel for CannedModel {
        async fn complete(
            &self,
            request: &CompletionRequest<'_>,
        ) -> std::result::Result<String, UpstreamError> {
            *self.last_prompt.lock() = Some(request.prompt.to_string());
            *self.last_params.lock() = Some((
                request.model.to_string(),
                request.temperature,
                request.max_output_tokens,
            ));
            self.reply.clone()
        }
    }

    #[test]
    fn test_parse_fenced_json() {
        let payload = parse_json_object("```json\n{\"semantic_gist\": \"x\"}\n```").unwrap();
        assert_eq!(payload["semantic_gist"], "x");
        assert!(parse_json_object("{\"a\": 1}").is_ok());
    }

    #[test]
    fn test_parse_rejects_non_objects() {
        assert!(matches!(
            parse_json_object("[1, 2]"),
            Err(UpstreamError::ResponseFormat(_))
        ));
        assert!(matches!(
            parse_json_object("not json"),
            Err(UpstreamError::ResponseFormat(_))
        ));
    }

    #[tokio::test]
    async fn test_compressor_prompt_carries_inputs() {
        let model = CannedModel::new(Ok("{\"goal_orientation\": \"g\"}"));
        let compressor = ModelCompressor::new(model.clone(), ModelSettings::default());
        let signal = TurnInteractionSignal::new(3, "nginx 502").unwrap();
        let artifact =
            Artifact::new("ev-1", "user:hi", "turn-evidence", chrono::Utc::now()).unwrap();

        let payload = compressor
            .generate_next_state_payload(&signal, &CompressedCognitiveState::empty(), &[artifact])
            .await
            .unwrap();
        assert_eq!(payload["goal_orientation"], "g");

        let prompt = model.last_prompt.lock().clone().unwrap();
        assert!(prompt.contains("\"previous_committed_state\""));
        assert!(prompt.contains("\"artifact_id\":\"ev-1\""));
        assert!(prompt.contains("nginx 502"));
    }

    #[tokio::test]
    async fn test_policy_trims_and_rejects_blank() {
        let state = CompressedCognitiveState::empty();

        let policy = ModelAgentPolicy::new(
            CannedModel::new(Ok("  restart is not allowed \n")),
            ModelSettings::default(),
        );
        let decision = policy.decide(None, &[], &state, "sre", &[]).await.unwrap();
        assert_eq!(decision.response, "restart is not allowed");
        assert!(decision.tool_actions.is_empty());

        let policy = ModelAgentPolicy::new(CannedModel::new(Ok("   ")), ModelSettings::default());
        assert!(matches!(
            policy.decide(None, &[], &state, "sre", &[]).await,
            Err(AccError::Upstream(UpstreamError::ResponseFormat(_)))
        ));
    }

    #[tokio::test]
    async fn test_transport_errors_propagate() {
        let policy = ModelAgentPolicy::new(
            CannedModel::new(Err(UpstreamError::Transport("connection reset".into()))),
            ModelSettings::default(),
        );
        let err = policy
            .decide(None, &[], &CompressedCognitiveState::empty(), "sre", &[])
            .await
            .unwrap_err();
        assert!(matches!(err, AccError::Upstream(ref e) if e.is_transient()));
    }

    #[tokio::test]
    async fn test_model_settings_reach_the_provider() {
        let settings = ModelSettings {
            model: "ops-small".to_string(),
            temperature: 0.0,
            max_output_tokens: 256,
        };

        let model = CannedModel::new(Ok("{\"goal_orientation\": \"g\"}"));
        let compressor = ModelCompressor::new(model.clone(), settings.clone());
        compressor
            .generate_next_state_payload(
                &TurnInteractionSignal::new(1, "hi").unwrap(),
                &CompressedCognitiveState::empty(),
                &[],
            )
            .await
            .unwrap();
        assert_eq!(
            model.last_params.lock().clone(),
            Some(("ops-small".to_string(), 0.0, 256))
        );

        let model = CannedModel::new(Ok("ok"));
        let policy = ModelAgentPolicy::new(model.clone(), settings);
        policy
            .decide(None, &[], &CompressedCognitiveState::empty(), "sre", &[])
            .await
            .unwrap();
        assert_eq!(
            model.last_params.lock().clone(),
            Some(("ops-small".to_string(), 0.0, 256))
        );
    }
}

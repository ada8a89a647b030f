//! Cognitive Compressor
//!
//! Produces the next committed state from the turn signal, the prior state and
//! the qualified artifacts. Two variants:
//!
//! - [`RuleBasedCompressor`]: deterministic carry-forward rules
//! - [`SchemaAwareCompressor`]: delegates payload generation to a
//!   [`CompressorModel`], repairs a small set of blank fields, then validates
//!   the payload against the CCS schema

use std::sync::Arc;

use acc_common::{
    AccError, Artifact, CcsPayload, CompressedCognitiveState, Result, TurnInteractionSignal,
    UncertaintyLevel,
};
use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, warn};

use super::schema::{parse_and_validate, ListLimits};
use super::text::{dedupe_and_bound, summarize_text};
use crate::config::CompressorSettings;

/// Commits the next state for a turn
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CognitiveCompressor: Send + Sync {
    async fn commit(
        &self,
        signal: &TurnInteractionSignal,
        prior_state: &CompressedCognitiveState,
        qualified: &[Artifact],
    ) -> Result<CompressedCognitiveState>;
}

/// External model producing an untrusted CCS payload
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CompressorModel: Send + Sync {
    async fn generate_next_state_payload(
        &self,
        signal: &TurnInteractionSignal,
        prior_state: &CompressedCognitiveState,
        qualified: &[Artifact],
    ) -> Result<CcsPayload>;
}

// Rule-based limits
const TRACE_LIMIT: usize = 3;
const TRACE_CARRY: usize = 2;
const TRACE_INPUT_CHARS: usize = 80;
const GIST_INPUT_CHARS: usize = 120;
const ENTITY_LIMIT: usize = 8;
const PREDICTIVE_LIMIT: usize = 4;
const DEFAULT_GOAL: &str = "maintain task alignment";
const DEFAULT_PREDICTIVE_CUE: &str = "assess the situation next and respond";

/// Deterministic compressor carrying signal fields forward over the prior state
#[derive(Debug, Clone)]
pub struct RuleBasedCompressor {
    max_retrieved_artifacts: usize,
}

impl RuleBasedCompressor {
    /// Create a compressor keeping at most `max_retrieved_artifacts` ids
    pub fn new(max_retrieved_artifacts: usize) -> Result<Self> {
        if max_retrieved_artifacts < 1 {
            return Err(AccError::invalid_argument(
                "max_retrieved_artifacts must be at least 1",
            ));
        }
        Ok(Self {
            max_retrieved_artifacts,
        })
    }

    /// Create a compressor from the configured id cap
    pub fn from_settings(settings: &CompressorSettings) -> Result<Self> {
        Self::new(settings.max_retrieved_artifacts)
    }

    /// Build the next state without any I/O
    pub fn compress(
        &self,
        signal: &TurnInteractionSignal,
        prior: &CompressedCognitiveState,
        qualified: &[Artifact],
    ) -> CompressedCognitiveState {
        let turn_trace = format!(
            "turn:{}:{}",
            signal.turn_id,
            summarize_text(&signal.user_input, TRACE_INPUT_CHARS)
        );
        let carried = prior
            .episodic_trace
            .len()
            .saturating_sub(TRACE_CARRY);
        let episodic_trace = dedupe_and_bound(
            prior.episodic_trace[carried..]
                .iter()
                .map(String::as_str)
                .chain(std::iter::once(turn_trace.as_str())),
            TRACE_LIMIT,
        );

        // Fresh values win unless nothing usable is left after dropping blanks
        let prefer = |fresh: &[String], previous: &[String], limit: usize| {
            let fresh = dedupe_and_bound(fresh, limit);
            if fresh.is_empty() {
                dedupe_and_bound(previous, limit)
            } else {
                fresh
            }
        };

        let goal_orientation = signal
            .goal()
            .or(Some(prior.goal_orientation.trim()).filter(|goal| !goal.is_empty()))
            .unwrap_or(DEFAULT_GOAL)
            .to_string();

        let mut predictive_cue = prefer(
            &signal.expected_next_steps,
            &prior.predictive_cue,
            PREDICTIVE_LIMIT,
        );
        if predictive_cue.is_empty() {
            predictive_cue.push(DEFAULT_PREDICTIVE_CUE.to_string());
        }

        let retrieved_artifacts: Vec<String> = qualified
            .iter()
            .take(self.max_retrieved_artifacts)
            .map(|artifact| artifact.artifact_id.clone())
            .collect();
        let uncertainty = if retrieved_artifacts.is_empty() {
            UncertaintyLevel::Medium
        } else {
            UncertaintyLevel::Low
        };

        CompressedCognitiveState {
            episodic_trace,
            semantic_gist: summarize_text(&signal.user_input, GIST_INPUT_CHARS),
            focal_entities: prefer(&signal.focus_entities, &prior.focal_entities, ENTITY_LIMIT),
            relational_map: prefer(&signal.new_facts, &prior.relational_map, ENTITY_LIMIT),
            goal_orientation,
            constraints: prefer(&signal.active_constraints, &prior.constraints, ENTITY_LIMIT),
            predictive_cue,
            uncertainty_signal: uncertainty.to_string(),
            retrieved_artifacts,
        }
    }
}

impl Default for RuleBasedCompressor {
    fn default() -> Self {
        Self {
            max_retrieved_artifacts: crate::DEFAULT_MAX_RETRIEVED_ARTIFACTS,
        }
    }
}

#[async_trait]
impl CognitiveCompressor for RuleBasedCompressor {
    async fn commit(
        &self,
        signal: &TurnInteractionSignal,
        prior_state: &CompressedCognitiveState,
        qualified: &[Artifact],
    ) -> Result<CompressedCognitiveState> {
        Ok(self.compress(signal, prior_state, qualified))
    }
}

// Semantic fallback
const GOAL_INPUT_CHARS: usize = 60;
const GIST_FALLBACK_INPUT_CHARS: usize = 80;
const GIST_FALLBACK_MAX_CHARS: usize = 180;
const GIST_EVIDENCE_IDS: usize = 2;

/// Hedging terms that mark the input as uncertain
const UNCERTAINTY_MARKERS: [&str; 12] = [
    "maybe",
    "unsure",
    "not sure",
    "uncertain",
    "unknown",
    "perhaps",
    "might",
    "不明",
    "わからない",
    "たぶん",
    "かもしれ",
    "未確認",
];

/// Model-backed compressor with schema validation
pub struct SchemaAwareCompressor {
    model: Arc<dyn CompressorModel>,
    list_limits: Option<ListLimits>,
}

impl SchemaAwareCompressor {
    pub fn new(model: Arc<dyn CompressorModel>) -> Self {
        Self {
            model,
            list_limits: None,
        }
    }

    /// Create a compressor validating with the configured list limits
    pub fn from_settings(model: Arc<dyn CompressorModel>, settings: &CompressorSettings) -> Self {
        let compressor = Self::new(model);
        if settings.list_limits.is_empty() {
            compressor
        } else {
            compressor.with_list_limits(settings.list_limits.clone())
        }
    }

    /// Override list limits used during validation
    pub fn with_list_limits(mut self, list_limits: ListLimits) -> Self {
        self.list_limits = Some(list_limits);
        self
    }

    /// Fill `goal_orientation`, `semantic_gist` and `uncertainty_signal` when
    /// the model left them blank. Every other field is left to the validator.
    pub fn repair_payload(
        payload: &mut CcsPayload,
        signal: &TurnInteractionSignal,
        prior: &CompressedCognitiveState,
        qualified: &[Artifact],
    ) {
        let primary_constraint = signal
            .active_constraints
            .iter()
            .chain(&prior.constraints)
            .map(|c| c.trim())
            .find(|c| !c.is_empty());

        if is_blank_string(payload.get("goal_orientation")) {
            let goal = fallback_goal(signal, prior, primary_constraint);
            warn!(turn_id = signal.turn_id, goal = %goal, "Repaired blank goal_orientation");
            payload.insert("goal_orientation".into(), Value::String(goal));
        }

        if is_blank_string(payload.get("semantic_gist")) {
            let goal = payload
                .get("goal_orientation")
                .and_then(Value::as_str)
                .map(str::trim)
                .unwrap_or_default()
                .to_string();
            let gist = fallback_gist(signal, &goal, primary_constraint, qualified);
            warn!(turn_id = signal.turn_id, "Repaired blank semantic_gist");
            payload.insert("semantic_gist".into(), Value::String(gist));
        }

        if is_blank_string(payload.get("uncertainty_signal")) {
            let level = fallback_uncertainty(signal, prior, qualified);
            warn!(turn_id = signal.turn_id, level = %level, "Repaired blank uncertainty_signal");
            payload.insert(
                "uncertainty_signal".into(),
                Value::String(level.to_string()),
            );
        }
    }
}

#[async_trait]
impl CognitiveCompressor for SchemaAwareCompressor {
    async fn commit(
        &self,
        signal: &TurnInteractionSignal,
        prior_state: &CompressedCognitiveState,
        qualified: &[Artifact],
    ) -> Result<CompressedCognitiveState> {
        let mut payload = self
            .model
            .generate_next_state_payload(signal, prior_state, qualified)
            .await?;
        debug!(fields = payload.len(), "Received CCS payload");

        Self::repair_payload(&mut payload, signal, prior_state, qualified);
        Ok(parse_and_validate(&payload, self.list_limits.as_ref())?)
    }
}

fn is_blank_string(value: Option<&Value>) -> bool {
    matches!(value, Some(Value::String(s)) if s.trim().is_empty())
}

fn fallback_goal(
    signal: &TurnInteractionSignal,
    prior: &CompressedCognitiveState,
    primary_constraint: Option<&str>,
) -> String {
    if let Some(goal) = signal.goal() {
        return goal.to_string();
    }
    let prior_goal = prior.goal_orientation.trim();
    if !prior_goal.is_empty() {
        return prior_goal.to_string();
    }

    let summary = summarize_text(&signal.user_input, GOAL_INPUT_CHARS);
    match primary_constraint {
        Some(constraint) => format!("resolve: {summary} (within: {constraint})"),
        None => format!("resolve: {summary}"),
    }
}

fn fallback_gist(
    signal: &TurnInteractionSignal,
    goal: &str,
    primary_constraint: Option<&str>,
    qualified: &[Artifact],
) -> String {
    let mut parts = vec![
        format!(
            "input: {}",
            summarize_text(&signal.user_input, GIST_FALLBACK_INPUT_CHARS)
        ),
        format!("goal: {goal}"),
    ];
    if let Some(constraint) = primary_constraint {
        parts.push(format!("constraint: {constraint}"));
    }
    if !qualified.is_empty() {
        let ids: Vec<&str> = qualified
            .iter()
            .take(GIST_EVIDENCE_IDS)
            .map(|artifact| artifact.artifact_id.as_str())
            .collect();
        parts.push(format!("evidence: {}", ids.join(", ")));
    }
    summarize_text(&parts.join(" | "), GIST_FALLBACK_MAX_CHARS)
}

fn fallback_uncertainty(
    signal: &TurnInteractionSignal,
    prior: &CompressedCognitiveState,
    qualified: &[Artifact],
) -> UncertaintyLevel {
    let input = signal.user_input.to_lowercase();
    let hedged = UNCERTAINTY_MARKERS
        .iter()
        .any(|marker| input.contains(marker));

    if hedged || qualified.is_empty() {
        UncertaintyLevel::High
    } else if qualified.len() >= 2 && !prior.relational_map.is_empty() {
        UncertaintyLevel::Low
    } else {
        UncertaintyLevel::Medium
    }
}

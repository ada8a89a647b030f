//! Compressed Cognitive State
//!
//! The bounded memory committed once per turn. Each commit fully replaces the
//! previous state; nothing is merged.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Untrusted, schema-unvalidated CCS document (typically model JSON)
pub type CcsPayload = Map<String, Value>;

/// Uncertainty level carried in `uncertainty_signal`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UncertaintyLevel {
    Low,
    Medium,
    High,
}

impl UncertaintyLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            UncertaintyLevel::Low => "low",
            UncertaintyLevel::Medium => "medium",
            UncertaintyLevel::High => "high",
        }
    }
}

impl std::fmt::Display for UncertaintyLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The committed memory of the control loop
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompressedCognitiveState {
    /// Terse trace of recent turns (≤3)
    pub episodic_trace: Vec<String>,
    /// One-line summary of the current situation
    pub semantic_gist: String,
    /// Entities in focus (≤8)
    pub focal_entities: Vec<String>,
    /// Known relations between entities and events (≤8)
    pub relational_map: Vec<String>,
    /// Goal the agent is oriented towards
    pub goal_orientation: String,
    /// Active constraints (≤8)
    pub constraints: Vec<String>,
    /// Anticipated next steps (≤4)
    pub predictive_cue: Vec<String>,
    /// Enum-like uncertainty marker
    pub uncertainty_signal: String,
    /// Ids of artifacts that informed this state (≤5)
    pub retrieved_artifacts: Vec<String>,
}

impl CompressedCognitiveState {
    /// Blank state used only at session start
    pub fn empty() -> Self {
        Self {
            episodic_trace: Vec::new(),
            semantic_gist: String::new(),
            focal_entities: Vec::new(),
            relational_map: Vec::new(),
            goal_orientation: String::new(),
            constraints: Vec::new(),
            predictive_cue: Vec::new(),
            uncertainty_signal: "unknown".to_string(),
            retrieved_artifacts: Vec::new(),
        }
    }

    /// Render the state back into the untrusted payload shape
    pub fn to_payload(&self) -> CcsPayload {
        let mut payload = Map::new();
        payload.insert("episodic_trace".into(), strings(&self.episodic_trace));
        payload.insert("semantic_gist".into(), Value::String(self.semantic_gist.clone()));
        payload.insert("focal_entities".into(), strings(&self.focal_entities));
        payload.insert("relational_map".into(), strings(&self.relational_map));
        payload.insert(
            "goal_orientation".into(),
            Value::String(self.goal_orientation.clone()),
        );
        payload.insert("constraints".into(), strings(&self.constraints));
        payload.insert("predictive_cue".into(), strings(&self.predictive_cue));
        payload.insert(
            "uncertainty_signal".into(),
            Value::String(self.uncertainty_signal.clone()),
        );
        payload.insert("retrieved_artifacts".into(), strings(&self.retrieved_artifacts));
        payload
    }

    /// All text of the state joined by single spaces
    pub fn as_text(&self) -> String {
        let mut parts: Vec<&str> = Vec::new();
        parts.extend(self.episodic_trace.iter().map(String::as_str));
        parts.push(&self.semantic_gist);
        parts.extend(self.focal_entities.iter().map(String::as_str));
        parts.extend(self.relational_map.iter().map(String::as_str));
        parts.push(&self.goal_orientation);
        parts.extend(self.constraints.iter().map(String::as_str));
        parts.extend(self.predictive_cue.iter().map(String::as_str));
        parts.push(&self.uncertainty_signal);
        parts.extend(self.retrieved_artifacts.iter().map(String::as_str));
        parts.join(" ")
    }

    /// Rough token count of the state (about four characters per token)
    pub fn estimate_memory_tokens(&self) -> u64 {
        let chars = self.as_text().chars().count() as u64;
        if chars == 0 {
            return 0;
        }
        (chars / 4).max(1)
    }
}

impl Default for CompressedCognitiveState {
    fn default() -> Self {
        Self::empty()
    }
}

fn strings(values: &[String]) -> Value {
    Value::Array(values.iter().cloned().map(Value::String).collect())
}

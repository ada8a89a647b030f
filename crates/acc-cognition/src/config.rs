//! ACC configuration

use std::collections::BTreeMap;

use acc_common::ValidationError;
use anyhow::Result;
use serde::{Deserialize, Serialize};

/// ACC service configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AccConfig {
    /// Control loop configuration
    pub control_loop: LoopSettings,
    /// Chat session configuration
    pub session: SessionSettings,
    /// Cognitive compressor configuration
    pub compressor: CompressorSettings,
    /// External model configuration
    pub model: ModelSettings,
}

impl AccConfig {
    /// Load configuration from environment and files
    pub fn load() -> Result<Self> {
        // Try to load .env file
        let _ = dotenvy::dotenv();

        let mut cfg = Self::default();

        // Control loop settings
        if let Ok(role) = std::env::var("ACC_ROLE") {
            if !role.trim().is_empty() {
                cfg.control_loop.role = role.trim().to_string();
            }
        }
        if let Ok(tools) = std::env::var("ACC_TOOLS") {
            cfg.control_loop.tools = tools
                .split(',')
                .map(str::trim)
                .filter(|tool| !tool.is_empty())
                .map(str::to_string)
                .collect();
        }
        if let Ok(val) = std::env::var("ACC_RECALL_LIMIT") {
            if let Ok(v) = val.parse() {
                cfg.control_loop.recall_limit = v;
            }
        }

        // Session settings
        if let Ok(val) = std::env::var("ACC_MAX_SESSIONS") {
            if let Ok(v) = val.parse() {
                cfg.session.max_sessions = v;
            }
        }
        if let Ok(val) = std::env::var("ACC_SHORT_HISTORY_TURNS") {
            if let Ok(v) = val.parse() {
                cfg.session.short_history_turns = v;
            }
        }

        // Compressor settings
        if let Ok(val) = std::env::var("ACC_MAX_RETRIEVED_ARTIFACTS") {
            if let Ok(v) = val.parse() {
                cfg.compressor.max_retrieved_artifacts = v;
            }
        }

        // Model settings
        if let Ok(model) = std::env::var("ACC_MODEL_NAME") {
            cfg.model.model = model;
        }
        if let Ok(val) = std::env::var("ACC_MODEL_TEMPERATURE") {
            if let Ok(v) = val.parse() {
                cfg.model.temperature = v;
            }
        }
        if let Ok(val) = std::env::var("ACC_MODEL_MAX_OUTPUT_TOKENS") {
            if let Ok(v) = val.parse() {
                cfg.model.max_output_tokens = v;
            }
        }

        cfg.validate()?;
        Ok(cfg)
    }

    /// Reject settings the control loop cannot run with
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.control_loop.recall_limit < 1 {
            return Err(ValidationError::InvalidArgument(
                "recall_limit must be at least 1".to_string(),
            ));
        }
        if self.session.max_sessions < 1 {
            return Err(ValidationError::InvalidArgument(
                "max_sessions must be at least 1".to_string(),
            ));
        }
        if self.compressor.max_retrieved_artifacts < 1 {
            return Err(ValidationError::InvalidArgument(
                "max_retrieved_artifacts must be at least 1".to_string(),
            ));
        }
        for (field, limit) in &self.compressor.list_limits {
            if *limit < 1 {
                return Err(ValidationError::InvalidLimit {
                    field: field.clone(),
                    limit: *limit,
                });
            }
        }
        Ok(())
    }
}

/// Fixed parameters of one control loop
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoopSettings {
    /// Role handed to the agent policy
    pub role: String,
    /// Tools available to the agent policy
    pub tools: Vec<String>,
    /// Maximum artifacts recalled per turn
    pub recall_limit: usize,
}

impl Default for LoopSettings {
    fn default() -> Self {
        Self {
            role: "assistant".to_string(),
            tools: Vec::new(),
            recall_limit: crate::DEFAULT_RECALL_LIMIT,
        }
    }
}

/// Chat session settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSettings {
    /// Live sessions kept before the oldest is evicted
    pub max_sessions: usize,
    /// Recent turns passed to the policy (0 disables history)
    pub short_history_turns: usize,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            max_sessions: crate::DEFAULT_MAX_SESSIONS,
            short_history_turns: crate::DEFAULT_SHORT_HISTORY_TURNS,
        }
    }
}

/// Cognitive compressor settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompressorSettings {
    /// Cap on artifact ids kept by the rule-based compressor
    pub max_retrieved_artifacts: usize,
    /// Per-field list limit overrides for schema validation
    pub list_limits: BTreeMap<String, usize>,
}

impl Default for CompressorSettings {
    fn default() -> Self {
        Self {
            max_retrieved_artifacts: crate::DEFAULT_MAX_RETRIEVED_ARTIFACTS,
            list_limits: BTreeMap::new(),
        }
    }
}

/// External model settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelSettings {
    /// Model identifier passed to the provider
    pub model: String,
    /// Sampling temperature
    pub temperature: f32,
    /// Output token budget per call
    pub max_output_tokens: u32,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            model: "gpt-4.1-mini".to_string(),
            temperature: 0.2,
            max_output_tokens: 1000,
        }
    }
}

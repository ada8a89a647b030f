//! ACC Cognition Binary
//!
//! Runs a scripted two-turn horizon through the rule-based compressor and the
//! echo policy and logs what each turn committed.

use std::sync::Arc;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use acc_cognition::{
    config::AccConfig, AccControlLoop, ArtifactMemory, EchoAgentPolicy, RuleBasedCompressor,
    ACC_VERSION,
};
use acc_common::{CompressedCognitiveState, TurnInteractionSignal};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    info!("Starting ACC Cognition v{}", ACC_VERSION);

    // Load configuration
    let config = AccConfig::load()?;
    info!("Loaded configuration: {:?}", config);

    let memory = Arc::new(ArtifactMemory::new());
    let control_loop = AccControlLoop::in_memory(
        memory.clone(),
        Arc::new(RuleBasedCompressor::from_settings(&config.compressor)?),
        Arc::new(EchoAgentPolicy),
        &config.control_loop,
    )?;

    let signals = vec![
        TurnInteractionSignal::new(1, "nginx is returning 502 on the checkout API")?
            .with_goal("reduce the 502 rate")
            .with_constraints(["no restart during business hours"])
            .with_focus_entities(["nginx", "checkout-api"]),
        TurnInteractionSignal::new(2, "upstream latency on checkout-api looks high")?
            .with_new_facts(["checkout-api p99 latency above 2s"])
            .with_next_steps(["check upstream connection pool"]),
    ];

    let (final_state, results) = control_loop
        .run_horizon(CompressedCognitiveState::empty(), &signals)
        .await?;

    for (signal, result) in signals.iter().zip(&results) {
        info!(
            turn_id = signal.turn_id,
            recalled = result.recalled.len(),
            qualified = result.qualified.len(),
            "Reply: {}",
            result.decision.response
        );
    }

    info!(
        "Committed state: {}",
        serde_json::to_string_pretty(&final_state)?
    );
    info!(
        artifacts = memory.artifact_count(),
        memory_tokens = final_state.estimate_memory_tokens(),
        "ACC horizon finished"
    );

    Ok(())
}

//! Evaluation Metrics
//!
//! Pure functions over judge records:
//!
//! - `H_t = U_t / max(1, S_t + U_t)` (hallucination rate)
//! - `D_t = (V_t + O_t) / max(1, |K_t|)` (drift rate, turns ≥ 2 only)

use std::collections::BTreeMap;

use acc_common::{
    AgentEvaluationSummary, AgentTurnEvaluationRecord, DriftAudit, EvaluationError,
    HallucinationAudit, Result,
};

/// First turn with a previous state to drift from
const FIRST_DRIFT_TURN: u32 = 2;

/// Share of unsupported claims in a turn
pub fn hallucination_turn_rate(audit: &HallucinationAudit) -> f64 {
    let total = u64::from(audit.supported_claims) + u64::from(audit.unsupported_claims);
    f64::from(audit.unsupported_claims) / total.max(1) as f64
}

/// Violations and omissions per active constraint
pub fn drift_turn_rate(audit: &DriftAudit) -> f64 {
    let misses = u64::from(audit.violations) + u64::from(audit.omissions);
    misses as f64 / audit.active_constraints.len().max(1) as f64
}

/// Aggregate one agent's turn records
pub fn summarize_agent_records(
    records: &[AgentTurnEvaluationRecord],
) -> Result<AgentEvaluationSummary> {
    if records.is_empty() {
        return Err(EvaluationError::EmptyRecords.into());
    }

    let mut ordered: Vec<&AgentTurnEvaluationRecord> = records.iter().collect();
    ordered.sort_by_key(|record| record.turn_id);

    let mut outcome_mean = [0.0; 4];
    let mut outcome_std = [0.0; 4];
    for dimension in 0..4 {
        let values: Vec<f64> = ordered
            .iter()
            .map(|record| record.outcome_scores.as_array()[dimension])
            .collect();
        outcome_mean[dimension] = mean(&values);
        outcome_std[dimension] = population_std(&values);
    }

    let hallucination_turn_rates: Vec<f64> = ordered
        .iter()
        .map(|record| hallucination_turn_rate(&record.hallucination_audit))
        .collect();
    let hallucination_average = mean(&hallucination_turn_rates);

    let drift_turn_rates: Vec<f64> = ordered
        .iter()
        .filter(|record| record.turn_id >= FIRST_DRIFT_TURN)
        .filter_map(|record| record.drift_audit.as_ref())
        .map(drift_turn_rate)
        .collect();
    let drift_average = (!drift_turn_rates.is_empty()).then(|| mean(&drift_turn_rates));

    let memory_tokens_by_turn: Vec<u64> = ordered.iter().map(|record| record.memory_tokens).collect();
    let memory_values: Vec<f64> = memory_tokens_by_turn.iter().map(|t| *t as f64).collect();
    let memory_average = mean(&memory_values);

    Ok(AgentEvaluationSummary::from_parts(
        ordered.len(),
        outcome_mean,
        outcome_std,
        hallucination_turn_rates,
        hallucination_average,
        drift_turn_rates,
        drift_average,
        memory_tokens_by_turn,
        memory_average,
    ))
}

/// Summarize each agent independently
pub fn summarize_agents(
    records_by_agent: &BTreeMap<String, Vec<AgentTurnEvaluationRecord>>,
) -> Result<BTreeMap<String, AgentEvaluationSummary>> {
    records_by_agent
        .iter()
        .map(|(agent, records)| {
            if agent.trim().is_empty() {
                return Err(EvaluationError::BlankAgentName.into());
            }
            Ok((agent.clone(), summarize_agent_records(records)?))
        })
        .collect()
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

fn population_std(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let mu = mean(values);
    let variance = values.iter().map(|v| (v - mu).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

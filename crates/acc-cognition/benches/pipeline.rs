//! ACC Performance Benchmarks
//!
//! - Token-overlap recall over a growing artifact memory
//! - Full rule-based turn (recall → qualify → commit → decide → persist)
//! - Evaluation summary over long episodes

use std::sync::Arc;

use chrono::{Duration as ChronoDuration, TimeZone, Utc};
use criterion::{
    black_box, criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion, Throughput,
};
use std::time::Duration;

use acc_cognition::{
    config::LoopSettings, summarize_agent_records, AccControlLoop, ArtifactMemory,
    EchoAgentPolicy, ManualClock, RuleBasedCompressor, TokenOverlapRecall,
};
use acc_common::{
    AgentTurnEvaluationRecord, Artifact, CompressedCognitiveState, DriftAudit,
    HallucinationAudit, OutcomeScores, TurnInteractionSignal,
};

fn seeded_memory(size: usize) -> Arc<ArtifactMemory> {
    let base = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
    let artifacts = (0..size)
        .map(|i| {
            Artifact::new(
                format!("seed-{i}"),
                format!("user:check service-{} latency\nassistant:p99 is {}ms", i % 50, i),
                "turn-evidence",
                base + ChronoDuration::seconds(i as i64),
            )
            .unwrap()
        })
        .collect();
    Arc::new(ArtifactMemory::with_seed(
        artifacts,
        Arc::new(ManualClock::new(base)),
    ))
}

// ============ RECALL BENCHMARKS ============

fn bench_recall(c: &mut Criterion) {
    let mut group = c.benchmark_group("recall");
    group.measurement_time(Duration::from_secs(5));

    for size in [100usize, 1_000, 5_000].iter() {
        group.throughput(Throughput::Elements(*size as u64));
        group.bench_with_input(BenchmarkId::new("token_overlap", size), size, |b, &size| {
            let recall = TokenOverlapRecall::new(seeded_memory(size));
            b.iter(|| black_box(recall.rank(black_box("why is service-7 latency so high"), 5)));
        });
    }

    group.finish();
}

// ============ TURN BENCHMARKS ============

fn bench_turn(c: &mut Criterion) {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap();
    let signal = TurnInteractionSignal::new(1, "service-7 latency regression")
        .unwrap()
        .with_constraints(["no restart"]);
    let state = CompressedCognitiveState::empty();

    // Each turn persists evidence, so every iteration gets a fresh 1k-artifact memory
    c.bench_function("rule_based_turn", |b| {
        b.iter_batched(
            || {
                AccControlLoop::in_memory(
                    seeded_memory(1_000),
                    Arc::new(RuleBasedCompressor::default()),
                    Arc::new(EchoAgentPolicy),
                    &LoopSettings::default(),
                )
                .unwrap()
            },
            |control_loop| {
                runtime
                    .block_on(control_loop.run_turn(black_box(&signal), &state, &[]))
                    .unwrap()
            },
            BatchSize::SmallInput,
        );
    });
}

// ============ METRICS BENCHMARKS ============

fn bench_summary(c: &mut Criterion) {
    let records: Vec<AgentTurnEvaluationRecord> = (1..=500u32)
        .map(|turn| {
            let score = f64::from(turn % 11);
            AgentTurnEvaluationRecord::new(
                turn,
                OutcomeScores::new(score, score, score, score).unwrap(),
                HallucinationAudit::new(turn % 5, turn % 3),
                (turn > 1).then(|| DriftAudit::new(turn % 2, 0, ["a", "b"])),
                u64::from(turn) * 3,
            )
            .unwrap()
        })
        .collect();

    c.bench_function("summarize_500_turns", |b| {
        b.iter(|| summarize_agent_records(black_box(&records)).unwrap());
    });
}

criterion_group!(benches, bench_recall, bench_turn, bench_summary);
criterion_main!(benches);

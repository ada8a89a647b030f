//! Chat session service tests

use std::sync::Arc;

use acc_cognition::{
    config::{LoopSettings, SessionSettings},
    ChatSessionService, CognitiveCompressor, EchoAgentPolicy, RuleBasedCompressor,
};
use acc_common::{
    AccError, Artifact, CompressedCognitiveState, Result, TurnInteractionSignal, UpstreamError,
};
use async_trait::async_trait;

/// Rule-based compressor that fails on inputs mentioning "boom"
struct FlakyCompressor {
    inner: RuleBasedCompressor,
}

#[async_trait]
impl CognitiveCompressor for FlakyCompressor {
    async fn commit(
        &self,
        signal: &TurnInteractionSignal,
        prior_state: &CompressedCognitiveState,
        qualified: &[Artifact],
    ) -> Result<CompressedCognitiveState> {
        if signal.user_input.contains("boom") {
            return Err(UpstreamError::Transport("model unavailable".into()).into());
        }
        self.inner.commit(signal, prior_state, qualified).await
    }
}

fn service(max_sessions: usize, short_history_turns: usize) -> ChatSessionService {
    ChatSessionService::new(
        Arc::new(RuleBasedCompressor::default()),
        Arc::new(EchoAgentPolicy),
        LoopSettings::default(),
        SessionSettings {
            max_sessions,
            short_history_turns,
        },
    )
    .unwrap()
}

#[tokio::test]
async fn test_dialogue_history_is_bounded() {
    let service = service(10, 2);
    let id = service.create_session().unwrap();

    let mut seen = Vec::new();
    for (turn, message) in ["first", "second", "third", "fourth"].iter().enumerate() {
        let reply = service.send_message(&id, message).await.unwrap();
        assert_eq!(reply.turn_id as usize, turn + 1);
        assert_eq!(reply.session_id, id);
        seen.push(reply.reply);
    }

    let recent: Vec<&str> = seen
        .iter()
        .map(|reply| reply.rsplit("recent=").next().unwrap())
        .collect();
    assert_eq!(recent, vec!["0", "1", "2", "2"]);
}

#[tokio::test]
async fn test_reply_reports_mechanism() {
    let service = service(10, 2);
    let id = service.create_session().unwrap();

    let first = service
        .send_message(&id, "checkout latency is high")
        .await
        .unwrap();
    assert_eq!(first.mechanism.recalled_artifact_count, 0);
    assert_eq!(first.mechanism.committed_state.uncertainty_signal, "medium");
    assert_eq!(
        first.memory_tokens,
        first.mechanism.committed_state.estimate_memory_tokens()
    );

    let second = service
        .send_message(&id, "what about checkout latency now")
        .await
        .unwrap();
    assert_eq!(second.mechanism.recalled_artifact_count, 1);
    assert_eq!(second.mechanism.qualified_artifact_count, 1);
    assert_eq!(second.mechanism.committed_state.uncertainty_signal, "low");
}

#[tokio::test]
async fn test_oldest_session_evicted() {
    let service = service(2, 2);
    let first = service.create_session().unwrap();
    let second = service.create_session().unwrap();
    let third = service.create_session().unwrap();

    assert_eq!(service.session_count(), 2);
    assert!(matches!(
        service.send_message(&first, "hello").await,
        Err(AccError::NotFound(_))
    ));
    assert!(service.send_message(&second, "hello").await.is_ok());
    assert!(service.send_message(&third, "hello").await.is_ok());
}

#[tokio::test]
async fn test_unknown_session_not_found() {
    let service = service(1, 2);
    let err = service.send_message("no-such-session", "hi").await.unwrap_err();
    assert!(matches!(err, AccError::NotFound(_)));
}

#[tokio::test]
async fn test_sessions_are_isolated() {
    let service = service(10, 2);
    let a = service.create_session().unwrap();
    let b = service.create_session().unwrap();

    service.send_message(&a, "checkout latency").await.unwrap();
    let reply = service.send_message(&b, "checkout latency").await.unwrap();

    assert_eq!(reply.turn_id, 1);
    assert_eq!(reply.mechanism.recalled_artifact_count, 0);
    assert!(reply.reply.ends_with("recent=0"));
}

#[tokio::test]
async fn test_failed_turn_does_not_advance_session() {
    let service = ChatSessionService::new(
        Arc::new(FlakyCompressor {
            inner: RuleBasedCompressor::default(),
        }),
        Arc::new(EchoAgentPolicy),
        LoopSettings::default(),
        SessionSettings::default(),
    )
    .unwrap();
    let id = service.create_session().unwrap();

    service.send_message(&id, "hello there").await.unwrap();
    let err = service.send_message(&id, "boom").await.unwrap_err();
    assert!(matches!(err, AccError::Upstream(_)));

    let reply = service.send_message(&id, "hello again").await.unwrap();
    assert_eq!(reply.turn_id, 2);
    assert!(reply.reply.ends_with("recent=1"));
    // Only the two successful turns left evidence behind
    assert_eq!(reply.mechanism.recalled_artifact_count, 1);
}

#[test]
fn test_zero_capacity_rejected() {
    let result = ChatSessionService::new(
        Arc::new(RuleBasedCompressor::default()),
        Arc::new(EchoAgentPolicy),
        LoopSettings::default(),
        SessionSettings {
            max_sessions: 0,
            short_history_turns: 2,
        },
    );
    assert!(matches!(result, Err(AccError::Validation(_))));
}

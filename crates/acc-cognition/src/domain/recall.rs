//! Artifact recall
//!
//! Ranks stored artifacts against the current turn. The token-overlap
//! strategy scores each artifact by `|input tokens ∩ artifact tokens|`, breaks
//! ties by newest first, and drops zero-overlap artifacts.

use std::cmp::Reverse;
use std::sync::Arc;

use acc_common::{Artifact, CompressedCognitiveState, Result, TurnInteractionSignal};
use async_trait::async_trait;

use super::text::{normalize_tokens, overlap};
use crate::infra::evidence_store::ArtifactMemory;

/// Retrieves candidate artifacts for a turn
///
/// Implementations return at most `limit` artifacts in non-increasing
/// relevance order and are deterministic for identical inputs and store state.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ArtifactRecall: Send + Sync {
    async fn recall(
        &self,
        signal: &TurnInteractionSignal,
        state: &CompressedCognitiveState,
        limit: usize,
    ) -> Result<Vec<Artifact>>;
}

/// Token-overlap recall over an [`ArtifactMemory`]
pub struct TokenOverlapRecall {
    memory: Arc<ArtifactMemory>,
}

impl TokenOverlapRecall {
    pub fn new(memory: Arc<ArtifactMemory>) -> Self {
        Self { memory }
    }

    /// Score every stored artifact against `query` and keep the best `limit`
    pub fn rank(&self, query: &str, limit: usize) -> Vec<Artifact> {
        let query_tokens = normalize_tokens(query);

        let mut scored: Vec<(usize, Artifact)> = self
            .memory
            .list_artifacts()
            .into_iter()
            .map(|artifact| {
                let score = overlap(&query_tokens, &normalize_tokens(&artifact.content));
                (score, artifact)
            })
            .filter(|(score, _)| *score > 0)
            .collect();

        // Stable sort keeps insertion order for exact ties
        scored.sort_by_key(|(score, artifact)| (Reverse(*score), Reverse(artifact.created_at)));

        scored
            .into_iter()
            .take(limit)
            .map(|(_, artifact)| artifact)
            .collect()
    }
}

#[async_trait]
impl ArtifactRecall for TokenOverlapRecall {
    async fn recall(
        &self,
        signal: &TurnInteractionSignal,
        _state: &CompressedCognitiveState,
        limit: usize,
    ) -> Result<Vec<Artifact>> {
        // Input-only scoring; the committed state does not steer recall yet
        Ok(self.rank(&signal.user_input, limit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::clock::ManualClock;
    use chrono::{Duration, TimeZone, Utc};

    fn artifact(id: &str, content: &str, minutes: i64) -> Artifact {
        let base = Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap();
        Artifact::new(id, content, "note", base + Duration::minutes(minutes)).unwrap()
    }

    fn recall_over(artifacts: Vec<Artifact>) -> TokenOverlapRecall {
        let memory = ArtifactMemory::with_seed(artifacts, Arc::new(ManualClock::from_epoch()));
        TokenOverlapRecall::new(Arc::new(memory))
    }

    #[tokio::test]
    async fn test_ranks_by_overlap_then_recency() {
        let recall = recall_over(vec![
            artifact("old-two", "nginx upstream", 0),
            artifact("one", "nginx only", 5),
            artifact("new-two", "nginx upstream timeout", 10),
            artifact("none", "database vacuum", 20),
        ]);
        let signal = TurnInteractionSignal::new(1, "nginx upstream errors").unwrap();

        let ids: Vec<String> = recall
            .recall(&signal, &CompressedCognitiveState::empty(), 5)
            .await
            .unwrap()
            .into_iter()
            .map(|a| a.artifact_id)
            .collect();

        assert_eq!(ids, vec!["new-two", "old-two", "one"]);
    }

    #[tokio::test]
    async fn test_respects_limit() {
        let recall = recall_over(vec![
            artifact("a", "nginx", 0),
            artifact("b", "nginx", 1),
            artifact("c", "nginx", 2),
        ]);
        let signal = TurnInteractionSignal::new(1, "nginx").unwrap();
        let recalled = recall
            .recall(&signal, &CompressedCognitiveState::empty(), 2)
            .await
            .unwrap();
        assert_eq!(recalled.len(), 2);
        assert_eq!(recalled[0].artifact_id, "c");
    }

    #[test]
    fn test_japanese_overlap() {
        let recall = recall_over(vec![artifact("jp", "障害対応の手順", 0)]);
        assert_eq!(recall.rank("障害の状況", 5).len(), 1);
        assert!(recall.rank("hello", 5).is_empty());
    }
}

//! Artifact qualification
//!
//! A pure per-artifact filter deciding whether recalled evidence is relevant to
//! the decision at hand.

use acc_common::{Artifact, CompressedCognitiveState, TurnInteractionSignal};

use super::text::normalize_tokens;
use crate::CONSTRAINT_SOURCE_PREFIX;

/// Decides whether one recalled artifact should inform the commit
pub trait ArtifactQualification: Send + Sync {
    fn is_relevant(
        &self,
        artifact: &Artifact,
        state: &CompressedCognitiveState,
        signal: &TurnInteractionSignal,
    ) -> bool;
}

/// Keeps constraint-origin artifacts and anything sharing tokens with the
/// input or the committed constraints
#[derive(Debug, Clone, Copy, Default)]
pub struct TokenOverlapQualification;

impl ArtifactQualification for TokenOverlapQualification {
    fn is_relevant(
        &self,
        artifact: &Artifact,
        state: &CompressedCognitiveState,
        signal: &TurnInteractionSignal,
    ) -> bool {
        if artifact.source.starts_with(CONSTRAINT_SOURCE_PREFIX) {
            return true;
        }

        let artifact_tokens = normalize_tokens(&artifact.content);
        let input_tokens = normalize_tokens(&signal.user_input);
        if !artifact_tokens.is_disjoint(&input_tokens) {
            return true;
        }

        let constraint_tokens = normalize_tokens(&state.constraints.join(" "));
        !artifact_tokens.is_disjoint(&constraint_tokens)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn artifact(content: &str, source: &str) -> Artifact {
        Artifact::new("a-1", content, source, Utc::now()).unwrap()
    }

    #[test]
    fn test_constraint_source_always_relevant() {
        let signal = TurnInteractionSignal::new(1, "unrelated").unwrap();
        let state = CompressedCognitiveState::empty();
        assert!(TokenOverlapQualification.is_relevant(
            &artifact("keep prod read only", "constraint-policy"),
            &state,
            &signal
        ));
    }

    #[test]
    fn test_input_or_constraint_overlap() {
        let signal = TurnInteractionSignal::new(2, "check nginx").unwrap();
        let mut state = CompressedCognitiveState::empty();
        let qualification = TokenOverlapQualification;

        assert!(qualification.is_relevant(&artifact("nginx logs", "turn-evidence"), &state, &signal));
        assert!(!qualification.is_relevant(&artifact("no restart", "turn-evidence"), &state, &signal));

        state.constraints = vec!["no_restart".to_string(), "restart window".to_string()];
        assert!(qualification.is_relevant(&artifact("no restart", "turn-evidence"), &state, &signal));
    }
}

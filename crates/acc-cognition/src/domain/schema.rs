//! CCS schema validation
//!
//! Turns an untrusted payload (usually model JSON) into a
//! [`CompressedCognitiveState`]. The untrusted shape never travels past this
//! module.

use std::collections::{BTreeMap, HashSet};

use acc_common::{CcsPayload, CompressedCognitiveState, ValidationError};
use serde_json::Value;

/// Per-field list limit overrides
pub type ListLimits = BTreeMap<String, usize>;

/// Every field a payload must carry
pub const REQUIRED_FIELDS: [&str; 9] = [
    "episodic_trace",
    "semantic_gist",
    "focal_entities",
    "relational_map",
    "goal_orientation",
    "constraints",
    "predictive_cue",
    "uncertainty_signal",
    "retrieved_artifacts",
];

/// Default cap for each list field
pub const DEFAULT_LIST_LIMITS: [(&str, usize); 6] = [
    ("episodic_trace", 3),
    ("focal_entities", 8),
    ("relational_map", 8),
    ("constraints", 8),
    ("predictive_cue", 4),
    ("retrieved_artifacts", 5),
];

/// Default limits merged with `overrides` (keys outside the list fields are ignored)
pub fn merged_limits(overrides: Option<&ListLimits>) -> BTreeMap<&'static str, usize> {
    let mut limits: BTreeMap<&'static str, usize> = DEFAULT_LIST_LIMITS.into_iter().collect();
    if let Some(overrides) = overrides {
        for (field, limit) in limits.iter_mut() {
            if let Some(value) = overrides.get(*field) {
                *limit = *value;
            }
        }
    }
    limits
}

/// Validate and normalize a payload into a committed state
///
/// Strings are trimmed and must be non-empty. List items are trimmed, must be
/// non-empty, and are taken in order (repeats skipped) up to the field limit.
pub fn parse_and_validate(
    payload: &CcsPayload,
    list_limits: Option<&ListLimits>,
) -> Result<CompressedCognitiveState, ValidationError> {
    let missing: Vec<String> = REQUIRED_FIELDS
        .iter()
        .filter(|field| !payload.contains_key(**field))
        .map(|field| field.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(ValidationError::MissingFields(missing));
    }

    let limits = merged_limits(list_limits);
    let list = |field: &'static str| -> Result<Vec<String>, ValidationError> {
        string_list(&payload[field], field, limits[field])
    };
    let text = |field: &'static str| non_empty_string(&payload[field], field);

    Ok(CompressedCognitiveState {
        episodic_trace: list("episodic_trace")?,
        semantic_gist: text("semantic_gist")?,
        focal_entities: list("focal_entities")?,
        relational_map: list("relational_map")?,
        goal_orientation: text("goal_orientation")?,
        constraints: list("constraints")?,
        predictive_cue: list("predictive_cue")?,
        uncertainty_signal: text("uncertainty_signal")?,
        retrieved_artifacts: list("retrieved_artifacts")?,
    })
}

fn non_empty_string(value: &Value, field: &str) -> Result<String, ValidationError> {
    let Value::String(raw) = value else {
        return Err(ValidationError::NotAString {
            field: field.to_string(),
        });
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::BlankString {
            field: field.to_string(),
        });
    }
    Ok(trimmed.to_string())
}

fn string_list(value: &Value, field: &str, limit: usize) -> Result<Vec<String>, ValidationError> {
    let Value::Array(items) = value else {
        return Err(ValidationError::NotAStringArray {
            field: field.to_string(),
        });
    };
    if limit < 1 {
        return Err(ValidationError::InvalidLimit {
            field: field.to_string(),
            limit,
        });
    }

    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for (index, item) in items.iter().enumerate() {
        let Value::String(raw) = item else {
            return Err(ValidationError::NonStringItem {
                field: field.to_string(),
                index,
            });
        };
        let candidate = raw.trim();
        if candidate.is_empty() {
            return Err(ValidationError::BlankItem {
                field: field.to_string(),
                index,
            });
        }
        if seen.insert(candidate) {
            out.push(candidate.to_string());
        }
        if out.len() >= limit {
            break;
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn valid_payload() -> CcsPayload {
        let value = json!({
            "episodic_trace": ["turn:1:check nginx"],
            "semantic_gist": "  502 errors on nginx  ",
            "focal_entities": ["nginx", "upstream"],
            "relational_map": ["nginx -> upstream"],
            "goal_orientation": "reduce 502 rate",
            "constraints": ["no restart"],
            "predictive_cue": ["check latency"],
            "uncertainty_signal": "medium",
            "retrieved_artifacts": ["turn-evidence-1-1"],
        });
        match value {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_valid_payload_is_normalized() {
        let state = parse_and_validate(&valid_payload(), None).unwrap();
        assert_eq!(state.semantic_gist, "502 errors on nginx");
        assert_eq!(state.focal_entities, vec!["nginx", "upstream"]);
        assert_eq!(state.uncertainty_signal, "medium");
    }

    #[test]
    fn test_missing_fields_are_all_reported() {
        let mut payload = valid_payload();
        payload.remove("constraints");
        payload.remove("semantic_gist");

        let err = parse_and_validate(&payload, None).unwrap_err();
        assert_eq!(
            err,
            ValidationError::MissingFields(vec![
                "semantic_gist".to_string(),
                "constraints".to_string()
            ])
        );
    }

    #[test]
    fn test_blank_string_rejected() {
        let mut payload = valid_payload();
        payload.insert("goal_orientation".into(), json!("   "));
        assert_eq!(
            parse_and_validate(&payload, None),
            Err(ValidationError::BlankString {
                field: "goal_orientation".to_string()
            })
        );

        payload.insert("goal_orientation".into(), json!(42));
        assert!(matches!(
            parse_and_validate(&payload, None),
            Err(ValidationError::NotAString { .. })
        ));
    }

    #[test]
    fn test_list_shape_rejected() {
        let mut payload = valid_payload();
        payload.insert("constraints".into(), json!("no restart"));
        assert!(matches!(
            parse_and_validate(&payload, None),
            Err(ValidationError::NotAStringArray { .. })
        ));

        payload.insert("constraints".into(), json!(["ok", 3]));
        assert_eq!(
            parse_and_validate(&payload, None),
            Err(ValidationError::NonStringItem {
                field: "constraints".to_string(),
                index: 1
            })
        );

        payload.insert("constraints".into(), json!(["ok", " "]));
        assert_eq!(
            parse_and_validate(&payload, None),
            Err(ValidationError::BlankItem {
                field: "constraints".to_string(),
                index: 1
            })
        );
    }

    #[test]
    fn test_list_truncated_to_limit() {
        let mut payload = valid_payload();
        payload.insert(
            "episodic_trace".into(),
            json!(["t1", "t2", "t3", "t4", "t5"]),
        );
        let state = parse_and_validate(&payload, None).unwrap();
        assert_eq!(state.episodic_trace, vec!["t1", "t2", "t3"]);

        let overrides: ListLimits = [("episodic_trace".to_string(), 1)].into_iter().collect();
        let state = parse_and_validate(&payload, Some(&overrides)).unwrap();
        assert_eq!(state.episodic_trace, vec!["t1"]);
    }

    #[test]
    fn test_zero_limit_is_configuration_error() {
        let overrides: ListLimits = [("predictive_cue".to_string(), 0)].into_iter().collect();
        assert_eq!(
            parse_and_validate(&valid_payload(), Some(&overrides)),
            Err(ValidationError::InvalidLimit {
                field: "predictive_cue".to_string(),
                limit: 0
            })
        );
    }

    #[test]
    fn test_unknown_override_ignored() {
        let overrides: ListLimits = [("semantic_gist".to_string(), 0)].into_iter().collect();
        assert!(parse_and_validate(&valid_payload(), Some(&overrides)).is_ok());
    }

    #[test]
    fn test_repeated_items_skipped() {
        let mut payload = valid_payload();
        payload.insert("focal_entities".into(), json!(["nginx", " nginx ", "db"]));
        let state = parse_and_validate(&payload, None).unwrap();
        assert_eq!(state.focal_entities, vec!["nginx", "db"]);
    }

    fn item() -> impl Strategy<Value = String> {
        "[a-z ]{0,3}[a-z][a-z ]{0,3}"
    }

    fn payload_strategy() -> impl Strategy<Value = CcsPayload> {
        (
            prop::collection::vec(item(), 0..10),
            item(),
            prop::collection::vec(item(), 0..12),
            prop::collection::vec(item(), 0..12),
            prop::collection::vec(item(), 0..6),
        )
            .prop_map(|(trace, gist, entities, constraints, artifacts)| {
                let value = json!({
                    "episodic_trace": trace,
                    "semantic_gist": gist,
                    "focal_entities": entities,
                    "relational_map": [],
                    "goal_orientation": "goal",
                    "constraints": constraints,
                    "predictive_cue": ["next"],
                    "uncertainty_signal": "low",
                    "retrieved_artifacts": artifacts,
                });
                match value {
                    Value::Object(map) => map,
                    _ => unreachable!(),
                }
            })
    }

    fn limits_strategy() -> impl Strategy<Value = ListLimits> {
        prop::collection::btree_map(
            prop::sample::select(
                DEFAULT_LIST_LIMITS
                    .iter()
                    .map(|(field, _)| field.to_string())
                    .collect::<Vec<_>>(),
            ),
            1usize..10,
            0..4,
        )
    }

    proptest! {
        #[test]
        fn prop_validation_is_idempotent(payload in payload_strategy()) {
            let first = parse_and_validate(&payload, None).unwrap();
            let second = parse_and_validate(&first.to_payload(), None).unwrap();
            prop_assert_eq!(first, second);
        }

        #[test]
        fn prop_limits_and_order_hold(payload in payload_strategy(), overrides in limits_strategy()) {
            let state = parse_and_validate(&payload, Some(&overrides)).unwrap();
            let limits = merged_limits(Some(&overrides));

            for (field, values) in [
                ("episodic_trace", &state.episodic_trace),
                ("focal_entities", &state.focal_entities),
                ("constraints", &state.constraints),
                ("retrieved_artifacts", &state.retrieved_artifacts),
            ] {
                prop_assert!(values.len() <= limits[field]);

                // Output is an ordered subsequence of the trimmed input
                let input: Vec<String> = payload[field]
                    .as_array()
                    .unwrap()
                    .iter()
                    .map(|v| v.as_str().unwrap().trim().to_string())
                    .collect();
                let mut cursor = input.iter();
                for value in values {
                    prop_assert!(cursor.any(|candidate| candidate == value));
                }
            }
        }
    }
}

//! Diagnosis response mapper.
//!
//! Projects raw backend output into the answer text, the visualization
//! data, and the warning flag. Only a missing answer fails the turn;
//! a missing or malformed `data` section degrades to empty structures.

use serde_json::Value;

use super::types::{RawDiagnosisResponse, RawSymptomNetwork};
use super::PipelineError;
use crate::models::{DiagnosisData, DiseaseProbability, SymptomLink, SymptomNetwork, SymptomNode};

/// Mapper output for one backend response.
#[derive(Debug, Clone, PartialEq)]
pub struct MappedResponse {
    pub answer_text: String,
    pub diagnosis: DiagnosisData,
    /// `None` means no active warning.
    pub warning: Option<String>,
}

/// Map a raw backend response.
pub fn map_response(raw: &Value) -> Result<MappedResponse, PipelineError> {
    let parsed: RawDiagnosisResponse = serde_json::from_value(raw.clone())
        .map_err(|e| PipelineError::MalformedResponse(e.to_string()))?;

    let answer_text = parsed
        .answer
        .filter(|a| !a.trim().is_empty())
        .ok_or_else(|| PipelineError::MalformedResponse("missing answer".into()))?;

    let diagnosis = match parsed.data {
        Some(Value::Object(data)) => DiagnosisData {
            symptom_network: map_network(data.get("symptom_network")),
            probabilities: map_probabilities(data.get("probabilities")),
        },
        Some(Value::Null) | None => DiagnosisData::default(),
        Some(other) => {
            tracing::warn!(kind = json_kind(&other), "Diagnosis data is not an object, ignoring");
            DiagnosisData::default()
        }
    };

    Ok(MappedResponse {
        answer_text,
        diagnosis,
        warning: map_warning(parsed.warning),
    })
}

/// Absent or blank warnings mean "no active warning".
pub fn normalize_warning(warning: Option<String>) -> Option<String> {
    warning.filter(|w| !w.trim().is_empty())
}

fn map_warning(raw: Option<Value>) -> Option<String> {
    match raw {
        Some(Value::String(w)) => normalize_warning(Some(w)),
        None | Some(Value::Null) => None,
        Some(other) => {
            tracing::warn!(kind = json_kind(&other), "Warning is not a string, ignoring");
            None
        }
    }
}

fn map_network(section: Option<&Value>) -> SymptomNetwork {
    let raw = match section {
        None | Some(Value::Null) => return SymptomNetwork::default(),
        Some(value) => match serde_json::from_value::<RawSymptomNetwork>(value.clone()) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(error = %e, "Malformed symptom network, ignoring");
                return SymptomNetwork::default();
            }
        },
    };

    let mut nodes: Vec<SymptomNode> = Vec::with_capacity(raw.nodes.len());
    for node in raw.nodes {
        if nodes.iter().any(|n| n.id == node.id) {
            tracing::debug!(id = %node.id, "Duplicate symptom node dropped");
            continue;
        }
        nodes.push(SymptomNode {
            id: node.id,
            group: node.group,
        });
    }

    let links = raw
        .links
        .into_iter()
        .map(|link| {
            let weight = clamp_unit(link.strength(), "link weight", &link.source);
            SymptomLink {
                source: link.source,
                target: link.target,
                weight,
            }
        })
        .collect();

    SymptomNetwork { nodes, links }
}

fn map_probabilities(section: Option<&Value>) -> Vec<DiseaseProbability> {
    let table = match section {
        None | Some(Value::Null) => return Vec::new(),
        Some(Value::Object(table)) => table,
        Some(other) => {
            tracing::warn!(kind = json_kind(other), "Probability table is not an object, ignoring");
            return Vec::new();
        }
    };

    table
        .iter()
        .filter_map(|(disease, value)| match value.as_f64() {
            Some(p) => Some(DiseaseProbability {
                disease: disease.clone(),
                probability: clamp_unit(p, "probability", disease),
            }),
            None => {
                tracing::warn!(disease = %disease, "Non-numeric probability dropped");
                None
            }
        })
        .collect()
}

/// Clamp into [0, 1], logging a `ProbabilityOutOfRange` diagnostic when needed.
fn clamp_unit(value: f64, what: &str, label: &str) -> f64 {
    if value.is_nan() {
        tracing::warn!(label = %label, what, "ProbabilityOutOfRange: NaN replaced with 0");
        return 0.0;
    }
    let clamped = value.clamp(0.0, 1.0);
    if clamped != value {
        tracing::warn!(
            label = %label,
            what,
            value,
            clamped,
            "ProbabilityOutOfRange: value clamped"
        );
    }
    clamped
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn full_payload() -> Value {
        json!({
            "answer": "收到症状：头痛。请补充说明：疼痛程度如何？",
            "data": {
                "symptom_network": {
                    "nodes": [{"id": "头痛", "group": 1}, {"id": "发热", "group": 2}],
                    "links": [{"source": "头痛", "target": "发热", "value": 0.8}]
                },
                "probabilities": {"感冒": 0.65, "流感": 0.25, "偏头痛": 0.1}
            },
            "warning": "持续高热需立即就医"
        })
    }

    #[test]
    fn maps_full_payload() {
        let mapped = map_response(&full_payload()).unwrap();
        assert!(mapped.answer_text.starts_with("收到症状"));
        assert_eq!(mapped.warning.as_deref(), Some("持续高热需立即就医"));

        let net = &mapped.diagnosis.symptom_network;
        assert_eq!(net.nodes.len(), 2);
        assert_eq!(net.links[0].weight, 0.8);

        let diseases: Vec<&str> = mapped
            .diagnosis
            .probabilities
            .iter()
            .map(|p| p.disease.as_str())
            .collect();
        assert_eq!(diseases, vec!["感冒", "流感", "偏头痛"]);
    }

    #[test]
    fn missing_answer_is_malformed() {
        let result = map_response(&json!({"data": {}}));
        assert!(matches!(result, Err(PipelineError::MalformedResponse(_))));
    }

    #[test]
    fn blank_answer_is_malformed() {
        let result = map_response(&json!({"answer": "  "}));
        assert!(matches!(result, Err(PipelineError::MalformedResponse(_))));
    }

    #[test]
    fn non_object_payload_is_malformed() {
        assert!(map_response(&json!("just text")).is_err());
        assert!(map_response(&json!({"answer": 42})).is_err());
    }

    #[test]
    fn missing_data_maps_to_empty() {
        let mapped = map_response(&json!({"answer": "ok"})).unwrap();
        assert!(mapped.diagnosis.is_empty());
        assert!(mapped.warning.is_none());
    }

    #[test]
    fn partial_data_degrades_per_section() {
        let mapped = map_response(&json!({
            "answer": "ok",
            "data": {"symptom_network": "garbage", "probabilities": {"感冒": 0.4}}
        }))
        .unwrap();
        assert!(mapped.diagnosis.symptom_network.is_empty());
        assert_eq!(mapped.diagnosis.probability_of("感冒"), Some(0.4));
    }

    #[test]
    fn out_of_range_probabilities_are_clamped() {
        let mapped = map_response(&json!({
            "answer": "ok",
            "data": {"probabilities": {"a": 1.5, "b": -0.2, "c": 0.3}}
        }))
        .unwrap();
        assert_eq!(mapped.diagnosis.probability_of("a"), Some(1.0));
        assert_eq!(mapped.diagnosis.probability_of("b"), Some(0.0));
        assert_eq!(mapped.diagnosis.probability_of("c"), Some(0.3));
        assert!(mapped.diagnosis.out_of_range_value().is_none());
    }

    #[test]
    fn non_numeric_probability_is_dropped() {
        let mapped = map_response(&json!({
            "answer": "ok",
            "data": {"probabilities": {"a": "high", "b": 0.2}}
        }))
        .unwrap();
        assert_eq!(mapped.diagnosis.probabilities.len(), 1);
    }

    #[test]
    fn link_weights_are_clamped_and_nodes_deduplicated() {
        let mapped = map_response(&json!({
            "answer": "ok",
            "data": {"symptom_network": {
                "nodes": [{"id": "咳嗽", "group": 1}, {"id": "咳嗽", "group": 3}],
                "links": [{"source": "咳嗽", "target": "咽痛", "weight": 2.0}]
            }}
        }))
        .unwrap();
        let net = mapped.diagnosis.symptom_network;
        assert_eq!(net.nodes.len(), 1);
        assert_eq!(net.nodes[0].group, 1);
        assert_eq!(net.links[0].weight, 1.0);
    }

    #[test]
    fn blank_or_null_warning_is_no_warning() {
        let mapped = map_response(&json!({"answer": "ok", "warning": ""})).unwrap();
        assert!(mapped.warning.is_none());
        let mapped = map_response(&json!({"answer": "ok", "warning": null})).unwrap();
        assert!(mapped.warning.is_none());
    }

    #[test]
    fn non_string_warning_keeps_the_turn() {
        for warning in [json!(false), json!(3), json!({"level": "high"})] {
            let mapped = map_response(&json!({
                "answer": "ok",
                "data": {"probabilities": {"感冒": 0.65}},
                "warning": warning
            }))
            .unwrap();
            assert!(mapped.warning.is_none());
            assert_eq!(mapped.diagnosis.probability_of("感冒"), Some(0.65));
        }
    }

    #[test]
    fn link_with_weight_and_value_prefers_weight() {
        let mapped = map_response(&json!({
            "answer": "ok",
            "data": {"symptom_network": {
                "nodes": [{"id": "头痛", "group": 1}, {"id": "发热", "group": 2}],
                "links": [
                    {"source": "头痛", "target": "发热", "weight": 0.5, "value": 0.9},
                    {"source": "发热", "target": "头痛", "value": 0.3}
                ]
            }}
        }))
        .unwrap();
        let net = mapped.diagnosis.symptom_network;
        assert_eq!(net.nodes.len(), 2);
        assert_eq!(net.links.len(), 2);
        assert_eq!(net.links[0].weight, 0.5);
        assert_eq!(net.links[1].weight, 0.3);
    }
}

use serde::{Deserialize, Serialize};

/// A symptom in the association graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymptomNode {
    pub id: String,
    pub group: i64,
}

/// Association between two symptoms. `weight` is always within [0, 1].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymptomLink {
    pub source: String,
    pub target: String,
    pub weight: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SymptomNetwork {
    /// Unique by `id`.
    pub nodes: Vec<SymptomNode>,
    pub links: Vec<SymptomLink>,
}

impl SymptomNetwork {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.links.is_empty()
    }

    pub fn node(&self, id: &str) -> Option<&SymptomNode> {
        self.nodes.iter().find(|n| n.id == id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiseaseProbability {
    pub disease: String,
    pub probability: f64,
}

/// Visualization data from the latest backend response.
///
/// Replaced wholesale on every successful turn; empty before the first one.
/// Probabilities keep the order the backend sent them in.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DiagnosisData {
    pub symptom_network: SymptomNetwork,
    pub probabilities: Vec<DiseaseProbability>,
}

impl DiagnosisData {
    pub fn is_empty(&self) -> bool {
        self.symptom_network.is_empty() && self.probabilities.is_empty()
    }

    pub fn probability_of(&self, disease: &str) -> Option<f64> {
        self.probabilities
            .iter()
            .find(|p| p.disease == disease)
            .map(|p| p.probability)
    }

    /// First value outside [0, 1], if any (links or probabilities).
    pub(crate) fn out_of_range_value(&self) -> Option<f64> {
        let in_range = |v: f64| (0.0..=1.0).contains(&v);
        self.symptom_network
            .links
            .iter()
            .map(|l| l.weight)
            .chain(self.probabilities.iter().map(|p| p.probability))
            .find(|v| !in_range(*v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> DiagnosisData {
        DiagnosisData {
            symptom_network: SymptomNetwork {
                nodes: vec![SymptomNode { id: "头痛".into(), group: 1 }],
                links: vec![SymptomLink {
                    source: "头痛".into(),
                    target: "发热".into(),
                    weight: 0.8,
                }],
            },
            probabilities: vec![DiseaseProbability {
                disease: "感冒".into(),
                probability: 0.65,
            }],
        }
    }

    #[test]
    fn default_is_empty() {
        assert!(DiagnosisData::default().is_empty());
        assert!(!sample().is_empty());
    }

    #[test]
    fn probability_lookup() {
        let data = sample();
        assert_eq!(data.probability_of("感冒"), Some(0.65));
        assert_eq!(data.probability_of("流感"), None);
    }

    #[test]
    fn detects_out_of_range_values() {
        let mut data = sample();
        assert!(data.out_of_range_value().is_none());
        data.probabilities[0].probability = 1.5;
        assert_eq!(data.out_of_range_value(), Some(1.5));
    }

    #[test]
    fn node_lookup_by_id() {
        let data = sample();
        assert_eq!(data.symptom_network.node("头痛").map(|n| n.group), Some(1));
        assert!(data.symptom_network.node("咳嗽").is_none());
    }
}

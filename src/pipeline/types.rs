use serde::Deserialize;

/// Top-level backend payload. Every field optional so shape problems
/// surface as mapper errors rather than parse panics.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawDiagnosisResponse {
    #[serde(default)]
    pub answer: Option<String>,
    #[serde(default)]
    pub data: Option<serde_json::Value>,
    /// Checked by the mapper; anything but a string means no warning.
    #[serde(default)]
    pub warning: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawSymptomNetwork {
    #[serde(default)]
    pub nodes: Vec<RawSymptomNode>,
    #[serde(default)]
    pub links: Vec<RawSymptomLink>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawSymptomNode {
    pub id: String,
    #[serde(default)]
    pub group: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawSymptomLink {
    pub source: String,
    pub target: String,
    #[serde(default)]
    pub weight: Option<f64>,
    /// Older payloads send the association strength as `value`.
    #[serde(default)]
    pub value: Option<f64>,
}

impl RawSymptomLink {
    /// `weight` wins when both keys are present.
    pub fn strength(&self) -> f64 {
        self.weight.or(self.value).unwrap_or(0.0)
    }
}

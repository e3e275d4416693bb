use serde::Serialize;
use serde_json::{json, Value};

use super::BackendError;

/// Warning raised by the built-in backend when a high-risk symptom is mentioned.
pub const HIGH_FEVER_WARNING: &str = "持续高热需立即就医";

/// Symptoms that make the built-in backend raise `HIGH_FEVER_WARNING`.
static HIGH_RISK_KEYWORDS: &[&str] = &["发热"];

/// The AI backend that turns an utterance into an answer plus diagnosis data.
///
/// Returns the raw JSON payload; interpretation belongs to the mapper.
pub trait DiagnosisBackend: Send + Sync {
    fn ask(&self, text: &str) -> Result<Value, BackendError>;
}

// ═══════════════════════════════════════════
// Built-in placeholder backend
// ═══════════════════════════════════════════

/// Local stand-in for the diagnosis service.
///
/// Echoes the symptoms back with a follow-up question and a fixed
/// association graph and probability table.
#[derive(Debug, Default, Clone)]
pub struct MockDiagnosisBackend;

impl MockDiagnosisBackend {
    pub fn new() -> Self {
        Self
    }
}

impl DiagnosisBackend for MockDiagnosisBackend {
    fn ask(&self, text: &str) -> Result<Value, BackendError> {
        let warning = HIGH_RISK_KEYWORDS
            .iter()
            .any(|kw| text.contains(kw))
            .then_some(HIGH_FEVER_WARNING);

        Ok(json!({
            "answer": format!("收到症状：{text}。请补充说明：疼痛程度如何？"),
            "data": {
                "symptom_network": {
                    "nodes": [
                        {"id": "头痛", "group": 1},
                        {"id": "发热", "group": 2}
                    ],
                    "links": [
                        {"source": "头痛", "target": "发热", "value": 0.8}
                    ]
                },
                "probabilities": {
                    "感冒": 0.65,
                    "流感": 0.25,
                    "偏头痛": 0.1
                }
            },
            "warning": warning
        }))
    }
}

// ═══════════════════════════════════════════
// HTTP backend
// ═══════════════════════════════════════════

/// Request body for POST {base_url}/ask
#[derive(Serialize)]
struct AskRequest<'a> {
    text: &'a str,
}

/// Diagnosis service reached over HTTP.
pub struct HttpDiagnosisBackend {
    base_url: String,
    client: reqwest::blocking::Client,
    timeout_secs: u64,
}

impl HttpDiagnosisBackend {
    pub fn new(base_url: &str, timeout_secs: u64) -> Result<Self, BackendError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| BackendError::HttpClient(e.to_string()))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            timeout_secs,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl DiagnosisBackend for HttpDiagnosisBackend {
    fn ask(&self, text: &str) -> Result<Value, BackendError> {
        let url = format!("{}/ask", self.base_url);

        let response = self
            .client
            .post(&url)
            .json(&AskRequest { text })
            .send()
            .map_err(|e| {
                if e.is_connect() {
                    BackendError::Connection(self.base_url.clone())
                } else if e.is_timeout() {
                    BackendError::Timeout(self.timeout_secs)
                } else {
                    BackendError::HttpClient(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(BackendError::Status {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<Value>()
            .map_err(|e| BackendError::ResponseParsing(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mock_echoes_text_in_answer() {
        let payload = MockDiagnosisBackend::new().ask("轻微咳嗽").unwrap();
        assert_eq!(payload["answer"], "收到症状：轻微咳嗽。请补充说明：疼痛程度如何？");
    }

    #[test]
    fn mock_warns_on_fever() {
        let payload = MockDiagnosisBackend::new().ask("头痛三天，伴有发热").unwrap();
        assert_eq!(payload["warning"], HIGH_FEVER_WARNING);
    }

    #[test]
    fn mock_has_no_warning_without_fever() {
        let payload = MockDiagnosisBackend::new().ask("轻微咳嗽").unwrap();
        assert!(payload["warning"].is_null());
    }

    #[test]
    fn mock_probability_table_is_fixed() {
        let payload = MockDiagnosisBackend::new().ask("x").unwrap();
        let probs = payload["data"]["probabilities"].as_object().unwrap();
        let keys: Vec<&str> = probs.keys().map(|k| k.as_str()).collect();
        assert_eq!(keys, vec!["感冒", "流感", "偏头痛"]);
    }

    #[test]
    fn http_backend_trims_trailing_slash() {
        let backend = HttpDiagnosisBackend::new("http://localhost:8000/", 5).unwrap();
        assert_eq!(backend.base_url(), "http://localhost:8000");
        assert_eq!(backend.timeout_secs, 5);
    }

    #[test]
    fn http_backend_unreachable_is_error() {
        // Port 9 (discard) is not expected to run an HTTP server.
        let backend = HttpDiagnosisBackend::new("http://127.0.0.1:9", 1).unwrap();
        assert!(backend.ask("头痛").is_err());
    }
}

use crate::pipeline::backend::{DiagnosisBackend, HttpDiagnosisBackend, MockDiagnosisBackend};
use crate::pipeline::BackendError;

/// Application-level constants
pub const APP_NAME: &str = "MedIntake";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Environment variable holding the diagnosis service base URL.
pub const BACKEND_URL_ENV: &str = "MEDINTAKE_BACKEND_URL";
/// Environment variable holding the request timeout in seconds.
pub const BACKEND_TIMEOUT_ENV: &str = "MEDINTAKE_BACKEND_TIMEOUT_SECS";

pub const DEFAULT_BACKEND_TIMEOUT_SECS: u64 = 30;

/// Log filter used when `RUST_LOG` is not set.
pub fn default_log_filter() -> &'static str {
    if is_dev() {
        "medintake_lib=debug,info"
    } else {
        "medintake_lib=info,warn"
    }
}

pub fn is_dev() -> bool {
    cfg!(debug_assertions)
}

/// Where diagnosis requests go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendConfig {
    /// `None` selects the built-in mock backend.
    pub base_url: Option<String>,
    pub timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout_secs: DEFAULT_BACKEND_TIMEOUT_SECS,
        }
    }
}

impl BackendConfig {
    pub fn from_env() -> Self {
        Self::from_values(
            std::env::var(BACKEND_URL_ENV).ok(),
            std::env::var(BACKEND_TIMEOUT_ENV).ok(),
        )
    }

    fn from_values(url: Option<String>, timeout: Option<String>) -> Self {
        let base_url = url
            .map(|u| u.trim().to_string())
            .filter(|u| !u.is_empty());

        let timeout_secs = match timeout {
            None => DEFAULT_BACKEND_TIMEOUT_SECS,
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => secs,
                _ => {
                    tracing::warn!(
                        value = %raw,
                        default = DEFAULT_BACKEND_TIMEOUT_SECS,
                        "Invalid {BACKEND_TIMEOUT_ENV}, using default"
                    );
                    DEFAULT_BACKEND_TIMEOUT_SECS
                }
            },
        };

        Self {
            base_url,
            timeout_secs,
        }
    }
}

/// Build the configured backend.
pub fn build_backend(config: &BackendConfig) -> Result<Box<dyn DiagnosisBackend>, BackendError> {
    match &config.base_url {
        Some(url) => {
            let backend = HttpDiagnosisBackend::new(url, config.timeout_secs)?;
            tracing::info!(
                url = %backend.base_url(),
                timeout_secs = config.timeout_secs,
                "Using HTTP diagnosis backend"
            );
            Ok(Box::new(backend))
        }
        None => {
            tracing::info!("No {BACKEND_URL_ENV} set, using built-in mock backend");
            Ok(Box::new(MockDiagnosisBackend::new()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn app_name_is_medintake() {
        assert_eq!(APP_NAME, "MedIntake");
    }

    #[test]
    fn app_version_matches_cargo() {
        assert_eq!(APP_VERSION, "0.1.0");
    }

    #[test]
    fn log_filter_targets_crate() {
        assert!(default_log_filter().starts_with("medintake_lib="));
    }

    #[test]
    fn missing_url_selects_mock() {
        let config = BackendConfig::from_values(None, None);
        assert_eq!(config, BackendConfig::default());
    }

    #[test]
    fn blank_url_selects_mock() {
        let config = BackendConfig::from_values(Some("   ".into()), None);
        assert!(config.base_url.is_none());
    }

    #[test]
    fn url_and_timeout_are_read() {
        let config = BackendConfig::from_values(
            Some("http://localhost:8000".into()),
            Some("5".into()),
        );
        assert_eq!(config.base_url.as_deref(), Some("http://localhost:8000"));
        assert_eq!(config.timeout_secs, 5);
    }

    #[test]
    fn invalid_timeout_falls_back_to_default() {
        for raw in ["abc", "-1", "0", ""] {
            let config = BackendConfig::from_values(None, Some(raw.into()));
            assert_eq!(config.timeout_secs, DEFAULT_BACKEND_TIMEOUT_SECS, "raw = {raw:?}");
        }
    }

    #[test]
    fn mock_backend_answers() {
        let backend = build_backend(&BackendConfig::default()).unwrap();
        let payload = backend.ask("头痛").unwrap();
        assert!(payload["answer"].is_string());
    }
}

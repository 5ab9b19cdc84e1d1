//! AI service settings model.
//!
//! The settings form edits a [`SettingsValues`] snapshot: which AI service
//! the host should call, its endpoint URL, a credential, and a model name.
//! Each service carries a fixed default endpoint; selecting a service
//! overwrites the URL field with that default. The rule lives here as a
//! pure mapping so it can be tested independently of the form.
//!
//! Defaults are seeded from the environment (`PROCMON_*` variables) with
//! built-in fallbacks, mirroring the host's own configuration layer.

use serde::{Deserialize, Serialize};

/// Built-in Groq chat-completions endpoint.
pub const GROQ_DEFAULT_ENDPOINT: &str = "https://api.groq.com/openai/v1/chat/completions";
/// Built-in Ollama chat endpoint.
pub const OLLAMA_DEFAULT_ENDPOINT: &str = "http://localhost:11434/api/chat";
/// Suggested Groq model.
pub const GROQ_DEFAULT_MODEL: &str = "llama-3.3-70b-versatile";
/// Suggested Ollama model.
pub const OLLAMA_DEFAULT_MODEL: &str = "llama3.2:1b";

/// Selectable AI services.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum AiService {
    /// Groq hosted API
    #[default]
    Groq,
    /// Local Ollama instance
    Ollama,
}

impl AiService {
    /// All services in selector order.
    pub const ALL: [AiService; 2] = [AiService::Groq, AiService::Ollama];

    /// Display name, also the submission payload value.
    pub fn name(&self) -> &'static str {
        match self {
            AiService::Groq => "Groq",
            AiService::Ollama => "Ollama",
        }
    }

    /// The fixed default endpoint URL for this service.
    ///
    /// Selecting a service in the settings form overwrites the URL field
    /// with this value.
    pub fn default_endpoint(&self) -> &'static str {
        match self {
            AiService::Groq => GROQ_DEFAULT_ENDPOINT,
            AiService::Ollama => OLLAMA_DEFAULT_ENDPOINT,
        }
    }

    /// The suggested model identifier for this service.
    pub fn suggested_model(&self) -> &'static str {
        match self {
            AiService::Groq => GROQ_DEFAULT_MODEL,
            AiService::Ollama => OLLAMA_DEFAULT_MODEL,
        }
    }

    /// The next service in selector order (wraps).
    pub fn next(&self) -> AiService {
        let idx = Self::ALL.iter().position(|s| s == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    /// The previous service in selector order (wraps).
    pub fn prev(&self) -> AiService {
        let idx = Self::ALL.iter().position(|s| s == self).unwrap_or(0);
        if idx == 0 {
            Self::ALL[Self::ALL.len() - 1]
        } else {
            Self::ALL[idx - 1]
        }
    }

    /// Parse a service from a case-insensitive name.
    pub fn from_name(name: &str) -> Option<AiService> {
        match name.to_ascii_lowercase().as_str() {
            "groq" => Some(AiService::Groq),
            "ollama" => Some(AiService::Ollama),
            _ => None,
        }
    }
}

impl std::fmt::Display for AiService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// The full settings field set as edited by the form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettingsValues {
    /// Selected AI service
    pub service: AiService,
    /// Endpoint URL, seeded with the service default
    pub api_url: String,
    /// Credential. Sensitive: render masked, log redacted.
    pub api_key: String,
    /// Model identifier
    pub model: String,
}

impl SettingsValues {
    /// The API key with everything but the last four characters masked.
    ///
    /// Used anywhere the key leaves the form (logs, status lines).
    pub fn redacted_key(&self) -> String {
        if self.api_key.is_empty() {
            return "(unset)".to_string();
        }
        let chars: Vec<char> = self.api_key.chars().collect();
        if chars.len() <= 4 {
            return "•".repeat(chars.len());
        }
        let visible: String = chars[chars.len() - 4..].iter().collect();
        format!("{}{}", "•".repeat(chars.len() - 4), visible)
    }
}

/// Per-service defaults, possibly overridden by the environment.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceProfile {
    /// Endpoint URL the form resets to when this service is selected
    pub endpoint: String,
    /// Model suggestion seeded into the model field
    pub model: String,
}

/// Initial settings state, built from environment overrides over the
/// built-in defaults.
///
/// Recognized variables: `PROCMON_AI_SERVICE`, `PROCMON_GROQ_API_URL`,
/// `PROCMON_GROQ_MODEL`, `PROCMON_OLLAMA_API_URL`, `PROCMON_OLLAMA_MODEL`,
/// `PROCMON_API_KEY`.
#[derive(Debug, Clone, PartialEq)]
pub struct SettingsDefaults {
    /// Initially selected service
    pub service: AiService,
    /// Groq profile
    pub groq: ServiceProfile,
    /// Ollama profile
    pub ollama: ServiceProfile,
    /// Pre-seeded credential, usually empty
    pub api_key: String,
}

impl Default for SettingsDefaults {
    fn default() -> Self {
        Self {
            service: AiService::default(),
            groq: ServiceProfile {
                endpoint: GROQ_DEFAULT_ENDPOINT.to_string(),
                model: GROQ_DEFAULT_MODEL.to_string(),
            },
            ollama: ServiceProfile {
                endpoint: OLLAMA_DEFAULT_ENDPOINT.to_string(),
                model: OLLAMA_DEFAULT_MODEL.to_string(),
            },
            api_key: String::new(),
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    match std::env::var(key) {
        Ok(value) if !value.is_empty() => value,
        _ => default.to_string(),
    }
}

impl SettingsDefaults {
    /// Build defaults from the process environment.
    ///
    /// An unrecognized `PROCMON_AI_SERVICE` value falls back to Groq with
    /// a warning.
    pub fn from_env() -> Self {
        let service = match std::env::var("PROCMON_AI_SERVICE") {
            Ok(name) if !name.is_empty() => AiService::from_name(&name).unwrap_or_else(|| {
                tracing::warn!(service = %name, "unknown PROCMON_AI_SERVICE, using Groq");
                AiService::Groq
            }),
            _ => AiService::default(),
        };

        Self {
            service,
            groq: ServiceProfile {
                endpoint: env_or("PROCMON_GROQ_API_URL", GROQ_DEFAULT_ENDPOINT),
                model: env_or("PROCMON_GROQ_MODEL", GROQ_DEFAULT_MODEL),
            },
            ollama: ServiceProfile {
                endpoint: env_or("PROCMON_OLLAMA_API_URL", OLLAMA_DEFAULT_ENDPOINT),
                model: env_or("PROCMON_OLLAMA_MODEL", OLLAMA_DEFAULT_MODEL),
            },
            api_key: env_or("PROCMON_API_KEY", ""),
        }
    }

    /// The profile for a given service.
    pub fn profile(&self, service: AiService) -> &ServiceProfile {
        match service {
            AiService::Groq => &self.groq,
            AiService::Ollama => &self.ollama,
        }
    }

    /// The endpoint the URL field resets to when `service` is selected.
    ///
    /// This is the derived-field rule: a pure function from the selection
    /// to the URL value, with environment overrides applied.
    pub fn endpoint_for(&self, service: AiService) -> String {
        self.profile(service).endpoint.clone()
    }

    /// The model suggestion for `service`.
    pub fn model_for(&self, service: AiService) -> String {
        self.profile(service).model.clone()
    }

    /// The initial form state.
    pub fn initial_values(&self) -> SettingsValues {
        SettingsValues {
            service: self.service,
            api_url: self.endpoint_for(self.service),
            api_key: self.api_key.clone(),
            model: self.model_for(self.service),
        }
    }
}

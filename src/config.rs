//! Configuration loaded from the environment.
//!
//! Binaries call `dotenvy::dotenv()` first, so a `.env` file in the working
//! directory feeds the same variables.

use std::net::SocketAddr;
use std::time::Duration;

use crate::providers::azure::DEFAULT_API_VERSION;
use crate::tools::{Endpoints, DEFAULT_BOOKS_API, DEFAULT_SEARCH_API, DEFAULT_WEATHER_API};

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8000";
pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:8000/mcp";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error(
        "completion service not configured: set AZURE_OPENAI_ENDPOINT, AZURE_OPENAI_API_KEY \
         and AZURE_OPENAI_DEPLOYMENT_NAME, or OPENAI_API_KEY"
    )]
    MissingCompletionCredentials,

    #[error("{name} is required when AZURE_OPENAI_ENDPOINT is set")]
    MissingAzureSetting { name: &'static str },

    #[error("invalid bind address {value:?}: {reason}")]
    InvalidBindAddr { value: String, reason: String },
}

/// Tool host settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    pub weather_api_key: Option<String>,
    pub endpoints: Endpoints,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable source. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let bind = get("GDEX_BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());

        Ok(Self {
            bind_addr: parse_bind_addr(&bind)?,
            weather_api_key: get("WEATHER_API_KEY"),
            endpoints: Endpoints {
                weather: get("WEATHER_API_BASE").unwrap_or_else(|| DEFAULT_WEATHER_API.to_string()),
                books: get("BOOKS_API_BASE").unwrap_or_else(|| DEFAULT_BOOKS_API.to_string()),
                search: get("SEARCH_API_BASE").unwrap_or_else(|| DEFAULT_SEARCH_API.to_string()),
            },
        })
    }
}

pub fn parse_bind_addr(value: &str) -> Result<SocketAddr, ConfigError> {
    value
        .parse()
        .map_err(|e: std::net::AddrParseError| ConfigError::InvalidBindAddr {
            value: value.to_string(),
            reason: e.to_string(),
        })
}

/// Which completion service the chat client talks to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionConfig {
    Azure {
        endpoint: String,
        deployment: String,
        api_version: String,
        api_key: String,
    },
    OpenAi {
        api_key: String,
        model: String,
    },
}

/// Chat client settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatConfig {
    pub server_url: String,
    pub contact_id: Option<String>,
    pub completion: CompletionConfig,
    pub request_timeout: Duration,
}

impl ChatConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable source. Empty values count as unset.
    ///
    /// Azure is used whenever `AZURE_OPENAI_ENDPOINT` is set; otherwise
    /// `OPENAI_API_KEY` selects the public OpenAI API.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let completion = if let Some(endpoint) = get("AZURE_OPENAI_ENDPOINT") {
            let require = |name: &'static str| {
                get(name).ok_or(ConfigError::MissingAzureSetting { name })
            };
            CompletionConfig::Azure {
                endpoint,
                deployment: require("AZURE_OPENAI_DEPLOYMENT_NAME")?,
                api_key: require("AZURE_OPENAI_API_KEY")?,
                api_version: get("AZURE_OPENAI_API_VERSION")
                    .unwrap_or_else(|| DEFAULT_API_VERSION.to_string()),
            }
        } else if let Some(api_key) = get("OPENAI_API_KEY") {
            CompletionConfig::OpenAi {
                api_key,
                model: get("OPENAI_MODEL").unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_string()),
            }
        } else {
            return Err(ConfigError::MissingCompletionCredentials);
        };

        Ok(Self {
            server_url: get("GDEX_MCP_SERVER_URL").unwrap_or_else(|| DEFAULT_SERVER_URL.to_string()),
            contact_id: get("CONTACT_ID"),
            completion,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_server_defaults() {
        let config = ServerConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.bind_addr, DEFAULT_BIND_ADDR.parse().unwrap());
        assert_eq!(config.weather_api_key, None);
        assert_eq!(config.endpoints, Endpoints::default());
    }

    #[test]
    fn test_server_overrides() {
        let config = ServerConfig::from_lookup(lookup(&[
            ("GDEX_BIND_ADDR", "0.0.0.0:9000"),
            ("WEATHER_API_KEY", "k"),
            ("BOOKS_API_BASE", "http://localhost:1"),
        ]))
        .unwrap();
        assert_eq!(config.bind_addr.port(), 9000);
        assert_eq!(config.weather_api_key.as_deref(), Some("k"));
        assert_eq!(config.endpoints.books, "http://localhost:1");
        assert_eq!(config.endpoints.weather, DEFAULT_WEATHER_API);
    }

    #[test]
    fn test_invalid_bind_addr() {
        let err = ServerConfig::from_lookup(lookup(&[("GDEX_BIND_ADDR", "nope")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidBindAddr { .. }));
    }

    #[test]
    fn test_chat_prefers_azure() {
        let config = ChatConfig::from_lookup(lookup(&[
            ("AZURE_OPENAI_ENDPOINT", "https://example.openai.azure.com"),
            ("AZURE_OPENAI_API_KEY", "azure-key"),
            ("AZURE_OPENAI_DEPLOYMENT_NAME", "gpt4o"),
            ("OPENAI_API_KEY", "ignored"),
            ("CONTACT_ID", "c-1"),
        ]))
        .unwrap();

        assert_eq!(config.server_url, DEFAULT_SERVER_URL);
        assert_eq!(config.contact_id.as_deref(), Some("c-1"));
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(
            config.completion,
            CompletionConfig::Azure {
                endpoint: "https://example.openai.azure.com".to_string(),
                deployment: "gpt4o".to_string(),
                api_version: DEFAULT_API_VERSION.to_string(),
                api_key: "azure-key".to_string(),
            }
        );
    }

    #[test]
    fn test_chat_azure_requires_deployment() {
        let err = ChatConfig::from_lookup(lookup(&[
            ("AZURE_OPENAI_ENDPOINT", "https://example.openai.azure.com"),
            ("AZURE_OPENAI_API_KEY", "azure-key"),
        ]))
        .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::MissingAzureSetting { name: "AZURE_OPENAI_DEPLOYMENT_NAME" }
        ));
    }

    #[test]
    fn test_chat_openai_fallback() {
        let config = ChatConfig::from_lookup(lookup(&[
            ("OPENAI_API_KEY", "sk-test"),
            ("GDEX_MCP_SERVER_URL", "http://10.0.0.2:8000/mcp"),
        ]))
        .unwrap();
        assert_eq!(config.server_url, "http://10.0.0.2:8000/mcp");
        assert_eq!(
            config.completion,
            CompletionConfig::OpenAi {
                api_key: "sk-test".to_string(),
                model: DEFAULT_OPENAI_MODEL.to_string(),
            }
        );
    }

    #[test]
    fn test_chat_without_credentials() {
        let err = ChatConfig::from_lookup(lookup(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingCompletionCredentials));
    }
}

//! Tool implementations served by the tool host.
//!
//! Each tool is a thin call to a public HTTP API. Upstream failures that the
//! tools know how to describe (an unknown city, a failed book search) come
//! back as text; anything else is a [`ToolError`].

use crate::http::build_http_client;
use crate::options::TransportOptions;

mod books;
mod clock;
mod search;
mod weather;

pub use books::NO_BOOKS_FOUND;
pub use clock::DATE_TIME_FORMAT;
pub use search::NO_RESULTS;

pub const DEFAULT_WEATHER_API: &str = "http://api.openweathermap.org";
pub const DEFAULT_BOOKS_API: &str = "https://www.googleapis.com";
pub const DEFAULT_SEARCH_API: &str = "https://api.duckduckgo.com";

/// Error type for tool execution.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unexpected response: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Upstream error: {0}")]
    Upstream(String),
}

/// Base URLs of the upstream APIs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub weather: String,
    pub books: String,
    pub search: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            weather: DEFAULT_WEATHER_API.to_string(),
            books: DEFAULT_BOOKS_API.to_string(),
            search: DEFAULT_SEARCH_API.to_string(),
        }
    }
}

/// Shared state of the tools: one HTTP client and the upstream settings.
#[derive(Debug, Clone)]
pub struct Toolbox {
    http: reqwest::Client,
    endpoints: Endpoints,
    weather_api_key: String,
}

impl Toolbox {
    /// Create a toolbox. A missing weather key is sent as an empty key and
    /// surfaces as an unavailable forecast.
    pub fn new(
        endpoints: Endpoints,
        weather_api_key: Option<String>,
        transport_options: &TransportOptions,
    ) -> Result<Self, ToolError> {
        Ok(Self {
            http: build_http_client(transport_options)?,
            endpoints,
            weather_api_key: weather_api_key.unwrap_or_default(),
        })
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }
}

fn join_url(base: &str, path: &str) -> String {
    format!("{}{}", base.trim_end_matches('/'), path)
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    /// Serve `router` on an ephemeral local port and return its base URL.
    pub async fn serve(router: axum::Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }

    pub fn toolbox(endpoints: Endpoints) -> Toolbox {
        Toolbox::new(endpoints, Some("test-key".to_string()), &TransportOptions::default()).unwrap()
    }

    pub fn endpoints_at(base: &str) -> Endpoints {
        Endpoints {
            weather: base.to_string(),
            books: base.to_string(),
            search: base.to_string(),
        }
    }
}

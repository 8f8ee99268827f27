use serde::Deserialize;
use tracing::{debug, info};

use super::{join_url, ToolError, Toolbox};
use crate::http::ResponseExt;

pub const NO_RESULTS: &str = "No results found.";

/// The parts of a DuckDuckGo Instant Answer this tool reads.
#[derive(Debug, Default, Deserialize)]
struct InstantAnswer {
    #[serde(rename = "AbstractText", default)]
    abstract_text: String,
    #[serde(rename = "AbstractURL", default)]
    abstract_url: String,
}

impl Toolbox {
    /// Instant answer for `query`.
    ///
    /// `max_results` is accepted for compatibility with callers that expect a
    /// result list; the Instant Answer API only yields a single abstract.
    pub async fn search(&self, query: &str, max_results: usize) -> Result<String, ToolError> {
        debug!("Searching {:?} (max_results={}, unused)", query, max_results);

        let url = join_url(&self.endpoints.search, "/");
        let response = self
            .http
            .get(&url)
            .query(&[
                ("q", query),
                ("format", "json"),
                ("no_html", "1"),
                ("skip_disambig", "1"),
            ])
            .send()
            .await?
            .error_for_status()?;

        let answer: InstantAnswer = response.json_logged::<_, ToolError>().await?;
        if answer.abstract_text.is_empty() {
            info!("No instant answer for {:?}", query);
            return Ok(NO_RESULTS.to_string());
        }

        Ok(format!(
            "**Instant Answer:** {}\n\n**citation:** {}\n",
            answer.abstract_text, answer.abstract_url
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing;
    use super::*;
    use axum::extract::Query;
    use axum::http::StatusCode;
    use axum::routing::get;
    use axum::{Json, Router};
    use serde_json::json;
    use std::collections::HashMap;

    async fn answer_handler(
        Query(params): Query<HashMap<String, String>>,
    ) -> (StatusCode, Json<serde_json::Value>) {
        assert_eq!(params.get("format").map(String::as_str), Some("json"));

        match params.get("q").map(String::as_str) {
            Some("rust language") => (
                StatusCode::OK,
                Json(json!({
                    "AbstractText": "Rust is a general-purpose programming language.",
                    "AbstractURL": "https://en.wikipedia.org/wiki/Rust_(programming_language)",
                    "RelatedTopics": []
                })),
            ),
            Some("outage") => (StatusCode::SERVICE_UNAVAILABLE, Json(json!({}))),
            _ => (
                StatusCode::OK,
                Json(json!({"AbstractText": "", "AbstractURL": "", "RelatedTopics": []})),
            ),
        }
    }

    async fn toolbox() -> Toolbox {
        let router = Router::new().route("/", get(answer_handler));
        let base = testing::serve(router).await;
        testing::toolbox(testing::endpoints_at(&base))
    }

    #[tokio::test]
    async fn test_search_instant_answer() {
        let result = toolbox().await.search("rust language", 5).await.unwrap();
        assert_eq!(
            result,
            "**Instant Answer:** Rust is a general-purpose programming language.\n\n\
             **citation:** https://en.wikipedia.org/wiki/Rust_(programming_language)\n"
        );
    }

    #[tokio::test]
    async fn test_search_without_abstract() {
        let result = toolbox().await.search("asdfghjkl", 3).await.unwrap();
        assert_eq!(result, NO_RESULTS);
    }

    #[tokio::test]
    async fn test_search_error_status_propagates() {
        let err = toolbox().await.search("outage", 5).await.unwrap_err();
        assert!(matches!(err, ToolError::Http(_)));
    }
}

use serde::Deserialize;
use serde_json::Number;
use tracing::{info, warn};

use super::{join_url, ToolError, Toolbox};
use crate::http::ResponseExt;

#[derive(Debug, Deserialize)]
struct WeatherResponse {
    weather: Vec<WeatherCondition>,
    main: WeatherMain,
}

#[derive(Debug, Deserialize)]
struct WeatherCondition {
    description: String,
}

#[derive(Debug, Deserialize)]
struct WeatherMain {
    // Kept as a JSON number so 18 prints as "18" and 18.5 as "18.5".
    temp: Number,
}

impl Toolbox {
    /// Current conditions for `location` in metric units.
    pub async fn weather(&self, location: &str) -> Result<String, ToolError> {
        let url = join_url(&self.endpoints.weather, "/data/2.5/weather");
        let response = self
            .http
            .get(&url)
            .query(&[
                ("q", location),
                ("appid", self.weather_api_key.as_str()),
                ("units", "metric"),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            warn!("Weather lookup for {} failed with {}", location, status);
            return Ok(format!("The current weather of {location} is unavailable."));
        }

        let data: WeatherResponse = response.json_logged::<_, ToolError>().await?;
        let condition = data
            .weather
            .first()
            .ok_or_else(|| ToolError::Upstream("weather response has no conditions".to_string()))?;

        info!("Weather for {}: {}", location, condition.description);
        Ok(format!(
            "The current weather in {} is {} with a temperature of {}°C.",
            location, condition.description, data.main.temp
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

    async fn weather_handler(
        Query(params): Query<HashMap<String, String>>,
    ) -> (StatusCode, Json<serde_json::Value>) {
        assert_eq!(params.get("units").map(String::as_str), Some("metric"));
        assert_eq!(params.get("appid").map(String::as_str), Some("test-key"));

        match params.get("q").map(String::as_str) {
            Some("Paris") => (
                StatusCode::OK,
                Json(json!({
                    "weather": [{"main": "Clear", "description": "clear sky"}],
                    "main": {"temp": 18, "humidity": 40}
                })),
            ),
            Some("Oslo") => (
                StatusCode::OK,
                Json(json!({
                    "weather": [{"description": "light snow"}],
                    "main": {"temp": -2.5}
                })),
            ),
            Some("Nowhere") => (StatusCode::OK, Json(json!({"weather": [], "main": {"temp": 1}}))),
            _ => (
                StatusCode::NOT_FOUND,
                Json(json!({"cod": "404", "message": "city not found"})),
            ),
        }
    }

    async fn toolbox() -> Toolbox {
        let router = Router::new().route("/data/2.5/weather", get(weather_handler));
        let base = testing::serve(router).await;
        testing::toolbox(testing::endpoints_at(&base))
    }

    #[tokio::test]
    async fn test_weather_success() {
        let result = toolbox().await.weather("Paris").await.unwrap();
        assert_eq!(
            result,
            "The current weather in Paris is clear sky with a temperature of 18°C."
        );
    }

    #[tokio::test]
    async fn test_weather_fractional_temperature() {
        let result = toolbox().await.weather("Oslo").await.unwrap();
        assert!(result.contains("Oslo"));
        assert!(result.contains("-2.5°C"));
    }

    #[tokio::test]
    async fn test_weather_unavailable_on_error_status() {
        let result = toolbox().await.weather("Atlantis").await.unwrap();
        assert_eq!(result, "The current weather of Atlantis is unavailable.");
    }

    #[tokio::test]
    async fn test_weather_without_conditions_is_an_error() {
        let err = toolbox().await.weather("Nowhere").await.unwrap_err();
        assert!(matches!(err, ToolError::Upstream(_)));
    }
}

use serde::Deserialize;
use tracing::{info, warn};

use super::{join_url, ToolError, Toolbox};
use crate::http::ResponseExt;

pub const NO_BOOKS_FOUND: &str = "No books found.";

#[derive(Debug, Deserialize)]
struct VolumesResponse {
    #[serde(default)]
    items: Vec<Volume>,
}

#[derive(Debug, Deserialize)]
struct Volume {
    #[serde(rename = "volumeInfo", default)]
    volume_info: VolumeInfo,
}

#[derive(Debug, Default, Deserialize)]
struct VolumeInfo {
    title: Option<String>,
    #[serde(default)]
    authors: Vec<String>,
    publisher: Option<String>,
}

impl VolumeInfo {
    fn describe(&self, index: usize) -> String {
        let authors = if self.authors.is_empty() {
            "Unknown author".to_string()
        } else {
            self.authors.join(", ")
        };
        format!(
            "Book {}: Title: {} Authors: {} Publisher: {}",
            index,
            self.title.as_deref().unwrap_or("N/A"),
            authors,
            self.publisher.as_deref().unwrap_or("N/A"),
        )
    }
}

impl Toolbox {
    /// Look up the best match for `book_name`.
    pub async fn book(&self, book_name: &str) -> Result<String, ToolError> {
        let url = join_url(&self.endpoints.books, "/books/v1/volumes");
        let response = self
            .http
            .get(&url)
            .query(&[("q", book_name), ("maxResults", "1")])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            warn!("Book search for {:?} failed with {}", book_name, status);
            return Ok(format!("Error: {}", status.as_u16()));
        }

        let data: VolumesResponse = response.json_logged::<_, ToolError>().await?;
        match data.items.first() {
            Some(volume) => {
                info!("Book search for {:?} matched {:?}", book_name, volume.volume_info.title);
                Ok(volume.volume_info.describe(1))
            }
            None => {
                info!("Book search for {:?} found nothing", book_name);
                Ok(NO_BOOKS_FOUND.to_string())
            }
        }
    }
}

//! Remote server search.

use std::{
    collections::BTreeMap,
    time::{Duration, SystemTime, UNIX_EPOCH},
};

use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::{IndexError, collection::DivisionFilter};

/// Response of the remote search endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ServerResponse {
    /// Result objects, each mapping fragment ids to snippet HTML.
    #[serde(default)]
    pub results: Vec<BTreeMap<String, String>>,
    /// Surface words the server matched, when it stems server-side.
    #[serde(default)]
    pub stem_words: Option<Vec<String>>,
}

impl ServerResponse {
    /// Returns every `(fragment id, html)` pair in response order.
    pub fn snippets(self) -> impl Iterator<Item = (String, String)> {
        self.results.into_iter().flatten()
    }
}

/// Client for a remote search endpoint that bypasses the local index.
#[derive(Debug, Clone)]
pub struct ServerSearch {
    /// Shared connection pool.
    client: Client,
    /// Endpoint URL.
    url: String,
}

impl ServerSearch {
    /// Creates a client for `url` with a per-request timeout.
    pub fn new(url: &str, timeout: Duration) -> Result<Self, IndexError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| IndexError::fetch(url, &e))?;
        Ok(Self {
            client,
            url: url.to_string(),
        })
    }

    /// Returns the endpoint URL.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Runs `query` against the server.
    pub async fn search(
        &self,
        collection_id: &str,
        query: &str,
        divisions: &DivisionFilter,
    ) -> Result<ServerResponse, IndexError> {
        let params = request_params(collection_id, query, divisions, cache_buster());
        debug!(url = %self.url, collection = collection_id, "querying search server");

        let response = self
            .client
            .get(&self.url)
            .query(&params)
            .send()
            .await
            .map_err(|e| IndexError::fetch(&self.url, &e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(IndexError::Fetch {
                path: self.url.clone(),
                message: format!("HTTP {status}"),
            });
        }

        response
            .json()
            .await
            .map_err(|e| IndexError::fetch(&self.url, &e))
    }
}

/// Builds the query string parameters for a server search.
fn request_params(
    collection_id: &str,
    query: &str,
    divisions: &DivisionFilter,
    date: u128,
) -> [(&'static str, String); 4] {
    [
        ("textid", collection_id.to_string()),
        ("search", query.to_lowercase()),
        ("divisions", divisions.codes().join(",")),
        ("date", date.to_string()),
    ]
}

/// Milliseconds since the epoch, used to defeat HTTP caches.
fn cache_buster() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn params_lowercase_query_and_join_divisions() {
        let params = request_params("kjv", "The Word", &DivisionFilter::new(["jn", "rv"]), 42);
        assert_eq!(
            params,
            [
                ("textid", "kjv".to_string()),
                ("search", "the word".to_string()),
                ("divisions", "JN,RV".to_string()),
                ("date", "42".to_string()),
            ]
        );
    }

    #[test]
    fn parses_response_with_and_without_stems() {
        let response: ServerResponse = serde_json::from_str(
            r#"{"results": [{"JN1_1": "<b>In</b>"}, {"JN2_3": "the"}], "stem_words": ["word"]}"#,
        )
        .unwrap();
        assert_eq!(response.stem_words.as_deref(), Some(&["word".to_string()][..]));
        let snippets: Vec<(String, String)> = response.snippets().collect();
        assert_eq!(snippets[0].0, "JN1_1");
        assert_eq!(snippets[1].1, "the");

        let bare: ServerResponse = serde_json::from_str(r#"{"results": []}"#).unwrap();
        assert_eq!(bare, ServerResponse::default());
    }
}

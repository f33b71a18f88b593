use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::Deserialize;

use crate::models::{Level, RemoteQuestion};

use super::{StepOutcome, TriviaSource};

/// Response body of the trivia API. `response_code` 0 means success.
#[derive(Debug, Deserialize)]
struct ApiResponse {
    response_code: i64,
    #[serde(default)]
    results: Vec<RemoteQuestion>,
}

impl ApiResponse {
    fn into_outcome(self) -> StepOutcome {
        if self.response_code != 0 {
            tracing::warn!("trivia API returned response_code {}", self.response_code);
            return StepOutcome::Empty;
        }
        StepOutcome::from_results(self.results)
    }
}

/// HTTP client for an OpenTDB-compatible endpoint.
#[derive(Debug, Clone)]
pub struct OpenTdbClient {
    client: Client,
    endpoint: String,
}

impl OpenTdbClient {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            endpoint: endpoint.into(),
        })
    }
}

impl TriviaSource for OpenTdbClient {
    async fn fetch(&self, category: &str, level: Option<Level>, amount: u32) -> StepOutcome {
        let amount = amount.to_string();
        let mut query = vec![("amount", amount.as_str()), ("category", category)];
        if let Some(level) = level {
            query.push(("difficulty", level.as_str()));
        }
        query.push(("type", "multiple"));

        let resp = match self.client.get(&self.endpoint).query(&query).send().await {
            Ok(resp) => resp,
            Err(e) => return StepOutcome::TransportError(e.to_string()),
        };

        match resp.status() {
            StatusCode::TOO_MANY_REQUESTS => StepOutcome::RateLimited,
            status if !status.is_success() => StepOutcome::TransportError(format!("trivia API returned {}", status)),
            _ => match resp.json::<ApiResponse>().await {
                Ok(body) => body.into_outcome(),
                Err(e) => StepOutcome::TransportError(e.to_string()),
            },
        }
    }
}

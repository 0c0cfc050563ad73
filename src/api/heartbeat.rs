use super::{ActivityReporter, HeartbeatResult, ReportError};
use async_trait::async_trait;
use reqwest::header::{HeaderValue, CONTENT_TYPE};
use reqwest::Client;
use serde::{Deserialize, Serialize};

const LOG_ACTIVITY_URL: &str = "log_activity";

#[derive(Serialize)]
struct LogActivityRequest<'a> {
    challenge_id: &'a str,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

/// Posts work-session ticks to `{api_url}/log_activity`.
pub struct HttpReporter {
    client: Client,
    url: String,
}

impl HttpReporter {
    pub fn new(api_url: &str) -> Self {
        Self {
            client: Client::new(),
            url: format!("{}/{}", api_url.trim_end_matches('/'), LOG_ACTIVITY_URL),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl ActivityReporter for HttpReporter {
    async fn log_activity(&self, challenge_id: &str) -> Result<HeartbeatResult, ReportError> {
        let res = self
            .client
            .post(&self.url)
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .json(&LogActivityRequest { challenge_id })
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            // The server puts a reason in `error`; fall back to the status text.
            let detail = res
                .json::<ErrorBody>()
                .await
                .ok()
                .and_then(|body| body.error)
                .unwrap_or_else(|| status.canonical_reason().unwrap_or("request failed").to_string());
            return Err(ReportError::Status { status, detail });
        }

        Ok(res.json::<HeartbeatResult>().await?)
    }
}

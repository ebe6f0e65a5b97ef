//! Management API client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::debug;
use vmconsole_common::{ConsoleError, ControlVerb};

use super::ControlDispatcher;

/// Body of every management API answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionResponse {
    pub status: String,
    #[serde(default)]
    pub message: String,
}

pub struct HttpControlClient {
    http: reqwest::Client,
    api_url: String,
    token: String,
}

impl HttpControlClient {
    pub fn new(api_url: impl Into<String>, token: impl Into<String>) -> Result<Self, ConsoleError> {
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| ConsoleError::ControlFailed(format!("http client: {e}")))?;
        Ok(Self {
            http,
            api_url: api_url.into(),
            token: token.into(),
        })
    }

    pub fn action_url(&self, target: &str, verb: ControlVerb) -> String {
        format!(
            "{}/api/vm/{}/{}",
            self.api_url.trim_end_matches('/'),
            urlencoding::encode(target),
            verb.as_action()
        )
    }
}

#[async_trait]
impl ControlDispatcher for HttpControlClient {
    async fn dispatch(&self, target: &str, verb: ControlVerb) -> Result<String, ConsoleError> {
        let url = self.action_url(target, verb);
        debug!(target = %target, verb = %verb, "control action request");

        let mut request = self.http.post(&url);
        if !self.token.is_empty() {
            request = request.header("Authorization", format!("Bearer {}", self.token));
        }
        let response = request
            .send()
            .await
            .map_err(|e| ConsoleError::ControlFailed(e.to_string()))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            ConsoleError::ControlFailed(format!(
                "HTTP {}: unreadable response body: {e}",
                status.as_u16()
            ))
        })?;
        interpret_response(status, &body)
    }
}

/// Map an HTTP answer onto the action result.
pub(crate) fn interpret_response(status: StatusCode, body: &str) -> Result<String, ConsoleError> {
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Err(ConsoleError::AuthRejected(format!("management API answered HTTP {}", status.as_u16())));
    }

    match serde_json::from_str::<ActionResponse>(body) {
        Ok(parsed) if parsed.status == "success" && status.is_success() => Ok(parsed.message),
        Ok(parsed) if !parsed.message.is_empty() => Err(ConsoleError::ControlFailed(parsed.message)),
        _ => {
            let snippet: String = body.chars().take(200).collect();
            Err(ConsoleError::ControlFailed(format!("HTTP {}: {snippet}", status.as_u16())))
        }
    }
}

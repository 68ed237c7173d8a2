use async_trait::async_trait;

use super::{ReplyError, ReplyProvider};

/// Fetches the reply from an HTTP resource, mirroring the original static
/// fetch the stub replaces. Any non-success status is a provider error.
pub struct HttpReplyProvider {
    client: reqwest::Client,
    url: String,
}

impl HttpReplyProvider {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
        }
    }
}

#[async_trait]
impl ReplyProvider for HttpReplyProvider {
    async fn fetch_reply(&self) -> Result<String, ReplyError> {
        tracing::debug!(url = %self.url, "fetching reply over http");
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| ReplyError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ReplyError::Status(status.as_u16()));
        }

        response
            .text()
            .await
            .map_err(|e| ReplyError::Transport(e.to_string()))
    }

    fn describe(&self) -> String {
        format!("http:{}", self.url)
    }
}

use async_trait::async_trait;
use std::path::PathBuf;

use super::{ReplyError, ReplyProvider};

/// Serves the contents of a local markdown file as the reply. This is the
/// default transport and the closest analogue of a real backend we ship.
pub struct StaticReplyProvider {
    path: PathBuf,
}

impl StaticReplyProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl ReplyProvider for StaticReplyProvider {
    async fn fetch_reply(&self) -> Result<String, ReplyError> {
        tracing::debug!(path = %self.path.display(), "reading reply file");
        tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| ReplyError::Transport(format!("{}: {e}", self.path.display())))
    }

    fn describe(&self) -> String {
        format!("file:{}", self.path.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn reads_the_reply_file_verbatim() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "**bold** reply\n").unwrap();
        let provider = StaticReplyProvider::new(file.path());
        let reply = provider.fetch_reply().await.unwrap();
        assert_eq!(reply, "**bold** reply\n");
    }

    #[tokio::test]
    async fn missing_file_is_a_transport_error() {
        let provider = StaticReplyProvider::new("definitely/not/here.md");
        let err = provider.fetch_reply().await.unwrap_err();
        assert!(matches!(err, ReplyError::Transport(_)));
    }

    #[test]
    fn describe_names_the_path() {
        let provider = StaticReplyProvider::new("assets/response.md");
        assert_eq!(provider.describe(), "file:assets/response.md");
    }
}

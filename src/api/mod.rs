//! The reply transport boundary.
//!
//! The session depends only on [`ReplyProvider`]: an asynchronous call that
//! yields reply text or fails. The call deliberately takes no request
//! parameters — the backend is a stub and the user's text never reaches the
//! transport. Swapping a transport (local file, HTTP resource, eventually a
//! real inference API) never touches the session core.

use async_trait::async_trait;
use std::fmt;

pub mod http;
pub mod static_file;

pub use http::HttpReplyProvider;
pub use static_file::StaticReplyProvider;

/// The single failure taxonomy of the crate. Transport failures and
/// non-success statuses both land here; the session converts every variant
/// into the fallback assistant message.
#[derive(Debug, Clone)]
pub enum ReplyError {
    /// I/O or connection-level failure, with a human-readable cause.
    Transport(String),
    /// The transport answered, but with a non-success status.
    Status(u16),
    /// The fetch exceeded the configured time budget.
    Timeout,
}

impl fmt::Display for ReplyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReplyError::Transport(cause) => write!(f, "reply transport failed: {cause}"),
            ReplyError::Status(code) => write!(f, "reply fetch returned status {code}"),
            ReplyError::Timeout => write!(f, "reply fetch timed out"),
        }
    }
}

impl std::error::Error for ReplyError {}

/// An argument-independent source of canned reply text.
#[async_trait]
pub trait ReplyProvider: Send + Sync {
    async fn fetch_reply(&self) -> Result<String, ReplyError>;

    /// Short human-readable description of the transport, for the title bar
    /// and diagnostics.
    fn describe(&self) -> String;
}

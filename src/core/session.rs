//! The conversation session: an append-only message log plus the
//! send protocol that drives it.
//!
//! State changes are published to subscribers over channels; the UI loop and
//! the scroll tracker react to events instead of watching ambient state.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, Mutex};

use crate::api::{ReplyError, ReplyProvider};
use crate::core::constants::FALLBACK_REPLY_TEXT;
use crate::core::message::Message;

/// Broadcast to subscribers after every state mutation.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// A message was appended to the log (carries a copy of it).
    LogAppended(Message),
    /// The outstanding-send flag flipped.
    PendingChanged(bool),
}

/// Ordered, append-only conversation state. Never persisted; it lives and
/// dies with the session.
#[derive(Default)]
pub struct ConversationSession {
    log: Vec<Message>,
    pending: bool,
    subscribers: Vec<mpsc::UnboundedSender<SessionEvent>>,
}

impl ConversationSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[Message] {
        &self.log
    }

    /// Owned copy of the log, for rendering outside the lock.
    pub fn snapshot(&self) -> Vec<Message> {
        self.log.clone()
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Register an observer. Dropped receivers are pruned on the next notify.
    pub fn subscribe(&mut self) -> mpsc::UnboundedReceiver<SessionEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers.push(tx);
        rx
    }

    fn append(&mut self, message: Message) {
        self.log.push(message.clone());
        self.notify(SessionEvent::LogAppended(message));
    }

    fn set_pending(&mut self, pending: bool) {
        if self.pending != pending {
            self.pending = pending;
            self.notify(SessionEvent::PendingChanged(pending));
        }
    }

    fn notify(&mut self, event: SessionEvent) {
        self.subscribers
            .retain(|tx| tx.send(event.clone()).is_ok());
    }
}

/// Cloneable handle that owns the session behind a lock together with the
/// reply transport. `send` runs the whole turn protocol; the lock is never
/// held across the fetch, so readers stay responsive while a reply is
/// outstanding.
#[derive(Clone)]
pub struct SessionHandle {
    session: Arc<Mutex<ConversationSession>>,
    provider: Arc<dyn ReplyProvider>,
    reply_timeout: Duration,
}

impl SessionHandle {
    pub fn new(provider: Arc<dyn ReplyProvider>, reply_timeout: Duration) -> Self {
        Self {
            session: Arc::new(Mutex::new(ConversationSession::new())),
            provider,
            reply_timeout,
        }
    }

    pub fn session(&self) -> &Arc<Mutex<ConversationSession>> {
        &self.session
    }

    pub fn provider_description(&self) -> String {
        self.provider.describe()
    }

    /// Run one send cycle. Returns `true` when the draft was accepted.
    ///
    /// Protocol: a blank draft is silently ignored; a send while another is
    /// outstanding is rejected; otherwise the user turn is appended
    /// immediately (optimistic, never rolled back), the reply is fetched
    /// under a timeout, and exactly one assistant turn follows — the reply
    /// text on success, the fixed fallback text on any failure. Fetch
    /// failures never escape this method.
    pub async fn send(&self, draft: &str) -> bool {
        if draft.trim().is_empty() {
            return false;
        }

        {
            let mut session = self.session.lock().await;
            if session.is_pending() {
                tracing::debug!("rejected send while a reply is outstanding");
                return false;
            }
            session.append(Message::user(draft));
            session.set_pending(true);
        }

        let fetched = tokio::time::timeout(self.reply_timeout, self.provider.fetch_reply())
            .await
            .unwrap_or(Err(ReplyError::Timeout));

        let reply = match fetched {
            Ok(text) => text,
            Err(err) => {
                tracing::warn!(provider = %self.provider.describe(), %err, "reply fetch failed");
                FALLBACK_REPLY_TEXT.to_string()
            }
        };

        let mut session = self.session.lock().await;
        session.append(Message::assistant(reply));
        session.set_pending(false);
        true
    }
}

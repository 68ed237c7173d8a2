use std::fs::OpenOptions;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use crate::core::message::Message;

/// Route tracing diagnostics to a file. The terminal belongs to the TUI, so
/// without a file the diagnostics are simply dropped.
pub fn init_tracing(debug_log: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    let Some(path) = debug_log else {
        return Ok(());
    };
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(Arc::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

/// Optional append-only plain-text transcript of the conversation. User
/// turns carry a display-name prefix; assistant turns are written verbatim.
pub struct TranscriptLog {
    path: Option<PathBuf>,
}

impl TranscriptLog {
    pub fn new(path: Option<String>) -> Result<Self, Box<dyn std::error::Error>> {
        let path = path.map(PathBuf::from);
        if let Some(p) = &path {
            // Fail at startup, not mid-conversation.
            let mut file = OpenOptions::new().create(true).append(true).open(p)?;
            file.flush()?;
        }
        Ok(Self { path })
    }

    pub fn is_active(&self) -> bool {
        self.path.is_some()
    }

    pub fn record(&self, message: &Message) -> Result<(), Box<dyn std::error::Error>> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        let mut writer = BufWriter::new(file);
        if message.is_user() {
            for line in format!("You: {}", message.content).lines() {
                writeln!(writer, "{line}")?;
            }
        } else {
            for line in message.content.lines() {
                writeln!(writer, "{line}")?;
            }
        }
        // Blank line between entries, matching the on-screen spacing.
        writeln!(writer)?;
        writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inactive_transcript_writes_nothing() {
        let log = TranscriptLog::new(None).unwrap();
        assert!(!log.is_active());
        log.record(&Message::user("hello")).unwrap();
    }

    #[test]
    fn user_turns_are_prefixed_and_assistant_turns_are_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("transcript.txt");
        let log = TranscriptLog::new(Some(path.to_string_lossy().into_owned())).unwrap();
        assert!(log.is_active());

        log.record(&Message::user("hi\nthere")).unwrap();
        log.record(&Message::assistant("**hello**")).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "You: hi\nthere\n\n**hello**\n\n");
    }

    #[test]
    fn unwritable_transcript_path_fails_at_startup() {
        let result = TranscriptLog::new(Some("/definitely/not/writable/t.txt".into()));
        assert!(result.is_err());
    }
}

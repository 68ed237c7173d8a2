//! Main chat event loop.
//!
//! Drives the terminal: polls input, drains session events, and redraws.
//! Reply fetches run on spawned tasks so keystrokes keep flowing while a
//! reply is outstanding.

use std::error::Error;
use std::io;
use std::sync::Arc;
use std::time::Duration;

use ratatui::crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind,
        KeyModifiers, MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::mpsc;

use crate::api::ReplyProvider;
use crate::core::config::Config;
use crate::core::input::{InputAction, InputEditor};
use crate::core::session::{SessionEvent, SessionHandle};
use crate::ui::renderer::{self, FrameState, RenderSettings};
use crate::ui::theme::Theme;
use crate::utils::logging::TranscriptLog;
use crate::utils::scroll::ScrollState;

const POLL_INTERVAL: Duration = Duration::from_millis(50);
const WHEEL_LINES: u16 = 3;

/// Set up the terminal, run the session, restore the terminal.
pub async fn run_chat(
    config: Config,
    provider: Arc<dyn ReplyProvider>,
) -> Result<(), Box<dyn Error>> {
    let theme = Theme::from_name(config.theme.as_deref());
    let handle = SessionHandle::new(provider, config.reply_timeout());
    let session_events = handle.session().lock().await.subscribe();
    let transcript = TranscriptLog::new(config.transcript_file.clone())?;

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_event_loop(
        &mut terminal,
        &handle,
        session_events,
        &transcript,
        &theme,
        &config,
    )
    .await;

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

async fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    handle: &SessionHandle,
    mut session_events: mpsc::UnboundedReceiver<SessionEvent>,
    transcript: &TranscriptLog,
    theme: &Theme,
    config: &Config,
) -> Result<(), Box<dyn Error>> {
    let mut editor = InputEditor::new();
    let mut scroll = ScrollState::new();
    let mut pending = false;
    // Drafts whose send lost the race against an outstanding reply come back
    // here so committed text is never dropped on the floor.
    let (rejected_tx, mut rejected_rx) = mpsc::unbounded_channel::<String>();
    let provider_desc = handle.provider_description();
    let settings = RenderSettings {
        markdown: config.markdown_enabled(),
        syntax: config.syntax_enabled(),
    };

    loop {
        while let Ok(event) = session_events.try_recv() {
            match event {
                SessionEvent::LogAppended(message) => {
                    scroll.follow_latest();
                    if let Err(e) = transcript.record(&message) {
                        tracing::warn!(error = %e, "transcript write failed");
                    }
                }
                SessionEvent::PendingChanged(p) => pending = p,
            }
        }

        while let Ok(draft) = rejected_rx.try_recv() {
            editor.restore_draft(draft);
        }

        let messages = handle.session().lock().await.snapshot();
        terminal.draw(|f| {
            let mut state = FrameState {
                messages: &messages,
                editor: &editor,
                scroll: &mut scroll,
                theme,
                settings,
                pending,
                provider_desc: &provider_desc,
            };
            renderer::ui(f, &mut state);
        })?;

        if !event::poll(POLL_INTERVAL)? {
            continue;
        }

        match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => {
                if key.code == KeyCode::Char('c')
                    && key.modifiers.contains(KeyModifiers::CONTROL)
                {
                    return Ok(());
                }
                match editor.handle_key(key.code, key.modifiers) {
                    InputAction::Commit => {
                        if pending {
                            tracing::debug!("commit ignored while a reply is outstanding");
                        } else if !editor.draft().trim().is_empty() {
                            spawn_send(handle, editor.take_draft(), &rejected_tx);
                        }
                    }
                    InputAction::InsertNewline => {}
                    InputAction::Ignore => match key.code {
                        KeyCode::Up => scroll.scroll_up(1),
                        KeyCode::Down => scroll.scroll_down(1),
                        _ => apply_default_edit(&mut editor, key.code, key.modifiers),
                    },
                }
            }
            Event::Mouse(mouse) => match mouse.kind {
                MouseEventKind::ScrollUp => scroll.scroll_up(WHEEL_LINES),
                MouseEventKind::ScrollDown => scroll.scroll_down(WHEEL_LINES),
                _ => {}
            },
            _ => {}
        }
    }
}

/// Run the send protocol off the UI thread. The session applies its own
/// pending guard; if it rejects the draft, hand the text back for
/// restoration instead of losing it.
fn spawn_send(
    handle: &SessionHandle,
    draft: String,
    rejected: &mpsc::UnboundedSender<String>,
) {
    let handle = handle.clone();
    let rejected = rejected.clone();
    tokio::spawn(async move {
        if !handle.send(&draft).await {
            let _ = rejected.send(draft);
        }
    });
}

/// Default text editing for keys the Enter protocol does not claim.
/// Control chords are commands, never literal input.
fn apply_default_edit(editor: &mut InputEditor, code: KeyCode, modifiers: KeyModifiers) {
    match code {
        KeyCode::Char(c) if !modifiers.contains(KeyModifiers::CONTROL) => editor.insert_char(c),
        KeyCode::Backspace => editor.backspace(),
        _ => {}
    }
}

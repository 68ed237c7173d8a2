//! Transcript and frame rendering.
//!
//! Assistant messages go through the markdown block projection and come out
//! rich; user messages are displayed as plain text with a prefix. That
//! asymmetry is policy, not an accident.

use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::core::constants::IMAGE_MAX_WIDTH_PCT;
use crate::core::input::InputEditor;
use crate::core::message::Message;
use crate::ui::markdown::{self, ContentBlock, InlineText};
use crate::ui::theme::Theme;
use crate::utils::scroll::ScrollState;
use crate::utils::syntax;

const USER_PREFIX: &str = "You: ";
const USER_CONTINUATION: &str = "     ";
const INPUT_PLACEHOLDER: &str = "Type your message… (Shift+Enter for new line)";

/// Render toggles resolved from config.
#[derive(Debug, Clone, Copy)]
pub struct RenderSettings {
    pub markdown: bool,
    pub syntax: bool,
}

/// Everything one frame needs. The scroll state is mutable because drawing
/// settles the effective offset.
pub struct FrameState<'a> {
    pub messages: &'a [Message],
    pub editor: &'a InputEditor,
    pub scroll: &'a mut ScrollState,
    pub theme: &'a Theme,
    pub settings: RenderSettings,
    pub pending: bool,
    pub provider_desc: &'a str,
}

pub fn ui(f: &mut Frame, state: &mut FrameState) {
    let input_height = state.editor.visible_lines() + 2;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(1),
            Constraint::Length(input_height),
        ])
        .split(f.area());

    f.render_widget(
        Block::default().style(Style::default().bg(state.theme.background_color)),
        f.area(),
    );

    let title = Line::from(Span::styled(
        format!("Causerie — {}", state.provider_desc),
        state.theme.title_style,
    ));
    f.render_widget(Paragraph::new(title), chunks[0]);

    // Pre-wrapped so the offset math counts the rows that actually render;
    // ratatui's own wrapping would add rows the scroll state never sees.
    let lines = wrap_lines(
        &transcript_lines(
            state.messages,
            state.theme,
            state.settings,
            chunks[1].width,
        ),
        chunks[1].width,
    );
    let offset = state
        .scroll
        .effective_offset(lines.len() as u16, chunks[1].height);
    let transcript = Paragraph::new(lines).scroll((offset, 0));
    f.render_widget(transcript, chunks[1]);

    let input_title = if state.pending {
        Span::styled("Fetching reply…", state.theme.pending_indicator_style)
    } else {
        Span::styled(
            "Enter to send • Shift+Enter for newline • Ctrl+C to quit",
            state.theme.input_title_style,
        )
    };
    let input_block = Block::default()
        .borders(Borders::ALL)
        .border_style(state.theme.input_border_style)
        .title(input_title);

    let input = if state.editor.is_empty() {
        Paragraph::new(INPUT_PLACEHOLDER)
            .style(Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC))
            .block(input_block)
    } else {
        Paragraph::new(state.editor.draft())
            .style(state.theme.input_text_style)
            .block(input_block)
    };
    f.render_widget(input, chunks[2]);

    let last_line = state.editor.draft().rsplit('\n').next().unwrap_or("");
    let cursor_row = state.editor.visible_lines() - 1;
    f.set_cursor_position((
        chunks[2].x + 1 + last_line.width() as u16,
        chunks[2].y + 1 + cursor_row,
    ));
}

/// Build the display lines for the whole log, in order.
pub fn transcript_lines(
    messages: &[Message],
    theme: &Theme,
    settings: RenderSettings,
    width: u16,
) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    for message in messages {
        lines.extend(message_lines(message, theme, settings, width));
    }
    lines
}

/// Wrap display lines to the transcript width before they reach the widget,
/// so the row count the scroll state sees is the row count on screen. Wraps
/// at word boundaries; tokens wider than the viewport are broken.
pub fn wrap_lines(lines: &[Line<'static>], width: u16) -> Vec<Line<'static>> {
    let width = width as usize;
    if width == 0 {
        return lines.to_vec();
    }
    let mut out = Vec::with_capacity(lines.len());
    for line in lines {
        if line_display_width(line) <= width {
            out.push(line.clone());
        } else {
            wrap_line(line, width, &mut out);
        }
    }
    out
}

fn line_display_width(line: &Line) -> usize {
    line.spans.iter().map(|s| s.content.width()).sum()
}

fn wrap_line(line: &Line<'static>, width: usize, out: &mut Vec<Line<'static>>) {
    let mut cur: Vec<Span<'static>> = Vec::new();
    let mut cur_len = 0usize;
    let mut word: Vec<(String, Style)> = Vec::new();
    let mut word_len = 0usize;

    for span in &line.spans {
        for ch in span.content.chars() {
            if ch == ' ' {
                place_word(&mut word, &mut word_len, &mut cur, &mut cur_len, width, out);
                if cur_len < width {
                    append_run(&mut cur, " ", span.style);
                    cur_len += 1;
                } else {
                    out.push(Line::from(std::mem::take(&mut cur)));
                    cur_len = 0;
                }
            } else {
                let w = ch.width().unwrap_or(0);
                match word.last_mut() {
                    Some((text, style)) if *style == span.style => text.push(ch),
                    _ => word.push((ch.to_string(), span.style)),
                }
                word_len += w;
            }
        }
    }
    place_word(&mut word, &mut word_len, &mut cur, &mut cur_len, width, out);
    if !cur.is_empty() {
        out.push(Line::from(cur));
    }
}

fn place_word(
    word: &mut Vec<(String, Style)>,
    word_len: &mut usize,
    cur: &mut Vec<Span<'static>>,
    cur_len: &mut usize,
    width: usize,
    out: &mut Vec<Line<'static>>,
) {
    if *word_len == 0 {
        return;
    }
    if *cur_len > 0 && *cur_len + *word_len > width {
        out.push(Line::from(std::mem::take(cur)));
        *cur_len = 0;
    }
    for (text, style) in word.drain(..) {
        let mut rest = text.as_str();
        while !rest.is_empty() {
            let (head, tail) = split_at_width(rest, width - *cur_len);
            if head.is_empty() {
                if cur.is_empty() {
                    // A single cell wider than the whole row; emit it anyway
                    // rather than looping.
                    let mut chars = rest.chars();
                    if let Some(ch) = chars.next() {
                        append_run(cur, ch.encode_utf8(&mut [0u8; 4]), style);
                    }
                    rest = chars.as_str();
                }
                out.push(Line::from(std::mem::take(cur)));
                *cur_len = 0;
                continue;
            }
            append_run(cur, head, style);
            *cur_len += head.width();
            rest = tail;
        }
    }
    *word_len = 0;
}

fn split_at_width(text: &str, max_width: usize) -> (&str, &str) {
    let mut used = 0usize;
    for (idx, ch) in text.char_indices() {
        let w = ch.width().unwrap_or(0);
        if used + w > max_width {
            return text.split_at(idx);
        }
        used += w;
    }
    (text, "")
}

fn append_run(cur: &mut Vec<Span<'static>>, text: &str, style: Style) {
    if text.is_empty() {
        return;
    }
    if let Some(last) = cur.last_mut() {
        if last.style == style {
            last.content.to_mut().push_str(text);
            return;
        }
    }
    cur.push(Span::styled(text.to_string(), style));
}

/// Display lines for one message, including the trailing spacer line.
pub fn message_lines(
    message: &Message,
    theme: &Theme,
    settings: RenderSettings,
    width: u16,
) -> Vec<Line<'static>> {
    let mut lines = if message.is_user() {
        user_lines(&message.content, theme)
    } else if settings.markdown {
        assistant_lines(&message.content, theme, settings, width)
    } else {
        plain_lines(&message.content, theme.assistant_text_style)
    };
    lines.push(Line::from(""));
    lines
}

/// User turns never go through the markdown pipeline.
fn user_lines(content: &str, theme: &Theme) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    for (i, raw) in content.lines().enumerate() {
        let (prefix, prefix_style) = if i == 0 {
            (USER_PREFIX, theme.user_prefix_style)
        } else {
            (USER_CONTINUATION, Style::default())
        };
        lines.push(Line::from(vec![
            Span::styled(prefix.to_string(), prefix_style),
            Span::styled(raw.to_string(), theme.user_text_style),
        ]));
    }
    if lines.is_empty() {
        lines.push(Line::from(Span::styled(
            USER_PREFIX.to_string(),
            theme.user_prefix_style,
        )));
    }
    lines
}

fn plain_lines(content: &str, style: Style) -> Vec<Line<'static>> {
    content
        .lines()
        .map(|l| {
            if l.trim().is_empty() {
                Line::from("")
            } else {
                Line::from(Span::styled(l.to_string(), style))
            }
        })
        .collect()
}

fn assistant_lines(
    content: &str,
    theme: &Theme,
    settings: RenderSettings,
    width: u16,
) -> Vec<Line<'static>> {
    let blocks = markdown::render(content);
    let mut lines: Vec<Line<'static>> = Vec::new();
    let mut prev_was_inline_code = false;

    for block in &blocks {
        match block {
            ContentBlock::Text(run) => {
                if !lines.is_empty() && !prev_was_inline_code {
                    lines.push(Line::from(""));
                }
                lines.extend(text_lines(run, theme));
                prev_was_inline_code = false;
            }
            ContentBlock::InlineCode(code) => {
                lines.push(Line::from(Span::styled(
                    code.clone(),
                    theme.inline_code_style,
                )));
                prev_was_inline_code = true;
            }
            ContentBlock::FencedCode { language, body } => {
                if !lines.is_empty() {
                    lines.push(Line::from(""));
                }
                lines.extend(code_lines(language.as_deref(), body, theme, settings));
                prev_was_inline_code = false;
            }
            ContentBlock::Image { src, alt } => {
                if !lines.is_empty() {
                    lines.push(Line::from(""));
                }
                lines.push(image_line(src, alt, theme, width));
                prev_was_inline_code = false;
            }
        }
    }
    lines
}

fn text_lines(run: &[InlineText], theme: &Theme) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    let mut spans: Vec<Span<'static>> = Vec::new();
    for frag in run {
        let style = emphasized(theme.assistant_text_style, frag);
        for (i, piece) in frag.content.split('\n').enumerate() {
            if i > 0 {
                lines.push(Line::from(std::mem::take(&mut spans)));
            }
            if !piece.is_empty() {
                spans.push(Span::styled(piece.to_string(), style));
            }
        }
    }
    if !spans.is_empty() {
        lines.push(Line::from(spans));
    }
    lines
}

fn emphasized(base: Style, frag: &InlineText) -> Style {
    let mut style = base;
    if frag.style.bold {
        style = style.add_modifier(Modifier::BOLD);
    }
    if frag.style.italic {
        style = style.add_modifier(Modifier::ITALIC);
    }
    if frag.style.strikethrough {
        style = style.add_modifier(Modifier::CROSSED_OUT);
    }
    style
}

/// Fenced code. Resolvable language tags get syntect colors; everything else
/// is unstyled monospace.
fn code_lines(
    language: Option<&str>,
    body: &str,
    theme: &Theme,
    settings: RenderSettings,
) -> Vec<Line<'static>> {
    if settings.syntax {
        if let Some(lang) = language {
            if let Some(highlighted) = syntax::highlight_code_block(lang, body, theme) {
                return highlighted;
            }
        }
    }
    let style = match theme.code_block_bg_color() {
        Some(bg) => theme.code_block_style.bg(bg),
        None => theme.code_block_style,
    };
    let mut lines: Vec<Line<'static>> = body
        .lines()
        .map(|l| Line::from(Span::styled(l.to_string(), style)))
        .collect();
    if lines.is_empty() {
        lines.push(Line::from(""));
    }
    lines
}

/// Images collapse to a labelled placeholder bounded to a fixed share of the
/// transcript width, whatever the source claims.
fn image_line(src: &str, alt: &str, theme: &Theme, width: u16) -> Line<'static> {
    let max_width = (width as usize * IMAGE_MAX_WIDTH_PCT as usize) / 100;
    let text = truncate_to_width(&format!("[{alt}] ({src})"), max_width.max(8));
    Line::from(Span::styled(text, theme.image_style))
}

fn truncate_to_width(text: &str, max_width: usize) -> String {
    if text.width() <= max_width {
        return text.to_string();
    }
    let mut out = String::new();
    let mut used = 0usize;
    for ch in text.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w + 1 > max_width {
            break;
        }
        out.push(ch);
        used += w;
    }
    out.push('…');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::message::Message;

    fn settings() -> RenderSettings {
        RenderSettings {
            markdown: true,
            syntax: true,
        }
    }

    fn flat(line: &Line) -> String {
        let mut out = String::new();
        for span in &line.spans {
            out.push_str(&span.content);
        }
        out
    }

    #[test]
    fn user_messages_are_not_markdown_interpreted() {
        let theme = Theme::dark_default();
        let lines = message_lines(&Message::user("**bold**"), &theme, settings(), 80);
        assert_eq!(flat(&lines[0]), "You: **bold**");
    }

    #[test]
    fn user_continuation_lines_are_indented() {
        let theme = Theme::dark_default();
        let lines = message_lines(&Message::user("hi\nthere"), &theme, settings(), 80);
        assert_eq!(flat(&lines[0]), "You: hi");
        assert_eq!(flat(&lines[1]), "     there");
    }

    #[test]
    fn assistant_bold_renders_with_the_bold_modifier() {
        let theme = Theme::dark_default();
        let lines = message_lines(&Message::assistant("**bold**"), &theme, settings(), 80);
        let span = &lines[0].spans[0];
        assert_eq!(span.content, "bold");
        assert!(span.style.add_modifier.contains(Modifier::BOLD));
    }

    #[test]
    fn markdown_disabled_renders_assistant_text_literally() {
        let theme = Theme::dark_default();
        let off = RenderSettings {
            markdown: false,
            syntax: false,
        };
        let lines = message_lines(&Message::assistant("**bold**"), &theme, off, 80);
        assert_eq!(flat(&lines[0]), "**bold**");
    }

    #[test]
    fn unknown_code_language_renders_as_plain_monospace() {
        let theme = Theme::dark_default();
        let lines = message_lines(
            &Message::assistant("```notalanguage\nx = 1\n```"),
            &theme,
            settings(),
            80,
        );
        assert_eq!(flat(&lines[0]), "x = 1");
    }

    #[test]
    fn syntax_disabled_skips_highlighting() {
        let theme = Theme::dark_default();
        let off = RenderSettings {
            markdown: true,
            syntax: false,
        };
        let lines = message_lines(
            &Message::assistant("```python\nprint(1)\n```"),
            &theme,
            off,
            80,
        );
        assert_eq!(lines[0].spans.len(), 1);
        assert_eq!(flat(&lines[0]), "print(1)");
    }

    #[test]
    fn image_placeholder_is_bounded_by_the_width_policy() {
        let theme = Theme::dark_default();
        let long_src = format!("https://example.org/{}.png", "x".repeat(200));
        let md = format!("![diagram]({long_src})");
        let lines = message_lines(&Message::assistant(&md), &theme, settings(), 100);
        let text = flat(&lines[0]);
        assert!(text.starts_with("[diagram]"));
        assert!(text.width() <= 80);
        assert!(text.ends_with('…'));
    }

    #[test]
    fn messages_end_with_a_spacer_line() {
        let theme = Theme::dark_default();
        let lines = message_lines(&Message::assistant("hello"), &theme, settings(), 80);
        assert_eq!(flat(lines.last().unwrap()), "");
    }

    #[test]
    fn transcript_preserves_log_order() {
        let theme = Theme::dark_default();
        let log = vec![Message::user("hello"), Message::assistant("**bold**")];
        let lines = transcript_lines(&log, &theme, settings(), 80);
        assert_eq!(flat(&lines[0]), "You: hello");
        let rendered: Vec<String> = lines.iter().map(|l| flat(l)).collect();
        assert!(rendered.contains(&"bold".to_string()));
    }

    #[test]
    fn wrapped_rows_never_exceed_the_viewport_width() {
        let line = Line::from(Span::styled(
            "alpha beta gamma delta epsilon".to_string(),
            Style::default(),
        ));
        let wrapped = wrap_lines(&[line], 10);
        assert!(wrapped.len() > 1);
        for row in &wrapped {
            assert!(flat(row).width() <= 10, "overwide row: {:?}", flat(row));
        }
    }

    #[test]
    fn wrapping_breaks_tokens_wider_than_the_viewport() {
        let line = Line::from("abcdefghijklmnop");
        let wrapped = wrap_lines(&[line], 5);
        assert_eq!(flat(&wrapped[0]), "abcde");
        assert_eq!(flat(&wrapped[1]), "fghij");
        let glued: String = wrapped.iter().map(|l| flat(l)).collect();
        assert_eq!(glued, "abcdefghijklmnop");
    }

    #[test]
    fn wrapping_preserves_span_styles() {
        let bold = Style::default().add_modifier(Modifier::BOLD);
        let line = Line::from(vec![
            Span::raw("plain plain ".to_string()),
            Span::styled("bold bold".to_string(), bold),
        ]);
        let wrapped = wrap_lines(&[line], 12);
        let bold_text: String = wrapped
            .iter()
            .flat_map(|l| l.spans.iter())
            .filter(|s| s.style == bold)
            .map(|s| s.content.to_string())
            .collect();
        assert!(bold_text.contains("bold bold"));
    }

    #[test]
    fn follow_keeps_the_latest_turn_visible_when_rows_wrap() {
        use crate::utils::scroll::ScrollState;
        use ratatui::backend::TestBackend;
        use ratatui::Terminal;

        let theme = Theme::dark_default();
        // Many more wrapped rows than the transcript viewport can hold.
        let long = "lorem ipsum ".repeat(30);
        let messages = vec![Message::assistant(long), Message::user("LATEST-TURN")];
        let editor = InputEditor::new();
        let mut scroll = ScrollState::new();

        let mut terminal = Terminal::new(TestBackend::new(40, 10)).unwrap();
        terminal
            .draw(|f| {
                let mut state = FrameState {
                    messages: &messages,
                    editor: &editor,
                    scroll: &mut scroll,
                    theme: &theme,
                    settings: settings(),
                    pending: false,
                    provider_desc: "file:assets/response.md",
                };
                ui(f, &mut state);
            })
            .unwrap();

        let buffer = terminal.backend().buffer();
        let mut screen = String::new();
        for (i, cell) in buffer.content.iter().enumerate() {
            screen.push_str(cell.symbol());
            if (i + 1) % buffer.area.width as usize == 0 {
                screen.push('\n');
            }
        }
        assert!(
            screen.contains("LATEST-TURN"),
            "latest turn scrolled off screen:\n{screen}"
        );
    }

    #[test]
    fn paragraphs_are_separated_by_a_blank_line() {
        let theme = Theme::dark_default();
        let lines = message_lines(&Message::assistant("one\n\ntwo"), &theme, settings(), 80);
        assert_eq!(flat(&lines[0]), "one");
        assert_eq!(flat(&lines[1]), "");
        assert_eq!(flat(&lines[2]), "two");
    }
}

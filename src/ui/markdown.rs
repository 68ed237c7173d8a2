//! Projection of assistant message text into typed content blocks.
//!
//! This is a pure transformation: blocks are derived on every render pass
//! and never stored. Malformed markdown is not an error; pulldown-cmark
//! parses best-effort and whatever it yields is rendered.

use pulldown_cmark::{CodeBlockKind, Event, Options, Parser, Tag, TagEnd};

use crate::core::constants::DEFAULT_IMAGE_ALT;

/// Inline emphasis accumulated from nested markup.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct InlineStyle {
    pub bold: bool,
    pub italic: bool,
    pub strikethrough: bool,
}

/// A styled fragment of flowing text.
#[derive(Clone, Debug, PartialEq)]
pub struct InlineText {
    pub content: String,
    pub style: InlineStyle,
}

/// One displayable unit of an assistant message. Matched exhaustively by the
/// transcript renderer; adding a variant is a compile error everywhere it
/// matters.
#[derive(Clone, Debug, PartialEq)]
pub enum ContentBlock {
    /// Flowing text with inline emphasis.
    Text(Vec<InlineText>),
    /// An inline code span, displayed as unstyled monospace.
    InlineCode(String),
    /// A fenced (or indented) code block. `language` is the fence tag with
    /// any `language-` prefix removed; `None` means no highlighting.
    FencedCode {
        language: Option<String>,
        body: String,
    },
    /// An image reference, normalized: `alt` is never empty.
    Image { src: String, alt: String },
}

/// Parse markdown into content blocks. GFM-style extensions (tables,
/// strikethrough, task lists, footnotes) are enabled.
pub fn render(text: &str) -> Vec<ContentBlock> {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_TASKLISTS);
    options.insert(Options::ENABLE_FOOTNOTES);
    let parser = Parser::new_ext(text, options);

    let mut blocks: Vec<ContentBlock> = Vec::new();
    let mut run: Vec<InlineText> = Vec::new();
    let mut style = InlineStyle::default();
    // (language, body) while inside a code fence
    let mut code: Option<(Option<String>, String)> = None;
    // (src, alt) while inside an image tag
    let mut image: Option<(String, String)> = None;

    for event in parser {
        match event {
            Event::Start(tag) => match tag {
                Tag::CodeBlock(kind) => {
                    flush_text(&mut blocks, &mut run);
                    let language = match kind {
                        CodeBlockKind::Fenced(tag) => fence_language(&tag),
                        CodeBlockKind::Indented => None,
                    };
                    code = Some((language, String::new()));
                }
                Tag::Image { dest_url, .. } => {
                    flush_text(&mut blocks, &mut run);
                    image = Some((dest_url.to_string(), String::new()));
                }
                Tag::Emphasis => style.italic = true,
                Tag::Strong => style.bold = true,
                Tag::Strikethrough => style.strikethrough = true,
                Tag::Paragraph | Tag::Heading { .. } | Tag::Item => {
                    flush_text(&mut blocks, &mut run);
                }
                _ => {}
            },
            Event::End(tag) => match tag {
                TagEnd::CodeBlock => {
                    if let Some((language, mut body)) = code.take() {
                        // Fence parsing leaves one artifact newline at the end
                        // of the body; strip that one and nothing else.
                        if body.ends_with('\n') {
                            body.pop();
                        }
                        blocks.push(ContentBlock::FencedCode { language, body });
                    }
                }
                TagEnd::Image => {
                    if let Some((src, alt)) = image.take() {
                        let alt = if alt.trim().is_empty() {
                            DEFAULT_IMAGE_ALT.to_string()
                        } else {
                            alt
                        };
                        blocks.push(ContentBlock::Image { src, alt });
                    }
                }
                TagEnd::Emphasis => style.italic = false,
                TagEnd::Strong => style.bold = false,
                TagEnd::Strikethrough => style.strikethrough = false,
                TagEnd::Paragraph | TagEnd::Heading(_) | TagEnd::Item => {
                    flush_text(&mut blocks, &mut run);
                }
                _ => {}
            },
            Event::Text(t) => {
                if let Some((_, body)) = code.as_mut() {
                    body.push_str(&t);
                } else if let Some((_, alt)) = image.as_mut() {
                    alt.push_str(&t);
                } else {
                    push_fragment(&mut run, &t, style);
                }
            }
            Event::Code(t) => {
                if let Some((_, alt)) = image.as_mut() {
                    alt.push_str(&t);
                } else {
                    flush_text(&mut blocks, &mut run);
                    blocks.push(ContentBlock::InlineCode(t.to_string()));
                }
            }
            Event::SoftBreak | Event::HardBreak => {
                push_fragment(&mut run, "\n", style);
            }
            Event::TaskListMarker(done) => {
                push_fragment(&mut run, if done { "[x] " } else { "[ ] " }, style);
            }
            _ => {}
        }
    }
    flush_text(&mut blocks, &mut run);
    blocks
}

/// Resolve a fence info string to a language hint. Accepts both the bare
/// form (```python) and the HTML-class form (```language-python).
fn fence_language(tag: &str) -> Option<String> {
    let tag = tag.trim();
    let first = tag.split_whitespace().next()?;
    let name = first.strip_prefix("language-").unwrap_or(first);
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}

fn flush_text(blocks: &mut Vec<ContentBlock>, run: &mut Vec<InlineText>) {
    if !run.is_empty() {
        blocks.push(ContentBlock::Text(std::mem::take(run)));
    }
}

fn push_fragment(run: &mut Vec<InlineText>, text: &str, style: InlineStyle) {
    if text.is_empty() {
        return;
    }
    if let Some(last) = run.last_mut() {
        if last.style == style {
            last.content.push_str(text);
            return;
        }
    }
    run.push(InlineText {
        content: text.to_string(),
        style,
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_of(blocks: &[ContentBlock]) -> String {
        let mut out = String::new();
        for block in blocks {
            match block {
                ContentBlock::Text(run) => {
                    for frag in run {
                        out.push_str(&frag.content);
                    }
                }
                ContentBlock::InlineCode(code) => out.push_str(code),
                ContentBlock::FencedCode { body, .. } => out.push_str(body),
                ContentBlock::Image { alt, .. } => out.push_str(alt),
            }
        }
        out
    }

    #[test]
    fn fenced_python_round_trips_without_trailing_newline() {
        let blocks = render("```python\nprint(1)\n```");
        assert_eq!(
            blocks,
            vec![ContentBlock::FencedCode {
                language: Some("python".into()),
                body: "print(1)".into(),
            }]
        );
    }

    #[test]
    fn only_one_trailing_newline_is_stripped() {
        let blocks = render("```python\nprint(1)\n\n```");
        match &blocks[0] {
            ContentBlock::FencedCode { body, .. } => assert_eq!(body, "print(1)\n"),
            other => panic!("expected fenced code, got {other:?}"),
        }
    }

    #[test]
    fn language_class_prefix_is_accepted() {
        let blocks = render("```language-rust\nfn main() {}\n```");
        match &blocks[0] {
            ContentBlock::FencedCode { language, .. } => {
                assert_eq!(language.as_deref(), Some("rust"))
            }
            other => panic!("expected fenced code, got {other:?}"),
        }
    }

    #[test]
    fn untagged_fence_has_no_language() {
        let blocks = render("```\nplain\n```");
        match &blocks[0] {
            ContentBlock::FencedCode { language, body } => {
                assert!(language.is_none());
                assert_eq!(body, "plain");
            }
            other => panic!("expected fenced code, got {other:?}"),
        }
    }

    #[test]
    fn bold_text_yields_an_emphasized_fragment() {
        let blocks = render("**bold**");
        assert_eq!(
            blocks,
            vec![ContentBlock::Text(vec![InlineText {
                content: "bold".into(),
                style: InlineStyle {
                    bold: true,
                    ..Default::default()
                },
            }])]
        );
    }

    #[test]
    fn inline_code_splits_the_surrounding_text() {
        let blocks = render("call `foo()` twice");
        assert_eq!(blocks.len(), 3);
        assert_eq!(blocks[1], ContentBlock::InlineCode("foo()".into()));
        match &blocks[2] {
            ContentBlock::Text(run) => assert_eq!(run[0].content, " twice"),
            other => panic!("expected text, got {other:?}"),
        }
    }

    #[test]
    fn images_get_a_default_alt_label() {
        let blocks = render("![](https://example.org/cat.png)");
        assert_eq!(
            blocks,
            vec![ContentBlock::Image {
                src: "https://example.org/cat.png".into(),
                alt: "image".into(),
            }]
        );
    }

    #[test]
    fn image_alt_text_is_preserved_when_given() {
        let blocks = render("![a cat](cat.png)");
        assert_eq!(
            blocks,
            vec![ContentBlock::Image {
                src: "cat.png".into(),
                alt: "a cat".into(),
            }]
        );
    }

    #[test]
    fn nested_emphasis_resets_cleanly() {
        let blocks = render("*a **b** c*");
        match &blocks[0] {
            ContentBlock::Text(run) => {
                assert_eq!(run.len(), 3);
                assert!(run[0].style.italic && !run[0].style.bold);
                assert!(run[1].style.italic && run[1].style.bold);
                assert!(run[2].style.italic && !run[2].style.bold);
            }
            other => panic!("expected text, got {other:?}"),
        }
    }

    #[test]
    fn strikethrough_is_carried_on_fragments() {
        let blocks = render("~~gone~~");
        match &blocks[0] {
            ContentBlock::Text(run) => assert!(run[0].style.strikethrough),
            other => panic!("expected text, got {other:?}"),
        }
    }

    #[test]
    fn table_content_degrades_to_text() {
        let blocks = render("| a | b |\n| - | - |\n| 1 | 2 |");
        let flat = text_of(&blocks);
        assert!(flat.contains('a') && flat.contains('2'));
    }

    #[test]
    fn malformed_markdown_still_renders() {
        let blocks = render("**unterminated *and `odd\n``` dangling");
        assert!(!blocks.is_empty());
        assert!(!text_of(&blocks).is_empty());
    }
}

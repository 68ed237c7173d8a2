use ratatui::style::{Color, Modifier, Style};

/// Styling for the transcript and chrome. Rendering code takes styles from
/// here and nowhere else.
#[derive(Debug, Clone)]
pub struct Theme {
    // Overall background color to paint the full frame
    pub background_color: Color,
    // Chat message styles
    pub user_prefix_style: Style,
    pub user_text_style: Style,
    pub assistant_text_style: Style,
    pub inline_code_style: Style,
    pub code_block_style: Style,
    pub code_block_bg: Option<Color>,
    pub image_style: Style,

    // Chrome
    pub title_style: Style,
    pub pending_indicator_style: Style,
    pub input_border_style: Style,
    pub input_title_style: Style,
    pub input_text_style: Style,
}

impl Theme {
    pub fn dark_default() -> Self {
        Theme {
            background_color: Color::Black,
            user_prefix_style: Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            user_text_style: Style::default().fg(Color::Cyan),
            assistant_text_style: Style::default().fg(Color::White),
            inline_code_style: Style::default().fg(Color::LightYellow),
            code_block_style: Style::default().fg(Color::Gray),
            code_block_bg: Some(Color::Rgb(30, 30, 30)),
            image_style: Style::default()
                .fg(Color::LightBlue)
                .add_modifier(Modifier::ITALIC),

            title_style: Style::default().fg(Color::Gray).add_modifier(Modifier::BOLD),
            pending_indicator_style: Style::default().fg(Color::White),
            input_border_style: Style::default().fg(Color::Gray),
            input_title_style: Style::default().fg(Color::Gray),
            input_text_style: Style::default().fg(Color::White),
        }
    }

    pub fn light() -> Self {
        Theme {
            background_color: Color::White,
            user_prefix_style: Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::BOLD),
            user_text_style: Style::default().fg(Color::Blue),
            assistant_text_style: Style::default().fg(Color::Black),
            inline_code_style: Style::default().fg(Color::Magenta),
            code_block_style: Style::default().fg(Color::DarkGray),
            code_block_bg: Some(Color::Rgb(230, 230, 230)),
            image_style: Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::ITALIC),

            title_style: Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
            pending_indicator_style: Style::default().fg(Color::Black),
            input_border_style: Style::default().fg(Color::Black),
            input_title_style: Style::default().fg(Color::DarkGray),
            input_text_style: Style::default().fg(Color::Black),
        }
    }

    /// Unknown or absent names fall back to the dark theme.
    pub fn from_name(name: Option<&str>) -> Self {
        match name.map(|n| n.to_ascii_lowercase()).as_deref() {
            Some("light") => Self::light(),
            _ => Self::dark_default(),
        }
    }

    pub fn code_block_bg_color(&self) -> Option<Color> {
        self.code_block_bg
    }
}

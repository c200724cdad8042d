use ratatui::style::{Color, Modifier, Style};

/// Colors for the light and dark palettes
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Theme {
    pub text: Color,
    pub background: Color,
    pub accent: Color,
    pub correct: Color,
    pub incorrect: Color,
    pub warning: Color,
    pub muted: Color,
    pub marked: Color,
}

impl Theme {
    pub fn light() -> Self {
        Self {
            text: Color::Black,
            background: Color::Reset,
            accent: Color::Blue,
            correct: Color::Green,
            incorrect: Color::Red,
            warning: Color::Rgb(255, 165, 0),
            muted: Color::DarkGray,
            marked: Color::Magenta,
        }
    }

    pub fn dark() -> Self {
        Self {
            text: Color::Gray,
            background: Color::Rgb(24, 24, 27),
            accent: Color::Cyan,
            correct: Color::LightGreen,
            incorrect: Color::LightRed,
            warning: Color::Yellow,
            muted: Color::DarkGray,
            marked: Color::LightMagenta,
        }
    }

    pub fn for_mode(dark_mode: bool) -> Self {
        if dark_mode {
            Self::dark()
        } else {
            Self::light()
        }
    }

    pub fn base(&self) -> Style {
        Style::default().fg(self.text).bg(self.background)
    }

    pub fn bold(&self) -> Style {
        self.base().add_modifier(Modifier::BOLD)
    }

    pub fn title(&self) -> Style {
        self.bold().fg(self.accent)
    }

    pub fn dim(&self) -> Style {
        self.base().fg(self.muted)
    }

    pub fn legend(&self) -> Style {
        self.dim().add_modifier(Modifier::ITALIC)
    }

    pub fn good(&self) -> Style {
        self.bold().fg(self.correct)
    }

    pub fn bad(&self) -> Style {
        self.bold().fg(self.incorrect)
    }

    pub fn alert(&self) -> Style {
        self.bold().fg(self.warning)
    }
}

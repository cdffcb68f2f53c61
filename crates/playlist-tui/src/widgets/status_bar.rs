//! Status bar — bottom line with the input mode and keybindings.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use playlist_proto::view::DisplayMode;

use crate::theme::{C_MODE_INPUT, C_MODE_NORMAL, C_MUTED, C_SEPARATOR};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputMode {
    Normal,
    Enqueue,
}

impl InputMode {
    pub fn label(self) -> &'static str {
        match self {
            Self::Normal => "NORMAL",
            Self::Enqueue => "ENQUEUE",
        }
    }

    pub fn color(self) -> ratatui::style::Color {
        match self {
            Self::Normal => C_MODE_NORMAL,
            Self::Enqueue => C_MODE_INPUT,
        }
    }
}

/// Draw a horizontal separator line.
pub fn draw_separator(frame: &mut Frame, area: Rect) {
    let line = Line::from(Span::styled(
        "─".repeat(area.width as usize),
        Style::default().fg(C_SEPARATOR),
    ));
    frame.render_widget(Paragraph::new(line), area);
}

/// Draw the keybindings footer bar (one row).
pub fn draw_keys_bar(frame: &mut Frame, area: Rect, mode: InputMode, display: DisplayMode) {
    let keys = match mode {
        InputMode::Normal => match display {
            DisplayMode::Queue => {
                " ↑↓/jk select  Tab panes  y copy link  a enqueue  n next  r refresh  m flat list  ? keys  q quit"
            }
            DisplayMode::Flat => {
                " ↑↓/jk select  y copy link  a enqueue  n next  r refresh  m queue view  ? keys  q quit"
            }
        },
        InputMode::Enqueue => " paste or type a URL  Enter enqueue  Esc cancel",
    };

    let line = Line::from(vec![
        Span::styled(
            format!(" {} ", mode.label()),
            Style::default()
                .fg(mode.color())
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(keys, Style::default().fg(C_MUTED)),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

//! UrlInput — one-line prompt for the enqueue URL, backed by tui-input.

use ratatui::crossterm::event::{Event, KeyCode, KeyEvent};
use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use tui_input::{backend::crossterm::EventHandler, Input};

use crate::theme::{C_INPUT_BG, C_INPUT_FG, C_MUTED};

const PROMPT: &str = "+ ";

pub enum InputOutcome {
    Submitted(String),
    Cancelled,
    Editing,
}

pub struct UrlInput {
    input: Input,
    placeholder: String,
}

impl UrlInput {
    pub fn new(placeholder: impl Into<String>) -> Self {
        Self {
            input: Input::default(),
            placeholder: placeholder.into(),
        }
    }

    pub fn clear(&mut self) {
        self.input = Input::default();
    }

    #[cfg(test)]
    pub fn text(&self) -> &str {
        self.input.value()
    }

    /// Enter submits (and clears), Esc cancels, everything else edits.
    pub fn handle_key(&mut self, key: KeyEvent) -> InputOutcome {
        match key.code {
            KeyCode::Esc => {
                self.clear();
                InputOutcome::Cancelled
            }
            KeyCode::Enter => {
                let value = self.input.value().to_string();
                self.clear();
                InputOutcome::Submitted(value)
            }
            _ => {
                self.input.handle_event(&Event::Key(key));
                InputOutcome::Editing
            }
        }
    }

    pub fn draw(&self, frame: &mut Frame, area: Rect) {
        let prompt_w = PROMPT.chars().count();
        let scroll = self
            .input
            .visual_scroll((area.width as usize).saturating_sub(prompt_w + 1));
        let value = self.input.value();
        let display = if value.is_empty() {
            Span::styled(
                format!("{}{}", PROMPT, self.placeholder),
                Style::default().fg(C_MUTED),
            )
        } else {
            let visible: String = value.chars().skip(scroll).collect();
            Span::styled(format!("{}{}", PROMPT, visible), Style::default().fg(C_INPUT_FG))
        };

        frame.render_widget(
            Paragraph::new(Line::from(vec![display])).style(Style::default().bg(C_INPUT_BG)),
            area,
        );

        let cursor_x = area.x + (prompt_w + self.input.visual_cursor().saturating_sub(scroll)) as u16;
        frame.set_cursor_position((cursor_x.min(area.x + area.width.saturating_sub(1)), area.y));
    }
}

//! NowPlaying — the now-playing container plus a progress bar.

use std::time::Instant;

use ratatui::crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::{
    action::{Action, ComponentId},
    app_state::AppState,
    component::Component,
    theme::{style_muted, C_PLAYING},
    widgets::{
        fragment::{fit_spans, fragment_spans, now_playing_copy},
        pane_chrome::{pane_chrome, Badge},
        progress_bar::draw_progress,
    },
};

pub struct NowPlaying;

impl NowPlaying {
    pub fn new() -> Self {
        Self
    }

    /// Height the pane wants: borders, the entry line, and the progress bar.
    pub fn height(state: &AppState) -> u16 {
        if state.playback.and_then(|p| p.info.progress()).is_some() {
            4
        } else {
            3
        }
    }
}

impl Component for NowPlaying {
    fn id(&self) -> ComponentId {
        ComponentId::NowPlaying
    }

    fn handle_key(&mut self, key: KeyEvent, state: &AppState) -> Vec<Action> {
        match key.code {
            KeyCode::Char('y') => now_playing_copy(&state.queue_view.now_playing)
                .map(Action::CopyToClipboard)
                .into_iter()
                .collect(),
            _ => vec![],
        }
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, focused: bool, state: &AppState) {
        let badge = state
            .playback
            .filter(|p| !p.info.is_paused)
            .map(|_| Badge {
                text: "PLAYING".to_string(),
                color: C_PLAYING,
            });
        let block = pane_chrome("now playing", focused, badge);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        if inner.height == 0 || inner.width == 0 {
            return;
        }

        let fragments = &state.queue_view.now_playing;
        let line = if fragments.is_empty() {
            Line::from(Span::styled(" nothing playing", style_muted()))
        } else {
            let mut spans = vec![Span::raw(" ")];
            for (i, frag) in fragments.iter().enumerate() {
                if i > 0 {
                    spans.push(Span::raw("  "));
                }
                spans.extend(fragment_spans(frag, Style::default()));
            }
            Line::from(fit_spans(spans, inner.width as usize))
        };
        frame.render_widget(
            Paragraph::new(line),
            Rect {
                height: 1,
                ..inner
            },
        );

        if let Some(playback) = state.playback {
            if inner.height >= 2 && playback.info.duration_ms > 0.0 {
                let now = Instant::now();
                let bar_area = Rect {
                    x: inner.x + 1,
                    y: inner.y + 1,
                    width: inner.width.saturating_sub(2),
                    height: 1,
                };
                draw_progress(
                    frame,
                    bar_area,
                    playback.progress_at(now).unwrap_or(0.0),
                    playback.position_ms_at(now),
                    playback.info.duration_ms,
                    playback.info.is_paused,
                );
            }
        }
    }
}

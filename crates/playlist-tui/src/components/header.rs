//! Header — server, connection state, mode, and the time of the last good poll.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::{
    app_state::AppState,
    theme::{C_ACCENT, C_MUTED, C_PLAYING, C_SECONDARY},
    widgets::{fragment::truncate_to_width, status_bar::draw_separator},
};

pub fn draw(frame: &mut Frame, area: Rect, state: &AppState) {
    if area.height == 0 {
        return;
    }

    let dot = if state.connected {
        Span::styled("●", Style::default().fg(C_PLAYING))
    } else {
        Span::styled("○", Style::default().fg(C_ACCENT))
    };

    let updated = match (&state.last_update, &state.last_error) {
        (_, Some(err)) if !state.connected => format!("unreachable: {}", err),
        (Some(ts), _) => format!("updated {}", ts.format("%H:%M:%S")),
        (None, _) => "waiting for first poll…".to_string(),
    };

    let mut spans = vec![
        Span::styled(
            " npq ",
            Style::default().fg(C_ACCENT).add_modifier(Modifier::BOLD),
        ),
        dot,
        Span::raw(" "),
        Span::styled(state.server_url.clone(), Style::default().fg(C_SECONDARY)),
        Span::styled(format!("  · {}  · ", state.mode), Style::default().fg(C_MUTED)),
    ];
    let used: usize = spans.iter().map(|s| s.width()).sum();
    let room = (area.width as usize).saturating_sub(used);
    spans.push(Span::styled(
        truncate_to_width(&updated, room),
        Style::default().fg(C_MUTED),
    ));

    frame.render_widget(Paragraph::new(Line::from(spans)), Rect { height: 1, ..area });

    if area.height >= 2 {
        draw_separator(
            frame,
            Rect {
                y: area.y + 1,
                height: 1,
                ..area
            },
        );
    }
}

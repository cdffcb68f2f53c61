//! Smooth Unicode progress bar widget.

use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::theme::{C_MUTED, C_PLAYING, C_SECONDARY};

/// Render a progress bar in `area`.
/// `progress` is 0.0..=1.0; positions are in milliseconds.
pub fn draw_progress(
    frame: &mut Frame,
    area: Rect,
    progress: f64,
    position_ms: f64,
    duration_ms: f64,
    paused: bool,
) {
    if area.width < 4 || area.height == 0 {
        return;
    }

    let left_label = format!("{}{}", if paused { "⏸ " } else { "" }, fmt_time(position_ms));
    let right_label = fmt_time(duration_ms);
    let label_w = (left_label.chars().count() + right_label.len() + 2) as u16;
    let bar_w = area.width.saturating_sub(label_w).max(4) as usize;

    frame.render_widget(
        Paragraph::new(Line::from(vec![
            Span::styled(format!("{} ", left_label), Style::default().fg(C_SECONDARY)),
            Span::styled(bar(progress, bar_w), Style::default().fg(C_PLAYING)),
            Span::styled(format!(" {}", right_label), Style::default().fg(C_MUTED)),
        ])),
        area,
    );
}

/// 8 eighths per cell.
fn bar(progress: f64, width: usize) -> String {
    const BLOCKS: [char; 9] = [' ', '▏', '▎', '▍', '▌', '▋', '▊', '▉', '█'];

    let eighths = (progress.clamp(0.0, 1.0) * width as f64 * 8.0) as usize;
    let full_blocks = eighths / 8;
    let partial = eighths % 8;

    let mut out = String::with_capacity(width * 3);
    for _ in 0..full_blocks {
        out.push('█');
    }
    if full_blocks < width {
        out.push(BLOCKS[partial]);
        for _ in (full_blocks + 1)..width {
            out.push(' ');
        }
    }
    out
}

pub fn fmt_time(ms: f64) -> String {
    if ms < 0.0 {
        return "0:00".to_string();
    }
    let s = (ms / 1000.0) as u64;
    let h = s / 3600;
    let m = (s % 3600) / 60;
    let s = s % 60;
    if h > 0 {
        format!("{}:{:02}:{:02}", h, m, s)
    } else {
        format!("{}:{:02}", m, s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_minutes_and_hours() {
        assert_eq!(fmt_time(-5.0), "0:00");
        assert_eq!(fmt_time(65_400.0), "1:05");
        assert_eq!(fmt_time(3_723_000.0), "1:02:03");
    }

    #[test]
    fn bar_keeps_its_width() {
        for p in [0.0, 0.33, 0.5, 1.0] {
            assert_eq!(bar(p, 10).chars().count(), 10);
        }
        assert_eq!(bar(1.0, 3), "███");
        assert_eq!(bar(0.5, 2), "█ ");
    }
}

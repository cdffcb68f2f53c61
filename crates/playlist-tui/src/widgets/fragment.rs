//! Turn view fragments into styled spans.
//!
//! Terminals have no anchors, so a link is drawn underlined in the link
//! colour.  When its visible text differs from the target, the target is
//! appended dimmed so the URL is always on screen.

use ratatui::{style::Style, text::Span};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use playlist_proto::view::Fragment;

use crate::theme::{style_default, style_link, style_muted, style_secondary};

pub fn fragment_spans(fragment: &Fragment, base: Style) -> Vec<Span<'static>> {
    match fragment {
        Fragment::Link { href, text } => {
            let mut spans = vec![Span::styled(text.clone(), base.patch(style_link()))];
            if href != text {
                spans.push(Span::styled(format!("  {}", href), style_muted()));
            }
            spans
        }
        Fragment::Label(text) => vec![Span::styled(text.clone(), base.patch(style_default()))],
        Fragment::Text(text) => vec![Span::styled(text.clone(), base.patch(style_secondary()))],
    }
}

/// What `y` puts on the clipboard: the link target, else the visible text.
pub fn copy_target(fragment: &Fragment) -> String {
    fragment.href().unwrap_or(fragment.text()).to_string()
}

/// What `y` copies from the now-playing entry: its link target when there is
/// one, else the label.
pub fn now_playing_copy(fragments: &[Fragment]) -> Option<String> {
    fragments
        .iter()
        .find(|f| f.href().is_some())
        .or_else(|| fragments.first())
        .map(copy_target)
}

/// Cut `s` to `max` display columns, ending in `…` when shortened.
pub fn truncate_to_width(s: &str, max: usize) -> String {
    if UnicodeWidthStr::width(s) <= max {
        return s.to_string();
    }
    if max == 0 {
        return String::new();
    }
    let mut out = String::new();
    let mut used = 0;
    for ch in s.chars() {
        let w = UnicodeWidthChar::width(ch).unwrap_or(0);
        if used + w + 1 > max {
            break;
        }
        out.push(ch);
        used += w;
    }
    out.push('…');
    out
}

/// Truncate a run of spans so their combined width fits in `max` columns.
pub fn fit_spans(spans: Vec<Span<'static>>, max: usize) -> Vec<Span<'static>> {
    let mut out = Vec::with_capacity(spans.len());
    let mut left = max;
    for span in spans {
        if left == 0 {
            break;
        }
        let w = UnicodeWidthStr::width(span.content.as_ref());
        if w <= left {
            left -= w;
            out.push(span);
        } else {
            let cut = truncate_to_width(&span.content, left);
            out.push(Span::styled(cut, span.style));
            break;
        }
    }
    out
}

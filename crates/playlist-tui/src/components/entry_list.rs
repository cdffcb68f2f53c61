//! EntryList — one list container (played, queue, or the flat playlist).
//!
//! The rows come from `AppState` and are replaced wholesale on every poll;
//! this component only keeps a cursor, which is clamped after each render.
//!
//! Keybindings (when focused):
//!   j/k ↑↓      — move
//!   g/G         — first / last
//!   PgUp/PgDn   — page
//!   y           — copy the selected link (or its text); now playing when empty

use ratatui::crossterm::event::{KeyCode, KeyEvent, MouseButton, MouseEvent, MouseEventKind};
use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use playlist_proto::view::Item;

use crate::{
    action::{Action, ComponentId},
    app_state::AppState,
    component::Component,
    theme::{style_muted, style_playing, style_selected, C_MARKER, C_MUTED, C_SECONDARY},
    widgets::{
        fragment::{copy_target, fit_spans, fragment_spans, now_playing_copy},
        pane_chrome::{pane_chrome, Badge},
    },
};

const PAGE: usize = 10;

pub struct EntryList {
    id: ComponentId,
    title: &'static str,
    empty_text: &'static str,
    /// Ordered-list numbering and the `▶` marker (flat playlist).
    numbered: bool,
    pub selected: usize,
    scroll_offset: usize,
}

impl EntryList {
    pub fn played() -> Self {
        Self::new(ComponentId::Played, "played", "nothing played yet", false)
    }

    pub fn queue() -> Self {
        Self::new(ComponentId::Queue, "queue", "queue is empty", false)
    }

    pub fn playlist() -> Self {
        Self::new(ComponentId::Playlist, "playlist", "playlist is empty", true)
    }

    fn new(id: ComponentId, title: &'static str, empty_text: &'static str, numbered: bool) -> Self {
        Self {
            id,
            title,
            empty_text,
            numbered,
            selected: 0,
            scroll_offset: 0,
        }
    }

    fn len(&self, state: &AppState) -> usize {
        state.items_for(self.id).len()
    }

    fn clamp(&mut self, len: usize) {
        self.selected = self.selected.min(len.saturating_sub(1));
        self.scroll_offset = self.scroll_offset.min(self.selected);
    }

    fn select_up(&mut self, n: usize) {
        self.selected = self.selected.saturating_sub(n);
    }

    fn select_down(&mut self, n: usize, len: usize) {
        self.selected = (self.selected + n).min(len.saturating_sub(1));
    }

    fn ensure_visible(&mut self, height: usize) {
        if height == 0 {
            return;
        }
        if self.selected < self.scroll_offset {
            self.scroll_offset = self.selected;
        } else if self.selected >= self.scroll_offset + height {
            self.scroll_offset = self.selected + 1 - height;
        }
    }

    fn selected_item<'a>(&self, state: &'a AppState) -> Option<&'a Item> {
        state.items_for(self.id).get(self.selected)
    }

    fn row_line(&self, idx: usize, item: &Item, selected: bool, width: usize, num_w: usize) -> Line<'static> {
        let base = if item.marked {
            style_playing()
        } else {
            Style::default()
        };

        let mut spans = Vec::new();
        if self.numbered {
            spans.push(Span::styled(
                format!("{:>w$}. ", idx + 1, w = num_w),
                Style::default().fg(C_MUTED),
            ));
            spans.push(if item.marked {
                Span::styled("▶ ", Style::default().fg(C_MARKER))
            } else {
                Span::raw("  ")
            });
        } else {
            spans.push(Span::raw(" "));
        }
        spans.extend(fragment_spans(&item.fragment, base));

        let line = Line::from(fit_spans(spans, width));
        if selected {
            line.style(style_selected())
        } else {
            line
        }
    }
}

impl Component for EntryList {
    fn id(&self) -> ComponentId {
        self.id
    }

    fn handle_key(&mut self, key: KeyEvent, state: &AppState) -> Vec<Action> {
        let len = self.len(state);
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.select_up(1),
            KeyCode::Down | KeyCode::Char('j') => self.select_down(1, len),
            KeyCode::PageUp => self.select_up(PAGE),
            KeyCode::PageDown => self.select_down(PAGE, len),
            KeyCode::Home | KeyCode::Char('g') => self.selected = 0,
            KeyCode::End | KeyCode::Char('G') => self.selected = len.saturating_sub(1),
            KeyCode::Char('y') => {
                let text = match (self.selected_item(state), self.id) {
                    (Some(item), _) => Some(copy_target(&item.fragment)),
                    // Queue layout with an empty list: fall back to now playing.
                    (None, ComponentId::Played | ComponentId::Queue) => {
                        now_playing_copy(&state.queue_view.now_playing)
                    }
                    (None, _) => None,
                };
                return text.map(Action::CopyToClipboard).into_iter().collect();
            }
            _ => {}
        }
        vec![]
    }

    fn handle_mouse(&mut self, event: MouseEvent, area: Rect, state: &AppState) -> Vec<Action> {
        let len = self.len(state);
        match event.kind {
            MouseEventKind::ScrollUp => self.select_up(1),
            MouseEventKind::ScrollDown => self.select_down(1, len),
            MouseEventKind::Down(MouseButton::Left) => {
                // first row sits under the top border
                let row = event.row.saturating_sub(area.y + 1) as usize;
                let target = self.scroll_offset + row;
                if event.row > area.y && target < len {
                    self.selected = target;
                }
            }
            _ => {}
        }
        vec![]
    }

    fn on_action(&mut self, action: &Action, state: &AppState) -> Vec<Action> {
        if let Action::Rendered = action {
            self.clamp(self.len(state));
        }
        vec![]
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, focused: bool, state: &AppState) {
        let items = state.items_for(self.id);
        let badge = (!items.is_empty()).then(|| Badge {
            text: items.len().to_string(),
            color: C_SECONDARY,
        });
        let block = pane_chrome(self.title, focused, badge);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        if inner.height == 0 || inner.width == 0 {
            return;
        }
        if items.is_empty() {
            frame.render_widget(
                Paragraph::new(Span::styled(format!("  {}", self.empty_text), style_muted())),
                inner,
            );
            return;
        }

        let height = inner.height as usize;
        self.clamp(items.len());
        self.ensure_visible(height);

        let num_w = items.len().to_string().len();
        let lines: Vec<Line> = items
            .iter()
            .enumerate()
            .skip(self.scroll_offset)
            .take(height)
            .map(|(idx, item)| {
                self.row_line(idx, item, focused && idx == self.selected, inner.width as usize, num_w)
            })
            .collect();

        frame.render_widget(Paragraph::new(lines), inner);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use playlist_proto::entry::PlaylistEntry;
    use playlist_proto::view::DisplayMode;
    use ratatui::crossterm::event::KeyModifiers;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn state_with_queue(n: usize) -> AppState {
        let mut state = AppState::new("http://127.0.0.1:8080".into(), DisplayMode::Queue);
        let mut entries = vec![PlaylistEntry::new("now.mp3").playing()];
        entries.extend((0..n).map(|i| PlaylistEntry::new(format!("http://x/{i}.mp3"))));
        state.queue_view.render(&entries);
        state
    }

    #[test]
    fn navigation_stays_in_bounds() {
        let state = state_with_queue(3);
        let mut list = EntryList::queue();

        list.handle_key(key(KeyCode::Up), &state);
        assert_eq!(list.selected, 0);
        for _ in 0..5 {
            list.handle_key(key(KeyCode::Char('j')), &state);
        }
        assert_eq!(list.selected, 2);
        list.handle_key(key(KeyCode::Char('g')), &state);
        assert_eq!(list.selected, 0);
        list.handle_key(key(KeyCode::End), &state);
        assert_eq!(list.selected, 2);
    }

    #[test]
    fn copy_yields_link_target() {
        let state = state_with_queue(2);
        let mut list = EntryList::queue();
        list.handle_key(key(KeyCode::Down), &state);

        let actions = list.handle_key(key(KeyCode::Char('y')), &state);
        assert!(matches!(
            actions.as_slice(),
            [Action::CopyToClipboard(url)] if url == "http://x/1.mp3"
        ));
    }

    #[test]
    fn copy_on_empty_queue_takes_now_playing() {
        let mut state = AppState::new("http://127.0.0.1:8080".into(), DisplayMode::Queue);
        state
            .queue_view
            .render(&[PlaylistEntry::new("http://x/now.mp3").playing()]);

        for mut list in [EntryList::queue(), EntryList::played()] {
            let actions = list.handle_key(key(KeyCode::Char('y')), &state);
            assert!(matches!(
                actions.as_slice(),
                [Action::CopyToClipboard(url)] if url == "http://x/now.mp3"
            ));
        }
    }

    #[test]
    fn copy_on_empty_flat_list_does_nothing() {
        let state = AppState::new("http://127.0.0.1:8080".into(), DisplayMode::Flat);
        let mut list = EntryList::playlist();
        assert!(list.handle_key(key(KeyCode::Char('y')), &state).is_empty());
    }

    #[test]
    fn cursor_is_clamped_after_render() {
        let mut state = state_with_queue(5);
        let mut list = EntryList::queue();
        list.handle_key(key(KeyCode::End), &state);
        assert_eq!(list.selected, 4);

        state.queue_view.render(&[
            PlaylistEntry::new("now.mp3").playing(),
            PlaylistEntry::new("only.mp3"),
        ]);
        list.on_action(&Action::Rendered, &state);
        assert_eq!(list.selected, 0);
    }

    #[test]
    fn flat_rows_are_numbered_and_marked() {
        let mut state = AppState::new("http://127.0.0.1:8080".into(), DisplayMode::Flat);
        state.flat_view.render(&[
            PlaylistEntry::new("a.mp3"),
            PlaylistEntry::new("b.mp3").current(),
        ]);
        let list = EntryList::playlist();
        let line = list.row_line(1, &state.flat_view.items[1], false, 80, 1);
        let text: String = line.spans.iter().map(|s| s.content.as_ref()).collect();
        assert_eq!(text, "2. ▶ b.mp3");
    }
}

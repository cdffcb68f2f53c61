//! AppState — shared read-only data passed to all components during render/event.
//!
//! Components read this, but never mutate it.
//! The App event-loop is the only thing that writes to AppState.

use std::time::Instant;

use playlist_proto::entry::CurrentFileInfo;
use playlist_proto::view::{DisplayMode, FlatView, Item, QueueView};

use crate::action::ComponentId;
use crate::widgets::status_bar::InputMode;

/// Last `/api/current` answer plus when it arrived, so the progress bar can
/// keep moving between polls.
#[derive(Debug, Clone, Copy)]
pub struct PlaybackInfo {
    pub info: CurrentFileInfo,
    pub received_at: Instant,
}

impl PlaybackInfo {
    pub fn new(info: CurrentFileInfo) -> Self {
        Self {
            info,
            received_at: Instant::now(),
        }
    }

    /// Position extrapolated to `now`; frozen while paused.
    pub fn position_ms_at(&self, now: Instant) -> f64 {
        let mut pos = self.info.position_ms;
        if !self.info.is_paused {
            pos += now.saturating_duration_since(self.received_at).as_secs_f64() * 1000.0;
        }
        if self.info.duration_ms > 0.0 {
            pos = pos.min(self.info.duration_ms);
        }
        pos
    }

    pub fn progress_at(&self, now: Instant) -> Option<f64> {
        if self.info.duration_ms > 0.0 {
            Some((self.position_ms_at(now) / self.info.duration_ms).clamp(0.0, 1.0))
        } else {
            None
        }
    }
}

pub struct AppState {
    // ── Server ──────────────────────────────────────────────────────────────
    pub server_url: String,
    /// Whether the most recent playlist poll succeeded.
    pub connected: bool,
    pub last_error: Option<String>,
    pub last_update: Option<chrono::DateTime<chrono::Local>>,
    pub playback: Option<PlaybackInfo>,

    // ── Containers ──────────────────────────────────────────────────────────
    pub mode: DisplayMode,
    pub queue_view: QueueView,
    pub flat_view: FlatView,

    // ── UI mode ─────────────────────────────────────────────────────────────
    pub input_mode: InputMode,
}

impl AppState {
    pub fn new(server_url: String, mode: DisplayMode) -> Self {
        Self {
            server_url,
            connected: false,
            last_error: None,
            last_update: None,
            playback: None,
            mode,
            queue_view: QueueView::new(),
            flat_view: FlatView::new(),
            input_mode: InputMode::Normal,
        }
    }

    /// Rows of the list container a component is bound to.
    pub fn items_for(&self, id: ComponentId) -> &[Item] {
        match id {
            ComponentId::Played => &self.queue_view.played,
            ComponentId::Queue => &self.queue_view.queue,
            ComponentId::Playlist => &self.flat_view.items,
            ComponentId::NowPlaying => &[],
        }
    }
}

//! Action enum — all user-initiated intents and internal events.

/// Unique identifier for a focusable component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentId {
    NowPlaying,
    Played,
    Queue,
    Playlist,
}

/// All actions that can flow through the system.
/// Components produce Actions; the App dispatches them.
#[derive(Debug, Clone)]
pub enum Action {
    // ── Server ───────────────────────────────────────────────────────────────
    Refresh,
    Next,
    OpenEnqueue,
    CloseEnqueue,
    Enqueue(String),

    // ── Navigation ───────────────────────────────────────────────────────────
    FocusNext,
    FocusPrev,
    FocusPane(ComponentId),

    // ── View ─────────────────────────────────────────────────────────────────
    ToggleMode,
    ToggleKeys,
    CopyToClipboard(String),
    /// The containers were just replaced from a fresh playlist.
    Rendered,

    // ── System ───────────────────────────────────────────────────────────────
    Quit,
}

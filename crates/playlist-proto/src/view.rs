//! Playlist renderers.
//!
//! Two variants exist and are kept apart:
//! - `QueueView` splits the playlist around the `playing` entry into
//!   now-playing / played (most recent first) / queue.
//! - `FlatView` is the legacy numbered list keyed on the `current` flag.
//!
//! Both own their containers and replace them wholesale on every render;
//! nothing from the previous playlist survives a call except the
//! now-playing container in the "no entry playing" case.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::entry::PlaylistEntry;

/// Smallest renderable piece: a link, a standalone label, or bare text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fragment {
    Link { href: String, text: String },
    Label(String),
    Text(String),
}

impl Fragment {
    pub fn text(&self) -> &str {
        match self {
            Fragment::Link { text, .. } => text,
            Fragment::Label(text) | Fragment::Text(text) => text,
        }
    }

    pub fn href(&self) -> Option<&str> {
        match self {
            Fragment::Link { href, .. } => Some(href),
            _ => None,
        }
    }
}

/// One row of a list container.  `marked` is the flat view's "current" marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    pub fragment: Fragment,
    pub marked: bool,
}

/// Which renderer drives the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DisplayMode {
    /// now-playing / played / queue, keyed on `playing`.
    #[default]
    Queue,
    /// Legacy numbered list, keyed on `current`.
    Flat,
}

impl DisplayMode {
    pub fn toggled(self) -> Self {
        match self {
            DisplayMode::Queue => DisplayMode::Flat,
            DisplayMode::Flat => DisplayMode::Queue,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DisplayMode::Queue => "queue",
            DisplayMode::Flat => "flat",
        }
    }
}

impl fmt::Display for DisplayMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for DisplayMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "queue" => Ok(DisplayMode::Queue),
            "flat" => Ok(DisplayMode::Flat),
            other => Err(format!("unknown display mode {other:?} (expected queue or flat)")),
        }
    }
}

/// Index of the first entry flagged `playing`.
pub fn playing_index(entries: &[PlaylistEntry]) -> Option<usize> {
    entries.iter().position(|e| e.playing)
}

/// Fragments for the now-playing container.
///
/// A URL entry shows the URL itself as the link text, followed by a separate
/// label only when it has a title.  Anything else is a single label.
pub fn now_playing_fragments(entry: &PlaylistEntry) -> Vec<Fragment> {
    if entry.is_url() {
        let mut out = vec![Fragment::Link {
            href: entry.filename.clone(),
            text: entry.filename.clone(),
        }];
        if let Some(title) = entry.title() {
            out.push(Fragment::Label(title.to_string()));
        }
        return out;
    }
    vec![Fragment::Label(entry.label().to_string())]
}

/// A played/queue row: link when the filename is a URL, text otherwise.
pub fn list_item(entry: &PlaylistEntry) -> Item {
    let text = entry.label().to_string();
    let fragment = if entry.is_url() {
        Fragment::Link {
            href: entry.filename.clone(),
            text,
        }
    } else {
        Fragment::Text(text)
    };
    Item {
        fragment,
        marked: false,
    }
}

/// Containers of the now-playing / played / queue layout.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueueView {
    pub now_playing: Vec<Fragment>,
    pub played: Vec<Item>,
    pub queue: Vec<Item>,
}

impl QueueView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace all containers from a freshly fetched playlist.
    pub fn render(&mut self, entries: &[PlaylistEntry]) {
        let Some(idx) = playing_index(entries) else {
            self.played.clear();
            self.queue.clear();
            // Nothing left on the server at all: drop the stale now-playing too.
            if entries.is_empty() {
                self.now_playing.clear();
            }
            return;
        };

        self.now_playing = now_playing_fragments(&entries[idx]);
        self.played = entries[..idx].iter().rev().map(list_item).collect();
        self.queue = entries[idx + 1..].iter().map(list_item).collect();
    }

    pub fn is_empty(&self) -> bool {
        self.now_playing.is_empty() && self.played.is_empty() && self.queue.is_empty()
    }

    /// Link target of the now-playing entry, if it has one.
    pub fn now_playing_href(&self) -> Option<&str> {
        self.now_playing.iter().find_map(Fragment::href)
    }
}

/// Container of the legacy flat list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlatView {
    pub items: Vec<Item>,
}

impl FlatView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn render(&mut self, entries: &[PlaylistEntry]) {
        self.items = entries.iter().map(flat_item).collect();
    }

    /// Position of the first marked row.
    pub fn marked_index(&self) -> Option<usize> {
        self.items.iter().position(|i| i.marked)
    }
}

fn flat_item(entry: &PlaylistEntry) -> Item {
    let fragment = if entry.is_url() {
        Fragment::Link {
            href: entry.filename.clone(),
            text: entry.filename.clone(),
        }
    } else {
        Fragment::Text(entry.filename.clone())
    };
    Item {
        fragment,
        marked: entry.current,
    }
}

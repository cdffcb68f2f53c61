use serde::{Deserialize, Serialize};

/// Prefix that turns a filename into a link target.
pub const URL_PREFIX: &str = "http";

/// One track in the server's playlist.  The server owns these; the client
/// only ever reads them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct PlaylistEntry {
    #[serde(default)]
    pub id: i64,
    pub filename: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Legacy flag, read by the flat-list renderer.
    #[serde(default)]
    pub current: bool,
    /// Read by the now/played/queue renderer.
    #[serde(default)]
    pub playing: bool,
}

impl PlaylistEntry {
    pub fn new(filename: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            ..Self::default()
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn playing(mut self) -> Self {
        self.playing = true;
        self
    }

    pub fn current(mut self) -> Self {
        self.current = true;
        self
    }

    /// True when the filename should be rendered as a link to itself.
    pub fn is_url(&self) -> bool {
        self.filename.starts_with(URL_PREFIX)
    }

    /// Title, when present and non-empty.
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref().filter(|t| !t.is_empty())
    }

    /// Visible text: title, falling back to the filename.
    pub fn label(&self) -> &str {
        self.title().unwrap_or(&self.filename)
    }
}

/// Playback position of the file mpv currently has loaded (`GET /api/current`).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct CurrentFileInfo {
    pub duration_ms: f64,
    pub position_ms: f64,
    pub is_paused: bool,
}

impl CurrentFileInfo {
    /// 0.0..=1.0, or `None` when the duration is unknown (live streams).
    pub fn progress(&self) -> Option<f64> {
        if self.duration_ms > 0.0 {
            Some((self.position_ms / self.duration_ms).clamp(0.0, 1.0))
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_mpv_playlist_shape() {
        let raw = r#"[
            {"filename": "a.mp3", "id": 1},
            {"filename": "http://x/b.mp3", "title": "B", "current": true, "playing": true, "id": 2}
        ]"#;
        let entries: Vec<PlaylistEntry> = serde_json::from_str(raw).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].title, None);
        assert!(!entries[0].playing && !entries[0].current);
        assert!(entries[1].playing && entries[1].current);
        assert_eq!(entries[1].id, 2);
    }

    #[test]
    fn label_falls_back_to_filename() {
        assert_eq!(PlaylistEntry::new("a.mp3").label(), "a.mp3");
        assert_eq!(PlaylistEntry::new("a.mp3").with_title("A").label(), "A");
        // an empty title counts as absent
        assert_eq!(PlaylistEntry::new("a.mp3").with_title("").label(), "a.mp3");
    }

    #[test]
    fn url_detection_is_prefix_only() {
        assert!(PlaylistEntry::new("http://x/b.mp3").is_url());
        assert!(PlaylistEntry::new("https://youtu.be/abc").is_url());
        assert!(!PlaylistEntry::new("/media/http.mp3").is_url());
        assert!(!PlaylistEntry::new("HTTP://x").is_url());
    }

    #[test]
    fn progress_needs_a_duration() {
        let info = CurrentFileInfo {
            duration_ms: 0.0,
            position_ms: 1200.0,
            is_paused: false,
        };
        assert_eq!(info.progress(), None);
        let info = CurrentFileInfo {
            duration_ms: 4000.0,
            position_ms: 1000.0,
            is_paused: true,
        };
        assert_eq!(info.progress(), Some(0.25));
    }
}

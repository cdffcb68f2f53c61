//! App — component-based event loop.
//!
//! - `App` owns all components and `AppState` (shared read-only data for components).
//! - A `tokio::mpsc` channel carries `AppMessage` events in from background tasks:
//!   the terminal reader, the poller, and one-shot server actions.
//! - The event loop draws each frame, then awaits the next message.
//! - Components return `Vec<Action>`; App dispatches each Action.

use std::collections::VecDeque;
use std::io;
use std::sync::Arc;
use std::time::Duration;

use ratatui::crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers, MouseEvent, MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    widgets::Block,
    Terminal,
};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use playlist_proto::api::PlaylistClient;
use playlist_proto::entry::PlaylistEntry;
use playlist_proto::view::DisplayMode;

use crate::{
    action::{Action, ComponentId},
    app_state::{AppState, PlaybackInfo},
    component::Component,
    components::{entry_list::EntryList, header, now_playing::NowPlaying},
    focus::FocusRing,
    poller::{self, PollEvent},
    theme::C_BG,
    widgets::{
        status_bar::{self, InputMode},
        toast::{Severity, ToastManager},
        url_input::{InputOutcome, UrlInput},
    },
};

// ── Internal event bus ────────────────────────────────────────────────────────

enum AppMessage {
    Event(Event),
    Poll(PollEvent),
    RemoteDone {
        request: RemoteRequest,
        result: Result<(), String>,
    },
}

impl From<PollEvent> for AppMessage {
    fn from(event: PollEvent) -> Self {
        AppMessage::Poll(event)
    }
}

/// A write the user asked the server to perform.
#[derive(Debug, Clone)]
enum RemoteRequest {
    Enqueue(String),
    Next,
}

impl RemoteRequest {
    fn pending_label(&self) -> &'static str {
        match self {
            RemoteRequest::Enqueue(_) => "enqueueing…",
            RemoteRequest::Next => "skipping…",
        }
    }

    fn done_label(&self) -> String {
        match self {
            RemoteRequest::Enqueue(url) => format!("enqueued {}", url.trim()),
            RemoteRequest::Next => "skipped to next".to_string(),
        }
    }
}

fn focus_order(mode: DisplayMode) -> Vec<ComponentId> {
    match mode {
        DisplayMode::Queue => vec![ComponentId::NowPlaying, ComponentId::Played, ComponentId::Queue],
        DisplayMode::Flat => vec![ComponentId::Playlist],
    }
}

// ── Pane area tracking ────────────────────────────────────────────────────────

/// Last-drawn rects, used for mouse hit-testing.
#[derive(Default, Clone)]
struct PaneAreas {
    now_playing: Rect,
    played: Rect,
    queue: Rect,
    playlist: Rect,
}

impl PaneAreas {
    fn hit(&self, col: u16, row: u16) -> Option<(ComponentId, Rect)> {
        fn inside(r: Rect, col: u16, row: u16) -> bool {
            r.width > 0
                && r.height > 0
                && col >= r.x
                && col < r.x + r.width
                && row >= r.y
                && row < r.y + r.height
        }
        [
            (ComponentId::NowPlaying, self.now_playing),
            (ComponentId::Played, self.played),
            (ComponentId::Queue, self.queue),
            (ComponentId::Playlist, self.playlist),
        ]
        .into_iter()
        .find(|(_, r)| inside(*r, col, row))
    }
}

// ── App ───────────────────────────────────────────────────────────────────────

pub struct App {
    pub state: AppState,

    client: Arc<PlaylistClient>,
    poll_interval: Duration,
    with_current: bool,

    // ── Components ────────────────────────────────────────────────────────────
    now_playing: NowPlaying,
    played: EntryList,
    queue: EntryList,
    playlist: EntryList,
    url_input: UrlInput,
    toast: ToastManager,

    // ── Layout ────────────────────────────────────────────────────────────────
    focus: FocusRing,
    show_keys_bar: bool,
    pane_areas: PaneAreas,

    tx: Option<mpsc::Sender<AppMessage>>,
    should_quit: bool,
}

impl App {
    pub fn new(
        client: PlaylistClient,
        mode: DisplayMode,
        poll_interval: Duration,
        with_current: bool,
    ) -> Self {
        let mut focus = FocusRing::new(focus_order(mode));
        focus.set(ComponentId::Queue);
        Self {
            state: AppState::new(client.base_url().to_string(), mode),
            client: Arc::new(client),
            poll_interval,
            with_current,
            now_playing: NowPlaying::new(),
            played: EntryList::played(),
            queue: EntryList::queue(),
            playlist: EntryList::playlist(),
            url_input: UrlInput::new("https://… (Enter to enqueue, Esc to cancel)"),
            toast: ToastManager::new(),
            focus,
            show_keys_bar: true,
            pane_areas: PaneAreas::default(),
            tx: None,
            should_quit: false,
        }
    }

    pub async fn run(mut self) -> anyhow::Result<()> {
        debug!("run(): enabling raw mode");
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let result = self.event_loop(&mut terminal).await;

        // ── Teardown ──────────────────────────────────────────────────────────
        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        )?;
        terminal.show_cursor()?;
        result
    }

    async fn event_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    ) -> anyhow::Result<()> {
        let (tx, mut rx) = mpsc::channel::<AppMessage>(1024);
        self.tx = Some(tx.clone());

        // ── Background task: keyboard/mouse events ────────────────────────────
        let event_tx = tx.clone();
        tokio::task::spawn_blocking(move || loop {
            match event::read() {
                Ok(ev) => {
                    if event_tx.blocking_send(AppMessage::Event(ev)).is_err() {
                        break;
                    }
                }
                Err(_) => break,
            }
        });

        // ── Background task: playlist poller ─────────────────────────────────
        info!(
            "polling {} every {:?}",
            self.state.server_url, self.poll_interval
        );
        let poller = poller::spawn(
            Arc::clone(&self.client),
            self.poll_interval,
            self.with_current,
            tx.clone(),
        );
        drop(tx);

        // Toast expiry, spinner animation, progress bar movement.
        let mut ui_tick = tokio::time::interval(Duration::from_millis(100));
        ui_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        // ── Main loop ─────────────────────────────────────────────────────────
        loop {
            terminal.draw(|f| self.draw(f))?;

            if self.should_quit {
                break;
            }

            tokio::select! {
                Some(msg) = rx.recv() => {
                    self.handle_message(msg);
                    while let Ok(next) = rx.try_recv() {
                        self.handle_message(next);
                    }
                }
                _ = ui_tick.tick() => {
                    self.toast.tick();
                }
            }
        }

        poller.abort();
        self.tx = None;
        Ok(())
    }

    // ── Message handler ───────────────────────────────────────────────────────

    fn handle_message(&mut self, msg: AppMessage) {
        match msg {
            AppMessage::Event(ev) => match ev {
                Event::Key(key) => {
                    if key.kind == KeyEventKind::Release {
                        return;
                    }
                    let actions = self.handle_key(key);
                    self.dispatch_all(actions);
                }
                Event::Mouse(mouse) => {
                    let actions = self.handle_mouse(mouse);
                    self.dispatch_all(actions);
                }
                _ => {}
            },

            AppMessage::Poll(PollEvent::Playlist(entries)) => self.on_playlist(&entries),

            AppMessage::Poll(PollEvent::PlaylistFailed(err)) => {
                // The containers keep whatever the last good poll rendered.
                self.state.connected = false;
                self.state.last_error = Some(err);
            }

            AppMessage::Poll(PollEvent::Current(info)) => {
                self.state.playback = Some(PlaybackInfo::new(info));
            }

            AppMessage::Poll(PollEvent::CurrentFailed) => {
                self.state.playback = None;
            }

            AppMessage::RemoteDone { request, result } => match result {
                Ok(()) => {
                    self.toast
                        .resolve_spinner(Severity::Success, request.done_label());
                    self.dispatch(Action::Refresh);
                }
                Err(e) => {
                    self.toast.resolve_spinner(Severity::Error, e);
                }
            },
        }
    }

    /// Replace every container from a freshly fetched playlist.
    fn on_playlist(&mut self, entries: &[PlaylistEntry]) {
        self.state.queue_view.render(entries);
        self.state.flat_view.render(entries);
        if !self.state.connected {
            info!("playlist reachable at {}", self.state.server_url);
        }
        self.state.connected = true;
        self.state.last_error = None;
        self.state.last_update = Some(chrono::Local::now());
        self.dispatch(Action::Rendered);
    }

    // ── Input ─────────────────────────────────────────────────────────────────

    fn handle_key(&mut self, key: KeyEvent) -> Vec<Action> {
        if key.code == KeyCode::Char('c') && key.modifiers == KeyModifiers::CONTROL {
            return vec![Action::Quit];
        }

        if self.state.input_mode == InputMode::Enqueue {
            return match self.url_input.handle_key(key) {
                InputOutcome::Submitted(url) => vec![Action::CloseEnqueue, Action::Enqueue(url)],
                InputOutcome::Cancelled => vec![Action::CloseEnqueue],
                InputOutcome::Editing => vec![],
            };
        }

        match key.code {
            KeyCode::Char('q') => return vec![Action::Quit],
            KeyCode::Char('?') => return vec![Action::ToggleKeys],
            KeyCode::Tab => return vec![Action::FocusNext],
            KeyCode::BackTab => return vec![Action::FocusPrev],
            KeyCode::Char('a') => return vec![Action::OpenEnqueue],
            KeyCode::Char('n') => return vec![Action::Next],
            KeyCode::Char('r') => return vec![Action::Refresh],
            KeyCode::Char('m') => return vec![Action::ToggleMode],
            _ => {}
        }

        match self.focus.current() {
            Some(id) => self.with_component(id, |c, s| c.handle_key(key, s)),
            None => vec![],
        }
    }

    fn handle_mouse(&mut self, event: MouseEvent) -> Vec<Action> {
        let relevant = matches!(
            event.kind,
            MouseEventKind::Down(_) | MouseEventKind::ScrollUp | MouseEventKind::ScrollDown
        );
        if !relevant {
            return vec![];
        }
        let Some((id, area)) = self.pane_areas.hit(event.column, event.row) else {
            return vec![];
        };
        let focused = self.focus.is_focused(id);
        self.with_component(id, |c, s| {
            let mut actions = c.handle_mouse(event, area, s);
            if !focused {
                actions.insert(0, Action::FocusPane(c.id()));
            }
            actions
        })
    }

    fn with_component<R>(
        &mut self,
        id: ComponentId,
        f: impl FnOnce(&mut dyn Component, &AppState) -> R,
    ) -> R {
        let Self {
            state,
            now_playing,
            played,
            queue,
            playlist,
            ..
        } = self;
        let component: &mut dyn Component = match id {
            ComponentId::NowPlaying => now_playing,
            ComponentId::Played => played,
            ComponentId::Queue => queue,
            ComponentId::Playlist => playlist,
        };
        f(component, state)
    }

    // ── Action dispatcher ─────────────────────────────────────────────────────

    fn dispatch_all(&mut self, actions: Vec<Action>) {
        for a in actions {
            self.dispatch(a);
        }
    }

    /// Broadcast to every component, apply, then process whatever the
    /// components emitted in response.
    fn dispatch(&mut self, action: Action) {
        let mut pending = VecDeque::from([action]);
        while let Some(action) = pending.pop_front() {
            let s = &self.state;
            pending.extend(self.now_playing.on_action(&action, s));
            pending.extend(self.played.on_action(&action, s));
            pending.extend(self.queue.on_action(&action, s));
            pending.extend(self.playlist.on_action(&action, s));
            self.apply_action(action);
        }
    }

    fn apply_action(&mut self, action: Action) {
        match action {
            Action::Refresh => {
                if let Some(tx) = &self.tx {
                    debug!("manual refresh");
                    poller::poll_once(&self.client, self.with_current, tx);
                }
            }
            Action::Next => self.spawn_remote(RemoteRequest::Next),
            Action::Enqueue(url) => {
                if url.trim().is_empty() {
                    self.toast.error("nothing to enqueue: URL is empty");
                } else {
                    self.spawn_remote(RemoteRequest::Enqueue(url));
                }
            }
            Action::OpenEnqueue => {
                self.url_input.clear();
                self.state.input_mode = InputMode::Enqueue;
            }
            Action::CloseEnqueue => self.state.input_mode = InputMode::Normal,

            Action::FocusNext => {
                self.focus.next();
            }
            Action::FocusPrev => {
                self.focus.prev();
            }
            Action::FocusPane(id) => self.focus.set(id),

            Action::ToggleMode => {
                self.state.mode = self.state.mode.toggled();
                self.focus.set_items(focus_order(self.state.mode));
                if self.state.mode == DisplayMode::Queue {
                    self.focus.set(ComponentId::Queue);
                }
                info!("display mode: {}", self.state.mode);
                self.toast.info(format!("{} view", self.state.mode.label()));
            }
            Action::ToggleKeys => self.show_keys_bar = !self.show_keys_bar,

            Action::CopyToClipboard(text) => {
                match arboard::Clipboard::new().and_then(|mut cb| cb.set_text(text.clone())) {
                    Ok(()) => {
                        let display = if text.chars().count() > 40 {
                            format!("{}…", text.chars().take(40).collect::<String>())
                        } else {
                            text
                        };
                        self.toast.success(format!("copied: {}", display));
                    }
                    Err(e) => {
                        warn!("clipboard error: {}", e);
                        self.toast.warning(format!("clipboard unavailable: {}", e));
                    }
                }
            }

            Action::Quit => self.should_quit = true,
            Action::Rendered => {}
        }
    }

    fn spawn_remote(&mut self, request: RemoteRequest) {
        let Some(tx) = self.tx.clone() else {
            return;
        };
        let client = Arc::clone(&self.client);
        self.toast.spinner(request.pending_label());
        tokio::spawn(async move {
            let result = match &request {
                RemoteRequest::Enqueue(url) => client.enqueue(url).await,
                RemoteRequest::Next => client.next().await,
            };
            if let Err(e) = &result {
                warn!("{:?} failed: {}", request, e);
            }
            let _ = tx
                .send(AppMessage::RemoteDone {
                    request,
                    result: result.map_err(|e| e.to_string()),
                })
                .await;
        });
    }

    // ── Drawing ───────────────────────────────────────────────────────────────

    fn draw(&mut self, frame: &mut ratatui::Frame) {
        let area = frame.area();
        frame.render_widget(Block::default().style(Style::default().bg(C_BG)), area);

        let input_h = if self.state.input_mode == InputMode::Enqueue { 1 } else { 0 };
        let keys_h = if self.show_keys_bar { 1 } else { 0 };
        let outer = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2),
                Constraint::Min(0),
                Constraint::Length(input_h),
                Constraint::Length(keys_h),
            ])
            .split(area);

        header::draw(frame, outer[0], &self.state);

        self.pane_areas = PaneAreas::default();
        match self.state.mode {
            DisplayMode::Queue => self.draw_queue(frame, outer[1]),
            DisplayMode::Flat => self.draw_flat(frame, outer[1]),
        }

        if self.state.input_mode == InputMode::Enqueue {
            self.url_input.draw(frame, outer[2]);
        }
        if self.show_keys_bar {
            status_bar::draw_keys_bar(frame, outer[3], self.state.input_mode, self.state.mode);
        }

        self.toast.draw(frame, area);
    }

    fn draw_queue(&mut self, frame: &mut ratatui::Frame, area: Rect) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(NowPlaying::height(&self.state)),
                Constraint::Min(0),
            ])
            .split(area);
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(rows[1]);

        let s = &self.state;
        self.now_playing
            .draw(frame, rows[0], self.focus.is_focused(ComponentId::NowPlaying), s);
        self.played
            .draw(frame, cols[0], self.focus.is_focused(ComponentId::Played), s);
        self.queue
            .draw(frame, cols[1], self.focus.is_focused(ComponentId::Queue), s);

        self.pane_areas.now_playing = rows[0];
        self.pane_areas.played = cols[0];
        self.pane_areas.queue = cols[1];
    }

    fn draw_flat(&mut self, frame: &mut ratatui::Frame, area: Rect) {
        let focused = self.focus.is_focused(ComponentId::Playlist);
        self.playlist.draw(frame, area, focused, &self.state);
        self.pane_areas.playlist = area;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::{backend::TestBackend, buffer::Buffer};

    fn app(mode: DisplayMode) -> App {
        let client = PlaylistClient::new("http://127.0.0.1:8080", None).unwrap();
        App::new(client, mode, Duration::from_secs(10), false)
    }

    fn press(app: &mut App, code: KeyCode) {
        let actions = app.handle_key(KeyEvent::new(code, KeyModifiers::NONE));
        app.dispatch_all(actions);
    }

    fn sample() -> Vec<PlaylistEntry> {
        vec![
            PlaylistEntry::new("a.mp3"),
            PlaylistEntry::new("http://x/b.mp3").with_title("B").playing(),
            PlaylistEntry::new("c.mp3").current(),
        ]
    }

    fn screen(app: &mut App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(80, 16)).unwrap();
        terminal.draw(|f| app.draw(f)).unwrap();
        buffer_text(terminal.backend().buffer())
    }

    fn buffer_text(buf: &Buffer) -> String {
        let mut out = String::new();
        for y in 0..buf.area.height {
            for x in 0..buf.area.width {
                out.push_str(buf[(x, y)].symbol());
            }
            out.push('\n');
        }
        out
    }

    #[test]
    fn poll_result_renders_both_variants() {
        let mut app = app(DisplayMode::Queue);
        app.handle_message(AppMessage::Poll(PollEvent::Playlist(sample())));

        assert!(app.state.connected);
        assert!(app.state.last_update.is_some());
        assert_eq!(app.state.queue_view.played.len(), 1);
        assert_eq!(app.state.queue_view.queue.len(), 1);
        assert_eq!(app.state.flat_view.marked_index(), Some(2));
    }

    #[test]
    fn last_arriving_poll_wins() {
        let mut app = app(DisplayMode::Queue);
        let fresh = vec![
            PlaylistEntry::new("a.mp3"),
            PlaylistEntry::new("b.mp3"),
            PlaylistEntry::new("c.mp3").playing(),
        ];
        let stale = vec![
            PlaylistEntry::new("a.mp3").playing(),
            PlaylistEntry::new("b.mp3"),
            PlaylistEntry::new("c.mp3"),
        ];
        app.handle_message(AppMessage::Poll(PollEvent::Playlist(fresh)));
        app.handle_message(AppMessage::Poll(PollEvent::Playlist(stale.clone())));

        let mut expected = playlist_proto::view::QueueView::new();
        expected.render(&stale);
        assert_eq!(app.state.queue_view, expected);
        assert!(app.state.queue_view.played.is_empty());
        assert_eq!(app.state.queue_view.queue.len(), 2);
    }

    #[test]
    fn failed_poll_keeps_containers() {
        let mut app = app(DisplayMode::Queue);
        app.handle_message(AppMessage::Poll(PollEvent::Playlist(sample())));
        let before = app.state.queue_view.clone();

        app.handle_message(AppMessage::Poll(PollEvent::PlaylistFailed("refused".into())));

        assert!(!app.state.connected);
        assert_eq!(app.state.last_error.as_deref(), Some("refused"));
        assert_eq!(app.state.queue_view, before);
    }

    #[test]
    fn queue_screen_shows_now_playing_and_lists() {
        let mut app = app(DisplayMode::Queue);
        app.handle_message(AppMessage::Poll(PollEvent::Playlist(sample())));
        let text = screen(&mut app);

        assert!(text.contains("now playing"));
        assert!(text.contains("http://x/b.mp3  B"));
        assert!(text.contains("played"));
        assert!(text.contains("a.mp3"));
        assert!(text.contains("c.mp3"));
    }

    #[test]
    fn mode_toggle_switches_to_flat_list() {
        let mut app = app(DisplayMode::Queue);
        app.handle_message(AppMessage::Poll(PollEvent::Playlist(sample())));
        press(&mut app, KeyCode::Char('m'));

        assert_eq!(app.state.mode, DisplayMode::Flat);
        assert!(app.focus.is_focused(ComponentId::Playlist));
        let text = screen(&mut app);
        assert!(text.contains("3. ▶ c.mp3"));
        assert!(!text.contains("now playing"));
    }

    #[test]
    fn enqueue_prompt_opens_and_cancels() {
        let mut app = app(DisplayMode::Queue);
        press(&mut app, KeyCode::Char('a'));
        assert_eq!(app.state.input_mode, InputMode::Enqueue);

        // keys go to the prompt, not to the global bindings
        press(&mut app, KeyCode::Char('q'));
        assert!(!app.should_quit);
        assert_eq!(app.url_input.text(), "q");

        press(&mut app, KeyCode::Esc);
        assert_eq!(app.state.input_mode, InputMode::Normal);
        press(&mut app, KeyCode::Char('q'));
        assert!(app.should_quit);
    }

    #[test]
    fn blank_submit_is_rejected_locally() {
        let mut app = app(DisplayMode::Queue);
        press(&mut app, KeyCode::Char('a'));
        press(&mut app, KeyCode::Char(' '));
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.state.input_mode, InputMode::Normal);
        assert_eq!(app.toast.len(), 1);
    }

    #[test]
    fn tab_cycles_queue_panes() {
        let mut app = app(DisplayMode::Queue);
        assert!(app.focus.is_focused(ComponentId::Queue));
        press(&mut app, KeyCode::Tab);
        assert!(app.focus.is_focused(ComponentId::NowPlaying));
        press(&mut app, KeyCode::BackTab);
        assert!(app.focus.is_focused(ComponentId::Queue));
    }

    #[test]
    fn current_info_drives_progress_state() {
        let mut app = app(DisplayMode::Queue);
        app.handle_message(AppMessage::Poll(PollEvent::Current(
            playlist_proto::entry::CurrentFileInfo {
                duration_ms: 60_000.0,
                position_ms: 30_000.0,
                is_paused: true,
            },
        )));
        assert!(app.state.playback.is_some());
        app.handle_message(AppMessage::Poll(PollEvent::CurrentFailed));
        assert!(app.state.playback.is_none());
    }
}

//! Poller — time-based refresh of the server playlist.
//!
//! One fetch fires immediately, then one per interval.  Every fetch runs in
//! its own task: a slow request never delays the next tick, nothing is
//! de-duplicated or cancelled, and completions can arrive out of order.
//! Whatever arrives last is what gets rendered.

use std::sync::Arc;
use std::time::Duration;

use playlist_proto::api::PlaylistSource;
use playlist_proto::entry::{CurrentFileInfo, PlaylistEntry};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Outcome of a single background fetch.
#[derive(Debug, Clone)]
pub enum PollEvent {
    Playlist(Vec<PlaylistEntry>),
    PlaylistFailed(String),
    Current(CurrentFileInfo),
    CurrentFailed,
}

/// Start the interval loop.  It ends on the first tick after the receiving
/// side of `tx` has gone away.
pub fn spawn<S, M>(
    source: Arc<S>,
    interval: Duration,
    with_current: bool,
    tx: mpsc::Sender<M>,
) -> JoinHandle<()>
where
    S: PlaylistSource,
    M: From<PollEvent> + Send + 'static,
{
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        loop {
            ticker.tick().await;
            if tx.is_closed() {
                debug!("poller: receiver closed, stopping");
                break;
            }
            poll_once(&source, with_current, &tx);
        }
    })
}

/// Fire one round of fetches without waiting for them.
pub fn poll_once<S, M>(source: &Arc<S>, with_current: bool, tx: &mpsc::Sender<M>)
where
    S: PlaylistSource,
    M: From<PollEvent> + Send + 'static,
{
    let playlist_source = Arc::clone(source);
    let playlist_tx = tx.clone();
    tokio::spawn(async move {
        let event = match playlist_source.fetch_playlist().await {
            Ok(entries) => {
                debug!("poll: {} entries", entries.len());
                PollEvent::Playlist(entries)
            }
            Err(e) => {
                warn!("poll: playlist fetch failed: {}", e);
                PollEvent::PlaylistFailed(e.to_string())
            }
        };
        let _ = playlist_tx.send(event.into()).await;
    });

    if !with_current {
        return;
    }

    let current_source = Arc::clone(source);
    let current_tx = tx.clone();
    tokio::spawn(async move {
        let event = match current_source.fetch_current().await {
            Ok(info) => PollEvent::Current(info),
            Err(e) => {
                debug!("poll: current file info unavailable: {}", e);
                PollEvent::CurrentFailed
            }
        };
        let _ = current_tx.send(event.into()).await;
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use playlist_proto::error::ClientError;
    use std::future::Future;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use tokio::time::Instant;

    #[derive(Default)]
    struct FakeSource {
        playlist_calls: AtomicUsize,
        current_calls: AtomicUsize,
        failing: AtomicBool,
    }

    impl FakeSource {
        fn playlist_calls(&self) -> usize {
            self.playlist_calls.load(Ordering::SeqCst)
        }
    }

    impl PlaylistSource for FakeSource {
        fn fetch_playlist(
            &self,
        ) -> impl Future<Output = Result<Vec<PlaylistEntry>, ClientError>> + Send {
            self.playlist_calls.fetch_add(1, Ordering::SeqCst);
            let failing = self.failing.load(Ordering::SeqCst);
            async move {
                if failing {
                    Err(ClientError::Status {
                        status: 500,
                        message: "mpv is gone".into(),
                    })
                } else {
                    Ok(vec![PlaylistEntry::new("a.mp3").playing()])
                }
            }
        }

        fn fetch_current(&self) -> impl Future<Output = Result<CurrentFileInfo, ClientError>> + Send {
            self.current_calls.fetch_add(1, Ordering::SeqCst);
            async move {
                Ok(CurrentFileInfo {
                    duration_ms: 1000.0,
                    position_ms: 500.0,
                    is_paused: false,
                })
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn fetches_immediately_then_every_ten_seconds() {
        let source = Arc::new(FakeSource::default());
        let (tx, mut rx) = mpsc::channel::<PollEvent>(16);
        let start = Instant::now();
        let handle = spawn(source.clone(), Duration::from_millis(10_000), false, tx);

        let mut offsets = Vec::new();
        for _ in 0..3 {
            let event = rx.recv().await.unwrap();
            assert!(matches!(event, PollEvent::Playlist(ref e) if e.len() == 1));
            offsets.push(start.elapsed().as_millis());
        }

        assert_eq!(offsets, vec![0, 10_000, 20_000]);
        assert_eq!(source.playlist_calls(), 3);
        assert_eq!(source.current_calls.load(Ordering::SeqCst), 0);
        handle.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn failed_fetch_does_not_stop_polling() {
        let source = Arc::new(FakeSource::default());
        source.failing.store(true, Ordering::SeqCst);
        let (tx, mut rx) = mpsc::channel::<PollEvent>(16);
        let handle = spawn(source.clone(), Duration::from_secs(10), false, tx);

        match rx.recv().await.unwrap() {
            PollEvent::PlaylistFailed(msg) => assert!(msg.contains("mpv is gone")),
            other => panic!("unexpected event: {other:?}"),
        }

        source.failing.store(false, Ordering::SeqCst);
        assert!(matches!(rx.recv().await.unwrap(), PollEvent::Playlist(_)));
        assert_eq!(source.playlist_calls(), 2);
        handle.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn current_info_is_fetched_alongside_when_enabled() {
        let source = Arc::new(FakeSource::default());
        let (tx, mut rx) = mpsc::channel::<PollEvent>(16);
        let handle = spawn(source.clone(), Duration::from_secs(10), true, tx);

        let mut got_playlist = false;
        let mut got_current = false;
        for _ in 0..2 {
            match rx.recv().await.unwrap() {
                PollEvent::Playlist(_) => got_playlist = true,
                PollEvent::Current(info) => {
                    assert_eq!(info.progress(), Some(0.5));
                    got_current = true;
                }
                other => panic!("unexpected event: {other:?}"),
            }
        }
        assert!(got_playlist && got_current);
        handle.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn stops_once_receiver_is_dropped() {
        let source = Arc::new(FakeSource::default());
        let (tx, rx) = mpsc::channel::<PollEvent>(16);
        drop(rx);

        let handle = spawn(source.clone(), Duration::from_secs(10), false, tx);
        tokio::time::timeout(Duration::from_secs(60), handle)
            .await
            .expect("poller should stop")
            .unwrap();
        assert_eq!(source.playlist_calls(), 0);
    }

    #[tokio::test]
    async fn manual_poll_sends_one_round() {
        let source = Arc::new(FakeSource::default());
        let (tx, mut rx) = mpsc::channel::<PollEvent>(16);

        poll_once(&source, false, &tx);

        assert!(matches!(rx.recv().await.unwrap(), PollEvent::Playlist(_)));
        assert_eq!(source.playlist_calls(), 1);
    }
}

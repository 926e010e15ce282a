use std::sync::{Arc, Mutex, TryLockError};
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use crossterm::event::{Event, EventStream, KeyEventKind};
use futures::StreamExt;
use ratatui::{backend::Backend, Terminal};
use tokio::runtime::Runtime;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use super::action::{handle_key_event, Action};
use super::config::Keybinds;
use super::state::Dashboard;
use crate::metrics::{MetricSnapshot, MetricsSource};

pub type SharedSource = Arc<Mutex<Box<dyn MetricsSource>>>;

/// How long shutdown waits on blocking polls that are still running.
pub const SHUTDOWN_GRACE: Duration = Duration::from_millis(250);

pub fn shared_source(source: impl MetricsSource + 'static) -> SharedSource {
    let boxed: Box<dyn MetricsSource> = Box::new(source);
    Arc::new(Mutex::new(boxed))
}

/// Send `Action::Tick` every `period`. Ticks missed while the loop is busy
/// are dropped rather than bunched up.
pub fn spawn_ticker(tx: UnboundedSender<Action>, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // the first tick completes immediately and the loop already polls on start
        ticker.tick().await;
        loop {
            ticker.tick().await;
            if tx.send(Action::Tick).is_err() {
                break;
            }
        }
    })
}

pub fn translate_event(event: Event, keybinds: &Keybinds) -> Option<Action> {
    match event {
        Event::Key(key) if key.kind == KeyEventKind::Press => handle_key_event(key, keybinds),
        Event::Resize(width, height) => Some(Action::Resize { width, height }),
        _ => None,
    }
}

/// Forward terminal key and resize events as actions.
pub fn spawn_input(tx: UnboundedSender<Action>, keybinds: Keybinds) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut events = EventStream::new();
        while let Some(event) = events.next().await {
            let action = match event {
                Ok(event) => translate_event(event, &keybinds),
                Err(e) => {
                    tracing::warn!("terminal event error: {}", e);
                    None
                }
            };
            if let Some(action) = action {
                if tx.send(action).is_err() {
                    break;
                }
            }
        }
    })
}

fn poll_source(source: &SharedSource) -> Result<MetricSnapshot> {
    let mut guard = match source.try_lock() {
        Ok(guard) => guard,
        Err(TryLockError::WouldBlock) => {
            return Err(anyhow!("source is still busy with an earlier poll"))
        }
        Err(TryLockError::Poisoned(_)) => return Err(anyhow!("source panicked during a poll")),
    };
    guard.poll()
}

/// Run one poll off the UI task and report the outcome as an action.
pub fn spawn_poll(source: SharedSource, tx: UnboundedSender<Action>, timeout: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let started = std::time::Instant::now();
        let task = tokio::task::spawn_blocking(move || poll_source(&source));
        let action = match tokio::time::timeout(timeout, task).await {
            Ok(Ok(Ok(snapshot))) => {
                tracing::debug!(
                    "poll returned {} rows in {:?}",
                    snapshot.len(),
                    started.elapsed()
                );
                Action::SnapshotReady(snapshot)
            }
            Ok(Ok(Err(e))) => Action::PollFailed(format!("{:#}", e)),
            Ok(Err(e)) => Action::PollFailed(format!("poll task failed: {}", e)),
            Err(_) => Action::PollFailed(format!("timed out after {}ms", timeout.as_millis())),
        };
        let _ = tx.send(action);
    })
}

pub fn build_runtime() -> Result<Runtime> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")
}

/// Stop the runtime. A poll stuck inside the source is left behind after
/// `SHUTDOWN_GRACE` instead of holding the process open.
pub fn shutdown_runtime(runtime: Runtime) {
    runtime.shutdown_timeout(SHUTDOWN_GRACE);
}

fn draw<B: Backend>(terminal: &mut Terminal<B>, dashboard: &mut Dashboard) -> Result<()> {
    terminal
        .draw(|frame| dashboard.draw(frame.buffer_mut()))
        .context("Failed to draw frame")?;
    Ok(())
}

/// The single consumer: applies every action to the dashboard and redraws.
///
/// Returns once a quit action has been applied.
pub async fn run<B: Backend>(
    terminal: &mut Terminal<B>,
    dashboard: &mut Dashboard,
    source: SharedSource,
    tx: UnboundedSender<Action>,
    rx: &mut UnboundedReceiver<Action>,
) -> Result<()> {
    let timeout = Duration::from_millis(dashboard.config.ui.poll_timeout_ms);
    if dashboard.begin_poll() {
        spawn_poll(source.clone(), tx.clone(), timeout);
    }
    draw(terminal, dashboard)?;

    while dashboard.running {
        let Some(action) = rx.recv().await else {
            tracing::warn!("action channel closed");
            break;
        };
        let redraw = match action {
            Action::Tick => {
                if dashboard.begin_poll() {
                    spawn_poll(source.clone(), tx.clone(), timeout);
                }
                false
            }
            other => dashboard.apply(other),
        };
        if redraw && dashboard.running {
            draw(terminal, dashboard)?;
        }
    }

    tracing::info!("event loop stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::MetricRow;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use tokio::sync::mpsc;

    struct FixedSource(usize);

    impl MetricsSource for FixedSource {
        fn poll(&mut self) -> Result<MetricSnapshot> {
            Ok(MetricSnapshot::new(
                (0..self.0).map(|i| MetricRow::new(format!("p{}", i))).collect(),
            ))
        }
    }

    struct FailingSource;

    impl MetricsSource for FailingSource {
        fn poll(&mut self) -> Result<MetricSnapshot> {
            anyhow::bail!("metrics API unavailable")
        }
    }

    struct SlowSource(Duration);

    impl MetricsSource for SlowSource {
        fn poll(&mut self) -> Result<MetricSnapshot> {
            std::thread::sleep(self.0);
            Ok(MetricSnapshot::default())
        }
    }

    #[test]
    fn test_translate_event() {
        let keybinds = Keybinds::default();
        let key = Event::Key(KeyEvent::new(KeyCode::Char('j'), KeyModifiers::NONE));
        assert!(matches!(translate_event(key, &keybinds), Some(Action::ScrollDown)));
        assert!(matches!(
            translate_event(Event::Resize(80, 24), &keybinds),
            Some(Action::Resize {
                width: 80,
                height: 24
            })
        ));
        assert!(translate_event(Event::FocusGained, &keybinds).is_none());
    }

    #[test]
    fn test_key_release_ignored() {
        let keybinds = Keybinds::default();
        let mut key = KeyEvent::new(KeyCode::Char('q'), KeyModifiers::NONE);
        key.kind = KeyEventKind::Release;
        assert!(translate_event(Event::Key(key), &keybinds).is_none());
    }

    #[tokio::test]
    async fn test_poll_reports_snapshot() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        spawn_poll(shared_source(FixedSource(3)), tx, Duration::from_secs(5));
        match rx.recv().await {
            Some(Action::SnapshotReady(snapshot)) => assert_eq!(snapshot.len(), 3),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_poll_reports_failure() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        spawn_poll(shared_source(FailingSource), tx, Duration::from_secs(5));
        match rx.recv().await {
            Some(Action::PollFailed(msg)) => assert!(msg.contains("metrics API unavailable")),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_hung_poll_times_out_and_next_poll_sees_busy_source() {
        let source = shared_source(SlowSource(Duration::from_millis(300)));
        let (tx, mut rx) = mpsc::unbounded_channel();
        spawn_poll(source.clone(), tx.clone(), Duration::from_millis(20));
        match rx.recv().await {
            Some(Action::PollFailed(msg)) => assert!(msg.contains("timed out")),
            other => panic!("unexpected {:?}", other),
        }

        spawn_poll(source, tx, Duration::from_secs(5));
        match rx.recv().await {
            Some(Action::PollFailed(msg)) => assert!(msg.contains("busy")),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_shutdown_leaves_hung_poll_behind() {
        let runtime = build_runtime().unwrap();
        let source = shared_source(SlowSource(Duration::from_secs(3)));
        let started = std::time::Instant::now();
        runtime.block_on(async {
            let (tx, mut rx) = mpsc::unbounded_channel();
            spawn_poll(source, tx, Duration::from_millis(20));
            match rx.recv().await {
                Some(Action::PollFailed(msg)) => assert!(msg.contains("timed out")),
                other => panic!("unexpected {:?}", other),
            }
        });
        shutdown_runtime(runtime);
        assert!(started.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test]
    async fn test_ticker_sends_ticks() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let handle = spawn_ticker(tx, Duration::from_millis(10));
        assert!(matches!(rx.recv().await, Some(Action::Tick)));
        assert!(matches!(rx.recv().await, Some(Action::Tick)));
        handle.abort();
    }
}

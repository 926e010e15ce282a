use std::collections::VecDeque;
use std::time::Duration;

use anyhow::Result;
use ratatui::{backend::TestBackend, buffer::Buffer, Terminal};
use tokio::sync::mpsc;

use ptop::app::{run, shared_source, Action, Config, Dashboard, LogLevel};
use ptop::metrics::{MetricRow, MetricSnapshot, MetricsSource};
use ptop::ui::components::Scrollable;

/// Plays back a fixed sequence of poll outcomes, then keeps repeating the
/// last good snapshot.
struct ScriptedSource {
    script: VecDeque<Result<MetricSnapshot, String>>,
    last: MetricSnapshot,
}

impl ScriptedSource {
    fn new(script: Vec<Result<MetricSnapshot, String>>) -> Self {
        Self {
            script: script.into(),
            last: MetricSnapshot::default(),
        }
    }
}

impl MetricsSource for ScriptedSource {
    fn poll(&mut self) -> Result<MetricSnapshot> {
        match self.script.pop_front() {
            Some(Ok(snapshot)) => {
                self.last = snapshot.clone();
                Ok(snapshot)
            }
            Some(Err(msg)) => Err(anyhow::anyhow!(msg)),
            None => Ok(self.last.clone()),
        }
    }
}

fn snapshot(names: &[&str]) -> MetricSnapshot {
    MetricSnapshot::new(
        names
            .iter()
            .map(|n| {
                MetricRow::new(*n)
                    .with_cpu(500, 25.0)
                    .with_memory(128 * 1024 * 1024, 40.0)
            })
            .collect(),
    )
}

fn screen_text(buf: &Buffer) -> String {
    let mut out = String::new();
    for y in 0..buf.area.height {
        for x in 0..buf.area.width {
            out.push_str(buf[(x, y)].symbol());
        }
        out.push('\n');
    }
    out
}

async fn pause() {
    tokio::time::sleep(Duration::from_millis(150)).await;
}

#[tokio::test]
async fn test_refresh_cycle_with_failure_and_shrink() {
    let mut terminal = Terminal::new(TestBackend::new(120, 36)).unwrap();
    let mut dashboard = Dashboard::new(Config::default());
    let (tx, mut rx) = mpsc::unbounded_channel();
    let source = shared_source(ScriptedSource::new(vec![
        Ok(snapshot(&["api", "db", "cache", "worker", "proxy"])),
        Err("metrics API unavailable".to_string()),
        Ok(snapshot(&["api", "db"])),
    ]));

    let driver_tx = tx.clone();
    let driver = async move {
        pause().await;
        driver_tx.send(Action::ScrollDown).unwrap();
        driver_tx.send(Action::ScrollDown).unwrap();
        driver_tx.send(Action::ScrollDown).unwrap();
        driver_tx.send(Action::Tick).unwrap();
        pause().await;
        driver_tx.send(Action::Tick).unwrap();
        pause().await;
        driver_tx.send(Action::Quit).unwrap();
    };

    let (result, ()) = tokio::join!(
        run(&mut terminal, &mut dashboard, source, tx, &mut rx),
        driver
    );
    result.unwrap();

    assert!(!dashboard.running);
    assert_eq!(dashboard.resources().rows().len(), 2);
    assert_eq!(dashboard.resources().selected(), Some(1));
    assert_eq!(dashboard.cpu_gauges().selected(), Some(1));
    assert!(dashboard.last_error.is_none());
    assert!(dashboard
        .logs
        .iter()
        .any(|e| e.level == LogLevel::Error && e.message.contains("metrics API unavailable")));
    assert_eq!(dashboard.plot().slot_of("api"), Some(0));
    assert_eq!(dashboard.plot().slot_of("proxy"), Some(4));

    let text = screen_text(terminal.backend().buffer());
    assert!(text.contains("Processes"));
    assert!(text.contains("(2 rows)"));
}

#[tokio::test]
async fn test_failing_source_keeps_loop_alive() {
    let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
    let mut dashboard = Dashboard::new(Config::default());
    let (tx, mut rx) = mpsc::unbounded_channel();
    let source = shared_source(ScriptedSource::new(vec![Err("connection refused".to_string())]));

    let driver_tx = tx.clone();
    let driver = async move {
        pause().await;
        driver_tx.send(Action::ScrollDown).unwrap();
        driver_tx.send(Action::Resize {
            width: 100,
            height: 30,
        })
        .unwrap();
        pause().await;
        driver_tx.send(Action::Quit).unwrap();
    };

    let (result, ()) = tokio::join!(
        run(&mut terminal, &mut dashboard, source, tx, &mut rx),
        driver
    );
    result.unwrap();

    assert_eq!(dashboard.resources().selected(), None);
    assert_eq!(dashboard.last_error.as_deref(), Some("connection refused"));
    let text = screen_text(terminal.backend().buffer());
    assert!(text.contains("poll failed: connection refused"));
}

#[tokio::test]
async fn test_hung_source_does_not_block_input() {
    struct HungSource;

    impl MetricsSource for HungSource {
        fn poll(&mut self) -> Result<MetricSnapshot> {
            std::thread::sleep(Duration::from_millis(400));
            Ok(MetricSnapshot::default())
        }
    }

    let mut config = Config::default();
    config.ui.poll_timeout_ms = 50;
    let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
    let mut dashboard = Dashboard::new(config);
    let (tx, mut rx) = mpsc::unbounded_channel();

    let driver_tx = tx.clone();
    let driver = async move {
        driver_tx.send(Action::FocusNext).unwrap();
        pause().await;
        driver_tx.send(Action::Quit).unwrap();
    };

    let started = std::time::Instant::now();
    let (result, ()) = tokio::join!(
        run(&mut terminal, &mut dashboard, shared_source(HungSource), tx, &mut rx),
        driver
    );
    result.unwrap();

    assert!(started.elapsed() < Duration::from_millis(400));
    assert!(dashboard.last_error.as_deref().unwrap_or("").contains("timed out"));
    assert!(!dashboard.poll_in_flight);
}

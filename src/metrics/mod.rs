pub mod process;

pub use process::ProcessSource;

use anyhow::Result;

/// Usage of one monitored entity at the time of a poll.
///
/// Percentages are relative to the entity's capacity as computed by the
/// source. They may exceed 100 and, for broken sources, may not be finite.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetricRow {
    pub name: String,
    pub cpu_millicores: u64,
    pub cpu_percent: f64,
    pub mem_bytes: u64,
    pub mem_percent: f64,
    pub namespace: Option<String>,
    pub node: Option<String>,
    pub status: Option<String>,
    pub age: Option<String>,
    pub restarts: Option<u32>,
    pub ready: Option<u32>,
    pub total: Option<u32>,
}

impl MetricRow {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_cpu(mut self, millicores: u64, percent: f64) -> Self {
        self.cpu_millicores = millicores;
        self.cpu_percent = percent;
        self
    }

    pub fn with_memory(mut self, bytes: u64, percent: f64) -> Self {
        self.mem_bytes = bytes;
        self.mem_percent = percent;
        self
    }

    pub fn mem_mebibytes(&self) -> u64 {
        self.mem_bytes / (1024 * 1024)
    }
}

/// One atomic read of every monitored entity, in display order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetricSnapshot {
    pub rows: Vec<MetricRow>,
}

impl MetricSnapshot {
    pub fn new(rows: Vec<MetricRow>) -> Self {
        Self { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Anything that can produce a fresh snapshot on request.
///
/// `poll` may block; the event loop runs it off the UI task.
pub trait MetricsSource: Send {
    fn poll(&mut self) -> Result<MetricSnapshot>;
}

/// Map a percentage to something safe to draw. `None` means the value was
/// malformed (NaN, infinite or negative).
pub fn sanitize_percent(percent: f64) -> Option<f64> {
    if percent.is_finite() && percent >= 0.0 {
        Some(percent)
    } else {
        None
    }
}

/// `usage / capacity * 100`, or NaN when capacity is zero.
pub fn percent_of(usage: f64, capacity: f64) -> f64 {
    if capacity > 0.0 {
        usage / capacity * 100.0
    } else {
        f64::NAN
    }
}

use anyhow::Result;
use sysinfo::System;

use super::{percent_of, MetricRow, MetricSnapshot, MetricsSource};
use crate::app::config::{SortKey, SourceConfig};

/// Raw per-process numbers, decoupled from sysinfo so the row building can be
/// tested on its own.
#[derive(Debug, Clone)]
pub struct ProcessSample {
    pub pid: u32,
    pub name: String,
    /// Percent of a single core, as sysinfo reports it.
    pub cpu_usage: f32,
    pub memory: u64,
    pub status: String,
    pub run_time_secs: u64,
}

/// Reports the heaviest processes of the local host.
pub struct ProcessSource {
    sys: System,
    max_rows: usize,
    sort: SortKey,
}

impl ProcessSource {
    pub fn new(config: &SourceConfig) -> Self {
        Self {
            sys: System::new_all(),
            max_rows: config.max_rows,
            sort: config.sort,
        }
    }
}

impl MetricsSource for ProcessSource {
    fn poll(&mut self) -> Result<MetricSnapshot> {
        self.sys.refresh_all();

        let cpu_count = self.sys.cpus().len();
        let total_memory = self.sys.total_memory();
        if total_memory == 0 {
            anyhow::bail!("host reported zero total memory");
        }

        let samples: Vec<ProcessSample> = self
            .sys
            .processes()
            .values()
            .map(|p| ProcessSample {
                pid: p.pid().as_u32(),
                name: p.name().to_string_lossy().into_owned(),
                cpu_usage: p.cpu_usage(),
                memory: p.memory(),
                status: p.status().to_string(),
                run_time_secs: p.run_time(),
            })
            .collect();

        let rows = build_rows(samples, cpu_count, total_memory, self.max_rows, self.sort);
        tracing::debug!("polled {} processes", rows.len());
        Ok(MetricSnapshot::new(rows))
    }
}

/// Keep the `max_rows` biggest processes by memory, then order them by `sort`.
pub fn build_rows(
    mut samples: Vec<ProcessSample>,
    cpu_count: usize,
    total_memory: u64,
    max_rows: usize,
    sort: SortKey,
) -> Vec<MetricRow> {
    samples.sort_by(|a, b| b.memory.cmp(&a.memory).then(a.pid.cmp(&b.pid)));
    samples.truncate(max_rows);

    let core_capacity = cpu_count as f64 * 100.0;
    let mut rows: Vec<MetricRow> = samples
        .into_iter()
        .map(|s| {
            let millicores = (s.cpu_usage.max(0.0) as f64 * 10.0).round() as u64;
            let mut row = MetricRow::new(format!("{}:{}", s.name, s.pid))
                .with_cpu(millicores, percent_of(s.cpu_usage as f64, core_capacity))
                .with_memory(s.memory, percent_of(s.memory as f64, total_memory as f64));
            row.status = Some(s.status);
            row.age = Some(format_age(s.run_time_secs));
            row
        })
        .collect();

    match sort {
        SortKey::Name => rows.sort_by(|a, b| a.name.cmp(&b.name)),
        SortKey::Cpu => rows.sort_by(|a, b| b.cpu_millicores.cmp(&a.cpu_millicores)),
        SortKey::Memory => rows.sort_by(|a, b| b.mem_bytes.cmp(&a.mem_bytes)),
    }
    rows
}

/// Short age in the style of `kubectl get`: `45s`, `12m`, `3h`, `9d`.
pub fn format_age(secs: u64) -> String {
    match secs {
        s if s < 60 => format!("{}s", s),
        s if s < 3600 => format!("{}m", s / 60),
        s if s < 86_400 => format!("{}h", s / 3600),
        s => format!("{}d", s / 86_400),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(pid: u32, name: &str, cpu: f32, memory: u64) -> ProcessSample {
        ProcessSample {
            pid,
            name: name.to_string(),
            cpu_usage: cpu,
            memory,
            status: "Run".to_string(),
            run_time_secs: 90,
        }
    }

    #[test]
    fn test_build_rows_keeps_biggest_and_sorts_by_name() {
        let samples = vec![
            sample(1, "zsh", 1.0, 100),
            sample(2, "init", 0.0, 10),
            sample(3, "cargo", 50.0, 400),
            sample(4, "bash", 2.0, 300),
        ];
        let rows = build_rows(samples, 2, 1000, 3, SortKey::Name);
        let names: Vec<&str> = rows.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["bash:4", "cargo:3", "zsh:1"]);
    }

    #[test]
    fn test_build_rows_percentages() {
        let rows = build_rows(vec![sample(7, "cargo", 150.0, 250)], 4, 1000, 10, SortKey::Name);
        let row = &rows[0];
        assert_eq!(row.cpu_millicores, 1500);
        assert!((row.cpu_percent - 37.5).abs() < 1e-9);
        assert!((row.mem_percent - 25.0).abs() < 1e-9);
        assert_eq!(row.age.as_deref(), Some("1m"));
        assert_eq!(row.status.as_deref(), Some("Run"));
    }

    #[test]
    fn test_build_rows_without_cpus_marks_cpu_malformed() {
        let rows = build_rows(vec![sample(1, "a", 5.0, 1)], 0, 10, 10, SortKey::Name);
        assert!(rows[0].cpu_percent.is_nan());
    }

    #[test]
    fn test_build_rows_sort_by_cpu() {
        let samples = vec![sample(1, "a", 1.0, 5), sample(2, "b", 9.0, 5)];
        let rows = build_rows(samples, 1, 10, 10, SortKey::Cpu);
        assert_eq!(rows[0].name, "b:2");
    }

    #[test]
    fn test_format_age() {
        assert_eq!(format_age(5), "5s");
        assert_eq!(format_age(600), "10m");
        assert_eq!(format_age(7200), "2h");
        assert_eq!(format_age(3 * 86_400 + 5), "3d");
    }
}

use sysinfo::{Disks, System};

use super::types::{SystemStats, Worker};

const UNKNOWN_HOST: &str = "Unknown";

impl Worker {
    /// Refreshes the host counters and reports them with this worker's
    /// stored task count.
    pub fn collect_stats(&mut self) -> SystemStats {
        self.sysinfo.refresh_all();
        let disks = Disks::new_with_refreshed_list();
        SystemStats::capture(&self.sysinfo, &disks, self.task_count())
    }
}

impl SystemStats {
    fn capture(host: &System, disks: &Disks, task_count: u64) -> Self {
        let volumes = disks
            .iter()
            .map(|disk| (disk.total_space(), disk.available_space()));

        SystemStats {
            cpu_usage: round2(host.global_cpu_usage()),
            total_memory: bytes_to_mb(host.total_memory()),
            used_memory: bytes_to_mb(host.used_memory()),
            total_swap: bytes_to_mb(host.total_swap()),
            used_swap: bytes_to_mb(host.used_swap()),
            system_name: System::name().unwrap_or_else(|| UNKNOWN_HOST.to_string()),
            hostname: System::host_name().unwrap_or_else(|| UNKNOWN_HOST.to_string()),
            total_cpus: host.cpus().len() as u64,
            disk_usage: round2(used_percent(volumes)),
            task_count,
        }
    }
}

fn bytes_to_mb(bytes: u64) -> u64 {
    bytes >> 20
}

fn round2(value: f32) -> f32 {
    (value * 100.0).round() / 100.0
}

/// Percentage of space in use across `(total, available)` volumes.
fn used_percent(volumes: impl Iterator<Item = (u64, u64)>) -> f32 {
    let (total, used) = volumes.fold((0u64, 0u64), |(total, used), (size, free)| {
        (
            total.saturating_add(size),
            used.saturating_add(size.saturating_sub(free)),
        )
    });

    if total == 0 {
        return 0.0;
    }
    (used as f64 / total as f64 * 100.0) as f32
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        tasks::types::{State, Task},
        worker::worker::tests::FakeRuntime,
    };

    #[test]
    fn stats_report_stored_task_count() {
        let mut worker = Worker::new("stats", Arc::new(FakeRuntime::default()));
        worker.db.put(Task::new("a", "img"));
        worker.db.put(Task::new("b", "img").into_intent(State::Scheduled));

        let stats = worker.collect_stats();
        assert_eq!(stats.task_count, 2);
        assert!(stats.used_memory <= stats.total_memory);
        assert!((0.0..=100.0).contains(&stats.disk_usage));
    }

    #[test]
    fn disk_usage_sums_all_volumes() {
        let volumes = [(100, 50), (300, 50)];
        assert_eq!(used_percent(volumes.into_iter()), 75.0);
    }

    #[test]
    fn disk_usage_without_volumes_is_zero() {
        assert_eq!(used_percent(std::iter::empty()), 0.0);
        assert_eq!(used_percent([(0, 0)].into_iter()), 0.0);
    }

    #[test]
    fn memory_is_reported_in_whole_megabytes() {
        assert_eq!(bytes_to_mb(3 * 1024 * 1024 + 17), 3);
        assert_eq!(round2(12.3456), 12.35);
    }
}

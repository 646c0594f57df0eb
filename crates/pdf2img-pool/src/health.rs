use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;
use std::time::Duration;
use sysinfo::System;
use tokio::sync::Mutex;
use tracing::warn;

/// CPU/memory thresholds (spec.md §4.2), reconfigurable at runtime.
#[derive(Debug, Clone, Copy)]
pub struct HealthThresholds {
    pub cpu_pct_max: f32,
    pub mem_pct_max: f32,
}

impl Default for HealthThresholds {
    fn default() -> Self {
        Self {
            cpu_pct_max: 85.0,
            mem_pct_max: 85.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct HealthMetrics {
    pub cpu_pct: f32,
    pub mem_pct: f32,
    pub process_rss_mb: u64,
}

#[derive(Debug, Clone)]
pub struct HealthStatus {
    pub healthy: bool,
    pub reasons: Vec<String>,
    pub metrics: HealthMetrics,
}

/// Samples system CPU and memory utilization (spec.md §4.2). Grounded on
/// `riptide-core::pdf::processor::PdfiumProcessor::get_memory_usage`
/// (psutil RSS on unix, sysinfo fallback) and
/// `riptide-api::health::HealthChecker`'s overall-healthy-iff-every-
/// dimension-healthy pattern.
pub struct HealthMonitor {
    sys: Mutex<System>,
    thresholds: RwLock<HealthThresholds>,
    warmed_up: AtomicBool,
}

impl HealthMonitor {
    pub fn new(thresholds: HealthThresholds) -> Self {
        Self {
            sys: Mutex::new(System::new()),
            thresholds: RwLock::new(thresholds),
            warmed_up: AtomicBool::new(false),
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(HealthThresholds::default())
    }

    pub fn set_thresholds(&self, thresholds: HealthThresholds) {
        *self.thresholds.write().unwrap_or_else(|e| e.into_inner()) = thresholds;
    }

    pub fn thresholds(&self) -> HealthThresholds {
        *self.thresholds.read().unwrap_or_else(|e| e.into_inner())
    }

    /// Cheap enough to call on every request entry: a single refresh of
    /// already-open counters, with a one-time ~100ms warm-up on first
    /// call so the first CPU reading isn't meaningless (sysinfo needs two
    /// samples to compute a delta).
    pub async fn check(&self) -> HealthStatus {
        let thresholds = self.thresholds();
        let mut sys = self.sys.lock().await;

        if !self.warmed_up.swap(true, Ordering::AcqRel) {
            sys.refresh_cpu_usage();
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        sys.refresh_cpu_usage();
        sys.refresh_memory();

        let cpu_pct = sys.global_cpu_usage();
        let total_mem = sys.total_memory().max(1);
        let mem_pct = (sys.used_memory() as f64 / total_mem as f64 * 100.0) as f32;
        drop(sys);

        let process_rss_mb = process_rss_mb();

        let mut reasons = Vec::new();
        if cpu_pct > thresholds.cpu_pct_max {
            reasons.push(format!(
                "CPU {cpu_pct:.1}% exceeds threshold {:.1}%",
                thresholds.cpu_pct_max
            ));
        }
        if mem_pct > thresholds.mem_pct_max {
            reasons.push(format!(
                "memory {mem_pct:.1}% exceeds threshold {:.1}%",
                thresholds.mem_pct_max
            ));
        }

        HealthStatus {
            healthy: reasons.is_empty(),
            reasons,
            metrics: HealthMetrics {
                cpu_pct,
                mem_pct,
                process_rss_mb,
            },
        }
    }
}

/// Process-level resident set size, for informational metrics only (the
/// admission decision itself is system-wide CPU/memory per spec.md
/// §4.2). Failure here is logged and folds into a `0` reading rather than
/// aborting the health check.
fn process_rss_mb() -> u64 {
    #[cfg(unix)]
    {
        match psutil::process::Process::current() {
            Ok(proc) => match proc.memory_info() {
                Ok(mem) => return mem.rss() / (1024 * 1024),
                Err(e) => warn!(error = %e, "failed reading process memory info"),
            },
            Err(e) => warn!(error = %e, "failed opening current process handle"),
        }
    }
    let mut sys = System::new();
    sys.refresh_memory();
    sys.used_memory() / (1024 * 1024)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unhealthy_when_cpu_threshold_is_near_zero() {
        let monitor = HealthMonitor::new(HealthThresholds {
            cpu_pct_max: -1.0,
            mem_pct_max: 100.0,
        });
        let status = monitor.check().await;
        assert!(!status.healthy);
        assert!(status.reasons.iter().any(|r| r.contains("CPU")));
    }

    #[tokio::test]
    async fn healthy_with_generous_thresholds() {
        let monitor = HealthMonitor::new(HealthThresholds {
            cpu_pct_max: 100.0,
            mem_pct_max: 100.0,
        });
        let status = monitor.check().await;
        assert!(status.healthy);
    }
}

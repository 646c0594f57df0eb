use crate::request_tracker::RequestSummary;
use hdrhistogram::Histogram;
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::sync::Mutex;

/// Request outcome bucket for the count-by-outcome aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    ClientError,
    Timeout,
    Overload,
}

#[derive(Debug, Clone, Default)]
pub struct MetricsSnapshot {
    pub success_count: u64,
    pub client_error_count: u64,
    pub timeout_count: u64,
    pub overload_count: u64,
    pub response_p50_ms: f64,
    pub response_p90_ms: f64,
    pub response_p99_ms: f64,
    pub page_render_p50_ms: f64,
    pub page_render_p99_ms: f64,
    pub range_bytes_total: u64,
    pub range_request_count: u64,
    pub worker_task_count: u64,
    pub worker_avg_exec_ms: f64,
    pub in_flight_current: i64,
    pub in_flight_peak: i64,
}

/// Process-wide aggregate metrics (spec.md §4.6), `Arc`-shared across
/// request handlers the way `riptide-api::resource_manager::ResourceMetrics`
/// shares its atomic counters. Histograms use `hdrhistogram`, matching the
/// percentile-tracking dependency `riptide-fetch` already carries.
pub struct Aggregates {
    success_count: AtomicU64,
    client_error_count: AtomicU64,
    timeout_count: AtomicU64,
    overload_count: AtomicU64,

    response_hist: Mutex<Histogram<u64>>,
    page_render_hist: Mutex<Histogram<u64>>,

    range_bytes_total: AtomicU64,
    range_request_count: AtomicU64,

    worker_task_count: AtomicU64,
    worker_exec_ms_total: AtomicU64,

    in_flight_current: AtomicI64,
    in_flight_peak: AtomicI64,
}

impl Aggregates {
    pub fn new() -> Self {
        Self {
            success_count: AtomicU64::new(0),
            client_error_count: AtomicU64::new(0),
            timeout_count: AtomicU64::new(0),
            overload_count: AtomicU64::new(0),
            response_hist: Mutex::new(Histogram::new_with_bounds(1, 60_000, 3).expect("valid histogram bounds")),
            page_render_hist: Mutex::new(Histogram::new_with_bounds(1, 60_000, 3).expect("valid histogram bounds")),
            range_bytes_total: AtomicU64::new(0),
            range_request_count: AtomicU64::new(0),
            worker_task_count: AtomicU64::new(0),
            worker_exec_ms_total: AtomicU64::new(0),
            in_flight_current: AtomicI64::new(0),
            in_flight_peak: AtomicI64::new(0),
        }
    }

    pub fn enter_in_flight(&self) {
        let current = self.in_flight_current.fetch_add(1, Ordering::AcqRel) + 1;
        self.in_flight_peak.fetch_max(current, Ordering::AcqRel);
    }

    pub fn exit_in_flight(&self) {
        self.in_flight_current.fetch_sub(1, Ordering::AcqRel);
    }

    pub fn record_request(&self, summary: &RequestSummary) {
        let outcome = if summary.success {
            Outcome::Success
        } else {
            match summary.error_kind.as_deref() {
                Some("timeout") => Outcome::Timeout,
                Some("overloaded") | Some("queue_full") => Outcome::Overload,
                _ => Outcome::ClientError,
            }
        };
        match outcome {
            Outcome::Success => self.success_count.fetch_add(1, Ordering::Relaxed),
            Outcome::ClientError => self.client_error_count.fetch_add(1, Ordering::Relaxed),
            Outcome::Timeout => self.timeout_count.fetch_add(1, Ordering::Relaxed),
            Outcome::Overload => self.overload_count.fetch_add(1, Ordering::Relaxed),
        };

        let total_ms = summary.total.as_millis().max(1) as u64;
        let mut hist = self.response_hist.lock().unwrap_or_else(|e| e.into_inner());
        let _ = hist.record(total_ms);
    }

    pub fn record_page_render(&self, render_ms: u64) {
        let mut hist = self.page_render_hist.lock().unwrap_or_else(|e| e.into_inner());
        let _ = hist.record(render_ms.max(1));
    }

    pub fn record_range_fetch(&self, bytes: u64, requests: u64) {
        self.range_bytes_total.fetch_add(bytes, Ordering::Relaxed);
        self.range_request_count.fetch_add(requests, Ordering::Relaxed);
    }

    pub fn record_worker_task(&self, exec_ms: u64) {
        self.worker_task_count.fetch_add(1, Ordering::Relaxed);
        self.worker_exec_ms_total.fetch_add(exec_ms, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let response = self.response_hist.lock().unwrap_or_else(|e| e.into_inner());
        let render = self.page_render_hist.lock().unwrap_or_else(|e| e.into_inner());
        let worker_tasks = self.worker_task_count.load(Ordering::Relaxed);
        let worker_exec_total = self.worker_exec_ms_total.load(Ordering::Relaxed);

        MetricsSnapshot {
            success_count: self.success_count.load(Ordering::Relaxed),
            client_error_count: self.client_error_count.load(Ordering::Relaxed),
            timeout_count: self.timeout_count.load(Ordering::Relaxed),
            overload_count: self.overload_count.load(Ordering::Relaxed),
            response_p50_ms: response.value_at_quantile(0.5) as f64,
            response_p90_ms: response.value_at_quantile(0.9) as f64,
            response_p99_ms: response.value_at_quantile(0.99) as f64,
            page_render_p50_ms: render.value_at_quantile(0.5) as f64,
            page_render_p99_ms: render.value_at_quantile(0.99) as f64,
            range_bytes_total: self.range_bytes_total.load(Ordering::Relaxed),
            range_request_count: self.range_request_count.load(Ordering::Relaxed),
            worker_task_count: worker_tasks,
            worker_avg_exec_ms: if worker_tasks == 0 {
                0.0
            } else {
                worker_exec_total as f64 / worker_tasks as f64
            },
            in_flight_current: self.in_flight_current.load(Ordering::Relaxed),
            in_flight_peak: self.in_flight_peak.load(Ordering::Relaxed),
        }
    }
}

impl Default for Aggregates {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request_tracker::RequestTracker;

    #[test]
    fn records_success_and_failure_counts() {
        let agg = Aggregates::new();
        let ok = RequestTracker::new().finish(true, None);
        let fail = RequestTracker::new().finish(false, Some("invalid_input".to_string()));
        agg.record_request(&ok);
        agg.record_request(&fail);
        let snap = agg.snapshot();
        assert_eq!(snap.success_count, 1);
        assert_eq!(snap.client_error_count, 1);
    }

    #[test]
    fn in_flight_tracks_peak() {
        let agg = Aggregates::new();
        agg.enter_in_flight();
        agg.enter_in_flight();
        assert_eq!(agg.snapshot().in_flight_current, 2);
        assert_eq!(agg.snapshot().in_flight_peak, 2);
        agg.exit_in_flight();
        assert_eq!(agg.snapshot().in_flight_current, 1);
        assert_eq!(agg.snapshot().in_flight_peak, 2);
    }

    #[test]
    fn percentiles_reflect_recorded_durations() {
        let agg = Aggregates::new();
        for ms in [10u64, 20, 30, 100, 500] {
            agg.record_page_render(ms);
        }
        let snap = agg.snapshot();
        assert!(snap.page_render_p50_ms > 0.0);
        assert!(snap.page_render_p99_ms >= snap.page_render_p50_ms);
    }
}

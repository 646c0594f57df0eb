use crate::phase::{Event, Phase};
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing::debug;
use uuid::Uuid;

struct Inner {
    current_phase: Option<(Phase, Instant)>,
    phases: Vec<(Phase, Duration)>,
    events: Vec<(Event, Duration)>,
}

/// Per-request phase/event recorder (spec.md §4.6). Cheap enough to carry
/// through a request's lifetime without measurably affecting latency;
/// all bookkeeping is a short `Mutex`-guarded `Vec` push.
pub struct RequestTracker {
    id: Uuid,
    start: Instant,
    inner: Mutex<Inner>,
}

#[derive(Debug, Clone)]
pub struct RequestSummary {
    pub request_id: Uuid,
    pub success: bool,
    pub error_kind: Option<String>,
    pub total: Duration,
    pub phases: Vec<(Phase, Duration)>,
    pub events: Vec<(Event, Duration)>,
}

impl RequestTracker {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            start: Instant::now(),
            inner: Mutex::new(Inner {
                current_phase: None,
                phases: Vec::new(),
                events: Vec::new(),
            }),
        }
    }

    pub fn request_id(&self) -> Uuid {
        self.id
    }

    /// Closes the previously open phase (if any) and opens `phase`.
    pub fn start_phase(&self, phase: Phase) {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        self.close_current(&mut inner);
        inner.current_phase = Some((phase, Instant::now()));
    }

    /// Closes whatever phase is currently open, if any.
    pub fn end_phase(&self) {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        self.close_current(&mut inner);
    }

    fn close_current(&self, inner: &mut Inner) {
        if let Some((phase, started_at)) = inner.current_phase.take() {
            inner.phases.push((phase, started_at.elapsed()));
        }
    }

    pub fn record_event(&self, event: Event) {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner.events.push((event, self.start.elapsed()));
        debug!(request_id = %self.id, event = event.label(), "request event");
    }

    /// Finalizes the tracker: closes any still-open phase and produces an
    /// immutable summary for the aggregate collector.
    pub fn finish(&self, success: bool, error_kind: Option<String>) -> RequestSummary {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        self.close_current(&mut inner);
        RequestSummary {
            request_id: self.id,
            success,
            error_kind,
            total: self.start.elapsed(),
            phases: inner.phases.clone(),
            events: inner.events.clone(),
        }
    }
}

impl Default for RequestTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phases_accumulate_in_order() {
        let tracker = RequestTracker::new();
        tracker.start_phase(Phase::Validation);
        tracker.start_phase(Phase::Queue);
        tracker.start_phase(Phase::Render);
        let summary = tracker.finish(true, None);
        let labels: Vec<_> = summary.phases.iter().map(|(p, _)| p.label()).collect();
        assert_eq!(labels, vec!["validation", "queue", "render"]);
    }

    #[test]
    fn events_are_recorded_with_relative_timestamps() {
        let tracker = RequestTracker::new();
        tracker.record_event(Event::QueueAcquired);
        tracker.record_event(Event::FirstImageReady);
        let summary = tracker.finish(true, None);
        assert_eq!(summary.events.len(), 2);
        assert_eq!(summary.events[0].0, Event::QueueAcquired);
    }

    #[test]
    fn finish_reports_failure_with_error_kind() {
        let tracker = RequestTracker::new();
        let summary = tracker.finish(false, Some("timeout".to_string()));
        assert!(!summary.success);
        assert_eq!(summary.error_kind.as_deref(), Some("timeout"));
    }
}

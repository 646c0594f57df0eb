use pdf2img_types::{CancelToken, ConvertError};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// Process-wide bounded admission with a FIFO wait queue (spec.md §4.1).
///
/// The FIFO guarantee comes straight from `tokio::sync::Semaphore`
/// (grounded on the same primitive `riptide-api::resource_manager`
/// wraps for its PDF semaphore); `queue_limit` and the distinguished
/// `QueueFull` error are additive behavior this service needs that the
/// teacher's raw semaphore usage doesn't.
pub struct RenderSemaphore {
    semaphore: Arc<Semaphore>,
    max_inflight: usize,
    queue_limit: usize,
    queue_len: AtomicUsize,
}

#[derive(Debug, Clone, Copy)]
pub struct SemaphoreStatus {
    pub max_inflight: usize,
    pub in_flight: usize,
    pub queue_len: usize,
    pub queue_limit: usize,
}

/// Opaque handle granting the right to run one render request. Releases
/// automatically on drop (success, error, cancellation, or panic all
/// unwind through the same `Drop` impl), satisfying the
/// release-exactly-once invariant (spec.md §3, §8 invariant 2).
pub struct Permit {
    _inner: OwnedSemaphorePermit,
    pub wait_ms: u64,
}

impl RenderSemaphore {
    pub fn new(max_inflight: usize, queue_limit: usize) -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(max_inflight)),
            max_inflight,
            queue_limit,
            queue_len: AtomicUsize::new(0),
        }
    }

    /// Defaults to `max(4, cpu_count)` / `100` per spec.md §4.1.
    pub fn with_defaults() -> Self {
        Self::new(num_cpus::get().max(4), 100)
    }

    pub async fn acquire(&self, cancel: &CancelToken) -> Result<Permit, ConvertError> {
        if cancel.is_cancelled() {
            return Err(ConvertError::cancelled());
        }

        // Fast path: a permit is immediately available.
        if let Ok(inner) = self.semaphore.clone().try_acquire_owned() {
            return Ok(Permit {
                _inner: inner,
                wait_ms: 0,
            });
        }

        // Saturated. Enforce the bounded wait queue before actually
        // enqueuing on the semaphore.
        let prev = self.queue_len.fetch_add(1, Ordering::AcqRel);
        if prev >= self.queue_limit {
            self.queue_len.fetch_sub(1, Ordering::AcqRel);
            return Err(ConvertError::queue_full(format!(
                "render queue full ({prev}/{})",
                self.queue_limit
            )));
        }

        let enqueued_at = Instant::now();
        let result = tokio::select! {
            biased;
            acquired = self.semaphore.clone().acquire_owned() => {
                acquired.map_err(|_| ConvertError::renderer_unavailable("semaphore closed"))
            }
            _ = cancel.cancelled() => Err(ConvertError::cancelled()),
        };
        self.queue_len.fetch_sub(1, Ordering::AcqRel);

        result.map(|inner| Permit {
            _inner: inner,
            wait_ms: enqueued_at.elapsed().as_millis() as u64,
        })
    }

    pub fn status(&self) -> SemaphoreStatus {
        let available = self.semaphore.available_permits();
        SemaphoreStatus {
            max_inflight: self.max_inflight,
            in_flight: self.max_inflight.saturating_sub(available),
            queue_len: self.queue_len.load(Ordering::Acquire),
            queue_limit: self.queue_limit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn acquire_succeeds_immediately_when_capacity_available() {
        let sem = RenderSemaphore::new(2, 10);
        let cancel = CancelToken::new();
        let permit = sem.acquire(&cancel).await.unwrap();
        assert_eq!(permit.wait_ms, 0);
        assert_eq!(sem.status().in_flight, 1);
    }

    #[tokio::test]
    async fn queue_full_rejects_beyond_limit() {
        let sem = Arc::new(RenderSemaphore::new(1, 0));
        let cancel = CancelToken::new();
        let _held = sem.acquire(&cancel).await.unwrap();
        let err = sem.acquire(&cancel).await.unwrap_err();
        assert_eq!(err.kind, pdf2img_types::ErrorKind::QueueFull);
    }

    #[tokio::test]
    async fn release_happens_on_drop_and_wakes_next_waiter() {
        let sem = Arc::new(RenderSemaphore::new(1, 10));
        let cancel = CancelToken::new();
        let first = sem.acquire(&cancel).await.unwrap();

        let sem2 = sem.clone();
        let cancel2 = cancel.clone();
        let waiter = tokio::spawn(async move { sem2.acquire(&cancel2).await });

        tokio::task::yield_now().await;
        drop(first);

        let second = waiter.await.unwrap().unwrap();
        assert!(second.wait_ms < 1000);
    }

    #[tokio::test]
    async fn cancellation_while_queued_fails_with_cancelled() {
        let sem = Arc::new(RenderSemaphore::new(1, 10));
        let cancel = CancelToken::new();
        let _held = sem.acquire(&cancel).await.unwrap();

        let sem2 = sem.clone();
        let waiter_cancel = CancelToken::new();
        let waiter_cancel2 = waiter_cancel.clone();
        let waiter = tokio::spawn(async move { sem2.acquire(&waiter_cancel2).await });

        tokio::task::yield_now().await;
        waiter_cancel.cancel();

        let err = waiter.await.unwrap().unwrap_err();
        assert_eq!(err.kind, pdf2img_types::ErrorKind::Cancelled);
    }
}

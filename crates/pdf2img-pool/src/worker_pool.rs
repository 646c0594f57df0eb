use pdf2img_rasterize::{create_rasterizer, AnyRasterizer, Rasterizer};
use pdf2img_types::{ConvertError, ErrorKind, PageResult, Task};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

#[derive(Debug, Clone)]
pub struct WorkerPoolConfig {
    pub worker_count: usize,
    pub idle_timeout: Duration,
    pub queue_capacity: usize,
}

impl Default for WorkerPoolConfig {
    fn default() -> Self {
        Self {
            worker_count: num_cpus::get().max(2),
            idle_timeout: Duration::from_secs(30),
            queue_capacity: 1024,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct WorkerStats {
    pub workers: usize,
    pub queued: usize,
    pub completed: u64,
    pub utilization: f32,
}

struct Envelope {
    task: Task,
    reply: oneshot::Sender<PageResult>,
}

#[derive(Default)]
struct PoolCounters {
    completed: AtomicU64,
    busy: AtomicUsize,
    queued: AtomicUsize,
}

/// Bounded pool of CPU-bound rasterization workers (spec.md §4.3). The
/// queue is single-producer/multiple-consumer from the dispatcher's
/// perspective (spec.md §5): one `mpsc` channel, its receiver shared
/// across `worker_count` tasks behind a `tokio::sync::Mutex`, so each
/// worker pulls the next task FIFO rather than owning a private queue.
pub struct WorkerPool {
    tx: Mutex<Option<mpsc::Sender<Envelope>>>,
    handles: Mutex<Vec<JoinHandle<()>>>,
    counters: Arc<PoolCounters>,
    config: WorkerPoolConfig,
    rasterizer: AnyRasterizer,
}

impl WorkerPool {
    pub fn new(config: WorkerPoolConfig) -> Arc<Self> {
        Self::new_with_rasterizer(config, create_rasterizer())
    }

    /// Constructs a pool wired to an explicit rasterizer — how tests
    /// swap the production engine for a double without touching the
    /// dispatcher (spec.md §9).
    pub fn new_with_rasterizer(config: WorkerPoolConfig, rasterizer: AnyRasterizer) -> Arc<Self> {
        let (tx, rx) = mpsc::channel(config.queue_capacity);
        let rx = Arc::new(Mutex::new(rx));
        let counters = Arc::new(PoolCounters::default());

        let mut handles = Vec::with_capacity(config.worker_count);
        for worker_id in 0..config.worker_count {
            let rx = rx.clone();
            let rasterizer = rasterizer.clone();
            let counters = counters.clone();
            handles.push(tokio::spawn(worker_loop(worker_id, rx, rasterizer, counters)));
        }

        Arc::new(Self {
            tx: Mutex::new(Some(tx)),
            handles: Mutex::new(handles),
            counters,
            config,
            rasterizer,
        })
    }

    /// Total page count of `input`, used by the dispatcher's `All` and
    /// `FirstN` plans and to filter out-of-range `Explicit` pages
    /// (spec.md §4.3). Runs on a blocking thread like any other
    /// rasterizer call, but bypasses the task queue since it's a single
    /// cheap metadata read rather than a render+encode pass.
    pub async fn page_count(&self, input: Arc<pdf2img_types::PdfInput>) -> Result<usize, ConvertError> {
        if !self.rasterizer.is_available() {
            return Err(ConvertError::renderer_unavailable("rasterizer unavailable"));
        }
        let rasterizer = self.rasterizer.clone();
        tokio::task::spawn_blocking(move || rasterizer.page_count(&input))
            .await
            .map_err(|e| ConvertError::renderer_unavailable(format!("page_count task panicked: {e}")))?
    }

    /// Enqueues a task; resolves once a worker has produced (or failed
    /// to produce) a `PageResult`.
    pub async fn submit(&self, task: Task) -> PageResult {
        let page_num = task.page_num;
        let (reply_tx, reply_rx) = oneshot::channel();
        let send_result = {
            let guard = self.tx.lock().await;
            match guard.as_ref() {
                Some(tx) => {
                    self.counters.queued.fetch_add(1, Ordering::AcqRel);
                    tx.send(Envelope { task, reply: reply_tx }).await
                }
                None => {
                    return PageResult::failure(
                        page_num,
                        ErrorKind::Cancelled,
                        "worker pool is shut down",
                        0,
                    );
                }
            }
        };

        if send_result.is_err() {
            return PageResult::failure(page_num, ErrorKind::Cancelled, "worker pool closed", 0);
        }

        match reply_rx.await {
            Ok(result) => result,
            Err(_) => PageResult::failure(
                page_num,
                ErrorKind::RendererUnavailable,
                "worker task dropped its reply channel (likely panicked)",
                0,
            ),
        }
    }

    pub fn stats(&self) -> WorkerStats {
        let busy = self.counters.busy.load(Ordering::Acquire);
        WorkerStats {
            workers: self.config.worker_count,
            queued: self.counters.queued.load(Ordering::Acquire),
            completed: self.counters.completed.load(Ordering::Acquire),
            utilization: if self.config.worker_count == 0 {
                0.0
            } else {
                busy as f32 / self.config.worker_count as f32
            },
        }
    }

    /// Stops accepting new tasks and waits (bounded by `idle_timeout`)
    /// for workers to drain. Workers that don't finish in time are
    /// abandoned; their `JoinHandle`s are dropped without being awaited
    /// further (spec.md §4.3 `shutdown()`).
    pub async fn shutdown(&self) {
        self.tx.lock().await.take();
        let handles = std::mem::take(&mut *self.handles.lock().await);
        let grace = self.config.idle_timeout;
        for handle in handles {
            if tokio::time::timeout(grace, handle).await.is_err() {
                warn!("worker did not finish draining within the shutdown grace period");
            }
        }
    }
}

async fn worker_loop(
    worker_id: usize,
    rx: Arc<Mutex<mpsc::Receiver<Envelope>>>,
    rasterizer: AnyRasterizer,
    counters: Arc<PoolCounters>,
) {
    loop {
        let envelope = {
            let mut guard = rx.lock().await;
            guard.recv().await
        };
        let Some(Envelope { task, reply }) = envelope else {
            debug!(worker_id, "worker pool channel closed, exiting");
            return;
        };
        counters.queued.fetch_sub(1, Ordering::AcqRel);
        counters.busy.fetch_add(1, Ordering::AcqRel);

        let result = render_one(&rasterizer, task).await;

        counters.busy.fetch_sub(1, Ordering::AcqRel);
        counters.completed.fetch_add(1, Ordering::AcqRel);
        let _ = reply.send(result);
    }
}

/// Runs the rasterize-then-encode pipeline for one task on a blocking
/// thread (spec.md §5: render tasks are CPU-bound and must never block a
/// render worker's async runtime thread), mirroring
/// `riptide-core::pdf::processor`'s use of `spawn_blocking` around
/// pdfium calls.
async fn render_one(rasterizer: &AnyRasterizer, task: Task) -> PageResult {
    if !rasterizer.is_available() {
        return PageResult::failure(
            task.page_num,
            ErrorKind::RendererUnavailable,
            "rasterizer unavailable",
            0,
        );
    }

    let page_num = task.page_num;
    let rasterizer = rasterizer.clone();
    let join_result = tokio::task::spawn_blocking(move || -> Result<PageResult, ConvertError> {
        let rendered = rasterizer.render_page(&task.input, task.page_num, &task.options)?;
        let encoded = rasterizer.encode(&rendered, &task.options)?;
        let size_bytes = encoded.bytes.len() as u64;
        Ok(PageResult::success(
            task.page_num,
            rendered.width,
            rendered.height,
            pdf2img_types::PageOutput::Bytes(encoded.bytes),
            size_bytes,
            rendered.render_ms,
            encoded.encode_ms,
        ))
    })
    .await;

    match join_result {
        Ok(Ok(result)) => result,
        Ok(Err(e)) => PageResult::failure(page_num, e.kind, e.message, 0),
        Err(join_err) => {
            error!(error = %join_err, "render worker panicked");
            PageResult::failure(page_num, ErrorKind::PageRenderFailed, "render task panicked", 0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pdf2img_types::{PdfInput, RenderOptions};
    use std::sync::Arc as StdArc;

    fn sample_pdf() -> StdArc<PdfInput> {
        let mut bytes = b"%PDF-1.4\n".to_vec();
        for _ in 0..5 {
            bytes.extend_from_slice(b"/Type/Page\n");
        }
        StdArc::new(PdfInput::BytesOwned(StdArc::new(bytes)))
    }

    fn test_pool(worker_count: usize) -> Arc<WorkerPool> {
        let config = WorkerPoolConfig {
            worker_count,
            idle_timeout: Duration::from_millis(500),
            queue_capacity: 16,
        };
        WorkerPool::new_with_rasterizer(config, create_rasterizer())
    }

    #[tokio::test]
    async fn submit_renders_a_page_successfully() {
        let pool = test_pool(2);
        let task = Task::new(sample_pdf(), 1, RenderOptions::default());
        let result = pool.submit(task).await;
        assert!(result.success, "{:?}", result.error_message);
        assert!(result.width > 0 && result.height > 0);
    }

    #[tokio::test]
    async fn stats_reflect_completed_submissions() {
        let pool = test_pool(2);
        for page in 1..=3 {
            let task = Task::new(sample_pdf(), page, RenderOptions::default());
            let _ = pool.submit(task).await;
        }
        let stats = pool.stats();
        assert_eq!(stats.completed, 3);
        assert_eq!(stats.workers, 2);
    }

    #[tokio::test]
    async fn submit_after_shutdown_fails_with_cancelled() {
        let pool = test_pool(1);
        pool.shutdown().await;
        let task = Task::new(sample_pdf(), 1, RenderOptions::default());
        let result = pool.submit(task).await;
        assert!(!result.success);
        assert_eq!(result.error_kind, Some(ErrorKind::Cancelled));
    }
}

use pdf2img_config::ServiceConfig;
use pdf2img_dispatcher::{Dispatcher, DispatcherConfig};
use pdf2img_pool::{HealthMonitor, HealthThresholds, RenderSemaphore, WorkerPool, WorkerPoolConfig};
use pdf2img_tracker::Aggregates;
use std::sync::Arc;
use std::time::Duration;

/// Shared resources handed to every request handler, the way
/// `riptide-api::state::AppState` bundles its process-wide dependencies
/// behind a cheaply-`Clone`able wrapper.
#[derive(Clone)]
pub struct AppState {
    pub config: ServiceConfig,
    pub semaphore: Arc<RenderSemaphore>,
    pub health: Arc<HealthMonitor>,
    pub pool: Arc<WorkerPool>,
    pub dispatcher: Arc<Dispatcher>,
    pub metrics: Arc<Aggregates>,
    pub started_at: std::time::Instant,
}

impl AppState {
    pub fn new(config: ServiceConfig) -> Self {
        let semaphore = Arc::new(RenderSemaphore::new(config.max_inflight, config.queue_limit));
        let health = Arc::new(HealthMonitor::new(HealthThresholds {
            cpu_pct_max: config.cpu_threshold,
            mem_pct_max: config.memory_threshold,
        }));
        let pool = WorkerPool::new(WorkerPoolConfig {
            worker_count: num_cpus::get().max(2),
            idle_timeout: Duration::from_secs(30),
            queue_capacity: 1024,
        });
        let metrics = Arc::new(Aggregates::new());
        let dispatcher = Arc::new(
            Dispatcher::new(pool.clone(), DispatcherConfig::default()).with_metrics(metrics.clone()),
        );
        Self {
            config,
            semaphore,
            health,
            pool,
            dispatcher,
            metrics,
            started_at: std::time::Instant::now(),
        }
    }

    pub fn uptime(&self) -> Duration {
        self.started_at.elapsed()
    }
}

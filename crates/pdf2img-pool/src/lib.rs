//! Admission control (RenderSemaphore), health sampling (HealthMonitor),
//! and the CPU-bound rendering WorkerPool (spec.md §4.1-4.3).

pub mod health;
pub mod semaphore;
pub mod worker_pool;

pub use health::{HealthMetrics, HealthMonitor, HealthStatus, HealthThresholds};
pub use semaphore::{Permit, RenderSemaphore, SemaphoreStatus};
pub use worker_pool::{WorkerPool, WorkerPoolConfig, WorkerStats};

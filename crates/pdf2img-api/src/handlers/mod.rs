pub mod convert;
pub mod health;
pub mod metrics;
pub mod workers;

pub use convert::convert;
pub use health::health;
pub use metrics::metrics;
pub use workers::workers;

pub mod metrics;
pub mod storage;

pub use metrics::{get_metrics, init_metrics};
pub use storage::DiskStorage;

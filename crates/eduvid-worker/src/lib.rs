//! Video job orchestration.
//!
//! This crate provides:
//! - The per-job pipeline from script to published video
//! - A background executor reporting to an external job tracker
//! - Environment-driven configuration and structured job logging

pub mod config;
pub mod error;
pub mod executor;
pub mod logging;
pub mod pipeline;
pub mod workspace;

pub use config::WorkerConfig;
pub use error::{WorkerError, WorkerResult};
pub use executor::{JobExecutor, JobTracker, JobUpdate, VideoProducer};
pub use logging::{init_tracing, JobLogger};
pub use pipeline::{PreparedJob, VideoPipeline};
pub use workspace::JobWorkspace;

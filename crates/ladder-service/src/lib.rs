//! # ladder-service
//! Ranking service handle and batch scheduling.
//!
//! Composes the ladder-core pieces into a running service:
//! - [`service::RankingService`]: one owned board behind a single `RwLock`,
//!   plus an independently synchronised intake queue
//! - [`batcher::BatchTask`]: cancellable periodic batch applier
//! - [`config::ServiceConfig`]: service configuration

pub mod batcher;
pub mod config;
pub mod service;

pub use batcher::BatchTask;
pub use config::ServiceConfig;
pub use service::RankingService;

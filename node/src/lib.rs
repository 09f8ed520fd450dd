//! Wardpass node — wires the lifecycle engine to storage, notification,
//! and the sweep scheduler, and exposes the request-response facade a
//! transport layer calls.

pub mod config;
pub mod error;
pub mod scheduler;
pub mod service;
pub mod sweeper;

pub use config::NodeConfig;
pub use error::NodeError;
pub use scheduler::spawn_sweep_loop;
pub use service::{IssueRequest, IssueResponse, PassService, VerifyRequest, VerifyResponse};
pub use sweeper::{ExpirySweeper, SweepReport};

//! swarmdeck - a typed control layer and dashboard for Docker Swarm
//!
//! swarmdeck drives the external `docker` CLI, decodes its line-delimited
//! JSON output into typed records, and computes safe state transitions
//! (replica deltas, node availability changes) before issuing mutating
//! commands. On top of that control layer it provides:
//!
//! - A web dashboard (services, nodes, tasks, scale and drain controls)
//! - One-shot CLI subcommands for the same operations
//!
//! The control layer holds no state of its own: every query re-derives
//! truth from the live orchestrator.

pub mod error;
pub mod server;
pub mod swarm;

pub use error::{Result, SwarmError};

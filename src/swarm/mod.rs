//! Typed, fault-tolerant control layer over the Docker Swarm CLI
//!
//! This module invokes external orchestrator commands, decodes their
//! line-delimited JSON output into typed records, and computes safe
//! state transitions before issuing mutating commands.

pub mod availability;
pub mod client;
pub mod command;
pub mod decode;
mod locks;
pub mod node;
pub mod scale;
pub mod service;
pub mod task;

pub use availability::{AvailabilityController, AvailabilityOutcome};
pub use client::SwarmClient;
pub use command::{CommandRunner, DockerCli};
pub use decode::{decode_lines, Decoded};
pub use node::{Node, NodeAvailability, NodeDetail, NodeState};
pub use scale::{Confirmation, Direction, ScaleOutcome, ScalingController};
pub use service::{Service, ServiceMode};
pub use task::Task;

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::command::CommandRunner;
    use crate::error::CommandError;

    /// Scripted command runner: pops queued responses in order and records
    /// every invocation for assertions.
    ///
    /// Each invocation yields once before consuming its response, so callers
    /// that fail to serialize their operations overlap here and show up in
    /// the recorded call order and the in-flight high-water mark.
    pub struct ScriptedRunner {
        responses: Mutex<Vec<Result<String, CommandError>>>,
        calls: Mutex<Vec<Vec<String>>>,
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
    }

    impl ScriptedRunner {
        pub fn new(responses: Vec<Result<String, CommandError>>) -> Self {
            Self {
                responses: Mutex::new(responses),
                calls: Mutex::new(Vec::new()),
                in_flight: AtomicUsize::new(0),
                max_in_flight: AtomicUsize::new(0),
            }
        }

        pub fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }

        pub fn calls(&self) -> Vec<Vec<String>> {
            self.calls.lock().unwrap().clone()
        }

        /// Most invocations ever observed running at the same time
        pub fn max_in_flight(&self) -> usize {
            self.max_in_flight.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl CommandRunner for ScriptedRunner {
        async fn run(&self, args: &[&str]) -> Result<String, CommandError> {
            let live = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(live, Ordering::SeqCst);
            tokio::task::yield_now().await;

            self.calls
                .lock()
                .unwrap()
                .push(args.iter().map(|s| s.to_string()).collect());

            let result = {
                let mut responses = self.responses.lock().unwrap();
                if responses.is_empty() {
                    Err(CommandError::ExecutionFailure {
                        code: Some(1),
                        stderr: "no scripted response".to_string(),
                    })
                } else {
                    responses.remove(0)
                }
            };

            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            result
        }
    }
}

//! Replica scaling for replicated services

use std::sync::Arc;

use tracing::info;

use super::client::SwarmClient;
use super::command::CommandRunner;
use super::decode::Decoded;
use super::locks::TargetLocks;
use super::service::ServiceMode;
use crate::error::{Result, SwarmError};

/// Scaling direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// One replica more
    Up,
    /// One replica fewer
    Down,
}

impl Direction {
    /// Parse an operator-supplied direction string
    pub fn parse(raw: &str) -> Result<Self> {
        match raw {
            "up" => Ok(Direction::Up),
            "down" => Ok(Direction::Down),
            other => Err(SwarmError::InvalidDirection(other.to_string())),
        }
    }
}

/// Whether the orchestrator's textual output named the target entity.
///
/// The orchestrator's own error path is the primary failure signal; an
/// unrecognized but non-erroring output is still a success, but a
/// distinguishable one, since differing tool versions format their
/// confirmation text differently.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    /// Output contained the entity's identifier or name
    Confirmed,
    /// Output was not recognized as a confirmation
    Unconfirmed,
}

/// Result of an accepted scale command
#[derive(Debug, Clone)]
pub struct ScaleOutcome {
    /// Service ID
    pub service_id: String,
    /// Service name
    pub service_name: String,
    /// Desired count before the change (the baseline)
    pub previous: u64,
    /// Replica count issued to the orchestrator
    pub target: u64,
    /// Whether the command output named the service
    pub confirmation: Confirmation,
    /// Raw command output, for operator display
    pub output: String,
}

/// Computes and applies a target replica count for a service.
///
/// Operations on the same service are serialized, so two concurrent
/// requests cannot both derive their baseline from the same stale read and
/// compound non-deterministically.
pub struct ScalingController<R> {
    client: Arc<SwarmClient<R>>,
    locks: TargetLocks,
}

impl<R: CommandRunner> ScalingController<R> {
    /// Create a controller over the given client
    pub fn new(client: Arc<SwarmClient<R>>) -> Self {
        Self {
            client,
            locks: TargetLocks::new(),
        }
    }

    /// Scale a service one step up or down from its desired replica count.
    ///
    /// The baseline is re-read from the orchestrator on every call, under a
    /// per-service lock so concurrent requests cannot derive their baseline
    /// from the same stale read. Command acceptance does not mean all
    /// replicas are running yet.
    pub async fn scale(&self, service_id: &str, direction: &str) -> Result<ScaleOutcome> {
        if service_id.is_empty() {
            return Err(SwarmError::InvalidArgument("service id is required"));
        }
        let direction = Direction::parse(direction)?;

        let lock = self.locks.acquire(service_id).await;
        let result = {
            let _guard = lock.lock().await;
            self.scale_locked(service_id, direction).await
        };
        drop(lock);
        self.locks.prune(service_id).await;

        result
    }

    async fn scale_locked(&self, service_id: &str, direction: Direction) -> Result<ScaleOutcome> {
        let services = self.client.list_services().await?;
        let service = services
            .iter()
            .filter_map(Decoded::record)
            .find(|s| s.id == service_id)
            .ok_or_else(|| SwarmError::ServiceNotFound(service_id.to_string()))?;

        if service.mode != ServiceMode::Replicated {
            return Err(SwarmError::NotScalable(service.name.clone()));
        }

        let baseline =
            service
                .desired_replicas()
                .ok_or_else(|| SwarmError::UnparseableReplicaCount {
                    service: service.name.clone(),
                    raw: service.replicas.clone(),
                })?;

        // Never issue a negative replica count.
        let target = match direction {
            Direction::Up => baseline.saturating_add(1),
            Direction::Down => baseline.saturating_sub(1),
        };

        let spec = format!("{service_id}={target}");
        let output = self
            .client
            .runner()
            .run(&["service", "scale", &spec])
            .await
            .map_err(SwarmError::ScaleCommandFailed)?;

        let confirmation = if output.contains(service_id) || output.contains(&service.name) {
            Confirmation::Confirmed
        } else {
            Confirmation::Unconfirmed
        };

        info!(
            service = %service.name,
            previous = baseline,
            target,
            ?confirmation,
            "scale command accepted"
        );

        Ok(ScaleOutcome {
            service_id: service.id.clone(),
            service_name: service.name.clone(),
            previous: baseline,
            target,
            confirmation,
            output,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CommandError;
    use crate::swarm::testing::ScriptedRunner;

    fn controller(responses: Vec<std::result::Result<String, CommandError>>) -> ScalingController<ScriptedRunner> {
        ScalingController::new(Arc::new(SwarmClient::new(ScriptedRunner::new(responses))))
    }

    fn runner_calls(controller: &ScalingController<ScriptedRunner>) -> Vec<Vec<String>> {
        controller.client.runner().calls()
    }

    #[tokio::test]
    async fn test_scale_up_uses_desired_count_as_baseline() {
        let controller = controller(vec![
            Ok(r#"{"ID":"a1","Name":"web","Mode":"replicated","Replicas":"2/3"}"#.to_string()),
            Ok("web scaled to 4".to_string()),
        ]);

        let outcome = controller.scale("a1", "up").await.unwrap();
        assert_eq!(outcome.previous, 3);
        assert_eq!(outcome.target, 4);
        assert_eq!(outcome.confirmation, Confirmation::Confirmed);

        let calls = runner_calls(&controller);
        assert_eq!(calls[1], ["service", "scale", "a1=4"]);
    }

    #[tokio::test]
    async fn test_end_to_end_single_replica_scale_up() {
        let controller = controller(vec![
            Ok(r#"{"ID":"a1","Name":"web","Mode":"replicated","Replicas":"1/1"}"#.to_string()),
            Ok("a1 scaled to 2".to_string()),
        ]);

        let outcome = controller.scale("a1", "up").await.unwrap();
        assert_eq!(outcome.target, 2);
        assert_eq!(outcome.confirmation, Confirmation::Confirmed);

        let calls = runner_calls(&controller);
        assert_eq!(calls[1], ["service", "scale", "a1=2"]);
    }

    #[tokio::test]
    async fn test_scale_down_clamps_at_zero() {
        let controller = controller(vec![
            Ok(r#"{"ID":"a1","Name":"web","Mode":"replicated","Replicas":"0/0"}"#.to_string()),
            Ok("web scaled to 0".to_string()),
        ]);

        let outcome = controller.scale("a1", "down").await.unwrap();
        assert_eq!(outcome.target, 0);

        let calls = runner_calls(&controller);
        assert_eq!(calls[1], ["service", "scale", "a1=0"]);
    }

    #[tokio::test]
    async fn test_global_service_is_not_scalable() {
        let controller = controller(vec![Ok(
            r#"{"ID":"g1","Name":"agent","Mode":"global","Replicas":"global"}"#.to_string(),
        )]);

        let err = controller.scale("g1", "up").await.unwrap_err();
        assert!(matches!(err, SwarmError::NotScalable(name) if name == "agent"));
        // Only the read happened, no mutating command.
        assert_eq!(controller.client.runner().call_count(), 1);
    }

    #[tokio::test]
    async fn test_unparseable_replica_count() {
        let controller = controller(vec![Ok(
            r#"{"ID":"a1","Name":"web","Mode":"replicated","Replicas":"bad"}"#.to_string(),
        )]);

        let err = controller.scale("a1", "down").await.unwrap_err();
        match err {
            SwarmError::UnparseableReplicaCount { service, raw } => {
                assert_eq!(service, "web");
                assert_eq!(raw, "bad");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_invalid_direction_touches_nothing() {
        let controller = controller(vec![]);

        let err = controller.scale("a1", "sideways").await.unwrap_err();
        assert!(matches!(err, SwarmError::InvalidDirection(d) if d == "sideways"));
        assert_eq!(controller.client.runner().call_count(), 0);
    }

    #[tokio::test]
    async fn test_unknown_service_is_not_found() {
        let controller = controller(vec![Ok(
            r#"{"ID":"a1","Name":"web","Mode":"replicated","Replicas":"1/1"}"#.to_string(),
        )]);

        let err = controller.scale("zz", "up").await.unwrap_err();
        assert!(matches!(err, SwarmError::ServiceNotFound(_)));
    }

    #[tokio::test]
    async fn test_malformed_rows_do_not_hide_the_target() {
        let controller = controller(vec![
            Ok(format!(
                "not json\n{}",
                r#"{"ID":"a1","Name":"web","Mode":"replicated","Replicas":"1/1"}"#
            )),
            Ok("web scaled to 2".to_string()),
        ]);

        let outcome = controller.scale("a1", "up").await.unwrap();
        assert_eq!(outcome.target, 2);
    }

    #[tokio::test]
    async fn test_scale_command_failure_is_surfaced() {
        let controller = controller(vec![
            Ok(r#"{"ID":"a1","Name":"web","Mode":"replicated","Replicas":"1/1"}"#.to_string()),
            Err(CommandError::ExecutionFailure {
                code: Some(1),
                stderr: "no such service".to_string(),
            }),
        ]);

        let err = controller.scale("a1", "up").await.unwrap_err();
        assert!(matches!(err, SwarmError::ScaleCommandFailed(_)));
    }

    #[tokio::test]
    async fn test_concurrent_scales_serialize_per_service() {
        let controller = controller(vec![
            Ok(r#"{"ID":"a1","Name":"web","Mode":"replicated","Replicas":"1/1"}"#.to_string()),
            Ok("a1 scaled to 2".to_string()),
            Ok(r#"{"ID":"a1","Name":"web","Mode":"replicated","Replicas":"1/2"}"#.to_string()),
            Ok("a1 scaled to 3".to_string()),
        ]);

        let (first, second) =
            tokio::join!(controller.scale("a1", "up"), controller.scale("a1", "up"));
        let first = first.unwrap();
        let second = second.unwrap();

        // The second request derives its baseline from the first one's
        // write, not from the same stale read.
        assert_eq!(first.target, 2);
        assert_eq!(second.previous, 2);
        assert_eq!(second.target, 3);

        let calls = runner_calls(&controller);
        assert_eq!(calls.len(), 4);
        assert_eq!(calls[1], ["service", "scale", "a1=2"]);
        assert_eq!(calls[3], ["service", "scale", "a1=3"]);
        assert_eq!(controller.client.runner().max_in_flight(), 1);
    }

    #[tokio::test]
    async fn test_unrecognized_output_is_unconfirmed_success() {
        let controller = controller(vec![
            Ok(r#"{"ID":"a1","Name":"web","Mode":"replicated","Replicas":"1/1"}"#.to_string()),
            Ok("overall progress: 2 out of 2 tasks".to_string()),
        ]);

        let outcome = controller.scale("a1", "up").await.unwrap();
        assert_eq!(outcome.confirmation, Confirmation::Unconfirmed);
    }
}

//! Swarm node records

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Node health, independent of scheduling availability
///
/// `node ls` capitalizes these values while `node inspect` emits them in
/// lowercase; both spellings are accepted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeState {
    /// Node state is unknown
    #[default]
    #[serde(alias = "unknown")]
    Unknown,
    /// Node is down
    #[serde(alias = "down")]
    Down,
    /// Node is ready
    #[serde(alias = "ready")]
    Ready,
    /// Node is disconnected
    #[serde(alias = "disconnected")]
    Disconnected,
}

impl fmt::Display for NodeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match self {
            NodeState::Unknown => "Unknown",
            NodeState::Down => "Down",
            NodeState::Ready => "Ready",
            NodeState::Disconnected => "Disconnected",
        };
        write!(f, "{state}")
    }
}

/// Node availability
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeAvailability {
    /// Node accepts new tasks
    #[default]
    #[serde(alias = "active")]
    Active,
    /// Node accepts no new tasks but keeps running ones
    #[serde(alias = "pause")]
    Pause,
    /// Node is being drained of its tasks
    #[serde(alias = "drain")]
    Drain,
}

impl NodeAvailability {
    /// Parse an operator-supplied availability action.
    ///
    /// Only the closed set `active`, `pause`, `drain` is accepted.
    pub fn parse_action(raw: &str) -> Option<Self> {
        match raw {
            "active" => Some(NodeAvailability::Active),
            "pause" => Some(NodeAvailability::Pause),
            "drain" => Some(NodeAvailability::Drain),
            _ => None,
        }
    }

    /// Value expected by `node update --availability`
    pub fn as_arg(&self) -> &'static str {
        match self {
            NodeAvailability::Active => "active",
            NodeAvailability::Pause => "pause",
            NodeAvailability::Drain => "drain",
        }
    }
}

impl fmt::Display for NodeAvailability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_arg())
    }
}

/// One row of `node ls` output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Node {
    /// Node ID
    #[serde(rename = "ID")]
    pub id: String,
    /// Node hostname
    pub hostname: String,
    /// Node health
    pub status: NodeState,
    /// Scheduling availability
    pub availability: NodeAvailability,
    /// Empty for workers, `Leader` or `Reachable` for managers
    #[serde(default)]
    pub manager_status: String,
    /// Engine version
    #[serde(default)]
    pub engine_version: String,
}

impl Node {
    /// Check if the node is a manager
    pub fn is_manager(&self) -> bool {
        !self.manager_status.is_empty()
    }

    /// Check if the node is the cluster leader
    pub fn is_leader(&self) -> bool {
        self.manager_status == "Leader"
    }
}

/// Full node record from `node inspect`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct NodeDetail {
    /// Node ID
    #[serde(rename = "ID")]
    pub id: String,
    /// Node specification; its availability value is the authoritative one
    pub spec: NodeSpec,
    /// Node description
    #[serde(default)]
    pub description: NodeDescription,
    /// Node status
    #[serde(default)]
    pub status: NodeStatus,
    /// Manager status (if manager)
    #[serde(default)]
    pub manager_status: Option<ManagerStatus>,
    /// Created timestamp
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl NodeDetail {
    /// Node hostname
    pub fn hostname(&self) -> &str {
        &self.description.hostname
    }

    /// Authoritative availability from the node spec
    pub fn availability(&self) -> NodeAvailability {
        self.spec.availability
    }
}

/// Node specification
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct NodeSpec {
    /// Scheduling availability
    #[serde(default)]
    pub availability: NodeAvailability,
    /// Node role (`manager` or `worker`)
    #[serde(default)]
    pub role: String,
    /// Node labels
    #[serde(default)]
    pub labels: HashMap<String, String>,
}

/// Node description
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct NodeDescription {
    /// Hostname
    #[serde(default)]
    pub hostname: String,
    /// Platform info
    #[serde(default)]
    pub platform: Platform,
    /// Engine description
    #[serde(default)]
    pub engine: EngineDescription,
}

/// Platform information
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Platform {
    /// CPU architecture
    #[serde(default)]
    pub architecture: String,
    /// Operating system
    #[serde(rename = "OS", default)]
    pub os: String,
}

/// Engine description
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct EngineDescription {
    /// Engine version
    #[serde(default)]
    pub engine_version: String,
}

/// Node status
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct NodeStatus {
    /// Node health
    #[serde(default)]
    pub state: NodeState,
    /// Address
    #[serde(default)]
    pub addr: String,
    /// Status message
    #[serde(default)]
    pub message: String,
}

/// Manager status
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ManagerStatus {
    /// Is leader
    #[serde(default)]
    pub leader: bool,
    /// Reachability
    #[serde(default)]
    pub reachability: String,
    /// Address
    #[serde(default)]
    pub addr: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_node_ls_row() {
        let line = r#"{"ID":"n1","Hostname":"worker-1","Status":"Ready","Availability":"Active","ManagerStatus":"","EngineVersion":"24.0.7"}"#;
        let node: Node = serde_json::from_str(line).unwrap();

        assert_eq!(node.id, "n1");
        assert_eq!(node.hostname, "worker-1");
        assert_eq!(node.status, NodeState::Ready);
        assert_eq!(node.availability, NodeAvailability::Active);
        assert!(!node.is_manager());
    }

    #[test]
    fn test_leader_node() {
        let line = r#"{"ID":"m1","Hostname":"manager-1","Status":"Ready","Availability":"Drain","ManagerStatus":"Leader"}"#;
        let node: Node = serde_json::from_str(line).unwrap();

        assert!(node.is_manager());
        assert!(node.is_leader());
        assert_eq!(node.availability, NodeAvailability::Drain);
    }

    #[test]
    fn test_decode_node_detail_with_lowercase_spec_values() {
        let raw = r#"{
            "ID": "m1",
            "CreatedAt": "2024-03-01T10:00:00.000000000Z",
            "Spec": {"Availability": "pause", "Role": "manager", "Labels": {}},
            "Description": {
                "Hostname": "manager-1",
                "Platform": {"Architecture": "x86_64", "OS": "linux"},
                "Engine": {"EngineVersion": "24.0.7"}
            },
            "Status": {"State": "ready", "Addr": "10.0.0.5"},
            "ManagerStatus": {"Leader": true, "Reachability": "reachable", "Addr": "10.0.0.5:2377"}
        }"#;
        let detail: NodeDetail = serde_json::from_str(raw).unwrap();

        assert_eq!(detail.hostname(), "manager-1");
        assert_eq!(detail.availability(), NodeAvailability::Pause);
        assert_eq!(detail.status.state, NodeState::Ready);
        assert!(detail.manager_status.unwrap().leader);
        assert!(detail.created_at.is_some());
    }

    #[test]
    fn test_parse_action_closed_set() {
        assert_eq!(
            NodeAvailability::parse_action("drain"),
            Some(NodeAvailability::Drain)
        );
        assert_eq!(NodeAvailability::parse_action("suspended"), None);
        assert_eq!(NodeAvailability::parse_action("Active"), None);
        assert_eq!(NodeAvailability::parse_action(""), None);
    }
}

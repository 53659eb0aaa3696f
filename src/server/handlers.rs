//! Dashboard route handlers

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect};
use serde::Deserialize;
use tracing::error;

use super::AppState;
use crate::swarm::{Confirmation, Decoded, Node, Service, Task};
use crate::SwarmError;

/// Flash-style message carried across a redirect
#[derive(Debug, Default, Deserialize)]
pub struct FlashParams {
    #[serde(default)]
    pub msg: Option<String>,
}

/// Liveness endpoint
pub async fn health() -> impl IntoResponse {
    StatusCode::OK
}

/// Cluster overview: services and nodes
pub async fn dashboard(
    State(state): State<AppState>,
    Query(flash): Query<FlashParams>,
) -> Html<String> {
    // Read failures degrade to an empty table plus a banner; the operator
    // must be able to tell "empty cluster" from "query failed".
    let (services, services_err) = match state.client.list_services().await {
        Ok(rows) => (rows, None),
        Err(err) => {
            error!(%err, "service query failed");
            (Vec::new(), Some(err.to_string()))
        }
    };
    let (nodes, nodes_err) = match state.client.list_nodes().await {
        Ok(rows) => (rows, None),
        Err(err) => {
            error!(%err, "node query failed");
            (Vec::new(), Some(err.to_string()))
        }
    };

    let mut body = String::new();
    body.push_str("<h1>Swarm Dashboard</h1>\n");
    if let Some(msg) = &flash.msg {
        body.push_str(&format!("<p class=\"flash\">{}</p>\n", escape(msg)));
    }

    body.push_str("<h2>Services</h2>\n");
    if let Some(err) = &services_err {
        body.push_str(&banner(err));
    }
    body.push_str(&services_table(&services));

    body.push_str("<h2>Nodes</h2>\n");
    if let Some(err) = &nodes_err {
        body.push_str(&banner(err));
    }
    body.push_str(&nodes_table(&nodes));

    Html(page("Swarm Dashboard", &body))
}

/// Node detail: inspect record plus the tasks placed on the node
pub async fn node_detail(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(flash): Query<FlashParams>,
) -> axum::response::Response {
    let detail = match state.client.inspect_node(&id).await {
        Ok(detail) => detail,
        Err(err) => {
            error!(node = %id, %err, "node inspect failed");
            let msg = format!("Node {id} not found or details unavailable: {err}");
            return Redirect::to(&format!("/?msg={}", encode_query(&msg))).into_response();
        }
    };

    let (tasks, tasks_err) = match state.client.list_node_tasks(&id).await {
        Ok(rows) => (rows, None),
        Err(err) => {
            error!(node = %id, %err, "node task query failed");
            (Vec::new(), Some(err.to_string()))
        }
    };

    let mut body = String::new();
    body.push_str(&format!("<h1>Node {}</h1>\n", escape(detail.hostname())));
    if let Some(msg) = &flash.msg {
        body.push_str(&format!("<p class=\"flash\">{}</p>\n", escape(msg)));
    }

    body.push_str("<ul>\n");
    body.push_str(&format!("<li>ID: {}</li>\n", escape(&detail.id)));
    body.push_str(&format!("<li>State: {}</li>\n", detail.status.state));
    body.push_str(&format!("<li>Availability: {}</li>\n", detail.availability()));
    body.push_str(&format!("<li>Role: {}</li>\n", escape(&detail.spec.role)));
    if let Some(manager) = &detail.manager_status {
        body.push_str(&format!(
            "<li>Manager: reachability {}, leader {}</li>\n",
            escape(&manager.reachability),
            manager.leader
        ));
    }
    body.push_str(&format!(
        "<li>Engine: {} on {}/{}</li>\n",
        escape(&detail.description.engine.engine_version),
        escape(&detail.description.platform.os),
        escape(&detail.description.platform.architecture)
    ));
    body.push_str("</ul>\n");

    // The inspect record carries the authoritative availability, so the
    // transition controls always reflect what the orchestrator would act on.
    body.push_str("<h2>Availability</h2>\n");
    for action in ["active", "pause", "drain"] {
        body.push_str(&format!(
            "<form method=\"post\" action=\"/node/{}/availability/{}\"><button>{}</button></form>\n",
            encode_query(&detail.id),
            action,
            action
        ));
    }

    body.push_str("<h2>Tasks on this node</h2>\n");
    if let Some(err) = &tasks_err {
        body.push_str(&banner(err));
    }
    body.push_str(&tasks_table(&tasks));

    Html(page("Node detail", &body)).into_response()
}

/// Scale a service one step up or down, then redirect home
pub async fn scale_service(
    State(state): State<AppState>,
    Path((id, direction)): Path<(String, String)>,
) -> Redirect {
    let msg = match state.scaler.scale(&id, &direction).await {
        Ok(outcome) => match outcome.confirmation {
            Confirmation::Confirmed => format!(
                "Service {} scaled from {} to {} replicas.",
                outcome.service_name, outcome.previous, outcome.target
            ),
            Confirmation::Unconfirmed => format!(
                "Scale command for service {} to {} replicas executed, but the output was not recognized: {}",
                outcome.service_name, outcome.target, outcome.output
            ),
        },
        Err(err) => {
            error!(service = %id, %err, "scale failed");
            format!("Error scaling service {id}: {err}")
        }
    };

    Redirect::to(&format!("/?msg={}", encode_query(&msg)))
}

/// Change a node's availability, then redirect to its detail page
pub async fn set_node_availability(
    State(state): State<AppState>,
    Path((id, action)): Path<(String, String)>,
) -> Redirect {
    let (msg, back_to_root) = match state.availability.set_availability(&id, &action).await {
        Ok(outcome) => {
            let msg = match outcome.confirmation {
                Confirmation::Confirmed => {
                    format!("Node {} availability set to {}.", outcome.node_id, outcome.action)
                }
                Confirmation::Unconfirmed => format!(
                    "Availability command for node {} executed, but the output was not recognized: {}",
                    outcome.node_id, outcome.output
                ),
            };
            (msg, false)
        }
        Err(err) => {
            error!(node = %id, %err, "availability change failed");
            // With no usable node id there is no detail page to return to.
            let back_to_root = matches!(err, SwarmError::InvalidArgument(_));
            (format!("Error updating node {id}: {err}"), back_to_root)
        }
    };

    if back_to_root {
        Redirect::to(&format!("/?msg={}", encode_query(&msg)))
    } else {
        Redirect::to(&format!(
            "/node/{}?msg={}",
            encode_query(&id),
            encode_query(&msg)
        ))
    }
}

fn page(title: &str, body: &str) -> String {
    format!(
        "<!doctype html>\n<html><head><title>{}</title></head><body>\n{}</body></html>\n",
        escape(title),
        body
    )
}

fn banner(message: &str) -> String {
    format!("<p class=\"error\">Query failed: {}</p>\n", escape(message))
}

fn services_table(rows: &[Decoded<Service>]) -> String {
    let mut out = String::from(
        "<table>\n<tr><th>Name</th><th>Mode</th><th>Replicas</th><th>Image</th>\
         <th>Ports</th><th>Scale</th></tr>\n",
    );
    for row in rows {
        match row {
            Decoded::Record(service) => {
                out.push_str(&format!(
                    "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td>\
                     <td><form method=\"post\" action=\"/service/{id}/scale/up\"><button>+</button></form>\
                     <form method=\"post\" action=\"/service/{id}/scale/down\"><button>-</button></form></td></tr>\n",
                    escape(&service.name),
                    service.mode,
                    escape(&service.replicas),
                    escape(&service.image),
                    escape(&service.ports),
                    id = encode_query(&service.id),
                ));
            }
            Decoded::Malformed { line, .. } => out.push_str(&malformed_row(6, line)),
        }
    }
    out.push_str("</table>\n");
    out
}

fn nodes_table(rows: &[Decoded<Node>]) -> String {
    let mut out = String::from(
        "<table>\n<tr><th>Hostname</th><th>Status</th><th>Availability</th>\
         <th>Manager</th><th>Engine</th></tr>\n",
    );
    for row in rows {
        match row {
            Decoded::Record(node) => {
                let manager = if node.is_leader() {
                    "Leader".to_string()
                } else if node.is_manager() {
                    escape(&node.manager_status)
                } else {
                    "-".to_string()
                };
                out.push_str(&format!(
                    "<tr><td><a href=\"/node/{}\">{}</a></td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
                    encode_query(&node.id),
                    escape(&node.hostname),
                    node.status,
                    node.availability,
                    manager,
                    escape(&node.engine_version),
                ));
            }
            Decoded::Malformed { line, .. } => out.push_str(&malformed_row(5, line)),
        }
    }
    out.push_str("</table>\n");
    out
}

fn tasks_table(rows: &[Decoded<Task>]) -> String {
    let mut out = String::from(
        "<table>\n<tr><th>Name</th><th>Image</th><th>Node</th><th>Desired</th>\
         <th>Current</th><th>Error</th></tr>\n",
    );
    for row in rows {
        match row {
            Decoded::Record(task) => {
                let row_class = if task.has_error() {
                    " class=\"failed\""
                } else {
                    ""
                };
                out.push_str(&format!(
                    "<tr{row_class}><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
                    escape(&task.name),
                    escape(&task.image),
                    escape(&task.node),
                    escape(&task.desired_state),
                    escape(&task.current_state),
                    escape(&task.error),
                ));
            }
            Decoded::Malformed { line, .. } => out.push_str(&malformed_row(6, line)),
        }
    }
    out.push_str("</table>\n");
    out
}

fn malformed_row(columns: usize, line: &str) -> String {
    format!(
        "<tr class=\"malformed\"><td colspan=\"{columns}\">unparseable record: {}</td></tr>\n",
        escape(line)
    )
}

/// Minimal HTML escaping for untrusted text
fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Percent-encode a string for use in a URL path or query value
fn encode_query(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for byte in raw.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}

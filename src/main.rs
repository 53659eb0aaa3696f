//! swarmdeck - web dashboard and CLI for Docker Swarm clusters
//!
//! This is the main CLI entry point for swarmdeck.

use std::process;
use std::time::Duration;

use clap::{Parser, Subcommand};
use swarmdeck::error::Result;
use swarmdeck::server::{create_router, AppState, DashboardConfig};
use swarmdeck::swarm::{
    AvailabilityController, Confirmation, Decoded, DockerCli, ScalingController, SwarmClient,
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// swarmdeck - Docker Swarm dashboard
#[derive(Parser)]
#[command(name = "swarmdeck")]
#[command(version)]
#[command(about = "Web dashboard and CLI for Docker Swarm clusters", long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    /// Orchestrator binary to invoke
    #[arg(long, global = true, default_value = "docker")]
    docker: String,

    /// Timeout for orchestrator commands, in seconds
    #[arg(long, global = true, default_value = "30")]
    command_timeout: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List services
    Services,

    /// List nodes
    Nodes,

    /// List the tasks of a service
    Tasks {
        /// Service ID or name
        service: String,
    },

    /// List the tasks placed on a node
    NodeTasks {
        /// Node ID or hostname
        node: String,
    },

    /// Show a node's detail record
    Inspect {
        /// Node ID or hostname
        node: String,
    },

    /// Scale a service one step up or down
    Scale {
        /// Service ID
        service: String,
        /// Direction: up or down
        direction: String,
    },

    /// Change a node's availability
    Availability {
        /// Node ID or hostname
        node: String,
        /// One of: active, pause, drain
        action: String,
    },

    /// Run the web dashboard
    Serve {
        /// Address to bind to
        #[arg(long, default_value = "0.0.0.0")]
        bind: String,
        /// Port to listen on
        #[arg(short, long, default_value = "8080")]
        port: u16,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let filter = if cli.debug { "swarmdeck=debug" } else { "swarmdeck=info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .init();

    if let Err(err) = run(cli).await {
        error!("{err}");
        process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let timeout = Duration::from_secs(cli.command_timeout);
    let runner = DockerCli::new(&cli.docker, timeout);
    let client = SwarmClient::new(runner);

    match cli.command {
        Commands::Services => {
            let services = client.list_services().await?;
            println!(
                "{:<16} {:<20} {:<16} {:<12} PORTS",
                "ID", "NAME", "MODE", "REPLICAS"
            );
            for row in &services {
                match row {
                    Decoded::Record(s) => println!(
                        "{:<16} {:<20} {:<16} {:<12} {}",
                        s.id, s.name, s.mode.to_string(), s.replicas, s.ports
                    ),
                    Decoded::Malformed { line, .. } => {
                        println!("!! unparseable record: {line}")
                    }
                }
            }
        }

        Commands::Nodes => {
            let nodes = client.list_nodes().await?;
            println!(
                "{:<28} {:<20} {:<10} {:<14} MANAGER",
                "ID", "HOSTNAME", "STATUS", "AVAILABILITY"
            );
            for row in &nodes {
                match row {
                    Decoded::Record(n) => println!(
                        "{:<28} {:<20} {:<10} {:<14} {}",
                        n.id,
                        n.hostname,
                        n.status.to_string(),
                        n.availability.to_string(),
                        n.manager_status
                    ),
                    Decoded::Malformed { line, .. } => {
                        println!("!! unparseable record: {line}")
                    }
                }
            }
        }

        Commands::Tasks { service } => {
            print_tasks(client.list_service_tasks(&service).await?);
        }

        Commands::NodeTasks { node } => {
            print_tasks(client.list_node_tasks(&node).await?);
        }

        Commands::Inspect { node } => {
            let detail = client.inspect_node(&node).await?;
            println!("ID:           {}", detail.id);
            println!("Hostname:     {}", detail.hostname());
            println!("State:        {}", detail.status.state);
            println!("Availability: {}", detail.availability());
            println!("Role:         {}", detail.spec.role);
            if let Some(manager) = &detail.manager_status {
                println!(
                    "Manager:      reachability {}, leader {}",
                    manager.reachability, manager.leader
                );
            }
            println!(
                "Engine:       {} on {}/{}",
                detail.description.engine.engine_version,
                detail.description.platform.os,
                detail.description.platform.architecture
            );
            if let Some(created) = detail.created_at {
                println!("Created:      {created}");
            }
        }

        Commands::Scale { service, direction } => {
            let scaler = ScalingController::new(std::sync::Arc::new(client));
            let outcome = scaler.scale(&service, &direction).await?;
            match outcome.confirmation {
                Confirmation::Confirmed => println!(
                    "{} scaled from {} to {} replicas",
                    outcome.service_name, outcome.previous, outcome.target
                ),
                Confirmation::Unconfirmed => println!(
                    "scale to {} executed, output not recognized: {}",
                    outcome.target, outcome.output
                ),
            }
        }

        Commands::Availability { node, action } => {
            let controller = AvailabilityController::new(std::sync::Arc::new(client));
            let outcome = controller.set_availability(&node, &action).await?;
            match outcome.confirmation {
                Confirmation::Confirmed => {
                    println!("node {} availability set to {}", outcome.node_id, outcome.action)
                }
                Confirmation::Unconfirmed => println!(
                    "availability update executed, output not recognized: {}",
                    outcome.output
                ),
            }
        }

        Commands::Serve { bind, port } => {
            let config = DashboardConfig {
                bind_addr: bind,
                port,
                docker_binary: cli.docker.clone(),
                command_timeout: timeout,
            };
            let addr = config.listen_addr();
            let state = AppState::new(&config);
            let app = create_router(state);

            let listener = match tokio::net::TcpListener::bind(&addr).await {
                Ok(listener) => listener,
                Err(err) => {
                    error!("failed to bind to {addr}: {err}");
                    process::exit(1);
                }
            };

            info!("dashboard listening on http://{addr}");
            if let Err(err) = axum::serve(listener, app).await {
                error!("server error: {err}");
                process::exit(1);
            }
        }
    }

    Ok(())
}

fn print_tasks(tasks: Vec<Decoded<swarmdeck::swarm::Task>>) {
    println!(
        "{:<28} {:<20} {:<16} {:<10} {:<24} ERROR",
        "ID", "NAME", "NODE", "DESIRED", "CURRENT"
    );
    for row in &tasks {
        match row {
            Decoded::Record(t) => println!(
                "{:<28} {:<20} {:<16} {:<10} {:<24} {}",
                t.id, t.name, t.node, t.desired_state, t.current_state, t.error
            ),
            Decoded::Malformed { line, .. } => println!("!! unparseable record: {line}"),
        }
    }
}

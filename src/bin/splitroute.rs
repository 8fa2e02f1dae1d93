//! # Splitroute CLI
//!
//! Manage split-tunnel networks and hosts, and sync their routes into the
//! connected L2TP VPN service.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;

use splitroute::config::ConfigManager;
use splitroute::database::DatabaseConnection;
use splitroute::logging::init_structured_logging_with;
use splitroute::reconciliation::{ReconcileOutcome, RouteReconciler};
use splitroute::services::{HostInput, HostManagementService};

#[derive(Parser)]
#[command(name = "splitroute")]
#[command(about = "Split-tunnel VPN routing for macOS")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    /// Configuration file (default: platform config directory)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Verbose output level (use multiple times for more verbosity)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Table, global = true)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Manage networks
    #[command(subcommand)]
    Network(NetworkCommand),

    /// Manage the hosts routed through a network
    #[command(subcommand)]
    Host(HostCommand),

    /// Rebuild and apply the routes of a network
    Sync { network_id: i64 },

    /// Clear the routes of a network
    Reset { network_id: i64 },

    /// Show the route setups persisted for a network
    Routes { network_id: i64 },

    /// Inspect L2TP VPN services
    #[command(subcommand)]
    Vpn(VpnCommand),

    /// Reveal the database file in Finder
    RevealDb,
}

#[derive(Subcommand)]
pub enum NetworkCommand {
    /// Add a network named after its VPN service
    Add { name: String },
    /// List networks
    List,
    /// Remove a network, clearing its routes first
    Remove { network_id: i64 },
}

#[derive(Subcommand)]
pub enum HostCommand {
    /// Add hosts to a network and sync it
    Add {
        network_id: i64,
        #[arg(required = true)]
        addresses: Vec<String>,
        #[arg(short, long)]
        description: Option<String>,
    },
    /// List the hosts of a network
    List { network_id: i64 },
    /// Remove a host and sync its network
    Remove { host_id: i64 },
}

#[derive(Subcommand)]
pub enum VpnCommand {
    /// List L2TP VPN services
    List,
    /// Show the connected L2TP VPN service
    Current,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let manager = ConfigManager::load_from_file(cli.config.clone())
        .context("Failed to load configuration")?;

    let mut logging = manager.config().logging.clone();
    let verbose_level = match cli.verbose {
        0 => None,
        1 => Some("info"),
        2 => Some("debug"),
        _ => Some("trace"),
    };
    if let Some(level) = verbose_level {
        logging.level = Some(level.to_string());
    }
    init_structured_logging_with(&logging);

    let db = DatabaseConnection::connect(&manager.config().database)
        .await
        .context("Failed to open database")?;
    let reconciler = Arc::new(RouteReconciler::from_pool(
        db.pool().clone(),
        &manager.config().storage,
    ));
    let service = HostManagementService::new(db.pool().clone(), reconciler.clone());

    let result = run(cli.command, cli.format, &service, &reconciler, &db).await;
    db.close().await;
    result
}

async fn run(
    command: Commands,
    format: OutputFormat,
    service: &HostManagementService,
    reconciler: &RouteReconciler,
    db: &DatabaseConnection,
) -> Result<()> {
    match command {
        Commands::Network(NetworkCommand::Add { name }) => {
            let network = service.add_network(&name).await?;
            emit(format, &network, || {
                println!("Added network {} ({})", network.id, network.name)
            })
        }
        Commands::Network(NetworkCommand::List) => {
            let networks = service.list_networks().await?;
            emit(format, &networks, || {
                println!("{:<6} {:<32} CREATED", "ID", "NAME");
                for network in &networks {
                    println!("{:<6} {:<32} {}", network.id, network.name, network.created_at);
                }
            })
        }
        Commands::Network(NetworkCommand::Remove { network_id }) => {
            let outcome = service.remove_network(network_id).await?;
            emit(format, &outcome, || {
                println!("Removed network {network_id} ({})", describe(&outcome))
            })
        }
        Commands::Host(HostCommand::Add {
            network_id,
            addresses,
            description,
        }) => {
            let inputs = addresses
                .into_iter()
                .map(|address| HostInput {
                    address,
                    description: description.clone(),
                })
                .collect();
            let report = service.add_hosts(network_id, inputs).await?;
            emit(format, &report, || {
                for host in &report.added {
                    println!("Added host {} ({})", host.id, host.address);
                }
                for address in &report.skipped {
                    println!("Skipped {address}: already declared");
                }
                println!("Sync: {}", describe(&report.sync));
            })
        }
        Commands::Host(HostCommand::List { network_id }) => {
            let hosts = service.list_hosts(network_id).await?;
            emit(format, &hosts, || {
                println!("{:<6} {:<40} DESCRIPTION", "ID", "ADDRESS");
                for host in &hosts {
                    println!(
                        "{:<6} {:<40} {}",
                        host.id,
                        host.address,
                        host.description.as_deref().unwrap_or("")
                    );
                }
            })
        }
        Commands::Host(HostCommand::Remove { host_id }) => {
            let outcome = service.remove_host(host_id).await?;
            emit(format, &outcome, || {
                println!("Removed host {host_id} ({})", describe(&outcome))
            })
        }
        Commands::Sync { network_id } => {
            let outcome = reconciler.sync_by_network_id(network_id).await?;
            emit(format, &outcome, || println!("{}", describe(&outcome)))
        }
        Commands::Reset { network_id } => {
            let outcome = reconciler.reset_by_network_id(network_id).await?;
            emit(format, &outcome, || println!("{}", describe(&outcome)))
        }
        Commands::Routes { network_id } => {
            let setups = service.list_setups(network_id).await?;
            emit(format, &setups, || {
                println!("{:<6} {:<16} {:<16} {:<16}", "HOST", "IP", "MASK", "ROUTER");
                for setup in &setups {
                    println!(
                        "{:<6} {:<16} {:<16} {:<16}",
                        setup.network_host_id,
                        setup.network_host_ip,
                        setup.subnet_mask,
                        setup.router
                    );
                }
            })
        }
        Commands::Vpn(VpnCommand::List) => {
            let services = reconciler.system().list_vpn().await?;
            emit(format, &services, || {
                for vpn in &services {
                    println!("{vpn}");
                }
            })
        }
        Commands::Vpn(VpnCommand::Current) => match reconciler.system().current_vpn().await {
            Ok(vpn) => emit(format, &Some(&vpn), || println!("{vpn}")),
            Err(err) if err.is_vpn_not_found() => {
                emit(format, &None::<String>, || println!("No VPN connected"))
            }
            Err(err) => Err(err.into()),
        },
        Commands::RevealDb => {
            let path = db
                .path()
                .context("Database has no file to reveal")?
                .to_path_buf();
            reconciler.system().open_in_finder(&path).await?;
            Ok(())
        }
    }
}

fn describe(outcome: &ReconcileOutcome) -> String {
    match outcome {
        ReconcileOutcome::Applied { routes } => format!("applied {routes} route(s)"),
        ReconcileOutcome::NoActiveVpn => "no VPN connected, routes unchanged".to_string(),
        ReconcileOutcome::NotActive { active_vpn } => {
            format!("{active_vpn} is connected, routes unchanged")
        }
    }
}

fn emit<T: Serialize>(format: OutputFormat, value: &T, table: impl FnOnce()) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
        OutputFormat::Table => table(),
    }
    Ok(())
}

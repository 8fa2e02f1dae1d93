//! # Command Executor
//!
//! [`SystemNetwork`] implementation that runs one OS process per call, splits
//! stdout on `\n` and applies the line parsers.
//!
//! The line selection rules differ per command and are kept exactly as the
//! tools have been observed to need them:
//!
//! | Query | Lines considered | Winner |
//! |---|---|---|
//! | default interface | containing `interface` | last |
//! | service for interface | descriptor line whose next line contains the interface | first |
//! | subnet mask / router | every line, independently | last match of each |
//! | current VPN | containing `[PPP:L2TP]` and `(Connected)` | first |

use super::errors::CommandError;
use super::parser::{
    parse_interface_name, parse_network_service_name, parse_router, parse_subnet_mask,
    parse_vpn_name,
};
use super::runner::{CommandRunner, ProcessRunner};
use super::SystemNetwork;
use crate::constants::{commands, markers};
use crate::models::{
    Network, NetworkInfo, NetworkInterface, NetworkService, NewNetworkHostSetup, VpnService,
};
use async_trait::async_trait;
use std::path::Path;
use tracing::{debug, info, instrument};

#[derive(Debug, Clone, Default)]
pub struct CommandExecutor<R = ProcessRunner> {
    runner: R,
}

impl CommandExecutor<ProcessRunner> {
    pub fn new() -> Self {
        Self {
            runner: ProcessRunner,
        }
    }
}

impl<R: CommandRunner> CommandExecutor<R> {
    pub fn with_runner(runner: R) -> Self {
        Self { runner }
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    async fn run<I, S>(&self, program: &str, args: I) -> Result<String, CommandError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let args: Vec<String> = args.into_iter().map(Into::into).collect();
        debug!(program = %program, args = ?args, "Running system command");
        self.runner.run(program, &args).await
    }
}

/// Last line mentioning `interface` decides, even if it does not parse.
fn select_default_interface(output: &str) -> &str {
    output
        .split('\n')
        .rfind(|line| line.contains(markers::INTERFACE))
        .map_or("", parse_interface_name)
}

/// Service descriptor line directly above the first detail line naming the
/// interface.
fn select_service_for_interface<'a>(output: &'a str, interface: &str) -> &'a str {
    let lines: Vec<&str> = output.split('\n').collect();
    lines
        .windows(2)
        .find(|pair| pair[1].contains(interface))
        .map_or("", |pair| parse_network_service_name(pair[0]))
}

fn select_last_match<'a>(output: &'a str, parse: fn(&str) -> &str) -> Option<&'a str> {
    output
        .split('\n')
        .map(parse)
        .filter(|value| !value.is_empty())
        .last()
}

fn is_l2tp(line: &str) -> bool {
    line.contains(markers::L2TP)
}

fn is_connected_l2tp(line: &str) -> bool {
    is_l2tp(line) && line.contains(markers::CONNECTED)
}

/// `-setadditionalroutes <service> [ip mask router]...`
fn additional_routes_args(network: &Network, setups: &[NewNetworkHostSetup]) -> Vec<String> {
    let mut args = Vec::with_capacity(2 + setups.len() * 3);
    args.push(commands::SET_ADDITIONAL_ROUTES.to_string());
    args.push(network.name.clone());
    for setup in setups {
        args.push(setup.network_host_ip.clone());
        args.push(setup.subnet_mask.clone());
        args.push(setup.router.clone());
    }
    args
}

#[async_trait]
impl<R: CommandRunner> SystemNetwork for CommandExecutor<R> {
    #[instrument(skip(self))]
    async fn default_network_interface(&self) -> Result<NetworkInterface, CommandError> {
        let output = self
            .run(commands::ROUTE, commands::ROUTE_GET_DEFAULT)
            .await?;

        match select_default_interface(&output) {
            "" => Err(CommandError::InterfaceNotFound),
            interface => Ok(NetworkInterface::from(interface)),
        }
    }

    #[instrument(skip_all, fields(interface = %interface))]
    async fn network_service_by_interface(
        &self,
        interface: &NetworkInterface,
    ) -> Result<NetworkService, CommandError> {
        let output = self
            .run(commands::NETWORKSETUP, [commands::LIST_NETWORK_SERVICE_ORDER])
            .await?;

        match select_service_for_interface(&output, interface.as_str()) {
            "" => Err(CommandError::ServiceNotFound {
                interface: interface.to_string(),
            }),
            service => Ok(NetworkService::from(service)),
        }
    }

    #[instrument(skip_all, fields(service = %service))]
    async fn network_info_by_service(
        &self,
        service: &NetworkService,
    ) -> Result<NetworkInfo, CommandError> {
        let output = self
            .run(
                commands::NETWORKSETUP,
                [commands::GET_INFO, service.as_str()],
            )
            .await?;

        let subnet_mask = select_last_match(&output, parse_subnet_mask);
        let router = select_last_match(&output, parse_router);

        match (subnet_mask, router) {
            (Some(subnet_mask), Some(router)) => Ok(NetworkInfo {
                subnet_mask: subnet_mask.to_string(),
                router: router.to_string(),
            }),
            _ => Err(CommandError::NetworkInfoNotFound {
                service: service.to_string(),
            }),
        }
    }

    #[instrument(skip_all, fields(network = %network.name, routes = setups.len()))]
    async fn set_network_additional_routes(
        &self,
        network: &Network,
        setups: &[NewNetworkHostSetup],
    ) -> Result<(), CommandError> {
        self.run(commands::NETWORKSETUP, additional_routes_args(network, setups))
            .await?;

        info!(
            network = %network.name,
            routes = setups.len(),
            "Additional routes applied"
        );
        Ok(())
    }

    #[instrument(skip(self))]
    async fn list_vpn(&self) -> Result<Vec<VpnService>, CommandError> {
        let output = self
            .run(commands::SCUTIL, commands::SCUTIL_LIST_CONNECTIONS)
            .await?;

        Ok(output
            .split('\n')
            .filter(|line| is_l2tp(line))
            .map(|line| VpnService::from(parse_vpn_name(line)))
            .collect())
    }

    #[instrument(skip(self))]
    async fn current_vpn(&self) -> Result<VpnService, CommandError> {
        let output = self
            .run(commands::SCUTIL, commands::SCUTIL_LIST_CONNECTIONS)
            .await?;

        output
            .split('\n')
            .find(|line| is_connected_l2tp(line))
            .map(|line| VpnService::from(parse_vpn_name(line)))
            .ok_or(CommandError::VpnNotFound)
    }

    #[instrument(skip_all, fields(path = %path.display()))]
    async fn open_in_finder(&self, path: &Path) -> Result<(), CommandError> {
        self.run(
            commands::OPEN,
            [
                commands::OPEN_REVEAL.to_string(),
                path.to_string_lossy().into_owned(),
            ],
        )
        .await?;
        Ok(())
    }
}

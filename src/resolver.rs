//! # Host Resolution
//!
//! IPv4 resolution of declared host addresses behind the [`HostResolver`]
//! trait. Syncs only ever route IPv4, so IPv6 results are dropped here.

use async_trait::async_trait;
use std::net::{IpAddr, Ipv4Addr};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("Lookup failed for {host}: {source}")]
    Lookup {
        host: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Host {host} could not be resolved: {reason}")]
    Unresolvable { host: String, reason: String },
}

#[async_trait]
pub trait HostResolver: Send + Sync {
    /// Every IPv4 address `host` resolves to, in resolver order, without
    /// duplicates. An empty result is not an error at this level.
    async fn lookup_ipv4(&self, host: &str) -> Result<Vec<Ipv4Addr>, ResolveError>;
}

/// Resolver using the system resolver through `tokio::net::lookup_host`.
///
/// Literal IPv4 addresses resolve to themselves without a lookup.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemResolver;

#[async_trait]
impl HostResolver for SystemResolver {
    async fn lookup_ipv4(&self, host: &str) -> Result<Vec<Ipv4Addr>, ResolveError> {
        if let Ok(ip) = host.parse::<IpAddr>() {
            return Ok(ipv4_only([ip]));
        }

        let addrs = tokio::net::lookup_host((host, 0))
            .await
            .map_err(|source| ResolveError::Lookup {
                host: host.to_string(),
                source,
            })?;

        let ips = answered_ipv4(host, addrs.map(|addr| addr.ip()))?;
        debug!(host = %host, addresses = ?ips, "Resolved host");
        Ok(ips)
    }
}

/// IPv4 part of a lookup answer. An answer with no addresses of any family
/// is [`ResolveError::Unresolvable`].
fn answered_ipv4(
    host: &str,
    ips: impl IntoIterator<Item = IpAddr>,
) -> Result<Vec<Ipv4Addr>, ResolveError> {
    let ips: Vec<IpAddr> = ips.into_iter().collect();
    if ips.is_empty() {
        return Err(ResolveError::Unresolvable {
            host: host.to_string(),
            reason: "lookup returned no addresses".to_string(),
        });
    }
    Ok(ipv4_only(ips))
}

/// Keep IPv4 addresses, first occurrence order
pub fn ipv4_only(ips: impl IntoIterator<Item = IpAddr>) -> Vec<Ipv4Addr> {
    let mut result: Vec<Ipv4Addr> = Vec::new();
    for ip in ips {
        if let IpAddr::V4(v4) = ip {
            if !result.contains(&v4) {
                result.push(v4);
            }
        }
    }
    result
}

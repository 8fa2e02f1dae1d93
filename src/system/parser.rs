//! # Command Output Parser
//!
//! Stateless extraction of single values from one line of command output.
//!
//! Every function matches one fixed pattern and returns the first capture
//! group, or an empty string when the line does not match. The patterns are
//! compiled once on first use. None of these functions fail for any input.

use once_cell::sync::Lazy;
use regex::Regex;

/// First quoted run, e.g. `"Office VPN"` in a `scutil --nc list` line
static VPN_NAME_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#""([^"]*)""#).expect("Invalid VPN name regex"));

/// `Device: en0` in `networksetup` detail lines, `interface: en0` in `route get`
static INTERFACE_NAME_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:Device|interface): (\w+)").expect("Invalid interface name regex")
});

/// `(1) Wi-Fi` descriptor lines from `-listnetworkserviceorder`
static NETWORK_SERVICE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\([0-9]+\) (.*)").expect("Invalid network service regex")
});

static SUBNET_MASK_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"Subnet mask: ([0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3})")
        .expect("Invalid subnet mask regex")
});

static ROUTER_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"Router: ([0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3})")
        .expect("Invalid router regex")
});

fn first_capture<'a>(regex: &Regex, line: &'a str) -> &'a str {
    regex
        .captures(line)
        .and_then(|caps| caps.get(1))
        .map_or("", |m| m.as_str())
}

pub fn parse_vpn_name(line: &str) -> &str {
    first_capture(&VPN_NAME_REGEX, line)
}

/// Accepts both `Device: ` and `interface: ` labels. Exactly one space is
/// allowed after the colon.
pub fn parse_interface_name(line: &str) -> &str {
    first_capture(&INTERFACE_NAME_REGEX, line)
}

pub fn parse_network_service_name(line: &str) -> &str {
    first_capture(&NETWORK_SERVICE_REGEX, line)
}

/// Octets are shape-checked only; `999.999.999.999` is returned unchanged.
pub fn parse_subnet_mask(line: &str) -> &str {
    first_capture(&SUBNET_MASK_REGEX, line)
}

/// Same shape rules as [`parse_subnet_mask`].
pub fn parse_router(line: &str) -> &str {
    first_capture(&ROUTER_REGEX, line)
}

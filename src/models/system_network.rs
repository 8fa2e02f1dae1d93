//! Values reported by the macOS networking tools.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! os_name {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }
    };
}

os_name!(
    /// OS interface id, e.g. `en0`
    NetworkInterface
);

os_name!(
    /// OS-named network service, e.g. `Wi-Fi`
    NetworkService
);

os_name!(
    /// Name of a configured L2TP VPN as printed by `scutil --nc list`
    VpnService
);

/// Subnet mask and router of the current default network, as dotted quads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkInfo {
    pub subnet_mask: String,
    pub router: String,
}

//! # System Constants
//!
//! Command names, argument vectors and output markers that define the contract
//! with the macOS networking tools, plus storage defaults.
//!
//! Any change in these label strings on the OS side degrades discovery to
//! "not found" rather than raising a parse error.

/// Programs and argument vectors for every OS query and mutation
pub mod commands {
    pub const ROUTE: &str = "route";
    pub const ROUTE_GET_DEFAULT: [&str; 2] = ["get", "default"];

    pub const NETWORKSETUP: &str = "networksetup";
    pub const LIST_NETWORK_SERVICE_ORDER: &str = "-listnetworkserviceorder";
    pub const GET_INFO: &str = "-getinfo";
    pub const SET_ADDITIONAL_ROUTES: &str = "-setadditionalroutes";

    pub const SCUTIL: &str = "scutil";
    pub const SCUTIL_LIST_CONNECTIONS: [&str; 2] = ["--nc", "list"];

    pub const OPEN: &str = "open";
    pub const OPEN_REVEAL: &str = "-R";
}

/// Substrings used to select lines before parsing
pub mod markers {
    /// `route get default` label carrying the interface id
    pub const INTERFACE: &str = "interface";
    /// `scutil --nc list` protocol marker for L2TP services
    pub const L2TP: &str = "[PPP:L2TP]";
    /// `scutil --nc list` status marker for the active connection
    pub const CONNECTED: &str = "(Connected)";
}

/// Storage defaults
pub mod storage {
    /// Rows per multi-row INSERT into `network_host_setups`
    pub const DEFAULT_INSERT_CHUNK_SIZE: usize = 100;
    /// Host ids per `DELETE ... IN (...)` statement
    pub const DEFAULT_DELETE_CHUNK_SIZE: usize = 500;
    /// Bind parameters carried by a single setup row in the INSERT
    pub const SETUP_INSERT_BINDS_PER_ROW: usize = 5;
    /// SQLite's `SQLITE_MAX_VARIABLE_NUMBER` since 3.32
    pub const SQLITE_MAX_BIND_PARAMETERS: usize = 32_766;

    pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;
    pub const DATABASE_FILE_NAME: &str = "splitroute.db";
}

/// Application identity used for platform directories and env prefixes
pub mod app {
    pub const QUALIFIER: &str = "com";
    pub const ORGANIZATION: &str = "splitroute";
    pub const APPLICATION: &str = "splitroute";
    pub const CONFIG_FILE_NAME: &str = "config.toml";
    pub const ENV_PREFIX: &str = "SPLITROUTE";
}

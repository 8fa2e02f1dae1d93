pub mod host_management;

pub use host_management::{AddHostsReport, HostInput, HostManagementError, HostManagementService};

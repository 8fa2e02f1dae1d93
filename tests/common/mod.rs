pub mod fixtures;
pub mod mocks;
pub mod test_db;

pub use fixtures::*;
pub use mocks::*;
pub use test_db::*;

//! Subcommand implementations. Each takes the shared `AppContext`.

pub mod logs;
pub mod request;
pub mod serving;
pub mod sql;
pub mod tables;
pub mod whoami;

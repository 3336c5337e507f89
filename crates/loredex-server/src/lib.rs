//! Loredex server: configuration, tool catalog and protocol dispatcher
//!
//! The `loredex` binary wires these together; the library split keeps
//! the dispatcher drivable from tests over in-memory streams.

pub mod config;
pub mod dispatcher;
pub mod tools;

pub use config::Config;
pub use dispatcher::Dispatcher;

pub mod backend;
pub mod command;
pub mod config;
pub mod console;
pub mod error;
pub mod logging;
pub mod map;
pub mod mutation;
pub mod notify;
pub mod query;
pub mod session;

#[cfg(test)]
mod test_support;

pub use error::ClientError;
pub use session::{Refresh, Session};

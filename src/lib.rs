pub mod config;
pub mod error;
pub mod mcp;
pub mod tools;

pub use error::{BridgeError, Result};

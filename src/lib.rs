pub mod api;
pub mod backend;
pub mod config;
pub mod error;
pub mod mcp;

pub use config::Config;
pub use error::{AppError, Result};

pub mod cli;
pub mod commands;
pub mod config;
pub mod context;
pub mod utils;

// Re-export commonly used items
pub use config::AppConfig;
pub use context::AppContext;
pub use utils::errors::{CliError, Result};

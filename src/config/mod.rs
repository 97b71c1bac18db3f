pub mod cli;
pub mod file;

pub use cli::{CliArgs, Command};
pub use file::GatewayConfig;

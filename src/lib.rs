pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use crate::config::{CliArgs, Command, GatewayConfig};
pub use crate::core::gateway::ObjectGateway;
pub use crate::core::internal::InternalStore;
pub use crate::core::remote::RemoteDocumentStore;
pub use crate::domain::model::{
    JsonObject, ObjectRecord, Register, RegisterSource, RemoteConfig, Schema,
};
pub use crate::domain::ports::ObjectStore;
pub use crate::utils::error::{GatewayError, Result};

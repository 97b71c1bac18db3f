pub mod gateway;
pub mod internal;
pub mod remote;

pub use crate::domain::model::{JsonObject, ObjectRecord, Register, RegisterSource, Schema};
pub use crate::domain::ports::ObjectStore;
pub use crate::utils::error::Result;

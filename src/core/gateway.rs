use crate::config::GatewayConfig;
use crate::core::internal::InternalStore;
use crate::core::remote::RemoteDocumentStore;
use crate::domain::model::{JsonObject, ObjectRecord, Register, RegisterSource, Schema};
use crate::domain::ports::ObjectStore;
use crate::utils::error::{GatewayError, Result};
use crate::utils::validation::Validate;
use std::collections::HashMap;

/// Routes object operations to the backend a register declares.
///
/// Backends are resolved once when a register is added: internal registers
/// share the SQLite store, remote registers each get a document API client
/// built from their validated connection parameters. No per-call branching
/// on source strings and no state between calls.
pub struct ObjectGateway {
    internal: InternalStore,
    remotes: HashMap<i64, RemoteDocumentStore>,
}

impl ObjectGateway {
    pub fn new(internal: InternalStore) -> Self {
        Self {
            internal,
            remotes: HashMap::new(),
        }
    }

    /// Build a gateway from a validated configuration: open the internal
    /// store and construct one remote client per remote-document register.
    pub fn from_config(config: &GatewayConfig) -> Result<Self> {
        config.validate()?;

        let internal = InternalStore::open(&config.database.path)?;
        let mut gateway = Self::new(internal);

        for register in config.registers()? {
            gateway.add_register(&register)?;
        }

        Ok(gateway)
    }

    /// Resolve the register's backend. For remote-document registers this
    /// validates the connection parameters and builds the client up front.
    pub fn add_register(&mut self, register: &Register) -> Result<()> {
        if let RegisterSource::RemoteDocument(config) = &register.source {
            tracing::debug!(
                "register {} uses remote data source `{}`",
                register.id,
                config.data_source
            );
            let store = RemoteDocumentStore::new(config.clone())?;
            self.remotes.insert(register.id, store);
        }

        Ok(())
    }

    fn store_for(&self, register: &Register) -> Result<&dyn ObjectStore> {
        match &register.source {
            RegisterSource::Internal => Ok(&self.internal),
            RegisterSource::RemoteDocument(_) => self
                .remotes
                .get(&register.id)
                .map(|store| store as &dyn ObjectStore)
                .ok_or_else(|| GatewayError::ConfigError {
                    message: format!("register {} was not added to the gateway", register.id),
                }),
        }
    }

    /// Save an object under a register and schema. See
    /// [`ObjectStore::save_object`] for the identifier semantics.
    pub async fn save_object(
        &self,
        register: &Register,
        schema: &Schema,
        object: JsonObject,
    ) -> Result<ObjectRecord> {
        self.store_for(register)?
            .save_object(register, schema, object)
            .await
    }

    pub async fn find_objects(
        &self,
        register: &Register,
        filter: &JsonObject,
    ) -> Result<Vec<JsonObject>> {
        self.store_for(register)?.find_objects(filter).await
    }

    pub async fn find_object(&self, register: &Register, filter: &JsonObject) -> Result<JsonObject> {
        self.store_for(register)?.find_object(filter).await
    }

    pub async fn update_object(
        &self,
        register: &Register,
        filter: &JsonObject,
        update: &JsonObject,
    ) -> Result<JsonObject> {
        self.store_for(register)?.update_object(filter, update).await
    }

    pub async fn delete_object(&self, register: &Register, filter: &JsonObject) -> Result<()> {
        self.store_for(register)?.delete_object(filter).await
    }

    pub async fn aggregate_objects(
        &self,
        register: &Register,
        filter: &JsonObject,
        pipeline: &[serde_json::Value],
    ) -> Result<Vec<JsonObject>> {
        self.store_for(register)?
            .aggregate_objects(filter, pipeline)
            .await
    }
}

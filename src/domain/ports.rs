use crate::domain::model::{JsonObject, ObjectRecord, Register, Schema};
use crate::utils::error::Result;
use async_trait::async_trait;

/// Common capability set every register backend implements. The gateway
/// dispatches through this trait after resolving the backend once per
/// register.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Persist an object under the given register and schema. A payload
    /// carrying an `id` field updates the existing record in place;
    /// otherwise a new identifier is generated and the record inserted.
    async fn save_object(
        &self,
        register: &Register,
        schema: &Schema,
        object: JsonObject,
    ) -> Result<ObjectRecord>;

    /// All documents matching the filter criteria.
    async fn find_objects(&self, filter: &JsonObject) -> Result<Vec<JsonObject>>;

    /// The single document matching the filter (usually an id lookup).
    async fn find_object(&self, filter: &JsonObject) -> Result<JsonObject>;

    /// Upsert-style field update; returns the post-update state as read
    /// back with the same filter, never the raw update acknowledgment.
    async fn update_object(&self, filter: &JsonObject, update: &JsonObject) -> Result<JsonObject>;

    /// Delete the matching document. The result is empty whether or not a
    /// document actually matched.
    async fn delete_object(&self, filter: &JsonObject) -> Result<()>;

    /// Run a processing pipeline over the documents matching the filter.
    async fn aggregate_objects(
        &self,
        filter: &JsonObject,
        pipeline: &[serde_json::Value],
    ) -> Result<Vec<JsonObject>>;
}

use crate::domain::model::{JsonObject, ObjectRecord, Register, Schema};
use crate::domain::ports::ObjectStore;
use crate::utils::error::{GatewayError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};
use std::path::Path;
use tokio::sync::Mutex;
use uuid::Uuid;

const OBJECTS_TABLE_SQL: &str = "CREATE TABLE IF NOT EXISTS objects (
    uuid TEXT PRIMARY KEY,
    register INTEGER NOT NULL,
    schema INTEGER NOT NULL,
    object TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
)";

const RECORD_SELECT_SQL: &str =
    "SELECT uuid, register, schema, object, created_at, updated_at FROM objects";

/// SQLite-backed store for registers whose source is internal.
///
/// Identifier uniqueness is enforced by the `uuid` primary key, not by the
/// gateway. One record per save; no state is kept between calls beyond the
/// connection itself.
pub struct InternalStore {
    conn: Mutex<Connection>,
}

impl InternalStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        tracing::debug!("opening internal store at {}", path.as_ref().display());
        let conn = Connection::open(path)?;
        Self::bootstrap(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::bootstrap(conn)
    }

    fn bootstrap(conn: Connection) -> Result<Self> {
        conn.execute(OBJECTS_TABLE_SQL, [])?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn load_records(conn: &Connection) -> Result<Vec<ObjectRecord>> {
        let mut stmt = conn.prepare(RECORD_SELECT_SQL)?;
        let mut rows = stmt.query([])?;
        let mut records = Vec::new();

        while let Some(row) = rows.next()? {
            records.push(parse_record_row(row)?);
        }

        Ok(records)
    }

    fn get_record(conn: &Connection, uuid: &str) -> Result<Option<ObjectRecord>> {
        let mut stmt = conn.prepare(&format!("{} WHERE uuid = ?1", RECORD_SELECT_SQL))?;
        let mut rows = stmt.query(params![uuid])?;

        if let Some(row) = rows.next()? {
            return Ok(Some(parse_record_row(row)?));
        }

        Ok(None)
    }

    fn first_match(conn: &Connection, filter: &JsonObject) -> Result<Option<ObjectRecord>> {
        Ok(Self::load_records(conn)?
            .into_iter()
            .find(|record| matches_filter(record, filter)))
    }
}

#[async_trait]
impl ObjectStore for InternalStore {
    async fn save_object(
        &self,
        register: &Register,
        schema: &Schema,
        object: JsonObject,
    ) -> Result<ObjectRecord> {
        let now = Utc::now();
        let payload = serde_json::to_string(&object)?;
        let conn = self.conn.lock().await;

        if let Some(uuid) = object.get("id").and_then(|v| v.as_str()) {
            // Update existing object
            tracing::debug!("updating object {} in register {}", uuid, register.id);
            let changed = conn.execute(
                "UPDATE objects
                 SET register = ?1, schema = ?2, object = ?3, updated_at = ?4
                 WHERE uuid = ?5",
                params![register.id, schema.id, payload, now.to_rfc3339(), uuid],
            )?;

            if changed == 0 {
                return Err(GatewayError::NotFound);
            }

            Self::get_record(&conn, uuid)?.ok_or(GatewayError::NotFound)
        } else {
            // Create new object
            let uuid = Uuid::new_v4().to_string();
            tracing::debug!("inserting object {} into register {}", uuid, register.id);
            conn.execute(
                "INSERT INTO objects (uuid, register, schema, object, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    uuid,
                    register.id,
                    schema.id,
                    payload,
                    now.to_rfc3339(),
                    now.to_rfc3339()
                ],
            )?;

            Ok(ObjectRecord {
                uuid,
                register: register.id,
                schema: schema.id,
                object,
                created_at: now,
                updated_at: now,
            })
        }
    }

    async fn find_objects(&self, filter: &JsonObject) -> Result<Vec<JsonObject>> {
        let conn = self.conn.lock().await;
        Ok(Self::load_records(&conn)?
            .iter()
            .filter(|record| matches_filter(record, filter))
            .map(ObjectRecord::to_document)
            .collect())
    }

    async fn find_object(&self, filter: &JsonObject) -> Result<JsonObject> {
        let conn = self.conn.lock().await;
        Self::first_match(&conn, filter)?
            .map(|record| record.to_document())
            .ok_or(GatewayError::NotFound)
    }

    async fn update_object(&self, filter: &JsonObject, update: &JsonObject) -> Result<JsonObject> {
        {
            let conn = self.conn.lock().await;
            let mut record = Self::first_match(&conn, filter)?.ok_or(GatewayError::NotFound)?;

            for (key, value) in update {
                record.object.insert(key.clone(), value.clone());
            }

            let payload = serde_json::to_string(&record.object)?;
            conn.execute(
                "UPDATE objects SET object = ?1, updated_at = ?2 WHERE uuid = ?3",
                params![payload, Utc::now().to_rfc3339(), record.uuid],
            )?;
        }

        // The visible result is always a fresh read with the same filter.
        self.find_object(filter).await
    }

    async fn delete_object(&self, filter: &JsonObject) -> Result<()> {
        let conn = self.conn.lock().await;

        if let Some(record) = Self::first_match(&conn, filter)? {
            tracing::debug!("deleting object {}", record.uuid);
            conn.execute("DELETE FROM objects WHERE uuid = ?1", params![record.uuid])?;
        }

        Ok(())
    }

    async fn aggregate_objects(
        &self,
        _filter: &JsonObject,
        _pipeline: &[serde_json::Value],
    ) -> Result<Vec<JsonObject>> {
        Err(GatewayError::UnsupportedOperation {
            operation: "aggregate",
        })
    }
}

/// Equality match of filter fields against a stored record. The `id` key
/// compares against the record identifier; every other key compares against
/// the payload field of the same name.
fn matches_filter(record: &ObjectRecord, filter: &JsonObject) -> bool {
    filter.iter().all(|(key, expected)| {
        if key == "id" {
            expected.as_str() == Some(record.uuid.as_str())
        } else {
            record.object.get(key) == Some(expected)
        }
    })
}

fn parse_record_row(row: &Row<'_>) -> Result<ObjectRecord> {
    let payload: String = row.get("object")?;
    let object: JsonObject = serde_json::from_str(&payload)?;

    let created_at: String = row.get("created_at")?;
    let updated_at: String = row.get("updated_at")?;

    Ok(ObjectRecord {
        uuid: row.get("uuid")?,
        register: row.get("register")?,
        schema: row.get("schema")?,
        object,
        created_at: parse_timestamp(&created_at, "created_at")?,
        updated_at: parse_timestamp(&updated_at, "updated_at")?,
    })
}

fn parse_timestamp(value: &str, column: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| GatewayError::InvalidRecord {
            message: format!("invalid timestamp `{}` in objects.{}: {}", value, column, e),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn internal_register() -> Register {
        Register {
            id: 1,
            title: "People".to_string(),
            source: crate::domain::model::RegisterSource::Internal,
        }
    }

    fn person_schema() -> Schema {
        Schema {
            id: 1,
            title: "Person".to_string(),
            version: Some("1.0".to_string()),
        }
    }

    fn object(value: serde_json::Value) -> JsonObject {
        value.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn test_save_without_id_inserts_and_assigns_uuid() {
        let store = InternalStore::open_in_memory().unwrap();

        let record = store
            .save_object(
                &internal_register(),
                &person_schema(),
                object(json!({"name": "Ada"})),
            )
            .await
            .unwrap();

        assert!(Uuid::parse_str(&record.uuid).is_ok());
        assert_eq!(record.register, 1);
        assert_eq!(record.schema, 1);

        let all = store.find_objects(&JsonObject::new()).await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].get("name").and_then(|v| v.as_str()), Some("Ada"));
    }

    #[tokio::test]
    async fn test_save_with_id_updates_in_place() {
        let store = InternalStore::open_in_memory().unwrap();
        let register = internal_register();
        let schema = person_schema();

        let inserted = store
            .save_object(&register, &schema, object(json!({"name": "Ada"})))
            .await
            .unwrap();

        let updated = store
            .save_object(
                &register,
                &schema,
                object(json!({"id": inserted.uuid, "name": "Ada Lovelace"})),
            )
            .await
            .unwrap();

        assert_eq!(updated.uuid, inserted.uuid);
        assert_eq!(updated.created_at, inserted.created_at);

        let all = store.find_objects(&JsonObject::new()).await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(
            all[0].get("name").and_then(|v| v.as_str()),
            Some("Ada Lovelace")
        );
    }

    #[tokio::test]
    async fn test_save_with_unknown_id_is_not_found() {
        let store = InternalStore::open_in_memory().unwrap();

        let result = store
            .save_object(
                &internal_register(),
                &person_schema(),
                object(json!({"id": "no-such-record", "name": "Ghost"})),
            )
            .await;

        assert!(matches!(result, Err(GatewayError::NotFound)));
    }

    #[tokio::test]
    async fn test_find_object_by_id_filter() {
        let store = InternalStore::open_in_memory().unwrap();

        let record = store
            .save_object(
                &internal_register(),
                &person_schema(),
                object(json!({"name": "Grace"})),
            )
            .await
            .unwrap();

        let found = store
            .find_object(&object(json!({"id": record.uuid})))
            .await
            .unwrap();
        assert_eq!(found.get("name").and_then(|v| v.as_str()), Some("Grace"));

        let missing = store
            .find_object(&object(json!({"id": "unknown"})))
            .await;
        assert!(matches!(missing, Err(GatewayError::NotFound)));
    }

    #[tokio::test]
    async fn test_update_object_returns_fresh_read() {
        let store = InternalStore::open_in_memory().unwrap();

        let record = store
            .save_object(
                &internal_register(),
                &person_schema(),
                object(json!({"name": "Grace", "role": "engineer"})),
            )
            .await
            .unwrap();

        let result = store
            .update_object(
                &object(json!({"id": record.uuid})),
                &object(json!({"role": "admiral"})),
            )
            .await
            .unwrap();

        assert_eq!(result.get("name").and_then(|v| v.as_str()), Some("Grace"));
        assert_eq!(result.get("role").and_then(|v| v.as_str()), Some("admiral"));
    }

    #[tokio::test]
    async fn test_delete_object_is_empty_result_either_way() {
        let store = InternalStore::open_in_memory().unwrap();

        let record = store
            .save_object(
                &internal_register(),
                &person_schema(),
                object(json!({"name": "Ada"})),
            )
            .await
            .unwrap();

        let filter = object(json!({"id": record.uuid}));
        store.delete_object(&filter).await.unwrap();
        // Second delete with no matching document still succeeds.
        store.delete_object(&filter).await.unwrap();

        let all = store.find_objects(&JsonObject::new()).await.unwrap();
        assert!(all.is_empty());
    }

    #[tokio::test]
    async fn test_aggregate_is_unsupported() {
        let store = InternalStore::open_in_memory().unwrap();

        let result = store
            .aggregate_objects(&JsonObject::new(), &[json!({"$count": "total"})])
            .await;

        assert!(matches!(
            result,
            Err(GatewayError::UnsupportedOperation { operation: "aggregate" })
        ));
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A semantically untyped object payload, as exchanged with both backends.
pub type JsonObject = serde_json::Map<String, serde_json::Value>;

/// Connection parameters for a remote document data API, validated once per
/// backend instance rather than re-derived on every call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// Base URL of the data API; actions are POSTed to `<endpoint>/action/<op>`.
    pub endpoint: String,
    /// Target cluster name, sent as `dataSource` in every request envelope.
    pub data_source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

/// Closed set of storage backends a register can declare.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegisterSource {
    Internal,
    RemoteDocument(RemoteConfig),
}

impl RegisterSource {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Internal => "internal",
            Self::RemoteDocument(_) => "remote-document",
        }
    }
}

/// Logical collection of objects with its own storage backend.
#[derive(Debug, Clone)]
pub struct Register {
    pub id: i64,
    pub title: String,
    pub source: RegisterSource,
}

/// Shape/version descriptor for objects belonging to a register.
#[derive(Debug, Clone)]
pub struct Schema {
    pub id: i64,
    pub title: String,
    pub version: Option<String>,
}

/// The persisted form of an object: its register and schema references, a
/// generated or caller-supplied identifier, and the raw payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectRecord {
    pub uuid: String,
    pub register: i64,
    pub schema: i64,
    pub object: JsonObject,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ObjectRecord {
    /// Payload with the record identifier exposed under `id`, the shape
    /// callers see from find operations.
    pub fn to_document(&self) -> JsonObject {
        let mut doc = self.object.clone();
        doc.insert(
            "id".to_string(),
            serde_json::Value::String(self.uuid.clone()),
        );
        doc
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_kind_labels() {
        assert_eq!(RegisterSource::Internal.kind(), "internal");

        let remote = RegisterSource::RemoteDocument(RemoteConfig {
            endpoint: "https://data.example.com/app".to_string(),
            data_source: "Cluster0".to_string(),
            api_key: None,
        });
        assert_eq!(remote.kind(), "remote-document");
    }

    #[test]
    fn test_to_document_exposes_uuid_as_id() {
        let mut object = JsonObject::new();
        object.insert(
            "name".to_string(),
            serde_json::Value::String("Item".to_string()),
        );

        let record = ObjectRecord {
            uuid: "0b5c6a52-1fb2-4f6e-9c3a-000000000001".to_string(),
            register: 1,
            schema: 1,
            object,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let doc = record.to_document();
        assert_eq!(
            doc.get("id").and_then(|v| v.as_str()),
            Some("0b5c6a52-1fb2-4f6e-9c3a-000000000001")
        );
        assert_eq!(doc.get("name").and_then(|v| v.as_str()), Some("Item"));
    }
}

use crate::domain::model::{JsonObject, ObjectRecord, Register, RemoteConfig, Schema};
use crate::domain::ports::ObjectStore;
use crate::utils::error::{GatewayError, Result};
use crate::utils::validation;
use async_trait::async_trait;
use reqwest::Client;

/// Client for a document database reached through an HTTP data API.
///
/// Every operation POSTs a JSON envelope of the form
/// `{dataSource, filter, ...operation-specific fields}` to a fixed
/// per-operation path under `action/`. One reqwest client per store;
/// the configuration is validated once at construction.
pub struct RemoteDocumentStore {
    config: RemoteConfig,
    client: Client,
}

impl RemoteDocumentStore {
    pub fn new(config: RemoteConfig) -> Result<Self> {
        validation::validate_url("endpoint", &config.endpoint)?;
        validation::validate_non_empty("data_source", &config.data_source)?;

        Ok(Self {
            config,
            client: Client::new(),
        })
    }

    fn action_url(&self, action: &str) -> String {
        format!(
            "{}/action/{}",
            self.config.endpoint.trim_end_matches('/'),
            action
        )
    }

    async fn post_action(&self, action: &str, body: &serde_json::Value) -> Result<serde_json::Value> {
        let url = self.action_url(action);
        tracing::debug!("posting data API action `{}` to {}", action, url);

        let mut request = self.client.post(&url).json(body);
        if let Some(api_key) = &self.config.api_key {
            request = request.header("api-key", api_key);
        }

        let response = request.send().await?;
        let status = response.status();
        tracing::debug!("data API response status: {}", status);

        if !status.is_success() {
            return Err(GatewayError::RemoteStatus {
                action: action.to_string(),
                status: status.as_u16(),
            });
        }

        // Read the body as text first so a malformed payload surfaces as a
        // decode failure rather than a transport one.
        let text = response.text().await?;
        Ok(serde_json::from_str(&text)?)
    }

    fn envelope(&self, filter: &JsonObject) -> serde_json::Value {
        serde_json::json!({
            "dataSource": self.config.data_source,
            "filter": filter,
        })
    }
}

#[async_trait]
impl ObjectStore for RemoteDocumentStore {
    async fn save_object(
        &self,
        register: &Register,
        _schema: &Schema,
        _object: JsonObject,
    ) -> Result<ObjectRecord> {
        // Writes through the register/schema save path are only implemented
        // for internal registers.
        Err(GatewayError::UnsupportedSource {
            source: register.source.kind().to_string(),
        })
    }

    async fn find_objects(&self, filter: &JsonObject) -> Result<Vec<JsonObject>> {
        let body = self.envelope(filter);
        let response = self.post_action("find", &body).await?;
        Ok(serde_json::from_value(response)?)
    }

    async fn find_object(&self, filter: &JsonObject) -> Result<JsonObject> {
        let body = self.envelope(filter);
        let response = self.post_action("findOne", &body).await?;

        match response.get("document") {
            Some(document) if !document.is_null() => Ok(serde_json::from_value(document.clone())?),
            _ => Err(GatewayError::NotFound),
        }
    }

    async fn update_object(&self, filter: &JsonObject, update: &JsonObject) -> Result<JsonObject> {
        let mut body = self.envelope(filter);
        body["update"] = serde_json::json!({ "$set": update });
        body["upsert"] = serde_json::Value::Bool(true);

        // The acknowledgment is discarded; the visible result is always a
        // fresh read with the same filter.
        self.post_action("updateOne", &body).await?;
        self.find_object(filter).await
    }

    async fn delete_object(&self, filter: &JsonObject) -> Result<()> {
        let body = self.envelope(filter);

        // No deletion count is surfaced; the result is empty whether or not
        // a document matched.
        self.post_action("deleteOne", &body).await?;
        Ok(())
    }

    async fn aggregate_objects(
        &self,
        filter: &JsonObject,
        pipeline: &[serde_json::Value],
    ) -> Result<Vec<JsonObject>> {
        let mut body = self.envelope(filter);
        body["pipeline"] = serde_json::Value::Array(pipeline.to_vec());

        let response = self.post_action("aggregate", &body).await?;
        Ok(serde_json::from_value(response)?)
    }
}

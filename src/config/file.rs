use crate::domain::model::{Register, RegisterSource, RemoteConfig, Schema};
use crate::utils::error::{GatewayError, Result};
use crate::utils::validation::{validate_non_empty, validate_path, validate_url, Validate};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    pub database: DatabaseConfig,
    #[serde(default)]
    pub registers: Vec<RegisterConfig>,
    #[serde(default)]
    pub schemas: Vec<SchemaConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterConfig {
    pub id: i64,
    pub title: String,
    pub source: String,
    pub endpoint: Option<String>,
    pub data_source: Option<String>,
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaConfig {
    pub id: i64,
    pub title: String,
    pub version: Option<String>,
}

impl GatewayConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(GatewayError::Io)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| GatewayError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replace `${VAR_NAME}` placeholders with environment values; unknown
    /// variables are left as-is.
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").unwrap();

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// All configured registers converted to their domain form.
    pub fn registers(&self) -> Result<Vec<Register>> {
        self.registers.iter().map(RegisterConfig::to_register).collect()
    }

    pub fn register(&self, id: i64) -> Result<Register> {
        self.registers
            .iter()
            .find(|r| r.id == id)
            .ok_or_else(|| GatewayError::ConfigError {
                message: format!("no register with id {} is configured", id),
            })?
            .to_register()
    }

    pub fn schema(&self, id: i64) -> Result<Schema> {
        self.schemas
            .iter()
            .find(|s| s.id == id)
            .map(SchemaConfig::to_schema)
            .ok_or_else(|| GatewayError::ConfigError {
                message: format!("no schema with id {} is configured", id),
            })
    }
}

impl RegisterConfig {
    pub fn to_register(&self) -> Result<Register> {
        let source = match self.source.as_str() {
            "internal" => RegisterSource::Internal,
            "remote-document" => {
                let endpoint = self.endpoint.clone().ok_or_else(|| {
                    GatewayError::ConfigError {
                        message: format!(
                            "register {} declares a remote-document source without an endpoint",
                            self.id
                        ),
                    }
                })?;
                let data_source = self.data_source.clone().ok_or_else(|| {
                    GatewayError::ConfigError {
                        message: format!(
                            "register {} declares a remote-document source without a data_source",
                            self.id
                        ),
                    }
                })?;

                RegisterSource::RemoteDocument(RemoteConfig {
                    endpoint,
                    data_source,
                    api_key: self.api_key.clone(),
                })
            }
            other => {
                return Err(GatewayError::UnsupportedSource {
                    source: other.to_string(),
                })
            }
        };

        Ok(Register {
            id: self.id,
            title: self.title.clone(),
            source,
        })
    }
}

impl SchemaConfig {
    pub fn to_schema(&self) -> Schema {
        Schema {
            id: self.id,
            title: self.title.clone(),
            version: self.version.clone(),
        }
    }
}

impl Validate for GatewayConfig {
    fn validate(&self) -> Result<()> {
        validate_path("database.path", &self.database.path)?;

        let mut register_ids = HashSet::new();
        for register in &self.registers {
            if !register_ids.insert(register.id) {
                return Err(GatewayError::ConfigError {
                    message: format!("duplicate register id {}", register.id),
                });
            }

            // Converting eagerly rejects unknown sources and incomplete
            // remote parameters before any backend is built.
            let converted = register.to_register()?;
            if let RegisterSource::RemoteDocument(remote) = &converted.source {
                validate_url("registers.endpoint", &remote.endpoint)?;
                validate_non_empty("registers.data_source", &remote.data_source)?;
            }
        }

        let mut schema_ids = HashSet::new();
        for schema in &self.schemas {
            if !schema_ids.insert(schema.id) {
                return Err(GatewayError::ConfigError {
                    message: format!("duplicate schema id {}", schema.id),
                });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_CONFIG: &str = r#"
        [database]
        path = "objects.db"

        [[registers]]
        id = 1
        title = "People"
        source = "internal"

        [[registers]]
        id = 2
        title = "Publications"
        source = "remote-document"
        endpoint = "https://data.example.com/app/data-xyz/endpoint/data/v1"
        data_source = "Cluster0"
        api_key = "secret"

        [[schemas]]
        id = 1
        title = "Person"
        version = "1.0"
    "#;

    #[test]
    fn test_parse_sample_config() {
        let config = GatewayConfig::from_toml_str(SAMPLE_CONFIG).unwrap();

        assert_eq!(config.database.path, "objects.db");
        assert_eq!(config.registers.len(), 2);
        assert_eq!(config.schemas.len(), 1);
        config.validate().unwrap();

        let register = config.register(2).unwrap();
        match register.source {
            RegisterSource::RemoteDocument(remote) => {
                assert_eq!(remote.data_source, "Cluster0");
                assert_eq!(remote.api_key.as_deref(), Some("secret"));
            }
            RegisterSource::Internal => panic!("expected remote-document source"),
        }
    }

    #[test]
    fn test_unknown_source_is_unsupported() {
        let config = GatewayConfig::from_toml_str(
            r#"
            [database]
            path = "objects.db"

            [[registers]]
            id = 1
            title = "Legacy"
            source = "carrier-pigeon"
            "#,
        )
        .unwrap();

        let result = config.register(1);
        assert!(matches!(
            result,
            Err(GatewayError::UnsupportedSource { ref source }) if source == "carrier-pigeon"
        ));
    }

    #[test]
    fn test_remote_register_without_endpoint_fails_validation() {
        let config = GatewayConfig::from_toml_str(
            r#"
            [database]
            path = "objects.db"

            [[registers]]
            id = 1
            title = "Publications"
            source = "remote-document"
            data_source = "Cluster0"
            "#,
        )
        .unwrap();

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_duplicate_register_id_fails_validation() {
        let config = GatewayConfig::from_toml_str(
            r#"
            [database]
            path = "objects.db"

            [[registers]]
            id = 1
            title = "A"
            source = "internal"

            [[registers]]
            id = 1
            title = "B"
            source = "internal"
            "#,
        )
        .unwrap();

        assert!(matches!(
            config.validate(),
            Err(GatewayError::ConfigError { .. })
        ));
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("OBJECT_GATEWAY_TEST_KEY", "from-env");

        let config = GatewayConfig::from_toml_str(
            r#"
            [database]
            path = "objects.db"

            [[registers]]
            id = 1
            title = "Publications"
            source = "remote-document"
            endpoint = "https://data.example.com/endpoint"
            data_source = "Cluster0"
            api_key = "${OBJECT_GATEWAY_TEST_KEY}"
            "#,
        )
        .unwrap();

        assert_eq!(config.registers[0].api_key.as_deref(), Some("from-env"));
    }

    #[test]
    fn test_unknown_env_var_is_left_as_is() {
        let content = GatewayConfig::substitute_env_vars("key = \"${NO_SUCH_VAR_SET}\"").unwrap();
        assert_eq!(content, "key = \"${NO_SUCH_VAR_SET}\"");
    }
}

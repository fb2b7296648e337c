//! The parameter record handed over by the orchestration host
//!
//! One JSON object per invocation; unknown fields are rejected so typos in a
//! playbook fail loudly instead of silently writing to the wrong place.

use scribe_common::{Result, ScribeError};
use scribe_mongodb::connection::{DEFAULT_HOST, DEFAULT_PORT};
use scribe_mongodb::{json_to_document, ConnectionParams, WriteAction, WriteRequest};
use serde::Deserialize;

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TaskParams {
    #[serde(default)]
    pub login_user: Option<String>,
    #[serde(default)]
    pub login_password: Option<String>,
    #[serde(default = "default_host")]
    pub login_host: String,
    #[serde(default = "default_port")]
    pub login_port: u16,
    #[serde(default)]
    pub login_database: Option<String>,
    pub database: String,
    pub db_object: String,
    pub action: WriteAction,
    #[serde(default = "empty_object")]
    pub data: serde_json::Value,
    #[serde(default = "empty_object")]
    pub filter: serde_json::Value,
}

fn default_host() -> String {
    DEFAULT_HOST.to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn empty_object() -> serde_json::Value {
    serde_json::Value::Object(serde_json::Map::new())
}

// Manual impl so login_password never lands in logs
impl std::fmt::Debug for TaskParams {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskParams")
            .field("login_user", &self.login_user)
            .field("login_password", &self.login_password.as_ref().map(|_| "***"))
            .field("login_host", &self.login_host)
            .field("login_port", &self.login_port)
            .field("login_database", &self.login_database)
            .field("database", &self.database)
            .field("db_object", &self.db_object)
            .field("action", &self.action)
            .field("data", &self.data)
            .field("filter", &self.filter)
            .finish()
    }
}

impl TaskParams {
    /// Parses the host's JSON record
    pub fn from_json_str(text: &str) -> Result<Self> {
        serde_json::from_str(text)
            .map_err(|e| ScribeError::Validation(format!("invalid parameter record: {}", e)))
    }

    /// Connection half of the record
    pub fn connection_params(&self) -> ConnectionParams {
        ConnectionParams {
            host: self.login_host.clone(),
            port: self.login_port,
            user: self.login_user.clone(),
            password: self.login_password.clone(),
            auth_database: self.login_database.clone(),
        }
    }

    /// Write half of the record, validated
    pub fn write_request(&self) -> Result<WriteRequest> {
        let data = json_to_document("data", &self.data)?;
        let filter = json_to_document("filter", &self.filter)?;
        WriteRequest::new(&self.database, &self.db_object, self.action, data, filter)
    }
}

//! Write executor: exactly one mutating operation per invocation
//!
//! The three actions map to two driver calls: `insert_one`, and `update_one`
//! with upsert off (update) or on (upsert). Plain update documents are
//! wrapped in `$set`; documents already carrying update operators pass
//! through unchanged.

use bson::{doc, Bson, Document};
use scribe_common::{Result, ScribeError};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::{debug, info};

use crate::connection::Connection;
use crate::validation::{self, ValidatedName};

/// The write action requested by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WriteAction {
    Insert,
    Update,
    Upsert,
}

impl WriteAction {
    /// The lowercase action name used in parameters, errors, and logs
    pub fn as_str(&self) -> &'static str {
        match self {
            WriteAction::Insert => "insert",
            WriteAction::Update => "update",
            WriteAction::Upsert => "upsert",
        }
    }
}

impl std::fmt::Display for WriteAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WriteAction {
    type Err = ScribeError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "insert" => Ok(WriteAction::Insert),
            "update" => Ok(WriteAction::Update),
            "upsert" => Ok(WriteAction::Upsert),
            other => Err(ScribeError::Validation(format!(
                "action must be one of insert, update, upsert; got '{}'",
                other
            ))),
        }
    }
}

/// A fully validated write request
#[derive(Debug, Clone)]
pub struct WriteRequest {
    pub database: ValidatedName,
    pub collection: ValidatedName,
    pub action: WriteAction,
    pub data: Document,
    pub filter: Document,
}

impl WriteRequest {
    /// Validates names and document shapes for the given action
    ///
    /// The filter is only meaningful for update/upsert; inserts take `data`
    /// as the new record and refuse operator keys in it.
    pub fn new(
        database: &str,
        collection: &str,
        action: WriteAction,
        data: Document,
        filter: Document,
    ) -> Result<Self> {
        let database = ValidatedName::database(database)?;
        let collection = ValidatedName::collection(collection)?;

        match action {
            WriteAction::Insert => {
                if let Some(key) = data.keys().find(|key| key.starts_with('$')) {
                    return Err(ScribeError::Validation(format!(
                        "insert data cannot contain operator key '{}'",
                        key
                    )));
                }
            }
            WriteAction::Update | WriteAction::Upsert => {
                validation::validate_filter_document(&filter)?;
                validation::validate_update_document(&data)?;
            }
        }

        Ok(Self {
            database,
            collection,
            action,
            data,
            filter,
        })
    }
}

/// Result reported back to the host
///
/// `changed` is always true on success; `content` carries the identifier of
/// an upserted record and is empty otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WriteOutcome {
    pub changed: bool,
    pub content: String,
}

impl WriteOutcome {
    fn done() -> Self {
        Self {
            changed: true,
            content: String::new(),
        }
    }

    fn upserted(content: String) -> Self {
        Self {
            changed: true,
            content,
        }
    }
}

/// Performs the single write described by a request
pub struct WriteExecutor;

impl WriteExecutor {
    /// Executes the request over an established connection
    ///
    /// Exactly one mutating driver call is issued; any driver failure is
    /// surfaced as a `Write` error carrying the action name.
    pub async fn execute(connection: &Connection, request: &WriteRequest) -> Result<WriteOutcome> {
        let collection = connection
            .database(request.database.as_str())
            .collection::<Document>(request.collection.as_str());

        debug!(
            "executing {} on {}.{}",
            request.action, request.database, request.collection
        );

        let outcome = match request.action {
            WriteAction::Insert => {
                collection
                    .insert_one(request.data.clone())
                    .await
                    .map_err(|e| ScribeError::write("insert", e.to_string()))?;
                WriteOutcome::done()
            }
            WriteAction::Update => {
                let result = collection
                    .update_one(request.filter.clone(), update_modifications(&request.data))
                    .await
                    .map_err(|e| ScribeError::write("update", e.to_string()))?;
                debug!(
                    "matched {}, modified {}",
                    result.matched_count, result.modified_count
                );
                WriteOutcome::done()
            }
            WriteAction::Upsert => {
                let result = collection
                    .update_one(request.filter.clone(), update_modifications(&request.data))
                    .upsert(true)
                    .await
                    .map_err(|e| ScribeError::write("upsert", e.to_string()))?;
                match result.upserted_id {
                    Some(id) => WriteOutcome::upserted(id_to_content(&id)),
                    None => WriteOutcome::done(),
                }
            }
        };

        info!(
            "{} on {}.{} succeeded",
            request.action, request.database, request.collection
        );
        Ok(outcome)
    }
}

/// Wraps a plain document in `$set`; operator documents pass through
fn update_modifications(data: &Document) -> Document {
    if validation::has_update_operators(data) {
        data.clone()
    } else {
        doc! { "$set": data.clone() }
    }
}

/// Renders an upserted id for the result envelope (hex for ObjectIds)
fn id_to_content(id: &Bson) -> String {
    match id {
        Bson::ObjectId(oid) => oid.to_hex(),
        Bson::String(s) => s.clone(),
        other => other.to_string(),
    }
}

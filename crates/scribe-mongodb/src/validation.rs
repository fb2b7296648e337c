//! Input validation for write requests
//!
//! The host hands `data` and `filter` over as native JSON; this module is the
//! strict boundary that turns them into BSON documents and refuses anything
//! that is not a plain object, plus name validation for the target database
//! and collection to keep operator and system-namespace injection out.

use bson::Document;
use scribe_common::{Result, ScribeError};

/// Maximum allowed length for collection names (MongoDB limit is 255, we're more conservative)
const MAX_COLLECTION_NAME_LENGTH: usize = 120;

/// Maximum allowed length for database names (server limit on Windows paths)
const MAX_DATABASE_NAME_LENGTH: usize = 63;

/// Characters MongoDB rejects in database names
const DATABASE_FORBIDDEN_CHARS: &[char] =
    &['/', '\\', '.', ' ', '"', '$', '*', '<', '>', ':', '|', '?'];

/// Validated database or collection name
///
/// # Guarantees
/// - Not empty
/// - Length-capped
/// - No null bytes
/// - No `$` characters
/// - Collections: no `system.` prefix (reserved namespaces)
/// - Databases: none of the server-rejected path characters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedName {
    name: String,
}

impl ValidatedName {
    /// Validates a collection name
    pub fn collection(name: &str) -> Result<Self> {
        Self::common(name, "Collection", MAX_COLLECTION_NAME_LENGTH)?;

        if name.starts_with("system.") {
            return Err(ScribeError::Validation(format!(
                "Collection name cannot start with 'system.' (reserved): '{}'",
                name
            )));
        }

        if name.contains('$') {
            return Err(ScribeError::Validation(format!(
                "Collection name cannot contain '$' character: '{}'",
                name
            )));
        }

        Ok(ValidatedName {
            name: name.to_string(),
        })
    }

    /// Validates a database name
    pub fn database(name: &str) -> Result<Self> {
        Self::common(name, "Database", MAX_DATABASE_NAME_LENGTH)?;

        if let Some(bad) = name.chars().find(|c| DATABASE_FORBIDDEN_CHARS.contains(c)) {
            return Err(ScribeError::Validation(format!(
                "Database name cannot contain '{}': '{}'",
                bad, name
            )));
        }

        Ok(ValidatedName {
            name: name.to_string(),
        })
    }

    fn common(name: &str, kind: &str, max_len: usize) -> Result<()> {
        if name.is_empty() {
            return Err(ScribeError::Validation(format!(
                "{} name cannot be empty",
                kind
            )));
        }

        if name.len() > max_len {
            return Err(ScribeError::Validation(format!(
                "{} name exceeds maximum length of {} characters: '{}'",
                kind, max_len, name
            )));
        }

        if name.contains('\0') {
            return Err(ScribeError::Validation(format!(
                "{} name cannot contain null bytes",
                kind
            )));
        }

        Ok(())
    }

    /// Returns the validated name as a string slice
    pub fn as_str(&self) -> &str {
        &self.name
    }

    /// Consumes the ValidatedName and returns the inner String
    pub fn into_string(self) -> String {
        self.name
    }
}

impl AsRef<str> for ValidatedName {
    fn as_ref(&self) -> &str {
        &self.name
    }
}

impl std::fmt::Display for ValidatedName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Update operators accepted at the top level of `data`
const UPDATE_OPERATORS: &[&str] = &[
    "$set", "$unset", "$inc", "$mul", "$rename", "$setOnInsert", "$min", "$max", "$currentDate",
    "$addToSet", "$pop", "$pull", "$push", "$pullAll",
];

/// Query operators accepted at the top level of `filter`
const QUERY_OPERATORS: &[&str] = &[
    "$and", "$or", "$nor", "$not", "$expr", "$text", "$where", "$jsonSchema", "$comment",
];

/// Converts a JSON value into a BSON document, accepting only objects
///
/// `what` names the parameter ("data" / "filter") in error messages.
pub fn json_to_document(what: &str, value: &serde_json::Value) -> Result<Document> {
    if !value.is_object() {
        return Err(ScribeError::Validation(format!(
            "{} must be a JSON object, got {}",
            what,
            json_type_name(value)
        )));
    }

    bson::to_document(value)
        .map_err(|e| ScribeError::Serialization(format!("{} is not valid BSON: {}", what, e)))
}

fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

/// Checks top-level `$` keys in a filter against the known query operators
pub fn validate_filter_document(filter: &Document) -> Result<()> {
    for key in filter.keys() {
        if key.starts_with('$') && !QUERY_OPERATORS.contains(&key.as_str()) {
            return Err(ScribeError::Validation(format!(
                "filter contains unknown top-level operator: '{}'",
                key
            )));
        }
    }
    Ok(())
}

/// Checks the shape of an update `data` document
///
/// Either every top-level key is a known update operator, or none is: a
/// plain document gets wrapped in `$set` by the executor, and mixing the two
/// forms is refused the same way the server would refuse it.
pub fn validate_update_document(data: &Document) -> Result<()> {
    if !has_update_operators(data) {
        for key in data.keys() {
            if key.starts_with('$') {
                return Err(ScribeError::Validation(format!(
                    "data contains unknown top-level operator: '{}'",
                    key
                )));
            }
        }
        return Ok(());
    }

    for key in data.keys() {
        if !key.starts_with('$') {
            return Err(ScribeError::Validation(format!(
                "data cannot mix update operators with plain field '{}'",
                key
            )));
        }
        if !UPDATE_OPERATORS.contains(&key.as_str()) {
            return Err(ScribeError::Validation(format!(
                "data contains unknown top-level operator: '{}'",
                key
            )));
        }
    }
    Ok(())
}

/// True when the document carries known top-level update operators
pub fn has_update_operators(data: &Document) -> bool {
    data.keys()
        .any(|key| UPDATE_OPERATORS.contains(&key.as_str()))
}

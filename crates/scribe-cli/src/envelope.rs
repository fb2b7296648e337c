//! Result envelope printed on stdout
//!
//! The host reads exactly one JSON object: `{"changed": true, "content": ..}`
//! on success, `{"failed": true, "msg": "<stage>: <cause>"}` on failure.

use scribe_common::ScribeError;
use scribe_mongodb::WriteOutcome;
use serde::Serialize;

#[derive(Debug, Serialize)]
struct FailureEnvelope {
    failed: bool,
    msg: String,
}

/// Renders the success envelope for a completed write
pub fn success(outcome: &WriteOutcome) -> String {
    // WriteOutcome serializes to exactly the envelope shape
    serde_json::to_string(outcome).expect("outcome is always serializable")
}

/// Renders the failure envelope, naming the failing stage
pub fn failure(err: &ScribeError) -> String {
    let envelope = FailureEnvelope {
        failed: true,
        msg: format!("{}: {}", err.stage(), err.message()),
    };
    serde_json::to_string(&envelope).expect("envelope is always serializable")
}

//! Static context lookup store.
//!
//! A small read-only JSON array keyed by a `context_id` field. Lookup
//! faults — missing file, corrupt JSON, no match — are folded into the
//! returned error string; they are logged by the caller but never abort
//! the pipeline, which proceeds with an empty context.

use std::path::PathBuf;

use serde_json::Value;
use tracing::{debug, warn};

use precall_shared::ContextRecord;

/// Looks up campaign/lead context records by id.
pub struct ContextStore {
    path: PathBuf,
}

impl ContextStore {
    /// Create a store reading from the given JSON file.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Look up a context record by `context_id`.
    ///
    /// Returns the matching record, or an empty record plus an error
    /// string when nothing usable was found.
    pub fn lookup(&self, context_id: &str) -> (ContextRecord, Option<String>) {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) => {
                let msg = format!(
                    "context database {} not readable: {e}",
                    self.path.display()
                );
                warn!(path = ?self.path, error = %e, "context database missing");
                return (ContextRecord::empty(), Some(msg));
            }
        };

        let entries: Vec<Value> = match serde_json::from_str(&content) {
            Ok(entries) => entries,
            Err(e) => {
                let msg = format!("invalid JSON in context database: {e}");
                warn!(path = ?self.path, error = %e, "context database corrupt");
                return (ContextRecord::empty(), Some(msg));
            }
        };

        for entry in entries {
            if entry.get("context_id").and_then(Value::as_str) == Some(context_id) {
                if let Value::Object(map) = entry {
                    debug!(context_id, "context record found");
                    return (ContextRecord(map), None);
                }
            }
        }

        let msg = format!("context id '{context_id}' not found in database");
        warn!(context_id, "context record not found");
        (ContextRecord::empty(), Some(msg))
    }
}

//! JSON output formatting.
//!
//! The domain types already serialize to stable camel-free JSON through
//! their serde derives, so the JSON path is a thin wrapper around
//! `serde_json` with an optional pretty mode.

use anyhow::Result;
use serde::Serialize;

/// JSON formatter with optional pretty printing.
pub struct JsonFormatter {
    pretty: bool,
}

impl JsonFormatter {
    /// Creates a new JSON formatter.
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }

    /// Formats any serializable value.
    pub fn format<T: Serialize>(&self, data: &T) -> Result<String> {
        let json = if self.pretty {
            serde_json::to_string_pretty(data)?
        } else {
            serde_json::to_string(data)?
        };
        Ok(json)
    }
}

//! Output formatting

use serde_json::{Map, Value};

/// Collects fields for `--json` mode and a message for text mode
pub struct Output {
    json_mode: bool,
    fields: Map<String, Value>,
    message: Option<String>,
}

impl Output {
    /// Create a new output builder
    pub fn new(json_mode: bool) -> Self {
        Self {
            json_mode,
            fields: Map::new(),
            message: None,
        }
    }

    /// Add a string field
    pub fn field(mut self, key: &str, value: &str) -> Self {
        self.fields
            .insert(key.to_string(), Value::String(value.to_string()));
        self
    }

    /// Add a u64 field
    pub fn field_u64(mut self, key: &str, value: u64) -> Self {
        self.fields
            .insert(key.to_string(), Value::Number(value.into()));
        self
    }

    /// Add an arbitrary JSON field
    pub fn field_value(mut self, key: &str, value: Value) -> Self {
        self.fields.insert(key.to_string(), value);
        self
    }

    /// Set the text-mode message
    pub fn message(mut self, msg: impl Into<String>) -> Self {
        self.message = Some(msg.into());
        self
    }

    /// Print to stdout
    pub fn print(self) {
        if self.json_mode {
            let json = Value::Object(self.fields);
            println!("{}", serde_json::to_string_pretty(&json).unwrap_or_default());
        } else if let Some(msg) = self.message {
            println!("{msg}");
        }
    }
}

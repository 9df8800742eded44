use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;

use crate::ConfigurationError;

/// A JSON schema document compiled once, when the parameter is declared.
///
/// Schema semantics are entirely delegated to the [`jsonschema`] crate.
///
/// # Example
///
/// ```rust
/// use qrest_core::JsonSchema;
/// use serde_json::json;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let schema = JsonSchema::new(json!({
///     "type": "object",
///     "required": ["user", "body"],
/// }))?;
///
/// assert!(schema.is_valid(&json!({"user": "1", "body": "hello"})));
/// assert!(!schema.is_valid(&json!({"user": "1"})));
/// # Ok(())
/// # }
/// ```
#[derive(Clone, derive_more::Debug, Deserialize)]
#[serde(try_from = "Value")]
pub struct JsonSchema {
    document: Value,
    #[debug(skip)]
    validator: Arc<jsonschema::Validator>,
}

impl JsonSchema {
    /// Compiles a schema document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::InvalidSchema`] if the document is not a valid schema.
    pub fn new(document: Value) -> Result<Self, ConfigurationError> {
        let validator =
            jsonschema::validator_for(&document).map_err(|err| ConfigurationError::InvalidSchema {
                message: err.to_string(),
            })?;
        Ok(Self {
            document,
            validator: Arc::new(validator),
        })
    }

    /// The schema document.
    pub fn document(&self) -> &Value {
        &self.document
    }

    /// Returns `true` if the value satisfies the schema.
    pub fn is_valid(&self, value: &Value) -> bool {
        self.validator.is_valid(value)
    }
}

impl TryFrom<Value> for JsonSchema {
    type Error = ConfigurationError;

    fn try_from(document: Value) -> Result<Self, Self::Error> {
        Self::new(document)
    }
}

impl PartialEq for JsonSchema {
    fn eq(&self, other: &Self) -> bool {
        self.document == other.document
    }
}

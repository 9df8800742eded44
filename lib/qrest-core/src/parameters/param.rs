use serde::Deserialize;
use serde_json::Value;

use super::{ArgValue, CallArgs, JsonSchema};
use crate::ValidationError;

/// Where a parameter lands in the assembled request.
///
/// The declaration order is also the validation order of the request builder.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, derive_more::Display,
)]
#[serde(rename_all = "lowercase")]
pub enum ParameterKind {
    /// Substituted into a `{placeholder}` of the path template.
    #[display("path")]
    Path,
    /// Added to the query string.
    #[display("query")]
    Query,
    /// A field of the JSON body, or the whole body when it has no wire name.
    #[display("body")]
    Body,
    /// A part of a multipart body.
    #[display("file")]
    File,
}

/// One declared input of a resource.
///
/// A parameter is registered under a *call name* (the key callers use in [`CallArgs`]) and
/// sent under a *wire name*. The wire name defaults to the call name, except for body
/// parameters where a missing wire name means "this value is the whole body".
///
/// # Example
///
/// ```rust
/// use qrest_core::Parameter;
///
/// let user_id = Parameter::query("userId")
///     .with_description("the user ID of the author of the post");
///
/// let title = Parameter::body("title").required();
///
/// let order = Parameter::query("order")
///     .with_choices(["asc", "desc"])
///     .with_default("asc");
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Parameter {
    #[serde(rename = "in")]
    kind: ParameterKind,
    #[serde(default, rename = "name")]
    wire_name: Option<String>,
    #[serde(default)]
    required: bool,
    #[serde(default)]
    default: Option<Value>,
    #[serde(default)]
    choices: Option<Vec<Value>>,
    #[serde(default)]
    schema: Option<JsonSchema>,
    #[serde(default)]
    description: Option<String>,
}

// Create
impl Parameter {
    fn new(kind: ParameterKind, wire_name: Option<String>) -> Self {
        Self {
            kind,
            wire_name,
            required: false,
            default: None,
            choices: None,
            schema: None,
            description: None,
        }
    }

    /// A path parameter filling the `{placeholder}` segment. Path parameters are required.
    pub fn path(placeholder: impl Into<String>) -> Self {
        Self::new(ParameterKind::Path, Some(placeholder.into())).required()
    }

    /// A query string parameter.
    pub fn query(wire_name: impl Into<String>) -> Self {
        Self::new(ParameterKind::Query, Some(wire_name.into()))
    }

    /// A field of the JSON object body.
    pub fn body(wire_name: impl Into<String>) -> Self {
        Self::new(ParameterKind::Body, Some(wire_name.into()))
    }

    /// A parameter providing the entire JSON body.
    pub fn whole_body() -> Self {
        Self::new(ParameterKind::Body, None)
    }

    /// A file sent as a multipart part.
    pub fn file(wire_name: impl Into<String>) -> Self {
        Self::new(ParameterKind::File, Some(wire_name.into()))
    }

    /// Marks the parameter as required.
    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Value used when the caller does not supply one.
    #[must_use]
    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Restricts the accepted values.
    #[must_use]
    pub fn with_choices<I, V>(mut self, choices: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.choices = Some(choices.into_iter().map(Into::into).collect());
        self
    }

    /// Constrains the value with a JSON schema.
    #[must_use]
    pub fn with_schema(mut self, schema: JsonSchema) -> Self {
        self.schema = Some(schema);
        self
    }

    /// Sets the help text returned by [`Resource::help`](crate::Resource::help).
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

// Accessors
impl Parameter {
    /// Where the parameter lands in the request.
    pub fn kind(&self) -> ParameterKind {
        self.kind
    }

    /// The configured wire name, if any.
    pub fn wire_name(&self) -> Option<&str> {
        self.wire_name.as_deref()
    }

    /// Whether the caller must supply a value (or rely on the default).
    pub fn is_required(&self) -> bool {
        self.required
    }

    /// The default value, if any.
    pub fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    /// The accepted values, if restricted.
    pub fn choices(&self) -> Option<&[Value]> {
        self.choices.as_deref()
    }

    /// The schema constraining the value, if any.
    pub fn schema(&self) -> Option<&JsonSchema> {
        self.schema.as_ref()
    }

    /// The help text, empty when none was configured.
    pub fn description(&self) -> &str {
        self.description.as_deref().unwrap_or_default()
    }

    /// The name used on the wire for the given call name.
    ///
    /// `None` only for a whole-body parameter.
    pub fn effective_wire_name<'a>(&'a self, call_name: &'a str) -> Option<&'a str> {
        match (self.kind, self.wire_name.as_deref()) {
            (_, Some(wire_name)) => Some(wire_name),
            (ParameterKind::Body, None) => None,
            (_, None) => Some(call_name),
        }
    }

    /// Returns `true` for a body parameter standing for the entire body.
    pub fn is_whole_body(&self) -> bool {
        self.kind == ParameterKind::Body && self.wire_name.is_none()
    }
}

// Validation
impl Parameter {
    /// Resolves the value of this parameter from the call arguments.
    ///
    /// Returns `Ok(None)` when the parameter is optional, has no default and was not supplied:
    /// it is then omitted from the request.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] naming `call_name` if the parameter is required but
    /// missing, if the value is not one of the choices, if it violates the schema, or if a
    /// file was given where a value is expected (and vice versa).
    pub fn validate(
        &self,
        call_name: &str,
        args: &CallArgs,
    ) -> Result<Option<ArgValue>, ValidationError> {
        let resolved = match (args.get(call_name), &self.default) {
            (Some(value), _) => value.clone(),
            (None, Some(default)) => ArgValue::Value(default.clone()),
            (None, None) if self.required => {
                return Err(ValidationError::Missing {
                    parameter: call_name.to_string(),
                });
            }
            (None, None) => return Ok(None),
        };

        match (&resolved, self.kind) {
            (ArgValue::File(_), ParameterKind::File) => {}
            (ArgValue::Value(_), ParameterKind::File) => {
                return Err(ValidationError::ExpectedFile {
                    parameter: call_name.to_string(),
                });
            }
            (ArgValue::File(_), _) => {
                return Err(ValidationError::ExpectedValue {
                    parameter: call_name.to_string(),
                });
            }
            (ArgValue::Value(value), _) => {
                self.check_choices(call_name, value)?;
                self.check_schema(call_name, value)?;
            }
        }

        Ok(Some(resolved))
    }

    fn check_choices(&self, call_name: &str, value: &Value) -> Result<(), ValidationError> {
        let Some(choices) = &self.choices else {
            return Ok(());
        };
        if choices.contains(value) {
            return Ok(());
        }
        Err(ValidationError::InvalidChoice {
            parameter: call_name.to_string(),
            value: value.clone(),
            choices: Value::Array(choices.clone()),
        })
    }

    fn check_schema(&self, call_name: &str, value: &Value) -> Result<(), ValidationError> {
        match &self.schema {
            Some(schema) if !schema.is_valid(value) => Err(ValidationError::SchemaViolation {
                parameter: call_name.to_string(),
            }),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use serde_json::json;

    use super::*;
    use crate::FileUpload;

    fn post_schema() -> JsonSchema {
        JsonSchema::new(json!({
            "title": "create post",
            "type": "object",
            "properties": {
                "user": {"type": "string"},
                "body": {"type": "string"},
            },
            "required": ["user", "body"],
        }))
        .expect("valid schema")
    }

    #[test]
    fn test_supplied_value_wins_over_default() {
        let param = Parameter::body("userId").with_default(101);
        let args = CallArgs::new().with("user_id", 7);

        let resolved = param.validate("user_id", &args).expect("valid");

        assert_eq!(resolved, Some(ArgValue::Value(json!(7))));
    }

    #[test]
    fn test_default_used_when_absent() {
        let param = Parameter::body("userId").with_default(101);

        let resolved = param.validate("user_id", &CallArgs::new()).expect("valid");

        assert_eq!(resolved, Some(ArgValue::Value(json!(101))));
    }

    #[test]
    fn test_optional_without_default_is_omitted() {
        let param = Parameter::query("userId");

        let resolved = param.validate("user_id", &CallArgs::new()).expect("valid");

        assert_eq!(resolved, None);
    }

    #[test]
    fn test_required_missing_names_parameter() {
        let param = Parameter::body("title").required();

        let error = param
            .validate("title", &CallArgs::new().with("other", 1))
            .expect_err("should be missing");

        assert_eq!(
            error,
            ValidationError::Missing {
                parameter: "title".to_string()
            }
        );
    }

    #[rstest]
    #[case::first(json!("asc"))]
    #[case::second(json!("desc"))]
    fn test_choice_member_accepted(#[case] value: Value) {
        let param = Parameter::query("order").with_choices(["asc", "desc"]);
        let args = CallArgs::new().with("order", value.clone());

        let resolved = param.validate("order", &args).expect("valid choice");

        assert_eq!(resolved, Some(ArgValue::Value(value)));
    }

    #[rstest]
    #[case::unknown_string(json!("sideways"))]
    #[case::wrong_type(json!(1))]
    #[case::null(json!(null))]
    fn test_choice_outsider_rejected(#[case] value: Value) {
        let param = Parameter::query("order").with_choices(["asc", "desc"]);
        let args = CallArgs::new().with("order", value);

        let error = param.validate("order", &args).expect_err("invalid choice");

        assert!(matches!(error, ValidationError::InvalidChoice { .. }));
        assert_eq!(error.parameter(), "order");
    }

    #[test]
    fn test_default_is_checked_against_choices() {
        let param = Parameter::query("order")
            .with_choices(["asc", "desc"])
            .with_default("random");

        let error = param
            .validate("order", &CallArgs::new())
            .expect_err("default outside choices");

        assert!(matches!(error, ValidationError::InvalidChoice { .. }));
    }

    #[test]
    fn test_schema_violation_message() {
        let param = Parameter::whole_body().required().with_schema(post_schema());
        let args = CallArgs::new().with("post", json!({"user": "1"}));

        let error = param.validate("post", &args).expect_err("schema violation");

        assert_eq!(error.to_string(), "value for post does not obey schema");
    }

    #[test]
    fn test_schema_accepts_conforming_value() {
        let param = Parameter::whole_body().required().with_schema(post_schema());
        let value = json!({"user": "1", "body": "hello"});
        let args = CallArgs::new().with("post", value.clone());

        let resolved = param.validate("post", &args).expect("valid body");

        assert_eq!(resolved, Some(ArgValue::Value(value)));
    }

    #[test]
    fn test_file_parameter_rejects_plain_value() {
        let param = Parameter::file("file").required();
        let args = CallArgs::new().with("file", "not a file");

        let error = param.validate("file", &args).expect_err("expects a file");

        assert!(matches!(error, ValidationError::ExpectedFile { .. }));
    }

    #[test]
    fn test_value_parameter_rejects_file() {
        let param = Parameter::query("q");
        let args = CallArgs::new().with_file("q", FileUpload::new("a.txt", vec![]));

        let error = param.validate("q", &args).expect_err("expects a value");

        assert!(matches!(error, ValidationError::ExpectedValue { .. }));
    }

    #[test]
    fn test_effective_wire_name() {
        assert_eq!(
            Parameter::query("userId").effective_wire_name("user_id"),
            Some("userId")
        );
        assert_eq!(Parameter::whole_body().effective_wire_name("post"), None);

        let param: Parameter =
            serde_json::from_value(json!({"in": "path"})).expect("valid parameter");
        assert_eq!(param.effective_wire_name("item"), Some("item"));
    }

    #[test]
    fn test_deserialize_parameter() {
        let param: Parameter = serde_json::from_value(json!({
            "in": "body",
            "name": "userId",
            "default": 101,
            "description": "The id of the user creating the post",
        }))
        .expect("valid parameter");

        assert_eq!(param.kind(), ParameterKind::Body);
        assert_eq!(param.wire_name(), Some("userId"));
        assert!(!param.is_required());
        assert_eq!(param.default_value(), Some(&json!(101)));
        assert_eq!(param.description(), "The id of the user creating the post");
    }
}

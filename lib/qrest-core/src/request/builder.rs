use std::collections::HashMap;

use indexmap::IndexMap;
use serde_json::{Map, Value};
use tracing::{debug, warn};
use url::Url;

use super::{AssembledRequest, RequestBody};
use crate::config::{RegisteredResource, encode_path_segment};
use crate::{ApiConfig, ArgValue, CallArgs, FileUpload, ParameterKind, QrestError, ValidationError};

#[derive(Default)]
struct Parts {
    path: HashMap<String, String>,
    query: IndexMap<String, Value>,
    whole_body: Option<Value>,
    body_fields: Map<String, Value>,
    has_body: bool,
    files: Vec<(String, FileUpload)>,
}

impl AssembledRequest {
    /// Validates `args` against the resource and assembles the request.
    ///
    /// Parameters are visited kind by kind (path, query, body, file), in declaration order within
    /// a kind. Missing required parameters are reported first, then unknown arguments, then
    /// invalid values. The first failure is returned.
    pub(crate) fn build(
        api: &ApiConfig,
        base_url: &Url,
        resource: &RegisteredResource,
        args: &CallArgs,
    ) -> Result<Self, QrestError> {
        let config = &resource.config;
        let parameters = config.parameters();

        let mut ordered: Vec<_> = parameters.iter().collect();
        ordered.sort_by_key(|(_, parameter)| parameter.kind());

        if let Some((call_name, _)) = ordered.iter().find(|(call_name, parameter)| {
            let required = parameter.is_required() || parameter.kind() == ParameterKind::Path;
            required && parameter.default_value().is_none() && args.get(call_name).is_none()
        }) {
            return Err(ValidationError::Missing {
                parameter: (*call_name).clone(),
            }
            .into());
        }

        if let Some(unknown) = args.names().find(|name| !parameters.contains_key(*name)) {
            return Err(ValidationError::UnknownArgument {
                parameter: unknown.to_string(),
                resource: config.name().to_string(),
            }
            .into());
        }

        let mut parts = Parts::default();
        for (call_name, parameter) in ordered {
            let kind = parameter.kind();
            parts.has_body |= kind == ParameterKind::Body;
            let resolved = parameter.validate(call_name, args)?;
            let wire_name = parameter.effective_wire_name(call_name);

            match (kind, resolved, wire_name) {
                (ParameterKind::Path, None, _) => {
                    return Err(ValidationError::Missing {
                        parameter: call_name.clone(),
                    }
                    .into());
                }
                (_, None, _) => {}
                (ParameterKind::Path, Some(value), placeholder) => {
                    let segment = path_segment(call_name, into_value(call_name, value)?)?;
                    let placeholder = placeholder.unwrap_or(call_name);
                    parts.path.insert(placeholder.to_string(), segment);
                }
                (ParameterKind::Query, Some(value), name) => {
                    let value = query_value(call_name, into_value(call_name, value)?)?;
                    let name = name.unwrap_or(call_name);
                    if value.is_null() {
                        warn!(resource = config.name(), parameter = %call_name, "null query value is not sent");
                    }
                    parts.query.insert(name.to_string(), value);
                }
                (ParameterKind::Body, Some(value), None) => {
                    parts.whole_body = Some(into_value(call_name, value)?);
                }
                (ParameterKind::Body, Some(value), Some(name)) => {
                    parts
                        .body_fields
                        .insert(name.to_string(), into_value(call_name, value)?);
                }
                (ParameterKind::File, Some(value), name) => {
                    let ArgValue::File(file) = value else {
                        return Err(ValidationError::ExpectedFile {
                            parameter: call_name.clone(),
                        }
                        .into());
                    };
                    parts.files.push((name.unwrap_or(call_name).to_string(), file));
                }
            }
        }

        let path = resource
            .template
            .render(|placeholder| parts.path.get(placeholder).map(String::as_str))
            .map_err(|placeholder| ValidationError::Missing {
                parameter: placeholder.to_string(),
            })?;
        let url = join_url(base_url, &path);

        let body = if !parts.files.is_empty() {
            RequestBody::Multipart(parts.files)
        } else if let Some(whole_body) = parts.whole_body {
            RequestBody::Json(whole_body)
        } else if parts.has_body && !resource_has_whole_body(resource) {
            RequestBody::Json(Value::Object(parts.body_fields))
        } else {
            RequestBody::None
        };

        let request = Self {
            resource: config.name().to_string(),
            method: config.method(),
            url,
            headers: resource.headers.clone(),
            query: parts.query,
            body,
            timeout: resource.timeout,
            auth: api.auth().cloned(),
            verify_tls: api.verify_tls(),
        };
        debug!(
            resource = request.resource(),
            method = %request.method(),
            url = %request.full_url(),
            "assembled request"
        );
        Ok(request)
    }
}

fn resource_has_whole_body(resource: &RegisteredResource) -> bool {
    resource
        .config
        .parameters()
        .values()
        .any(crate::Parameter::is_whole_body)
}

fn into_value(call_name: &str, value: ArgValue) -> Result<Value, ValidationError> {
    match value {
        ArgValue::Value(value) => Ok(value),
        ArgValue::File(_) => Err(ValidationError::ExpectedValue {
            parameter: call_name.to_string(),
        }),
    }
}

fn path_segment(call_name: &str, value: Value) -> Result<String, ValidationError> {
    let text = match value {
        Value::String(text) => text,
        Value::Number(number) => number.to_string(),
        Value::Bool(flag) => flag.to_string(),
        value @ (Value::Null | Value::Array(_) | Value::Object(_)) => {
            return Err(ValidationError::UnsupportedPathValue {
                parameter: call_name.to_string(),
                value,
            });
        }
    };
    // dot segments would be normalized away by the URL parser, even percent-encoded
    if text == "." || text == ".." {
        return Err(ValidationError::UnsupportedPathValue {
            parameter: call_name.to_string(),
            value: Value::String(text),
        });
    }
    Ok(encode_path_segment(&text))
}

fn query_value(call_name: &str, value: Value) -> Result<Value, ValidationError> {
    let is_scalar = |value: &Value| !matches!(value, Value::Array(_) | Value::Object(_));
    let supported = match &value {
        Value::Object(_) => false,
        Value::Array(values) => values.iter().all(is_scalar),
        _ => true,
    };
    if supported {
        Ok(value)
    } else {
        Err(ValidationError::UnsupportedQueryValue {
            parameter: call_name.to_string(),
            value,
        })
    }
}

fn join_url(base_url: &Url, path: &str) -> Url {
    let mut url = base_url.clone();
    let base_path = url.path().trim_end_matches('/').to_string();
    url.set_path(&format!("{base_path}/{path}"));
    url.set_query(None);
    url
}

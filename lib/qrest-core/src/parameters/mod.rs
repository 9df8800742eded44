//! Parameter definitions and call-time arguments.
//!
//! - [`Parameter`] - one declared input of a resource (path, query, body or file)
//! - [`CallArgs`] - the values supplied by the caller, keyed by call name
//! - [`FileUpload`] - the content of a file parameter
//! - [`JsonSchema`] - a compiled schema constraining a parameter value

mod args;
pub use self::args::{ArgValue, CallArgs, FileUpload};

mod param;
pub use self::param::{Parameter, ParameterKind};

mod schema;
pub use self::schema::JsonSchema;

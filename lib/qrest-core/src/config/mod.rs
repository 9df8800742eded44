//! API and resource descriptors.
//!
//! Descriptors are plain data: build them with the `with_*` methods or deserialize them from a
//! document, then register them with [`Api::builder`](crate::Api::builder). Registration checks
//! them once; they are immutable afterwards.

mod api;
pub(crate) use self::api::extend_headers;
pub use self::api::ApiConfig;

mod definition;
pub use self::definition::ApiDefinition;

mod path;
pub(crate) use self::path::encode_path_segment;
pub use self::path::PathTemplate;

mod resource;
pub(crate) use self::resource::RegisteredResource;
pub use self::resource::{HttpMethod, ResourceConfig};

mod timeout;
pub use self::timeout::{Timeout, TimeoutConfig};

use std::fmt;
use std::io;
use std::path::Path;

use indexmap::IndexMap;
use serde_json::Value;

/// Call-time arguments, keyed by parameter call name.
///
/// # Example
///
/// ```rust
/// use qrest_core::{CallArgs, FileUpload};
///
/// let args = CallArgs::new()
///     .with("title", "new post")
///     .with("user_id", 42)
///     .with_file("attachment", FileUpload::new("notes.txt", b"hello".to_vec()));
///
/// assert_eq!(args.len(), 3);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CallArgs {
    args: IndexMap<String, ArgValue>,
}

/// A single call-time argument.
#[derive(Debug, Clone, PartialEq, derive_more::From)]
pub enum ArgValue {
    /// A JSON value for a path, query or body parameter.
    Value(Value),
    /// A file for a file parameter.
    File(FileUpload),
}

impl CallArgs {
    /// Creates an empty set of arguments.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a value argument, replacing any previous argument with the same name.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, ArgValue::Value(value.into()));
        self
    }

    /// Adds a file argument, replacing any previous argument with the same name.
    pub fn with_file(mut self, name: impl Into<String>, file: FileUpload) -> Self {
        self.insert(name, ArgValue::File(file));
        self
    }

    /// Inserts an argument, returning the value it replaced.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<ArgValue>) -> Option<ArgValue> {
        self.args.insert(name.into(), value.into())
    }

    /// Looks an argument up by call name.
    pub fn get(&self, name: &str) -> Option<&ArgValue> {
        self.args.get(name)
    }

    /// Names of the supplied arguments, in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.args.keys().map(String::as_str)
    }

    /// Number of supplied arguments.
    pub fn len(&self) -> usize {
        self.args.len()
    }

    /// Returns `true` when no argument was supplied.
    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for CallArgs
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let args = iter
            .into_iter()
            .map(|(name, value)| (name.into(), ArgValue::Value(value.into())))
            .collect();
        Self { args }
    }
}

/// In-memory content of a file sent as one multipart part.
#[derive(Clone, PartialEq, Eq)]
pub struct FileUpload {
    file_name: String,
    mime_type: Option<String>,
    content: Vec<u8>,
}

impl fmt::Debug for FileUpload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileUpload")
            .field("file_name", &self.file_name)
            .field("mime_type", &self.mime_type)
            .field("content", &format_args!("{} bytes", self.content.len()))
            .finish()
    }
}

impl FileUpload {
    /// Creates a file upload from its name and content.
    pub fn new(file_name: impl Into<String>, content: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            mime_type: None,
            content,
        }
    }

    /// Reads a file from disk, using its file name for the multipart part.
    ///
    /// # Errors
    ///
    /// Returns the I/O error if the file cannot be read.
    pub fn from_path(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read(path)?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Self::new(file_name, content))
    }

    /// Sets the MIME type announced for this part.
    #[must_use]
    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }

    /// The file name announced for this part.
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// The MIME type announced for this part, if any.
    pub fn mime_type(&self) -> Option<&str> {
        self.mime_type.as_deref()
    }

    /// The file content.
    pub fn content(&self) -> &[u8] {
        &self.content
    }
}

#![forbid(unsafe_code)]

//! Field values held by the form.

use std::fmt;

/// A picked file: name, optional content type and raw bytes.
#[derive(Clone, PartialEq, Eq)]
pub struct FileBlob {
    file_name: String,
    content_type: Option<String>,
    bytes: Vec<u8>,
}

impl FileBlob {
    /// Create a blob without a content type.
    #[must_use]
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: None,
            bytes,
        }
    }

    /// Attach a MIME content type.
    #[must_use]
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    #[must_use]
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Size in bytes.
    #[must_use]
    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

impl fmt::Debug for FileBlob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileBlob")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("size", &self.bytes.len())
            .finish()
    }
}

/// Current value of one field.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FieldValue {
    /// Nothing selected or picked.
    #[default]
    Empty,
    /// Typed text (text, phone and email fields).
    Text(String),
    /// Selected option code.
    Code(String),
    /// Picked file.
    File(FileBlob),
}

impl FieldValue {
    /// Text value.
    #[must_use]
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// Selected option code.
    #[must_use]
    pub fn code(value: impl Into<String>) -> Self {
        Self::Code(value.into())
    }

    /// Whether the value satisfies a `required` rule.
    ///
    /// Whitespace-only text counts as missing.
    #[must_use]
    pub fn is_present(&self) -> bool {
        match self {
            Self::Empty => false,
            Self::Text(text) => !text.trim().is_empty(),
            Self::Code(code) => !code.is_empty(),
            Self::File(_) => true,
        }
    }

    /// String payload of text and code values.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(value) | Self::Code(value) => Some(value),
            Self::Empty | Self::File(_) => None,
        }
    }

    /// Blob of a file value.
    #[must_use]
    pub fn as_file(&self) -> Option<&FileBlob> {
        match self {
            Self::File(blob) => Some(blob),
            _ => None,
        }
    }
}

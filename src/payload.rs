use std::io::Read;
use std::path::{Path, PathBuf};
use std::string::FromUtf8Error;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Record sent when nothing else is configured.
pub const DEFAULT_PAYLOAD: &str =
    r#"{"id":"2","name":"Sorayya Asadi","email":"sorayyaasadi6@gmail.com"}"#;

#[derive(Error, Debug)]
pub enum PayloadError {
    #[error("failed to read payload from {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("payload in {} is not valid UTF-8: {source}", path.display())]
    Encoding {
        path: PathBuf,
        #[source]
        source: FromUtf8Error,
    },

    #[error("failed to serialize record: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// A person record, serialized with its fields in declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub id: String,
    pub name: String,
    pub email: String,
}

/// Text handed to the transport as-is. It is never parsed or validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payload {
    text: String,
}

impl Payload {
    pub fn new(text: impl Into<String>) -> Self {
        Payload { text: text.into() }
    }

    /// Read the payload from a file, or from stdin when `path` is `-`.
    ///
    /// Blocks; call it before the async runtime starts.
    pub fn from_file(path: &Path) -> Result<Self, PayloadError> {
        let read_error = |source| PayloadError::Read {
            path: path.to_path_buf(),
            source,
        };

        let bytes = if path == Path::new("-") {
            let mut buffer = Vec::new();
            std::io::stdin()
                .read_to_end(&mut buffer)
                .map_err(read_error)?;
            buffer
        } else {
            std::fs::read(path).map_err(read_error)?
        };

        let text = String::from_utf8(bytes).map_err(|source| PayloadError::Encoding {
            path: path.to_path_buf(),
            source,
        })?;

        Ok(Payload { text })
    }

    /// Compact JSON for `record`.
    pub fn from_record(record: &Record) -> Result<Self, PayloadError> {
        Ok(Payload {
            text: serde_json::to_string(record)?,
        })
    }

    /// Terminate the payload with '\n', for listeners that split on lines
    pub fn with_newline(mut self) -> Self {
        self.text.push('\n');
        self
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// UTF-8 bytes written to the socket.
    pub fn encode(&self) -> &[u8] {
        self.text.as_bytes()
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

impl Default for Payload {
    fn default() -> Self {
        Payload::new(DEFAULT_PAYLOAD)
    }
}

use std::error::Error as StdError;
use std::io;

use thiserror::Error;

use crate::payload::PayloadError;

#[derive(Error, Debug)]
pub enum SendError {
    /// Resolution, connect, or socket I/O failed.
    #[error("{context}: {source}")]
    Connection {
        context: String,
        #[source]
        source: io::Error,
    },

    #[error("{0}")]
    Other(#[source] Box<dyn StdError + Send + Sync + 'static>),
}

impl SendError {
    pub fn connection(context: impl Into<String>, source: io::Error) -> Self {
        SendError::Connection {
            context: context.into(),
            source,
        }
    }

    pub fn other<E>(error: E) -> Self
    where
        E: Into<Box<dyn StdError + Send + Sync + 'static>>,
    {
        SendError::Other(error.into())
    }

    /// Process exit status for this failure class.
    pub fn exit_code(&self) -> u8 {
        match self {
            SendError::Connection { .. } => 1,
            SendError::Other(_) => 2,
        }
    }
}

impl From<PayloadError> for SendError {
    fn from(error: PayloadError) -> Self {
        SendError::other(error)
    }
}

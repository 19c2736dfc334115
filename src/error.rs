use std::collections::TryReserveError;
use std::fmt;

use smol_str::SmolStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ErrorKind {
    /// Malformed tag, unsupported marker, or a value that does not match its marker.
    #[error("bad format string")]
    Build,
    /// Arena or buffer growth failed.
    #[error("allocation failed")]
    Allocation,
    /// A node or value handle does not belong to the tree.
    #[error("lookup failed")]
    Lookup,
}

#[derive(Debug, Clone)]
pub struct Error {
    pub kind: ErrorKind,
    pub message: String,
    /// The offending tag, when the error came from the tagged protocol.
    pub tag: Option<SmolStr>,
}

impl Error {
    pub fn build(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Build,
            message: message.into(),
            tag: None,
        }
    }

    pub fn allocation(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Allocation,
            message: message.into(),
            tag: None,
        }
    }

    pub fn lookup(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Lookup,
            message: message.into(),
            tag: None,
        }
    }

    pub fn with_tag(mut self, tag: &str) -> Self {
        self.tag = Some(SmolStr::new(tag));
        self
    }

    pub fn is_build(&self) -> bool {
        self.kind == ErrorKind::Build
    }

    pub fn is_allocation(&self) -> bool {
        self.kind == ErrorKind::Allocation
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.tag {
            Some(tag) => write!(f, "{}: {} at '{tag}'", self.kind, self.message),
            None => write!(f, "{}: {}", self.kind, self.message),
        }
    }
}

impl std::error::Error for Error {}

impl From<TryReserveError> for Error {
    fn from(err: TryReserveError) -> Self {
        tracing::error!(error = %err, "arena reservation failed");
        Error::allocation(err.to_string())
    }
}

use std::time::Duration;

/// A boxed error from a lower layer (HTTP client, runtime, ...).
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors returned by the Skynet SDK.
///
/// Every operation adds its own name as context via [`ResultExt::context`];
/// use [`Error::root`] to look through those layers when matching on the
/// kind of failure.
#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error("invalid private key: expected {expected} bytes, got {actual}")]
    InvalidKey { expected: usize, actual: usize },

    #[error("invalid private key: embedded public key does not match the seed")]
    MismatchedKeyPair,

    #[error("could not execute request")]
    Transport(#[source] BoxError),

    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("{status} response from {method}: {message}")]
    HttpStatus {
        status: u16,
        method: String,
        message: String,
    },

    #[error("could not fetch registry entry: {status} response: {message}")]
    RegistryFetch { status: u16, message: String },

    #[error("could not set registry entry: {status} response: {message}")]
    RegistryPublish { status: u16, message: String },

    #[error("could not decode {what}: {reason}")]
    Decode { what: &'static str, reason: String },

    #[error(
        "could not verify signature from retrieved, signed registry entry -- possible corrupted entry"
    )]
    SignatureVerification,

    #[error("current entry already has maximum allowed revision, could not update the entry")]
    RevisionOverflow,

    #[error("invalid content reference: {0}")]
    InvalidContentReference(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("{operation}: {source}")]
    WithContext {
        operation: String,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    pub fn decode(what: &'static str, reason: impl std::fmt::Display) -> Self {
        Self::Decode {
            what,
            reason: reason.to_string(),
        }
    }

    /// Returns the innermost error below all context layers.
    pub fn root(&self) -> &Error {
        let mut err = self;
        while let Error::WithContext { source, .. } = err {
            err = source;
        }
        err
    }

    /// Wraps this error with the name of the operation that failed.
    pub fn context(self, operation: impl Into<String>) -> Self {
        Self::WithContext {
            operation: operation.into(),
            source: Box::new(self),
        }
    }
}

pub trait ResultExt<T> {
    /// Adds the name of the failed operation to the error, if any.
    fn context(self, operation: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, operation: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.context(operation))
    }
}

//! Definition of errors.

use std::error::Error;
use std::fmt;
use std::io;

pub type Result<T, E = BayesianError> = std::result::Result<T, E>;

#[derive(Debug)]
pub enum BayesianError {
    InvalidModel(InvalidModelError),
    DecodeError(bincode::error::DecodeError),
    EncodeError(bincode::error::EncodeError),
    IOError(io::Error),
}

impl BayesianError {
    pub(crate) fn invalid_model<S>(msg: S) -> Self
    where
        S: Into<String>,
    {
        Self::InvalidModel(InvalidModelError { msg: msg.into() })
    }

    /// Returns `true` if the error was caused by bytes that are not a valid model encoding.
    ///
    /// Both malformed byte streams and well-formed streams violating the model schema (wrong
    /// magic number, unsupported format version, inconsistent counts) are decode errors.
    pub const fn is_decode_error(&self) -> bool {
        matches!(self, Self::InvalidModel(_) | Self::DecodeError(_))
    }

    /// Returns `true` if the underlying storage failed.
    pub const fn is_io_error(&self) -> bool {
        matches!(self, Self::IOError(_))
    }
}

impl fmt::Display for BayesianError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::InvalidModel(e) => e.fmt(f),
            Self::DecodeError(e) => write!(f, "DecodeError: {}", e),
            Self::EncodeError(e) => write!(f, "EncodeError: {}", e),
            Self::IOError(e) => write!(f, "IOError: {}", e),
        }
    }
}

impl Error for BayesianError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidModel(e) => Some(e),
            Self::DecodeError(e) => Some(e),
            Self::EncodeError(e) => Some(e),
            Self::IOError(e) => Some(e),
        }
    }
}

/// Error used when the persisted model violates the model schema.
#[derive(Debug)]
pub struct InvalidModelError {
    /// Error message.
    pub(crate) msg: String,
}

impl fmt::Display for InvalidModelError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "InvalidModelError: {}", self.msg)
    }
}

impl Error for InvalidModelError {}

// bincode wraps failures of the underlying reader. A stream that ends early is a malformed
// encoding; anything else is a storage failure.
impl From<bincode::error::DecodeError> for BayesianError {
    fn from(error: bincode::error::DecodeError) -> Self {
        match error {
            bincode::error::DecodeError::Io { inner, .. }
                if inner.kind() != io::ErrorKind::UnexpectedEof =>
            {
                Self::IOError(inner)
            }
            error => Self::DecodeError(error),
        }
    }
}

impl From<bincode::error::EncodeError> for BayesianError {
    fn from(error: bincode::error::EncodeError) -> Self {
        match error {
            bincode::error::EncodeError::Io { inner, .. } => Self::IOError(inner),
            error => Self::EncodeError(error),
        }
    }
}

impl From<io::Error> for BayesianError {
    fn from(error: io::Error) -> Self {
        Self::IOError(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_model_message() {
        let e = BayesianError::invalid_model("unknown counting mode tag: 7");

        assert!(e.is_decode_error());
        assert!(!e.is_io_error());
        assert_eq!(
            "InvalidModelError: unknown counting mode tag: 7",
            &e.to_string()
        );
    }

    #[test]
    fn test_io_error_from_decoder() {
        let e = BayesianError::from(bincode::error::DecodeError::Io {
            inner: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
            additional: 4,
        });

        assert!(e.is_io_error());
    }

    #[test]
    fn test_unexpected_eof_is_decode_error() {
        let e = BayesianError::from(bincode::error::DecodeError::Io {
            inner: io::Error::from(io::ErrorKind::UnexpectedEof),
            additional: 4,
        });

        assert!(e.is_decode_error());
    }
}

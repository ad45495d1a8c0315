//! Error types for netlink dump operations.

use std::io;

/// Result type for netlink dump operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while dumping and decoding route tables.
///
/// Transport failures ([`Error::Io`], [`Error::Kernel`]) are fatal and
/// abort the whole dump. Per-message decode failures are recoverable:
/// the offending message is skipped and the dump continues. The
/// [`Error::is_decode`] predicate makes that split explicit at the
/// skip sites.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// I/O error from socket operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Kernel returned an error record for an in-flight request.
    #[error("kernel error: {message} (errno {errno})")]
    Kernel {
        /// The errno value from the kernel.
        errno: i32,
        /// Human-readable error message.
        message: String,
    },

    /// Message or fixed header was shorter than its declared layout.
    #[error("message truncated: expected {expected} bytes, got {actual}")]
    Truncated {
        /// Expected length in bytes.
        expected: usize,
        /// Actual bytes available.
        actual: usize,
    },

    /// Invalid message framing.
    #[error("invalid message: {0}")]
    InvalidMessage(String),

    /// Attribute length/type did not match the schema's expectation.
    #[error("invalid attribute: {0}")]
    InvalidAttribute(String),

    /// Multipath attribute whose next-hop sub-records do not cover the
    /// payload exactly, or which yields no next-hops at all.
    #[error("malformed multipath attribute: {0}")]
    MultipathIntegrity(String),

    /// Output bracketing error (unbalanced open/close).
    #[error("output error: {0}")]
    Output(String),
}

impl Error {
    /// Create a kernel error from a (negative) errno value.
    pub fn from_errno(errno: i32) -> Self {
        let message = io::Error::from_raw_os_error(-errno).to_string();
        Self::Kernel {
            errno: -errno,
            message,
        }
    }

    /// True for per-message decode failures that are skipped rather
    /// than aborting the dump.
    pub fn is_decode(&self) -> bool {
        matches!(
            self,
            Self::Truncated { .. }
                | Self::InvalidMessage(_)
                | Self::InvalidAttribute(_)
                | Self::MultipathIntegrity(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_errno() {
        let err = Error::from_errno(-1); // EPERM
        match err {
            Error::Kernel { errno, .. } => assert_eq!(errno, 1),
            other => panic!("expected Kernel, got {other:?}"),
        }
    }

    #[test]
    fn test_decode_classification() {
        assert!(
            Error::Truncated {
                expected: 12,
                actual: 4
            }
            .is_decode()
        );
        assert!(Error::MultipathIntegrity("empty".into()).is_decode());
        assert!(!Error::from_errno(-13).is_decode());
        assert!(!Error::Io(io::Error::other("boom")).is_decode());
    }
}

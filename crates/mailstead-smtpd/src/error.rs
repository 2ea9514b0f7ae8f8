//! Error types for SMTP session operations.

use std::time::Duration;

/// Result type alias for session operations.
pub type Result<T> = std::result::Result<T, Error>;

/// SMTP session error types.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// I/O error on the underlying transport.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// TLS error.
    #[error("TLS error: {0}")]
    Tls(#[from] rustls::Error),

    /// A mail transaction is already open.
    #[error("Mail transaction already open")]
    TransactionAlreadyOpen,

    /// No mail transaction is open.
    #[error("No mail transaction open")]
    NoTransactionOpen,

    /// Read deadline exceeded.
    #[error("Read timed out after {0:?}")]
    ReadTimeout(Duration),

    /// Write deadline exceeded.
    #[error("Write timed out after {0:?}")]
    WriteTimeout(Duration),

    /// Cumulative session input surpassed the configured limit.
    #[error("Input exceeds size limit of {0} bytes")]
    SizeExceeded(usize),

    /// Line violates the SMTP wire framing.
    #[error("Malformed line: {0}")]
    MalformedLine(String),

    /// Transport closed mid-operation.
    #[error("Connection closed")]
    ConnectionClosed,

    /// Invalid email address.
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),

    /// Invalid state for operation.
    #[error("Invalid state for operation: {0}")]
    InvalidState(String),
}

impl Error {
    /// Returns true if the session cannot continue after this error.
    ///
    /// Fatal errors mean the connection should be torn down: deadlines
    /// expired, the transport failed, or the size cap tripped. Everything
    /// else can be answered with a protocol reply and the session kept alive.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::Io(_)
                | Self::Tls(_)
                | Self::ReadTimeout(_)
                | Self::WriteTimeout(_)
                | Self::SizeExceeded(_)
                | Self::ConnectionClosed
        )
    }

    /// Returns true if the caller can reply with a protocol error and keep
    /// the session going.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        !self.is_fatal()
    }
}

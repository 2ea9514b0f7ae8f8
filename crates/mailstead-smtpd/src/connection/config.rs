//! Session configuration.

use std::time::Duration;

/// Configuration for an SMTP session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Upper bound on total input read through the session's line decoder,
    /// in bytes. `None` means unbounded. Snapshotted when the decoder is
    /// built on the first read; changes after that have no effect.
    pub max_message_size: Option<usize>,
    /// Deadline applied to every read operation.
    pub read_timeout: Duration,
    /// Deadline applied to every write operation.
    pub write_timeout: Duration,
}

impl SessionConfig {
    /// Creates a configuration with default limits.
    ///
    /// The default read timeout is the five minutes RFC 5321 §4.5.3.2.7
    /// tells a server to wait for the next command.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            max_message_size: None,
            read_timeout: Duration::from_secs(5 * 60),
            write_timeout: Duration::from_secs(60),
        }
    }

    /// Sets the cumulative input size limit.
    #[must_use]
    pub const fn max_message_size(mut self, limit: usize) -> Self {
        self.max_message_size = Some(limit);
        self
    }

    /// Sets the per-operation read deadline.
    #[must_use]
    pub const fn read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }

    /// Sets the per-operation write deadline.
    #[must_use]
    pub const fn write_timeout(mut self, timeout: Duration) -> Self {
        self.write_timeout = timeout;
        self
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::new()
    }
}

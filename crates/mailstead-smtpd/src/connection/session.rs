//! Per-connection SMTP session.
//!
//! A [`Session`] wraps one accepted duplex stream and owns everything the
//! server needs to remember about the conversation: the transaction
//! envelope, the authenticated identity, accumulated errors, and the
//! line-oriented I/O primitives the dispatcher drives.
//!
//! ## Design
//!
//! Protocol I/O belongs to exactly one task (`&mut self` methods; SMTP is
//! half-duplex), but the mutable protocol state lives behind a shared mutex
//! so an independent task (an idle-timeout watchdog, diagnostics) can
//! inspect or force-reset it without racing the I/O task. The lock is never
//! held across an await point.
//!
//! ## Example
//!
//! ```ignore
//! use mailstead_smtpd::{Address, ReplyCode, Session, SessionConfig};
//!
//! let config = SessionConfig::new().max_message_size(10 * 1024 * 1024);
//! let mut session = Session::with_config(stream, config);
//!
//! session.write_reply(ReplyCode::SERVICE_READY, "mail.example.com ESMTP").await?;
//! loop {
//!     let (verb, args) = session.read_command().await?;
//!     match verb.as_str() {
//!         "MAIL" => {
//!             let from = Address::parse(args.trim_start_matches("FROM:").trim_matches(['<', '>']))?;
//!             session.start_transaction(from)?;
//!             session.write_ok().await?;
//!         }
//!         // ... remaining verbs belong to the dispatcher
//!         _ => session.write_reply(ReplyCode::NOT_IMPLEMENTED, "unknown").await?,
//!     }
//! }
//! ```

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio::time::timeout;

use super::config::SessionConfig;
use super::decoder::LineDecoder;
use crate::error::{Error, Result};
use crate::types::{Address, AuthUser, Reply, ReplyCode};

/// Cloneable handle to a session's mutable protocol state.
///
/// A supervising task can hold one of these and lock it to inspect or
/// force-reset the session without touching the I/O path.
pub type SharedState = Arc<Mutex<SessionState>>;

/// Mutable protocol state of one SMTP session.
///
/// The transaction flag is private: it only changes through
/// [`start_transaction`](Self::start_transaction) /
/// [`end_transaction`](Self::end_transaction) / [`reset`](Self::reset),
/// which keep the state machine honest. Everything else is plain data the
/// dispatcher reads and writes as it processes verbs.
#[derive(Debug, Default)]
pub struct SessionState {
    /// Identity set by the caller after successful authentication.
    pub authenticated_user: Option<AuthUser>,
    /// Sender of the in-progress transaction.
    pub from_address: Option<Address>,
    /// Recipients in RCPT order; duplicates allowed.
    pub to_addresses: Vec<Address>,
    /// Append-only error log for the whole session. Never auto-cleared.
    pub errors: Vec<Error>,
    transaction_open: bool,
}

impl SessionState {
    /// Opens a mail transaction with the given sender.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TransactionAlreadyOpen`] (and mutates nothing) if a
    /// transaction is already open.
    pub fn start_transaction(&mut self, from: Address) -> Result<()> {
        if self.transaction_open {
            return Err(Error::TransactionAlreadyOpen);
        }
        tracing::debug!(from = %from, "mail transaction started");
        self.transaction_open = true;
        self.from_address = Some(from);
        Ok(())
    }

    /// Closes the open mail transaction.
    ///
    /// The envelope (`from_address`, `to_addresses`) and the authenticated
    /// identity are deliberately left in place so the caller can still
    /// inspect the just-finished transaction; only [`reset`](Self::reset)
    /// or the next [`start_transaction`](Self::start_transaction) disturbs
    /// them.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoTransactionOpen`] (and mutates nothing) if no
    /// transaction is open.
    pub fn end_transaction(&mut self) -> Result<()> {
        if !self.transaction_open {
            return Err(Error::NoTransactionOpen);
        }
        tracing::debug!("mail transaction ended");
        self.transaction_open = false;
        Ok(())
    }

    /// Returns transaction and identity state to the initial condition.
    ///
    /// Clears the authenticated identity, the envelope, and the transaction
    /// flag. The error log survives. Always succeeds, from any state.
    pub fn reset(&mut self) {
        tracing::debug!("session state reset");
        self.authenticated_user = None;
        self.from_address = None;
        self.to_addresses.clear();
        self.transaction_open = false;
    }

    /// Appends a recipient to the envelope.
    pub fn add_recipient(&mut self, to: Address) {
        self.to_addresses.push(to);
    }

    /// Appends an error to the session's log.
    pub fn record_error(&mut self, err: Error) {
        self.errors.push(err);
    }

    /// Returns true while a mail transaction is open.
    #[must_use]
    pub const fn transaction_open(&self) -> bool {
        self.transaction_open
    }
}

/// One SMTP session over one accepted connection.
///
/// Generic over the transport so tests can drive it with in-memory streams;
/// production code uses [`SessionStream`](super::SessionStream).
pub struct Session<S> {
    /// Transport before the first read; afterwards it lives inside the
    /// decoder and this is `None`.
    transport: Option<S>,
    /// Built on the first read and reused for every read after that.
    decoder: Option<LineDecoder<S>>,
    config: SessionConfig,
    is_tls: bool,
    state: SharedState,
}

impl<S> Session<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Creates a session with default configuration.
    pub fn new(transport: S) -> Self {
        Self::with_config(transport, SessionConfig::default())
    }

    /// Creates a session with the given configuration.
    pub fn with_config(transport: S, config: SessionConfig) -> Self {
        Self::with_state(transport, config, SharedState::default())
    }

    /// Creates a session over `transport` that adopts existing shared state.
    ///
    /// This is the rebuild half of a STARTTLS upgrade: tear the old session
    /// down with [`into_inner`](Self::into_inner), upgrade the stream, then
    /// hand the same state handle to the new session.
    pub fn with_state(transport: S, config: SessionConfig, state: SharedState) -> Self {
        Self {
            transport: Some(transport),
            decoder: None,
            config,
            is_tls: false,
            state,
        }
    }

    /// Returns the session configuration.
    #[must_use]
    pub const fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Returns the session configuration for adjustment.
    ///
    /// Timeouts take effect on the next operation. `max_message_size` is
    /// snapshotted when the decoder is built on the first read; changing it
    /// after that has no effect.
    pub fn config_mut(&mut self) -> &mut SessionConfig {
        &mut self.config
    }

    /// Returns true once the caller has marked the transport as encrypted.
    #[must_use]
    pub const fn is_tls(&self) -> bool {
        self.is_tls
    }

    /// Marks the transport as encrypted. Called once by the caller after a
    /// successful upgrade; this component never changes it itself.
    pub fn set_tls(&mut self) {
        self.is_tls = true;
    }

    /// Locks and returns the mutable protocol state.
    ///
    /// Do not hold the guard across an await point.
    pub fn state(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns a cloneable handle to the protocol state for watchdog or
    /// diagnostics tasks.
    #[must_use]
    pub fn state_handle(&self) -> SharedState {
        Arc::clone(&self.state)
    }

    /// Opens a mail transaction. See [`SessionState::start_transaction`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::TransactionAlreadyOpen`] if one is already open.
    pub fn start_transaction(&self, from: Address) -> Result<()> {
        self.state().start_transaction(from)
    }

    /// Closes the open mail transaction. See [`SessionState::end_transaction`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoTransactionOpen`] if none is open.
    pub fn end_transaction(&self) -> Result<()> {
        self.state().end_transaction()
    }

    /// Returns transaction and identity state to the initial condition.
    /// See [`SessionState::reset`].
    pub fn reset(&self) {
        self.state().reset();
    }

    /// Appends an error to the session's log.
    pub fn record_error(&self, err: Error) {
        self.state().record_error(err);
    }

    /// Reads one command line and splits it into an uppercased verb and its
    /// raw argument remainder (empty if the line had no space).
    ///
    /// # Errors
    ///
    /// Propagates any [`read_line`](Self::read_line) error.
    pub async fn read_command(&mut self) -> Result<(String, String)> {
        let line = self.read_line().await?;

        let (verb, args) = match line.split_once(' ') {
            Some((verb, args)) => (verb.to_uppercase(), args.to_string()),
            None => (line.to_uppercase(), String::new()),
        };
        tracing::trace!(verb = %verb, "read command");

        Ok((verb, args))
    }

    /// Reads one raw CRLF-terminated line, terminator stripped.
    ///
    /// The read deadline is applied freshly for this call.
    ///
    /// # Errors
    ///
    /// [`Error::ReadTimeout`] on deadline expiry, otherwise whatever the
    /// decoder reports (framing, size cap, closed connection).
    pub async fn read_line(&mut self) -> Result<String> {
        let deadline = self.config.read_timeout;
        timeout(deadline, self.decoder().read_line())
            .await
            .map_err(|_| Error::ReadTimeout(deadline))?
    }

    /// Reads a dot-stuffed DATA block: lines until a lone `.`, un-escaped
    /// and joined with `\n`. The terminator line is consumed but excluded.
    ///
    /// The read deadline is applied freshly for this call and covers the
    /// whole block.
    ///
    /// # Errors
    ///
    /// As [`read_line`](Self::read_line).
    pub async fn read_data_block(&mut self) -> Result<String> {
        let deadline = self.config.read_timeout;
        timeout(deadline, self.decoder().read_dot_block())
            .await
            .map_err(|_| Error::ReadTimeout(deadline))?
    }

    /// Writes a single-line reply: `"<code> <message>\r\n"` exactly.
    ///
    /// The write deadline is applied freshly for this call.
    ///
    /// # Errors
    ///
    /// [`Error::WriteTimeout`] on deadline expiry, [`Error::Io`] otherwise.
    pub async fn write_reply(&mut self, code: ReplyCode, message: &str) -> Result<()> {
        tracing::trace!(code = code.as_u16(), "write reply");
        self.write_wire(&format!("{code} {message}\r\n")).await
    }

    /// Writes one non-terminal multi-line capability line:
    /// `"250-<message>\r\n"`.
    ///
    /// The terminal `"250 "` line is the caller's to write (via
    /// [`write_reply`](Self::write_reply)), since only the caller knows
    /// which line is last.
    ///
    /// # Errors
    ///
    /// As [`write_reply`](Self::write_reply).
    pub async fn write_greeting_line(&mut self, message: &str) -> Result<()> {
        self.write_wire(&format!("250-{message}\r\n")).await
    }

    /// Writes a complete, possibly multi-line [`Reply`] in wire format.
    ///
    /// # Errors
    ///
    /// As [`write_reply`](Self::write_reply).
    pub async fn write_full_reply(&mut self, reply: &Reply) -> Result<()> {
        tracing::trace!(code = reply.code.as_u16(), "write reply");
        self.write_wire(&reply.to_wire()).await
    }

    /// Writes the default `250 OK` reply.
    ///
    /// # Errors
    ///
    /// As [`write_reply`](Self::write_reply).
    pub async fn write_ok(&mut self) -> Result<()> {
        self.write_reply(ReplyCode::OK, "OK").await
    }

    /// Shuts down the write side of the transport.
    ///
    /// # Errors
    ///
    /// [`Error::WriteTimeout`] on deadline expiry, [`Error::Io`] otherwise.
    pub async fn shutdown(&mut self) -> Result<()> {
        let deadline = self.config.write_timeout;
        timeout(deadline, self.writer().shutdown())
            .await
            .map_err(|_| Error::WriteTimeout(deadline))??;
        Ok(())
    }

    /// Consumes the session and returns the transport, for STARTTLS-style
    /// stream replacement.
    ///
    /// Note: Any input buffered in the decoder will be lost, which is what
    /// the protocol requires after an upgrade.
    #[must_use]
    pub fn into_inner(self) -> S {
        match (self.transport, self.decoder) {
            (Some(transport), _) => transport,
            (None, Some(decoder)) => decoder.into_inner(),
            (None, None) => unreachable!("transport and decoder are mutually exclusive"),
        }
    }

    /// Returns the line decoder, building it on first use.
    ///
    /// The decoder is built exactly once per session, snapshotting
    /// `max_message_size`; rebuilding it would reset buffering state and
    /// corrupt in-flight partial reads.
    fn decoder(&mut self) -> &mut LineDecoder<S> {
        if let Some(transport) = self.transport.take() {
            self.decoder = Some(LineDecoder::with_limit(
                transport,
                self.config.max_message_size,
            ));
        }
        match self.decoder.as_mut() {
            Some(decoder) => decoder,
            None => unreachable!("transport and decoder are mutually exclusive"),
        }
    }

    /// Returns the stream the write path should use: the raw transport
    /// before the first read, the decoder's inner stream after.
    fn writer(&mut self) -> &mut S {
        match (&mut self.transport, &mut self.decoder) {
            (Some(transport), _) => transport,
            (None, Some(decoder)) => decoder.get_mut(),
            (None, None) => unreachable!("transport and decoder are mutually exclusive"),
        }
    }

    /// Writes raw wire bytes under a freshly applied write deadline.
    async fn write_wire(&mut self, wire: &str) -> Result<()> {
        let deadline = self.config.write_timeout;
        let stream = self.writer();
        timeout(deadline, async {
            stream.write_all(wire.as_bytes()).await?;
            stream.flush().await
        })
        .await
        .map_err(|_| Error::WriteTimeout(deadline))??;
        Ok(())
    }
}

impl<S> std::fmt::Debug for Session<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("is_tls", &self.is_tls)
            .field("decoder_built", &self.decoder.is_some())
            .field(
                "transaction_open",
                &self
                    .state
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .transaction_open(),
            )
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::redundant_clone, clippy::manual_string_new, clippy::needless_collect, clippy::unreadable_literal, clippy::used_underscore_items, clippy::similar_names)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::time::Duration;
    use tokio_test::io::Builder;

    fn addr(s: &str) -> Address {
        Address::parse(s).unwrap()
    }

    mod transactions {
        use super::*;

        #[test]
        fn start_then_end() {
            let mut state = SessionState::default();
            state.start_transaction(addr("a@b.com")).unwrap();
            assert!(state.transaction_open());
            state.end_transaction().unwrap();
            assert!(!state.transaction_open());
        }

        #[test]
        fn double_start_fails_and_keeps_first_sender() {
            let mut state = SessionState::default();
            state.start_transaction(addr("first@b.com")).unwrap();

            let err = state.start_transaction(addr("second@b.com")).unwrap_err();
            assert!(matches!(err, Error::TransactionAlreadyOpen));
            assert_eq!(state.from_address, Some(addr("first@b.com")));
            assert!(state.transaction_open());
        }

        #[test]
        fn end_without_start_fails() {
            let mut state = SessionState::default();
            let err = state.end_transaction().unwrap_err();
            assert!(matches!(err, Error::NoTransactionOpen));
        }

        #[test]
        fn end_leaves_envelope_readable() {
            // The just-finished envelope stays in place until reset or the
            // next transaction.
            let mut state = SessionState::default();
            state.start_transaction(addr("a@b.com")).unwrap();
            state.add_recipient(addr("x@y.com"));
            state.end_transaction().unwrap();

            assert_eq!(state.from_address, Some(addr("a@b.com")));
            assert_eq!(state.to_addresses, vec![addr("x@y.com")]);
        }

        #[test]
        fn reset_clears_identity_and_envelope_but_not_errors() {
            let mut state = SessionState::default();
            state.authenticated_user = Some(crate::types::AuthUser::new(
                "alice@example.com",
                crate::types::AuthMechanism::Plain,
            ));
            state.start_transaction(addr("a@b.com")).unwrap();
            state.add_recipient(addr("x@y.com"));
            state.record_error(Error::NoTransactionOpen);

            state.reset();

            assert!(state.authenticated_user.is_none());
            assert!(state.from_address.is_none());
            assert!(state.to_addresses.is_empty());
            assert!(!state.transaction_open());
            assert_eq!(state.errors.len(), 1);
        }

        #[test]
        fn reset_from_idle_succeeds() {
            let mut state = SessionState::default();
            state.reset();
            assert!(!state.transaction_open());
        }

        #[test]
        fn duplicate_recipients_allowed() {
            let mut state = SessionState::default();
            state.start_transaction(addr("a@b.com")).unwrap();
            state.add_recipient(addr("x@y.com"));
            state.add_recipient(addr("x@y.com"));
            assert_eq!(state.to_addresses.len(), 2);
        }

        proptest! {
            // end_transaction succeeds iff it immediately follows a
            // successful start_transaction with no intervening end or reset.
            #[test]
            fn state_machine_over_arbitrary_sequences(
                ops in proptest::collection::vec(0u8..3, 0..48)
            ) {
                let mut state = SessionState::default();
                let mut open = false;

                for op in ops {
                    match op {
                        0 => {
                            let result = state.start_transaction(addr("a@b.com"));
                            prop_assert_eq!(result.is_ok(), !open);
                            open = true;
                        }
                        1 => {
                            let result = state.end_transaction();
                            prop_assert_eq!(result.is_ok(), open);
                            open = false;
                        }
                        _ => {
                            state.reset();
                            open = false;
                        }
                    }
                    prop_assert_eq!(state.transaction_open(), open);
                }
            }
        }
    }

    mod reads {
        use super::*;

        #[tokio::test]
        async fn command_with_args() {
            let mock = Builder::new().read(b"MAIL FROM:<a@b.com>\r\n").build();
            let mut session = Session::new(mock);

            let (verb, args) = session.read_command().await.unwrap();
            assert_eq!(verb, "MAIL");
            assert_eq!(args, "FROM:<a@b.com>");
        }

        #[tokio::test]
        async fn command_without_args() {
            let mock = Builder::new().read(b"QUIT\r\n").build();
            let mut session = Session::new(mock);

            let (verb, args) = session.read_command().await.unwrap();
            assert_eq!(verb, "QUIT");
            assert_eq!(args, "");
        }

        #[tokio::test]
        async fn verb_is_uppercased_args_untouched() {
            let mock = Builder::new().read(b"mail FROM:<A@b.Com>\r\n").build();
            let mut session = Session::new(mock);

            let (verb, args) = session.read_command().await.unwrap();
            assert_eq!(verb, "MAIL");
            assert_eq!(args, "FROM:<A@b.Com>");
        }

        #[tokio::test]
        async fn data_block() {
            let mock = Builder::new().read(b"Hello\r\n..Dots\r\n.\r\n").build();
            let mut session = Session::new(mock);

            let body = session.read_data_block().await.unwrap();
            assert_eq!(body, "Hello\n.Dots");
        }

        #[tokio::test]
        async fn decoder_is_built_once_and_keeps_buffered_input() {
            // Both commands arrive in one chunk; the second read must be
            // served from the first read's buffer.
            let mock = Builder::new().read(b"EHLO client\r\nNOOP\r\n").build();
            let mut session = Session::new(mock);

            assert_eq!(session.read_command().await.unwrap().0, "EHLO");
            assert_eq!(session.read_command().await.unwrap().0, "NOOP");
        }

        #[tokio::test]
        async fn size_cap_applies_across_calls() {
            let config = SessionConfig::new().max_message_size(10);
            let mock = Builder::new().read(b"12345678\r\nEX\r\n").build();
            let mut session = Session::with_config(mock, config);

            assert_eq!(session.read_line().await.unwrap(), "12345678");
            let err = session.read_line().await.unwrap_err();
            assert!(matches!(err, Error::SizeExceeded(10)));
        }

        #[tokio::test]
        async fn size_cap_snapshot_taken_at_first_read() {
            let mock = Builder::new().read(b"AB\r\nCD\r\n").build();
            let mut session = Session::new(mock);

            assert_eq!(session.read_line().await.unwrap(), "AB");
            // Too late: the decoder already exists without a cap.
            session.config_mut().max_message_size = Some(1);
            assert_eq!(session.read_line().await.unwrap(), "CD");
        }

        #[tokio::test(start_paused = true)]
        async fn read_deadline_applied_per_call() {
            let mock = Builder::new()
                .wait(Duration::from_secs(30))
                .read(b"NOOP\r\n")
                .build();
            let config = SessionConfig::new().read_timeout(Duration::from_secs(5));
            let mut session = Session::with_config(mock, config);

            let err = session.read_line().await.unwrap_err();
            assert!(matches!(err, Error::ReadTimeout(_)));

            // A fresh deadline is taken from the current config on the next
            // call; with a longer one the same read completes.
            session.config_mut().read_timeout = Duration::from_secs(120);
            assert_eq!(session.read_line().await.unwrap(), "NOOP");
        }
    }

    mod writes {
        use super::*;

        #[tokio::test]
        async fn reply_wire_format() {
            let mock = Builder::new().write(b"250 OK\r\n").build();
            let mut session = Session::new(mock);

            session.write_reply(ReplyCode::OK, "OK").await.unwrap();
        }

        #[tokio::test]
        async fn write_ok_produces_identical_bytes() {
            let mock = Builder::new().write(b"250 OK\r\n").build();
            let mut session = Session::new(mock);

            session.write_ok().await.unwrap();
        }

        #[tokio::test]
        async fn greeting_line_uses_continuation_separator() {
            let mock = Builder::new()
                .write(b"250-mail.example.com\r\n")
                .write(b"250 SIZE 10485760\r\n")
                .build();
            let mut session = Session::new(mock);

            session.write_greeting_line("mail.example.com").await.unwrap();
            session
                .write_reply(ReplyCode::OK, "SIZE 10485760")
                .await
                .unwrap();
        }

        #[tokio::test]
        async fn full_reply_renders_multi_line() {
            let mock = Builder::new()
                .write(b"250-mail.example.com\r\n250 PIPELINING\r\n")
                .build();
            let mut session = Session::new(mock);

            let reply = Reply::new(
                ReplyCode::OK,
                vec!["mail.example.com".to_string(), "PIPELINING".to_string()],
            );
            session.write_full_reply(&reply).await.unwrap();
        }

        #[tokio::test]
        async fn writes_work_before_any_read_builds_the_decoder() {
            // The greeting goes out before the client sends anything.
            let mock = Builder::new()
                .write(b"220 mail.example.com ESMTP\r\n")
                .read(b"QUIT\r\n")
                .build();
            let mut session = Session::new(mock);

            session
                .write_reply(ReplyCode::SERVICE_READY, "mail.example.com ESMTP")
                .await
                .unwrap();
            assert_eq!(session.read_command().await.unwrap().0, "QUIT");
        }

        #[tokio::test(start_paused = true)]
        async fn write_deadline_applied_per_call() {
            let mock = Builder::new()
                .wait(Duration::from_secs(30))
                .write(b"250 OK\r\n")
                .build();
            let config = SessionConfig::new().write_timeout(Duration::from_secs(5));
            let mut session = Session::with_config(mock, config);

            let err = session.write_ok().await.unwrap_err();
            assert!(matches!(err, Error::WriteTimeout(_)));

            session.config_mut().write_timeout = Duration::from_secs(120);
            session.write_ok().await.unwrap();
        }
    }

    mod shared_state {
        use super::*;

        #[tokio::test]
        async fn watchdog_can_force_reset_through_the_handle() {
            let mock = Builder::new().build();
            let session = Session::new(mock);
            session.start_transaction(addr("a@b.com")).unwrap();

            let handle = session.state_handle();
            let watchdog = tokio::spawn(async move {
                handle.lock().unwrap().reset();
            });
            watchdog.await.unwrap();

            assert!(!session.state().transaction_open());
            assert!(session.state().from_address.is_none());
        }

        #[tokio::test]
        async fn errors_accumulate_in_order() {
            let mock = Builder::new().build();
            let session = Session::new(mock);

            session.record_error(Error::NoTransactionOpen);
            session.record_error(Error::MalformedLine("bare LF".into()));

            let state = session.state();
            assert_eq!(state.errors.len(), 2);
            assert!(matches!(state.errors[0], Error::NoTransactionOpen));
            assert!(matches!(state.errors[1], Error::MalformedLine(_)));
        }

        #[tokio::test]
        async fn starttls_rebuild_keeps_state() {
            let mock = Builder::new().build();
            let session = Session::new(mock);
            session.start_transaction(addr("a@b.com")).unwrap();

            let handle = session.state_handle();
            let config = session.config().clone();
            let transport = session.into_inner();
            // ... TLS upgrade of `transport` happens here ...
            let mut session = Session::with_state(transport, config, handle);
            session.set_tls();

            assert!(session.is_tls());
            assert!(session.state().transaction_open());
            assert_eq!(session.state().from_address, Some(addr("a@b.com")));
        }
    }
}

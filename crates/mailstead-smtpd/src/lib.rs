//! # mailstead-smtpd
//!
//! Server-side SMTP session layer implementing the RFC 5321 wire
//! conventions.
//!
//! This crate is the stateful core a command dispatcher builds on: one
//! [`Session`] per accepted connection, tracking the transaction envelope,
//! the authenticated identity, and accumulated errors, with line-oriented
//! read/write primitives that respect the SMTP wire format.
//!
//! ## Features
//!
//! - **Transaction state machine**: explicit open/closed tracking with
//!   `start_transaction` / `end_transaction` / `reset`
//! - **CRLF line decoding**: buffered framing with an optional
//!   whole-session input cap, built once per session and reused
//! - **Dot-stuffed DATA blocks**: RFC 5321 §4.5.2 decoding
//! - **Per-operation deadlines**: every read and write re-applies its
//!   timeout, so deadlines never drift
//! - **Watchdog-safe state**: protocol state behind a shared mutex so a
//!   supervising task can inspect or force-reset a session
//! - **TLS via rustls**: plain/TLS stream for accepted connections, with
//!   server-side upgrade for STARTTLS flows
//!
//! ## Quick Start
//!
//! ```ignore
//! use mailstead_smtpd::{Address, ReplyCode, Session, SessionConfig, SessionStream};
//!
//! async fn serve(stream: SessionStream) -> mailstead_smtpd::Result<()> {
//!     let config = SessionConfig::new().max_message_size(10 * 1024 * 1024);
//!     let mut session = Session::with_config(stream, config);
//!
//!     session.write_reply(ReplyCode::SERVICE_READY, "mail.example.com ESMTP").await?;
//!
//!     loop {
//!         let (verb, args) = session.read_command().await?;
//!         match verb.as_str() {
//!             "MAIL" => {
//!                 let from = Address::parse(args.trim_start_matches("FROM:"))?;
//!                 session.start_transaction(from)?;
//!                 session.write_ok().await?;
//!             }
//!             "DATA" => {
//!                 session.write_reply(ReplyCode::START_DATA, "End with <CRLF>.<CRLF>").await?;
//!                 let body = session.read_data_block().await?;
//!                 session.end_transaction()?;
//!                 // hand `body` to delivery...
//!                 session.write_ok().await?;
//!             }
//!             "QUIT" => {
//!                 session.write_reply(ReplyCode::CLOSING, "Bye").await?;
//!                 return Ok(());
//!             }
//!             _ => session.write_reply(ReplyCode::NOT_IMPLEMENTED, "command not implemented").await?,
//!         }
//!     }
//! }
//! ```
//!
//! ## Scope
//!
//! Verb dispatch, message parsing, authentication exchanges, the STARTTLS
//! negotiation itself, and listener management all live with the caller.
//! The session hands them exact wire-level primitives and owns nothing
//! else.
//!
//! ## Modules
//!
//! - [`connection`]: session, transport stream, line decoder, configuration
//! - [`types`]: envelope addresses, reply codes, authenticated identities

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod connection;
mod error;
pub mod types;

pub use connection::{LineDecoder, Session, SessionConfig, SessionState, SessionStream, SharedState, tls_acceptor};
pub use error::{Error, Result};
pub use types::{Address, AuthMechanism, AuthUser, Reply, ReplyCode};

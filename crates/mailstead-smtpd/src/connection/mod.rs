//! Session, transport, and line-decoding plumbing for accepted connections.

mod config;
mod decoder;
mod session;
mod stream;

pub use config::SessionConfig;
pub use decoder::LineDecoder;
pub use session::{Session, SessionState, SharedState};
pub use stream::{SessionStream, tls_acceptor};

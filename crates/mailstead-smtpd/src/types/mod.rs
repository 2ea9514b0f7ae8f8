//! Core SMTP session types.

mod address;
mod auth;
mod reply;

pub use address::Address;
pub use auth::{AuthMechanism, AuthUser};
pub use reply::{Reply, ReplyCode};

//! Envelope address type.

use crate::error::{Error, Result};

/// Email address for the SMTP envelope (MAIL FROM / RCPT TO paths).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Address(String);

impl Address {
    /// Parses an address from a string.
    ///
    /// Validation is intentionally shallow: the envelope only needs a
    /// well-formed `local@domain` shape. Anything stricter (quoted local
    /// parts, address literals) belongs to the dispatcher's policy layer.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidAddress`] if the address is malformed.
    pub fn parse(addr: impl Into<String>) -> Result<Self> {
        let addr = addr.into();

        let Some((local, domain)) = addr.split_once('@') else {
            return Err(Error::InvalidAddress("missing @".into()));
        };

        if local.is_empty() {
            return Err(Error::InvalidAddress("empty local part".into()));
        }
        if domain.is_empty() {
            return Err(Error::InvalidAddress("empty domain".into()));
        }
        if domain.contains('@') {
            return Err(Error::InvalidAddress("more than one @".into()));
        }
        if addr.chars().any(|c| c.is_ascii_control() || c == ' ') {
            return Err(Error::InvalidAddress(
                "control characters or spaces".into(),
            ));
        }

        Ok(Self(addr))
    }

    /// Returns the address as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the part before the `@`.
    #[must_use]
    pub fn local_part(&self) -> &str {
        self.0.split('@').next().unwrap_or_default()
    }

    /// Returns the part after the `@`.
    #[must_use]
    pub fn domain(&self) -> &str {
        self.0.rsplit('@').next().unwrap_or_default()
    }
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for Address {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

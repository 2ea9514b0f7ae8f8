//! Authenticated identity types.
//!
//! The session never runs an authentication exchange itself; the dispatcher
//! does that and stores the resulting identity here.

/// Identity of an authenticated session peer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    /// Authenticated username (usually a mailbox address).
    pub username: String,
    /// Mechanism the peer authenticated with.
    pub mechanism: AuthMechanism,
}

impl AuthUser {
    /// Creates a new authenticated identity.
    #[must_use]
    pub fn new(username: impl Into<String>, mechanism: AuthMechanism) -> Self {
        Self {
            username: username.into(),
            mechanism,
        }
    }
}

impl std::fmt::Display for AuthUser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.username)
    }
}

/// SASL authentication mechanism.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthMechanism {
    /// PLAIN - plaintext authentication
    Plain,
    /// LOGIN - legacy plaintext
    Login,
    /// CRAM-MD5 - challenge-response
    CramMd5,
    /// `XOAUTH2` - `OAuth2` (Google/Microsoft)
    XOAuth2,
    /// `OAUTHBEARER` - RFC 7628 `OAuth2`
    OAuthBearer,
}

impl AuthMechanism {
    /// Parses an authentication mechanism name.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "PLAIN" => Some(Self::Plain),
            "LOGIN" => Some(Self::Login),
            "CRAM-MD5" => Some(Self::CramMd5),
            "XOAUTH2" => Some(Self::XOAuth2),
            "OAUTHBEARER" => Some(Self::OAuthBearer),
            _ => None,
        }
    }

    /// Returns the mechanism name as a string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Plain => "PLAIN",
            Self::Login => "LOGIN",
            Self::CramMd5 => "CRAM-MD5",
            Self::XOAuth2 => "XOAUTH2",
            Self::OAuthBearer => "OAUTHBEARER",
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::redundant_clone, clippy::manual_string_new, clippy::needless_collect, clippy::unreadable_literal, clippy::used_underscore_items, clippy::similar_names)]
mod tests {
    use super::*;

    #[test]
    fn parse_mechanism() {
        assert_eq!(AuthMechanism::parse("PLAIN"), Some(AuthMechanism::Plain));
        assert_eq!(AuthMechanism::parse("plain"), Some(AuthMechanism::Plain));
        assert_eq!(
            AuthMechanism::parse("cram-md5"),
            Some(AuthMechanism::CramMd5)
        );
        assert_eq!(AuthMechanism::parse("KERBEROS_V4"), None);
    }

    #[test]
    fn mechanism_round_trip() {
        for mech in [
            AuthMechanism::Plain,
            AuthMechanism::Login,
            AuthMechanism::CramMd5,
            AuthMechanism::XOAuth2,
            AuthMechanism::OAuthBearer,
        ] {
            assert_eq!(AuthMechanism::parse(mech.as_str()), Some(mech));
        }
    }

    #[test]
    fn auth_user_display() {
        let user = AuthUser::new("alice@example.com", AuthMechanism::Plain);
        assert_eq!(user.to_string(), "alice@example.com");
        assert_eq!(user.mechanism, AuthMechanism::Plain);
    }
}

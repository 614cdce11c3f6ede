//! Signed, time-limited bearer tokens (HS256 JWT).

use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use menuhub_core::AccountKind;

use super::AuthError;

/// Longest lifetime a token may be issued with (30 days).
pub const MAX_TTL_MINUTES: i64 = 30 * 24 * 60;

/// Token lifetime for `minutes`, or `None` outside `1..=MAX_TTL_MINUTES`.
#[must_use]
pub fn ttl_from_minutes(minutes: i64) -> Option<Duration> {
    if !(1..=MAX_TTL_MINUTES).contains(&minutes) {
        return None;
    }
    Duration::try_minutes(minutes)
}

/// Claims carried by every access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Username of the account.
    pub sub: String,
    /// Which account table `sub` lives in.
    pub user_type: AccountKind,
    pub iat: i64,
    pub exp: i64,
}

/// Issues and verifies access tokens with one shared secret.
#[derive(Clone)]
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("secret", &"[REDACTED]")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl TokenIssuer {
    #[must_use]
    pub fn new(secret: &SecretString, ttl: Duration) -> Self {
        let key = secret.expose_secret().as_bytes();

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding: EncodingKey::from_secret(key),
            decoding: DecodingKey::from_secret(key),
            validation,
            ttl,
        }
    }

    /// Default lifetime of issued tokens.
    #[must_use]
    pub const fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issue a token with the default lifetime.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Token` if signing fails.
    pub fn issue(&self, subject: &str, kind: AccountKind) -> Result<String, AuthError> {
        self.issue_with_ttl(subject, kind, self.ttl)
    }

    /// Issue a token that expires `ttl` from now.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::TokenLifetime` if the expiry is not a
    /// representable time, and `AuthError::Token` if signing fails.
    pub fn issue_with_ttl(
        &self,
        subject: &str,
        kind: AccountKind,
        ttl: Duration,
    ) -> Result<String, AuthError> {
        let now = Utc::now();
        let expires_at = now
            .checked_add_signed(ttl)
            .ok_or(AuthError::TokenLifetime)?;
        let claims = TokenClaims {
            sub: subject.to_owned(),
            user_type: kind,
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };

        Ok(jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &self.encoding,
        )?)
    }

    /// Check signature, algorithm and expiry, and return the claims.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidToken` for any token that does not verify.
    pub fn verify(&self, token: &str) -> Result<TokenClaims, AuthError> {
        jsonwebtoken::decode::<TokenClaims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!(error = %e, "Rejected bearer token");
                AuthError::InvalidToken
            })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn issuer(secret: &str) -> TokenIssuer {
        TokenIssuer::new(&SecretString::from(secret), Duration::minutes(30))
    }

    const SECRET: &str = "k3Jq9vX2mP8wL5nR7tY4bC6dF1gH0sZa";

    #[test]
    fn test_issue_then_verify_roundtrips_subject_and_kind() {
        let tokens = issuer(SECRET);
        let token = tokens.issue("alice", AccountKind::User).unwrap();
        let claims = tokens.verify(&token).unwrap();

        assert_eq!(claims.sub, "alice");
        assert_eq!(claims.user_type, AccountKind::User);
        assert_eq!(claims.exp - claims.iat, 30 * 60);
    }

    #[test]
    fn test_shop_user_kind_survives() {
        let tokens = issuer(SECRET);
        let token = tokens.issue("ramen_owner", AccountKind::ShopUser).unwrap();
        assert_eq!(
            tokens.verify(&token).unwrap().user_type,
            AccountKind::ShopUser
        );
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let tokens = issuer(SECRET);
        let token = tokens
            .issue_with_ttl("alice", AccountKind::User, Duration::seconds(-60))
            .unwrap();
        assert!(matches!(tokens.verify(&token), Err(AuthError::InvalidToken)));
    }

    #[test]
    fn test_unrepresentable_expiry_is_an_error() {
        let tokens = issuer(SECRET);
        // Past the last year `DateTime<Utc>` can represent
        let ttl = Duration::try_days(100_000_000).unwrap();
        let result = tokens.issue_with_ttl("alice", AccountKind::User, ttl);
        assert!(matches!(result, Err(AuthError::TokenLifetime)));
    }

    #[test]
    fn test_ttl_from_minutes_bounds() {
        assert_eq!(ttl_from_minutes(5), Some(Duration::minutes(5)));
        assert_eq!(
            ttl_from_minutes(MAX_TTL_MINUTES),
            Some(Duration::minutes(MAX_TTL_MINUTES))
        );
        assert_eq!(ttl_from_minutes(0), None);
        assert_eq!(ttl_from_minutes(-1), None);
        assert_eq!(ttl_from_minutes(i64::MAX), None);
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let token = issuer(SECRET).issue("alice", AccountKind::User).unwrap();
        let other = issuer("Zp4Xc7Vb1Nm8Qw2Er5Ty9Ui3Op6As0Df");
        assert!(matches!(other.verify(&token), Err(AuthError::InvalidToken)));
    }

    #[test]
    fn test_garbage_is_rejected() {
        let tokens = issuer(SECRET);
        assert!(tokens.verify("").is_err());
        assert!(tokens.verify("not.a.jwt").is_err());
    }

    #[test]
    fn test_debug_hides_secret() {
        let debug = format!("{:?}", issuer(SECRET));
        assert!(!debug.contains(SECRET));
    }
}

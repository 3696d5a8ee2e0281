/// Session token codec
///
/// Signs and verifies the bearer tokens carried by every authenticated
/// request. Tokens are HS256 JWTs and the codec is stateless: the only input
/// beyond the token itself is the signing secret, which is injected at
/// construction and never read from process-global state.
///
/// # Token Shapes
///
/// - **Access token**: carries the subject id and a role discriminator
///   (`type` claim). TTL is role-dependent: 30 minutes for members, 60
///   minutes for anonymous users.
/// - **Refresh token**: carries the subject id and `tokenType: "refresh"`
///   with no role claim. TTL is 7 days. Refresh always mints a brand new
///   access+refresh pair (rotation); old refresh tokens are not revoked.
///
/// Every token additionally carries a `jti` nonce so two tokens issued for
/// the same subject in the same second are still distinguishable.
///
/// # Example
///
/// ```
/// use ticklist_shared::auth::token::{Role, TokenCodec};
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let codec = TokenCodec::new("test-secret-key-at-least-32-bytes-long");
/// let subject = Uuid::new_v4();
///
/// let pair = codec.issue_pair(subject, Role::Member)?;
/// let claims = codec.verify_access(&pair.access)?;
/// assert_eq!(claims.user_id, subject);
/// assert_eq!(claims.role, Some(Role::Member));
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// Issuer tag stamped into every token and required during verification
pub const ISSUER: &str = "autobe";

/// Error type for token operations
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    /// Signature does not verify: tampered payload, foreign key, or foreign
    /// issuer
    #[error("token signature is invalid")]
    InvalidSignature,

    /// Token was valid once but its expiry has passed
    #[error("token has expired")]
    Expired,

    /// Not a parseable token at all
    #[error("token is malformed")]
    Malformed,

    /// Parsed and verified, but the wrong kind for this operation
    #[error("expected {expected} token")]
    WrongKind {
        /// "access" or "refresh"
        expected: &'static str,
    },

    /// Signing failed while issuing
    #[error("failed to sign token: {0}")]
    Signing(String),
}

/// Principal role discriminator carried by access tokens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Credentialed account
    Member,

    /// Anonymous, token-only session
    User,
}

impl Role {
    /// Access-token lifetime for this role
    pub fn access_ttl(&self) -> Duration {
        match self {
            Role::Member => Duration::minutes(30),
            Role::User => Duration::minutes(60),
        }
    }

    /// Role as carried in the `type` claim
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Member => "member",
            Role::User => "user",
        }
    }
}

/// Marker distinguishing refresh tokens from access tokens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    /// Refresh token; only mints new pairs, never authorizes requests
    Refresh,
}

/// JWT claims
///
/// Access tokens carry `type`; refresh tokens carry `tokenType` instead.
/// Exactly one of the two is present on any token this codec issues.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject identifier
    #[serde(rename = "userId")]
    pub user_id: Uuid,

    /// Role discriminator (access tokens only)
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,

    /// Refresh marker (refresh tokens only)
    #[serde(rename = "tokenType", default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<TokenKind>,

    /// Issuer tag
    pub iss: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration (Unix timestamp)
    pub exp: i64,

    /// Per-token nonce; makes every issued token unique
    pub jti: Uuid,
}

impl Claims {
    /// Builds access-token claims with the role's default TTL.
    pub fn access(subject: Uuid, role: Role) -> Self {
        Self::access_with_ttl(subject, role, role.access_ttl())
    }

    /// Builds access-token claims with an explicit TTL.
    pub fn access_with_ttl(subject: Uuid, role: Role, ttl: Duration) -> Self {
        let now = Utc::now();
        Self {
            user_id: subject,
            role: Some(role),
            token_type: None,
            iss: ISSUER.to_string(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
            jti: Uuid::new_v4(),
        }
    }

    /// Builds refresh-token claims with the 7-day TTL.
    pub fn refresh(subject: Uuid) -> Self {
        Self::refresh_with_ttl(subject, refresh_ttl())
    }

    /// Builds refresh-token claims with an explicit TTL.
    pub fn refresh_with_ttl(subject: Uuid, ttl: Duration) -> Self {
        let now = Utc::now();
        Self {
            user_id: subject,
            role: None,
            token_type: Some(TokenKind::Refresh),
            iss: ISSUER.to_string(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
            jti: Uuid::new_v4(),
        }
    }

    /// Whether the expiry has passed.
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }
}

/// Refresh-token lifetime
pub fn refresh_ttl() -> Duration {
    Duration::days(7)
}

/// A freshly issued access+refresh pair
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssuedTokens {
    /// Access token value
    pub access: String,

    /// Refresh token value
    pub refresh: String,

    /// When the access token stops working
    pub expired_at: DateTime<Utc>,

    /// When the refresh token stops working
    pub refreshable_until: DateTime<Utc>,
}

/// Subject id plus its freshly issued token pair.
///
/// This is the wire shape returned by every join/login/refresh operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorizedSession {
    /// Subject identifier the tokens were minted for
    pub id: Uuid,

    /// The issued pair
    pub token: IssuedTokens,
}

/// Stateless signer/verifier over an injected secret
#[derive(Clone)]
pub struct TokenCodec {
    secret: Arc<str>,
}

impl TokenCodec {
    /// Creates a codec over a signing secret.
    ///
    /// The secret should be at least 32 bytes; length is enforced at
    /// configuration load, not here.
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into().into(),
        }
    }

    /// Signs arbitrary claims.
    pub fn sign(&self, claims: &Claims) -> Result<String, TokenError> {
        let header = Header::new(Algorithm::HS256);
        let key = EncodingKey::from_secret(self.secret.as_bytes());

        encode(&header, claims, &key).map_err(|e| TokenError::Signing(e.to_string()))
    }

    /// Verifies a token's signature, issuer, and expiry, returning its
    /// claims. No side effects.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let key = DecodingKey::from_secret(self.secret.as_bytes());

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[ISSUER]);
        validation.validate_exp = true;

        let data = decode::<Claims>(token, &key, &validation).map_err(|e| {
            use jsonwebtoken::errors::ErrorKind;
            match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                ErrorKind::InvalidSignature
                | ErrorKind::InvalidIssuer
                | ErrorKind::ImmatureSignature => TokenError::InvalidSignature,
                _ => TokenError::Malformed,
            }
        })?;

        Ok(data.claims)
    }

    /// Verifies a token and requires it to be an access token.
    pub fn verify_access(&self, token: &str) -> Result<Claims, TokenError> {
        let claims = self.verify(token)?;

        if claims.token_type.is_some() || claims.role.is_none() {
            return Err(TokenError::WrongKind { expected: "access" });
        }

        Ok(claims)
    }

    /// Verifies a token and requires the `tokenType=refresh` marker.
    pub fn verify_refresh(&self, token: &str) -> Result<Claims, TokenError> {
        let claims = self.verify(token)?;

        if claims.token_type != Some(TokenKind::Refresh) {
            return Err(TokenError::WrongKind {
                expected: "refresh",
            });
        }

        Ok(claims)
    }

    /// Issues a fresh access+refresh pair for a subject.
    pub fn issue_pair(&self, subject: Uuid, role: Role) -> Result<IssuedTokens, TokenError> {
        let now = Utc::now();
        let access = self.sign(&Claims::access(subject, role))?;
        let refresh = self.sign(&Claims::refresh(subject))?;

        Ok(IssuedTokens {
            access,
            refresh,
            expired_at: now + role.access_ttl(),
            refreshable_until: now + refresh_ttl(),
        })
    }
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // The secret stays out of logs.
        f.debug_struct("TokenCodec").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

    #[test]
    fn test_role_access_ttl() {
        assert_eq!(Role::Member.access_ttl(), Duration::minutes(30));
        assert_eq!(Role::User.access_ttl(), Duration::minutes(60));
    }

    #[test]
    fn test_issue_and_verify_roundtrip() {
        let codec = TokenCodec::new(SECRET);
        let subject = Uuid::new_v4();

        let token = codec.sign(&Claims::access(subject, Role::Member)).unwrap();
        let claims = codec.verify(&token).unwrap();

        assert_eq!(claims.user_id, subject);
        assert_eq!(claims.role, Some(Role::Member));
        assert_eq!(claims.token_type, None);
        assert_eq!(claims.iss, ISSUER);
        assert!(!claims.is_expired());
    }

    #[test]
    fn test_foreign_key_is_invalid_signature() {
        let codec = TokenCodec::new(SECRET);
        let other = TokenCodec::new("a-completely-different-signing-secret!!");

        let token = codec
            .sign(&Claims::access(Uuid::new_v4(), Role::Member))
            .unwrap();
        let result = other.verify(&token);

        assert!(matches!(result, Err(TokenError::InvalidSignature)));
    }

    #[test]
    fn test_foreign_issuer_is_rejected() {
        let codec = TokenCodec::new(SECRET);

        let mut claims = Claims::access(Uuid::new_v4(), Role::Member);
        claims.iss = "someone-else".to_string();
        let token = codec.sign(&claims).unwrap();

        assert!(matches!(
            codec.verify(&token),
            Err(TokenError::InvalidSignature)
        ));
    }

    #[test]
    fn test_expired_token_is_expired() {
        let codec = TokenCodec::new(SECRET);

        // Expired an hour ago, well past validation leeway
        let claims =
            Claims::access_with_ttl(Uuid::new_v4(), Role::Member, Duration::seconds(-3600));
        assert!(claims.is_expired());

        let token = codec.sign(&claims).unwrap();
        assert!(matches!(codec.verify(&token), Err(TokenError::Expired)));
    }

    #[test]
    fn test_garbage_is_malformed() {
        let codec = TokenCodec::new(SECRET);
        assert!(matches!(
            codec.verify("not-a-token"),
            Err(TokenError::Malformed)
        ));
        assert!(matches!(
            codec.verify("aaaa.bbbb.cccc"),
            Err(TokenError::Malformed)
        ));
    }

    #[test]
    fn test_access_and_refresh_discrimination() {
        let codec = TokenCodec::new(SECRET);
        let subject = Uuid::new_v4();

        let access = codec.sign(&Claims::access(subject, Role::User)).unwrap();
        let refresh = codec.sign(&Claims::refresh(subject)).unwrap();

        assert!(codec.verify_access(&access).is_ok());
        assert!(matches!(
            codec.verify_access(&refresh),
            Err(TokenError::WrongKind { expected: "access" })
        ));

        assert!(codec.verify_refresh(&refresh).is_ok());
        assert!(matches!(
            codec.verify_refresh(&access),
            Err(TokenError::WrongKind {
                expected: "refresh"
            })
        ));
    }

    #[test]
    fn test_refresh_token_carries_no_role() {
        let codec = TokenCodec::new(SECRET);
        let refresh = codec.sign(&Claims::refresh(Uuid::new_v4())).unwrap();
        let claims = codec.verify_refresh(&refresh).unwrap();

        assert_eq!(claims.role, None);
        assert_eq!(claims.token_type, Some(TokenKind::Refresh));
    }

    #[test]
    fn test_issue_pair_tokens_are_unique() {
        let codec = TokenCodec::new(SECRET);
        let subject = Uuid::new_v4();

        let first = codec.issue_pair(subject, Role::Member).unwrap();
        let second = codec.issue_pair(subject, Role::Member).unwrap();

        assert_ne!(first.access, second.access);
        assert_ne!(first.refresh, second.refresh);
        assert_ne!(first.access, first.refresh);

        // Both pairs still resolve to the same subject
        assert_eq!(codec.verify_access(&second.access).unwrap().user_id, subject);
        assert_eq!(
            codec.verify_refresh(&second.refresh).unwrap().user_id,
            subject
        );
    }

    #[test]
    fn test_pair_expiry_windows() {
        let codec = TokenCodec::new(SECRET);
        let pair = codec.issue_pair(Uuid::new_v4(), Role::Member).unwrap();

        let access_window = pair.expired_at - Utc::now();
        assert!(access_window <= Duration::minutes(30));
        assert!(access_window > Duration::minutes(29));

        let refresh_window = pair.refreshable_until - Utc::now();
        assert!(refresh_window <= Duration::days(7));
        assert!(refresh_window > Duration::days(6));
    }

    #[test]
    fn test_debug_does_not_leak_secret() {
        let codec = TokenCodec::new(SECRET);
        let rendered = format!("{:?}", codec);
        assert!(!rendered.contains(SECRET));
    }
}

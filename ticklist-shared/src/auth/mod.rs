/// Authentication and authorization for TickList
///
/// # Modules
///
/// - [`token`]: HS256 token codec (issue/verify, access vs refresh)
/// - [`password`]: Argon2id hashing, the opaque verification collaborator
/// - [`resolver`]: header → typed [`resolver::Principal`] resolution
/// - [`guard`]: ownership decisions with information-hiding denials
/// - [`credentials`]: member join/login/refresh/password lifecycle
/// - [`sessions`]: anonymous token-only session lifecycle
///
/// The request pipeline is resolver → guard → service: a handler resolves
/// the caller once, and every record operation re-checks ownership against
/// that principal.

pub mod credentials;
pub mod guard;
pub mod password;
pub mod resolver;
pub mod sessions;
pub mod token;

pub use credentials::{CredentialError, CredentialManager, PasswordReset};
pub use guard::{authorize, OwnershipDenied};
pub use resolver::{AuthError, Principal};
pub use sessions::{SessionError, SessionManager};
pub use token::{AuthorizedSession, Claims, IssuedTokens, Role, TokenCodec, TokenError};

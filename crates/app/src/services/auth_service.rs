//! Authentication service — login and bearer-token verification.
//!
//! The state-sync core consumes this as a collaborator: it hands over a
//! token and receives an [`Identity`] or a rejection. Token contents beyond
//! the role capability are opaque to everything downstream.

use chrono::Duration;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use homelink_domain::error::{AuthRejectedError, HomeLinkError};
use homelink_domain::time::now;
use homelink_domain::user::{Identity, Role};

use crate::ports::UserRepository;

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    role: Role,
    iat: i64,
    exp: i64,
}

/// Application service issuing and verifying bearer tokens.
pub struct AuthService<R> {
    repo: R,
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl<R: UserRepository> AuthService<R> {
    /// Service signing HS256 tokens with `secret`, valid for `ttl`.
    pub fn new(repo: R, secret: &[u8], ttl: Duration) -> Self {
        Self {
            repo,
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl,
        }
    }

    /// Authenticate a username/password pair and issue a token.
    ///
    /// # Errors
    ///
    /// Returns [`HomeLinkError::AuthRejected`] for an unknown user or wrong
    /// password (indistinguishable to the caller), or a storage error from
    /// the repository.
    pub async fn login(
        &self,
        username: &str,
        password: &str,
    ) -> Result<(String, Identity), HomeLinkError> {
        let Some(stored) = self.repo.find_by_username(username).await? else {
            return Err(AuthRejectedError::BadCredentials.into());
        };

        let matches = bcrypt::verify(password, &stored.password_hash)
            .map_err(|err| HomeLinkError::Credential(Box::new(err)))?;
        if !matches {
            return Err(AuthRejectedError::BadCredentials.into());
        }

        let identity = Identity {
            username: stored.user.username,
            role: stored.user.role,
        };
        let token = self.issue(&identity)?;
        tracing::info!(username = %identity.username, "login accepted");
        Ok((token, identity))
    }

    /// Sign a token for an already-established identity.
    ///
    /// # Errors
    ///
    /// Returns [`HomeLinkError::Credential`] if signing fails.
    pub fn issue(&self, identity: &Identity) -> Result<String, HomeLinkError> {
        let issued = now();
        let claims = Claims {
            sub: identity.username.clone(),
            role: identity.role,
            iat: issued.timestamp(),
            exp: (issued + self.ttl).timestamp(),
        };
        jsonwebtoken::encode(&Header::default(), &claims, &self.encoding)
            .map_err(|err| HomeLinkError::Credential(Box::new(err)))
    }

    /// Verify a bearer token and extract the embedded identity.
    ///
    /// # Errors
    ///
    /// Returns [`AuthRejectedError::InvalidToken`] on any signature, shape,
    /// or expiry failure. No state is mutated on rejection.
    pub fn verify(&self, token: &str) -> Result<Identity, HomeLinkError> {
        let data = jsonwebtoken::decode::<Claims>(token, &self.decoding, &Validation::default())
            .map_err(|_| AuthRejectedError::InvalidToken)?;
        Ok(Identity {
            username: data.claims.sub,
            role: data.claims.role,
        })
    }
}

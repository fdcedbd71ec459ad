use chrono::Utc;
use hmac::{Hmac, Mac};
use jwt::VerifyWithKey;
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use crate::{error::Error, schema::Id};

use super::permissions::Identity;

/// Claims of a session token issued by the user service.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct SessionClaims {
    pub user_id: Id,
    pub iat: i64,
    pub exp: i64,
}

/// Verifies HMAC-SHA256 session tokens. Issuing them is not our job.
#[derive(Clone)]
pub struct SessionKey {
    key: Hmac<Sha256>,
}

impl SessionKey {
    pub fn new(secret: &str) -> Result<Self, Error> {
        let key = Hmac::new_from_slice(secret.as_bytes()).map_err(|e| {
            log::error!("Invalid session secret: {e}");
            Error::Unauthorized
        })?;

        Ok(Self { key })
    }

    pub fn verify(&self, token: &str) -> Result<SessionClaims, Error> {
        let claims: SessionClaims = token.verify_with_key(&self.key).map_err(|e| {
            log::warn!("Rejected session token: {e}");
            Error::Unauthorized
        })?;

        if claims.exp < Utc::now().timestamp() {
            log::debug!("Session token of user {} has expired", claims.user_id);
            return Err(Error::Unauthorized);
        }

        Ok(claims)
    }

    pub fn identify(&self, token: &str) -> Result<Identity, Error> {
        self.verify(token).map(|claims| Identity::User(claims.user_id))
    }

    #[cfg(test)]
    pub(crate) fn sign(&self, claims: &SessionClaims) -> String {
        use jwt::SignWithKey;

        claims.sign_with_key(&self.key).unwrap()
    }
}

#[cfg(test)]
pub(crate) fn claims_for(user_id: Id, ttl_seconds: i64) -> SessionClaims {
    let now = Utc::now().timestamp();
    SessionClaims {
        user_id,
        iat: now,
        exp: now + ttl_seconds,
    }
}

//! Service-identity tokens: short-lived RS256 JWTs asserting the caller's
//! role (and, for session tokens, its user id).
//!
//! The private key is held by the issuing service only; verifiers get the
//! public key as a PEM file distributed out-of-band. There is no revocation:
//! a compromised key is handled by rotation, not per-token invalidation.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::domain::identity::{Identity, Role};

pub const ORDERS_AUDIENCE: &str = "ORDERS_SRV";
pub const PRODUCTS_AUDIENCE: &str = "PRODUCTS_SRV";

/// Default lifetime of a service-to-service token.
pub const SERVICE_TOKEN_TTL_SECS: i64 = 24 * 60 * 60;
/// Default lifetime of an end-user session token.
pub const SESSION_TOKEN_TTL_SECS: i64 = 30 * 60;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("could not validate credentials")]
    InvalidToken,
    #[error("invalid key material: {0}")]
    Key(String),
    #[error("token signing failed: {0}")]
    Signing(String),
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    iss: String,
    aud: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    user_id: Option<Uuid>,
    role: Role,
    iat: i64,
    exp: i64,
}

/// Mints tokens with the service's private key.
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    issuer: String,
}

impl TokenIssuer {
    pub fn from_pem(private_key_pem: &[u8], issuer: &str) -> Result<Self, AuthError> {
        let encoding_key =
            EncodingKey::from_rsa_pem(private_key_pem).map_err(|e| AuthError::Key(e.to_string()))?;
        Ok(TokenIssuer {
            encoding_key,
            issuer: issuer.to_string(),
        })
    }

    /// A service-to-service assertion: role only, no subject.
    pub fn service_token(
        &self,
        role: Role,
        audience: &str,
        ttl: Duration,
    ) -> Result<String, AuthError> {
        self.sign(None, role, audience, ttl)
    }

    /// An end-user session assertion carrying the subject `user_id`.
    pub fn session_token(
        &self,
        user_id: Uuid,
        role: Role,
        audience: &str,
        ttl: Duration,
    ) -> Result<String, AuthError> {
        self.sign(Some(user_id), role, audience, ttl)
    }

    fn sign(
        &self,
        user_id: Option<Uuid>,
        role: Role,
        audience: &str,
        ttl: Duration,
    ) -> Result<String, AuthError> {
        let now = Utc::now();
        let claims = Claims {
            iss: self.issuer.clone(),
            aud: audience.to_string(),
            user_id,
            role,
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        };
        encode(&Header::new(Algorithm::RS256), &claims, &self.encoding_key)
            .map_err(|e| AuthError::Signing(e.to_string()))
    }
}

/// Validates inbound tokens against the issuer's public key and this
/// service's expected audience.
#[derive(Clone)]
pub struct TokenVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenVerifier {
    pub fn from_pem(public_key_pem: &[u8], audience: &str) -> Result<Self, AuthError> {
        let decoding_key =
            DecodingKey::from_rsa_pem(public_key_pem).map_err(|e| AuthError::Key(e.to_string()))?;
        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_audience(&[audience]);
        Ok(TokenVerifier {
            decoding_key,
            validation,
        })
    }

    /// Checks signature, expiry, audience, and the presence of a role claim.
    /// Every failure collapses to `InvalidToken`; callers never learn which
    /// check failed.
    pub fn verify(&self, token: &str) -> Result<Identity, AuthError> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
            log::debug!("token rejected: {}", e);
            AuthError::InvalidToken
        })?;
        Ok(Identity {
            user_id: data.claims.user_id,
            role: data.claims.role,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PRIVATE_KEY: &[u8] = include_bytes!("../../tests/fixtures/jwt_private.pem");
    const PUBLIC_KEY: &[u8] = include_bytes!("../../tests/fixtures/jwt_public.pem");

    fn issuer() -> TokenIssuer {
        TokenIssuer::from_pem(PRIVATE_KEY, "order_srv").expect("valid private key")
    }

    fn verifier(audience: &str) -> TokenVerifier {
        TokenVerifier::from_pem(PUBLIC_KEY, audience).expect("valid public key")
    }

    #[test]
    fn service_token_roundtrip() {
        let token = issuer()
            .service_token(Role::OrderSrv, PRODUCTS_AUDIENCE, Duration::hours(24))
            .expect("sign failed");

        let identity = verifier(PRODUCTS_AUDIENCE).verify(&token).expect("verify failed");
        assert_eq!(identity.role, Role::OrderSrv);
        assert!(identity.user_id.is_none());
    }

    #[test]
    fn session_token_carries_user_id() {
        let user_id = Uuid::new_v4();
        let token = issuer()
            .session_token(user_id, Role::Buyer, ORDERS_AUDIENCE, Duration::minutes(30))
            .expect("sign failed");

        let identity = verifier(ORDERS_AUDIENCE).verify(&token).expect("verify failed");
        assert_eq!(identity.role, Role::Buyer);
        assert_eq!(identity.user_id, Some(user_id));
    }

    #[test]
    fn expired_token_is_rejected() {
        // Well past the default validation leeway.
        let token = issuer()
            .service_token(Role::OrderSrv, PRODUCTS_AUDIENCE, Duration::seconds(-300))
            .expect("sign failed");

        assert!(matches!(
            verifier(PRODUCTS_AUDIENCE).verify(&token),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn wrong_audience_is_rejected() {
        let token = issuer()
            .service_token(Role::OrderSrv, PRODUCTS_AUDIENCE, Duration::hours(1))
            .expect("sign failed");

        assert!(matches!(
            verifier(ORDERS_AUDIENCE).verify(&token),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn tampered_payload_is_rejected() {
        let token = issuer()
            .session_token(Uuid::new_v4(), Role::Buyer, ORDERS_AUDIENCE, Duration::hours(1))
            .expect("sign failed");

        // Swap the payload segment for a different (validly encoded) one;
        // the signature no longer matches.
        let other = issuer()
            .session_token(Uuid::new_v4(), Role::Seller, ORDERS_AUDIENCE, Duration::hours(1))
            .expect("sign failed");
        let parts: Vec<&str> = token.split('.').collect();
        let other_parts: Vec<&str> = other.split('.').collect();
        let forged = format!("{}.{}.{}", parts[0], other_parts[1], parts[2]);

        assert!(matches!(
            verifier(ORDERS_AUDIENCE).verify(&forged),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn garbage_token_is_rejected() {
        assert!(matches!(
            verifier(ORDERS_AUDIENCE).verify("not-a-jwt"),
            Err(AuthError::InvalidToken)
        ));
    }
}

//! Bearer tokens (HS256 JWT) carrying the caller's id and team memberships.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use super::Actor;
use crate::errors::{AuthError, AuthResult};

pub const TOKEN_ISSUER: &str = "huddle";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuthTokenClaims {
    /// User id
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
    pub iss: String,
    /// Team ids at issue time
    #[serde(default)]
    pub tms: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rol: Option<String>,
}

impl AuthTokenClaims {
    pub fn new(user_id: &str, tms: Vec<String>, validity: Duration) -> Self {
        let now = Utc::now();
        Self {
            sub: user_id.to_string(),
            iat: now.timestamp(),
            exp: (now + validity).timestamp(),
            iss: TOKEN_ISSUER.to_string(),
            tms,
            rol: None,
        }
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.rol = Some(role.into());
        self
    }

    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() > self.exp
    }

    pub fn into_actor(self) -> Actor {
        let actor = Actor::user(self.sub).with_tms(self.tms);
        match self.rol {
            Some(role) => actor.with_role(role),
            None => actor,
        }
    }
}

pub struct AuthTokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    validity: Duration,
}

impl AuthTokenCodec {
    pub fn new(secret: &[u8], validity: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.validate_aud = false;
        validation.set_issuer(&[TOKEN_ISSUER]);

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            validity,
        }
    }

    pub fn issue(&self, user_id: &str, tms: Vec<String>) -> AuthResult<String> {
        self.encode(&AuthTokenClaims::new(user_id, tms, self.validity))
    }

    pub fn encode(&self, claims: &AuthTokenClaims) -> AuthResult<String> {
        Ok(encode(
            &Header::new(Algorithm::HS256),
            claims,
            &self.encoding_key,
        )?)
    }

    pub fn decode(&self, token: &str) -> AuthResult<AuthTokenClaims> {
        let data = decode::<AuthTokenClaims>(token, &self.decoding_key, &self.validation)
            .map_err(|err| match err.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                _ => AuthError::InvalidToken,
            })?;

        if data.claims.is_expired() {
            return Err(AuthError::TokenExpired);
        }

        Ok(data.claims)
    }

    /// Resolve an optional `Authorization` header value into an actor.
    /// A missing header yields an anonymous actor; a bad token is an error.
    pub fn actor_from_header(&self, header: Option<&str>) -> AuthResult<Actor> {
        let Some(value) = header else {
            return Ok(Actor::anonymous());
        };
        let token = value
            .strip_prefix("Bearer ")
            .or_else(|| value.strip_prefix("bearer "))
            .unwrap_or(value)
            .trim();
        if token.is_empty() {
            return Ok(Actor::anonymous());
        }
        Ok(self.decode(token)?.into_actor())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codec() -> AuthTokenCodec {
        AuthTokenCodec::new(b"test-secret", Duration::hours(1))
    }

    #[test]
    fn issue_and_decode() {
        let codec = codec();
        let token = codec.issue("u1", vec!["t1".into()]).unwrap();
        let claims = codec.decode(&token).unwrap();
        assert_eq!(claims.sub, "u1");
        assert_eq!(claims.tms, vec!["t1".to_string()]);
        assert_eq!(claims.iss, TOKEN_ISSUER);
    }

    #[test]
    fn expired_tokens_are_rejected() {
        let codec = codec();
        let claims = AuthTokenClaims::new("u1", vec![], Duration::hours(-2));
        let token = codec.encode(&claims).unwrap();
        assert!(matches!(codec.decode(&token), Err(AuthError::TokenExpired)));
    }

    #[test]
    fn tokens_signed_elsewhere_are_rejected() {
        let other = AuthTokenCodec::new(b"other-secret", Duration::hours(1));
        let token = other.issue("u1", vec![]).unwrap();
        assert!(matches!(codec().decode(&token), Err(AuthError::InvalidToken)));
    }

    #[test]
    fn header_parsing() {
        let codec = codec();
        assert!(!codec.actor_from_header(None).unwrap().is_authenticated());

        let token = codec
            .encode(&AuthTokenClaims::new("u2", vec![], Duration::hours(1)).with_role("su"))
            .unwrap();
        let actor = codec
            .actor_from_header(Some(&format!("Bearer {}", token)))
            .unwrap();
        assert_eq!(actor.user_id.as_deref(), Some("u2"));
        assert!(actor.is_super_user());

        assert!(codec.actor_from_header(Some("Bearer garbage")).is_err());
    }
}

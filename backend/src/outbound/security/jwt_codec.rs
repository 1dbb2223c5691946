//! [`TokenCodec`] signing HS256 JSON Web Tokens.
//!
//! `exp` is carried but not validated here; the credential service compares it
//! against its own clock.

use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::domain::ports::{TokenCodec, TokenError};
use crate::domain::{Claims, Role, UserId};

#[derive(Debug, Serialize, Deserialize)]
struct WireClaims {
    sub: String,
    username: String,
    role: Role,
    iat: i64,
    exp: i64,
}

impl From<&Claims> for WireClaims {
    fn from(claims: &Claims) -> Self {
        Self {
            sub: claims.user_id.to_string(),
            username: claims.username.clone(),
            role: claims.role,
            iat: claims.issued_at.timestamp(),
            exp: claims.expires_at.timestamp(),
        }
    }
}

fn timestamp(field: &str, secs: i64) -> Result<DateTime<Utc>, TokenError> {
    DateTime::from_timestamp(secs, 0)
        .ok_or_else(|| TokenError::invalid(format!("{field} is out of range")))
}

impl TryFrom<WireClaims> for Claims {
    type Error = TokenError;

    fn try_from(wire: WireClaims) -> Result<Self, Self::Error> {
        let user_id = UserId::new(&wire.sub).map_err(|err| TokenError::invalid(err.to_string()))?;
        Ok(Self {
            user_id,
            username: wire.username,
            role: wire.role,
            issued_at: timestamp("iat", wire.iat)?,
            expires_at: timestamp("exp", wire.exp)?,
        })
    }
}

/// HMAC-SHA256 token codec keyed by a shared secret.
pub struct JwtTokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl JwtTokenCodec {
    /// Build a codec from raw secret bytes.
    pub fn new(secret: &Zeroizing<Vec<u8>>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.required_spec_claims.clear();
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
        }
    }
}

impl TokenCodec for JwtTokenCodec {
    fn encode(&self, claims: &Claims) -> Result<String, TokenError> {
        jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            &WireClaims::from(claims),
            &self.encoding,
        )
        .map_err(|err| TokenError::encoding(err.to_string()))
    }

    fn decode(&self, token: &str) -> Result<Claims, TokenError> {
        let data = jsonwebtoken::decode::<WireClaims>(token, &self.decoding, &self.validation)
            .map_err(|err| TokenError::invalid(err.to_string()))?;
        Claims::try_from(data.claims)
    }
}

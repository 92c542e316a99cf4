//! HS256 bearer tokens.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ApiError;

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
  /// Account id.
  sub: String,
  iat: i64,
  exp: i64,
}

/// A freshly signed token and the instant it stops being accepted.
#[derive(Debug, Clone, Serialize)]
pub struct IssuedToken {
  pub token:      String,
  pub expires_at: DateTime<Utc>,
}

/// Signs and verifies session tokens with one shared secret.
pub struct TokenIssuer {
  encoding: EncodingKey,
  decoding: DecodingKey,
  ttl:      Duration,
}

impl TokenIssuer {
  pub fn new(secret: &[u8], ttl: Duration) -> Self {
    Self {
      encoding: EncodingKey::from_secret(secret),
      decoding: DecodingKey::from_secret(secret),
      ttl,
    }
  }

  pub fn issue(&self, account_id: Uuid, now: DateTime<Utc>) -> Result<IssuedToken, ApiError> {
    let expires_at = now + self.ttl;
    let claims = Claims {
      sub: account_id.to_string(),
      iat: now.timestamp(),
      exp: expires_at.timestamp(),
    };
    let token = encode(&Header::default(), &claims, &self.encoding)
      .map_err(|e| ApiError::Internal(format!("token signing failed: {e}")))?;
    Ok(IssuedToken { token, expires_at })
  }

  /// The account id a valid, unexpired token was issued to.
  pub fn verify(&self, token: &str) -> Result<Uuid, ApiError> {
    let data = decode::<Claims>(token, &self.decoding, &Validation::default())
      .map_err(|_| ApiError::Unauthorized)?;
    Uuid::parse_str(&data.claims.sub).map_err(|_| ApiError::Unauthorized)
  }
}

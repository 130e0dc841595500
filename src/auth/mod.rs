pub mod cookie;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Lifetime of an issued token, in seconds.
pub const TOKEN_TTL_SECS: i64 = 60 * 60;

/// Token body: whatever the client posted to `create-token`, plus the
/// standard `iat`/`exp` timestamps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    pub iat: i64,
    pub exp: i64,
    #[serde(flatten)]
    pub payload: Map<String, Value>,
}

impl Claims {
    pub fn new(mut payload: Map<String, Value>, now: DateTime<Utc>) -> Self {
        payload.remove("iat");
        payload.remove("exp");
        Self {
            iat: now.timestamp(),
            exp: (now + Duration::seconds(TOKEN_TTL_SECS)).timestamp(),
            payload,
        }
    }

    pub fn email(&self) -> Option<&str> {
        self.payload.get("email").and_then(Value::as_str)
    }
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token signing secret is empty")]
    MissingSecret,

    #[error("token generation error: {0}")]
    Generation(#[source] jsonwebtoken::errors::Error),

    #[error("token expired")]
    Expired,

    #[error("invalid token: {0}")]
    Invalid(#[source] jsonwebtoken::errors::Error),
}

/// HS256 signer/verifier built once from the shared secret.
#[derive(Clone)]
pub struct TokenSigner {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl TokenSigner {
    pub fn new(secret: &str) -> Result<Self, TokenError> {
        if secret.is_empty() {
            return Err(TokenError::MissingSecret);
        }
        let mut validation = Validation::default();
        validation.leeway = 0;

        Ok(Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        })
    }

    pub fn issue(&self, payload: Map<String, Value>) -> Result<String, TokenError> {
        self.issue_at(payload, Utc::now())
    }

    pub fn issue_at(&self, payload: Map<String, Value>, now: DateTime<Utc>) -> Result<String, TokenError> {
        let claims = Claims::new(payload, now);
        encode(&Header::default(), &claims, &self.encoding).map_err(TokenError::Generation)
    }

    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid(e),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload(email: &str) -> Map<String, Value> {
        match json!({ "email": email, "name": "Sam" }) {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[test]
    fn issued_token_carries_payload_and_one_hour_expiry() {
        let signer = TokenSigner::new("secret").unwrap();
        let token = signer.issue(payload("sam@srh.com")).unwrap();
        let claims = signer.verify(&token).unwrap();

        assert_eq!(claims.email(), Some("sam@srh.com"));
        assert_eq!(claims.payload.get("name"), Some(&json!("Sam")));
        assert_eq!(claims.exp - claims.iat, TOKEN_TTL_SECS);
    }

    #[test]
    fn client_supplied_timestamps_are_replaced() {
        let mut body = payload("sam@srh.com");
        body.insert("exp".to_string(), json!(i64::MAX));
        let now = Utc::now();
        let claims = Claims::new(body, now);
        assert_eq!(claims.exp, now.timestamp() + TOKEN_TTL_SECS);
        assert!(!claims.payload.contains_key("exp"));
    }

    #[test]
    fn expired_token_is_rejected() {
        let signer = TokenSigner::new("secret").unwrap();
        let token = signer
            .issue_at(payload("sam@srh.com"), Utc::now() - Duration::hours(2))
            .unwrap();
        assert!(matches!(signer.verify(&token), Err(TokenError::Expired)));
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let token = TokenSigner::new("other").unwrap().issue(payload("sam@srh.com")).unwrap();
        let signer = TokenSigner::new("secret").unwrap();
        assert!(matches!(signer.verify(&token), Err(TokenError::Invalid(_))));
        assert!(matches!(signer.verify("garbage"), Err(TokenError::Invalid(_))));
    }

    #[test]
    fn non_string_email_is_not_an_identity() {
        let mut body = Map::new();
        body.insert("email".to_string(), json!(42));
        let claims = Claims::new(body, Utc::now());
        assert_eq!(claims.email(), None);
    }

    #[test]
    fn empty_secret_is_refused() {
        assert!(matches!(TokenSigner::new(""), Err(TokenError::MissingSecret)));
    }
}

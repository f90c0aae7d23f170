//! Bearer-token helpers.
//!
//! The backend issues a JWT on login. The client never verifies the
//! signature (the backend does that on every request); it only decodes the
//! payload segment to display the logged-in subject and to check expiry
//! before bothering the network.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::error::{ApiError, Result};

/// Fixed key the bearer token is persisted under in the session file.
pub const TOKEN_KEY: &str = "app-jwt";

/// Claim set carried in the token payload.
///
/// Only the claims the client displays are modeled; unknown claims are
/// ignored on decode.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Claims {
    /// Subject: the account email.
    pub sub: String,
    /// Expiry as a unix timestamp, if the backend set one.
    #[serde(default)]
    pub exp: Option<i64>,
    /// Issued-at as a unix timestamp, if the backend set one.
    #[serde(default)]
    pub iat: Option<i64>,
}

impl Claims {
    /// Returns whether the token is expired at `now`.
    ///
    /// A token without an `exp` claim never expires from the client's point
    /// of view; the backend remains the authority either way.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        match self.exp {
            Some(exp) => now.timestamp() >= exp,
            None => false,
        }
    }
}

/// Decodes the payload segment of a JWT without verifying the signature.
pub fn decode_claims(token: &str) -> Result<Claims> {
    let segments: Vec<&str> = token.split('.').collect();
    if segments.len() != 3 {
        return Err(ApiError::MalformedToken(segments.len()));
    }

    let payload = URL_SAFE_NO_PAD
        .decode(segments[1])
        .map_err(|e| ApiError::PayloadEncoding(e.to_string()))?;

    serde_json::from_slice(&payload).map_err(|e| ApiError::PayloadJson(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    /// Builds an unsigned token with the given payload JSON.
    fn token_with_payload(payload: &str) -> String {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
        let body = URL_SAFE_NO_PAD.encode(payload.as_bytes());
        format!("{header}.{body}.signature")
    }

    #[test]
    fn decodes_subject_and_expiry() {
        let token = token_with_payload(r#"{"sub":"user@example.com","exp":1900000000}"#);
        let claims = decode_claims(&token).unwrap();

        assert_eq!(claims.sub, "user@example.com");
        assert_eq!(claims.exp, Some(1900000000));
    }

    #[test]
    fn ignores_unknown_claims() {
        let token = token_with_payload(r#"{"sub":"a@b.c","role":"ADMIN","custom":[1,2]}"#);
        let claims = decode_claims(&token).unwrap();

        assert_eq!(claims.sub, "a@b.c");
        assert_eq!(claims.exp, None);
    }

    #[test]
    fn rejects_wrong_segment_count() {
        let err = decode_claims("only.two").unwrap_err();
        assert!(matches!(err, ApiError::MalformedToken(2)));

        let err = decode_claims("noseparators").unwrap_err();
        assert!(matches!(err, ApiError::MalformedToken(1)));
    }

    #[test]
    fn rejects_invalid_base64_payload() {
        let err = decode_claims("head.!!!not-base64!!!.sig").unwrap_err();
        assert!(matches!(err, ApiError::PayloadEncoding(_)));
    }

    #[test]
    fn rejects_non_json_payload() {
        let body = URL_SAFE_NO_PAD.encode(b"plain text");
        let err = decode_claims(&format!("h.{body}.s")).unwrap_err();
        assert!(matches!(err, ApiError::PayloadJson(_)));
    }

    #[test]
    fn expiry_check_compares_against_now() {
        let claims = Claims {
            sub: "a@b.c".to_string(),
            exp: Some(1000),
            iat: None,
        };

        let before = Utc.timestamp_opt(999, 0).unwrap();
        let after = Utc.timestamp_opt(1001, 0).unwrap();

        assert!(!claims.is_expired(before));
        assert!(claims.is_expired(after));
    }

    #[test]
    fn token_without_exp_never_expires_client_side() {
        let claims = Claims {
            sub: "a@b.c".to_string(),
            exp: None,
            iat: None,
        };
        assert!(!claims.is_expired(Utc::now()));
    }
}

//! Bearer token decoding.
//!
//! The backend issues JWTs. The client never verifies the signature; it only
//! reads the payload segment to learn which role the session carries.

use std::fmt;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Authorization tier of the signed-in user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Desbravador,
    Monitor,
    Diretor,
    Unauthenticated,
}

impl Role {
    /// Parse a role claim. `UNAUTHENTICATED` is not a valid claim.
    pub fn from_claim(claim: &str) -> Option<Role> {
        match claim {
            "DESBRAVADOR" => Some(Role::Desbravador),
            "MONITOR" => Some(Role::Monitor),
            "DIRETOR" => Some(Role::Diretor),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Desbravador => "DESBRAVADOR",
            Role::Monitor => "MONITOR",
            Role::Diretor => "DIRETOR",
            Role::Unauthenticated => "UNAUTHENTICATED",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("expected three dot-separated segments, found {0}")]
    Segments(usize),

    #[error("payload is not valid base64url")]
    Base64,

    #[error("payload is not a JSON object")]
    Payload,

    #[error("payload has no role claim")]
    MissingRole,

    #[error("unknown role claim {0:?}")]
    UnknownRole(String),
}

/// Claims the client reads out of the token payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenClaims {
    pub role: Role,
    pub subject: Option<String>,
    pub expires_at: Option<i64>,
}

pub fn decode_claims(token: &str) -> Result<TokenClaims, TokenError> {
    let segments: Vec<&str> = token.split('.').collect();
    if segments.len() != 3 || segments.iter().any(|s| s.is_empty()) {
        return Err(TokenError::Segments(segments.len()));
    }

    // Some issuers keep the `=` padding, URL_SAFE_NO_PAD rejects it.
    let payload = segments[1].trim_end_matches('=');
    let bytes = URL_SAFE_NO_PAD
        .decode(payload)
        .map_err(|_| TokenError::Base64)?;

    let payload: serde_json::Map<String, serde_json::Value> =
        serde_json::from_slice(&bytes).map_err(|_| TokenError::Payload)?;

    let role = match payload.get("role") {
        Some(serde_json::Value::String(claim)) => {
            Role::from_claim(claim).ok_or_else(|| TokenError::UnknownRole(claim.clone()))?
        }
        Some(other) => return Err(TokenError::UnknownRole(other.to_string())),
        None => return Err(TokenError::MissingRole),
    };

    Ok(TokenClaims {
        role,
        subject: payload.get("sub").and_then(|v| v.as_str()).map(str::to_string),
        expires_at: payload.get("exp").and_then(|v| v.as_i64()),
    })
}

/// Role carried by `token`, or `None` if the token cannot be decoded.
pub fn decode_role(token: &str) -> Option<Role> {
    decode_claims(token).ok().map(|claims| claims.role)
}

#[cfg(test)]
pub(crate) fn encode_test_token(payload: &serde_json::Value) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let body = URL_SAFE_NO_PAD.encode(payload.to_string());
    format!("{}.{}.signature", header, body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_every_role() {
        for (claim, role) in [
            ("DESBRAVADOR", Role::Desbravador),
            ("MONITOR", Role::Monitor),
            ("DIRETOR", Role::Diretor),
        ] {
            let token = encode_test_token(&json!({ "sub": "a@b.com", "role": claim }));
            assert_eq!(decode_role(&token), Some(role));
        }
    }

    #[test]
    fn surfaces_optional_claims() {
        let token = encode_test_token(&json!({ "sub": "a@b.com", "role": "MONITOR", "exp": 1700000000 }));
        let claims = decode_claims(&token).unwrap();
        assert_eq!(claims.subject.as_deref(), Some("a@b.com"));
        assert_eq!(claims.expires_at, Some(1700000000));
    }

    #[test]
    fn accepts_padded_payload() {
        let body = base64::engine::general_purpose::URL_SAFE.encode(r#"{"role": "DIRETOR"}"#);
        assert!(body.ends_with('='));
        let token = format!("h.{}.s", body);
        assert_eq!(decode_role(&token), Some(Role::Diretor));
    }

    #[test]
    fn malformed_tokens_have_no_role() {
        let no_role = encode_test_token(&json!({ "sub": "x" }));
        let unknown = encode_test_token(&json!({ "role": "ADMIN" }));
        let reserved = encode_test_token(&json!({ "role": "UNAUTHENTICATED" }));
        let numeric = encode_test_token(&json!({ "role": 3 }));
        let not_object = format!("h.{}.s", URL_SAFE_NO_PAD.encode("[1,2]"));
        let not_json = format!("h.{}.s", URL_SAFE_NO_PAD.encode("hello"));

        for token in [
            "",
            "abc",
            "a.b",
            "a..c",
            "a.b.c.d",
            "h.!!!.s",
            not_json.as_str(),
            not_object.as_str(),
            no_role.as_str(),
            unknown.as_str(),
            reserved.as_str(),
            numeric.as_str(),
        ] {
            assert_eq!(decode_role(token), None, "token {:?}", token);
        }
    }

    #[test]
    fn reports_why_decoding_failed() {
        assert_eq!(decode_claims("a.b"), Err(TokenError::Segments(2)));
        assert_eq!(decode_claims("h.%%%.s"), Err(TokenError::Base64));
        let token = encode_test_token(&json!({ "sub": "x" }));
        assert_eq!(decode_claims(&token), Err(TokenError::MissingRole));
    }
}

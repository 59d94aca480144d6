//! Bearer token issuance and verification.
//!
//! Access and refresh tokens carry the same claim set and differ only in
//! `token_type` and lifetime. Verification is stateless, logout is a client
//! side discard.

use axum::http::{header::AUTHORIZATION, HeaderMap};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

pub(crate) const TOKEN_TYPE_ACCESS: &str = "access";
pub(crate) const TOKEN_TYPE_REFRESH: &str = "refresh";

#[derive(Debug, Deserialize, Serialize)]
pub(crate) struct Claims {
    pub sub: String,
    pub company_id: String,
    pub role: String,
    pub email: String,
    pub token_type: String,
    pub iat: i64,
    pub exp: i64,
}

pub(crate) struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

pub(crate) fn issue_token_pair(
    secret: &SecretString,
    principal_id: &str,
    company_id: &str,
    role: &str,
    email: &str,
    access_ttl_seconds: i64,
    refresh_ttl_seconds: i64,
) -> Result<TokenPair, jsonwebtoken::errors::Error> {
    let now = Utc::now().timestamp();

    let access_token = sign(
        secret,
        &Claims {
            sub: principal_id.to_string(),
            company_id: company_id.to_string(),
            role: role.to_string(),
            email: email.to_string(),
            token_type: TOKEN_TYPE_ACCESS.to_string(),
            iat: now,
            exp: now + access_ttl_seconds,
        },
    )?;

    let refresh_token = sign(
        secret,
        &Claims {
            sub: principal_id.to_string(),
            company_id: company_id.to_string(),
            role: role.to_string(),
            email: email.to_string(),
            token_type: TOKEN_TYPE_REFRESH.to_string(),
            iat: now,
            exp: now + refresh_ttl_seconds,
        },
    )?;

    Ok(TokenPair {
        access_token,
        refresh_token,
    })
}

fn sign(secret: &SecretString, claims: &Claims) -> Result<String, jsonwebtoken::errors::Error> {
    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(secret.expose_secret().as_bytes()),
    )
}

/// Decode an access token. Expired, malformed, or refresh tokens all yield
/// `None`, the caller answers `Unauthenticated` either way.
pub(crate) fn verify_access_token(secret: &SecretString, token: &str) -> Option<Claims> {
    let decoded = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.expose_secret().as_bytes()),
        &Validation::default(),
    )
    .ok()?;

    if decoded.claims.token_type == TOKEN_TYPE_ACCESS {
        Some(decoded.claims)
    } else {
        None
    }
}

pub(crate) fn extract_bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn secret() -> SecretString {
        SecretString::from("unit-test-secret")
    }

    fn issue(access_ttl: i64) -> TokenPair {
        issue_token_pair(
            &secret(),
            "6b7f7f5e-0000-4000-8000-000000000001",
            "6b7f7f5e-0000-4000-8000-000000000002",
            "admin",
            "admin@techcorp.com",
            access_ttl,
            604_800,
        )
        .expect("token pair")
    }

    #[test]
    fn test_round_trip() {
        let pair = issue(3600);
        let claims = verify_access_token(&secret(), &pair.access_token).expect("claims");
        assert_eq!(claims.role, "admin");
        assert_eq!(claims.email, "admin@techcorp.com");
        assert_eq!(claims.token_type, TOKEN_TYPE_ACCESS);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_refresh_token_is_not_an_access_token() {
        let pair = issue(3600);
        assert!(verify_access_token(&secret(), &pair.refresh_token).is_none());
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let pair = issue(3600);
        let other = SecretString::from("another-secret");
        assert!(verify_access_token(&other, &pair.access_token).is_none());
    }

    #[test]
    fn test_expired_token_rejected() {
        // Past the default validation leeway.
        let pair = issue(-7200);
        assert!(verify_access_token(&secret(), &pair.access_token).is_none());
    }

    #[test]
    fn test_extract_bearer_token() {
        let mut headers = HeaderMap::new();
        assert!(extract_bearer_token(&headers).is_none());

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc.def.ghi"));
        assert_eq!(extract_bearer_token(&headers), Some("abc.def.ghi"));

        headers.insert(AUTHORIZATION, HeaderValue::from_static("bearer abc.def.ghi"));
        assert_eq!(extract_bearer_token(&headers), Some("abc.def.ghi"));

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic dXNlcjpwYXNz"));
        assert!(extract_bearer_token(&headers).is_none());

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer "));
        assert!(extract_bearer_token(&headers).is_none());
    }
}

//! Bearer token minting for the API gateway.
//!
//! Tokens are compact HS256 JWTs keyed by the per-account gateway secret;
//! the gateway verifies them offline against the credentials it issued for
//! the consumer named in `sub`.

use crate::account::AccountError;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::{Duration, SystemTime};

/// Fixed validity window for issued tokens.
pub const TOKEN_TTL: Duration = Duration::from_secs(3 * 60 * 60);

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: i64,
}

fn now_unix_seconds() -> i64 {
    SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| i64::try_from(d.as_secs()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}

/// Mint a signed token for `subject`, expiring `ttl` from now.
///
/// # Errors
///
/// Returns `AccountError::Signing` if the secret is empty, the TTL is zero
/// or signing itself fails; a token with a past expiry is never issued.
pub fn issue(subject: &str, secret: &str, ttl: Duration) -> Result<String, AccountError> {
    if secret.is_empty() {
        return Err(AccountError::Signing("empty signing secret".to_string()));
    }

    if ttl.is_zero() {
        return Err(AccountError::Signing("zero token lifetime".to_string()));
    }

    let claims = Claims {
        sub: subject.to_string(),
        exp: now_unix_seconds().saturating_add(i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX)),
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|error| AccountError::Signing(error.to_string()))
}

/// Decode and verify a token issued by [`issue`].
///
/// # Errors
///
/// Returns `AccountError::Signing` if the signature does not verify, the
/// token is expired or the claims are malformed.
pub fn verify(token: &str, secret: &str) -> Result<Claims, AccountError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::new(Algorithm::HS256),
    )
    .map(|data| data.claims)
    .map_err(|error| AccountError::Signing(error.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issue_and_verify_round_trip() {
        let token = issue("consumer-42", "s3cret", TOKEN_TTL).unwrap();
        let claims = verify(&token, "s3cret").unwrap();

        assert_eq!(claims.sub, "consumer-42");
    }

    #[test]
    fn expiry_is_three_hours_out() {
        let before = now_unix_seconds();
        let token = issue("consumer-42", "s3cret", TOKEN_TTL).unwrap();
        let after = now_unix_seconds();

        let claims = verify(&token, "s3cret").unwrap();
        let ttl = i64::try_from(TOKEN_TTL.as_secs()).unwrap();
        assert!(claims.exp >= before + ttl);
        assert!(claims.exp <= after + ttl);
    }

    #[test]
    fn empty_secret_is_rejected() {
        let result = issue("consumer-42", "", TOKEN_TTL);
        assert!(matches!(result, Err(AccountError::Signing(_))));
    }

    #[test]
    fn zero_ttl_is_rejected() {
        let result = issue("consumer-42", "s3cret", Duration::ZERO);
        assert!(matches!(result, Err(AccountError::Signing(_))));
    }

    #[test]
    fn wrong_secret_fails_verification() {
        let token = issue("consumer-42", "s3cret", TOKEN_TTL).unwrap();
        assert!(verify(&token, "other").is_err());
    }

    #[test]
    fn altered_claims_fail_verification() {
        let token = issue("consumer-42", "s3cret", TOKEN_TTL).unwrap();

        // Swap the payload segment for one signed under a different subject.
        let other = issue("consumer-43", "s3cret", TOKEN_TTL).unwrap();
        let mut parts: Vec<&str> = token.split('.').collect();
        let other_parts: Vec<&str> = other.split('.').collect();
        parts[1] = other_parts[1];
        let forged = parts.join(".");

        assert!(verify(&forged, "s3cret").is_err());
    }

    #[test]
    fn expired_token_fails_verification() {
        // Craft a token that expired well past the default leeway.
        let claims = Claims {
            sub: "consumer-42".to_string(),
            exp: now_unix_seconds() - 600,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(b"s3cret"),
        )
        .unwrap();

        assert!(verify(&token, "s3cret").is_err());
    }
}

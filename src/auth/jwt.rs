use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::Error};
use uuid::Uuid;

use crate::models::{Claims, TokenType};

fn now() -> usize {
    Utc::now().timestamp().max(0) as usize
}

fn claims(user_id: u64, login: &str, role: u8, token_type: TokenType, ttl: usize) -> Claims {
    Claims {
        user_id,
        sub: login.to_string(),
        role,
        exp: now() + ttl,
        jti: Uuid::new_v4().to_string(),
        token_type,
    }
}

fn sign(claims: &Claims, secret: &str) -> Result<String, Error> {
    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

pub fn generate_access_token(
    user_id: u64,
    login: &str,
    role: u8,
    secret: &str,
    ttl: usize,
) -> Result<String, Error> {
    sign(&claims(user_id, login, role, TokenType::Access, ttl), secret)
}

/// Returns the claims too so the caller can persist the `jti`.
pub fn generate_refresh_token(
    user_id: u64,
    login: &str,
    role: u8,
    secret: &str,
    ttl: usize,
) -> Result<(String, Claims), Error> {
    let claims = claims(user_id, login, role, TokenType::Refresh, ttl);
    let token = sign(&claims, secret)?;
    Ok((token, claims))
}

pub fn verify_token(token: &str, secret: &str) -> Result<Claims, String> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn access_token_round_trip() {
        let token = generate_access_token(7, "test.user@test.com", 2, "secret", 60).unwrap();
        let claims = verify_token(&token, "secret").unwrap();
        assert_eq!(claims.user_id, 7);
        assert_eq!(claims.sub, "test.user@test.com");
        assert_eq!(claims.role, 2);
        assert_eq!(claims.token_type, TokenType::Access);
    }

    #[test]
    fn refresh_tokens_carry_unique_ids() {
        let (_, first) = generate_refresh_token(7, "a@test.com", 4, "secret", 60).unwrap();
        let (token, second) = generate_refresh_token(7, "a@test.com", 4, "secret", 60).unwrap();
        assert_ne!(first.jti, second.jti);
        assert_eq!(verify_token(&token, "secret").unwrap().token_type, TokenType::Refresh);
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = generate_access_token(1, "a@test.com", 1, "secret", 60).unwrap();
        assert!(verify_token(&token, "other").is_err());
    }
}

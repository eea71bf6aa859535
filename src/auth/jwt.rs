use crate::models::{Claims, TokenType};
use jsonwebtoken::{DecodingKey, Validation, decode, errors::Error};

pub fn verify_token(token: &str, secret: &str) -> Result<Claims, Error> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
}

/// Only access tokens open the API; refresh tokens are for the identity service.
pub fn verify_access_token(token: &str, secret: &str) -> Result<Claims, String> {
    let claims = verify_token(token, secret).map_err(|e| e.to_string())?;

    if claims.token_type != TokenType::Access {
        return Err("Refresh tokens cannot be used for API calls".to_string());
    }

    Ok(claims)
}

#[cfg(test)]
pub mod testing {
    use super::*;
    use jsonwebtoken::{EncodingKey, Header, encode};
    use std::time::{SystemTime, UNIX_EPOCH};

    pub const SECRET: &str = "test-secret";

    /// Mints a token the way the identity service would.
    pub fn token(
        role: u8,
        employee_id: Option<u64>,
        token_type: TokenType,
        secret: &str,
        ttl_secs: i64,
    ) -> String {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs() as i64;

        let claims = Claims {
            user_id: employee_id.unwrap_or(1000) + 1,
            sub: format!("user-{}", role),
            role,
            exp: (now + ttl_secs).max(0) as usize,
            jti: format!("jti-{}-{}", role, now),
            token_type,
            employee_id,
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    pub fn access_token(role: u8, employee_id: Option<u64>) -> String {
        token(role, employee_id, TokenType::Access, SECRET, 900)
    }
}

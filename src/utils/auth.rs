//! Authentication utilities

use anyhow::{Context, Result};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use pbkdf2::pbkdf2_hmac;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use std::time::{SystemTime, UNIX_EPOCH};
use subtle::ConstantTimeEq;

use crate::models::UserRole;

const PBKDF2_ITERATIONS: u32 = 100_000;
const HASH_LENGTH: usize = 32;
const SALT_LENGTH: usize = 16;
const HASH_SCHEME: &str = "pbkdf2_sha256";

/// Access token claims: the caller's id and role
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub role: UserRole,
    pub exp: usize,
    #[serde(default)]
    pub iat: usize,
}

/// Hash a password with a fresh random salt.
///
/// Output format: `pbkdf2_sha256$<iterations>$<salt hex>$<hash hex>`
pub fn hash_password(password: &str) -> Result<String> {
    let mut salt = [0u8; SALT_LENGTH];
    rand::thread_rng().fill_bytes(&mut salt);

    let hash = derive(password, &salt, PBKDF2_ITERATIONS);

    Ok(format!(
        "{}${}${}${}",
        HASH_SCHEME,
        PBKDF2_ITERATIONS,
        hex::encode(salt),
        hex::encode(hash)
    ))
}

/// Verify a password against a stored hash using constant-time comparison
pub fn verify_password(password: &str, stored: &str) -> Result<bool> {
    let mut parts = stored.split('$');
    let (Some(scheme), Some(iterations), Some(salt), Some(hash), None) = (
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
    ) else {
        anyhow::bail!("Malformed password hash");
    };

    if scheme != HASH_SCHEME {
        anyhow::bail!("Unsupported password hash scheme {}", scheme);
    }

    let iterations: u32 = iterations.parse().context("Malformed iteration count")?;
    let salt = hex::decode(salt).context("Malformed salt")?;
    let expected = hex::decode(hash).context("Malformed hash")?;

    let computed = derive(password, &salt, iterations);

    Ok(computed.as_slice().ct_eq(expected.as_slice()).into())
}

fn derive(password: &str, salt: &[u8], iterations: u32) -> [u8; HASH_LENGTH] {
    let mut hash = [0u8; HASH_LENGTH];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, iterations, &mut hash);
    hash
}

/// generate a random string of the given length
pub fn generate_random_string(length: usize) -> String {
    use rand::Rng;
    const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

    let mut rng = rand::thread_rng();
    (0..length)
        .map(|_| {
            let idx = rng.gen_range(0..CHARSET.len());
            CHARSET[idx] as char
        })
        .collect()
}

/// create an access token for a user valid for `expires_in` seconds
pub fn create_jwt(user_id: &str, role: UserRole, secret: &str, expires_in: u64) -> Result<String> {
    let now = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs();

    let claims = Claims {
        sub: user_id.to_string(),
        role,
        exp: (now + expires_in) as usize,
        iat: now as usize,
    };

    encode_claims(&claims, secret)
}

fn encode_claims(claims: &Claims, secret: &str) -> Result<String> {
    let token = encode(
        &Header::new(Algorithm::HS256),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok(token)
}

/// verify signature and expiry of an access token
pub fn verify_jwt(token: &str, secret: &str) -> Result<Claims> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;

    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )?;

    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_string_is_alphanumeric() {
        let nonce = generate_random_string(64);
        assert_eq!(nonce.len(), 64);
        assert!(nonce.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(nonce, generate_random_string(64));
    }

    #[test]
    fn test_password_hash_roundtrip() {
        let hash = hash_password("Passw0rd1").unwrap();
        assert!(hash.starts_with("pbkdf2_sha256$100000$"));

        assert!(verify_password("Passw0rd1", &hash).unwrap());
        assert!(!verify_password("passw0rd1", &hash).unwrap());
    }

    #[test]
    fn test_same_password_different_salts() {
        let a = hash_password("Passw0rd1").unwrap();
        let b = hash_password("Passw0rd1").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_malformed_hash_is_error() {
        assert!(verify_password("x", "not-a-hash").is_err());
        assert!(verify_password("x", "md5$1$00$00").is_err());
    }

    #[test]
    fn test_jwt_roundtrip() {
        let token = create_jwt("user-1", UserRole::Artist, "secret", 3600).unwrap();
        let claims = verify_jwt(&token, "secret").unwrap();
        assert_eq!(claims.sub, "user-1");
        assert_eq!(claims.role, UserRole::Artist);
    }

    #[test]
    fn test_jwt_wrong_secret() {
        let token = create_jwt("user-1", UserRole::Admin, "secret", 3600).unwrap();
        assert!(verify_jwt(&token, "other").is_err());
    }

    #[test]
    fn test_jwt_expired() {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs() as usize;
        let claims = Claims {
            sub: "user-1".to_string(),
            role: UserRole::Artist,
            // well past the default validation leeway
            exp: now - 3600,
            iat: now - 7200,
        };
        let token = encode_claims(&claims, "secret").unwrap();
        assert!(verify_jwt(&token, "secret").is_err());
    }
}

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

use crate::auth::models::{Claims, Role};
use crate::error::AppError;

/// Signs and verifies HS256 bearer tokens with a shared secret.
#[derive(Clone)]
pub struct JwtVerifier {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl JwtVerifier {
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Verify the signature and expiry of `token` and return its claims.
    pub fn verify(&self, token: &str) -> Result<Claims, AppError> {
        decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| AppError::Forbidden(format!("Invalid token: {e}")))
    }

    /// Issue a token for `user_id` with the given role, valid for `ttl`.
    pub fn issue(&self, user_id: &str, role: Role, ttl: Duration) -> Result<String, AppError> {
        let claims = Claims {
            id: user_id.to_string(),
            role,
            exp: (Utc::now() + ttl).timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| AppError::Internal(format!("Failed to sign token: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_then_verify() {
        let jwt = JwtVerifier::new("test-secret");
        let token = jwt
            .issue("64b7f0c2a1b2c3d4e5f60718", Role::Admin, Duration::hours(1))
            .unwrap();

        // JWT has 3 parts separated by dots
        assert_eq!(token.split('.').count(), 3);

        let claims = jwt.verify(&token).unwrap();
        assert_eq!(claims.id, "64b7f0c2a1b2c3d4e5f60718");
        assert_eq!(claims.role, Role::Admin);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = JwtVerifier::new("one")
            .issue("u1", Role::Admin, Duration::hours(1))
            .unwrap();
        let result = JwtVerifier::new("two").verify(&token);
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[test]
    fn test_expired_rejected() {
        let jwt = JwtVerifier::new("test-secret");
        let token = jwt.issue("u1", Role::Admin, Duration::hours(-1)).unwrap();
        assert!(matches!(jwt.verify(&token), Err(AppError::Forbidden(_))));
    }

    #[test]
    fn test_garbage_rejected() {
        let jwt = JwtVerifier::new("test-secret");
        assert!(jwt.verify("not-a-jwt").is_err());
    }

    #[test]
    fn test_foreign_token_with_string_role() {
        // Tokens minted by the Node front end carry `userId` and a raw role string.
        let secret = "test-secret";
        let payload = serde_json::json!({
            "userId": "64b7f0c2a1b2c3d4e5f60718",
            "role": "super-admin",
            "exp": (Utc::now() + Duration::minutes(5)).timestamp(),
        });
        let token = encode(
            &Header::default(),
            &payload,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap();

        let claims = JwtVerifier::new(secret).verify(&token).unwrap();
        assert_eq!(claims.role, Role::SuperAdmin);
        assert!(claims.role.is_admin());
    }
}

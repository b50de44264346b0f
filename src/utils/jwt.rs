use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};

use crate::config::jwt::JwtConfig;
use formline_core::AppError;
use formline_models::auth::Claims;
use formline_models::roles::Principal;

pub fn create_access_token(
    principal: &Principal,
    jwt_config: &JwtConfig,
) -> Result<String, AppError> {
    let now = Utc::now().timestamp() as usize;
    let exp = now + jwt_config.access_token_expiry as usize;

    let (region_id, sector_id, school_id) = principal.role.scope_parts();
    let claims = Claims {
        sub: principal.id.to_string(),
        email: principal.email.clone(),
        role: principal.role.tag().to_string(),
        region_id,
        sector_id,
        school_id,
        exp,
        iat: now,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(jwt_config.secret.as_bytes()),
    )
    .map_err(|e| AppError::internal(anyhow::anyhow!("Failed to create token: {e}")))
}

pub fn verify_token(token: &str, jwt_config: &JwtConfig) -> Result<Claims, AppError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(jwt_config.secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| AppError::unauthorized(anyhow::anyhow!("Invalid or expired token")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use formline_models::ids::{SchoolId, UserId};
    use formline_models::roles::Role;

    fn config() -> JwtConfig {
        JwtConfig {
            secret: "test-secret".to_string(),
            access_token_expiry: 3600,
        }
    }

    #[test]
    fn test_round_trip_preserves_scope() {
        let school_id = SchoolId::new();
        let principal = Principal {
            id: UserId::new(),
            email: "head@school.test".to_string(),
            role: Role::SchoolAdmin(school_id),
        };

        let token = create_access_token(&principal, &config()).unwrap();
        let claims = verify_token(&token, &config()).unwrap();

        assert_eq!(claims.sub, principal.id.to_string());
        assert_eq!(claims.role, "schooladmin");
        assert_eq!(claims.school_id, Some(school_id));
        assert_eq!(claims.region_id, None);
        assert_eq!(claims.sector_id, None);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let principal = Principal {
            id: UserId::new(),
            email: "root@formline.test".to_string(),
            role: Role::SuperAdmin,
        };
        let token = create_access_token(&principal, &config()).unwrap();

        let other = JwtConfig {
            secret: "different-secret".to_string(),
            access_token_expiry: 3600,
        };
        assert!(verify_token(&token, &other).is_err());
    }

    #[test]
    fn test_garbage_token_rejected() {
        assert!(verify_token("not.a.token", &config()).is_err());
    }
}

use super::model::{AuthenticatedUser, CustomClaims};
use crate::core::error::AppError;
use jsonwebtoken::{decode, decode_header, Algorithm, Validation};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

use super::jwks::JwksClient;

/// Namespace of the custom claim that carries roles
const CLAIMS_NAMESPACE: &str = "https://civichub.app/claims";

pub struct JwtValidator {
    jwks_client: Arc<JwksClient>,
    issuer: String,
    audience: String,
    leeway: u64,
}

#[derive(Debug, Clone, Deserialize)]
struct Claims {
    // iss, aud, exp and nbf are checked by jsonwebtoken
    sub: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(flatten)]
    extra: serde_json::Map<String, serde_json::Value>,
}

impl Claims {
    fn custom_claims(&self) -> Result<CustomClaims, AppError> {
        match self.extra.get(CLAIMS_NAMESPACE) {
            None => Ok(CustomClaims::default()),
            Some(value) => serde_json::from_value(value.clone())
                .map_err(|e| AppError::Auth(format!("Malformed role claim: {}", e))),
        }
    }
}

impl JwtValidator {
    pub fn new(
        jwks_client: Arc<JwksClient>,
        issuer: String,
        audience: String,
        leeway: Duration,
    ) -> Self {
        Self {
            jwks_client,
            issuer,
            audience,
            leeway: leeway.as_secs(),
        }
    }

    pub async fn validate_token(&self, token: &str) -> Result<AuthenticatedUser, AppError> {
        let header = decode_header(token).map_err(|e| AppError::Auth(e.to_string()))?;

        if header.alg != Algorithm::RS256 {
            return Err(AppError::Auth(format!(
                "Unsupported algorithm: {:?}. Only RS256 is allowed",
                header.alg
            )));
        }

        let kid = header
            .kid
            .ok_or_else(|| AppError::Auth("Missing kid in token header".to_string()))?;

        let decoding_key = self
            .jwks_client
            .get_key(&kid)
            .await
            .map_err(|e| AppError::Auth(e.to_string()))?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_issuer(&[&self.issuer]);
        validation.set_audience(&[&self.audience]);
        validation.leeway = self.leeway;
        validation.validate_nbf = true;

        let claims = decode::<Claims>(token, &decoding_key, &validation)
            .map_err(|e| AppError::Auth(e.to_string()))?
            .claims;

        let roles = claims.custom_claims()?.roles;

        Ok(AuthenticatedUser {
            sub: claims.sub,
            name: claims.name,
            email: claims.email,
            roles,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_roles_read_from_namespaced_claim() {
        let claims: Claims = serde_json::from_value(json!({
            "sub": "user-1",
            "email": "asha@example.org",
            "https://civichub.app/claims": { "roles": ["ngo"] }
        }))
        .unwrap();

        assert_eq!(claims.custom_claims().unwrap().roles, vec!["ngo"]);
        assert_eq!(claims.email.as_deref(), Some("asha@example.org"));
    }

    #[test]
    fn test_missing_claim_means_no_roles() {
        let claims: Claims = serde_json::from_value(json!({ "sub": "user-1" })).unwrap();
        assert!(claims.custom_claims().unwrap().roles.is_empty());
    }

    #[test]
    fn test_malformed_claim_is_rejected() {
        let claims: Claims = serde_json::from_value(json!({
            "sub": "user-1",
            "https://civichub.app/claims": { "roles": "ngo" }
        }))
        .unwrap();
        assert!(matches!(claims.custom_claims(), Err(AppError::Auth(_))));
    }
}

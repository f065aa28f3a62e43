use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::shared::constants::{ROLE_ADMIN, ROLE_CITIZEN, ROLE_NGO, ROLE_VOLUNTEER};

/// Caller identity taken from a validated access token
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthenticatedUser {
    /// Identity-provider subject; also the primary key of `users`
    pub sub: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub roles: Vec<String>,
}

impl AuthenticatedUser {
    /// Check if user has a specific role
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    pub fn is_admin(&self) -> bool {
        self.has_role(ROLE_ADMIN)
    }

    pub fn is_ngo(&self) -> bool {
        self.has_role(ROLE_NGO)
    }

    /// NGO-level access (ngo or admin)
    pub fn has_ngo_access(&self) -> bool {
        self.is_ngo() || self.is_admin()
    }

    /// Role stored on the user's profile: the highest role in the token,
    /// citizen when none is recognised
    pub fn primary_role(&self) -> &'static str {
        [ROLE_ADMIN, ROLE_NGO, ROLE_VOLUNTEER]
            .into_iter()
            .find(|role| self.has_role(role))
            .unwrap_or(ROLE_CITIZEN)
    }
}

/// Namespaced custom claim carrying the caller's roles
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CustomClaims {
    #[serde(default)]
    pub roles: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::create_user;

    #[test]
    fn test_primary_role_prefers_highest() {
        let mut user = create_user("u1", ROLE_VOLUNTEER);
        assert_eq!(user.primary_role(), ROLE_VOLUNTEER);

        user.roles.push(ROLE_NGO.to_string());
        assert_eq!(user.primary_role(), ROLE_NGO);

        user.roles = vec!["moderator".to_string()];
        assert_eq!(user.primary_role(), ROLE_CITIZEN);
    }

    #[test]
    fn test_admin_has_ngo_access() {
        assert!(create_user("a", ROLE_ADMIN).has_ngo_access());
        assert!(create_user("n", ROLE_NGO).has_ngo_access());
        assert!(!create_user("c", ROLE_CITIZEN).has_ngo_access());
    }
}

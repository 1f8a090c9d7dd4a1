use crate::error::AppError;
use models::{CatalogError, principal::Principal};
use serde::Deserialize;

/// Roles granted by the Keycloak realm
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RealmAccess {
    #[serde(default)]
    pub roles: Vec<String>,
}

/// JWT claims issued by Keycloak
#[derive(Debug, Clone, Deserialize)]
pub struct KeycloakClaims {
    pub sub: Option<String>,
    pub preferred_username: Option<String>,
    #[serde(default)]
    pub realm_access: RealmAccess,
}

impl KeycloakClaims {
    pub fn principal(&self) -> Principal {
        let name = self
            .preferred_username
            .as_ref()
            .or(self.sub.as_ref())
            .cloned()
            .unwrap_or_default();

        Principal::new(name, self.realm_access.roles.iter().cloned())
    }
}

/// Principal of a user allowed to edit modules (`orga` or `sekretariat`)
pub fn require_submitter(claims: &KeycloakClaims) -> Result<Principal, AppError> {
    let principal = claims.principal();
    if principal.can_submit() {
        Ok(principal)
    } else {
        Err(CatalogError::Forbidden(format!("{} may not edit modules", principal.name)).into())
    }
}

/// Principal of a secretariat user
pub fn require_secretariat(claims: &KeycloakClaims) -> Result<Principal, AppError> {
    let principal = claims.principal();
    if principal.is_secretariat() {
        Ok(principal)
    } else {
        Err(CatalogError::Forbidden(format!(
            "{} is not a member of the secretariat",
            principal.name
        ))
        .into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn claims(value: serde_json::Value) -> KeycloakClaims {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_principal_from_keycloak_token() {
        let claims = claims(json!({
            "sub": "3f1c",
            "preferred_username": "mueller",
            "realm_access": { "roles": ["sekretariat", "offline_access"] }
        }));

        let principal = claims.principal();
        assert_eq!(principal.name, "mueller");
        assert!(principal.is_secretariat());
        assert!(require_secretariat(&claims).is_ok());
    }

    #[test]
    fn test_missing_realm_access_means_no_roles() {
        let claims = claims(json!({ "sub": "3f1c" }));

        assert_eq!(claims.principal().name, "3f1c");
        assert!(claims.principal().roles.is_empty());
        assert!(require_submitter(&claims).is_err());
    }

    #[test]
    fn test_orga_may_submit_but_not_review() {
        let claims = claims(json!({
            "preferred_username": "schmidt",
            "realm_access": { "roles": ["orga"] }
        }));

        assert!(require_submitter(&claims).is_ok());
        assert!(matches!(
            require_secretariat(&claims),
            Err(AppError::Catalog(CatalogError::Forbidden(_)))
        ));
    }
}

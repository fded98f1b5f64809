//! Middleware de autenticación JWT
//!
//! Este módulo extrae el token Bearer, lo valida y expone el usuario
//! autenticado a los handlers como extractor.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use uuid::Uuid;

use crate::{
    models::user::{Identity, Role},
    state::AppState,
    utils::{
        errors::AppError,
        jwt::{extract_token_from_header, verify_token, JwtConfig},
    },
};

/// Usuario autenticado que se inyecta en las requests
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
    pub groups: Vec<String>,
    pub is_superuser: bool,
}

impl AuthenticatedUser {
    pub fn new(user_id: Uuid, groups: &[&str], is_superuser: bool) -> Self {
        Self {
            user_id,
            groups: groups.iter().map(|g| g.to_string()).collect(),
            is_superuser,
        }
    }

    fn in_group(&self, role: Role) -> bool {
        self.groups.iter().any(|g| g == role.group_name())
    }
}

impl Identity for AuthenticatedUser {
    fn user_id(&self) -> Uuid {
        self.user_id
    }

    fn has_role(&self, role: Role) -> bool {
        match role {
            Role::Admin => self.is_superuser || self.in_group(Role::Admin),
            Role::Owner => self.in_group(Role::Owner),
            Role::Customer => true,
        }
    }
}

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::Unauthorized("Token de autorización requerido".to_string()))?;

        let token = extract_token_from_header(auth_header)?;
        let claims = verify_token(token, &JwtConfig::from(&state.config))?;

        let user_id = Uuid::parse_str(&claims.sub)
            .map_err(|_| AppError::Unauthorized("ID de usuario inválido".to_string()))?;

        Ok(AuthenticatedUser {
            user_id,
            groups: claims.groups,
            is_superuser: claims.is_superuser,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_queries() {
        let owner = AuthenticatedUser::new(Uuid::new_v4(), &["owner"], false);
        let staff = AuthenticatedUser::new(Uuid::new_v4(), &["admin"], false);
        let root = AuthenticatedUser::new(Uuid::new_v4(), &[], true);
        let customer = AuthenticatedUser::new(Uuid::new_v4(), &["customer"], false);

        assert!(owner.is_owner());
        assert!(!owner.is_admin());
        assert!(staff.is_admin());
        assert!(root.is_admin());
        assert!(!root.is_owner());
        assert!(customer.has_role(Role::Customer));
        assert!(!customer.is_owner());
    }
}

//! Modelo de User
//!
//! La identidad y los roles viven en el sistema de autenticación externo;
//! aquí sólo se modela la consulta de capacidades y el perfil del usuario.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Roles reconocidos por el núcleo
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Customer,
    Owner,
    Admin,
}

impl Role {
    /// Nombre del grupo en el proveedor de identidad
    pub fn group_name(&self) -> &'static str {
        match self {
            Role::Customer => "customer",
            Role::Owner => "owner",
            Role::Admin => "admin",
        }
    }
}

/// Identidad estable de quien hace la petición
pub trait Identity: Send + Sync {
    fn user_id(&self) -> Uuid;

    fn has_role(&self, role: Role) -> bool;

    fn is_admin(&self) -> bool {
        self.has_role(Role::Admin)
    }

    fn is_owner(&self) -> bool {
        self.has_role(Role::Owner)
    }
}

/// Perfil del usuario - mapea a la tabla user_profiles
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct UserProfile {
    pub user_id: Uuid,
    pub phone: String,
    pub address: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

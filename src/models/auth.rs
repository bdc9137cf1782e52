//! Modelos de autenticación
//!
//! Claims del token emitido por el identity provider (realm Keycloak) y la
//! identidad verificada que se inyecta en las requests. Los roles llegan en
//! el claim anidado `realm_access.roles` y se normalizan con el prefijo
//! `ROLE_` antes de evaluar la política de autorización.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// Prefijo aplicado a cada rol externo antes del chequeo de política
pub const ROLE_PREFIX: &str = "ROLE_";

/// Claim anidado con los roles de realm
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RealmAccess {
    #[serde(default)]
    pub roles: Vec<String>,
}

/// Claims del JWT emitido por el identity provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityClaims {
    pub sub: String,
    #[serde(default)]
    pub preferred_username: Option<String>,
    #[serde(default)]
    pub realm_access: Option<RealmAccess>,
    pub exp: i64,
    #[serde(default)]
    pub iat: Option<i64>,
}

/// Usuario autenticado que se inyecta en las requests
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub subject: String,
    pub username: Option<String>,
    pub roles: HashSet<String>,
}

impl AuthenticatedUser {
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.contains(role)
    }
}

/// Normalizar un nombre de rol externo al vocabulario de la política
pub fn normalize_role(raw: &str) -> String {
    format!("{}{}", ROLE_PREFIX, raw)
}

/// Extraer y normalizar los roles de realm de los claims.
///
/// Un claim ausente produce un set vacío, no un error: el caller queda
/// autenticado sin roles especiales.
pub fn extract_realm_roles(claims: &IdentityClaims) -> HashSet<String> {
    claims
        .realm_access
        .as_ref()
        .map(|access| access.roles.iter().map(|r| normalize_role(r)).collect())
        .unwrap_or_default()
}

impl From<&IdentityClaims> for AuthenticatedUser {
    fn from(claims: &IdentityClaims) -> Self {
        Self {
            subject: claims.sub.clone(),
            username: claims.preferred_username.clone(),
            roles: extract_realm_roles(claims),
        }
    }
}

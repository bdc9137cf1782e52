//! Servicio de autorización
//!
//! Decide si el conjunto de roles de un caller permite una acción,
//! independiente del estado de negocio. La tabla de reglas replica el
//! contrato del resource server:
//!
//! 1. Documentación y health checks: acceso libre, sin chequeo de roles.
//! 2. DELETE/POST/PUT sobre rutas de recursos protegidas: solo fleet-admin.
//! 3. GET sobre rutas protegidas: cualquier caller autenticado.
//! 4. Cualquier otra request: cualquier caller autenticado.

use std::collections::HashSet;

use axum::http::Method;

/// Rol requerido para operaciones de escritura, ya normalizado
pub const FLEET_ADMIN_ROLE: &str = "ROLE_fleet-admin";

/// Rutas accesibles sin autenticación (documentación y health)
pub fn is_public_path(path: &str) -> bool {
    path == "/health"
        || path.starts_with("/api-docs")
        || path.starts_with("/swagger-ui")
}

/// Las rutas de recursos protegidas viven bajo /api/
pub fn is_protected_resource(path: &str) -> bool {
    path == "/api" || path.starts_with("/api/")
}

/// Política de acceso para un caller ya autenticado.
///
/// La autenticación ocurrió antes: acá solo se decide si el método sobre
/// una ruta protegida exige el rol de administrador de flota.
pub fn is_allowed(roles: &HashSet<String>, method: &Method, is_protected_route: bool) -> bool {
    if !is_protected_route {
        return true;
    }

    let is_write = *method == Method::DELETE || *method == Method::POST || *method == Method::PUT;
    if is_write {
        roles.contains(FLEET_ADMIN_ROLE)
    } else {
        true
    }
}

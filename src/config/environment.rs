//! Configuración de variables de entorno
//!
//! Este módulo maneja la configuración del entorno y variables de
//! configuración. Todas las variables tienen defaults de desarrollo;
//! en producción se configuran vía entorno.

use std::env;

/// Configuración del entorno
#[derive(Debug, Clone)]
pub struct EnvironmentConfig {
    pub environment: String,
    pub port: u16,
    pub host: String,
    /// Issuer OIDC del realm (ej: https://sso.example.com/realms/fleet)
    pub oidc_issuer: Option<String>,
    /// Deshabilitar autenticación por completo (solo desarrollo)
    pub auth_disabled: bool,
    /// Sin DATABASE_URL el backend usa el store en memoria
    pub database_url: Option<String>,
    /// Sembrar la flota de ejemplo al arranque
    pub seed_data: bool,
    pub cors_origins: Vec<String>,
}

impl EnvironmentConfig {
    pub fn from_env() -> Self {
        Self {
            environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
            port: env::var("PORT")
                .ok()
                .and_then(|value| value.parse().ok())
                .unwrap_or(8080),
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            oidc_issuer: env::var("OIDC_ISSUER").ok(),
            auth_disabled: flag_from_env("AUTH_DISABLED"),
            database_url: env::var("DATABASE_URL").ok(),
            seed_data: flag_from_env("SEED_DATA"),
            cors_origins: env::var("CORS_ORIGINS")
                .map(|value| value.split(',').map(|s| s.trim().to_string()).collect())
                .unwrap_or_default(),
        }
    }

    /// Verificar si estamos en modo desarrollo
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    /// Verificar si estamos en modo producción
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Obtener la URL del servidor
    pub fn server_url(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn flag_from_env(name: &str) -> bool {
    env::var(name)
        .map(|value| matches!(value.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}

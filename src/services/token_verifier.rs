//! Verificación de tokens del identity provider
//!
//! Valida firma, expiración e issuer de los bearer tokens contra el JWKS
//! publicado por el realm OIDC. La validación de audience queda relajada a
//! propósito: el modelo de confianza de este backend acepta tokens del
//! realm sin exigir un audience propio.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use jsonwebtoken::{decode, decode_header, errors::ErrorKind, Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use tokio::sync::RwLock;
use tracing::warn;

use crate::models::auth::{AuthenticatedUser, IdentityClaims};
use crate::utils::errors::{AppError, AppResult};

/// Tiempo de vida del cache de JWKS antes de refrescar
const JWKS_CACHE_TTL: Duration = Duration::from_secs(3600);

#[derive(Debug, Clone, Deserialize)]
struct Jwks {
    keys: Vec<Jwk>,
}

#[derive(Debug, Clone, Deserialize)]
struct Jwk {
    #[serde(default)]
    kid: Option<String>,
    kty: String,
    #[serde(default)]
    n: Option<String>,
    #[serde(default)]
    e: Option<String>,
}

struct CachedJwks {
    keys: HashMap<String, Jwk>,
    fetched_at: Instant,
}

/// Verificador de bearer tokens contra el issuer OIDC configurado
pub struct TokenVerifier {
    issuer: Option<String>,
    http_client: reqwest::Client,
    jwks: RwLock<Option<CachedJwks>>,
}

impl TokenVerifier {
    pub fn new(issuer: Option<String>) -> Self {
        Self {
            issuer,
            http_client: reqwest::Client::new(),
            jwks: RwLock::new(None),
        }
    }

    /// URL del JWKS del realm (discovery estándar de Keycloak)
    fn jwks_url(issuer: &str) -> String {
        format!(
            "{}/protocol/openid-connect/certs",
            issuer.trim_end_matches('/')
        )
    }

    /// Verificar un bearer token y extraer la identidad del caller.
    ///
    /// Falla con 401 ante token expirado o inválido, y con 502 si el JWKS
    /// del identity provider no se puede obtener.
    pub async fn verify(&self, token: &str) -> AppResult<AuthenticatedUser> {
        let issuer = self.issuer.as_deref().ok_or_else(|| {
            AppError::Unauthorized("Authentication is not configured".to_string())
        })?;

        let header = decode_header(token)
            .map_err(|_| AppError::Jwt("Invalid token".to_string()))?;
        let kid = header
            .kid
            .ok_or_else(|| AppError::Jwt("Invalid token".to_string()))?;

        let key = self.decoding_key_for(issuer, &kid).await?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_issuer(&[issuer]);
        // Relajación deliberada: los tokens del realm no llevan un audience
        // dedicado para este servicio
        validation.validate_aud = false;

        let claims = decode::<IdentityClaims>(token, &key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AppError::Jwt("Token is expired".to_string()),
                _ => AppError::Jwt("Invalid token".to_string()),
            })?;

        Ok(AuthenticatedUser::from(&claims))
    }

    /// Obtener la clave de firma para un `kid`, refrescando el JWKS si el
    /// cache expiró o no conoce esa clave.
    async fn decoding_key_for(&self, issuer: &str, kid: &str) -> AppResult<DecodingKey> {
        {
            let cache = self.jwks.read().await;
            if let Some(cached) = cache.as_ref() {
                if cached.fetched_at.elapsed() < JWKS_CACHE_TTL {
                    if let Some(jwk) = cached.keys.get(kid) {
                        return decoding_key_from_jwk(jwk);
                    }
                }
            }
        }

        let refreshed = self.fetch_jwks(issuer).await?;
        let mut cache = self.jwks.write().await;
        *cache = Some(refreshed);

        match cache.as_ref().and_then(|c| c.keys.get(kid)) {
            Some(jwk) => decoding_key_from_jwk(jwk),
            None => {
                warn!("🔑 JWKS no contiene la clave '{}'", kid);
                Err(AppError::Jwt("Invalid token".to_string()))
            }
        }
    }

    async fn fetch_jwks(&self, issuer: &str) -> AppResult<CachedJwks> {
        let url = Self::jwks_url(issuer);
        let response = self
            .http_client
            .get(&url)
            .timeout(Duration::from_secs(5))
            .send()
            .await
            .map_err(|e| AppError::ExternalApi(format!("Failed to fetch JWKS: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::ExternalApi(format!(
                "JWKS endpoint returned {}",
                response.status()
            )));
        }

        let jwks: Jwks = response
            .json()
            .await
            .map_err(|e| AppError::ExternalApi(format!("Invalid JWKS payload: {}", e)))?;

        let keys = jwks
            .keys
            .into_iter()
            .filter(|k| k.kty == "RSA")
            .filter_map(|k| k.kid.clone().map(|kid| (kid, k)))
            .collect();

        Ok(CachedJwks {
            keys,
            fetched_at: Instant::now(),
        })
    }
}

fn decoding_key_from_jwk(jwk: &Jwk) -> AppResult<DecodingKey> {
    let (n, e) = match (&jwk.n, &jwk.e) {
        (Some(n), Some(e)) => (n, e),
        _ => return Err(AppError::Jwt("Invalid token".to_string())),
    };

    DecodingKey::from_rsa_components(n, e)
        .map_err(|e| AppError::Internal(format!("Invalid JWKS key material: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_verify_without_issuer_is_unauthorized() {
        let verifier = TokenVerifier::new(None);
        let result = verifier.verify("any-token").await;
        assert!(matches!(result, Err(AppError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn test_verify_rejects_malformed_token() {
        let verifier = TokenVerifier::new(Some("https://sso.example.com/realms/fleet".to_string()));
        let result = verifier.verify("not-a-jwt").await;
        assert!(matches!(result, Err(AppError::Jwt(_))));
    }

    #[test]
    fn test_jwks_url_discovery() {
        assert_eq!(
            TokenVerifier::jwks_url("https://sso.example.com/realms/fleet/"),
            "https://sso.example.com/realms/fleet/protocol/openid-connect/certs"
        );
    }
}

mod config;
mod controllers;
mod dto;
mod middleware;
mod models;
mod repositories;
mod routes;
mod services;
mod state;
mod utils;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::{response::Json, routing::get, Router};
use dotenvy::dotenv;
use serde_json::json;
use tokio::signal;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use config::environment::EnvironmentConfig;
use middleware::cors::cors_middleware;
use repositories::{MemoryVehicleStore, PgVehicleStore, VehicleStore};
use services::seed_service::seed_initial_fleet;
use services::token_verifier::TokenVerifier;
use state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Cargar variables de entorno
    dotenv().ok();

    // Configurar logging
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    info!("🚚 FleetOps Backend - Vehicle Lifecycle API");
    info!("===========================================");

    let env_config = EnvironmentConfig::from_env();

    // Seleccionar backend de persistencia
    let store: Arc<dyn VehicleStore> = match env_config.database_url.as_deref() {
        Some(url) => {
            let pool = match config::database::create_pool(url).await {
                Ok(pool) => pool,
                Err(e) => {
                    error!("❌ Error conectando a la base de datos: {}", e);
                    return Err(anyhow::anyhow!("Error de base de datos: {}", e));
                }
            };
            config::database::run_migrations(&pool).await?;
            info!("✅ PostgreSQL conectado");
            Arc::new(PgVehicleStore::new(pool))
        }
        None => {
            warn!("⚠️ DATABASE_URL no configurada, usando store en memoria");
            Arc::new(MemoryVehicleStore::new())
        }
    };

    // Seed idempotente de la flota de ejemplo
    if env_config.seed_data {
        seed_initial_fleet(store.as_ref()).await?;
    }

    if env_config.auth_disabled {
        if env_config.is_production() {
            error!("❌ AUTH_DISABLED activo en producción");
        } else {
            warn!("⚠️ AUTH_DISABLED activo: las requests no se autentican");
        }
    } else if env_config.oidc_issuer.is_none() {
        warn!("⚠️ OIDC_ISSUER no configurado: toda request autenticada será rechazada");
    }

    let verifier = Arc::new(TokenVerifier::new(env_config.oidc_issuer.clone()));
    let app_state = AppState::new(store, env_config.clone(), verifier);

    // Crear router de la API
    let app = Router::new()
        .route("/health", get(health_check))
        .nest("/api/vehicles", routes::vehicle_routes::create_vehicle_router())
        .layer(axum::middleware::from_fn_with_state(
            app_state.clone(),
            middleware::auth::auth_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(cors_middleware())
        .with_state(app_state);

    let addr: SocketAddr = env_config.server_url().parse()?;

    info!("🌐 Servidor iniciando en http://{}", addr);
    info!("🔍 Endpoints disponibles:");
    info!("   GET    /health - Health check (público)");
    info!("🚗 Endpoints de flota (requieren bearer token):");
    info!("   POST   /api/vehicles - Crear vehículo (fleet-admin)");
    info!("   GET    /api/vehicles - Listar vehículos (?status=)");
    info!("   GET    /api/vehicles/:id - Obtener vehículo");
    info!("   PUT    /api/vehicles/:id - Actualizar vehículo (fleet-admin)");
    info!("   DELETE /api/vehicles/:id - Eliminar vehículo (fleet-admin)");
    info!("   POST   /api/vehicles/:id/assign - Asignar conductor (fleet-admin)");
    info!("   POST   /api/vehicles/:id/unassign - Desasignar conductor (fleet-admin)");
    info!("   GET    /api/vehicles/:id/history - Historial de estados");
    info!("📊 Endpoints de reporting:");
    info!("   GET    /api/vehicles/statistics - Estadísticas de flota");
    info!("   GET    /api/vehicles/available - Vehículos disponibles");
    info!("   GET    /api/vehicles/fuel-report - Reporte de combustible (?status=)");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| {
            error!("❌ Error del servidor: {}", e);
            e
        })?;

    info!("👋 Servidor terminado");
    Ok(())
}

/// Health check público
async fn health_check() -> Json<serde_json::Value> {
    Json(json!({
        "service": "fleetops-backend",
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// Señal de apagado graceful
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("🛑 Señal Ctrl+C recibida, apagando servidor...");
        },
        _ = terminate => {
            info!("🛑 Señal de terminación recibida, apagando servidor...");
        },
    }
}

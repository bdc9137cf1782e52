//! Configuración de conexión a PostgreSQL
//!
//! Este módulo maneja la conexión a la base de datos y la creación del
//! schema mínimo que necesita el backend.

use anyhow::Result;
use sqlx::PgPool;

/// Crear un pool de conexiones a la base de datos
pub async fn create_pool(database_url: &str) -> Result<PgPool> {
    let pool = PgPool::connect(database_url).await?;
    Ok(pool)
}

/// Crear las tablas si no existen.
///
/// El historial de estados no lleva foreign key hacia vehicles: las
/// entradas referencian por id y deben sobrevivir al borrado del vehículo.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS vehicles (
            id UUID PRIMARY KEY,
            make TEXT NOT NULL,
            model TEXT NOT NULL,
            year INTEGER NOT NULL,
            license_plate TEXT NOT NULL,
            color TEXT,
            fuel_type TEXT NOT NULL,
            mileage NUMERIC NOT NULL DEFAULT 0,
            fuel_level DOUBLE PRECISION NOT NULL DEFAULT 100,
            location TEXT,
            assigned_driver_id TEXT,
            status SMALLINT NOT NULL DEFAULT 0,
            last_maintenance TIMESTAMPTZ,
            next_maintenance TIMESTAMPTZ,
            created_at TIMESTAMPTZ NOT NULL,
            updated_at TIMESTAMPTZ NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS vehicle_status_history (
            seq BIGSERIAL PRIMARY KEY,
            id UUID NOT NULL UNIQUE,
            vehicle_id UUID NOT NULL,
            old_status SMALLINT NOT NULL,
            new_status SMALLINT NOT NULL,
            reason TEXT NOT NULL,
            changed_by TEXT NOT NULL,
            changed_at TIMESTAMPTZ NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_vehicle_status_history_vehicle
        ON vehicle_status_history (vehicle_id)
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

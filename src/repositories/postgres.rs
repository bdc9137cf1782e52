//! Backend de persistencia PostgreSQL
//!
//! Cada mutación escribe la fila del vehículo y su entrada de auditoría en
//! una única transacción, con guard optimista sobre `updated_at` para que
//! un escritor concurrente sobre el mismo id termine en Conflict y no en
//! una escritura perdida.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::status_history::StatusChangeRecord;
use crate::models::vehicle::{Vehicle, VehicleStatus};
use crate::repositories::vehicle_store::VehicleStore;
use crate::utils::errors::{not_found_error, AppError, AppResult};

// Fila de la tabla vehicles; el estado se persiste como código SMALLINT
#[derive(Debug, sqlx::FromRow)]
struct VehicleRow {
    id: Uuid,
    make: String,
    model: String,
    year: i32,
    license_plate: String,
    color: Option<String>,
    fuel_type: String,
    mileage: Decimal,
    fuel_level: f64,
    location: Option<String>,
    assigned_driver_id: Option<String>,
    status: i16,
    last_maintenance: Option<DateTime<Utc>>,
    next_maintenance: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<VehicleRow> for Vehicle {
    type Error = AppError;

    fn try_from(row: VehicleRow) -> Result<Self, Self::Error> {
        let status = VehicleStatus::from_code(row.status).ok_or_else(|| {
            AppError::Internal(format!(
                "Vehicle '{}' has unknown status code {}",
                row.id, row.status
            ))
        })?;

        Ok(Vehicle {
            id: row.id,
            make: row.make,
            model: row.model,
            year: row.year,
            license_plate: row.license_plate,
            color: row.color,
            fuel_type: row.fuel_type,
            mileage: row.mileage,
            fuel_level: row.fuel_level,
            location: row.location,
            assigned_driver_id: row.assigned_driver_id,
            status,
            last_maintenance: row.last_maintenance,
            next_maintenance: row.next_maintenance,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct StatusHistoryRow {
    id: Uuid,
    vehicle_id: Uuid,
    old_status: i16,
    new_status: i16,
    reason: String,
    changed_by: String,
    changed_at: DateTime<Utc>,
}

impl TryFrom<StatusHistoryRow> for StatusChangeRecord {
    type Error = AppError;

    fn try_from(row: StatusHistoryRow) -> Result<Self, Self::Error> {
        let decode = |code: i16| {
            VehicleStatus::from_code(code).ok_or_else(|| {
                AppError::Internal(format!(
                    "History entry '{}' has unknown status code {}",
                    row.id, code
                ))
            })
        };

        Ok(StatusChangeRecord {
            id: row.id,
            vehicle_id: row.vehicle_id,
            old_status: decode(row.old_status)?,
            new_status: decode(row.new_status)?,
            reason: row.reason,
            changed_by: row.changed_by,
            changed_at: row.changed_at,
        })
    }
}

/// Store de vehículos respaldado por PostgreSQL
pub struct PgVehicleStore {
    pool: PgPool,
}

impl PgVehicleStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl VehicleStore for PgVehicleStore {
    async fn insert(&self, vehicle: &Vehicle) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO vehicles (
                id, make, model, year, license_plate, color, fuel_type,
                mileage, fuel_level, location, assigned_driver_id, status,
                last_maintenance, next_maintenance, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            "#,
        )
        .bind(vehicle.id)
        .bind(&vehicle.make)
        .bind(&vehicle.model)
        .bind(vehicle.year)
        .bind(&vehicle.license_plate)
        .bind(&vehicle.color)
        .bind(&vehicle.fuel_type)
        .bind(vehicle.mileage)
        .bind(vehicle.fuel_level)
        .bind(&vehicle.location)
        .bind(&vehicle.assigned_driver_id)
        .bind(vehicle.status.code())
        .bind(vehicle.last_maintenance)
        .bind(vehicle.next_maintenance)
        .bind(vehicle.created_at)
        .bind(vehicle.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn fetch(&self, id: Uuid) -> AppResult<Option<Vehicle>> {
        let row = sqlx::query_as::<_, VehicleRow>("SELECT * FROM vehicles WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(Vehicle::try_from).transpose()
    }

    async fn list(&self, status: Option<VehicleStatus>) -> AppResult<Vec<Vehicle>> {
        let rows = match status {
            Some(status) => {
                sqlx::query_as::<_, VehicleRow>(
                    "SELECT * FROM vehicles WHERE status = $1 ORDER BY created_at",
                )
                .bind(status.code())
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, VehicleRow>("SELECT * FROM vehicles ORDER BY created_at")
                    .fetch_all(&self.pool)
                    .await?
            }
        };

        rows.into_iter().map(Vehicle::try_from).collect()
    }

    async fn save_with_transition(
        &self,
        vehicle: &Vehicle,
        expected_updated_at: DateTime<Utc>,
        record: Option<&StatusChangeRecord>,
    ) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE vehicles
            SET make = $3, model = $4, year = $5, license_plate = $6, color = $7,
                fuel_type = $8, mileage = $9, fuel_level = $10, location = $11,
                assigned_driver_id = $12, status = $13, last_maintenance = $14,
                next_maintenance = $15, updated_at = $16
            WHERE id = $1 AND updated_at = $2
            "#,
        )
        .bind(vehicle.id)
        .bind(expected_updated_at)
        .bind(&vehicle.make)
        .bind(&vehicle.model)
        .bind(vehicle.year)
        .bind(&vehicle.license_plate)
        .bind(&vehicle.color)
        .bind(&vehicle.fuel_type)
        .bind(vehicle.mileage)
        .bind(vehicle.fuel_level)
        .bind(&vehicle.location)
        .bind(&vehicle.assigned_driver_id)
        .bind(vehicle.status.code())
        .bind(vehicle.last_maintenance)
        .bind(vehicle.next_maintenance)
        .bind(vehicle.updated_at)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            let exists: (bool,) =
                sqlx::query_as("SELECT EXISTS(SELECT 1 FROM vehicles WHERE id = $1)")
                    .bind(vehicle.id)
                    .fetch_one(&mut *tx)
                    .await?;

            return Err(if exists.0 {
                log::warn!(
                    "⚠️ Escritura concurrente detectada sobre el vehículo {}",
                    vehicle.id
                );
                AppError::Conflict(format!(
                    "Vehicle '{}' was modified concurrently",
                    vehicle.id
                ))
            } else {
                not_found_error("Vehicle", &vehicle.id.to_string())
            });
        }

        if let Some(record) = record {
            sqlx::query(
                r#"
                INSERT INTO vehicle_status_history (
                    id, vehicle_id, old_status, new_status, reason, changed_by, changed_at
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                "#,
            )
            .bind(record.id)
            .bind(record.vehicle_id)
            .bind(record.old_status.code())
            .bind(record.new_status.code())
            .bind(&record.reason)
            .bind(&record.changed_by)
            .bind(record.changed_at)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn remove(&self, id: Uuid) -> AppResult<bool> {
        // Sin cascade: el historial referencia por id y se conserva
        let result = sqlx::query("DELETE FROM vehicles WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn history_for(&self, vehicle_id: Uuid) -> AppResult<Vec<StatusChangeRecord>> {
        let rows = sqlx::query_as::<_, StatusHistoryRow>(
            r#"
            SELECT id, vehicle_id, old_status, new_status, reason, changed_by, changed_at
            FROM vehicle_status_history
            WHERE vehicle_id = $1
            ORDER BY seq
            "#,
        )
        .bind(vehicle_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(StatusChangeRecord::try_from).collect()
    }

    async fn count(&self) -> AppResult<u64> {
        let result: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM vehicles")
            .fetch_one(&self.pool)
            .await?;

        Ok(result.0 as u64)
    }
}

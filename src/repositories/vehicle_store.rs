//! Seam de persistencia de vehículos
//!
//! El controller de ciclo de vida habla con el store a través de este trait.
//! Backends: Postgres (sqlx) en producción, memoria en desarrollo y tests.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::status_history::StatusChangeRecord;
use crate::models::vehicle::{Vehicle, VehicleStatus};
use crate::utils::errors::AppResult;

#[async_trait]
pub trait VehicleStore: Send + Sync {
    /// Insertar un vehículo recién creado
    async fn insert(&self, vehicle: &Vehicle) -> AppResult<()>;

    /// Buscar un vehículo por id
    async fn fetch(&self, id: Uuid) -> AppResult<Option<Vehicle>>;

    /// Listar vehículos, opcionalmente filtrados por estado
    async fn list(&self, status: Option<VehicleStatus>) -> AppResult<Vec<Vehicle>>;

    /// Persistir una mutación de vehículo junto con su entrada de auditoría
    /// opcional, de forma atómica por registro.
    ///
    /// `expected_updated_at` es el timestamp observado al leer: si el
    /// registro cambió entre la lectura y esta escritura la operación
    /// falla con Conflict en vez de pisar la escritura concurrente.
    async fn save_with_transition(
        &self,
        vehicle: &Vehicle,
        expected_updated_at: DateTime<Utc>,
        record: Option<&StatusChangeRecord>,
    ) -> AppResult<()>;

    /// Eliminar un vehículo. El historial de estados se conserva.
    /// Devuelve false si el vehículo no existía.
    async fn remove(&self, id: Uuid) -> AppResult<bool>;

    /// Historial de cambios de estado de un vehículo, en orden de inserción.
    /// Sigue respondiendo después de borrar el vehículo.
    async fn history_for(&self, vehicle_id: Uuid) -> AppResult<Vec<StatusChangeRecord>>;

    /// Cantidad total de vehículos (usado por el seed idempotente)
    async fn count(&self) -> AppResult<u64>;
}

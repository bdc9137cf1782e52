//! Backend de persistencia en memoria
//!
//! Se usa cuando no hay DATABASE_URL configurada (modo desarrollo) y en los
//! tests del ciclo de vida. Un único RwLock cubre cada mutación completa,
//! lo que da la misma atomicidad por registro que la transacción de
//! Postgres.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::status_history::StatusChangeRecord;
use crate::models::vehicle::{Vehicle, VehicleStatus};
use crate::repositories::vehicle_store::VehicleStore;
use crate::utils::errors::{not_found_error, AppError, AppResult};

#[derive(Default)]
struct MemoryInner {
    vehicles: HashMap<Uuid, Vehicle>,
    history: Vec<StatusChangeRecord>,
}

/// Store de vehículos respaldado por memoria
#[derive(Default)]
pub struct MemoryVehicleStore {
    inner: RwLock<MemoryInner>,
}

impl MemoryVehicleStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl VehicleStore for MemoryVehicleStore {
    async fn insert(&self, vehicle: &Vehicle) -> AppResult<()> {
        let mut inner = self.inner.write().await;
        if inner.vehicles.contains_key(&vehicle.id) {
            return Err(AppError::Conflict(format!(
                "Vehicle '{}' already exists",
                vehicle.id
            )));
        }
        inner.vehicles.insert(vehicle.id, vehicle.clone());
        Ok(())
    }

    async fn fetch(&self, id: Uuid) -> AppResult<Option<Vehicle>> {
        let inner = self.inner.read().await;
        Ok(inner.vehicles.get(&id).cloned())
    }

    async fn list(&self, status: Option<VehicleStatus>) -> AppResult<Vec<Vehicle>> {
        let inner = self.inner.read().await;
        let mut vehicles: Vec<Vehicle> = inner
            .vehicles
            .values()
            .filter(|v| status.map_or(true, |s| v.status == s))
            .cloned()
            .collect();
        vehicles.sort_by_key(|v| v.created_at);
        Ok(vehicles)
    }

    async fn save_with_transition(
        &self,
        vehicle: &Vehicle,
        expected_updated_at: DateTime<Utc>,
        record: Option<&StatusChangeRecord>,
    ) -> AppResult<()> {
        let mut inner = self.inner.write().await;

        let current = inner
            .vehicles
            .get(&vehicle.id)
            .ok_or_else(|| not_found_error("Vehicle", &vehicle.id.to_string()))?;

        if current.updated_at != expected_updated_at {
            return Err(AppError::Conflict(format!(
                "Vehicle '{}' was modified concurrently",
                vehicle.id
            )));
        }

        inner.vehicles.insert(vehicle.id, vehicle.clone());
        if let Some(record) = record {
            inner.history.push(record.clone());
        }
        Ok(())
    }

    async fn remove(&self, id: Uuid) -> AppResult<bool> {
        let mut inner = self.inner.write().await;
        // El historial no se toca: referencia por id, no por ownership
        Ok(inner.vehicles.remove(&id).is_some())
    }

    async fn history_for(&self, vehicle_id: Uuid) -> AppResult<Vec<StatusChangeRecord>> {
        let inner = self.inner.read().await;
        Ok(inner
            .history
            .iter()
            .filter(|r| r.vehicle_id == vehicle_id)
            .cloned()
            .collect())
    }

    async fn count(&self) -> AppResult<u64> {
        let inner = self.inner.read().await;
        Ok(inner.vehicles.len() as u64)
    }
}

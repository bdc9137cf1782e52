//! Modelo de historial de estados
//!
//! Registro de auditoría append-only: una entrada por cada transición de
//! estado observada. Las entradas referencian al vehículo por id y
//! sobreviven a su borrado.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::vehicle::VehicleStatus;

/// Entrada de auditoría de un cambio de estado
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusChangeRecord {
    pub id: Uuid,
    pub vehicle_id: Uuid,
    pub old_status: VehicleStatus,
    pub new_status: VehicleStatus,
    pub reason: String,
    pub changed_by: String,
    pub changed_at: DateTime<Utc>,
}

impl StatusChangeRecord {
    pub fn new(
        vehicle_id: Uuid,
        old_status: VehicleStatus,
        new_status: VehicleStatus,
        reason: String,
        changed_by: String,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            vehicle_id,
            old_status,
            new_status,
            reason,
            changed_by,
            changed_at: Utc::now(),
        }
    }
}

//! DTOs del dominio de vehículos
//!
//! Requests y responses de la API de flota. En los updates parciales los
//! campos borrables usan `Option<Option<T>>`: el nivel externo distingue
//! "no enviado" de "enviado como null" (limpiar el campo).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::status_history::StatusChangeRecord;
use crate::models::vehicle::Vehicle;

/// Deserializador para campos parciales borrables: un campo presente
/// (aunque sea null) llega como `Some(...)`, un campo ausente como `None`.
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

// Request para crear un vehículo
#[derive(Debug, Deserialize, Validate)]
pub struct CreateVehicleRequest {
    #[validate(length(min = 1, max = 100))]
    pub make: String,

    #[validate(length(min = 1, max = 100))]
    pub model: String,

    #[validate(range(min = 1900, max = 2100))]
    pub year: i32,

    #[validate(length(min = 1, max = 20))]
    pub license_plate: String,

    pub color: Option<String>,
    pub fuel_type: Option<String>,
    pub mileage: Option<f64>,
    pub location: Option<String>,
}

// Request para actualizar un vehículo (merge parcial)
#[derive(Debug, Default, Deserialize)]
pub struct UpdateVehicleRequest {
    pub make: Option<String>,
    pub model: Option<String>,
    pub year: Option<i32>,
    pub license_plate: Option<String>,
    pub color: Option<String>,
    pub fuel_type: Option<String>,
    pub mileage: Option<f64>,
    pub fuel_level: Option<f64>,
    pub status: Option<String>,

    #[serde(default, deserialize_with = "double_option")]
    pub location: Option<Option<String>>,

    #[serde(default, deserialize_with = "double_option")]
    pub last_maintenance: Option<Option<DateTime<Utc>>>,

    #[serde(default, deserialize_with = "double_option")]
    pub next_maintenance: Option<Option<DateTime<Utc>>>,

    // Metadatos del registro de auditoría cuando el update cambia el estado
    pub reason: Option<String>,
    pub updated_by: Option<String>,
}

// Request para asignar un conductor
#[derive(Debug, Deserialize)]
pub struct AssignDriverRequest {
    pub driver_id: String,
    pub assigned_by: Option<String>,
}

// Request para desasignar el conductor actual
#[derive(Debug, Default, Deserialize)]
pub struct UnassignDriverRequest {
    pub unassigned_by: Option<String>,
}

// Filtros de listado
#[derive(Debug, Default, Deserialize)]
pub struct VehicleFilters {
    pub status: Option<String>,
}

// Response de vehículo
#[derive(Debug, Serialize)]
pub struct VehicleResponse {
    pub id: Uuid,
    pub make: String,
    pub model: String,
    pub year: i32,
    pub license_plate: String,
    pub color: Option<String>,
    pub fuel_type: String,
    pub mileage: f64,
    pub fuel_level: f64,
    pub location: Option<String>,
    pub assigned_driver_id: Option<String>,
    pub status: String,
    pub last_maintenance: Option<DateTime<Utc>>,
    pub next_maintenance: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Vehicle> for VehicleResponse {
    fn from(vehicle: Vehicle) -> Self {
        Self {
            id: vehicle.id,
            make: vehicle.make,
            model: vehicle.model,
            year: vehicle.year,
            license_plate: vehicle.license_plate,
            color: vehicle.color,
            fuel_type: vehicle.fuel_type,
            mileage: vehicle.mileage.to_string().parse().unwrap_or(0.0),
            fuel_level: vehicle.fuel_level,
            location: vehicle.location,
            assigned_driver_id: vehicle.assigned_driver_id,
            status: vehicle.status.as_str().to_string(),
            last_maintenance: vehicle.last_maintenance,
            next_maintenance: vehicle.next_maintenance,
            created_at: vehicle.created_at,
            updated_at: vehicle.updated_at,
        }
    }
}

// Response del resultado de desasignación
#[derive(Debug, Serialize)]
pub struct UnassignDriverResponse {
    pub vehicle: VehicleResponse,
    pub previous_driver_id: Option<String>,
}

// Response de una entrada del historial de estados
#[derive(Debug, Serialize)]
pub struct StatusHistoryResponse {
    pub id: Uuid,
    pub vehicle_id: Uuid,
    pub old_status: String,
    pub new_status: String,
    pub reason: String,
    pub changed_by: String,
    pub changed_at: DateTime<Utc>,
}

impl From<StatusChangeRecord> for StatusHistoryResponse {
    fn from(record: StatusChangeRecord) -> Self {
        Self {
            id: record.id,
            vehicle_id: record.vehicle_id,
            old_status: record.old_status.as_str().to_string(),
            new_status: record.new_status.as_str().to_string(),
            reason: record.reason,
            changed_by: record.changed_by,
            changed_at: record.changed_at,
        }
    }
}

// Response de estadísticas de la flota
#[derive(Debug, Serialize)]
pub struct FleetStatisticsResponse {
    pub total_vehicles: usize,
    pub idle: usize,
    pub active: usize,
    pub maintenance: usize,
    pub offline: usize,
    pub average_fuel_level: f64,
    pub average_mileage: f64,
    pub low_fuel_count: usize,
    pub maintenance_due_soon: usize,
}

// Entrada del reporte de combustible
#[derive(Debug, Serialize)]
pub struct FuelReportEntry {
    pub id: Uuid,
    pub license_plate: String,
    pub make: String,
    pub model: String,
    pub fuel_level: f64,
    pub status: String,
}

impl From<&Vehicle> for FuelReportEntry {
    fn from(vehicle: &Vehicle) -> Self {
        Self {
            id: vehicle.id,
            license_plate: vehicle.license_plate.clone(),
            make: vehicle.make.clone(),
            model: vehicle.model.clone(),
            fuel_level: vehicle.fuel_level,
            status: vehicle.status.as_str().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::vehicle::VehicleStatus;

    #[test]
    fn test_update_request_distinguishes_absent_from_null() {
        let body = r#"{"make": "Ford", "location": null}"#;
        let request: UpdateVehicleRequest = serde_json::from_str(body).unwrap();

        assert_eq!(request.make.as_deref(), Some("Ford"));
        // location enviado como null => limpiar
        assert_eq!(request.location, Some(None));
        // next_maintenance ausente => no tocar
        assert_eq!(request.next_maintenance, None);
    }

    #[test]
    fn test_update_request_clearable_field_with_value() {
        let body = r#"{"location": "Depot Nord"}"#;
        let request: UpdateVehicleRequest = serde_json::from_str(body).unwrap();

        assert_eq!(request.location, Some(Some("Depot Nord".to_string())));
        assert!(request.make.is_none());
    }

    #[test]
    fn test_create_request_rejects_empty_plate() {
        let request = CreateVehicleRequest {
            make: "Toyota".to_string(),
            model: "Corolla".to_string(),
            year: 2020,
            license_plate: "".to_string(),
            color: None,
            fuel_type: None,
            mileage: None,
            location: None,
        };

        assert!(request.validate().is_err());
    }

    #[test]
    fn test_status_history_response_uses_labels() {
        let record = StatusChangeRecord::new(
            Uuid::new_v4(),
            VehicleStatus::Idle,
            VehicleStatus::Active,
            "Driver D1 assigned to vehicle".to_string(),
            "admin".to_string(),
        );
        let response = StatusHistoryResponse::from(record);

        assert_eq!(response.old_status, "idle");
        assert_eq!(response.new_status, "active");
    }
}

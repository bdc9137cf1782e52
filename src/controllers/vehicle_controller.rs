//! Controller del ciclo de vida de vehículos
//!
//! Único escritor del estado de vehículos y único productor de registros de
//! auditoría. Todas las invariantes de estado/asignación se garantizan acá:
//! los handlers HTTP solo traducen, el store solo persiste.
//!
//! La detección de transiciones es por comparación de valores: primero se
//! hace el merge genérico de campos y después se compara el estado pre-merge
//! contra el post-merge. Un update que repite el estado actual no genera
//! entrada de auditoría.

use std::sync::Arc;

use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::dto::vehicle_dto::{
    AssignDriverRequest, CreateVehicleRequest, FleetStatisticsResponse, FuelReportEntry,
    UnassignDriverRequest, UpdateVehicleRequest,
};
use crate::models::status_history::StatusChangeRecord;
use crate::models::vehicle::{clamp_fuel_level, Vehicle, VehicleStatus};
use crate::repositories::VehicleStore;
use crate::utils::errors::{not_found_error, validation_error, AppResult};

/// Combustible por debajo de este umbral cuenta como "low fuel" en las
/// estadísticas de flota
const LOW_FUEL_THRESHOLD: f64 = 25.0;

/// Ventana de alerta para el próximo mantenimiento
const MAINTENANCE_DUE_WINDOW_DAYS: i64 = 7;

pub struct VehicleController {
    store: Arc<dyn VehicleStore>,
}

impl VehicleController {
    pub fn new(store: Arc<dyn VehicleStore>) -> Self {
        Self { store }
    }

    /// Crear un vehículo con los defaults de alta: fuel 100, estado idle,
    /// sin conductor asignado.
    pub async fn create(&self, request: CreateVehicleRequest) -> AppResult<Vehicle> {
        request.validate()?;

        if request.make.trim().is_empty() {
            return Err(validation_error("make", "make is required"));
        }
        if request.model.trim().is_empty() {
            return Err(validation_error("model", "model is required"));
        }
        if request.license_plate.trim().is_empty() {
            return Err(validation_error("license_plate", "license plate is required"));
        }

        let mileage = Decimal::from_f64_retain(request.mileage.unwrap_or(0.0))
            .ok_or_else(|| validation_error("mileage", "invalid mileage value"))?;

        let now = Utc::now();
        let vehicle = Vehicle {
            id: Uuid::new_v4(),
            make: request.make,
            model: request.model,
            year: request.year,
            license_plate: request.license_plate,
            color: request.color,
            fuel_type: request.fuel_type.unwrap_or_else(|| "diesel".to_string()),
            mileage,
            fuel_level: 100.0,
            location: request.location,
            assigned_driver_id: None,
            status: VehicleStatus::Idle,
            last_maintenance: None,
            next_maintenance: None,
            created_at: now,
            updated_at: now,
        };

        self.store.insert(&vehicle).await?;
        info!("🚗 Vehículo creado: {} ({})", vehicle.license_plate, vehicle.id);
        Ok(vehicle)
    }

    pub async fn get(&self, id: Uuid) -> AppResult<Vehicle> {
        self.store
            .fetch(id)
            .await?
            .ok_or_else(|| not_found_error("Vehicle", &id.to_string()))
    }

    /// Listar vehículos, con filtro opcional por estado
    pub async fn list(&self, status_filter: Option<String>) -> AppResult<Vec<Vehicle>> {
        let status = match status_filter {
            Some(raw) => Some(
                VehicleStatus::parse(&raw)
                    .ok_or_else(|| validation_error("status", "unknown vehicle status"))?,
            ),
            None => None,
        };

        self.store.list(status).await
    }

    /// Update parcial: solo se tocan los campos presentes en el payload.
    ///
    /// Si el merge cambia el estado, la mutación lleva una entrada de
    /// auditoría con el estado previo, la razón del payload (default
    /// "Status updated") y el actor del payload (default "System").
    pub async fn update(&self, id: Uuid, request: UpdateVehicleRequest) -> AppResult<Vehicle> {
        let current = self.get(id).await?;
        let previous_status = current.status;

        let new_status = match &request.status {
            Some(raw) => Some(
                VehicleStatus::parse(raw)
                    .ok_or_else(|| validation_error("status", "unknown vehicle status"))?,
            ),
            None => None,
        };

        let mut updated = current.clone();
        if let Some(make) = request.make {
            updated.make = make;
        }
        if let Some(model) = request.model {
            updated.model = model;
        }
        if let Some(year) = request.year {
            updated.year = year;
        }
        if let Some(license_plate) = request.license_plate {
            updated.license_plate = license_plate;
        }
        if let Some(color) = request.color {
            updated.color = Some(color);
        }
        if let Some(fuel_type) = request.fuel_type {
            updated.fuel_type = fuel_type;
        }
        if let Some(mileage) = request.mileage {
            updated.mileage = Decimal::from_f64_retain(mileage)
                .ok_or_else(|| validation_error("mileage", "invalid mileage value"))?;
        }
        if let Some(fuel_level) = request.fuel_level {
            updated.fuel_level = clamp_fuel_level(fuel_level);
        }
        if let Some(location) = request.location {
            updated.location = location;
        }
        if let Some(last_maintenance) = request.last_maintenance {
            updated.last_maintenance = last_maintenance;
        }
        if let Some(next_maintenance) = request.next_maintenance {
            updated.next_maintenance = next_maintenance;
        }
        if let Some(status) = new_status {
            updated.status = status;
        }
        updated.updated_at = Utc::now();

        let record = (updated.status != previous_status).then(|| {
            StatusChangeRecord::new(
                id,
                previous_status,
                updated.status,
                request.reason.unwrap_or_else(|| "Status updated".to_string()),
                request.updated_by.unwrap_or_else(|| "System".to_string()),
            )
        });

        self.store
            .save_with_transition(&updated, current.updated_at, record.as_ref())
            .await?;

        Ok(updated)
    }

    /// Asignar un conductor: fuerza el estado a active sea cual sea el
    /// estado previo.
    pub async fn assign_driver(
        &self,
        id: Uuid,
        request: AssignDriverRequest,
    ) -> AppResult<Vehicle> {
        if request.driver_id.trim().is_empty() {
            return Err(validation_error("driver_id", "driver id is required"));
        }

        let current = self.get(id).await?;
        let previous_status = current.status;

        let mut updated = current.clone();
        updated.assigned_driver_id = Some(request.driver_id.clone());
        updated.status = VehicleStatus::Active;
        updated.updated_at = Utc::now();

        let record = (previous_status != VehicleStatus::Active).then(|| {
            StatusChangeRecord::new(
                id,
                previous_status,
                VehicleStatus::Active,
                format!("Driver {} assigned to vehicle", request.driver_id),
                request.assigned_by.unwrap_or_else(|| "System".to_string()),
            )
        });

        self.store
            .save_with_transition(&updated, current.updated_at, record.as_ref())
            .await?;

        info!(
            "👤 Conductor {} asignado al vehículo {}",
            request.driver_id, id
        );
        Ok(updated)
    }

    /// Desasignar el conductor actual: fuerza el estado a idle y devuelve
    /// el id del conductor previo.
    pub async fn unassign_driver(
        &self,
        id: Uuid,
        request: UnassignDriverRequest,
    ) -> AppResult<(Vehicle, Option<String>)> {
        let current = self.get(id).await?;
        let previous_status = current.status;
        let previous_driver = current.assigned_driver_id.clone();

        let mut updated = current.clone();
        updated.assigned_driver_id = None;
        updated.status = VehicleStatus::Idle;
        updated.updated_at = Utc::now();

        let reason = match &previous_driver {
            Some(driver) => format!("Driver {} unassigned from vehicle", driver),
            None => "Driver unassigned from vehicle".to_string(),
        };

        let record = (previous_status != VehicleStatus::Idle).then(|| {
            StatusChangeRecord::new(
                id,
                previous_status,
                VehicleStatus::Idle,
                reason,
                request.unassigned_by.unwrap_or_else(|| "System".to_string()),
            )
        });

        self.store
            .save_with_transition(&updated, current.updated_at, record.as_ref())
            .await?;

        Ok((updated, previous_driver))
    }

    /// Eliminar un vehículo. Su historial de auditoría se conserva.
    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        if !self.store.remove(id).await? {
            return Err(not_found_error("Vehicle", &id.to_string()));
        }
        info!("🗑️ Vehículo eliminado: {}", id);
        Ok(())
    }

    /// Estadísticas agregadas, recomputadas sobre la flota viva
    pub async fn statistics(&self) -> AppResult<FleetStatisticsResponse> {
        let vehicles = self.store.list(None).await?;
        let total = vehicles.len();

        let count_by = |status: VehicleStatus| vehicles.iter().filter(|v| v.status == status).count();

        let (average_fuel_level, average_mileage) = if total == 0 {
            (0.0, 0.0)
        } else {
            let fuel_sum: f64 = vehicles.iter().map(|v| v.fuel_level).sum();
            let mileage_sum: Decimal = vehicles.iter().map(|v| v.mileage).sum();
            let mileage_avg = mileage_sum / Decimal::from(total as u64);
            (
                fuel_sum / total as f64,
                mileage_avg.to_string().parse().unwrap_or(0.0),
            )
        };

        let due_limit = Utc::now() + Duration::days(MAINTENANCE_DUE_WINDOW_DAYS);
        let maintenance_due_soon = vehicles
            .iter()
            .filter(|v| v.next_maintenance.map_or(false, |due| due <= due_limit))
            .count();

        Ok(FleetStatisticsResponse {
            total_vehicles: total,
            idle: count_by(VehicleStatus::Idle),
            active: count_by(VehicleStatus::Active),
            maintenance: count_by(VehicleStatus::Maintenance),
            offline: count_by(VehicleStatus::Offline),
            average_fuel_level,
            average_mileage,
            low_fuel_count: vehicles
                .iter()
                .filter(|v| v.fuel_level < LOW_FUEL_THRESHOLD)
                .count(),
            maintenance_due_soon,
        })
    }

    /// Proyección de disponibilidad: sin conductor, idle y fuel >= 20
    pub async fn available_vehicles(&self) -> AppResult<Vec<Vehicle>> {
        let vehicles = self.store.list(None).await?;
        Ok(vehicles.into_iter().filter(|v| v.is_available()).collect())
    }

    /// Snapshot de combustible por vehículo, con el estado como etiqueta
    /// textual y filtro case-insensitive sobre esa etiqueta.
    pub async fn fuel_report(
        &self,
        status_filter: Option<String>,
    ) -> AppResult<Vec<FuelReportEntry>> {
        let vehicles = self.store.list(None).await?;
        Ok(vehicles
            .iter()
            .filter(|v| {
                status_filter
                    .as_ref()
                    .map_or(true, |f| v.status.as_str().eq_ignore_ascii_case(f.trim()))
            })
            .map(FuelReportEntry::from)
            .collect())
    }

    /// Historial de cambios de estado. Responde también para vehículos ya
    /// eliminados: las entradas referencian por id, no por ownership.
    pub async fn history(&self, vehicle_id: Uuid) -> AppResult<Vec<StatusChangeRecord>> {
        self.store.history_for(vehicle_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::MemoryVehicleStore;
    use crate::utils::errors::AppError;

    fn controller() -> VehicleController {
        VehicleController::new(Arc::new(MemoryVehicleStore::new()))
    }

    fn create_request(plate: &str) -> CreateVehicleRequest {
        CreateVehicleRequest {
            make: "Toyota".to_string(),
            model: "Corolla".to_string(),
            year: 2020,
            license_plate: plate.to_string(),
            color: None,
            fuel_type: None,
            mileage: None,
            location: None,
        }
    }

    #[tokio::test]
    async fn test_create_applies_defaults() {
        let controller = controller();
        let vehicle = controller.create(create_request("ABC123")).await.unwrap();

        assert_eq!(vehicle.status, VehicleStatus::Idle);
        assert_eq!(vehicle.fuel_level, 100.0);
        assert!(vehicle.assigned_driver_id.is_none());
        assert_eq!(vehicle.fuel_type, "diesel");
        assert!(vehicle.updated_at >= vehicle.created_at);
    }

    #[tokio::test]
    async fn test_create_rejects_blank_required_fields() {
        let controller = controller();

        let mut request = create_request("ABC123");
        request.make = "   ".to_string();
        assert!(matches!(
            controller.create(request).await,
            Err(AppError::Validation(_))
        ));

        let mut request = create_request("ABC123");
        request.model = "".to_string();
        assert!(matches!(
            controller.create(request).await,
            Err(AppError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_get_missing_vehicle_is_not_found() {
        let controller = controller();
        assert!(matches!(
            controller.get(Uuid::new_v4()).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_assign_then_unassign_produces_two_audit_records() {
        let controller = controller();
        let vehicle = controller.create(create_request("ABC123")).await.unwrap();

        let assigned = controller
            .assign_driver(
                vehicle.id,
                AssignDriverRequest {
                    driver_id: "D1".to_string(),
                    assigned_by: Some("dispatcher".to_string()),
                },
            )
            .await
            .unwrap();
        assert_eq!(assigned.status, VehicleStatus::Active);
        assert_eq!(assigned.assigned_driver_id.as_deref(), Some("D1"));

        let (unassigned, previous) = controller
            .unassign_driver(vehicle.id, UnassignDriverRequest::default())
            .await
            .unwrap();
        assert_eq!(unassigned.status, VehicleStatus::Idle);
        assert!(unassigned.assigned_driver_id.is_none());
        assert_eq!(previous.as_deref(), Some("D1"));

        let history = controller.history(vehicle.id).await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].old_status, VehicleStatus::Idle);
        assert_eq!(history[0].new_status, VehicleStatus::Active);
        assert!(history[0].reason.contains("D1"));
        assert_eq!(history[1].old_status, VehicleStatus::Active);
        assert_eq!(history[1].new_status, VehicleStatus::Idle);
    }

    #[tokio::test]
    async fn test_assign_requires_driver_id() {
        let controller = controller();
        let vehicle = controller.create(create_request("ABC123")).await.unwrap();

        let result = controller
            .assign_driver(
                vehicle.id,
                AssignDriverRequest {
                    driver_id: "  ".to_string(),
                    assigned_by: None,
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_assign_to_missing_vehicle_is_not_found() {
        let controller = controller();
        let result = controller
            .assign_driver(
                Uuid::new_v4(),
                AssignDriverRequest {
                    driver_id: "D1".to_string(),
                    assigned_by: None,
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_unassign_without_driver_returns_none() {
        let controller = controller();
        let vehicle = controller.create(create_request("ABC123")).await.unwrap();

        let (updated, previous) = controller
            .unassign_driver(vehicle.id, UnassignDriverRequest::default())
            .await
            .unwrap();

        assert!(previous.is_none());
        assert_eq!(updated.status, VehicleStatus::Idle);
        // idle -> idle: sin transición observada, sin auditoría
        assert!(controller.history(vehicle.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_same_status_appends_no_record() {
        let controller = controller();
        let vehicle = controller.create(create_request("ABC123")).await.unwrap();

        let updated = controller
            .update(
                vehicle.id,
                UpdateVehicleRequest {
                    status: Some("idle".to_string()),
                    color: Some("red".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.color.as_deref(), Some("red"));
        assert!(controller.history(vehicle.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_status_change_appends_one_record() {
        let controller = controller();
        let vehicle = controller.create(create_request("ABC123")).await.unwrap();

        controller
            .update(
                vehicle.id,
                UpdateVehicleRequest {
                    status: Some("maintenance".to_string()),
                    reason: Some("Scheduled service".to_string()),
                    updated_by: Some("workshop".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let history = controller.history(vehicle.id).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].old_status, VehicleStatus::Idle);
        assert_eq!(history[0].new_status, VehicleStatus::Maintenance);
        assert_eq!(history[0].reason, "Scheduled service");
        assert_eq!(history[0].changed_by, "workshop");
    }

    #[tokio::test]
    async fn test_update_status_change_uses_defaults() {
        let controller = controller();
        let vehicle = controller.create(create_request("ABC123")).await.unwrap();

        controller
            .update(
                vehicle.id,
                UpdateVehicleRequest {
                    status: Some("offline".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let history = controller.history(vehicle.id).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].reason, "Status updated");
        assert_eq!(history[0].changed_by, "System");
    }

    #[tokio::test]
    async fn test_update_rejects_unknown_status() {
        let controller = controller();
        let vehicle = controller.create(create_request("ABC123")).await.unwrap();

        let result = controller
            .update(
                vehicle.id,
                UpdateVehicleRequest {
                    status: Some("retired".to_string()),
                    ..Default::default()
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
        assert!(controller.history(vehicle.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_clamps_fuel_level() {
        let controller = controller();
        let vehicle = controller.create(create_request("ABC123")).await.unwrap();

        let updated = controller
            .update(
                vehicle.id,
                UpdateVehicleRequest {
                    fuel_level: Some(250.0),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.fuel_level, 100.0);

        let updated = controller
            .update(
                vehicle.id,
                UpdateVehicleRequest {
                    fuel_level: Some(-10.0),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.fuel_level, 0.0);
    }

    #[tokio::test]
    async fn test_update_distinguishes_clear_from_untouched() {
        let controller = controller();
        let mut request = create_request("ABC123");
        request.location = Some("Depot Nord".to_string());
        let vehicle = controller.create(request).await.unwrap();

        // Campo ausente: location queda como estaba
        let updated = controller
            .update(
                vehicle.id,
                UpdateVehicleRequest {
                    year: Some(2021),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.location.as_deref(), Some("Depot Nord"));

        // Campo enviado como null: location se limpia
        let updated = controller
            .update(
                vehicle.id,
                UpdateVehicleRequest {
                    location: Some(None),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert!(updated.location.is_none());
    }

    #[tokio::test]
    async fn test_update_refreshes_updated_at() {
        let controller = controller();
        let vehicle = controller.create(create_request("ABC123")).await.unwrap();

        let updated = controller
            .update(
                vehicle.id,
                UpdateVehicleRequest {
                    mileage: Some(500.0),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert!(updated.updated_at >= vehicle.updated_at);
        assert!(updated.updated_at >= updated.created_at);
    }

    #[tokio::test]
    async fn test_available_vehicles_projection() {
        let controller = controller();

        let available = controller.create(create_request("AV-1")).await.unwrap();

        let with_driver = controller.create(create_request("AV-2")).await.unwrap();
        controller
            .assign_driver(
                with_driver.id,
                AssignDriverRequest {
                    driver_id: "D7".to_string(),
                    assigned_by: None,
                },
            )
            .await
            .unwrap();

        let low_fuel = controller.create(create_request("AV-3")).await.unwrap();
        controller
            .update(
                low_fuel.id,
                UpdateVehicleRequest {
                    fuel_level: Some(10.0),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let in_maintenance = controller.create(create_request("AV-4")).await.unwrap();
        controller
            .update(
                in_maintenance.id,
                UpdateVehicleRequest {
                    status: Some("maintenance".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let result = controller.available_vehicles().await.unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].id, available.id);
    }

    #[tokio::test]
    async fn test_statistics_counts_sum_to_total() {
        let controller = controller();

        controller.create(create_request("ST-1")).await.unwrap();
        let b = controller.create(create_request("ST-2")).await.unwrap();
        let c = controller.create(create_request("ST-3")).await.unwrap();

        controller
            .assign_driver(
                b.id,
                AssignDriverRequest {
                    driver_id: "D1".to_string(),
                    assigned_by: None,
                },
            )
            .await
            .unwrap();
        controller
            .update(
                c.id,
                UpdateVehicleRequest {
                    status: Some("offline".to_string()),
                    fuel_level: Some(10.0),
                    next_maintenance: Some(Some(Utc::now() + Duration::days(3))),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let stats = controller.statistics().await.unwrap();
        assert_eq!(stats.total_vehicles, 3);
        assert_eq!(
            stats.idle + stats.active + stats.maintenance + stats.offline,
            stats.total_vehicles
        );
        assert_eq!(stats.idle, 1);
        assert_eq!(stats.active, 1);
        assert_eq!(stats.offline, 1);
        assert_eq!(stats.low_fuel_count, 1);
        assert_eq!(stats.maintenance_due_soon, 1);
        assert!((stats.average_fuel_level - 70.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_statistics_on_empty_fleet() {
        let controller = controller();
        let stats = controller.statistics().await.unwrap();

        assert_eq!(stats.total_vehicles, 0);
        assert_eq!(stats.average_fuel_level, 0.0);
        assert_eq!(stats.average_mileage, 0.0);
    }

    #[tokio::test]
    async fn test_fuel_report_filters_by_label() {
        let controller = controller();
        let a = controller.create(create_request("FR-1")).await.unwrap();
        let b = controller.create(create_request("FR-2")).await.unwrap();
        controller
            .assign_driver(
                b.id,
                AssignDriverRequest {
                    driver_id: "D1".to_string(),
                    assigned_by: None,
                },
            )
            .await
            .unwrap();

        let report = controller.fuel_report(None).await.unwrap();
        assert_eq!(report.len(), 2);

        let idle_only = controller
            .fuel_report(Some("IDLE".to_string()))
            .await
            .unwrap();
        assert_eq!(idle_only.len(), 1);
        assert_eq!(idle_only[0].id, a.id);
        assert_eq!(idle_only[0].status, "idle");

        let none = controller
            .fuel_report(Some("retired".to_string()))
            .await
            .unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn test_list_rejects_unknown_status_filter() {
        let controller = controller();
        let result = controller.list(Some("scrapped".to_string())).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_delete_keeps_history() {
        let controller = controller();
        let vehicle = controller.create(create_request("DL-1")).await.unwrap();
        controller
            .assign_driver(
                vehicle.id,
                AssignDriverRequest {
                    driver_id: "D9".to_string(),
                    assigned_by: None,
                },
            )
            .await
            .unwrap();

        controller.delete(vehicle.id).await.unwrap();
        assert!(matches!(
            controller.get(vehicle.id).await,
            Err(AppError::NotFound(_))
        ));

        let history = controller.history(vehicle.id).await.unwrap();
        assert_eq!(history.len(), 1);
        assert!(history[0].reason.contains("D9"));
    }

    #[tokio::test]
    async fn test_delete_missing_vehicle_is_not_found() {
        let controller = controller();
        assert!(matches!(
            controller.delete(Uuid::new_v4()).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_end_to_end_assignment_flow() {
        let controller = controller();

        let vehicle = controller.create(create_request("ABC123")).await.unwrap();
        assert_eq!(vehicle.make, "Toyota");
        assert_eq!(vehicle.model, "Corolla");
        assert_eq!(vehicle.year, 2020);
        assert_eq!(vehicle.status, VehicleStatus::Idle);
        assert_eq!(vehicle.fuel_level, 100.0);

        let assigned = controller
            .assign_driver(
                vehicle.id,
                AssignDriverRequest {
                    driver_id: "D42".to_string(),
                    assigned_by: Some("admin".to_string()),
                },
            )
            .await
            .unwrap();
        assert_eq!(assigned.status, VehicleStatus::Active);
        assert_eq!(assigned.assigned_driver_id.as_deref(), Some("D42"));

        let history = controller.history(vehicle.id).await.unwrap();
        assert_eq!(history.len(), 1);
        assert!(history[0].reason.contains("D42"));
        assert_eq!(history[0].changed_by, "admin");

        let (unassigned, previous) = controller
            .unassign_driver(
                vehicle.id,
                UnassignDriverRequest {
                    unassigned_by: Some("admin".to_string()),
                },
            )
            .await
            .unwrap();
        assert_eq!(unassigned.status, VehicleStatus::Idle);
        assert!(unassigned.assigned_driver_id.is_none());
        assert_eq!(previous.as_deref(), Some("D42"));
    }
}

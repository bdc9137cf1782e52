use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use uuid::Uuid;

use crate::controllers::vehicle_controller::VehicleController;
use crate::dto::api_dto::ApiResponse;
use crate::dto::vehicle_dto::{
    AssignDriverRequest, CreateVehicleRequest, FleetStatisticsResponse, FuelReportEntry,
    StatusHistoryResponse, UnassignDriverRequest, UnassignDriverResponse, UpdateVehicleRequest,
    VehicleFilters, VehicleResponse,
};
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_vehicle_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_vehicle).get(list_vehicles))
        .route("/statistics", get(fleet_statistics))
        .route("/available", get(available_vehicles))
        .route("/fuel-report", get(fuel_report))
        .route(
            "/:id",
            get(get_vehicle).put(update_vehicle).delete(delete_vehicle),
        )
        .route("/:id/assign", post(assign_driver))
        .route("/:id/unassign", post(unassign_driver))
        .route("/:id/history", get(vehicle_history))
}

async fn create_vehicle(
    State(state): State<AppState>,
    Json(request): Json<CreateVehicleRequest>,
) -> Result<Json<ApiResponse<VehicleResponse>>, AppError> {
    let controller = VehicleController::new(state.store.clone());
    let vehicle = controller.create(request).await?;
    Ok(Json(ApiResponse::success_with_message(
        vehicle.into(),
        "Vehículo creado exitosamente".to_string(),
    )))
}

async fn list_vehicles(
    State(state): State<AppState>,
    Query(filters): Query<VehicleFilters>,
) -> Result<Json<Vec<VehicleResponse>>, AppError> {
    let controller = VehicleController::new(state.store.clone());
    let vehicles = controller.list(filters.status).await?;
    Ok(Json(vehicles.into_iter().map(Into::into).collect()))
}

async fn get_vehicle(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<VehicleResponse>, AppError> {
    let controller = VehicleController::new(state.store.clone());
    let vehicle = controller.get(id).await?;
    Ok(Json(vehicle.into()))
}

async fn update_vehicle(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateVehicleRequest>,
) -> Result<Json<ApiResponse<VehicleResponse>>, AppError> {
    let controller = VehicleController::new(state.store.clone());
    let vehicle = controller.update(id, request).await?;
    Ok(Json(ApiResponse::success_with_message(
        vehicle.into(),
        "Vehículo actualizado exitosamente".to_string(),
    )))
}

async fn delete_vehicle(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    let controller = VehicleController::new(state.store.clone());
    controller.delete(id).await?;
    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Vehículo eliminado exitosamente"
    })))
}

async fn assign_driver(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<AssignDriverRequest>,
) -> Result<Json<ApiResponse<VehicleResponse>>, AppError> {
    let controller = VehicleController::new(state.store.clone());
    let vehicle = controller.assign_driver(id, request).await?;
    Ok(Json(ApiResponse::success_with_message(
        vehicle.into(),
        "Conductor asignado exitosamente".to_string(),
    )))
}

async fn unassign_driver(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UnassignDriverRequest>,
) -> Result<Json<ApiResponse<UnassignDriverResponse>>, AppError> {
    let controller = VehicleController::new(state.store.clone());
    let (vehicle, previous_driver_id) = controller.unassign_driver(id, request).await?;
    Ok(Json(ApiResponse::success_with_message(
        UnassignDriverResponse {
            vehicle: vehicle.into(),
            previous_driver_id,
        },
        "Conductor desasignado exitosamente".to_string(),
    )))
}

async fn fleet_statistics(
    State(state): State<AppState>,
) -> Result<Json<FleetStatisticsResponse>, AppError> {
    let controller = VehicleController::new(state.store.clone());
    Ok(Json(controller.statistics().await?))
}

async fn available_vehicles(
    State(state): State<AppState>,
) -> Result<Json<Vec<VehicleResponse>>, AppError> {
    let controller = VehicleController::new(state.store.clone());
    let vehicles = controller.available_vehicles().await?;
    Ok(Json(vehicles.into_iter().map(Into::into).collect()))
}

async fn fuel_report(
    State(state): State<AppState>,
    Query(filters): Query<VehicleFilters>,
) -> Result<Json<Vec<FuelReportEntry>>, AppError> {
    let controller = VehicleController::new(state.store.clone());
    Ok(Json(controller.fuel_report(filters.status).await?))
}

async fn vehicle_history(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<StatusHistoryResponse>>, AppError> {
    let controller = VehicleController::new(state.store.clone());
    let history = controller.history(id).await?;
    Ok(Json(history.into_iter().map(Into::into).collect()))
}

//! Seed inicial de la flota
//!
//! Rutina de inicialización idempotente: si el store ya tiene vehículos no
//! hace nada. Se ejecuta una sola vez al arranque cuando SEED_DATA está
//! activo, nunca como estado global accesible desde el resto del sistema.

use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use tracing::info;
use uuid::Uuid;

use crate::models::vehicle::{Vehicle, VehicleStatus};
use crate::repositories::VehicleStore;
use crate::utils::errors::AppResult;

/// Sembrar la flota de ejemplo si el store está vacío
pub async fn seed_initial_fleet(store: &dyn VehicleStore) -> AppResult<()> {
    if store.count().await? > 0 {
        info!("🌱 Seed omitido: la flota ya tiene vehículos");
        return Ok(());
    }

    let fleet = sample_fleet();
    for vehicle in &fleet {
        store.insert(vehicle).await?;
    }

    info!("🌱 Flota inicial sembrada: {} vehículos", fleet.len());
    Ok(())
}

fn sample_fleet() -> Vec<Vehicle> {
    let now = Utc::now();

    let base = |make: &str, model: &str, year: i32, plate: &str, mileage: i64| Vehicle {
        id: Uuid::new_v4(),
        make: make.to_string(),
        model: model.to_string(),
        year,
        license_plate: plate.to_string(),
        color: Some("white".to_string()),
        fuel_type: "diesel".to_string(),
        mileage: Decimal::new(mileage, 0),
        fuel_level: 100.0,
        location: Some("Central depot".to_string()),
        assigned_driver_id: None,
        status: VehicleStatus::Idle,
        last_maintenance: None,
        next_maintenance: None,
        created_at: now,
        updated_at: now,
    };

    let mut transit = base("Ford", "Transit", 2022, "FL-101-AB", 48_500);
    transit.fuel_level = 65.0;

    let mut sprinter = base("Mercedes-Benz", "Sprinter", 2021, "FL-102-CD", 88_200);
    sprinter.status = VehicleStatus::Maintenance;
    sprinter.last_maintenance = Some(now - Duration::days(90));
    sprinter.next_maintenance = Some(now + Duration::days(5));

    let mut corolla = base("Toyota", "Corolla", 2020, "FL-103-EF", 31_000);
    corolla.fuel_level = 18.0;

    vec![
        base("Renault", "Kangoo", 2023, "FL-100-ZZ", 12_300),
        transit,
        sprinter,
        corolla,
    ]
}

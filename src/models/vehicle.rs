//! Modelo de Vehicle
//!
//! Este módulo contiene el struct Vehicle, el enum de estado con su
//! mapeo numérico fijo y las conversiones entre códigos y etiquetas.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Estado del vehículo
///
/// Mapeo numérico fijo: 0=idle, 1=active, 2=maintenance, 3=offline.
/// Cualquier otro código se renderiza como "unknown".
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum VehicleStatus {
    Idle,
    Active,
    Maintenance,
    Offline,
}

impl VehicleStatus {
    /// Etiqueta textual del estado
    pub fn as_str(&self) -> &'static str {
        match self {
            VehicleStatus::Idle => "idle",
            VehicleStatus::Active => "active",
            VehicleStatus::Maintenance => "maintenance",
            VehicleStatus::Offline => "offline",
        }
    }

    /// Código numérico persistido en la base de datos
    pub fn code(&self) -> i16 {
        match self {
            VehicleStatus::Idle => 0,
            VehicleStatus::Active => 1,
            VehicleStatus::Maintenance => 2,
            VehicleStatus::Offline => 3,
        }
    }

    /// Estado a partir del código persistido
    pub fn from_code(code: i16) -> Option<Self> {
        match code {
            0 => Some(VehicleStatus::Idle),
            1 => Some(VehicleStatus::Active),
            2 => Some(VehicleStatus::Maintenance),
            3 => Some(VehicleStatus::Offline),
            _ => None,
        }
    }

    /// Etiqueta para un código arbitrario, con fallback "unknown"
    pub fn label_for_code(code: i16) -> &'static str {
        match Self::from_code(code) {
            Some(status) => status.as_str(),
            None => "unknown",
        }
    }

    /// Parsear una etiqueta textual (case-insensitive)
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "idle" => Some(VehicleStatus::Idle),
            "active" => Some(VehicleStatus::Active),
            "maintenance" => Some(VehicleStatus::Maintenance),
            "offline" => Some(VehicleStatus::Offline),
            _ => None,
        }
    }
}

/// Nivel mínimo de combustible para que un vehículo cuente como disponible
pub const AVAILABLE_FUEL_THRESHOLD: f64 = 20.0;

/// Vehicle principal - registro persistido de un vehículo de la flota
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vehicle {
    pub id: Uuid,
    pub make: String,
    pub model: String,
    pub year: i32,
    pub license_plate: String,
    pub color: Option<String>,
    pub fuel_type: String,
    pub mileage: Decimal,
    pub fuel_level: f64,
    pub location: Option<String>,
    pub assigned_driver_id: Option<String>,
    pub status: VehicleStatus,
    pub last_maintenance: Option<DateTime<Utc>>,
    pub next_maintenance: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Vehicle {
    /// Un vehículo está disponible para asignación si no tiene conductor,
    /// está en idle y tiene combustible suficiente.
    pub fn is_available(&self) -> bool {
        self.assigned_driver_id.is_none()
            && self.status == VehicleStatus::Idle
            && self.fuel_level >= AVAILABLE_FUEL_THRESHOLD
    }
}

/// Recortar el nivel de combustible al rango válido [0, 100]
pub fn clamp_fuel_level(value: f64) -> f64 {
    value.clamp(0.0, 100.0)
}

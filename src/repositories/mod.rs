//! Repositorios del sistema
//!
//! Acceso a datos detrás del trait VehicleStore: backend Postgres para
//! producción y backend en memoria para desarrollo y tests.

pub mod memory;
pub mod postgres;
pub mod vehicle_store;

pub use memory::MemoryVehicleStore;
pub use postgres::PgVehicleStore;
pub use vehicle_store::VehicleStore;

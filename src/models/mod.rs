//! Modelos del sistema
//!
//! Este módulo contiene todos los modelos de datos del dominio de flota
//! y los tipos de identidad autenticada.

pub mod auth;
pub mod status_history;
pub mod vehicle;

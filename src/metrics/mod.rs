//! # Sistema de Métricas
//! src/metrics/mod.rs
//!
//! Recolección de métricas del servidor para el endpoint `/metrics`:
//! - Conexiones totales y activas
//! - Respuestas por código de estado y por ruta
//! - Uptime

pub mod collector;

pub use collector::ServerMetrics;

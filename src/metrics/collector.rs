//! # Collector de Métricas del Servidor
//! src/metrics/collector.rs
//!
//! Observabilidad de la capa de transporte: conexiones, respuestas por
//! código y por ruta, uptime. Las estadísticas del motor de hashing van
//! aparte (son del motor) y se combinan recién en el endpoint `/metrics`.

use serde_json::json;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Instant;

/// Collector de métricas thread-safe
#[derive(Clone)]
pub struct ServerMetrics {
    inner: Arc<Mutex<MetricsData>>,
    start_time: Instant,
}

/// Datos internos de métricas
struct MetricsData {
    /// Conexiones aceptadas desde el arranque
    total_connections: u64,

    /// Conexiones con su thread todavía vivo
    active_connections: u64,

    /// Respuestas por código de estado
    status_codes: HashMap<u16, u64>,

    /// Respuestas por ruta
    responses_per_path: HashMap<String, u64>,
}

impl ServerMetrics {
    /// Crea un collector vacío
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(MetricsData {
                total_connections: 0,
                active_connections: 0,
                status_codes: HashMap::new(),
                responses_per_path: HashMap::new(),
            })),
            start_time: Instant::now(),
        }
    }

    /// Registra que se aceptó una conexión
    pub fn connection_opened(&self) {
        let mut data = self.inner.lock().unwrap();
        data.total_connections += 1;
        data.active_connections += 1;
    }

    /// Registra que el thread de una conexión terminó
    pub fn connection_closed(&self) {
        let mut data = self.inner.lock().unwrap();
        if data.active_connections > 0 {
            data.active_connections -= 1;
        }
    }

    /// Registra la respuesta enviada para una ruta
    pub fn record_response(&self, path: &str, status_code: u16) {
        let mut data = self.inner.lock().unwrap();
        *data.status_codes.entry(status_code).or_insert(0) += 1;
        *data.responses_per_path.entry(path.to_string()).or_insert(0) += 1;
    }

    /// Conexiones activas en este momento
    pub fn active_connections(&self) -> u64 {
        self.inner.lock().unwrap().active_connections
    }

    /// Snapshot de las métricas como JSON
    pub fn snapshot_json(&self) -> serde_json::Value {
        let data = self.inner.lock().unwrap();

        let by_status: serde_json::Map<String, serde_json::Value> = data
            .status_codes
            .iter()
            .map(|(code, count)| (code.to_string(), json!(count)))
            .collect();

        let by_path: serde_json::Map<String, serde_json::Value> = data
            .responses_per_path
            .iter()
            .map(|(path, count)| (path.clone(), json!(count)))
            .collect();

        json!({
            "server": {
                "uptime_seconds": self.start_time.elapsed().as_secs(),
                "total_connections": data.total_connections,
                "active_connections": data.active_connections,
            },
            "responses": {
                "by_status": by_status,
                "by_path": by_path,
            },
        })
    }
}

impl Default for ServerMetrics {
    fn default() -> Self {
        Self::new()
    }
}

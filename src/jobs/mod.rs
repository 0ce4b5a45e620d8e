//! # Sistema de Trabajos de Hashing
//!
//! El corazón del servidor: un motor asíncrono que asigna ids a contraseñas,
//! calcula sus hashes en background y deja que los clientes esperen por el
//! resultado.
//!
//! ## Endpoints
//!
//! - `POST /hash` (body `password=...`) - encolar, responde el id
//! - `GET /hash/<id>` - obtener el hash (espera si sigue en cómputo)
//! - `GET /stats` - total de submits y latencia media
//! - `GET /shutdown` - apagado gracioso (el trabajo en vuelo termina)

pub mod digest;
pub mod engine;
pub mod handlers;

pub use engine::{EngineError, EngineStats, HashEngine, RequestGuard};

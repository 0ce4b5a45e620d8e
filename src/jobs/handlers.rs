//! # Handlers HTTP del Servicio de Hashing
//! src/jobs/handlers.rs
//!
//! Implementa los endpoints que la capa de transporte despacha al motor:
//! - `POST /hash` - encolar una contraseña
//! - `GET /hash/<id>` - consultar (y esperar) el hash de un id
//! - `GET /stats` - estadísticas del motor
//! - `GET /shutdown` - apagado gracioso
//!
//! Los handlers solo parsean y traducen: todo el estado vive en el motor.

use crate::http::{form, Request, Response, StatusCode};
use crate::jobs::engine::{EngineError, HashEngine};

/// Handler para `POST /hash` (body `password=...`)
///
/// Encola la contraseña y responde su id. Re-enviar una contraseña ya
/// conocida devuelve el mismo id, aunque el cómputo original siga en vuelo.
///
/// # Ejemplo de response
/// ```json
/// {"id": 1}
/// ```
pub fn submit_handler(req: &Request, engine: &HashEngine) -> Response {
    let body = match req.body_str() {
        Some(body) => body,
        None => {
            return Response::error(StatusCode::BadRequest, "Request body is not valid UTF-8");
        }
    };

    // La validación de entrada es responsabilidad del transporte: al motor
    // solo le llegan contraseñas no vacías
    let password = match form::field(body, "password") {
        Some(pw) if !pw.is_empty() => pw,
        _ => {
            return Response::error(StatusCode::BadRequest, "Body contains no password");
        }
    };

    match engine.submit(password) {
        Ok(id) => Response::json(&serde_json::json!({ "id": id }).to_string()),
        Err(EngineError::ShuttingDown) => {
            Response::error(StatusCode::ServiceUnavailable, "Server is shutting down")
        }
        Err(error) => Response::error(StatusCode::InternalServerError, &error.to_string()),
    }
}

/// Handler para `GET /hash/<id>`
///
/// Si el cómputo del id sigue en vuelo, la conexión espera hasta que el
/// resultado exista (sin límite de tiempo: el timeout, si se quiere, lo
/// pone el cliente). Un id fuera de rango responde 404 sin esperar.
///
/// # Ejemplo de response
/// ```json
/// {"id": 1, "hash": "ZEHhWB65..."}
/// ```
pub fn lookup_handler(req: &Request, engine: &HashEngine) -> Response {
    let raw_id = match req.path().strip_prefix("/hash/") {
        Some(rest) => rest,
        None => {
            return Response::error(StatusCode::BadRequest, "Missing hash id in path");
        }
    };

    let id: usize = match raw_id.parse() {
        Ok(id) => id,
        Err(_) => {
            return Response::error(
                StatusCode::BadRequest,
                &format!("Invalid hash id: {}", raw_id),
            );
        }
    };

    match engine.lookup(id) {
        Ok(hash) => Response::json(&serde_json::json!({ "id": id, "hash": hash }).to_string()),
        Err(error @ EngineError::UnknownId(_)) => {
            Response::error(StatusCode::NotFound, &error.to_string())
        }
        Err(error) => Response::error(StatusCode::InternalServerError, &error.to_string()),
    }
}

/// Handler para `GET /stats`
///
/// # Ejemplo de response
/// ```json
/// {"total": 42, "average": 5123}
/// ```
pub fn stats_handler(_req: &Request, engine: &HashEngine) -> Response {
    let body = serde_json::to_string(&engine.stats()).unwrap_or_else(|_| "{}".to_string());
    Response::json(&body)
}

/// Handler para `GET /shutdown`
///
/// Dispara el drain y responde de inmediato; el proceso termina cuando el
/// trabajo en vuelo haya completado. Llamarlo de nuevo no hace nada.
pub fn shutdown_handler(_req: &Request, engine: &HashEngine) -> Response {
    engine.drain();
    Response::json(r#"{"status": "draining"}"#)
}

//! # Sistema de Routing
//! src/router/mod.rs
//!
//! Mapea paths HTTP a handlers del motor de hashing.
//!
//! ## Arquitectura
//!
//! ```text
//! Request → Router → Handler(motor) → Response
//! ```
//!
//! Todos los handlers de este servidor son "stateful": reciben el motor
//! además del request. Hay dos clases de rutas: exactas (`/hash`, `/stats`)
//! y por prefijo (`/hash/` seguido del id). Si ninguna matchea, 404.

use crate::http::{Request, Response, StatusCode};
use crate::jobs::HashEngine;

/// Tipo de función handler
///
/// Un handler recibe el Request y el motor, y retorna una Response
pub type Handler = fn(&Request, &HashEngine) -> Response;

/// Patrón contra el que se compara el path del request
enum Pattern {
    /// El path debe ser exactamente este
    Exact(String),

    /// El path debe empezar con este prefijo (ej: "/hash/" + id)
    Prefix(String),
}

impl Pattern {
    fn matches(&self, path: &str) -> bool {
        match self {
            Pattern::Exact(p) => p == path,
            Pattern::Prefix(p) => path.starts_with(p.as_str()),
        }
    }
}

/// Router que mapea paths a handlers
pub struct Router {
    /// Rutas en orden de registro: gana la primera que matchee
    routes: Vec<(Pattern, Handler)>,
}

impl Router {
    /// Crea un router vacío
    pub fn new() -> Self {
        Self { routes: Vec::new() }
    }

    /// Registra una ruta exacta
    ///
    /// # Ejemplo
    /// ```
    /// use hash_server::router::Router;
    /// use hash_server::jobs::handlers;
    ///
    /// let mut router = Router::new();
    /// router.register("/stats", handlers::stats_handler);
    /// ```
    pub fn register(&mut self, path: &str, handler: Handler) {
        self.routes.push((Pattern::Exact(path.to_string()), handler));
    }

    /// Registra una ruta por prefijo (el resto del path lo parsea el handler)
    pub fn register_prefix(&mut self, prefix: &str, handler: Handler) {
        self.routes.push((Pattern::Prefix(prefix.to_string()), handler));
    }

    /// Encuentra y ejecuta el handler apropiado para un request
    ///
    /// Si ningún patrón matchea el path, retorna 404 Not Found.
    pub fn route(&self, request: &Request, engine: &HashEngine) -> Response {
        let path = request.path();

        for (pattern, handler) in &self.routes {
            if pattern.matches(path) {
                let mut response = handler(request, engine);
                self.add_common_headers(&mut response);
                return response;
            }
        }

        let mut response =
            Response::error(StatusCode::NotFound, &format!("Route not found: {}", path));
        self.add_common_headers(&mut response);
        response
    }

    /// Agrega headers comunes a todas las respuestas
    fn add_common_headers(&self, response: &mut Response) {
        response.add_header("Server", "RedHash-HTTP/1.0");
        response.add_header("Connection", "close");
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

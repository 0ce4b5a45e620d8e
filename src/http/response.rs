//! # Construcción de Respuestas HTTP
//!
//! API para armar respuestas HTTP/1.0 de forma programática y convertirlas
//! a bytes listos para el socket.
//!
//! ## Ejemplo de uso
//!
//! ```
//! use hash_server::http::{Response, StatusCode};
//!
//! let response = Response::new(StatusCode::Ok)
//!     .with_header("Content-Type", "application/json")
//!     .with_body(r#"{"id": 1}"#);
//!
//! let bytes = response.to_bytes();
//! // Ahora se pueden enviar `bytes` por el socket
//! ```

use super::StatusCode;

/// Representa una respuesta HTTP/1.0 completa
#[derive(Debug, Clone)]
pub struct Response {
    /// Código de estado HTTP (200, 404, etc.)
    status: StatusCode,

    /// Headers en orden de inserción (sin duplicados por nombre)
    headers: Vec<(String, String)>,

    /// Cuerpo de la respuesta
    body: Vec<u8>,
}

impl Response {
    /// Crea una respuesta sin headers ni body
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: Vec::new(),
        }
    }

    /// Agrega un header (versión builder)
    ///
    /// Si el header ya existe, se sobrescribe.
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.add_header(name, value);
        self
    }

    /// Agrega un header a una respuesta existente
    pub fn add_header(&mut self, name: &str, value: &str) {
        match self.headers.iter_mut().find(|(n, _)| n == name) {
            Some((_, existing)) => *existing = value.to_string(),
            None => self.headers.push((name.to_string(), value.to_string())),
        }
    }

    /// Establece el body y calcula `Content-Length` automáticamente
    pub fn with_body(mut self, body: &str) -> Self {
        self.body = body.as_bytes().to_vec();
        let length = self.body.len().to_string();
        self.add_header("Content-Length", &length);
        self
    }

    /// Crea una respuesta JSON exitosa (200 OK)
    ///
    /// # Ejemplo
    /// ```
    /// use hash_server::http::Response;
    ///
    /// let response = Response::json(r#"{"status": "draining"}"#);
    /// ```
    pub fn json(body: &str) -> Self {
        Self::new(StatusCode::Ok)
            .with_header("Content-Type", "application/json")
            .with_body(body)
    }

    /// Crea una respuesta de error con body JSON `{"error": "mensaje"}`
    ///
    /// # Ejemplo
    /// ```
    /// use hash_server::http::{Response, StatusCode};
    ///
    /// let response = Response::error(StatusCode::NotFound, "unknown hash id: 7");
    /// ```
    pub fn error(status: StatusCode, message: &str) -> Self {
        let body = serde_json::json!({ "error": message }).to_string();
        Self::new(status)
            .with_header("Content-Type", "application/json")
            .with_body(&body)
    }

    /// Convierte la respuesta al formato de alambre HTTP/1.0
    ///
    /// - Status line: `HTTP/1.0 200 OK\r\n`
    /// - Headers: `Nombre: Valor\r\n` (en orden de inserción)
    /// - Línea vacía y body
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut result = Vec::new();

        let status_line = format!("HTTP/1.0 {}\r\n", self.status);
        result.extend_from_slice(status_line.as_bytes());

        for (name, value) in &self.headers {
            let header_line = format!("{}: {}\r\n", name, value);
            result.extend_from_slice(header_line.as_bytes());
        }

        result.extend_from_slice(b"\r\n");
        result.extend_from_slice(&self.body);

        result
    }

    /// Obtiene el código de estado
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Obtiene un header por nombre
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Obtiene el body
    pub fn body(&self) -> &[u8] {
        &self.body
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_response() {
        let response = Response::new(StatusCode::Ok);
        assert_eq!(response.status(), StatusCode::Ok);
        assert!(response.body().is_empty());
    }

    #[test]
    fn test_with_header() {
        let response = Response::new(StatusCode::Ok)
            .with_header("Content-Type", "text/plain")
            .with_header("X-Custom", "value");

        assert_eq!(response.header("Content-Type"), Some("text/plain"));
        assert_eq!(response.header("X-Custom"), Some("value"));
    }

    #[test]
    fn test_header_overwrite() {
        let response = Response::new(StatusCode::Ok)
            .with_header("X-Custom", "uno")
            .with_header("X-Custom", "dos");

        assert_eq!(response.header("X-Custom"), Some("dos"));
    }

    #[test]
    fn test_with_body_sets_content_length() {
        let response = Response::new(StatusCode::Ok).with_body("Hello World");

        assert_eq!(response.body(), b"Hello World");
        assert_eq!(response.header("Content-Length"), Some("11"));
    }

    #[test]
    fn test_json_response() {
        let response = Response::json(r#"{"id": 1}"#);

        assert_eq!(response.status(), StatusCode::Ok);
        assert_eq!(response.header("Content-Type"), Some("application/json"));
        assert_eq!(response.body(), br#"{"id": 1}"#);
    }

    #[test]
    fn test_error_response() {
        let response = Response::error(StatusCode::BadRequest, "Body contains no password");

        assert_eq!(response.status(), StatusCode::BadRequest);
        let body = String::from_utf8(response.body().to_vec()).unwrap();
        assert!(body.contains("Body contains no password"));
    }

    #[test]
    fn test_error_response_escapes_message() {
        // El mensaje con comillas no debe romper el JSON
        let response = Response::error(StatusCode::BadRequest, r#"raro: "comillas""#);
        let body = String::from_utf8(response.body().to_vec()).unwrap();

        let parsed: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(parsed["error"], r#"raro: "comillas""#);
    }

    #[test]
    fn test_to_bytes() {
        let response = Response::new(StatusCode::Ok)
            .with_header("Content-Type", "text/plain")
            .with_body("Test");

        let bytes = response.to_bytes();
        let text = String::from_utf8(bytes).unwrap();

        assert!(text.starts_with("HTTP/1.0 200 OK\r\n"));
        assert!(text.contains("Content-Type: text/plain\r\n"));
        assert!(text.contains("Content-Length: 4\r\n"));
        assert!(text.ends_with("\r\n\r\nTest"));
    }

    #[test]
    fn test_to_bytes_preserves_header_order() {
        let response = Response::new(StatusCode::Ok)
            .with_header("A-Primero", "1")
            .with_header("B-Segundo", "2");

        let text = String::from_utf8(response.to_bytes()).unwrap();
        let a = text.find("A-Primero").unwrap();
        let b = text.find("B-Segundo").unwrap();
        assert!(a < b);
    }

    #[test]
    fn test_empty_body_response() {
        let response = Response::new(StatusCode::NotFound);
        let text = String::from_utf8(response.to_bytes()).unwrap();

        // Debe terminar con \r\n\r\n (sin body)
        assert!(text.ends_with("\r\n\r\n"));
    }
}

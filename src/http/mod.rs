//! # Módulo HTTP
//!
//! Implementa el protocolo HTTP/1.0 desde cero, sin librerías de alto
//! nivel. Incluye:
//!
//! - Parsing de requests HTTP/1.0
//! - Construcción de responses HTTP
//! - Manejo de status codes
//! - Extracción de campos de formulario (`password=...`)
//!
//! ### Formato de Request
//!
//! ```text
//! POST /hash HTTP/1.0\r\n
//! Content-Length: 20\r\n
//! \r\n
//! password=angryMonkey
//! ```
//!
//! ### Formato de Response
//!
//! ```text
//! HTTP/1.0 200 OK\r\n
//! Content-Type: application/json\r\n
//! Content-Length: 8\r\n
//! \r\n
//! {"id":1}
//! ```

pub mod form;      // Extracción de campos de formulario
pub mod request;   // Parsing de HTTP requests
pub mod response;  // Construcción de HTTP responses
pub mod status;    // Códigos de estado HTTP

// Re-exportamos los tipos principales para facilitar su uso
pub use request::Request;
pub use response::Response;
pub use status::StatusCode;

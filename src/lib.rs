//! # Hash Server
//! src/lib.rs
//!
//! Servidor HTTP/1.0 de hashing asíncrono de contraseñas: un submit
//! devuelve un id de inmediato y el hash SHA-512/Base64 se calcula en
//! background; el lookup de un id espera a que el resultado exista.
//!
//! ## Arquitectura
//!
//! El servidor está dividido en módulos especializados:
//! - `http`: Parsing y manejo del protocolo HTTP/1.0
//! - `server`: Servidor TCP, manejo de conexiones y monitor de apagado
//! - `router`: Enrutamiento de peticiones a handlers
//! - `jobs`: El motor asíncrono de trabajos de hashing (el corazón)
//! - `metrics`: Recolección de métricas y observabilidad
//! - `config`: Configuración por CLI y variables de entorno
//!
//! ## Ejemplo de uso
//!
//! ```no_run
//! use hash_server::config::Config;
//! use hash_server::server::Server;
//!
//! let config = Config::default();
//! let server = Server::bind(config).expect("Error al hacer bind");
//! server.run().expect("Error al correr el servidor");
//! ```

pub mod config;
pub mod http;
pub mod jobs;
pub mod metrics;
pub mod router;
pub mod server;

//! # Configuración del Servidor
//! src/config.rs
//!
//! Configuración del servidor de hashing con soporte para argumentos CLI
//! y variables de entorno.
//!
//! ## Ejemplos de uso
//!
//! ### CLI
//! ```bash
//! ./hash_server --port 8080 \
//!   --compute-delay 5000 \
//!   --shutdown-grace 10000
//! ```
//!
//! ### Variables de entorno
//! ```bash
//! HASH_PORT=8080 HASH_HOST=0.0.0.0 ./hash_server
//! ```

use clap::Parser;
use std::time::Duration;

/// Configuración del servidor de hashing
#[derive(Debug, Clone, Parser)]
#[command(name = "hash_server")]
#[command(about = "Servidor HTTP/1.0 de hashing asíncrono de contraseñas")]
#[command(version = "0.1.0")]
pub struct Config {
    /// Puerto en el que escucha el servidor
    #[arg(short, long, default_value = "8080", env = "HASH_PORT")]
    pub port: u16,

    /// Host/IP en el que escucha
    #[arg(long, default_value = "127.0.0.1", env = "HASH_HOST")]
    pub host: String,

    /// Retardo simulado de cada cómputo de hash, en milisegundos
    ///
    /// El hashing "tarda mucho" a propósito: es lo que vuelve interesante
    /// al motor asíncrono. Con 0 el cómputo es inmediato (útil en tests).
    #[arg(long = "compute-delay", default_value = "5000", env = "COMPUTE_DELAY_MS")]
    pub compute_delay_ms: u64,

    /// Período de gracia del apagado, en milisegundos
    ///
    /// Al pedir /shutdown, el trabajo en vuelo tiene hasta este plazo para
    /// terminar; si no lo logra se considera colgado y el proceso aborta.
    #[arg(long = "shutdown-grace", default_value = "10000", env = "SHUTDOWN_GRACE_MS")]
    pub shutdown_grace_ms: u64,
}

impl Config {
    /// Crea la configuración parseando argumentos CLI (y env)
    pub fn new() -> Self {
        Config::parse()
    }

    /// Obtiene la dirección completa para bind (host:port)
    ///
    /// # Ejemplo
    /// ```rust
    /// use hash_server::config::Config;
    ///
    /// let config = Config::default();
    /// assert_eq!(config.address(), "127.0.0.1:8080");
    /// ```
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Retardo simulado del cómputo como `Duration`
    pub fn compute_delay(&self) -> Duration {
        Duration::from_millis(self.compute_delay_ms)
    }

    /// Período de gracia del apagado como `Duration`
    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_millis(self.shutdown_grace_ms)
    }

    /// Valida la configuración
    pub fn validate(&self) -> Result<(), String> {
        if self.shutdown_grace_ms == 0 {
            return Err("Shutdown grace must be > 0 ms".to_string());
        }

        Ok(())
    }

    /// Imprime un resumen de la configuración
    pub fn print_summary(&self) {
        println!("⚙️  Configuración:");
        println!("   Dirección:       {}", self.address());
        println!("   Compute delay:   {} ms", self.compute_delay_ms);
        println!("   Shutdown grace:  {} ms", self.shutdown_grace_ms);
        println!();
    }
}

impl Default for Config {
    /// Configuración por defecto
    fn default() -> Self {
        Self {
            port: 8080,
            host: "127.0.0.1".to_string(),
            compute_delay_ms: 5_000,
            shutdown_grace_ms: 10_000,
        }
    }
}

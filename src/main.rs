//! # Hash Server - Entry Point
//! src/main.rs
//!
//! Punto de entrada del servidor de hashing asíncrono.

use hash_server::config::Config;
use hash_server::server::Server;

fn main() {
    println!("=================================");
    println!("  RedHash HTTP/1.0 Server");
    println!("  Hashing asíncrono de contraseñas");
    println!("=================================\n");

    // Configuración desde CLI y variables de entorno
    let config = Config::new();
    if let Err(e) = config.validate() {
        eprintln!("💥 Configuración inválida: {}", e);
        std::process::exit(1);
    }
    config.print_summary();

    let server = match Server::bind(config) {
        Ok(server) => server,
        Err(e) => {
            eprintln!("💥 No se pudo iniciar el servidor: {}", e);
            std::process::exit(1);
        }
    };

    // run() retorna recién cuando el apagado gracioso completó
    if let Err(e) = server.run() {
        eprintln!("💥 Error fatal: {}", e);
        std::process::exit(1);
    }

    println!("👋 Apagado gracioso completo");
}

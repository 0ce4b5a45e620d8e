//! # Servidor TCP Concurrente
//! src/server/tcp.rs
//!
//! Servidor TCP que maneja múltiples conexiones simultáneas con un thread
//! por conexión. Cada conexión registra un request abierto en el motor, así
//! el apagado gracioso espera a que las respuestas en vuelo terminen de
//! escribirse.
//!
//! El apagado tiene su propio thread monitor: espera a que alguien pida el
//! drain, le da al trabajo pendiente un período de gracia y, cuando el
//! motor queda vacío, corta el loop de accept para que `run()` retorne.

use crate::config::Config;
use crate::http::{Request, Response, StatusCode};
use crate::jobs::{handlers, HashEngine};
use crate::metrics::ServerMetrics;
use crate::router::Router;
use std::io::{Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

/// Tamaño máximo de un request (cabeceras + body)
const MAX_REQUEST_BYTES: usize = 64 * 1024;

/// Servidor HTTP/1.0 concurrente del servicio de hashing
pub struct Server {
    config: Config,
    router: Arc<Router>,
    engine: HashEngine,
    metrics: Arc<ServerMetrics>,
    listener: TcpListener,
    shutting_down: Arc<AtomicBool>,
}

impl Server {
    /// Crea el servidor y hace bind de una vez
    ///
    /// Con `port: 0` el sistema asigna un puerto efímero; la dirección real
    /// se consulta con [`local_addr`](Self::local_addr). Eso permite que los
    /// tests levanten servidores independientes sin pisarse.
    pub fn bind(config: Config) -> std::io::Result<Self> {
        let mut router = Router::new();
        router.register("/hash", handlers::submit_handler);
        router.register_prefix("/hash/", handlers::lookup_handler);
        router.register("/stats", handlers::stats_handler);
        router.register("/shutdown", handlers::shutdown_handler);

        let engine = HashEngine::new(config.compute_delay());
        let listener = TcpListener::bind(config.address())?;

        Ok(Self {
            config,
            router: Arc::new(router),
            engine,
            metrics: Arc::new(ServerMetrics::new()),
            listener,
            shutting_down: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Dirección real en la que quedó escuchando
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Corre el servidor hasta que el apagado gracioso complete
    ///
    /// Retorna `Ok(())` cuando el drain terminó y el loop de accept se
    /// cortó limpiamente.
    pub fn run(self) -> std::io::Result<()> {
        let address = self.local_addr()?;
        println!("[+] Servidor escuchando en {}", address);
        println!("[*] Modo concurrente: un thread por conexión\n");

        self.spawn_shutdown_monitor(address);

        for stream in self.listener.incoming() {
            // El monitor setea el flag y conecta una vez más para
            // despertar este accept
            if self.shutting_down.load(Ordering::SeqCst) {
                break;
            }

            match stream {
                Ok(stream) => {
                    let router = Arc::clone(&self.router);
                    let metrics = Arc::clone(&self.metrics);
                    let engine = self.engine.clone();

                    metrics.connection_opened();

                    thread::spawn(move || {
                        // Mientras el guard viva, el drain no completa: la
                        // respuesta (incluida la del propio /shutdown) llega
                        // al cliente antes de que el proceso muera
                        let open_request = engine.begin_request();

                        if let Err(e) =
                            Self::handle_connection(stream, &router, &metrics, &engine)
                        {
                            eprintln!("   ❌ Error en conexión: {}", e);
                        }

                        drop(open_request);
                        metrics.connection_closed();
                    });
                }
                Err(e) => {
                    eprintln!("   ❌ Error al aceptar conexión: {}", e);
                }
            }
        }

        println!("🛑 Drain completo: el servidor deja de aceptar conexiones");
        Ok(())
    }

    /// Lanza el thread que monitorea el apagado gracioso
    fn spawn_shutdown_monitor(&self, address: SocketAddr) {
        let engine = self.engine.clone();
        let shutting_down = Arc::clone(&self.shutting_down);
        let grace = self.config.shutdown_grace();

        thread::spawn(move || {
            engine.wait_draining();
            println!("🛑 Apagado solicitado: esperando el trabajo en vuelo...");

            if engine.wait_drained_timeout(grace) {
                shutting_down.store(true, Ordering::SeqCst);
                // Conexión de cortesía para despertar al accept()
                let _ = TcpStream::connect(address);
            } else {
                // Un cómputo colgado pasado el período de gracia no es
                // recuperable: mejor morir con ruido que esperar para
                // siempre en silencio
                eprintln!(
                    "💥 El drain no completó en {} ms: trabajo colgado, abortando",
                    grace.as_millis()
                );
                std::process::exit(1);
            }
        });
    }

    /// Atiende una conexión: lee, parsea, despacha y responde
    fn handle_connection(
        mut stream: TcpStream,
        router: &Router,
        metrics: &ServerMetrics,
        engine: &HashEngine,
    ) -> std::io::Result<()> {
        let buffer = Self::read_request(&mut stream)?;

        if buffer.is_empty() {
            // El peer cerró sin mandar nada
            return Ok(());
        }

        let request_id = Self::request_id();

        let (response, path) = match Request::parse(&buffer) {
            Ok(request) => {
                let path = request.path().to_string();
                println!(
                    "   ✅ {} {} [req_id: {}]",
                    request.method().as_str(),
                    path,
                    &request_id[..8]
                );

                // /metrics combina servidor + motor, por eso no va al router
                let response = if path == "/metrics" {
                    Self::metrics_response(metrics, engine)
                } else {
                    router.route(&request, engine)
                };

                (response, path)
            }
            Err(e) => {
                println!("   ❌ Parse error: {}", e);
                (
                    Response::error(StatusCode::BadRequest, &format!("Invalid request: {}", e)),
                    "/error".to_string(),
                )
            }
        };

        // Header de observabilidad
        let mut response = response;
        response.add_header("X-Request-Id", &request_id);

        stream.write_all(&response.to_bytes())?;
        stream.flush()?;

        metrics.record_response(&path, response.status().as_u16());

        Ok(())
    }

    /// Lee un request completo del socket
    ///
    /// Acumula hasta tener las cabeceras y, si viene `Content-Length`, el
    /// body entero. También corta en EOF o al superar el tamaño máximo.
    fn read_request(stream: &mut TcpStream) -> std::io::Result<Vec<u8>> {
        let mut buffer = Vec::new();
        let mut chunk = [0u8; 4096];

        loop {
            let bytes_read = stream.read(&mut chunk)?;
            if bytes_read == 0 {
                break;
            }
            buffer.extend_from_slice(&chunk[..bytes_read]);

            if let Some(header_end) = Self::find_header_end(&buffer) {
                let expected_body = Self::content_length(&buffer[..header_end]).unwrap_or(0);
                if buffer.len() >= header_end + 4 + expected_body {
                    break;
                }
            }

            if buffer.len() >= MAX_REQUEST_BYTES {
                break;
            }
        }

        Ok(buffer)
    }

    /// Posición de la línea vacía `\r\n\r\n` que separa cabeceras y body
    fn find_header_end(buffer: &[u8]) -> Option<usize> {
        buffer.windows(4).position(|window| window == b"\r\n\r\n")
    }

    /// Busca `Content-Length` en las cabeceras crudas
    fn content_length(head: &[u8]) -> Option<usize> {
        let head = std::str::from_utf8(head).ok()?;
        head.lines().find_map(|line| {
            let (name, value) = line.split_once(':')?;
            if name.trim().eq_ignore_ascii_case("content-length") {
                value.trim().parse().ok()
            } else {
                None
            }
        })
    }

    /// Genera un id único para la conexión
    fn request_id() -> String {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let now = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();

        let mut hasher = DefaultHasher::new();
        now.hash(&mut hasher);
        thread::current().id().hash(&mut hasher);

        format!("{:016x}", hasher.finish())
    }

    /// Arma la respuesta de `/metrics`: servidor + motor en un solo JSON
    fn metrics_response(metrics: &ServerMetrics, engine: &HashEngine) -> Response {
        let mut body = metrics.snapshot_json();
        body["engine"] = serde_json::to_value(engine.stats()).unwrap_or_default();
        Response::json(&body.to_string())
    }
}

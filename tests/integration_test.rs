//! Tests de integración end-to-end del servidor de hashing
//!
//! Cada test levanta su propio servidor en un puerto efímero (port 0),
//! así los tests corren en paralelo sin pisarse y no hace falta tener
//! un servidor corriendo aparte.

use hash_server::config::Config;
use hash_server::server::Server;
use std::io::{Read, Write};
use std::net::{SocketAddr, TcpStream};
use std::thread;
use std::time::{Duration, Instant};

/// SHA-512 de "angryMonkey" en Base64
const ANGRY_MONKEY_HASH: &str =
    "ZEHhWB65gUlzdVwtDQArEyx+KVLzp/aTaRaPlBzYRIFj6vjFdqEb0Q5B8zVKCZ0vKbZPZklJz0Fd7su2A+gf7Q==";

/// Levanta un servidor con el retardo de cómputo dado
///
/// Retorna la dirección y el JoinHandle de `run()`, para los tests que
/// verifican que el servidor termina tras el drain.
fn start_server(
    compute_delay_ms: u64,
) -> (SocketAddr, thread::JoinHandle<std::io::Result<()>>) {
    let config = Config {
        port: 0,
        host: "127.0.0.1".to_string(),
        compute_delay_ms,
        shutdown_grace_ms: 10_000,
    };

    let server = Server::bind(config).expect("Failed to bind server");
    let addr = server.local_addr().expect("Failed to get local addr");
    let handle = thread::spawn(move || server.run());

    (addr, handle)
}

/// Helper: envía un request crudo y retorna la response completa
fn send_request(addr: SocketAddr, raw: &str) -> String {
    let mut stream = TcpStream::connect(addr).expect("Failed to connect");

    stream
        .set_read_timeout(Some(Duration::from_secs(15)))
        .unwrap();
    stream
        .set_write_timeout(Some(Duration::from_secs(5)))
        .unwrap();

    stream.write_all(raw.as_bytes()).unwrap();
    stream.flush().unwrap();

    let mut response = String::new();
    stream.read_to_string(&mut response).unwrap();
    response
}

/// Helper: GET simple
fn get(addr: SocketAddr, path: &str) -> String {
    send_request(addr, &format!("GET {} HTTP/1.0\r\n\r\n", path))
}

/// Helper: POST /hash con una contraseña
fn post_password(addr: SocketAddr, password: &str) -> String {
    let body = format!("password={}", password);
    send_request(
        addr,
        &format!(
            "POST /hash HTTP/1.0\r\nContent-Length: {}\r\n\r\n{}",
            body.len(),
            body
        ),
    )
}

/// Helper: extrae el body JSON de una response HTTP
fn extract_body(response: &str) -> &str {
    match response.find("\r\n\r\n") {
        Some(pos) => &response[pos + 4..],
        None => "",
    }
}

#[test]
fn test_full_scenario() {
    let (addr, handle) = start_server(200);

    // Submit: primera vez asigna el id 1
    let response = post_password(addr, "angryMonkey");
    assert!(response.contains("200 OK"), "response: {}", response);
    assert_eq!(extract_body(&response), r#"{"id":1}"#);

    // Re-submit de la misma contraseña: mismo id, nada de 2
    let response = post_password(addr, "angryMonkey");
    assert_eq!(extract_body(&response), r#"{"id":1}"#);

    // Lookup del id 1: espera al cómputo y trae el digest conocido
    let response = get(addr, "/hash/1");
    assert!(response.contains("200 OK"));
    assert!(extract_body(&response).contains(ANGRY_MONKEY_HASH));

    // Lookup de un id nunca asignado
    let response = get(addr, "/hash/2");
    assert!(response.contains("404 Not Found"));

    // Stats: los dos submits cuentan (el repetido también)
    let response = get(addr, "/stats");
    assert!(extract_body(&response).contains(r#""total":2"#));

    // Apagado gracioso
    let response = get(addr, "/shutdown");
    assert!(response.contains("200 OK"));
    assert!(extract_body(&response).contains("draining"));

    // El servidor terminó de drenar: run() retornó limpio
    let result = handle.join().expect("Server thread panicked");
    assert!(result.is_ok());
}

#[test]
fn test_submit_rejected_after_shutdown() {
    // Con trabajo en vuelo, el servidor sigue respondiendo durante el
    // drain y rechaza submits nuevos
    let (addr, _handle) = start_server(500);

    post_password(addr, "lenta");
    let response = get(addr, "/shutdown");
    assert!(response.contains("200 OK"));

    let response = post_password(addr, "tarde");
    assert!(
        response.contains("503 Service Unavailable"),
        "response: {}",
        response
    );
}

#[test]
fn test_lookup_blocks_until_computed() {
    let (addr, _handle) = start_server(300);

    let start = Instant::now();
    let response = post_password(addr, "bloqueante");
    assert!(response.contains("200 OK"));

    // El submit respondió de inmediato; el lookup es el que espera
    let response = get(addr, "/hash/1");
    let elapsed = start.elapsed();

    assert!(response.contains("200 OK"));
    assert!(
        elapsed >= Duration::from_millis(250),
        "lookup retornó demasiado pronto: {:?}",
        elapsed
    );
    // El hash llega completo, nunca vacío ni parcial
    assert!(extract_body(&response).contains("\"hash\":\""));
    assert!(extract_body(&response).contains("=\"")); // Base64 con padding
}

#[test]
fn test_concurrent_waiters_each_get_their_hash() {
    let (addr, _handle) = start_server(200);

    // Encolar 4 contraseñas distintas
    for i in 1..=4 {
        let response = post_password(addr, &format!("clave-{}", i));
        assert!(response.contains("200 OK"));
    }

    // Un cliente esperando cada id; todos deben terminar con su resultado
    let mut clients = Vec::new();
    for id in 1..=4 {
        clients.push(thread::spawn(move || {
            let response = get(addr, &format!("/hash/{}", id));
            assert!(response.contains("200 OK"), "id {}: {}", id, response);
            let body = extract_body(&response);
            assert!(body.contains(&format!(r#""id":{}"#, id)));
            assert!(body.contains("\"hash\":\""));
        }));
    }

    for client in clients {
        client.join().expect("Waiter thread failed");
    }
}

#[test]
fn test_stats_start_at_zero() {
    let (addr, _handle) = start_server(0);

    let response = get(addr, "/stats");
    assert!(response.contains("200 OK"));
    assert_eq!(extract_body(&response), r#"{"total":0,"average":0}"#);
}

#[test]
fn test_missing_password_is_bad_request() {
    let (addr, _handle) = start_server(0);

    let body = "foo=bar";
    let response = send_request(
        addr,
        &format!(
            "POST /hash HTTP/1.0\r\nContent-Length: {}\r\n\r\n{}",
            body.len(),
            body
        ),
    );

    assert!(response.contains("400 Bad Request"));
    assert!(extract_body(&response).contains("no password"));
}

#[test]
fn test_unknown_route() {
    let (addr, _handle) = start_server(0);

    let response = get(addr, "/inexistente");
    assert!(response.contains("404 Not Found"));
}

#[test]
fn test_metrics_endpoint() {
    let (addr, _handle) = start_server(0);

    post_password(addr, "observada");
    let response = get(addr, "/metrics");

    assert!(response.contains("200 OK"));
    let body = extract_body(&response);
    assert!(body.contains("\"engine\""));
    assert!(body.contains("\"uptime_seconds\""));
}

#[test]
fn test_drain_lets_inflight_work_finish() {
    let (addr, handle) = start_server(400);

    // Tres cómputos en vuelo al momento del shutdown
    for i in 1..=3 {
        post_password(addr, &format!("en-vuelo-{}", i));
    }

    let shutdown_at = Instant::now();
    get(addr, "/shutdown");

    // Mientras drena, los resultados pendientes siguen consultables
    let response = get(addr, "/hash/3");
    assert!(response.contains("200 OK"));
    assert!(extract_body(&response).contains("\"hash\":\""));

    let result = handle.join().expect("Server thread panicked");
    assert!(result.is_ok());

    // El drain tuvo que esperar a los cómputos de 400 ms
    assert!(shutdown_at.elapsed() >= Duration::from_millis(300));
}

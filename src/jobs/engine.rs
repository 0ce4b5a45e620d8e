//! # Motor de Trabajos de Hashing
//! src/jobs/engine.rs
//!
//! Implementa el motor central del servicio: la tabla de trabajos en memoria,
//! el índice contraseña→id, el cómputo en background y la coordinación de
//! concurrencia entre quienes encolan, quienes consultan y el apagado.
//!
//! ## Modelo de concurrencia
//!
//! Todo el estado compartido (tabla, índice, contadores) vive bajo UN solo
//! `Mutex`. Sobre ese mutex hay dos `Condvar`:
//!
//! - `hash_ready`: se hace broadcast cada vez que un slot se llena. Broadcast
//!   y no `notify_one`, porque puede haber varios threads esperando ids
//!   distintos y cada uno debe re-verificar su propio slot.
//! - `drain_progress`: avisa al monitor de apagado cuando se solicita el
//!   drain y cuando el contador de trabajo pendiente llega a cero.
//!
//! El único trabajo largo que ocurre SIN el lock es el hashing en sí
//! (más su retardo simulado), para no bloquear submits ni lookups ajenos.
//!
//! ## Ciclo de vida
//!
//! ```text
//! Accepting ──drain()──▶ Draining ──outstanding == 0──▶ Stopped
//! ```
//!
//! En `Draining` no se aceptan contraseñas nuevas, pero los cómputos ya
//! encolados terminan y guardan su resultado antes de pasar a `Stopped`.

use crate::jobs::digest;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, Condvar, Mutex};
use std::thread;
use std::time::{Duration, Instant};

/// Fase del motor dentro del protocolo de apagado
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EnginePhase {
    /// Operación normal: se aceptan contraseñas nuevas
    Accepting,

    /// Apagado solicitado: no entra trabajo nuevo, el pendiente termina
    Draining,

    /// Todo el trabajo pendiente terminó
    Stopped,
}

/// Errores que el motor reporta a la capa de transporte
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// El servidor está en drain: no se aceptan contraseñas nuevas
    ShuttingDown,

    /// El id no corresponde a ningún trabajo (fuera de rango o cero)
    UnknownId(usize),
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineError::ShuttingDown => write!(f, "server is shutting down"),
            EngineError::UnknownId(id) => write!(f, "unknown hash id: {}", id),
        }
    }
}

impl std::error::Error for EngineError {}

/// Snapshot de las estadísticas del motor
///
/// `average` es la latencia media en milisegundos (encolado + cómputo).
/// Cuando todavía no se procesó nada, `average` es 0 en vez de fallar
/// por división entre cero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EngineStats {
    /// Total de submits procesados (los repetidos también cuentan)
    pub total: u64,

    /// Latencia media en milisegundos
    pub average: u64,
}

/// Estado interno del motor (siempre bajo el mutex)
struct EngineState {
    /// Índice contraseña → id asignado
    value_to_id: HashMap<String, usize>,

    /// Tabla de trabajos: el id `h` vive en `slots[h - 1]`.
    /// `None` = cómputo en vuelo, `Some(hash)` = resultado listo.
    slots: Vec<Option<String>>,

    /// Cómputos en vuelo + requests abiertos (ver [`RequestGuard`])
    outstanding: usize,

    /// Fase actual del protocolo de apagado
    phase: EnginePhase,

    /// Total de submits procesados
    total: u64,

    /// Tiempo acumulado de procesamiento (encolado + cómputo)
    busy: Duration,
}

/// Motor de trabajos de hashing
///
/// Un submit asigna (o reutiliza) un id y dispara el cómputo SHA-512/Base64
/// en un thread aparte; un lookup bloquea hasta que el resultado exista.
/// El motor es un objeto explícito: se pueden crear varias instancias
/// independientes (útil en tests), nada vive en estado global.
///
/// Clonarlo es barato: los clones comparten el mismo estado.
///
/// # Ejemplo
///
/// ```
/// use hash_server::jobs::HashEngine;
/// use std::time::Duration;
///
/// let engine = HashEngine::new(Duration::ZERO);
///
/// let id = engine.submit("angryMonkey").unwrap();
/// assert_eq!(id, 1);
///
/// // Re-enviar la misma contraseña devuelve el mismo id
/// assert_eq!(engine.submit("angryMonkey").unwrap(), 1);
///
/// // lookup bloquea hasta que el hash esté listo
/// let hash = engine.lookup(id).unwrap();
/// assert_eq!(hash.len(), 88); // SHA-512 en Base64
/// ```
pub struct HashEngine {
    /// Estado compartido
    state: Arc<Mutex<EngineState>>,

    /// Broadcast cuando un slot se llena
    hash_ready: Arc<Condvar>,

    /// Avisos de progreso del drain (solicitud y contador en cero)
    drain_progress: Arc<Condvar>,

    /// Retardo simulado del cómputo (el hashing "tarda mucho")
    compute_delay: Duration,
}

impl HashEngine {
    /// Crea un motor vacío
    ///
    /// `compute_delay` simula el costo del hashing: cada cómputo duerme ese
    /// tiempo antes de calcular el digest. En producción se usa el valor de
    /// la configuración; en tests conviene `Duration::ZERO` o unos pocos ms.
    pub fn new(compute_delay: Duration) -> Self {
        Self {
            state: Arc::new(Mutex::new(EngineState {
                value_to_id: HashMap::new(),
                slots: Vec::new(),
                outstanding: 0,
                phase: EnginePhase::Accepting,
                total: 0,
                busy: Duration::ZERO,
            })),
            hash_ready: Arc::new(Condvar::new()),
            drain_progress: Arc::new(Condvar::new()),
            compute_delay,
        }
    }

    /// Encola una contraseña y devuelve su id
    ///
    /// Los ids son enteros densos que arrancan en 1 y se asignan en orden
    /// de llegada; nunca se reusan ni se saltan. Si la contraseña ya fue
    /// enviada antes (aunque su cómputo siga en vuelo), se devuelve el id
    /// existente sin encolar trabajo duplicado.
    ///
    /// # Errores
    ///
    /// Retorna [`EngineError::ShuttingDown`] si ya se pidió el apagado:
    /// después del drain no se asigna ningún id nuevo.
    pub fn submit(&self, value: &str) -> Result<usize, EngineError> {
        let start = Instant::now();
        let mut state = self.state.lock().unwrap();

        if state.phase != EnginePhase::Accepting {
            return Err(EngineError::ShuttingDown);
        }

        if let Some(&id) = state.value_to_id.get(value) {
            // Ya la vimos: mismo id, sin trabajo nuevo. El submit repetido
            // también cuenta para las estadísticas.
            state.total += 1;
            state.busy += start.elapsed();
            return Ok(id);
        }

        // Contraseña nueva: reservar slot pendiente e indexarla, como un
        // solo cambio atómico bajo el lock
        state.slots.push(None);
        let id = state.slots.len();
        state.value_to_id.insert(value.to_string(), id);
        state.outstanding += 1;

        state.total += 1;
        state.busy += start.elapsed();
        drop(state);

        // El cómputo corre desacoplado del request que lo disparó
        let engine = self.clone();
        let value = value.to_string();
        thread::spawn(move || engine.compute(id, &value));

        Ok(id)
    }

    /// Cómputo en background de un trabajo
    ///
    /// Hashea fuera del lock, guarda el resultado bajo el lock y despierta
    /// con broadcast a todos los lookups bloqueados. No tiene modo de falla:
    /// todo slot reservado termina lleno.
    fn compute(&self, id: usize, value: &str) {
        let start = Instant::now();

        // Simular que el hashing tarda (fuera de la sección crítica)
        if !self.compute_delay.is_zero() {
            thread::sleep(self.compute_delay);
        }
        let encoded = digest::hash_encode(value);

        let mut state = self.state.lock().unwrap();

        let slot = &mut state.slots[id - 1];
        if slot.is_some() {
            // Cada slot se escribe una sola vez: llegar acá es un bug de
            // lógica, no una condición recuperable
            panic!("slot {} ya tenía resultado", id);
        }
        *slot = Some(encoded);

        state.busy += start.elapsed();
        state.outstanding -= 1;

        // Despertar a TODOS los que esperan un hash: cada uno re-verifica
        // su propio slot
        self.hash_ready.notify_all();

        if state.outstanding == 0 && state.phase == EnginePhase::Draining {
            self.drain_progress.notify_all();
        }
    }

    /// Busca el hash de un id, bloqueando si el cómputo sigue en vuelo
    ///
    /// Mientras el slot esté pendiente, el thread espera en la condvar
    /// (soltando el lock) y re-verifica el slot en cada despertar: un
    /// broadcast por el id 3 no debe liberar a quien espera el id 7.
    ///
    /// La espera no tiene límite de tiempo: "consultar" implica esperar a
    /// que el resultado exista. Si el caller necesita una cota, la aplica
    /// en la capa de transporte.
    ///
    /// # Errores
    ///
    /// Retorna [`EngineError::UnknownId`] si el id es 0 o mayor que el
    /// último id asignado. En ese caso no bloquea.
    pub fn lookup(&self, id: usize) -> Result<String, EngineError> {
        let mut state = self.state.lock().unwrap();

        if id == 0 || id > state.slots.len() {
            return Err(EngineError::UnknownId(id));
        }

        loop {
            if let Some(hash) = &state.slots[id - 1] {
                return Ok(hash.clone());
            }
            // wait() suelta el lock mientras duerme y lo retoma al despertar
            state = self.hash_ready.wait(state).unwrap();
        }
    }

    /// Solicita el apagado gracioso
    ///
    /// Pasa el motor a `Draining`: los submits nuevos se rechazan, el
    /// trabajo en vuelo termina normalmente. Llamadas repetidas no hacen
    /// nada. Nunca se aborta un cómputo a mitad de camino.
    pub fn drain(&self) {
        let mut state = self.state.lock().unwrap();
        if state.phase == EnginePhase::Accepting {
            state.phase = EnginePhase::Draining;
            // Despertar al monitor aunque todavía quede trabajo: tiene que
            // enterarse de que el drain arrancó
            self.drain_progress.notify_all();
        }
    }

    /// Bloquea hasta que alguien solicite el drain
    ///
    /// La espera del monitor de apagado tiene dos partes: primero esperar
    /// (sin límite) a que el drain arranque, y recién después esperar a que
    /// el trabajo pendiente termine, eso sí con período de gracia.
    pub fn wait_draining(&self) {
        let mut state = self.state.lock().unwrap();
        while state.phase == EnginePhase::Accepting {
            state = self.drain_progress.wait(state).unwrap();
        }
    }

    /// Bloquea hasta que el drain complete (sin límite de tiempo)
    ///
    /// Completa cuando se pidió el drain y el contador de trabajo pendiente
    /// llegó a cero; ahí el motor queda en `Stopped`. Garantía: todo cómputo
    /// registrado antes del drain ya guardó su resultado.
    pub fn wait_drained(&self) {
        let mut state = self.state.lock().unwrap();
        while state.phase == EnginePhase::Accepting || state.outstanding > 0 {
            state = self.drain_progress.wait(state).unwrap();
        }
        state.phase = EnginePhase::Stopped;
    }

    /// Como [`wait_drained`](Self::wait_drained) pero con límite de tiempo
    ///
    /// Retorna `true` si el drain completó dentro del plazo, `false` si se
    /// agotó el tiempo con trabajo todavía en vuelo. Qué hacer en ese caso
    /// (log fatal, abortar el proceso) es política del servidor, no del
    /// motor.
    pub fn wait_drained_timeout(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut state = self.state.lock().unwrap();
        while state.phase == EnginePhase::Accepting || state.outstanding > 0 {
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            let (guard, _) = self
                .drain_progress
                .wait_timeout(state, deadline - now)
                .unwrap();
            state = guard;
        }
        state.phase = EnginePhase::Stopped;
        true
    }

    /// Registra un request abierto en el contador de trabajo pendiente
    ///
    /// El guard devuelto mantiene vivo el drain hasta que el request termine
    /// de escribirse: así la respuesta del propio `/shutdown` llega al
    /// cliente antes de que el proceso muera. Se des-registra solo, al
    /// soltarse.
    pub fn begin_request(&self) -> RequestGuard {
        let mut state = self.state.lock().unwrap();
        state.outstanding += 1;
        RequestGuard {
            engine: self.clone(),
        }
    }

    /// Snapshot consistente de las estadísticas
    pub fn stats(&self) -> EngineStats {
        let state = self.state.lock().unwrap();
        let average = if state.total == 0 {
            0
        } else {
            state.busy.as_millis() as u64 / state.total
        };
        EngineStats {
            total: state.total,
            average,
        }
    }
}

impl Clone for HashEngine {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            hash_ready: Arc::clone(&self.hash_ready),
            drain_progress: Arc::clone(&self.drain_progress),
            compute_delay: self.compute_delay,
        }
    }
}

/// Registro RAII de un request abierto
///
/// Mientras exista, el drain no puede completar. Ver
/// [`HashEngine::begin_request`].
pub struct RequestGuard {
    engine: HashEngine,
}

impl Drop for RequestGuard {
    fn drop(&mut self) {
        let mut state = self.engine.state.lock().unwrap();
        state.outstanding -= 1;
        if state.outstanding == 0 && state.phase == EnginePhase::Draining {
            self.engine.drain_progress.notify_all();
        }
    }
}

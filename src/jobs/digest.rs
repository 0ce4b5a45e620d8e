//! # Digest de Contraseñas
//! src/jobs/digest.rs
//!
//! SHA-512 sobre los bytes de la contraseña, codificado en Base64 estándar.

use base64::engine::general_purpose::STANDARD as B64;
use base64::Engine as _;
use sha2::{Digest, Sha512};

/// Calcula el hash SHA-512 de `value` y lo codifica en Base64
///
/// # Ejemplo
/// ```
/// use hash_server::jobs::digest::hash_encode;
///
/// let hash = hash_encode("angryMonkey");
/// assert!(hash.starts_with("ZEHhWB65"));
/// ```
pub fn hash_encode(value: &str) -> String {
    B64.encode(Sha512::digest(value.as_bytes()))
}

//! # Extracción de Campos de Formulario
//! src/http/form.rs
//!
//! Lectura de campos en bodies `application/x-www-form-urlencoded`, del
//! estilo `foo=bar&password=angryMonkey&what=ever`.
//!
//! La comparación de la clave es exacta y sensible a mayúsculas, y gana la
//! primera ocurrencia.

/// Busca el valor del campo `name` en un body de formulario
///
/// Retorna `None` si el campo no aparece. Un campo presente pero vacío
/// (`password=`) retorna `Some("")`: decidir si eso es válido le toca al
/// handler.
///
/// # Ejemplo
/// ```
/// use hash_server::http::form;
///
/// let body = "foo=bar&password=angryMonkey&what=ever";
/// assert_eq!(form::field(body, "password"), Some("angryMonkey"));
/// assert_eq!(form::field(body, "missing"), None);
/// ```
pub fn field<'a>(body: &'a str, name: &str) -> Option<&'a str> {
    body.split('&').find_map(|pair| {
        let (key, value) = pair.split_once('=')?;
        if key == name {
            Some(value)
        } else {
            None
        }
    })
}

// src/services/mod.rs
pub mod auth_service;
pub mod paciente_service;
pub mod pdf_service;
pub mod planilla_service;
pub mod protesis_service;
pub mod reporte_service;
pub mod user_service;

/// Patrón `LIKE` de subcadena con `%`, `_` y `\` escapados.
/// Se usa siempre con `ESCAPE '\'` en la consulta.
pub fn patron_contiene(texto: &str) -> String {
    let mut patron = String::with_capacity(texto.len() + 2);
    patron.push('%');
    for c in texto.chars() {
        if matches!(c, '%' | '_' | '\\') {
            patron.push('\\');
        }
        patron.push(c);
    }
    patron.push('%');
    patron
}

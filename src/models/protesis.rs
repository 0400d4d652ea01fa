// src/models/protesis.rs
use chrono::NaiveDate;
use serde::Deserialize;
use sqlx::FromRow;

// --- Formularios ---

#[derive(Debug, Deserialize)]
pub struct AsignarProtesisForm {
    pub tipo: String,
    pub fabricante: String,
    pub fecha_asignacion: NaiveDate,
    pub id_paciente: i64,
}

#[derive(Debug, Deserialize)]
pub struct RegistrarRevisionForm {
    pub id_protesis: i64,
    pub fecha: NaiveDate,
    pub estado: String,
    #[serde(default)]
    pub observaciones: String,
    pub puntaje: f64,
}

#[derive(Debug, Default, Deserialize)]
pub struct HistorialParams {
    pub id_protesis: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct EstadoParams {
    pub estado: Option<String>,
}

// --- Filas de las consultas ---

#[derive(Debug, Clone, FromRow, PartialEq)]
pub struct Revision {
    pub id: i64,
    pub id_protesis: i64,
    pub fecha: NaiveDate,
    pub estado: String,
    pub observaciones: String,
    pub puntaje: f64,
}

/// Listado de /protesis: prótesis con los datos de su paciente.
#[derive(Debug, Clone, FromRow)]
pub struct ProtesisConPaciente {
    pub id: i64,
    pub tipo: String,
    pub fabricante: String,
    pub fecha_asignacion: NaiveDate,
    pub nombre_paciente: String,
    pub apellido_paciente: String,
    pub email: String,
    pub fecha_registro: String,
}

/// Prótesis cuya revisión supera el promedio general.
#[derive(Debug, Clone, FromRow, PartialEq)]
pub struct ProtesisPuntaje {
    pub id: i64,
    pub tipo: String,
    pub puntaje: f64,
    pub fecha_revision: NaiveDate,
}

#[derive(Debug, Clone, FromRow, PartialEq)]
pub struct ProtesisConteo {
    pub id: i64,
    pub tipo: String,
    pub fabricante: String,
    pub total_revisiones: i64,
}

#[derive(Debug, Clone, FromRow, PartialEq)]
pub struct ProtesisEstado {
    pub id: i64,
    pub tipo: String,
    pub fabricante: String,
    pub fecha: NaiveDate,
    pub estado: String,
}

/// Fila de la vista `vista_pacientes`; sin revisiones los campos quedan vacíos.
#[derive(Debug, Clone, FromRow)]
pub struct VistaPaciente {
    pub id_paciente: i64,
    pub nombre: String,
    pub apellido: String,
    pub tipo: String,
    pub fecha: Option<NaiveDate>,
    pub estado: Option<String>,
    pub observaciones: Option<String>,
}

/// Convierte el parámetro `id_protesis` del historial en un filtro exacto.
pub fn parse_id_protesis(params: &HistorialParams) -> Result<Option<i64>, String> {
    match params.id_protesis.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(raw) => raw
            .parse::<i64>()
            .map(Some)
            .map_err(|_| format!("Id de prótesis inválido: '{}'", raw)),
    }
}

// src/models/archivo.rs
use chrono::{NaiveDate, NaiveDateTime};
use serde::Deserialize;
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct ArchivoPdf {
    pub id: i64,
    pub nombre_original: String,
    pub ruta_archivo: String,
    pub fecha_subida: NaiveDateTime,
}

#[derive(Debug, Deserialize)]
pub struct DescargarPdfForm {
    pub id: i64,
}

/// Fila de la planilla de pacientes, antes de validar.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilaPlanilla {
    /// Número de fila en la hoja (1 = cabecera).
    pub fila: u32,
    pub name: String,
    pub last_name: String,
    pub email: String,
    pub birthday: Option<NaiveDate>,
}

/// Resultado de importar una fila.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultadoFila {
    Insertado { id: i64 },
    Fallido { motivo: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultadoImportacion {
    pub fila: u32,
    pub resultado: ResultadoFila,
}

impl ResultadoImportacion {
    pub fn ok(&self) -> bool {
        matches!(self.resultado, ResultadoFila::Insertado { .. })
    }

    pub fn detalle(&self) -> String {
        match &self.resultado {
            ResultadoFila::Insertado { id } => format!("Paciente #{} creado", id),
            ResultadoFila::Fallido { motivo } => motivo.clone(),
        }
    }
}

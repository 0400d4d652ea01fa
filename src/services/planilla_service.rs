// src/services/planilla_service.rs
//! Importación y exportación de pacientes en planillas `.xlsx`.
use crate::{
    error::{AppError, AppResult},
    models::{
        archivo::{FilaPlanilla, ResultadoFila, ResultadoImportacion},
        paciente::{NuevoPaciente, Paciente},
    },
    services::paciente_service,
};
use calamine::{open_workbook_auto_from_rs, Data, Reader};
use chrono::{Duration, NaiveDate};
use rust_xlsxwriter::Workbook;
use sqlx::SqlitePool;
use std::{io::Cursor, path::Path};

pub const HOJA_PACIENTES: &str = "Pacientes";
pub const NOMBRE_EXPORTACION: &str = "pacientes.xlsx";

const COLUMNAS_EXPORTACION: [&str; 6] = ["id", "name", "last_name", "email", "birthday", "fecha_registro"];

// --- Lectura ---

/// Lee la primera hoja. La fila 1 es la cabecera y decide qué columna es
/// cada campo; las columnas desconocidas se ignoran.
pub fn leer_planilla(bytes: Vec<u8>) -> AppResult<Vec<FilaPlanilla>> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))
        .map_err(|e| AppError::Transfer(format!("Planilla ilegible: {}", e)))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| AppError::Transfer("La planilla no tiene hojas".to_string()))?
        .map_err(|e| AppError::Transfer(format!("Error al leer la hoja: {}", e)))?;

    // Cabecera: nombre de columna -> posición
    let mut rows = range.rows();
    let cabecera: Vec<String> = match rows.next() {
        Some(cells) => cells.iter().map(|c| texto(c).to_ascii_lowercase()).collect(),
        None => return Ok(Vec::new()),
    };
    let columna = |nombre: &str| cabecera.iter().position(|c| c == nombre);
    let (c_name, c_last, c_email, c_birth) =
        (columna("name"), columna("last_name"), columna("email"), columna("birthday"));

    let celda = |cells: &[Data], idx: Option<usize>| -> Option<Data> {
        idx.and_then(|i| cells.get(i)).cloned()
    };

    // Datos: las filas vacías se saltan
    let mut filas = Vec::new();
    for (i, cells) in rows.enumerate() {
        if cells.iter().all(|c| matches!(c, Data::Empty)) {
            continue;
        }
        filas.push(FilaPlanilla {
            fila: i as u32 + 2,
            name: celda(cells, c_name).map(|c| texto(&c)).unwrap_or_default(),
            last_name: celda(cells, c_last).map(|c| texto(&c)).unwrap_or_default(),
            email: celda(cells, c_email).map(|c| texto(&c)).unwrap_or_default(),
            birthday: celda(cells, c_birth).and_then(|c| fecha(&c)),
        });
    }
    Ok(filas)
}

fn texto(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.trim().to_string(),
        Data::Empty => String::new(),
        other => other.to_string().trim().to_string(),
    }
}

fn fecha(cell: &Data) -> Option<NaiveDate> {
    match cell {
        Data::DateTime(dt) => dt.as_datetime().map(|d| d.date()),
        Data::DateTimeIso(s) | Data::String(s) => {
            let s = s.trim();
            NaiveDate::parse_from_str(s.get(..10).unwrap_or(s), "%Y-%m-%d").ok()
        }
        // Número de serie de Excel (días desde 1899-12-30)
        Data::Float(f) => NaiveDate::from_ymd_opt(1899, 12, 30)?.checked_add_signed(Duration::days(*f as i64)),
        Data::Int(n) => NaiveDate::from_ymd_opt(1899, 12, 30)?.checked_add_signed(Duration::days(*n)),
        _ => None,
    }
}

/// Valida una fila y la convierte en paciente.
pub fn validar_fila(fila: &FilaPlanilla) -> Result<NuevoPaciente, String> {
    let nacimiento = fila
        .birthday
        .ok_or_else(|| "Fecha de nacimiento ausente o inválida".to_string())?;
    NuevoPaciente::new(&fila.name, &fila.last_name, &fila.email, nacimiento)
}

/// Inserta cada fila por separado; una fila fallida no detiene a las demás.
pub async fn importar_pacientes(db_pool: &SqlitePool, filas: &[FilaPlanilla]) -> Vec<ResultadoImportacion> {
    let mut resultados = Vec::with_capacity(filas.len());
    for fila in filas {
        let resultado = match validar_fila(fila) {
            Err(motivo) => ResultadoFila::Fallido { motivo },
            Ok(paciente) => match paciente_service::crear_paciente(db_pool, &paciente).await {
                Ok(id) => ResultadoFila::Insertado { id },
                Err(e) => {
                    tracing::warn!("Fila {} no importada: {}", fila.fila, e);
                    ResultadoFila::Fallido { motivo: e.to_string() }
                }
            },
        };
        resultados.push(ResultadoImportacion { fila: fila.fila, resultado });
    }

    let ok = resultados.iter().filter(|r| r.ok()).count();
    tracing::info!("Importación: {} de {} filas insertadas", ok, resultados.len());
    resultados
}

// --- Escritura ---

pub fn escribir_planilla(pacientes: &[Paciente]) -> AppResult<Vec<u8>> {
    let xlsx_err = |e: rust_xlsxwriter::XlsxError| AppError::Transfer(format!("Error al generar la planilla: {}", e));

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(HOJA_PACIENTES).map_err(xlsx_err)?;

    for (col, titulo) in COLUMNAS_EXPORTACION.iter().enumerate() {
        worksheet.write_string(0, col as u16, *titulo).map_err(xlsx_err)?;
    }

    for (i, p) in pacientes.iter().enumerate() {
        let row = i as u32 + 1;
        worksheet.write_number(row, 0, p.id as f64).map_err(xlsx_err)?;
        worksheet.write_string(row, 1, &p.nombre).map_err(xlsx_err)?;
        worksheet.write_string(row, 2, &p.apellido).map_err(xlsx_err)?;
        worksheet.write_string(row, 3, &p.email).map_err(xlsx_err)?;
        worksheet
            .write_string(row, 4, p.fecha_nacimiento.format("%Y-%m-%d").to_string())
            .map_err(xlsx_err)?;
        worksheet
            .write_string(row, 5, p.fecha_registro.format("%Y-%m-%d %H:%M:%S").to_string())
            .map_err(xlsx_err)?;
    }

    workbook.save_to_buffer().map_err(xlsx_err)
}

/// Exporta todos los pacientes, deja una copia en `destino` y devuelve los bytes.
pub async fn exportar_pacientes(db_pool: &SqlitePool, destino: &Path) -> AppResult<Vec<u8>> {
    let pacientes = paciente_service::listar_pacientes(db_pool).await?;
    let total = pacientes.len();

    let bytes = tokio::task::spawn_blocking(move || escribir_planilla(&pacientes))
        .await
        .map_err(|e| {
            tracing::error!("Error en la tarea spawn_blocking (escribir_planilla): {:?}", e);
            AppError::InternalServerError
        })??;

    if let Some(dir) = destino.parent() {
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|e| AppError::Transfer(format!("No se pudo crear {}: {}", dir.display(), e)))?;
    }
    tokio::fs::write(destino, &bytes)
        .await
        .map_err(|e| AppError::Transfer(format!("No se pudo escribir {}: {}", destino.display(), e)))?;

    tracing::info!("📤 {} pacientes exportados a {}", total, destino.display());
    Ok(bytes)
}

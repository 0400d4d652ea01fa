// src/services/pdf_service.rs
use crate::{
    error::{AppError, AppResult},
    models::archivo::ArchivoPdf,
};
use sqlx::SqlitePool;
use std::path::{Path, PathBuf};
use tokio::fs::File;
use uuid::Uuid;

/// Ruta nueva y única para guardar un PDF subido.
pub fn ruta_para_subida(upload_dir: &Path) -> PathBuf {
    upload_dir.join(format!("{}.pdf", Uuid::new_v4()))
}

/// Quita directorios y caracteres de control del nombre que manda el navegador.
pub fn nombre_seguro(original: &str) -> String {
    let base = original.rsplit(['/', '\\']).next().unwrap_or_default();
    let limpio: String = base.chars().filter(|c| !c.is_control()).collect();
    let limpio = limpio.trim();
    if limpio.is_empty() {
        "documento.pdf".to_string()
    } else {
        limpio.to_string()
    }
}

pub async fn registrar_pdf(db_pool: &SqlitePool, nombre_original: &str, ruta: &Path) -> AppResult<i64> {
    let id = sqlx::query("INSERT INTO archivos_pdf (nombre_original, ruta_archivo) VALUES (?1, ?2)")
        .bind(nombre_original)
        .bind(ruta.to_string_lossy().into_owned())
        .execute(db_pool)
        .await?
        .last_insert_rowid();
    tracing::info!("📄 PDF #{} '{}' guardado en {}", id, nombre_original, ruta.display());
    Ok(id)
}

pub async fn listar_pdfs(db_pool: &SqlitePool) -> AppResult<Vec<ArchivoPdf>> {
    let archivos = sqlx::query_as::<_, ArchivoPdf>(
        "SELECT id, nombre_original, ruta_archivo, fecha_subida FROM archivos_pdf ORDER BY id ASC",
    )
    .fetch_all(db_pool)
    .await?;
    Ok(archivos)
}

pub async fn buscar_pdf(db_pool: &SqlitePool, id: i64) -> AppResult<ArchivoPdf> {
    sqlx::query_as::<_, ArchivoPdf>(
        "SELECT id, nombre_original, ruta_archivo, fecha_subida FROM archivos_pdf WHERE id = ?1",
    )
    .bind(id)
    .fetch_optional(db_pool)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Archivo #{}", id)))
}

/// PDF abierto para enviarlo por trozos.
#[derive(Debug)]
pub struct PdfAbierto {
    pub nombre_original: String,
    pub archivo: File,
    pub tamano: u64,
}

/// Abre el PDF `id` del disco sin cargarlo en memoria.
pub async fn abrir_pdf(db_pool: &SqlitePool, id: i64) -> AppResult<PdfAbierto> {
    let registro = buscar_pdf(db_pool, id).await?;
    let no_legible = |e: std::io::Error| {
        AppError::Transfer(format!("No se pudo leer {}: {}", registro.ruta_archivo, e))
    };

    let archivo = File::open(&registro.ruta_archivo).await.map_err(no_legible)?;
    let tamano = archivo.metadata().await.map_err(no_legible)?.len();

    Ok(PdfAbierto {
        nombre_original: registro.nombre_original.clone(),
        archivo,
        tamano,
    })
}

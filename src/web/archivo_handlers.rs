// src/web/archivo_handlers.rs
use crate::{
    error::{AppError, AppResult},
    models::archivo::DescargarPdfForm,
    services::{pdf_service, planilla_service},
    state::AppState,
    templates::{render, ImportacionPage, MensajePage, PdfsPage},
};
use axum::{
    body::Body,
    extract::{multipart::MultipartError, Form, Multipart, State},
    http::header,
    response::{Html, IntoResponse, Response},
};
use tokio::io::AsyncWriteExt;
use tokio_util::io::ReaderStream;

pub const CAMPO_PLANILLA: &str = "excelFile";
pub const CAMPO_PDF: &str = "pdf";
pub const MIME_XLSX: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

fn multipart_err(e: MultipartError) -> AppError {
    AppError::Transfer(format!("Formulario de subida inválido: {}", e))
}

fn io_err(contexto: &str) -> impl Fn(std::io::Error) -> AppError + '_ {
    move |e| AppError::Transfer(format!("{}: {}", contexto, e))
}

// POST /upload (multipart, campo excelFile)
pub async fn importar_planilla(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<Html<String>> {
    // --- 1. Buscar el campo del archivo ---
    let mut contenido = None;
    while let Some(field) = multipart.next_field().await.map_err(multipart_err)? {
        if field.name() == Some(CAMPO_PLANILLA) {
            let nombre = field.file_name().unwrap_or("(sin nombre)").to_string();
            let bytes = field.bytes().await.map_err(multipart_err)?;
            tracing::info!("📥 Planilla '{}' recibida ({} bytes)", nombre, bytes.len());
            contenido = Some(bytes.to_vec());
            break;
        }
    }
    let bytes = contenido
        .ok_or_else(|| AppError::Validation(format!("Falta el archivo '{}'", CAMPO_PLANILLA)))?;

    // --- 2. Leer la hoja (calamine es bloqueante) ---
    let filas = tokio::task::spawn_blocking(move || planilla_service::leer_planilla(bytes))
        .await
        .map_err(|e| {
            tracing::error!("Error en la tarea spawn_blocking (leer_planilla): {:?}", e);
            AppError::InternalServerError
        })??;

    // --- 3. Insertar fila a fila y mostrar el informe ---
    let resultados = planilla_service::importar_pacientes(&state.db_pool, &filas).await;
    render(&ImportacionPage { resultados: &resultados })
}

// GET /download
pub async fn exportar_planilla(State(state): State<AppState>) -> AppResult<Response> {
    let destino = state.config.upload_dir.join(planilla_service::NOMBRE_EXPORTACION);
    let bytes = planilla_service::exportar_pacientes(&state.db_pool, &destino).await?;
    let disposition = format!(
        "attachment; filename=\"{}\"",
        planilla_service::NOMBRE_EXPORTACION
    );
    Ok((
        [
            (header::CONTENT_TYPE, MIME_XLSX.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    )
        .into_response())
}

// POST /subir-pdf (multipart, campo pdf)
pub async fn subir_pdf(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<Html<String>> {
    let upload_dir = &state.config.upload_dir;

    while let Some(mut field) = multipart.next_field().await.map_err(multipart_err)? {
        // Otros campos del formulario se ignoran
        if field.name() != Some(CAMPO_PDF) {
            continue;
        }

        // --- 1. Preparar destino ---
        let nombre = pdf_service::nombre_seguro(field.file_name().unwrap_or_default());
        tokio::fs::create_dir_all(upload_dir)
            .await
            .map_err(io_err("No se pudo crear el directorio de subidas"))?;
        let ruta = pdf_service::ruta_para_subida(upload_dir);

        // --- 2. Copiar por trozos y registrar ---
        let mut archivo = tokio::fs::File::create(&ruta)
            .await
            .map_err(io_err("No se pudo crear el archivo"))?;
        let copia: AppResult<i64> = async {
            while let Some(chunk) = field.chunk().await.map_err(multipart_err)? {
                archivo
                    .write_all(&chunk)
                    .await
                    .map_err(io_err("Error al escribir el PDF"))?;
            }
            archivo.flush().await.map_err(io_err("Error al escribir el PDF"))?;
            pdf_service::registrar_pdf(&state.db_pool, &nombre, &ruta).await
        }
        .await;

        // --- 3. Si algo falló, no dejar archivos huérfanos ---
        if let Err(e) = copia {
            tracing::error!("Subida de '{}' fallida: {}", nombre, e);
            let _ = tokio::fs::remove_file(&ruta).await;
            return Err(e);
        }
        return render(&MensajePage { titulo: "PDF subido correctamente" });
    }

    Err(AppError::Validation(format!("Falta el archivo '{}'", CAMPO_PDF)))
}

// GET /ver-pdf
pub async fn listar_pdfs(State(state): State<AppState>) -> AppResult<Html<String>> {
    let archivos = pdf_service::listar_pdfs(&state.db_pool).await?;
    render(&PdfsPage { archivos: &archivos })
}

// POST /download-pdf
pub async fn descargar_pdf(
    State(state): State<AppState>,
    Form(form): Form<DescargarPdfForm>,
) -> AppResult<Response> {
    let pdf = pdf_service::abrir_pdf(&state.db_pool, form.id).await?;
    tracing::info!("📄 Descarga del PDF #{} '{}' ({} bytes)", form.id, pdf.nombre_original, pdf.tamano);

    // Nombre original en UTF-8 (RFC 5987)
    let disposition = format!(
        "attachment; filename*=UTF-8''{}",
        urlencoding::encode(&pdf.nombre_original)
    );
    // El archivo sale por trozos, nunca entero en memoria
    let body = Body::from_stream(ReaderStream::new(pdf.archivo));

    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (header::CONTENT_LENGTH, pdf.tamano.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response())
}

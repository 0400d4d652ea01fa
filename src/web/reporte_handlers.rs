// src/web/reporte_handlers.rs
//! Informes de solo lectura.
use crate::{
    error::AppResult,
    models::protesis::EstadoParams,
    services::reporte_service,
    templates::{render, EstadoPage, MayorPromedioPage, NumeroRevisionesPage, PromedioPage, ProtesisPage, VistaPage},
};
use axum::{
    extract::{Query, State},
    response::Html,
};
use sqlx::SqlitePool;

// GET /prom-puntaje
pub async fn promedio_puntaje(State(db_pool): State<SqlitePool>) -> AppResult<Html<String>> {
    let promedio = reporte_service::promedio_puntaje(&db_pool).await?;
    render(&PromedioPage { promedio })
}

// GET /mayor-promedio
pub async fn mayor_promedio(State(db_pool): State<SqlitePool>) -> AppResult<Html<String>> {
    let filas = reporte_service::mayor_promedio(&db_pool).await?;
    render(&MayorPromedioPage { filas: &filas })
}

// GET /numero-revisiones
pub async fn numero_revisiones(State(db_pool): State<SqlitePool>) -> AppResult<Html<String>> {
    let filas = reporte_service::numero_revisiones(&db_pool).await?;
    render(&NumeroRevisionesPage { filas: &filas })
}

// GET /estado?estado=
pub async fn por_estado(
    State(db_pool): State<SqlitePool>,
    Query(params): Query<EstadoParams>,
) -> AppResult<Html<String>> {
    let estado = params.estado.as_deref().map(str::trim).filter(|e| !e.is_empty());
    let filas = reporte_service::por_estado(&db_pool, estado).await?;
    render(&EstadoPage { filas: &filas, estado: estado.unwrap_or_default() })
}

// GET /protesis
pub async fn listar_protesis(State(db_pool): State<SqlitePool>) -> AppResult<Html<String>> {
    let filas = reporte_service::protesis_con_paciente(&db_pool).await?;
    render(&ProtesisPage { filas: &filas })
}

// GET /vista
pub async fn vista_pacientes(State(db_pool): State<SqlitePool>) -> AppResult<Html<String>> {
    let filas = reporte_service::vista_pacientes(&db_pool).await?;
    render(&VistaPage { filas: &filas })
}

// src/services/reporte_service.rs
//! Consultas de solo lectura para los reportes. Devuelven filas tipadas;
//! el HTML lo arma `templates`.
use crate::{
    error::AppResult,
    models::protesis::{ProtesisConPaciente, ProtesisConteo, ProtesisEstado, ProtesisPuntaje, VistaPaciente},
};
use sqlx::SqlitePool;

/// Promedio de todos los puntajes; `None` si no hay revisiones.
pub async fn promedio_puntaje(db_pool: &SqlitePool) -> AppResult<Option<f64>> {
    let promedio: Option<f64> = sqlx::query_scalar("SELECT AVG(puntaje) FROM revisiones")
        .fetch_one(db_pool)
        .await?;
    Ok(promedio)
}

/// Revisiones con puntaje estrictamente mayor al promedio general.
pub async fn mayor_promedio(db_pool: &SqlitePool) -> AppResult<Vec<ProtesisPuntaje>> {
    let filas = sqlx::query_as::<_, ProtesisPuntaje>(
        r#"
        SELECT protesis.id, protesis.tipo, revisiones.puntaje AS puntaje, revisiones.fecha AS fecha_revision
        FROM protesis
        JOIN revisiones ON protesis.id = revisiones.id_protesis
        WHERE revisiones.puntaje > (SELECT AVG(puntaje) FROM revisiones)
        ORDER BY revisiones.puntaje DESC, protesis.id ASC
        "#,
    )
    .fetch_all(db_pool)
    .await?;
    Ok(filas)
}

pub async fn numero_revisiones(db_pool: &SqlitePool) -> AppResult<Vec<ProtesisConteo>> {
    let filas = sqlx::query_as::<_, ProtesisConteo>(
        r#"
        SELECT protesis.id, protesis.tipo, protesis.fabricante, COUNT(revisiones.id) AS total_revisiones
        FROM protesis
        JOIN revisiones ON protesis.id = revisiones.id_protesis
        GROUP BY protesis.id, protesis.tipo, protesis.fabricante
        ORDER BY total_revisiones DESC, protesis.id ASC
        "#,
    )
    .fetch_all(db_pool)
    .await?;
    Ok(filas)
}

/// Revisiones cuyo estado contiene `estado` (todas si viene vacío).
pub async fn por_estado(db_pool: &SqlitePool, estado: Option<&str>) -> AppResult<Vec<ProtesisEstado>> {
    let patron = estado
        .map(str::trim)
        .filter(|e| !e.is_empty())
        .map(super::patron_contiene);

    let filas = sqlx::query_as::<_, ProtesisEstado>(
        r#"
        SELECT protesis.id, protesis.tipo, protesis.fabricante, revisiones.fecha, revisiones.estado
        FROM protesis
        JOIN revisiones ON protesis.id = revisiones.id_protesis
        WHERE ?1 IS NULL OR revisiones.estado LIKE ?1 ESCAPE '\'
        ORDER BY revisiones.fecha ASC, protesis.id ASC
        "#,
    )
    .bind(patron)
    .fetch_all(db_pool)
    .await?;
    Ok(filas)
}

pub async fn protesis_con_paciente(db_pool: &SqlitePool) -> AppResult<Vec<ProtesisConPaciente>> {
    let filas = sqlx::query_as::<_, ProtesisConPaciente>(
        r#"
        SELECT protesis.id, protesis.tipo, protesis.fabricante, protesis.fecha_asignacion,
               pacientes.nombre AS nombre_paciente, pacientes.apellido AS apellido_paciente,
               pacientes.email AS email, pacientes.fecha_registro AS fecha_registro
        FROM protesis
        JOIN pacientes ON protesis.id_paciente = pacientes.id
        ORDER BY protesis.id ASC
        "#,
    )
    .fetch_all(db_pool)
    .await?;
    Ok(filas)
}

pub async fn vista_pacientes(db_pool: &SqlitePool) -> AppResult<Vec<VistaPaciente>> {
    let filas = sqlx::query_as::<_, VistaPaciente>(
        r#"
        SELECT id_paciente, nombre, apellido, tipo, fecha, estado, observaciones
        FROM vista_pacientes
        ORDER BY id_paciente ASC, tipo ASC
        "#,
    )
    .fetch_all(db_pool)
    .await?;
    Ok(filas)
}

// src/services/protesis_service.rs
use crate::{
    error::{AppError, AppResult},
    models::protesis::{AsignarProtesisForm, RegistrarRevisionForm, Revision},
};
use sqlx::SqlitePool;

/// Asigna una prótesis a un paciente. La existencia del paciente la
/// garantiza la clave foránea.
pub async fn asignar_protesis(db_pool: &SqlitePool, form: &AsignarProtesisForm) -> AppResult<i64> {
    let tipo = form.tipo.trim();
    let fabricante = form.fabricante.trim();
    if tipo.is_empty() || fabricante.is_empty() {
        return Err(AppError::Validation("El tipo y el fabricante son obligatorios.".to_string()));
    }

    let id = sqlx::query(
        r#"
        INSERT INTO protesis (tipo, fabricante, fecha_asignacion, id_paciente)
        VALUES (?1, ?2, ?3, ?4)
        "#,
    )
    .bind(tipo)
    .bind(fabricante)
    .bind(form.fecha_asignacion)
    .bind(form.id_paciente)
    .execute(db_pool)
    .await?
    .last_insert_rowid();

    tracing::info!("Prótesis #{} asignada al paciente #{}", id, form.id_paciente);
    Ok(id)
}

pub async fn eliminar_protesis(db_pool: &SqlitePool, id: i64) -> AppResult<()> {
    let rows_affected = sqlx::query("DELETE FROM protesis WHERE id = ?1")
        .bind(id)
        .execute(db_pool)
        .await?
        .rows_affected();

    if rows_affected == 0 {
        tracing::warn!("No se eliminó: prótesis #{} no existe.", id);
        return Err(AppError::NotFound(format!("Prótesis #{}", id)));
    }
    tracing::info!("🗑️ Prótesis #{} eliminada", id);
    Ok(())
}

pub async fn registrar_revision(db_pool: &SqlitePool, form: &RegistrarRevisionForm) -> AppResult<i64> {
    // 1. Validación (la prótesis la comprueba la clave foránea)
    let estado = form.estado.trim();
    if estado.is_empty() {
        return Err(AppError::Validation("El estado es obligatorio.".to_string()));
    }
    if !form.puntaje.is_finite() {
        return Err(AppError::Validation("El puntaje debe ser un número.".to_string()));
    }

    // 2. Inserción
    let id = sqlx::query(
        r#"
        INSERT INTO revisiones (id_protesis, fecha, estado, observaciones, puntaje)
        VALUES (?1, ?2, ?3, ?4, ?5)
        "#,
    )
    .bind(form.id_protesis)
    .bind(form.fecha)
    .bind(estado)
    .bind(form.observaciones.trim())
    .bind(form.puntaje)
    .execute(db_pool)
    .await?
    .last_insert_rowid();

    tracing::info!("Revisión #{} registrada para la prótesis #{}", id, form.id_protesis);
    Ok(id)
}

/// Historial de revisiones; con `id_protesis` solo las de esa prótesis.
pub async fn historial(db_pool: &SqlitePool, id_protesis: Option<i64>) -> AppResult<Vec<Revision>> {
    let revisiones = sqlx::query_as::<_, Revision>(
        r#"
        SELECT id, id_protesis, fecha, estado, observaciones, puntaje
        FROM revisiones
        WHERE ?1 IS NULL OR id_protesis = ?1
        ORDER BY fecha ASC, id ASC
        "#,
    )
    .bind(id_protesis)
    .fetch_all(db_pool)
    .await?;
    Ok(revisiones)
}

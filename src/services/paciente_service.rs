// src/services/paciente_service.rs
use crate::{
    error::{AppError, AppResult},
    models::paciente::{FiltroPacientes, NuevoPaciente, Paciente},
};
use chrono::{Months, NaiveDate};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

const SELECT_PACIENTES: &str =
    "SELECT id, nombre, apellido, email, fecha_nacimiento, fecha_registro FROM pacientes";

pub async fn crear_paciente(db_pool: &SqlitePool, paciente: &NuevoPaciente) -> AppResult<i64> {
    let id = sqlx::query(
        r#"
        INSERT INTO pacientes (nombre, apellido, email, fecha_nacimiento)
        VALUES (?1, ?2, ?3, ?4)
        "#,
    )
    .bind(&paciente.nombre)
    .bind(&paciente.apellido)
    .bind(&paciente.email)
    .bind(paciente.fecha_nacimiento)
    .execute(db_pool)
    .await?
    .last_insert_rowid();

    tracing::info!("Paciente #{} creado ({} {})", id, paciente.nombre, paciente.apellido);
    Ok(id)
}

/// Reemplaza todos los campos editables del paciente `id`.
pub async fn actualizar_paciente(db_pool: &SqlitePool, id: i64, paciente: &NuevoPaciente) -> AppResult<()> {
    let rows_affected = sqlx::query(
        r#"
        UPDATE pacientes
        SET nombre = ?1, apellido = ?2, email = ?3, fecha_nacimiento = ?4
        WHERE id = ?5
        "#,
    )
    .bind(&paciente.nombre)
    .bind(&paciente.apellido)
    .bind(&paciente.email)
    .bind(paciente.fecha_nacimiento)
    .bind(id)
    .execute(db_pool)
    .await?
    .rows_affected();

    if rows_affected == 0 {
        tracing::warn!("No se actualizó: paciente #{} no existe.", id);
        return Err(AppError::NotFound(format!("Paciente #{}", id)));
    }
    tracing::info!("✅ Paciente #{} actualizado", id);
    Ok(())
}

/// Borra el paciente `id`. Si tiene prótesis, la clave foránea lo impide.
pub async fn eliminar_paciente(db_pool: &SqlitePool, id: i64) -> AppResult<()> {
    let rows_affected = sqlx::query("DELETE FROM pacientes WHERE id = ?1")
        .bind(id)
        .execute(db_pool)
        .await?
        .rows_affected();

    if rows_affected == 0 {
        tracing::warn!("No se eliminó: paciente #{} no existe.", id);
        return Err(AppError::NotFound(format!("Paciente #{}", id)));
    }
    tracing::info!("🗑️ Paciente #{} eliminado", id);
    Ok(())
}

pub async fn listar_pacientes(db_pool: &SqlitePool) -> AppResult<Vec<Paciente>> {
    let pacientes = sqlx::query_as::<_, Paciente>(&format!("{} ORDER BY id ASC", SELECT_PACIENTES))
        .fetch_all(db_pool)
        .await?;
    Ok(pacientes)
}

/// Búsqueda con filtros opcionales combinados con AND.
pub async fn buscar_pacientes(
    db_pool: &SqlitePool,
    filtro: &FiltroPacientes,
    hoy: NaiveDate,
) -> AppResult<Vec<Paciente>> {
    let mut query = construir_busqueda(filtro, hoy)?;
    let pacientes = query.build_query_as::<Paciente>().fetch_all(db_pool).await?;
    tracing::debug!("Búsqueda {:?}: {} pacientes", filtro, pacientes.len());
    Ok(pacientes)
}

fn construir_busqueda(filtro: &FiltroPacientes, hoy: NaiveDate) -> AppResult<QueryBuilder<'static, Sqlite>> {
    let mut query = QueryBuilder::<Sqlite>::new(SELECT_PACIENTES);
    query.push(" WHERE 1=1");

    if let Some(nombre) = &filtro.nombre {
        query.push(" AND nombre LIKE ");
        query.push_bind(super::patron_contiene(nombre));
        query.push(" ESCAPE '\\'");
    }
    if let Some(edad) = filtro.edad {
        let (desde, hasta) = rango_nacimiento(edad, hoy)
            .ok_or_else(|| AppError::Validation(format!("Edad fuera de rango: {}", edad)))?;
        query.push(" AND fecha_nacimiento > ");
        query.push_bind(desde);
        query.push(" AND fecha_nacimiento <= ");
        query.push_bind(hasta);
    }
    query.push(" ORDER BY id ASC");
    Ok(query)
}

/// Ventana `(desde, hasta]` de fechas de nacimiento con edad exacta `edad` a `hoy`.
pub fn rango_nacimiento(edad: u32, hoy: NaiveDate) -> Option<(NaiveDate, NaiveDate)> {
    let hasta = hoy.checked_sub_months(Months::new(edad.checked_mul(12)?))?;
    let desde = hoy.checked_sub_months(Months::new(edad.checked_add(1)?.checked_mul(12)?))?;
    Some((desde, hasta))
}

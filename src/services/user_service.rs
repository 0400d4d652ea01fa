// src/services/user_service.rs
use crate::{
    error::{AppError, AppResult},
    models::user::{Role, Usuario, UsuarioResumen},
};
use sqlx::SqlitePool;

/// Rol asociado a un código de acceso, si el código existe.
pub async fn find_role_by_access_code(db_pool: &SqlitePool, code: &str) -> AppResult<Option<Role>> {
    tracing::debug!("Buscando código de acceso...");
    let tipo: Option<String> =
        sqlx::query_scalar("SELECT tipo_usuario FROM codigos_acceso WHERE codigo = ?1")
            .bind(code)
            .fetch_optional(db_pool)
            .await?;

    match tipo {
        Some(t) => t.parse::<Role>().map(Some).map_err(|e| {
            tracing::error!("Código de acceso con rol inválido: {}", e);
            AppError::InternalServerError
        }),
        None => Ok(None),
    }
}

pub async fn find_user_by_username(db_pool: &SqlitePool, username: &str) -> AppResult<Option<Usuario>> {
    tracing::debug!("Buscando usuario: {}", username);
    let user = sqlx::query_as::<_, Usuario>(
        r#"
        SELECT id, nombre_usuario, password_hash, tipo_usuario
        FROM usuarios
        WHERE nombre_usuario = ?1
        "#,
    )
    .bind(username)
    .fetch_optional(db_pool)
    .await?;

    if user.is_none() {
        tracing::debug!("Usuario '{}' no encontrado.", username);
    }
    Ok(user)
}

/// Inserta un usuario con un hash ya calculado.
pub async fn create_user(
    db_pool: &SqlitePool,
    username: &str,
    password_hash: &str,
    role: Role,
) -> AppResult<i64> {
    let result = sqlx::query(
        r#"
        INSERT INTO usuarios (nombre_usuario, password_hash, tipo_usuario)
        VALUES (?1, ?2, ?3)
        "#,
    )
    .bind(username)
    .bind(password_hash)
    .bind(role.as_str())
    .execute(db_pool)
    .await;

    match result {
        Ok(done) => Ok(done.last_insert_rowid()),
        // UNIQUE(nombre_usuario)
        Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
            tracing::warn!("No se creó el usuario: '{}' ya existe.", username);
            Err(AppError::Conflict(format!("El usuario '{}' ya existe.", username)))
        }
        Err(e) => Err(e.into()),
    }
}

/// Directorio completo, sin hashes.
pub async fn find_all_users(db_pool: &SqlitePool) -> AppResult<Vec<UsuarioResumen>> {
    let users = sqlx::query_as::<_, UsuarioResumen>(
        "SELECT id, nombre_usuario, tipo_usuario FROM usuarios ORDER BY id ASC",
    )
    .fetch_all(db_pool)
    .await?;
    tracing::debug!("Encontrados {} usuarios.", users.len());
    Ok(users)
}

/// Usuarios cuyo nombre contiene `query`.
pub async fn search_users(db_pool: &SqlitePool, query: &str) -> AppResult<Vec<UsuarioResumen>> {
    let users = sqlx::query_as::<_, UsuarioResumen>(
        r#"
        SELECT id, nombre_usuario, tipo_usuario
        FROM usuarios
        WHERE nombre_usuario LIKE ?1 ESCAPE '\'
        ORDER BY nombre_usuario ASC
        "#,
    )
    .bind(super::patron_contiene(query))
    .fetch_all(db_pool)
    .await?;
    Ok(users)
}

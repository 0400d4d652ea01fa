// src/services/auth_service.rs
use crate::{
    error::{AppError, AppResult, CredentialError},
    models::user::{Role, SessionUser},
    services::user_service,
};
use sqlx::SqlitePool;

/// Verifica si la contraseña corresponde al hash guardado.
pub async fn verify_password(password: &str, stored_hash: &str) -> AppResult<bool> {
    let password = password.to_string();
    let stored_hash = stored_hash.to_string();
    tokio::task::spawn_blocking(move || {
        tracing::debug!("Verificando hash bcrypt...");
        bcrypt::verify(&password, &stored_hash)
    })
    .await
    .map_err(|e| {
        tracing::error!("Error en la tarea spawn_blocking (verify_password): {:?}", e);
        AppError::InternalServerError
    })?
    .map_err(|e| {
        tracing::error!("Error bcrypt al verificar contraseña: {:?}", e);
        AppError::PasswordHashingError
    })
}

/// Genera un hash bcrypt con el costo indicado.
pub async fn hash_password(password: &str, cost: u32) -> AppResult<String> {
    let password = password.to_string();
    tokio::task::spawn_blocking(move || {
        tracing::debug!("Generando hash bcrypt (costo {})...", cost);
        bcrypt::hash(&password, cost)
    })
    .await
    .map_err(|e| {
        tracing::error!("Error en la tarea spawn_blocking (hash_password): {:?}", e);
        AppError::InternalServerError
    })?
    .map_err(|e| {
        tracing::error!("Error bcrypt al generar hash: {:?}", e);
        AppError::PasswordHashingError
    })
}

/// Registra un usuario con el rol asociado al código de acceso.
pub async fn register(
    db_pool: &SqlitePool,
    username: &str,
    raw_password: &str,
    access_code: &str,
    bcrypt_cost: u32,
) -> AppResult<i64> {
    let username = username.trim();
    if username.is_empty() || raw_password.is_empty() {
        return Err(AppError::Validation(
            "El nombre de usuario y la contraseña son obligatorios.".to_string(),
        ));
    }

    // 1. El código decide el rol; sin código válido no se crea nada
    let role = user_service::find_role_by_access_code(db_pool, access_code.trim())
        .await?
        .ok_or(CredentialError::InvalidCode)?;

    // 2. Hash y alta
    let password_hash = hash_password(raw_password, bcrypt_cost).await?;
    let id = user_service::create_user(db_pool, username, &password_hash, role).await?;

    tracing::info!("✅ Usuario '{}' registrado con rol {}", username, role);
    Ok(id)
}

/// Comprueba usuario y contraseña y devuelve la identidad para la sesión.
pub async fn authenticate(
    db_pool: &SqlitePool,
    username: &str,
    raw_password: &str,
) -> AppResult<SessionUser> {
    let user = user_service::find_user_by_username(db_pool, username.trim())
        .await?
        .ok_or(CredentialError::UserNotFound)?;

    if !verify_password(raw_password, &user.password_hash).await? {
        return Err(CredentialError::WrongPassword.into());
    }

    let role = user.tipo_usuario.parse::<Role>().map_err(|e| {
        tracing::error!("Usuario '{}' con rol inválido en la base: {}", user.nombre_usuario, e);
        AppError::InternalServerError
    })?;

    Ok(SessionUser {
        id: user.id,
        username: user.nombre_usuario,
        role,
    })
}

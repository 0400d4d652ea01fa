// src/db.rs
use crate::{
    config::Config,
    error::{AppError, AppResult},
};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use std::time::Duration;
use tokio::task::JoinHandle;
use tower_sessions::ExpiredDeletion;
use tower_sessions_sqlx_store::SqliteStore;

/// Tabla de sesiones, en la misma base que los datos.
pub const SESSIONS_TABLE: &str = "sessions";

pub async fn create_db_pool(config: &Config) -> AppResult<SqlitePool> {
    tracing::info!("Conectando a la base de datos: {}", config.database_url);

    let options = SqliteConnectOptions::from_str(&config.database_url)?.create_if_missing(true);

    connect_and_migrate(options, config.max_db_connections).await
}

/// Abre el pool y aplica las migraciones de `./migrations`.
///
/// El pool reemplaza la conexión única de larga duración: cada conexión se
/// valida al adquirirse y se reabre si la base de datos la cerró.
pub async fn connect_and_migrate(
    options: SqliteConnectOptions,
    max_connections: u32,
) -> AppResult<SqlitePool> {
    // Claves foráneas activas en cada conexión
    let options = options
        .foreign_keys(true)
        .busy_timeout(Duration::from_secs(5));

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections.max(1))
        .acquire_timeout(Duration::from_secs(10))
        .test_before_acquire(true)
        .connect_with(options)
        .await?;

    tracing::info!("Ejecutando migraciones de la base de datos...");
    sqlx::migrate!("./migrations").run(&pool).await?;
    tracing::info!("Migraciones concluidas.");

    Ok(pool)
}

// --- Sesiones ---

/// Crea el store de sesiones, migra su tabla y borra las sesiones que
/// vencieron mientras el servidor estaba parado.
pub async fn create_session_store(db_pool: &SqlitePool) -> AppResult<SqliteStore> {
    let store = SqliteStore::new(db_pool.clone())
        .with_table_name(SESSIONS_TABLE)
        .map_err(|e| AppError::Config(format!("Tabla de sesiones inválida: {}", e)))?;
    store.migrate().await?;

    store
        .delete_expired()
        .await
        .map_err(|e| AppError::SessionError(format!("Fallo al borrar sesiones vencidas: {}", e)))?;
    tracing::info!("🔑 Store de sesiones listo (tabla '{}').", SESSIONS_TABLE);

    Ok(store)
}

/// Tarea de fondo que borra las sesiones vencidas cada `period`.
pub fn spawn_session_cleanup(store: SqliteStore, period: Duration) -> JoinHandle<()> {
    tracing::info!("🧹 Limpieza de sesiones cada {:?}.", period);
    tokio::spawn(async move {
        // Solo termina si falla la base
        if let Err(e) = store.continuously_delete_expired(period).await {
            tracing::error!("Error en la tarea de limpieza de sesiones: {:?}", e);
        }
    })
}

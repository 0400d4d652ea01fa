// src/main.rs

// --- Declaración de los módulos ---
mod config;
mod db;
mod error;
mod models;
mod services;
mod state;
mod templates;
mod web;

#[cfg(test)]
mod test_support;

// --- Imports ---
use crate::{config::Config, state::AppState};
use anyhow::anyhow;
use axum::serve;
use tokio::net::TcpListener;
use tower_sessions::cookie::Key;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // --- Logging (tracing) ---
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            "protesis_admin=debug,tower_http=info,sqlx=warn,tower_sessions=info".into()
        }))
        .with(fmt::layer())
        .init();

    tracing::info!("🚀 Iniciando servidor de gestión de prótesis...");

    let config = Config::from_env().map_err(|e| anyhow!("Configuración inválida: {}", e))?;

    // --- Base de datos ---
    let db_pool = match db::create_db_pool(&config).await {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!("❌ Fallo crítico al inicializar la base de datos: {}", e);
            return Err(anyhow!("Fallo al conectar/migrar la base: {}", e));
        }
    };

    tokio::fs::create_dir_all(&config.upload_dir)
        .await
        .map_err(|e| anyhow!("No se pudo crear {}: {}", config.upload_dir.display(), e))?;

    // --- Sesiones ---
    let session_store = db::create_session_store(&db_pool)
        .await
        .map_err(|e| anyhow!("Fallo al crear el session store: {}", e))?;
    db::spawn_session_cleanup(session_store.clone(), config.session_cleanup_interval);

    let key = match &config.session_secret {
        Some(secret) => Key::try_from(secret.as_bytes())
            .map_err(|e| anyhow!("SESSION_SECRET inválida (mínimo 64 bytes): {}", e))?,
        None => {
            tracing::warn!("⚠️ SESSION_SECRET no definida: clave aleatoria, las sesiones no sobreviven a un reinicio.");
            Key::generate()
        }
    };
    tracing::info!("🔑 Capa de sesión configurada.");

    // --- Router ---
    let bind_addr = config.bind_addr;
    let app_state = AppState::new(db_pool, config);
    let app = web::routes::build_app(app_state, session_store, key);

    let listener = match TcpListener::bind(bind_addr).await {
        Ok(l) => l,
        Err(e) => {
            tracing::error!("❌ No se pudo escuchar en {}: {}", bind_addr, e);
            return Err(e.into());
        }
    };
    tracing::info!("📡 Servidor escuchando en http://{}", bind_addr);

    if let Err(e) = serve(listener, app.into_make_service()).await {
        tracing::error!("❌ Error fatal en el servidor: {}", e);
        return Err(e.into());
    }

    Ok(())
}

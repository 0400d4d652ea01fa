// src/config.rs
use crate::error::{AppError, AppResult};
use std::{env, net::SocketAddr, path::PathBuf, time::Duration};

/// Configuración del servidor, leída de las variables de entorno (y del `.env`).
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub max_db_connections: u32,
    pub bind_addr: SocketAddr,
    pub session_secret: Option<String>,
    pub public_dir: PathBuf,
    pub pages_dir: PathBuf,
    pub upload_dir: PathBuf,
    pub request_timeout: Duration,
    pub session_cleanup_interval: Duration,
    pub bcrypt_cost: u32,
}

impl Config {
    pub fn from_env() -> AppResult<Self> {
        dotenvy::dotenv().ok();

        // DATABASE_URL tiene prioridad; DB_NAME es el atajo del .env antiguo
        let database_url = match env::var("DATABASE_URL") {
            Ok(url) => url,
            Err(_) => {
                let name = env::var("DB_NAME").unwrap_or_else(|_| "protesis".to_string());
                format!("sqlite://{}.db", name)
            }
        };

        let bind_addr = env::var("BIND_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:3000".to_string())
            .parse::<SocketAddr>()
            .map_err(|e| AppError::Config(format!("BIND_ADDR inválido: {}", e)))?;

        Ok(Config {
            database_url,
            max_db_connections: parse_var("DB_MAX_CONNECTIONS", 5)?,
            bind_addr,
            session_secret: env::var("SESSION_SECRET").ok().filter(|s| !s.is_empty()),
            public_dir: path_var("PUBLIC_DIR", "public"),
            pages_dir: path_var("PAGES_DIR", "pages"),
            upload_dir: path_var("UPLOAD_DIR", "uploads"),
            request_timeout: Duration::from_secs(parse_var("REQUEST_TIMEOUT_SECS", 30)?),
            session_cleanup_interval: Duration::from_secs(parse_var("SESSION_CLEANUP_SECS", 3600)?),
            bcrypt_cost: parse_var("BCRYPT_COST", 10)?,
        })
    }
}

fn path_var(name: &str, default: &str) -> PathBuf {
    env::var(name).map(PathBuf::from).unwrap_or_else(|_| PathBuf::from(default))
}

fn parse_var<T>(name: &str, default: T) -> AppResult<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| AppError::Config(format!("{} inválido ({}): {}", name, raw, e))),
        Err(_) => Ok(default),
    }
}

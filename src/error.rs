// src/error.rs
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use thiserror::Error;

/// Motivo concreto de un fallo de credenciales (registro o login).
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialError {
    #[error("Código de acceso inválido")]
    InvalidCode,
    #[error("Usuario no encontrado")]
    UserNotFound,
    #[error("Contraseña incorrecta")]
    WrongPassword,
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Error en la base de datos: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("Error de migración de la base de datos: {0}")]
    SqlxMigrateError(#[from] sqlx::migrate::MigrateError),

    #[error("Error de configuración: {0}")]
    Config(String),

    #[error("Error al procesar la contraseña")]
    PasswordHashingError,

    #[error("{0}")]
    InvalidCredentials(CredentialError),

    #[error("Sesión no iniciada")]
    Unauthenticated,

    #[error("Acceso denegado")]
    Forbidden,

    #[error("No encontrado: {0}")]
    NotFound(String),

    #[error("Datos inválidos: {0}")]
    Validation(String),

    #[error("Conflicto: {0}")]
    Conflict(String),

    #[error("Error de transferencia de archivo: {0}")]
    Transfer(String),

    #[error("Error en la sesión: {0}")]
    SessionError(String),

    #[error("Error al renderizar la página: {0}")]
    Render(#[from] askama::Error),

    #[error("Error interno inesperado")]
    InternalServerError,
}

impl From<CredentialError> for AppError {
    fn from(e: CredentialError) -> Self {
        AppError::InvalidCredentials(e)
    }
}

impl From<tower_sessions::session::Error> for AppError {
    fn from(e: tower_sessions::session::Error) -> Self {
        AppError::SessionError(e.to_string())
    }
}

impl AppError {
    /// Código HTTP y mensaje visible para el usuario.
    fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            AppError::SqlxError(_) | AppError::SqlxMigrateError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Error al acceder a los datos.".to_string(),
            ),
            AppError::Config(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Error de configuración.".to_string(),
            ),
            AppError::PasswordHashingError => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Error al procesar las credenciales.".to_string(),
            ),
            AppError::InvalidCredentials(reason) => (StatusCode::UNAUTHORIZED, reason.to_string()),
            AppError::Unauthenticated => (StatusCode::UNAUTHORIZED, "Sesión no iniciada.".to_string()),
            AppError::Forbidden => (StatusCode::FORBIDDEN, "Acceso denegado".to_string()),
            AppError::NotFound(what) => (StatusCode::NOT_FOUND, format!("{} no encontrado.", what)),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
            AppError::Transfer(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Error al transferir el archivo.".to_string(),
            ),
            AppError::SessionError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Error en la gestión de su sesión.".to_string(),
            ),
            AppError::Render(_) | AppError::InternalServerError => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Ocurrió un error inesperado.".to_string(),
            ),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match &self {
            // Sin sesión no hay página de error: de vuelta al login
            AppError::Unauthenticated => {
                tracing::debug!("Petición sin sesión, redirigiendo a /login.html");
                return Redirect::to("/login.html").into_response();
            }
            AppError::InvalidCredentials(_)
            | AppError::Forbidden
            | AppError::NotFound(_)
            | AppError::Validation(_)
            | AppError::Conflict(_) => tracing::warn!("Petición rechazada: {}", self),
            _ => tracing::error!("Error procesado: {:?}", self),
        }

        let (status, user_message) = self.status_and_message();

        if status == StatusCode::FORBIDDEN {
            return (status, user_message).into_response();
        }

        (status, Html(format!(r#"<!DOCTYPE html><html><head><meta charset="utf-8"><title>Error</title><link rel="stylesheet" href="/styles.css"></head>
<body><h1>Error {status_code}</h1><p>{message}</p><a href="/">Volver</a></body></html>"#,
            status_code = status.as_u16(),
            message = escape_html(&user_message),
        )))
            .into_response()
    }
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

pub type AppResult<T = ()> = Result<T, AppError>;

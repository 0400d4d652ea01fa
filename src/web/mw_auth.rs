// src/web/mw_auth.rs
use crate::{error::AppError, models::user::SessionUser};
use axum::{extract::Request, middleware::Next, response::Response};
use tower_sessions::Session;

/// Clave bajo la que la sesión guarda la identidad autenticada.
pub const SESSION_USER_KEY: &str = "usuario";

// Middleware que verifica que haya una sesión iniciada
pub async fn require_auth(
    session: Session,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    match session.get::<SessionUser>(SESSION_USER_KEY).await {
        Ok(Some(user)) => {
            tracing::debug!("Auth MW: '{}' ({}) autenticado.", user.username, user.role);
            // Los handlers la leen con Extension<SessionUser>
            request.extensions_mut().insert(user);
            Ok(next.run(request).await)
        }
        Ok(None) => {
            tracing::debug!("Auth MW: sin sesión para {}", request.uri().path());
            Err(AppError::Unauthenticated)
        }
        Err(e) => {
            tracing::error!("Auth MW: error al leer la sesión: {:?}", e);
            Err(AppError::SessionError(format!("Error al verificar la sesión: {}", e)))
        }
    }
}

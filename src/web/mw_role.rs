// src/web/mw_role.rs
use crate::{
    error::AppError,
    models::user::{Role, SessionUser},
};
use axum::{extract::Request, middleware::Next, response::Response};

pub const ADMIN_ROLES: &[Role] = &[Role::Admin];
pub const STAFF_ROLES: &[Role] = &[Role::Tecnico, Role::Admin];

/// Solo `admin` (directorio de usuarios).
pub async fn require_admin(request: Request, next: Next) -> Result<Response, AppError> {
    require_roles(ADMIN_ROLES, request, next).await
}

/// `tecnico` o `admin` (pacientes, prótesis, revisiones y archivos).
pub async fn require_staff(request: Request, next: Next) -> Result<Response, AppError> {
    require_roles(STAFF_ROLES, request, next).await
}

/// Debe ir dentro de `require_auth`, que deja el `SessionUser` en las extensiones.
pub async fn require_roles(
    allowed: &'static [Role],
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let Some(user) = request.extensions().get::<SessionUser>() else {
        tracing::warn!("Role MW: petición sin identidad, ¿falta require_auth?");
        return Err(AppError::Unauthenticated);
    };

    if allowed.contains(&user.role) {
        tracing::debug!("Role MW: acceso concedido a '{}' ({})", user.username, user.role);
        Ok(next.run(request).await)
    } else {
        tracing::warn!(
            "Role MW: acceso denegado a '{}' ({}) en {}; requiere {:?}",
            user.username,
            user.role,
            request.uri().path(),
            allowed
        );
        Err(AppError::Forbidden)
    }
}

// src/web/auth_handlers.rs
use crate::{
    error::{AppError, AppResult, CredentialError},
    models::user::{LoginForm, RegistroForm, SessionUser},
    services::auth_service,
    state::AppState,
    templates::{render, LoginPage, RegistroPage},
    web::mw_auth::SESSION_USER_KEY,
};
use axum::{
    extract::{Form, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

// GET /login.html
pub async fn show_login_form(session: Session) -> AppResult<Response> {
    if session.get::<SessionUser>(SESSION_USER_KEY).await?.is_some() {
        tracing::debug!("GET /login.html: sesión activa, redirigiendo a /");
        return Ok(Redirect::to("/").into_response());
    }
    Ok(render(&LoginPage { error: None })?.into_response())
}

// POST /login.html
pub async fn handle_login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> AppResult<Response> {
    tracing::info!("Intento de login para '{}'", form.nombre_usuario);

    match auth_service::authenticate(&state.db_pool, &form.nombre_usuario, &form.password).await {
        // --- Credenciales correctas ---
        Ok(user) => {
            // Nuevo id de sesión antes de guardar la identidad
            session.cycle_id().await?;
            session.insert(SESSION_USER_KEY, &user).await?;
            tracing::info!("✅ Login correcto para '{}' ({})", user.username, user.role);
            Ok(Redirect::to("/").into_response())
        }
        // --- Usuario o contraseña incorrectos: misma página con el motivo ---
        Err(AppError::InvalidCredentials(motivo)) => {
            tracing::warn!("Login rechazado para '{}': {}", form.nombre_usuario, motivo);
            let page = LoginPage { error: Some(motivo.to_string()) };
            Ok((StatusCode::UNAUTHORIZED, render(&page)?).into_response())
        }
        // Base de datos, bcrypt, etc.
        Err(e) => Err(e),
    }
}

// GET /registro.html
pub async fn show_register_form() -> AppResult<Response> {
    Ok(render(&RegistroPage { error: None })?.into_response())
}

// POST /registrar
pub async fn handle_register(
    State(state): State<AppState>,
    Form(form): Form<RegistroForm>,
) -> AppResult<Response> {
    let result = auth_service::register(
        &state.db_pool,
        &form.nombre_usuario,
        &form.password,
        &form.codigo_acceso,
        state.config.bcrypt_cost,
    )
    .await;

    // Cada fallo conocido vuelve al formulario con su código HTTP
    let (status, mensaje) = match result {
        Ok(id) => {
            tracing::info!("Usuario #{} creado, redirigiendo al login", id);
            return Ok(Redirect::to("/login.html").into_response());
        }
        Err(AppError::InvalidCredentials(CredentialError::InvalidCode)) => {
            tracing::warn!("Registro de '{}' con código inválido", form.nombre_usuario);
            (StatusCode::UNAUTHORIZED, CredentialError::InvalidCode.to_string())
        }
        Err(AppError::Conflict(msg)) => (StatusCode::CONFLICT, msg),
        Err(AppError::Validation(msg)) => (StatusCode::BAD_REQUEST, msg),
        Err(e) => return Err(e),
    };

    let page = RegistroPage { error: Some(mensaje) };
    Ok((status, render(&page)?).into_response())
}

// GET /logout
pub async fn handle_logout(session: Session) -> AppResult<Redirect> {
    // El logout sigue aunque no se pueda leer quién era
    let user = match session.get::<SessionUser>(SESSION_USER_KEY).await {
        Ok(user) => user,
        Err(e) => {
            tracing::warn!("Logout: no se pudo leer la sesión antes de borrarla: {:?}", e);
            None
        }
    };

    session.delete().await?;

    match user {
        Some(u) => tracing::info!("🚪 Usuario '{}' desconectado.", u.username),
        None => tracing::info!("🚪 Sesión anónima cerrada."),
    }
    Ok(Redirect::to("/login.html"))
}

// src/web/user_handlers.rs
use crate::{
    error::AppResult,
    models::user::{SessionUser, UsuarioResumen},
    services::user_service,
    templates::{render, UsuariosPage},
};
use axum::{
    extract::{Extension, Query, State},
    response::{Html, Json},
};
use serde::Deserialize;
use serde_json::{json, Value};
use sqlx::SqlitePool;

#[derive(Debug, Default, Deserialize)]
pub struct BuscarUsuariosParams {
    #[serde(default)]
    pub query: String,
}

// GET /tipo-usuario (cualquier sesión)
pub async fn tipo_usuario(Extension(user): Extension<SessionUser>) -> Json<Value> {
    Json(json!({ "tipo_usuario": user.role }))
}

// GET /ver-usuarios (admin)
pub async fn ver_usuarios(
    State(db_pool): State<SqlitePool>,
    Extension(admin): Extension<SessionUser>,
) -> AppResult<Html<String>> {
    tracing::debug!("GET /ver-usuarios por '{}'", admin.username);
    let usuarios = user_service::find_all_users(&db_pool).await?;
    render(&UsuariosPage { usuarios: &usuarios })
}

// GET /buscar?query= (admin)
pub async fn buscar_usuarios(
    State(db_pool): State<SqlitePool>,
    Query(params): Query<BuscarUsuariosParams>,
) -> AppResult<Json<Vec<UsuarioResumen>>> {
    let usuarios = user_service::search_users(&db_pool, params.query.trim()).await?;
    tracing::debug!("GET /buscar '{}': {} resultados", params.query, usuarios.len());
    Ok(Json(usuarios))
}

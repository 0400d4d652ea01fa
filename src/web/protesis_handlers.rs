// src/web/protesis_handlers.rs
use crate::{
    error::{AppError, AppResult},
    models::{
        paciente::IdForm,
        protesis::{parse_id_protesis, AsignarProtesisForm, HistorialParams, RegistrarRevisionForm},
    },
    services::protesis_service,
    state::AppState,
    templates::{render, HistorialPage, MensajePage},
};
use axum::{
    extract::{Form, Query, State},
    response::Html,
};

// POST /asignar-protesis
pub async fn asignar_protesis(
    State(state): State<AppState>,
    Form(form): Form<AsignarProtesisForm>,
) -> AppResult<Html<String>> {
    protesis_service::asignar_protesis(&state.db_pool, &form).await?;
    render(&MensajePage { titulo: "Prótesis asignada correctamente" })
}

// POST /eliminar-protesis
pub async fn eliminar_protesis(
    State(state): State<AppState>,
    Form(form): Form<IdForm>,
) -> AppResult<Html<String>> {
    protesis_service::eliminar_protesis(&state.db_pool, form.id).await?;
    render(&MensajePage { titulo: "Prótesis eliminada correctamente" })
}

// POST /registrar-revision
pub async fn registrar_revision(
    State(state): State<AppState>,
    Form(form): Form<RegistrarRevisionForm>,
) -> AppResult<Html<String>> {
    protesis_service::registrar_revision(&state.db_pool, &form).await?;
    render(&MensajePage { titulo: "Revisión registrada correctamente" })
}

// GET /historial?id_protesis=
pub async fn historial(
    State(state): State<AppState>,
    Query(params): Query<HistorialParams>,
) -> AppResult<Html<String>> {
    let id_protesis = parse_id_protesis(&params).map_err(AppError::Validation)?;
    let revisiones = protesis_service::historial(&state.db_pool, id_protesis).await?;
    render(&HistorialPage { revisiones: &revisiones, id_protesis })
}

// GET /historial-total
pub async fn historial_total(State(state): State<AppState>) -> AppResult<Html<String>> {
    let revisiones = protesis_service::historial(&state.db_pool, None).await?;
    render(&HistorialPage { revisiones: &revisiones, id_protesis: None })
}

// src/web/paciente_handlers.rs
use crate::{
    error::{AppError, AppResult},
    models::{
        paciente::{ActualizarPacienteForm, BusquedaPacientesParams, FiltroPacientes, IdForm, NuevoPaciente, PacienteForm},
        user::SessionUser,
    },
    services::paciente_service,
    state::AppState,
    templates::{render, BusquedaPacientesPage, MensajePage, PacientesPage},
};
use axum::{
    extract::{Extension, Form, Query, State},
    response::Html,
};
use chrono::Local;

// POST /submit-data
pub async fn crear_paciente(
    State(state): State<AppState>,
    Extension(user): Extension<SessionUser>,
    Form(form): Form<PacienteForm>,
) -> AppResult<Html<String>> {
    let paciente = NuevoPaciente::new(&form.name, &form.last_name, &form.email, form.birthday)
        .map_err(AppError::Validation)?;
    let id = paciente_service::crear_paciente(&state.db_pool, &paciente).await?;
    tracing::debug!("Paciente #{} dado de alta por '{}'", id, user.username);
    render(&MensajePage { titulo: "Paciente guardado en la base de datos" })
}

// POST /actualizar-paciente
pub async fn actualizar_paciente(
    State(state): State<AppState>,
    Form(form): Form<ActualizarPacienteForm>,
) -> AppResult<Html<String>> {
    let paciente = NuevoPaciente::new(&form.name, &form.last_name, &form.email, form.birthday)
        .map_err(AppError::Validation)?;
    paciente_service::actualizar_paciente(&state.db_pool, form.id, &paciente).await?;
    render(&MensajePage { titulo: "Paciente actualizado correctamente" })
}

// POST /eliminar-paciente
pub async fn eliminar_paciente(
    State(state): State<AppState>,
    Form(form): Form<IdForm>,
) -> AppResult<Html<String>> {
    paciente_service::eliminar_paciente(&state.db_pool, form.id).await?;
    render(&MensajePage { titulo: "Paciente eliminado correctamente" })
}

// GET /pacientes
pub async fn listar_pacientes(State(state): State<AppState>) -> AppResult<Html<String>> {
    let pacientes = paciente_service::listar_pacientes(&state.db_pool).await?;
    render(&PacientesPage { pacientes: &pacientes })
}

// GET /buscar-pacientes?name_search=&age_search=
pub async fn buscar_pacientes(
    State(state): State<AppState>,
    Query(params): Query<BusquedaPacientesParams>,
) -> AppResult<Html<String>> {
    let filtro = FiltroPacientes::try_from(params).map_err(AppError::Validation)?;
    let hoy = Local::now().date_naive();
    let pacientes = paciente_service::buscar_pacientes(&state.db_pool, &filtro, hoy).await?;
    render(&BusquedaPacientesPage { pacientes: &pacientes, hoy })
}

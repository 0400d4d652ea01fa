// src/web/mod.rs
pub mod archivo_handlers;
pub mod auth_handlers;
pub mod mw_auth;
pub mod mw_role;
pub mod paciente_handlers;
pub mod protesis_handlers;
pub mod reporte_handlers;
pub mod routes;
pub mod user_handlers;

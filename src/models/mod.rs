// src/models/mod.rs
pub mod archivo;
pub mod paciente;
pub mod protesis;
pub mod user;

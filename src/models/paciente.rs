// src/models/paciente.rs
use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde::Deserialize;
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow, PartialEq)]
pub struct Paciente {
    pub id: i64,
    pub nombre: String,
    pub apellido: String,
    pub email: String,
    pub fecha_nacimiento: NaiveDate,
    pub fecha_registro: NaiveDateTime,
}

impl Paciente {
    /// Edad en años cumplidos a la fecha `hoy`.
    pub fn edad(&self, hoy: NaiveDate) -> i32 {
        edad_en(self.fecha_nacimiento, hoy)
    }
}

pub fn edad_en(nacimiento: NaiveDate, hoy: NaiveDate) -> i32 {
    let mut edad = hoy.year() - nacimiento.year();
    if (hoy.month(), hoy.day()) < (nacimiento.month(), nacimiento.day()) {
        edad -= 1;
    }
    edad
}

/// Campos editables de un paciente (alta, actualización e importación).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NuevoPaciente {
    pub nombre: String,
    pub apellido: String,
    pub email: String,
    pub fecha_nacimiento: NaiveDate,
}

impl NuevoPaciente {
    /// Valida y normaliza los campos de texto.
    pub fn new(nombre: &str, apellido: &str, email: &str, fecha_nacimiento: NaiveDate) -> Result<Self, String> {
        let nombre = nombre.trim();
        let apellido = apellido.trim();
        let email = email.trim();
        if nombre.is_empty() || apellido.is_empty() {
            return Err("El nombre y el apellido son obligatorios.".to_string());
        }
        if !email.contains('@') {
            return Err(format!("Email inválido: '{}'", email));
        }
        Ok(NuevoPaciente {
            nombre: nombre.to_string(),
            apellido: apellido.to_string(),
            email: email.to_string(),
            fecha_nacimiento,
        })
    }
}

// Formulario de /submit-data (nombres de campo del HTML original)
#[derive(Debug, Deserialize)]
pub struct PacienteForm {
    pub name: String,
    pub last_name: String,
    pub email: String,
    pub birthday: NaiveDate,
}

#[derive(Debug, Deserialize)]
pub struct ActualizarPacienteForm {
    pub id: i64,
    pub name: String,
    pub last_name: String,
    pub email: String,
    pub birthday: NaiveDate,
}

#[derive(Debug, Deserialize)]
pub struct IdForm {
    pub id: i64,
}

/// Filtros de /buscar-pacientes. Llegan como texto porque el formulario
/// envía los campos vacíos.
#[derive(Debug, Default, Deserialize)]
pub struct BusquedaPacientesParams {
    pub name_search: Option<String>,
    pub age_search: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FiltroPacientes {
    pub nombre: Option<String>,
    pub edad: Option<u32>,
}

impl TryFrom<BusquedaPacientesParams> for FiltroPacientes {
    type Error = String;

    fn try_from(params: BusquedaPacientesParams) -> Result<Self, Self::Error> {
        let nombre = params
            .name_search
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());
        let edad = match params.age_search.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(
                raw.parse::<u32>()
                    .map_err(|_| format!("Edad inválida: '{}'", raw))?,
            ),
        };
        Ok(FiltroPacientes { nombre, edad })
    }
}

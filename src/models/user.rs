// src/models/user.rs
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::{fmt, str::FromStr};

/// Rol que controla el acceso a las rutas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Tecnico,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Tecnico => "tecnico",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "tecnico" => Ok(Role::Tecnico),
            other => Err(format!("rol desconocido: {}", other)),
        }
    }
}

// Fila de la tabla 'usuarios'
#[derive(Debug, Clone, FromRow)]
pub struct Usuario {
    pub id: i64,
    pub nombre_usuario: String,
    pub password_hash: String,
    pub tipo_usuario: String,
}

/// Lo que la sesión guarda tras un login correcto.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: i64,
    pub username: String,
    pub role: Role,
}

/// Fila del directorio de usuarios; nunca incluye el hash.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct UsuarioResumen {
    #[serde(skip_serializing)]
    pub id: i64,
    pub nombre_usuario: String,
    pub tipo_usuario: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub nombre_usuario: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RegistroForm {
    pub nombre_usuario: String,
    pub password: String,
    pub codigo_acceso: String,
}

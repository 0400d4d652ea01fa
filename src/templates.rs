// src/templates.rs
use crate::{
    error::AppResult,
    models::{
        archivo::{ArchivoPdf, ResultadoImportacion},
        paciente::Paciente,
        protesis::{ProtesisConPaciente, ProtesisConteo, ProtesisEstado, ProtesisPuntaje, Revision, VistaPaciente},
        user::UsuarioResumen,
    },
};
use askama::Template;
use axum::response::Html;
use chrono::NaiveDate;

/// Renderiza cualquier plantilla como respuesta HTML.
pub fn render<T: Template>(template: &T) -> AppResult<Html<String>> {
    Ok(Html(template.render()?))
}

#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginPage {
    pub error: Option<String>,
}

#[derive(Template)]
#[template(path = "registro.html")]
pub struct RegistroPage {
    pub error: Option<String>,
}

/// Confirmación simple con enlace de vuelta al inicio.
#[derive(Template)]
#[template(path = "mensaje.html")]
pub struct MensajePage<'a> {
    pub titulo: &'a str,
}

#[derive(Template)]
#[template(path = "usuarios.html")]
pub struct UsuariosPage<'a> {
    pub usuarios: &'a [UsuarioResumen],
}

#[derive(Template)]
#[template(path = "pacientes.html")]
pub struct PacientesPage<'a> {
    pub pacientes: &'a [Paciente],
}

#[derive(Template)]
#[template(path = "busqueda_pacientes.html")]
pub struct BusquedaPacientesPage<'a> {
    pub pacientes: &'a [Paciente],
    pub hoy: NaiveDate,
}

impl BusquedaPacientesPage<'_> {
    pub fn edad(&self, paciente: &Paciente) -> i32 {
        paciente.edad(self.hoy)
    }
}

#[derive(Template)]
#[template(path = "vista.html")]
pub struct VistaPage<'a> {
    pub filas: &'a [VistaPaciente],
}

#[derive(Template)]
#[template(path = "protesis.html")]
pub struct ProtesisPage<'a> {
    pub filas: &'a [ProtesisConPaciente],
}

#[derive(Template)]
#[template(path = "mayor_promedio.html")]
pub struct MayorPromedioPage<'a> {
    pub filas: &'a [ProtesisPuntaje],
}

#[derive(Template)]
#[template(path = "promedio.html")]
pub struct PromedioPage {
    pub promedio: Option<f64>,
}

#[derive(Template)]
#[template(path = "numero_revisiones.html")]
pub struct NumeroRevisionesPage<'a> {
    pub filas: &'a [ProtesisConteo],
}

#[derive(Template)]
#[template(path = "estado.html")]
pub struct EstadoPage<'a> {
    pub filas: &'a [ProtesisEstado],
    pub estado: &'a str,
}

#[derive(Template)]
#[template(path = "historial.html")]
pub struct HistorialPage<'a> {
    pub revisiones: &'a [Revision],
    pub id_protesis: Option<i64>,
}

#[derive(Template)]
#[template(path = "pdfs.html")]
pub struct PdfsPage<'a> {
    pub archivos: &'a [ArchivoPdf],
}

#[derive(Template)]
#[template(path = "importacion.html")]
pub struct ImportacionPage<'a> {
    pub resultados: &'a [ResultadoImportacion],
}

impl ImportacionPage<'_> {
    pub fn insertados(&self) -> usize {
        self.resultados.iter().filter(|r| r.ok()).count()
    }

    pub fn fallidos(&self) -> usize {
        self.resultados.len() - self.insertados()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::archivo::ResultadoFila;
    use crate::test_support::fecha;

    #[test]
    fn promedio_sin_revisiones() {
        let html = PromedioPage { promedio: None }.render().unwrap();
        assert!(html.contains("Sin revisiones"));
        let html = PromedioPage { promedio: Some(7.0) }.render().unwrap();
        assert!(html.contains("<h2>7</h2>"));
    }

    #[test]
    fn escapa_datos_de_usuario() {
        let usuarios = vec![UsuarioResumen {
            id: 1,
            nombre_usuario: "<script>alert(1)</script>".into(),
            tipo_usuario: "admin".into(),
        }];
        let html = UsuariosPage { usuarios: &usuarios }.render().unwrap();
        assert!(!html.contains("<script>alert"));
        assert!(html.contains("&#60;script&#62;"));
    }

    #[test]
    fn busqueda_muestra_la_edad() {
        let pacientes = vec![Paciente {
            id: 3,
            nombre: "Ana".into(),
            apellido: "Pérez".into(),
            email: "ana@x.com".into(),
            fecha_nacimiento: fecha(1990, 6, 15),
            fecha_registro: fecha(2024, 1, 1).and_hms_opt(10, 0, 0).unwrap(),
        }];
        let html = BusquedaPacientesPage { pacientes: &pacientes, hoy: fecha(2024, 6, 15) }
            .render()
            .unwrap();
        assert!(html.contains("<td>34</td>"));
    }

    #[test]
    fn resumen_de_importacion() {
        let resultados = vec![
            ResultadoImportacion { fila: 2, resultado: ResultadoFila::Insertado { id: 1 } },
            ResultadoImportacion {
                fila: 3,
                resultado: ResultadoFila::Fallido { motivo: "Email inválido".into() },
            },
        ];
        let page = ImportacionPage { resultados: &resultados };
        assert_eq!((page.insertados(), page.fallidos()), (1, 1));
        let html = page.render().unwrap();
        assert!(html.contains("Email inválido"));
    }
}

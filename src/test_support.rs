// src/test_support.rs
//! Base de datos temporal y router listo para las pruebas.
use crate::{
    config::Config,
    db,
    models::user::Role,
    services::auth_service,
    state::AppState,
    web::routes,
};
use axum::{
    body::{to_bytes, Body},
    http::{header, Request, Response, StatusCode},
    Router,
};
use chrono::NaiveDate;
use sqlx::sqlite::SqliteConnectOptions;
use std::{net::SocketAddr, time::Duration};
use tempfile::TempDir;
use tower::ServiceExt;
use tower_sessions::{cookie::Key, MemoryStore};

pub fn fecha(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub struct TestContext {
    pub state: AppState,
    pub dir: TempDir,
}

impl TestContext {
    pub async fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let options = SqliteConnectOptions::new()
            .filename(dir.path().join("test.db"))
            .create_if_missing(true);
        let pool = db::connect_and_migrate(options, 2).await.unwrap();

        let config = Config {
            database_url: "sqlite::memory:".to_string(),
            max_db_connections: 2,
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
            session_secret: None,
            public_dir: concat!(env!("CARGO_MANIFEST_DIR"), "/public").into(),
            pages_dir: concat!(env!("CARGO_MANIFEST_DIR"), "/pages").into(),
            upload_dir: dir.path().join("uploads"),
            request_timeout: Duration::from_secs(10),
            session_cleanup_interval: Duration::from_secs(3600),
            bcrypt_cost: 4,
        };

        TestContext {
            state: AppState::new(pool, config),
            dir,
        }
    }

    pub fn app(&self) -> Router {
        routes::build_app(self.state.clone(), MemoryStore::default(), Key::generate())
    }

    pub async fn add_access_code(&self, code: &str, role: Role) {
        sqlx::query("INSERT INTO codigos_acceso (codigo, tipo_usuario) VALUES (?1, ?2)")
            .bind(code)
            .bind(role.as_str())
            .execute(&self.state.db_pool)
            .await
            .unwrap();
    }

    pub async fn add_user(&self, username: &str, password: &str, role: Role) -> i64 {
        let hash = auth_service::hash_password(password, 4).await.unwrap();
        crate::services::user_service::create_user(&self.state.db_pool, username, &hash, role)
            .await
            .unwrap()
    }

    pub async fn add_paciente(&self, nombre: &str) -> i64 {
        sqlx::query(
            "INSERT INTO pacientes (nombre, apellido, email, fecha_nacimiento) VALUES (?1, 'Test', 'p@x.com', '1990-01-01')",
        )
        .bind(nombre)
        .execute(&self.state.db_pool)
        .await
        .unwrap()
        .last_insert_rowid()
    }

    pub async fn add_protesis(&self, id_paciente: i64, tipo: &str) -> i64 {
        sqlx::query(
            "INSERT INTO protesis (tipo, fabricante, fecha_asignacion, id_paciente) VALUES (?1, 'Ottobock', '2024-01-01', ?2)",
        )
        .bind(tipo)
        .bind(id_paciente)
        .execute(&self.state.db_pool)
        .await
        .unwrap()
        .last_insert_rowid()
    }

    pub async fn add_revision(&self, id_protesis: i64, puntaje: f64, estado: &str) -> i64 {
        sqlx::query(
            "INSERT INTO revisiones (id_protesis, fecha, estado, observaciones, puntaje) VALUES (?1, '2024-02-01', ?2, '', ?3)",
        )
        .bind(id_protesis)
        .bind(estado)
        .bind(puntaje)
        .execute(&self.state.db_pool)
        .await
        .unwrap()
        .last_insert_rowid()
    }

    pub async fn count(&self, table: &str) -> i64 {
        sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", table))
            .fetch_one(&self.state.db_pool)
            .await
            .unwrap()
    }
}

/// Cliente mínimo que conserva la cookie de sesión entre peticiones.
pub struct TestClient {
    app: Router,
    cookie: Option<String>,
}

impl TestClient {
    pub fn new(app: Router) -> Self {
        TestClient { app, cookie: None }
    }

    pub async fn send(&mut self, request: Request<Body>) -> Response<Body> {
        let mut request = request;
        if let Some(cookie) = &self.cookie {
            request
                .headers_mut()
                .insert(header::COOKIE, cookie.parse().unwrap());
        }
        let response = self.app.clone().oneshot(request).await.unwrap();
        if let Some(set_cookie) = response.headers().get(header::SET_COOKIE) {
            let pair = set_cookie.to_str().unwrap().split(';').next().unwrap().to_string();
            self.cookie = Some(pair);
        }
        response
    }

    pub async fn get(&mut self, uri: &str) -> Response<Body> {
        self.send(Request::get(uri).body(Body::empty()).unwrap()).await
    }

    pub async fn post_form(&mut self, uri: &str, body: &str) -> Response<Body> {
        let request = Request::post(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }

    pub async fn post_multipart(&mut self, uri: &str, field: &str, filename: &str, bytes: &[u8]) -> Response<Body> {
        let boundary = "----prueba-limite";
        let mut body = Vec::new();
        body.extend_from_slice(
            format!(
                "--{b}\r\nContent-Disposition: form-data; name=\"{f}\"; filename=\"{n}\"\r\nContent-Type: application/octet-stream\r\n\r\n",
                b = boundary,
                f = field,
                n = filename
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(format!("\r\n--{}--\r\n", boundary).as_bytes());

        let request = Request::post(uri)
            .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={}", boundary))
            .body(Body::from(body))
            .unwrap();
        self.send(request).await
    }

    pub async fn login(&mut self, username: &str, password: &str) -> Response<Body> {
        self.post_form(
            "/login.html",
            &format!("nombre_usuario={}&password={}", username, password),
        )
        .await
    }
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    to_bytes(response.into_body(), usize::MAX).await.unwrap().to_vec()
}

pub async fn body_text(response: Response<Body>) -> String {
    String::from_utf8(body_bytes(response).await).unwrap()
}

pub fn location(response: &Response<Body>) -> Option<&str> {
    response.headers().get(header::LOCATION).and_then(|v| v.to_str().ok())
}

pub fn assert_redirect_to_login(response: &Response<Body>) {
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(response), Some("/login.html"));
}

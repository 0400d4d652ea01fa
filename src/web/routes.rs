// src/web/routes.rs
use crate::{
    state::AppState,
    web::{
        archivo_handlers, auth_handlers, mw_auth, mw_role, paciente_handlers, protesis_handlers,
        reporte_handlers, user_handlers,
    },
};
use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use time::Duration;
use tower::ServiceBuilder;
use tower_http::{
    services::{ServeDir, ServeFile},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tower_sessions::{cookie::Key, Expiry, SessionManagerLayer, SessionStore};

/// Límite de cuerpo para las subidas de planillas y PDFs.
const MAX_SUBIDA_BYTES: usize = 25 * 1024 * 1024;

pub fn create_router(app_state: AppState) -> Router {
    let config = app_state.config.clone();
    let pagina = |nombre: &str| ServeFile::new(config.pages_dir.join(nombre));

    // --- Rutas públicas ---
    let public_routes = Router::new()
        .route("/login.html", get(auth_handlers::show_login_form).post(auth_handlers::handle_login))
        .route("/registro.html", get(auth_handlers::show_register_form))
        .route("/registrar", post(auth_handlers::handle_register));

    // --- Solo admin: directorio de usuarios ---
    let admin_routes = Router::new()
        .route("/ver-usuarios", get(user_handlers::ver_usuarios))
        .route("/buscar", get(user_handlers::buscar_usuarios))
        .route_layer(middleware::from_fn(mw_role::require_admin));

    // --- tecnico o admin: pacientes, prótesis, revisiones, informes ---
    let staff_routes = Router::new()
        .route("/submit-data", post(paciente_handlers::crear_paciente))
        .route("/actualizar-paciente", post(paciente_handlers::actualizar_paciente))
        .route("/eliminar-paciente", post(paciente_handlers::eliminar_paciente))
        .route("/pacientes", get(paciente_handlers::listar_pacientes))
        .route("/buscar-pacientes", get(paciente_handlers::buscar_pacientes))
        .route("/asignar-protesis", post(protesis_handlers::asignar_protesis))
        .route("/eliminar-protesis", post(protesis_handlers::eliminar_protesis))
        .route("/registrar-revision", post(protesis_handlers::registrar_revision))
        .route("/historial", get(protesis_handlers::historial))
        .route("/historial-total", get(protesis_handlers::historial_total))
        .route("/prom-puntaje", get(reporte_handlers::promedio_puntaje))
        .route("/mayor-promedio", get(reporte_handlers::mayor_promedio))
        .route("/numero-revisiones", get(reporte_handlers::numero_revisiones))
        .route("/estado", get(reporte_handlers::por_estado))
        .route("/protesis", get(reporte_handlers::listar_protesis))
        .route("/vista", get(reporte_handlers::vista_pacientes))
        .route("/download", get(archivo_handlers::exportar_planilla))
        .route("/ver-pdf", get(archivo_handlers::listar_pdfs))
        .route("/download-pdf", post(archivo_handlers::descargar_pdf))
        .merge(
            Router::new()
                .route("/upload", post(archivo_handlers::importar_planilla))
                .route("/subir-pdf", post(archivo_handlers::subir_pdf))
                .layer(DefaultBodyLimit::max(MAX_SUBIDA_BYTES)),
        )
        .route_layer(middleware::from_fn(mw_role::require_staff));

    // --- Rutas autenticadas ---
    // require_auth se aplica a todo lo de arriba; los roles van dentro
    let authenticated_routes = Router::new()
        .route_service("/", pagina("index.html"))
        .route_service("/gestion-protesis.html", pagina("gestion-protesis.html"))
        .route_service("/gestion-archivos.html", pagina("gestion-archivos.html"))
        .route_service("/gestion-revisiones.html", pagina("gestion-revisiones.html"))
        .route_service("/busqueda.html", pagina("busqueda.html"))
        .route("/tipo-usuario", get(user_handlers::tipo_usuario))
        .route("/logout", get(auth_handlers::handle_logout))
        .merge(admin_routes)
        .merge(staff_routes)
        .route_layer(middleware::from_fn(mw_auth::require_auth));

    // --- Router final ---
    Router::new()
        .merge(public_routes)
        .merge(authenticated_routes)
        .fallback_service(ServeDir::new(&config.public_dir))
        .with_state(app_state)
}

/// Router completo con sesiones, trazas y timeout.
pub fn build_app<Store>(app_state: AppState, session_store: Store, key: Key) -> Router
where
    Store: SessionStore + Clone,
{
    let timeout = app_state.config.request_timeout;

    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(false)
        .with_http_only(true)
        .with_expiry(Expiry::OnInactivity(Duration::days(1)))
        .with_signed(key);

    create_router(app_state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(TimeoutLayer::new(timeout))
            .layer(session_layer),
    )
}

#[cfg(test)]
mod tests {
    use crate::{
        models::user::Role,
        test_support::{assert_redirect_to_login, body_bytes, body_text, location, TestClient, TestContext},
    };
    use axum::http::{header, StatusCode};
    use rust_xlsxwriter::Workbook;

    async fn cliente_con_rol(ctx: &TestContext, usuario: &str, rol: Role) -> TestClient {
        ctx.add_user(usuario, "clave", rol).await;
        let mut client = TestClient::new(ctx.app());
        let response = client.login(usuario, "clave").await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), Some("/"));
        client
    }

    #[tokio::test]
    async fn sin_sesion_redirige_al_login() {
        let ctx = TestContext::new().await;
        let mut client = TestClient::new(ctx.app());
        for uri in ["/", "/pacientes", "/ver-usuarios", "/tipo-usuario", "/ver-pdf"] {
            assert_redirect_to_login(&client.get(uri).await);
        }
        let response = client.post_form("/eliminar-paciente", "id=1").await;
        assert_redirect_to_login(&response);
    }

    #[tokio::test]
    async fn registro_con_codigo_desconocido_no_crea_usuario() {
        let ctx = TestContext::new().await;
        ctx.add_access_code("TEC-1", Role::Tecnico).await;
        let mut client = TestClient::new(ctx.app());

        let response = client
            .post_form("/registrar", "nombre_usuario=eva&password=x&codigo_acceso=NOPE")
            .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(body_text(response).await.contains("Código de acceso inválido"));
        assert_eq!(ctx.count("usuarios").await, 0);

        let response = client
            .post_form("/registrar", "nombre_usuario=eva&password=x&codigo_acceso=TEC-1")
            .await;
        assert_eq!(location(&response), Some("/login.html"));
        let response = client
            .post_form("/registrar", "nombre_usuario=eva&password=y&codigo_acceso=TEC-1")
            .await;
        assert_eq!(response.status(), StatusCode::CONFLICT);
        assert_eq!(ctx.count("usuarios").await, 1);
    }

    #[tokio::test]
    async fn registro_y_login_devuelven_el_rol() {
        let ctx = TestContext::new().await;
        ctx.add_access_code("ADM-1", Role::Admin).await;
        let mut client = TestClient::new(ctx.app());

        client
            .post_form("/registrar", "nombre_usuario=root&password=s3creto&codigo_acceso=ADM-1")
            .await;
        let response = client.login("root", "s3creto").await;
        assert_eq!(location(&response), Some("/"));

        let body = body_text(client.get("/tipo-usuario").await).await;
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["tipo_usuario"], "admin");

        // Con sesión, /login.html vuelve al inicio
        assert_eq!(location(&client.get("/login.html").await), Some("/"));
    }

    #[tokio::test]
    async fn login_fallido_muestra_el_motivo() {
        let ctx = TestContext::new().await;
        ctx.add_user("ana", "buena", Role::Tecnico).await;
        let mut client = TestClient::new(ctx.app());

        let response = client.login("nadie", "x").await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(body_text(response).await.contains("Usuario no encontrado"));

        let response = client.login("ana", "mala").await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(body_text(response).await.contains("Contraseña incorrecta"));

        assert_redirect_to_login(&client.get("/pacientes").await);
    }

    #[tokio::test]
    async fn tecnico_no_accede_al_directorio_de_usuarios() {
        let ctx = TestContext::new().await;
        let mut tecnico = cliente_con_rol(&ctx, "tec", Role::Tecnico).await;

        let response = tecnico.get("/ver-usuarios").await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(body_text(response).await, "Acceso denegado");
        assert_eq!(tecnico.get("/buscar?query=t").await.status(), StatusCode::FORBIDDEN);

        // Pero sí a las rutas de personal
        assert_eq!(tecnico.get("/pacientes").await.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn admin_busca_usuarios_sin_ver_el_hash() {
        let ctx = TestContext::new().await;
        ctx.add_user("tecnico1", "x", Role::Tecnico).await;
        let mut admin = cliente_con_rol(&ctx, "jefa", Role::Admin).await;

        let body = body_text(admin.get("/buscar?query=tecn").await).await;
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(
            json,
            serde_json::json!([{ "nombre_usuario": "tecnico1", "tipo_usuario": "tecnico" }])
        );

        let html = body_text(admin.get("/ver-usuarios").await).await;
        assert!(html.contains("jefa") && html.contains("tecnico1"));
        assert!(!html.contains("$2"));
    }

    #[tokio::test]
    async fn logout_cierra_la_sesion() {
        let ctx = TestContext::new().await;
        let mut client = cliente_con_rol(&ctx, "tec", Role::Tecnico).await;
        assert_eq!(client.get("/pacientes").await.status(), StatusCode::OK);

        let response = client.get("/logout").await;
        assert_eq!(location(&response), Some("/login.html"));
        assert_redirect_to_login(&client.get("/pacientes").await);
    }

    #[tokio::test]
    async fn sesiones_concurrentes_no_se_mezclan() {
        let ctx = TestContext::new().await;
        let app = ctx.app();
        ctx.add_user("admin1", "a", Role::Admin).await;
        ctx.add_user("tec1", "t", Role::Tecnico).await;

        let mut admin = TestClient::new(app.clone());
        let mut tecnico = TestClient::new(app);
        let (r1, r2) = tokio::join!(admin.login("admin1", "a"), tecnico.login("tec1", "t"));
        assert_eq!(location(&r1), Some("/"));
        assert_eq!(location(&r2), Some("/"));

        let (a, t) = tokio::join!(admin.get("/tipo-usuario"), tecnico.get("/tipo-usuario"));
        assert!(body_text(a).await.contains("admin"));
        assert!(body_text(t).await.contains("tecnico"));
    }

    #[tokio::test]
    async fn eliminar_paciente_existente_y_ausente() {
        let ctx = TestContext::new().await;
        let id = ctx.add_paciente("Ana").await;
        let mut client = cliente_con_rol(&ctx, "tec", Role::Tecnico).await;

        let response = client.post_form("/eliminar-paciente", &format!("id={}", id)).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(ctx.count("pacientes").await, 0);

        let response = client.post_form("/eliminar-paciente", &format!("id={}", id)).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn alta_y_busqueda_de_pacientes() {
        let ctx = TestContext::new().await;
        let mut client = cliente_con_rol(&ctx, "tec", Role::Tecnico).await;

        let response = client
            .post_form(
                "/submit-data",
                "name=Marta&last_name=Rius&email=marta%40x.com&birthday=1980-03-02",
            )
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        let response = client
            .post_form("/submit-data", "name=Sin&last_name=Mail&email=nada&birthday=1980-03-02")
            .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let html = body_text(client.get("/buscar-pacientes?name_search=art&age_search=").await).await;
        assert!(html.contains("Marta"));
        let html = body_text(client.get("/buscar-pacientes?name_search=zzz").await).await;
        assert!(!html.contains("Marta"));
        let response = client.get("/buscar-pacientes?age_search=abc").await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn informes_de_puntaje() {
        let ctx = TestContext::new().await;
        let mut client = cliente_con_rol(&ctx, "tec", Role::Tecnico).await;
        assert!(body_text(client.get("/prom-puntaje").await).await.contains("Sin revisiones"));

        let paciente = ctx.add_paciente("Ana").await;
        let protesis = ctx.add_protesis(paciente, "Rodilla").await;
        let response = client
            .post_form(
                "/registrar-revision",
                &format!("id_protesis={}&fecha=2024-03-01&estado=Bueno&observaciones=&puntaje=9", protesis),
            )
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        ctx.add_revision(protesis, 5.0, "Regular").await;

        assert!(body_text(client.get("/prom-puntaje").await).await.contains("<h2>7</h2>"));
        let html = body_text(client.get(&format!("/historial?id_protesis={}", protesis)).await).await;
        assert!(html.contains("Bueno") && html.contains("Regular"));
        let html = body_text(client.get("/estado?estado=Regu").await).await;
        assert!(html.contains("Regular") && !html.contains("Bueno"));
    }

    #[tokio::test]
    async fn importar_planilla_informa_por_fila() {
        let ctx = TestContext::new().await;
        let mut client = cliente_con_rol(&ctx, "tec", Role::Tecnico).await;

        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        for (col, h) in ["name", "last_name", "email", "birthday"].iter().enumerate() {
            sheet.write_string(0, col as u16, *h).unwrap();
        }
        for (col, v) in ["Ana", "Pérez", "ana@x.com", "1990-05-17"].iter().enumerate() {
            sheet.write_string(1, col as u16, *v).unwrap();
        }
        for (col, v) in ["Mal", "Correo", "sin-arroba", "1990-05-17"].iter().enumerate() {
            sheet.write_string(2, col as u16, *v).unwrap();
        }
        let bytes = workbook.save_to_buffer().unwrap();

        let response = client.post_multipart("/upload", "excelFile", "pacientes.xlsx", &bytes).await;
        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert!(html.contains("sin-arroba"));
        assert_eq!(ctx.count("pacientes").await, 1);

        let response = client.post_multipart("/upload", "excelFile", "x.xlsx", b"basura").await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let response = client.get("/download").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            crate::web::archivo_handlers::MIME_XLSX
        );
        assert!(ctx.dir.path().join("uploads").join("pacientes.xlsx").exists());
    }

    #[tokio::test]
    async fn subir_y_descargar_pdf() {
        let ctx = TestContext::new().await;
        let mut client = cliente_con_rol(&ctx, "tec", Role::Tecnico).await;
        let contenido = b"%PDF-1.4 informe de prueba";

        let response = client.post_multipart("/subir-pdf", "pdf", "alta medica.pdf", contenido).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(client.get("/ver-pdf").await).await.contains("alta medica.pdf"));

        let response = client.post_form("/download-pdf", "id=1").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/pdf");
        assert_eq!(response.headers()[header::CONTENT_LENGTH], contenido.len().to_string().as_str());
        let disposition = response.headers()[header::CONTENT_DISPOSITION].to_str().unwrap().to_string();
        assert_eq!(disposition, "attachment; filename*=UTF-8''alta%20medica.pdf");
        assert_eq!(body_bytes(response).await, contenido);

        let response = client.post_form("/download-pdf", "id=99").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}

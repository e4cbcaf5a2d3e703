//src/main.rs

use axum::{
    middleware as axum_middleware,
    routing::{get, put},
    Router,
};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod middleware;
mod models;
mod services;

use crate::config::{AppState, Config};
use crate::docs::ApiDoc;
use crate::handlers::school::{get_resource, list_resources};
use crate::middleware::auth::auth_guard;
use crate::models::school::{Child, Classroom, DiaryEvent, MaterialRequest, Planning, Unit};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Inicializa o logger (RUST_LOG manda; padrão "info")
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .init();

    // Se a configuração falhar, a aplicação não deve iniciar.
    let config = Config::from_env()?;
    let app_state = AppState::new(&config).await?;

    // Faz o app rodar as migrações do SQLx na inicialização
    sqlx::migrate!()
        .run(&app_state.db_pool)
        .await?;

    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    let app = router(app_state);

    // Inicia o servidor
    let listener = TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}

fn router(app_state: AppState) -> Router {
    // Rotas do próprio usuário
    let user_routes = Router::new()
        .route("/", get(handlers::auth::get_me))
        .route("/scope", get(handlers::access::get_my_scope));

    // Administração de escopo (o nível é checado no serviço)
    let access_routes = Router::new()
        .route("/catalog", get(handlers::access::get_catalog))
        .route("/user-roles/{user_role_id}/units", get(handlers::access::list_unit_scopes))
        .route(
            "/user-roles/{user_role_id}/units/{unit_id}",
            put(handlers::access::grant_unit_scope).delete(handlers::access::revoke_unit_scope),
        );

    // Entidades escolares: TODAS passam pelo resolvedor (ScopeContext)
    let school_routes = Router::new()
        .route("/units", get(list_resources::<Unit>))
        .route("/units/{id}", get(get_resource::<Unit>))
        .route("/classrooms", get(list_resources::<Classroom>))
        .route("/classrooms/{id}", get(get_resource::<Classroom>))
        .route("/children", get(list_resources::<Child>))
        .route("/children/{id}", get(get_resource::<Child>))
        .route("/diary-events", get(list_resources::<DiaryEvent>))
        .route("/diary-events/{id}", get(get_resource::<DiaryEvent>))
        .route("/plannings", get(list_resources::<Planning>))
        .route("/plannings/{id}", get(get_resource::<Planning>))
        .route("/material-requests", get(list_resources::<MaterialRequest>))
        .route("/material-requests/{id}", get(get_resource::<MaterialRequest>));

    let protected = Router::new()
        .nest("/me", user_routes)
        .nest("/access", access_routes)
        .merge(school_routes)
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    // Combina tudo no router principal
    Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api", protected)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .with_state(app_state)
}

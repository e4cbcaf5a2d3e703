// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Users ---
        handlers::auth::get_me,

        // --- Access ---
        handlers::access::get_my_scope,
        handlers::access::get_catalog,
        handlers::access::list_unit_scopes,
        handlers::access::grant_unit_scope,
        handlers::access::revoke_unit_scope,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::User,
            models::auth::UserStatus,

            // --- Access ---
            models::access::RoleLevel,
            models::access::RoleType,
            models::access::CatalogEntry,
            models::access::ScopeSummary,

            // --- School ---
            models::school::Unit,
            models::school::Classroom,
            models::school::Child,
            models::school::DiaryEvent,
            models::school::Planning,
            models::school::MaterialRequest,
            models::school::MaterialRequestStatus,
        )
    ),
    tags(
        (name = "Users", description = "Dados do Usuário"),
        (name = "Access", description = "Cargos, Níveis e Escopo de Unidades"),
        (name = "School", description = "Unidades, Turmas, Crianças, Diário, Planejamento e Requisições")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(
                Http::new(HttpAuthScheme::Bearer)
            ),
        );
    }
}

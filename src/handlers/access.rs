// src/handlers/access.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{i18n::Locale, scope::ScopeContext},
    models::{
        access::{CatalogEntry, EffectiveScope, RoleLevel, ScopeSummary, UserRoleRow},
        school::Unit,
    },
};

// GET /api/me/scope (para o frontend saber quais menus mostrar)
#[utoipa::path(
    get,
    path = "/api/me/scope",
    tag = "Access",
    responses(
        (status = 200, description = "Escopo efetivo do usuário", body = ScopeSummary),
        (status = 403, description = "Usuário sem cargos ou com cargo desconhecido")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_my_scope(ctx: ScopeContext) -> Json<ScopeSummary> {
    Json(ctx.scope.summary())
}

// GET /api/access/catalog
#[utoipa::path(
    get,
    path = "/api/access/catalog",
    tag = "Access",
    responses(
        (status = 200, description = "Cargos e seus níveis", body = Vec<CatalogEntry>)
    ),
    security(("api_jwt" = []))
)]
pub async fn get_catalog(State(app_state): State<AppState>) -> Json<Vec<CatalogEntry>> {
    Json(app_state.scope_resolver.catalog().entries())
}

// GET /api/access/user-roles/{user_role_id}/units
#[utoipa::path(
    get,
    path = "/api/access/user-roles/{user_role_id}/units",
    tag = "Access",
    params(
        ("user_role_id" = Uuid, Path, description = "ID da atribuição de cargo")
    ),
    responses(
        (status = 200, description = "Unidades concedidas ao cargo", body = Vec<Uuid>),
        (status = 403, description = "Nível insuficiente"),
        (status = 404, description = "Cargo não encontrado na mantenedora")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_unit_scopes(
    State(app_state): State<AppState>,
    locale: Locale,
    ctx: ScopeContext,
    Path(user_role_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {

    let target = find_target(&ctx.scope, app_state.principal_repo.find_user_role(user_role_id))
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let units = app_state.unit_scope_service
        .list_unit_scopes(&ctx.scope, &target)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(units.into_iter().collect::<Vec<_>>()))
}

// PUT /api/access/user-roles/{user_role_id}/units/{unit_id}
// PUT e não POST: a operação é idempotente
#[utoipa::path(
    put,
    path = "/api/access/user-roles/{user_role_id}/units/{unit_id}",
    tag = "Access",
    params(
        ("user_role_id" = Uuid, Path, description = "ID da atribuição de cargo"),
        ("unit_id" = Uuid, Path, description = "ID da unidade")
    ),
    responses(
        (status = 204, description = "Concedido (ou já estava)"),
        (status = 403, description = "Nível insuficiente"),
        (status = 404, description = "Cargo ou unidade não encontrados na mantenedora"),
        (status = 422, description = "O nível do cargo não usa escopo explícito")
    ),
    security(("api_jwt" = []))
)]
pub async fn grant_unit_scope(
    State(app_state): State<AppState>,
    locale: Locale,
    ctx: ScopeContext,
    Path((user_role_id, unit_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, ApiError> {

    let target = find_target(&ctx.scope, app_state.principal_repo.find_user_role(user_role_id))
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    // A unidade é buscada dentro da mantenedora, sem exigir que o
    // administrador tenha a própria unidade no escopo
    let unit = app_state.school_service
        .find_in_mantenedora::<Unit>(&ctx.scope, unit_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    app_state.unit_scope_service
        .grant_unit_scope(&ctx.scope, &target, &unit)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}

// DELETE /api/access/user-roles/{user_role_id}/units/{unit_id}
#[utoipa::path(
    delete,
    path = "/api/access/user-roles/{user_role_id}/units/{unit_id}",
    tag = "Access",
    params(
        ("user_role_id" = Uuid, Path, description = "ID da atribuição de cargo"),
        ("unit_id" = Uuid, Path, description = "ID da unidade")
    ),
    responses(
        (status = 204, description = "Revogado (ou já não existia)"),
        (status = 403, description = "Nível insuficiente"),
        (status = 404, description = "Cargo não encontrado na mantenedora")
    ),
    security(("api_jwt" = []))
)]
pub async fn revoke_unit_scope(
    State(app_state): State<AppState>,
    locale: Locale,
    ctx: ScopeContext,
    Path((user_role_id, unit_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, ApiError> {

    let target = find_target(&ctx.scope, app_state.principal_repo.find_user_role(user_role_id))
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    app_state.unit_scope_service
        .revoke_unit_scope(&ctx.scope, &target, unit_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}

// O nível é checado ANTES de tocar no banco: sem isso, 404 x 403
// revelaria a quem não é administrador quais ids existem.
async fn find_target<F>(scope: &EffectiveScope, lookup: F) -> Result<UserRoleRow, AppError>
where
    F: Future<Output = Result<Option<UserRoleRow>, AppError>>,
{
    scope.require_level(RoleLevel::Mantenedora)?;

    lookup.await?.ok_or(AppError::NotFound)
}

// src/handlers/school.rs

// Listagem e detalhe de TODAS as entidades escolares. Um único par de
// handlers genéricos; a rota escolhe o tipo (ex.: `list_resources::<Child>`).

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{i18n::Locale, scope::ScopeContext},
    models::school::ScopedResource,
};

fn default_limit() -> i64 {
    50
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PageParams {
    #[validate(range(min = 1, max = 500, message = "O limite deve estar entre 1 e 500."))]
    #[serde(default = "default_limit")]
    pub limit: i64,

    #[validate(range(min = 0, message = "O offset não pode ser negativo."))]
    #[serde(default)]
    pub offset: i64,
}

// GET /api/<recurso>
pub async fn list_resources<T: ScopedResource>(
    State(app_state): State<AppState>,
    locale: Locale,
    ctx: ScopeContext,
    Query(page): Query<PageParams>,
) -> Result<Json<Vec<T>>, ApiError> {

    page.validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let rows = app_state.school_service
        .list::<T>(&ctx.scope, page.limit, page.offset)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(rows))
}

// GET /api/<recurso>/{id}
pub async fn get_resource<T: ScopedResource>(
    State(app_state): State<AppState>,
    locale: Locale,
    ctx: ScopeContext,
    Path(id): Path<Uuid>,
) -> Result<Json<T>, ApiError> {

    let row = app_state.school_service
        .get::<T>(&ctx.scope, id)
        .await
        .inspect_err(|e| {
            if let AppError::Scope(denial) = e {
                tracing::warn!(
                    user_id = %ctx.user.id,
                    email = %ctx.user.email,
                    table = T::TABLE,
                    "Acesso negado: {}", denial
                );
            }
        })
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(row))
}

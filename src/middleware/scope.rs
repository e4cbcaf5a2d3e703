// src/middleware/scope.rs

use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};

use crate::{
    common::error::ApiError,
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    models::{access::EffectiveScope, auth::User},
};

/// O Extractor (Guardião) de escopo.
///
/// Carrega os cargos do usuário e roda o resolvedor ANTES do handler.
/// Toda rota de entidade da mantenedora recebe este contexto; nenhuma
/// consulta acontece sem ele.
#[derive(Debug, Clone)]
pub struct ScopeContext {
    pub user: User,
    pub scope: EffectiveScope,
}

impl<S> FromRequestParts<S> for ScopeContext
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);
        let locale = Locale::from_parts(parts);

        // A. Extrai Usuário (colocado pelo auth_guard)
        let AuthenticatedUser(user) = AuthenticatedUser::from_request_parts(parts, state).await?;

        // B. Carrega cargos + concessões
        let principal = app_state
            .principal_repo
            .load_principal(&user)
            .await
            .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

        // C. Resolve. Sem cargos ou cargo desconhecido = rejeição explícita,
        //    nunca uma lista vazia silenciosa.
        let scope = app_state
            .scope_resolver
            .resolve(&principal, None)
            .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

        Ok(ScopeContext { user, scope })
    }
}

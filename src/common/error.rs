use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;
use uuid::Uuid;

use crate::common::i18n::I18nStore;
use crate::middleware::i18n::Locale;
use crate::models::access::RoleLevel;

// Erros do modelo de acesso (catálogo, resolvedor e atribuição de escopo).
// Nenhum deles é re-tentado: são falhas terminais de autorização ou de dados.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScopeError {
    // Existe no banco mas não no catálogo. Nunca deveria acontecer.
    #[error("Cargo desconhecido: {0}")]
    UnknownRoleType(String),

    #[error("Unidade {unit_id} fora do escopo")]
    ScopeViolation { unit_id: Uuid },

    #[error("Usuário sem cargos")]
    NoRoles,

    #[error("Nível insuficiente (exige {required})")]
    InsufficientLevel { required: RoleLevel },

    #[error("Escopo explícito não se aplica ao nível {level}")]
    ScopeNotApplicable { level: RoleLevel },
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Token inválido")]
    InvalidToken,

    #[error("Usuário desativado")]
    InactiveUser,

    #[error("Usuário não encontrado")]
    UserNotFound,

    #[error("Registro não encontrado")]
    NotFound,

    #[error("Acesso negado: {0}")]
    Scope(#[from] ScopeError),

    // Variante para erros de banco de dados
    #[error("Erro de banco de dados: {0}")]
    DatabaseError(#[from] sqlx::Error),

    // Variante genérica para qualquer outro erro inesperado
    #[error("Erro interno do servidor: {0}")]
    InternalServerError(#[from] anyhow::Error),
}

// O erro que efetivamente sai pela API, já traduzido
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub error: String,
    pub details: Option<Value>,
}

impl ApiError {
    fn new(status: StatusCode, error: String) -> Self {
        Self { status, error, details: None }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match self.details {
            Some(details) => json!({ "error": self.error, "details": details }),
            None => json!({ "error": self.error }),
        };
        (self.status, Json(body)).into_response()
    }
}

impl AppError {
    pub fn to_api_error(self, locale: &Locale, i18n: &I18nStore) -> ApiError {
        match self {
            // Retorna todos os detalhes da validação, campo a campo
            AppError::ValidationError(errors) => {
                let mut details = serde_json::Map::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .map(|e| match &e.message {
                            Some(m) => m.to_string(),
                            None => e.code.to_string(),
                        })
                        .collect();
                    details.insert(field.to_string(), json!(messages));
                }
                ApiError {
                    status: StatusCode::BAD_REQUEST,
                    error: i18n.translate(locale, "error.validation"),
                    details: Some(Value::Object(details)),
                }
            }
            AppError::InvalidToken => {
                ApiError::new(StatusCode::UNAUTHORIZED, i18n.translate(locale, "error.invalid_token"))
            }
            AppError::InactiveUser => {
                ApiError::new(StatusCode::UNAUTHORIZED, i18n.translate(locale, "error.inactive_user"))
            }
            AppError::UserNotFound => {
                ApiError::new(StatusCode::UNAUTHORIZED, i18n.translate(locale, "error.user_not_found"))
            }
            AppError::NotFound => {
                ApiError::new(StatusCode::NOT_FOUND, i18n.translate(locale, "error.not_found"))
            }
            AppError::Scope(scope_err) => scope_err.to_api_error(locale, i18n),

            // Todos os outros erros (DatabaseError, InternalServerError) viram 500.
            // O detalhe vai para o log, nunca para o cliente.
            e => {
                tracing::error!("🔥 Erro Interno do Servidor: {}", e);
                ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, i18n.translate(locale, "error.internal"))
            }
        }
    }
}

impl ScopeError {
    pub fn to_api_error(self, locale: &Locale, i18n: &I18nStore) -> ApiError {
        match self {
            ScopeError::ScopeViolation { unit_id } => ApiError::new(
                StatusCode::FORBIDDEN,
                i18n.translate_with(locale, "error.unit_out_of_scope", &[("unit", unit_id.to_string())]),
            ),
            ScopeError::NoRoles => {
                ApiError::new(StatusCode::FORBIDDEN, i18n.translate(locale, "error.no_roles"))
            }
            ScopeError::UnknownRoleType(role) => {
                // Dado corrompido: barulho no log e acesso negado
                tracing::error!("🔥 Cargo '{}' não existe no catálogo. Acesso negado.", role);
                ApiError::new(
                    StatusCode::FORBIDDEN,
                    i18n.translate_with(locale, "error.unknown_role_type", &[("role", role)]),
                )
            }
            ScopeError::InsufficientLevel { required } => ApiError::new(
                StatusCode::FORBIDDEN,
                i18n.translate_with(locale, "error.insufficient_level", &[("required", required.to_string())]),
            ),
            ScopeError::ScopeNotApplicable { level } => ApiError::new(
                StatusCode::UNPROCESSABLE_ENTITY,
                i18n.translate_with(locale, "error.scope_not_applicable", &[("level", level.to_string())]),
            ),
        }
    }
}

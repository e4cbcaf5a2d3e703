// src/models/auth.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use utoipa::ToSchema;

// Mapeia o CREATE TYPE user_status do banco.
// Usuário nunca é apagado enquanto houver referências: apenas desativado.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "user_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserStatus {
    Active,
    Inactive,
}

// Representa um usuário vindo do banco de dados
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,

    // A mantenedora "dona" do usuário (exatamente uma)
    pub mantenedora_id: Uuid,

    // Unidade "casa" (obrigatória na prática para UNIDADE/PROFESSOR)
    pub unit_id: Option<Uuid>,

    #[schema(example = "maria.silva@creche.org.br")]
    pub email: String,

    #[schema(example = "Maria Silva")]
    pub full_name: String,

    pub status: UserStatus,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn is_active(&self) -> bool {
        self.status == UserStatus::Active
    }
}

// Estrutura de dados ("claims") dentro do JWT.
// A emissão do token acontece fora deste serviço; aqui só validamos.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,  // Subject (ID do usuário)
    pub exp: usize, // Expiration time (quando o token expira)
    pub iat: usize, // Issued At (quando o token foi criado)
}

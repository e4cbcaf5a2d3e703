// src/models/school.rs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{postgres::PgRow, FromRow};
use uuid::Uuid;
use utoipa::ToSchema;

// ---
// O Trait que descreve uma entidade filtrada por escopo
// ---
// Toda tabela aqui tem `mantenedora_id` e uma coluna de unidade.
// Os nomes são constantes de compilação, nunca vêm do usuário.
pub trait ScopedResource:
    for<'r> FromRow<'r, PgRow> + Serialize + Clone + Send + Sync + Unpin + 'static
{
    const TABLE: &'static str;
    const UNIT_COLUMN: &'static str = "unit_id";
    const ORDER_BY: &'static str = "created_at DESC";

    fn unit_id(&self) -> Uuid;
}

// ---
// 1. Unit (A "Unidade")
// ---
// O local físico (creche). Código único dentro da mantenedora.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Unit {
    pub id: Uuid,
    #[schema(ignore)]
    pub mantenedora_id: Uuid,
    #[schema(example = "ARARA-CAN")]
    pub code: String,
    #[schema(example = "CEI Arara Canindé")]
    pub name: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl ScopedResource for Unit {
    const TABLE: &'static str = "units";
    // Na própria tabela de unidades, a "coluna de unidade" é o id
    const UNIT_COLUMN: &'static str = "id";
    const ORDER_BY: &'static str = "code";

    fn unit_id(&self) -> Uuid {
        self.id
    }
}

// ---
// 2. Classroom (A "Turma")
// ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Classroom {
    pub id: Uuid,
    #[schema(ignore)]
    pub mantenedora_id: Uuid,
    pub unit_id: Uuid,
    #[schema(example = "Berçário II - A")]
    pub name: String,
    #[schema(example = "BERCARIO_II")]
    pub age_group: Option<String>,
    #[schema(example = 18)]
    pub capacity: Option<i32>,
    pub created_at: DateTime<Utc>,
}

impl ScopedResource for Classroom {
    const TABLE: &'static str = "classrooms";
    const ORDER_BY: &'static str = "name";

    fn unit_id(&self) -> Uuid {
        self.unit_id
    }
}

// ---
// 3. Child (A "Criança")
// ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Child {
    pub id: Uuid,
    #[schema(ignore)]
    pub mantenedora_id: Uuid,
    pub unit_id: Uuid,
    pub classroom_id: Option<Uuid>,
    #[schema(example = "João Pedro Souza")]
    pub full_name: String,
    pub birth_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

impl ScopedResource for Child {
    const TABLE: &'static str = "children";
    const ORDER_BY: &'static str = "full_name";

    fn unit_id(&self) -> Uuid {
        self.unit_id
    }
}

// ---
// 4. DiaryEvent (O "Diário de Bordo")
// ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DiaryEvent {
    pub id: Uuid,
    #[schema(ignore)]
    pub mantenedora_id: Uuid,
    pub unit_id: Uuid,
    pub classroom_id: Option<Uuid>,
    pub child_id: Option<Uuid>,
    #[schema(example = "ALIMENTACAO")]
    pub kind: String,
    #[schema(example = "Aceitou bem o almoço")]
    pub description: Option<String>,
    pub occurred_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl ScopedResource for DiaryEvent {
    const TABLE: &'static str = "diary_events";
    const ORDER_BY: &'static str = "occurred_at DESC";

    fn unit_id(&self) -> Uuid {
        self.unit_id
    }
}

// ---
// 5. Planning (O "Planejamento" pedagógico)
// ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Planning {
    pub id: Uuid,
    #[schema(ignore)]
    pub mantenedora_id: Uuid,
    pub unit_id: Uuid,
    pub classroom_id: Option<Uuid>,
    #[schema(example = "Semana das cores")]
    pub title: String,
    #[schema(example = "RASCUNHO")]
    pub status: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

impl ScopedResource for Planning {
    const TABLE: &'static str = "plannings";
    const ORDER_BY: &'static str = "start_date DESC";

    fn unit_id(&self) -> Uuid {
        self.unit_id
    }
}

// ---
// 6. MaterialRequest (A "Requisição de Material")
// ---

// Mapeia o CREATE TYPE material_request_status do banco
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "material_request_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MaterialRequestStatus {
    Draft,
    Submitted,
    Approved,
    Rejected,
    Delivered,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MaterialRequest {
    pub id: Uuid,
    #[schema(ignore)]
    pub mantenedora_id: Uuid,
    pub unit_id: Uuid,
    pub classroom_id: Option<Uuid>,
    pub requested_by: Uuid,
    pub status: MaterialRequestStatus,
    #[schema(example = "Material de artes para o 2º semestre")]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl ScopedResource for MaterialRequest {
    const TABLE: &'static str = "material_requests";

    fn unit_id(&self) -> Uuid {
        self.unit_id
    }
}

// src/db/scoped_repo.rs

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::common::error::AppError;
use crate::models::access::ScopeFilter;
use crate::models::school::ScopedResource;

/// Leitura genérica das entidades da mantenedora.
///
/// TODA leitura passa pelo ScopeFilter: nunca existe consulta sem filtro.
/// `unit_ids = Some(vec![])` não retorna linhas.
#[async_trait]
pub trait ScopedStore: Send + Sync {
    async fn list<T: ScopedResource>(
        &self,
        filter: &ScopeFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<T>, AppError>;

    /// Busca por id dentro da mantenedora (`None` = qualquer uma, só DEVELOPER).
    /// A checagem da unidade fica com o resolvedor, para diferenciar 403 de 404.
    async fn find<T: ScopedResource>(
        &self,
        id: Uuid,
        mantenedora_id: Option<Uuid>,
    ) -> Result<Option<T>, AppError>;
}

#[derive(Clone)]
pub struct ScopedRepository {
    pool: PgPool,
}

impl ScopedRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// `= ANY('{}')` é falso para toda linha: escopo vazio vira zero linhas
fn list_sql<T: ScopedResource>() -> String {
    format!(
        r#"
        SELECT * FROM {table}
        WHERE ($1::uuid IS NULL OR mantenedora_id = $1)
          AND ($2::uuid[] IS NULL OR {unit_column} = ANY($2))
        ORDER BY {order_by}
        LIMIT $3 OFFSET $4
        "#,
        table = T::TABLE,
        unit_column = T::UNIT_COLUMN,
        order_by = T::ORDER_BY,
    )
}

fn find_sql<T: ScopedResource>() -> String {
    format!(
        "SELECT * FROM {table} WHERE id = $1 AND ($2::uuid IS NULL OR mantenedora_id = $2)",
        table = T::TABLE,
    )
}

#[async_trait]
impl ScopedStore for ScopedRepository {
    async fn list<T: ScopedResource>(
        &self,
        filter: &ScopeFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<T>, AppError> {
        let sql = list_sql::<T>();

        let rows = sqlx::query_as::<_, T>(&sql)
            .bind(filter.mantenedora_id)
            .bind(filter.unit_ids.clone())
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows)
    }

    async fn find<T: ScopedResource>(
        &self,
        id: Uuid,
        mantenedora_id: Option<Uuid>,
    ) -> Result<Option<T>, AppError> {
        let sql = find_sql::<T>();

        let row = sqlx::query_as::<_, T>(&sql)
            .bind(id)
            .bind(mantenedora_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row)
    }
}

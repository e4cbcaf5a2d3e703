// src/db/unit_scope_repo.rs

use std::collections::BTreeSet;

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::common::error::AppError;

/// Onde ficam as concessões explícitas de unidade (user_role_unit_scopes).
///
/// Semântica de conjunto: conceder duas vezes ou revogar o que não existe
/// não é erro. A unicidade do par é garantida pelo banco, não por lock.
#[async_trait]
pub trait UnitScopeStore: Send + Sync {
    async fn grant(&self, user_role_id: Uuid, unit_id: Uuid) -> Result<(), AppError>;

    async fn revoke(&self, user_role_id: Uuid, unit_id: Uuid) -> Result<(), AppError>;

    async fn list(&self, user_role_id: Uuid) -> Result<BTreeSet<Uuid>, AppError>;
}

#[derive(Clone)]
pub struct UnitScopeRepository {
    pool: PgPool,
}

impl UnitScopeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UnitScopeStore for UnitScopeRepository {
    async fn grant(&self, user_role_id: Uuid, unit_id: Uuid) -> Result<(), AppError> {
        // ON CONFLICT: a PK (user_role_id, unit_id) absorve concessões repetidas e concorrentes
        sqlx::query(
            r#"
            INSERT INTO user_role_unit_scopes (user_role_id, unit_id)
            VALUES ($1, $2)
            ON CONFLICT (user_role_id, unit_id) DO NOTHING
            "#,
        )
            .bind(user_role_id)
            .bind(unit_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                // Cargo ou unidade apagados entre a validação e o INSERT
                if let Some(db_err) = e.as_database_error() {
                    if db_err.is_foreign_key_violation() {
                        return AppError::NotFound;
                    }
                }
                e.into()
            })?;

        Ok(())
    }

    async fn revoke(&self, user_role_id: Uuid, unit_id: Uuid) -> Result<(), AppError> {
        sqlx::query("DELETE FROM user_role_unit_scopes WHERE user_role_id = $1 AND unit_id = $2")
            .bind(user_role_id)
            .bind(unit_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn list(&self, user_role_id: Uuid) -> Result<BTreeSet<Uuid>, AppError> {
        let units = sqlx::query_scalar::<_, Uuid>(
            "SELECT unit_id FROM user_role_unit_scopes WHERE user_role_id = $1",
        )
            .bind(user_role_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(units.into_iter().collect())
    }
}

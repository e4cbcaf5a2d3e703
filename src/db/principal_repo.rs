// src/db/principal_repo.rs

use std::collections::{BTreeSet, HashMap};

use sqlx::PgPool;
use uuid::Uuid;

use crate::common::error::AppError;
use crate::models::access::{HeldRole, Principal, UserRoleRow};
use crate::models::auth::User;

// Carrega tudo que o resolvedor precisa para UMA requisição:
// cargos do usuário + concessões explícitas de unidade.
#[derive(Clone)]
pub struct PrincipalRepository {
    pool: PgPool,
}

const USER_ROLE_SELECT: &str = r#"
    SELECT ur.id AS user_role_id,
           r.role_type,
           r.mantenedora_id,
           ur.scope_level
    FROM user_roles ur
    JOIN roles r ON r.id = ur.role_id
"#;

impl PrincipalRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_user_roles(&self, user_id: Uuid) -> Result<Vec<UserRoleRow>, AppError> {
        let rows = sqlx::query_as::<_, UserRoleRow>(&format!("{USER_ROLE_SELECT} WHERE ur.user_id = $1"))
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows)
    }

    pub async fn find_user_role(&self, user_role_id: Uuid) -> Result<Option<UserRoleRow>, AppError> {
        let row = sqlx::query_as::<_, UserRoleRow>(&format!("{USER_ROLE_SELECT} WHERE ur.id = $1"))
            .bind(user_role_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row)
    }

    // Uma única consulta para todas as concessões (evita N+1)
    async fn find_unit_scopes(
        &self,
        user_role_ids: &[Uuid],
    ) -> Result<HashMap<Uuid, BTreeSet<Uuid>>, AppError> {
        let pairs = sqlx::query_as::<_, (Uuid, Uuid)>(
            r#"
            SELECT user_role_id, unit_id
            FROM user_role_unit_scopes
            WHERE user_role_id = ANY($1)
            "#,
        )
            .bind(user_role_ids)
            .fetch_all(&self.pool)
            .await?;

        let mut scopes: HashMap<Uuid, BTreeSet<Uuid>> = HashMap::new();
        for (user_role_id, unit_id) in pairs {
            scopes.entry(user_role_id).or_default().insert(unit_id);
        }
        Ok(scopes)
    }

    pub async fn load_principal(&self, user: &User) -> Result<Principal, AppError> {
        let rows = self.find_user_roles(user.id).await?;

        let ids: Vec<Uuid> = rows.iter().map(|r| r.user_role_id).collect();
        let mut scopes = if ids.is_empty() {
            HashMap::new()
        } else {
            self.find_unit_scopes(&ids).await?
        };

        let roles = rows
            .into_iter()
            .map(|row| {
                let unit_scopes = scopes.remove(&row.user_role_id).unwrap_or_default();
                HeldRole::from_row(row, unit_scopes)
            })
            .collect();

        Ok(Principal {
            user_id: user.id,
            mantenedora_id: user.mantenedora_id,
            home_unit_id: user.unit_id,
            roles,
        })
    }
}

// src/services/school_service.rs

use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{ScopedRepository, ScopedStore},
    models::access::EffectiveScope,
    models::school::ScopedResource,
};

// Leitura das entidades escolares (unidades, turmas, crianças, diário,
// planejamentos, requisições), sempre através do escopo já resolvido.
#[derive(Clone)]
pub struct SchoolService<S = ScopedRepository> {
    repo: S,
}

impl<S: ScopedStore> SchoolService<S> {
    pub fn new(repo: S) -> Self {
        Self { repo }
    }

    pub async fn list<T: ScopedResource>(
        &self,
        scope: &EffectiveScope,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<T>, AppError> {
        // Escopo vazio é um estado válido: lista vazia, sem ir ao banco
        if scope.is_empty() {
            return Ok(Vec::new());
        }

        self.repo.list::<T>(&scope.filter(), limit, offset).await
    }

    /// 404 se não existe na mantenedora; 403 (ScopeViolation) se existe mas a
    /// unidade está fora do escopo.
    pub async fn get<T: ScopedResource>(&self, scope: &EffectiveScope, id: Uuid) -> Result<T, AppError> {
        let row = self.repo
            .find::<T>(id, scope.mantenedora_id)
            .await?
            .ok_or(AppError::NotFound)?;

        scope.authorize(row.unit_id())?;

        Ok(row)
    }

    /// Só o filtro de mantenedora, sem checar a unidade. Para telas
    /// administrativas, em que a unidade é o OBJETO da ação (ex.: conceder escopo).
    pub async fn find_in_mantenedora<T: ScopedResource>(
        &self,
        scope: &EffectiveScope,
        id: Uuid,
    ) -> Result<T, AppError> {
        self.repo
            .find::<T>(id, scope.mantenedora_id)
            .await?
            .ok_or(AppError::NotFound)
    }
}

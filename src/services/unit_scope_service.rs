// src/services/unit_scope_service.rs

use std::collections::BTreeSet;
use std::sync::Arc;

use uuid::Uuid;

use crate::{
    common::error::{AppError, ScopeError},
    db::UnitScopeStore,
    models::access::{EffectiveScope, RoleLevel, UserRoleRow},
    models::school::Unit,
    services::role_catalog::RoleCatalog,
};

// Regras de negócio em volta das concessões explícitas de unidade.
// O armazenamento em si é idempotente; aqui só validamos QUEM pode conceder O QUÊ.
#[derive(Clone)]
pub struct UnitScopeService {
    store: Arc<dyn UnitScopeStore>,
    catalog: Arc<RoleCatalog>,
}

impl UnitScopeService {
    pub fn new(store: Arc<dyn UnitScopeStore>, catalog: Arc<RoleCatalog>) -> Self {
        Self { store, catalog }
    }

    /// Concede a unidade ao cargo. Conceder de novo não é erro.
    pub async fn grant_unit_scope(
        &self,
        caller: &EffectiveScope,
        target: &UserRoleRow,
        unit: &Unit,
    ) -> Result<(), AppError> {
        let level = self.check_target(caller, target)?;

        // Unidade de outra mantenedora: para quem concede, ela não existe
        if unit.mantenedora_id != target.mantenedora_id {
            return Err(AppError::NotFound);
        }

        // Só MANTENEDORA e STAFF_CENTRAL usam escopo explícito.
        // Para os outros, a linha seria ignorada pelo resolvedor.
        if !matches!(level, RoleLevel::Mantenedora | RoleLevel::StaffCentral) {
            return Err(ScopeError::ScopeNotApplicable { level }.into());
        }

        self.store.grant(target.user_role_id, unit.id).await?;

        tracing::info!(
            user_role_id = %target.user_role_id,
            unit_id = %unit.id,
            unit_code = %unit.code,
            "✅ Escopo de unidade concedido"
        );
        Ok(())
    }

    /// Revoga a unidade do cargo. Revogar o que não existe não é erro.
    /// Vale para qualquer nível, para permitir limpar linhas órfãs.
    pub async fn revoke_unit_scope(
        &self,
        caller: &EffectiveScope,
        target: &UserRoleRow,
        unit_id: Uuid,
    ) -> Result<(), AppError> {
        self.check_target(caller, target)?;

        self.store.revoke(target.user_role_id, unit_id).await?;

        tracing::info!(
            user_role_id = %target.user_role_id,
            unit_id = %unit_id,
            "Escopo de unidade revogado"
        );
        Ok(())
    }

    pub async fn list_unit_scopes(
        &self,
        caller: &EffectiveScope,
        target: &UserRoleRow,
    ) -> Result<BTreeSet<Uuid>, AppError> {
        self.check_target(caller, target)?;
        self.store.list(target.user_role_id).await
    }

    // Quem chama precisa ser MANTENEDORA+ e da mesma mantenedora do cargo alvo.
    fn check_target(&self, caller: &EffectiveScope, target: &UserRoleRow) -> Result<RoleLevel, AppError> {
        caller.require_level(RoleLevel::Mantenedora)?;

        if let Some(org) = caller.mantenedora_id {
            if org != target.mantenedora_id {
                return Err(AppError::NotFound);
            }
        }

        Ok(self.catalog.level_of(&target.role_type)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::unit_scope_repo::memory::MemoryUnitScopeStore;
    use crate::models::access::{RoleType, UnitAccess};
    use chrono::Utc;

    struct Fixture {
        service: UnitScopeService,
        org: Uuid,
    }

    fn fixture() -> Fixture {
        Fixture {
            service: UnitScopeService::new(
                Arc::new(MemoryUnitScopeStore::default()),
                Arc::new(RoleCatalog::standard()),
            ),
            org: Uuid::new_v4(),
        }
    }

    fn caller(org: Option<Uuid>, max_level: RoleLevel) -> EffectiveScope {
        EffectiveScope {
            mantenedora_id: org,
            units: match org {
                None => UnitAccess::AllUnits,
                Some(_) => UnitAccess::Units(BTreeSet::new()),
            },
            max_level,
        }
    }

    fn target(org: Uuid, role_type: RoleType) -> UserRoleRow {
        UserRoleRow {
            user_role_id: Uuid::new_v4(),
            role_type: role_type.as_str().to_string(),
            mantenedora_id: org,
            scope_level: None,
        }
    }

    fn unit(org: Uuid, code: &str) -> Unit {
        Unit {
            id: Uuid::new_v4(),
            mantenedora_id: org,
            code: code.to_string(),
            name: format!("CEI {code}"),
            is_active: true,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn granting_twice_equals_granting_once() {
        let f = fixture();
        let admin = caller(Some(f.org), RoleLevel::Mantenedora);
        let staff = target(f.org, RoleType::StaffCentralPedagogico);
        let arara = unit(f.org, "ARARA-CAN");

        f.service.grant_unit_scope(&admin, &staff, &arara).await.unwrap();
        let once = f.service.list_unit_scopes(&admin, &staff).await.unwrap();
        f.service.grant_unit_scope(&admin, &staff, &arara).await.unwrap();
        let twice = f.service.list_unit_scopes(&admin, &staff).await.unwrap();

        assert_eq!(once, twice);
        assert_eq!(twice, BTreeSet::from([arara.id]));
    }

    #[tokio::test]
    async fn revoke_removes_only_that_unit() {
        let f = fixture();
        let admin = caller(Some(f.org), RoleLevel::Mantenedora);
        let staff = target(f.org, RoleType::StaffCentralPsicologia);
        let (arara, beija) = (unit(f.org, "ARARA-CAN"), unit(f.org, "BEIJA-FLO"));

        f.service.grant_unit_scope(&admin, &staff, &arara).await.unwrap();
        f.service.grant_unit_scope(&admin, &staff, &beija).await.unwrap();
        f.service.revoke_unit_scope(&admin, &staff, arara.id).await.unwrap();
        f.service.revoke_unit_scope(&admin, &staff, arara.id).await.unwrap();

        let units = f.service.list_unit_scopes(&admin, &staff).await.unwrap();
        assert_eq!(units, BTreeSet::from([beija.id]));
    }

    #[tokio::test]
    async fn staff_central_cannot_grant() {
        let f = fixture();
        let staff_caller = caller(Some(f.org), RoleLevel::StaffCentral);
        let staff = target(f.org, RoleType::StaffCentralNutricao);

        let err = f
            .service
            .grant_unit_scope(&staff_caller, &staff, &unit(f.org, "SABIA-CAM"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AppError::Scope(ScopeError::InsufficientLevel { required: RoleLevel::Mantenedora })
        ));
    }

    #[tokio::test]
    async fn unit_bound_roles_do_not_take_explicit_scopes() {
        let f = fixture();
        let admin = caller(Some(f.org), RoleLevel::Mantenedora);
        let professor = target(f.org, RoleType::Professor);

        let err = f
            .service
            .grant_unit_scope(&admin, &professor, &unit(f.org, "BEIJA-FLO"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AppError::Scope(ScopeError::ScopeNotApplicable { level: RoleLevel::Professor })
        ));
        assert!(f.service.list_unit_scopes(&admin, &professor).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn other_mantenedora_is_invisible() {
        let f = fixture();
        let admin = caller(Some(f.org), RoleLevel::Mantenedora);
        let foreign_org = Uuid::new_v4();

        // Cargo alvo de outra mantenedora
        let foreign_staff = target(foreign_org, RoleType::StaffCentralPedagogico);
        let err = f.service.list_unit_scopes(&admin, &foreign_staff).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound));

        // Unidade de outra mantenedora
        let staff = target(f.org, RoleType::StaffCentralPedagogico);
        let err = f
            .service
            .grant_unit_scope(&admin, &staff, &unit(foreign_org, "ARARA-CAN"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound));
    }

    #[tokio::test]
    async fn developer_manages_any_mantenedora() {
        let f = fixture();
        let dev = caller(None, RoleLevel::Developer);
        let foreign_org = Uuid::new_v4();
        let admin_role = target(foreign_org, RoleType::MantenedoraAdmin);
        let arara = unit(foreign_org, "ARARA-CAN");

        f.service.grant_unit_scope(&dev, &admin_role, &arara).await.unwrap();
        let units = f.service.list_unit_scopes(&dev, &admin_role).await.unwrap();
        assert_eq!(units, BTreeSet::from([arara.id]));
    }

    #[tokio::test]
    async fn unknown_target_role_type_is_rejected() {
        let f = fixture();
        let admin = caller(Some(f.org), RoleLevel::Mantenedora);
        let mut bogus = target(f.org, RoleType::StaffCentralPedagogico);
        bogus.role_type = "ESTAGIARIO".into();

        let err = f
            .service
            .grant_unit_scope(&admin, &bogus, &unit(f.org, "ARARA-CAN"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Scope(ScopeError::UnknownRoleType(_))));
    }
}

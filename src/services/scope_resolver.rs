// src/services/scope_resolver.rs

//! Resolvedor de escopo: decide quais unidades um usuário enxerga.
//!
//! Função pura e síncrona sobre dados já carregados da requisição.
//! Sem I/O, sem lock, sem estado global: o catálogo de cargos é injetado.

use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::instrument;
use uuid::Uuid;

use crate::common::error::ScopeError;
use crate::models::access::{EffectiveScope, HeldRole, Principal, RoleLevel, UnitAccess};
use crate::services::role_catalog::RoleCatalog;

#[derive(Debug, Clone)]
pub struct ScopeResolver {
    catalog: Arc<RoleCatalog>,
}

impl ScopeResolver {
    pub fn new(catalog: Arc<RoleCatalog>) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &RoleCatalog {
        &self.catalog
    }

    /// Calcula o escopo efetivo e, se uma unidade foi pedida, autoriza o acesso a ela.
    ///
    /// * `requested_unit = Some(id)`: `ScopeViolation` se a unidade não estiver no escopo.
    /// * `requested_unit = None`: o escopo devolvido é o filtro das listagens.
    #[instrument(
        level = "debug",
        skip(self, principal),
        fields(user_id = %principal.user_id, requested_unit = ?requested_unit)
    )]
    pub fn resolve(
        &self,
        principal: &Principal,
        requested_unit: Option<Uuid>,
    ) -> Result<EffectiveScope, ScopeError> {
        let scope = self.effective_scope(principal)?;

        if let Some(unit_id) = requested_unit {
            scope.authorize(unit_id).inspect_err(|_| {
                tracing::debug!(%unit_id, "Acesso negado: unidade fora do escopo");
            })?;
        }

        Ok(scope)
    }

    fn effective_scope(&self, principal: &Principal) -> Result<EffectiveScope, ScopeError> {
        // Todo cargo precisa existir no catálogo. Um desconhecido derruba a
        // resolução inteira (fail-closed), mesmo que haja outros cargos válidos.
        let leveled = principal
            .roles
            .iter()
            .map(|role| self.catalog.level_of(&role.role_type).map(|level| (role, level)))
            .collect::<Result<Vec<(&HeldRole, RoleLevel)>, ScopeError>>()?;

        // 1. DEVELOPER: todas as unidades de todas as mantenedoras
        if leveled.iter().any(|(_, level)| *level == RoleLevel::Developer) {
            return Ok(EffectiveScope {
                mantenedora_id: None,
                units: UnitAccess::AllUnits,
                max_level: RoleLevel::Developer,
            });
        }

        // 2. Só vale o que pertence à mantenedora do usuário
        let own_roles: Vec<(&HeldRole, RoleLevel)> = leveled
            .into_iter()
            .filter(|(role, _)| {
                let same_org = role.mantenedora_id == principal.mantenedora_id;
                if !same_org {
                    tracing::warn!(
                        user_id = %principal.user_id,
                        user_role_id = %role.user_role_id,
                        role_mantenedora_id = %role.mantenedora_id,
                        "Cargo de outra mantenedora ignorado"
                    );
                }
                same_org
            })
            .collect();

        let max_level = own_roles
            .iter()
            .map(|(_, level)| *level)
            .max()
            .ok_or(ScopeError::NoRoles)?;

        // 3 e 4. Escopo de cada cargo, unidos
        let mut units = BTreeSet::new();
        for (role, level) in &own_roles {
            warn_on_level_drift(role, *level);
            units.extend(role_units(principal, role, *level));
        }

        if units.is_empty() {
            tracing::debug!(user_id = %principal.user_id, "Escopo vazio: listagens voltarão sem linhas");
        }

        Ok(EffectiveScope {
            mantenedora_id: Some(principal.mantenedora_id),
            units: UnitAccess::Units(units),
            max_level,
        })
    }
}

// Unidades acessíveis por UM cargo.
fn role_units(principal: &Principal, role: &HeldRole, level: RoleLevel) -> BTreeSet<Uuid> {
    if !level.is_unit_bound() {
        // MANTENEDORA / STAFF_CENTRAL: exatamente o que foi concedido. Nada concedido = nada.
        return role.unit_scopes.clone();
    }

    // UNIDADE / PROFESSOR: só a unidade "casa". Linhas explícitas são lixo de dados.
    if !role.unit_scopes.is_empty() {
        tracing::warn!(
            user_id = %principal.user_id,
            user_role_id = %role.user_role_id,
            level = %level,
            stray_units = role.unit_scopes.len(),
            "Escopo explícito em cargo preso à unidade; linhas ignoradas"
        );
    }

    match principal.home_unit_id {
        Some(home) => BTreeSet::from([home]),
        None => {
            tracing::warn!(
                user_id = %principal.user_id,
                user_role_id = %role.user_role_id,
                level = %level,
                "Cargo preso à unidade, mas o usuário não tem unidade"
            );
            BTreeSet::new()
        }
    }
}

// O nível gravado na atribuição é só histórico; quem manda é o catálogo.
fn warn_on_level_drift(role: &HeldRole, level: RoleLevel) {
    let Some(recorded) = role.scope_level.as_deref() else {
        return;
    };
    if recorded.parse::<RoleLevel>() != Ok(level) {
        tracing::warn!(
            user_role_id = %role.user_role_id,
            recorded,
            catalog = %level,
            "Nível gravado diverge do catálogo"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::access::RoleType;

    fn resolver() -> ScopeResolver {
        ScopeResolver::new(Arc::new(RoleCatalog::standard()))
    }

    fn role(role_type: RoleType, mantenedora_id: Uuid, scopes: &[Uuid]) -> HeldRole {
        HeldRole {
            user_role_id: Uuid::new_v4(),
            role_type: role_type.as_str().to_string(),
            mantenedora_id,
            scope_level: None,
            unit_scopes: scopes.iter().copied().collect(),
        }
    }

    fn principal(mantenedora_id: Uuid, home: Option<Uuid>, roles: Vec<HeldRole>) -> Principal {
        Principal {
            user_id: Uuid::new_v4(),
            mantenedora_id,
            home_unit_id: home,
            roles,
        }
    }

    fn units(ids: &[Uuid]) -> UnitAccess {
        UnitAccess::Units(ids.iter().copied().collect())
    }

    // Unidades dos cenários de exemplo
    struct Units {
        arara_can: Uuid,
        beija_flo: Uuid,
        sabia_cam: Uuid,
    }

    fn sample_units() -> Units {
        Units {
            arara_can: Uuid::new_v4(),
            beija_flo: Uuid::new_v4(),
            sabia_cam: Uuid::new_v4(),
        }
    }

    mod developer {
        use super::*;

        #[test]
        fn sees_every_unit_of_every_mantenedora() {
            let org = Uuid::new_v4();
            let p = principal(org, None, vec![role(RoleType::Developer, org, &[])]);

            let scope = resolver().resolve(&p, Some(Uuid::new_v4())).unwrap();

            assert_eq!(scope.units, UnitAccess::AllUnits);
            assert_eq!(scope.mantenedora_id, None);
            assert_eq!(scope.max_level, RoleLevel::Developer);
        }

        #[test]
        fn wins_over_narrower_roles() {
            let org = Uuid::new_v4();
            let home = Uuid::new_v4();
            let p = principal(
                org,
                Some(home),
                vec![role(RoleType::Professor, org, &[]), role(RoleType::Developer, org, &[])],
            );

            let scope = resolver().resolve(&p, None).unwrap();
            assert!(scope.is_unrestricted());
        }

        #[test]
        fn developer_role_from_another_org_still_bypasses() {
            let org = Uuid::new_v4();
            let p = principal(org, None, vec![role(RoleType::Developer, Uuid::new_v4(), &[])]);

            assert!(resolver().resolve(&p, Some(Uuid::new_v4())).is_ok());
        }
    }

    mod central_levels {
        use super::*;

        #[test]
        fn without_grants_the_scope_is_empty_not_everything() {
            let org = Uuid::new_v4();
            for role_type in [RoleType::MantenedoraAdmin, RoleType::StaffCentralPedagogico] {
                let p = principal(org, None, vec![role(role_type, org, &[])]);

                let scope = resolver().resolve(&p, None).unwrap();
                assert!(scope.is_empty());
                assert_eq!(scope.filter().unit_ids, Some(vec![]));

                let unit = Uuid::new_v4();
                assert_eq!(
                    resolver().resolve(&p, Some(unit)),
                    Err(ScopeError::ScopeViolation { unit_id: unit })
                );
            }
        }

        #[test]
        fn home_unit_does_not_leak_into_central_roles() {
            let org = Uuid::new_v4();
            let home = Uuid::new_v4();
            let p = principal(org, Some(home), vec![role(RoleType::MantenedoraFinanceiro, org, &[])]);

            assert!(resolver().resolve(&p, Some(home)).is_err());
        }

        #[test]
        fn pedagogico_scenario() {
            let u = sample_units();
            let org = Uuid::new_v4();
            let p = principal(
                org,
                None,
                vec![role(RoleType::StaffCentralPedagogico, org, &[u.arara_can, u.beija_flo])],
            );
            let resolver = resolver();

            assert_eq!(
                resolver.resolve(&p, Some(u.sabia_cam)),
                Err(ScopeError::ScopeViolation { unit_id: u.sabia_cam })
            );
            assert!(resolver.resolve(&p, Some(u.arara_can)).is_ok());

            let list = resolver.resolve(&p, None).unwrap();
            let mut expected = vec![u.arara_can, u.beija_flo];
            expected.sort();
            assert_eq!(list.filter().unit_ids, Some(expected));
            assert_eq!(list.filter().mantenedora_id, Some(org));
        }
    }

    mod unit_bound_levels {
        use super::*;

        #[test]
        fn scope_is_exactly_the_home_unit() {
            let org = Uuid::new_v4();
            let home = Uuid::new_v4();
            for role_type in [RoleType::UnidadeDiretor, RoleType::Professor] {
                let p = principal(org, Some(home), vec![role(role_type, org, &[])]);
                let scope = resolver().resolve(&p, None).unwrap();
                assert_eq!(scope.units, units(&[home]));
            }
        }

        #[test]
        fn stray_explicit_scope_is_ignored() {
            let u = sample_units();
            let org = Uuid::new_v4();
            let p = principal(
                org,
                Some(u.arara_can),
                vec![role(RoleType::Professor, org, &[u.beija_flo])],
            );

            let scope = resolver().resolve(&p, None).unwrap();
            assert_eq!(scope.units, units(&[u.arara_can]));
            assert_eq!(
                resolver().resolve(&p, Some(u.beija_flo)),
                Err(ScopeError::ScopeViolation { unit_id: u.beija_flo })
            );
        }

        #[test]
        fn without_home_unit_the_scope_is_empty() {
            let org = Uuid::new_v4();
            let p = principal(org, None, vec![role(RoleType::UnidadeSecretario, org, &[])]);

            let scope = resolver().resolve(&p, None).unwrap();
            assert!(scope.is_empty());
            assert_eq!(scope.max_level, RoleLevel::Unidade);
        }
    }

    mod combination {
        use super::*;

        #[test]
        fn union_of_central_and_professor_roles() {
            let org = Uuid::new_v4();
            let (a, b, c) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
            let p = principal(
                org,
                Some(c),
                vec![
                    role(RoleType::StaffCentralPsicologia, org, &[a, b]),
                    role(RoleType::Professor, org, &[]),
                ],
            );

            let scope = resolver().resolve(&p, None).unwrap();
            assert_eq!(scope.units, units(&[a, b, c]));
            assert_eq!(scope.max_level, RoleLevel::StaffCentral);
        }

        #[test]
        fn roles_from_another_mantenedora_are_dropped() {
            let org = Uuid::new_v4();
            let other_org = Uuid::new_v4();
            let (mine, theirs) = (Uuid::new_v4(), Uuid::new_v4());
            let p = principal(
                org,
                None,
                vec![
                    role(RoleType::StaffCentralNutricao, org, &[mine]),
                    role(RoleType::MantenedoraAdmin, other_org, &[theirs]),
                ],
            );

            let scope = resolver().resolve(&p, None).unwrap();
            assert_eq!(scope.units, units(&[mine]));
            assert_eq!(scope.max_level, RoleLevel::StaffCentral);
        }

        #[test]
        fn only_foreign_roles_means_no_roles() {
            let p = principal(
                Uuid::new_v4(),
                None,
                vec![role(RoleType::MantenedoraAdmin, Uuid::new_v4(), &[Uuid::new_v4()])],
            );
            assert_eq!(resolver().resolve(&p, None), Err(ScopeError::NoRoles));
        }
    }

    mod failures {
        use super::*;

        #[test]
        fn principal_without_roles_is_denied() {
            let p = principal(Uuid::new_v4(), Some(Uuid::new_v4()), vec![]);
            assert_eq!(resolver().resolve(&p, None), Err(ScopeError::NoRoles));
            assert_eq!(resolver().resolve(&p, Some(Uuid::new_v4())), Err(ScopeError::NoRoles));
        }

        #[test]
        fn unknown_role_type_fails_closed() {
            let org = Uuid::new_v4();
            let mut bogus = role(RoleType::Professor, org, &[]);
            bogus.role_type = "ZELADOR".into();
            let p = principal(
                org,
                Some(Uuid::new_v4()),
                vec![role(RoleType::MantenedoraAdmin, org, &[Uuid::new_v4()]), bogus],
            );

            assert_eq!(
                resolver().resolve(&p, None),
                Err(ScopeError::UnknownRoleType("ZELADOR".into()))
            );
        }

        #[test]
        fn injected_catalog_is_authoritative() {
            // Catálogo que rebaixa o financeiro para nível de unidade
            let catalog = RoleCatalog::from_entries([(
                RoleType::MantenedoraFinanceiro,
                RoleLevel::Unidade,
                "Financeiro local",
            )]);
            let resolver = ScopeResolver::new(Arc::new(catalog));
            let org = Uuid::new_v4();
            let home = Uuid::new_v4();
            let p = principal(
                org,
                Some(home),
                vec![role(RoleType::MantenedoraFinanceiro, org, &[Uuid::new_v4()])],
            );

            let scope = resolver.resolve(&p, None).unwrap();
            assert_eq!(scope.units, units(&[home]));
        }

        #[test]
        fn recorded_level_drift_does_not_change_the_result() {
            let org = Uuid::new_v4();
            let unit = Uuid::new_v4();
            let mut held = role(RoleType::StaffCentralPedagogico, org, &[unit]);
            held.scope_level = Some("PROFESSOR".into());
            let p = principal(org, None, vec![held]);

            let scope = resolver().resolve(&p, None).unwrap();
            assert_eq!(scope.units, units(&[unit]));
            assert_eq!(scope.max_level, RoleLevel::StaffCentral);
        }
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        fn uuid() -> impl Strategy<Value = Uuid> {
            any::<u128>().prop_map(Uuid::from_u128)
        }

        fn role_type() -> impl Strategy<Value = RoleType> {
            proptest::sample::select(RoleType::ALL.to_vec())
        }

        fn central_role_type() -> impl Strategy<Value = RoleType> {
            proptest::sample::select(vec![
                RoleType::MantenedoraAdmin,
                RoleType::MantenedoraFinanceiro,
                RoleType::StaffCentralPedagogico,
                RoleType::StaffCentralPsicologia,
                RoleType::StaffCentralNutricao,
            ])
        }

        fn unit_bound_role_type() -> impl Strategy<Value = RoleType> {
            proptest::sample::select(vec![
                RoleType::UnidadeDiretor,
                RoleType::UnidadeCoordenador,
                RoleType::UnidadeSecretario,
                RoleType::UnidadeNutricionista,
                RoleType::Professor,
                RoleType::ProfessorAuxiliar,
            ])
        }

        proptest! {
            /// Qualquer combinação com um DEVELOPER libera qualquer unidade.
            #[test]
            fn developer_allows_any_unit(
                org in uuid(),
                others in proptest::collection::vec((role_type(), proptest::collection::vec(uuid(), 0..4)), 0..4),
                requested in uuid(),
            ) {
                let mut roles: Vec<HeldRole> = others
                    .iter()
                    .map(|(rt, scopes)| role(*rt, org, scopes))
                    .collect();
                roles.push(role(RoleType::Developer, org, &[]));
                let p = principal(org, None, roles);

                let scope = resolver().resolve(&p, Some(requested)).unwrap();
                prop_assert_eq!(scope.units, UnitAccess::AllUnits);
            }

            /// Cargos presos à unidade enxergam só a unidade casa.
            #[test]
            fn unit_bound_scope_is_home_only(
                org in uuid(),
                home in uuid(),
                rt in unit_bound_role_type(),
                stray in proptest::collection::vec(uuid(), 0..6),
            ) {
                let p = principal(org, Some(home), vec![role(rt, org, &stray)]);
                let scope = resolver().resolve(&p, None).unwrap();
                prop_assert_eq!(scope.units, units(&[home]));
            }

            /// Cargos centrais enxergam exatamente o que foi concedido.
            #[test]
            fn central_scope_is_exactly_the_grants(
                org in uuid(),
                home in proptest::option::of(uuid()),
                rt in central_role_type(),
                grants in proptest::collection::btree_set(uuid(), 0..6),
                requested in uuid(),
            ) {
                let granted: Vec<Uuid> = grants.iter().copied().collect();
                let p = principal(org, home, vec![role(rt, org, &granted)]);
                let resolver = resolver();

                let scope = resolver.resolve(&p, None).unwrap();
                prop_assert_eq!(&scope.units, &UnitAccess::Units(grants.clone()));
                prop_assert_eq!(
                    resolver.resolve(&p, Some(requested)).is_ok(),
                    grants.contains(&requested)
                );
            }

            /// O escopo de vários cargos é a união dos escopos individuais.
            #[test]
            fn multiple_roles_union(
                org in uuid(),
                home in uuid(),
                central in central_role_type(),
                bound in unit_bound_role_type(),
                grants in proptest::collection::btree_set(uuid(), 0..6),
            ) {
                let granted: Vec<Uuid> = grants.iter().copied().collect();
                let p = principal(
                    org,
                    Some(home),
                    vec![role(central, org, &granted), role(bound, org, &[])],
                );

                let mut expected = grants.clone();
                expected.insert(home);
                let scope = resolver().resolve(&p, None).unwrap();
                prop_assert_eq!(scope.units, UnitAccess::Units(expected));
            }
        }
    }
}

// src/services/role_catalog.rs

use std::collections::HashMap;

use crate::common::error::ScopeError;
use crate::models::access::{CatalogEntry, RoleLevel, RoleType};

/// Tabela fixa RoleType -> (RoleLevel, rótulo).
///
/// Montada uma vez na inicialização e injetada no resolvedor. Não é editável
/// pelo usuário; um catálogo customizado só existe em testes.
#[derive(Debug, Clone)]
pub struct RoleCatalog {
    entries: HashMap<RoleType, (RoleLevel, &'static str)>,
}

impl RoleCatalog {
    pub fn standard() -> Self {
        Self::from_entries(RoleType::ALL.into_iter().map(|rt| {
            let (level, label) = standard_entry(rt);
            (rt, level, label)
        }))
    }

    pub fn from_entries(entries: impl IntoIterator<Item = (RoleType, RoleLevel, &'static str)>) -> Self {
        Self {
            entries: entries
                .into_iter()
                .map(|(rt, level, label)| (rt, (level, label)))
                .collect(),
        }
    }

    /// Resolve o nível de um cargo vindo do banco (TEXT).
    pub fn level_of(&self, raw_role_type: &str) -> Result<RoleLevel, ScopeError> {
        let role_type: RoleType = raw_role_type
            .parse()
            .map_err(ScopeError::UnknownRoleType)?;
        self.level_of_type(role_type)
    }

    pub fn level_of_type(&self, role_type: RoleType) -> Result<RoleLevel, ScopeError> {
        self.entries
            .get(&role_type)
            .map(|(level, _)| *level)
            .ok_or_else(|| ScopeError::UnknownRoleType(role_type.to_string()))
    }

    pub fn label_of(&self, role_type: RoleType) -> Option<&'static str> {
        self.entries.get(&role_type).map(|(_, label)| *label)
    }

    /// Entradas ordenadas do nível mais amplo para o mais restrito.
    pub fn entries(&self) -> Vec<CatalogEntry> {
        let mut entries: Vec<CatalogEntry> = self
            .entries
            .iter()
            .map(|(role_type, (level, _))| CatalogEntry {
                role_type: *role_type,
                level: *level,
                label: self.label_of(*role_type).unwrap_or(role_type.as_str()).to_string(),
            })
            .collect();
        entries.sort_by(|a, b| {
            b.level
                .cmp(&a.level)
                .then_with(|| a.role_type.as_str().cmp(b.role_type.as_str()))
        });
        entries
    }
}

fn standard_entry(role_type: RoleType) -> (RoleLevel, &'static str) {
    match role_type {
        RoleType::Developer => (RoleLevel::Developer, "Desenvolvedor"),
        RoleType::MantenedoraAdmin => (RoleLevel::Mantenedora, "Mantenedora - Administração"),
        RoleType::MantenedoraFinanceiro => (RoleLevel::Mantenedora, "Mantenedora - Financeiro"),
        RoleType::StaffCentralPedagogico => (RoleLevel::StaffCentral, "Equipe Central - Pedagógico"),
        RoleType::StaffCentralPsicologia => (RoleLevel::StaffCentral, "Equipe Central - Psicologia"),
        RoleType::StaffCentralNutricao => (RoleLevel::StaffCentral, "Equipe Central - Nutrição"),
        RoleType::UnidadeDiretor => (RoleLevel::Unidade, "Direção da Unidade"),
        RoleType::UnidadeCoordenador => (RoleLevel::Unidade, "Coordenação Pedagógica da Unidade"),
        RoleType::UnidadeSecretario => (RoleLevel::Unidade, "Secretaria da Unidade"),
        RoleType::UnidadeNutricionista => (RoleLevel::Unidade, "Nutrição da Unidade"),
        RoleType::Professor => (RoleLevel::Professor, "Professor(a)"),
        RoleType::ProfessorAuxiliar => (RoleLevel::Professor, "Professor(a) Auxiliar"),
    }
}

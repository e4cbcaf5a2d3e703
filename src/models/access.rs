// src/models/access.rs

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use utoipa::ToSchema;

use crate::common::error::ScopeError;

// ---
// 1. RoleLevel (A "Largura" do acesso)
// ---
// A ordem de declaração importa: o `Ord` derivado usa ela.
// PROFESSOR < UNIDADE < STAFF_CENTRAL < MANTENEDORA < DEVELOPER
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoleLevel {
    Professor,
    Unidade,
    StaffCentral,
    Mantenedora,
    Developer,
}

impl RoleLevel {
    pub const ALL: [RoleLevel; 5] = [
        RoleLevel::Professor,
        RoleLevel::Unidade,
        RoleLevel::StaffCentral,
        RoleLevel::Mantenedora,
        RoleLevel::Developer,
    ];

    /// Níveis presos à unidade "casa" do usuário. Para eles, as linhas de
    /// `user_role_unit_scopes` não valem nada.
    pub fn is_unit_bound(self) -> bool {
        matches!(self, RoleLevel::Unidade | RoleLevel::Professor)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RoleLevel::Developer => "DEVELOPER",
            RoleLevel::Mantenedora => "MANTENEDORA",
            RoleLevel::StaffCentral => "STAFF_CENTRAL",
            RoleLevel::Unidade => "UNIDADE",
            RoleLevel::Professor => "PROFESSOR",
        }
    }
}

impl fmt::Display for RoleLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RoleLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RoleLevel::ALL
            .into_iter()
            .find(|level| level.as_str() == s)
            .ok_or_else(|| s.to_string())
    }
}

// ---
// 2. RoleType (O "Cargo" nomeado)
// ---
// No banco fica como TEXT, por isso um valor desconhecido é possível
// e precisa ser tratado pelo catálogo (UnknownRoleType).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoleType {
    Developer,
    MantenedoraAdmin,
    MantenedoraFinanceiro,
    StaffCentralPedagogico,
    StaffCentralPsicologia,
    StaffCentralNutricao,
    UnidadeDiretor,
    UnidadeCoordenador,
    UnidadeSecretario,
    UnidadeNutricionista,
    Professor,
    ProfessorAuxiliar,
}

impl RoleType {
    pub const ALL: [RoleType; 12] = [
        RoleType::Developer,
        RoleType::MantenedoraAdmin,
        RoleType::MantenedoraFinanceiro,
        RoleType::StaffCentralPedagogico,
        RoleType::StaffCentralPsicologia,
        RoleType::StaffCentralNutricao,
        RoleType::UnidadeDiretor,
        RoleType::UnidadeCoordenador,
        RoleType::UnidadeSecretario,
        RoleType::UnidadeNutricionista,
        RoleType::Professor,
        RoleType::ProfessorAuxiliar,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            RoleType::Developer => "DEVELOPER",
            RoleType::MantenedoraAdmin => "MANTENEDORA_ADMIN",
            RoleType::MantenedoraFinanceiro => "MANTENEDORA_FINANCEIRO",
            RoleType::StaffCentralPedagogico => "STAFF_CENTRAL_PEDAGOGICO",
            RoleType::StaffCentralPsicologia => "STAFF_CENTRAL_PSICOLOGIA",
            RoleType::StaffCentralNutricao => "STAFF_CENTRAL_NUTRICAO",
            RoleType::UnidadeDiretor => "UNIDADE_DIRETOR",
            RoleType::UnidadeCoordenador => "UNIDADE_COORDENADOR",
            RoleType::UnidadeSecretario => "UNIDADE_SECRETARIO",
            RoleType::UnidadeNutricionista => "UNIDADE_NUTRICIONISTA",
            RoleType::Professor => "PROFESSOR",
            RoleType::ProfessorAuxiliar => "PROFESSOR_AUXILIAR",
        }
    }
}

impl fmt::Display for RoleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RoleType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RoleType::ALL
            .into_iter()
            .find(|role_type| role_type.as_str() == s)
            .ok_or_else(|| s.to_string())
    }
}

// Uma linha do catálogo, para o frontend montar a tela de cargos
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
    #[schema(example = "STAFF_CENTRAL_PEDAGOGICO")]
    pub role_type: RoleType,
    #[schema(example = "STAFF_CENTRAL")]
    pub level: RoleLevel,
    #[schema(example = "Equipe Central - Pedagógico")]
    pub label: String,
}

// ---
// 3. Linhas vindas do banco
// ---

// user_roles JOIN roles
#[derive(Debug, Clone, FromRow)]
pub struct UserRoleRow {
    pub user_role_id: Uuid,
    pub role_type: String,
    pub mantenedora_id: Uuid,
    // Nível gravado no momento da atribuição (pode divergir do catálogo)
    pub scope_level: Option<String>,
}

// ---
// 4. Principal (O que o resolvedor recebe)
// ---

#[derive(Debug, Clone)]
pub struct HeldRole {
    pub user_role_id: Uuid,
    pub role_type: String,
    pub mantenedora_id: Uuid,
    pub scope_level: Option<String>,
    pub unit_scopes: BTreeSet<Uuid>,
}

impl HeldRole {
    pub fn from_row(row: UserRoleRow, unit_scopes: BTreeSet<Uuid>) -> Self {
        Self {
            user_role_id: row.user_role_id,
            role_type: row.role_type,
            mantenedora_id: row.mantenedora_id,
            scope_level: row.scope_level,
            unit_scopes,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Principal {
    pub user_id: Uuid,
    pub mantenedora_id: Uuid,
    pub home_unit_id: Option<Uuid>,
    pub roles: Vec<HeldRole>,
}

// ---
// 5. Resultado da resolução
// ---

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnitAccess {
    // Bypass total (DEVELOPER)
    AllUnits,
    Units(BTreeSet<Uuid>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectiveScope {
    // None = todas as mantenedoras
    pub mantenedora_id: Option<Uuid>,
    pub units: UnitAccess,
    pub max_level: RoleLevel,
}

impl EffectiveScope {
    pub fn is_unrestricted(&self) -> bool {
        matches!(self.units, UnitAccess::AllUnits)
    }

    pub fn allows(&self, unit_id: Uuid) -> bool {
        match &self.units {
            UnitAccess::AllUnits => true,
            UnitAccess::Units(units) => units.contains(&unit_id),
        }
    }

    /// ALLOW/DENY de uma unidade específica.
    pub fn authorize(&self, unit_id: Uuid) -> Result<(), ScopeError> {
        if self.allows(unit_id) {
            Ok(())
        } else {
            Err(ScopeError::ScopeViolation { unit_id })
        }
    }

    /// Escopo vazio: o usuário tem cargos mas nenhuma unidade.
    /// Não é erro, as listagens apenas voltam vazias.
    pub fn is_empty(&self) -> bool {
        matches!(&self.units, UnitAccess::Units(units) if units.is_empty())
    }

    /// Para telas e ações administrativas (ex.: conceder escopo).
    pub fn require_level(&self, required: RoleLevel) -> Result<(), ScopeError> {
        if self.max_level >= required {
            Ok(())
        } else {
            Err(ScopeError::InsufficientLevel { required })
        }
    }

    pub fn filter(&self) -> ScopeFilter {
        ScopeFilter {
            mantenedora_id: self.mantenedora_id,
            unit_ids: match &self.units {
                UnitAccess::AllUnits => None,
                UnitAccess::Units(units) => Some(units.iter().copied().collect()),
            },
        }
    }

    pub fn summary(&self) -> ScopeSummary {
        ScopeSummary {
            mantenedora_id: self.mantenedora_id,
            max_level: self.max_level,
            all_units: self.is_unrestricted(),
            unit_ids: match &self.units {
                UnitAccess::AllUnits => Vec::new(),
                UnitAccess::Units(units) => units.iter().copied().collect(),
            },
        }
    }
}

/// Filtro aplicado em TODA consulta de entidade da mantenedora.
/// `None` significa "sem restrição" naquele eixo; `Some(vec![])` não retorna linhas.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeFilter {
    pub mantenedora_id: Option<Uuid>,
    pub unit_ids: Option<Vec<Uuid>>,
}

// Resposta do GET /api/me/scope (para o frontend esconder menus)
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScopeSummary {
    pub mantenedora_id: Option<Uuid>,
    #[schema(example = "STAFF_CENTRAL")]
    pub max_level: RoleLevel,
    pub all_units: bool,
    pub unit_ids: Vec<Uuid>,
}

// src/config.rs

use std::{env, sync::Arc, time::Duration};

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    common::i18n::I18nStore,
    db::{PrincipalRepository, ScopedRepository, UnitScopeRepository, UserRepository},
    services::{
        auth::AuthService,
        role_catalog::RoleCatalog,
        school_service::SchoolService,
        scope_resolver::ScopeResolver,
        unit_scope_service::UnitScopeService,
    },
};

// Variáveis de ambiente (ou .env)
#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub bind_addr: String,
    pub db_max_connections: u32,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").context("DATABASE_URL deve ser definida")?;
        let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET deve ser definido")?;
        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
        let db_max_connections = match env::var("DB_MAX_CONNECTIONS") {
            Ok(raw) => raw
                .parse()
                .with_context(|| format!("DB_MAX_CONNECTIONS inválido: '{}'", raw))?,
            Err(_) => 5,
        };

        Ok(Self { database_url, jwt_secret, bind_addr, db_max_connections })
    }
}

// O estado compartilhado que será acessível em toda a aplicação
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub i18n_store: Arc<I18nStore>,
    pub scope_resolver: Arc<ScopeResolver>,
    pub principal_repo: PrincipalRepository,
    pub auth_service: AuthService,
    pub unit_scope_service: UnitScopeService,
    pub school_service: SchoolService,
}

impl AppState {
    pub async fn new(config: &Config) -> anyhow::Result<Self> {
        // Conecta ao banco de dados, usando '?' para propagar erros
        let db_pool = PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&config.database_url)
            .await
            .context("Falha ao conectar ao banco de dados")?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        // O catálogo é montado aqui e injetado: nada de mapa global
        let catalog = Arc::new(RoleCatalog::standard());

        Self::assemble(db_pool, config.jwt_secret.clone(), catalog)
    }

    // --- Monta o gráfico de dependências ---
    fn assemble(db_pool: PgPool, jwt_secret: String, catalog: Arc<RoleCatalog>) -> anyhow::Result<Self> {
        let i18n_store = Arc::new(I18nStore::load()?);
        let scope_resolver = Arc::new(ScopeResolver::new(catalog.clone()));

        let user_repo = UserRepository::new(db_pool.clone());
        let auth_service = AuthService::new(user_repo, jwt_secret);

        let unit_scope_repo = UnitScopeRepository::new(db_pool.clone());
        let unit_scope_service = UnitScopeService::new(Arc::new(unit_scope_repo), catalog);

        let school_service = SchoolService::new(ScopedRepository::new(db_pool.clone()));

        Ok(Self {
            principal_repo: PrincipalRepository::new(db_pool.clone()),
            db_pool,
            i18n_store,
            scope_resolver,
            auth_service,
            unit_scope_service,
            school_service,
        })
    }
}

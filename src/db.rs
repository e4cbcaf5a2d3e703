pub mod user_repo;
pub use user_repo::UserRepository;
pub mod principal_repo;
pub use principal_repo::PrincipalRepository;
pub mod unit_scope_repo;
pub use unit_scope_repo::{UnitScopeRepository, UnitScopeStore};
pub mod scoped_repo;
pub use scoped_repo::{ScopedRepository, ScopedStore};

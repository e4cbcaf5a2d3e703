pub mod auth;
pub mod role_catalog;
pub mod scope_resolver;
pub mod unit_scope_service;
pub mod school_service;

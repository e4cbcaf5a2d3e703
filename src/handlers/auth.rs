// src/handlers/auth.rs

use axum::Json;

use crate::{
    middleware::auth::AuthenticatedUser,
    models::auth::User,
};

// Handler da rota protegida /me
#[utoipa::path(
    get,
    path = "/api/me",
    tag = "Users",
    responses(
        (status = 200, description = "Usuário autenticado", body = User),
        (status = 401, description = "Token inválido ou usuário desativado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_me(AuthenticatedUser(user): AuthenticatedUser) -> Json<User> {
    Json(user)
}

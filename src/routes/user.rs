//! User routes for the anime catalog
//!
//! - GET /api/users - Paginated list of users
//! - POST /api/users - Register a user (form or JSON body)
//! - GET /api/users/{username} - Case-insensitive lookup

use actix_web::{web, Either, HttpResponse};
use tracing::{error, info};

use crate::auth::hash_password;
use crate::db::{create_user, find_user_by_username, list_users};
use crate::error::{AppError, AppResult};
use crate::models::{ApiError, CredentialsRequest, User};
use crate::routes::{AppState, PageQuery};

/// Message returned when a registration is missing a field
const INVALID_INFORMATION: &str = "Invalid information received.";

/// GET /api/users - List users ordered by username
#[utoipa::path(
    get,
    path = "/api/users",
    tag = "users",
    params(PageQuery),
    responses(
        (status = 200, description = "Page of users", body = Vec<User>),
        (status = 500, description = "Internal server error", body = ApiError)
    )
)]
pub async fn get_users(
    data: web::Data<AppState>,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let users = list_users(data.db.pool(), &query.pagination())
        .await
        .inspect_err(|e| error!("Get Users: {}", e))?;

    Ok(HttpResponse::Ok().json(users))
}

/// POST /api/users - Register a new user
///
/// Accepts `username` and `password` either form-encoded or as JSON. The
/// password is stored as an Argon2 hash. A username that already exists,
/// in any letter case, is rejected with a 500.
#[utoipa::path(
    post,
    path = "/api/users",
    tag = "users",
    request_body = CredentialsRequest,
    responses(
        (status = 201, description = "User created", body = User),
        (status = 400, description = "Missing username or password", body = ApiError),
        (status = 500, description = "Internal server error", body = ApiError)
    )
)]
pub async fn store_user(
    data: web::Data<AppState>,
    body: Either<web::Form<CredentialsRequest>, web::Json<CredentialsRequest>>,
) -> AppResult<HttpResponse> {
    let request = match body {
        Either::Left(form) => form.into_inner(),
        Either::Right(json) => json.into_inner(),
    };

    let Some((username, password)) = request.required() else {
        return Err(AppError::validation(INVALID_INFORMATION));
    };

    let password = password.to_owned();
    let password_hash = web::block(move || hash_password(&password))
        .await
        .map_err(|e| AppError::internal(e.to_string()))??;

    let user = create_user(data.db.pool(), username, &password_hash)
        .await
        .inspect_err(|e| error!("Store Users: {}", e))?;

    info!("User registered: {}", user.username);
    Ok(HttpResponse::Created().json(user))
}

/// GET /api/users/{username} - Look up one user
#[utoipa::path(
    get,
    path = "/api/users/{username}",
    tag = "users",
    params(
        ("username" = String, Path, description = "Username, matched without regard to case")
    ),
    responses(
        (status = 200, description = "User found", body = User),
        (status = 404, description = "No such user; body is null"),
        (status = 500, description = "Internal server error", body = ApiError)
    )
)]
pub async fn get_user_by_username(
    data: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let username = path.into_inner();

    let user = find_user_by_username(data.db.pool(), &username)
        .await
        .inspect_err(|e| error!("Get User: {}", e))?
        .ok_or_else(|| AppError::not_found(format!("user {username}")))?;

    Ok(HttpResponse::Ok().json(user))
}

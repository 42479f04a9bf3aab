//! Authentication routes for the anime catalog
//!
//! The HTML flow keeps the token in an HTTP-only cookie:
//! - GET /api/login - Login form
//! - POST /api/login - Check credentials, set the cookie, redirect home
//! - GET /logout - Clear the cookie
//!
//! API clients exchange credentials for a bearer token instead:
//! - POST /auth - Issue a token
//! - GET /protected - Current user, requires a token

use actix_web::http::header::{self, ContentType};
use actix_web::{web, HttpResponse};
use tracing::{error, info, warn};

use crate::auth::{
    authenticate, create_auth_cookie, create_logout_cookie, generate_token, Auth, AuthError,
};
use crate::db::find_user_by_id;
use crate::error::{AppError, AppResult};
use crate::models::{ApiError, CredentialsRequest, TokenResponse, User};
use crate::routes::{anime_page, html, AppState, PageQuery};
use crate::views;

/// Message shown on the login page after a failed attempt
const LOGIN_FAILED: &str = "Invalid username or password.";

/// GET /api/login - Login form
pub async fn login_page() -> HttpResponse {
    html(views::login_page(None))
}

/// POST /api/login - Log in from the HTML form
///
/// On success the auth cookie is set and the browser is sent to the listing.
/// Wrong credentials re-render the form with an error message.
pub async fn login(
    data: web::Data<AppState>,
    form: web::Form<CredentialsRequest>,
) -> AppResult<HttpResponse> {
    let Some((username, password)) = form.required() else {
        return Err(AppError::validation("Username and password are required."));
    };

    let Some(user) = authenticate(data.db.pool(), username, password).await else {
        warn!("Failed login attempt for {}", username);
        return Ok(html(views::login_page(Some(LOGIN_FAILED))));
    };

    let token = generate_token(user.id, &data.config.jwt_secret)
        .inspect_err(|e| error!("Login: {}", e))?;
    info!("User logged in: {}", user.username);

    Ok(HttpResponse::SeeOther()
        .cookie(create_auth_cookie(&token, data.config.cookie_secure))
        .insert_header((header::LOCATION, "/"))
        .finish())
}

/// GET /logout - Clear the auth cookie and show the listing signed out
pub async fn logout(
    data: web::Data<AppState>,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let page = query.pagination();
    let (records, total) = anime_page(&data, &page)
        .await
        .inspect_err(|e| error!("Logout: {}", e))?;

    Ok(HttpResponse::Ok()
        .cookie(create_logout_cookie(data.config.cookie_secure))
        .content_type(ContentType::html())
        .body(views::anime_index(&records, &page, total, "/", false).into_string()))
}

/// POST /auth - Exchange credentials for a bearer token
#[utoipa::path(
    post,
    path = "/auth",
    tag = "auth",
    request_body = CredentialsRequest,
    responses(
        (status = 200, description = "Token issued", body = TokenResponse),
        (status = 400, description = "Missing username or password", body = ApiError),
        (status = 401, description = "Invalid credentials", body = ApiError),
        (status = 500, description = "Internal server error", body = ApiError)
    )
)]
pub async fn issue_token(
    data: web::Data<AppState>,
    body: web::Json<CredentialsRequest>,
) -> AppResult<HttpResponse> {
    let Some((username, password)) = body.required() else {
        return Err(AppError::validation("Username and password are required."));
    };

    let user = authenticate(data.db.pool(), username, password)
        .await
        .ok_or(AuthError::InvalidCredentials)
        .inspect_err(|_| warn!("Failed token request for {}", username))?;

    let access_token = generate_token(user.id, &data.config.jwt_secret)
        .inspect_err(|e| error!("Issue token: {}", e))?;

    Ok(HttpResponse::Ok().json(TokenResponse { access_token }))
}

/// GET /protected - The user the token was issued to
///
/// A token for a user that no longer exists is treated as invalid.
#[utoipa::path(
    get,
    path = "/protected",
    tag = "auth",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Authenticated user", body = User),
        (status = 401, description = "Not authenticated", body = ApiError),
        (status = 500, description = "Internal server error", body = ApiError)
    )
)]
pub async fn protected(data: web::Data<AppState>, auth: Auth) -> AppResult<HttpResponse> {
    let user = find_user_by_id(data.db.pool(), auth.user_id)
        .await
        .inspect_err(|e| error!("Protected: {}", e))?
        .ok_or(AuthError::InvalidCredentials)?;

    Ok(HttpResponse::Ok().json(user))
}

//! HTTP routes for the anime catalog
//!
//! This module wires every route and holds the anime page handlers. User and
//! authentication handlers live in the `user` and `auth` submodules.

pub mod auth;
pub mod user;

use actix_web::http::header::{self, ContentType};
use actix_web::{web, HttpRequest, HttpResponse};
use maud::Markup;
use serde::Deserialize;
use tracing::{error, info};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{IntoParams, Modify, OpenApi};

use crate::auth::validate_http_request;
use crate::config::Config;
use crate::db::{
    count_anime, find_anime_by_id, insert_anime, list_anime, Database, RepositoryResult,
};
use crate::error::{AppError, AppResult};
use crate::models::{Anime, AnimeForm, ApiError, CredentialsRequest, Pagination, TokenResponse, User};
use crate::views;

/// Application state shared across handlers
pub struct AppState {
    pub db: Database,
    pub config: Config,
}

/// Pagination query parameters shared by the listing endpoints
///
/// Values are kept as raw strings so that garbage falls back to the defaults
/// instead of rejecting the request.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PageQuery {
    /// 1-based page number (default: 1)
    pub offset: Option<String>,
    /// Page size (default: 10, max: 100)
    pub limit: Option<String>,
}

impl PageQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination::from_params(self.offset.as_deref(), self.limit.as_deref())
    }
}

pub(crate) fn html(markup: Markup) -> HttpResponse {
    HttpResponse::Ok()
        .content_type(ContentType::html())
        .body(markup.into_string())
}

/// Whether the request carries a valid token (header or cookie)
pub(crate) fn is_authenticated(req: &HttpRequest, data: &AppState) -> bool {
    validate_http_request(req, &data.config.jwt_secret).is_ok()
}

/// One page of anime together with the size of the whole catalog
pub(crate) async fn anime_page(
    data: &AppState,
    page: &Pagination,
) -> RepositoryResult<(Vec<Anime>, i64)> {
    let records = list_anime(data.db.pool(), page).await?;
    let total = count_anime(data.db.pool()).await?;
    Ok((records, total))
}

/// GET /health - Liveness check
pub async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// GET /health/db - Database connectivity check, 503 when unreachable
pub async fn db_health_check(data: web::Data<AppState>) -> HttpResponse {
    match data.db.health_check().await {
        Ok(()) => HttpResponse::Ok().json(serde_json::json!({
            "status": "healthy",
            "database": "connected",
            "timestamp": chrono::Utc::now().to_rfc3339()
        })),
        Err(e) => {
            error!("Database health check failed: {}", e);
            HttpResponse::ServiceUnavailable().json(serde_json::json!({
                "status": "unhealthy",
                "database": "disconnected",
                "timestamp": chrono::Utc::now().to_rfc3339()
            }))
        }
    }
}

/// GET / - Landing page with the first anime page
///
/// A database failure is logged and rendered as an empty page.
pub async fn home(
    req: HttpRequest,
    data: web::Data<AppState>,
    query: web::Query<PageQuery>,
) -> HttpResponse {
    let page = query.pagination();

    let (records, total) = match anime_page(&data, &page).await {
        Ok(found) => found,
        Err(e) => {
            error!("Get Index: {}", e);
            (Vec::new(), 0)
        }
    };

    html(views::anime_index(
        &records,
        &page,
        total,
        "/",
        is_authenticated(&req, &data),
    ))
}

/// GET|POST /api/anime - Paginated anime listing
pub async fn show_all_anime(
    req: HttpRequest,
    data: web::Data<AppState>,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let page = query.pagination();

    let (records, total) = anime_page(&data, &page)
        .await
        .inspect_err(|e| error!("Show all Anime: {}", e))?;

    Ok(html(views::anime_index(
        &records,
        &page,
        total,
        "/api/anime",
        is_authenticated(&req, &data),
    )))
}

/// GET /anime/{anime_id} - Anime detail page
///
/// Unknown or non-numeric identifiers are a 404 with a `null` body.
pub async fn get_anime_by_id(
    req: HttpRequest,
    data: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let raw_id = path.into_inner();
    let Ok(anime_id) = raw_id.parse::<i64>() else {
        return Err(AppError::not_found(format!("anime {raw_id}")));
    };

    let anime = find_anime_by_id(data.db.pool(), anime_id)
        .await
        .inspect_err(|e| error!("Get Anime by Id: {}", e))?
        .ok_or_else(|| AppError::not_found(format!("anime {anime_id}")))?;

    Ok(html(views::anime_detail(
        &anime,
        is_authenticated(&req, &data),
    )))
}

/// GET /form - Add-anime form
pub async fn anime_form(req: HttpRequest, data: web::Data<AppState>) -> HttpResponse {
    html(views::anime_form_page(is_authenticated(&req, &data)))
}

/// POST /add_by_form - Insert one anime from the add-anime form
///
/// Redirects back to the form on success. A duplicate identifier is a 500.
pub async fn add_by_form(
    data: web::Data<AppState>,
    form: web::Form<AnimeForm>,
) -> AppResult<HttpResponse> {
    let anime = form
        .into_inner()
        .into_new_anime()
        .ok_or_else(|| AppError::validation("A numeric anime_id is required."))?;

    let saved = insert_anime(data.db.pool(), &anime)
        .await
        .inspect_err(|e| error!("Add by form: {}", e))?;
    info!("Anime added: {} ({})", saved.name, saved.anime_id);

    Ok(HttpResponse::SeeOther()
        .insert_header((header::LOCATION, "/form"))
        .finish())
}

/// Registers the bearer token scheme referenced by protected paths
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// OpenAPI documentation for the JSON endpoints
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Anime Catalog API",
        version = "0.1.0",
        description = "JSON endpoints of the anime catalog: user registration, lookup and tokens",
        license(
            name = "MIT"
        )
    ),
    paths(
        user::get_users,
        user::store_user,
        user::get_user_by_username,
        auth::issue_token,
        auth::protected
    ),
    components(
        schemas(
            User,
            CredentialsRequest,
            TokenResponse,
            ApiError
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "users", description = "User registration and lookup"),
        (name = "auth", description = "Token issuance and protected resources")
    )
)]
pub struct ApiDoc;

/// Configure every application route
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check))
        .route("/health/db", web::get().to(db_health_check))
        .route("/", web::get().to(home))
        .route("/anime/{anime_id}", web::get().to(get_anime_by_id))
        .route("/form", web::get().to(anime_form))
        .route("/add_by_form", web::post().to(add_by_form))
        .route("/logout", web::get().to(auth::logout))
        .route("/auth", web::post().to(auth::issue_token))
        .route("/protected", web::get().to(auth::protected))
        .service(
            web::scope("/api")
                .route("/users", web::get().to(user::get_users))
                .route("/users", web::post().to(user::store_user))
                .route("/users/{username}", web::get().to(user::get_user_by_username))
                .route("/anime", web::get().to(show_all_anime))
                .route("/anime", web::post().to(show_all_anime))
                .route("/login", web::get().to(auth::login_page))
                .route("/login", web::post().to(auth::login)),
        );
}

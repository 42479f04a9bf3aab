//! Repository module for catalog persistence
//!
//! Provides the read and insert operations for the anime, users and
//! seed_history tables. There are no update or delete operations.

use sqlx::sqlite::SqliteRow;
use sqlx::{Executor, Row, Sqlite, SqlitePool};
use thiserror::Error;

use crate::models::{Anime, NewAnime, Pagination, User};

/// Repository-related errors
#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
}

/// Result type for repository operations
pub type RepositoryResult<T> = Result<T, RepositoryError>;

fn anime_from_row(row: &SqliteRow) -> Result<Anime, sqlx::Error> {
    Ok(Anime {
        anime_id: row.try_get("anime_id")?,
        name: row.try_get("name")?,
        genre: row.try_get("genre")?,
        anime_type: row.try_get("anime_type")?,
        episodes: row.try_get("episodes")?,
        rating: row.try_get("rating")?,
        members: row.try_get("members")?,
        date_created: row.try_get("date_created")?,
    })
}

fn user_from_row(row: &SqliteRow) -> Result<User, sqlx::Error> {
    Ok(User {
        id: row.try_get("id")?,
        username: row.try_get("username")?,
    })
}

// ============================================================================
// Anime Repository
// ============================================================================

/// Get one page of anime, ordered by ascending identifier
pub async fn list_anime(pool: &SqlitePool, page: &Pagination) -> RepositoryResult<Vec<Anime>> {
    let rows = sqlx::query(
        r#"
        SELECT anime_id, name, genre, anime_type, episodes, rating, members, date_created
        FROM anime
        ORDER BY anime_id ASC
        LIMIT ?1 OFFSET ?2
        "#,
    )
    .bind(page.limit())
    .bind(page.offset())
    .fetch_all(pool)
    .await?;

    let anime = rows
        .iter()
        .map(anime_from_row)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(anime)
}

/// Get a single anime by its identifier
pub async fn find_anime_by_id(pool: &SqlitePool, anime_id: i64) -> RepositoryResult<Option<Anime>> {
    let row = sqlx::query(
        r#"
        SELECT anime_id, name, genre, anime_type, episodes, rating, members, date_created
        FROM anime
        WHERE anime_id = ?1
        "#,
    )
    .bind(anime_id)
    .fetch_optional(pool)
    .await?;

    Ok(row.as_ref().map(anime_from_row).transpose()?)
}

/// Insert a new anime record
///
/// Fails with a database error when the identifier is already taken.
pub async fn insert_anime<'e, E>(executor: E, anime: &NewAnime) -> RepositoryResult<Anime>
where
    E: Executor<'e, Database = Sqlite>,
{
    let row = sqlx::query(
        r#"
        INSERT INTO anime (anime_id, name, genre, anime_type, episodes, rating, members)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
        RETURNING anime_id, name, genre, anime_type, episodes, rating, members, date_created
        "#,
    )
    .bind(anime.anime_id)
    .bind(&anime.name)
    .bind(&anime.genre)
    .bind(&anime.anime_type)
    .bind(&anime.episodes)
    .bind(&anime.rating)
    .bind(&anime.members)
    .fetch_one(executor)
    .await?;

    Ok(anime_from_row(&row)?)
}

/// Identifiers of every stored anime
pub async fn list_anime_ids(pool: &SqlitePool) -> RepositoryResult<Vec<i64>> {
    let ids: Vec<i64> = sqlx::query_scalar("SELECT anime_id FROM anime ORDER BY anime_id ASC")
        .fetch_all(pool)
        .await?;
    Ok(ids)
}

/// Count all anime records
pub async fn count_anime(pool: &SqlitePool) -> RepositoryResult<i64> {
    let row = sqlx::query("SELECT COUNT(*) AS count FROM anime")
        .fetch_one(pool)
        .await?;
    Ok(row.try_get("count")?)
}

// ============================================================================
// User Repository
// ============================================================================

/// Get one page of users, ordered by username
pub async fn list_users(pool: &SqlitePool, page: &Pagination) -> RepositoryResult<Vec<User>> {
    let rows = sqlx::query(
        r#"
        SELECT id, username
        FROM users
        ORDER BY username ASC
        LIMIT ?1 OFFSET ?2
        "#,
    )
    .bind(page.limit())
    .bind(page.offset())
    .fetch_all(pool)
    .await?;

    let users = rows
        .iter()
        .map(user_from_row)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(users)
}

/// Find a user by username, ignoring case
pub async fn find_user_by_username(
    pool: &SqlitePool,
    username: &str,
) -> RepositoryResult<Option<User>> {
    Ok(find_user_credentials(pool, username)
        .await?
        .map(|(user, _)| user))
}

/// Find a user by username (ignoring case) together with the stored password hash
pub async fn find_user_credentials(
    pool: &SqlitePool,
    username: &str,
) -> RepositoryResult<Option<(User, String)>> {
    let row = sqlx::query(
        r#"
        SELECT id, username, password
        FROM users
        WHERE username = ?1 COLLATE NOCASE
        "#,
    )
    .bind(username)
    .fetch_optional(pool)
    .await?;

    match row {
        Some(row) => {
            let user = user_from_row(&row)?;
            let password_hash: String = row.try_get("password")?;
            Ok(Some((user, password_hash)))
        }
        None => Ok(None),
    }
}

/// Find a user by ID
pub async fn find_user_by_id(pool: &SqlitePool, user_id: i64) -> RepositoryResult<Option<User>> {
    let row = sqlx::query("SELECT id, username FROM users WHERE id = ?1")
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

    Ok(row.as_ref().map(user_from_row).transpose()?)
}

/// Create a user with an already-hashed password
///
/// The username column is unique without regard to case, so registering
/// `Admin` when `admin` exists fails with a database error.
pub async fn create_user<'e, E>(
    executor: E,
    username: &str,
    password_hash: &str,
) -> RepositoryResult<User>
where
    E: Executor<'e, Database = Sqlite>,
{
    let row = sqlx::query(
        r#"
        INSERT INTO users (username, password)
        VALUES (?1, ?2)
        RETURNING id, username
        "#,
    )
    .bind(username)
    .bind(password_hash)
    .fetch_one(executor)
    .await?;

    Ok(user_from_row(&row)?)
}

/// Count all users
pub async fn count_users(pool: &SqlitePool) -> RepositoryResult<i64> {
    let row = sqlx::query("SELECT COUNT(*) AS count FROM users")
        .fetch_one(pool)
        .await?;
    Ok(row.try_get("count")?)
}

// ============================================================================
// Seed Markers
// ============================================================================

/// Check whether the named seed step has already run
pub async fn is_seed_applied<'e, E>(executor: E, name: &str) -> RepositoryResult<bool>
where
    E: Executor<'e, Database = Sqlite>,
{
    let row = sqlx::query("SELECT 1 FROM seed_history WHERE name = ?1")
        .bind(name)
        .fetch_optional(executor)
        .await?;
    Ok(row.is_some())
}

/// Record the named seed step as applied
pub async fn record_seed<'e, E>(executor: E, name: &str) -> RepositoryResult<()>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query("INSERT INTO seed_history (name) VALUES (?1)")
        .bind(name)
        .execute(executor)
        .await?;
    Ok(())
}

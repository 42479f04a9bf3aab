//! Seed data for a fresh catalog database
//!
//! Two seed steps exist: the anime records imported from a CSV file and the
//! default user accounts. Each step writes its rows and a marker into
//! `seed_history` inside one transaction, and is skipped whenever its marker
//! is already present, so seeding happens once per database.

use std::collections::HashSet;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::{info, warn};

use crate::auth::{hash_password, AuthError};
use crate::db::{
    create_user, insert_anime, is_seed_applied, list_anime_ids, record_seed, RepositoryError,
};
use crate::models::NewAnime;

/// Marker for the anime CSV import
pub const ANIME_SEED: &str = "anime_csv_v1";

/// Marker for the default user accounts
pub const USERS_SEED: &str = "default_users_v1";

/// Accounts created on a fresh database
pub const DEFAULT_USERS: &[(&str, &str)] = &[("admin", "Password123"), ("joshua", "SliceBread")];

/// Seed-related errors
#[derive(Debug, Error)]
pub enum SeedError {
    #[error("Failed to open seed file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("Row {row}: the anime_id field is required")]
    MissingAnimeId { row: usize },

    #[error("Row {row}: invalid anime_id {value:?}")]
    InvalidAnimeId { row: usize, value: String },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("Seed task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// What a single seed step did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedOutcome {
    /// Rows were inserted and the marker recorded
    Applied(usize),
    /// The marker was already present
    AlreadyApplied,
    /// Nothing to import; the step will be retried on the next start
    Skipped,
}

/// Outcome of every seed step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedReport {
    pub anime: SeedOutcome,
    pub users: SeedOutcome,
}

/// One line of the anime CSV file
///
/// Only `anime_id` is required. Both `anime_type` and the `type` header used
/// by common anime datasets are accepted.
#[derive(Debug, Deserialize)]
struct AnimeCsvRecord {
    anime_id: Option<String>,
    name: Option<String>,
    genre: Option<String>,
    #[serde(alias = "type")]
    anime_type: Option<String>,
    episodes: Option<String>,
    rating: Option<String>,
    members: Option<String>,
}

/// Parse anime records from CSV with a header row
///
/// Fails on the first record without a usable `anime_id`; nothing is returned
/// for a partially valid file.
pub fn read_anime_csv<R: io::Read>(reader: R) -> Result<Vec<NewAnime>, SeedError> {
    let mut reader = csv::Reader::from_reader(reader);
    let mut records = Vec::new();

    for (index, result) in reader.deserialize::<AnimeCsvRecord>().enumerate() {
        // Header is line 1.
        let row = index + 2;
        let record = result?;

        let raw_id = record
            .anime_id
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty())
            .ok_or(SeedError::MissingAnimeId { row })?;
        let anime_id = raw_id
            .parse()
            .map_err(|_| SeedError::InvalidAnimeId { row, value: raw_id })?;

        records.push(NewAnime {
            anime_id,
            name: record.name.unwrap_or_default(),
            genre: record.genre.unwrap_or_default(),
            anime_type: record.anime_type.unwrap_or_default(),
            episodes: record.episodes.unwrap_or_default(),
            rating: record.rating.unwrap_or_default(),
            members: record.members.unwrap_or_default(),
        });
    }

    Ok(records)
}

/// Import the anime CSV file, once
///
/// A missing file is not an error: the step is skipped and retried on the
/// next start. Rows whose identifier is already stored (added by hand while
/// the import was pending) are left out. Any invalid row or other insert
/// failure rolls back the whole batch.
pub async fn seed_anime(pool: &SqlitePool, csv_path: &Path) -> Result<SeedOutcome, SeedError> {
    if is_seed_applied(pool, ANIME_SEED).await? {
        return Ok(SeedOutcome::AlreadyApplied);
    }

    let file = match File::open(csv_path) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            warn!(
                "Anime seed file {} not found, deferring anime import to the next start; \
                 ids added in the meantime will be kept over the file's rows",
                csv_path.display()
            );
            return Ok(SeedOutcome::Skipped);
        }
        Err(source) => {
            return Err(SeedError::Io {
                path: csv_path.to_path_buf(),
                source,
            })
        }
    };

    let records = read_anime_csv(file)?;
    let existing: HashSet<i64> = list_anime_ids(pool).await?.into_iter().collect();
    let (kept, clashing): (Vec<_>, Vec<_>) = records
        .into_iter()
        .partition(|anime| !existing.contains(&anime.anime_id));
    if !clashing.is_empty() {
        warn!(
            "Skipping {} anime from {} whose ids already exist",
            clashing.len(),
            csv_path.display()
        );
    }

    let mut tx = pool.begin().await?;
    for anime in &kept {
        insert_anime(&mut *tx, anime).await?;
    }
    record_seed(&mut *tx, ANIME_SEED).await?;
    tx.commit().await?;

    Ok(SeedOutcome::Applied(kept.len()))
}

/// Create the default user accounts, once
///
/// Either every account is created or none is.
pub async fn seed_default_users(pool: &SqlitePool) -> Result<SeedOutcome, SeedError> {
    if is_seed_applied(pool, USERS_SEED).await? {
        return Ok(SeedOutcome::AlreadyApplied);
    }

    let accounts = tokio::task::spawn_blocking(|| {
        DEFAULT_USERS
            .iter()
            .map(|(username, password)| Ok((*username, hash_password(password)?)))
            .collect::<Result<Vec<_>, AuthError>>()
    })
    .await??;

    let mut tx = pool.begin().await?;
    for (username, password_hash) in &accounts {
        create_user(&mut *tx, username, password_hash).await?;
    }
    record_seed(&mut *tx, USERS_SEED).await?;
    tx.commit().await?;

    Ok(SeedOutcome::Applied(accounts.len()))
}

/// Run every seed step that has not been applied yet
pub async fn run_seeds(pool: &SqlitePool, csv_path: &Path) -> Result<SeedReport, SeedError> {
    let anime = seed_anime(pool, csv_path).await?;
    if let SeedOutcome::Applied(count) = anime {
        info!("Imported {} anime from {}", count, csv_path.display());
    }

    let users = seed_default_users(pool).await?;
    if let SeedOutcome::Applied(count) = users {
        info!("Successfully created {} users", count);
    }

    Ok(SeedReport { anime, users })
}

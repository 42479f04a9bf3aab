//! Data models for the anime catalog
//!
//! This module contains the data structures used throughout the application:
//! catalog records, request bodies, API responses and pagination.

use chrono::{NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Default page number when `offset` is absent or unparsable
pub const DEFAULT_PAGE: u32 = 1;

/// Default page size when `limit` is absent, unparsable or not positive
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Largest page size a client may request
pub const MAX_PAGE_SIZE: u32 = 100;

/// An anime record as stored in the catalog
///
/// Episode count, rating and member count are free text, exactly as imported.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct Anime {
    /// Catalog identifier, supplied by the data source
    pub anime_id: i64,
    pub name: String,
    pub genre: String,
    /// TV, Movie, OVA, ...
    pub anime_type: String,
    pub episodes: String,
    pub rating: String,
    pub members: String,
    /// Server-assigned creation time (UTC)
    pub date_created: NaiveDateTime,
}

/// An anime record that has not been persisted yet
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewAnime {
    pub anime_id: i64,
    pub name: String,
    pub genre: String,
    pub anime_type: String,
    pub episodes: String,
    pub rating: String,
    pub members: String,
}

/// Public representation of a user account (never carries the password)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct User {
    /// User ID
    pub id: i64,
    /// Unique, case-insensitive username
    pub username: String,
}

/// Username/password pair submitted for registration, login or token issuance
///
/// Both fields are optional at the wire level so that a missing field is
/// reported as a validation error instead of a deserialization failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct CredentialsRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

impl CredentialsRequest {
    /// Both fields, if present and non-empty
    pub fn required(&self) -> Option<(&str, &str)> {
        match (self.username.as_deref(), self.password.as_deref()) {
            (Some(username), Some(password)) if !username.is_empty() && !password.is_empty() => {
                Some((username, password))
            }
            _ => None,
        }
    }
}

/// Form fields submitted by the add-anime page
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnimeForm {
    pub anime_id: Option<String>,
    pub name: Option<String>,
    pub genre: Option<String>,
    pub anime_type: Option<String>,
    pub episodes: Option<String>,
    pub rating: Option<String>,
    pub members: Option<String>,
}

impl AnimeForm {
    /// Validate the form into a record ready for insertion
    ///
    /// Returns `None` when `anime_id` is missing or not an integer.
    pub fn into_new_anime(self) -> Option<NewAnime> {
        let anime_id = self.anime_id?.trim().parse().ok()?;
        Some(NewAnime {
            anime_id,
            name: self.name.unwrap_or_default(),
            genre: self.genre.unwrap_or_default(),
            anime_type: self.anime_type.unwrap_or_default(),
            episodes: self.episodes.unwrap_or_default(),
            rating: self.rating.unwrap_or_default(),
            members: self.members.unwrap_or_default(),
        })
    }
}

/// Response body of the token endpoint
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct TokenResponse {
    /// Signed JWT to send as `Authorization: Bearer <token>`
    pub access_token: String,
}

/// API error response
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Whether the operation was successful (always false for errors)
    pub success: bool,
    /// Error message describing what went wrong
    pub error: String,
    /// ISO timestamp of when the error occurred
    pub timestamp: String,
}

impl ApiError {
    /// Create a new API error response with the current timestamp
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

/// A normalised page request
///
/// `page` is 1-based; `per_page` is always within `1..=MAX_PAGE_SIZE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: u32,
    pub per_page: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            per_page: DEFAULT_PAGE_SIZE,
        }
    }
}

impl Pagination {
    /// Normalise raw page numbers
    ///
    /// Pages below 1 become 1; sizes below 1 fall back to the default and
    /// sizes above the maximum are capped.
    pub fn new(page: i64, per_page: i64) -> Self {
        let page = page.clamp(1, i64::from(u32::MAX)) as u32;
        let per_page = if per_page < 1 {
            DEFAULT_PAGE_SIZE
        } else {
            per_page.min(i64::from(MAX_PAGE_SIZE)) as u32
        };
        Self { page, per_page }
    }

    /// Build from raw query values; unparsable values use the defaults
    pub fn from_params(offset: Option<&str>, limit: Option<&str>) -> Self {
        let parse = |raw: Option<&str>, default: u32| {
            raw.and_then(|v| v.trim().parse::<i64>().ok())
                .unwrap_or(i64::from(default))
        };
        Self::new(parse(offset, DEFAULT_PAGE), parse(limit, DEFAULT_PAGE_SIZE))
    }

    /// Number of rows to skip
    pub fn offset(&self) -> i64 {
        i64::from(self.page - 1) * i64::from(self.per_page)
    }

    /// Number of rows to return
    pub fn limit(&self) -> i64 {
        i64::from(self.per_page)
    }

    pub fn previous(&self) -> Option<Self> {
        (self.page > 1).then(|| Self {
            page: self.page - 1,
            per_page: self.per_page,
        })
    }

    pub fn next(&self) -> Self {
        Self {
            page: self.page.saturating_add(1),
            per_page: self.per_page,
        }
    }
}

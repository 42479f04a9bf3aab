//! Anime Catalog Library
//!
//! This library serves a small anime catalog: paginated listing and detail
//! pages backed by SQLite, user registration, and JWT-based authentication.

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod seed;
pub mod views;

//! Cinema Guru: movie catalog API with per-user favorites, watch-later lists
//! and an activity feed.

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod services;

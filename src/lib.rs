//! Watch-history recommendation service.
//!
//! Loads users, items and watch events from CSV, fits an item-based
//! collaborative filtering model once at startup, and serves popular,
//! personalized and history lookups over HTTP.

pub mod api;
pub mod config;
pub mod data;
pub mod error;
pub mod middleware;
pub mod models;
pub mod services;

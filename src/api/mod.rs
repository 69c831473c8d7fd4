//! REST API server module.
//!
//! Provides HTTP endpoints for account management, authentication,
//! channel profiles, subscriptions, and watch history.

pub mod account_service;
pub mod auth_service;
pub mod error;
pub mod jwt;
pub mod middleware;
pub mod models;
pub mod profile_service;
pub mod routes;
pub mod server;

pub use server::ApiServer;

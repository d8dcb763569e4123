//! Wardrobe API Library
//!
//! Core of the wardrobe and social fashion backend: domain logic,
//! repositories, services, background jobs and the HTTP layer.

pub mod api;
pub mod auth;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod jobs;
pub mod services;
pub mod telemetry;

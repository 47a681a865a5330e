#![warn(clippy::all, missing_docs)]

//! Core client logic for the Dream Travels reservation system.
//!
//! This crate hosts the API records, form validation, the HTTP client,
//! session persistence and the page controllers driven by the terminal UI
//! and any future frontends.

pub mod api;
pub mod config;
pub mod models;
pub mod pages;
pub mod session;
pub mod timefmt;
pub mod validation;

pub use api::{ApiClient, ApiError};
pub use config::AppConfig;
pub use models::{Booking, BookingStatus, Role, Schedule, Train, Traveler, User};
pub use pages::{Interaction, Outcome, Records};
pub use session::{Section, Session, SessionStore};
pub use validation::ValidationErrors;

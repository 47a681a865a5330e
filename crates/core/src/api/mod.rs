//! HTTP access to the reservation backend.

mod client;
mod error;

pub use client::ApiClient;
pub use error::{ApiError, Result};

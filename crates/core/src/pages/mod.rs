//! Page controllers: validation, remote calls and local record lists.
//!
//! Each page owns its record lists behind [`Records`] handles so a spawned
//! request can patch them after the screen that started it has gone. User
//! dialogs go through an injected [`Interaction`].

mod bookings;
mod login;
mod records;
mod reservation;
mod train;
mod traveler;
mod user;

use async_trait::async_trait;
use tracing::warn;

use crate::validation::ValidationErrors;

pub use bookings::BookingsPage;
pub use login::{logout, LoginPage};
pub use records::Records;
pub use reservation::ReservationPage;
pub use train::TrainPage;
pub use traveler::TravelerPage;
pub use user::UserPage;

/// Blocking confirmation and alert dialogs.
#[async_trait]
pub trait Interaction: Send + Sync {
    /// Ask a yes/no question; `true` means proceed.
    async fn confirm(&self, message: &str) -> bool;

    /// Show a message the user must acknowledge.
    async fn notify(&self, message: &str);
}

/// How a page operation ended.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T = ()> {
    /// The request succeeded and local state was updated.
    Completed(T),
    /// The form did not validate; nothing was sent.
    Invalid(ValidationErrors),
    /// The user answered "no" to the confirmation.
    Declined,
    /// The request failed; the message was shown to the user.
    Failed(String),
}

impl<T> Outcome<T> {
    /// Whether the operation completed.
    pub fn is_completed(&self) -> bool {
        matches!(self, Outcome::Completed(_))
    }

    /// Completed value, if any.
    pub fn completed(self) -> Option<T> {
        match self {
            Outcome::Completed(value) => Some(value),
            _ => None,
        }
    }

    /// Field errors of an invalid submission.
    pub fn errors(&self) -> Option<&ValidationErrors> {
        match self {
            Outcome::Invalid(errors) => Some(errors),
            _ => None,
        }
    }
}

impl<T> From<ValidationErrors> for Outcome<T> {
    fn from(errors: ValidationErrors) -> Self {
        Outcome::Invalid(errors)
    }
}

async fn fail<T>(dialogs: &dyn Interaction, message: impl Into<String>) -> Outcome<T> {
    let message = message.into();
    warn!(%message, "page operation failed");
    dialogs.notify(&message).await;
    Outcome::Failed(message)
}

//! Authenticated session context, its on-disk store and role-gated sections.

mod sections;
mod store;

pub use sections::{visible_sections, Section};
pub use store::SessionStore;

use serde::{Deserialize, Serialize};

use crate::models::Role;

/// Bearer token and role obtained at login.
///
/// Created once by the login page and dropped on logout; every page works
/// through an [`crate::api::ApiClient`] built from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    token: String,
    role: Role,
}

impl Session {
    /// Start a session for `role` authenticated by `token`.
    pub fn new(token: impl Into<String>, role: Role) -> Self {
        Self {
            token: token.into(),
            role,
        }
    }

    /// Opaque bearer token.
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Role of the signed-in account.
    pub fn role(&self) -> Role {
        self.role
    }

    /// Sections the signed-in account may open.
    pub fn sections(&self) -> Vec<Section> {
        visible_sections(self.role)
    }

    /// Whether `section` is available to this session.
    pub fn can_open(&self, section: Section) -> bool {
        section.visible_to(self.role)
    }
}

use std::sync::Arc;

use reqwest::StatusCode;
use tracing::{error, info};

use super::{fail, Interaction, Outcome};
use crate::{
    api::ApiClient,
    models::{Credentials, Role},
    session::{Session, SessionStore},
    validation::LoginForm,
};

const AUTH_FAILED: &str = "Authentication Failed";

/// Sign-in screen.
pub struct LoginPage {
    api: ApiClient,
    store: SessionStore,
    dialogs: Arc<dyn Interaction>,
}

impl LoginPage {
    /// Page that signs in through `api` and persists to `store`.
    pub fn new(api: ApiClient, store: SessionStore, dialogs: Arc<dyn Interaction>) -> Self {
        Self {
            api,
            store,
            dialogs,
        }
    }

    /// Validate, authenticate and persist the resulting session.
    ///
    /// A response without a role code signs in as [`Role::Admin`].
    pub async fn submit(&self, form: &LoginForm) -> Outcome<Session> {
        if let Err(errors) = form.validate() {
            return errors.into();
        }
        let credentials = Credentials {
            nic: form.nic.trim().to_string(),
            password: form.password.clone(),
        };
        let response = match self.api.login(&credentials).await {
            Ok(response) => response,
            Err(err) if err.has_status(StatusCode::BAD_REQUEST) => {
                return fail(self.dialogs.as_ref(), err.message_or(AUTH_FAILED)).await;
            }
            Err(_) => return fail(self.dialogs.as_ref(), AUTH_FAILED).await,
        };

        let session = Session::new(response.token, response.role.unwrap_or(Role::Admin));
        if let Err(err) = self.store.persist(&session) {
            error!(error = %err, "failed to persist session");
            return fail(self.dialogs.as_ref(), AUTH_FAILED).await;
        }
        info!(nic = %credentials.nic, role = %session.role(), "signed in");
        Outcome::Completed(session)
    }
}

/// Confirm, then forget the persisted token and role.
pub async fn logout(store: &SessionStore, dialogs: &dyn Interaction) -> Outcome {
    if !dialogs.confirm("Are you sure you want to log out?").await {
        return Outcome::Declined;
    }
    match store.clear() {
        Ok(()) => {
            info!("signed out");
            Outcome::Completed(())
        }
        Err(err) => {
            error!(error = %err, "failed to clear session");
            fail(dialogs, "Failed to log out.").await
        }
    }
}

use std::sync::Arc;

use tracing::info;

use super::{fail, Interaction, Outcome, Records};
use crate::{
    api::ApiClient,
    models::{Role, User},
    validation::UserForm,
};

/// Staff account administration. Traveler accounts are managed elsewhere.
pub struct UserPage {
    api: ApiClient,
    dialogs: Arc<dyn Interaction>,
    users: Records<User>,
}

impl UserPage {
    /// Page with an empty user list.
    pub fn new(api: ApiClient, dialogs: Arc<dyn Interaction>) -> Self {
        Self {
            api,
            dialogs,
            users: Records::new(),
        }
    }

    /// Staff accounts as last loaded or patched.
    pub fn users(&self) -> &Records<User> {
        &self.users
    }

    /// Administrators cannot be deleted from this page.
    pub fn can_delete(user: &User) -> bool {
        user.role != Role::Admin
    }

    /// Fetch users, keeping only staff accounts.
    pub async fn load(&self) -> Outcome {
        match self.api.users().await {
            Ok(list) => {
                self.users
                    .replace(list.into_iter().filter(|u| u.role != Role::Traveler).collect());
                Outcome::Completed(())
            }
            Err(_) => {
                self.users.replace(Vec::new());
                fail(self.dialogs.as_ref(), "Error fetching users").await
            }
        }
    }

    /// Register a staff account with the chosen role.
    pub async fn add(&self, form: &UserForm) -> Outcome<User> {
        const FAILED: &str = "Failed to add user.";
        if let Err(errors) = form.validate() {
            return errors.into();
        }
        let Some(role) = form.role else {
            return fail(self.dialogs.as_ref(), FAILED).await;
        };
        let mut user = User {
            id: String::new(),
            nic: form.nic.trim().to_string(),
            role,
            email: form.email.trim().to_string(),
            password: Some(form.password.clone()),
        };
        match self.api.register_user(&user).await {
            Ok(id) => {
                user.id = id.unwrap_or_default();
                user.password = None;
                self.users.push(user.clone());
                info!(nic = %user.nic, role = %user.role, "user registered");
                self.dialogs.notify("User added successfully!").await;
                Outcome::Completed(user)
            }
            Err(err) => fail(self.dialogs.as_ref(), err.message_or(FAILED)).await,
        }
    }

    /// Confirm, then delete the account with `nic`.
    pub async fn delete(&self, nic: &str) -> Outcome {
        if !self
            .dialogs
            .confirm("Are you sure you want to delete this user?")
            .await
        {
            return Outcome::Declined;
        }
        match self.api.delete_user(nic).await {
            Ok(()) => {
                self.users.remove(|u| u.nic == nic);
                info!(nic, "user deleted");
                Outcome::Completed(())
            }
            Err(_) => fail(self.dialogs.as_ref(), "Error deleting user.").await,
        }
    }
}

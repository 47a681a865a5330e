use std::sync::Arc;

use tracing::info;

use super::{fail, Interaction, Outcome, Records};
use crate::{
    api::ApiClient,
    models::{Role, Traveler, User},
    timefmt,
    validation::TravelerForm,
};

/// Traveler profile administration.
///
/// Every traveler is backed by a user account with the same NIC, so
/// registration and removal touch both resources.
pub struct TravelerPage {
    api: ApiClient,
    dialogs: Arc<dyn Interaction>,
    role: Role,
    travelers: Records<Traveler>,
}

impl TravelerPage {
    /// Page for an account with `role`; only staff may toggle activation.
    pub fn new(api: ApiClient, dialogs: Arc<dyn Interaction>, role: Role) -> Self {
        Self {
            api,
            dialogs,
            role,
            travelers: Records::new(),
        }
    }

    /// Travelers as last loaded or patched.
    pub fn travelers(&self) -> &Records<Traveler> {
        &self.travelers
    }

    /// Whether activate/deactivate actions are offered.
    pub fn can_toggle_status(&self) -> bool {
        self.role.is_staff()
    }

    /// Edit form prefilled from `traveler`.
    pub fn edit_form_for(traveler: &Traveler) -> TravelerForm {
        TravelerForm {
            nic: traveler.nic.clone(),
            name: traveler.name.clone(),
            email: traveler.email.clone(),
            date_of_birth: traveler.date_of_birth.format("%Y-%m-%d").to_string(),
            password: String::new(),
        }
    }

    /// Fetch every traveler, active or not.
    pub async fn load(&self) -> Outcome {
        match self.api.travelers().await {
            Ok(list) => {
                self.travelers.replace(list);
                Outcome::Completed(())
            }
            Err(_) => {
                self.travelers.replace(Vec::new());
                fail(self.dialogs.as_ref(), "Error fetching travelers").await
            }
        }
    }

    /// Register the login account, then the traveler profile.
    pub async fn add(&self, form: &TravelerForm) -> Outcome<Traveler> {
        const FAILED: &str = "Failed to add traveler";
        if let Err(errors) = form.validate_new(timefmt::today()) {
            return errors.into();
        }
        let Some(birth) = timefmt::parse_form_date(&form.date_of_birth) else {
            return fail(self.dialogs.as_ref(), FAILED).await;
        };
        let nic = form.nic.trim().to_string();
        let email = form.email.trim().to_string();

        let account = User {
            id: String::new(),
            nic: nic.clone(),
            role: Role::Traveler,
            email: email.clone(),
            password: Some(form.password.clone()),
        };
        if let Err(err) = self.api.register_user(&account).await {
            return fail(self.dialogs.as_ref(), err.message_or(FAILED)).await;
        }

        let mut traveler = Traveler {
            id: String::new(),
            nic,
            name: form.name.trim().to_string(),
            email,
            date_of_birth: timefmt::date_timestamp(birth),
            is_active: true,
        };
        match self.api.register_traveler(&traveler).await {
            Ok(id) => {
                traveler.id = id.unwrap_or_default();
                self.travelers.push(traveler.clone());
                info!(nic = %traveler.nic, "traveler registered");
                self.dialogs.notify("Traveler added successfully!").await;
                Outcome::Completed(traveler)
            }
            Err(err) => fail(self.dialogs.as_ref(), err.message_or(FAILED)).await,
        }
    }

    /// Save profile changes for the traveler with `form.nic`.
    pub async fn update(&self, form: &TravelerForm) -> Outcome<Traveler> {
        const FAILED: &str = "Failed to update traveler";
        if let Err(errors) = form.validate_update(timefmt::today()) {
            return errors.into();
        }
        let nic = form.nic.trim();
        let current = self.travelers.find(|t| t.nic == nic);
        let (Some(current), Some(birth)) =
            (current, timefmt::parse_form_date(&form.date_of_birth))
        else {
            return fail(self.dialogs.as_ref(), FAILED).await;
        };

        let mut updated = Traveler {
            name: form.name.trim().to_string(),
            email: form.email.trim().to_string(),
            date_of_birth: timefmt::date_timestamp(birth),
            ..current
        };
        match self.api.update_traveler(&updated).await {
            Ok(id) => {
                if let Some(id) = id {
                    updated.id = id;
                }
                self.travelers.update(|t| t.nic == nic, |t| *t = updated.clone());
                info!(nic, "traveler updated");
                self.dialogs.notify("Traveler updated successfully!").await;
                Outcome::Completed(updated)
            }
            Err(err) => fail(self.dialogs.as_ref(), err.message_or(FAILED)).await,
        }
    }

    /// Confirm, delete the profile, then its login account.
    ///
    /// The traveler stays listed unless both deletions succeed.
    pub async fn delete(&self, nic: &str) -> Outcome {
        if !self
            .dialogs
            .confirm("Are you sure you want to delete this traveler?")
            .await
        {
            return Outcome::Declined;
        }
        if self.api.delete_traveler(nic).await.is_err() {
            return fail(self.dialogs.as_ref(), "Error deleting traveler.").await;
        }
        if self.api.delete_user(nic).await.is_err() {
            return fail(self.dialogs.as_ref(), "Unable to delete traveler.").await;
        }
        self.travelers.remove(|t| t.nic == nic);
        info!(nic, "traveler deleted");
        Outcome::Completed(())
    }

    /// Confirm, then activate or deactivate the traveler.
    pub async fn set_active(&self, nic: &str, active: bool) -> Outcome {
        let verb = if active { "activate" } else { "deactivate" };
        let question = format!("Are you sure you want to {verb} this traveler?");
        if !self.dialogs.confirm(&question).await {
            return Outcome::Declined;
        }
        match self.api.set_traveler_active(nic, active).await {
            Ok(()) => {
                self.travelers.update(|t| t.nic == nic, |t| t.is_active = active);
                info!(nic, active, "traveler status changed");
                Outcome::Completed(())
            }
            Err(_) => fail(self.dialogs.as_ref(), format!("Failed to {verb} traveler.")).await,
        }
    }
}

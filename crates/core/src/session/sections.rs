use crate::models::Role;

/// Top-level screens reachable from the sidebar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    /// Book seats on a published schedule.
    MakeReservation,
    /// List, edit and cancel bookings.
    CurrentReservations,
    /// Staff account administration.
    UserManagement,
    /// Traveler profile administration.
    TravelerManagement,
    /// Trains and their schedules.
    TrainManagement,
}

impl Section {
    /// Sidebar order.
    pub const ALL: [Section; 5] = [
        Section::MakeReservation,
        Section::CurrentReservations,
        Section::UserManagement,
        Section::TravelerManagement,
        Section::TrainManagement,
    ];

    /// Sidebar label.
    pub fn title(self) -> &'static str {
        match self {
            Section::MakeReservation => "Make Reservation",
            Section::CurrentReservations => "Current Reservations",
            Section::UserManagement => "User Management",
            Section::TravelerManagement => "Traveler Management",
            Section::TrainManagement => "Train Management",
        }
    }

    /// Whether an account with `role` may open this section.
    pub fn visible_to(self, role: Role) -> bool {
        match self {
            Section::UserManagement => role == Role::Admin,
            Section::TrainManagement => role.is_staff(),
            Section::MakeReservation
            | Section::CurrentReservations
            | Section::TravelerManagement => true,
        }
    }
}

/// Sections visible to `role`, in sidebar order.
pub fn visible_sections(role: Role) -> Vec<Section> {
    Section::ALL
        .into_iter()
        .filter(|section| section.visible_to(role))
        .collect()
}

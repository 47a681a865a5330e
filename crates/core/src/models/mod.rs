#![allow(missing_docs)]

//! Records exchanged with the reservation API.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Raised when an integer code on the wire has no matching variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("unknown {kind} code {code}")]
pub struct UnknownCode {
    /// Name of the enumeration being decoded.
    pub kind: &'static str,
    /// Offending value.
    pub code: u8,
}

/// Account role; the integer code decides which sections are visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Role {
    /// Passenger account (0).
    Traveler,
    /// Travel agent (1).
    Agent,
    /// Back-office staff (2).
    BackOffice,
    /// Administrator (3).
    Admin,
}

impl Role {
    /// Roles an administrator may assign when creating staff accounts.
    pub const ASSIGNABLE: [Role; 2] = [Role::Agent, Role::BackOffice];

    /// Integer code used on the wire and in the session store.
    pub fn code(self) -> u8 {
        match self {
            Role::Traveler => 0,
            Role::Agent => 1,
            Role::BackOffice => 2,
            Role::Admin => 3,
        }
    }

    /// Human-readable label used in user tables.
    pub fn label(self) -> &'static str {
        match self {
            Role::Traveler => "Traveler",
            Role::Agent => "Traveler Agent",
            Role::BackOffice => "Back Office",
            Role::Admin => "Admin",
        }
    }

    /// Whether this role may manage trains and toggle traveler status.
    pub fn is_staff(self) -> bool {
        matches!(self, Role::BackOffice | Role::Admin)
    }
}

impl TryFrom<u8> for Role {
    type Error = UnknownCode;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Role::Traveler),
            1 => Ok(Role::Agent),
            2 => Ok(Role::BackOffice),
            3 => Ok(Role::Admin),
            code => Err(UnknownCode { kind: "role", code }),
        }
    }
}

impl From<Role> for u8 {
    fn from(role: Role) -> Self {
        role.code()
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Lifecycle state of a booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum BookingStatus {
    /// Reservation stands (0).
    #[default]
    Active,
    /// Reservation was cancelled (1).
    Cancelled,
}

impl BookingStatus {
    /// Label for listings.
    pub fn label(self) -> &'static str {
        match self {
            BookingStatus::Active => "Active",
            BookingStatus::Cancelled => "Cancelled",
        }
    }
}

impl TryFrom<u8> for BookingStatus {
    type Error = UnknownCode;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(BookingStatus::Active),
            1 => Ok(BookingStatus::Cancelled),
            code => Err(UnknownCode {
                kind: "booking status",
                code,
            }),
        }
    }
}

impl From<BookingStatus> for u8 {
    fn from(status: BookingStatus) -> Self {
        match status {
            BookingStatus::Active => 0,
            BookingStatus::Cancelled => 1,
        }
    }
}

/// Login or staff account. The password is write-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(default)]
    pub id: String,
    pub nic: String,
    pub role: Role,
    #[serde(default)]
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none", skip_deserializing)]
    pub password: Option<String>,
}

/// Passenger profile linked to a user account by NIC.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Traveler {
    #[serde(default)]
    pub id: String,
    pub nic: String,
    pub name: String,
    #[serde(default)]
    pub email: String,
    pub date_of_birth: DateTime<Utc>,
    #[serde(default)]
    pub is_active: bool,
}

/// A train that schedules run on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Train {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub is_published: bool,
}

/// A timetabled run of a train between two stations.
///
/// Times are carried in the 12-hour `hh:mm AM/PM` form the API expects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schedule {
    pub id: i64,
    pub departure_time: String,
    pub arrival_time: String,
    pub start_station: String,
    pub stopping_station: String,
    #[serde(default)]
    pub available_count: i64,
    #[serde(default)]
    pub reservation_count: i64,
    pub train: Train,
}

/// Seat reservation on a schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "bookingID")]
    pub booking_id: String,
    #[serde(rename = "scheduleID")]
    pub schedule_id: String,
    pub nic: String,
    #[serde(rename = "trainID")]
    pub train_id: String,
    pub seat_count: u32,
    pub reservation_date: DateTime<Utc>,
    pub booking_date: DateTime<Utc>,
    #[serde(default)]
    pub status: BookingStatus,
    #[serde(rename = "referenceID", default)]
    pub reference_id: String,
}

/// Human-readable codes composed for a new booking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingCodes {
    pub booking_id: String,
    pub reference_id: String,
}

impl BookingCodes {
    /// Derive `B-<ms>` / `RF-<ms>` from a millisecond timestamp.
    pub fn from_millis(millis: i64) -> Self {
        Self {
            booking_id: format!("B-{millis}"),
            reference_id: format!("RF-{millis}"),
        }
    }
}

/// Body of `POST /api/Users/login`.
#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub nic: String,
    pub password: String,
}

/// Successful login payload.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    #[serde(default)]
    pub role: Option<Role>,
}

/// Body of `PATCH /api/Bookings/{id}/status`.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct StatusPatch {
    pub status: BookingStatus,
}

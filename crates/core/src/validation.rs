#![allow(missing_docs)]

//! Form validation rules.
//!
//! Every `validate` call runs all rules for its form and reports every
//! failing field at once; nothing is sent to the API while errors remain.

use std::{collections::BTreeMap, fmt};

use chrono::{Duration, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::{models::Role, timefmt};

/// Earliest reservation day, counted from today.
pub const RESERVATION_MIN_DAYS: i64 = 2;
/// Latest reservation day, counted from today.
pub const RESERVATION_MAX_DAYS: i64 = 30;
/// Seats a single booking may hold.
pub const SEAT_RANGE: std::ops::RangeInclusive<u32> = 1..=4;
/// Accepted password lengths, in characters.
pub const PASSWORD_RANGE: std::ops::RangeInclusive<usize> = 6..=100;

static NIC_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:[0-9]{9}[xXvV]|[0-9]{12})$").expect("invalid NIC regex"));
static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^[A-Z0-9._%+-]+@[A-Z0-9.-]+\.[A-Z]{2,4}$").expect("invalid email regex")
});

/// Field name → message for every field that failed validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    fields: BTreeMap<&'static str, String>,
}

impl ValidationErrors {
    /// Empty result.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `message` for `field` unless the field already failed an earlier rule.
    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.fields.entry(field).or_insert_with(|| message.into());
    }

    /// Record the outcome of a single-field check.
    pub fn check(&mut self, field: &'static str, outcome: Result<(), String>) {
        if let Err(message) = outcome {
            self.add(field, message);
        }
    }

    /// Message for `field`, if it failed.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    /// Whether every rule passed.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Number of failing fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Iterate over `(field, message)` pairs in field-name order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.fields.iter().map(|(field, message)| (*field, message.as_str()))
    }

    /// `Ok(())` when empty, otherwise `Err(self)`.
    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = self
            .fields
            .iter()
            .map(|(field, message)| format!("{field}: {message}"))
            .collect::<Vec<_>>()
            .join("; ");
        write!(f, "{joined}")
    }
}

impl std::error::Error for ValidationErrors {}

/// Required NIC in either the old (9 digits + letter) or new (12 digits) layout.
pub fn check_nic(nic: &str) -> Result<(), String> {
    if nic.trim().is_empty() {
        return Err("NIC is required.".to_string());
    }
    if !is_valid_nic(nic) {
        return Err("Invalid nic format.".to_string());
    }
    Ok(())
}

/// Whether `nic` matches one of the two accepted NIC layouts.
pub fn is_valid_nic(nic: &str) -> bool {
    NIC_RE.is_match(nic)
}

/// Required, `local@domain.tld` shaped email.
pub fn check_email(email: &str) -> Result<(), String> {
    if email.trim().is_empty() {
        return Err("Email is required.".to_string());
    }
    if !EMAIL_RE.is_match(email) {
        return Err("Invalid email format.".to_string());
    }
    Ok(())
}

/// Required password of 6 to 100 characters.
pub fn check_password(password: &str) -> Result<(), String> {
    if password.is_empty() {
        return Err("Password is required.".to_string());
    }
    if !PASSWORD_RANGE.contains(&password.chars().count()) {
        return Err("Password must be between 6 and 100 characters.".to_string());
    }
    Ok(())
}

/// Role chosen for a new staff account.
pub fn check_assignable_role(role: Option<Role>) -> Result<(), String> {
    match role {
        Some(role) if Role::ASSIGNABLE.contains(&role) => Ok(()),
        _ => Err("Invalid role selected.".to_string()),
    }
}

/// Non-blank text, reporting `message` otherwise.
pub fn check_required(value: &str, message: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        Err(message.to_string())
    } else {
        Ok(())
    }
}

/// Required birth date strictly before `today`.
pub fn check_birth_date(value: &str, today: NaiveDate) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err("Date of Birth is required.".to_string());
    }
    match timefmt::parse_form_date(value) {
        Some(date) if date < today => Ok(()),
        Some(_) => Err("Date of Birth should be before today.".to_string()),
        None => Err("Date of Birth must be a YYYY-MM-DD date.".to_string()),
    }
}

/// Earliest and latest acceptable reservation dates for `today`.
pub fn reservation_window(today: NaiveDate) -> (NaiveDate, NaiveDate) {
    (
        today + Duration::days(RESERVATION_MIN_DAYS),
        today + Duration::days(RESERVATION_MAX_DAYS),
    )
}

/// Required reservation date inside the booking window.
pub fn check_reservation_date(value: &str, today: NaiveDate) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err("Reservation date is required".to_string());
    }
    let (min, max) = reservation_window(today);
    match timefmt::parse_form_date(value) {
        Some(date) if (min..=max).contains(&date) => Ok(()),
        _ => Err(format!(
            "Reservation date must be between {} and {}",
            min.format("%Y-%m-%d"),
            max.format("%Y-%m-%d")
        )),
    }
}

/// Parse a seat count, accepting only whole numbers from 1 to 4.
pub fn parse_seat_count(value: &str) -> Option<u32> {
    value
        .trim()
        .parse::<u32>()
        .ok()
        .filter(|count| SEAT_RANGE.contains(count))
}

/// Required seat count between 1 and 4.
pub fn check_seat_count(value: &str) -> Result<(), String> {
    parse_seat_count(value)
        .map(|_| ())
        .ok_or_else(|| "Seat count is required and should be between 1 and 4".to_string())
}

/// Login form.
#[derive(Debug, Clone, Default)]
pub struct LoginForm {
    pub nic: String,
    pub password: String,
}

impl LoginForm {
    /// Only NIC shape and password presence are checked before authenticating.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if self.nic.trim().is_empty() {
            errors.add("nic", "NIC is required.");
        } else if !is_valid_nic(&self.nic) {
            errors.add("nic", "NIC invalid.");
        }
        errors.check("password", check_required(&self.password, "Password is required."));
        errors.into_result()
    }
}

/// Staff account creation form.
#[derive(Debug, Clone, Default)]
pub struct UserForm {
    pub nic: String,
    pub email: String,
    pub password: String,
    pub role: Option<Role>,
}

impl UserForm {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.check("nic", check_nic(&self.nic));
        errors.check("email", check_email(&self.email));
        errors.check("role", check_assignable_role(self.role));
        errors.check("password", check_password(&self.password));
        errors.into_result()
    }
}

/// Traveler registration and profile edit form.
#[derive(Debug, Clone, Default)]
pub struct TravelerForm {
    pub nic: String,
    pub name: String,
    pub email: String,
    /// `YYYY-MM-DD`.
    pub date_of_birth: String,
    pub password: String,
}

impl TravelerForm {
    /// Registration checks every field including credentials.
    pub fn validate_new(&self, today: NaiveDate) -> Result<(), ValidationErrors> {
        let mut errors = self.profile_errors(today);
        errors.check("nic", check_nic(&self.nic));
        errors.check("password", check_password(&self.password));
        errors.into_result()
    }

    /// Edits cannot change the NIC or password, so only the profile is checked.
    pub fn validate_update(&self, today: NaiveDate) -> Result<(), ValidationErrors> {
        self.profile_errors(today).into_result()
    }

    fn profile_errors(&self, today: NaiveDate) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        errors.check("name", check_required(&self.name, "Name is required."));
        errors.check("email", check_email(&self.email));
        errors.check("date_of_birth", check_birth_date(&self.date_of_birth, today));
        errors
    }
}

/// New reservation form.
#[derive(Debug, Clone, Default)]
pub struct BookingForm {
    /// NIC of the selected active traveler.
    pub traveler_nic: Option<String>,
    /// `YYYY-MM-DD`.
    pub reservation_date: String,
    pub seat_count: String,
}

impl BookingForm {
    pub fn validate(&self, today: NaiveDate) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let traveler = self.traveler_nic.as_deref().unwrap_or_default();
        errors.check("traveler", check_required(traveler, "Traveler NIC is required"));
        errors.check(
            "reservation_date",
            check_reservation_date(&self.reservation_date, today),
        );
        errors.check("seat_count", check_seat_count(&self.seat_count));
        errors.into_result()
    }
}

/// Edit form for an existing reservation.
#[derive(Debug, Clone, Default)]
pub struct BookingEditForm {
    /// `YYYY-MM-DD`.
    pub reservation_date: String,
    pub seat_count: String,
}

impl BookingEditForm {
    pub fn validate(&self, today: NaiveDate) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.check(
            "reservation_date",
            check_reservation_date(&self.reservation_date, today),
        );
        errors.check("seat_count", check_seat_count(&self.seat_count));
        errors.into_result()
    }
}

/// New train form.
#[derive(Debug, Clone, Default)]
pub struct TrainForm {
    pub id: String,
    pub name: String,
}

impl TrainForm {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.check("id", check_required(&self.id, "Train ID is required"));
        errors.check("name", check_required(&self.name, "Train Name is required"));
        errors.into_result()
    }
}

/// Schedule create/edit form. Times may be `HH:MM` or `hh:mm AM/PM`.
#[derive(Debug, Clone, Default)]
pub struct ScheduleForm {
    pub schedule_id: String,
    pub departure_time: String,
    pub arrival_time: String,
    pub start_station: String,
    pub stopping_station: String,
}

impl ScheduleForm {
    /// Creation additionally requires a numeric schedule id.
    pub fn validate_new(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if self.schedule_id.trim().is_empty() {
            errors.add("schedule_id", "Schedule ID is required");
        } else if self.schedule_id.trim().parse::<i64>().is_err() {
            errors.add("schedule_id", "Schedule ID must be a number");
        }
        self.collect_common(&mut errors);
        errors.into_result()
    }

    pub fn validate_update(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        self.collect_common(&mut errors);
        errors.into_result()
    }

    fn collect_common(&self, errors: &mut ValidationErrors) {
        let departure = check_clock(&self.departure_time, "Departure Time is required");
        let arrival = check_clock(&self.arrival_time, "Arrival Time is required");
        match (&departure, &arrival) {
            (Ok(departure), Ok(arrival)) if arrival <= departure => {
                errors.add("arrival_time", "Arrival Time should be after Departure Time");
            }
            _ => {}
        }
        if let Err(message) = departure {
            errors.add("departure_time", message);
        }
        if let Err(message) = arrival {
            errors.add("arrival_time", message);
        }
        errors.check(
            "start_station",
            check_required(&self.start_station, "Start Station is required"),
        );
        errors.check(
            "stopping_station",
            check_required(&self.stopping_station, "Stopping Station is required"),
        );
    }
}

fn check_clock(value: &str, missing: &str) -> Result<String, String> {
    if value.trim().is_empty() {
        return Err(missing.to_string());
    }
    timefmt::normalize_24_hour(value).map_err(|err| err.to_string())
}

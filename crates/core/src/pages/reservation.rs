use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use super::{fail, Interaction, Outcome, Records};
use crate::{
    api::ApiClient,
    models::{Booking, BookingCodes, BookingStatus, Schedule, Traveler},
    timefmt,
    validation::{parse_seat_count, BookingForm},
};

/// Seat reservation on published schedules.
pub struct ReservationPage {
    api: ApiClient,
    dialogs: Arc<dyn Interaction>,
    schedules: Records<Schedule>,
    travelers: Records<Traveler>,
}

impl ReservationPage {
    /// Page with nothing loaded yet.
    pub fn new(api: ApiClient, dialogs: Arc<dyn Interaction>) -> Self {
        Self {
            api,
            dialogs,
            schedules: Records::new(),
            travelers: Records::new(),
        }
    }

    /// Schedules of published trains.
    pub fn schedules(&self) -> &Records<Schedule> {
        &self.schedules
    }

    /// Travelers that may be booked for, i.e. active ones.
    pub fn travelers(&self) -> &Records<Traveler> {
        &self.travelers
    }

    /// Fetch active travelers and published schedules.
    pub async fn load(&self) -> Outcome {
        let (travelers, schedules) =
            tokio::join!(self.api.travelers(), self.api.published_schedules());

        let mut failure = None;
        match travelers {
            Ok(list) => self
                .travelers
                .replace(list.into_iter().filter(|t| t.is_active).collect()),
            Err(_) => {
                self.travelers.replace(Vec::new());
                failure = Some(fail(self.dialogs.as_ref(), "Error fetching travelers").await);
            }
        }
        match schedules {
            Ok(list) => self.schedules.replace(list),
            Err(_) => {
                self.schedules.replace(Vec::new());
                let failed = fail(self.dialogs.as_ref(), "Error fetching schedules").await;
                failure = failure.or(Some(failed));
            }
        }
        failure.unwrap_or(Outcome::Completed(()))
    }

    /// Book seats on `schedule` for the traveler chosen in `form`.
    pub async fn reserve(&self, schedule: &Schedule, form: &BookingForm) -> Outcome<Booking> {
        if let Err(errors) = form.validate(timefmt::today()) {
            return errors.into();
        }
        let (Some(date), Some(seat_count), Some(nic)) = (
            timefmt::parse_form_date(&form.reservation_date),
            parse_seat_count(&form.seat_count),
            form.traveler_nic.as_deref(),
        ) else {
            return fail(self.dialogs.as_ref(), "Error adding booking").await;
        };

        let now = Utc::now();
        let codes = BookingCodes::from_millis(now.timestamp_millis());
        let booking = Booking {
            id: String::new(),
            booking_id: codes.booking_id,
            schedule_id: schedule.id.to_string(),
            nic: nic.to_string(),
            train_id: schedule.train.id.clone(),
            seat_count,
            reservation_date: timefmt::date_timestamp(date),
            booking_date: now,
            status: BookingStatus::Active,
            reference_id: codes.reference_id,
        };

        match self.api.create_booking(&booking).await {
            Ok(()) => {
                info!(booking = %booking.booking_id, schedule = schedule.id, "reservation created");
                self.dialogs.notify("Reservation successful!").await;
                Outcome::Completed(booking)
            }
            Err(_) => fail(self.dialogs.as_ref(), "Error adding booking").await,
        }
    }
}

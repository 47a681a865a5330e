use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::info;

use super::{fail, Interaction, Outcome, Records};
use crate::{
    api::ApiClient,
    models::{Booking, BookingStatus},
    timefmt,
    validation::{parse_seat_count, BookingEditForm},
};

/// Listing of current reservations with edit and cancel actions.
pub struct BookingsPage {
    api: ApiClient,
    dialogs: Arc<dyn Interaction>,
    bookings: Records<Booking>,
}

impl BookingsPage {
    /// Page with an empty booking list.
    pub fn new(api: ApiClient, dialogs: Arc<dyn Interaction>) -> Self {
        Self {
            api,
            dialogs,
            bookings: Records::new(),
        }
    }

    /// Bookings as last loaded or patched.
    pub fn bookings(&self) -> &Records<Booking> {
        &self.bookings
    }

    /// Fetch all bookings.
    pub async fn load(&self) -> Outcome {
        match self.api.bookings().await {
            Ok(list) => {
                self.bookings.replace(list);
                Outcome::Completed(())
            }
            Err(_) => {
                self.bookings.replace(Vec::new());
                fail(self.dialogs.as_ref(), "Error fetching bookings").await
            }
        }
    }

    /// Whether edit and cancel are offered for `booking` at `now`.
    pub fn can_modify(booking: &Booking, now: &DateTime<Utc>) -> bool {
        timefmt::can_modify_booking(&booking.reservation_date, now)
    }

    /// Edit form prefilled from `booking`.
    pub fn edit_form_for(booking: &Booking) -> BookingEditForm {
        BookingEditForm {
            reservation_date: timefmt::format_date(&booking.reservation_date),
            seat_count: booking.seat_count.to_string(),
        }
    }

    /// Change the date and seat count of the booking identified by `booking_id`.
    pub async fn update(&self, booking_id: &str, form: &BookingEditForm) -> Outcome<Booking> {
        if let Err(errors) = form.validate(timefmt::today()) {
            return errors.into();
        }
        let current = self.bookings.find(|b| b.booking_id == booking_id);
        let (Some(current), Some(date), Some(seat_count)) = (
            current,
            timefmt::parse_form_date(&form.reservation_date),
            parse_seat_count(&form.seat_count),
        ) else {
            return fail(self.dialogs.as_ref(), "Error updating the booking.").await;
        };

        let updated = Booking {
            reservation_date: timefmt::date_timestamp(date),
            seat_count,
            ..current
        };
        match self.api.update_booking(&updated).await {
            Ok(()) => {
                self.bookings
                    .update(|b| b.booking_id == booking_id, |b| *b = updated.clone());
                info!(booking = booking_id, "booking updated");
                self.dialogs.notify("Booking updated successfully!").await;
                Outcome::Completed(updated)
            }
            Err(_) => fail(self.dialogs.as_ref(), "Error updating the booking.").await,
        }
    }

    /// Confirm, then mark the booking cancelled.
    pub async fn cancel(&self, booking_id: &str) -> Outcome {
        if !self
            .dialogs
            .confirm("Are you sure you want to cancel this booking?")
            .await
        {
            return Outcome::Declined;
        }
        match self.api.cancel_booking(booking_id).await {
            Ok(()) => {
                self.bookings.update(
                    |b| b.booking_id == booking_id,
                    |b| b.status = BookingStatus::Cancelled,
                );
                info!(booking = booking_id, "booking cancelled");
                self.dialogs.notify("Booking cancelled successfully!").await;
                Outcome::Completed(())
            }
            Err(_) => fail(self.dialogs.as_ref(), "Error cancelling the booking.").await,
        }
    }
}

mod common;

use std::sync::Arc;

use chrono::{Duration, Utc};
use common::{booking_json, client, schedule_json, traveler_json, ScriptedDialogs};
use dreamtravel_core::{
    models::BookingStatus,
    pages::{logout, BookingsPage, LoginPage, Outcome, ReservationPage, TrainPage, TravelerPage, UserPage},
    validation::{BookingEditForm, BookingForm, LoginForm, ScheduleForm, TravelerForm, UserForm},
    timefmt, ApiClient, Role, Section, SessionStore,
};
use serde_json::json;
use tempfile::tempdir;
use wiremock::{
    matchers::{body_json, body_partial_json, header, method, path},
    Mock, MockServer, ResponseTemplate,
};

fn future_date(days: i64) -> String {
    (timefmt::today() + Duration::days(days))
        .format("%Y-%m-%d")
        .to_string()
}

#[tokio::test]
async fn login_stores_session_and_unlocks_sections() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/Users/login"))
        .and(body_json(json!({ "nic": "123456789X", "password": "secret1" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "token": "jwt-1", "role": 3 })))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempdir().unwrap();
    let store = SessionStore::new(dir.path().join("session.json"));
    let dialogs = ScriptedDialogs::answering(true);
    let page = LoginPage::new(ApiClient::new(&server.uri()).unwrap(), store.clone(), dialogs.clone());

    let form = LoginForm {
        nic: "123456789X".into(),
        password: "secret1".into(),
    };
    let session = page.submit(&form).await.completed().expect("signed in");
    assert_eq!(session.token(), "jwt-1");
    assert_eq!(session.role(), Role::Admin);
    assert_eq!(session.sections().first(), Some(&Section::MakeReservation));
    assert!(session.can_open(Section::UserManagement));

    let stored = store.load().unwrap().expect("persisted");
    assert_eq!(stored, session);
    assert!(dialogs.alerts().is_empty());
}

#[tokio::test]
async fn login_rejection_shows_server_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/Users/login"))
        .respond_with(ResponseTemplate::new(400).set_body_string("Invalid password"))
        .mount(&server)
        .await;

    let dir = tempdir().unwrap();
    let store = SessionStore::new(dir.path().join("session.json"));
    let dialogs = ScriptedDialogs::answering(true);
    let page = LoginPage::new(ApiClient::new(&server.uri()).unwrap(), store.clone(), dialogs.clone());

    let form = LoginForm {
        nic: "123456789V".into(),
        password: "wrong".into(),
    };
    assert_eq!(page.submit(&form).await, Outcome::Failed("Invalid password".into()));
    assert_eq!(dialogs.alerts(), vec!["Invalid password".to_string()]);
    assert!(store.load().unwrap().is_none());
}

#[tokio::test]
async fn login_server_error_is_generic() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/Users/login"))
        .respond_with(ResponseTemplate::new(500).set_body_string("stack trace"))
        .mount(&server)
        .await;

    let dir = tempdir().unwrap();
    let dialogs = ScriptedDialogs::answering(true);
    let page = LoginPage::new(
        ApiClient::new(&server.uri()).unwrap(),
        SessionStore::new(dir.path().join("session.json")),
        dialogs.clone(),
    );
    let form = LoginForm {
        nic: "123456789V".into(),
        password: "secret1".into(),
    };
    page.submit(&form).await;
    assert_eq!(dialogs.alerts(), vec!["Authentication Failed".to_string()]);
}

#[tokio::test]
async fn invalid_login_sends_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let dir = tempdir().unwrap();
    let page = LoginPage::new(
        ApiClient::new(&server.uri()).unwrap(),
        SessionStore::new(dir.path().join("session.json")),
        ScriptedDialogs::answering(true),
    );
    let outcome = page
        .submit(&LoginForm {
            nic: "12345".into(),
            password: String::new(),
        })
        .await;
    let errors = outcome.errors().expect("invalid");
    assert_eq!(errors.get("nic"), Some("NIC invalid."));
    assert_eq!(errors.get("password"), Some("Password is required."));
}

#[tokio::test]
async fn logout_clears_store_only_when_confirmed() {
    let dir = tempdir().unwrap();
    let store = SessionStore::new(dir.path().join("session.json"));
    store
        .persist(&dreamtravel_core::Session::new("tok", Role::Agent))
        .unwrap();

    let declined = ScriptedDialogs::answering(false);
    assert_eq!(logout(&store, declined.as_ref()).await, Outcome::Declined);
    assert!(store.load().unwrap().is_some());

    let accepted = ScriptedDialogs::answering(true);
    assert!(logout(&store, accepted.as_ref()).await.is_completed());
    assert_eq!(accepted.questions(), vec!["Are you sure you want to log out?".to_string()]);
    assert!(store.load().unwrap().is_none());
}

#[tokio::test]
async fn reservation_page_lists_active_travelers_and_books() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/Travelers"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            traveler_json("123456789V", "Nimal", true),
            traveler_json("987654321V", "Kamal", false)
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/schedules/published-trains"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            schedule_json(3, "T1", "06:00 AM", "09:30 AM")
        ])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/Bookings"))
        .and(header("authorization", "Bearer test-token"))
        .and(body_partial_json(json!({
            "scheduleID": "3",
            "trainID": "T1",
            "nic": "123456789V",
            "seatCount": 2,
            "status": 0
        })))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let dialogs = ScriptedDialogs::answering(true);
    let page = ReservationPage::new(client(&server, Role::Agent), dialogs.clone());
    assert!(page.load().await.is_completed());
    assert_eq!(page.travelers().len(), 1);
    let schedule = page.schedules().snapshot().remove(0);

    let form = BookingForm {
        traveler_nic: Some("123456789V".into()),
        reservation_date: future_date(3),
        seat_count: "2".into(),
    };
    let booking = page.reserve(&schedule, &form).await.completed().expect("booked");
    assert!(booking.booking_id.starts_with("B-"));
    assert_eq!(
        booking.booking_id.trim_start_matches("B-"),
        booking.reference_id.trim_start_matches("RF-")
    );
    assert_eq!(dialogs.alerts(), vec!["Reservation successful!".to_string()]);
}

#[tokio::test]
async fn oversized_booking_is_blocked_before_sending() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/Bookings"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let dialogs = ScriptedDialogs::answering(true);
    let page = ReservationPage::new(client(&server, Role::Agent), dialogs.clone());
    let schedule: dreamtravel_core::Schedule =
        serde_json::from_value(schedule_json(3, "T1", "06:00 AM", "09:30 AM")).unwrap();
    let form = BookingForm {
        traveler_nic: Some("123456789V".into()),
        reservation_date: future_date(3),
        seat_count: "5".into(),
    };

    let outcome = page.reserve(&schedule, &form).await;
    assert_eq!(
        outcome.errors().and_then(|e| e.get("seat_count")),
        Some("Seat count is required and should be between 1 and 4")
    );
    assert!(dialogs.alerts().is_empty());
}

#[tokio::test]
async fn failed_list_alerts_and_stays_empty() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/Bookings"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let dialogs = ScriptedDialogs::answering(true);
    let page = BookingsPage::new(client(&server, Role::Agent), dialogs.clone());
    assert_eq!(page.load().await, Outcome::Failed("Error fetching bookings".into()));
    assert!(page.bookings().is_empty());
    assert_eq!(dialogs.alerts(), vec!["Error fetching bookings".to_string()]);
}

#[tokio::test]
async fn bookings_are_updated_and_cancelled_locally() {
    let server = MockServer::start().await;
    let far = (Utc::now() + Duration::days(20)).to_rfc3339();
    Mock::given(method("GET"))
        .and(path("/api/Bookings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([booking_json("B-1", &far, 0)])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/api/Bookings/B-1"))
        .and(body_partial_json(json!({ "bookingID": "B-1", "seatCount": 4 })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/api/Bookings/B-1/status"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let dialogs = ScriptedDialogs::answering(true);
    let page = BookingsPage::new(client(&server, Role::Agent), dialogs.clone());
    page.load().await;
    let booking = page.bookings().snapshot().remove(0);
    assert!(BookingsPage::can_modify(&booking, &Utc::now()));

    let mut form = BookingsPage::edit_form_for(&booking);
    assert_eq!(form.seat_count, "2");
    form.seat_count = "4".into();
    form.reservation_date = future_date(10);
    let updated = page.update("B-1", &form).await.completed().expect("updated");
    assert_eq!(updated.seat_count, 4);
    assert_eq!(page.bookings().snapshot()[0].seat_count, 4);

    assert!(page.cancel("B-1").await.is_completed());
    assert_eq!(page.bookings().snapshot()[0].status, BookingStatus::Cancelled);
    assert_eq!(
        dialogs.alerts(),
        vec![
            "Booking updated successfully!".to_string(),
            "Booking cancelled successfully!".to_string()
        ]
    );
}

#[tokio::test]
async fn declined_cancel_sends_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let dialogs = ScriptedDialogs::answering(false);
    let page = BookingsPage::new(client(&server, Role::Agent), dialogs.clone());
    assert_eq!(page.cancel("B-1").await, Outcome::Declined);
    assert_eq!(
        dialogs.questions(),
        vec!["Are you sure you want to cancel this booking?".to_string()]
    );
}

#[tokio::test]
async fn booking_edit_failure_keeps_local_record() {
    let server = MockServer::start().await;
    let far = (Utc::now() + Duration::days(20)).to_rfc3339();
    Mock::given(method("GET"))
        .and(path("/api/Bookings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([booking_json("B-1", &far, 0)])))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let dialogs = ScriptedDialogs::answering(true);
    let page = BookingsPage::new(client(&server, Role::Agent), dialogs.clone());
    page.load().await;
    let form = BookingEditForm {
        reservation_date: future_date(10),
        seat_count: "1".into(),
    };
    assert_eq!(
        page.update("B-1", &form).await,
        Outcome::Failed("Error updating the booking.".into())
    );
    assert_eq!(page.bookings().snapshot()[0].seat_count, 2);
}

#[tokio::test]
async fn traveler_registration_creates_account_then_profile() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/Users/register"))
        .and(body_partial_json(json!({ "nic": "200012345678", "role": 0, "password": "secret1" })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/Travelers/register"))
        .and(body_partial_json(json!({ "nic": "200012345678", "name": "Sunil" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "tr-9" })))
        .expect(1)
        .mount(&server)
        .await;

    let dialogs = ScriptedDialogs::answering(true);
    let page = TravelerPage::new(client(&server, Role::Agent), dialogs.clone(), Role::Agent);
    assert!(!page.can_toggle_status());

    let form = TravelerForm {
        nic: "200012345678".into(),
        name: "Sunil".into(),
        email: "sunil@example.com".into(),
        date_of_birth: "1985-03-14".into(),
        password: "secret1".into(),
    };
    let traveler = page.add(&form).await.completed().expect("registered");
    assert_eq!(traveler.id, "tr-9");
    assert_eq!(page.travelers().len(), 1);
    assert_eq!(dialogs.alerts(), vec!["Traveler added successfully!".to_string()]);
}

#[tokio::test]
async fn traveler_registration_surfaces_account_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/Users/register"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!("User already exists")))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/Travelers/register"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let dialogs = ScriptedDialogs::answering(true);
    let page = TravelerPage::new(client(&server, Role::Admin), dialogs.clone(), Role::Admin);
    let form = TravelerForm {
        nic: "200012345678".into(),
        name: "Sunil".into(),
        email: "sunil@example.com".into(),
        date_of_birth: "1985-03-14".into(),
        password: "secret1".into(),
    };
    assert_eq!(page.add(&form).await, Outcome::Failed("User already exists".into()));
    assert!(page.travelers().is_empty());
}

#[tokio::test]
async fn traveler_stays_listed_when_account_delete_fails() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/Travelers"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            traveler_json("123456789V", "Nimal", true)
        ])))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/Travelers/123456789V"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/Users/123456789V"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let dialogs = ScriptedDialogs::answering(true);
    let page = TravelerPage::new(client(&server, Role::Admin), dialogs.clone(), Role::Admin);
    page.load().await;

    let outcome = page.delete("123456789V").await;
    assert_eq!(outcome, Outcome::Failed("Unable to delete traveler.".into()));
    assert_eq!(page.travelers().len(), 1);
}

#[tokio::test]
async fn traveler_delete_removes_after_both_calls() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/Travelers"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            traveler_json("123456789V", "Nimal", true),
            traveler_json("987654321V", "Kamal", true)
        ])))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/Travelers/123456789V"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/Users/123456789V"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let dialogs = ScriptedDialogs::answering(true);
    let page = TravelerPage::new(client(&server, Role::Admin), dialogs.clone(), Role::Admin);
    page.load().await;
    assert!(page.delete("123456789V").await.is_completed());
    let left = page.travelers().snapshot();
    assert_eq!(left.len(), 1);
    assert_eq!(left[0].nic, "987654321V");
}

#[tokio::test]
async fn traveler_activation_flips_local_flag() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/Travelers"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            traveler_json("123456789V", "Nimal", false)
        ])))
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/api/Travelers/123456789V/activate"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/api/Travelers/123456789V/deactivate"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let dialogs = ScriptedDialogs::answering(true);
    let page = TravelerPage::new(client(&server, Role::BackOffice), dialogs.clone(), Role::BackOffice);
    assert!(page.can_toggle_status());
    page.load().await;

    assert!(page.set_active("123456789V", true).await.is_completed());
    assert!(page.travelers().snapshot()[0].is_active);

    let outcome = page.set_active("123456789V", false).await;
    assert_eq!(outcome, Outcome::Failed("Failed to deactivate traveler.".into()));
    assert!(page.travelers().snapshot()[0].is_active);
    assert_eq!(
        dialogs.questions(),
        vec![
            "Are you sure you want to activate this traveler?".to_string(),
            "Are you sure you want to deactivate this traveler?".to_string()
        ]
    );
}

#[tokio::test]
async fn traveler_update_patches_profile() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/Travelers"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            traveler_json("123456789V", "Nimal", true)
        ])))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/api/Travelers/123456789V"))
        .and(body_partial_json(json!({ "name": "Nimal Perera", "isActive": true })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "id-123456789V" })))
        .expect(1)
        .mount(&server)
        .await;

    let dialogs = ScriptedDialogs::answering(true);
    let page = TravelerPage::new(client(&server, Role::Agent), dialogs.clone(), Role::Agent);
    page.load().await;
    let mut form = TravelerPage::edit_form_for(&page.travelers().snapshot()[0]);
    assert_eq!(form.date_of_birth, "1990-01-01");
    form.name = "Nimal Perera".into();

    assert!(page.update(&form).await.is_completed());
    assert_eq!(page.travelers().snapshot()[0].name, "Nimal Perera");
    assert_eq!(dialogs.alerts(), vec!["Traveler updated successfully!".to_string()]);
}

#[tokio::test]
async fn user_page_hides_travelers_and_protects_admins() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/Users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": "1", "nic": "111111111V", "role": 0, "email": "t@example.com" },
            { "id": "2", "nic": "222222222V", "role": 1, "email": "a@example.com" },
            { "id": "3", "nic": "333333333V", "role": 3, "email": "root@example.com" }
        ])))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/Users/222222222V"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let dialogs = ScriptedDialogs::answering(true);
    let page = UserPage::new(client(&server, Role::Admin), dialogs.clone());
    page.load().await;
    let users = page.users().snapshot();
    assert_eq!(users.len(), 2);
    assert!(UserPage::can_delete(&users[0]));
    assert!(!UserPage::can_delete(&users[1]));

    assert!(page.delete("222222222V").await.is_completed());
    assert_eq!(page.users().len(), 1);
}

#[tokio::test]
async fn user_creation_validates_and_appends() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/Users/register"))
        .and(body_partial_json(json!({ "role": 2 })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let dialogs = ScriptedDialogs::answering(true);
    let page = UserPage::new(client(&server, Role::Admin), dialogs.clone());

    let mut form = UserForm {
        nic: "200012345678".into(),
        email: "bo@example.com".into(),
        password: "secret1".into(),
        role: Some(Role::Admin),
    };
    let outcome = page.add(&form).await;
    assert_eq!(
        outcome.errors().and_then(|e| e.get("role")),
        Some("Invalid role selected.")
    );

    form.role = Some(Role::BackOffice);
    let user = page.add(&form).await.completed().expect("created");
    assert!(user.password.is_none());
    assert_eq!(page.users().snapshot(), vec![user]);
    assert_eq!(dialogs.alerts(), vec!["User added successfully!".to_string()]);
}

#[tokio::test]
async fn train_creation_reports_server_details_on_500() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/Trains"))
        .and(body_json(json!({ "id": "T1", "name": "Yal Devi", "isPublished": false })))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(json!({ "details": "Train ID already taken" })),
        )
        .mount(&server)
        .await;

    let dialogs = ScriptedDialogs::answering(true);
    let page = TrainPage::new(client(&server, Role::BackOffice), dialogs.clone());
    let form = dreamtravel_core::validation::TrainForm {
        id: "T1".into(),
        name: "Yal Devi".into(),
    };
    assert_eq!(page.add_train(&form).await, Outcome::Failed("Train ID already taken".into()));
    assert!(page.trains().is_empty());
}

#[tokio::test]
async fn trains_publish_and_list_schedules() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/Trains"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": "T1", "name": "Udarata Menike", "isPublished": false }
        ])))
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/api/Trains/T1/activate"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/schedules/train/T1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            schedule_json(3, "T1", "06:00 AM", "09:30 AM"),
            schedule_json(4, "T1", "01:00 PM", "04:45 PM")
        ])))
        .mount(&server)
        .await;

    let dialogs = ScriptedDialogs::answering(true);
    let page = TrainPage::new(client(&server, Role::Admin), dialogs.clone());
    page.load().await;
    assert!(page.set_published("T1", true).await.is_completed());
    assert!(page.trains().snapshot()[0].is_published);
    assert_eq!(
        dialogs.questions(),
        vec!["Are you sure you want to publish this Train?".to_string()]
    );

    let schedules = page.load_schedules("T1").await.completed().expect("schedules");
    assert_eq!(schedules.len(), 2);
    page.load_schedules("T1").await;
    assert_eq!(page.schedules_for("T1").len(), 2);
}

#[tokio::test]
async fn schedule_with_arrival_before_departure_is_blocked() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let page = TrainPage::new(client(&server, Role::Admin), ScriptedDialogs::answering(true));
    let form = ScheduleForm {
        schedule_id: "5".into(),
        departure_time: "10:00".into(),
        arrival_time: "09:00".into(),
        start_station: "Colombo Fort".into(),
        stopping_station: "Galle".into(),
    };
    let outcome = page.add_schedule("T1", &form).await;
    assert_eq!(
        outcome.errors().and_then(|e| e.get("arrival_time")),
        Some("Arrival Time should be after Departure Time")
    );
}

#[tokio::test]
async fn schedules_are_sent_in_twelve_hour_form() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/Trains"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": "T1", "name": "Udarata Menike", "isPublished": true }
        ])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/schedules/T1"))
        .and(body_json(json!({
            "id": 5,
            "departureTime": "09:15 AM",
            "arrivalTime": "01:30 PM",
            "startStation": "Colombo Fort",
            "stoppingStation": "Badulla",
            "availableCount": 0,
            "reservationCount": 0,
            "train": { "id": "T1", "name": "Udarata Menike", "isPublished": true }
        })))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/api/schedules/5"))
        .and(body_partial_json(json!({ "id": 0, "arrivalTime": "02:00 PM" })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let dialogs = ScriptedDialogs::answering(true);
    let page = TrainPage::new(client(&server, Role::Admin), dialogs.clone());
    page.load().await;
    let mut form = ScheduleForm {
        schedule_id: "5".into(),
        departure_time: "09:15".into(),
        arrival_time: "13:30".into(),
        start_station: "Colombo Fort".into(),
        stopping_station: "Badulla".into(),
    };
    assert!(page.add_schedule("T1", &form).await.is_completed());

    form.arrival_time = "14:00".into();
    let updated = page.update_schedule(5, &form).await.completed().expect("updated");
    assert_eq!(updated.id, 5);
    assert_eq!(updated.train.id, "T1");
    assert_eq!(page.schedules_for("T1")[0].arrival_time, "02:00 PM");
    assert_eq!(
        dialogs.alerts(),
        vec![
            "Schedule added successfully!".to_string(),
            "Schedule updated successfully!".to_string()
        ]
    );
}

#[tokio::test]
async fn schedule_rejection_shows_server_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/schedules/T1"))
        .respond_with(ResponseTemplate::new(400).set_body_string("Schedule 5 already exists"))
        .mount(&server)
        .await;

    let dialogs: Arc<ScriptedDialogs> = ScriptedDialogs::answering(true);
    let page = TrainPage::new(client(&server, Role::Admin), dialogs.clone());
    let form = ScheduleForm {
        schedule_id: "5".into(),
        departure_time: "09:15".into(),
        arrival_time: "13:30".into(),
        start_station: "Colombo Fort".into(),
        stopping_station: "Badulla".into(),
    };
    page.add_schedule("T1", &form).await;
    assert_eq!(dialogs.alerts(), vec!["Schedule 5 already exists".to_string()]);
}

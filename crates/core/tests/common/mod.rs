#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use dreamtravel_core::{pages::Interaction, ApiClient, Role, Session};
use parking_lot::Mutex;
use serde_json::{json, Value};
use wiremock::MockServer;

pub const TOKEN: &str = "test-token";

/// Dialog stub that answers every confirmation the same way and records alerts.
pub struct ScriptedDialogs {
    answer: bool,
    questions: Mutex<Vec<String>>,
    alerts: Mutex<Vec<String>>,
}

impl ScriptedDialogs {
    pub fn answering(answer: bool) -> Arc<Self> {
        Arc::new(Self {
            answer,
            questions: Mutex::new(Vec::new()),
            alerts: Mutex::new(Vec::new()),
        })
    }

    pub fn alerts(&self) -> Vec<String> {
        self.alerts.lock().clone()
    }

    pub fn questions(&self) -> Vec<String> {
        self.questions.lock().clone()
    }
}

#[async_trait]
impl Interaction for ScriptedDialogs {
    async fn confirm(&self, message: &str) -> bool {
        self.questions.lock().push(message.to_string());
        self.answer
    }

    async fn notify(&self, message: &str) {
        self.alerts.lock().push(message.to_string());
    }
}

pub fn client(server: &MockServer, role: Role) -> ApiClient {
    ApiClient::new(&server.uri())
        .expect("mock server uri")
        .with_session(&Session::new(TOKEN, role))
}

pub fn traveler_json(nic: &str, name: &str, active: bool) -> Value {
    json!({
        "id": format!("id-{nic}"),
        "nic": nic,
        "name": name,
        "email": format!("{}@example.com", name.to_lowercase()),
        "dateOfBirth": "1990-01-01T00:00:00Z",
        "isActive": active
    })
}

pub fn schedule_json(id: i64, train_id: &str, departure: &str, arrival: &str) -> Value {
    json!({
        "id": id,
        "departureTime": departure,
        "arrivalTime": arrival,
        "startStation": "Colombo Fort",
        "stoppingStation": "Kandy",
        "availableCount": 120,
        "reservationCount": 8,
        "train": { "id": train_id, "name": "Udarata Menike", "isPublished": true }
    })
}

pub fn booking_json(booking_id: &str, reservation: &str, status: u8) -> Value {
    json!({
        "id": format!("db-{booking_id}"),
        "bookingID": booking_id,
        "scheduleID": "3",
        "nic": "123456789V",
        "trainID": "T1",
        "seatCount": 2,
        "reservationDate": reservation,
        "bookingDate": "2024-01-01T08:00:00Z",
        "status": status,
        "referenceID": booking_id.replace("B-", "RF-")
    })
}

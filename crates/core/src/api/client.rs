use std::sync::Arc;

use reqwest::{header, Method, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::{debug, warn};

use super::error::{ApiError, Result};
use crate::{
    models::{
        Booking, BookingStatus, Credentials, LoginResponse, Schedule, StatusPatch, Train, Traveler,
        User,
    },
    session::Session,
};

/// JSON client for the reservation API.
///
/// Cheap to clone; clones share the connection pool. A client built from a
/// [`Session`] attaches its bearer token to every request.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    token: Option<Arc<str>>,
}

impl ApiClient {
    /// Build an anonymous client rooted at `base_url`.
    pub fn new(base_url: &str) -> Result<Self> {
        let base_url = Url::parse(base_url.trim())
            .ok()
            .filter(|url| !url.cannot_be_a_base())
            .ok_or_else(|| ApiError::InvalidBaseUrl(base_url.to_string()))?;
        let http = reqwest::Client::builder().build()?;
        Ok(Self {
            http,
            base_url,
            token: None,
        })
    }

    /// Clone of this client that authenticates as `session`.
    pub fn with_session(&self, session: &Session) -> Self {
        Self {
            token: Some(Arc::from(session.token())),
            ..self.clone()
        }
    }

    /// Base URL requests are resolved against.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// `POST /api/Users/login`.
    pub async fn login(&self, credentials: &Credentials) -> Result<LoginResponse> {
        self.fetch(self.request(Method::POST, &["api", "Users", "login"])?.json(credentials))
            .await
    }

    /// `GET /api/Bookings`.
    pub async fn bookings(&self) -> Result<Vec<Booking>> {
        self.fetch(self.request(Method::GET, &["api", "Bookings"])?)
            .await
    }

    /// `POST /api/Bookings`.
    pub async fn create_booking(&self, booking: &Booking) -> Result<()> {
        self.execute(self.request(Method::POST, &["api", "Bookings"])?.json(booking))
            .await
    }

    /// `PUT /api/Bookings/{bookingID}`.
    pub async fn update_booking(&self, booking: &Booking) -> Result<()> {
        let path = ["api", "Bookings", booking.booking_id.as_str()];
        self.execute(self.request(Method::PUT, &path)?.json(booking))
            .await
    }

    /// `PATCH /api/Bookings/{bookingID}/status` with `{"status": 1}`.
    pub async fn cancel_booking(&self, booking_id: &str) -> Result<()> {
        let body = StatusPatch {
            status: BookingStatus::Cancelled,
        };
        let path = ["api", "Bookings", booking_id, "status"];
        self.execute(self.request(Method::PATCH, &path)?.json(&body))
            .await
    }

    /// `GET /api/Travelers`.
    pub async fn travelers(&self) -> Result<Vec<Traveler>> {
        self.fetch(self.request(Method::GET, &["api", "Travelers"])?)
            .await
    }

    /// `POST /api/Travelers/register`, returning the server-assigned id if echoed.
    pub async fn register_traveler(&self, traveler: &Traveler) -> Result<Option<String>> {
        let path = ["api", "Travelers", "register"];
        self.create(self.request(Method::POST, &path)?.json(traveler))
            .await
    }

    /// `PUT /api/Travelers/{nic}`.
    pub async fn update_traveler(&self, traveler: &Traveler) -> Result<Option<String>> {
        let path = ["api", "Travelers", traveler.nic.as_str()];
        self.create(self.request(Method::PUT, &path)?.json(traveler))
            .await
    }

    /// `DELETE /api/Travelers/{nic}`.
    pub async fn delete_traveler(&self, nic: &str) -> Result<()> {
        self.execute(self.request(Method::DELETE, &["api", "Travelers", nic])?)
            .await
    }

    /// `PATCH /api/Travelers/{nic}/activate` or `/deactivate`.
    pub async fn set_traveler_active(&self, nic: &str, active: bool) -> Result<()> {
        let action = if active { "activate" } else { "deactivate" };
        let path = ["api", "Travelers", nic, action];
        self.execute(self.request(Method::PATCH, &path)?.json(&json!({})))
            .await
    }

    /// `GET /api/Users`.
    pub async fn users(&self) -> Result<Vec<User>> {
        self.fetch(self.request(Method::GET, &["api", "Users"])?)
            .await
    }

    /// `POST /api/Users/register`, returning the server-assigned id if echoed.
    pub async fn register_user(&self, user: &User) -> Result<Option<String>> {
        let path = ["api", "Users", "register"];
        self.create(self.request(Method::POST, &path)?.json(user))
            .await
    }

    /// `DELETE /api/Users/{nic}`.
    pub async fn delete_user(&self, nic: &str) -> Result<()> {
        self.execute(self.request(Method::DELETE, &["api", "Users", nic])?)
            .await
    }

    /// `GET /api/Trains`.
    pub async fn trains(&self) -> Result<Vec<Train>> {
        self.fetch(self.request(Method::GET, &["api", "Trains"])?)
            .await
    }

    /// `POST /api/Trains`.
    pub async fn create_train(&self, train: &Train) -> Result<()> {
        self.execute(self.request(Method::POST, &["api", "Trains"])?.json(train))
            .await
    }

    /// `PATCH /api/Trains/{id}/activate` or `/deactivate`.
    pub async fn set_train_published(&self, id: &str, published: bool) -> Result<()> {
        let action = if published { "activate" } else { "deactivate" };
        let path = ["api", "Trains", id, action];
        self.execute(self.request(Method::PATCH, &path)?.json(&json!({})))
            .await
    }

    /// `GET /api/schedules/published-trains`.
    pub async fn published_schedules(&self) -> Result<Vec<Schedule>> {
        let path = ["api", "schedules", "published-trains"];
        self.fetch(self.request(Method::GET, &path)?).await
    }

    /// `GET /api/schedules/train/{id}`.
    pub async fn train_schedules(&self, train_id: &str) -> Result<Vec<Schedule>> {
        let path = ["api", "schedules", "train", train_id];
        self.fetch(self.request(Method::GET, &path)?).await
    }

    /// `POST /api/schedules/{trainId}`.
    pub async fn create_schedule(&self, train_id: &str, schedule: &Schedule) -> Result<()> {
        let path = ["api", "schedules", train_id];
        self.execute(self.request(Method::POST, &path)?.json(schedule))
            .await
    }

    /// `PUT /api/schedules/{id}`.
    pub async fn update_schedule(&self, schedule_id: i64, schedule: &Schedule) -> Result<()> {
        let id = schedule_id.to_string();
        let path = ["api", "schedules", id.as_str()];
        self.execute(self.request(Method::PUT, &path)?.json(schedule))
            .await
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidBaseUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, segments: &[&str]) -> Result<RequestBuilder> {
        let url = self.endpoint(segments)?;
        debug!(%method, %url, "api request");
        let builder = self
            .http
            .request(method, url)
            .header(header::CONTENT_TYPE, "application/json");
        Ok(match self.token.as_deref() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        })
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Response> {
        let response = builder.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let url = response.url().clone();
        let body = response.text().await.unwrap_or_default();
        warn!(%status, %url, "api request rejected");
        Err(ApiError::Status { status, body })
    }

    async fn fetch<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T> {
        let bytes = self.send(builder).await?.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn execute(&self, builder: RequestBuilder) -> Result<()> {
        self.send(builder).await.map(|_| ())
    }

    async fn create(&self, builder: RequestBuilder) -> Result<Option<String>> {
        let bytes = self.send(builder).await?.bytes().await?;
        Ok(created_id(&bytes))
    }
}

fn created_id(body: &[u8]) -> Option<String> {
    let value: Value = serde_json::from_slice(body).ok()?;
    match value.get("id")? {
        Value::String(id) if !id.is_empty() => Some(id.clone()),
        Value::Number(id) => Some(id.to_string()),
        _ => None,
    }
}

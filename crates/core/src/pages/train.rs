use std::sync::Arc;

use reqwest::StatusCode;
use tracing::info;

use super::{fail, Interaction, Outcome, Records};
use crate::{
    api::ApiClient,
    models::{Schedule, Train},
    timefmt::{self, TimeFormatError},
    validation::{ScheduleForm, TrainForm, ValidationErrors},
};

/// Trains, their publication state and their schedules.
pub struct TrainPage {
    api: ApiClient,
    dialogs: Arc<dyn Interaction>,
    trains: Records<Train>,
    schedules: Records<Schedule>,
}

impl TrainPage {
    /// Page with no trains or schedules loaded.
    pub fn new(api: ApiClient, dialogs: Arc<dyn Interaction>) -> Self {
        Self {
            api,
            dialogs,
            trains: Records::new(),
            schedules: Records::new(),
        }
    }

    /// Trains as last loaded or patched.
    pub fn trains(&self) -> &Records<Train> {
        &self.trains
    }

    /// Schedules loaded so far, across all expanded trains.
    pub fn schedules(&self) -> &Records<Schedule> {
        &self.schedules
    }

    /// Loaded schedules belonging to `train_id`.
    pub fn schedules_for(&self, train_id: &str) -> Vec<Schedule> {
        self.schedules
            .snapshot()
            .into_iter()
            .filter(|s| s.train.id == train_id)
            .collect()
    }

    /// Edit form prefilled from `schedule`, times shown in 24-hour form.
    pub fn schedule_form_for(schedule: &Schedule) -> ScheduleForm {
        let clock = |value: &str| timefmt::to_24_hour(value).unwrap_or_else(|_| value.to_string());
        ScheduleForm {
            schedule_id: schedule.id.to_string(),
            departure_time: clock(&schedule.departure_time),
            arrival_time: clock(&schedule.arrival_time),
            start_station: schedule.start_station.clone(),
            stopping_station: schedule.stopping_station.clone(),
        }
    }

    /// Fetch all trains, published or not.
    pub async fn load(&self) -> Outcome {
        match self.api.trains().await {
            Ok(list) => {
                self.trains.replace(list);
                Outcome::Completed(())
            }
            Err(_) => {
                self.trains.replace(Vec::new());
                fail(self.dialogs.as_ref(), "Failed to fetch trains").await
            }
        }
    }

    /// Create an unpublished train.
    pub async fn add_train(&self, form: &TrainForm) -> Outcome<Train> {
        const FAILED: &str = "Failed to add train";
        if let Err(errors) = form.validate() {
            return errors.into();
        }
        let train = Train {
            id: form.id.trim().to_string(),
            name: form.name.trim().to_string(),
            is_published: false,
        };
        match self.api.create_train(&train).await {
            Ok(()) => {
                self.trains.push(train.clone());
                info!(train = %train.id, "train created");
                self.dialogs.notify("Train added successfully!").await;
                Outcome::Completed(train)
            }
            Err(err) if err.has_status(StatusCode::INTERNAL_SERVER_ERROR) => {
                fail(self.dialogs.as_ref(), err.message_or(FAILED)).await
            }
            Err(_) => fail(self.dialogs.as_ref(), FAILED).await,
        }
    }

    /// Confirm, then publish or unpublish the train.
    pub async fn set_published(&self, train_id: &str, publish: bool) -> Outcome {
        let verb = if publish { "publish" } else { "unpublish" };
        let question = format!("Are you sure you want to {verb} this Train?");
        if !self.dialogs.confirm(&question).await {
            return Outcome::Declined;
        }
        match self.api.set_train_published(train_id, publish).await {
            Ok(()) => {
                self.trains
                    .update(|t| t.id == train_id, |t| t.is_published = publish);
                info!(train = train_id, publish, "train publication changed");
                Outcome::Completed(())
            }
            Err(_) => fail(self.dialogs.as_ref(), format!("Failed to {verb} Train.")).await,
        }
    }

    /// Fetch the schedules of one train, replacing any loaded earlier.
    pub async fn load_schedules(&self, train_id: &str) -> Outcome<Vec<Schedule>> {
        match self.api.train_schedules(train_id).await {
            Ok(mut list) => {
                for schedule in &mut list {
                    schedule.train.id = train_id.to_string();
                }
                self.schedules.remove(|s| s.train.id == train_id);
                for schedule in &list {
                    self.schedules.push(schedule.clone());
                }
                Outcome::Completed(list)
            }
            Err(_) => fail(self.dialogs.as_ref(), "Failed to fetch schedule").await,
        }
    }

    /// Create a schedule on `train_id`.
    pub async fn add_schedule(&self, train_id: &str, form: &ScheduleForm) -> Outcome<Schedule> {
        const FAILED: &str = "Failed to add schedule";
        if let Err(errors) = form.validate_new() {
            return errors.into();
        }
        let Ok(id) = form.schedule_id.trim().parse::<i64>() else {
            return fail(self.dialogs.as_ref(), FAILED).await;
        };
        let name = self
            .trains
            .find(|t| t.id == train_id)
            .map(|t| t.name)
            .unwrap_or_default();
        let train = Train {
            id: train_id.to_string(),
            name,
            is_published: true,
        };
        let schedule = match wire_schedule(id, form, train) {
            Ok(schedule) => schedule,
            Err(errors) => return errors.into(),
        };

        match self.api.create_schedule(train_id, &schedule).await {
            Ok(()) => {
                self.schedules.push(schedule.clone());
                info!(train = train_id, schedule = id, "schedule created");
                self.dialogs.notify("Schedule added successfully!").await;
                Outcome::Completed(schedule)
            }
            Err(err) if err.has_status(StatusCode::BAD_REQUEST) => {
                fail(self.dialogs.as_ref(), err.message_or(FAILED)).await
            }
            Err(_) => fail(self.dialogs.as_ref(), FAILED).await,
        }
    }

    /// Change times and stations of schedule `schedule_id`.
    ///
    /// The id and train travel in the path, so the body carries placeholders
    /// for them; the local record keeps its own.
    pub async fn update_schedule(&self, schedule_id: i64, form: &ScheduleForm) -> Outcome<Schedule> {
        if let Err(errors) = form.validate_update() {
            return errors.into();
        }
        let placeholder = Train {
            id: String::new(),
            name: String::new(),
            is_published: true,
        };
        let body = match wire_schedule(0, form, placeholder) {
            Ok(body) => body,
            Err(errors) => return errors.into(),
        };

        match self.api.update_schedule(schedule_id, &body).await {
            Ok(()) => {
                let mut patched = None;
                self.schedules.update(
                    |s| s.id == schedule_id,
                    |s| {
                        s.departure_time = body.departure_time.clone();
                        s.arrival_time = body.arrival_time.clone();
                        s.start_station = body.start_station.clone();
                        s.stopping_station = body.stopping_station.clone();
                        patched = Some(s.clone());
                    },
                );
                info!(schedule = schedule_id, "schedule updated");
                self.dialogs.notify("Schedule updated successfully!").await;
                Outcome::Completed(patched.unwrap_or(Schedule {
                    id: schedule_id,
                    ..body
                }))
            }
            Err(_) => fail(self.dialogs.as_ref(), "Failed to update schedule").await,
        }
    }
}

fn wire_schedule(id: i64, form: &ScheduleForm, train: Train) -> Result<Schedule, ValidationErrors> {
    let mut errors = ValidationErrors::new();
    let departure = wire_time(&form.departure_time);
    let arrival = wire_time(&form.arrival_time);
    if let Err(err) = &departure {
        errors.add("departure_time", err.to_string());
    }
    if let Err(err) = &arrival {
        errors.add("arrival_time", err.to_string());
    }
    match (departure, arrival) {
        (Ok(departure_time), Ok(arrival_time)) => Ok(Schedule {
            id,
            departure_time,
            arrival_time,
            start_station: form.start_station.trim().to_string(),
            stopping_station: form.stopping_station.trim().to_string(),
            available_count: 0,
            reservation_count: 0,
            train,
        }),
        _ => Err(errors),
    }
}

fn wire_time(value: &str) -> Result<String, TimeFormatError> {
    timefmt::normalize_24_hour(value).and_then(|time| timefmt::to_12_hour(&time))
}

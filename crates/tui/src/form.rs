use dreamtravel_core::{
    models::{Booking, Role, Schedule, Traveler},
    pages::{BookingsPage, TrainPage, TravelerPage},
    validation::{
        BookingEditForm, BookingForm, LoginForm, ScheduleForm, TrainForm, TravelerForm, UserForm,
        ValidationErrors,
    },
};

const MAX_FIELD_LEN: usize = 100;

#[derive(Debug, Clone)]
pub enum FieldKind {
    Text,
    Secret,
    /// `(value, label)` pairs cycled with Left/Right.
    Choice(Vec<(String, String)>),
}

#[derive(Debug, Clone)]
pub struct Field {
    pub key: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub input: String,
    pub cursor: usize,
    pub choice: Option<usize>,
    pub locked: bool,
}

impl Field {
    fn text(key: &'static str, label: &'static str, value: impl Into<String>) -> Self {
        let input = value.into();
        Self {
            key,
            label,
            kind: FieldKind::Text,
            cursor: input.len(),
            input,
            choice: None,
            locked: false,
        }
    }

    fn secret(key: &'static str, label: &'static str) -> Self {
        Self {
            kind: FieldKind::Secret,
            ..Self::text(key, label, "")
        }
    }

    fn choice(key: &'static str, label: &'static str, options: Vec<(String, String)>) -> Self {
        Self {
            kind: FieldKind::Choice(options),
            ..Self::text(key, label, "")
        }
    }

    fn locked(mut self) -> Self {
        self.locked = true;
        self
    }

    /// Text shown for the field; secrets are masked.
    pub fn display(&self) -> String {
        match &self.kind {
            FieldKind::Text => self.input.clone(),
            FieldKind::Secret => "*".repeat(self.input.chars().count()),
            FieldKind::Choice(options) => match self.choice.and_then(|idx| options.get(idx)) {
                Some((_, label)) => format!("< {label} >"),
                None if options.is_empty() => "(none available)".to_string(),
                None => "< select >".to_string(),
            },
        }
    }

    pub fn is_editable_text(&self) -> bool {
        !self.locked && matches!(self.kind, FieldKind::Text | FieldKind::Secret)
    }

    fn value(&self) -> Option<String> {
        match &self.kind {
            FieldKind::Choice(options) => self
                .choice
                .and_then(|idx| options.get(idx))
                .map(|(value, _)| value.clone()),
            _ => Some(self.input.clone()),
        }
    }

    fn cycle(&mut self, delta: isize) {
        let FieldKind::Choice(options) = &self.kind else {
            return;
        };
        if options.is_empty() || self.locked {
            return;
        }
        let len = options.len() as isize;
        let next = match self.choice {
            Some(idx) => (idx as isize + delta).rem_euclid(len),
            None if delta < 0 => len - 1,
            None => 0,
        };
        self.choice = Some(next as usize);
    }

    fn move_cursor(&mut self, delta: isize) {
        let len = self.input.len() as isize;
        self.cursor = (self.cursor as isize + delta).clamp(0, len) as usize;
    }

    fn insert(&mut self, ch: char) {
        if self.input.len() >= MAX_FIELD_LEN {
            return;
        }
        if ch.is_ascii() && !ch.is_ascii_control() {
            self.input.insert(self.cursor, ch);
            self.cursor += 1;
        }
    }

    fn backspace(&mut self) {
        if self.cursor > 0 && self.cursor <= self.input.len() {
            self.cursor -= 1;
            self.input.remove(self.cursor);
        }
    }

    fn delete(&mut self) {
        if self.cursor < self.input.len() {
            self.input.remove(self.cursor);
        }
    }
}

/// What submitting a form does.
#[derive(Debug, Clone)]
pub enum FormKind {
    Login,
    NewBooking { schedule: Schedule },
    EditBooking { booking_id: String },
    NewTraveler,
    EditTraveler,
    NewUser,
    NewTrain,
    NewSchedule { train_id: String },
    EditSchedule { schedule_id: i64 },
}

/// Editable form shown as a modal, or as the login screen body.
#[derive(Debug, Clone)]
pub struct FormModal {
    pub title: String,
    pub kind: FormKind,
    pub fields: Vec<Field>,
    pub focus: usize,
    pub errors: ValidationErrors,
}

impl FormModal {
    fn new(title: impl Into<String>, kind: FormKind, fields: Vec<Field>) -> Self {
        let focus = fields.iter().position(|f| !f.locked).unwrap_or(0);
        Self {
            title: title.into(),
            kind,
            fields,
            focus,
            errors: ValidationErrors::new(),
        }
    }

    pub fn login() -> Self {
        Self::new(
            "Sign in",
            FormKind::Login,
            vec![
                Field::text("nic", "NIC", ""),
                Field::secret("password", "Password"),
            ],
        )
    }

    pub fn new_booking(schedule: Schedule, travelers: &[Traveler]) -> Self {
        let options = travelers
            .iter()
            .map(|t| (t.nic.clone(), format!("{} ({})", t.name, t.nic)))
            .collect();
        let title = format!(
            "Reserve {} | {} to {}",
            schedule.train.name, schedule.start_station, schedule.stopping_station
        );
        Self::new(
            title,
            FormKind::NewBooking { schedule },
            vec![
                Field::choice("traveler", "Traveler", options),
                Field::text("reservation_date", "Reservation date (YYYY-MM-DD)", ""),
                Field::text("seat_count", "Seat count", ""),
            ],
        )
    }

    pub fn edit_booking(booking: &Booking) -> Self {
        let prefill = BookingsPage::edit_form_for(booking);
        Self::new(
            format!("Edit booking {}", booking.booking_id),
            FormKind::EditBooking {
                booking_id: booking.booking_id.clone(),
            },
            vec![
                Field::text(
                    "reservation_date",
                    "Reservation date (YYYY-MM-DD)",
                    prefill.reservation_date,
                ),
                Field::text("seat_count", "Seat count", prefill.seat_count),
            ],
        )
    }

    pub fn new_traveler() -> Self {
        Self::new(
            "Add traveler",
            FormKind::NewTraveler,
            vec![
                Field::text("nic", "NIC", ""),
                Field::text("name", "Name", ""),
                Field::text("email", "Email", ""),
                Field::text("date_of_birth", "Date of birth (YYYY-MM-DD)", ""),
                Field::secret("password", "Password"),
            ],
        )
    }

    pub fn edit_traveler(traveler: &Traveler) -> Self {
        let prefill = TravelerPage::edit_form_for(traveler);
        Self::new(
            format!("Edit traveler {}", traveler.nic),
            FormKind::EditTraveler,
            vec![
                Field::text("nic", "NIC", prefill.nic).locked(),
                Field::text("name", "Name", prefill.name),
                Field::text("email", "Email", prefill.email),
                Field::text(
                    "date_of_birth",
                    "Date of birth (YYYY-MM-DD)",
                    prefill.date_of_birth,
                ),
            ],
        )
    }

    pub fn new_user() -> Self {
        let roles = Role::ASSIGNABLE
            .iter()
            .map(|role| (role.code().to_string(), role.label().to_string()))
            .collect();
        Self::new(
            "Add user",
            FormKind::NewUser,
            vec![
                Field::text("nic", "NIC", ""),
                Field::text("email", "Email", ""),
                Field::choice("role", "Role", roles),
                Field::secret("password", "Password"),
            ],
        )
    }

    pub fn new_train() -> Self {
        Self::new(
            "Add train",
            FormKind::NewTrain,
            vec![
                Field::text("id", "Train ID", ""),
                Field::text("name", "Train name", ""),
            ],
        )
    }

    pub fn new_schedule(train_id: String, train_name: &str) -> Self {
        Self::new(
            format!("Add schedule to {train_name}"),
            FormKind::NewSchedule { train_id },
            schedule_fields(ScheduleForm::default(), false),
        )
    }

    pub fn edit_schedule(schedule: &Schedule) -> Self {
        Self::new(
            format!("Edit schedule {}", schedule.id),
            FormKind::EditSchedule {
                schedule_id: schedule.id,
            },
            schedule_fields(TrainPage::schedule_form_for(schedule), true),
        )
    }

    pub fn focused(&self) -> Option<&Field> {
        self.fields.get(self.focus)
    }

    pub fn error_for(&self, key: &str) -> Option<&str> {
        self.errors.get(key)
    }

    pub fn focus_next(&mut self, delta: isize) {
        let len = self.fields.len() as isize;
        if len == 0 {
            return;
        }
        let mut next = self.focus as isize;
        for _ in 0..len {
            next = (next + delta).rem_euclid(len);
            if !self.fields[next as usize].locked {
                break;
            }
        }
        self.focus = next as usize;
    }

    pub fn left(&mut self) {
        self.with_focused(|f| match f.kind {
            FieldKind::Choice(_) => f.cycle(-1),
            _ => f.move_cursor(-1),
        });
    }

    pub fn right(&mut self) {
        self.with_focused(|f| match f.kind {
            FieldKind::Choice(_) => f.cycle(1),
            _ => f.move_cursor(1),
        });
    }

    pub fn home(&mut self) {
        self.with_focused(|f| f.cursor = 0);
    }

    pub fn end(&mut self) {
        self.with_focused(|f| f.cursor = f.input.len());
    }

    pub fn insert(&mut self, ch: char) {
        self.with_focused(|f| match f.kind {
            FieldKind::Choice(_) if ch == ' ' => f.cycle(1),
            FieldKind::Choice(_) => {}
            _ => f.insert(ch),
        });
    }

    pub fn backspace(&mut self) {
        self.with_focused(Field::backspace);
    }

    pub fn delete(&mut self) {
        self.with_focused(Field::delete);
    }

    fn with_focused(&mut self, edit: impl FnOnce(&mut Field)) {
        if let Some(field) = self.fields.get_mut(self.focus) {
            if !field.locked || matches!(field.kind, FieldKind::Choice(_)) {
                edit(field);
            }
        }
    }

    fn value(&self, key: &str) -> String {
        self.choice_value(key).unwrap_or_default()
    }

    fn choice_value(&self, key: &str) -> Option<String> {
        self.fields
            .iter()
            .find(|f| f.key == key)
            .and_then(Field::value)
    }

    pub fn login_form(&self) -> LoginForm {
        LoginForm {
            nic: self.value("nic"),
            password: self.value("password"),
        }
    }

    pub fn booking_form(&self) -> BookingForm {
        BookingForm {
            traveler_nic: self.choice_value("traveler"),
            reservation_date: self.value("reservation_date"),
            seat_count: self.value("seat_count"),
        }
    }

    pub fn booking_edit_form(&self) -> BookingEditForm {
        BookingEditForm {
            reservation_date: self.value("reservation_date"),
            seat_count: self.value("seat_count"),
        }
    }

    pub fn traveler_form(&self) -> TravelerForm {
        TravelerForm {
            nic: self.value("nic"),
            name: self.value("name"),
            email: self.value("email"),
            date_of_birth: self.value("date_of_birth"),
            password: self.value("password"),
        }
    }

    pub fn user_form(&self) -> UserForm {
        let role = self
            .choice_value("role")
            .and_then(|code| code.parse::<u8>().ok())
            .and_then(|code| Role::try_from(code).ok());
        UserForm {
            nic: self.value("nic"),
            email: self.value("email"),
            password: self.value("password"),
            role,
        }
    }

    pub fn train_form(&self) -> TrainForm {
        TrainForm {
            id: self.value("id"),
            name: self.value("name"),
        }
    }

    pub fn schedule_form(&self) -> ScheduleForm {
        ScheduleForm {
            schedule_id: self.value("schedule_id"),
            departure_time: self.value("departure_time"),
            arrival_time: self.value("arrival_time"),
            start_station: self.value("start_station"),
            stopping_station: self.value("stopping_station"),
        }
    }
}

fn schedule_fields(prefill: ScheduleForm, editing: bool) -> Vec<Field> {
    let id = Field::text("schedule_id", "Schedule ID", prefill.schedule_id);
    vec![
        if editing { id.locked() } else { id },
        Field::text("departure_time", "Departure time (HH:MM)", prefill.departure_time),
        Field::text("arrival_time", "Arrival time (HH:MM)", prefill.arrival_time),
        Field::text("start_station", "Start station", prefill.start_station),
        Field::text("stopping_station", "Stopping station", prefill.stopping_station),
    ]
}

use std::{
    collections::{HashSet, VecDeque},
    future::Future,
    io,
    sync::Arc,
    thread,
    time::Duration,
};

use anyhow::{Context, Result};
use chrono::Utc;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use dreamtravel_core::{
    pages::{
        logout, BookingsPage, Interaction, LoginPage, Outcome, ReservationPage, TrainPage,
        TravelerPage, UserPage,
    },
    timefmt, ApiClient, BookingStatus, Section, Session, SessionStore, ValidationErrors,
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, List, ListItem, ListState, Paragraph, Row, Table, TableState, Wrap},
    Frame, Terminal,
};
use tokio::{
    spawn,
    sync::{mpsc, oneshot},
};
use tracing::{debug, info, warn};

use crate::{
    dialogs::TuiDialogs,
    form::{FormKind, FormModal},
};

const TICK_RATE: Duration = Duration::from_millis(250);
const SIDEBAR_WIDTH: u16 = 26;
const FORM_WIDTH: u16 = 64;
const LOGIN_WIDTH: u16 = 48;

#[derive(Debug, Clone)]
struct Theme {
    primary_fg: Color,
    accent: Color,
    muted: Color,
    selection_bg: Color,
    selection_fg: Color,
    success: Color,
    warning: Color,
    danger: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            primary_fg: Color::White,
            accent: Color::Cyan,
            muted: Color::DarkGray,
            selection_bg: Color::DarkGray,
            selection_fg: Color::White,
            success: Color::Green,
            warning: Color::Yellow,
            danger: Color::Red,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Screen {
    Login,
    Main,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Focus {
    Sidebar,
    Table,
    Schedules,
}

/// Where a background request was started; one may be in flight per origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum Origin {
    Login,
    Logout,
    Section(Section),
}

enum Dialog {
    Confirm {
        message: String,
        reply: oneshot::Sender<bool>,
    },
    Alert(String),
}

/// Result of a background page operation, reported back to the UI loop.
pub(crate) struct TaskReport {
    origin: Origin,
    status: String,
    errors: Option<ValidationErrors>,
    from_form: bool,
    completed: bool,
}

impl TaskReport {
    fn new<T>(origin: Origin, action: &str, from_form: bool, outcome: &Outcome<T>) -> Self {
        let status = match outcome {
            Outcome::Completed(_) => format!("{action}: done"),
            Outcome::Invalid(errors) => format!("{action}: {} field(s) need attention", errors.len()),
            Outcome::Declined => format!("{action}: cancelled"),
            Outcome::Failed(message) => format!("{action}: {message}"),
        };
        Self {
            origin,
            status,
            errors: outcome.errors().cloned(),
            from_form,
            completed: outcome.is_completed(),
        }
    }
}

pub(crate) enum AppEvent {
    Input(Event),
    Tick,
    Confirm {
        message: String,
        reply: oneshot::Sender<bool>,
    },
    Alert(String),
    SignedIn(Session),
    SignedOut,
    TaskFinished(TaskReport),
}

#[derive(Clone)]
struct Pages {
    reservation: Arc<ReservationPage>,
    bookings: Arc<BookingsPage>,
    travelers: Arc<TravelerPage>,
    users: Arc<UserPage>,
    trains: Arc<TrainPage>,
}

impl Pages {
    fn new(api: &ApiClient, session: &Session, dialogs: Arc<dyn Interaction>) -> Self {
        let api = api.with_session(session);
        Self {
            reservation: Arc::new(ReservationPage::new(api.clone(), Arc::clone(&dialogs))),
            bookings: Arc::new(BookingsPage::new(api.clone(), Arc::clone(&dialogs))),
            travelers: Arc::new(TravelerPage::new(
                api.clone(),
                Arc::clone(&dialogs),
                session.role(),
            )),
            users: Arc::new(UserPage::new(api.clone(), Arc::clone(&dialogs))),
            trains: Arc::new(TrainPage::new(api, dialogs)),
        }
    }
}

/// Terminal front end for the reservation client.
pub struct DreamTravelApp {
    api: ApiClient,
    store: SessionStore,
    session: Option<Session>,
    pages: Option<Pages>,
    screen: Screen,
    login: FormModal,
    form: Option<FormModal>,
    dialogs: VecDeque<Dialog>,
    state: UiState,
    busy: HashSet<Origin>,
    event_tx: Option<mpsc::Sender<AppEvent>>,
    theme: Theme,
}

impl DreamTravelApp {
    pub fn new(api: ApiClient, store: SessionStore) -> Self {
        let session = match store.load() {
            Ok(session) => session,
            Err(err) => {
                warn!(?err, "could not read stored session");
                None
            }
        };
        Self {
            api,
            store,
            session,
            pages: None,
            screen: Screen::Login,
            login: FormModal::login(),
            form: None,
            dialogs: VecDeque::new(),
            state: UiState::default(),
            busy: HashSet::new(),
            event_tx: None,
            theme: Theme::default(),
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        let mut stdout = io::stdout();
        enable_raw_mode().context("failed to enter raw mode")?;
        execute!(stdout, EnterAlternateScreen).context("failed to enter alternate screen")?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend).context("failed to create terminal")?;
        terminal.hide_cursor()?;
        terminal.clear()?;

        let (event_tx, mut event_rx) = mpsc::channel::<AppEvent>(128);
        spawn_input_thread(event_tx.clone());
        self.event_tx = Some(event_tx);

        if let Some(session) = self.session.clone() {
            info!(role = %session.role(), "resuming stored session");
            self.enter_main(session);
        }

        loop {
            terminal.draw(|frame| self.draw(frame))?;
            let maybe_event = event_rx.recv().await;
            if !self.process_app_event(maybe_event) || self.state.should_quit {
                break;
            }
        }

        restore_terminal(&mut terminal)?;
        self.event_tx = None;
        Ok(())
    }

    fn process_app_event(&mut self, maybe_event: Option<AppEvent>) -> bool {
        match maybe_event {
            Some(AppEvent::Input(event)) => self.handle_input(event),
            Some(AppEvent::Tick) => {}
            Some(AppEvent::Confirm { message, reply }) => {
                self.dialogs.push_back(Dialog::Confirm { message, reply });
            }
            Some(AppEvent::Alert(message)) => self.dialogs.push_back(Dialog::Alert(message)),
            Some(AppEvent::SignedIn(session)) => {
                self.busy.remove(&Origin::Login);
                self.login = FormModal::login();
                self.enter_main(session);
            }
            Some(AppEvent::SignedOut) => self.leave_main(),
            Some(AppEvent::TaskFinished(report)) => self.finish_task(report),
            None => return false,
        }
        true
    }

    fn interaction(&self) -> Option<Arc<dyn Interaction>> {
        self.event_tx
            .clone()
            .map(|tx| Arc::new(TuiDialogs::new(tx)) as Arc<dyn Interaction>)
    }

    fn enter_main(&mut self, session: Session) {
        let Some(dialogs) = self.interaction() else {
            return;
        };
        self.pages = Some(Pages::new(&self.api, &session, dialogs));
        self.state
            .set_status(format!("Signed in as {}", session.role().label()));
        self.session = Some(session);
        self.screen = Screen::Main;
        self.state.section_cursor = 0;
        self.state.focus = Focus::Sidebar;
        self.open_section();
    }

    fn leave_main(&mut self) {
        self.busy.clear();
        self.session = None;
        self.pages = None;
        self.form = None;
        self.screen = Screen::Login;
        self.state = UiState::default();
        self.state.set_status("Signed out".to_string());
    }

    fn sections(&self) -> Vec<Section> {
        self.session
            .as_ref()
            .map(Session::sections)
            .unwrap_or_default()
    }

    fn current_section(&self) -> Option<Section> {
        self.sections().get(self.state.section_cursor).copied()
    }

    fn spawn_task<T, F>(&mut self, origin: Origin, action: &'static str, from_form: bool, task: F)
    where
        T: Send + 'static,
        F: Future<Output = Outcome<T>> + Send + 'static,
    {
        let Some(tx) = self.event_tx.clone() else {
            return;
        };
        if !self.busy.insert(origin) {
            self.state
                .set_status("Still working on the previous request".to_string());
            return;
        }
        debug!(?origin, action, "task started");
        spawn(async move {
            let outcome = task.await;
            let report = TaskReport::new(origin, action, from_form, &outcome);
            if tx.send(AppEvent::TaskFinished(report)).await.is_err() {
                debug!(action, "ui closed before task finished");
            }
        });
    }

    fn finish_task(&mut self, report: TaskReport) {
        self.busy.remove(&report.origin);
        self.state.set_status(report.status);
        if report.origin == Origin::Login {
            self.login.errors = report.errors.unwrap_or_default();
            return;
        }
        if !report.from_form {
            return;
        }
        if report.completed {
            self.form = None;
        } else if let (Some(form), Some(errors)) = (self.form.as_mut(), report.errors) {
            form.errors = errors;
        }
    }

    fn submit_login(&mut self) {
        let (Some(tx), Some(dialogs)) = (self.event_tx.clone(), self.interaction()) else {
            return;
        };
        if !self.busy.insert(Origin::Login) {
            return;
        }
        self.state.set_status("Signing in...".to_string());
        let page = LoginPage::new(self.api.clone(), self.store.clone(), dialogs);
        let form = self.login.login_form();
        spawn(async move {
            let event = match page.submit(&form).await {
                Outcome::Completed(session) => AppEvent::SignedIn(session),
                other => AppEvent::TaskFinished(TaskReport::new(
                    Origin::Login,
                    "Sign in",
                    true,
                    &other,
                )),
            };
            if tx.send(event).await.is_err() {
                debug!("ui closed before sign-in finished");
            }
        });
    }

    fn request_logout(&mut self) {
        let (Some(tx), Some(dialogs)) = (self.event_tx.clone(), self.interaction()) else {
            return;
        };
        if !self.busy.insert(Origin::Logout) {
            return;
        }
        let store = self.store.clone();
        spawn(async move {
            let outcome = logout(&store, dialogs.as_ref()).await;
            let event = if outcome.is_completed() {
                AppEvent::SignedOut
            } else {
                AppEvent::TaskFinished(TaskReport::new(Origin::Logout, "Log out", false, &outcome))
            };
            if tx.send(event).await.is_err() {
                debug!("ui closed before logout finished");
            }
        });
    }

    fn open_section(&mut self) {
        let (Some(section), Some(pages)) = (self.current_section(), self.pages.clone()) else {
            return;
        };
        self.state.row = 0;
        self.state.schedule_row = 0;
        self.state.expanded_train = None;
        let origin = Origin::Section(section);
        match section {
            Section::MakeReservation => {
                let page = pages.reservation;
                self.spawn_task(origin, "Load schedules", false, async move { page.load().await });
            }
            Section::CurrentReservations => {
                let page = pages.bookings;
                self.spawn_task(origin, "Load bookings", false, async move { page.load().await });
            }
            Section::TravelerManagement => {
                let page = pages.travelers;
                self.spawn_task(origin, "Load travelers", false, async move { page.load().await });
            }
            Section::UserManagement => {
                let page = pages.users;
                self.spawn_task(origin, "Load users", false, async move { page.load().await });
            }
            Section::TrainManagement => {
                let page = pages.trains;
                self.spawn_task(origin, "Load trains", false, async move { page.load().await });
            }
        }
    }

    fn submit_form(&mut self) {
        let (Some(form), Some(pages), Some(section)) =
            (self.form.clone(), self.pages.clone(), self.current_section())
        else {
            return;
        };
        let origin = Origin::Section(section);
        match form.kind.clone() {
            FormKind::Login => {}
            FormKind::NewBooking { schedule } => {
                let page = pages.reservation;
                let input = form.booking_form();
                self.spawn_task(origin, "Reserve", true, async move {
                    page.reserve(&schedule, &input).await
                });
            }
            FormKind::EditBooking { booking_id } => {
                let page = pages.bookings;
                let input = form.booking_edit_form();
                self.spawn_task(origin, "Update booking", true, async move {
                    page.update(&booking_id, &input).await
                });
            }
            FormKind::NewTraveler => {
                let page = pages.travelers;
                let input = form.traveler_form();
                self.spawn_task(origin, "Add traveler", true, async move {
                    page.add(&input).await
                });
            }
            FormKind::EditTraveler => {
                let page = pages.travelers;
                let input = form.traveler_form();
                self.spawn_task(origin, "Update traveler", true, async move {
                    page.update(&input).await
                });
            }
            FormKind::NewUser => {
                let page = pages.users;
                let input = form.user_form();
                self.spawn_task(origin, "Add user", true, async move { page.add(&input).await });
            }
            FormKind::NewTrain => {
                let page = pages.trains;
                let input = form.train_form();
                self.spawn_task(origin, "Add train", true, async move {
                    page.add_train(&input).await
                });
            }
            FormKind::NewSchedule { train_id } => {
                let page = pages.trains;
                let input = form.schedule_form();
                self.spawn_task(origin, "Add schedule", true, async move {
                    page.add_schedule(&train_id, &input).await
                });
            }
            FormKind::EditSchedule { schedule_id } => {
                let page = pages.trains;
                let input = form.schedule_form();
                self.spawn_task(origin, "Update schedule", true, async move {
                    page.update_schedule(schedule_id, &input).await
                });
            }
        }
    }

    fn handle_input(&mut self, event: Event) {
        let Event::Key(key) = event else {
            return;
        };
        if key.kind != KeyEventKind::Press {
            return;
        }
        if key.modifiers == KeyModifiers::CONTROL && key.code == KeyCode::Char('c') {
            self.state.should_quit = true;
            return;
        }
        if !self.dialogs.is_empty() {
            self.handle_dialog_key(key);
            return;
        }
        match self.screen {
            Screen::Login => self.handle_login_key(key),
            Screen::Main if self.form.is_some() => self.handle_form_key(key),
            Screen::Main => self.handle_main_key(key),
        }
    }

    fn handle_dialog_key(&mut self, key: KeyEvent) {
        let answer = match self.dialogs.front() {
            Some(Dialog::Confirm { .. }) => match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => Some(true),
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => Some(false),
                _ => None,
            },
            Some(Dialog::Alert(_)) => match key.code {
                KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ') => Some(true),
                _ => None,
            },
            None => None,
        };
        let Some(answer) = answer else {
            return;
        };
        if let Some(Dialog::Confirm { reply, .. }) = self.dialogs.pop_front() {
            if reply.send(answer).is_err() {
                debug!("confirmation requester went away");
            }
        }
    }

    fn handle_login_key(&mut self, key: KeyEvent) {
        match edit_form(&mut self.login, key) {
            FormAction::Submit => self.submit_login(),
            FormAction::Cancel => self.state.should_quit = true,
            FormAction::None => {}
        }
    }

    fn handle_form_key(&mut self, key: KeyEvent) {
        let Some(form) = self.form.as_mut() else {
            return;
        };
        match edit_form(form, key) {
            FormAction::Submit => self.submit_form(),
            FormAction::Cancel => {
                self.form = None;
                self.state.set_status("Form closed".to_string());
            }
            FormAction::None => {}
        }
    }

    fn handle_main_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => {
                self.state.should_quit = true;
                return;
            }
            KeyCode::Char('L') => {
                self.request_logout();
                return;
            }
            KeyCode::Char('r') => {
                self.open_section();
                return;
            }
            KeyCode::Tab => {
                self.cycle_focus(1);
                return;
            }
            KeyCode::BackTab => {
                self.cycle_focus(-1);
                return;
            }
            _ => {}
        }
        match self.state.focus {
            Focus::Sidebar => self.handle_sidebar_key(key),
            Focus::Table => self.handle_table_key(key),
            Focus::Schedules => self.handle_schedule_key(key),
        }
    }

    fn cycle_focus(&mut self, delta: isize) {
        let mut order = vec![Focus::Sidebar, Focus::Table];
        if self.current_section() == Some(Section::TrainManagement)
            && self.state.expanded_train.is_some()
        {
            order.push(Focus::Schedules);
        }
        let idx = order
            .iter()
            .position(|focus| *focus == self.state.focus)
            .unwrap_or(0) as isize;
        let next = (idx + delta).rem_euclid(order.len() as isize) as usize;
        self.state.focus = order[next];
    }

    fn handle_sidebar_key(&mut self, key: KeyEvent) {
        let total = self.sections().len();
        let previous = self.state.section_cursor;
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => {
                self.state.section_cursor = previous.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.state.section_cursor = (previous + 1).min(total.saturating_sub(1));
            }
            KeyCode::Enter | KeyCode::Right => self.state.focus = Focus::Table,
            _ => {}
        }
        if self.state.section_cursor != previous {
            self.open_section();
        }
    }

    fn handle_table_key(&mut self, key: KeyEvent) {
        let count = self.row_count();
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.state.row = self.state.row.saturating_sub(1),
            KeyCode::Down | KeyCode::Char('j') => {
                self.state.row = (self.state.row + 1).min(count.saturating_sub(1));
            }
            KeyCode::Home => self.state.row = 0,
            KeyCode::End => self.state.row = count.saturating_sub(1),
            KeyCode::Left | KeyCode::Esc => self.state.focus = Focus::Sidebar,
            code => self.section_action(code),
        }
    }

    fn handle_schedule_key(&mut self, key: KeyEvent) {
        let Some(pages) = self.pages.clone() else {
            return;
        };
        let schedules = self
            .state
            .expanded_train
            .as_deref()
            .map(|id| pages.trains.schedules_for(id))
            .unwrap_or_default();
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => {
                self.state.schedule_row = self.state.schedule_row.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.state.schedule_row =
                    (self.state.schedule_row + 1).min(schedules.len().saturating_sub(1));
            }
            KeyCode::Left | KeyCode::Esc => self.state.focus = Focus::Table,
            KeyCode::Char('e') | KeyCode::Enter => {
                if let Some(schedule) = schedules.get(self.state.schedule_row) {
                    self.form = Some(FormModal::edit_schedule(schedule));
                }
            }
            _ => {}
        }
    }

    fn section_action(&mut self, code: KeyCode) {
        let (Some(section), Some(pages)) = (self.current_section(), self.pages.clone()) else {
            return;
        };
        let origin = Origin::Section(section);
        let row = self.state.row;
        match section {
            Section::MakeReservation => {
                if code != KeyCode::Enter {
                    return;
                }
                let Some(schedule) = pages.reservation.schedules().snapshot().get(row).cloned()
                else {
                    return;
                };
                let travelers = pages.reservation.travelers().snapshot();
                self.form = Some(FormModal::new_booking(schedule, &travelers));
            }
            Section::CurrentReservations => {
                let Some(booking) = pages.bookings.bookings().snapshot().get(row).cloned() else {
                    return;
                };
                let editable = BookingsPage::can_modify(&booking, &Utc::now());
                match code {
                    KeyCode::Char('e') | KeyCode::Char('c') if !editable => {
                        self.state.set_status(format!(
                            "Booking {} is less than {} days away and can no longer be changed",
                            booking.booking_id,
                            timefmt::MODIFY_CUTOFF_DAYS
                        ));
                    }
                    KeyCode::Char('e') => self.form = Some(FormModal::edit_booking(&booking)),
                    KeyCode::Char('c') => {
                        let page = pages.bookings;
                        let id = booking.booking_id;
                        self.spawn_task(origin, "Cancel booking", false, async move {
                            page.cancel(&id).await
                        });
                    }
                    _ => {}
                }
            }
            Section::TravelerManagement => {
                let selected = pages.travelers.travelers().snapshot().get(row).cloned();
                match (code, selected) {
                    (KeyCode::Char('a'), _) => self.form = Some(FormModal::new_traveler()),
                    (KeyCode::Char('e') | KeyCode::Enter, Some(traveler)) => {
                        self.form = Some(FormModal::edit_traveler(&traveler));
                    }
                    (KeyCode::Char('d'), Some(traveler)) => {
                        let page = pages.travelers;
                        self.spawn_task(origin, "Delete traveler", false, async move {
                            page.delete(&traveler.nic).await
                        });
                    }
                    (KeyCode::Char('t'), Some(traveler)) if pages.travelers.can_toggle_status() => {
                        let page = pages.travelers;
                        self.spawn_task(origin, "Change traveler status", false, async move {
                            page.set_active(&traveler.nic, !traveler.is_active).await
                        });
                    }
                    _ => {}
                }
            }
            Section::UserManagement => {
                let selected = pages.users.users().snapshot().get(row).cloned();
                match (code, selected) {
                    (KeyCode::Char('a'), _) => self.form = Some(FormModal::new_user()),
                    (KeyCode::Char('d'), Some(user)) if !UserPage::can_delete(&user) => {
                        self.state
                            .set_status("Administrator accounts cannot be deleted".to_string());
                    }
                    (KeyCode::Char('d'), Some(user)) => {
                        let page = pages.users;
                        self.spawn_task(origin, "Delete user", false, async move {
                            page.delete(&user.nic).await
                        });
                    }
                    _ => {}
                }
            }
            Section::TrainManagement => {
                let selected = pages.trains.trains().snapshot().get(row).cloned();
                match (code, selected) {
                    (KeyCode::Char('a'), _) => self.form = Some(FormModal::new_train()),
                    (KeyCode::Char('p'), Some(train)) => {
                        let page = pages.trains;
                        self.spawn_task(origin, "Change publication", false, async move {
                            page.set_published(&train.id, !train.is_published).await
                        });
                    }
                    (KeyCode::Char('s'), Some(train)) => {
                        self.form = Some(FormModal::new_schedule(train.id.clone(), &train.name));
                    }
                    (KeyCode::Enter, Some(train)) => {
                        if self.state.expanded_train.as_deref() == Some(train.id.as_str()) {
                            self.state.expanded_train = None;
                            return;
                        }
                        self.state.expanded_train = Some(train.id.clone());
                        self.state.schedule_row = 0;
                        let page = pages.trains;
                        self.spawn_task(origin, "Load schedules", false, async move {
                            page.load_schedules(&train.id).await
                        });
                    }
                    _ => {}
                }
            }
        }
    }

    fn row_count(&self) -> usize {
        let (Some(section), Some(pages)) = (self.current_section(), self.pages.as_ref()) else {
            return 0;
        };
        match section {
            Section::MakeReservation => pages.reservation.schedules().len(),
            Section::CurrentReservations => pages.bookings.bookings().len(),
            Section::TravelerManagement => pages.travelers.travelers().len(),
            Section::UserManagement => pages.users.users().len(),
            Section::TrainManagement => pages.trains.trains().len(),
        }
    }

    fn draw(&mut self, frame: &mut Frame) {
        match self.screen {
            Screen::Login => self.draw_login(frame),
            Screen::Main => self.draw_main(frame),
        }
        if let Some(form) = &self.form {
            let height = (form.fields.len() as u16) * 3 + 3;
            let area = centered_rect(FORM_WIDTH, height, frame.size());
            frame.render_widget(Clear, area);
            self.render_form(frame, area, form);
        }
        if let Some(dialog) = self.dialogs.front() {
            self.render_dialog(frame, dialog);
        }
    }

    fn draw_login(&mut self, frame: &mut Frame) {
        let area = frame.size();
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(4),
                Constraint::Min(10),
                Constraint::Length(3),
            ])
            .split(area);

        let banner = Paragraph::new(vec![
            Line::from(Span::styled(
                "DREAM TRAVELS",
                Style::default()
                    .fg(self.theme.accent)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                "Train reservation console",
                Style::default().fg(self.theme.muted),
            )),
        ])
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::BOTTOM));
        frame.render_widget(banner, layout[0]);

        let height = (self.login.fields.len() as u16) * 3 + 3;
        let form_area = centered_rect(LOGIN_WIDTH, height, layout[1]);
        self.render_form(frame, form_area, &self.login);

        let status = if self.busy.contains(&Origin::Login) {
            "Signing in...".to_string()
        } else {
            self.state.status.clone()
        };
        let footer = Paragraph::new(vec![Line::from(status)])
            .block(Block::default().borders(Borders::TOP))
            .alignment(Alignment::Center);
        frame.render_widget(footer, layout[2]);
    }

    fn draw_main(&mut self, frame: &mut Frame) {
        let area = frame.size();
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(6),
                Constraint::Length(4),
            ])
            .split(area);

        let role = self
            .session
            .as_ref()
            .map(|session| session.role().label())
            .unwrap_or("-");
        let header = Paragraph::new(Line::from(vec![
            Span::styled(
                "Dream Travels",
                Style::default()
                    .fg(self.theme.accent)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw("  |  "),
            Span::styled(format!("Signed in as {role}"), Style::default().fg(self.theme.muted)),
        ]))
        .block(Block::default().borders(Borders::ALL));
        frame.render_widget(header, layout[0]);

        let body = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(20)])
            .split(layout[1]);
        self.render_sidebar(frame, body[0]);
        self.render_section(frame, body[1]);
        self.render_status(frame, layout[2]);
    }

    fn border_style(&self, focused: bool) -> Style {
        if focused {
            Style::default().fg(self.theme.accent)
        } else {
            Style::default().fg(self.theme.muted)
        }
    }

    fn render_sidebar(&self, frame: &mut Frame, area: Rect) {
        let items: Vec<ListItem> = self
            .sections()
            .into_iter()
            .map(|section| ListItem::new(section.title()))
            .collect();
        let list = List::new(items)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title("Sections")
                    .border_style(self.border_style(self.state.focus == Focus::Sidebar)),
            )
            .highlight_style(
                Style::default()
                    .bg(self.theme.selection_bg)
                    .fg(self.theme.selection_fg)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("> ");
        let mut state = ListState::default();
        state.select(Some(self.state.section_cursor));
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn render_section(&mut self, frame: &mut Frame, area: Rect) {
        let (Some(section), Some(pages)) = (self.current_section(), self.pages.clone()) else {
            return;
        };
        self.state.row = self.state.row.min(self.row_count().saturating_sub(1));
        let focused = self.state.focus == Focus::Table;
        match section {
            Section::MakeReservation => {
                let travelers = pages.reservation.travelers().len();
                let rows = pages
                    .reservation
                    .schedules()
                    .snapshot()
                    .into_iter()
                    .map(|s| {
                        Row::new(vec![
                            s.train.name,
                            s.start_station,
                            s.stopping_station,
                            s.departure_time,
                            s.arrival_time,
                            s.available_count.to_string(),
                        ])
                    })
                    .collect();
                self.render_table(
                    frame,
                    area,
                    format!("Published schedules ({travelers} active travelers)"),
                    &["Train", "From", "To", "Departs", "Arrives", "Available"],
                    &[
                        Constraint::Percentage(22),
                        Constraint::Percentage(20),
                        Constraint::Percentage(20),
                        Constraint::Length(10),
                        Constraint::Length(10),
                        Constraint::Length(10),
                    ],
                    rows,
                    self.state.row,
                    focused,
                );
            }
            Section::CurrentReservations => {
                let now = Utc::now();
                let rows = pages
                    .bookings
                    .bookings()
                    .snapshot()
                    .into_iter()
                    .map(|b| {
                        let actions = if BookingsPage::can_modify(&b, &now) {
                            Cell::from("edit | cancel").style(Style::default().fg(self.theme.success))
                        } else {
                            Cell::from("locked").style(Style::default().fg(self.theme.muted))
                        };
                        let status_color = match b.status {
                            BookingStatus::Active => self.theme.primary_fg,
                            BookingStatus::Cancelled => self.theme.danger,
                        };
                        Row::new(vec![
                            Cell::from(b.booking_id.clone()),
                            Cell::from(b.schedule_id.clone()),
                            Cell::from(b.nic.clone()),
                            Cell::from(b.train_id.clone()),
                            Cell::from(b.seat_count.to_string()),
                            Cell::from(timefmt::format_date(&b.reservation_date)),
                            Cell::from(b.status.label()).style(Style::default().fg(status_color)),
                            actions,
                        ])
                    })
                    .collect();
                self.render_table(
                    frame,
                    area,
                    "Current reservations".to_string(),
                    &["Booking", "Schedule", "NIC", "Train", "Seats", "Date", "Status", "Actions"],
                    &[
                        Constraint::Length(16),
                        Constraint::Length(9),
                        Constraint::Length(13),
                        Constraint::Length(8),
                        Constraint::Length(6),
                        Constraint::Length(11),
                        Constraint::Length(10),
                        Constraint::Min(8),
                    ],
                    rows,
                    self.state.row,
                    focused,
                );
            }
            Section::TravelerManagement => {
                let rows = pages
                    .travelers
                    .travelers()
                    .snapshot()
                    .into_iter()
                    .map(|t| {
                        let (label, color) = if t.is_active {
                            ("Active", self.theme.success)
                        } else {
                            ("Inactive", self.theme.warning)
                        };
                        Row::new(vec![
                            Cell::from(t.nic.clone()),
                            Cell::from(t.name.clone()),
                            Cell::from(t.email.clone()),
                            Cell::from(timefmt::format_birth_date(&t.date_of_birth)),
                            Cell::from(label).style(Style::default().fg(color)),
                        ])
                    })
                    .collect();
                self.render_table(
                    frame,
                    area,
                    "Travelers".to_string(),
                    &["NIC", "Name", "Email", "Date of birth", "Status"],
                    &[
                        Constraint::Length(13),
                        Constraint::Percentage(25),
                        Constraint::Percentage(30),
                        Constraint::Length(13),
                        Constraint::Length(9),
                    ],
                    rows,
                    self.state.row,
                    focused,
                );
            }
            Section::UserManagement => {
                let rows = pages
                    .users
                    .users()
                    .snapshot()
                    .into_iter()
                    .map(|u| Row::new(vec![u.nic.clone(), u.email.clone(), u.role.label().to_string()]))
                    .collect();
                self.render_table(
                    frame,
                    area,
                    "Users".to_string(),
                    &["NIC", "Email", "Role"],
                    &[
                        Constraint::Length(13),
                        Constraint::Percentage(50),
                        Constraint::Min(14),
                    ],
                    rows,
                    self.state.row,
                    focused,
                );
            }
            Section::TrainManagement => self.render_trains(frame, area, &pages),
        }
    }

    fn render_trains(&mut self, frame: &mut Frame, area: Rect, pages: &Pages) {
        let expanded = self.state.expanded_train.clone();
        let (trains_area, schedules_area) = match expanded {
            Some(_) => {
                let split = Layout::default()
                    .direction(Direction::Vertical)
                    .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
                    .split(area);
                (split[0], Some(split[1]))
            }
            None => (area, None),
        };

        let rows = pages
            .trains
            .trains()
            .snapshot()
            .into_iter()
            .map(|t| {
                let marker = if expanded.as_deref() == Some(t.id.as_str()) { "v" } else { ">" };
                let (label, color) = if t.is_published {
                    ("Published", self.theme.success)
                } else {
                    ("Draft", self.theme.warning)
                };
                Row::new(vec![
                    Cell::from(marker),
                    Cell::from(t.id.clone()),
                    Cell::from(t.name.clone()),
                    Cell::from(label).style(Style::default().fg(color)),
                ])
            })
            .collect();
        self.render_table(
            frame,
            trains_area,
            "Trains".to_string(),
            &["", "ID", "Name", "Status"],
            &[
                Constraint::Length(2),
                Constraint::Length(10),
                Constraint::Percentage(50),
                Constraint::Min(10),
            ],
            rows,
            self.state.row,
            self.state.focus == Focus::Table,
        );

        if let (Some(train_id), Some(area)) = (expanded, schedules_area) {
            let schedules = pages.trains.schedules_for(&train_id);
            self.state.schedule_row = self
                .state
                .schedule_row
                .min(schedules.len().saturating_sub(1));
            let rows = schedules
                .into_iter()
                .map(|s| {
                    Row::new(vec![
                        s.id.to_string(),
                        s.departure_time,
                        s.arrival_time,
                        s.start_station,
                        s.stopping_station,
                        format!("{}/{}", s.reservation_count, s.available_count),
                    ])
                })
                .collect();
            self.render_table(
                frame,
                area,
                format!("Schedules for {train_id}"),
                &["ID", "Departs", "Arrives", "From", "To", "Booked"],
                &[
                    Constraint::Length(6),
                    Constraint::Length(10),
                    Constraint::Length(10),
                    Constraint::Percentage(25),
                    Constraint::Percentage(25),
                    Constraint::Min(8),
                ],
                rows,
                self.state.schedule_row,
                self.state.focus == Focus::Schedules,
            );
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn render_table(
        &self,
        frame: &mut Frame,
        area: Rect,
        title: String,
        header: &[&'static str],
        widths: &[Constraint],
        rows: Vec<Row<'static>>,
        selected: usize,
        focused: bool,
    ) {
        let empty = rows.is_empty();
        let header_row = Row::new(header.to_vec()).style(
            Style::default()
                .fg(self.theme.accent)
                .add_modifier(Modifier::BOLD),
        );
        let table = Table::new(rows, widths.to_vec())
            .header(header_row)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(title)
                    .border_style(self.border_style(focused)),
            )
            .highlight_style(
                Style::default()
                    .bg(self.theme.selection_bg)
                    .fg(self.theme.selection_fg),
            )
            .highlight_symbol("> ");
        let mut state = TableState::default();
        if !empty {
            state.select(Some(selected));
        }
        frame.render_stateful_widget(table, area, &mut state);
    }

    fn render_form(&self, frame: &mut Frame, area: Rect, form: &FormModal) {
        let mut lines = Vec::new();
        let mut cursor = None;
        for (idx, field) in form.fields.iter().enumerate() {
            let focused = idx == form.focus;
            let label_style = if focused {
                Style::default()
                    .fg(self.theme.accent)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(self.theme.primary_fg)
            };
            lines.push(Line::from(Span::styled(field.label, label_style)));

            let value_style = if field.locked {
                Style::default().fg(self.theme.muted)
            } else {
                Style::default().fg(self.theme.primary_fg)
            };
            let marker = if focused { "> " } else { "  " };
            if focused && field.is_editable_text() {
                cursor = Some((lines.len() as u16, 2 + field.cursor as u16));
            }
            lines.push(Line::from(vec![
                Span::styled(marker, Style::default().fg(self.theme.accent)),
                Span::styled(field.display(), value_style),
            ]));

            let error = form.error_for(field.key).unwrap_or_default().to_string();
            lines.push(Line::from(Span::styled(
                error,
                Style::default().fg(self.theme.danger),
            )));
        }
        lines.push(Line::from(vec![
            Span::styled("Enter", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(" submit  "),
            Span::styled("Tab", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(" next field  "),
            Span::styled("Esc", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(" cancel"),
        ]));

        let paragraph = Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .title(form.title.clone())
                .border_style(Style::default().fg(self.theme.accent)),
        );
        frame.render_widget(paragraph, area);

        if let Some((row, col)) = cursor {
            let x = (area.x + 1 + col).min(area.x + area.width.saturating_sub(2));
            let y = (area.y + 1 + row).min(area.y + area.height.saturating_sub(2));
            frame.set_cursor(x, y);
        }
    }

    fn render_dialog(&self, frame: &mut Frame, dialog: &Dialog) {
        let (title, message, help, color) = match dialog {
            Dialog::Confirm { message, .. } => {
                ("Confirm", message.as_str(), "y yes  n no", self.theme.warning)
            }
            Dialog::Alert(message) => ("Notice", message.as_str(), "Enter OK", self.theme.accent),
        };
        let area = centered_rect(56, 7, frame.size());
        frame.render_widget(Clear, area);
        let paragraph = Paragraph::new(vec![
            Line::from(message.to_string()),
            Line::from(""),
            Line::from(Span::styled(help, Style::default().fg(self.theme.muted))),
        ])
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(title)
                .border_style(Style::default().fg(color)),
        )
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
    }

    fn render_status(&self, frame: &mut Frame, area: Rect) {
        let working = self
            .current_section()
            .map(|section| self.busy.contains(&Origin::Section(section)))
            .unwrap_or(false);
        let mut primary = self.state.status.clone();
        if working {
            primary.push_str("  (working...)");
        }
        let paragraph = Paragraph::new(vec![
            Line::from(primary),
            Line::from(Span::styled(self.help_text(), Style::default().fg(self.theme.muted))),
        ])
        .block(Block::default().borders(Borders::ALL).title("Status"))
        .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
    }

    fn help_text(&self) -> String {
        const GLOBAL: &str = "Tab focus  r reload  L log out  q quit";
        let keys = match (self.state.focus, self.current_section()) {
            (Focus::Sidebar, _) | (_, None) => "Up/Down section  Enter open",
            (Focus::Schedules, _) => "e edit schedule  Esc back",
            (Focus::Table, Some(Section::MakeReservation)) => "Enter reserve",
            (Focus::Table, Some(Section::CurrentReservations)) => "e edit  c cancel",
            (Focus::Table, Some(Section::TravelerManagement)) => {
                let staff = self
                    .pages
                    .as_ref()
                    .map(|pages| pages.travelers.can_toggle_status())
                    .unwrap_or(false);
                if staff {
                    "a add  e edit  d delete  t activate/deactivate"
                } else {
                    "a add  e edit  d delete"
                }
            }
            (Focus::Table, Some(Section::UserManagement)) => "a add  d delete",
            (Focus::Table, Some(Section::TrainManagement)) => {
                "a add  p publish/unpublish  Enter schedules  s add schedule"
            }
        };
        format!("{keys}  |  {}", GLOBAL)
    }
}

enum FormAction {
    None,
    Submit,
    Cancel,
}

fn edit_form(form: &mut FormModal, key: KeyEvent) -> FormAction {
    match key.code {
        KeyCode::Esc => return FormAction::Cancel,
        KeyCode::Enter => return FormAction::Submit,
        KeyCode::Tab | KeyCode::Down => form.focus_next(1),
        KeyCode::BackTab | KeyCode::Up => form.focus_next(-1),
        KeyCode::Left => form.left(),
        KeyCode::Right => form.right(),
        KeyCode::Home => form.home(),
        KeyCode::End => form.end(),
        KeyCode::Backspace => form.backspace(),
        KeyCode::Delete => form.delete(),
        KeyCode::Char(ch) => {
            if key.modifiers.is_empty() || key.modifiers == KeyModifiers::SHIFT {
                form.insert(ch);
            }
        }
        _ => {}
    }
    FormAction::None
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode().context("failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("failed to leave alternate screen")?;
    terminal.show_cursor()?;
    Ok(())
}

fn spawn_input_thread(sender: mpsc::Sender<AppEvent>) {
    thread::spawn(move || loop {
        match event::poll(TICK_RATE) {
            Ok(true) => match event::read() {
                Ok(evt) => {
                    if sender.blocking_send(AppEvent::Input(evt)).is_err() {
                        break;
                    }
                }
                Err(_) => break,
            },
            Ok(false) => {
                if sender.blocking_send(AppEvent::Tick).is_err() {
                    break;
                }
            }
            Err(_) => break,
        }
    });
}

struct UiState {
    status: String,
    should_quit: bool,
    section_cursor: usize,
    focus: Focus,
    row: usize,
    schedule_row: usize,
    expanded_train: Option<String>,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            status: "Enter your NIC and password".to_string(),
            should_quit: false,
            section_cursor: 0,
            focus: Focus::Sidebar,
            row: 0,
            schedule_row: 0,
            expanded_train: None,
        }
    }
}

impl UiState {
    fn set_status(&mut self, message: String) {
        self.status = message;
    }
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}

use std::{future::Future, io, sync::Arc, thread, time::Duration};

use anyhow::{Context, Result};
use chrono::Local;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use leaguedesk_core::{
    guard::{AuthGuard, GuardDecision},
    leagues::{self, LeagueQuery},
    models::{League, LeagueDraft, LeagueStatus, Role},
    routes::Route,
    session::{ActionOutcome, LeagueState, Notice, NoticeLevel, Session, SessionStore},
    validation::FormSchema,
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{
        block::{Position, Title},
        Block, Borders, Clear, Paragraph, Row, Table, TableState, Wrap,
    },
    Frame, Terminal,
};
use tokio::{spawn, sync::mpsc};
use tracing::{debug, error, info};

use crate::form::{FieldValue, FormAction, FormState};

const TICK_RATE: Duration = Duration::from_millis(250);
const NOTICE_TICKS: u16 = 16;
const MAX_PATH_LEN: usize = 48;

#[derive(Debug, Clone)]
struct Theme {
    primary_fg: Color,
    accent: Color,
    muted: Color,
    selection_bg: Color,
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
            success: Color::Green,
            warning: Color::Yellow,
            danger: Color::Red,
        }
    }
}

impl Theme {
    fn status_color(&self, status: LeagueStatus) -> Color {
        match status {
            LeagueStatus::Active => self.success,
            LeagueStatus::Ongoing => self.accent,
            LeagueStatus::Complete => self.muted,
            LeagueStatus::Draft => self.warning,
        }
    }

    fn notice_color(&self, level: NoticeLevel) -> Color {
        match level {
            NoticeLevel::Success => self.success,
            NoticeLevel::Info => self.accent,
            NoticeLevel::Error => self.danger,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Normal,
    Filter,
    GoTo,
}

/// What the OTP screen is verifying.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OtpPurpose {
    PasswordReset,
    Account,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum LeagueView {
    List,
    Detail(String),
    Create,
    Edit(String),
    ConfirmDelete(String),
}

/// Completion of a store action run on a background task.
#[derive(Debug)]
enum ActionDone {
    Login,
    Register(ActionOutcome),
    VerifyOtp(ActionOutcome),
    ResendOtp,
    ForgotPassword(String),
    VerifyResetOtp(ActionOutcome),
    ResetPassword,
    LeaguesLoaded,
    LeagueLoaded,
    LeagueCreated,
    LeagueUpdated(String),
    LeagueDeleted,
}

enum AppEvent {
    Input(Event),
    Tick,
    ActionFinished(ActionDone),
}

/// Terminal frontend over a [`SessionStore`].
pub struct LeaguedeskApp {
    store: SessionStore,
    route: Route,
    pending_route: Option<Route>,
    return_to: Option<Route>,
    flow_email: String,
    otp_purpose: OtpPurpose,
    form: FormState,
    league_view: LeagueView,
    league_form: Option<FormState>,
    query: LeagueQuery,
    state: UiState,
    event_tx: Option<mpsc::Sender<AppEvent>>,
    notice_rx: Option<mpsc::Receiver<Notice>>,
    theme: Theme,
}

impl LeaguedeskApp {
    pub fn new(store: SessionStore) -> Self {
        Self {
            store,
            route: Route::Login,
            pending_route: None,
            return_to: None,
            flow_email: String::new(),
            otp_purpose: OtpPurpose::PasswordReset,
            form: FormState::login(),
            league_view: LeagueView::List,
            league_form: None,
            query: LeagueQuery::default(),
            state: UiState::default(),
            event_tx: None,
            notice_rx: None,
            theme: Theme::default(),
        }
    }

    pub fn attach_notices(&mut self, receiver: mpsc::Receiver<Notice>) {
        self.notice_rx = Some(receiver);
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

        self.navigate(Route::Dashboard);
        if self.store.is_authenticated() {
            self.state
                .set_status(format!("Session restored · {}", Local::now().format("%H:%M")));
        }

        let mut notice_rx = self.notice_rx.take();

        loop {
            terminal.draw(|frame| self.draw(frame))?;
            if self.state.should_quit {
                break;
            }

            if let Some(rx) = notice_rx.as_mut() {
                let mut notices_closed = false;
                tokio::select! {
                    maybe_event = event_rx.recv() => {
                        if !self.process_app_event(maybe_event) {
                            break;
                        }
                    }
                    maybe_notice = rx.recv() => {
                        match maybe_notice {
                            Some(notice) => self.state.show_notice(notice),
                            None => notices_closed = true,
                        }
                    }
                }
                if notices_closed {
                    notice_rx = None;
                }
            } else {
                let maybe_event = event_rx.recv().await;
                if !self.process_app_event(maybe_event) {
                    break;
                }
            }

            if self.state.should_quit {
                break;
            }
        }

        restore_terminal(&mut terminal)?;
        self.event_tx = None;
        Ok(())
    }

    fn process_app_event(&mut self, maybe_event: Option<AppEvent>) -> bool {
        match maybe_event {
            Some(AppEvent::Input(event)) => {
                if let Err(err) = self.handle_input(event) {
                    error!(?err, "Input handling failed");
                    self.state.set_status(format!("Error: {err}"));
                }
                true
            }
            Some(AppEvent::Tick) => {
                self.handle_tick();
                true
            }
            Some(AppEvent::ActionFinished(done)) => {
                self.handle_action_finished(done);
                true
            }
            None => false,
        }
    }

    fn handle_tick(&mut self) {
        self.state.age_notice();
        let session = self.store.session();
        if session.is_loading {
            return;
        }
        if let Some(route) = self.pending_route.take() {
            self.navigate(route);
        } else if self.route.is_protected() && !session.is_authenticated {
            self.navigate(self.route);
        }
    }

    /// Ask the guard before showing `requested`.
    fn navigate(&mut self, requested: Route) {
        let decision = AuthGuard::evaluate(&self.store.session(), requested);
        debug!(?decision, "Guard decision");
        match decision {
            GuardDecision::Loading => {
                self.pending_route = Some(requested);
            }
            GuardDecision::Allow(route) => self.enter(route),
            GuardDecision::Redirect { to, from } => {
                self.return_to = Some(from);
                self.enter(to);
            }
        }
    }

    fn enter(&mut self, route: Route) {
        if route != self.route {
            info!(from = %self.route, to = %route, "Navigate");
        }
        self.route = route;
        self.pending_route = None;
        self.state.mode = Mode::Normal;
        match route {
            Route::Login => {
                self.store.clear_error();
                self.form = FormState::login();
                self.form.set("email", &self.flow_email);
            }
            Route::Signup => {
                self.store.clear_error();
                self.form = FormState::signup();
            }
            Route::ForgotPassword => {
                self.store.clear_error();
                self.form = FormState::forgot_password();
                self.form.set("email", &self.flow_email);
            }
            Route::OtpVerification => {
                if self.flow_email.is_empty() {
                    self.state
                        .set_status("Request a reset code first".to_string());
                    self.enter(Route::ForgotPassword);
                    return;
                }
                self.store.clear_error();
                self.form = FormState::otp();
            }
            Route::ResetPassword => {
                if self.flow_email.is_empty() {
                    self.state
                        .set_status("Request a reset code first".to_string());
                    self.enter(Route::ForgotPassword);
                    return;
                }
                self.store.clear_error();
                self.form = FormState::reset_password();
            }
            Route::Dashboard => self.load_leagues(),
            Route::Leagues => {
                self.league_view = LeagueView::List;
                self.league_form = None;
                self.store.clear_league_error();
                self.load_leagues();
            }
            Route::Competitions
            | Route::Teams
            | Route::Players
            | Route::Clubs
            | Route::Grades
            | Route::Fixtures
            | Route::NotFound => {}
        }
    }

    fn spawn_action<F, Fut>(&self, action: F)
    where
        F: FnOnce(SessionStore) -> Fut,
        Fut: Future<Output = ActionDone> + Send + 'static,
    {
        let Some(sender) = self.event_tx.clone() else {
            return;
        };
        let task = action(self.store.clone());
        spawn(async move {
            let done = task.await;
            let _ = sender.send(AppEvent::ActionFinished(done)).await;
        });
    }

    fn load_leagues(&self) {
        self.spawn_action(|store| async move {
            store.get_all_leagues().await;
            ActionDone::LeaguesLoaded
        });
    }

    fn handle_action_finished(&mut self, done: ActionDone) {
        debug!(?done, "Action finished");
        let session = self.store.session();
        match done {
            ActionDone::Login => {
                if session.is_authenticated {
                    let landing = GuardDecision::landing_after_login(self.return_to.take());
                    self.navigate(landing);
                }
            }
            ActionDone::Register(outcome) => {
                if outcome.success && self.route == Route::Signup {
                    self.flow_email = self.form.value("email").trim().to_string();
                    self.navigate(Route::Login);
                }
            }
            ActionDone::VerifyOtp(outcome) => {
                if outcome.success {
                    self.navigate(Route::Dashboard);
                }
            }
            ActionDone::ResendOtp => {}
            ActionDone::ForgotPassword(email) => {
                if session.error.is_none() && self.route == Route::ForgotPassword {
                    self.flow_email = email;
                    self.otp_purpose = OtpPurpose::PasswordReset;
                    self.navigate(Route::OtpVerification);
                }
            }
            ActionDone::VerifyResetOtp(outcome) => {
                if outcome.success && self.route == Route::OtpVerification {
                    self.navigate(Route::ResetPassword);
                }
            }
            ActionDone::ResetPassword => {
                if session.error.is_none() && self.route == Route::ResetPassword {
                    self.navigate(Route::Login);
                }
            }
            ActionDone::LeaguesLoaded | ActionDone::LeagueLoaded => {
                let total = self.visible_leagues().len();
                self.state.clamp_cursor(total);
            }
            ActionDone::LeagueCreated => {
                if self.store.leagues().league_error.is_none() {
                    self.league_form = None;
                    self.league_view = LeagueView::List;
                    self.state.cursor = 0;
                }
            }
            ActionDone::LeagueUpdated(id) => {
                if self.store.leagues().league_error.is_none() {
                    self.league_form = None;
                    self.league_view = LeagueView::Detail(id);
                }
            }
            ActionDone::LeagueDeleted => {
                self.league_view = LeagueView::List;
                let total = self.visible_leagues().len();
                self.state.clamp_cursor(total);
            }
        }
    }

    fn handle_input(&mut self, event: Event) -> Result<()> {
        let Event::Key(key) = event else {
            return Ok(());
        };
        if self.handle_global_shortcut(&key)? {
            return Ok(());
        }
        if self.state.mode == Mode::GoTo {
            return self.handle_goto_key(key);
        }
        match self.route {
            Route::Login
            | Route::Signup
            | Route::ForgotPassword
            | Route::OtpVerification
            | Route::ResetPassword => self.handle_auth_key(key),
            Route::Dashboard => self.handle_dashboard_key(key),
            Route::Leagues => self.handle_leagues_key(key),
            Route::Competitions
            | Route::Teams
            | Route::Players
            | Route::Clubs
            | Route::Grades
            | Route::Fixtures => self.handle_entity_key(key),
            Route::NotFound => self.handle_not_found_key(key),
        }
    }

    fn handle_global_shortcut(&mut self, key: &KeyEvent) -> Result<bool> {
        if key.modifiers != KeyModifiers::CONTROL {
            return Ok(false);
        }
        match key.code {
            KeyCode::Char('c') | KeyCode::Char('q') => {
                self.state.should_quit = true;
            }
            KeyCode::Char('o') => {
                self.state.mode = Mode::GoTo;
                self.state.goto_input = self.route.path().to_string();
            }
            KeyCode::Char('l') if self.store.is_authenticated() => {
                self.store.logout();
                self.return_to = None;
                self.league_form = None;
                self.navigate(Route::Login);
            }
            _ => return Ok(false),
        }
        Ok(true)
    }

    fn handle_goto_key(&mut self, key: KeyEvent) -> Result<()> {
        match key.code {
            KeyCode::Esc => self.state.mode = Mode::Normal,
            KeyCode::Enter => {
                self.state.mode = Mode::Normal;
                let route = Route::parse(&self.state.goto_input);
                if route == Route::OtpVerification {
                    self.otp_purpose = OtpPurpose::PasswordReset;
                }
                self.navigate(route);
            }
            KeyCode::Backspace => {
                self.state.goto_input.pop();
            }
            KeyCode::Char(ch) => {
                if self.state.goto_input.len() < MAX_PATH_LEN && !ch.is_whitespace() {
                    self.state.goto_input.push(ch);
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn handle_auth_key(&mut self, key: KeyEvent) -> Result<()> {
        if key.modifiers == KeyModifiers::CONTROL {
            match (self.route, key.code) {
                (Route::Login, KeyCode::Char('n')) => self.navigate(Route::Signup),
                (Route::Login, KeyCode::Char('f')) => self.navigate(Route::ForgotPassword),
                (Route::OtpVerification, KeyCode::Char('r')) => self.resend_code(),
                _ => {}
            }
            if key.code != KeyCode::Char('s') {
                return Ok(());
            }
        }
        match self.form.handle_key(key) {
            FormAction::Submit => self.submit_auth_form(),
            FormAction::Cancel => match self.route {
                Route::Login => {}
                Route::OtpVerification if self.otp_purpose == OtpPurpose::Account => {
                    self.navigate(Route::Dashboard)
                }
                _ => self.navigate(Route::Login),
            },
            FormAction::Edited | FormAction::Ignored => {}
        }
        Ok(())
    }

    fn resend_code(&mut self) {
        let email = self.flow_email.clone();
        self.spawn_action(|store| async move {
            store.resend_otp(&email).await;
            ActionDone::ResendOtp
        });
    }

    fn submit_auth_form(&mut self) {
        match self.route {
            Route::Login => {
                let form = self.form.to_login();
                if let Err(errors) = form.check() {
                    return self.form.reject(errors);
                }
                self.flow_email = form.email.clone();
                self.spawn_action(|store| async move {
                    store.login(&form.email, &form.password).await;
                    ActionDone::Login
                });
            }
            Route::Signup => {
                let form = self.form.to_signup();
                if let Err(errors) = form.check() {
                    return self.form.reject(errors);
                }
                let request = form.to_request();
                self.spawn_action(|store| async move {
                    ActionDone::Register(store.register(&request).await)
                });
            }
            Route::ForgotPassword => {
                let form = self.form.to_forgot_password();
                if let Err(errors) = form.check() {
                    return self.form.reject(errors);
                }
                self.spawn_action(|store| async move {
                    store.forgot_password(&form.email).await;
                    ActionDone::ForgotPassword(form.email)
                });
            }
            Route::OtpVerification => {
                let form = self.form.to_otp();
                if let Err(errors) = form.check() {
                    return self.form.reject(errors);
                }
                let email = self.flow_email.clone();
                match self.otp_purpose {
                    OtpPurpose::PasswordReset => self.spawn_action(|store| async move {
                        ActionDone::VerifyResetOtp(store.verify_reset_otp(&email, &form.otp).await)
                    }),
                    OtpPurpose::Account => self.spawn_action(|store| async move {
                        ActionDone::VerifyOtp(store.verify_otp(&email, &form.otp).await)
                    }),
                }
            }
            Route::ResetPassword => {
                let form = self.form.to_reset_password();
                if let Err(errors) = form.check() {
                    return self.form.reject(errors);
                }
                let email = self.flow_email.clone();
                self.spawn_action(|store| async move {
                    store.reset_password(&email, &form.password).await;
                    ActionDone::ResetPassword
                });
            }
            _ => {}
        }
    }

    fn handle_dashboard_key(&mut self, key: KeyEvent) -> Result<()> {
        match key.code {
            KeyCode::Char('q') => self.state.should_quit = true,
            KeyCode::Char('l') | KeyCode::Enter => self.navigate(Route::Leagues),
            KeyCode::Char('r') => self.load_leagues(),
            KeyCode::Char('v') => {
                let session = self.store.session();
                match session.user {
                    Some(user) if !user.is_verified => {
                        self.flow_email = user.email;
                        self.otp_purpose = OtpPurpose::Account;
                        self.resend_code();
                        self.navigate(Route::OtpVerification);
                    }
                    Some(_) => self.state.set_status("Email already verified".to_string()),
                    None => {}
                }
            }
            KeyCode::Char(c) => {
                if let Some(route) = entity_shortcut(c) {
                    self.navigate(route);
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn handle_entity_key(&mut self, key: KeyEvent) -> Result<()> {
        match key.code {
            KeyCode::Char('q') => self.state.should_quit = true,
            KeyCode::Char('b') | KeyCode::Esc => self.navigate(Route::Dashboard),
            KeyCode::Char('l') => self.navigate(Route::Leagues),
            _ => {}
        }
        Ok(())
    }

    fn handle_not_found_key(&mut self, key: KeyEvent) -> Result<()> {
        match key.code {
            KeyCode::Char('q') => self.state.should_quit = true,
            KeyCode::Enter | KeyCode::Esc => self.navigate(Route::Dashboard),
            _ => {}
        }
        Ok(())
    }

    /// Unfiltered rows: the cache, or the built-in samples while it is empty.
    fn league_source(&self) -> Vec<Arc<League>> {
        let cache = self.store.leagues();
        if cache.leagues.is_empty() && !cache.is_league_loading {
            leagues::sample_leagues()
        } else {
            cache.leagues
        }
    }

    fn visible_leagues(&self) -> Vec<Arc<League>> {
        self.query.apply(&self.league_source())
    }

    fn showing_samples(&self) -> bool {
        let cache = self.store.leagues();
        cache.leagues.is_empty() && !cache.is_league_loading
    }

    fn selected_league(&self) -> Option<Arc<League>> {
        self.visible_leagues().get(self.state.cursor).cloned()
    }

    fn handle_leagues_key(&mut self, key: KeyEvent) -> Result<()> {
        if let Some(form) = self.league_form.as_mut() {
            match form.handle_key(key) {
                FormAction::Submit => self.submit_league_form(),
                FormAction::Cancel => {
                    self.league_form = None;
                    self.store.clear_league_error();
                    self.league_view = match &self.league_view {
                        LeagueView::Edit(id) => LeagueView::Detail(id.clone()),
                        _ => LeagueView::List,
                    };
                }
                FormAction::Edited | FormAction::Ignored => {}
            }
            return Ok(());
        }

        match self.league_view.clone() {
            LeagueView::List => match self.state.mode {
                Mode::Filter => self.handle_filter_key(key),
                _ => self.handle_league_list_key(key),
            },
            LeagueView::Detail(id) => {
                match key.code {
                    KeyCode::Esc | KeyCode::Char('b') => self.league_view = LeagueView::List,
                    KeyCode::Char('e') => self.open_editor(Some(id)),
                    KeyCode::Char('d') => self.confirm_delete(id),
                    _ => {}
                }
                Ok(())
            }
            LeagueView::ConfirmDelete(id) => {
                match key.code {
                    KeyCode::Char('y') | KeyCode::Char('Y') => {
                        self.league_view = LeagueView::List;
                        self.spawn_action(|store| async move {
                            store.delete_league(&id).await;
                            ActionDone::LeagueDeleted
                        });
                    }
                    KeyCode::Char('n') | KeyCode::Esc => {
                        self.league_view = LeagueView::Detail(id);
                    }
                    _ => {}
                }
                Ok(())
            }
            LeagueView::Create | LeagueView::Edit(_) => {
                self.league_view = LeagueView::List;
                Ok(())
            }
        }
    }

    fn handle_league_list_key(&mut self, key: KeyEvent) -> Result<()> {
        let total = self.visible_leagues().len();
        match key.code {
            KeyCode::Char('q') => self.state.should_quit = true,
            KeyCode::Esc | KeyCode::Char('b') => self.navigate(Route::Dashboard),
            KeyCode::Char('j') | KeyCode::Down => self.state.move_cursor(1, total),
            KeyCode::Char('k') | KeyCode::Up => self.state.move_cursor(-1, total),
            KeyCode::Char('g') | KeyCode::Home => self.state.cursor = 0,
            KeyCode::Char('G') | KeyCode::End => self.state.cursor = total.saturating_sub(1),
            KeyCode::PageDown => self.state.move_cursor(self.state.page() as isize, total),
            KeyCode::PageUp => self.state.move_cursor(-(self.state.page() as isize), total),
            KeyCode::Char('/') => {
                self.state.mode = Mode::Filter;
                self.state.set_status("Type to search by name or ID".to_string());
            }
            KeyCode::Char('c') => {
                let options = leagues::distinct_countries(&self.league_source());
                self.query.country = leagues::cycle_option(self.query.country.as_deref(), &options);
                self.state.cursor = 0;
            }
            KeyCode::Char('s') => {
                let options = leagues::distinct_seasons(&self.league_source());
                self.query.season = leagues::cycle_option(self.query.season.as_deref(), &options);
                self.state.cursor = 0;
            }
            KeyCode::Char('o') => {
                self.query.sort = self.query.sort.next();
                self.state
                    .set_status(format!("Sorted by {}", self.query.sort.label()));
            }
            KeyCode::Char('x') => {
                self.query.reset_filters();
                self.state.cursor = 0;
                self.state.set_status("Filters cleared".to_string());
            }
            KeyCode::Char('r') => self.load_leagues(),
            KeyCode::Char('n') => self.open_editor(None),
            KeyCode::Enter => {
                if let Some(league) = self.selected_league() {
                    self.open_detail(&league);
                }
            }
            KeyCode::Char('e') => {
                if let Some(league) = self.selected_league() {
                    self.open_editor(Some(league.server_id.clone()));
                }
            }
            KeyCode::Char('d') => {
                if let Some(league) = self.selected_league() {
                    self.confirm_delete(league.server_id.clone());
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn handle_filter_key(&mut self, key: KeyEvent) -> Result<()> {
        match key.code {
            KeyCode::Esc => {
                self.query.search.clear();
                self.state.mode = Mode::Normal;
                self.state.set_status("Search cleared".to_string());
            }
            KeyCode::Enter => {
                self.state.mode = Mode::Normal;
                self.state
                    .set_status(format!("Search: {}", self.query.search));
            }
            KeyCode::Backspace => {
                self.query.search.pop();
            }
            KeyCode::Char(c) => {
                if key.modifiers.is_empty() || key.modifiers == KeyModifiers::SHIFT {
                    self.query.search.push(c);
                }
            }
            _ => {}
        }
        self.state.cursor = 0;
        Ok(())
    }

    fn open_detail(&mut self, league: &League) {
        self.league_view = LeagueView::Detail(league.server_id.clone());
        if self.showing_samples() {
            return;
        }
        let id = league.server_id.clone();
        self.spawn_action(|store| async move {
            store.get_league(&id).await;
            ActionDone::LeagueLoaded
        });
    }

    fn open_editor(&mut self, server_id: Option<String>) {
        self.store.clear_league_error();
        match server_id {
            Some(id) => {
                if self.showing_samples() {
                    self.state
                        .set_status("Sample rows cannot be edited".to_string());
                    return;
                }
                let Some(league) = self.find_league(&id) else {
                    return;
                };
                self.league_form = Some(FormState::league(Some(&LeagueDraft::from(&*league))));
                self.league_view = LeagueView::Edit(id);
            }
            None => {
                self.league_form = Some(FormState::league(None));
                self.league_view = LeagueView::Create;
            }
        }
    }

    fn confirm_delete(&mut self, server_id: String) {
        if self.showing_samples() {
            self.state
                .set_status("Sample rows cannot be deleted".to_string());
            return;
        }
        self.league_view = LeagueView::ConfirmDelete(server_id);
    }

    fn find_league(&self, server_id: &str) -> Option<Arc<League>> {
        let cache = self.store.leagues();
        cache
            .current_league
            .clone()
            .filter(|league| league.server_id == server_id)
            .or_else(|| cache.find(server_id).cloned())
            .or_else(|| {
                leagues::sample_leagues()
                    .into_iter()
                    .find(|league| league.server_id == server_id)
            })
    }

    fn submit_league_form(&mut self) {
        let Some(form) = self.league_form.as_mut() else {
            return;
        };
        let draft = match form.to_league().to_draft() {
            Ok(draft) => draft,
            Err(errors) => return form.reject(errors),
        };
        match self.league_view.clone() {
            LeagueView::Edit(id) => self.spawn_action(|store| async move {
                store.update_league(&id, &draft).await;
                ActionDone::LeagueUpdated(id)
            }),
            _ => self.spawn_action(|store| async move {
                store.create_league(&draft).await;
                ActionDone::LeagueCreated
            }),
        }
    }

    fn draw(&mut self, frame: &mut Frame) {
        let area = frame.size();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(8),
                Constraint::Length(4),
            ])
            .split(area);

        let session = self.store.session();
        self.render_header(frame, chunks[0], &session);
        if self.pending_route.is_some() {
            self.render_checking(frame, chunks[1]);
        } else {
            match self.route {
                Route::Login
                | Route::Signup
                | Route::ForgotPassword
                | Route::OtpVerification
                | Route::ResetPassword => self.draw_auth(frame, chunks[1], &session),
                Route::Dashboard => self.draw_dashboard(frame, chunks[1], &session),
                Route::Leagues => self.draw_leagues(frame, chunks[1]),
                Route::Competitions
                | Route::Teams
                | Route::Players
                | Route::Clubs
                | Route::Grades
                | Route::Fixtures => self.draw_entity_placeholder(frame, chunks[1]),
                Route::NotFound => self.draw_not_found(frame, chunks[1]),
            }
        }
        self.render_status(frame, chunks[2]);
        if self.state.mode == Mode::GoTo {
            self.render_goto_prompt(frame);
        }
    }

    fn render_header(&self, frame: &mut Frame, area: Rect, session: &Session) {
        let mut spans = vec![
            Span::styled(
                "Leaguedesk",
                Style::default()
                    .fg(self.theme.accent)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(" · ", Style::default().fg(self.theme.muted)),
            Span::raw(self.route.title()),
        ];
        if let Some(user) = session.user.as_ref().filter(|_| session.is_authenticated) {
            spans.push(Span::styled(" · ", Style::default().fg(self.theme.muted)));
            let role = match user.role {
                Role::Admin => "admin",
                Role::User => "user",
            };
            spans.push(Span::styled(
                format!("{} ({role})", user.display_name()),
                Style::default().fg(self.theme.primary_fg),
            ));
        }
        let header = Paragraph::new(Line::from(spans))
            .block(Block::default().borders(Borders::ALL).title(self.route.path()));
        frame.render_widget(header, area);
    }

    fn render_checking(&self, frame: &mut Frame, area: Rect) {
        let paragraph = Paragraph::new("Checking session…")
            .alignment(Alignment::Center)
            .style(Style::default().fg(self.theme.muted));
        frame.render_widget(paragraph, centered_rect(30, 1, area));
    }

    fn draw_auth(&self, frame: &mut Frame, area: Rect, session: &Session) {
        let mut lines = Vec::new();
        if self.route == Route::OtpVerification || self.route == Route::ResetPassword {
            lines.push(Line::from(Span::styled(
                format!("Account: {}", self.flow_email),
                Style::default().fg(self.theme.muted),
            )));
            lines.push(Line::from(""));
        }
        if let Some(error) = session.error.as_ref() {
            lines.push(Line::from(Span::styled(
                error.clone(),
                Style::default()
                    .fg(self.theme.danger)
                    .add_modifier(Modifier::BOLD),
            )));
            lines.push(Line::from(""));
        }
        let cursor = self.push_form_lines(&mut lines, &self.form);
        lines.push(Line::from(""));
        if session.is_loading {
            lines.push(Line::from(Span::styled(
                "Working…",
                Style::default().fg(self.theme.warning),
            )));
        }
        lines.push(auth_hint(self.route, self.theme.muted));

        let height = (lines.len() as u16 + 2).min(area.height);
        let box_area = centered_rect(56, height, area);
        let paragraph = Paragraph::new(lines)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(self.route.title()),
            )
            .wrap(Wrap { trim: false });
        frame.render_widget(paragraph, box_area);
        if let Some((column, row)) = cursor {
            set_cursor_in(frame, box_area, column, row);
        }
    }

    /// Append label, value and error lines for every field. Returns the
    /// focused text cursor as `(column, row)` within the content area.
    fn push_form_lines(
        &self,
        lines: &mut Vec<Line<'static>>,
        form: &FormState,
    ) -> Option<(u16, u16)> {
        let mut cursor = None;
        for (index, field) in form.fields.iter().enumerate() {
            let focused = index == form.focus;
            let label_style = if focused {
                Style::default()
                    .fg(self.theme.accent)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(self.theme.muted)
            };
            lines.push(Line::from(Span::styled(field.label, label_style)));
            let marker = if focused { "▶ " } else { "  " };
            if focused {
                if let FieldValue::Text(input) = &field.value {
                    cursor = Some((2 + input.cursor() as u16, lines.len() as u16));
                }
            }
            lines.push(Line::from(vec![
                Span::styled(marker, Style::default().fg(self.theme.accent)),
                Span::raw(field.display()),
            ]));
            if let Some(error) = form.error(field.key) {
                lines.push(Line::from(Span::styled(
                    format!("  {error}"),
                    Style::default().fg(self.theme.danger),
                )));
            }
        }
        cursor
    }

    fn draw_dashboard(&self, frame: &mut Frame, area: Rect, session: &Session) {
        let cache = self.store.leagues();
        let mut lines = Vec::new();
        if let Some(user) = session.user.as_ref() {
            lines.push(Line::from(Span::styled(
                format!("Welcome back, {}", user.display_name()),
                Style::default()
                    .fg(self.theme.primary_fg)
                    .add_modifier(Modifier::BOLD),
            )));
            lines.push(Line::from(format!("Email: {}", user.email)));
            let verified = if user.is_verified {
                Span::styled("verified", Style::default().fg(self.theme.success))
            } else {
                Span::styled(
                    "not verified (press v)",
                    Style::default().fg(self.theme.warning),
                )
            };
            lines.push(Line::from(vec![Span::raw("Status: "), verified]));
            lines.push(Line::from(""));
        }

        if cache.is_league_loading {
            lines.push(Line::from(Span::styled(
                "Loading leagues…",
                Style::default().fg(self.theme.muted),
            )));
        } else {
            lines.push(Line::from(format!("Leagues: {}", cache.leagues.len())));
            for status in LeagueStatus::ALL {
                let count = cache
                    .leagues
                    .iter()
                    .filter(|league| league.status == status)
                    .count();
                lines.push(Line::from(vec![
                    Span::raw("  "),
                    Span::styled(
                        format!("{:<9}", status.label()),
                        Style::default().fg(self.theme.status_color(status)),
                    ),
                    Span::raw(count.to_string()),
                ]));
            }
        }
        if let Some(error) = cache.league_error.as_ref() {
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                error.clone(),
                Style::default().fg(self.theme.danger),
            )));
        }

        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "Manage",
            Style::default().add_modifier(Modifier::BOLD),
        )));
        for (key, route) in ENTITY_SHORTCUTS {
            lines.push(Line::from(vec![
                Span::styled(format!("  {key} "), Style::default().fg(self.theme.accent)),
                Span::raw(route.title()),
            ]));
        }

        let paragraph = Paragraph::new(lines)
            .block(Block::default().borders(Borders::ALL).title("Overview"))
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
    }

    fn draw_leagues(&mut self, frame: &mut Frame, area: Rect) {
        let cache = self.store.leagues();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(5)])
            .split(area);

        self.render_filter_bar(frame, chunks[0]);
        match self.league_view.clone() {
            LeagueView::Detail(id) | LeagueView::ConfirmDelete(id) => {
                self.render_league_detail(frame, chunks[1], &id, &cache);
            }
            LeagueView::List | LeagueView::Create | LeagueView::Edit(_) => {
                self.render_league_table(frame, chunks[1], &cache);
            }
        }
        if let LeagueView::ConfirmDelete(id) = &self.league_view {
            self.render_delete_confirm(frame, id);
        }
        if let Some(form) = self.league_form.as_ref() {
            self.render_league_form(frame, form, &cache);
        }
    }

    fn render_filter_bar(&self, frame: &mut Frame, area: Rect) {
        let search_style = if self.state.mode == Mode::Filter {
            Style::default().fg(self.theme.accent)
        } else {
            Style::default().fg(self.theme.primary_fg)
        };
        let line = Line::from(vec![
            Span::styled("Search: ", Style::default().fg(self.theme.muted)),
            Span::styled(format!("{:<16}", self.query.search), search_style),
            Span::styled("  Country: ", Style::default().fg(self.theme.muted)),
            Span::raw(self.query.country.clone().unwrap_or_else(|| "All".to_string())),
            Span::styled("  Season: ", Style::default().fg(self.theme.muted)),
            Span::raw(self.query.season.clone().unwrap_or_else(|| "All".to_string())),
            Span::styled("  Sort: ", Style::default().fg(self.theme.muted)),
            Span::raw(self.query.sort.label()),
        ]);
        let paragraph =
            Paragraph::new(line).block(Block::default().borders(Borders::ALL).title("Filters"));
        frame.render_widget(paragraph, area);
    }

    fn render_league_table(&mut self, frame: &mut Frame, area: Rect, cache: &LeagueState) {
        self.state.list_height = area.height.saturating_sub(3) as usize;
        let rows = self.visible_leagues();
        self.state.clamp_cursor(rows.len());
        let samples = self.showing_samples();

        let header = Row::new(["ID", "Name", "Country", "Season", "Comps", "Status"]).style(
            Style::default()
                .fg(self.theme.accent)
                .add_modifier(Modifier::BOLD),
        );
        let body: Vec<Row> = rows
            .iter()
            .map(|league| {
                Row::new(vec![
                    Span::raw(league.display_id().to_string()),
                    Span::raw(league.name.clone()),
                    Span::raw(league.country.clone()),
                    Span::raw(league.season.clone()),
                    Span::raw(league.competitions_count.to_string()),
                    Span::styled(
                        league.status.label(),
                        Style::default().fg(self.theme.status_color(league.status)),
                    ),
                ])
            })
            .collect();
        let widths = [
            Constraint::Length(10),
            Constraint::Min(20),
            Constraint::Length(14),
            Constraint::Length(8),
            Constraint::Length(6),
            Constraint::Length(9),
        ];

        let mut title = format!("Leagues ({})", rows.len());
        if cache.is_league_loading {
            title.push_str(" · loading…");
        } else if samples {
            title.push_str(" · sample data");
        }
        let mut block = Block::default().borders(Borders::ALL).title(title);
        if let Some(error) = cache.league_error.as_ref() {
            block = block.title(
                Title::from(Span::styled(
                    error.clone(),
                    Style::default().fg(self.theme.danger),
                ))
                .position(Position::Bottom),
            );
        }

        let table = Table::new(body, widths)
            .header(header)
            .block(block)
            .highlight_style(Style::default().bg(self.theme.selection_bg))
            .highlight_symbol("▶ ");
        let mut table_state = TableState::default();
        if !rows.is_empty() {
            table_state.select(Some(self.state.cursor));
        }
        frame.render_stateful_widget(table, area, &mut table_state);
    }

    fn render_league_detail(
        &self,
        frame: &mut Frame,
        area: Rect,
        id: &str,
        cache: &LeagueState,
    ) {
        let Some(league) = self.find_league(id) else {
            let text = if cache.is_league_loading {
                "Loading league…"
            } else {
                "League not found"
            };
            let paragraph = Paragraph::new(text)
                .block(Block::default().borders(Borders::ALL).title("League"));
            frame.render_widget(paragraph, area);
            return;
        };

        let label = |text: &'static str| Span::styled(text, Style::default().fg(self.theme.muted));
        let stamp = |value: Option<chrono::DateTime<chrono::Utc>>| {
            value
                .map(|at| at.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_else(|| "-".to_string())
        };
        let mut lines = vec![
            Line::from(Span::styled(
                league.name.clone(),
                Style::default()
                    .fg(self.theme.primary_fg)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from(vec![label("ID:           "), Span::raw(league.display_id().to_string())]),
            Line::from(vec![label("Country:      "), Span::raw(league.country.clone())]),
            Line::from(vec![label("Season:       "), Span::raw(league.season.clone())]),
            Line::from(vec![
                label("Competitions: "),
                Span::raw(league.competitions_count.to_string()),
            ]),
            Line::from(vec![
                label("Status:       "),
                Span::styled(
                    league.status.label(),
                    Style::default().fg(self.theme.status_color(league.status)),
                ),
            ]),
            Line::from(vec![label("Created by:   "), Span::raw(league.created_by.clone())]),
            Line::from(vec![label("Created:      "), Span::raw(stamp(league.created_at))]),
            Line::from(vec![label("Updated:      "), Span::raw(stamp(league.updated_at))]),
            Line::from(""),
        ];
        if let Some(description) = league.description.as_ref() {
            lines.push(Line::from(description.clone()));
        }
        if let Some(error) = cache.league_error.as_ref() {
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                error.clone(),
                Style::default().fg(self.theme.danger),
            )));
        }
        let paragraph = Paragraph::new(lines)
            .block(Block::default().borders(Borders::ALL).title("League"))
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
    }

    fn render_league_form(&self, frame: &mut Frame, form: &FormState, cache: &LeagueState) {
        let title = match self.league_view {
            LeagueView::Edit(_) => "Edit League",
            _ => "Create League",
        };
        let mut lines = Vec::new();
        if let Some(error) = cache.league_error.as_ref() {
            lines.push(Line::from(Span::styled(
                error.clone(),
                Style::default()
                    .fg(self.theme.danger)
                    .add_modifier(Modifier::BOLD),
            )));
        }
        let cursor = self.push_form_lines(&mut lines, form);
        if cache.is_league_loading {
            lines.push(Line::from(Span::styled(
                "Saving…",
                Style::default().fg(self.theme.warning),
            )));
        }
        lines.push(Line::from(Span::styled(
            "Tab next · ←/→ status · Enter on last field or Ctrl-S save · Esc cancel",
            Style::default().fg(self.theme.muted),
        )));

        let frame_area = frame.size();
        let height = (lines.len() as u16 + 2).min(frame_area.height);
        let area = centered_rect(64, height, frame_area);
        frame.render_widget(Clear, area);
        let paragraph = Paragraph::new(lines)
            .block(Block::default().borders(Borders::ALL).title(title))
            .wrap(Wrap { trim: false });
        frame.render_widget(paragraph, area);
        if let Some((column, row)) = cursor {
            set_cursor_in(frame, area, column, row);
        }
    }

    fn render_delete_confirm(&self, frame: &mut Frame, id: &str) {
        let name = self
            .find_league(id)
            .map(|league| league.name.clone())
            .unwrap_or_else(|| id.to_string());
        let area = centered_rect(48, 6, frame.size());
        frame.render_widget(Clear, area);
        let paragraph = Paragraph::new(vec![
            Line::from(format!("Delete {name}?")),
            Line::from(""),
            Line::from(vec![
                Span::styled("y", Style::default().add_modifier(Modifier::BOLD)),
                Span::raw(" delete  "),
                Span::styled("n", Style::default().add_modifier(Modifier::BOLD)),
                Span::raw(" cancel"),
            ]),
        ])
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Confirm")
                .border_style(Style::default().fg(self.theme.danger)),
        )
        .alignment(Alignment::Center);
        frame.render_widget(paragraph, area);
    }

    fn draw_not_found(&self, frame: &mut Frame, area: Rect) {
        let paragraph = Paragraph::new(vec![
            Line::from(Span::styled(
                "404",
                Style::default()
                    .fg(self.theme.accent)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from("Page not found"),
            Line::from(""),
            Line::from(Span::styled(
                "Enter go home · q quit",
                Style::default().fg(self.theme.muted),
            )),
        ])
        .alignment(Alignment::Center);
        frame.render_widget(paragraph, centered_rect(40, 4, area));
    }

    fn draw_entity_placeholder(&self, frame: &mut Frame, area: Rect) {
        let paragraph = Paragraph::new(vec![
            Line::from(Span::styled(
                self.route.title(),
                Style::default()
                    .fg(self.theme.accent)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from("Nothing to manage here yet"),
        ])
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(self.route.path()),
        );
        frame.render_widget(paragraph, centered_rect(50, 4, area));
    }

    fn render_goto_prompt(&self, frame: &mut Frame) {
        let area = centered_rect(50, 5, frame.size());
        frame.render_widget(Clear, area);
        let paragraph = Paragraph::new(vec![
            Line::from(vec![
                Span::styled("> ", Style::default().fg(self.theme.accent)),
                Span::raw(self.state.goto_input.clone()),
            ]),
            Line::from(""),
            Line::from(Span::styled(
                "Enter go · Esc cancel",
                Style::default().fg(self.theme.muted),
            )),
        ])
        .block(Block::default().borders(Borders::ALL).title("Go to"));
        frame.render_widget(paragraph, area);
        set_cursor_in(frame, area, 2 + self.state.goto_input.len() as u16, 0);
    }

    fn render_status(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::ALL).title("Status");
        let primary = match &self.state.notice {
            Some((notice, _)) => Line::from(Span::styled(
                notice.message.clone(),
                Style::default().fg(self.theme.notice_color(notice.level)),
            )),
            None => Line::from(self.state.status.clone()),
        };
        let hint = Line::from(Span::styled(
            self.key_hint(),
            Style::default().fg(self.theme.muted),
        ));
        let paragraph = Paragraph::new(vec![primary, hint])
            .block(block)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
    }

    fn key_hint(&self) -> &'static str {
        match self.route {
            Route::Dashboard => "l leagues · 1-6 manage · r refresh · v verify email · Ctrl-L logout · Ctrl-O go to · q quit",
            Route::Leagues => match self.league_view {
                LeagueView::List if self.state.mode == Mode::Filter => {
                    "type to search · Enter keep · Esc clear"
                }
                LeagueView::List => {
                    "Enter open · n new · e edit · d delete · / search · c country · s season · o sort · x clear · r refresh · b back"
                }
                LeagueView::Detail(_) => "e edit · d delete · Esc back",
                _ => "Ctrl-L logout · Ctrl-Q quit",
            },
            route if route.is_entity_placeholder() => {
                "b dashboard · l leagues · Ctrl-L logout · Ctrl-O go to · q quit"
            }
            _ => "Ctrl-O go to · Ctrl-Q quit",
        }
    }
}

const ENTITY_SHORTCUTS: [(char, Route); 6] = [
    ('1', Route::Competitions),
    ('2', Route::Teams),
    ('3', Route::Players),
    ('4', Route::Clubs),
    ('5', Route::Grades),
    ('6', Route::Fixtures),
];

fn entity_shortcut(key: char) -> Option<Route> {
    ENTITY_SHORTCUTS
        .iter()
        .find(|(shortcut, _)| *shortcut == key)
        .map(|(_, route)| *route)
}

fn auth_hint(route: Route, color: Color) -> Line<'static> {
    let text = match route {
        Route::Login => "Enter sign in · Ctrl-N create account · Ctrl-F forgot password",
        Route::Signup => "Enter create account · Esc back to login",
        Route::ForgotPassword => "Enter send code · Esc back to login",
        Route::OtpVerification => "Enter verify · Ctrl-R resend code · Esc back",
        Route::ResetPassword => "Enter reset password · Esc back to login",
        _ => "",
    };
    Line::from(Span::styled(text, Style::default().fg(color)))
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
    cursor: usize,
    list_height: usize,
    status: String,
    notice: Option<(Notice, u16)>,
    goto_input: String,
    mode: Mode,
    should_quit: bool,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            cursor: 0,
            list_height: 1,
            status: "Ready".to_string(),
            notice: None,
            goto_input: String::new(),
            mode: Mode::Normal,
            should_quit: false,
        }
    }
}

impl UiState {
    fn move_cursor(&mut self, delta: isize, total: usize) {
        if total == 0 {
            self.cursor = 0;
            return;
        }
        let max = total as isize - 1;
        self.cursor = (self.cursor as isize + delta).clamp(0, max) as usize;
    }

    fn clamp_cursor(&mut self, total: usize) {
        self.cursor = self.cursor.min(total.saturating_sub(1));
    }

    fn page(&self) -> usize {
        self.list_height.max(1)
    }

    fn set_status(&mut self, message: String) {
        self.status = message;
    }

    fn show_notice(&mut self, notice: Notice) {
        self.notice = Some((notice, NOTICE_TICKS));
    }

    fn age_notice(&mut self) {
        if let Some((_, remaining)) = self.notice.as_mut() {
            *remaining = remaining.saturating_sub(1);
            if *remaining == 0 {
                self.notice = None;
            }
        }
    }
}

fn set_cursor_in(frame: &mut Frame, area: Rect, column: u16, row: u16) {
    let x = (area.x + 1 + column).min(area.x + area.width.saturating_sub(2));
    let y = (area.y + 1 + row).min(area.y + area.height.saturating_sub(2));
    frame.set_cursor(x, y);
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}

#[cfg(test)]
mod tests {
    use super::*;
    use leaguedesk_core::api::{testing::ScriptedTransport, ApiClient};

    fn app() -> LeaguedeskApp {
        let api = ApiClient::new(Arc::new(ScriptedTransport::new()));
        LeaguedeskApp::new(SessionStore::new(api))
    }

    #[test]
    fn protected_route_redirects_and_remembers_origin() {
        let mut app = app();
        app.navigate(Route::Leagues);
        assert_eq!(app.route, Route::Login);
        assert_eq!(app.return_to, Some(Route::Leagues));

        app.navigate(Route::parse("/nowhere"));
        assert_eq!(app.route, Route::NotFound);
    }

    #[test]
    fn reset_screens_require_an_email() {
        let mut app = app();
        app.navigate(Route::ResetPassword);
        assert_eq!(app.route, Route::ForgotPassword);

        app.flow_email = "a@b.com".to_string();
        app.navigate(Route::OtpVerification);
        assert_eq!(app.route, Route::OtpVerification);
    }

    #[test]
    fn invalid_login_stays_local() {
        let mut app = app();
        app.enter(Route::Login);
        app.form.set("email", "bad");
        app.submit_auth_form();
        assert!(app.form.error("email").is_some());
        assert!(app.form.error("password").is_some());
        assert!(app.flow_email.is_empty());
    }

    #[test]
    fn empty_cache_shows_samples_filtered() {
        let mut app = app();
        assert!(app.showing_samples());
        assert_eq!(app.visible_leagues().len(), 2);
        app.query.search = "2023".to_string();
        let rows = app.visible_leagues();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, "02");
    }

    #[test]
    fn entity_pages_sit_behind_the_guard() {
        let mut app = app();
        app.navigate(Route::parse("/teams"));
        assert_eq!(app.route, Route::Login);
        assert_eq!(app.return_to, Some(Route::Teams));
        assert_eq!(entity_shortcut('6'), Some(Route::Fixtures));
        assert_eq!(entity_shortcut('l'), None);
    }

    #[test]
    fn filter_options_follow_sample_rows() -> Result<()> {
        let mut app = app();
        app.route = Route::Leagues;
        assert!(app.showing_samples());

        app.handle_leagues_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::NONE))?;
        assert_eq!(app.query.country.as_deref(), Some("England"));

        app.handle_leagues_key(KeyEvent::new(KeyCode::Char('s'), KeyModifiers::NONE))?;
        assert_eq!(app.query.season.as_deref(), Some("2024"));
        assert_eq!(app.visible_leagues().len(), 1);
        Ok(())
    }

    #[test]
    fn notices_expire_after_ticks() {
        let mut state = UiState::default();
        state.show_notice(Notice {
            level: NoticeLevel::Info,
            message: "Logged out".to_string(),
        });
        for _ in 0..NOTICE_TICKS - 1 {
            state.age_notice();
        }
        assert!(state.notice.is_some());
        state.age_notice();
        assert!(state.notice.is_none());
    }

    #[test]
    fn cursor_stays_in_bounds() {
        let mut state = UiState::default();
        state.move_cursor(5, 3);
        assert_eq!(state.cursor, 2);
        state.move_cursor(-9, 3);
        assert_eq!(state.cursor, 0);
        state.cursor = 7;
        state.clamp_cursor(0);
        assert_eq!(state.cursor, 0);
    }
}

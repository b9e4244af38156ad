//! Terminal front end: one `Shell` owning the current page's state, a
//! navigation epoch that invalidates in-flight responses, and a blocking
//! `Ui` loop that alternates between draining page events and polling keys.

use std::io::{self, Stdout};
use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tasktracker_core::{ProjectId, SessionStore, SessionToken, TaskTrackerApi};
use tokio::runtime::Handle;
use tokio::sync::mpsc;

mod events;
mod input;
pub mod pages;
mod render;

pub use events::{PageEvent, RoutedPageEvent};
pub use input::InputField;

use pages::dashboard::{self, DashboardIntent, DashboardState};
use pages::login::{self, LoginEvent, LoginIntent, LoginState};
use pages::project_detail::{self, ProjectDetailIntent, ProjectDetailState};
use pages::project_form::{self, ProjectFormEvent, ProjectFormIntent, ProjectFormState};
use pages::signup::{self, SignupEvent, SignupIntent, SignupState};

const PAGE_EVENT_CHANNEL_CAPACITY: usize = 64;

/// The mounted page. Each variant owns that page's entire view state;
/// navigating away drops it.
#[derive(Debug)]
pub enum Route {
    Home,
    Login(LoginState),
    Signup(SignupState),
    Dashboard(DashboardState),
    ProjectForm(ProjectFormState),
    ProjectDetail(ProjectDetailState),
}

pub struct Shell {
    api: Arc<dyn TaskTrackerApi>,
    session: Arc<dyn SessionStore>,
    runtime: Handle,
    events_tx: mpsc::Sender<RoutedPageEvent>,
    events_rx: mpsc::Receiver<RoutedPageEvent>,
    /// Bumped on every navigation; responses tagged with an older value are
    /// dropped unprocessed.
    epoch: u64,
    route: Route,
    should_quit: bool,
}

impl Shell {
    /// A held token lands the user on the dashboard, everyone else on the
    /// landing page. The token is not validated here; the first
    /// authenticated call decides.
    pub fn new(
        api: Arc<dyn TaskTrackerApi>,
        session: Arc<dyn SessionStore>,
        runtime: Handle,
    ) -> Self {
        let (events_tx, events_rx) = mpsc::channel(PAGE_EVENT_CHANNEL_CAPACITY);
        let mut shell = Self {
            api,
            session,
            runtime,
            events_tx,
            events_rx,
            epoch: 0,
            route: Route::Home,
            should_quit: false,
        };
        if shell.stored_token().is_some() {
            shell.goto_dashboard();
        }
        shell
    }

    pub fn route(&self) -> &Route {
        &self.route
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    fn stored_token(&self) -> Option<SessionToken> {
        match self.session.get() {
            Ok(token) => token,
            Err(error) => {
                tracing::warn!(%error, "failed to read the session store");
                None
            }
        }
    }

    fn clear_session(&self) {
        if let Err(error) = self.session.clear() {
            tracing::warn!(%error, "failed to clear the session store");
        }
    }

    fn store_session(&self, token: &SessionToken) {
        if let Err(error) = self.session.set(token) {
            tracing::warn!(%error, "failed to persist the session token");
        }
    }

    fn bump_epoch(&mut self) -> u64 {
        self.epoch += 1;
        self.epoch
    }

    pub fn goto_home(&mut self) {
        self.bump_epoch();
        self.route = Route::Home;
    }

    pub fn goto_login(&mut self) {
        self.bump_epoch();
        self.route = Route::Login(LoginState::new());
    }

    pub fn goto_signup(&mut self) {
        self.bump_epoch();
        self.route = Route::Signup(SignupState::new());
    }

    /// Authenticated pages check for a token before mounting; without one
    /// they redirect to login and issue no requests.
    pub fn goto_dashboard(&mut self) {
        let Some(token) = self.stored_token() else {
            self.goto_login();
            return;
        };
        let epoch = self.bump_epoch();
        self.route = Route::Dashboard(DashboardState::new());
        dashboard::spawn_load(
            &self.runtime,
            Arc::clone(&self.api),
            token,
            epoch,
            self.events_tx.clone(),
        );
    }

    pub fn goto_project_form(&mut self) {
        if self.stored_token().is_none() {
            self.goto_login();
            return;
        }
        self.bump_epoch();
        self.route = Route::ProjectForm(ProjectFormState::new());
    }

    pub fn goto_project_detail(&mut self, project_id: ProjectId) {
        let Some(token) = self.stored_token() else {
            self.goto_login();
            return;
        };
        let epoch = self.bump_epoch();
        self.route = Route::ProjectDetail(ProjectDetailState::new(project_id.clone()));
        project_detail::spawn_load(
            &self.runtime,
            Arc::clone(&self.api),
            token,
            project_id,
            epoch,
            self.events_tx.clone(),
        );
    }

    fn logout(&mut self) {
        self.clear_session();
        self.goto_login();
    }

    /// Applies every page event that has arrived since the last tick.
    pub fn drain_events(&mut self) {
        while let Ok(routed) = self.events_rx.try_recv() {
            self.on_page_event(routed);
        }
    }

    pub fn on_page_event(&mut self, routed: RoutedPageEvent) {
        if routed.epoch != self.epoch {
            tracing::warn!(
                stale = routed.epoch,
                current = self.epoch,
                "dropping response for an unmounted page"
            );
            return;
        }

        match routed.event {
            PageEvent::SessionRejected(message) => {
                self.clear_session();
                self.goto_login();
                if let Route::Login(state) = &mut self.route {
                    state.error = Some(message);
                }
            }
            PageEvent::Login(LoginEvent::Succeeded(token)) => {
                self.store_session(&token);
                self.goto_dashboard();
            }
            PageEvent::Login(LoginEvent::Failed(message)) => {
                if let Route::Login(state) = &mut self.route {
                    login::apply_failure(state, message);
                }
            }
            PageEvent::Signup(SignupEvent::Succeeded(registered)) => {
                self.store_session(&registered.token);
                self.goto_dashboard();
            }
            PageEvent::Signup(SignupEvent::Failed(message)) => {
                if let Route::Signup(state) = &mut self.route {
                    signup::apply_failure(state, message);
                }
            }
            PageEvent::ProjectForm(ProjectFormEvent::Created(_)) => {
                self.goto_dashboard();
            }
            PageEvent::ProjectForm(ProjectFormEvent::Failed(message)) => {
                if let Route::ProjectForm(state) = &mut self.route {
                    project_form::apply_failure(state, message);
                }
            }
            PageEvent::Dashboard(event) => {
                if let Route::Dashboard(state) = &mut self.route {
                    dashboard::apply(state, event);
                }
            }
            PageEvent::ProjectDetail(event) => {
                if let Route::ProjectDetail(state) = &mut self.route {
                    project_detail::apply(state, event);
                }
            }
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return;
        }

        match &mut self.route {
            Route::Home => self.handle_home_key(key),
            Route::Login(state) => {
                let intent = login::handle_key(state, key);
                self.act_on_login(intent);
            }
            Route::Signup(state) => {
                let intent = signup::handle_key(state, key);
                self.act_on_signup(intent);
            }
            Route::ProjectForm(state) => {
                let intent = project_form::handle_key(state, key);
                self.act_on_project_form(intent);
            }
            Route::Dashboard(state) => {
                let intent = dashboard::handle_key(state, key);
                self.act_on_dashboard(intent);
            }
            Route::ProjectDetail(state) => {
                let intent = project_detail::handle_key(state, key);
                self.act_on_project_detail(intent);
            }
        }
    }

    fn handle_home_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Char('s') => self.goto_signup(),
            KeyCode::Char('l') => self.goto_login(),
            // Enter follows the session: dashboard when signed in.
            KeyCode::Enter => self.goto_dashboard(),
            _ => {}
        }
    }

    fn act_on_login(&mut self, intent: LoginIntent) {
        match intent {
            LoginIntent::None => {}
            LoginIntent::GotoHome => self.goto_home(),
            LoginIntent::GotoSignup => self.goto_signup(),
            LoginIntent::Submit => {
                let Route::Login(state) = &mut self.route else {
                    return;
                };
                if let Some(request) = login::begin_submit(state) {
                    login::spawn_submit(
                        &self.runtime,
                        Arc::clone(&self.api),
                        request,
                        self.epoch,
                        self.events_tx.clone(),
                    );
                }
            }
        }
    }

    fn act_on_signup(&mut self, intent: SignupIntent) {
        match intent {
            SignupIntent::None => {}
            SignupIntent::GotoHome => self.goto_home(),
            SignupIntent::GotoLogin => self.goto_login(),
            SignupIntent::Submit => {
                let Route::Signup(state) = &mut self.route else {
                    return;
                };
                if let Some(request) = signup::begin_submit(state) {
                    signup::spawn_submit(
                        &self.runtime,
                        Arc::clone(&self.api),
                        request,
                        self.epoch,
                        self.events_tx.clone(),
                    );
                }
            }
        }
    }

    fn act_on_project_form(&mut self, intent: ProjectFormIntent) {
        match intent {
            ProjectFormIntent::None => {}
            ProjectFormIntent::GotoDashboard => self.goto_dashboard(),
            ProjectFormIntent::Submit => {
                let Some(token) = self.stored_token() else {
                    self.goto_login();
                    return;
                };
                let Route::ProjectForm(state) = &mut self.route else {
                    return;
                };
                if let Some(request) = project_form::begin_submit(state) {
                    project_form::spawn_submit(
                        &self.runtime,
                        Arc::clone(&self.api),
                        token,
                        request,
                        self.epoch,
                        self.events_tx.clone(),
                    );
                }
            }
        }
    }

    fn act_on_dashboard(&mut self, intent: DashboardIntent) {
        match intent {
            DashboardIntent::None => {}
            DashboardIntent::Quit => self.should_quit = true,
            DashboardIntent::Logout => self.logout(),
            DashboardIntent::NewProject => self.goto_project_form(),
            DashboardIntent::Refresh => self.goto_dashboard(),
            DashboardIntent::OpenProject(project_id) => self.goto_project_detail(project_id),
            DashboardIntent::DeleteProject(project_id) => {
                let Some(token) = self.stored_token() else {
                    self.goto_login();
                    return;
                };
                dashboard::spawn_delete(
                    &self.runtime,
                    Arc::clone(&self.api),
                    token,
                    project_id,
                    self.epoch,
                    self.events_tx.clone(),
                );
            }
        }
    }

    fn act_on_project_detail(&mut self, intent: ProjectDetailIntent) {
        match intent {
            ProjectDetailIntent::None => {}
            ProjectDetailIntent::Quit => self.should_quit = true,
            ProjectDetailIntent::Back => self.goto_dashboard(),
            ProjectDetailIntent::Refresh => {
                if let Route::ProjectDetail(state) = &self.route {
                    let project_id = state.project_id.clone();
                    self.goto_project_detail(project_id);
                }
            }
            ProjectDetailIntent::SubmitTask => {
                let Some(token) = self.stored_token() else {
                    self.goto_login();
                    return;
                };
                let Route::ProjectDetail(state) = &mut self.route else {
                    return;
                };
                let project_id = state.project_id.clone();
                if let Some(submission) = project_detail::validate_and_begin_submit(state) {
                    project_detail::spawn_save_task(
                        &self.runtime,
                        Arc::clone(&self.api),
                        token,
                        project_id,
                        submission,
                        self.epoch,
                        self.events_tx.clone(),
                    );
                }
            }
            ProjectDetailIntent::DeleteTask(task_id) => {
                let Some(token) = self.stored_token() else {
                    self.goto_login();
                    return;
                };
                project_detail::spawn_delete_task(
                    &self.runtime,
                    Arc::clone(&self.api),
                    token,
                    task_id,
                    self.epoch,
                    self.events_tx.clone(),
                );
            }
        }
    }
}

/// Owns the terminal for the lifetime of the run. Raw mode and the alternate
/// screen are restored on drop, including on panic unwinds.
pub struct Ui {
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl Ui {
    pub fn init() -> io::Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let terminal = Terminal::new(CrosstermBackend::new(stdout))?;
        Ok(Self { terminal })
    }

    /// Blocking render loop: drain page events, draw, then poll for input
    /// for at most one tick so background responses keep the screen fresh.
    pub fn run(&mut self, shell: &mut Shell, tick: Duration) -> io::Result<()> {
        while !shell.should_quit() {
            shell.drain_events();
            self.terminal.draw(|frame| render::draw(frame, shell))?;

            if event::poll(tick)? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        shell.handle_key(key);
                    }
                }
            }
        }
        Ok(())
    }
}

impl Drop for Ui {
    fn drop(&mut self) {
        if let Err(error) = disable_raw_mode() {
            tracing::warn!(%error, "failed to disable raw mode");
        }
        if let Err(error) = execute!(io::stdout(), LeaveAlternateScreen) {
            tracing::warn!(%error, "failed to leave the alternate screen");
        }
    }
}

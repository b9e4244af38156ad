use crate::pages::dashboard::DashboardEvent;
use crate::pages::login::LoginEvent;
use crate::pages::project_detail::ProjectDetailEvent;
use crate::pages::project_form::ProjectFormEvent;
use crate::pages::signup::SignupEvent;

/// Outcome of an in-flight request, delivered back to the shell's event
/// channel once the response arrives.
#[derive(Debug)]
pub enum PageEvent {
    /// The service rejected the bearer token on an authenticated call. The
    /// shell clears the session and returns to the login page.
    SessionRejected(String),
    Login(LoginEvent),
    Signup(SignupEvent),
    ProjectForm(ProjectFormEvent),
    Dashboard(DashboardEvent),
    ProjectDetail(ProjectDetailEvent),
}

/// Every event carries the navigation epoch it was spawned under. A late
/// response from a page the user has already left arrives with a stale
/// epoch and is dropped as a no-op.
#[derive(Debug)]
pub struct RoutedPageEvent {
    pub epoch: u64,
    pub event: PageEvent,
}

impl RoutedPageEvent {
    pub fn new(epoch: u64, event: PageEvent) -> Self {
        Self { epoch, event }
    }
}

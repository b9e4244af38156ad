use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use tasktracker_core::{
    CoreError, CreateProjectRequest, CreateTaskRequest, LoginRequest, Project, ProjectId,
    RegisterRequest, RegisteredUser, SessionToken, Task, TaskId, TaskTrackerApi,
    UpdateTaskRequest, User,
};

use crate::transport::{ApiRequest, ApiResponse, HttpTransport, ReqwestHttpTransport};

const LOGIN_REJECTED_MESSAGE: &str = "Unauthorized: Invalid email or password.";

/// REST client for the task tracker service. Stateless beyond the transport:
/// tokens are passed per call and the session store is never touched here.
pub struct TaskTrackerClient {
    transport: Arc<dyn HttpTransport>,
}

impl TaskTrackerClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, CoreError> {
        let transport = ReqwestHttpTransport::new(base_url)?;
        Ok(Self::with_transport(Arc::new(transport)))
    }

    pub fn with_transport(transport: Arc<dyn HttpTransport>) -> Self {
        Self { transport }
    }

    /// Executes a request and maps non-success statuses onto the error
    /// taxonomy, preferring the server-provided message when there is one.
    async fn send_checked(
        &self,
        request: ApiRequest,
        fallback: &str,
    ) -> Result<ApiResponse, CoreError> {
        let response = self.transport.execute(request).await?;
        if response.is_success() {
            return Ok(response);
        }

        let message = server_message(&response.body).unwrap_or_else(|| fallback.to_owned());
        if response.status == 401 {
            Err(CoreError::Unauthorized(message))
        } else {
            Err(CoreError::RequestFailed(message))
        }
    }
}

/// Error bodies are `{ "message": ... }` when the service has one to give.
fn server_message(body: &str) -> Option<String> {
    #[derive(Deserialize)]
    struct ErrorBody {
        message: Option<String>,
    }

    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|parsed| parsed.message)
        .filter(|message| !message.trim().is_empty())
}

fn decode<T: DeserializeOwned>(body: &str, context: &str) -> Result<T, CoreError> {
    serde_json::from_str(body)
        .map_err(|err| CoreError::MalformedResponse(format!("failed to decode {context}: {err}")))
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    token: String,
}

#[derive(Debug, Deserialize)]
struct RegisterResponse {
    token: String,
    name: String,
    email: String,
    #[serde(default)]
    country: Option<String>,
}

#[async_trait]
impl TaskTrackerApi for TaskTrackerClient {
    async fn register(&self, request: RegisterRequest) -> Result<RegisteredUser, CoreError> {
        let response = self
            .send_checked(
                ApiRequest::post("/api/user/register").with_body(json!({
                    "name": request.name,
                    "email": request.email,
                    "country": request.country,
                    "password": request.password,
                })),
                "Registration failed. Please try again.",
            )
            .await?;

        let payload: RegisterResponse = decode(&response.body, "registration response")?;
        Ok(RegisteredUser {
            token: SessionToken::new(payload.token),
            user: User {
                name: payload.name,
                email: payload.email,
                country: payload.country,
            },
        })
    }

    async fn login(&self, request: LoginRequest) -> Result<SessionToken, CoreError> {
        let response = self
            .transport
            .execute(ApiRequest::post("/api/user/login").with_body(json!({
                "email": request.email,
                "password": request.password,
            })))
            .await?;

        // A 401 here means rejected credentials, distinguished so the login
        // page can show a specific message.
        if response.status == 401 {
            return Err(CoreError::Unauthorized(LOGIN_REJECTED_MESSAGE.to_owned()));
        }
        if !response.is_success() {
            let message =
                server_message(&response.body).unwrap_or_else(|| "Login failed".to_owned());
            return Err(CoreError::RequestFailed(message));
        }

        let payload: LoginResponse = decode(&response.body, "login response")?;
        Ok(SessionToken::new(payload.token))
    }

    async fn fetch_profile(&self, token: &SessionToken) -> Result<User, CoreError> {
        let response = self
            .send_checked(
                ApiRequest::get("/api/user/profile").with_bearer(token.as_str()),
                "Failed to fetch user profile",
            )
            .await?;
        decode(&response.body, "user profile")
    }

    async fn list_projects(&self, token: &SessionToken) -> Result<Vec<Project>, CoreError> {
        let response = self
            .send_checked(
                ApiRequest::get("/api/project/getprojects").with_bearer(token.as_str()),
                "Failed to fetch projects",
            )
            .await?;
        decode(&response.body, "project list")
    }

    async fn create_project(
        &self,
        token: &SessionToken,
        request: CreateProjectRequest,
    ) -> Result<Project, CoreError> {
        let response = self
            .send_checked(
                ApiRequest::post("/api/project/create")
                    .with_bearer(token.as_str())
                    .with_body(json!({
                        "title": request.title,
                        "description": request.description,
                    })),
                "Failed to create project",
            )
            .await?;
        decode(&response.body, "created project")
    }

    async fn fetch_project(
        &self,
        token: &SessionToken,
        project_id: &ProjectId,
    ) -> Result<Project, CoreError> {
        let response = self
            .send_checked(
                ApiRequest::get(format!("/api/project/{}", project_id.as_str()))
                    .with_bearer(token.as_str()),
                "Failed to fetch project",
            )
            .await?;
        decode(&response.body, "project")
    }

    async fn delete_project(
        &self,
        token: &SessionToken,
        project_id: &ProjectId,
    ) -> Result<(), CoreError> {
        self.send_checked(
            ApiRequest::delete(format!("/api/project/{}", project_id.as_str()))
                .with_bearer(token.as_str()),
            "Failed to delete project",
        )
        .await?;
        Ok(())
    }

    async fn list_tasks(
        &self,
        token: &SessionToken,
        project_id: &ProjectId,
    ) -> Result<Vec<Task>, CoreError> {
        let response = self
            .send_checked(
                ApiRequest::get(format!("/api/tasks/{}", project_id.as_str()))
                    .with_bearer(token.as_str()),
                "Failed to fetch tasks",
            )
            .await?;
        decode(&response.body, "task list")
    }

    async fn create_task(
        &self,
        token: &SessionToken,
        request: CreateTaskRequest,
    ) -> Result<Task, CoreError> {
        let response = self
            .send_checked(
                ApiRequest::post(format!("/api/tasks/{}", request.project_id.as_str()))
                    .with_bearer(token.as_str())
                    .with_body(json!({
                        "title": request.title,
                        "description": request.description,
                    })),
                "Failed to create task",
            )
            .await?;
        decode(&response.body, "created task")
    }

    async fn update_task(
        &self,
        token: &SessionToken,
        request: UpdateTaskRequest,
    ) -> Result<Task, CoreError> {
        let response = self
            .send_checked(
                ApiRequest::put(format!("/api/tasks/{}", request.task_id.as_str()))
                    .with_bearer(token.as_str())
                    .with_body(json!({
                        "title": request.title,
                        "description": request.description,
                        "status": request.status,
                    })),
                "Failed to update task",
            )
            .await?;
        decode(&response.body, "updated task")
    }

    async fn delete_task(&self, token: &SessionToken, task_id: &TaskId) -> Result<(), CoreError> {
        self.send_checked(
            ApiRequest::delete(format!("/api/tasks/{}", task_id.as_str()))
                .with_bearer(token.as_str()),
            "Failed to delete task",
        )
        .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::HttpMethod;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    #[derive(Debug, Default)]
    struct StubTransport {
        requests: Mutex<Vec<ApiRequest>>,
        responses: Mutex<VecDeque<ApiResponse>>,
    }

    impl StubTransport {
        fn push_response(&self, status: u16, body: impl Into<String>) {
            self.responses
                .lock()
                .expect("stub responses lock")
                .push_back(ApiResponse {
                    status,
                    body: body.into(),
                });
        }

        fn requests(&self) -> Vec<ApiRequest> {
            self.requests.lock().expect("stub requests lock").clone()
        }

        fn request_count(&self) -> usize {
            self.requests.lock().expect("stub requests lock").len()
        }
    }

    #[async_trait]
    impl HttpTransport for StubTransport {
        async fn execute(&self, request: ApiRequest) -> Result<ApiResponse, CoreError> {
            self.requests.lock().expect("stub requests lock").push(request);
            let mut responses = self.responses.lock().expect("stub responses lock");
            responses.pop_front().ok_or_else(|| {
                CoreError::NetworkFailure("stub transport has no more queued responses".to_owned())
            })
        }
    }

    fn client_with(transport: &Arc<StubTransport>) -> TaskTrackerClient {
        TaskTrackerClient::with_transport(Arc::clone(transport) as Arc<dyn HttpTransport>)
    }

    fn token() -> SessionToken {
        SessionToken::new("jwt-token")
    }

    #[tokio::test]
    async fn login_maps_401_to_the_exact_rejection_message() {
        let transport = Arc::new(StubTransport::default());
        transport.push_response(401, r#"{"message":"bad credentials"}"#);
        let client = client_with(&transport);

        let error = client
            .login(LoginRequest {
                email: "dev@example.com".to_owned(),
                password: "hunter2".to_owned(),
            })
            .await
            .expect_err("login must fail");

        assert!(matches!(error, CoreError::Unauthorized(_)));
        assert_eq!(
            error.user_message(),
            "Unauthorized: Invalid email or password."
        );
    }

    #[tokio::test]
    async fn login_success_returns_the_issued_token() {
        let transport = Arc::new(StubTransport::default());
        transport.push_response(200, r#"{"token":"jwt-fresh"}"#);
        let client = client_with(&transport);

        let issued = client
            .login(LoginRequest {
                email: "dev@example.com".to_owned(),
                password: "hunter2".to_owned(),
            })
            .await
            .expect("login");
        assert_eq!(issued.as_str(), "jwt-fresh");

        let requests = transport.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].method, HttpMethod::Post);
        assert_eq!(requests[0].path, "/api/user/login");
        assert!(requests[0].bearer_token.is_none());
        let body = requests[0].body.as_ref().expect("login body");
        assert_eq!(body["email"], "dev@example.com");
        assert_eq!(body["password"], "hunter2");
    }

    #[tokio::test]
    async fn register_returns_token_and_profile_from_one_payload() {
        let transport = Arc::new(StubTransport::default());
        transport.push_response(
            201,
            r#"{"token":"jwt-new","name":"Dana","email":"dana@example.com","country":"NL"}"#,
        );
        let client = client_with(&transport);

        let registered = client
            .register(RegisterRequest {
                name: "Dana".to_owned(),
                email: "dana@example.com".to_owned(),
                country: "NL".to_owned(),
                password: "hunter2".to_owned(),
            })
            .await
            .expect("register");

        assert_eq!(registered.token.as_str(), "jwt-new");
        assert_eq!(registered.user.name, "Dana");
        assert_eq!(registered.user.country.as_deref(), Some("NL"));
    }

    #[tokio::test]
    async fn authenticated_calls_attach_the_bearer_token() {
        let transport = Arc::new(StubTransport::default());
        transport.push_response(
            200,
            r#"{"name":"Dana","email":"dana@example.com","country":"NL"}"#,
        );
        let client = client_with(&transport);

        client.fetch_profile(&token()).await.expect("profile");

        let requests = transport.requests();
        assert_eq!(requests[0].bearer_token.as_deref(), Some("jwt-token"));
        assert_eq!(requests[0].path, "/api/user/profile");
    }

    #[tokio::test]
    async fn non_success_prefers_the_server_message_body() {
        let transport = Arc::new(StubTransport::default());
        transport.push_response(500, r#"{"message":"database offline"}"#);
        let client = client_with(&transport);

        let error = client
            .list_projects(&token())
            .await
            .expect_err("must fail");
        assert!(matches!(error, CoreError::RequestFailed(_)));
        assert_eq!(error.user_message(), "database offline");
    }

    #[tokio::test]
    async fn non_success_without_message_uses_the_generic_fallback() {
        let transport = Arc::new(StubTransport::default());
        transport.push_response(502, "upstream timeout (not json)");
        let client = client_with(&transport);

        let error = client
            .list_projects(&token())
            .await
            .expect_err("must fail");
        assert_eq!(error.user_message(), "Failed to fetch projects");
    }

    #[tokio::test]
    async fn rejected_token_on_authenticated_call_is_unauthorized() {
        let transport = Arc::new(StubTransport::default());
        transport.push_response(401, r#"{"message":"token expired"}"#);
        let client = client_with(&transport);

        let error = client
            .list_tasks(&token(), &ProjectId::new("proj-1"))
            .await
            .expect_err("must fail");
        assert!(error.is_unauthorized());
        assert_eq!(error.user_message(), "token expired");
    }

    #[tokio::test]
    async fn list_projects_decodes_mongo_style_ids() {
        let transport = Arc::new(StubTransport::default());
        transport.push_response(
            200,
            r#"[{"_id":"p1","title":"Inbox","createdAt":"2026-04-26T00:00:00Z"},{"_id":"p2","title":"Docs"}]"#,
        );
        let client = client_with(&transport);

        let projects = client.list_projects(&token()).await.expect("projects");
        assert_eq!(projects.len(), 2);
        assert_eq!(projects[0].id, ProjectId::new("p1"));
        assert_eq!(projects[1].description, None);
    }

    #[tokio::test]
    async fn create_task_posts_under_the_project_without_a_status_field() {
        let transport = Arc::new(StubTransport::default());
        transport.push_response(201, r#"{"_id":"t1","title":"Write spec"}"#);
        let client = client_with(&transport);

        client
            .create_task(
                &token(),
                CreateTaskRequest {
                    project_id: ProjectId::new("proj-1"),
                    title: "Write spec".to_owned(),
                    description: String::new(),
                },
            )
            .await
            .expect("create task");

        let requests = transport.requests();
        assert_eq!(requests[0].method, HttpMethod::Post);
        assert_eq!(requests[0].path, "/api/tasks/proj-1");
        let body = requests[0].body.as_ref().expect("create body");
        assert_eq!(body["title"], "Write spec");
        assert!(body.get("status").is_none());
    }

    #[tokio::test]
    async fn update_task_puts_by_task_id_with_the_raw_status() {
        let transport = Arc::new(StubTransport::default());
        transport.push_response(
            200,
            r#"{"_id":"t1","title":"Write spec","status":"In Progress"}"#,
        );
        let client = client_with(&transport);

        let updated = client
            .update_task(
                &token(),
                UpdateTaskRequest {
                    task_id: TaskId::new("t1"),
                    title: "Write spec".to_owned(),
                    description: "second draft".to_owned(),
                    status: "In Progress".to_owned(),
                },
            )
            .await
            .expect("update task");
        assert_eq!(updated.status.as_deref(), Some("In Progress"));

        let requests = transport.requests();
        assert_eq!(requests[0].method, HttpMethod::Put);
        assert_eq!(requests[0].path, "/api/tasks/t1");
        assert_eq!(
            requests[0].body.as_ref().expect("update body")["status"],
            "In Progress"
        );
    }

    #[tokio::test]
    async fn delete_project_issues_exactly_one_delete_request() {
        let transport = Arc::new(StubTransport::default());
        transport.push_response(200, "");
        let client = client_with(&transport);

        client
            .delete_project(&token(), &ProjectId::new("proj-2"))
            .await
            .expect("delete project");

        assert_eq!(transport.request_count(), 1);
        let requests = transport.requests();
        assert_eq!(requests[0].method, HttpMethod::Delete);
        assert_eq!(requests[0].path, "/api/project/proj-2");
    }

    #[tokio::test]
    async fn undecodable_success_body_is_a_malformed_response() {
        let transport = Arc::new(StubTransport::default());
        transport.push_response(200, r#"{"unexpected":"shape"}"#);
        let client = client_with(&transport);

        let error = client
            .fetch_project(&token(), &ProjectId::new("p1"))
            .await
            .expect_err("must fail");
        assert!(matches!(error, CoreError::MalformedResponse(_)));
    }
}

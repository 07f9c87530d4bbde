// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all
)]
#![allow(clippy::multiple_crate_versions)]

mod jobs;
mod mailer;

use axum::{
    Json, Router,
    extract::{Path, State as AxumState},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use cadence::{
    EmployeeProjection, GlobalSchedulingResult, Mailer, RetryPolicy, Scheduler,
    StoreSchedulingResult,
};
use cadence_api::{
    ApiError, SettingsValidationResponse, UpdateSettingsRequest, UpdateSettingsResponse,
    calculate_next_evaluation, get_settings_validation, schedule_all, schedule_store,
    update_settings,
};
use cadence_persistence::Persistence;
use chrono::Utc;
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

use jobs::{JobConfig, start_jobs};
use mailer::LogMailer;

/// Cadence Server - HTTP server and cron trigger for evaluation scheduling
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the `SQLite` database file. If not provided, uses in-memory database.
    #[arg(short, long)]
    database: Option<String>,

    /// Port to bind the server to
    #[arg(short, long, default_value_t = 3000)]
    port: u16,

    /// Six-field cron expression for the daily scheduling run
    #[arg(long, default_value = "0 0 6 * * *")]
    scheduling_cron: String,

    /// Six-field cron expression for the reminder pass
    #[arg(long, default_value = "0 0 */4 * * *")]
    reminder_cron: String,

    /// Do not send evaluation reminders
    #[arg(long)]
    disable_reminders: bool,

    /// Attempts per repository or mail call before giving up
    #[arg(long, default_value_t = 3)]
    retry_attempts: u32,

    /// Base delay between retries in milliseconds; grows linearly per attempt
    #[arg(long, default_value_t = 1000)]
    retry_base_delay_ms: u64,
}

/// Application state shared across handlers and cron jobs.
///
/// Scheduling is blocking, so every use of the persistence layer happens on
/// a worker thread that holds the mutex for the whole operation.
#[derive(Clone)]
struct AppState {
    /// The persistence layer.
    persistence: Arc<Mutex<Persistence>>,
    /// The scheduler and its per-store run locks.
    scheduler: Arc<Scheduler>,
    /// Email transport for assignment notices and reminders.
    mailer: Arc<dyn Mailer>,
}

/// Error response type.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ErrorResponse {
    /// Error indicator.
    error: bool,
    /// Error message.
    message: String,
}

/// HTTP error wrapper that implements `IntoResponse`.
struct HttpError {
    /// The HTTP status code.
    status: StatusCode,
    /// The error message.
    message: String,
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let body: Json<ErrorResponse> = Json(ErrorResponse {
            error: true,
            message: self.message,
        });
        (self.status, body).into_response()
    }
}

impl From<ApiError> for HttpError {
    fn from(err: ApiError) -> Self {
        let status: StatusCode = match &err {
            ApiError::DomainRuleViolation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::InvalidInput { .. } => StatusCode::BAD_REQUEST,
            ApiError::ResourceNotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::Conflict { .. } => StatusCode::CONFLICT,
            ApiError::Unavailable { .. } => {
                warn!(error = %err, "Database unavailable");
                StatusCode::SERVICE_UNAVAILABLE
            }
            ApiError::Internal { .. } => {
                error!(error = %err, "Internal error");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

/// Runs an API operation on a blocking worker with the persistence lock held.
async fn run_blocking<T, F>(app_state: &AppState, operation: F) -> Result<T, HttpError>
where
    T: Send + 'static,
    F: FnOnce(&mut Persistence, &Scheduler, &dyn Mailer) -> Result<T, ApiError> + Send + 'static,
{
    let persistence = Arc::clone(&app_state.persistence);
    let scheduler = Arc::clone(&app_state.scheduler);
    let mailer = Arc::clone(&app_state.mailer);

    let outcome = tokio::task::spawn_blocking(move || {
        let mut persistence = persistence.blocking_lock();
        operation(&mut persistence, &scheduler, mailer.as_ref())
    })
    .await
    .map_err(|e| {
        error!(error = %e, "Worker task did not complete");
        HttpError {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: format!("Worker task failed: {e}"),
        }
    })?;

    outcome.map_err(HttpError::from)
}

/// Handler for PUT `/stores/{store_id}/settings` endpoint.
///
/// Saves settings and, when auto-scheduling is switched on, embeds the
/// results of the immediate run.
async fn handle_update_settings(
    AxumState(app_state): AxumState<AppState>,
    Path(store_id): Path<i64>,
    Json(req): Json<UpdateSettingsRequest>,
) -> Result<Json<UpdateSettingsResponse>, HttpError> {
    info!(store_id, "Handling update_settings request");

    let response: UpdateSettingsResponse =
        run_blocking(&app_state, move |persistence, scheduler, mailer| {
            update_settings(persistence, scheduler, mailer, store_id, &req, Utc::now())
        })
        .await?;

    Ok(Json(response))
}

/// Handler for GET `/stores/{store_id}/settings/validation` endpoint.
async fn handle_settings_validation(
    AxumState(app_state): AxumState<AppState>,
    Path(store_id): Path<i64>,
) -> Result<Json<SettingsValidationResponse>, HttpError> {
    info!(store_id, "Handling settings_validation request");

    let response: SettingsValidationResponse =
        run_blocking(&app_state, move |persistence, scheduler, _mailer| {
            get_settings_validation(persistence, scheduler, store_id)
        })
        .await?;

    Ok(Json(response))
}

/// Handler for POST `/stores/{store_id}/schedule` endpoint.
async fn handle_schedule_store(
    AxumState(app_state): AxumState<AppState>,
    Path(store_id): Path<i64>,
) -> Result<Json<StoreSchedulingResult>, HttpError> {
    info!(store_id, "Handling schedule_store request");

    let result: StoreSchedulingResult =
        run_blocking(&app_state, move |persistence, scheduler, mailer| {
            schedule_store(persistence, scheduler, mailer, store_id, Utc::now())
        })
        .await?;

    Ok(Json(result))
}

/// Handler for POST `/schedule` endpoint.
async fn handle_schedule_all(
    AxumState(app_state): AxumState<AppState>,
) -> Result<Json<GlobalSchedulingResult>, HttpError> {
    info!("Handling schedule_all request");

    let result: GlobalSchedulingResult =
        run_blocking(&app_state, |persistence, scheduler, mailer| {
            schedule_all(persistence, scheduler, mailer, Utc::now())
        })
        .await?;

    Ok(Json(result))
}

/// Handler for POST `/employees/{employee_id}/next-evaluation` endpoint.
async fn handle_next_evaluation(
    AxumState(app_state): AxumState<AppState>,
    Path(employee_id): Path<i64>,
) -> Result<Json<EmployeeProjection>, HttpError> {
    info!(employee_id, "Handling next_evaluation request");

    let projection: EmployeeProjection =
        run_blocking(&app_state, move |persistence, scheduler, _mailer| {
            calculate_next_evaluation(persistence, scheduler, employee_id, Utc::now())
        })
        .await?;

    Ok(Json(projection))
}

/// Builds the application router with all endpoints.
fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route("/stores/{store_id}/settings", put(handle_update_settings))
        .route(
            "/stores/{store_id}/settings/validation",
            get(handle_settings_validation),
        )
        .route("/stores/{store_id}/schedule", post(handle_schedule_store))
        .route("/schedule", post(handle_schedule_all))
        .route(
            "/employees/{employee_id}/next-evaluation",
            post(handle_next_evaluation),
        )
        .with_state(app_state)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command-line arguments
    let args: Args = Args::parse();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("Initializing Cadence Server");

    // Initialize persistence (in-memory or file-based based on CLI argument)
    let persistence: Persistence = if let Some(db_path) = &args.database {
        info!("Using file-based database at: {}", db_path);
        Persistence::new_with_file(db_path)?
    } else {
        info!("Using in-memory database");
        Persistence::new_in_memory()?
    };

    let retry: RetryPolicy = RetryPolicy::new(
        args.retry_attempts,
        Duration::from_millis(args.retry_base_delay_ms),
    );
    let app_state: AppState = AppState {
        persistence: Arc::new(Mutex::new(persistence)),
        scheduler: Arc::new(Scheduler::new(retry)),
        mailer: Arc::new(LogMailer),
    };

    let job_config: JobConfig = JobConfig {
        scheduling_cron: args.scheduling_cron.clone(),
        reminder_cron: (!args.disable_reminders).then(|| args.reminder_cron.clone()),
    };
    let _jobs = start_jobs(&app_state, &job_config).await?;

    // Build router
    let app: Router = build_router(app_state);

    // Bind to address
    let addr: std::net::SocketAddr = format!("127.0.0.1:{}", args.port).parse()?;
    info!("Server listening on {}", addr);

    // Run server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request, StatusCode as HttpStatusCode},
    };
    use cadence::StoreOutcome;
    use cadence_domain::EmployeeRole;
    use cadence_persistence::NewEmployee;
    use chrono::Duration as ChronoDuration;
    use tower::ServiceExt;

    /// A store with a director, a manager, a template and one recent hire.
    struct Fixture {
        app_state: AppState,
        store_id: i64,
        employee_id: i64,
    }

    fn staff(
        store_id: i64,
        name: &str,
        role: EmployeeRole,
        hired_days_ago: i64,
        evaluator_id: Option<i64>,
    ) -> NewEmployee {
        NewEmployee {
            store_id,
            name: String::from(name),
            email: Some(format!("{}@example.com", name.to_lowercase().replace(' ', "."))),
            role,
            start_date: Utc::now() - ChronoDuration::days(hired_days_ago),
            evaluator_id,
        }
    }

    /// Helper to create test app state with a seeded in-memory store.
    fn create_fixture() -> Fixture {
        let mut persistence: Persistence =
            Persistence::new_in_memory().expect("Failed to create in-memory persistence");
        let store_id: i64 = persistence.create_store("Downtown").unwrap();
        persistence
            .create_employee(&staff(store_id, "Dana Director", EmployeeRole::Director, 2000, None))
            .unwrap();
        let manager_id: i64 = persistence
            .create_employee(&staff(store_id, "Morgan Manager", EmployeeRole::Manager, 2000, None))
            .unwrap();
        let employee_id: i64 = persistence
            .create_employee(&staff(
                store_id,
                "Avery Adams",
                EmployeeRole::TeamMember,
                120,
                Some(manager_id),
            ))
            .unwrap();
        persistence
            .create_template(
                store_id,
                "Quarterly Review",
                true,
                Utc::now() - ChronoDuration::days(500),
            )
            .unwrap();

        Fixture {
            app_state: AppState {
                persistence: Arc::new(Mutex::new(persistence)),
                scheduler: Arc::new(Scheduler::new(RetryPolicy::immediate())),
                mailer: Arc::new(LogMailer),
            },
            store_id,
            employee_id,
        }
    }

    async fn send(app: Router, method: &str, uri: &str, body: Option<String>) -> Response {
        let builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json");
        app.oneshot(builder.body(body.map_or_else(Body::empty, Body::from)).unwrap())
            .await
            .unwrap()
    }

    async fn read_json<T: serde::de::DeserializeOwned>(response: Response) -> T {
        let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body_bytes).unwrap()
    }

    #[tokio::test]
    async fn test_enabling_auto_schedule_embeds_results() {
        let fixture: Fixture = create_fixture();
        let app: Router = build_router(fixture.app_state.clone());

        let response = send(
            app,
            "PUT",
            &format!("/stores/{}/settings", fixture.store_id),
            Some(String::from(r#"{"auto_schedule": true}"#)),
        )
        .await;

        assert_eq!(response.status(), HttpStatusCode::OK);
        let body: serde_json::Value = read_json(response).await;
        assert_eq!(body["settings"]["auto_schedule"], true);
        assert_eq!(body["scheduling_results"]["success"], true);
        assert_eq!(body["scheduling_results"]["result"]["scheduled"], 1);
    }

    #[tokio::test]
    async fn test_invalid_settings_are_bad_requests() {
        let fixture: Fixture = create_fixture();
        let app: Router = build_router(fixture.app_state.clone());

        let response = send(
            app,
            "PUT",
            &format!("/stores/{}/settings", fixture.store_id),
            Some(String::from(r#"{"frequency_days": 5}"#)),
        )
        .await;

        assert_eq!(response.status(), HttpStatusCode::BAD_REQUEST);
        let body: ErrorResponse = read_json(response).await;
        assert!(body.error);
        assert!(body.message.contains("frequency_days"));
    }

    #[tokio::test]
    async fn test_settings_validation_endpoint() {
        let fixture: Fixture = create_fixture();
        let app: Router = build_router(fixture.app_state.clone());

        let response = send(
            app,
            "GET",
            &format!("/stores/{}/settings/validation", fixture.store_id),
            None,
        )
        .await;

        assert_eq!(response.status(), HttpStatusCode::OK);
        let body: serde_json::Value = read_json(response).await;
        assert_eq!(body["is_valid"], true);
        assert_eq!(body["configuration_issues"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_store_run_then_global_run() {
        let fixture: Fixture = create_fixture();
        let app: Router = build_router(fixture.app_state.clone());

        let response = send(
            app.clone(),
            "POST",
            &format!("/stores/{}/schedule", fixture.store_id),
            None,
        )
        .await;
        assert_eq!(response.status(), HttpStatusCode::OK);
        let body: serde_json::Value = read_json(response).await;
        assert_eq!(body["scheduled"], 1);
        assert_eq!(body["scheduled_details"][0]["employee_id"], fixture.employee_id);

        // The store run wrote default settings, which leave auto-scheduling off.
        let response = send(app, "POST", "/schedule", None).await;
        assert_eq!(response.status(), HttpStatusCode::OK);
        let body: serde_json::Value = read_json(response).await;
        assert_eq!(body["stores"].as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn test_missing_template_is_unprocessable() {
        let fixture: Fixture = create_fixture();
        let app: Router = build_router(fixture.app_state.clone());
        let other_store: i64 = fixture
            .app_state
            .persistence
            .lock()
            .await
            .create_store("Uptown")
            .unwrap();

        let response = send(
            app,
            "POST",
            &format!("/stores/{other_store}/schedule"),
            None,
        )
        .await;

        assert_eq!(response.status(), HttpStatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_overlapping_run_is_a_conflict() {
        let fixture: Fixture = create_fixture();
        let app: Router = build_router(fixture.app_state.clone());
        let _held = fixture
            .app_state
            .scheduler
            .locks()
            .try_acquire(fixture.store_id)
            .unwrap();

        let response = send(
            app,
            "POST",
            &format!("/stores/{}/schedule", fixture.store_id),
            None,
        )
        .await;

        assert_eq!(response.status(), HttpStatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_next_evaluation_projection() {
        let fixture: Fixture = create_fixture();
        let app: Router = build_router(fixture.app_state.clone());

        let response = send(
            app.clone(),
            "POST",
            &format!("/employees/{}/next-evaluation", fixture.employee_id),
            None,
        )
        .await;
        assert_eq!(response.status(), HttpStatusCode::OK);
        let projection: serde_json::Value = read_json(response).await;
        assert_eq!(projection["employee_id"], fixture.employee_id);
        assert_eq!(projection["base_date_source"], "hire_date");

        let response = send(app, "POST", "/employees/9999/next-evaluation", None).await;
        assert_eq!(response.status(), HttpStatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_cron_job_schedules_enabled_stores() {
        let fixture: Fixture = create_fixture();
        {
            let app: Router = build_router(fixture.app_state.clone());
            let response = send(
                app,
                "PUT",
                &format!("/stores/{}/settings", fixture.store_id),
                Some(String::from(r#"{"auto_schedule": true}"#)),
            )
            .await;
            assert_eq!(response.status(), HttpStatusCode::OK);
        }

        jobs::run_scheduling_job(fixture.app_state.clone()).await;

        let mut persistence = fixture.app_state.persistence.lock().await;
        let evaluations = persistence.store_evaluations(fixture.store_id).unwrap();
        // Enabling already scheduled the hire; the cron run must not duplicate it.
        assert_eq!(evaluations.len(), 1);
        drop(persistence);

        let result: GlobalSchedulingResult =
            run_blocking(&fixture.app_state, |persistence, scheduler, mailer| {
                schedule_all(persistence, scheduler, mailer, Utc::now())
            })
            .await
            .unwrap_or_else(|e| panic!("global run failed: {}", e.message));
        assert_eq!(result.stores_processed, 1);
        assert!(matches!(result.stores[0], StoreOutcome::Completed(_)));
    }
}

use anyhow::{Context, Result};
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use sea_orm::DatabaseConnection;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};

use super::handlers::{divisions, goals, health, reports, task_reports, tasks, users};

/// Upper bound for uploaded workbooks
const MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
}

pub async fn create_app(db: DatabaseConnection, cors_origin: Option<&str>) -> Result<Router> {
    let state = AppState { db };

    let cors = match cors_origin {
        Some(origin) => CorsLayer::new()
            .allow_origin(
                origin
                    .parse::<axum::http::HeaderValue>()
                    .with_context(|| format!("Invalid CORS origin: {}", origin))?,
            )
            .allow_methods(Any)
            .allow_headers(Any),
        None => CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any),
    };

    let app = Router::new()
        // Health check endpoint
        .route("/health", get(health::health_check))
        // API v1 routes
        .nest("/api/v1", api_v1_routes())
        .layer(ServiceBuilder::new().layer(cors))
        .with_state(state);

    Ok(app)
}

fn api_v1_routes() -> Router<AppState> {
    Router::new()
        // Division routes
        .route(
            "/divisions",
            get(divisions::list_divisions).post(divisions::create_division),
        )
        .route("/divisions/search", get(divisions::search_divisions))
        .route(
            "/divisions/:id",
            get(divisions::get_division)
                .put(divisions::update_division)
                .delete(divisions::delete_division),
        )
        .route("/divisions/:id/counts", get(divisions::get_division_counts))
        .route(
            "/divisions/:id/reports/count",
            get(divisions::count_division_reports),
        )
        // Goal routes
        .route("/goals", get(goals::list_goals).post(goals::create_goal))
        .route("/goals/division/:division_id", get(goals::list_division_goals))
        .route(
            "/goals/division/:division_id/deadline",
            get(goals::list_division_goals_by_deadline),
        )
        .route(
            "/goals/division/:division_id/count",
            get(goals::count_division_goals),
        )
        .route("/goals/overdue", get(goals::list_overdue_goals))
        .route("/goals/completed", get(goals::list_completed_goals))
        .route("/goals/search", get(goals::search_goals))
        .route("/goals/deadline", get(goals::list_goals_by_deadline))
        .route(
            "/goals/:id",
            get(goals::get_goal)
                .put(goals::update_goal)
                .delete(goals::delete_goal),
        )
        // User routes
        .route("/users", get(users::list_users).post(users::create_user))
        .route("/users/search", get(users::search_users))
        .route("/users/email/:email", get(users::get_user_by_email))
        .route("/users/role/:role", get(users::list_users_by_role))
        .route("/users/division/:division_id", get(users::list_division_users))
        .route(
            "/users/division/:division_id/role/:role",
            get(users::list_division_users_by_role),
        )
        .route(
            "/users/division/:division_id/count",
            get(users::count_division_users),
        )
        .route(
            "/users/:id",
            get(users::get_user)
                .put(users::update_user)
                .delete(users::delete_user),
        )
        // Task routes
        .route("/tasks", get(tasks::list_tasks).post(tasks::create_task))
        .route(
            "/tasks/import",
            post(tasks::import_tasks).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .route("/tasks/goal/:goal_id", get(tasks::list_goal_tasks))
        .route(
            "/tasks/goal/:goal_id/status/:status",
            get(tasks::list_goal_tasks_by_status),
        )
        .route("/tasks/goal/:goal_id/count", get(tasks::count_goal_tasks))
        .route("/tasks/user/:user_id", get(tasks::list_user_tasks))
        .route(
            "/tasks/user/:user_id/status/:status",
            get(tasks::list_user_tasks_by_status),
        )
        .route("/tasks/user/:user_id/count", get(tasks::count_user_tasks))
        .route("/tasks/status/:status", get(tasks::list_tasks_by_status))
        .route("/tasks/overdue", get(tasks::list_overdue_tasks))
        .route("/tasks/search", get(tasks::search_tasks))
        .route("/tasks/date-range", get(tasks::list_tasks_by_end_date))
        .route(
            "/tasks/:id",
            get(tasks::get_task)
                .put(tasks::update_task)
                .delete(tasks::delete_task),
        )
        // Report routes
        .route(
            "/reports",
            get(reports::list_reports).post(reports::create_report),
        )
        .route("/reports/latest", get(reports::list_latest_reports))
        .route("/reports/search", get(reports::search_reports))
        .route("/reports/date/:date", get(reports::list_reports_by_date))
        .route("/reports/date-range", get(reports::list_reports_by_date_range))
        .route("/reports/user/:user_id", get(reports::list_user_reports))
        .route("/reports/user/:user_id/count", get(reports::count_user_reports))
        .route(
            "/reports/user/:user_id/division/:division_id",
            get(reports::list_user_division_reports),
        )
        .route(
            "/reports/division/:division_id",
            get(reports::list_division_reports),
        )
        .route(
            "/reports/division/:division_id/date-range",
            get(reports::list_division_reports_by_date_range),
        )
        .route(
            "/reports/:id",
            get(reports::get_report)
                .put(reports::update_report)
                .delete(reports::delete_report),
        )
        // Task report routes
        .route(
            "/task-reports",
            get(task_reports::list_task_reports).post(task_reports::create_task_report),
        )
        .route("/task-reports/search", get(task_reports::search_task_reports))
        .route(
            "/task-reports/progress/:min_progress",
            get(task_reports::list_by_min_progress),
        )
        .route("/task-reports/task/:task_id", get(task_reports::list_by_task))
        .route(
            "/task-reports/task/:task_id/count",
            get(task_reports::count_by_task),
        )
        .route(
            "/task-reports/task/:task_id/average-progress",
            get(task_reports::average_progress_by_task),
        )
        .route(
            "/task-reports/task/:task_id/report/:report_id",
            get(task_reports::list_by_task_and_report),
        )
        .route("/task-reports/report/:report_id", get(task_reports::list_by_report))
        .route(
            "/task-reports/report/:report_id/count",
            get(task_reports::count_by_report),
        )
        .route(
            "/task-reports/:id",
            get(task_reports::get_task_report)
                .put(task_reports::update_task_report)
                .delete(task_reports::delete_task_report),
        )
}

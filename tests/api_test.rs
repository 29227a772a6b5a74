//! API integration tests
//!
//! Tests for the REST endpoints, including the multipart task import

use anyhow::Result;
use axum::http::StatusCode;
use axum_test::multipart::{MultipartForm, Part};
use axum_test::TestServer;
use bank_analytics::database::setup_database;
use bank_analytics::server::app::create_app;
use chrono::{Duration, Local};
use rust_xlsxwriter::Workbook;
use sea_orm::Database;
use serde_json::{json, Value};
use tempfile::NamedTempFile;

/// Create a test server backed by a temporary database file
async fn setup_test_server() -> Result<(TestServer, NamedTempFile)> {
    let temp_file = NamedTempFile::new()?;
    let db_url = format!("sqlite://{}?mode=rwc", temp_file.path().display());

    let db = Database::connect(&db_url).await?;
    setup_database(&db).await?;

    let app = create_app(db, Some("*")).await?;
    let server = TestServer::new(app)?;

    Ok((server, temp_file))
}

async fn create_division(server: &TestServer, name: &str) -> i64 {
    let response = server
        .post("/api/v1/divisions")
        .json(&json!({ "name": name, "blocks": ["Treasury"] }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    response.json::<Value>()["id"].as_i64().unwrap()
}

async fn create_goal(server: &TestServer, division_id: i64, title: &str) -> i64 {
    let deadline = Local::now().date_naive() + Duration::days(90);
    let response = server
        .post("/api/v1/goals")
        .json(&json!({
            "title": title,
            "deadline": deadline.to_string(),
            "divisionId": division_id,
            "targetValue": 100
        }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    response.json::<Value>()["id"].as_i64().unwrap()
}

#[tokio::test]
async fn test_health_endpoint() -> Result<()> {
    let (server, _temp_file) = setup_test_server().await?;

    let response = server.get("/health").await;

    assert_eq!(response.status_code(), StatusCode::OK);

    let body: Value = response.json();
    assert_eq!(body["service"], "bank-analytics");
    assert_eq!(body["status"], "healthy");
    assert!(body["version"].is_string());

    Ok(())
}

#[tokio::test]
async fn test_divisions_crud_api() -> Result<()> {
    let (server, _temp_file) = setup_test_server().await?;

    let division_id = create_division(&server, "Finance Department").await;

    let response = server.get("/api/v1/divisions").await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let divisions: Vec<Value> = response.json();
    assert_eq!(divisions.len(), 1);
    assert_eq!(divisions[0]["name"], "Finance Department");

    let response = server
        .get("/api/v1/divisions/search")
        .add_query_param("name", "Finance")
        .await;
    let found: Vec<Value> = response.json();
    assert_eq!(found.len(), 1);

    let response = server
        .put(&format!("/api/v1/divisions/{}", division_id))
        .json(&json!({ "name": "Finance", "blocks": [] }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.json::<Value>()["name"], "Finance");

    let response = server
        .delete(&format!("/api/v1/divisions/{}", division_id))
        .await;
    assert_eq!(response.status_code(), StatusCode::NO_CONTENT);

    let response = server
        .get(&format!("/api/v1/divisions/{}", division_id))
        .await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    assert_eq!(response.json::<Value>()["error"], "NOT_FOUND");

    Ok(())
}

#[tokio::test]
async fn test_division_with_goals_cannot_be_deleted() -> Result<()> {
    let (server, _temp_file) = setup_test_server().await?;
    let division_id = create_division(&server, "Risk").await;
    create_goal(&server, division_id, "Lower exposure").await;

    let response = server
        .delete(&format!("/api/v1/divisions/{}", division_id))
        .await;
    assert_eq!(response.status_code(), StatusCode::CONFLICT);

    let response = server
        .get(&format!("/api/v1/divisions/{}/counts", division_id))
        .await;
    let counts: Value = response.json();
    assert_eq!(counts["goalCount"], 1);
    assert_eq!(counts["userCount"], 0);

    Ok(())
}

#[tokio::test]
async fn test_goal_deadline_in_past_rejected() -> Result<()> {
    let (server, _temp_file) = setup_test_server().await?;
    let division_id = create_division(&server, "Finance").await;

    let response = server
        .post("/api/v1/goals")
        .json(&json!({
            "title": "Too late",
            "deadline": "2001-01-01",
            "divisionId": division_id
        }))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"], "VALIDATION_FAILED");
    assert_eq!(body["message"], "Goal deadline cannot be in the past");

    Ok(())
}

#[tokio::test]
async fn test_tasks_api_updates_goal_progress() -> Result<()> {
    let (server, _temp_file) = setup_test_server().await?;
    let division_id = create_division(&server, "Finance").await;
    let goal_id = create_goal(&server, division_id, "Grow deposits").await;

    for progress in [30, 61] {
        let response = server
            .post("/api/v1/tasks")
            .json(&json!({
                "title": format!("Task at {}", progress),
                "progress": progress,
                "goalId": goal_id,
                "status": "IN_PROGRESS"
            }))
            .await;
        assert_eq!(response.status_code(), StatusCode::OK);
    }

    let response = server.get(&format!("/api/v1/goals/{}", goal_id)).await;
    assert_eq!(response.json::<Value>()["progress"], 45);

    let response = server.get(&format!("/api/v1/tasks/goal/{}", goal_id)).await;
    assert_eq!(response.json::<Vec<Value>>().len(), 2);

    let response = server.get("/api/v1/tasks/status/in_progress").await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.json::<Vec<Value>>().len(), 2);

    let response = server.get("/api/v1/tasks/status/DONE").await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);

    let response = server
        .post("/api/v1/tasks")
        .json(&json!({
            "title": "Backwards",
            "goalId": goal_id,
            "startDate": "2024-05-01",
            "endDate": "2024-04-01"
        }))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(
        response.json::<Value>()["message"],
        "Start date cannot be after end date"
    );

    Ok(())
}

#[tokio::test]
async fn test_users_api_hides_password() -> Result<()> {
    let (server, _temp_file) = setup_test_server().await?;
    let division_id = create_division(&server, "Finance").await;

    let payload = json!({
        "name": "Anna",
        "email": "anna@bank.com",
        "password": "secret",
        "role": "ADMIN",
        "divisionId": division_id,
        "block": "Treasury"
    });
    let response = server.post("/api/v1/users").json(&payload).await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let user: Value = response.json();
    assert!(user.get("passwordHash").is_none());
    assert_eq!(user["role"], "ADMIN");

    let response = server.post("/api/v1/users").json(&payload).await;
    assert_eq!(response.status_code(), StatusCode::CONFLICT);

    let response = server
        .get(&format!("/api/v1/users/division/{}", division_id))
        .await;
    assert_eq!(response.json::<Vec<Value>>().len(), 1);

    let response = server.get("/api/v1/users").add_query_param("role", "employee").await;
    assert!(response.json::<Vec<Value>>().is_empty());

    Ok(())
}

#[tokio::test]
async fn test_import_endpoint() -> Result<()> {
    let (server, _temp_file) = setup_test_server().await?;

    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.write_string(0, 0, "№")?;
    sheet.write_string(1, 0, "1")?;
    sheet.write_string(1, 1, "Finance")?;
    sheet.write_string(1, 2, "Q1")?;
    sheet.write_string(1, 3, "Call clients")?;
    sheet.write_string(2, 0, "2")?;
    sheet.write_string(2, 1, "Finance")?;
    sheet.write_string(2, 3, "No initiative")?;
    let bytes = workbook.save_to_buffer()?;

    let form = MultipartForm::new().add_part(
        "file",
        Part::bytes(bytes)
            .file_name("tasks.xlsx")
            .mime_type("application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"),
    );
    let response = server.post("/api/v1/tasks/import").multipart(form).await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let result: Value = response.json();
    assert_eq!(result["totalRows"], 2);
    assert_eq!(result["successCount"], 1);
    assert_eq!(result["errorCount"], 1);
    assert_eq!(result["errors"][0], "Row 3 (№2): empty initiative name");

    let response = server.get("/api/v1/tasks").await;
    assert_eq!(response.json::<Vec<Value>>().len(), 1);

    Ok(())
}

#[tokio::test]
async fn test_import_unreadable_file_still_ok() -> Result<()> {
    let (server, _temp_file) = setup_test_server().await?;

    let form = MultipartForm::new().add_part("file", Part::bytes(b"garbage".to_vec()).file_name("x.xlsx"));
    let response = server.post("/api/v1/tasks/import").multipart(form).await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let result: Value = response.json();
    assert_eq!(result["errorCount"], 1);
    assert!(result["errors"][0]
        .as_str()
        .unwrap()
        .starts_with("Failed to read file"));

    Ok(())
}

#[tokio::test]
async fn test_import_without_file_part() -> Result<()> {
    let (server, _temp_file) = setup_test_server().await?;

    let form = MultipartForm::new().add_text("comment", "no workbook here");
    let response = server.post("/api/v1/tasks/import").multipart(form).await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);

    Ok(())
}

#[tokio::test]
async fn test_reports_and_task_reports_api() -> Result<()> {
    let (server, _temp_file) = setup_test_server().await?;
    let division_id = create_division(&server, "Finance").await;
    let goal_id = create_goal(&server, division_id, "Grow deposits").await;

    let response = server
        .post("/api/v1/tasks")
        .json(&json!({ "title": "Call clients", "goalId": goal_id }))
        .await;
    let task_id = response.json::<Value>()["id"].as_i64().unwrap();

    let response = server
        .post("/api/v1/reports")
        .json(&json!({ "title": "Weekly status", "divisionId": division_id }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let report: Value = response.json();
    assert_eq!(report["reportDate"], Local::now().date_naive().to_string());
    let report_id = report["id"].as_i64().unwrap();

    let response = server
        .post("/api/v1/task-reports")
        .json(&json!({ "taskId": task_id, "reportId": report_id, "progress": 120 }))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(
        response.json::<Value>()["message"],
        "Progress must be between 0 and 100"
    );

    for (progress, notes) in [("40", "Half the list called"), ("55.5", "Follow-ups booked")] {
        let response = server
            .post("/api/v1/task-reports")
            .json(&json!({
                "taskId": task_id,
                "reportId": report_id,
                "progress": progress,
                "notes": notes
            }))
            .await;
        assert_eq!(response.status_code(), StatusCode::OK);
    }

    let response = server
        .get(&format!("/api/v1/task-reports/task/{}/average-progress", task_id))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let average: f64 = response.json::<Value>().as_str().unwrap().parse()?;
    assert_eq!(average, 47.75);

    let response = server.get("/api/v1/task-reports/progress/50").await;
    assert_eq!(response.json::<Vec<Value>>().len(), 1);

    let response = server.get("/api/v1/task-reports/progress/lots").await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);

    let response = server
        .get("/api/v1/task-reports/search")
        .add_query_param("keyword", "booked")
        .await;
    assert_eq!(response.json::<Vec<Value>>().len(), 1);

    let response = server
        .get(&format!("/api/v1/task-reports/report/{}/count", report_id))
        .await;
    assert_eq!(response.json::<Value>(), json!(2));

    let response = server
        .get(&format!("/api/v1/divisions/{}/reports/count", division_id))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.json::<Value>(), json!(1));

    let response = server.get("/api/v1/divisions/999/reports/count").await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);

    let response = server
        .get("/api/v1/reports/date-range")
        .add_query_param("start", "2024-01-01")
        .add_query_param("end", "2023-01-01")
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);

    // Deleting the report removes its task entries
    let response = server.delete(&format!("/api/v1/reports/{}", report_id)).await;
    assert_eq!(response.status_code(), StatusCode::NO_CONTENT);
    let response = server
        .get(&format!("/api/v1/task-reports/task/{}/count", task_id))
        .await;
    assert_eq!(response.json::<Value>(), json!(0));

    Ok(())
}

#[tokio::test]
async fn test_user_lookup_endpoints() -> Result<()> {
    let (server, _temp_file) = setup_test_server().await?;
    let division_id = create_division(&server, "Finance").await;

    for (name, email, role) in [
        ("Anna Petrova", "anna@bank.com", "ADMIN"),
        ("Boris Ivanov", "boris@bank.com", "EMPLOYEE"),
    ] {
        let response = server
            .post("/api/v1/users")
            .json(&json!({
                "name": name,
                "email": email,
                "password": "secret",
                "role": role,
                "divisionId": division_id
            }))
            .await;
        assert_eq!(response.status_code(), StatusCode::OK);
    }

    let response = server.get("/api/v1/users/email/boris@bank.com").await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.json::<Value>()["name"], "Boris Ivanov");

    let response = server.get("/api/v1/users/email/nobody@bank.com").await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    assert_eq!(response.json::<Value>()["error"], "NOT_FOUND");

    let response = server
        .get("/api/v1/users/search")
        .add_query_param("name", "Petrova")
        .await;
    assert_eq!(response.json::<Vec<Value>>().len(), 1);

    let response = server
        .get(&format!("/api/v1/users/division/{}/role/employee", division_id))
        .await;
    let employees: Vec<Value> = response.json();
    assert_eq!(employees.len(), 1);
    assert_eq!(employees[0]["email"], "boris@bank.com");

    let response = server
        .get(&format!("/api/v1/users/division/{}/count", division_id))
        .await;
    assert_eq!(response.json::<Value>(), json!(2));

    let response = server.get("/api/v1/users/role/auditor").await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);

    Ok(())
}

#[tokio::test]
async fn test_goal_and_task_queries() -> Result<()> {
    let (server, _temp_file) = setup_test_server().await?;
    let division_id = create_division(&server, "Finance").await;
    let goal_id = create_goal(&server, division_id, "Grow deposits").await;

    let deadline = Local::now().date_naive() + Duration::days(30);
    let response = server
        .post("/api/v1/goals")
        .json(&json!({
            "title": "Open branches",
            "deadline": deadline.to_string(),
            "divisionId": division_id,
            "targetValue": 3,
            "currentValue": 3
        }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let response = server.get("/api/v1/goals/completed").await;
    let completed: Vec<Value> = response.json();
    assert_eq!(completed.len(), 1);
    assert_eq!(completed[0]["title"], "Open branches");

    // Past deadlines are rejected on create, so nothing can be overdue yet
    let response = server.get("/api/v1/goals/overdue").await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert!(response.json::<Vec<Value>>().is_empty());

    let response = server
        .get(&format!("/api/v1/goals/division/{}/count", division_id))
        .await;
    assert_eq!(response.json::<Value>(), json!(2));

    for (title, status) in [("Call clients", "IN_PROGRESS"), ("Print flyers", "COMPLETED")] {
        let response = server
            .post("/api/v1/tasks")
            .json(&json!({
                "title": title,
                "goalId": goal_id,
                "status": status,
                "endDate": "2031-06-30"
            }))
            .await;
        assert_eq!(response.status_code(), StatusCode::OK);
    }

    let response = server
        .get(&format!("/api/v1/tasks/goal/{}/status/completed", goal_id))
        .await;
    let done: Vec<Value> = response.json();
    assert_eq!(done.len(), 1);
    assert_eq!(done[0]["title"], "Print flyers");

    let response = server
        .get(&format!("/api/v1/tasks/goal/{}/count", goal_id))
        .await;
    assert_eq!(response.json::<Value>(), json!(2));

    let response = server
        .get("/api/v1/tasks/search")
        .add_query_param("keyword", "flyers")
        .await;
    assert_eq!(response.json::<Vec<Value>>().len(), 1);

    let response = server
        .get("/api/v1/tasks/date-range")
        .add_query_param("start", "2031-06-01")
        .add_query_param("end", "2031-06-30")
        .await;
    assert_eq!(response.json::<Vec<Value>>().len(), 2);

    Ok(())
}

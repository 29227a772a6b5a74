//! Database functionality tests
//!
//! Tests for database migrations, referential actions, and seeding

use anyhow::Result;
use bank_analytics::database::entities::*;
use bank_analytics::database::{seed_data, setup_database};
use bank_analytics::server::{migrate_database, MigrateDirection};
use chrono::{NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Database, DatabaseConnection, EntityTrait, ModelTrait,
    PaginatorTrait, QueryFilter, Set,
};
use tempfile::NamedTempFile;

/// Create a test database connection with migrations
async fn setup_test_db() -> Result<(DatabaseConnection, NamedTempFile)> {
    let temp_file = NamedTempFile::new()?;
    let db_url = format!("sqlite://{}?mode=rwc", temp_file.path().display());

    let db = Database::connect(&db_url).await?;
    setup_database(&db).await?;

    Ok((db, temp_file))
}

async fn insert_division(db: &DatabaseConnection, name: &str) -> Result<divisions::Model> {
    let now = Utc::now();
    let division = divisions::ActiveModel {
        name: Set(name.to_string()),
        blocks: Set("[]".to_string()),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    Ok(division.insert(db).await?)
}

async fn insert_goal(db: &DatabaseConnection, division_id: i32) -> Result<goals::Model> {
    let now = Utc::now();
    let goal = goals::ActiveModel {
        title: Set("Grow deposits".to_string()),
        deadline: Set(NaiveDate::from_ymd_opt(2030, 1, 1).unwrap()),
        progress: Set(0),
        division_id: Set(division_id),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    Ok(goal.insert(db).await?)
}

async fn insert_task(db: &DatabaseConnection, goal_id: i32, user_id: Option<i32>) -> Result<tasks::Model> {
    let now = Utc::now();
    let task = tasks::ActiveModel {
        title: Set("Call clients".to_string()),
        status: Set(TaskStatus::NotStarted.as_str().to_string()),
        goal_id: Set(goal_id),
        user_id: Set(user_id),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    Ok(task.insert(db).await?)
}

async fn insert_report(db: &DatabaseConnection, user_id: Option<i32>) -> Result<reports::Model> {
    let now = Utc::now();
    let report = reports::ActiveModel {
        title: Set("Weekly status".to_string()),
        report_date: Set(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()),
        user_id: Set(user_id),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    Ok(report.insert(db).await?)
}

#[tokio::test]
async fn test_database_migrations() -> Result<()> {
    let (db, _temp_file) = setup_test_db().await?;

    // Verify all tables exist by attempting to query them
    assert_eq!(divisions::Entity::find().all(&db).await?.len(), 0);
    assert_eq!(goals::Entity::find().all(&db).await?.len(), 0);
    assert_eq!(users::Entity::find().all(&db).await?.len(), 0);
    assert_eq!(tasks::Entity::find().all(&db).await?.len(), 0);
    assert_eq!(reports::Entity::find().all(&db).await?.len(), 0);
    assert_eq!(task_reports::Entity::find().all(&db).await?.len(), 0);

    Ok(())
}

#[tokio::test]
async fn test_migrate_fresh_on_file() -> Result<()> {
    let temp_file = NamedTempFile::new()?;
    let path = temp_file.path().display().to_string();

    migrate_database(&path, MigrateDirection::Up).await?;
    migrate_database(&path, MigrateDirection::Fresh).await?;

    let db = Database::connect(format!("sqlite://{}?mode=rwc", path)).await?;
    assert_eq!(divisions::Entity::find().count(&db).await?, 0);

    Ok(())
}

#[tokio::test]
async fn test_goal_delete_cascades_to_tasks() -> Result<()> {
    let (db, _temp_file) = setup_test_db().await?;

    let division = insert_division(&db, "Finance").await?;
    let goal = insert_goal(&db, division.id).await?;
    insert_task(&db, goal.id, None).await?;
    insert_task(&db, goal.id, None).await?;

    let goal_id = goal.id;
    goal.delete(&db).await?;

    let remaining = tasks::Entity::find()
        .filter(tasks::Column::GoalId.eq(goal_id))
        .count(&db)
        .await?;
    assert_eq!(remaining, 0);

    Ok(())
}

#[tokio::test]
async fn test_division_with_goals_is_restricted() -> Result<()> {
    let (db, _temp_file) = setup_test_db().await?;

    let division = insert_division(&db, "Finance").await?;
    insert_goal(&db, division.id).await?;

    assert!(division.delete(&db).await.is_err());

    Ok(())
}

#[tokio::test]
async fn test_user_delete_unassigns_tasks() -> Result<()> {
    let (db, _temp_file) = setup_test_db().await?;

    let division = insert_division(&db, "Finance").await?;
    let goal = insert_goal(&db, division.id).await?;

    let now = Utc::now();
    let user = users::ActiveModel {
        name: Set("Anna".to_string()),
        email: Set("anna@bank.com".to_string()),
        password_hash: Set("hash".to_string()),
        role: Set(UserRole::Employee.as_str().to_string()),
        division_id: Set(Some(division.id)),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&db)
    .await?;

    let task = insert_task(&db, goal.id, Some(user.id)).await?;
    user.delete(&db).await?;

    let task = tasks::Entity::find_by_id(task.id).one(&db).await?.unwrap();
    assert_eq!(task.user_id, None);

    Ok(())
}

#[tokio::test]
async fn test_duplicate_email_rejected_by_schema() -> Result<()> {
    let (db, _temp_file) = setup_test_db().await?;

    let now = Utc::now();
    let user = |email: &str| users::ActiveModel {
        name: Set("Anna".to_string()),
        email: Set(email.to_string()),
        password_hash: Set("hash".to_string()),
        role: Set(UserRole::Employee.as_str().to_string()),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    user("anna@bank.com").insert(&db).await?;
    assert!(user("anna@bank.com").insert(&db).await.is_err());

    Ok(())
}

#[tokio::test]
async fn test_seed_defaults_twice() -> Result<()> {
    let (db, _temp_file) = setup_test_db().await?;

    seed_data::seed_defaults(&db).await?;
    seed_data::seed_defaults(&db).await?;

    let divisions = divisions::Entity::find().all(&db).await?;
    assert_eq!(divisions.len(), 1);
    assert_eq!(divisions[0].name, seed_data::HEAD_OFFICE);
    assert_eq!(users::Entity::find().count(&db).await?, 2);

    let admin = users::Entity::find()
        .filter(users::Column::Email.eq("admin@bank.com"))
        .one(&db)
        .await?
        .unwrap();
    assert_eq!(admin.role, "ADMIN");
    assert_eq!(admin.division_id, Some(divisions[0].id));

    Ok(())
}

#[tokio::test]
async fn test_task_delete_cascades_to_task_reports() -> Result<()> {
    let (db, _temp_file) = setup_test_db().await?;

    let division = insert_division(&db, "Finance").await?;
    let goal = insert_goal(&db, division.id).await?;
    let task = insert_task(&db, goal.id, None).await?;
    let report = insert_report(&db, None).await?;

    let now = Utc::now();
    task_reports::ActiveModel {
        task_id: Set(task.id),
        report_id: Set(report.id),
        progress: Set(Some(rust_decimal::Decimal::new(4550, 2))),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&db)
    .await?;
    assert_eq!(task_reports::Entity::find().count(&db).await?, 1);

    task.delete(&db).await?;

    assert_eq!(task_reports::Entity::find().count(&db).await?, 0);
    assert_eq!(reports::Entity::find().count(&db).await?, 1);

    Ok(())
}

#[tokio::test]
async fn test_user_delete_keeps_reports() -> Result<()> {
    let (db, _temp_file) = setup_test_db().await?;

    let now = Utc::now();
    let user = users::ActiveModel {
        name: Set("Anna".to_string()),
        email: Set("anna@bank.com".to_string()),
        password_hash: Set("hash".to_string()),
        role: Set(UserRole::Employee.as_str().to_string()),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&db)
    .await?;

    let report = insert_report(&db, Some(user.id)).await?;
    user.delete(&db).await?;

    let report = reports::Entity::find_by_id(report.id).one(&db).await?.unwrap();
    assert_eq!(report.user_id, None);

    Ok(())
}

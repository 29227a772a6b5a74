use async_trait::async_trait;
use chrono::{Local, NaiveDate, Utc};
use sea_orm::sea_query::Condition;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use serde::Deserialize;
use tracing::{debug, info};

use crate::database::entities::{goals, tasks, TaskStatus};
use crate::errors::{ServiceError, ServiceResult};
use crate::services::task_import::TaskCreator;

/// Everything needed to create or replace a task
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTask {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub expected_result: Option<String>,
    #[serde(default)]
    pub actual_result: Option<String>,
    #[serde(default)]
    pub impact: Option<String>,
    #[serde(default)]
    pub progress: Option<i32>,
    /// Unset means NOT_STARTED
    #[serde(default)]
    pub status: Option<TaskStatus>,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    pub goal_id: i32,
    #[serde(default)]
    pub user_id: Option<i32>,
}

impl NewTask {
    fn validate(&self) -> ServiceResult<()> {
        if self.title.trim().is_empty() {
            return Err(ServiceError::Validation("Task title is required".to_string()));
        }
        if let (Some(start), Some(end)) = (self.start_date, self.end_date) {
            if start > end {
                return Err(ServiceError::Validation(
                    "Start date cannot be after end date".to_string(),
                ));
            }
        }
        Ok(())
    }

    fn apply(self, mut task: tasks::ActiveModel) -> tasks::ActiveModel {
        task.title = Set(self.title);
        task.description = Set(self.description);
        task.expected_result = Set(self.expected_result);
        task.actual_result = Set(self.actual_result);
        task.impact = Set(self.impact);
        task.progress = Set(self.progress);
        task.status = Set(self.status.unwrap_or_default().to_string());
        task.start_date = Set(self.start_date);
        task.end_date = Set(self.end_date);
        task.goal_id = Set(self.goal_id);
        task.user_id = Set(self.user_id);
        task.updated_at = Set(Utc::now());
        task
    }
}

#[derive(Clone)]
pub struct TaskService {
    db: DatabaseConnection,
}

impl TaskService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn list(&self) -> ServiceResult<Vec<tasks::Model>> {
        debug!("Fetching all tasks");
        let tasks = tasks::Entity::find()
            .order_by_asc(tasks::Column::Id)
            .all(&self.db)
            .await?;
        Ok(tasks)
    }

    pub async fn get(&self, id: i32) -> ServiceResult<tasks::Model> {
        tasks::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("Task", id))
    }

    pub async fn list_by_goal(&self, goal_id: i32) -> ServiceResult<Vec<tasks::Model>> {
        debug!("Fetching tasks for goal: {}", goal_id);
        let tasks = tasks::Entity::find()
            .filter(tasks::Column::GoalId.eq(goal_id))
            .order_by_asc(tasks::Column::Id)
            .all(&self.db)
            .await?;
        Ok(tasks)
    }

    pub async fn list_by_user(&self, user_id: i32) -> ServiceResult<Vec<tasks::Model>> {
        debug!("Fetching tasks for user: {}", user_id);
        let tasks = tasks::Entity::find()
            .filter(tasks::Column::UserId.eq(user_id))
            .order_by_asc(tasks::Column::Id)
            .all(&self.db)
            .await?;
        Ok(tasks)
    }

    pub async fn list_by_status(&self, status: TaskStatus) -> ServiceResult<Vec<tasks::Model>> {
        debug!("Fetching tasks by status: {}", status);
        let tasks = tasks::Entity::find()
            .filter(tasks::Column::Status.eq(status.as_str()))
            .order_by_asc(tasks::Column::Id)
            .all(&self.db)
            .await?;
        Ok(tasks)
    }

    /// Open tasks whose end date lies before `today`
    pub async fn list_overdue(&self, today: NaiveDate) -> ServiceResult<Vec<tasks::Model>> {
        debug!("Fetching tasks overdue as of {}", today);
        let closed: Vec<&str> = TaskStatus::ALL
            .iter()
            .filter(|status| status.is_closed())
            .map(|status| status.as_str())
            .collect();

        let tasks = tasks::Entity::find()
            .filter(tasks::Column::EndDate.lt(today))
            .filter(tasks::Column::Status.is_not_in(closed))
            .order_by_asc(tasks::Column::EndDate)
            .all(&self.db)
            .await?;
        Ok(tasks)
    }

    pub async fn count_by_goal(&self, goal_id: i32) -> ServiceResult<u64> {
        let count = tasks::Entity::find()
            .filter(tasks::Column::GoalId.eq(goal_id))
            .count(&self.db)
            .await?;
        Ok(count)
    }

    pub async fn list_by_goal_and_status(
        &self,
        goal_id: i32,
        status: TaskStatus,
    ) -> ServiceResult<Vec<tasks::Model>> {
        debug!("Fetching tasks for goal {} with status {}", goal_id, status);
        let tasks = tasks::Entity::find()
            .filter(tasks::Column::GoalId.eq(goal_id))
            .filter(tasks::Column::Status.eq(status.as_str()))
            .order_by_asc(tasks::Column::Id)
            .all(&self.db)
            .await?;
        Ok(tasks)
    }

    pub async fn list_by_user_and_status(
        &self,
        user_id: i32,
        status: TaskStatus,
    ) -> ServiceResult<Vec<tasks::Model>> {
        debug!("Fetching tasks for user {} with status {}", user_id, status);
        let tasks = tasks::Entity::find()
            .filter(tasks::Column::UserId.eq(user_id))
            .filter(tasks::Column::Status.eq(status.as_str()))
            .order_by_asc(tasks::Column::Id)
            .all(&self.db)
            .await?;
        Ok(tasks)
    }

    /// Tasks whose end date falls within `start..=end`
    pub async fn list_by_end_date_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> ServiceResult<Vec<tasks::Model>> {
        debug!("Fetching tasks ending between {} and {}", start, end);
        let tasks = tasks::Entity::find()
            .filter(tasks::Column::EndDate.between(start, end))
            .order_by_asc(tasks::Column::EndDate)
            .all(&self.db)
            .await?;
        Ok(tasks)
    }

    /// Keyword match over title and description
    pub async fn search(&self, keyword: &str) -> ServiceResult<Vec<tasks::Model>> {
        debug!("Searching tasks by keyword: {}", keyword);
        let tasks = tasks::Entity::find()
            .filter(
                Condition::any()
                    .add(tasks::Column::Title.contains(keyword))
                    .add(tasks::Column::Description.contains(keyword)),
            )
            .order_by_asc(tasks::Column::Id)
            .all(&self.db)
            .await?;
        Ok(tasks)
    }

    pub async fn count_by_user(&self, user_id: i32) -> ServiceResult<u64> {
        let count = tasks::Entity::find()
            .filter(tasks::Column::UserId.eq(user_id))
            .count(&self.db)
            .await?;
        Ok(count)
    }

    pub async fn create(&self, input: NewTask) -> ServiceResult<tasks::Model> {
        input.validate()?;
        info!("Creating new task: {}", input.title);
        self.ensure_goal(input.goal_id).await?;

        let task = input
            .apply(tasks::ActiveModel {
                created_at: Set(Utc::now()),
                ..Default::default()
            })
            .insert(&self.db)
            .await?;

        self.refresh_goal_progress(task.goal_id).await?;
        Ok(task)
    }

    pub async fn update(&self, id: i32, input: NewTask) -> ServiceResult<tasks::Model> {
        input.validate()?;
        info!("Updating task with id: {}", id);

        let existing = self.get(id).await?;
        let previous_goal = existing.goal_id;
        self.ensure_goal(input.goal_id).await?;

        let task = input.apply(existing.into()).update(&self.db).await?;

        self.refresh_goal_progress(task.goal_id).await?;
        if previous_goal != task.goal_id {
            self.refresh_goal_progress(previous_goal).await?;
        }
        Ok(task)
    }

    pub async fn delete(&self, id: i32) -> ServiceResult<()> {
        info!("Deleting task with id: {}", id);
        let task = self.get(id).await?;

        tasks::Entity::delete_by_id(id).exec(&self.db).await?;
        self.refresh_goal_progress(task.goal_id).await
    }

    /// Goal progress is the mean of its tasks' progress, a missing value counting
    /// as 0, truncated toward zero. A goal left without tasks drops back to 0.
    async fn refresh_goal_progress(&self, goal_id: i32) -> ServiceResult<()> {
        let tasks = self.list_by_goal(goal_id).await?;
        let progress = average_progress(&tasks);

        let Some(goal) = goals::Entity::find_by_id(goal_id).one(&self.db).await? else {
            return Ok(());
        };

        let mut goal: goals::ActiveModel = goal.into();
        goal.progress = Set(progress);
        goal.set_updated_at().update(&self.db).await?;
        info!("Updated goal {} progress to {}%", goal_id, progress);
        Ok(())
    }

    async fn ensure_goal(&self, goal_id: i32) -> ServiceResult<()> {
        goals::Entity::find_by_id(goal_id)
            .one(&self.db)
            .await?
            .map(|_| ())
            .ok_or_else(|| ServiceError::not_found("Goal", goal_id))
    }
}

fn average_progress(tasks: &[tasks::Model]) -> i32 {
    if tasks.is_empty() {
        return 0;
    }
    let total: i64 = tasks.iter().map(|t| i64::from(t.progress.unwrap_or(0))).sum();
    (total / tasks.len() as i64) as i32
}

/// Today's date in local time
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

#[async_trait]
impl TaskCreator for TaskService {
    async fn create(&self, task: NewTask) -> ServiceResult<tasks::Model> {
        TaskService::create(self, task).await
    }
}

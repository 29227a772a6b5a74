use async_trait::async_trait;
use chrono::{Local, NaiveDate};
use rust_decimal::Decimal;
use sea_orm::sea_query::Condition;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use serde::Deserialize;
use tracing::{debug, info};

use crate::database::entities::{divisions, goals, tasks};
use crate::errors::{ServiceError, ServiceResult};
use crate::services::task_import::GoalStore;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalInput {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub target_value: Option<Decimal>,
    #[serde(default)]
    pub current_value: Option<Decimal>,
    pub deadline: NaiveDate,
    pub division_id: i32,
}

#[derive(Clone)]
pub struct GoalService {
    db: DatabaseConnection,
}

impl GoalService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn list(&self) -> ServiceResult<Vec<goals::Model>> {
        debug!("Fetching all goals");
        let goals = goals::Entity::find()
            .order_by_asc(goals::Column::Id)
            .all(&self.db)
            .await?;
        Ok(goals)
    }

    pub async fn get(&self, id: i32) -> ServiceResult<goals::Model> {
        goals::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("Goal", id))
    }

    pub async fn list_by_division(&self, division_id: i32) -> ServiceResult<Vec<goals::Model>> {
        debug!("Fetching goals for division: {}", division_id);
        let goals = goals::Entity::find()
            .filter(goals::Column::DivisionId.eq(division_id))
            .order_by_asc(goals::Column::Id)
            .all(&self.db)
            .await?;
        Ok(goals)
    }

    /// Goals whose deadline falls within `start..=end`
    pub async fn list_by_deadline_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> ServiceResult<Vec<goals::Model>> {
        debug!("Fetching goals between {} and {}", start, end);
        let goals = goals::Entity::find()
            .filter(goals::Column::Deadline.between(start, end))
            .order_by_asc(goals::Column::Deadline)
            .all(&self.db)
            .await?;
        Ok(goals)
    }

    /// Keyword match over title and description
    pub async fn search(&self, keyword: &str) -> ServiceResult<Vec<goals::Model>> {
        debug!("Searching goals by keyword: {}", keyword);
        let goals = goals::Entity::find()
            .filter(
                Condition::any()
                    .add(goals::Column::Title.contains(keyword))
                    .add(goals::Column::Description.contains(keyword)),
            )
            .order_by_asc(goals::Column::Id)
            .all(&self.db)
            .await?;
        Ok(goals)
    }

    /// Goals of one division whose deadline falls within `start..=end`
    pub async fn list_by_division_and_deadline_range(
        &self,
        division_id: i32,
        start: NaiveDate,
        end: NaiveDate,
    ) -> ServiceResult<Vec<goals::Model>> {
        debug!(
            "Fetching goals for division {} between {} and {}",
            division_id, start, end
        );
        let goals = goals::Entity::find()
            .filter(goals::Column::DivisionId.eq(division_id))
            .filter(goals::Column::Deadline.between(start, end))
            .order_by_asc(goals::Column::Deadline)
            .all(&self.db)
            .await?;
        Ok(goals)
    }

    /// Goals whose current value has reached the target
    pub async fn list_completed(&self) -> ServiceResult<Vec<goals::Model>> {
        debug!("Fetching completed goals");
        let goals = self.list().await?;
        Ok(goals.into_iter().filter(goals::Model::is_completed).collect())
    }

    /// Goals past their deadline with a current value still below the target.
    ///
    /// A goal missing either value is neither completed nor overdue.
    pub async fn list_overdue(&self, today: NaiveDate) -> ServiceResult<Vec<goals::Model>> {
        debug!("Fetching goals overdue as of {}", today);
        let goals = goals::Entity::find()
            .filter(goals::Column::Deadline.lt(today))
            .order_by_asc(goals::Column::Deadline)
            .all(&self.db)
            .await?;

        Ok(goals
            .into_iter()
            .filter(|goal| match (goal.current_value, goal.target_value) {
                (Some(current), Some(target)) => current < target,
                _ => false,
            })
            .collect())
    }

    pub async fn count_by_division(&self, division_id: i32) -> ServiceResult<u64> {
        let count = goals::Entity::find()
            .filter(goals::Column::DivisionId.eq(division_id))
            .count(&self.db)
            .await?;
        Ok(count)
    }

    pub async fn create(&self, input: GoalInput) -> ServiceResult<goals::Model> {
        let title = validate_title(&input.title)?;
        info!("Creating new goal: {}", title);

        if input.deadline < Local::now().date_naive() {
            return Err(ServiceError::Validation(
                "Goal deadline cannot be in the past".to_string(),
            ));
        }
        self.ensure_division(input.division_id).await?;

        let mut goal = goals::ActiveModel::new();
        goal.title = Set(title);
        goal.description = Set(input.description);
        goal.target_value = Set(input.target_value);
        goal.current_value = Set(input.current_value);
        goal.deadline = Set(input.deadline);
        goal.division_id = Set(input.division_id);
        Ok(goal.insert(&self.db).await?)
    }

    /// Replaces the editable fields; progress stays owned by the task service
    pub async fn update(&self, id: i32, input: GoalInput) -> ServiceResult<goals::Model> {
        let title = validate_title(&input.title)?;
        info!("Updating goal with id: {}", id);

        let existing = self.get(id).await?;
        self.ensure_division(input.division_id).await?;

        let mut goal: goals::ActiveModel = existing.into();
        goal.title = Set(title);
        goal.description = Set(input.description);
        goal.target_value = Set(input.target_value);
        goal.current_value = Set(input.current_value);
        goal.deadline = Set(input.deadline);
        goal.division_id = Set(input.division_id);
        Ok(goal.set_updated_at().update(&self.db).await?)
    }

    /// Deletes the goal together with its tasks
    pub async fn delete(&self, id: i32) -> ServiceResult<()> {
        info!("Deleting goal with id: {}", id);
        self.get(id).await?;

        let removed = tasks::Entity::delete_many()
            .filter(tasks::Column::GoalId.eq(id))
            .exec(&self.db)
            .await?;
        debug!("Removed {} tasks of goal {}", removed.rows_affected, id);

        goals::Entity::delete_by_id(id).exec(&self.db).await?;
        Ok(())
    }

    async fn ensure_division(&self, division_id: i32) -> ServiceResult<()> {
        divisions::Entity::find_by_id(division_id)
            .one(&self.db)
            .await?
            .map(|_| ())
            .ok_or_else(|| ServiceError::not_found("Division", division_id))
    }
}

fn validate_title(title: &str) -> ServiceResult<String> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(ServiceError::Validation("Goal title is required".to_string()));
    }
    Ok(trimmed.to_string())
}

#[async_trait]
impl GoalStore for GoalService {
    async fn find_by_division_id(&self, division_id: i32) -> ServiceResult<Vec<goals::Model>> {
        self.list_by_division(division_id).await
    }

    async fn save(&self, goal: goals::ActiveModel) -> ServiceResult<goals::Model> {
        let saved = if goal.id.is_not_set() {
            goal.insert(&self.db).await?
        } else {
            goal.set_updated_at().update(&self.db).await?
        };
        Ok(saved)
    }
}

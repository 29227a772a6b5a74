use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use serde::Deserialize;
use tracing::{debug, info};

use crate::database::entities::{reports, task_reports, tasks};
use crate::errors::{ServiceError, ServiceResult};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskReportInput {
    pub task_id: i32,
    pub report_id: i32,
    #[serde(default)]
    pub progress: Option<Decimal>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl TaskReportInput {
    fn validate(&self) -> ServiceResult<()> {
        if let Some(progress) = self.progress {
            if progress < Decimal::ZERO || progress > Decimal::ONE_HUNDRED {
                return Err(ServiceError::Validation(
                    "Progress must be between 0 and 100".to_string(),
                ));
            }
        }
        Ok(())
    }
}

#[derive(Clone)]
pub struct TaskReportService {
    db: DatabaseConnection,
}

impl TaskReportService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn list(&self) -> ServiceResult<Vec<task_reports::Model>> {
        debug!("Fetching all task reports");
        let entries = task_reports::Entity::find()
            .order_by_asc(task_reports::Column::Id)
            .all(&self.db)
            .await?;
        Ok(entries)
    }

    pub async fn get(&self, id: i32) -> ServiceResult<task_reports::Model> {
        task_reports::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("Task report", id))
    }

    pub async fn list_by_task(&self, task_id: i32) -> ServiceResult<Vec<task_reports::Model>> {
        debug!("Fetching task reports for task: {}", task_id);
        let entries = task_reports::Entity::find()
            .filter(task_reports::Column::TaskId.eq(task_id))
            .order_by_asc(task_reports::Column::Id)
            .all(&self.db)
            .await?;
        Ok(entries)
    }

    pub async fn list_by_report(&self, report_id: i32) -> ServiceResult<Vec<task_reports::Model>> {
        debug!("Fetching task reports for report: {}", report_id);
        let entries = task_reports::Entity::find()
            .filter(task_reports::Column::ReportId.eq(report_id))
            .order_by_asc(task_reports::Column::Id)
            .all(&self.db)
            .await?;
        Ok(entries)
    }

    pub async fn list_by_task_and_report(
        &self,
        task_id: i32,
        report_id: i32,
    ) -> ServiceResult<Vec<task_reports::Model>> {
        debug!("Fetching task reports for task {} and report {}", task_id, report_id);
        let entries = task_reports::Entity::find()
            .filter(task_reports::Column::TaskId.eq(task_id))
            .filter(task_reports::Column::ReportId.eq(report_id))
            .order_by_asc(task_reports::Column::Id)
            .all(&self.db)
            .await?;
        Ok(entries)
    }

    /// Entries with a recorded progress of at least `min_progress`
    pub async fn list_by_min_progress(
        &self,
        min_progress: Decimal,
    ) -> ServiceResult<Vec<task_reports::Model>> {
        debug!("Fetching task reports with min progress: {}", min_progress);
        let entries = task_reports::Entity::find()
            .filter(task_reports::Column::Progress.gte(min_progress))
            .order_by_asc(task_reports::Column::Id)
            .all(&self.db)
            .await?;
        Ok(entries)
    }

    pub async fn search(&self, keyword: &str) -> ServiceResult<Vec<task_reports::Model>> {
        debug!("Searching task reports by keyword: {}", keyword);
        let entries = task_reports::Entity::find()
            .filter(task_reports::Column::Notes.contains(keyword))
            .order_by_asc(task_reports::Column::Id)
            .all(&self.db)
            .await?;
        Ok(entries)
    }

    pub async fn count_by_task(&self, task_id: i32) -> ServiceResult<u64> {
        let count = task_reports::Entity::find()
            .filter(task_reports::Column::TaskId.eq(task_id))
            .count(&self.db)
            .await?;
        Ok(count)
    }

    pub async fn count_by_report(&self, report_id: i32) -> ServiceResult<u64> {
        let count = task_reports::Entity::find()
            .filter(task_reports::Column::ReportId.eq(report_id))
            .count(&self.db)
            .await?;
        Ok(count)
    }

    /// Mean of the task's recorded progress values; entries without progress
    /// are ignored and a task with none averages 0
    pub async fn average_progress_by_task(&self, task_id: i32) -> ServiceResult<Decimal> {
        let entries = self.list_by_task(task_id).await?;
        Ok(average_progress(&entries))
    }

    pub async fn create(&self, input: TaskReportInput) -> ServiceResult<task_reports::Model> {
        input.validate()?;
        info!("Creating new task report for task: {}", input.task_id);
        self.ensure_references(&input).await?;

        let mut entry = task_reports::ActiveModel::new();
        entry.task_id = Set(input.task_id);
        entry.report_id = Set(input.report_id);
        entry.progress = Set(input.progress);
        entry.notes = Set(input.notes);
        Ok(entry.insert(&self.db).await?)
    }

    pub async fn update(
        &self,
        id: i32,
        input: TaskReportInput,
    ) -> ServiceResult<task_reports::Model> {
        input.validate()?;
        info!("Updating task report with id: {}", id);

        let existing = self.get(id).await?;
        self.ensure_references(&input).await?;

        let mut entry: task_reports::ActiveModel = existing.into();
        entry.task_id = Set(input.task_id);
        entry.report_id = Set(input.report_id);
        entry.progress = Set(input.progress);
        entry.notes = Set(input.notes);
        Ok(entry.set_updated_at().update(&self.db).await?)
    }

    pub async fn delete(&self, id: i32) -> ServiceResult<()> {
        info!("Deleting task report with id: {}", id);
        let result = task_reports::Entity::delete_by_id(id).exec(&self.db).await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::not_found("Task report", id));
        }
        Ok(())
    }

    async fn ensure_references(&self, input: &TaskReportInput) -> ServiceResult<()> {
        tasks::Entity::find_by_id(input.task_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("Task", input.task_id))?;
        reports::Entity::find_by_id(input.report_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("Report", input.report_id))?;
        Ok(())
    }
}

fn average_progress(entries: &[task_reports::Model]) -> Decimal {
    let values: Vec<Decimal> = entries.iter().filter_map(|entry| entry.progress).collect();
    if values.is_empty() {
        return Decimal::ZERO;
    }
    let total: Decimal = values.iter().sum();
    (total / Decimal::from(values.len())).round_dp(2)
}

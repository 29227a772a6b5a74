use chrono::{Local, NaiveDate};
use sea_orm::sea_query::Condition;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use serde::Deserialize;
use tracing::{debug, info};

use crate::database::entities::{divisions, reports, users};
use crate::errors::{ServiceError, ServiceResult};

/// Create/update payload. A missing `reportDate` means today on create and
/// keeps the stored date on update.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportInput {
    pub title: String,
    #[serde(default)]
    pub report_date: Option<NaiveDate>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub user_id: Option<i32>,
    #[serde(default)]
    pub division_id: Option<i32>,
}

#[derive(Clone)]
pub struct ReportService {
    db: DatabaseConnection,
}

impl ReportService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn list(&self) -> ServiceResult<Vec<reports::Model>> {
        debug!("Fetching all reports");
        let reports = reports::Entity::find()
            .order_by_asc(reports::Column::Id)
            .all(&self.db)
            .await?;
        Ok(reports)
    }

    pub async fn get(&self, id: i32) -> ServiceResult<reports::Model> {
        reports::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("Report", id))
    }

    pub async fn list_by_user(&self, user_id: i32) -> ServiceResult<Vec<reports::Model>> {
        debug!("Fetching reports for user: {}", user_id);
        self.find(Condition::all().add(reports::Column::UserId.eq(user_id)))
            .await
    }

    pub async fn list_by_division(&self, division_id: i32) -> ServiceResult<Vec<reports::Model>> {
        debug!("Fetching reports for division: {}", division_id);
        self.find(Condition::all().add(reports::Column::DivisionId.eq(division_id)))
            .await
    }

    pub async fn list_by_user_and_division(
        &self,
        user_id: i32,
        division_id: i32,
    ) -> ServiceResult<Vec<reports::Model>> {
        debug!("Fetching reports for user {} and division {}", user_id, division_id);
        self.find(
            Condition::all()
                .add(reports::Column::UserId.eq(user_id))
                .add(reports::Column::DivisionId.eq(division_id)),
        )
        .await
    }

    pub async fn list_by_date(&self, date: NaiveDate) -> ServiceResult<Vec<reports::Model>> {
        debug!("Fetching reports for date: {}", date);
        self.find(Condition::all().add(reports::Column::ReportDate.eq(date)))
            .await
    }

    /// Reports dated within `start..=end`
    pub async fn list_by_date_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> ServiceResult<Vec<reports::Model>> {
        debug!("Fetching reports between {} and {}", start, end);
        self.find(Condition::all().add(reports::Column::ReportDate.between(start, end)))
            .await
    }

    pub async fn list_by_division_and_date_range(
        &self,
        division_id: i32,
        start: NaiveDate,
        end: NaiveDate,
    ) -> ServiceResult<Vec<reports::Model>> {
        debug!(
            "Fetching reports for division {} between {} and {}",
            division_id, start, end
        );
        self.find(
            Condition::all()
                .add(reports::Column::DivisionId.eq(division_id))
                .add(reports::Column::ReportDate.between(start, end)),
        )
        .await
    }

    /// Keyword match over title and content
    pub async fn search(&self, keyword: &str) -> ServiceResult<Vec<reports::Model>> {
        debug!("Searching reports by keyword: {}", keyword);
        self.find(
            Condition::any()
                .add(reports::Column::Title.contains(keyword))
                .add(reports::Column::Content.contains(keyword)),
        )
        .await
    }

    /// All reports, newest report date first
    pub async fn list_latest(&self) -> ServiceResult<Vec<reports::Model>> {
        debug!("Fetching latest reports");
        let reports = reports::Entity::find()
            .order_by_desc(reports::Column::ReportDate)
            .order_by_desc(reports::Column::Id)
            .all(&self.db)
            .await?;
        Ok(reports)
    }

    pub async fn count_by_user(&self, user_id: i32) -> ServiceResult<u64> {
        let count = reports::Entity::find()
            .filter(reports::Column::UserId.eq(user_id))
            .count(&self.db)
            .await?;
        Ok(count)
    }

    pub async fn count_by_division(&self, division_id: i32) -> ServiceResult<u64> {
        let count = reports::Entity::find()
            .filter(reports::Column::DivisionId.eq(division_id))
            .count(&self.db)
            .await?;
        Ok(count)
    }

    pub async fn create(&self, input: ReportInput) -> ServiceResult<reports::Model> {
        let title = validate_title(&input.title)?;
        info!("Creating new report: {}", title);
        self.ensure_references(&input).await?;

        let mut report = reports::ActiveModel::new();
        report.title = Set(title);
        report.report_date = Set(input.report_date.unwrap_or_else(|| Local::now().date_naive()));
        report.content = Set(input.content);
        report.user_id = Set(input.user_id);
        report.division_id = Set(input.division_id);
        Ok(report.insert(&self.db).await?)
    }

    pub async fn update(&self, id: i32, input: ReportInput) -> ServiceResult<reports::Model> {
        let title = validate_title(&input.title)?;
        info!("Updating report with id: {}", id);

        let existing = self.get(id).await?;
        self.ensure_references(&input).await?;

        let report_date = input.report_date.unwrap_or(existing.report_date);
        let mut report: reports::ActiveModel = existing.into();
        report.title = Set(title);
        report.report_date = Set(report_date);
        report.content = Set(input.content);
        report.user_id = Set(input.user_id);
        report.division_id = Set(input.division_id);
        Ok(report.set_updated_at().update(&self.db).await?)
    }

    /// Removes the report and, through the foreign key, its task entries
    pub async fn delete(&self, id: i32) -> ServiceResult<()> {
        info!("Deleting report with id: {}", id);
        let result = reports::Entity::delete_by_id(id).exec(&self.db).await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::not_found("Report", id));
        }
        Ok(())
    }

    async fn find(&self, condition: Condition) -> ServiceResult<Vec<reports::Model>> {
        let reports = reports::Entity::find()
            .filter(condition)
            .order_by_asc(reports::Column::ReportDate)
            .order_by_asc(reports::Column::Id)
            .all(&self.db)
            .await?;
        Ok(reports)
    }

    async fn ensure_references(&self, input: &ReportInput) -> ServiceResult<()> {
        if let Some(user_id) = input.user_id {
            users::Entity::find_by_id(user_id)
                .one(&self.db)
                .await?
                .ok_or_else(|| ServiceError::not_found("User", user_id))?;
        }
        if let Some(division_id) = input.division_id {
            divisions::Entity::find_by_id(division_id)
                .one(&self.db)
                .await?
                .ok_or_else(|| ServiceError::not_found("Division", division_id))?;
        }
        Ok(())
    }
}

fn validate_title(title: &str) -> ServiceResult<String> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(ServiceError::Validation("Report title is required".to_string()));
    }
    Ok(trimmed.to_string())
}

//! Excel task import.
//!
//! A workbook's first sheet is decoded into a [`SheetGrid`], the header row
//! (first cell `№`) is located and every following row is reconciled on its
//! own: the division is found by name or created, the goal is found by title
//! within that division or created, a user is picked by block, and a task is
//! created through the [`TaskCreator`]. A failing row is recorded in the
//! [`ImportResult`] and the loop moves on. Records created for earlier rows,
//! or earlier in the failing row, stay in place.

pub mod cells;
pub mod result;
pub mod row;
pub mod sheet;
pub mod status;
pub mod stores;

use chrono::{Months, NaiveDate};
use sea_orm::{DatabaseConnection, Set};
use tracing::{debug, error, info, warn};

use crate::database::entities::{divisions, goals, tasks, users};
use crate::errors::{ImportError, RowError};
use crate::services::division_service::DivisionService;
use crate::services::goal_service::GoalService;
use crate::services::task_service::{self, NewTask, TaskService};
use crate::services::user_service::UserService;

pub use cells::CellValue;
pub use result::{ImportResult, RowOutcome};
pub use row::ImportRow;
pub use sheet::SheetGrid;
pub use status::resolve_status;
pub use stores::{DivisionStore, GoalStore, TaskCreator, UserStore};

use row::non_blank;

/// Runs one import against the given stores
pub struct TaskImporter<'a> {
    divisions: &'a dyn DivisionStore,
    goals: &'a dyn GoalStore,
    users: &'a dyn UserStore,
    tasks: &'a dyn TaskCreator,
    today: NaiveDate,
}

impl<'a> TaskImporter<'a> {
    /// `today` anchors the deadline of goals created without an end date
    pub fn new(
        divisions: &'a dyn DivisionStore,
        goals: &'a dyn GoalStore,
        users: &'a dyn UserStore,
        tasks: &'a dyn TaskCreator,
        today: NaiveDate,
    ) -> Self {
        Self {
            divisions,
            goals,
            users,
            tasks,
            today,
        }
    }

    pub async fn import_bytes(&self, bytes: &[u8]) -> ImportResult {
        match sheet::read_first_sheet(bytes) {
            Ok(grid) => self.import_grid(&grid).await,
            Err(e) => {
                error!("Failed to read import workbook ({}): {}", e.error_code(), e);
                ImportResult::failed(e.to_string())
            }
        }
    }

    pub async fn import_grid(&self, grid: &SheetGrid) -> ImportResult {
        let Some(header) = grid.find_header_row() else {
            let err = ImportError::HeaderNotFound;
            warn!(
                "No header row within the first {} rows ({})",
                sheet::HEADER_SCAN_LIMIT + 1,
                err.error_code()
            );
            return ImportResult::failed(err.to_string());
        };
        info!("Found header row at position {}", header + 1);

        let last_row = grid.last_row().unwrap_or(header);
        let mut outcomes = Vec::new();
        for index in header + 1..=last_row {
            let Some(cells) = grid.row(index) else {
                continue;
            };
            outcomes.push(self.import_row(index + 1, cells).await);
        }

        ImportResult::from_outcomes(outcomes)
    }

    /// `row_number` is the 1-based sheet row used in messages
    async fn import_row(&self, row_number: usize, cells: &[CellValue]) -> RowOutcome {
        let row = ImportRow::from_cells(cells);

        let label = match row.label.as_deref() {
            Some(label) if !label.trim().is_empty() => label,
            _ => {
                debug!("Skipping row {}: no number", row_number);
                return RowOutcome::Skipped;
            }
        };

        let Some(division_name) = non_blank(&row.division) else {
            warn!("Row {} (№{}): empty division name, skipping", row_number, label);
            return RowOutcome::Skipped;
        };

        match self.reconcile(&row, division_name).await {
            Ok(task) => {
                debug!("Row {} (№{}) imported as task {}", row_number, label, task.id);
                RowOutcome::Success
            }
            Err(e) => {
                error!("Failed to import row {} (№{}): {}", row_number, label, e);
                RowOutcome::Failure(format!("Row {} (№{}): {}", row_number, label, e))
            }
        }
    }

    async fn reconcile(&self, row: &ImportRow, division_name: &str) -> Result<tasks::Model, RowError> {
        let initiative = non_blank(&row.initiative).ok_or(RowError::EmptyInitiative)?;
        let block = non_blank(&row.block);

        let division = self.resolve_division(division_name, block).await?;
        let deadline = row.end_date.unwrap_or_else(|| self.default_deadline());
        let goal = self.resolve_goal(&division, initiative, row, deadline).await?;
        let user = self.resolve_user(&division, block).await?;

        let task = NewTask {
            title: row.task_title.clone().unwrap_or_default(),
            description: row.task_description.clone(),
            expected_result: row.expected_result.clone(),
            actual_result: row.actual_result.clone(),
            impact: row.impact.clone(),
            progress: row.parsed_progress()?,
            status: Some(resolve_status(row.status.as_deref())),
            start_date: row.start_date,
            end_date: row.end_date,
            goal_id: goal.id,
            user_id: user.map(|u| u.id),
        };

        Ok(self.tasks.create(task).await?)
    }

    /// First division whose name contains `name`, else a new one. The block
    /// is appended when not already listed; the division is saved either way.
    async fn resolve_division(
        &self,
        name: &str,
        block: Option<&str>,
    ) -> Result<divisions::Model, RowError> {
        let existing = self
            .divisions
            .find_by_name_contains(name)
            .await?
            .into_iter()
            .next();

        let created = existing.is_none();
        let (division, mut blocks) = match existing {
            Some(division) => {
                let blocks = division.block_names();
                (divisions::ActiveModel::from(division), blocks)
            }
            None => {
                let mut division = divisions::ActiveModel::new();
                division.name = Set(name.to_string());
                (division, Vec::new())
            }
        };

        if let Some(block) = block {
            // Exact match: "Treasury" and "treasury" are kept as two blocks
            if !divisions::contains_block(&blocks, block) {
                blocks.push(block.to_string());
                info!("Added block '{}' to division '{}'", block, name);
            }
        }

        let saved = self.divisions.save(division.set_blocks(&blocks)).await?;
        if created {
            info!("Created division '{}' from import (id={})", saved.name, saved.id);
        }
        Ok(saved)
    }

    /// Goal of the division with the same title ignoring case, else a new one
    async fn resolve_goal(
        &self,
        division: &divisions::Model,
        title: &str,
        row: &ImportRow,
        deadline: NaiveDate,
    ) -> Result<goals::Model, RowError> {
        let wanted = title.to_lowercase();
        let existing = self
            .goals
            .find_by_division_id(division.id)
            .await?
            .into_iter()
            .find(|goal| goal.title.to_lowercase() == wanted);
        if let Some(goal) = existing {
            return Ok(goal);
        }

        let mut goal = goals::ActiveModel::new();
        goal.title = Set(title.to_string());
        goal.description = Set(None);
        goal.deadline = Set(deadline);
        goal.division_id = Set(division.id);
        goal.target_value = Set(row.parsed_target_value());

        let saved = self.goals.save(goal).await?;
        info!("Created goal '{}' for division '{}'", saved.title, division.name);
        Ok(saved)
    }

    /// User of the division working in `block`, else its first user. Never creates one.
    async fn resolve_user(
        &self,
        division: &divisions::Model,
        block: Option<&str>,
    ) -> Result<Option<users::Model>, RowError> {
        let Some(block) = block else {
            return Ok(None);
        };

        let users = self.users.find_by_division_id(division.id).await?;
        let wanted = block.to_lowercase();
        let user = users
            .iter()
            .find(|user| {
                user.block
                    .as_deref()
                    .map_or(false, |b| b.to_lowercase() == wanted)
            })
            .or_else(|| users.first())
            .cloned();
        Ok(user)
    }

    fn default_deadline(&self) -> NaiveDate {
        self.today
            .checked_add_months(Months::new(12))
            .unwrap_or(self.today)
    }
}

/// Import wired to the database-backed services
#[derive(Clone)]
pub struct TaskImportService {
    divisions: DivisionService,
    goals: GoalService,
    users: UserService,
    tasks: TaskService,
}

impl TaskImportService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            divisions: DivisionService::new(db.clone()),
            goals: GoalService::new(db.clone()),
            users: UserService::new(db.clone()),
            tasks: TaskService::new(db),
        }
    }

    pub async fn import_bytes(&self, bytes: &[u8]) -> ImportResult {
        info!("Starting task import ({} bytes)", bytes.len());
        let importer = TaskImporter::new(
            &self.divisions,
            &self.goals,
            &self.users,
            &self.tasks,
            task_service::today(),
        );
        let result = importer.import_bytes(bytes).await;
        info!(
            "Task import finished: {} rows, {} imported, {} errors",
            result.total_rows, result.success_count, result.error_count
        );
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::entities::TaskStatus;
    use crate::database::test_utils::setup_test_db;
    use crate::errors::{ServiceError, ServiceResult};
    use async_trait::async_trait;
    use sea_orm::{ActiveModelTrait, EntityTrait};

    fn text(s: &str) -> CellValue {
        CellValue::Text(s.to_string())
    }

    /// label, division, initiative, task title
    fn sheet_row(label: &str, division: &str, initiative: &str, title: &str) -> Vec<CellValue> {
        vec![text(label), text(division), text(initiative), text(title)]
    }

    fn with(mut cells: Vec<CellValue>, col: usize, value: CellValue) -> Vec<CellValue> {
        if cells.len() <= col {
            cells.resize(col + 1, CellValue::Empty);
        }
        cells[col] = value;
        cells
    }

    fn grid(data_rows: Vec<Vec<CellValue>>) -> SheetGrid {
        let mut rows = vec![vec![text("№"), text("Блок"), text("Инициатива"), text("Задача")]];
        rows.extend(data_rows);
        SheetGrid::from_rows(rows)
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()
    }

    struct Services {
        db: DatabaseConnection,
        divisions: DivisionService,
        goals: GoalService,
        users: UserService,
        tasks: TaskService,
    }

    impl Services {
        async fn new() -> Self {
            let db = setup_test_db().await;
            Self {
                divisions: DivisionService::new(db.clone()),
                goals: GoalService::new(db.clone()),
                users: UserService::new(db.clone()),
                tasks: TaskService::new(db.clone()),
                db,
            }
        }

        async fn import(&self, grid: &SheetGrid) -> ImportResult {
            TaskImporter::new(&self.divisions, &self.goals, &self.users, &self.tasks, today())
                .import_grid(grid)
                .await
        }

        async fn add_user(&self, email: &str, division_id: i32, block: Option<&str>) -> users::Model {
            let now = chrono::Utc::now();
            users::ActiveModel {
                name: Set(email.to_string()),
                email: Set(email.to_string()),
                password_hash: Set("x".to_string()),
                role: Set("EMPLOYEE".to_string()),
                division_id: Set(Some(division_id)),
                block: Set(block.map(str::to_string)),
                created_at: Set(now),
                updated_at: Set(now),
                ..Default::default()
            }
            .insert(&self.db)
            .await
            .unwrap()
        }
    }

    #[tokio::test]
    async fn test_missing_header() {
        let services = Services::new().await;
        let result = services
            .import(&SheetGrid::from_rows(vec![sheet_row("1", "Finance", "Q1", "Task")]))
            .await;

        assert_eq!((result.total_rows, result.success_count, result.error_count), (0, 0, 1));
        assert_eq!(result.errors[0], "Header row not found (first column must contain '№')");
    }

    #[tokio::test]
    async fn test_skipped_rows_do_not_count() {
        let services = Services::new().await;
        let result = services
            .import(&grid(vec![
                sheet_row("1", "Finance", "Q1", "Call clients"),
                sheet_row("  ", "Finance", "Q1", "No label"),
                sheet_row("3", "   ", "Q1", "No division"),
                vec![],
            ]))
            .await;

        assert_eq!(result.total_rows, 1);
        assert_eq!(result.success_count, 1);
        assert_eq!(result.error_count, 0);
        assert_eq!(services.tasks.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_blank_initiative_fails_row() {
        let services = Services::new().await;
        let result = services
            .import(&grid(vec![
                sheet_row("1", "Finance", "", "Call clients"),
                sheet_row("2", "Finance", "Q1", "Open branch"),
            ]))
            .await;

        assert_eq!(result.total_rows, 2);
        assert_eq!(result.success_count, 1);
        assert_eq!(result.errors, vec!["Row 2 (№1): empty initiative name".to_string()]);
    }

    #[tokio::test]
    async fn test_division_and_goal_are_reused() {
        let services = Services::new().await;
        let result = services
            .import(&grid(vec![
                sheet_row("1", "Finance", "Q1", "Call clients"),
                sheet_row("2", " Finance ", "q1", "Open branch"),
                sheet_row("3", "Finance", "Q2", "Launch card"),
            ]))
            .await;

        assert_eq!(result.success_count, 3);
        let divisions = services.divisions.list().await.unwrap();
        assert_eq!(divisions.len(), 1);
        let goals = services.goals.list_by_division(divisions[0].id).await.unwrap();
        let titles: Vec<&str> = goals.iter().map(|g| g.title.as_str()).collect();
        assert_eq!(titles, vec!["Q1", "Q2"]);
        assert_eq!(services.tasks.count_by_goal(goals[0].id).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_division_matched_by_substring() {
        let services = Services::new().await;
        let mut division = divisions::ActiveModel::new();
        division.name = Set("Finance Department".to_string());
        let existing = division.insert(&services.db).await.unwrap();

        let result = services.import(&grid(vec![sheet_row("1", "Finance", "Q1", "Call clients")])).await;

        assert_eq!(result.success_count, 1);
        let goals = services.goals.list().await.unwrap();
        assert_eq!(goals[0].division_id, existing.id);
        assert_eq!(services.divisions.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_blocks_appended_once_case_sensitively() {
        let services = Services::new().await;
        let rows = vec![
            with(sheet_row("1", "Finance", "Q1", "A"), row::columns::BLOCK, text(" Treasury ")),
            with(sheet_row("2", "Finance", "Q1", "B"), row::columns::BLOCK, text("Treasury")),
            with(sheet_row("3", "Finance", "Q1", "C"), row::columns::BLOCK, text("treasury")),
        ];
        services.import(&grid(rows)).await;

        let division = &services.divisions.list().await.unwrap()[0];
        assert_eq!(
            division.block_names(),
            vec!["Treasury".to_string(), "treasury".to_string()]
        );
    }

    #[tokio::test]
    async fn test_new_goal_defaults() {
        let services = Services::new().await;
        let first = with(sheet_row("1", "Finance", "Q1", "A"), row::columns::TARGET_VALUE, text("250.5"));
        let second = with(sheet_row("2", "Finance", "Q2", "B"), row::columns::TARGET_VALUE, text("lots"));
        let second = with(second, row::columns::END_DATE, text("31.12.2025"));
        services.import(&grid(vec![first, second])).await;

        let goals = services.goals.list().await.unwrap();
        assert_eq!(goals[0].deadline, NaiveDate::from_ymd_opt(2025, 2, 28).unwrap());
        assert_eq!(goals[0].target_value, Some(rust_decimal_macros::dec!(250.5)));
        assert_eq!(goals[0].description, None);
        assert_eq!(goals[1].deadline, NaiveDate::from_ymd_opt(2025, 12, 31).unwrap());
        assert_eq!(goals[1].target_value, None);
    }

    #[tokio::test]
    async fn test_past_end_date_still_creates_goal() {
        let services = Services::new().await;
        let cells = with(sheet_row("1", "Finance", "Q1", "A"), row::columns::END_DATE, text("01.01.2020"));
        let result = services.import(&grid(vec![cells])).await;

        assert_eq!(result.success_count, 1);
        let goal = &services.goals.list().await.unwrap()[0];
        assert_eq!(goal.deadline, NaiveDate::from_ymd_opt(2020, 1, 1).unwrap());
    }

    #[tokio::test]
    async fn test_user_resolution_by_block() {
        let services = Services::new().await;
        let mut division = divisions::ActiveModel::new();
        division.name = Set("Finance".to_string());
        let division = division.insert(&services.db).await.unwrap();
        let first = services.add_user("first@bank.com", division.id, None).await;
        let treasurer = services.add_user("t@bank.com", division.id, Some("Treasury")).await;

        let rows = vec![
            with(sheet_row("1", "Finance", "Q1", "A"), row::columns::BLOCK, text("TREASURY")),
            with(sheet_row("2", "Finance", "Q1", "B"), row::columns::BLOCK, text("Audit")),
            sheet_row("3", "Finance", "Q1", "C"),
        ];
        services.import(&grid(rows)).await;

        let tasks = services.tasks.list().await.unwrap();
        assert_eq!(tasks[0].user_id, Some(treasurer.id));
        assert_eq!(tasks[1].user_id, Some(first.id));
        assert_eq!(tasks[2].user_id, None);
    }

    #[tokio::test]
    async fn test_task_fields_status_and_progress() {
        let services = Services::new().await;
        let cells = with(sheet_row("1", "Finance", "Q1", "Call clients"), row::columns::STATUS, text("в работе"));
        let cells = with(cells, row::columns::PROGRESS, text("150"));
        let cells = with(cells, row::columns::START_DATE, text("05.03.2024 plan"));
        let cells = with(cells, row::columns::END_DATE, text("2024-06-30"));
        let cells = with(cells, row::columns::IMPACT, text("Lower churn"));
        let unknown = with(sheet_row("2", "Finance", "Q1", "Other"), row::columns::STATUS, text("unknown"));
        services.import(&grid(vec![cells, unknown])).await;

        let tasks = services.tasks.list().await.unwrap();
        assert_eq!(tasks[0].get_status(), Some(TaskStatus::InProgress));
        assert_eq!(tasks[0].progress, Some(150));
        assert_eq!(tasks[0].start_date, NaiveDate::from_ymd_opt(2024, 3, 5));
        assert_eq!(tasks[0].impact.as_deref(), Some("Lower churn"));
        assert_eq!(tasks[1].get_status(), Some(TaskStatus::NotStarted));

        let goal = &services.goals.list().await.unwrap()[0];
        assert_eq!(goal.progress, 75);
    }

    #[tokio::test]
    async fn test_row_failures_keep_created_records() {
        let services = Services::new().await;
        let bad_progress = with(sheet_row("1", "Finance", "Q1", "A"), row::columns::PROGRESS, text("half"));
        let bad_dates = with(sheet_row("2", "Risk", "Q9", "B"), row::columns::START_DATE, text("01.05.2024"));
        let bad_dates = with(bad_dates, row::columns::END_DATE, text("01.04.2024"));
        let result = services.import(&grid(vec![bad_progress, bad_dates])).await;

        assert_eq!(result.total_rows, 2);
        assert_eq!(result.success_count, 0);
        assert_eq!(
            result.errors,
            vec![
                "Row 2 (№1): invalid progress: half".to_string(),
                "Row 3 (№2): Start date cannot be after end date".to_string(),
            ]
        );
        assert_eq!(services.divisions.list().await.unwrap().len(), 2);
        assert_eq!(services.goals.list().await.unwrap().len(), 2);
        assert!(services.tasks.list().await.unwrap().is_empty());
    }

    struct RejectingTasks;

    #[async_trait]
    impl TaskCreator for RejectingTasks {
        async fn create(&self, _task: NewTask) -> ServiceResult<tasks::Model> {
            Err(ServiceError::Conflict("task store is read-only".to_string()))
        }
    }

    #[tokio::test]
    async fn test_injected_task_creator() {
        let services = Services::new().await;
        let importer = TaskImporter::new(
            &services.divisions,
            &services.goals,
            &services.users,
            &RejectingTasks,
            today(),
        );
        let result = importer
            .import_grid(&grid(vec![sheet_row("7", "Finance", "Q1", "A")]))
            .await;

        assert_eq!(result.errors, vec!["Row 2 (№7): task store is read-only".to_string()]);
        assert!(tasks::Entity::find().all(&services.db).await.unwrap().is_empty());
    }
}

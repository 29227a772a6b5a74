use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::database::entities::{divisions, goals, users};
use crate::errors::{ServiceError, ServiceResult};
use crate::services::task_import::DivisionStore;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DivisionInput {
    pub name: String,
    #[serde(default)]
    pub blocks: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DivisionCounts {
    pub user_count: u64,
    pub goal_count: u64,
}

#[derive(Clone)]
pub struct DivisionService {
    db: DatabaseConnection,
}

impl DivisionService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn list(&self) -> ServiceResult<Vec<divisions::Model>> {
        debug!("Fetching all divisions");
        let divisions = divisions::Entity::find()
            .order_by_asc(divisions::Column::Id)
            .all(&self.db)
            .await?;
        Ok(divisions)
    }

    pub async fn get(&self, id: i32) -> ServiceResult<divisions::Model> {
        divisions::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("Division", id))
    }

    /// Case-sensitive substring search, ascending id.
    ///
    /// SQLite's LIKE ignores ASCII case, so the query only narrows the
    /// candidates and the exact containment check happens here.
    pub async fn search_by_name(&self, text: &str) -> ServiceResult<Vec<divisions::Model>> {
        debug!("Searching divisions by name: {}", text);
        let candidates = divisions::Entity::find()
            .filter(divisions::Column::Name.contains(text))
            .order_by_asc(divisions::Column::Id)
            .all(&self.db)
            .await?;

        Ok(candidates
            .into_iter()
            .filter(|division| division.name.contains(text))
            .collect())
    }

    pub async fn create(&self, input: DivisionInput) -> ServiceResult<divisions::Model> {
        let name = validate_name(&input.name)?;
        info!("Creating new division: {}", name);

        let mut division = divisions::ActiveModel::new().set_blocks(&input.blocks);
        division.name = Set(name);
        Ok(division.insert(&self.db).await?)
    }

    pub async fn update(&self, id: i32, input: DivisionInput) -> ServiceResult<divisions::Model> {
        let name = validate_name(&input.name)?;
        info!("Updating division with id: {}", id);

        let existing = self.get(id).await?;
        let mut division: divisions::ActiveModel = existing.into();
        division.name = Set(name);
        let division = division.set_blocks(&input.blocks).set_updated_at();
        Ok(division.update(&self.db).await?)
    }

    /// Refused while any user or goal still references the division
    pub async fn delete(&self, id: i32) -> ServiceResult<()> {
        info!("Deleting division with id: {}", id);
        self.get(id).await?;

        let counts = self.counts(id).await?;
        if counts.user_count > 0 || counts.goal_count > 0 {
            return Err(ServiceError::Conflict(
                "Cannot delete division with associated users or goals".to_string(),
            ));
        }

        divisions::Entity::delete_by_id(id).exec(&self.db).await?;
        Ok(())
    }

    pub async fn counts(&self, id: i32) -> ServiceResult<DivisionCounts> {
        let user_count = users::Entity::find()
            .filter(users::Column::DivisionId.eq(id))
            .count(&self.db)
            .await?;
        let goal_count = goals::Entity::find()
            .filter(goals::Column::DivisionId.eq(id))
            .count(&self.db)
            .await?;

        Ok(DivisionCounts {
            user_count,
            goal_count,
        })
    }
}

fn validate_name(name: &str) -> ServiceResult<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ServiceError::Validation("Division name is required".to_string()));
    }
    Ok(trimmed.to_string())
}

#[async_trait]
impl DivisionStore for DivisionService {
    async fn find_by_name_contains(&self, text: &str) -> ServiceResult<Vec<divisions::Model>> {
        self.search_by_name(text).await
    }

    async fn save(&self, division: divisions::ActiveModel) -> ServiceResult<divisions::Model> {
        let saved = if division.id.is_not_set() {
            division.insert(&self.db).await?
        } else {
            division.set_updated_at().update(&self.db).await?
        };
        Ok(saved)
    }
}

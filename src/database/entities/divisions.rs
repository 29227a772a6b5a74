use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue, Set};
use serde::{Deserialize, Serialize};

/// Organizational division owning goals and users.
///
/// `blocks` holds the division's sub-unit names as a JSON array, kept in
/// insertion order. Use [`Model::block_names`] and [`encode_blocks`] rather
/// than touching the raw column.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[sea_orm(table_name = "divisions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    #[sea_orm(column_type = "Text", default_value = "[]")]
    pub blocks: String,
    pub created_at: ChronoDateTimeUtc,
    pub updated_at: ChronoDateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::goals::Entity")]
    Goals,
    #[sea_orm(has_many = "super::users::Entity")]
    Users,
}

impl Related<super::goals::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Goals.def()
    }
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl ActiveModel {
    pub fn new() -> Self {
        Self {
            id: ActiveValue::NotSet,
            name: ActiveValue::NotSet,
            blocks: Set("[]".to_string()),
            created_at: Set(chrono::Utc::now()),
            updated_at: Set(chrono::Utc::now()),
        }
    }

    pub fn set_blocks(mut self, blocks: &[String]) -> Self {
        self.blocks = Set(encode_blocks(blocks));
        self
    }

    pub fn set_updated_at(mut self) -> Self {
        self.updated_at = Set(chrono::Utc::now());
        self
    }
}

impl Model {
    /// Decoded block list; a malformed column reads as empty
    pub fn block_names(&self) -> Vec<String> {
        serde_json::from_str(&self.blocks).unwrap_or_default()
    }
}

/// Exact, case-sensitive membership test
pub fn contains_block(blocks: &[String], block: &str) -> bool {
    blocks.iter().any(|b| b == block)
}

pub fn encode_blocks(blocks: &[String]) -> String {
    serde_json::to_string(blocks).unwrap_or_else(|_| "[]".to_string())
}

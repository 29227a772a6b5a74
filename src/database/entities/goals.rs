use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue, Set};
use serde::{Deserialize, Serialize};

/// Strategic goal (initiative) owned by exactly one division
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[sea_orm(table_name = "goals")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub title: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    #[sea_orm(column_type = "Decimal(Some((16, 2)))", nullable)]
    pub target_value: Option<Decimal>,
    #[sea_orm(column_type = "Decimal(Some((16, 2)))", nullable)]
    pub current_value: Option<Decimal>,
    pub deadline: Date,
    pub progress: i32,
    pub division_id: i32,
    pub created_at: ChronoDateTimeUtc,
    pub updated_at: ChronoDateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::divisions::Entity",
        from = "Column::DivisionId",
        to = "super::divisions::Column::Id"
    )]
    Divisions,
    #[sea_orm(has_many = "super::tasks::Entity")]
    Tasks,
}

impl Related<super::divisions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Divisions.def()
    }
}

impl Related<super::tasks::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Tasks.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl ActiveModel {
    pub fn new() -> Self {
        Self {
            id: ActiveValue::NotSet,
            title: ActiveValue::NotSet,
            description: Set(None),
            target_value: Set(None),
            current_value: Set(None),
            deadline: ActiveValue::NotSet,
            progress: Set(0),
            division_id: ActiveValue::NotSet,
            created_at: Set(chrono::Utc::now()),
            updated_at: Set(chrono::Utc::now()),
        }
    }

    pub fn set_updated_at(mut self) -> Self {
        self.updated_at = Set(chrono::Utc::now());
        self
    }
}

impl Model {
    pub fn is_completed(&self) -> bool {
        match (self.current_value, self.target_value) {
            (Some(current), Some(target)) => current >= target,
            _ => false,
        }
    }
}

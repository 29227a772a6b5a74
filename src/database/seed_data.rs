use anyhow::Result;
use sea_orm::*;
use tracing::info;

use crate::database::entities::{divisions, users, UserRole};

pub const HEAD_OFFICE: &str = "Головной офис";

const HEAD_OFFICE_BLOCKS: [&str; 3] = [
    "Департамент стратегического планирования",
    "Департамент финансового контроля",
    "Административный отдел",
];

/// Creates the head office division and two login accounts on an empty database.
///
/// Each table is only touched while it is empty, so running this twice is harmless.
pub async fn seed_defaults(db: &DatabaseConnection) -> Result<()> {
    let division = match divisions::Entity::find()
        .order_by_asc(divisions::Column::Id)
        .one(db)
        .await?
    {
        Some(existing) => {
            info!("Divisions already present, skipping division seed");
            existing
        }
        None => {
            let blocks: Vec<String> = HEAD_OFFICE_BLOCKS.iter().map(|b| b.to_string()).collect();
            let mut division = divisions::ActiveModel::new().set_blocks(&blocks);
            division.name = Set(HEAD_OFFICE.to_string());
            let division = division.insert(db).await?;
            info!("Created division '{}' with ID: {}", division.name, division.id);
            division
        }
    };

    if users::Entity::find().count(db).await? > 0 {
        info!("Users already present, skipping user seed");
        return Ok(());
    }

    create_user(
        db,
        "Администратор",
        "admin@bank.com",
        "admin123",
        UserRole::Admin,
        division.id,
        Some(HEAD_OFFICE_BLOCKS[2]),
    )
    .await?;

    create_user(
        db,
        "Рамиль",
        "ramil@bank.com",
        "123123",
        UserRole::Employee,
        division.id,
        None,
    )
    .await?;

    Ok(())
}

async fn create_user(
    db: &DatabaseConnection,
    name: &str,
    email: &str,
    password: &str,
    role: UserRole,
    division_id: i32,
    block: Option<&str>,
) -> Result<()> {
    let mut user = users::ActiveModel::new();
    user.name = Set(name.to_string());
    user.email = Set(email.to_string());
    user.password_hash = Set(bcrypt::hash(password, bcrypt::DEFAULT_COST)?);
    user.role = Set(role.to_string());
    user.division_id = Set(Some(division_id));
    user.block = Set(block.map(str::to_string));

    let user = user.insert(db).await?;
    info!("Created {} user {} with ID: {}", role, user.email, user.id);
    Ok(())
}

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create divisions table
        manager
            .create_table(
                Table::create()
                    .table(Divisions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Divisions::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Divisions::Name).string_len(255).not_null())
                    .col(ColumnDef::new(Divisions::Blocks).text().not_null().default("[]"))
                    .col(ColumnDef::new(Divisions::CreatedAt).timestamp_with_time_zone().not_null())
                    .col(ColumnDef::new(Divisions::UpdatedAt).timestamp_with_time_zone().not_null())
                    .to_owned(),
            )
            .await?;

        // Create goals table
        manager
            .create_table(
                Table::create()
                    .table(Goals::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Goals::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Goals::Title).string_len(500).not_null())
                    .col(ColumnDef::new(Goals::Description).text().null())
                    .col(ColumnDef::new(Goals::TargetValue).decimal_len(16, 2).null())
                    .col(ColumnDef::new(Goals::CurrentValue).decimal_len(16, 2).null())
                    .col(ColumnDef::new(Goals::Deadline).date().not_null())
                    .col(ColumnDef::new(Goals::Progress).integer().not_null().default(0))
                    .col(ColumnDef::new(Goals::DivisionId).integer().not_null())
                    .col(ColumnDef::new(Goals::CreatedAt).timestamp_with_time_zone().not_null())
                    .col(ColumnDef::new(Goals::UpdatedAt).timestamp_with_time_zone().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_goals_division_id")
                            .from(Goals::Table, Goals::DivisionId)
                            .to(Divisions::Table, Divisions::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        // Create users table
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Users::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Users::Name).string_len(255).not_null())
                    .col(ColumnDef::new(Users::Email).string_len(255).not_null().unique_key())
                    .col(ColumnDef::new(Users::PasswordHash).string_len(255).not_null())
                    .col(ColumnDef::new(Users::Role).string().not_null().default("EMPLOYEE"))
                    .col(ColumnDef::new(Users::DivisionId).integer().null())
                    .col(ColumnDef::new(Users::Block).string_len(255).null())
                    .col(ColumnDef::new(Users::CreatedAt).timestamp_with_time_zone().not_null())
                    .col(ColumnDef::new(Users::UpdatedAt).timestamp_with_time_zone().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_users_division_id")
                            .from(Users::Table, Users::DivisionId)
                            .to(Divisions::Table, Divisions::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        // Create tasks table
        manager
            .create_table(
                Table::create()
                    .table(Tasks::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Tasks::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Tasks::Title).string_len(500).not_null())
                    .col(ColumnDef::new(Tasks::Description).text().null())
                    .col(ColumnDef::new(Tasks::ExpectedResult).text().null())
                    .col(ColumnDef::new(Tasks::ActualResult).text().null())
                    .col(ColumnDef::new(Tasks::Impact).text().null())
                    .col(ColumnDef::new(Tasks::Progress).integer().null())
                    .col(
                        ColumnDef::new(Tasks::Status)
                            .string()
                            .not_null()
                            .default("NOT_STARTED"),
                    )
                    .col(ColumnDef::new(Tasks::StartDate).date().null())
                    .col(ColumnDef::new(Tasks::EndDate).date().null())
                    .col(ColumnDef::new(Tasks::GoalId).integer().not_null())
                    .col(ColumnDef::new(Tasks::UserId).integer().null())
                    .col(ColumnDef::new(Tasks::CreatedAt).timestamp_with_time_zone().not_null())
                    .col(ColumnDef::new(Tasks::UpdatedAt).timestamp_with_time_zone().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_tasks_goal_id")
                            .from(Tasks::Table, Tasks::GoalId)
                            .to(Goals::Table, Goals::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_tasks_user_id")
                            .from(Tasks::Table, Tasks::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_goals_division_id")
                    .table(Goals::Table)
                    .col(Goals::DivisionId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_tasks_goal_id")
                    .table(Tasks::Table)
                    .col(Tasks::GoalId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Tasks::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Goals::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Divisions::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(Iden)]
enum Divisions {
    Table,
    Id,
    Name,
    Blocks,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Goals {
    Table,
    Id,
    Title,
    Description,
    TargetValue,
    CurrentValue,
    Deadline,
    Progress,
    DivisionId,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Users {
    Table,
    Id,
    Name,
    Email,
    PasswordHash,
    Role,
    DivisionId,
    Block,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Tasks {
    Table,
    Id,
    Title,
    Description,
    ExpectedResult,
    ActualResult,
    Impact,
    Progress,
    Status,
    StartDate,
    EndDate,
    GoalId,
    UserId,
    CreatedAt,
    UpdatedAt,
}

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create reports table
        manager
            .create_table(
                Table::create()
                    .table(Reports::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Reports::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Reports::Title).string_len(500).not_null())
                    .col(ColumnDef::new(Reports::ReportDate).date().not_null())
                    .col(ColumnDef::new(Reports::Content).text().null())
                    .col(ColumnDef::new(Reports::UserId).integer().null())
                    .col(ColumnDef::new(Reports::DivisionId).integer().null())
                    .col(ColumnDef::new(Reports::CreatedAt).timestamp_with_time_zone().not_null())
                    .col(ColumnDef::new(Reports::UpdatedAt).timestamp_with_time_zone().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_reports_user_id")
                            .from(Reports::Table, Reports::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_reports_division_id")
                            .from(Reports::Table, Reports::DivisionId)
                            .to(Divisions::Table, Divisions::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        // Create task_reports table
        manager
            .create_table(
                Table::create()
                    .table(TaskReports::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TaskReports::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(TaskReports::TaskId).integer().not_null())
                    .col(ColumnDef::new(TaskReports::ReportId).integer().not_null())
                    .col(ColumnDef::new(TaskReports::Progress).decimal_len(5, 2).null())
                    .col(ColumnDef::new(TaskReports::Notes).text().null())
                    .col(ColumnDef::new(TaskReports::CreatedAt).timestamp_with_time_zone().not_null())
                    .col(ColumnDef::new(TaskReports::UpdatedAt).timestamp_with_time_zone().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_task_reports_task_id")
                            .from(TaskReports::Table, TaskReports::TaskId)
                            .to(Tasks::Table, Tasks::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_task_reports_report_id")
                            .from(TaskReports::Table, TaskReports::ReportId)
                            .to(Reports::Table, Reports::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_reports_report_date")
                    .table(Reports::Table)
                    .col(Reports::ReportDate)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_task_reports_task_id")
                    .table(TaskReports::Table)
                    .col(TaskReports::TaskId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(TaskReports::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Reports::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(Iden)]
enum Reports {
    Table,
    Id,
    Title,
    ReportDate,
    Content,
    UserId,
    DivisionId,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum TaskReports {
    Table,
    Id,
    TaskId,
    ReportId,
    Progress,
    Notes,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Users {
    Table,
    Id,
}

#[derive(Iden)]
enum Divisions {
    Table,
    Id,
}

#[derive(Iden)]
enum Tasks {
    Table,
    Id,
}

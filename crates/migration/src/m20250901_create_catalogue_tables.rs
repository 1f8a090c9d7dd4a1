use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Modules::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Modules::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Modules::TitleDe).string().not_null())
                    .col(ColumnDef::new(Modules::TitleEn).string().not_null())
                    .col(ColumnDef::new(Modules::Responsible).json_binary().not_null())
                    .col(ColumnDef::new(Modules::TotalCreditPoints).string().not_null())
                    .col(ColumnDef::new(Modules::DegreeProgram).string().not_null())
                    .col(ColumnDef::new(Modules::Category).string())
                    .col(
                        ColumnDef::new(Modules::Visible)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Modules::CreatedAt).timestamp())
                    .col(ColumnDef::new(Modules::ModifiedAt).timestamp())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Courses::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Courses::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Courses::ModuleId).big_integer().not_null())
                    .col(ColumnDef::new(Courses::Title).string().not_null())
                    .col(ColumnDef::new(Courses::CreditPoints).string().not_null())
                    .col(ColumnDef::new(Courses::AdmissionPrerequisites).text().not_null())
                    .col(
                        ColumnDef::new(Courses::Semesters)
                            .json_binary()
                            .not_null()
                            .default(Expr::cust("'[]'::jsonb")),
                    )
                    .col(ColumnDef::new(Courses::Content).text().not_null())
                    .col(ColumnDef::new(Courses::LearningOutcomes).text().not_null())
                    .col(ColumnDef::new(Courses::Literature).text().not_null())
                    .col(ColumnDef::new(Courses::Applicability).text().not_null())
                    .col(ColumnDef::new(Courses::PrerequisitesToPass).text().not_null())
                    .col(ColumnDef::new(Courses::Frequency).string().not_null())
                    .col(ColumnDef::new(Courses::Language).string())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-courses-module_id")
                            .from(Courses::Table, Courses::ModuleId)
                            .to(Modules::Table, Modules::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(DeliveryForms::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(DeliveryForms::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(DeliveryForms::CourseId).big_integer().not_null())
                    .col(ColumnDef::new(DeliveryForms::Form).string().not_null())
                    .col(ColumnDef::new(DeliveryForms::WeeklyHours).integer())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-delivery_forms-course_id")
                            .from(DeliveryForms::Table, DeliveryForms::CourseId)
                            .to(Courses::Table, Courses::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Owned by either a module or a course
        manager
            .create_table(
                Table::create()
                    .table(ExtraFields::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ExtraFields::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ExtraFields::ModuleId).big_integer())
                    .col(ColumnDef::new(ExtraFields::CourseId).big_integer())
                    .col(ColumnDef::new(ExtraFields::Title).string().not_null())
                    .col(ColumnDef::new(ExtraFields::Content).text().not_null())
                    .check(Expr::cust("(module_id IS NULL) <> (course_id IS NULL)"))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-extra_fields-module_id")
                            .from(ExtraFields::Table, ExtraFields::ModuleId)
                            .to(Modules::Table, Modules::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-extra_fields-course_id")
                            .from(ExtraFields::Table, ExtraFields::CourseId)
                            .to(Courses::Table, Courses::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ChangeRequests::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ChangeRequests::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ChangeRequests::ModuleId).big_integer())
                    .col(ColumnDef::new(ChangeRequests::Payload).text().not_null())
                    .col(ColumnDef::new(ChangeRequests::Submitter).string().not_null())
                    .col(ColumnDef::new(ChangeRequests::Status).string().not_null())
                    .col(ColumnDef::new(ChangeRequests::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(ChangeRequests::ApprovedAt).timestamp())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-change_requests-module_id")
                            .from(ChangeRequests::Table, ChangeRequests::ModuleId)
                            .to(Modules::Table, Modules::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Drop tables in reverse order to respect foreign key constraints
        manager
            .drop_table(Table::drop().table(ChangeRequests::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ExtraFields::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(DeliveryForms::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Courses::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Modules::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(Iden)]
enum Modules {
    Table,
    Id,
    TitleDe,
    TitleEn,
    Responsible,
    TotalCreditPoints,
    DegreeProgram,
    Category,
    Visible,
    CreatedAt,
    ModifiedAt,
}

#[derive(Iden)]
enum Courses {
    Table,
    Id,
    ModuleId,
    Title,
    CreditPoints,
    AdmissionPrerequisites,
    Semesters,
    Content,
    LearningOutcomes,
    Literature,
    Applicability,
    PrerequisitesToPass,
    Frequency,
    Language,
}

#[derive(Iden)]
enum DeliveryForms {
    Table,
    Id,
    CourseId,
    Form,
    WeeklyHours,
}

#[derive(Iden)]
enum ExtraFields {
    Table,
    Id,
    ModuleId,
    CourseId,
    Title,
    Content,
}

#[derive(Iden)]
enum ChangeRequests {
    Table,
    Id,
    ModuleId,
    Payload,
    Submitter,
    Status,
    CreatedAt,
    ApprovedAt,
}

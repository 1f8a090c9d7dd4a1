use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Foreign key lookups when assembling module graphs
        manager
            .create_index(
                Index::create()
                    .name("idx_courses_module_id")
                    .table(Courses::Table)
                    .col(Courses::ModuleId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_delivery_forms_course_id")
                    .table(DeliveryForms::Table)
                    .col(DeliveryForms::CourseId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_extra_fields_module_id")
                    .table(ExtraFields::Table)
                    .col(ExtraFields::ModuleId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_extra_fields_course_id")
                    .table(ExtraFields::Table)
                    .col(ExtraFields::CourseId)
                    .to_owned(),
            )
            .await?;

        // Review queue and module history
        manager
            .create_index(
                Index::create()
                    .name("idx_change_requests_status_created_at")
                    .table(ChangeRequests::Table)
                    .col(ChangeRequests::Status)
                    .col(ChangeRequests::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_change_requests_module_id")
                    .table(ChangeRequests::Table)
                    .col(ChangeRequests::ModuleId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_modules_visible_title_de")
                    .table(Modules::Table)
                    .col(Modules::Visible)
                    .col(Modules::TitleDe)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for name in [
            "idx_modules_visible_title_de",
            "idx_change_requests_module_id",
            "idx_change_requests_status_created_at",
            "idx_extra_fields_course_id",
            "idx_extra_fields_module_id",
            "idx_delivery_forms_course_id",
            "idx_courses_module_id",
        ] {
            manager
                .drop_index(Index::drop().name(name).to_owned())
                .await?;
        }

        Ok(())
    }
}

#[derive(Iden)]
enum Modules {
    Table,
    Visible,
    TitleDe,
}

#[derive(Iden)]
enum Courses {
    Table,
    ModuleId,
}

#[derive(Iden)]
enum DeliveryForms {
    Table,
    CourseId,
}

#[derive(Iden)]
enum ExtraFields {
    Table,
    ModuleId,
    CourseId,
}

#[derive(Iden)]
enum ChangeRequests {
    Table,
    Status,
    CreatedAt,
    ModuleId,
}
